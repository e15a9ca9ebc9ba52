use crate::error::N26Error;
use crate::transport::{ApiRequest, RequestBody, Transport};
use log::{debug, info};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;

const PASSWORD_GRANT_PATH: &str = "/oauth2/token/";
const CHALLENGE_PATH: &str = "/api/mfa/challenge";
const POLL_PATH: &str = "/oauth2/token";

// Fixed client credential ("android:secret") the token endpoint expects.
const CLIENT_AUTHORIZATION: &str = "Basic YW5kcm9pZDpzZWNyZXQ=";
const DEVICE_TOKEN_HEADER: &str = "device-token";
const CHALLENGE_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/59.0.3071.86 Safari/537.36";

/// Login material supplied once before authentication begins. The device
/// token is a stable per-installation identifier the bank pairs approvals to.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub device_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("device_token", &self.device_token)
            .finish()
    }
}

/// Bearer credentials for the process lifetime. The MFA token is only
/// populated between the challenge and its approval; it is cleared once the
/// access token arrives.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(rename = "mfaToken")]
    pub mfa_token: String,
}

/// How often and how long to poll for the out-of-band approval.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Additional attempts after the immediate first poll.
    pub max_retries: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        // 1 + 12 attempts spaced 5 seconds apart, roughly a minute in total.
        Self {
            max_retries: 12,
            interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    ChallengeRequested,
    PendingDeviceApproval,
    Approved,
    Denied,
    TimedOut,
}

/// Drives the password + out-of-band approval handshake.
///
/// Terminal states are not re-enterable: once a run finishes (or fails), the
/// machine refuses further attempts and a fresh one must be constructed.
#[derive(Debug)]
pub struct Authenticator<T: Transport> {
    transport: T,
    credentials: Credentials,
    policy: PollPolicy,
    state: AuthState,
    token: Token,
}

impl<T: Transport> Authenticator<T> {
    pub fn new(transport: T, credentials: Credentials) -> Self {
        Self::with_policy(transport, credentials, PollPolicy::default())
    }

    pub fn with_policy(transport: T, credentials: Credentials, policy: PollPolicy) -> Self {
        Self {
            transport,
            credentials,
            policy,
            state: AuthState::Unauthenticated,
            token: Token::default(),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Run the whole handshake and hand out the finished token.
    pub async fn authenticate(&mut self) -> Result<Token, N26Error> {
        if self.state != AuthState::Unauthenticated {
            return Err(N26Error::AttemptConsumed);
        }
        self.request_mfa_token().await?;
        self.request_approval().await?;
        self.poll_approval().await?;
        Ok(self.token.clone())
    }

    /// Step 1: password grant. The endpoint answers the *valid* credential
    /// pair with 403 and a partial token body carrying the MFA handshake
    /// token; any other status violates the contract.
    async fn request_mfa_token(&mut self) -> Result<(), N26Error> {
        let request = ApiRequest {
            method: Method::POST,
            path: PASSWORD_GRANT_PATH.to_string(),
            query: Vec::new(),
            headers: self.auth_headers(),
            body: RequestBody::Form(vec![
                ("grant_type", "password".to_string()),
                ("username", self.credentials.username.clone()),
                ("password", self.credentials.password.clone()),
            ]),
        };
        debug!("Submitting password grant");
        let response = self.transport.execute(request).await?;
        if response.status != StatusCode::FORBIDDEN {
            return Err(N26Error::UnexpectedAuthResponse(response.status));
        }
        let body = response.bytes().await?;
        let partial: Token =
            serde_json::from_slice(&body).map_err(|_| N26Error::InvalidResponse)?;
        if partial.mfa_token.is_empty() {
            return Err(N26Error::InvalidResponse);
        }
        self.token.mfa_token = partial.mfa_token;
        self.state = AuthState::ChallengeRequested;
        debug!("Received mfa handshake token");
        Ok(())
    }

    /// Step 2: ask for an out-of-band challenge. On 201 the bank pushes an
    /// approval prompt to the user's paired device.
    async fn request_approval(&mut self) -> Result<(), N26Error> {
        let mut headers = self.auth_headers();
        headers.push(("User-Agent", CHALLENGE_USER_AGENT.to_string()));
        let request = ApiRequest {
            method: Method::POST,
            path: CHALLENGE_PATH.to_string(),
            query: Vec::new(),
            headers,
            body: RequestBody::Json(json!({
                "challengeType": "oob",
                "mfaToken": self.token.mfa_token,
            })),
        };
        debug!("Requesting out-of-band approval");
        let response = self.transport.execute(request).await?;
        if response.status != StatusCode::CREATED {
            return Err(N26Error::ChallengeRejected(response.status));
        }
        self.state = AuthState::PendingDeviceApproval;
        info!("Approval prompt pushed to the paired device");
        Ok(())
    }

    /// Step 3: poll the token endpoint, once immediately and then at the
    /// configured interval. 400 means the user has not decided yet; any
    /// other status is terminal.
    async fn poll_approval(&mut self) -> Result<(), N26Error> {
        let mut retries = 0;
        loop {
            let request = ApiRequest {
                method: Method::POST,
                path: POLL_PATH.to_string(),
                query: Vec::new(),
                headers: self.auth_headers(),
                body: RequestBody::Form(vec![
                    ("grant_type", "mfa_oob".to_string()),
                    ("mfaToken", self.token.mfa_token.clone()),
                ]),
            };
            let response = self.transport.execute(request).await?;

            if response.status == StatusCode::BAD_REQUEST {
                if retries == self.policy.max_retries {
                    self.state = AuthState::TimedOut;
                    return Err(N26Error::ApprovalTimedOut);
                }
                retries += 1;
                debug!(
                    "Approval still pending, retry {}/{}",
                    retries, self.policy.max_retries
                );
                sleep(self.policy.interval).await;
                continue;
            }

            let status = response.status;
            let body = response.bytes().await?;
            return match serde_json::from_slice::<Token>(&body) {
                Ok(parsed) if !parsed.access_token.is_empty() => {
                    self.token.access_token = parsed.access_token;
                    self.token.token_type = parsed.token_type;
                    self.token.refresh_token = parsed.refresh_token;
                    self.token.expires_in = parsed.expires_in;
                    self.token.mfa_token.clear();
                    self.state = AuthState::Approved;
                    info!("Login approved");
                    Ok(())
                }
                _ => {
                    self.state = AuthState::Denied;
                    Err(N26Error::ApprovalDenied(status))
                }
            };
        }
    }

    fn auth_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Authorization", CLIENT_AUTHORIZATION.to_string()),
            (DEVICE_TOKEN_HEADER, self.credentials.device_token.clone()),
        ]
    }
}
