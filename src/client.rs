use crate::auth::{Authenticator, Credentials, PollPolicy, Token};
use crate::error::N26Error;
use crate::models::{
    Addresses, Balance, Card, Contact, Limit, PersonalInfo, Spaces, Statement, Statuses,
    Transaction,
};
use crate::timestamp::Timestamp;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, RequestBody, ResponseBody, Transport};
use log::{debug, info};
use reqwest::Method;
use serde::de::DeserializeOwned;

/// Authenticated API client: one operation per resource, exactly one
/// outbound call per invocation, no retries and no caching.
#[derive(Debug)]
pub struct Client<T: Transport = HttpTransport> {
    transport: T,
    token: Token,
}

impl Client<HttpTransport> {
    /// Authenticate against the production API and return a ready client.
    /// Blocks (asynchronously) until the user approves the login on the
    /// paired device, or the polling window closes.
    pub async fn login(credentials: Credentials) -> Result<Self, N26Error> {
        Self::login_with_policy(credentials, PollPolicy::default()).await
    }

    pub async fn login_with_policy(
        credentials: Credentials,
        policy: PollPolicy,
    ) -> Result<Self, N26Error> {
        let transport = HttpTransport::new()?;
        let mut authenticator = Authenticator::with_policy(&transport, credentials, policy);
        let token = authenticator.authenticate().await?;
        info!("Initialized N26 API client");
        Ok(Self { transport, token })
    }
}

impl<T: Transport> Client<T> {
    /// Wire a client from an existing transport and a finished token.
    pub fn with_transport(transport: T, token: Token) -> Self {
        Self { transport, token }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub async fn balance(&self) -> Result<Balance, N26Error> {
        debug!("Fetching balance");
        self.get_json("/api/accounts", Vec::new()).await
    }

    pub async fn personal_info(&self) -> Result<PersonalInfo, N26Error> {
        debug!("Fetching personal information");
        self.get_json("/api/me", Vec::new()).await
    }

    pub async fn statuses(&self) -> Result<Statuses, N26Error> {
        debug!("Fetching account statuses");
        self.get_json("/api/me/statuses", Vec::new()).await
    }

    pub async fn addresses(&self) -> Result<Addresses, N26Error> {
        debug!("Fetching addresses");
        self.get_json("/api/addresses", Vec::new()).await
    }

    pub async fn cards(&self) -> Result<Vec<Card>, N26Error> {
        debug!("Fetching cards");
        self.get_json("/api/v2/cards", Vec::new()).await
    }

    pub async fn limits(&self) -> Result<Vec<Limit>, N26Error> {
        debug!("Fetching account limits");
        self.get_json("/api/settings/account/limits", Vec::new())
            .await
    }

    pub async fn contacts(&self) -> Result<Vec<Contact>, N26Error> {
        debug!("Fetching contacts");
        self.get_json("/api/smrt/contacts", Vec::new()).await
    }

    /// Fetch transactions, newest first. The date filter is applied only
    /// when *both* bounds are set; a partial range means "no filter".
    pub async fn transactions(
        &self,
        from: Timestamp,
        to: Timestamp,
        limit: Option<u32>,
    ) -> Result<Vec<Transaction>, N26Error> {
        let mut query = date_range_query(from, to);
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        debug!("Fetching transactions");
        self.get_json("/api/smrt/transactions", query).await
    }

    pub async fn statements(&self) -> Result<Vec<Statement>, N26Error> {
        debug!("Fetching statement list");
        self.get_json("/api/statements", Vec::new()).await
    }

    /// Stream a statement PDF to the consumer.
    pub async fn statement_pdf<F>(&self, statement_id: &str, consumer: F) -> Result<(), N26Error>
    where
        F: FnMut(&[u8]) -> Result<(), N26Error>,
    {
        if statement_id.is_empty() {
            return Err(N26Error::InvalidParameter("statement id must not be empty"));
        }
        debug!("Downloading statement {statement_id}");
        let path = format!("/api/statements/{statement_id}");
        self.stream_into(&path, consumer).await
    }

    /// Stream the CSV transaction report for the given range. Unlike the
    /// transaction listing, the report embeds the bounds in the path and
    /// therefore requires both.
    pub async fn smart_statement_csv<F>(
        &self,
        from: Timestamp,
        to: Timestamp,
        consumer: F,
    ) -> Result<(), N26Error>
    where
        F: FnMut(&[u8]) -> Result<(), N26Error>,
    {
        let (Some(from), Some(to)) = (from.as_millis(), to.as_millis()) else {
            return Err(N26Error::InvalidParameter(
                "smart statement report needs both range bounds",
            ));
        };
        debug!("Downloading smart statement report for {from}..{to}");
        let path = format!("/api/smrt/reports/{from}/{to}/statements");
        self.stream_into(&path, consumer).await
    }

    pub async fn spaces(&self) -> Result<Spaces, N26Error> {
        debug!("Fetching spaces");
        self.get_json("/api/spaces", Vec::new()).await
    }

    pub async fn block_card(&self, card_id: &str) -> Result<(), N26Error> {
        if card_id.is_empty() {
            return Err(N26Error::InvalidParameter("card id must not be empty"));
        }
        info!("Blocking card {card_id}");
        self.post_void(&format!("/api/cards/{card_id}/block")).await
    }

    pub async fn unblock_card(&self, card_id: &str) -> Result<(), N26Error> {
        if card_id.is_empty() {
            return Err(N26Error::InvalidParameter("card id must not be empty"));
        }
        info!("Unblocking card {card_id}");
        self.post_void(&format!("/api/cards/{card_id}/unblock"))
            .await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Vec<(&'static str, String)>,
    ) -> Result<ApiResponse<T::Body>, N26Error> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            query,
            headers: vec![(
                "Authorization",
                format!("bearer {}", self.token.access_token),
            )],
            body: RequestBody::Empty,
        };
        self.transport.execute(request).await
    }

    async fn get_json<D: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(&'static str, String)>,
    ) -> Result<D, N26Error> {
        let response = self.execute(Method::GET, path, query).await?;
        if !response.status.is_success() {
            return Err(N26Error::Status(response.status));
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|_| N26Error::InvalidResponse)
    }

    async fn post_void(&self, path: &str) -> Result<(), N26Error> {
        let response = self.execute(Method::POST, path, Vec::new()).await?;
        if !response.status.is_success() {
            return Err(N26Error::Status(response.status));
        }
        Ok(())
    }

    /// Drive the body to completion through the consumer. The body (and with
    /// it the connection) is released on every exit path, including a
    /// consumer failure mid-stream.
    async fn stream_into<F>(&self, path: &str, mut consumer: F) -> Result<(), N26Error>
    where
        F: FnMut(&[u8]) -> Result<(), N26Error>,
    {
        let response = self.execute(Method::GET, path, Vec::new()).await?;
        if !response.status.is_success() {
            return Err(N26Error::Status(response.status));
        }
        let mut body = response.body;
        while let Some(chunk) = body.chunk().await? {
            consumer(&chunk)?;
        }
        Ok(())
    }
}

fn date_range_query(from: Timestamp, to: Timestamp) -> Vec<(&'static str, String)> {
    match (from.as_millis(), to.as_millis()) {
        (Some(from), Some(to)) => vec![("from", from.to_string()), ("to", to.to_string())],
        _ => Vec::new(),
    }
}
