use crate::error::N26Error;
use bytes::Bytes;
use log::{debug, info};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

const API_URL: &str = "https://api.tech26.de";

/// A single outbound call. Query parameters and headers are attached only
/// when present; the body variant decides the content type.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub headers: Vec<(&'static str, String)>,
    pub body: RequestBody,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Form(Vec<(&'static str, String)>),
    Json(Value),
}

#[derive(Debug)]
pub struct ApiResponse<B> {
    pub status: StatusCode,
    pub body: B,
}

impl<B: ResponseBody> ApiResponse<B> {
    /// Drain the body into a buffer.
    pub async fn bytes(self) -> Result<Vec<u8>, N26Error> {
        let mut body = self.body;
        let mut out = Vec::new();
        while let Some(chunk) = body.chunk().await? {
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }
}

/// The open body of an in-flight response. Dropping the value releases the
/// underlying connection.
#[allow(async_fn_in_trait)]
pub trait ResponseBody {
    async fn chunk(&mut self) -> Result<Option<Bytes>, N26Error>;
}

/// The HTTP seam. The production implementation is [`HttpTransport`]; tests
/// substitute a scripted fake.
#[allow(async_fn_in_trait)]
pub trait Transport {
    type Body: ResponseBody;

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse<Self::Body>, N26Error>;
}

impl<T: Transport> Transport for &T {
    type Body = T::Body;

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse<Self::Body>, N26Error> {
        (**self).execute(request).await
    }
}

/// Reqwest-backed transport against the fixed API origin.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
    base_url: String,
}

impl HttpTransport {
    pub fn new() -> Result<Self, N26Error> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        info!("Initialized N26 API transport with default base URL");
        Ok(Self {
            http,
            base_url: API_URL.to_string(),
        })
    }

    /// Override the base URL (useful for tests or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        info!("Updated N26 API base URL to {}", self.base_url);
        self
    }
}

impl Transport for HttpTransport {
    type Body = HttpResponseBody;

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse<Self::Body>, N26Error> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!("{} {}", request.method, url);

        let mut builder = self.http.request(request.method, url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Json(value) => builder.json(&value),
        };

        let response = builder.send().await?;
        debug!("Received status {}", response.status());
        Ok(ApiResponse {
            status: response.status(),
            body: HttpResponseBody(response),
        })
    }
}

#[derive(Debug)]
pub struct HttpResponseBody(reqwest::Response);

impl ResponseBody for HttpResponseBody {
    async fn chunk(&mut self) -> Result<Option<Bytes>, N26Error> {
        self.0.chunk().await.map_err(N26Error::from)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    pub(crate) struct CannedResponse {
        status: StatusCode,
        chunks: Vec<Bytes>,
    }

    impl CannedResponse {
        pub(crate) fn new(status: u16, body: &str) -> Self {
            let chunks = if body.is_empty() {
                Vec::new()
            } else {
                vec![Bytes::copy_from_slice(body.as_bytes())]
            };
            Self {
                status: StatusCode::from_u16(status).expect("valid status code"),
                chunks,
            }
        }

        pub(crate) fn chunked(status: u16, chunks: &[&[u8]]) -> Self {
            Self {
                status: StatusCode::from_u16(status).expect("valid status code"),
                chunks: chunks.iter().map(|c| Bytes::copy_from_slice(c)).collect(),
            }
        }
    }

    /// Scripted transport: hands out canned responses in order, records every
    /// request, and tracks whether each handed-out body has been dropped.
    pub(crate) struct FakeTransport {
        responses: RefCell<VecDeque<CannedResponse>>,
        requests: RefCell<Vec<ApiRequest>>,
        releases: RefCell<Vec<Rc<Cell<bool>>>>,
    }

    impl FakeTransport {
        pub(crate) fn new(responses: Vec<CannedResponse>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requests: RefCell::new(Vec::new()),
                releases: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn requests(&self) -> Vec<ApiRequest> {
            self.requests.borrow().clone()
        }

        pub(crate) fn call_count(&self) -> usize {
            self.requests.borrow().len()
        }

        pub(crate) fn body_released(&self, index: usize) -> bool {
            self.releases.borrow()[index].get()
        }
    }

    pub(crate) struct FakeBody {
        chunks: VecDeque<Bytes>,
        released: Rc<Cell<bool>>,
    }

    impl ResponseBody for FakeBody {
        async fn chunk(&mut self) -> Result<Option<Bytes>, N26Error> {
            Ok(self.chunks.pop_front())
        }
    }

    impl Drop for FakeBody {
        fn drop(&mut self) {
            self.released.set(true);
        }
    }

    impl Transport for FakeTransport {
        type Body = FakeBody;

        async fn execute(&self, request: ApiRequest) -> Result<ApiResponse<Self::Body>, N26Error> {
            self.requests.borrow_mut().push(request);
            let canned = self
                .responses
                .borrow_mut()
                .pop_front()
                .expect("transport script exhausted");
            let released = Rc::new(Cell::new(false));
            self.releases.borrow_mut().push(Rc::clone(&released));
            Ok(ApiResponse {
                status: canned.status,
                body: FakeBody {
                    chunks: canned.chunks.into(),
                    released,
                },
            })
        }
    }
}
