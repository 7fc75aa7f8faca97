//! HTTP transport used by the API client

use std::time::Duration;

use chronicle_core::error::RemoteError;
use reqwest::blocking::Client;
use reqwest::header::LINK;
use tracing::debug;

use crate::Result;

/// HTTP method subset used by the review API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Returns the method name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A fully-formed API request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Option<serde_json::Value>,
}

/// The parts of a response the client needs
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw `Link` header, if any
    pub link: Option<String>,
    /// Response body text
    pub body: String,
}

impl ApiResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests and returns responses without interpreting them.
///
/// Non-2xx responses are returned as `Ok`; only failures to obtain a
/// response at all are errors.
pub trait HttpTransport: Send + Sync {
    /// Send one request
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// Blocking reqwest-backed transport
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        debug!("API request: {} {}", request.method.as_str(), request.url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let link = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response
            .text()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(ApiResponse { status, link, body })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport that replays canned responses and records requests

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    pub struct RecordingTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        pub requests: Mutex<Vec<ApiRequest>>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn push(&self, status: u16, body: serde_json::Value, link: Option<&str>) {
            self.responses.lock().unwrap().push_back(ApiResponse {
                status,
                link: link.map(|s| s.to_string()),
                body: body.to_string(),
            });
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn count(&self, method: Method) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.method == method)
                .count()
        }
    }

    impl HttpTransport for RecordingTransport {
        fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| RemoteError::Transport("no canned response".to_string()))
        }
    }

    impl HttpTransport for std::sync::Arc<RecordingTransport> {
        fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
            self.as_ref().send(request)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success() {
        let ok = ApiResponse {
            status: 201,
            link: None,
            body: String::new(),
        };
        let not_found = ApiResponse {
            status: 404,
            ..ok.clone()
        };
        assert!(ok.is_success());
        assert!(!not_found.is_success());
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
    }
}
