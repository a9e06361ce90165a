use std::fmt;
use std::time::Duration;

use http::HeaderMap;
use tracing::debug;

use super::error::MwsError;
use super::request::{BuiltRequest, CONTENT_MD5, content_md5};

/// Raw response handed back by the transport: status, headers, and body,
/// before any validation or parsing.
#[derive(Debug, Clone)]
pub struct WireResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: String,
}

/// The HTTP exchange itself, as a seam.
///
/// One `send` is one outbound request; no retries, pooling policy, or TLS
/// behavior is specified here. Tests substitute an in-memory implementation.
pub trait HttpTransport: fmt::Debug + Send + Sync {
    /// Performs the exchange and returns the raw response.
    ///
    /// # Errors
    ///
    /// Network failures and timeouts surface as [`MwsError::Transport`] with
    /// no response attached.
    fn send(&self, request: &BuiltRequest) -> Result<WireResponse, MwsError>;
}

/// Blocking transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the client defaults (no timeout).
    ///
    /// # Errors
    ///
    /// Propagates `reqwest` client construction failures.
    pub fn new() -> Result<Self, MwsError> {
        Ok(Self {
            client: reqwest::blocking::Client::builder().build()?,
        })
    }

    /// Creates a transport that aborts exchanges after `timeout`.
    ///
    /// A timeout surfaces as a [`MwsError::Transport`] failure, not a
    /// distinct error kind.
    ///
    /// # Errors
    ///
    /// Propagates `reqwest` client construction failures.
    pub fn with_timeout(timeout: Duration) -> Result<Self, MwsError> {
        Ok(Self {
            client: reqwest::blocking::Client::builder().timeout(timeout).build()?,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &BuiltRequest) -> Result<WireResponse, MwsError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let transport_failure = |message: String| MwsError::Transport {
            request: Box::new(request.clone()),
            response: None,
            message,
        };

        let response = builder.send().map_err(|err| transport_failure(err.to_string()))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .map_err(|err| transport_failure(err.to_string()))?;

        Ok(WireResponse { status, headers, body })
    }
}

/// Sends a built request and validates the exchange.
///
/// Enforces transport success and response integrity before any content is
/// handed to the decoder: a non-success status fails with
/// [`MwsError::Transport`] carrying both sides of the exchange, and a
/// response `Content-MD5` header that does not match the received body fails
/// with [`MwsError::BadChecksum`].
pub(crate) fn dispatch(
    transport: &dyn HttpTransport,
    request: &BuiltRequest,
) -> Result<WireResponse, MwsError> {
    debug!(?request, "sending...");
    let response = transport.send(request)?;
    debug!(status = response.status, "...receiving");

    if !(200..300).contains(&response.status) {
        let message = format!("unexpected status {}", response.status);
        return Err(MwsError::Transport {
            request: Box::new(request.clone()),
            response: Some(response),
            message,
        });
    }

    if let Some(header) = response.headers.get(CONTENT_MD5) {
        let declared = header.to_str().unwrap_or_default().to_string();
        let computed = content_md5(response.body.as_bytes());
        if declared != computed {
            return Err(MwsError::BadChecksum {
                declared,
                computed,
                response,
            });
        }
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use http::{HeaderValue, Method};
    use url::Url;

    use super::*;

    #[derive(Debug)]
    struct CannedTransport(WireResponse);

    impl HttpTransport for CannedTransport {
        fn send(&self, _request: &BuiltRequest) -> Result<WireResponse, MwsError> {
            Ok(self.0.clone())
        }
    }

    fn request() -> BuiltRequest {
        BuiltRequest {
            url: Url::parse("https://mws.example.com/?Action=X").unwrap(),
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    fn response(status: u16, body: &str) -> WireResponse {
        WireResponse {
            status,
            headers: HeaderMap::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn success_status_passes_content_through() {
        let transport = CannedTransport(response(200, "<ok/>"));
        let received = dispatch(&transport, &request()).unwrap();
        assert_eq!(received.body, "<ok/>");
    }

    #[test]
    fn non_success_status_carries_request_and_response() {
        let transport = CannedTransport(response(503, "unavailable"));
        let err = dispatch(&transport, &request()).unwrap_err();
        match err {
            MwsError::Transport { request, response, message } => {
                assert_eq!(request.method, Method::GET);
                assert_eq!(response.unwrap().body, "unavailable");
                assert!(message.contains("503"));
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_response_digest_fails_before_parsing() {
        let mut canned = response(200, "<ok/>");
        canned
            .headers
            .insert(CONTENT_MD5, HeaderValue::from_static("bogus=="));
        let err = dispatch(&CannedTransport(canned), &request()).unwrap_err();
        assert!(matches!(err, MwsError::BadChecksum { declared, .. } if declared == "bogus=="));
    }

    #[test]
    fn matching_response_digest_is_accepted() {
        let mut canned = response(200, "<ok/>");
        let digest = content_md5(b"<ok/>");
        canned
            .headers
            .insert(CONTENT_MD5, HeaderValue::from_str(&digest).unwrap());
        assert!(dispatch(&CannedTransport(canned), &request()).is_ok());
    }
}
