use super::request::BuiltRequest;
use super::response::ServiceError;
use super::transport::WireResponse;
use super::xml::Element;

/// Errors surfaced by the client pipeline.
///
/// Every variant stops the invocation: the pipeline performs no retries and
/// no local recovery. Retry and backoff policy belongs to the caller.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum MwsError {
    /// A required parameter was omitted from the call arguments.
    ///
    /// Raised by the request builder before any network I/O.
    #[display("missing required argument: {name}")]
    #[from(skip)]
    MissingArgument {
        /// Name of the required parameter that was absent.
        name: String,
    },

    /// The requested operation name is not registered.
    #[display("unknown operation: {action}")]
    #[from(skip)]
    UnknownOperation {
        /// The operation name that was looked up.
        action: String,
    },

    /// An operation spec was rejected at registration time.
    ///
    /// Occurs for duplicate registrations and for specs declaring more than
    /// one HTTP-BODY parameter.
    #[display("invalid operation spec for {action}: {message}")]
    #[from(skip)]
    InvalidOperationSpec {
        /// The operation the spec was registered under.
        action: String,
        /// Why the spec was rejected.
        message: String,
    },

    /// The HTTP exchange itself failed: network error, timeout, or a
    /// non-success status code.
    ///
    /// Carries the outgoing request and, when one was received, the response,
    /// for diagnostics.
    #[display("transport failure: {message}")]
    #[from(skip)]
    Transport {
        /// The request that was being sent.
        request: Box<BuiltRequest>,
        /// The response, if the exchange got that far.
        response: Option<WireResponse>,
        /// Description of the failure.
        message: String,
    },

    /// The response carried a `Content-MD5` header that does not match the
    /// received body.
    ///
    /// Raised before any parsing is attempted.
    #[display("response integrity failure: header Content-MD5 {declared}, computed {computed}")]
    #[from(skip)]
    BadChecksum {
        /// The digest declared by the response header.
        declared: String,
        /// The digest recomputed over the received body.
        computed: String,
        /// The response that failed the check.
        response: WireResponse,
    },

    /// The service accepted the HTTP exchange but reported one or more
    /// application-level errors.
    #[display("service error: {errors:?}")]
    #[from(skip)]
    Response {
        /// The service error entries, normalized to an ordered sequence.
        errors: Vec<ServiceError>,
        /// The full parsed response document.
        document: Element,
    },

    /// A wire value could not be converted to or from its native type.
    #[display("conversion failed for {type_tag}: {message}")]
    #[from(skip)]
    Conversion {
        /// The type tag the conversion was attempted under.
        type_tag: &'static str,
        /// Why the conversion failed.
        message: String,
    },

    /// The response body is not well-formed XML.
    #[display("malformed XML response: {message}")]
    #[from(skip)]
    Xml {
        /// Parser diagnostic.
        message: String,
    },

    /// The parsed response does not have the expected envelope shape.
    #[display("unexpected response shape: {message}")]
    #[from(skip)]
    Decode {
        /// What was expected and what was found.
        message: String,
    },

    /// Request signing failed.
    #[display("signature computation failed: {message}")]
    #[from(skip)]
    Signature {
        /// Description of the failure.
        message: String,
    },

    /// HTTP client error from the underlying reqwest library, outside of a
    /// dispatched exchange (for example while constructing the client).
    ReqwestError(reqwest::Error),

    /// URL parsing error when constructing the endpoint or request URL.
    UrlError(url::ParseError),

    /// A computed header value contained invalid characters.
    InvalidHeaderValue(http::header::InvalidHeaderValue),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<MwsError>();
        assert_sync::<MwsError>();
    }

    #[test]
    fn display_names_the_missing_parameter() {
        let err = MwsError::MissingArgument {
            name: "FeedType".to_string(),
        };
        assert_eq!(err.to_string(), "missing required argument: FeedType");
    }
}
