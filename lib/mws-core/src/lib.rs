//! Client binding for the marketplace web service's query/XML protocol.
//!
//! Operations are described declaratively, as a name, an ordered parameter
//! table, and a result shape, and interpreted by one generic pipeline:
//!
//! 1. **Request building**: arguments are validated against the spec,
//!    scalars are converted to their wire form, structured lists become
//!    positionally-indexed query keys (`Name.ElementType.N`), and an
//!    HTTP-BODY parameter turns the request into a POST with a
//!    `Content-MD5` integrity header. The `Action` field and signing
//!    material are always attached.
//! 2. **Dispatch**: the request goes out over a blocking HTTP transport;
//!    non-success statuses and response-integrity mismatches fail before
//!    any parsing.
//! 3. **Decoding**: the XML envelope is parsed, service-level error
//!    envelopes are surfaced as [`MwsError::Response`] with a normalized
//!    error sequence, and the `<Action>Response` → `<Action>Result` subtree
//!    is handed to the operation's converter.
//!
//! Failures are never retried or recovered locally; retry policy belongs to
//! the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use mws_core::{CallArgs, Credentials, MwsClient, Value};
//!
//! # fn main() -> Result<(), mws_core::MwsError> {
//! let client = MwsClient::builder()
//!     .with_credentials(Credentials::new("AKID...", "secret", "SELLER123"))
//!     .build()?;
//!
//! // Typed entry point.
//! let info = client.submit_feed("<feed/>", "_POST_PRODUCT_DATA_", None)?;
//! println!("submitted: {:?}", info.get("FeedSubmissionId"));
//!
//! // Or the generic one.
//! let count = client.call(
//!     "GetFeedSubmissionCount",
//!     CallArgs::new().with("FeedTypeList", vec!["_POST_PRODUCT_DATA_"]),
//! )?;
//! assert!(matches!(count, Value::UInt(_)));
//! # Ok(())
//! # }
//! ```

mod client;

pub use client::{
    Argument, BuiltRequest, CallArgs, Credentials, DEFAULT_ENDPOINT, DEFAULT_VERSION, Element,
    HttpTransport, MwsClient, MwsClientBuilder, MwsError, OperationSpec, ParamSpec,
    QueryStringSigner, Registry, ReqwestTransport, RequestSigner, ResultConverter, ResultShape,
    SecureString, ServiceError, TypeTag, Value, WireResponse, from_wire, to_wire,
};
