use std::sync::Arc;

use jiff::Timestamp;
use url::Url;

mod builder;
pub use self::builder::{DEFAULT_ENDPOINT, DEFAULT_VERSION, MwsClientBuilder};

mod args;
pub use self::args::{Argument, CallArgs};

mod auth;
pub use self::auth::{Credentials, QueryStringSigner, RequestSigner, SecureString};

mod convert;
pub use self::convert::{from_wire, to_wire};

mod operation;
pub use self::operation::{
    OperationSpec, ParamSpec, Registry, ResultConverter, ResultShape, TypeTag,
};

mod request;
pub use self::request::BuiltRequest;

mod transport;
pub use self::transport::{HttpTransport, ReqwestTransport, WireResponse};

mod response;
pub use self::response::ServiceError;

mod value;
pub use self::value::Value;

mod xml;
pub use self::xml::Element;

mod error;
pub use self::error::MwsError;


/// Client for the marketplace web service.
///
/// Holds the endpoint, the immutable operation [`Registry`], the transport,
/// and the request signer. One invocation is one outbound HTTP request and
/// one parsed response; every step blocks the calling thread. The registry
/// is read-only after construction, so a client can be cloned cheaply and
/// shared across threads.
///
/// # Example
///
/// ```rust,no_run
/// use mws_core::{Credentials, MwsClient};
///
/// # fn main() -> Result<(), mws_core::MwsError> {
/// let client = MwsClient::builder()
///     .with_credentials(Credentials::new("AKID...", "secret", "SELLER123"))
///     .build()?;
///
/// let info = client.submit_feed("<feed/>", "_POST_PRODUCT_DATA_", Some(false))?;
/// println!("status: {:?}", info.get("FeedProcessingStatus"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MwsClient {
    endpoint: Url,
    registry: Arc<Registry>,
    transport: Arc<dyn HttpTransport>,
    signer: Arc<dyn RequestSigner>,
}

impl MwsClient {
    /// Starts building a client.
    pub fn builder() -> MwsClientBuilder {
        MwsClientBuilder::default()
    }

    /// The registered operation surface.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Invokes a registered operation by name with the given arguments.
    ///
    /// Runs the full pipeline: build and sign the request, dispatch it,
    /// validate transport success and content integrity, decode the
    /// response, and convert the result subtree.
    ///
    /// # Errors
    ///
    /// See [`MwsError`]; every failure stops the invocation, and no retries
    /// are performed.
    pub fn call(&self, action: &str, args: CallArgs) -> Result<Value, MwsError> {
        let spec = self
            .registry
            .get(action)
            .ok_or_else(|| MwsError::UnknownOperation {
                action: action.to_string(),
            })?;
        let request = request::build_request(spec, &args, &self.endpoint, self.signer.as_ref())?;
        let response = transport::dispatch(self.transport.as_ref(), &request)?;
        response::decode(spec, response.body)
    }
}

// Typed entry points over the generic pipeline, one per standard operation.
impl MwsClient {
    /// Submits a feed document for processing.
    ///
    /// The feed content becomes the POST body, with its `Content-MD5`
    /// integrity header. Returns the `FeedSubmissionInfo` record.
    pub fn submit_feed(
        &self,
        feed_content: impl Into<String>,
        feed_type: impl Into<String>,
        purge_and_replace: Option<bool>,
    ) -> Result<Value, MwsError> {
        let mut args = CallArgs::new()
            .with("FeedContent", feed_content.into())
            .with("FeedType", feed_type.into());
        if let Some(purge) = purge_and_replace {
            args = args.with("PurgeAndReplace", purge);
        }
        self.call("SubmitFeed", args)
    }

    /// Lists feed submissions matching the given filters
    /// (`FeedSubmissionIdList`, `MaxCount`, `FeedTypeList`,
    /// `FeedProcessingStatusList`, `SubmittedFromDate`, `SubmittedToDate`).
    pub fn get_feed_submission_list(&self, filters: CallArgs) -> Result<Value, MwsError> {
        self.call("GetFeedSubmissionList", filters)
    }

    /// Continues a feed submission listing from a continuation token.
    pub fn get_feed_submission_list_by_next_token(
        &self,
        next_token: impl Into<String>,
    ) -> Result<Value, MwsError> {
        self.call(
            "GetFeedSubmissionListByNextToken",
            CallArgs::new().with("NextToken", next_token.into()),
        )
    }

    /// Counts feed submissions matching the given filters. Returns the bare
    /// count.
    pub fn get_feed_submission_count(&self, filters: CallArgs) -> Result<Value, MwsError> {
        self.call("GetFeedSubmissionCount", filters)
    }

    /// Cancels feed submissions matching the given filters.
    pub fn cancel_feed_submissions(&self, filters: CallArgs) -> Result<Value, MwsError> {
        self.call("CancelFeedSubmissions", filters)
    }

    /// Fetches a feed submission's processing report as the raw response
    /// body.
    ///
    /// The body is not parsed and not checked for service-level errors; the
    /// caller must inspect it.
    pub fn get_feed_submission_result(
        &self,
        feed_submission_id: impl Into<String>,
    ) -> Result<String, MwsError> {
        let value = self.call(
            "GetFeedSubmissionResult",
            CallArgs::new().with("FeedSubmissionId", feed_submission_id.into()),
        )?;
        match value {
            Value::Text(body) => Ok(body),
            other => Err(MwsError::Decode {
                message: format!("raw operation produced a non-text value: {other:?}"),
            }),
        }
    }

    /// Requests generation of a report, optionally bounded by a date range.
    /// Returns the `ReportRequestInfo` record.
    pub fn request_report(
        &self,
        report_type: impl Into<String>,
        start_date: Option<Timestamp>,
        end_date: Option<Timestamp>,
    ) -> Result<Value, MwsError> {
        let mut args = CallArgs::new().with("ReportType", report_type.into());
        if let Some(start) = start_date {
            args = args.with("StartDate", start);
        }
        if let Some(end) = end_date {
            args = args.with("EndDate", end);
        }
        self.call("RequestReport", args)
    }
}
