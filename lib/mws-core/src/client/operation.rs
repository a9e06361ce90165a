//! Declarative operation specs and the registry that compiles them.
//!
//! Operations are data: a name, an ordered parameter table, and a result
//! shape. One generic pipeline (request builder, dispatcher, decoder)
//! interprets the spec looked up in the [`Registry`]; adding an operation
//! means adding one table entry and, when the result is XML, one converter
//! function.

use indexmap::IndexMap;
use tracing::debug;

use super::convert::from_wire;
use super::error::MwsError;
use super::value::Value;
use super::xml::Element;

/// Symbolic name identifying how a value converts to and from its wire
/// string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// Plain string, passed through verbatim.
    Str,
    /// Boolean, encoded as `true`/`false`.
    Bool,
    /// Unsigned integer.
    NonNegativeInteger,
    /// Instant in time, encoded as an RFC 3339 timestamp.
    Datetime,
    /// Closed string vocabulary; encoded verbatim like [`TypeTag::Str`].
    Enumeration,
    /// The single parameter whose value becomes the request body instead of
    /// a query field.
    HttpBody,
    /// Structured list: elements are encoded as positionally-indexed query
    /// keys `<ParamName>.<ElementType>.<N>` (1-based). The payload names the
    /// element type used in the key pattern.
    List(&'static str),
}

impl TypeTag {
    /// Stable name used in conversion diagnostics.
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Bool => "boolean",
            Self::NonNegativeInteger => "nonNegativeInteger",
            Self::Datetime => "datetime",
            Self::Enumeration => "enumeration",
            Self::HttpBody => "HTTP-BODY",
            Self::List(_) => "list",
        }
    }

    pub(crate) fn is_body(self) -> bool {
        matches!(self, Self::HttpBody)
    }
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    /// Parameter name as it appears on the wire (and in [`CallArgs`]).
    ///
    /// [`CallArgs`]: super::args::CallArgs
    pub name: &'static str,
    /// How the argument converts to its wire form.
    pub tag: TypeTag,
    /// Whether omitting the argument fails the invocation.
    pub required: bool,
}

/// Converts one operation's result subtree into its final value.
pub type ResultConverter = fn(&Element) -> Result<Value, MwsError>;

/// How an operation's response body becomes its result.
#[derive(Debug, Clone, Copy)]
pub enum ResultShape {
    /// Return the raw response body unchanged. The body is not parsed and is
    /// not checked for service-level errors; that is the caller's job.
    Raw,
    /// Parse the XML envelope, unwrap the result subtree, and convert it.
    Converted(ResultConverter),
}

/// Immutable description of one remote operation.
///
/// Created once at registration and never mutated; the [`Registry`] owns all
/// specs for the lifetime of the client.
#[derive(Debug, Clone)]
pub struct OperationSpec {
    /// The `Action` name sent with every request.
    pub action: &'static str,
    /// Declared parameters, in encoding order.
    pub params: &'static [ParamSpec],
    /// How the response body becomes the result.
    pub result: ResultShape,
}

/// The set of invocable operations, fixed after construction.
///
/// Reads are lock-free and safe to share across threads; registration
/// happens once while building the client.
#[derive(Debug, Default)]
pub struct Registry {
    specs: IndexMap<&'static str, OperationSpec>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the standard operation table.
    ///
    /// # Errors
    ///
    /// Propagates [`MwsError::InvalidOperationSpec`]; the standard table is
    /// valid, so this only fails if the table itself is edited incorrectly.
    pub fn standard() -> Result<Self, MwsError> {
        let mut registry = Self::new();
        for spec in standard_operations() {
            registry.register(spec)?;
        }
        Ok(registry)
    }

    /// Registers an operation spec under its action name.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::InvalidOperationSpec`] when the action is already
    /// registered or when the spec declares more than one HTTP-BODY
    /// parameter.
    pub fn register(&mut self, spec: OperationSpec) -> Result<(), MwsError> {
        let body_params = spec.params.iter().filter(|param| param.tag.is_body()).count();
        if body_params > 1 {
            return Err(MwsError::InvalidOperationSpec {
                action: spec.action.to_string(),
                message: format!("declares {body_params} HTTP-BODY parameters, at most one is allowed"),
            });
        }
        if self.specs.contains_key(spec.action) {
            return Err(MwsError::InvalidOperationSpec {
                action: spec.action.to_string(),
                message: "already registered".to_string(),
            });
        }
        debug!(action = spec.action, "registering operation");
        self.specs.insert(spec.action, spec);
        Ok(())
    }

    /// Looks up the spec registered under an action name.
    pub fn get(&self, action: &str) -> Option<&OperationSpec> {
        self.specs.get(action)
    }

    /// Registered action names, in registration order.
    pub fn actions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.keys().copied()
    }
}

// ---------------------------------------------------------------------------
// Standard operation table
// ---------------------------------------------------------------------------

const SUBMIT_FEED_PARAMS: &[ParamSpec] = &[
    ParamSpec { name: "FeedContent", tag: TypeTag::HttpBody, required: true },
    ParamSpec { name: "FeedType", tag: TypeTag::Str, required: true },
    ParamSpec { name: "PurgeAndReplace", tag: TypeTag::Bool, required: false },
];

const GET_FEED_SUBMISSION_LIST_PARAMS: &[ParamSpec] = &[
    ParamSpec { name: "FeedSubmissionIdList", tag: TypeTag::List("Id"), required: false },
    ParamSpec { name: "MaxCount", tag: TypeTag::NonNegativeInteger, required: false },
    ParamSpec { name: "FeedTypeList", tag: TypeTag::List("Type"), required: false },
    ParamSpec { name: "FeedProcessingStatusList", tag: TypeTag::List("Status"), required: false },
    ParamSpec { name: "SubmittedFromDate", tag: TypeTag::Datetime, required: false },
    ParamSpec { name: "SubmittedToDate", tag: TypeTag::Datetime, required: false },
];

const GET_FEED_SUBMISSION_LIST_BY_NEXT_TOKEN_PARAMS: &[ParamSpec] =
    &[ParamSpec { name: "NextToken", tag: TypeTag::Str, required: true }];

const GET_FEED_SUBMISSION_COUNT_PARAMS: &[ParamSpec] = &[
    ParamSpec { name: "FeedTypeList", tag: TypeTag::List("Type"), required: false },
    ParamSpec { name: "FeedProcessingStatusList", tag: TypeTag::List("Status"), required: false },
    ParamSpec { name: "SubmittedFromDate", tag: TypeTag::Datetime, required: false },
    ParamSpec { name: "SubmittedToDate", tag: TypeTag::Datetime, required: false },
];

const CANCEL_FEED_SUBMISSIONS_PARAMS: &[ParamSpec] = &[
    ParamSpec { name: "FeedSubmissionIdList", tag: TypeTag::List("Id"), required: false },
    ParamSpec { name: "FeedTypeList", tag: TypeTag::List("Type"), required: false },
    ParamSpec { name: "SubmittedFromDate", tag: TypeTag::Datetime, required: false },
    ParamSpec { name: "SubmittedToDate", tag: TypeTag::Datetime, required: false },
];

const GET_FEED_SUBMISSION_RESULT_PARAMS: &[ParamSpec] =
    &[ParamSpec { name: "FeedSubmissionId", tag: TypeTag::Str, required: true }];

const REQUEST_REPORT_PARAMS: &[ParamSpec] = &[
    ParamSpec { name: "ReportType", tag: TypeTag::Str, required: true },
    ParamSpec { name: "StartDate", tag: TypeTag::Datetime, required: false },
    ParamSpec { name: "EndDate", tag: TypeTag::Datetime, required: false },
];

/// The operation table shipped with the client.
pub(crate) fn standard_operations() -> Vec<OperationSpec> {
    vec![
        OperationSpec {
            action: "SubmitFeed",
            params: SUBMIT_FEED_PARAMS,
            result: ResultShape::Converted(submit_feed_result),
        },
        OperationSpec {
            action: "GetFeedSubmissionList",
            params: GET_FEED_SUBMISSION_LIST_PARAMS,
            result: ResultShape::Converted(feed_submission_list_result),
        },
        OperationSpec {
            action: "GetFeedSubmissionListByNextToken",
            params: GET_FEED_SUBMISSION_LIST_BY_NEXT_TOKEN_PARAMS,
            result: ResultShape::Converted(feed_submission_list_result),
        },
        OperationSpec {
            action: "GetFeedSubmissionCount",
            params: GET_FEED_SUBMISSION_COUNT_PARAMS,
            result: ResultShape::Converted(count_result),
        },
        OperationSpec {
            action: "CancelFeedSubmissions",
            params: CANCEL_FEED_SUBMISSIONS_PARAMS,
            result: ResultShape::Converted(cancel_feed_submissions_result),
        },
        OperationSpec {
            action: "GetFeedSubmissionResult",
            params: GET_FEED_SUBMISSION_RESULT_PARAMS,
            result: ResultShape::Raw,
        },
        OperationSpec {
            action: "RequestReport",
            params: REQUEST_REPORT_PARAMS,
            result: ResultShape::Converted(report_request_result),
        },
    ]
}

// ---------------------------------------------------------------------------
// Result converters
// ---------------------------------------------------------------------------

const FEED_SUBMISSION_INFO_FIELDS: &[(&str, TypeTag)] = &[
    ("FeedSubmissionId", TypeTag::Str),
    ("FeedType", TypeTag::Str),
    ("SubmittedDate", TypeTag::Datetime),
    ("FeedProcessingStatus", TypeTag::Str),
    ("StartedProcessingDate", TypeTag::Datetime),
    ("CompletedProcessingDate", TypeTag::Datetime),
];

const REPORT_REQUEST_INFO_FIELDS: &[(&str, TypeTag)] = &[
    ("ReportRequestId", TypeTag::Str),
    ("ReportType", TypeTag::Str),
    ("StartDate", TypeTag::Datetime),
    ("EndDate", TypeTag::Datetime),
    ("Scheduled", TypeTag::Bool),
    ("SubmittedDate", TypeTag::Datetime),
    ("ReportProcessingStatus", TypeTag::Str),
];

/// Converts the scalar fields of an element into a record, skipping absent
/// fields and failing on malformed ones.
fn scalar_record(element: &Element, fields: &[(&str, TypeTag)]) -> Result<Value, MwsError> {
    let mut record = IndexMap::new();
    for (name, tag) in fields {
        if let Some(text) = element.text_of(name) {
            record.insert((*name).to_string(), from_wire(*tag, text)?);
        }
    }
    Ok(Value::Record(record))
}

fn submit_feed_result(result: &Element) -> Result<Value, MwsError> {
    let info = result.child("FeedSubmissionInfo").ok_or_else(|| MwsError::Decode {
        message: "SubmitFeedResult is missing FeedSubmissionInfo".to_string(),
    })?;
    scalar_record(info, FEED_SUBMISSION_INFO_FIELDS)
}

fn feed_submission_list_result(result: &Element) -> Result<Value, MwsError> {
    let mut record = IndexMap::new();
    if let Some(text) = result.text_of("HasToken") {
        record.insert("HasToken".to_string(), from_wire(TypeTag::Bool, text)?);
    }
    if let Some(text) = result.text_of("NextToken") {
        record.insert("NextToken".to_string(), from_wire(TypeTag::Str, text)?);
    }
    record.insert(
        "FeedSubmissionInfoList".to_string(),
        feed_submission_infos(result)?,
    );
    Ok(Value::Record(record))
}

fn cancel_feed_submissions_result(result: &Element) -> Result<Value, MwsError> {
    let mut record = IndexMap::new();
    if let Some(text) = result.text_of("Count") {
        record.insert("Count".to_string(), from_wire(TypeTag::NonNegativeInteger, text)?);
    }
    record.insert(
        "FeedSubmissionInfoList".to_string(),
        feed_submission_infos(result)?,
    );
    Ok(Value::Record(record))
}

fn feed_submission_infos(result: &Element) -> Result<Value, MwsError> {
    let infos = result
        .children_named("FeedSubmissionInfo")
        .map(|info| scalar_record(info, FEED_SUBMISSION_INFO_FIELDS))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::List(infos))
}

// Returns the bare count, not a wrapping record.
fn count_result(result: &Element) -> Result<Value, MwsError> {
    let text = result.text_of("Count").ok_or_else(|| MwsError::Decode {
        message: "GetFeedSubmissionCountResult is missing Count".to_string(),
    })?;
    from_wire(TypeTag::NonNegativeInteger, text)
}

fn report_request_result(result: &Element) -> Result<Value, MwsError> {
    let info = result.child("ReportRequestInfo").ok_or_else(|| MwsError::Decode {
        message: "RequestReportResult is missing ReportRequestInfo".to_string(),
    })?;
    scalar_record(info, REPORT_REQUEST_INFO_FIELDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_exposes_the_full_operation_surface() {
        let registry = Registry::standard().unwrap();
        let actions: Vec<_> = registry.actions().collect();
        assert_eq!(
            actions,
            vec![
                "SubmitFeed",
                "GetFeedSubmissionList",
                "GetFeedSubmissionListByNextToken",
                "GetFeedSubmissionCount",
                "CancelFeedSubmissions",
                "GetFeedSubmissionResult",
                "RequestReport",
            ]
        );
        assert!(registry.get("DeleteEverything").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = Registry::standard().unwrap();
        let err = registry
            .register(OperationSpec {
                action: "SubmitFeed",
                params: &[],
                result: ResultShape::Raw,
            })
            .unwrap_err();
        assert!(matches!(err, MwsError::InvalidOperationSpec { .. }));
    }

    #[test]
    fn specs_with_two_body_parameters_are_rejected() {
        const TWO_BODIES: &[ParamSpec] = &[
            ParamSpec { name: "First", tag: TypeTag::HttpBody, required: true },
            ParamSpec { name: "Second", tag: TypeTag::HttpBody, required: true },
        ];
        let mut registry = Registry::new();
        let err = registry
            .register(OperationSpec {
                action: "DoubleBody",
                params: TWO_BODIES,
                result: ResultShape::Raw,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            MwsError::InvalidOperationSpec { action, .. } if action == "DoubleBody"
        ));
    }

    #[test]
    fn count_converter_returns_the_bare_number() {
        let result = Element::parse("<GetFeedSubmissionCountResult><Count>12</Count></GetFeedSubmissionCountResult>").unwrap();
        assert_eq!(count_result(&result).unwrap(), Value::UInt(12));
    }

    #[test]
    fn single_submission_info_becomes_a_one_element_list() {
        let result = Element::parse(
            "<GetFeedSubmissionListResult>\
               <HasToken>false</HasToken>\
               <FeedSubmissionInfo>\
                 <FeedSubmissionId>2291326430</FeedSubmissionId>\
                 <FeedType>_POST_PRODUCT_DATA_</FeedType>\
                 <SubmittedDate>2024-03-01T12:30:00Z</SubmittedDate>\
                 <FeedProcessingStatus>_SUBMITTED_</FeedProcessingStatus>\
               </FeedSubmissionInfo>\
             </GetFeedSubmissionListResult>",
        )
        .unwrap();

        let value = feed_submission_list_result(&result).unwrap();
        assert_eq!(value.get("HasToken"), Some(&Value::Bool(false)));
        let infos = value.get("FeedSubmissionInfoList").and_then(Value::as_list).unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(
            infos[0].get("FeedSubmissionId").and_then(Value::as_str),
            Some("2291326430")
        );
        assert!(infos[0].get("SubmittedDate").and_then(Value::as_timestamp).is_some());
    }

    #[test]
    fn malformed_scalar_field_propagates_a_conversion_failure() {
        let result = Element::parse(
            "<SubmitFeedResult><FeedSubmissionInfo>\
               <SubmittedDate>not-a-date</SubmittedDate>\
             </FeedSubmissionInfo></SubmitFeedResult>",
        )
        .unwrap();
        assert!(matches!(
            submit_feed_result(&result),
            Err(MwsError::Conversion { .. })
        ));
    }
}
