use super::error::MwsError;
use super::operation::{OperationSpec, ResultShape};
use super::value::Value;
use super::xml::Element;

/// One entry from a service-level error envelope.
///
/// Distinct from an HTTP transport failure: the exchange succeeded but the
/// service rejected the request at the application level.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceError {
    /// Error class reported by the service (the `Type` element).
    pub kind: String,
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Decodes a validated response body into the operation's result.
///
/// Raw-shaped operations return the body unchanged and are not checked for
/// service-level errors. Everything else is parsed as XML; an error envelope
/// fails with [`MwsError::Response`] carrying the normalized error sequence,
/// otherwise the `<Action>Response` → `<Action>Result` subtree is handed to
/// the operation's converter.
pub(crate) fn decode(spec: &OperationSpec, body: String) -> Result<Value, MwsError> {
    let converter = match spec.result {
        ResultShape::Raw => return Ok(Value::Text(body)),
        ResultShape::Converted(converter) => converter,
    };

    let document = Element::parse(&body)?;

    let errors = collect_service_errors(&document);
    if !errors.is_empty() {
        return Err(MwsError::Response { errors, document });
    }

    let response_name = format!("{}Response", spec.action);
    let response = if document.name == response_name {
        &document
    } else {
        document.child(&response_name).ok_or_else(|| MwsError::Decode {
            message: format!("expected {response_name} envelope, found {}", document.name),
        })?
    };

    let result_name = format!("{}Result", spec.action);
    let result = response.child(&result_name).ok_or_else(|| MwsError::Decode {
        message: format!("{response_name} is missing {result_name}"),
    })?;

    converter(result)
}

/// Gathers service error entries wherever the envelope places them: the root
/// itself, direct `Error` children, or an `Errors` wrapper. The wire form may
/// carry a single bare element; the result is always an ordered sequence.
fn collect_service_errors(document: &Element) -> Vec<ServiceError> {
    let mut errors = Vec::new();
    if document.name == "Error" {
        errors.push(service_error(document));
    }
    errors.extend(document.children_named("Error").map(service_error));
    if let Some(wrapper) = document.child("Errors") {
        errors.extend(wrapper.children_named("Error").map(service_error));
    }
    errors
}

fn service_error(element: &Element) -> ServiceError {
    ServiceError {
        kind: element.text_of("Type").unwrap_or_default().to_string(),
        code: element.text_of("Code").unwrap_or_default().to_string(),
        message: element.text_of("Message").unwrap_or_default().to_string(),
    }
}
