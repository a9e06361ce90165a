//! Type conversion between wire strings and native values.
//!
//! Conversions are driven by the parameter or field's [`TypeTag`] and fail
//! deterministically on malformed or out-of-range input; nothing is silently
//! coerced or defaulted.

use jiff::Timestamp;

use super::args::Argument;
use super::error::MwsError;
use super::operation::TypeTag;
use super::value::Value;

/// Converts a native argument to its wire string form.
///
/// Structured-list tags have no scalar wire form; list elements are encoded
/// by the request builder without conversion.
///
/// # Errors
///
/// Returns [`MwsError::Conversion`] when the argument's native type does not
/// match the tag.
pub fn to_wire(tag: TypeTag, value: &Argument) -> Result<String, MwsError> {
    match (tag, value) {
        (TypeTag::Str | TypeTag::Enumeration | TypeTag::HttpBody, Argument::Text(text)) => {
            Ok(text.clone())
        }
        (TypeTag::Bool, Argument::Bool(flag)) => {
            Ok(if *flag { "true" } else { "false" }.to_string())
        }
        (TypeTag::NonNegativeInteger, Argument::UInt(number)) => Ok(number.to_string()),
        (TypeTag::Datetime, Argument::Timestamp(instant)) => Ok(instant.to_string()),
        (TypeTag::List(_), _) => Err(MwsError::Conversion {
            type_tag: tag.name(),
            message: "structured lists have no scalar wire form".to_string(),
        }),
        (_, other) => Err(MwsError::Conversion {
            type_tag: tag.name(),
            message: format!("incompatible native value {other:?}"),
        }),
    }
}

/// Converts a wire string to its native value form.
///
/// # Errors
///
/// Returns [`MwsError::Conversion`] on malformed or out-of-range input.
pub fn from_wire(tag: TypeTag, wire: &str) -> Result<Value, MwsError> {
    match tag {
        TypeTag::Str | TypeTag::Enumeration | TypeTag::HttpBody => {
            Ok(Value::Text(wire.to_string()))
        }
        TypeTag::Bool => match wire {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            other => Err(MwsError::Conversion {
                type_tag: tag.name(),
                message: format!("invalid boolean: {other}"),
            }),
        },
        TypeTag::NonNegativeInteger => {
            wire.parse::<u64>().map(Value::UInt).map_err(|err| {
                MwsError::Conversion {
                    type_tag: tag.name(),
                    message: format!("invalid integer {wire}: {err}"),
                }
            })
        }
        TypeTag::Datetime => wire
            .parse::<Timestamp>()
            .map(Value::Timestamp)
            .map_err(|err| MwsError::Conversion {
                type_tag: tag.name(),
                message: format!("invalid datetime {wire}: {err}"),
            }),
        TypeTag::List(_) => Err(MwsError::Conversion {
            type_tag: tag.name(),
            message: "structured lists have no scalar wire form".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(true, "true")]
    #[case(false, "false")]
    fn boolean_round_trips(#[case] native: bool, #[case] wire: &str) {
        let encoded = to_wire(TypeTag::Bool, &Argument::Bool(native)).unwrap();
        assert_eq!(encoded, wire);
        assert_eq!(from_wire(TypeTag::Bool, &encoded).unwrap(), Value::Bool(native));
    }

    #[test]
    fn datetime_round_trips() {
        let instant: Timestamp = "2024-03-01T12:30:00Z".parse().unwrap();
        let encoded = to_wire(TypeTag::Datetime, &Argument::Timestamp(instant)).unwrap();
        assert_eq!(
            from_wire(TypeTag::Datetime, &encoded).unwrap(),
            Value::Timestamp(instant)
        );
    }

    #[rstest]
    #[case(TypeTag::Bool, "TRUE")]
    #[case(TypeTag::Bool, "1")]
    #[case(TypeTag::NonNegativeInteger, "-3")]
    #[case(TypeTag::NonNegativeInteger, "ten")]
    #[case(TypeTag::Datetime, "yesterday")]
    fn malformed_wire_values_are_rejected(#[case] tag: TypeTag, #[case] wire: &str) {
        assert!(matches!(
            from_wire(tag, wire),
            Err(MwsError::Conversion { .. })
        ));
    }

    #[test]
    fn mismatched_native_type_is_rejected() {
        let err = to_wire(TypeTag::Bool, &Argument::Text("true".to_string())).unwrap_err();
        assert!(matches!(err, MwsError::Conversion { type_tag: "boolean", .. }));
    }

    #[test]
    fn body_values_pass_through_unchanged() {
        let encoded = to_wire(TypeTag::HttpBody, &Argument::Text("<xml/>".to_string())).unwrap();
        assert_eq!(encoded, "<xml/>");
    }
}
