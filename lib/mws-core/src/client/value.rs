use indexmap::IndexMap;
use jiff::Timestamp;

/// A decoded operation result.
///
/// The service returns XML whose shape differs per operation, so results are
/// represented as a dynamic tree: scalars converted to native types, repeated
/// elements as ordered lists, and nested elements as ordered records.
///
/// # Example
///
/// ```rust
/// use mws_core::Value;
///
/// let value = Value::UInt(3);
/// assert_eq!(value.as_u64(), Some(3));
/// assert_eq!(value.as_str(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A plain string (also used for enumeration values and raw bodies).
    Text(String),
    /// A boolean.
    Bool(bool),
    /// A non-negative integer.
    UInt(u64),
    /// An instant in time.
    Timestamp(Timestamp),
    /// An ordered sequence of values.
    List(Vec<Value>),
    /// An ordered mapping of field names to values.
    Record(IndexMap<String, Value>),
}

impl Value {
    /// Returns the string content if this is a [`Value::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer if this is a [`Value::UInt`].
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the timestamp if this is a [`Value::Timestamp`].
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the elements if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a field by name if this is a [`Value::Record`].
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Record(fields) => fields.get(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_only_their_variant() {
        let record = Value::Record(IndexMap::from_iter([(
            "Count".to_string(),
            Value::UInt(7),
        )]));

        assert_eq!(record.get("Count").and_then(Value::as_u64), Some(7));
        assert_eq!(record.get("Missing"), None);
        assert_eq!(record.as_u64(), None);
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Text("x".into()).as_bool(), None);
    }
}
