use indexmap::IndexMap;
use jiff::Timestamp;

/// A caller-supplied argument value in its native representation.
///
/// Conversion to the wire form happens in the request builder, driven by the
/// parameter's declared type tag; the argument itself carries no wire
/// knowledge. List arguments are kept as plain strings because the
/// structured-list wire convention passes elements through unconverted.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// A string (plain, enumeration, or body content).
    Text(String),
    /// A boolean.
    Bool(bool),
    /// A non-negative integer.
    UInt(u64),
    /// An instant in time.
    Timestamp(Timestamp),
    /// An ordered sequence for a structured-list parameter.
    List(Vec<String>),
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for Argument {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<Timestamp> for Argument {
    fn from(value: Timestamp) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Vec<String>> for Argument {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for Argument {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Named arguments for one operation invocation.
///
/// Transient: built by the caller, consumed by one call, never mutated by
/// the pipeline.
///
/// # Example
///
/// ```rust
/// use mws_core::CallArgs;
///
/// let args = CallArgs::new()
///     .with("FeedType", "_POST_PRODUCT_DATA_")
///     .with("PurgeAndReplace", false);
/// assert!(args.get("FeedType").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    values: IndexMap<String, Argument>,
}

impl CallArgs {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument, replacing any previous value under the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Argument>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Looks up an argument by parameter name.
    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.values.get(name)
    }

    /// Whether no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_the_matching_variant() {
        assert_eq!(Argument::from("x"), Argument::Text("x".to_string()));
        assert_eq!(Argument::from(true), Argument::Bool(true));
        assert_eq!(Argument::from(5_u64), Argument::UInt(5));
        assert_eq!(
            Argument::from(vec!["a", "b"]),
            Argument::List(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn later_values_replace_earlier_ones() {
        let args = CallArgs::new().with("MaxCount", 1_u64).with("MaxCount", 2_u64);
        assert_eq!(args.get("MaxCount"), Some(&Argument::UInt(2)));
    }
}
