use serde_json::Value;

use crate::resolution::ResolutionError;

/// Scalar flag types that can be parsed out of PostHog's string payloads.
///
/// The remote API returns every flag value as a string regardless of its
/// logical type, so each supported type declares how to read itself back out
/// of one, plus the name used in mismatch messages.
pub trait ParseFlagValue: Sized {
    const TYPE_NAME: &'static str;

    fn parse_flag_value(raw: &str) -> Option<Self>;
}

impl ParseFlagValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn parse_flag_value(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "1" | "t" | "true" => Some(true),
            "0" | "f" | "false" => Some(false),
            _ => None,
        }
    }
}

impl ParseFlagValue for i64 {
    const TYPE_NAME: &'static str = "int";

    fn parse_flag_value(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl ParseFlagValue for f64 {
    const TYPE_NAME: &'static str = "float";

    fn parse_flag_value(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl ParseFlagValue for String {
    const TYPE_NAME: &'static str = "string";

    fn parse_flag_value(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

/// Coerce a raw reply value into the expected scalar type.
///
/// A non-string reply is itself a mismatch: the backend contract says found
/// values are always strings, so anything else is an API violation surfaced
/// as an error rather than a panic.
pub(crate) fn coerce<T: ParseFlagValue>(raw: &Value) -> Result<T, ResolutionError> {
    let Value::String(s) = raw else {
        return Err(ResolutionError::type_mismatch(format!(
            "{raw} is not a string"
        )));
    };

    T::parse_flag_value(s).ok_or_else(|| {
        ResolutionError::type_mismatch(format!("{s:?} is not a {}", T::TYPE_NAME))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bool_vocabulary() {
        for raw in ["true", "TRUE", "True", "t", "T", "1"] {
            assert_eq!(bool::parse_flag_value(raw), Some(true), "raw: {raw}");
        }
        for raw in ["false", "FALSE", "False", "f", "F", "0"] {
            assert_eq!(bool::parse_flag_value(raw), Some(false), "raw: {raw}");
        }
        assert_eq!(bool::parse_flag_value("yes"), None);
        assert_eq!(bool::parse_flag_value(""), None);
    }

    #[test]
    fn mismatch_messages_are_verbatim() {
        let err = coerce::<bool>(&json!("yes")).unwrap_err();
        assert_eq!(err.message, "\"yes\" is not a boolean");

        let err = coerce::<i64>(&json!("abc")).unwrap_err();
        assert_eq!(err.message, "\"abc\" is not a int");

        let err = coerce::<f64>(&json!("abc")).unwrap_err();
        assert_eq!(err.message, "\"abc\" is not a float");
    }

    #[test]
    fn non_string_reply_is_a_mismatch() {
        let err = coerce::<String>(&json!(3)).unwrap_err();
        assert_eq!(err.message, "3 is not a string");
    }

    #[test]
    fn string_passes_through() {
        let value: String = coerce(&json!("variant-b")).unwrap();
        assert_eq!(value, "variant-b");
    }

    #[test]
    fn int_is_base_10_signed() {
        assert_eq!(i64::parse_flag_value("-42"), Some(-42));
        assert_eq!(i64::parse_flag_value("0x1f"), None);
        assert_eq!(i64::parse_flag_value("1.5"), None);
    }

    #[test]
    fn canonical_format_round_trips() {
        for v in [0i64, 1, -1, i64::MAX, i64::MIN] {
            assert_eq!(i64::parse_flag_value(&v.to_string()), Some(v));
        }
        for v in [0.0f64, 1.25, -3.5, 1e9] {
            assert_eq!(f64::parse_flag_value(&v.to_string()), Some(v));
        }
        for v in [true, false] {
            assert_eq!(bool::parse_flag_value(&v.to_string()), Some(v));
        }
    }
}
