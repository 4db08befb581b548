//! value helpers
//!
//! Evaluated expressions are plain [serde_json::Value] trees. Some intrinsics need a string out
//! of them though (joining, substitution) and CloudFormation only converts scalars:
//! - strings are used as-is
//! - numbers and booleans are printed
//! - `null` becomes the empty string
//! - arrays and objects can't be converted
use serde_json::Value;

pub fn to_cfn_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Short description of the json type, for error messages
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An index given as number or numeric string
pub fn to_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn scalars_convert() {
        assert_eq!(to_cfn_string(&json!("a")).as_deref(), Some("a"));
        assert_eq!(to_cfn_string(&json!(42)).as_deref(), Some("42"));
        assert_eq!(to_cfn_string(&json!(true)).as_deref(), Some("true"));
        assert_eq!(to_cfn_string(&json!(null)).as_deref(), Some(""));
    }

    #[test]
    fn containers_do_not_convert() {
        assert_eq!(to_cfn_string(&json!(["a"])), None);
        assert_eq!(to_cfn_string(&json!({"a": 1})), None);
    }

    #[test]
    fn indices() {
        assert_eq!(to_index(&json!(2)), Some(2));
        assert_eq!(to_index(&json!("1")), Some(1));
        assert_eq!(to_index(&json!(-1)), None);
        assert_eq!(to_index(&json!("one")), None);
    }
}
