use serde_json::Value;
use std::sync::Arc;

/// A named, composable predicate over a raw JSON response (§4.1, §9).
///
/// The name is surfaced in the `validation-failed:<name>` error so a
/// misbehaving upstream is diagnosable from logs alone.
#[derive(Clone)]
pub struct Validator {
    name: String,
    check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl Validator {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, value: &Value) -> bool {
        (self.check)(value)
    }
}

/// Passes iff `value` is an object containing every field in `fields`.
pub fn has_fields(fields: &[&str]) -> Validator {
    let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    let name = format!("has_fields({})", fields.join(","));
    Validator {
        name,
        check: Arc::new(move |value| {
            let Some(obj) = value.as_object() else {
                return false;
            };
            fields.iter().all(|f| obj.contains_key(f))
        }),
    }
}

/// Passes iff `value` is an array of at least `min_len` elements.
pub fn is_array(min_len: usize) -> Validator {
    Validator {
        name: format!("is_array(min_len={min_len})"),
        check: Arc::new(move |value| {
            value.as_array().is_some_and(|arr| arr.len() >= min_len)
        }),
    }
}

/// Passes iff every validator in `validators` passes.
pub fn all(validators: Vec<Validator>) -> Validator {
    let name = format!(
        "all({})",
        validators.iter().map(Validator::name).collect::<Vec<_>>().join("+")
    );
    Validator {
        name,
        check: Arc::new(move |value| validators.iter().all(|v| v.check(value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn has_fields_requires_every_named_field() {
        let validator = has_fields(&["a", "b"]);
        assert!(validator.check(&json!({"a": 1, "b": 2, "c": 3})));
        assert!(!validator.check(&json!({"a": 1})));
    }

    #[test]
    fn is_array_enforces_minimum_length() {
        let validator = is_array(2);
        assert!(validator.check(&json!([1, 2])));
        assert!(!validator.check(&json!([1])));
        assert!(!validator.check(&json!({"not": "an array"})));
    }

    #[test]
    fn all_requires_every_validator_to_pass() {
        let validator = all(vec![has_fields(&["a"]), is_array(1)]);
        assert!(!validator.check(&json!({"a": 1})));
    }
}
