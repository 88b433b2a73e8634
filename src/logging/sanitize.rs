//! Redaction and truncation of payloads before they are logged.
//!
//! Only ever applied to the copy of a payload destined for a log record —
//! the data sent on the wire is untouched.

use serde_json::Value;

/// Replacement for values under sensitive keys.
pub const REDACTION_MARKER: &str = "[HIDDEN]";

/// Strings longer than this are truncated (base64 blobs, embeddings, ...).
const MAX_STRING_CHARS: usize = 1000;

/// How much of an oversized string survives.
const TRUNCATED_PREFIX_CHARS: usize = 100;

/// Map keys whose values are redacted, compared case-insensitively.
const SENSITIVE_KEYS: [&str; 5] = ["password", "api_key", "token", "secret", "auth"];

/// Sanitize an arbitrary nested value for logging: redact sensitive map keys,
/// truncate oversized strings, recurse into maps and arrays. Pure and
/// idempotent.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, val) in map {
                if is_sensitive_key(key) {
                    out.insert(key.clone(), Value::String(REDACTION_MARKER.to_string()));
                } else {
                    out.insert(key.clone(), sanitize(val));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Value::String(s) => Value::String(truncate_oversized(s)),
        other => other.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    SENSITIVE_KEYS.contains(&lowered.as_str())
}

fn truncate_oversized(s: &str) -> String {
    let char_count = s.chars().count();
    if char_count <= MAX_STRING_CHARS {
        return s.to_string();
    }
    let prefix: String = s.chars().take(TRUNCATED_PREFIX_CHARS).collect();
    format!("{prefix}... [truncated {char_count} chars]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_sensitive_keys_case_insensitively() {
        let input = json!({
            "API_Key": "secret123",
            "Password": "hunter2",
            "model": "qwen3-0.6b",
        });
        let out = sanitize(&input);
        assert_eq!(out["API_Key"], REDACTION_MARKER);
        assert_eq!(out["Password"], REDACTION_MARKER);
        assert_eq!(out["model"], "qwen3-0.6b");
    }

    #[test]
    fn redacts_regardless_of_value_type() {
        let input = json!({ "token": { "nested": "object" } });
        let out = sanitize(&input);
        assert_eq!(out["token"], REDACTION_MARKER);
    }

    #[test]
    fn redacts_inside_nested_structures() {
        let input = json!({
            "requests": [
                { "auth": "Bearer abc", "path": "/v1/models" },
            ],
        });
        let out = sanitize(&input);
        assert_eq!(out["requests"][0]["auth"], REDACTION_MARKER);
        assert_eq!(out["requests"][0]["path"], "/v1/models");
    }

    #[test]
    fn truncates_oversized_strings() {
        let long = "x".repeat(1500);
        let out = sanitize(&json!({ "data": long }));
        let text = out["data"].as_str().unwrap();
        assert!(text.starts_with(&"x".repeat(100)));
        assert!(text.ends_with("... [truncated 1500 chars]"));
    }

    #[test]
    fn leaves_strings_at_or_under_the_limit() {
        let borderline = "y".repeat(999);
        let exact = "z".repeat(1000);
        let out = sanitize(&json!({ "a": borderline.clone(), "b": exact.clone() }));
        assert_eq!(out["a"], borderline.as_str());
        assert_eq!(out["b"], exact.as_str());
    }

    #[test]
    fn preserves_array_order_and_length() {
        let input = json!([3, "one", null, true, 2.5]);
        assert_eq!(sanitize(&input), input);
    }

    #[test]
    fn passes_non_string_scalars_through() {
        let input = json!({ "count": 42, "ratio": 0.5, "flag": false, "nothing": null });
        assert_eq!(sanitize(&input), input);
    }

    #[test]
    fn is_idempotent() {
        let input = json!({
            "api_key": "abc",
            "blob": "w".repeat(5000),
            "nested": { "secret": [1, 2, 3], "list": ["a", "b"] },
        });
        let once = sanitize(&input);
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }
}
