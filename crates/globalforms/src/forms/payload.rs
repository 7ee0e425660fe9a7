//! Wire payload normalization.
//!
//! Browser forms post camelCase keys, stringly-typed booleans, and multipart
//! text parts. Everything here turns those into the snake_case JSON shape the
//! typed form structs deserialize from.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Name stored when neither a given nor a family name was supplied.
pub const UNKNOWN_STUDENT: &str = "Unknown";

/// Convert a camelCase key to snake_case.
///
/// A run of capitals is one word, and digits stay attached to the word
/// before them:
///
/// ```
/// use globalforms::forms::payload::to_snake_case;
///
/// assert_eq!(to_snake_case("desiredOPTStartDate"), "desired_opt_start_date");
/// assert_eq!(to_snake_case("photo2x2"), "photo2x2");
/// assert_eq!(to_snake_case("ucf_id"), "ucf_id");
/// ```
#[must_use]
pub fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }

    out
}

/// Rewrite every object key in `value` to snake_case, recursing through
/// nested objects and arrays. Values are left alone.
#[must_use]
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_snake_case(&k), normalize_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Drop `null` entries from every object so serde defaults apply to them.
#[must_use]
pub fn drop_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, drop_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(drop_nulls).collect()),
        other => other,
    }
}

/// Lift a `{ "form_data": { ... } }` envelope into a flat object.
///
/// Some clients wrap the fields in `form_data` next to `student_name`,
/// `student_id` and `program`. Inner fields win over envelope fields.
#[must_use]
pub fn unwrap_envelope(mut map: Map<String, Value>) -> Map<String, Value> {
    match map.remove("form_data") {
        Some(Value::Object(inner)) => {
            for (k, v) in inner {
                map.insert(k, v);
            }
            map
        }
        Some(other) => {
            map.insert("form_data".to_string(), other);
            map
        }
        None => map,
    }
}

/// Interpret a form string as a boolean.
///
/// `true`, `yes`, `1` and `on` (any case) are true; everything else is false.
#[must_use]
pub fn str_to_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "1" | "on"
    )
}

/// Build the stored student name from its parts.
#[must_use]
pub fn student_name(given: &str, family: &str) -> String {
    let full = format!("{} {}", given.trim(), family.trim());
    let full = full.trim();
    if full.is_empty() {
        UNKNOWN_STUDENT.to_string()
    } else {
        full.to_string()
    }
}

/// Turn a multipart text part into a JSON value.
///
/// Text that looks like a JSON array or object and parses as one is kept
/// structured; anything else stays a string.
#[must_use]
pub fn multipart_value(text: &str) -> Value {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(parsed) = serde_json::from_str::<Value>(text) {
            return parsed;
        }
    }
    Value::String(text.to_string())
}

/// Insert a multipart text part, collecting repeated names into an array.
pub fn push_multipart_field(map: &mut Map<String, Value>, name: String, value: Value) {
    match map.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(name, value);
        }
    }
}

/// Render a scalar JSON value as the text a form field would hold.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Deserialize a boolean that may arrive as a string, number, or null.
///
/// # Errors
///
/// Fails on arrays and objects.
pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_flexible_bool(deserializer)?.unwrap_or(false))
}

/// Like [`flexible_bool`] but keeps "not answered" distinct from `false`.
///
/// An empty string counts as unanswered.
///
/// # Errors
///
/// Fails on arrays and objects.
pub fn opt_flexible_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        Value::Number(n) => Ok(Some(n.as_f64().is_some_and(|f| f != 0.0))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(str_to_bool(&s))),
        other => Err(de::Error::invalid_type(
            unexpected(&other),
            &"a boolean or boolean-like string",
        )),
    }
}

/// Deserialize text that may arrive as a number or boolean.
///
/// # Errors
///
/// Fails on arrays and objects.
pub fn flexible_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ (Value::Null | Value::String(_) | Value::Bool(_) | Value::Number(_)) => {
            Ok(value_text(&value))
        }
        other => Err(de::Error::invalid_type(unexpected(&other), &"a string")),
    }
}

/// Deserialize long free text, keeping any JSON value as text.
///
/// Multipart text that looks like JSON comes back structured from
/// [`multipart_value`]. Here it is rendered as compact JSON text again, so a
/// remark such as `[1, 2]` is accepted whichever way it was posted.
///
/// # Errors
///
/// Fails only when the input is not valid JSON.
pub fn free_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(&Value::deserialize(deserializer)?))
}

/// Deserialize a list of strings from an array, a JSON-encoded array, or a
/// single non-empty string.
///
/// # Errors
///
/// Fails when an array element is not a scalar.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ListVisitor;

    impl<'de> Visitor<'de> for ListVisitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a list of strings")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                return Ok(Vec::new());
            }
            if trimmed.starts_with('[') {
                if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
                    return Ok(items);
                }
            }
            Ok(vec![trimmed.to_string()])
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut items = Vec::new();
            while let Some(value) = seq.next_element::<Value>()? {
                match value {
                    Value::Array(_) | Value::Object(_) => {
                        return Err(de::Error::invalid_type(
                            unexpected(&value),
                            &"a string list element",
                        ))
                    }
                    scalar => items.push(value_text(&scalar)),
                }
            }
            Ok(items)
        }
    }

    deserializer.deserialize_any(ListVisitor)
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
        _ => de::Unexpected::Other("scalar"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_snake_case_simple() {
        assert_eq!(to_snake_case("givenName"), "given_name");
        assert_eq!(to_snake_case("ucfId"), "ucf_id");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_to_snake_case_acronyms() {
        assert_eq!(to_snake_case("desiredOPTStartDate"), "desired_opt_start_date");
        assert_eq!(to_snake_case("f1VisaOrUSCISNotice"), "f1_visa_or_uscis_notice");
        assert_eq!(to_snake_case("previousEAD"), "previous_ead");
        assert_eq!(to_snake_case("hasDS160"), "has_ds160");
    }

    #[test]
    fn test_to_snake_case_digits() {
        assert_eq!(to_snake_case("photo2x2"), "photo2x2");
        assert_eq!(to_snake_case("formI765"), "form_i765");
        assert_eq!(to_snake_case("previousI20s"), "previous_i20s");
        assert_eq!(to_snake_case("spring2026Session2"), "spring2026_session2");
        assert_eq!(to_snake_case("address2"), "address2");
    }

    #[test]
    fn test_to_snake_case_does_not_double_underscore() {
        assert_eq!(to_snake_case("us_Address"), "us_address");
    }

    #[test]
    fn test_normalize_keys_recurses() {
        let input = json!({
            "usAddress": {"postalCode": "32816"},
            "dependents": [{"givenName": "Ana", "countryOfBirth": "Peru"}],
            "selections": ["Change of Major"]
        });
        let out = normalize_keys(input);
        assert_eq!(out["us_address"]["postal_code"], "32816");
        assert_eq!(out["dependents"][0]["given_name"], "Ana");
        assert_eq!(out["dependents"][0]["country_of_birth"], "Peru");
        assert_eq!(out["selections"][0], "Change of Major");
    }

    #[test]
    fn test_drop_nulls() {
        let out = drop_nulls(json!({"a": null, "b": {"c": null, "d": 1}}));
        assert!(out.get("a").is_none());
        assert!(out["b"].get("c").is_none());
        assert_eq!(out["b"]["d"], 1);
    }

    #[test]
    fn test_unwrap_envelope() {
        let map = json!({
            "student_name": "Jo Lee",
            "program": "UCF Global Records Release",
            "form_data": {"ucf_id": "1234567", "program": "inner"}
        });
        let Value::Object(map) = map else { unreachable!() };
        let flat = unwrap_envelope(map);
        assert_eq!(flat["ucf_id"], "1234567");
        assert_eq!(flat["student_name"], "Jo Lee");
        assert_eq!(flat["program"], "inner");
        assert!(!flat.contains_key("form_data"));
    }

    #[test]
    fn test_str_to_bool() {
        for yes in ["true", "YES", "1", "on", " True "] {
            assert!(str_to_bool(yes), "{yes}");
        }
        for no in ["false", "no", "0", "", "maybe"] {
            assert!(!str_to_bool(no), "{no}");
        }
    }

    #[test]
    fn test_student_name() {
        assert_eq!(student_name("Ana", "Silva"), "Ana Silva");
        assert_eq!(student_name("Ana", ""), "Ana");
        assert_eq!(student_name(" ", "Silva"), "Silva");
        assert_eq!(student_name("", ""), "Unknown");
    }

    #[test]
    fn test_multipart_value() {
        assert_eq!(multipart_value("[\"a\",\"b\"]"), json!(["a", "b"]));
        assert_eq!(multipart_value("{\"k\": 1}"), json!({"k": 1}));
        assert_eq!(multipart_value("[not json"), json!("[not json"));
        assert_eq!(multipart_value("true"), json!("true"));
    }

    #[test]
    fn test_push_multipart_field_collects_repeats() {
        let mut map = Map::new();
        push_multipart_field(&mut map, "action".into(), json!("Late Drop"));
        push_multipart_field(&mut map, "action".into(), json!("Add Course"));
        push_multipart_field(&mut map, "action".into(), json!("Withdraw"));
        assert_eq!(map["action"], json!(["Late Drop", "Add Course", "Withdraw"]));
    }

    #[derive(Debug, Deserialize, Default)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "flexible_bool")]
        flag: bool,
        #[serde(deserialize_with = "opt_flexible_bool")]
        answer: Option<bool>,
        #[serde(deserialize_with = "flexible_string")]
        year: String,
        #[serde(deserialize_with = "string_list")]
        items: Vec<String>,
        #[serde(deserialize_with = "free_text")]
        remarks: String,
    }

    #[test]
    fn test_flexible_fields_from_strings() {
        let sample: Sample = serde_json::from_value(json!({
            "flag": "on",
            "answer": "no",
            "year": 2026,
            "items": "[\"x\", \"y\"]"
        }))
        .unwrap();
        assert!(sample.flag);
        assert_eq!(sample.answer, Some(false));
        assert_eq!(sample.year, "2026");
        assert_eq!(sample.items, vec!["x", "y"]);
    }

    #[test]
    fn test_flexible_fields_defaults() {
        let sample: Sample = serde_json::from_value(json!({"answer": ""})).unwrap();
        assert!(!sample.flag);
        assert_eq!(sample.answer, None);
        assert!(sample.year.is_empty());
        assert!(sample.items.is_empty());
    }

    #[test]
    fn test_free_text_keeps_json_looking_text() {
        let sample: Sample =
            serde_json::from_value(json!({"remarks": multipart_value("[1, 2]")})).unwrap();
        assert_eq!(sample.remarks, "[1,2]");

        let sample: Sample = serde_json::from_value(json!({"remarks": {"k": "v"}})).unwrap();
        assert_eq!(sample.remarks, r#"{"k":"v"}"#);

        let sample: Sample = serde_json::from_value(json!({"remarks": "plain"})).unwrap();
        assert_eq!(sample.remarks, "plain");
    }

    #[test]
    fn test_flexible_string_still_rejects_lists() {
        let result = serde_json::from_value::<Sample>(json!({"year": [2026]}));
        assert!(result.is_err());
    }

    #[test]
    fn test_string_list_single_value() {
        let sample: Sample = serde_json::from_value(json!({"items": "Late Drop"})).unwrap();
        assert_eq!(sample.items, vec!["Late Drop"]);
    }

    #[test]
    fn test_flexible_bool_rejects_objects() {
        let result = serde_json::from_value::<Sample>(json!({"flag": {"a": 1}}));
        assert!(result.is_err());
    }
}
