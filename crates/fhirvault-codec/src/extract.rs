//! Shared field-extraction helpers.
//!
//! Codecs pull flat scalars out of nested document structures with these
//! helpers. All of them tolerate missing or malformed substructures by
//! returning `None` — absent optional data leaves an indexed column unset,
//! never fails a write.

use serde_json::Value;

/// Extracts a top-level scalar field, stringifying booleans and numbers.
#[must_use]
pub fn scalar(document: &Value, field: &str) -> Option<String> {
    match document.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extracts the first coding code from a codeable element.
///
/// The element may be a `CodeableConcept` (`{"coding": [...]}`), a bare
/// `Coding` (`{"system": ..., "code": ...}`), or an array of either. With a
/// `system` filter, only codings from that system qualify; without one, the
/// first coding carrying a code wins.
#[must_use]
pub fn coding_code(document: &Value, element: &str, system: Option<&str>) -> Option<String> {
    for candidate in as_slice(document.get(element)?) {
        let codings = match candidate.get("coding").and_then(Value::as_array) {
            Some(codings) => codings.as_slice(),
            None => std::slice::from_ref(candidate),
        };
        for coding in codings {
            if let Some(want) = system
                && coding.get("system").and_then(Value::as_str) != Some(want)
            {
                continue;
            }
            if let Some(code) = coding.get("code").and_then(Value::as_str) {
                return Some(code.to_string());
            }
        }
    }
    None
}

/// Recovers the target id from a reference element.
///
/// Matches the `Type/id` reference-string pattern and returns the trailing
/// id segment; a bare id reference is returned as-is. The element may be a
/// single reference object or an array of them (first wins).
#[must_use]
pub fn reference_id(document: &Value, element: &str) -> Option<String> {
    for candidate in as_slice(document.get(element)?) {
        if let Some(reference) = candidate.get("reference").and_then(Value::as_str) {
            let id = reference.rsplit('/').next().unwrap_or(reference);
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
    }
    None
}

/// Extracts the first identifier value, optionally filtered by `system` URI.
#[must_use]
pub fn identifier_value(document: &Value, system: Option<&str>) -> Option<String> {
    let identifiers = document.get("identifier")?;
    for identifier in as_slice(identifiers) {
        if let Some(want) = system
            && identifier.get("system").and_then(Value::as_str) != Some(want)
        {
            continue;
        }
        if let Some(value) = identifier.get("value").and_then(Value::as_str) {
            return Some(value.to_string());
        }
    }
    None
}

/// Views a value as a slice: arrays as-is, anything else as one element.
fn as_slice(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    }
}
