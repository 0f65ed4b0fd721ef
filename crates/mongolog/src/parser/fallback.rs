use super::model::{FieldValue, RESERVED_KEYS};

/// Match a `key:value` token against the generic field shapes.
///
/// - `key:<digits>` → integer
/// - `key:<text without ':'>` → string
///
/// Keys are ASCII letters and `_`. Keys owned by the record itself are
/// rejected so a stray token can never overwrite them.
///
/// The whole value must fit a shape, not just a prefix of it: `reslen:12abc`
/// is the string `12abc` (not the integer `12`), and `host:127.0.0.1:27017`
/// matches nothing (not the integer `127`).
pub fn match_field(token: &str) -> Option<(&str, FieldValue)> {
    let (key, value) = token.split_once(':')?;

    if !is_key(key) || RESERVED_KEYS.contains(&key) || value.is_empty() {
        return None;
    }

    if value.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = value.parse::<i64>() {
            return Some((key, FieldValue::Int(n)));
        }
    }

    if value.contains(':') {
        return None;
    }

    Some((key, FieldValue::Str(value.to_string())))
}

fn is_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_alphabetic() || b == b'_')
}
