//! JSON overlay used to hydrate partial backend documents onto defaults.

use serde_json::Value;

/// Merge `patch` into `base`.
///
/// Objects merge key by key, recursively. Arrays and scalars replace.
/// `null` in the patch leaves the base value untouched.
pub fn overlay(base: &mut Value, patch: Value) {
    match (base, patch) {
        (_, Value::Null) => {}
        (Value::Object(dst), Value::Object(src)) => {
            for (key, value) in src {
                match dst.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None if value.is_null() => {}
                    None => {
                        dst.insert(key, value);
                    }
                }
            }
        }
        (dst, value) => *dst = value,
    }
}
