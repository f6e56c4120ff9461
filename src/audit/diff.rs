//! Top-level field diffs for audit entries

use serde_json::Value;

const MAX_STRING_CHARS: usize = 40;

/// Describe the top-level fields that changed between two snapshots
///
/// `updatedAt` is skipped since it changes on every update.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before), Value::Object(after)) = (before, after) else {
        return (before != after).then(|| format!("{} -> {}", short(before), short(after)));
    };

    let mut changes = Vec::new();
    for (key, old) in before {
        if key == "updatedAt" {
            continue;
        }
        match after.get(key) {
            Some(new) if new != old => {
                changes.push(format!("{}: {} -> {}", key, short(old), short(new)))
            }
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", key, short(old))),
        }
    }
    for (key, new) in after {
        if !before.contains_key(key) {
            changes.push(format!("{}: (added) -> {}", key, short(new)));
        }
    }

    (!changes.is_empty()).then(|| changes.join(", "))
}

fn short(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > MAX_STRING_CHARS => {
            let head: String = s.chars().take(MAX_STRING_CHARS - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}
