use crate::config::ConfigResult;

/// Serialize a parse outcome to a pretty-printed JSON string.
pub fn to_pretty_json(result: &ConfigResult) -> String {
    serde_json::to_string_pretty(result).expect("ConfigResult serialization cannot fail")
}
