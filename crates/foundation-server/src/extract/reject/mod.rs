//! Body and query extractors with descriptive rejections.

mod enhanced_json;
mod enhanced_query;
mod validated_json;

pub use self::enhanced_json::Json;
pub use self::enhanced_query::Query;
pub use self::validated_json::ValidateJson;

/// Keeps the first lines of a deserializer message, capped in length.
fn sanitize_error_message(message: &str) -> String {
    let lines = message.lines().take(3).collect::<Vec<_>>();
    lines.join(" ").chars().take(200).collect()
}
