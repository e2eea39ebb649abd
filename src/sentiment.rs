use serde_json::Value;

/// Percentages of positive, negative and neutral publications.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub negative: f64,
    pub normal: f64,
}

impl SentimentBreakdown {
    /// Lenient read of a `{positive, negative, normal}` record.
    pub fn from_payload(payload: &Value) -> Self {
        let field = |name: &str| {
            payload
                .get(name)
                .and_then(|value| match value {
                    Value::String(text) => text.trim().parse::<f64>().ok(),
                    other => other.as_f64(),
                })
                .filter(|value| value.is_finite())
                .unwrap_or(0.0)
        };
        Self {
            positive: field("positive"),
            negative: field("negative"),
            normal: field("normal"),
        }
    }
}
