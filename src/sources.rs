use crate::normalize::coerce_count;
use serde_json::Value;
use tracing::warn;

/// The one source name that gets its own bucket.
pub const TELEGRAM_KEY: &str = "telegram";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCategory {
    Telegram,
    OnlineMedia,
}

/// Publication counts split into Telegram and everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceBreakdown {
    pub telegram: u64,
    pub online_media: u64,
}

impl SourceBreakdown {
    pub fn from_payload(payload: &Value) -> Self {
        let mut breakdown = Self::default();
        match payload {
            Value::Object(map) => {
                for (source, count) in map {
                    breakdown.add(source, coerce_count(count));
                }
            }
            Value::Null => {}
            other => warn!(payload = %other, "sources payload is not an object"),
        }
        breakdown
    }

    pub fn add(&mut self, source: &str, count: u64) {
        let bucket = if source == TELEGRAM_KEY {
            &mut self.telegram
        } else {
            &mut self.online_media
        };
        *bucket = bucket.saturating_add(count);
    }

    pub fn total(&self) -> u64 {
        self.telegram.saturating_add(self.online_media)
    }

    /// Categories by count, largest first; Telegram wins ties.
    pub fn ranked(&self) -> Vec<(SourceCategory, u64)> {
        let mut ranked = vec![
            (SourceCategory::Telegram, self.telegram),
            (SourceCategory::OnlineMedia, self.online_media),
        ];
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Share of the total as a label fragment: `42.5`, or `0` when empty.
    pub fn share_label(&self, count: u64) -> String {
        let total = self.total();
        if total == 0 {
            return "0".to_string();
        }
        // Half-up on exact ties: 1/16 is 6.3, not 6.2.
        let (count, total) = (u128::from(count), u128::from(total));
        let tenths = (count * 2000 + total) / (2 * total);
        format!("{}.{}", tenths / 10, tenths % 10)
    }
}
