use crate::enums::{Impact, Sentiment};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Human-readable explanation of a market move, shown in the driver feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub sentiment: Sentiment,
    /// Creation time, UNIX seconds.
    pub created_at: i64,
    /// Label frozen at creation time.
    pub timestamp_label: String,
    pub tags: Vec<String>,
    pub impact: Impact,
}

impl FeedEntry {
    /// Creates an entry stamped at `created_at` with a fresh id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        sentiment: Sentiment,
        impact: Impact,
        tags: Vec<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            sentiment,
            created_at,
            timestamp_label: age_label(0),
            tags,
            impact,
        }
    }

    /// Relative label for this entry as seen at `now`.
    #[must_use]
    pub fn age_label(&self, now: i64) -> String {
        age_label(now - self.created_at)
    }
}

fn age_label(elapsed_secs: i64) -> String {
    match elapsed_secs {
        s if s < 60 => "Just now".to_string(),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3600),
        s => format!("{}d ago", s / 86_400),
    }
}
