use crate::entities::FeedEntry;
use crate::enums::Sentiment;
use serde::{Deserialize, Serialize};

/// Bullish / bearish balance across a set of feed entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
    pub bullish: u32,
    pub bearish: u32,
    pub neutral: u32,
}

impl SentimentTally {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a FeedEntry>) -> Self {
        let mut tally = Self::default();
        for entry in entries {
            tally.record(entry.sentiment);
        }
        tally
    }

    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Bullish => self.bullish += 1,
            Sentiment::Bearish => self.bearish += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    /// Rounded share of bullish entries among directional ones.
    ///
    /// Returns 50 when there is nothing directional to weigh.
    #[must_use]
    pub fn bullish_pct(&self) -> u32 {
        let directional = self.bullish + self.bearish;
        if directional == 0 {
            return 50;
        }
        (f64::from(self.bullish) * 100.0 / f64::from(directional)).round() as u32
    }

    #[must_use]
    pub fn bearish_pct(&self) -> u32 {
        100 - self.bullish_pct()
    }
}
