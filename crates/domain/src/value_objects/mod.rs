pub mod sentiment_tally;
pub mod volatility_zone;

pub use sentiment_tally::SentimentTally;
pub use volatility_zone::VolatilityZone;
