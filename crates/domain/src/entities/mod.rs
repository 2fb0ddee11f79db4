pub mod candle;
pub mod feed_entry;
pub mod marker;
pub mod symbol;

// Re-export for easier access
pub use candle::Candle;
pub use feed_entry::FeedEntry;
pub use marker::Marker;
pub use symbol::{SymbolCatalog, SymbolProfile};
