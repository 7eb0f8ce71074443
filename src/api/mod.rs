pub mod client;
pub mod error;
pub mod history;
pub mod types;

pub use client::ApiClient;
pub use error::FetchError;
pub use history::{HistoryCache, HistoryEntry};
pub use types::{HistoryPoint, ResortsResponse};
