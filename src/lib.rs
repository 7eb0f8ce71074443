pub mod api;
pub mod browser;
pub mod config;
pub mod fetch;
pub mod listing;
pub mod mock;
pub mod output;
pub mod resort;
pub mod scoring;
pub mod summary;
