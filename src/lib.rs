pub mod clustering;
pub mod config;
pub mod loader;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod reports;
pub mod survivorship;
pub mod utils;
