pub mod audio;
pub mod batch;
pub mod config;
pub mod discover;
pub mod engine;
pub mod error;
pub mod models;
pub mod normalize;
pub mod output;
