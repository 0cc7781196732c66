pub mod chunk_builder;
pub mod chunk_merger;
pub mod chunk_writer;
pub mod config;
pub mod dedup;
pub mod error;
pub mod line_reader;
pub mod memory_budget;
pub mod unique_set;
pub mod workspace;

pub use config::DedupConfig;
pub use dedup::{deduplicate, DedupReport, Deduplicator, Phase};
pub use error::*;
