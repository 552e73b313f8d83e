pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{NotionStore, OpenAiRater};
pub use config::{RaterConfig, Secrets};
pub use core::{engine::RatingEngine, pipeline::RatingPipeline};
pub use utils::error::{RaterError, Result};
