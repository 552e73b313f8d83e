// Adapters layer: concrete implementations for the external services the
// pipeline talks to.

pub mod notion;
pub mod openai;

pub use notion::NotionStore;
pub use openai::OpenAiRater;
