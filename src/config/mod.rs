pub mod file;
pub mod secrets;

pub use file::RaterConfig;
pub use secrets::Secrets;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "rate")]
#[command(about = "Rates chatbot responses in Notion with an OpenAI model")]
pub struct CliConfig {
    /// Path to an optional TOML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the model from the config file
    #[arg(long)]
    pub model: Option<String>,

    /// Fetch and report what would be rated without calling the model
    /// or writing anything back
    #[arg(long)]
    pub dry_run: bool,

    /// Enable process resource monitoring
    #[arg(long)]
    pub monitor: bool,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,
}
