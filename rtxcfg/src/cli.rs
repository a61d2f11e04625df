use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "rtxcfg")]
#[command(about = "Parse and synthesize Yamaha RTX router CLI configuration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Parse a config dump into typed records.
    Parse(ParseArgs),
    /// Synthesize the CLI commands that recreate a parsed dump.
    Commands(CommandsArgs),
    /// Validate every domain of one config dump.
    Verify(VerifyArgs),
    /// List known router models.
    Models(ModelsArgs),
}

#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Config dump file (`show config` output).
    pub file: PathBuf,
    /// Router model the dump came from.
    #[arg(long)]
    pub model: String,
    /// Restrict to one domain (for example dhcp_scope); default is all.
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct CommandsArgs {
    /// Config dump file (`show config` output).
    pub file: PathBuf,
    /// Router model the dump came from.
    #[arg(long)]
    pub model: String,
    /// Restrict to one domain; default is all.
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Config dump file to verify.
    pub file: PathBuf,
    /// Router model the dump came from.
    #[arg(long)]
    pub model: String,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Optional model-table directory (expects <dir>/models.toml).
    #[arg(long)]
    pub models_dir: Option<PathBuf>,
    /// Show data source metadata.
    #[arg(short, long)]
    pub verbose: bool,
    /// Treat warnings as failures.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct ModelsArgs {
    /// Show support for one domain instead of the full model list.
    #[arg(long)]
    pub domain: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Optional model-table directory (expects <dir>/models.toml).
    #[arg(long)]
    pub models_dir: Option<PathBuf>,
    /// Show data source metadata.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
