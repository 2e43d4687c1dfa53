use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tristate",
    about = "Tell absent, null and concrete JSON fields apart",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Value type the named fields are decoded as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FieldKind {
    Bool,
    Float,
    Int,
    String,
    Time,
    #[default]
    Any,
}

#[derive(Subcommand)]
pub enum Command {
    /// Report whether each field is absent, null, or holds a value
    Inspect(InspectArgs),
    /// Re-encode the named fields as a JSON object
    Encode(EncodeArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    /// JSON object to read (stdin when omitted)
    pub input: Option<PathBuf>,
    #[arg(short, long = "field", required = true)]
    pub fields: Vec<String>,
    #[arg(short, long, default_value = "any")]
    pub kind: FieldKind,
}

#[derive(Args)]
pub struct EncodeArgs {
    /// JSON object to read (stdin when omitted)
    pub input: Option<PathBuf>,
    #[arg(short, long = "field", required = true)]
    pub fields: Vec<String>,
    #[arg(short, long, default_value = "any")]
    pub kind: FieldKind,
    /// Leave absent fields out instead of writing them as null
    #[arg(long)]
    pub omit_absent: bool,
}
