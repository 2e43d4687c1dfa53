use std::path::PathBuf;

use crate::cli::{EncodeArgs, FieldKind, InspectArgs, OutputFormat};

/// Resolved options shared by the `inspect` and `encode` commands.
#[derive(Clone, Debug)]
pub struct InspectConfig {
    /// Input file; `None` reads stdin.
    pub input: Option<PathBuf>,
    /// Keys to look up, in output order.
    pub fields: Vec<String>,
    pub kind: FieldKind,
    pub format: OutputFormat,
    /// When `true`, `encode` skips absent fields instead of writing `null`.
    pub omit_absent: bool,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            input: None,
            fields: Vec::new(),
            kind: FieldKind::Any,
            format: OutputFormat::Text,
            omit_absent: false,
        }
    }
}

impl InspectConfig {
    pub fn for_inspect(args: InspectArgs, format: OutputFormat) -> Self {
        Self {
            input: args.input,
            fields: args.fields,
            kind: args.kind,
            format,
            ..Default::default()
        }
    }

    pub fn for_encode(args: EncodeArgs, format: OutputFormat) -> Self {
        Self {
            input: args.input,
            fields: args.fields,
            kind: args.kind,
            format,
            omit_absent: args.omit_absent,
        }
    }
}
