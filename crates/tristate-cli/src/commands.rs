use std::{fmt, fs, io};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use tracing::debug;
use tristate_types::{Field, FieldError, Presence};

use crate::cli::*;
use crate::config::InspectConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Inspect(args) => cmd_inspect(InspectConfig::for_inspect(args, cli.format)),
        Command::Encode(args) => cmd_encode(InspectConfig::for_encode(args, cli.format)),
    }
}

/// Top-level entries of the input object in document order, each with its
/// raw value bytes. Repeated keys keep every occurrence.
struct RawEntries(Vec<(String, Box<RawValue>)>);

impl RawEntries {
    fn occurrences(&self, name: &str) -> Vec<&RawValue> {
        self.0
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, raw)| &**raw)
            .collect()
    }
}

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawEntries, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry::<String, Box<RawValue>>()? {
                    entries.push(entry);
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Result of running one key through [`Field::decode`].
#[derive(Debug)]
pub enum Outcome {
    Decoded {
        presence: Presence,
        encoded: Box<RawValue>,
    },
    Failed(FieldError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportState {
    Absent,
    Null,
    Value,
    Error,
}

impl From<Presence> for ReportState {
    fn from(presence: Presence) -> Self {
        match presence {
            Presence::Absent => Self::Absent,
            Presence::Null => Self::Null,
            Presence::Value => Self::Value,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub field: String,
    pub state: ReportState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldReport {
    fn new(field: String, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Decoded { presence, encoded } => Self {
                field,
                state: presence.into(),
                value: (presence == Presence::Value).then_some(encoded),
                error: None,
            },
            Outcome::Failed(err) => Self {
                field,
                state: ReportState::Error,
                value: None,
                error: Some(err.to_string()),
            },
        }
    }
}

fn read_input(config: &InspectConfig) -> anyhow::Result<String> {
    match &config.input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => io::read_to_string(io::stdin()).context("reading stdin"),
    }
}

fn raw_json(bytes: Vec<u8>) -> anyhow::Result<Box<RawValue>> {
    let text = String::from_utf8(bytes).context("encoded field is not UTF-8")?;
    RawValue::from_string(text).context("encoded field is not valid JSON")
}

/// Decode one key the way a record decoder would: `decode` runs once per
/// occurrence of the key, so the last occurrence wins and an absent key
/// never reaches `decode`.
fn decode_field<T>(occurrences: &[&RawValue]) -> anyhow::Result<Outcome>
where
    T: Serialize + DeserializeOwned + Default,
{
    let mut field = Field::<T>::default();
    for raw in occurrences {
        if let Err(err) = field.decode(raw.get().as_bytes()) {
            return Ok(Outcome::Failed(err));
        }
    }
    Ok(Outcome::Decoded {
        presence: field.presence(),
        encoded: raw_json(field.encode())?,
    })
}

fn decode_as(kind: FieldKind, raw: &[&RawValue]) -> anyhow::Result<Outcome> {
    match kind {
        FieldKind::Bool => decode_field::<bool>(raw),
        FieldKind::Float => decode_field::<f64>(raw),
        FieldKind::Int => decode_field::<i64>(raw),
        FieldKind::String => decode_field::<String>(raw),
        FieldKind::Time => decode_field::<DateTime<Utc>>(raw),
        FieldKind::Any => decode_field::<serde_json::Value>(raw),
    }
}

/// Decode every configured field of `text`, in the configured order.
pub fn decode_document(
    text: &str,
    config: &InspectConfig,
) -> anyhow::Result<Vec<(String, Outcome)>> {
    let entries: RawEntries =
        serde_json::from_str(text).context("input is not a JSON object")?;
    debug!(keys = entries.0.len(), fields = config.fields.len(), kind = ?config.kind, "decoding document");
    config
        .fields
        .iter()
        .map(|name| {
            let outcome = decode_as(config.kind, &entries.occurrences(name))?;
            if let Outcome::Failed(err) = &outcome {
                debug!(field = %name, error = %err, "field rejected");
            }
            Ok((name.clone(), outcome))
        })
        .collect()
}

pub fn inspect_document(text: &str, config: &InspectConfig) -> anyhow::Result<Vec<FieldReport>> {
    Ok(decode_document(text, config)?
        .into_iter()
        .map(|(name, outcome)| FieldReport::new(name, outcome))
        .collect())
}

/// Re-encode the configured fields as one JSON object. Absent fields are
/// written as `null` unless `omit_absent` is set. Returns the object and the
/// number of fields written.
pub fn encode_document(text: &str, config: &InspectConfig) -> anyhow::Result<(String, usize)> {
    let mut entries = Vec::with_capacity(config.fields.len());
    for (name, outcome) in decode_document(text, config)? {
        match outcome {
            Outcome::Failed(err) => bail!("field {name:?}: {err}"),
            Outcome::Decoded { presence: Presence::Absent, .. } if config.omit_absent => {}
            Outcome::Decoded { encoded, .. } => {
                entries.push(format!("{}:{}", serde_json::to_string(&name)?, encoded.get()));
            }
        }
    }
    Ok((format!("{{{}}}", entries.join(",")), entries.len()))
}

fn cmd_inspect(config: InspectConfig) -> anyhow::Result<()> {
    let text = read_input(&config)?;
    let reports = inspect_document(&text, &config)?;
    match config.format {
        OutputFormat::Text => print_reports(&reports),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    let failed = reports.iter().filter(|r| r.state == ReportState::Error).count();
    if failed > 0 {
        bail!("{failed} field(s) failed to decode");
    }
    Ok(())
}

fn cmd_encode(config: InspectConfig) -> anyhow::Result<()> {
    let text = read_input(&config)?;
    let (encoded, written) = encode_document(&text, &config)?;
    println!("{encoded}");
    if config.format == OutputFormat::Text {
        eprintln!("{} Encoded {written} field(s)", "✓".green());
    }
    Ok(())
}

fn print_reports(reports: &[FieldReport]) {
    let width = reports.iter().map(|r| r.field.len()).max().unwrap_or(0);
    for report in reports {
        let state = match report.state {
            ReportState::Absent => "absent".dimmed(),
            ReportState::Null => "null".yellow(),
            ReportState::Value => "value".green(),
            ReportState::Error => "error".red().bold(),
        };
        let detail = match (&report.value, &report.error) {
            (Some(value), _) => value.get().to_owned(),
            (None, Some(err)) => err.clone(),
            (None, None) => String::new(),
        };
        println!("  {}  {} {}", format!("{:width$}", report.field).bold(), state, detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind: FieldKind, fields: &[&str]) -> InspectConfig {
        InspectConfig {
            kind,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn inspect_reports_all_three_states() {
        let text = r#"{"enabled": true, "archived": null}"#;
        let reports =
            inspect_document(text, &config(FieldKind::Bool, &["enabled", "archived", "deleted"]))
                .unwrap();
        let states: Vec<_> = reports.iter().map(|r| r.state).collect();
        assert_eq!(states, vec![ReportState::Value, ReportState::Null, ReportState::Absent]);
        assert_eq!(reports[0].value.as_ref().map(|v| v.get()), Some("true"));
        assert!(reports[1].value.is_none());
    }

    #[test]
    fn inspect_reports_type_mismatch() {
        let text = r#"{"age": "4.56"}"#;
        let reports = inspect_document(text, &config(FieldKind::Int, &["age"])).unwrap();
        assert_eq!(reports[0].state, ReportState::Error);
        assert!(reports[0].error.as_deref().unwrap().starts_with("cannot decode i64"));
    }

    #[test]
    fn inspect_rejects_object_for_every_kind() {
        let text = r#"{"x": {}}"#;
        for kind in [
            FieldKind::Bool,
            FieldKind::Float,
            FieldKind::Int,
            FieldKind::String,
            FieldKind::Time,
        ] {
            let reports = inspect_document(text, &config(kind, &["x"])).unwrap();
            assert_eq!(reports[0].state, ReportState::Error, "{kind:?}");
        }
    }

    #[test]
    fn inspect_any_accepts_objects() {
        let text = r#"{"meta": {"a": [1, 2]}}"#;
        let reports = inspect_document(text, &config(FieldKind::Any, &["meta"])).unwrap();
        assert_eq!(reports[0].state, ReportState::Value);
        assert_eq!(reports[0].value.as_ref().unwrap().get(), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn report_json_shape() {
        let text = r#"{"name": "ada"}"#;
        let reports = inspect_document(text, &config(FieldKind::String, &["name", "bio"])).unwrap();
        let json = serde_json::to_string(&reports).unwrap();
        assert_eq!(
            json,
            r#"[{"field":"name","state":"value","value":"ada"},{"field":"bio","state":"absent"}]"#
        );
    }

    #[test]
    fn non_object_input_fails() {
        assert!(inspect_document("[1, 2]", &config(FieldKind::Any, &["a"])).is_err());
    }

    #[test]
    fn encode_writes_absent_as_null() {
        let text = r#"{"when": "2024-01-01T02:00:00+02:00", "until": null}"#;
        let (out, written) =
            encode_document(text, &config(FieldKind::Time, &["when", "until", "since"])).unwrap();
        assert_eq!(out, r#"{"when":"2024-01-01T00:00:00Z","until":null,"since":null}"#);
        assert_eq!(written, 3);
    }

    #[test]
    fn encode_can_omit_absent() {
        let text = r#"{"count": 0, "limit": null}"#;
        let mut config = config(FieldKind::Int, &["count", "limit", "offset"]);
        config.omit_absent = true;
        let (out, written) = encode_document(text, &config).unwrap();
        assert_eq!(out, r#"{"count":0,"limit":null}"#);
        assert_eq!(written, 2);
    }

    #[test]
    fn repeated_key_decodes_every_occurrence() {
        let int = config(FieldKind::Int, &["b"]);

        let reports = inspect_document(r#"{"b": 1, "b": 2}"#, &int).unwrap();
        assert_eq!(reports[0].value.as_ref().unwrap().get(), "2");

        let reports = inspect_document(r#"{"b": 1, "b": null}"#, &int).unwrap();
        assert_eq!(reports[0].state, ReportState::Null);

        let reports = inspect_document(r#"{"b": 1, "b": "x"}"#, &int).unwrap();
        assert_eq!(reports[0].state, ReportState::Error);

        let reports = inspect_document(r#"{"b": "x", "b": 1}"#, &int).unwrap();
        assert_eq!(reports[0].state, ReportState::Error);
    }

    #[test]
    fn any_kind_treats_padded_null_as_null() {
        let reports =
            inspect_document(r#"{"meta":  null }"#, &config(FieldKind::Any, &["meta"])).unwrap();
        assert_eq!(reports[0].state, ReportState::Null);
    }

    #[test]
    fn float_zero_encodes_as_zero() {
        let (out, _) =
            encode_document(r#"{"ratio": 0.0}"#, &config(FieldKind::Float, &["ratio"])).unwrap();
        assert_eq!(out, r#"{"ratio":0}"#);
    }

    #[test]
    fn encode_fails_on_bad_field() {
        let text = r#"{"ratio": "high"}"#;
        let err = encode_document(text, &config(FieldKind::Float, &["ratio"])).unwrap_err();
        assert!(err.to_string().contains("ratio"));
    }
}
