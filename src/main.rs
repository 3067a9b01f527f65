use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use narrative::{
    ColumnPolicy, NarrativeConfig, NarrativeTable, config_from_env_values, decode_cell,
    decode_cell_strict, history_input_parse, history_table, render_table, table_input_parse,
    table_render_yaml,
};

#[derive(Parser)]
#[command(name = "narrative")]
#[command(about = "Clinical narrative table renderer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a single sentinel-encoded cell
    Decode {
        /// Raw cell text (for example "Aspirin<CR>Ramipril")
        text: String,
        /// Emit JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// Build a table from a YAML table input file
    Table {
        /// Path to the table input file
        path: PathBuf,
        /// Keep empty columns
        #[arg(long)]
        no_shape: bool,
        /// Emit JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// Merge diagnoses, procedures and history items into a history table
    History {
        /// Path to the history input file
        path: PathBuf,
        /// Emit JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

/// Entry point for the narrative renderer.
///
/// Configuration is resolved once here and passed down; nothing below reads the environment.
///
/// # Environment Variables
/// - `NARRATIVE_FILLER_TEXT`: filler for the last cell of multimedia rows (default: "See above..")
/// - `NARRATIVE_DATE_FORMAT`: `chrono` format for history dates (default: "%Y-%m-%d")
/// - `NARRATIVE_STRICT_SENTINELS`: reject unmatched `<MAIL>` markers (default: false)
/// - `RUST_LOG`: log filter; logs go to stderr
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("narrative=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config_from_env_values(
        std::env::var("NARRATIVE_FILLER_TEXT").ok(),
        std::env::var("NARRATIVE_DATE_FORMAT").ok(),
        std::env::var("NARRATIVE_STRICT_SENTINELS").ok(),
    )
    .context("invalid narrative configuration")?;

    let cli = Cli::parse();
    if let Some(output) = run(cli.command, &config)? {
        println!("{}", output.trim_end());
    }

    Ok(())
}

/// Run one command, returning the text to print (if any).
fn run(command: Commands, config: &NarrativeConfig) -> anyhow::Result<Option<String>> {
    match command {
        Commands::Decode { text, json } => {
            let decoded = if config.strict_sentinels() {
                decode_cell_strict(&text)?
            } else {
                decode_cell(&text)
            };
            serialise(&decoded, json).map(Some)
        }
        Commands::Table {
            path,
            no_shape,
            json,
        } => {
            let input = table_input_parse(&read_input(&path)?)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            let policy = if no_shape {
                ColumnPolicy::Removable(BTreeSet::new())
            } else {
                input.policy
            };
            let table = render_table(
                config,
                input.caption,
                input.summary,
                input.headers,
                input.rows,
                &policy,
            )?;
            table_output(table, json, &path)
        }
        Commands::History { path, json } => {
            let input = history_input_parse(&read_input(&path)?)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            let table = history_table(
                config,
                &input.diagnoses,
                &input.procedures,
                &input.history,
                &input.options(),
            )?;
            table_output(table, json, &path)
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn table_output(
    table: Option<NarrativeTable>,
    json: bool,
    path: &Path,
) -> anyhow::Result<Option<String>> {
    match table {
        Some(table) if json => serialise(&table, true).map(Some),
        Some(table) => Ok(Some(table_render_yaml(&table)?)),
        None => {
            tracing::info!("no rows in {}; nothing to render", path.display());
            Ok(None)
        }
    }
}

fn serialise<T: Serialize>(value: &T, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_yaml::to_string(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn input_file(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(yaml.as_bytes()).expect("write input");
        file
    }

    #[test]
    fn decode_prints_yaml_by_default() {
        let output = run(
            Commands::Decode {
                text: "Aspirin<CR>Ramipril".into(),
                json: false,
            },
            &NarrativeConfig::default(),
        )
        .expect("decode")
        .expect("output");

        assert!(output.contains("kind: bullets"));
        assert!(output.contains("Ramipril"));
    }

    #[test]
    fn decode_strict_rejects_unclosed_mail() {
        let config = config_from_env_values(None, None, Some("true".into())).expect("config");
        let err = run(
            Commands::Decode {
                text: "<MAIL>gp@example.org".into(),
                json: true,
            },
            &config,
        )
        .unwrap_err();

        assert!(err.to_string().contains("unclosed sentinel"));
    }

    #[test]
    fn table_drops_empty_columns_unless_told_not_to() {
        let file = input_file(
            "headers: [Drug, Comment]\nrows:\n  - [Aspirin, null]\n  - [Ramipril, \"\"]\n",
        );

        let shaped = run(
            Commands::Table {
                path: file.path().to_path_buf(),
                no_shape: false,
                json: true,
            },
            &NarrativeConfig::default(),
        )
        .expect("table")
        .expect("output");
        let shaped: serde_json::Value = serde_json::from_str(&shaped).expect("json");
        assert_eq!(shaped["headers"], serde_json::json!(["Drug"]));

        let unshaped = run(
            Commands::Table {
                path: file.path().to_path_buf(),
                no_shape: true,
                json: true,
            },
            &NarrativeConfig::default(),
        )
        .expect("table")
        .expect("output");
        let unshaped: serde_json::Value = serde_json::from_str(&unshaped).expect("json");
        assert_eq!(unshaped["headers"], serde_json::json!(["Drug", "Comment"]));
    }

    #[test]
    fn table_without_rows_prints_nothing() {
        let file = input_file("headers: [Drug]\nrows: []\n");
        let output = run(
            Commands::Table {
                path: file.path().to_path_buf(),
                no_shape: false,
                json: false,
            },
            &NarrativeConfig::default(),
        )
        .expect("table");

        assert!(output.is_none());
    }

    #[test]
    fn history_sorts_newest_first() {
        let file = input_file(
            "diagnoses:\n  - label: Asthma\n    onset: 2001-03-04\n    ongoing: true\n\
             procedures:\n  - label: Appendicectomy\n    interval:\n      low: 2010-01-01\n      high: 2010-01-02\n",
        );
        let output = run(
            Commands::History {
                path: file.path().to_path_buf(),
                json: true,
            },
            &NarrativeConfig::default(),
        )
        .expect("history")
        .expect("output");
        let table: serde_json::Value = serde_json::from_str(&output).expect("json");

        let first = table["rows"][0].to_string();
        let second = table["rows"][1].to_string();
        assert!(first.contains("Appendicectomy"));
        assert!(second.contains("Asthma"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = run(
            Commands::History {
                path: PathBuf::from("/nonexistent/history.yaml"),
                json: false,
            },
            &NarrativeConfig::default(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("/nonexistent/history.yaml"));
    }
}
