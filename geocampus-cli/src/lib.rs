//! Command-line interface for GeoCampus's offline administration tooling.
#![forbid(unsafe_code)]

mod error;

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use geocampus_data::{JsonCampusStore, MergeMode, MergeOptions, preview, run_import};

pub use error::CliError;

const ARG_FILE: &str = "file";
const ARG_STORE: &str = "store";
const ARG_MERGE_MODE: &str = "merge-mode";
const ARG_UPDATE_EXISTING: &str = "update-existing";
const ARG_SKIP_DUPLICATES: &str = "skip-duplicates";
const ENV_IMPORT_FILE: &str = "GEOCAMPUS_CMDS_IMPORT_FILE";
const ENV_PREVIEW_FILE: &str = "GEOCAMPUS_CMDS_PREVIEW_FILE";
const DEFAULT_STORE_PATH: &str = "campus-data.json";

/// Run the GeoCampus CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Import(args) => run_import_command(args, &mut stdout),
        Command::Preview(args) => run_preview_command(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "geocampus",
    about = "Campus geolocation data administration utilities",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import OSM buildings into the campus registry.
    Import(ImportArgs),
    /// Parse and extract candidates without touching the registry.
    Preview(PreviewArgs),
}

/// Merge mode accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum MergeModeArg {
    /// Keep existing records and reconcile candidates against them.
    #[default]
    Add,
    /// Clear the registry before importing.
    Replace,
}

impl From<MergeModeArg> for MergeMode {
    fn from(mode: MergeModeArg) -> Self {
        match mode {
            MergeModeArg::Add => MergeMode::Add,
            MergeModeArg::Replace => MergeMode::Replace,
        }
    }
}

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Import buildings from an OSM XML file into the campus \
                 registry. Inputs can come from CLI flags, configuration \
                 files, or environment variables. The registry document is \
                 read once and written once, at the end of a successful run.",
    about = "Import OSM buildings into the campus registry"
)]
#[ortho_config(prefix = "GEOCAMPUS")]
struct ImportArgs {
    /// Path to the OSM XML file.
    #[arg(value_name = "path")]
    #[serde(default)]
    file: Option<Utf8PathBuf>,
    /// Path to the campus JSON document.
    #[arg(long = ARG_STORE, value_name = "path")]
    #[serde(default)]
    store: Option<Utf8PathBuf>,
    /// How to treat the existing building collection.
    #[arg(long = ARG_MERGE_MODE, value_name = "mode")]
    #[serde(default)]
    merge_mode: Option<MergeModeArg>,
    /// Merge matched candidates over their existing records.
    #[arg(long = ARG_UPDATE_EXISTING, value_name = "bool")]
    #[serde(default)]
    update_existing: Option<bool>,
    /// Count matched candidates as skipped duplicates.
    #[arg(long = ARG_SKIP_DUPLICATES, value_name = "bool")]
    #[serde(default)]
    skip_duplicates: Option<bool>,
}

impl ImportArgs {
    fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportConfig {
    file: Utf8PathBuf,
    store: Utf8PathBuf,
    options: MergeOptions,
}

impl ImportConfig {
    fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.file, ARG_FILE)
    }
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let file = args.file.ok_or(CliError::MissingArgument {
            field: ARG_FILE,
            env: ENV_IMPORT_FILE,
        })?;
        let store = args
            .store
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_STORE_PATH));
        let defaults = MergeOptions::default();
        let options = MergeOptions {
            mode: args.merge_mode.unwrap_or_default().into(),
            update_existing: args.update_existing.unwrap_or(defaults.update_existing),
            skip_duplicates: args.skip_duplicates.unwrap_or(defaults.skip_duplicates),
        };
        Ok(Self {
            file,
            store,
            options,
        })
    }
}

/// CLI arguments for the `preview` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Parse an OSM XML file and report the building and \
                 point-of-interest candidates it would yield, without \
                 touching the campus registry.",
    about = "Preview the candidates an OSM file would yield"
)]
#[ortho_config(prefix = "GEOCAMPUS")]
struct PreviewArgs {
    /// Path to the OSM XML file.
    #[arg(value_name = "path")]
    #[serde(default)]
    file: Option<Utf8PathBuf>,
}

impl PreviewArgs {
    fn into_config(self) -> Result<PreviewConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PreviewConfig::try_from(merged)
    }
}

/// Resolved `preview` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PreviewConfig {
    file: Utf8PathBuf,
}

impl PreviewConfig {
    fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.file, ARG_FILE)
    }
}

impl TryFrom<PreviewArgs> for PreviewConfig {
    type Error = CliError;

    fn try_from(args: PreviewArgs) -> Result<Self, Self::Error> {
        let file = args.file.ok_or(CliError::MissingArgument {
            field: ARG_FILE,
            env: ENV_PREVIEW_FILE,
        })?;
        Ok(Self { file })
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match geocampus_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn run_import_command(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let store = JsonCampusStore::new(config.store.clone());
    let report = run_import(&store, &config.file, &config.options)?;
    write_report(writer, &report)
}

fn run_preview_command(args: PreviewArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let report = preview(&config.file)?;
    write_report(writer, &report)
}

fn write_report<T: Serialize>(writer: &mut dyn Write, report: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerializeReport)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}
