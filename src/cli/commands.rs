use crate::config::{load_overrides, ConfigOverrides, GenerationConfig, OutputOverrides};
use crate::generator::{assemble_all, classify, generate, GenerationReport};
use crate::spec::{load_document, source_for, ApiKeyLocation, AuthConfig};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Command-line interface for swagger-axios-gen
///
/// Generates one request module per API tag, plus a write-once custom file
/// for hand-written overrides.
#[derive(Parser, Debug)]
#[command(name = "swagger-axios-gen", version)]
#[command(about = "Generate per-tag HTTP client modules from a Swagger document", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate client modules and create missing custom files
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory (overrides `output.outputDir`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Settings file (JSON, YAML or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Remove previously generated files first; custom files are kept
        #[arg(long, default_value_t = false)]
        clean: bool,

        /// Emit `.ts` files with annotated signatures
        #[arg(long, default_value_t = false)]
        typescript: bool,
    },
    /// Print tags and derived function signatures without writing files
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Settings file (JSON, YAML or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Authentication scheme for URL sources
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AuthKind {
    Basic,
    Bearer,
    Token,
    #[value(name = "apikey")]
    ApiKey,
    Custom,
}

/// Where `--api-key-value` is sent
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum KeyIn {
    Header,
    Query,
}

/// Document location and retrieval options shared by every command
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Swagger/OpenAPI document: a file path or an http(s) URL
    #[arg(short, long, env = "SWAGGEN_SOURCE")]
    pub source: String,

    /// Authentication scheme for URL sources
    #[arg(long, value_enum)]
    pub auth_type: Option<AuthKind>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long, env = "SWAGGEN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Bearer token
    #[arg(long, env = "SWAGGEN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long)]
    pub api_key_name: Option<String>,

    #[arg(long, env = "SWAGGEN_API_KEY", hide_env_values = true)]
    pub api_key_value: Option<String>,

    #[arg(long, value_enum, default_value_t = KeyIn::Header)]
    pub api_key_in: KeyIn,

    /// Extra request header for `--auth-type custom` (repeatable)
    #[arg(long = "header", value_name = "NAME=VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Retrieval timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

impl SourceArgs {
    /// Credentials described by the flags.
    ///
    /// `--header` alone implies `custom`.
    ///
    /// # Errors
    ///
    /// Returns an error when the chosen scheme is missing a credential.
    pub fn auth(&self) -> Result<Option<AuthConfig>> {
        let kind = match (self.auth_type, self.headers.is_empty()) {
            (Some(kind), _) => kind,
            (None, false) => AuthKind::Custom,
            (None, true) => return Ok(None),
        };
        if kind != AuthKind::Custom && !self.headers.is_empty() {
            bail!("--header is only valid with --auth-type custom");
        }
        let auth = match kind {
            AuthKind::Basic => AuthConfig::Basic {
                username: required(self.username.as_deref(), "--username", "basic")?,
                password: required(self.password.as_deref(), "--password", "basic")?,
            },
            AuthKind::Bearer | AuthKind::Token => AuthConfig::Bearer {
                token: required(self.token.as_deref(), "--token", "bearer")?,
            },
            AuthKind::ApiKey => AuthConfig::ApiKey {
                name: required(self.api_key_name.as_deref(), "--api-key-name", "apikey")?,
                value: required(self.api_key_value.as_deref(), "--api-key-value", "apikey")?,
                location: match self.api_key_in {
                    KeyIn::Header => ApiKeyLocation::Header,
                    KeyIn::Query => ApiKeyLocation::Query,
                },
            },
            AuthKind::Custom => {
                if self.headers.is_empty() {
                    bail!("--auth-type custom requires at least one --header NAME=VALUE");
                }
                AuthConfig::Custom(self.headers.iter().cloned().collect::<BTreeMap<_, _>>())
            }
        };
        Ok(Some(auth))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(1))
    }
}

fn required(value: Option<&str>, flag: &str, scheme: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => bail!("{flag} is required for {scheme} authentication"),
    }
}

/// Parse a `NAME=VALUE` header flag
pub fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Patch built from `generate` flags; applied on top of the settings file
pub fn flag_overrides(output: Option<&Path>, clean: bool, typescript: bool) -> ConfigOverrides {
    ConfigOverrides {
        output: Some(OutputOverrides {
            output_dir: output.map(Path::to_path_buf),
            clean_output_dir: clean.then_some(true),
            use_type_script: typescript.then_some(true),
            ..OutputOverrides::default()
        }),
        ..ConfigOverrides::default()
    }
}

/// Defaults, then the settings file, then command-line flags.
///
/// # Errors
///
/// Returns an error if the settings file cannot be read or parsed.
pub fn resolve_config(file: Option<&Path>, flags: ConfigOverrides) -> Result<GenerationConfig> {
    let base = match file {
        Some(path) => {
            debug!(path = %path.display(), "Loading settings file");
            load_overrides(path)?
        }
        None => ConfigOverrides::default(),
    };
    Ok(GenerationConfig::from_overrides(base.layer(flags)))
}

/// Execute a parsed command line
///
/// # Errors
///
/// Returns an error if:
/// - The settings file cannot be loaded
/// - Authentication flags are incomplete
/// - The document cannot be retrieved or is malformed
/// - The output directory or a file cannot be written
pub fn run_cli(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Generate {
            source,
            output,
            config,
            clean,
            typescript,
        } => {
            let flags = flag_overrides(output.as_deref(), *clean, *typescript);
            let config = resolve_config(config.as_deref(), flags)?;
            let output_dir = config.output.output_dir.clone();
            let document_source = source_for(&source.source, source.auth()?, source.timeout());
            let report = generate(config, document_source)
                .with_context(|| format!("Failed to generate clients from {}", source.source))?;
            print_report(&report, &output_dir);
            Ok(())
        }
        Commands::Inspect { source, config } => {
            let config = resolve_config(config.as_deref(), ConfigOverrides::default())?;
            let document_source = source_for(&source.source, source.auth()?, source.timeout());
            let raw = document_source
                .fetch()
                .with_context(|| format!("Failed to read {}", source.source))?;
            let document = load_document(&raw)?;
            let groups = classify(&document);
            let assembled = assemble_all(&document, &groups, &config)?;
            for (group, tag) in groups.iter().zip(&assembled) {
                println!("{} -> {}", group.tag, tag.generated_name);
                for (entry, function) in group.operations.iter().zip(&tag.functions) {
                    println!(
                        "  {:<7} {} -> {}({})",
                        entry.method.to_ascii_uppercase(),
                        entry.path,
                        function.name,
                        function.signature.join(", ")
                    );
                }
            }
            Ok(())
        }
    }
}

fn print_report(report: &GenerationReport, output_dir: &Path) {
    println!(
        "Generated {} tag(s), {} function(s) in {}",
        report.tags.len(),
        report.function_count(),
        output_dir.display()
    );
    for tag in &report.tags {
        println!(
            "  {} ({} functions)",
            file_label(&tag.generated_file),
            tag.functions.len()
        );
        let state = if tag.custom_created { "created" } else { "kept" };
        println!("  {} ({state})", file_label(&tag.custom_file));
    }
    if !report.purged.is_empty() {
        println!("Removed {} stale generated file(s)", report.purged.len());
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
