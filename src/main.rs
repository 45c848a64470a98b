use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use schemagen::config::GeneratorConfig;
use schemagen::error::SchemagenError;
use schemagen::generator::SchemaGenerator;
use schemagen::output::{artifact_stems, ArtifactWriter};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schemagen")]
#[command(about = "Generate SQL DDL and typed bindings from a declarative table schema")]
#[command(version)]
#[command(after_help = "EXAMPLES:
    # Generate DDL, upgrade script and bindings into ./generated
    schemagen generate -i schema.json -o generated

    # Check a schema and list every problem found
    schemagen check -i schema.json

    # Print the upgrade script with an Android-style row id column
    schemagen ddl -i schema.json --upgrade --row-id _id")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Set log level explicitly
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// JSON configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Prepend `<NAME> INTEGER PRIMARY KEY` to every table
    #[arg(long, global = true, value_name = "NAME")]
    row_id: Option<String>,

    /// Emit IF NOT EXISTS on CREATE statements
    #[arg(long, global = true)]
    if_not_exists: bool,
}

#[derive(ValueEnum, Clone, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write DDL, upgrade script and bindings for one or more schema files
    Generate {
        /// Schema documents (JSON)
        #[arg(short, long = "input", value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "generated")]
        output: PathBuf,
    },

    /// Load and validate a schema file, reporting every problem
    Check {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },

    /// Print DDL statements to stdout
    Ddl {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Print drop statements followed by the create statements
        #[arg(long)]
        upgrade: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;
    info!("Starting schemagen v{}", env!("CARGO_PKG_VERSION"));

    let config = build_config(&cli)?;
    let generator = SchemaGenerator::with_config(config);

    let ok = match &cli.command {
        Commands::Generate { inputs, output } => execute_generate(&generator, inputs, output)?,
        Commands::Check { input } => execute_check(&generator, input)?,
        Commands::Ddl { input, upgrade } => execute_ddl(&generator, input, *upgrade)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(row_id) = &cli.row_id {
        config.ddl.row_id_column = Some(row_id.clone());
    }
    if cli.if_not_exists {
        config.ddl.if_not_exists = true;
    }
    config.check()?;
    Ok(config)
}

fn read_document(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn execute_generate(generator: &SchemaGenerator, inputs: &[PathBuf], output: &Path) -> Result<bool> {
    let stems = artifact_stems(inputs)?;
    let documents = inputs
        .iter()
        .map(|path| Ok((path.clone(), read_document(path)?)))
        .collect::<Result<Vec<_>>>()?;

    let writer = ArtifactWriter::new(output);
    let mut ok = true;
    for ((path, result), stem) in generator.generate_many(&documents).into_iter().zip(&stems) {
        match result {
            Ok(artifacts) => {
                for written in writer.write(stem, &artifacts)? {
                    println!("{}", written.display());
                }
            }
            Err(e) => {
                report_failure(&path, &e);
                ok = false;
            }
        }
    }
    Ok(ok)
}

fn execute_check(generator: &SchemaGenerator, input: &Path) -> Result<bool> {
    let raw = read_document(input)?;
    match generator.check(&raw) {
        Ok(document) => {
            println!(
                "{}: ok ({} table(s))",
                input.display(),
                document.tables.len()
            );
            Ok(true)
        }
        Err(e) => {
            report_failure(input, &e);
            Ok(false)
        }
    }
}

fn execute_ddl(generator: &SchemaGenerator, input: &Path, upgrade: bool) -> Result<bool> {
    let raw = read_document(input)?;
    match generator.generate(&raw) {
        Ok(artifacts) => {
            let ddl = if upgrade { &artifacts.upgrade } else { &artifacts.ddl };
            print!("{}", ddl);
            Ok(true)
        }
        Err(e) => {
            report_failure(input, &e);
            Ok(false)
        }
    }
}

fn report_failure(path: &Path, e: &SchemagenError) {
    eprint!("{}", e.report(&path.display().to_string()));
}

/// Initialize logging based on CLI configuration
fn initialize_logging(cli: &Cli) -> Result<()> {
    let filter = if let Some(level) = &cli.log_level {
        log_filter(level.clone().into(), None)
    } else if cli.verbose {
        log_filter(Level::DEBUG, None)
    } else {
        log_filter(Level::WARN, std::env::var("RUST_LOG").ok().as_deref())
    };

    if cli.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_file(cli.verbose)
            .with_line_number(cli.verbose)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_file(cli.verbose)
            .with_line_number(cli.verbose)
            .init();
    }

    Ok(())
}

/// `RUST_LOG`-style directives when given and valid, otherwise `level`
fn log_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(level.to_string().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_prefers_directives() {
        assert_eq!(log_filter(Level::WARN, None).to_string().to_lowercase(), "warn");
        assert_eq!(log_filter(Level::DEBUG, None).to_string().to_lowercase(), "debug");
        assert_eq!(
            log_filter(Level::WARN, Some("schemagen=trace")).to_string(),
            "schemagen=trace"
        );
    }

    #[test]
    fn test_cli_parses_generate_inputs() {
        let cli = Cli::try_parse_from(["schemagen", "generate", "-i", "a.json", "-i", "b/a.json"]).unwrap();
        match cli.command {
            Commands::Generate { inputs, output } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(output, PathBuf::from("generated"));
                assert!(artifact_stems(&inputs).is_err());
            }
            _ => panic!("expected generate"),
        }
    }
}
