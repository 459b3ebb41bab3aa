//! # encsniff CLI
//!
//! Command-line front end: label files with their encoding and line
//! ending, and recode files in place.

#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use log::LevelFilter;
#[cfg(feature = "cli")]
use serde::Serialize;

#[cfg(feature = "cli")]
use encsniff::{Config, Encoding, Inspector, LineEnding};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// encsniff: guess text encodings and line endings, recode files in place
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "encsniff")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum bytes inspected per file
    #[arg(long, global = true)]
    max_window: Option<usize>,

    /// Recode buffer size in bytes
    #[arg(long, global = true)]
    chunk_size: Option<usize>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Detect encoding and line ending of files
    Sniff(SniffArgs),

    /// Rewrite a file in another encoding
    Recode(RecodeArgs),

    /// List the encoding catalog in detection order
    List(ListArgs),
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct SniffArgs {
    /// Files to inspect
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct RecodeArgs {
    /// Target encoding, by name or catalog index
    #[arg(short = 't', long = "to")]
    to: EncodingArg,

    /// File to rewrite
    path: PathBuf,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ListArgs {
    /// Show converter name and byte-order mark
    #[arg(long)]
    details: bool,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug)]
struct EncodingArg(Encoding);

#[cfg(feature = "cli")]
impl std::str::FromStr for EncodingArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let encoding = match s.parse::<usize>() {
            Ok(index) => Encoding::from_index(index),
            Err(_) => Encoding::from_name(s),
        };
        match encoding {
            Some(encoding) => Ok(EncodingArg(encoding)),
            None => anyhow::bail!("Unknown encoding: {}", s),
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct SniffResult {
    path: PathBuf,
    encoding: Option<&'static str>,
    line_ending: Option<&'static str>,
    error: Option<String>,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct RecodeResult {
    path: PathBuf,
    from: &'static str,
    to: &'static str,
    bytes_read: u64,
    bytes_written: u64,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct CatalogEntry {
    index: usize,
    name: &'static str,
    converter: Option<&'static str>,
    bom: String,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct Catalog {
    encodings: Vec<CatalogEntry>,
    line_endings: Vec<&'static str>,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let config = load_config(&cli)?;
    let mut inspector = Inspector::new(config);

    match cli.command {
        Commands::Sniff(ref args) => sniff_command(args, &cli, &mut inspector)?,
        Commands::Recode(ref args) => recode_command(args, &cli, &mut inspector)?,
        Commands::List(ref args) => list_command(args, &cli)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn setup_logging(verbose: bool) -> Result<()> {
    use log4rs::append::console::{ConsoleAppender, Target};
    use log4rs::config::{Appender, Config as LogConfig, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{l} {d(%H:%M:%S%.3f)} {m}{n}",
        )))
        .build();

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let config = LogConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .context("Failed to build logging configuration")?;

    log4rs::init_config(config).context("Failed to install logger")?;
    Ok(())
}

#[cfg(feature = "cli")]
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => Config::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(max_window) = cli.max_window {
        config.max_window = max_window;
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }
    config.validate().context("Invalid settings")?;

    log::debug!("using {:?}", config);
    Ok(config)
}

#[cfg(feature = "cli")]
fn sniff_one(inspector: &mut Inspector, path: &Path) -> SniffResult {
    let mut result = SniffResult {
        path: path.to_path_buf(),
        encoding: None,
        line_ending: None,
        error: None,
    };

    match inspector.query_sniff(path) {
        Ok(Some(sniff)) => {
            result.encoding = Some(sniff.encoding.name());
            result.line_ending = Some(sniff.line_ending.name());
        }
        Ok(None) => result.error = Some("cancelled".to_string()),
        Err(e) => result.error = Some(e.to_string()),
    }

    result
}

#[cfg(feature = "cli")]
fn sniff_command(args: &SniffArgs, cli: &Cli, inspector: &mut Inspector) -> Result<()> {
    let results: Vec<_> = args
        .paths
        .iter()
        .map(|path| sniff_one(inspector, path))
        .collect();

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        OutputFormat::Text => {
            for result in &results {
                match (&result.error, result.encoding, result.line_ending) {
                    (Some(error), _, _) => {
                        eprintln!("{}: error: {}", result.path.display(), error)
                    }
                    (None, Some(encoding), Some(line_ending)) => println!(
                        "{}: {} {}",
                        result.path.display(),
                        encoding,
                        line_ending
                    ),
                    _ => {}
                }
            }
        }
    }

    if results.iter().any(|result| result.error.is_some()) {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn recode_command(args: &RecodeArgs, cli: &Cli, inspector: &mut Inspector) -> Result<()> {
    let to = args.to.0;

    let from = inspector
        .query_sniff(&args.path)
        .with_context(|| format!("Failed to inspect {}", args.path.display()))?
        .context("Detection was cancelled")?
        .encoding;

    let report = inspector
        .query_recode(&args.path, to.index())
        .with_context(|| {
            format!(
                "Failed to recode {} from {} to {}",
                args.path.display(),
                from,
                to
            )
        })?
        .context("Recode was cancelled")?;

    match cli.format {
        OutputFormat::Json => {
            let result = RecodeResult {
                path: args.path.clone(),
                from: from.name(),
                to: to.name(),
                bytes_read: report.bytes_read,
                bytes_written: report.bytes_written,
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => {
            println!(
                "{}: {} -> {} ({} bytes -> {} bytes)",
                args.path.display(),
                from,
                to,
                report.bytes_read,
                report.bytes_written
            );
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn list_command(args: &ListArgs, cli: &Cli) -> Result<()> {
    let entries: Vec<_> = Encoding::CATALOG
        .iter()
        .map(|encoding| CatalogEntry {
            index: encoding.index(),
            name: encoding.name(),
            converter: encoding.transcoder_name(),
            bom: format!("{:02X?}", encoding.bom()),
        })
        .collect();

    match cli.format {
        OutputFormat::Json => {
            let catalog = Catalog {
                encodings: entries,
                line_endings: LineEnding::ALL.iter().map(|l| l.name()).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        OutputFormat::Text => {
            println!("Encodings in detection order:");
            println!();

            for entry in &entries {
                println!("{:2} {}", entry.index, entry.name);

                if args.details {
                    println!(
                        "   Converter: {}",
                        entry.converter.unwrap_or("none (cannot be recoded)")
                    );
                    println!("   BOM: {}", entry.bom);
                    println!();
                }
            }

            let names: Vec<_> = LineEnding::ALL.iter().map(|l| l.name()).collect();
            println!();
            println!("Line endings: {}", names.join(", "));
        }
    }

    Ok(())
}
