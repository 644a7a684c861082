//! hashcat bridge CLI
//!
//! Command-line front end for the hashcat-bridge library:
//! - `args` prints the argument vector a job would hand to the engine
//! - `catalog` builds the hash-type catalog from engine module sources

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hashcat_bridge::{catalog, Argv, HostOptions, SessionOptions};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

mod config;

/// hashcat bridge - host-side tooling for the hashcat engine
#[derive(Parser, Debug)]
#[command(name = "hashcat-bridge")]
#[command(about = "Build engine argument vectors and hash-type catalogs", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the engine argument vector for a job, one argument per line
    Args {
        /// Engine option string, e.g. "--hash-type=0 --attack-mode=0"
        #[arg(long, value_name = "OPTIONS", allow_hyphen_values = true)]
        options: Option<String>,

        /// Hash, hashfile or hccapx capture
        #[arg(short, long, value_name = "INPUT")]
        input: Option<String>,

        /// Dictionary, mask or directory
        #[arg(short, long, value_name = "DICT")]
        dict: Option<String>,

        /// Engine shared folder (overrides the config file)
        #[arg(long, value_name = "DIR")]
        shared_path: Option<PathBuf>,
    },

    /// Build the hash-type catalog from engine module sources
    Catalog {
        /// Directory containing module_*.c sources
        #[arg(long, value_name = "DIR")]
        modules: PathBuf,

        /// Output file for the JSON catalog (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("hashcat bridge CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using bridge library v{}", hashcat_bridge::VERSION);

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };

    match &args.command {
        Command::Args {
            options,
            input,
            dict,
            shared_path,
        } => args_mode(
            &app_config,
            options.as_deref(),
            input.as_deref(),
            dict.as_deref(),
            shared_path.as_deref(),
        ),
        Command::Catalog { modules, output } => catalog_mode(modules, output.as_deref()),
    }
}

/// Args mode - merge config and flags, print the argument vector
fn args_mode(
    app_config: &config::AppConfig,
    options: Option<&str>,
    input: Option<&str>,
    dict: Option<&str>,
    shared_path: Option<&Path>,
) -> Result<()> {
    let mut host: HostOptions = app_config.host.clone();
    if let Some(path) = shared_path {
        host.shared_path = path.to_path_buf();
    }
    host.validate().context("Invalid host options")?;

    let mut overlay = match options {
        Some(text) => SessionOptions::parse(text).context("Invalid option string")?,
        None => SessionOptions::default(),
    };
    if let Some(input) = input {
        overlay.input_file = input.to_string();
    }
    if let Some(dict) = dict {
        overlay.dictionary_mask_directory = Some(dict.to_string());
    }

    let job = app_config.job.session_options()?.merge(&overlay);
    if job.input_file.is_empty() {
        log::warn!("No input given; the engine will reject this job");
    }

    let executable = host.executable().to_string_lossy().into_owned();
    let argv = Argv::new(std::iter::once(executable).chain(job.to_args()))
        .context("Failed to build argument vector")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for arg in argv.to_strings() {
        writeln!(out, "{}", arg)?;
    }
    Ok(())
}

/// Catalog mode - scan module sources, write JSON
fn catalog_mode(modules: &Path, output: Option<&Path>) -> Result<()> {
    let types = catalog::scan_modules(modules)
        .with_context(|| format!("Failed to scan modules in {:?}", modules))?;

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            let mut writer = BufWriter::new(file);
            catalog::write_json(&types, &mut writer)?;
            writer.flush()?;
            log::info!("Wrote {} hash types to {:?}", types.len(), path);
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            catalog::write_json(&types, &mut out)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
