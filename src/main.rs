use clap::Parser;
use comic_fixer::error::Error;
use comic_fixer::{FixerConfig, PackageFormat, RarBackend};
use log::{LevelFilter, error, info};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Fix CBR/CBZ file extensions, convert CBR to CBZ, and package image sequences.",
    after_help = "Examples:\n  comic-fixer /path/to/comics\n  comic-fixer /path/to/comics --dry-run\n  comic-fixer /path/to/comics --no-recursive"
)]
struct Cli {
    /// Directory to scan for CBR/CBZ files and image sequences
    directory: PathBuf,

    /// Show what would be done without making any changes
    #[arg(long)]
    dry_run: bool,

    /// Scan subdirectories recursively (default)
    #[arg(short, long, conflicts_with = "no_recursive")]
    recursive: bool,

    /// Do not scan subdirectories
    #[arg(long)]
    no_recursive: bool,

    /// Archive format for packaged image sequences (cbr or cbz)
    #[arg(long, default_value = "cbr", value_parser = parse_package_format)]
    format: PackageFormat,

    /// Path to the `rar` executable
    #[arg(long, default_value = "rar")]
    rar_bin: PathBuf,

    /// Path to the `unrar` executable
    #[arg(long, default_value = "unrar")]
    unrar_bin: PathBuf,

    /// How CBR files are extracted: `unrar` (external tool) or `native` (in process)
    #[arg(long, default_value = "unrar", value_parser = parse_rar_backend)]
    rar_backend: RarBackend,

    /// Log every step, including skipped files
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_package_format(value: &str) -> Result<PackageFormat, String> {
    value.parse().map_err(|e: Error| e.to_string())
}

fn parse_rar_backend(value: &str) -> Result<RarBackend, String> {
    value.parse().map_err(|e: Error| e.to_string())
}

fn init_logger(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(&cli);

    // -r is accepted for symmetry; recursion is the default.
    let recursive = cli.recursive || !cli.no_recursive;

    let config = match FixerConfig::builder()
        .root_path(cli.directory)
        .dry_run(cli.dry_run)
        .recursive(recursive)
        .package_format(cli.format)
        .rar_binary(cli.rar_bin)
        .unrar_binary(cli.unrar_bin)
        .rar_backend(cli.rar_backend)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = config.preflight_check() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    tokio::select! {
        result = config.run() => match result {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Unexpected error: {}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted by user");
            ExitCode::FAILURE
        }
    }
}
