use std::path::PathBuf;

use clap::Parser;
use rtr_bootstrap::core::startup::DEFAULT_LOG_NAME;
use rtr_bootstrap::utils::error::ErrorCategory;
use rtr_bootstrap::{LogFile, LogRegistry, Startup, StartupOptions, Thresholds};
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "rtr-bootstrap")]
#[command(about = "Prepare storage, logging and configuration for an RTR function run")]
struct Args {
    /// Logger name shown in every log line
    #[arg(long, default_value = DEFAULT_LOG_NAME)]
    log_name: String,

    /// Log file path (defaults to <logs_dir>/<log_name>.log)
    #[arg(long, conflicts_with = "no_log_file")]
    log_file: Option<PathBuf>,

    /// Log to the console only
    #[arg(long)]
    no_log_file: bool,

    /// Show debug messages on the console
    #[arg(short, long)]
    verbose: bool,

    /// Print the resolved startup state as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_file = match (args.log_file, args.no_log_file) {
        (_, true) => LogFile::Disabled,
        (Some(path), false) => LogFile::Path(path),
        (None, false) => LogFile::Default,
    };
    let thresholds = Thresholds {
        console: if args.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        },
        ..Thresholds::default()
    };
    let options = StartupOptions {
        log_name: args.log_name,
        log_file,
        thresholds,
    };

    let mut registry = LogRegistry::new();
    let startup = match Startup::from_process_env(&mut registry, &options) {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            let exit_code = match e.category() {
                ErrorCategory::Configuration | ErrorCategory::Logging => 1,
                ErrorCategory::FileSystem => 3,
            };
            std::process::exit(exit_code);
        }
    };
    startup.logger.install_global()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&startup.summary())?);
        return Ok(());
    }

    let config = &startup.config;
    println!("✅ Startup checks passed ({:?} context)", startup.context);
    println!("📁 Logs:    {}", startup.dirs.logs_dir.display());
    println!("📁 Results: {}", startup.dirs.result_dir.display());
    if let Some(path) = &startup.log_file {
        println!("📝 Log file: {}", path.display());
    }
    println!("📜 Scripts: {}", config.script_names.join(", "));
    println!("☁️  Upload to BloodHound: {}", config.upload_to_bh);
    println!(
        "🔁 Retries: {} (delay {}s)",
        config.max_retries, config.retry_delay
    );

    tracing::debug!("Resolved configuration: {:?}", config);
    Ok(())
}
