mod cli;
mod error_fmt;
mod run;

use clap::Parser;
use eyre::WrapErr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};
use wind_core::WindError;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::run::RunOpts;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        tracing::debug!(error = ?e, "exiting with error");
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;

    let cfg = load_config(&cli.config)?;
    // Flushes the log file when dropped at the end of this function.
    let _file_guard = init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Run {
            cycles,
            format,
            filter_gain,
            offset,
            sim_rps,
            sim_angle,
            stats,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("install Ctrl-C handler")?;
            let opts = RunOpts {
                cycles,
                format: format.map_or(cfg.output.format, Into::into),
                filter_gain,
                offset_deg: offset,
                sim_rps,
                sim_angle_deg: sim_angle,
                stats,
            };
            run::run(&cfg, &opts, &shutdown)
        }
        Commands::SelfCheck => {
            run::self_check(&cfg)?;
            println!("ok");
            Ok(())
        }
        Commands::Diag => {
            let diag = run::diag(&cfg)?;
            if cli.json {
                println!("{}", diag.to_json());
            } else {
                print!("{}", run::render_diagnostics(&diag));
            }
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> eyre::Result<wind_config::Config> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        WindError::Config(format!("cannot read {}: {e}", path.display()))
    })?;
    let cfg = wind_config::load_toml(&text)
        .map_err(|e| WindError::Config(format!("{}: {e}", path.display())))?;
    cfg.validate()
        .map_err(|e| WindError::Config(e.to_string()))?;
    Ok(cfg)
}

fn init_tracing(
    json: bool,
    level: &str,
    logging: &wind_config::Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| WindError::Config(format!("invalid log level {level:?}: {e}")))?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter)
                .boxed(),
        );
    }

    let mut file_guard = None;
    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| WindError::Config(format!("logging.file {file:?} has no file name")))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file_level = logging.level.as_deref().unwrap_or("info");
        let file_filter = EnvFilter::try_new(file_level).map_err(|e| {
            WindError::Config(format!("invalid logging.level {file_level:?}: {e}"))
        })?;
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter)
                .boxed(),
        );
        file_guard = Some(guard);
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(file_guard)
}
