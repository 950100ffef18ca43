//! Human-readable error descriptions, exit codes and structured JSON errors.

use wind_core::error::{BuildError, WindError};
use wind_hardware::HwError;

pub const EXIT_OTHER: i32 = 1;
pub const EXIT_CONFIG: i32 = 3;
pub const EXIT_HARDWARE: i32 = 4;
pub const EXIT_SINK: i32 = 5;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingCapture => {
                "What happened: No edge capture was provided to the digitizer.\nLikely causes: The input layer failed to initialize before the digitizer was built.\nHow to fix: Ensure the capture is created and passed via with_capture(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid timing configuration ({msg}).\nLikely causes: Out-of-range values in [timing].\nHow to fix: Edit the config file, then rerun. See etc/wind_config.toml for a sample."
            ),
        };
    }

    if let Some(we) = err.downcast_ref::<WindError>() {
        return match we {
            WindError::Config(msg) => format!(
                "What happened: Configuration is invalid or unreadable ({msg}).\nLikely causes: Wrong --config path, missing [pins], or out-of-range values.\nHow to fix: Edit the TOML config and try again. See etc/wind_config.toml for a sample."
            ),
            WindError::Hardware(msg) => format!(
                "What happened: Wind sensor inputs could not be used ({msg}).\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO."
            ),
            WindError::Sink(msg) => format!(
                "What happened: Readings could not be written ({msg}).\nLikely causes: The consumer of stdout went away.\nHow to fix: Check the pipe or serial bridge reading the output."
            ),
            WindError::State(msg) => format!(
                "What happened: {msg}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(he) = err.downcast_ref::<HwError>() {
        return format!(
            "What happened: GPIO setup failed ({he}).\nLikely causes: Incorrect pin numbers, pins already in use, or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO."
        );
    }

    // String-based heuristics for errors from init
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid configuration") {
        return "What happened: Configuration is invalid or incomplete.\nLikely causes: Missing [pins] (speed, direction), or out-of-range values.\nHow to fix: Edit the TOML config and try again.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes by error class; clap keeps 2 for usage errors.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(we) = err.downcast_ref::<WindError>() {
        return match we {
            WindError::Config(_) => EXIT_CONFIG,
            WindError::Hardware(_) => EXIT_HARDWARE,
            WindError::Sink(_) => EXIT_SINK,
            WindError::State(_) => EXIT_OTHER,
        };
    }
    if let Some(BuildError::InvalidConfig(_)) = err.downcast_ref::<BuildError>() {
        return EXIT_CONFIG;
    }
    if err.downcast_ref::<HwError>().is_some() {
        return EXIT_HARDWARE;
    }
    EXIT_OTHER
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(we) = err.downcast_ref::<WindError>() {
        return match we {
            WindError::Config(_) => "Config",
            WindError::Hardware(_) => "Hardware",
            WindError::Sink(_) => "Sink",
            WindError::State(_) => "State",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    if err.downcast_ref::<HwError>().is_some() {
        return "Hardware";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
