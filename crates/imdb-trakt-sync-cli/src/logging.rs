use color_eyre::eyre::{eyre, Result};
use media_sync_config::FileConfig;
use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directives for a verbosity level.
///
/// 0 = info, 1 = debug with hyper's connection chatter suppressed, 2+ = trace.
/// `--trace` lifts the HTTP wrapper to debug so bodies show at the default level.
fn filter_directives(verbose_level: u8, quiet: bool, trace_http: bool) -> String {
    if quiet {
        return "error".to_string();
    }
    let base = match verbose_level {
        0 => "info",
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn",
        _ => "trace",
    };
    if trace_http && verbose_level == 0 {
        format!("{},media_sync_sources::http=debug", base)
    } else {
        base.to_string()
    }
}

/// Whether HTTP bodies get logged: `--trace`, then `SYNC_TRACE`, then `trace` in the config file.
///
/// Resolved before logging starts so the filter can include the HTTP target. A config
/// file that fails to parse counts as off here; loading it for the command reports the error.
pub fn http_trace_requested<F>(cli_trace: bool, config_file: &Path, env: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if cli_trace {
        return true;
    }
    FileConfig::from_path(config_file)
        .and_then(|file| file.trace_enabled(env))
        .unwrap_or(false)
}

pub fn init_logging(verbose_level: u8, quiet: bool, trace_http: bool, log_file: Option<PathBuf>) -> Result<()> {
    let directives = filter_directives(verbose_level, quiet, trace_http);
    // RUST_LOG wins unless --quiet was given
    let filter = if quiet {
        EnvFilter::new(directives)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
    };

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true" || v == "1")
        .unwrap_or_else(|_| !io::stderr().is_terminal());

    let registry = Registry::default().with(filter);

    if let Some(log_path) = log_file {
        let log_dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

        let log_filename = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| eyre!("Invalid log filename: {}", log_path.display()))?;
        // imdb-trakt-sync.log rotates to imdb-trakt-sync.2026-01-17 etc.
        let log_prefix = log_filename.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(log_filename);

        let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, log_prefix);

        if json {
            let json_layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(file_appender);
            registry.with(json_layer).init();
        } else {
            let fmt_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(file_appender);
            registry.with(fmt_layer).init();
        }
    } else if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);
        registry.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);
        registry.with(fmt_layer).init();
    }

    Ok(())
}
