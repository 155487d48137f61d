// 📝 Logging - tracing subscriber shared by the CLI, the terminal UI and the API server
//
// AGROFLOW_LOG         EnvFilter directives (default "agroflow=info,warn")
// AGROFLOW_LOG_FORMAT  "json" or "compact" (default)
//
// The terminal UI owns the tty while it runs, so it logs to a file instead
// of stderr (see `init_tracing_to_file`).

use std::env;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, fmt::MakeWriter, prelude::*, EnvFilter};

pub const ENV_LOG: &str = "AGROFLOW_LOG";
pub const ENV_LOG_FORMAT: &str = "AGROFLOW_LOG_FORMAT";

fn default_directives(debug: bool) -> &'static str {
    if debug {
        "agroflow=debug,info"
    } else {
        "agroflow=info,warn"
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(env::var("DEBUG").is_ok())))
}

/// Install the global subscriber writing to stderr, so JSON printed on
/// stdout stays machine-readable. Calling this twice is a no-op.
pub fn init_tracing() {
    install(io::stderr, true);
}

/// Install the global subscriber appending to `path`, creating the parent
/// directory if needed. Nothing is written to the terminal.
pub fn init_tracing_to_file(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    install(Mutex::new(file), false);
    Ok(())
}

/// Install the global subscriber with a caller-supplied writer; used with
/// `io::sink` when the terminal UI cannot open its log file.
pub fn init_tracing_with_writer<W>(writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    install(writer, false);
}

fn install<W>(writer: W, ansi: bool)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(env_filter());

    let result = match env::var(ENV_LOG_FORMAT).as_deref() {
        Ok("json") => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(writer))
            .try_init(),
        _ => registry
            .with(fmt::layer().compact().with_ansi(ansi).with_writer(writer))
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(false), "agroflow=info,warn");
        assert!(default_directives(true).starts_with("agroflow=debug"));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing();
        init_tracing();
        init_tracing_with_writer(io::sink);
    }

    #[test]
    fn test_file_target_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("agroflow.log");

        init_tracing_to_file(&path).unwrap();

        assert!(path.exists());
    }
}
