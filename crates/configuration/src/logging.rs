use crate::settings::ServerSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,tower_http=debug";

/// Installs the global tracing subscriber.
///
/// Output goes through a non-blocking stdout writer; the returned guard must
/// be held for the lifetime of the process or buffered lines are lost.
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing(server: &ServerSettings) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true);

    let result = if server.is_production() {
        builder.compact().with_ansi(false).try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        // A subscriber was already installed (e.g. by a test harness).
        eprintln!("tracing subscriber not installed: {e}");
    }

    guard
}
