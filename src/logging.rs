use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use vibetube::config::{self, Config};
use vibetube::constants::constants;

/// Send `tracing` output to `<data dir>/vibetube.log`; the terminal itself belongs to the UI.
///
/// Level comes from `RUST_LOG`, else `log_level` in the config, else `info`. Returns the writer
/// guard, which must be held until exit so buffered lines get flushed. Logging is optional: when
/// the directory cannot be created nothing is installed.
pub fn init_logging(config: &Config) -> Option<WorkerGuard> {
  let dir = config::log_dir()?;
  std::fs::create_dir_all(&dir).ok()?;

  let appender = tracing_appender::rolling::never(&dir, &constants().log_file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_deref().unwrap_or("info")));

  tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).try_init().ok()?;
  Some(guard)
}
