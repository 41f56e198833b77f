use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::settings::LOG_FILE;

/// Send tracing output to `<dir>/budgetbook.log`. The interface owns the
/// terminal, so nothing is written to stderr. `RUST_LOG` overrides `level`.
///
/// Logging is best effort: if the file cannot be opened the program runs
/// without a subscriber.
pub fn init(dir: &Path, level: &str) {
    if std::fs::create_dir_all(dir).is_err() {
        return;
    }
    let file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
    {
        Ok(file) => file,
        Err(_) => return,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("budgetbook={level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
