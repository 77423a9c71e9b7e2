use std::sync::Mutex;

use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter, Registry};

lazy_static! {
    static ref LOG_INITIALIZED: Mutex<bool> = Mutex::new(false);
}

/// Initialize logging.  If you set the environment variable `RUST_LOG` to a
/// non-empty value, we interpret it as an `EnvFilter` directive and log
/// compactly to stderr; otherwise nothing is installed and the `tracing`
/// macros are effectively free.
///
/// Calling this more than once is harmless, which matters for tests that each
/// want logging available.
pub fn init_logging() {
    let mut initialized = match LOG_INITIALIZED.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if *initialized {
        return;
    }
    *initialized = true;

    // Our test scripts frequently set RUST_LOG unconditionally but with an
    // empty value, and that should not be read as a desire for logging.
    let rustlog = match std::env::var("RUST_LOG") {
        Ok(rustlog) if !rustlog.is_empty() => rustlog,
        _ => return,
    };

    let env_filter = match EnvFilter::try_new(&rustlog) {
        Ok(filter) => filter,
        Err(err) => {
            eprintln!("Ignoring unparseable RUST_LOG {:?}: {}", rustlog, err);
            return;
        }
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .compact()
        .with_ansi(false)
        // Wall time is noise for pure transforms and eats a lot of columns.
        .without_time()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    // Something else (ex: an embedding application) may already have
    // installed a global subscriber, in which case we defer to it.
    let _ = Registry::default().with(layer).try_init();
}
