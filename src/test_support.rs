//! Log capture for unit tests.

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// Formatted log output collected by a thread-local subscriber.
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Run `f` with every event on this thread written into the capture.
    pub(crate) fn capture<R>(f: impl FnOnce() -> R) -> (R, Self) {
        let logs = Self::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, f);
        (result, logs)
    }

    /// Whether some line was logged at `level` and contains `message`.
    pub(crate) fn contains(&self, level: &str, message: &str) -> bool {
        String::from_utf8_lossy(&self.buffer.lock())
            .lines()
            .any(|line| line.contains(level) && line.contains(message))
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
