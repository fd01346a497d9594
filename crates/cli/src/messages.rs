//! Narration routed into the log.

use combat_core::MessageSink;
use tracing::info;

/// Emits every narration line as an `info!` event.
#[derive(Debug, Default)]
pub struct TracingMessages {
    pub emitted: usize,
}

impl MessageSink for TracingMessages {
    fn emit(&mut self, message: &str) {
        self.emitted += 1;
        info!("{message}");
    }
}
