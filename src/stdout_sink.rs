// SPDX-License-Identifier: MIT OR Apache-2.0
use std::io::Write;

/**
The default writer: standard output.

On wasm32 there is no stdout, so each write goes to `console.log` instead.
A flushed block arrives as a single write and therefore as a single console entry.
 */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StdoutSink {}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug/Clone/Copy: zero-sized, nothing to own
// - PartialEq/Eq/Hash: all instances write to the same place
// - Default: convenient zero-argument constructor
// - Display: NOT implemented - no meaningful string representation
// - Send/Sync: automatic

impl StdoutSink {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Write for StdoutSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut lock = std::io::stdout().lock();
            lock.write_all(buf)?;
            Ok(buf.len())
        }
        #[cfg(target_arch = "wasm32")]
        {
            let text = String::from_utf8_lossy(buf);
            web_sys::console::log_1(&text.trim_end_matches('\n').into());
            Ok(buf.len())
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            std::io::stdout().flush()
        }
        #[cfg(target_arch = "wasm32")]
        {
            Ok(())
        }
    }
}
