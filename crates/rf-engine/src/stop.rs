//! Operator-driven early stop for preview playback.

use std::io::BufRead;
use std::sync::{Arc, Once};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Source of "stop now" requests while a preview is playing.
pub trait StopSignal: Send + Sync {
    /// Return a fresh token that is cancelled when the operator asks to stop
    /// the current playback.
    fn arm(&self) -> CancellationToken;
}

/// A stop signal that never fires. Playback always runs to completion.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverStop;

impl StopSignal for NeverStop {
    fn arm(&self) -> CancellationToken {
        CancellationToken::new()
    }
}

/// Stops playback when a line is read from standard input.
///
/// The reader thread starts on the first [`StopSignal::arm`] call and lives
/// for the rest of the process. Each line cancels whichever token is armed at
/// that moment; lines read while nothing is armed are discarded.
#[derive(Debug)]
pub struct StdinStop {
    armed: Arc<Mutex<Option<CancellationToken>>>,
    reader: Once,
}

impl Default for StdinStop {
    fn default() -> Self {
        Self::new()
    }
}

impl StdinStop {
    pub fn new() -> Self {
        Self {
            armed: Arc::new(Mutex::new(None)),
            reader: Once::new(),
        }
    }

    fn start_reader(&self) {
        let armed = Arc::clone(&self.armed);
        let spawned = std::thread::Builder::new()
            .name("rf-stdin-stop".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                let mut line = String::new();
                loop {
                    line.clear();
                    match stdin.lock().read_line(&mut line) {
                        Ok(0) => break,
                        Ok(_) => {
                            if fire(&armed) {
                                tracing::info!("Stop requested from stdin");
                            }
                        }
                        Err(e) => {
                            tracing::warn!("Reading stdin for stop requests failed: {e}");
                            break;
                        }
                    }
                }
            });
        if let Err(e) = spawned {
            tracing::warn!("Could not start stdin stop reader: {e}; preview runs to completion");
        }
    }
}

impl StopSignal for StdinStop {
    fn arm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.armed.lock() = Some(token.clone());
        self.reader.call_once(|| self.start_reader());
        token
    }
}

/// Cancel and clear the armed token. Returns whether one was armed.
fn fire(armed: &Mutex<Option<CancellationToken>>) -> bool {
    match armed.lock().take() {
        Some(token) => {
            token.cancel();
            true
        }
        None => false,
    }
}
