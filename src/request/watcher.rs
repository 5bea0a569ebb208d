use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::event::KeyCode;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::cancel::CancelToken;
use super::keys::KeySource;

/// Background keystroke watcher for one ask-cycle.
///
/// Runs on a blocking thread so the bounded terminal wait never stalls the
/// runtime. The watcher is advisory: the supervisor waits for it only
/// briefly at teardown and detaches it if it overruns.
pub struct KeyWatcher {
    active: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl KeyWatcher {
    /// Start watching for `cancel_key`. On a match the token is signaled
    /// and the watcher exits. If the key source cannot be opened (stdin is
    /// not a terminal), the watcher exits immediately and the cycle runs
    /// without keystroke cancellation.
    pub fn spawn<K: KeySource>(
        mut keys: K,
        token: CancelToken,
        cancel_key: KeyCode,
        poll_interval: Duration,
    ) -> Self {
        let active = Arc::new(AtomicBool::new(true));
        let still_active = Arc::clone(&active);

        let handle = tokio::task::spawn_blocking(move || {
            if let Err(err) = keys.open() {
                warn!("cancellation watcher disabled: {err}");
                return;
            }

            while still_active.load(Ordering::Relaxed) && !token.is_signaled() {
                match keys.try_read_key(poll_interval) {
                    Ok(Some(key)) if key == cancel_key => {
                        debug!("cancel key pressed");
                        token.signal();
                        break;
                    }
                    // Other keys are discarded; a timeout re-checks the flag.
                    Ok(_) => {}
                    Err(err) => {
                        warn!("cancellation watcher stopped: {err}");
                        break;
                    }
                }
            }
            // `keys` drops here, restoring the terminal before the prompt
            // takes stdin back.
        });

        Self { active, handle }
    }

    /// Ask the watcher to stop and wait at most `wait` for it to release
    /// the terminal. The watcher notices the flag within one poll
    /// interval; one stuck past the bound is detached, never joined
    /// unboundedly.
    pub async fn shutdown(self, wait: Duration) {
        self.active.store(false, Ordering::Relaxed);
        if tokio::time::timeout(wait, self.handle).await.is_err() {
            warn!("keystroke watcher did not stop within {wait:?}; detaching");
        }
    }
}
