use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::KeyCode;
use tracing::info;

use super::cancel::CancelToken;
use super::keys::{KeySource, TerminalKeys};
use super::watcher::KeyWatcher;
use super::worker::{self, RequestTask};

/// Result of one ask-cycle.
#[derive(Debug)]
pub enum Outcome<T> {
    Completed(T),
    Failed(anyhow::Error),
    Cancelled,
}

/// Orchestrates one cancellable request at a time: fresh token state, a
/// keystroke watcher, a worker task, and a poll loop that races the two.
///
/// The token lives as long as the supervisor and is reset at the start of
/// each cycle, never mid-cycle.
#[derive(Clone)]
pub struct Supervisor {
    token: CancelToken,
    cancel_key: KeyCode,
    poll_interval: Duration,
}

impl Supervisor {
    pub fn new(cancel_key: KeyCode, poll_interval: Duration) -> Self {
        Self {
            token: CancelToken::new(),
            cancel_key,
            poll_interval,
        }
    }

    /// Programmatic equivalent of the cancel keystroke, for callers that
    /// want to abort without terminal input.
    #[allow(dead_code)]
    pub fn request_cancel(&self) {
        self.token.signal();
    }

    /// Run `work` until it completes or the cancel key is pressed.
    pub async fn run<T, F>(&self, work: F) -> Outcome<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        self.run_with_keys(TerminalKeys::new(), work).await
    }

    /// Same as [`Self::run`], with an explicit key source.
    pub async fn run_with_keys<K, T, F>(&self, keys: K, work: F) -> Outcome<T>
    where
        K: KeySource,
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        self.token.reset();
        let watcher = KeyWatcher::spawn(
            keys,
            self.token.clone(),
            self.cancel_key,
            self.poll_interval,
        );
        let task = worker::submit(work);

        let outcome = self.poll(task).await;

        // Unconditional teardown: the watcher must release the terminal
        // before the prompt reads stdin again. The wait is bounded; a
        // stuck terminal read cannot wedge the prompt.
        watcher.shutdown(self.poll_interval * 2).await;

        outcome
    }

    async fn poll<T>(&self, task: RequestTask<T>) -> Outcome<T> {
        let mut tick = tokio::time::interval(self.poll_interval);
        loop {
            tick.tick().await;

            // Completion is checked before cancellation: a request that
            // finishes in the same tick as the cancel keystroke counts as
            // completed, not cancelled.
            if task.is_done() {
                return match task.outcome().await {
                    Ok(value) => Outcome::Completed(value),
                    Err(err) => Outcome::Failed(err),
                };
            }

            if self.token.is_signaled() {
                info!("request cancelled by user");
                task.abandon();
                return Outcome::Cancelled;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::keys::testing::ScriptedKeys;
    use anyhow::anyhow;
    use std::time::Instant;

    const POLL: Duration = Duration::from_millis(20);

    fn supervisor() -> Supervisor {
        Supervisor::new(KeyCode::Esc, POLL)
    }

    #[tokio::test]
    async fn completes_without_cancellation() {
        let sup = supervisor();
        let outcome = sup
            .run_with_keys(ScriptedKeys::quiet(), async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok("pong".to_string())
            })
            .await;

        assert!(matches!(outcome, Outcome::Completed(ref v) if v == "pong"));
        assert!(!sup.token.is_signaled());
    }

    #[tokio::test]
    async fn cancel_key_aborts_long_request() {
        let sup = supervisor();
        let keys = ScriptedKeys::script(
            vec![None, Some(KeyCode::Esc)],
            Duration::from_millis(15),
        );
        let state = keys.state();

        let started = Instant::now();
        let outcome = sup
            .run_with_keys(keys, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok("too late".to_string())
            })
            .await;

        assert!(matches!(outcome, Outcome::Cancelled));
        // Cancellation is observed within a poll tick or two, not after
        // the full request duration.
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(state.closed(), 1);
    }

    #[tokio::test]
    async fn completion_wins_a_same_tick_race() {
        let sup = supervisor();
        let task = worker::submit(async { Ok("done".to_string()) });

        // Let the worker settle, then signal: both conditions now hold
        // when polling starts, and completion must win.
        tokio::time::sleep(Duration::from_millis(30)).await;
        sup.token.signal();

        let outcome = sup.poll(task).await;
        assert!(matches!(outcome, Outcome::Completed(ref v) if v == "done"));
    }

    #[tokio::test]
    async fn failure_preserves_the_cause() {
        let sup = supervisor();
        let outcome: Outcome<String> = sup
            .run_with_keys(ScriptedKeys::quiet(), async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err(anyhow!("connection refused"))
            })
            .await;

        match outcome {
            Outcome::Failed(err) => assert!(err.to_string().contains("connection refused")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn request_cancel_works_without_a_keystroke() {
        let sup = supervisor();
        let trigger = sup.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.request_cancel();
        });

        let outcome = sup
            .run_with_keys(ScriptedKeys::quiet(), async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(outcome, Outcome::Cancelled));
    }

    #[tokio::test]
    async fn sequential_cycles_release_the_terminal() {
        let sup = supervisor();

        for round in 0..3u32 {
            let keys = ScriptedKeys::quiet();
            let state = keys.state();

            let outcome = sup
                .run_with_keys(keys, async move { Ok(round) })
                .await;

            assert!(matches!(outcome, Outcome::Completed(v) if v == round));
            assert_eq!(state.opened(), state.closed());
            assert_eq!(state.overlaps(), 0);
        }
    }

    #[tokio::test]
    async fn token_resets_between_cycles() {
        let sup = supervisor();

        // First cycle ends cancelled, leaving the token signaled.
        let keys = ScriptedKeys::script(vec![Some(KeyCode::Esc)], Duration::from_millis(1));
        let outcome = sup
            .run_with_keys(keys, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(outcome, Outcome::Cancelled));
        assert!(sup.token.is_signaled());

        // The next cycle resets it and runs to completion.
        let outcome = sup
            .run_with_keys(ScriptedKeys::quiet(), async { Ok("fresh") })
            .await;
        assert!(matches!(outcome, Outcome::Completed("fresh")));
        assert!(!sup.token.is_signaled());
    }
}
