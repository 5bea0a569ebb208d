/// Cancellable request execution: a shared cancellation flag, a background
/// keystroke watcher, a worker task, and a supervisor that races the
/// watcher against the worker once per ask-cycle.
pub mod cancel;
pub mod keys;
pub mod supervisor;
pub mod watcher;
pub mod worker;

pub use supervisor::{Outcome, Supervisor};
