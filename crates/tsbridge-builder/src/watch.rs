//! Keeps the compiler's watch loop and the bundler's watch loop in step.
//!
//! When the bundler sees a change it calls [`Watch::change_triggered`] and
//! later parks in [`Watch::await_ready`] before reading compiled text. If the
//! compiler reports [`Watch::compiler_started`] within the timeout, the
//! bundler keeps waiting until [`Watch::compiler_ended`]; otherwise the change
//! is treated as one the compiler does not care about and the bundler proceeds.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::trace;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

type WaitFuture = Shared<LocalBoxFuture<'static, bool>>;

/// A one-shot latch resolving to `true` when ended explicitly and `false`
/// when its deadline passes first.
struct Wait {
    resolve: Option<oneshot::Sender<bool>>,
    promise: WaitFuture,
}

impl Wait {
    fn new(timeout: Option<Duration>) -> Self {
        let (tx, rx) = oneshot::channel::<bool>();
        let promise = match timeout {
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                async move {
                    tokio::select! {
                        Ok(forced) = rx => forced,
                        () = tokio::time::sleep_until(deadline) => false,
                    }
                }
                .boxed_local()
            }
            // Only `end` resolves an unbounded wait; a dropped sender never does.
            None => async move {
                match rx.await {
                    Ok(forced) => forced,
                    Err(_) => futures::future::pending().await,
                }
            }
            .boxed_local(),
        };
        Self {
            resolve: Some(tx),
            promise: promise.shared(),
        }
    }

    fn end(&mut self, forced: bool) {
        if let Some(resolve) = self.resolve.take() {
            // The receiver only disappears once the deadline has already won.
            let _ = resolve.send(forced);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchPhase {
    Idle,
    /// A change was seen; waiting for the compiler to pick it up.
    ChangePending,
    /// The compiler picked the change up and has not finished yet.
    CompilerRunning,
}

struct WatchState {
    timeout: Duration,
    caller_wait: Option<Wait>,
    compiler_wait: Option<Wait>,
}

/// Cloneable handle; clones share the same state.
#[derive(Clone)]
pub struct Watch {
    state: Rc<RefCell<WatchState>>,
}

impl Default for Watch {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Watch {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: Rc::new(RefCell::new(WatchState {
                timeout,
                caller_wait: None,
                compiler_wait: None,
            })),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.state.borrow().timeout
    }

    pub fn phase(&self) -> WatchPhase {
        let state = self.state.borrow();
        match (&state.caller_wait, &state.compiler_wait) {
            (Some(_), _) => WatchPhase::ChangePending,
            (None, Some(_)) => WatchPhase::CompilerRunning,
            (None, None) => WatchPhase::Idle,
        }
    }

    /// The compiler began a pass: release callers into waiting for its end.
    pub fn compiler_started(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(mut wait) = state.caller_wait.take() {
            trace!("compiler started; forcing pending change wait");
            wait.end(true);
        }
    }

    /// The compiler finished a pass: release everyone.
    pub fn compiler_ended(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(mut wait) = state.compiler_wait.take() {
            trace!("compiler ended; releasing waiters");
            wait.end(true);
        }
        state.caller_wait = None;
    }

    /// The bundler saw a change. Idempotent while a change is pending or the
    /// compiler is still running.
    pub fn change_triggered(&self) {
        let mut state = self.state.borrow_mut();
        if state.caller_wait.is_some() || state.compiler_wait.is_some() {
            return;
        }
        trace!(timeout_ms = state.timeout.as_millis() as u64, "change triggered");
        state.caller_wait = Some(Wait::new(Some(state.timeout)));
        state.compiler_wait = Some(Wait::new(None));
    }

    /// Resolve once it is safe to read compiled output.
    ///
    /// With a change pending, waits for the compiler to start; if it does not
    /// start in time both waits are dropped and this returns. While the
    /// compiler is running, waits for it to end.
    pub async fn await_ready(&self) {
        let caller = self.caller_promise();
        if let Some(promise) = caller {
            if !promise.clone().await {
                trace!("compiler did not start in time; resuming");
                self.clear_timed_out(&promise);
                return;
            }
        }

        let compiler = self.compiler_promise();
        if let Some(promise) = compiler {
            promise.await;
        }
    }

    /// Drop both waits, unless the compiler has since taken over this change.
    fn clear_timed_out(&self, promise: &WaitFuture) {
        let mut state = self.state.borrow_mut();
        let still_pending = state
            .caller_wait
            .as_ref()
            .is_some_and(|wait| wait.promise.ptr_eq(promise));
        if still_pending {
            state.caller_wait = None;
            state.compiler_wait = None;
        }
    }

    fn caller_promise(&self) -> Option<WaitFuture> {
        let state = self.state.borrow();
        state.caller_wait.as_ref().map(|wait| wait.promise.clone())
    }

    fn compiler_promise(&self) -> Option<WaitFuture> {
        let state = self.state.borrow();
        state.compiler_wait.as_ref().map(|wait| wait.promise.clone())
    }
}

impl std::fmt::Debug for Watch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watch")
            .field("timeout", &self.timeout())
            .field("phase", &self.phase())
            .finish()
    }
}
