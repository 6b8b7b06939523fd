//! Deferred operations
//!
//! Network-bound facade calls return a [`Request`]. It can be awaited
//! directly with [`Request::execute`], or dispatched in the background with
//! [`Request::run`], which reports through a callback and hands back a
//! [`RequestHandle`] for cancellation.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::KinResult;

/// A pending operation producing `T`
pub struct Request<T> {
    future: BoxFuture<'static, KinResult<T>>,
}

impl<T: Send + 'static> Request<T> {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = KinResult<T>> + Send + 'static,
    {
        Self {
            future: future.boxed(),
        }
    }

    /// Run the operation to completion on the caller's task
    pub async fn execute(self) -> KinResult<T> {
        self.future.await
    }

    /// Spawn the operation on the current Tokio runtime and deliver the
    /// outcome to `callback`.
    ///
    /// The callback runs on a runtime worker. Once
    /// [`RequestHandle::cancel`] returns, the callback will not be invoked.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn run<C>(self, callback: C) -> RequestHandle
    where
        C: FnOnce(KinResult<T>) + Send + 'static,
    {
        let gate = Arc::new(CallbackGate::default());
        let task_gate = Arc::clone(&gate);
        let future = self.future;

        let task = tokio::spawn(async move {
            let result = future.await;
            task_gate.deliver(result, callback);
        });

        RequestHandle { gate, task }
    }
}

impl<T> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request").finish_non_exhaustive()
    }
}

/// Guards callback delivery against a concurrent cancel
#[derive(Default)]
struct CallbackGate {
    cancelled: AtomicBool,
    delivery: Mutex<()>,
}

impl CallbackGate {
    fn deliver<T, C>(&self, result: KinResult<T>, callback: C)
    where
        C: FnOnce(KinResult<T>),
    {
        let _guard = self.delivery.lock().unwrap_or_else(|e| e.into_inner());
        if self.cancelled.load(Ordering::SeqCst) {
            debug!("Request cancelled, dropping result");
            return;
        }
        callback(result);
    }

    fn cancel(&self) {
        let _guard = self.delivery.lock().unwrap_or_else(|e| e.into_inner());
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Handle to a request dispatched with [`Request::run`]
pub struct RequestHandle {
    gate: Arc<CallbackGate>,
    task: JoinHandle<()>,
}

impl RequestHandle {
    /// Detach the callback and abort the operation if it is still running.
    ///
    /// Must not be called from inside the request's own callback.
    pub fn cancel(&self) {
        self.gate.cancel();
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.gate.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the operation has finished, been cancelled or panicked
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandle")
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}
