//! Runtime abstraction layer for async operations
//!
//! Geocoding and geolocation requests are one-shot futures. The map hands
//! them to an [`AsyncSpawner`] so that it never blocks its owning thread and
//! never needs to know which executor the host runs.

use crate::prelude::Future;
use crate::{MapError, Result};
use std::pin::Pin;

/// Boxed future accepted by spawners
pub type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(&self, future: BoxedTask) -> Result<Box<dyn AsyncHandle>>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Spawns `future` on the global spawner
pub fn spawn<F>(future: F) -> Result<Box<dyn AsyncHandle>>
where
    F: Future<Output = ()> + Send + 'static,
{
    log::trace!("runtime::spawn");
    runtime().spawn_boxed(Box::pin(future))
}

/// Default spawner implementations
pub mod spawners {
    use super::*;
    use ::tokio::runtime::Handle;
    use ::tokio::task::JoinHandle;

    /// Tokio-based async spawner.
    ///
    /// Without a pinned handle it spawns onto whichever runtime is current on
    /// the calling thread and fails with [`MapError::Runtime`] when there is none.
    #[derive(Debug, Clone, Default)]
    pub struct TokioSpawner {
        handle: Option<Handle>,
    }

    impl TokioSpawner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Always spawn onto `handle`, from any thread
        pub fn with_handle(handle: Handle) -> Self {
            Self {
                handle: Some(handle),
            }
        }
    }

    impl AsyncSpawner for TokioSpawner {
        fn spawn_boxed(&self, future: BoxedTask) -> Result<Box<dyn AsyncHandle>> {
            let handle = match &self.handle {
                Some(handle) => handle.clone(),
                None => Handle::try_current().map_err(|e| MapError::Runtime(e.to_string()))?,
            };
            Ok(Box::new(TokioHandle(handle.spawn(future))))
        }
    }

    struct TokioHandle(JoinHandle<()>);

    impl AsyncHandle for TokioHandle {
        fn is_finished(&self) -> bool {
            self.0.is_finished()
        }

        fn cancel(&self) {
            self.0.abort();
        }
    }
}

/// Global runtime instance
static RUNTIME: std::sync::OnceLock<Box<dyn AsyncSpawner>> = std::sync::OnceLock::new();

/// Initialize the runtime with a specific spawner. Only the first call wins.
pub fn init_runtime(spawner: Box<dyn AsyncSpawner>) {
    if RUNTIME.set(spawner).is_err() {
        log::warn!("async runtime already initialised, ignoring");
    }
}

/// Get the global runtime spawner
pub fn runtime() -> &'static dyn AsyncSpawner {
    RUNTIME
        .get_or_init(|| Box::new(spawners::TokioSpawner::new()))
        .as_ref()
}
