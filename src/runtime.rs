//! Runtime abstraction for the viewer's one async job, the manifest fetch.
//!
//! `spawn` puts a future on whatever executor this build carries: a tokio
//! task natively, the browser's microtask queue under wasm, or the calling
//! thread through `futures::executor` when neither is compiled in.

use std::future::Future;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Handle to a spawned task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;
}

/// Finished as soon as it exists; returned for futures run to completion inline
struct Done;

impl AsyncHandle for Done {
    fn is_finished(&self) -> bool {
        true
    }
}

#[cfg(all(feature = "tokio-runtime", not(target_arch = "wasm32")))]
struct TokioHandle(::tokio::task::JoinHandle<()>);

#[cfg(all(feature = "tokio-runtime", not(target_arch = "wasm32")))]
impl AsyncHandle for TokioHandle {
    fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

/// Spawns onto the current tokio runtime; outside one the future runs inline
#[cfg(all(feature = "tokio-runtime", not(target_arch = "wasm32")))]
pub fn spawn<F>(future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    match ::tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            log::debug!("spawning task on tokio");
            Box::new(TokioHandle(handle.spawn(future)))
        }
        Err(_) => {
            log::warn!("no tokio runtime entered, running task inline");
            block_on(future);
            Box::new(Done)
        }
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
struct FlagHandle(Arc<AtomicBool>);

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
impl AsyncHandle for FlagHandle {
    fn is_finished(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Queues the future on the browser event loop
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub fn spawn<F>(future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + 'static,
{
    let finished = Arc::new(AtomicBool::new(false));
    let flag = finished.clone();
    wasm_bindgen_futures::spawn_local(async move {
        future.await;
        flag.store(true, Ordering::Release);
    });
    Box::new(FlagHandle(finished))
}

/// Runs the future to completion on the calling thread
#[cfg(not(any(
    all(feature = "tokio-runtime", not(target_arch = "wasm32")),
    all(feature = "wasm", target_arch = "wasm32")
)))]
pub fn spawn<F>(future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + 'static,
{
    block_on(future);
    Box::new(Done)
}

/// Drives a future on the calling thread until it completes
#[cfg(not(target_arch = "wasm32"))]
pub fn block_on<F: Future>(future: F) -> F::Output {
    futures::executor::block_on(future)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on() {
        let value = block_on(async { 40 + 2 });
        assert_eq!(value, 42);
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_spawn_runs_on_tokio() {
        let (tx, rx) = ::tokio::sync::oneshot::channel();
        let handle = spawn(async move {
            let _ = tx.send("loaded");
        });
        assert_eq!(rx.await.unwrap(), "loaded");
        for _ in 0..100 {
            if handle.is_finished() {
                break;
            }
            ::tokio::task::yield_now().await;
        }
        assert!(handle.is_finished());
    }

    #[cfg(feature = "tokio-runtime")]
    #[test]
    fn test_spawn_outside_runtime_runs_inline() {
        let ran = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = ran.clone();
        let handle = spawn(async move {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        });
        assert!(handle.is_finished());
        assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
    }
}
