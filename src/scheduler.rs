//! Keyed FIFO operation scheduler: operations tagged by
//! `(resource_kind, resource_id)` execute strictly in submission order per
//! key; different keys run fully concurrently.
//!
//! The distilled system's own scheduler relies on a single-threaded
//! cooperative event loop, where "queue is empty, so delete the per-key
//! entry" can't race because nothing else runs between the check and the
//! delete. That assumption does not hold on a multi-threaded tokio
//! runtime, so this folds the `draining` flag into the same mutex that
//! guards the queue: becoming the drain owner (on submit) and stepping
//! down (on drain-loop-pop-returns-empty) are both transitions of one
//! locked value, never two separately-synchronized reads. Final removal
//! of the per-key map entry happens under `DashMap::remove_if`, which
//! holds the shard lock across the re-check, so a concurrent `submit`
//! racing the same key can never be dropped on the floor.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::IndexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub kind: &'static str,
    pub id: Uuid,
}

impl Key {
    pub fn new(kind: &'static str, id: Uuid) -> Self {
        Self { kind, id }
    }
}

type BoxedTask = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

struct Job {
    cancelled: Arc<AtomicBool>,
    run: BoxedTask,
}

struct KeyQueue {
    jobs: VecDeque<Job>,
    draining: bool,
}

struct KeyState {
    queue: Mutex<KeyQueue>,
}

/// A handle to a submitted operation. Awaiting it yields the task's
/// result; dropping it without awaiting does not cancel the task.
pub struct OperationHandle<T> {
    rx: oneshot::Receiver<Result<T, IndexError>>,
    cancelled: Arc<AtomicBool>,
}

impl<T> OperationHandle<T> {
    /// Best-effort cancellation: only effective if the job has not yet
    /// started running. A running job ignores this flag.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl<T: Send + 'static> Future for OperationHandle<T> {
    type Output = Result<T, IndexError>;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(IndexError::Cancelled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// The scheduler itself: a map from resource key to its per-key queue
/// state, reclaimed once the queue drains. Cheap to clone — the inner map
/// is `Arc`-wrapped so the background drain loop can outlive a borrow of
/// `&self`.
#[derive(Clone)]
pub struct OperationScheduler {
    keys: Arc<DashMap<Key, Arc<KeyState>>>,
}

impl Default for OperationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationScheduler {
    pub fn new() -> Self {
        Self { keys: Arc::new(DashMap::new()) }
    }

    /// Submit an async task under `key`. Tasks submitted for the same key
    /// run strictly in submission order; tasks under different keys run
    /// concurrently, bounded only by the tokio runtime's worker pool.
    pub fn submit<F, Fut, T>(&self, key: Key, task: F) -> OperationHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, IndexError>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_for_job = cancelled.clone();

        let run: BoxedTask = Box::new(move || {
            Box::pin(async move {
                if cancelled_for_job.load(Ordering::SeqCst) {
                    let _ = tx.send(Err(IndexError::Cancelled));
                    return;
                }
                let result = task().await;
                let _ = tx.send(result);
            })
        });

        let job = Job { cancelled: cancelled.clone(), run };

        let state = self
            .keys
            .entry(key)
            .or_insert_with(|| {
                Arc::new(KeyState {
                    queue: Mutex::new(KeyQueue { jobs: VecDeque::new(), draining: false }),
                })
            })
            .clone();

        let should_spawn_drainer = {
            let mut q = state.queue.lock();
            q.jobs.push_back(job);
            if q.draining {
                false
            } else {
                q.draining = true;
                true
            }
        };

        if should_spawn_drainer {
            let keys = self.keys.clone();
            tokio::spawn(drain_key(keys, key, state));
        }

        OperationHandle { rx, cancelled }
    }
}

/// Owns draining `key` to completion: pop a job, run it to completion
/// (dropping the queue lock while it runs so concurrent submitters are
/// never blocked on a running job), repeat until the queue is empty, then
/// step down as drain owner and try to reclaim the map entry.
async fn drain_key(keys: Arc<DashMap<Key, Arc<KeyState>>>, key: Key, state: Arc<KeyState>) {
    loop {
        let next = {
            let mut q = state.queue.lock();
            match q.jobs.pop_front() {
                Some(job) => Some(job),
                None => {
                    q.draining = false;
                    None
                }
            }
        };

        match next {
            Some(job) => (job.run)().await,
            None => break,
        }
    }

    // Re-validate under the shard lock: only remove if this is still the
    // same state, the queue is empty, and nobody re-marked it draining in
    // the window between our unlock above and this call.
    keys.remove_if(&key, |_, existing| {
        Arc::ptr_eq(existing, &state) && {
            let q = existing.queue.lock();
            q.jobs.is_empty() && !q.draining
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_key_runs_in_order() {
        let sched = OperationScheduler::new();
        let key = Key::new("library", Uuid::new_v4());
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let o1 = order.clone();
        let h1 = sched.submit(key, move || {
            let o1 = o1.clone();
            async move {
                o1.lock().push(1);
                Ok::<_, IndexError>(())
            }
        });
        let o2 = order.clone();
        let h2 = sched.submit(key, move || {
            let o2 = o2.clone();
            async move {
                o2.lock().push(2);
                Ok::<_, IndexError>(())
            }
        });

        h1.await.unwrap();
        h2.await.unwrap();
        assert_eq!(*order.lock(), vec![1, 2]);
    }

    #[tokio::test]
    async fn cross_key_runs_independently() {
        let sched = OperationScheduler::new();
        let a = Key::new("library", Uuid::new_v4());
        let b = Key::new("library", Uuid::new_v4());
        let ha = sched.submit(a, || async { Ok::<_, IndexError>(1) });
        let hb = sched.submit(b, || async { Ok::<_, IndexError>(2) });
        assert_eq!(ha.await.unwrap(), 1);
        assert_eq!(hb.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn cancel_before_start_yields_cancelled() {
        let sched = OperationScheduler::new();
        let key = Key::new("chunk", Uuid::new_v4());
        let blocker = sched.submit(key, || async {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            Ok::<_, IndexError>(())
        });
        let handle = sched.submit(key, || async { Ok::<_, IndexError>(42) });
        handle.cancel();
        blocker.await.unwrap();
        let result = handle.await;
        assert!(matches!(result, Err(IndexError::Cancelled)));
    }

    #[tokio::test]
    async fn map_entry_reclaimed_after_drain() {
        let sched = OperationScheduler::new();
        let key = Key::new("document", Uuid::new_v4());
        sched.submit(key, || async { Ok::<_, IndexError>(()) }).await.unwrap();
        tokio::task::yield_now().await;
        // Give the spawned drain task a moment to finish and remove itself.
        for _ in 0..50 {
            if !sched.keys.contains_key(&key) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(!sched.keys.contains_key(&key));
    }
}
