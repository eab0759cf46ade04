// src/crawl/barrier.rs
// =============================================================================
// This module implements the join primitive used by every crawl step.
//
// A CompletionBarrier counts outstanding units of work. A parent registers one
// unit per child before spawning it, each child marks its unit done when it
// finishes, and the parent waits until the count drains back to zero.
//
// Unlike a plain "add everything, then wait" counter, work may be registered
// while the owner is already waiting (a running child can register more work
// on the same barrier before it finishes). That is safe because:
// - increments and decrements share one lock, so the count never reads zero
//   while a registration is half-applied
// - only the decrement that moves the count from 1 to 0 signals the drain
// - the waiter subscribes to the signal BEFORE looking at the count and
//   re-checks after every wake-up, so no notification can be lost
//
// Ownership:
// - CompletionBarrier: the owning side, exactly one per crawl step. Waiting
//   consumes it, so two tasks can never wait on the same barrier and a
//   drained barrier cannot be waited on again.
// - BarrierHandle: cheap cloneable side for registering and completing work.
// - WorkGuard: one registered unit; dropping it marks the unit done, even if
//   the task holding it panics.
//
// Rust concepts:
// - Arc: Shared ownership of the counter across tasks
// - Drop: RAII cleanup that runs on every exit path
// - tokio::sync::Notify: Async wake-up without a channel to close twice
// =============================================================================

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct BarrierState {
    /// Units registered but not yet marked done
    pending: usize,
    /// How many times the count has moved from 1 to 0
    drains: usize,
    /// Set once await_all() has returned
    spent: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<BarrierState>,
    drained: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        // Every panic in this module happens after the guard is dropped, so
        // the state behind a poisoned lock is never half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn register(&self, delta: usize) {
        if delta == 0 {
            return;
        }

        let mut state = self.lock();
        if state.spent {
            drop(state);
            panic!("completion barrier misuse: register_work called after the barrier drained");
        }

        match state.pending.checked_add(delta) {
            Some(pending) => state.pending = pending,
            None => {
                drop(state);
                panic!("completion barrier misuse: outstanding work count overflowed");
            }
        }
    }

    fn done(&self) {
        let mut state = self.lock();
        if state.pending == 0 {
            drop(state);
            panic!("completion barrier misuse: mark_done called without a matching register_work");
        }

        state.pending -= 1;
        if state.pending == 0 {
            state.drains += 1;
            // Still under the lock: no registration can slip in between the
            // transition to zero and the signal.
            self.drained.notify_waiters();
        }
    }
}

// The owning side of a barrier, scoped to one crawl step
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    shared: Arc<Shared>,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns a handle children can use to register and complete work
    pub fn handle(&self) -> BarrierHandle {
        BarrierHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    // Announces `delta` more units of outstanding work
    pub fn register_work(&self, delta: usize) {
        self.shared.register(delta);
    }

    // Registers one unit and returns the guard that completes it
    pub fn register_one(&self) -> WorkGuard {
        self.handle().register_one()
    }

    pub fn pending(&self) -> usize {
        self.shared.lock().pending
    }

    // Waits until every registered unit, including units registered after
    // waiting began, has been marked done
    //
    // Consumes the barrier: it is spent once this returns, and any later
    // register_work() through a leftover handle panics.
    pub async fn await_all(self) {
        loop {
            // Subscribe first, then check. A drain that happens between the
            // check and the await still wakes this future.
            let notified = self.shared.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.shared.lock();
                if state.pending == 0 {
                    state.spent = true;
                    return;
                }
            }

            notified.await;
        }
    }
}

// The registration/completion side of a barrier
#[derive(Debug, Clone)]
pub struct BarrierHandle {
    shared: Arc<Shared>,
}

impl BarrierHandle {
    pub fn register_work(&self, delta: usize) {
        self.shared.register(delta);
    }

    // Marks one registered unit as finished
    //
    // Panics if there is no outstanding unit to complete: that is a bug in
    // the caller, not a runtime condition.
    pub fn mark_done(&self) {
        self.shared.done();
    }

    pub fn register_one(&self) -> WorkGuard {
        self.shared.register(1);
        WorkGuard {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn pending(&self) -> usize {
        self.shared.lock().pending
    }

    // Number of drain signals delivered so far
    pub fn drains(&self) -> usize {
        self.shared.lock().drains
    }
}

// One registered unit of work; marks itself done when dropped
#[derive(Debug)]
#[must_use = "dropping the guard immediately marks the work as done"]
pub struct WorkGuard {
    shared: Arc<Shared>,
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.shared.done();
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not a channel that gets closed when the count hits zero?
//    - Closing twice, or sending after close, is easy to get wrong when
//      several tasks race to finish at the same moment
//    - Notify has no "closed" state, so there is nothing to double-close
//
// 2. Why does await_all() take `self` instead of `&self`?
//    - Moving the barrier into the call means nobody else can call it again
//    - The compiler enforces "one waiter, one wait" for us
//
// 3. What does tokio::pin! do?
//    - enable() needs a pinned future (it must not move in memory once it
//      is registered for wake-ups)
//    - pin! pins it on the stack of the async function
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    const WAIT_LIMIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_await_with_no_work_returns() {
        let barrier = CompletionBarrier::new();
        timeout(WAIT_LIMIT, barrier.await_all())
            .await
            .expect("empty barrier should not block");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_waits_for_every_child() {
        let barrier = CompletionBarrier::new();
        let finished = Arc::new(AtomicUsize::new(0));

        for i in 0..10u64 {
            let guard = barrier.register_one();
            let finished = finished.clone();
            tokio::spawn(async move {
                let _guard = guard;
                sleep(Duration::from_millis(10 * (10 - i))).await;
                finished.fetch_add(1, Ordering::SeqCst);
            });
        }

        timeout(WAIT_LIMIT, barrier.await_all()).await.unwrap();
        assert_eq!(finished.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_registration_after_wait_began() {
        let barrier = CompletionBarrier::new();
        let handle = barrier.handle();
        let finished = Arc::new(AtomicUsize::new(0));

        let parent = barrier.register_one();
        {
            let handle = handle.clone();
            let finished = finished.clone();
            tokio::spawn(async move {
                // Give the owner time to start waiting
                sleep(Duration::from_millis(50)).await;
                for _ in 0..3 {
                    let child = handle.register_one();
                    let finished = finished.clone();
                    tokio::spawn(async move {
                        let _child = child;
                        sleep(Duration::from_millis(30)).await;
                        finished.fetch_add(1, Ordering::SeqCst);
                    });
                }
                finished.fetch_add(1, Ordering::SeqCst);
                drop(parent);
            });
        }

        timeout(WAIT_LIMIT, barrier.await_all()).await.unwrap();
        assert_eq!(finished.load(Ordering::SeqCst), 4);
        assert_eq!(handle.pending(), 0);
    }

    #[test]
    fn test_drain_signalled_once_under_racing_completions() {
        let barrier = CompletionBarrier::new();
        let handle = barrier.handle();
        barrier.register_work(256);

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for _ in 0..32 {
                        handle.mark_done();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(handle.pending(), 0);
        assert_eq!(handle.drains(), 1);
    }

    #[test]
    #[should_panic(expected = "mark_done called without a matching register_work")]
    fn test_mark_done_without_registration_panics() {
        let barrier = CompletionBarrier::new();
        barrier.handle().mark_done();
    }

    #[tokio::test]
    #[should_panic(expected = "register_work called after the barrier drained")]
    async fn test_register_after_drain_panics() {
        let barrier = CompletionBarrier::new();
        let handle = barrier.handle();
        barrier.await_all().await;
        handle.register_work(1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_child_still_completes() {
        let barrier = CompletionBarrier::new();
        let guard = barrier.register_one();

        let task = tokio::spawn(async move {
            let _guard = guard;
            panic!("child blew up");
        });

        timeout(WAIT_LIMIT, barrier.await_all()).await.unwrap();
        assert!(task.await.is_err());
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let barrier = CompletionBarrier::new();
        barrier.register_work(0);
        assert_eq!(barrier.pending(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        // Children finish in a random order and some register grandchildren
        // on the same barrier before finishing. The wait must cover them all.
        #[test]
        fn prop_await_covers_late_registrations(
            children in proptest::collection::vec((0u64..20, 0usize..4, 0u64..20), 1..16)
        ) {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(4)
                .enable_all()
                .build()
                .unwrap();

            let expected = children.len() + children.iter().map(|(_, n, _)| n).sum::<usize>();

            let finished = runtime.block_on(async move {
                let barrier = CompletionBarrier::new();
                let handle = barrier.handle();
                let finished = Arc::new(AtomicUsize::new(0));

                for (delay, grandchildren, grand_delay) in children {
                    let guard = barrier.register_one();
                    let handle = handle.clone();
                    let finished = finished.clone();
                    tokio::spawn(async move {
                        let _guard = guard;
                        sleep(Duration::from_millis(delay)).await;
                        for _ in 0..grandchildren {
                            let grand = handle.register_one();
                            let finished = finished.clone();
                            tokio::spawn(async move {
                                let _grand = grand;
                                sleep(Duration::from_millis(grand_delay)).await;
                                finished.fetch_add(1, Ordering::SeqCst);
                            });
                        }
                        finished.fetch_add(1, Ordering::SeqCst);
                    });
                }

                timeout(WAIT_LIMIT, barrier.await_all()).await.unwrap();
                assert_eq!(handle.pending(), 0);
                finished.load(Ordering::SeqCst)
            });

            prop_assert_eq!(finished, expected);
        }
    }
}
