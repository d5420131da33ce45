#![forbid(unsafe_code)]

//! Host-driven virtual-time scheduler.
//!
//! Time only moves when the host calls [`Scheduler::advance`] (or one of the
//! flush helpers). A browser adapter advances it from its event loop; tests
//! advance it explicitly, which makes every timer-driven transition
//! deterministic.
//!
//! # Invariants
//!
//! 1. Tasks run in `(due, scheduled)` order; equal deadlines run FIFO.
//! 2. `now()` during a task equals that task's deadline.
//! 3. No borrow is held while a task runs; tasks may schedule or cancel.
//! 4. A cancelled task never runs.
//! 5. A task that panics is logged and dropped; later tasks still run.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use modalkit_core::isolate::call_isolated;

/// Upper bound on tasks executed by a single flush, guarding against tasks
/// that keep rescheduling themselves at zero delay.
const MAX_TASKS_PER_FLUSH: usize = 10_000;

/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

type Task = Box<dyn FnOnce()>;

struct Queue {
    now_ms: u64,
    next_id: u64,
    tasks: BTreeMap<(u64, u64), Task>,
}

impl Queue {
    fn pop_due(&mut self, limit_ms: u64) -> Option<(u64, Task)> {
        let (&(due, id), _) = self.tasks.first_key_value()?;
        if due > limit_ms {
            return None;
        }
        self.tasks.remove(&(due, id)).map(|task| (due, task))
    }
}

/// Shared handle to a virtual clock and its timer queue.
#[derive(Clone)]
pub struct Scheduler {
    queue: Rc<RefCell<Queue>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: Rc::new(RefCell::new(Queue {
                now_ms: 0,
                next_id: 1,
                tasks: BTreeMap::new(),
            })),
        }
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        Duration::from_millis(self.queue.borrow().now_ms)
    }

    /// Run `task` once `delay` has elapsed.
    pub fn set_timeout(&self, delay: Duration, task: impl FnOnce() + 'static) -> TimerId {
        let mut queue = self.queue.borrow_mut();
        let id = queue.next_id;
        queue.next_id += 1;
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let due = queue.now_ms.saturating_add(delay_ms);
        queue.tasks.insert((due, id), Box::new(task));
        TimerId(id)
    }

    /// Run `task` on the next tick (zero delay, after already-due tasks).
    pub fn defer(&self, task: impl FnOnce() + 'static) -> TimerId {
        self.set_timeout(Duration::ZERO, task)
    }

    /// Cancel a pending task. Returns whether it was still pending.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let mut queue = self.queue.borrow_mut();
        let key = queue.tasks.keys().find(|(_, tid)| *tid == id.0).copied();
        key.and_then(|key| queue.tasks.remove(&key)).is_some()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().tasks.len()
    }

    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.queue
            .borrow()
            .tasks
            .keys()
            .any(|(_, tid)| *tid == id.0)
    }

    /// Move the clock forward by `by`, running every task that falls due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let by_ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        let target = self.queue.borrow().now_ms.saturating_add(by_ms);
        let ran = self.run_until(target);
        self.queue.borrow_mut().now_ms = target;
        ran
    }

    /// Run tasks already due at the current time (zero-delay ticks).
    pub fn flush(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Run every pending task, advancing the clock to the last deadline.
    pub fn run_all(&self) -> usize {
        self.run_until(u64::MAX)
    }

    fn run_until(&self, limit_ms: u64) -> usize {
        let mut ran = 0;
        while ran < MAX_TASKS_PER_FLUSH {
            let next = self.queue.borrow_mut().pop_due(limit_ms);
            let Some((due, task)) = next else {
                return ran;
            };
            {
                let mut queue = self.queue.borrow_mut();
                queue.now_ms = queue.now_ms.max(due);
            }
            tracing::trace!(due_ms = due, "scheduler: running task");
            call_isolated("scheduled task", task);
            ran += 1;
        }
        tracing::warn!(
            limit = MAX_TASKS_PER_FLUSH,
            pending = self.pending(),
            "scheduler: flush limit reached; remaining tasks left queued"
        );
        ran
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.borrow();
        f.debug_struct("Scheduler")
            .field("now_ms", &queue.now_ms)
            .field("pending", &queue.tasks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn runs_only_due_tasks() {
        let s = Scheduler::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        s.set_timeout(ms(200), move || h.set(h.get() + 1));

        assert_eq!(s.advance(ms(199)), 0);
        assert_eq!(hits.get(), 0);
        assert_eq!(s.advance(ms(1)), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(s.now(), ms(200));
    }

    #[test]
    fn equal_deadlines_run_fifo() {
        let s = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let l = Rc::clone(&log);
            s.set_timeout(ms(10), move || l.borrow_mut().push(n));
        }
        s.advance(ms(10));
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn cancelled_task_never_runs() {
        let s = Scheduler::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = s.set_timeout(ms(5), move || h.set(1));
        assert!(s.is_pending(id));
        assert!(s.clear_timeout(id));
        assert!(!s.clear_timeout(id));
        s.advance(ms(10));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn task_sees_its_deadline_and_can_chain() {
        let s = Scheduler::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let handle = s.clone();
        let log = Rc::clone(&seen);
        s.set_timeout(ms(100), move || {
            log.borrow_mut().push(handle.now());
            let inner_log = Rc::clone(&log);
            let inner_handle = handle.clone();
            handle.defer(move || inner_log.borrow_mut().push(inner_handle.now()));
        });
        s.advance(ms(150));
        assert_eq!(*seen.borrow(), vec![ms(100), ms(100)]);
        assert_eq!(s.now(), ms(150));
    }

    #[test]
    fn flush_runs_deferred_only() {
        let s = Scheduler::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        s.defer(move || h.set(h.get() + 1));
        let h = Rc::clone(&hits);
        s.set_timeout(ms(1), move || h.set(h.get() + 10));
        assert_eq!(s.flush(), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(s.pending(), 1);
        assert_eq!(s.run_all(), 1);
        assert_eq!(hits.get(), 11);
        assert_eq!(s.now(), ms(1));
    }

    #[test]
    fn panicking_task_does_not_stall_queue() {
        let s = Scheduler::new();
        let hits = Rc::new(Cell::new(0));
        s.defer(|| panic!("task bug"));
        let h = Rc::clone(&hits);
        s.defer(move || h.set(1));
        s.flush();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn self_rescheduling_task_is_bounded() {
        fn again(s: Scheduler) {
            let next = s.clone();
            s.defer(move || again(next));
        }
        let s = Scheduler::new();
        again(s.clone());
        assert_eq!(s.flush(), MAX_TASKS_PER_FLUSH);
        assert_eq!(s.pending(), 1);
    }
}
