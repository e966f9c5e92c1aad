//! Cooperative task deferral.
//!
//! The [`Scheduler`] is the event loop's stand-in for timers and render
//! callbacks. It keeps three queues:
//!
//! - **tick**: work deferred to the next turn of the loop (hover delays).
//! - **stable**: work deferred until rendering settles (first-item focus).
//! - **microtask**: work run as soon as the current task finishes.
//!
//! Nothing runs until the host drives the scheduler with [`Scheduler::tick`],
//! [`Scheduler::stabilize`] or [`Scheduler::run_until_idle`]. Tasks are
//! removed from their queue before they run, so a task may freely schedule
//! or cancel other tasks.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use log::warn;

/// Upper bound on tasks drained by a single flush.
pub const MAX_TASKS_PER_FLUSH: usize = 10_000;

/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

type Task = Box<dyn FnOnce()>;

/// Queue a task was placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskQueue {
    /// Next loop turn.
    Tick,
    /// Next render-stable point.
    Stable,
    /// End of the current task.
    Microtask,
}

/// Single-threaded cooperative scheduler.
#[derive(Default)]
pub struct Scheduler {
    next_id: Cell<u64>,
    ticks: RefCell<VecDeque<(TaskId, Task)>>,
    stable: RefCell<VecDeque<(TaskId, Task)>>,
    microtasks: RefCell<VecDeque<(TaskId, Task)>>,
    ticks_run: Cell<u64>,
}

impl Scheduler {
    /// Create an idle scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&self) -> TaskId {
        let id = TaskId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        id
    }

    fn queue(&self, queue: TaskQueue) -> &RefCell<VecDeque<(TaskId, Task)>> {
        match queue {
            TaskQueue::Tick => &self.ticks,
            TaskQueue::Stable => &self.stable,
            TaskQueue::Microtask => &self.microtasks,
        }
    }

    /// Place a task in the given queue.
    pub fn enqueue<F>(&self, queue: TaskQueue, task: F) -> TaskId
    where
        F: FnOnce() + 'static,
    {
        let id = self.allocate();
        self.queue(queue)
            .borrow_mut()
            .push_back((id, Box::new(task)));
        id
    }

    /// Defer a task to the next tick.
    pub fn schedule<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + 'static,
    {
        self.enqueue(TaskQueue::Tick, task)
    }

    /// Defer a task until rendering is stable.
    pub fn on_stable<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + 'static,
    {
        self.enqueue(TaskQueue::Stable, task)
    }

    /// Run a task once the current task completes.
    pub fn microtask<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + 'static,
    {
        self.enqueue(TaskQueue::Microtask, task)
    }

    /// Cancel a pending task.
    ///
    /// Returns `false` if the task already ran or was cancelled.
    pub fn cancel(&self, id: TaskId) -> bool {
        [TaskQueue::Tick, TaskQueue::Stable, TaskQueue::Microtask]
            .into_iter()
            .any(|queue| {
                let mut tasks = self.queue(queue).borrow_mut();
                match tasks.iter().position(|(tid, _)| *tid == id) {
                    Some(index) => {
                        // Dropping the closure may drop captured Rc handles;
                        // keep the borrow short.
                        let removed = tasks.remove(index);
                        drop(tasks);
                        drop(removed);
                        true
                    }
                    None => false,
                }
            })
    }

    /// Check if a task is still waiting to run.
    #[must_use]
    pub fn is_pending(&self, id: TaskId) -> bool {
        [TaskQueue::Tick, TaskQueue::Stable, TaskQueue::Microtask]
            .into_iter()
            .any(|queue| self.queue(queue).borrow().iter().any(|(tid, _)| *tid == id))
    }

    fn pop(&self, queue: TaskQueue) -> Option<Task> {
        let entry = self.queue(queue).borrow_mut().pop_front();
        entry.map(|(_, task)| task)
    }

    /// Drain the microtask queue, including microtasks queued while draining.
    pub fn run_microtasks(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop(TaskQueue::Microtask) {
            task();
            ran += 1;
            if ran >= MAX_TASKS_PER_FLUSH {
                warn!("microtask flush exceeded {MAX_TASKS_PER_FLUSH} tasks; deferring the rest");
                break;
            }
        }
        ran
    }

    /// Reach a render-stable point: run stable callbacks and their microtasks.
    ///
    /// Callbacks registered while stabilizing run in the same call.
    pub fn stabilize(&self) -> usize {
        let mut ran = self.run_microtasks();
        while let Some(task) = self.pop(TaskQueue::Stable) {
            task();
            ran += 1 + self.run_microtasks();
            if ran >= MAX_TASKS_PER_FLUSH {
                warn!("stabilize exceeded {MAX_TASKS_PER_FLUSH} tasks; deferring the rest");
                break;
            }
        }
        ran
    }

    /// Advance one tick.
    ///
    /// Runs every task that was queued for this tick (tasks scheduled while
    /// ticking wait for the next one), then stabilizes.
    pub fn tick(&self) -> usize {
        self.ticks_run.set(self.ticks_run.get() + 1);
        let boundary = TaskId(self.next_id.get());
        let mut ran = 0;
        loop {
            let entry = {
                let mut ticks = self.ticks.borrow_mut();
                match ticks.front() {
                    Some((id, _)) if *id < boundary => ticks.pop_front(),
                    _ => None,
                }
            };
            let Some((_, task)) = entry else { break };
            task();
            ran += 1 + self.run_microtasks();
        }
        ran + self.stabilize()
    }

    /// Tick until every queue is empty.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = self.stabilize();
        let mut rounds = 0;
        while !self.is_idle() {
            ran += self.tick();
            rounds += 1;
            if rounds >= MAX_TASKS_PER_FLUSH {
                warn!("scheduler did not go idle after {rounds} ticks");
                break;
            }
        }
        ran
    }

    /// Check if no task is waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending_count() == 0
    }

    /// Number of tasks waiting across all queues.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.ticks.borrow().len() + self.stable.borrow().len() + self.microtasks.borrow().len()
    }

    /// Number of ticks advanced so far.
    #[must_use]
    pub fn ticks_run(&self) -> u64 {
        self.ticks_run.get()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("ticks", &self.ticks.borrow().len())
            .field("stable", &self.stable.borrow().len())
            .field("microtasks", &self.microtasks.borrow().len())
            .field("ticks_run", &self.ticks_run.get())
            .finish()
    }
}
