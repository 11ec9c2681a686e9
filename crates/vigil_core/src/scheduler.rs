//! # Tick Scheduler
//!
//! Named repeating tasks on the cooperative tick loop. The engine ticks the
//! scheduler from the same thread that handles events, so a task can never
//! race an event handler; cancellation is a handle stored by whoever
//! scheduled the task.

use std::collections::BTreeMap;
use vigil_shared::PlayerId;

/// Cancellation handle for a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskHandle(u64);

/// What a task does when it fires.
///
/// Tasks are named data, not closures: the scheduler stays inspectable and
/// the engine applies the effect with full access to its own state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// Periodic decrement of a session's kill-aura trigger count.
    KillAuraDecay {
        /// The session's player.
        player: PlayerId,
    },
}

struct RepeatingTask {
    kind: TaskKind,
    interval_ticks: u32,
    remaining_ticks: u32,
}

/// Repeating-task scheduler driven by the engine tick.
#[derive(Default)]
pub struct TickScheduler {
    /// Keyed by handle; BTreeMap keeps firing order deterministic.
    tasks: BTreeMap<u64, RepeatingTask>,
    next_handle: u64,
}

impl TickScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a task that fires every `interval_ticks` ticks.
    ///
    /// A zero interval is treated as one tick.
    pub fn schedule_repeating(&mut self, kind: TaskKind, interval_ticks: u32) -> TaskHandle {
        let interval = interval_ticks.max(1);
        self.next_handle += 1;
        self.tasks.insert(
            self.next_handle,
            RepeatingTask {
                kind,
                interval_ticks: interval,
                remaining_ticks: interval,
            },
        );
        TaskHandle(self.next_handle)
    }

    /// Cancels a task (no-op if already cancelled).
    pub fn cancel(&mut self, handle: TaskHandle) {
        self.tasks.remove(&handle.0);
    }

    /// Number of live tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no tasks are scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advances one tick and returns the tasks due this tick.
    pub fn tick(&mut self) -> Vec<TaskKind> {
        let mut due = Vec::new();
        for task in self.tasks.values_mut() {
            task.remaining_ticks -= 1;
            if task.remaining_ticks == 0 {
                task.remaining_ticks = task.interval_ticks;
                due.push(task.kind);
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: PlayerId = PlayerId::new(1);

    #[test]
    fn test_fires_on_interval() {
        let mut sched = TickScheduler::new();
        let _handle = sched.schedule_repeating(TaskKind::KillAuraDecay { player: PLAYER }, 3);

        assert!(sched.tick().is_empty());
        assert!(sched.tick().is_empty());
        assert_eq!(
            sched.tick(),
            vec![TaskKind::KillAuraDecay { player: PLAYER }]
        );
        // And again on the next full interval.
        assert!(sched.tick().is_empty());
        assert!(sched.tick().is_empty());
        assert_eq!(sched.tick().len(), 1);
    }

    #[test]
    fn test_cancel_stops_firing() {
        let mut sched = TickScheduler::new();
        let handle = sched.schedule_repeating(TaskKind::KillAuraDecay { player: PLAYER }, 1);
        assert_eq!(sched.tick().len(), 1);

        sched.cancel(handle);
        assert!(sched.is_empty());
        assert!(sched.tick().is_empty());

        // Double-cancel is harmless.
        sched.cancel(handle);
    }

    #[test]
    fn test_independent_tasks() {
        let mut sched = TickScheduler::new();
        let a = PlayerId::new(1);
        let b = PlayerId::new(2);
        let _ha = sched.schedule_repeating(TaskKind::KillAuraDecay { player: a }, 1);
        let _hb = sched.schedule_repeating(TaskKind::KillAuraDecay { player: b }, 2);

        assert_eq!(sched.tick(), vec![TaskKind::KillAuraDecay { player: a }]);
        let due = sched.tick();
        assert_eq!(due.len(), 2);
    }

    #[test]
    fn test_zero_interval_clamped() {
        let mut sched = TickScheduler::new();
        let _handle = sched.schedule_repeating(TaskKind::KillAuraDecay { player: PLAYER }, 0);
        assert_eq!(sched.tick().len(), 1);
    }
}
