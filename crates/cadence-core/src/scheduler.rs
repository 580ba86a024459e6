// Copyright 2025 cadence developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Group scheduler: owns every named group and executes one step at a time.
//!
//! # Design
//!
//! Groups live in a `Vec` in first-registration order, which fixes the group
//! iteration order of a step deterministically. Triggers travel over an
//! unbounded channel; [`Scheduler::step`] drains the channel into per-group
//! queued flags before running anything, so a trigger emitted *while* a step
//! is running always lands on the next step. One shared history of executed
//! handler keys is threaded across all groups of a step, guaranteeing that a
//! handler reachable from several queued groups runs at most once.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::SchedulerError;
use crate::handler::{HandlerFailure, HandlerFn, HandlerKey, OwnerId};
use crate::registry::GroupRegistry;

/// A cloneable capability to queue a group for the next step.
///
/// Handles can be handed to mutation contexts, handler closures, or other
/// threads; the scheduler only consumes queued names at the start of a step,
/// on whichever thread drives it.
#[derive(Clone)]
pub struct TriggerHandle {
    tx: flume::Sender<String>,
}

impl TriggerHandle {
    /// Marks the named group as due to run on the next step.
    ///
    /// Idempotent per step: repeated triggers before the next step collapse
    /// into a single run.
    pub fn trigger(&self, group: &str) {
        log::trace!("Trigger queued for group '{group}'");

        if let Err(e) = self.tx.send(group.to_string()) {
            log::error!("Failed to queue trigger for '{group}': {e}. Scheduler likely dropped.");
        }
    }
}

struct GroupEntry<S> {
    registry: GroupRegistry<S>,
    queued: bool,
}

/// Summary of one executed step.
#[derive(Debug, Default)]
pub struct StepReport {
    /// Number of queued groups that ran.
    pub groups_run: usize,
    /// Number of handler invocations, successful or failing.
    pub handlers_invoked: usize,
    /// Handler failures captured during the step, with registration context.
    pub failures: Vec<HandlerFailure>,
}

impl StepReport {
    /// Returns `true` if no handler failed during the step.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Owns all named groups, tracks which are queued, and executes steps.
pub struct Scheduler<S> {
    groups: Vec<GroupEntry<S>>,
    tx: flume::Sender<String>,
    rx: flume::Receiver<String>,
}

impl<S> Scheduler<S> {
    /// Creates a scheduler with no groups and an empty trigger queue.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            groups: Vec::new(),
            tx,
            rx,
        }
    }

    /// Returns a cloneable trigger capability for this scheduler.
    #[must_use]
    pub fn handle(&self) -> TriggerHandle {
        TriggerHandle {
            tx: self.tx.clone(),
        }
    }

    /// Marks the named group as due to run on the next step.
    pub fn trigger(&self, group: &str) {
        self.handle().trigger(group);
    }

    /// Registers a handler into the named group, creating the group lazily,
    /// and triggers the group so the new handler runs on the very next step.
    pub fn add_handler(
        &mut self,
        group: &str,
        owner: OwnerId,
        method: &str,
        invoke: Arc<HandlerFn<S>>,
    ) {
        let idx = match self
            .groups
            .iter()
            .position(|e| e.registry.name() == group)
        {
            Some(idx) => idx,
            None => {
                log::debug!("Scheduler: creating group '{group}'");
                self.groups.push(GroupEntry {
                    registry: GroupRegistry::new(group),
                    queued: false,
                });
                self.groups.len() - 1
            }
        };

        self.groups[idx].registry.add(owner, method, invoke);
        self.trigger(group);
    }

    /// Tombstones the `(owner, method)` handler in the named group.
    ///
    /// Fails fast with [`SchedulerError::GroupNotFound`] if the group was
    /// never created; removing a key the group does not hold is a no-op.
    pub fn remove_handler(
        &mut self,
        group: &str,
        owner: OwnerId,
        method: &str,
    ) -> Result<(), SchedulerError> {
        match self
            .groups
            .iter_mut()
            .find(|e| e.registry.name() == group)
        {
            Some(entry) => {
                entry.registry.remove(owner, method);
                Ok(())
            }
            None => Err(SchedulerError::GroupNotFound {
                group: group.to_string(),
            }),
        }
    }

    /// Runs every currently-queued group against `state`.
    ///
    /// Consumes all triggers that arrived before the step, clears each
    /// group's queued flag before running it, and threads one shared history
    /// across groups so each handler key executes at most once. Triggers
    /// emitted by handlers during the step stay queued for the next one.
    pub fn step(&mut self, state: &S) -> StepReport {
        while let Ok(name) = self.rx.try_recv() {
            match self
                .groups
                .iter_mut()
                .find(|e| e.registry.name() == name)
            {
                Some(entry) => entry.queued = true,
                None => log::debug!("Scheduler: dropping trigger for unknown group '{name}'"),
            }
        }

        let mut history: HashSet<HandlerKey> = HashSet::new();
        let mut report = StepReport::default();

        for entry in &mut self.groups {
            if !entry.queued {
                continue;
            }
            entry.queued = false;

            report.groups_run += 1;
            report.handlers_invoked +=
                entry
                    .registry
                    .run(state, &mut history, &mut report.failures);
        }

        log::trace!(
            "Step ran {} group(s), {} handler(s), {} failure(s)",
            report.groups_run,
            report.handlers_invoked,
            report.failures.len()
        );

        report
    }

    /// Returns the number of groups created so far.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl<S> Default for Scheduler<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn counter(count: &Arc<Mutex<usize>>) -> Arc<HandlerFn<u32>> {
        let count = Arc::clone(count);
        Arc::new(move |_: &u32| {
            *count.lock().unwrap() += 1;
            Ok(())
        })
    }

    /// A handler registered in two queued groups under the same key runs
    /// exactly once per step.
    #[test]
    fn test_shared_handler_runs_at_most_once_per_step() {
        let count = Arc::new(Mutex::new(0));
        let mut scheduler = Scheduler::new();
        let owner = OwnerId::new();
        let shared = counter(&count);

        scheduler.add_handler("layout", owner, "draw", Arc::clone(&shared));
        scheduler.add_handler("paint", owner, "draw", shared);

        let report = scheduler.step(&0);

        assert_eq!(report.groups_run, 2);
        assert_eq!(report.handlers_invoked, 1);
        assert_eq!(*count.lock().unwrap(), 1);
    }

    /// A handler that triggers its own group mid-run re-queues it for the
    /// next step, never the current one.
    #[test]
    fn test_self_retrigger_defers_to_next_step() {
        let count = Arc::new(Mutex::new(0));
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        let trigger = scheduler.handle();

        let counter = Arc::clone(&count);
        scheduler.add_handler(
            "anim",
            OwnerId::new(),
            "tick",
            Arc::new(move |_: &u32| {
                *counter.lock().unwrap() += 1;
                trigger.trigger("anim");
                Ok(())
            }),
        );

        scheduler.step(&0);
        assert_eq!(*count.lock().unwrap(), 1, "Must not re-run within the step");

        scheduler.step(&0);
        assert_eq!(*count.lock().unwrap(), 2, "Self-retrigger runs next step");
    }

    /// After removal a queued group no longer invokes the handler; re-adding
    /// the same pair revives it.
    #[test]
    fn test_removed_handler_stops_running_until_readded() {
        let count = Arc::new(Mutex::new(0));
        let mut scheduler = Scheduler::new();
        let owner = OwnerId::new();

        scheduler.add_handler("paint", owner, "draw", counter(&count));
        scheduler.step(&0);
        assert_eq!(*count.lock().unwrap(), 1);

        scheduler.remove_handler("paint", owner, "draw").unwrap();
        scheduler.trigger("paint");
        let report = scheduler.step(&0);
        assert_eq!(report.handlers_invoked, 0);
        assert_eq!(*count.lock().unwrap(), 1);

        scheduler.add_handler("paint", owner, "draw", counter(&count));
        scheduler.step(&0);
        assert_eq!(*count.lock().unwrap(), 2);
    }

    /// N triggers before a step collapse into a single run.
    #[test]
    fn test_trigger_is_idempotent_within_a_step() {
        let count = Arc::new(Mutex::new(0));
        let mut scheduler = Scheduler::new();

        scheduler.add_handler("paint", OwnerId::new(), "draw", counter(&count));
        scheduler.step(&0);
        assert_eq!(*count.lock().unwrap(), 1);

        scheduler.trigger("paint");
        scheduler.trigger("paint");
        scheduler.trigger("paint");
        scheduler.step(&0);
        assert_eq!(*count.lock().unwrap(), 2);

        // Nothing queued anymore.
        let report = scheduler.step(&0);
        assert_eq!(report.groups_run, 0);
        assert_eq!(*count.lock().unwrap(), 2);
    }

    /// Execution order is group first-registration order, then slot
    /// insertion order within each group.
    #[test]
    fn test_step_order_follows_registration_order() {
        let calls: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let mut scheduler = Scheduler::new();
        let owner = OwnerId::new();

        let tag = |tag: &'static str| -> Arc<HandlerFn<u32>> {
            let calls = Arc::clone(&calls);
            Arc::new(move |_: &u32| {
                calls.lock().unwrap().push(tag);
                Ok(())
            })
        };

        scheduler.add_handler("a", owner, "h1", tag("h1"));
        scheduler.add_handler("a", owner, "h2", tag("h2"));
        scheduler.add_handler("b", owner, "h3", tag("h3"));

        scheduler.step(&0);

        assert_eq!(*calls.lock().unwrap(), vec!["h1", "h2", "h3"]);
    }

    /// A step with nothing queued performs no invocations and reports clean.
    #[test]
    fn test_empty_step_is_a_noop() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        let report = scheduler.step(&0);

        assert_eq!(report.groups_run, 0);
        assert_eq!(report.handlers_invoked, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_remove_handler_on_unknown_group_fails_fast() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        let err = scheduler
            .remove_handler("ghost", OwnerId::new(), "draw")
            .unwrap_err();

        match err {
            SchedulerError::GroupNotFound { group } => assert_eq!(group, "ghost"),
        }
    }

    /// A trigger for a name with no registry yet is dropped; creating the
    /// group later re-triggers it anyway.
    #[test]
    fn test_trigger_before_group_exists_is_dropped() {
        let count = Arc::new(Mutex::new(0));
        let mut scheduler = Scheduler::new();

        scheduler.trigger("paint");
        scheduler.step(&0);

        scheduler.add_handler("paint", OwnerId::new(), "draw", counter(&count));
        scheduler.step(&0);
        assert_eq!(*count.lock().unwrap(), 1);
    }

    /// One failing handler is reported but does not abort the step.
    #[test]
    fn test_step_report_carries_failures() {
        let count = Arc::new(Mutex::new(0));
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        let owner = OwnerId::new();

        scheduler.add_handler(
            "paint",
            owner,
            "broken",
            Arc::new(|_: &u32| Err(anyhow::anyhow!("no canvas"))),
        );
        scheduler.add_handler("paint", owner, "fine", counter(&count));

        let report = scheduler.step(&0);

        assert_eq!(report.handlers_invoked, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].key.method(), "broken");
        assert_eq!(*count.lock().unwrap(), 1);
        assert!(!report.is_clean());
    }
}
