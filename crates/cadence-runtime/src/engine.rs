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

//! The engine: scheduler plus store, driven one step per tick.
//!
//! Exactly one step is ever in flight; the loop derives the current state,
//! runs the step to completion, then waits on the injected tick source. An
//! [`EngineHandle`] lets handlers, mutations, or other threads request a
//! stop or queue groups while the loop runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cadence_core::{
    Payload, Scheduler, StepReport, Store, StoreDefinition, StoreError, TickSource, TriggerHandle,
};

use crate::component::{ComponentDescriptor, RegistrationError};

/// Composes a [`Scheduler`] and a [`Store`] and drives the step loop.
///
/// The store receives a clone of the scheduler's trigger capability at
/// construction, so mutation and action bodies can queue groups for the
/// next step.
pub struct Engine<D, S> {
    scheduler: Scheduler<S>,
    store: Store<D, S>,
    running: Arc<AtomicBool>,
}

impl<D, S> Engine<D, S> {
    /// Wires a new engine from a store definition.
    #[must_use]
    pub fn new(definition: StoreDefinition<D, S>) -> Self {
        let scheduler = Scheduler::new();
        let store = Store::new(definition, scheduler.handle());
        Self {
            scheduler,
            store,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a cloneable handle for stopping the loop and queueing groups
    /// from outside the engine.
    #[must_use]
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            running: Arc::clone(&self.running),
            trigger: self.scheduler.handle(),
        }
    }

    /// Runs the frame loop until the tick source ends it or a handle
    /// requests a stop.
    ///
    /// Each iteration derives the current state, runs one full step, and
    /// then waits for the next tick, so steps never overlap.
    pub fn run(&mut self, ticks: &mut dyn TickSource) {
        self.running.store(true, Ordering::Release);
        log::info!("Engine: entering frame loop");

        while self.running.load(Ordering::Acquire) {
            let report = self.step_once();
            if !report.is_clean() {
                log::warn!(
                    "Engine: step finished with {} handler failure(s)",
                    report.failures.len()
                );
            }

            if !ticks.wait() {
                log::info!("Engine: tick source ended the loop");
                break;
            }
        }

        self.running.store(false, Ordering::Release);
        log::info!("Engine: frame loop finished");
    }

    /// Drives exactly one frame: derive state, run one step, report.
    ///
    /// This is the headless entry point; tests and embedders with their own
    /// loop call it directly instead of [`run`](Self::run).
    pub fn step_once(&mut self) -> StepReport {
        let state = self.store.state();
        self.scheduler.step(&state)
    }

    /// Registers every `(method, group)` pair a component descriptor
    /// declares, creating groups lazily and queueing each for the next step.
    ///
    /// All bindings are validated first; on `InvalidGroupDefinition` nothing
    /// has been registered or queued.
    pub fn add_component(
        &mut self,
        descriptor: &ComponentDescriptor<S>,
    ) -> Result<(), RegistrationError> {
        let normalized = Self::normalize_bindings(descriptor)?;

        for (binding_idx, groups) in normalized {
            let binding = &descriptor.bindings[binding_idx];
            for group in groups {
                self.scheduler.add_handler(
                    &group,
                    descriptor.owner,
                    &binding.method,
                    Arc::clone(&binding.invoke),
                );
            }
        }

        log::debug!(
            "Engine: registered component {} ({} binding(s))",
            descriptor.owner,
            descriptor.bindings.len()
        );
        Ok(())
    }

    /// Unregisters every `(method, group)` pair a component descriptor
    /// declares, tombstoning the handlers.
    pub fn remove_component(
        &mut self,
        descriptor: &ComponentDescriptor<S>,
    ) -> Result<(), RegistrationError> {
        let normalized = Self::normalize_bindings(descriptor)?;

        for (binding_idx, groups) in normalized {
            let binding = &descriptor.bindings[binding_idx];
            for group in groups {
                self.scheduler
                    .remove_handler(&group, descriptor.owner, &binding.method)?;
            }
        }

        log::debug!("Engine: removed component {}", descriptor.owner);
        Ok(())
    }

    fn normalize_bindings(
        descriptor: &ComponentDescriptor<S>,
    ) -> Result<Vec<(usize, Vec<String>)>, RegistrationError> {
        descriptor
            .bindings
            .iter()
            .enumerate()
            .map(|(idx, binding)| {
                let groups = binding.groups.normalize().map_err(|detail| {
                    RegistrationError::InvalidGroupDefinition {
                        owner: descriptor.owner,
                        method: binding.method.clone(),
                        detail,
                    }
                })?;
                Ok((idx, groups))
            })
            .collect()
    }

    /// Queues the named group for the next step.
    pub fn trigger(&self, group: &str) {
        self.scheduler.trigger(group);
    }

    /// Invokes the named mutation on the store.
    pub fn mutate(&mut self, name: &str, payload: Payload) -> Result<(), StoreError> {
        self.store.mutate(name, payload)
    }

    /// Invokes the named action on the store.
    pub fn action(&mut self, name: &str, payload: Payload) -> Result<(), StoreError> {
        self.store.action(name, payload)
    }

    /// Derives the current state projection.
    #[must_use]
    pub fn state(&self) -> S {
        self.store.state()
    }

    /// The composed store.
    #[must_use]
    pub fn store(&self) -> &Store<D, S> {
        &self.store
    }
}

/// Cloneable control surface over a running engine.
#[derive(Clone)]
pub struct EngineHandle {
    running: Arc<AtomicBool>,
    trigger: TriggerHandle,
}

impl EngineHandle {
    /// Requests that the frame loop stop after the current iteration.
    pub fn stop(&self) {
        log::info!("Engine: stop requested");
        self.running.store(false, Ordering::Release);
    }

    /// Queues the named group for the next step.
    pub fn trigger(&self, group: &str) {
        self.trigger.trigger(group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::GroupRef;
    use crate::tick::ManualTicks;
    use cadence_core::OwnerId;
    use std::sync::Mutex;

    struct Counter {
        count: i64,
    }

    fn counter_engine() -> Engine<Counter, i64> {
        let definition = StoreDefinition::new(|| Counter { count: 0 }, |d| d.count)
            .mutation("inc", |ctx, payload| {
                let n = *payload
                    .downcast::<i64>()
                    .map_err(|_| anyhow::anyhow!("inc expects an i64 payload"))?;
                ctx.data.count += n;
                ctx.trigger("paint");
                Ok(())
            });
        Engine::new(definition)
    }

    #[test]
    fn test_component_bound_to_many_groups_runs_once_per_step() {
        let mut engine = counter_engine();
        let calls = Arc::new(Mutex::new(0usize));

        let counter = Arc::clone(&calls);
        let descriptor = ComponentDescriptor::new(OwnerId::new()).bind(
            "draw",
            GroupRef::many(["layout", "paint"]),
            move |_: &i64| {
                *counter.lock().unwrap() += 1;
                Ok(())
            },
        );
        engine.add_component(&descriptor).unwrap();

        let report = engine.step_once();
        assert_eq!(report.groups_run, 2);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_mutation_requeues_bound_handlers() {
        let mut engine = counter_engine();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let recorder = Arc::clone(&seen);
        let descriptor = ComponentDescriptor::new(OwnerId::new()).bind(
            "draw",
            GroupRef::single("paint"),
            move |state: &i64| {
                recorder.lock().unwrap().push(*state);
                Ok(())
            },
        );
        engine.add_component(&descriptor).unwrap();

        engine.step_once();
        engine.mutate("inc", Box::new(5i64)).unwrap();
        engine.step_once();

        assert_eq!(*seen.lock().unwrap(), vec![0, 5]);
    }

    #[test]
    fn test_invalid_binding_registers_nothing() {
        let mut engine = counter_engine();
        let calls = Arc::new(Mutex::new(0usize));

        let counter = Arc::clone(&calls);
        let good_then_bad = ComponentDescriptor::new(OwnerId::new())
            .bind("draw", GroupRef::single("paint"), move |_: &i64| {
                *counter.lock().unwrap() += 1;
                Ok(())
            })
            .bind("layout", GroupRef::Many(Vec::new()), |_: &i64| Ok(()));

        let err = engine.add_component(&good_then_bad).unwrap_err();
        match err {
            RegistrationError::InvalidGroupDefinition { method, .. } => {
                assert_eq!(method, "layout");
            }
            other => panic!("Expected InvalidGroupDefinition, got {other}"),
        }

        // Validation happens before registration, so not even the valid
        // binding was queued.
        let report = engine.step_once();
        assert_eq!(report.groups_run, 0);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_remove_component_stops_execution() {
        let mut engine = counter_engine();
        let calls = Arc::new(Mutex::new(0usize));

        let counter = Arc::clone(&calls);
        let descriptor = ComponentDescriptor::new(OwnerId::new()).bind(
            "draw",
            GroupRef::single("paint"),
            move |_: &i64| {
                *counter.lock().unwrap() += 1;
                Ok(())
            },
        );
        engine.add_component(&descriptor).unwrap();
        engine.step_once();
        assert_eq!(*calls.lock().unwrap(), 1);

        engine.remove_component(&descriptor).unwrap();
        engine.trigger("paint");
        engine.step_once();
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_remove_component_with_unknown_group_fails_fast() {
        let mut engine = counter_engine();
        let descriptor = ComponentDescriptor::new(OwnerId::new()).bind(
            "draw",
            GroupRef::single("ghost"),
            |_: &i64| Ok(()),
        );

        let err = engine.remove_component(&descriptor).unwrap_err();
        assert!(matches!(err, RegistrationError::Scheduler(_)));
    }

    #[test]
    fn test_run_executes_one_step_per_tick() {
        let mut engine = counter_engine();
        let calls = Arc::new(Mutex::new(0usize));
        let handle = engine.handle();

        let counter = Arc::clone(&calls);
        let descriptor = ComponentDescriptor::new(OwnerId::new()).bind(
            "draw",
            GroupRef::single("paint"),
            move |_: &i64| {
                *counter.lock().unwrap() += 1;
                handle.trigger("paint");
                Ok(())
            },
        );
        engine.add_component(&descriptor).unwrap();

        // First step runs before the first wait, then two ticks follow.
        let mut ticks = ManualTicks::new(2);
        engine.run(&mut ticks);

        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[test]
    fn test_handle_stop_ends_the_loop() {
        let mut engine = counter_engine();
        let calls = Arc::new(Mutex::new(0usize));
        let handle = engine.handle();

        let counter = Arc::clone(&calls);
        let stopper = handle.clone();
        let descriptor = ComponentDescriptor::new(OwnerId::new()).bind(
            "draw",
            GroupRef::single("paint"),
            move |_: &i64| {
                let mut calls = counter.lock().unwrap();
                *calls += 1;
                if *calls == 2 {
                    stopper.stop();
                } else {
                    stopper.trigger("paint");
                }
                Ok(())
            },
        );
        engine.add_component(&descriptor).unwrap();

        let mut ticks = ManualTicks::new(100);
        engine.run(&mut ticks);

        assert_eq!(
            *calls.lock().unwrap(),
            2,
            "Stop must end the loop long before the ticks run out"
        );
    }
}
