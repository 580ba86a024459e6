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

//! Mutation-gated state store.
//!
//! The store owns opaque application data, constructed once from a factory,
//! and only lets it change inside declared mutation and action bodies. Each
//! body receives a [`StoreContext`] granting mutable data access, a trigger
//! into the scheduler, and nested `mutate`/`action` calls. Handlers read the
//! world through the `state` derivation instead of touching data directly.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::StoreError;
use crate::scheduler::TriggerHandle;

/// Opaque argument passed to a mutation or action body, downcast by the
/// registered function.
pub type Payload = Box<dyn Any + Send>;

/// The callback shape of a registered mutation or action body.
pub type MutationFn<D> =
    dyn Fn(&mut StoreContext<'_, D>, Payload) -> anyhow::Result<()> + Send + Sync;

/// Declarative description of a store: the data factory, the state
/// derivation, and the named mutation/action maps.
///
/// # Example
///
/// ```rust
/// use cadence_core::StoreDefinition;
///
/// struct Canvas { count: i64 }
///
/// let definition = StoreDefinition::new(|| Canvas { count: 0 }, |d| d.count)
///     .mutation("increment", |ctx, payload| {
///         let n = *payload.downcast::<i64>().map_err(|_| anyhow::anyhow!("expected i64"))?;
///         ctx.data.count += n;
///         Ok(())
///     });
/// ```
pub struct StoreDefinition<D, S> {
    data: Box<dyn FnOnce() -> D + Send>,
    state: Box<dyn Fn(&D) -> S + Send + Sync>,
    mutations: HashMap<String, Arc<MutationFn<D>>>,
    actions: HashMap<String, Arc<MutationFn<D>>>,
}

impl<D, S> StoreDefinition<D, S> {
    /// Starts a definition from the data factory and the state derivation.
    pub fn new(
        data: impl FnOnce() -> D + Send + 'static,
        state: impl Fn(&D) -> S + Send + Sync + 'static,
    ) -> Self {
        Self {
            data: Box::new(data),
            state: Box::new(state),
            mutations: HashMap::new(),
            actions: HashMap::new(),
        }
    }

    /// Registers a named mutation. Registering a name twice keeps the later
    /// function.
    pub fn mutation(
        mut self,
        name: &str,
        f: impl Fn(&mut StoreContext<'_, D>, Payload) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        if self.mutations.insert(name.to_string(), Arc::new(f)).is_some() {
            log::warn!("StoreDefinition: mutation '{name}' registered twice, keeping the later one");
        }
        self
    }

    /// Registers a named action. Actions share the mutation calling
    /// convention; the split is a convention for higher-level orchestration,
    /// not an enforced rule.
    pub fn action(
        mut self,
        name: &str,
        f: impl Fn(&mut StoreContext<'_, D>, Payload) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        if self.actions.insert(name.to_string(), Arc::new(f)).is_some() {
            log::warn!("StoreDefinition: action '{name}' registered twice, keeping the later one");
        }
        self
    }
}

/// The controlled context passed into mutation and action bodies.
pub struct StoreContext<'a, D> {
    /// Direct mutable access to the owned store data.
    pub data: &'a mut D,
    trigger: &'a TriggerHandle,
    mutations: &'a HashMap<String, Arc<MutationFn<D>>>,
    actions: &'a HashMap<String, Arc<MutationFn<D>>>,
}

impl<D> StoreContext<'_, D> {
    /// Queues the named group for the next step.
    pub fn trigger(&self, group: &str) {
        self.trigger.trigger(group);
    }

    /// Invokes another registered mutation from within this body.
    pub fn mutate(&mut self, name: &str, payload: Payload) -> Result<(), StoreError> {
        let f = self
            .mutations
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownMutation {
                name: name.to_string(),
            })?;

        log::trace!("Nested mutate '{name}'");
        f(self, payload).map_err(|source| StoreError::MutationFailed {
            name: name.to_string(),
            source,
        })
    }

    /// Invokes another registered action from within this body.
    pub fn action(&mut self, name: &str, payload: Payload) -> Result<(), StoreError> {
        let f = self
            .actions
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownAction {
                name: name.to_string(),
            })?;

        log::trace!("Nested action '{name}'");
        f(self, payload).map_err(|source| StoreError::ActionFailed {
            name: name.to_string(),
            source,
        })
    }
}

/// Owns the application data and gates every change through the declared
/// mutation and action maps.
pub struct Store<D, S> {
    data: D,
    state: Box<dyn Fn(&D) -> S + Send + Sync>,
    mutations: HashMap<String, Arc<MutationFn<D>>>,
    actions: HashMap<String, Arc<MutationFn<D>>>,
    trigger: TriggerHandle,
}

impl<D, S> Store<D, S> {
    /// Materializes the store: calls the data factory exactly once and wires
    /// the trigger capability supplied by the engine.
    pub fn new(definition: StoreDefinition<D, S>, trigger: TriggerHandle) -> Self {
        Self {
            data: (definition.data)(),
            state: definition.state,
            mutations: definition.mutations,
            actions: definition.actions,
            trigger,
        }
    }

    /// Runs the state derivation against the live data.
    #[must_use]
    pub fn state(&self) -> S {
        (self.state)(&self.data)
    }

    /// Read-only direct access to the owned data, for advanced composition.
    ///
    /// No mutable counterpart exists: data changes only inside declared
    /// mutation and action bodies.
    #[must_use]
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Invokes the named mutation with `payload`.
    ///
    /// Fails with [`StoreError::UnknownMutation`] for an unregistered name,
    /// leaving the data untouched.
    pub fn mutate(&mut self, name: &str, payload: Payload) -> Result<(), StoreError> {
        let f = self
            .mutations
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownMutation {
                name: name.to_string(),
            })?;

        log::trace!("Mutate '{name}'");
        let mut ctx = StoreContext {
            data: &mut self.data,
            trigger: &self.trigger,
            mutations: &self.mutations,
            actions: &self.actions,
        };
        f(&mut ctx, payload).map_err(|source| StoreError::MutationFailed {
            name: name.to_string(),
            source,
        })
    }

    /// Invokes the named action with `payload`.
    ///
    /// Fails with [`StoreError::UnknownAction`] for an unregistered name,
    /// leaving the data untouched.
    pub fn action(&mut self, name: &str, payload: Payload) -> Result<(), StoreError> {
        let f = self
            .actions
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownAction {
                name: name.to_string(),
            })?;

        log::trace!("Action '{name}'");
        let mut ctx = StoreContext {
            data: &mut self.data,
            trigger: &self.trigger,
            mutations: &self.mutations,
            actions: &self.actions,
        };
        f(&mut ctx, payload).map_err(|source| StoreError::ActionFailed {
            name: name.to_string(),
            source,
        })
    }
}
