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

//! Per-group handler registry with ordered slots and tombstone removal.

use std::collections::HashSet;
use std::sync::Arc;

use crate::handler::{HandlerFailure, HandlerFn, HandlerKey, OwnerId};

/// One registration slot. A tombstoned slot keeps its key but drops the
/// callback, so slot indices stay stable for any in-flight iteration.
struct Slot<S> {
    key: HandlerKey,
    invoke: Option<Arc<HandlerFn<S>>>,
}

impl<S> Slot<S> {
    fn is_live(&self) -> bool {
        self.invoke.is_some()
    }
}

/// Ordered registry of the handlers belonging to one named group.
///
/// Handlers run in insertion order. Removal tombstones the slot instead of
/// compacting the sequence. At most one live handler exists per key: adding
/// a key that is already live replaces the callback in place, keeping the
/// original slot position.
pub struct GroupRegistry<S> {
    name: String,
    slots: Vec<Slot<S>>,
}

impl<S> GroupRegistry<S> {
    /// Creates an empty registry for the given group name.
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            slots: Vec::new(),
        }
    }

    /// The group name this registry belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a handler under the key derived from `(owner, method)`.
    ///
    /// If a live handler with the same key already exists, the new callback
    /// replaces it in place rather than creating a second slot.
    pub fn add(&mut self, owner: OwnerId, method: &str, invoke: Arc<HandlerFn<S>>) {
        let key = HandlerKey::new(owner, method);

        if let Some(slot) = self.slots.iter_mut().find(|s| s.is_live() && s.key == key) {
            log::debug!(
                "GroupRegistry '{}': replacing handler {key} in place",
                self.name
            );
            slot.invoke = Some(invoke);
            return;
        }

        log::debug!("GroupRegistry '{}': adding handler {key}", self.name);
        self.slots.push(Slot {
            key,
            invoke: Some(invoke),
        });
    }

    /// Tombstones the first live slot matching the key derived from
    /// `(owner, method)`. Removing an absent key is a no-op.
    pub fn remove(&mut self, owner: OwnerId, method: &str) {
        let key = HandlerKey::new(owner, method);

        if let Some(slot) = self.slots.iter_mut().find(|s| s.is_live() && s.key == key) {
            log::debug!("GroupRegistry '{}': tombstoning handler {key}", self.name);
            slot.invoke = None;
        }
    }

    /// Returns the number of live handlers in this registry.
    #[must_use]
    pub fn live_len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_live()).count()
    }

    /// Runs every live handler whose key has not executed yet this step.
    ///
    /// `history` is the step-wide set of already-executed keys, threaded
    /// across all registries of the same step. A failing handler is recorded
    /// in `failures` and does not interrupt the rest of the run. Returns the
    /// number of handlers invoked, successful or not.
    pub(crate) fn run(
        &self,
        state: &S,
        history: &mut HashSet<HandlerKey>,
        failures: &mut Vec<HandlerFailure>,
    ) -> usize {
        let mut invoked = 0;

        for slot in &self.slots {
            let Some(invoke) = &slot.invoke else {
                continue;
            };
            if history.contains(&slot.key) {
                continue;
            }
            history.insert(slot.key.clone());
            invoked += 1;

            if let Err(error) = invoke(state) {
                log::error!(
                    "Handler {} in group '{}' failed: {error:#}",
                    slot.key,
                    self.name
                );
                failures.push(HandlerFailure {
                    group: self.name.clone(),
                    key: slot.key.clone(),
                    error,
                });
            }
        }

        invoked
    }
}
