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

//! Handler identity and callback types.
//!
//! A handler is an explicit closure registered against a named group, keyed
//! by the `(owner, method name)` pair that registered it. The key is the unit
//! of deduplication: a step never invokes the same key twice, even when the
//! key is reachable from several queued groups.

use std::fmt;

use uuid::Uuid;

/// Stable identity of the object owning a set of handlers, typically one
/// component instance on the embedder's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Creates a fresh, collision-free owner id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for OwnerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one registered handler, derived deterministically from the
/// owner id and the method name.
///
/// The key is unique per `(owner, method)` pair and stable across add/remove
/// cycles for the same pair, which is what makes tombstoning and re-adding a
/// handler transparent to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerKey {
    owner: OwnerId,
    method: String,
}

impl HandlerKey {
    /// Derives the key for an `(owner, method)` pair.
    #[must_use]
    pub fn new(owner: OwnerId, method: &str) -> Self {
        Self {
            owner,
            method: method.to_string(),
        }
    }

    /// The owner half of the key.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// The method-name half of the key.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner, self.method)
    }
}

/// The callback shape of a registered handler.
///
/// Handlers receive the state projection derived for the current step and
/// report failures instead of panicking; the scheduler isolates a failing
/// handler so it cannot starve the rest of the frame.
pub type HandlerFn<S> = dyn Fn(&S) -> anyhow::Result<()> + Send + Sync;

/// A handler failure captured while running a step.
///
/// Carries enough context to locate the offending registration: the group
/// that was running, the handler key (owner id plus method name), and the
/// error the handler body returned.
#[derive(Debug)]
pub struct HandlerFailure {
    /// The group whose run invoked the handler.
    pub group: String,
    /// The identity of the failing handler.
    pub key: HandlerKey,
    /// The error returned by the handler body.
    pub error: anyhow::Error,
}
