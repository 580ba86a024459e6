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

//! The component-registration surface consumed by UI-framework adapters.
//!
//! An adapter describes a component as a set of bindings from a method name
//! to one or more group names, with an explicit closure per method. Group
//! references are a tagged variant normalized to a name list at this
//! boundary; anything malformed is rejected as `InvalidGroupDefinition`
//! before a single handler is queued.

use std::fmt;
use std::sync::Arc;

use cadence_core::{HandlerFn, OwnerId, SchedulerError};

/// An error raised while registering or unregistering a component.
#[derive(Debug)]
pub enum RegistrationError {
    /// A binding's group reference did not normalize to at least one
    /// non-blank group name.
    InvalidGroupDefinition {
        /// The component that declared the binding.
        owner: OwnerId,
        /// The method name of the offending binding.
        method: String,
        /// What was wrong with the declaration.
        detail: String,
    },
    /// The scheduler rejected the operation.
    Scheduler(SchedulerError),
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::InvalidGroupDefinition {
                owner,
                method,
                detail,
            } => {
                write!(
                    f,
                    "Invalid group definition for method '{method}' of component {owner}: {detail}"
                )
            }
            RegistrationError::Scheduler(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RegistrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistrationError::Scheduler(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SchedulerError> for RegistrationError {
    fn from(e: SchedulerError) -> Self {
        RegistrationError::Scheduler(e)
    }
}

/// A declared reference to one or several groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    /// One group name.
    Single(String),
    /// A list of group names.
    Many(Vec<String>),
}

impl GroupRef {
    /// Shorthand for [`GroupRef::Single`].
    pub fn single(name: impl Into<String>) -> Self {
        GroupRef::Single(name.into())
    }

    /// Shorthand for [`GroupRef::Many`].
    pub fn many<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        GroupRef::Many(names.into_iter().map(Into::into).collect())
    }

    /// Normalizes the reference to a non-empty list of non-blank names.
    pub(crate) fn normalize(&self) -> Result<Vec<String>, String> {
        let names = match self {
            GroupRef::Single(name) => vec![name.clone()],
            GroupRef::Many(names) => names.clone(),
        };

        if names.is_empty() {
            return Err("binding names no groups".to_string());
        }
        for name in &names {
            if name.trim().is_empty() {
                return Err("blank group name".to_string());
            }
        }

        Ok(names)
    }
}

/// One method of a component, bound to one or more groups.
///
/// The callback is shared behind an `Arc`: a method bound to several groups
/// is one physical handler with one key, so a step deduplicates it even when
/// all its groups are queued.
pub struct HandlerBinding<S> {
    pub(crate) method: String,
    pub(crate) groups: GroupRef,
    pub(crate) invoke: Arc<HandlerFn<S>>,
}

/// Declarative description of a component: a stable owner id plus its
/// method-to-group bindings.
pub struct ComponentDescriptor<S> {
    pub(crate) owner: OwnerId,
    pub(crate) bindings: Vec<HandlerBinding<S>>,
}

impl<S> ComponentDescriptor<S> {
    /// Starts a descriptor for the given owner.
    #[must_use]
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            bindings: Vec::new(),
        }
    }

    /// Binds a method name to the referenced groups with its callback.
    pub fn bind(
        self,
        method: &str,
        groups: GroupRef,
        invoke: impl Fn(&S) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.bind_shared(method, groups, Arc::new(invoke))
    }

    /// Like [`bind`](Self::bind) but accepts an already-shared callback.
    pub fn bind_shared(
        mut self,
        method: &str,
        groups: GroupRef,
        invoke: Arc<HandlerFn<S>>,
    ) -> Self {
        self.bindings.push(HandlerBinding {
            method: method.to_string(),
            groups,
            invoke,
        });
        self
    }

    /// The stable id of the owning component instance.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }
}
