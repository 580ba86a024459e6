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

//! Defines the error types for the scheduler and the mutation store.

use std::fmt;

/// An error raised by the group scheduler.
#[derive(Debug)]
pub enum SchedulerError {
    /// A handler removal targeted a group that was never created.
    ///
    /// Groups are created lazily on the first `add_handler` call, so hitting
    /// this means registration and removal are out of order on the caller's
    /// side.
    GroupNotFound {
        /// The name of the missing group.
        group: String,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::GroupNotFound { group } => {
                write!(f, "Group '{group}' was never registered")
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

/// An error raised by the mutation store.
#[derive(Debug)]
pub enum StoreError {
    /// `mutate` was called with a name that is not in the mutation map.
    UnknownMutation {
        /// The unregistered mutation name.
        name: String,
    },
    /// `action` was called with a name that is not in the action map.
    UnknownAction {
        /// The unregistered action name.
        name: String,
    },
    /// A registered mutation body returned an error.
    MutationFailed {
        /// The name of the failing mutation.
        name: String,
        /// The error returned by the mutation body.
        source: anyhow::Error,
    },
    /// A registered action body returned an error.
    ActionFailed {
        /// The name of the failing action.
        name: String,
        /// The error returned by the action body.
        source: anyhow::Error,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UnknownMutation { name } => {
                write!(f, "Unknown mutation '{name}'")
            }
            StoreError::UnknownAction { name } => {
                write!(f, "Unknown action '{name}'")
            }
            StoreError::MutationFailed { name, source } => {
                write!(f, "Mutation '{name}' failed: {source}")
            }
            StoreError::ActionFailed { name, source } => {
                write!(f, "Action '{name}' failed: {source}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::MutationFailed { source, .. } | StoreError::ActionFailed { source, .. } => {
                Some(source.as_ref())
            }
            _ => None,
        }
    }
}
