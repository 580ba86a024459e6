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

//! # Cadence Core
//!
//! Foundational crate for the cadence frame scheduler: batched, deduplicated
//! execution of named handler groups, driven one step per frame, paired with
//! a store whose data can only change through declared mutations and actions.
//!
//! The core is deliberately free of any UI-framework coupling. An embedder
//! registers handlers into named groups, marks groups as due with a trigger,
//! and drives discrete steps; each step runs every queued group's live
//! handlers exactly once, deduplicated by handler key across groups.

#![warn(missing_docs)]

pub mod error;
pub mod handler;
pub mod registry;
pub mod scheduler;
pub mod store;
pub mod tick;

pub use error::{SchedulerError, StoreError};
pub use handler::{HandlerFailure, HandlerFn, HandlerKey, OwnerId};
pub use registry::GroupRegistry;
pub use scheduler::{Scheduler, StepReport, TriggerHandle};
pub use store::{MutationFn, Payload, Store, StoreContext, StoreDefinition};
pub use tick::TickSource;
