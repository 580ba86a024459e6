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

//! # Cadence Runtime
//!
//! Composes the core scheduler and store into an [`Engine`] that drives the
//! frame loop, and exposes the component-registration surface a UI-framework
//! adapter consumes: declarative method-to-group bindings, validated before
//! anything is queued.

#![warn(missing_docs)]

pub mod component;
pub mod engine;
pub mod tick;

pub use component::{ComponentDescriptor, GroupRef, HandlerBinding, RegistrationError};
pub use engine::{Engine, EngineHandle};
pub use tick::{FixedRate, ManualTicks};

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::component::{ComponentDescriptor, GroupRef};
    pub use crate::engine::{Engine, EngineHandle};
    pub use crate::tick::{FixedRate, ManualTicks};
    pub use cadence_core::{
        OwnerId, Payload, StepReport, Store, StoreContext, StoreDefinition, TickSource,
        TriggerHandle,
    };
}
