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

//! The injectable frame-driver seam.

/// Source of frame ticks driving an engine loop.
///
/// The engine never talks to a windowing system directly; whoever embeds it
/// supplies a tick source, which also makes the loop testable headlessly.
pub trait TickSource {
    /// Blocks until the next frame is due.
    ///
    /// Returning `false` ends the loop.
    fn wait(&mut self) -> bool;
}
