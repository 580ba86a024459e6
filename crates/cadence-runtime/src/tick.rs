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

//! Concrete tick sources for driving the engine loop.

use std::thread;
use std::time::{Duration, Instant};

use cadence_core::TickSource;

/// Frame driver that paces the loop at a fixed interval.
///
/// `wait` sleeps out whatever remains of the interval measured from the
/// previous tick, so a step that took longer than the interval is followed
/// by an immediate tick rather than an extra delay.
pub struct FixedRate {
    interval: Duration,
    last: Option<Instant>,
}

impl FixedRate {
    /// Creates a driver with the given frame interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Creates a driver targeting `fps` frames per second.
    #[must_use]
    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / f64::from(fps.max(1))))
    }
}

impl TickSource for FixedRate {
    fn wait(&mut self) -> bool {
        if let Some(last) = self.last {
            let target = last + self.interval;
            let now = Instant::now();
            if now < target {
                thread::sleep(target - now);
            }
        }
        self.last = Some(Instant::now());
        true
    }
}

/// Frame driver that yields a fixed number of immediate ticks.
///
/// Used for tests and demos. Note that an engine loop steps once before its
/// first wait, so `ManualTicks::new(n)` drives `n + 1` frames in total.
pub struct ManualTicks {
    remaining: usize,
}

impl ManualTicks {
    /// Creates a driver that permits `frames` further ticks.
    #[must_use]
    pub fn new(frames: usize) -> Self {
        Self { remaining: frames }
    }
}

impl TickSource for ManualTicks {
    fn wait(&mut self) -> bool {
        if self.remaining == 0 {
            log::trace!("ManualTicks exhausted");
            return false;
        }
        self.remaining -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL_MS: u64 = 20;
    const SLEEP_MARGIN_MS: u64 = 200;

    #[test]
    fn test_manual_ticks_exhaust() {
        let mut ticks = ManualTicks::new(2);
        assert!(ticks.wait());
        assert!(ticks.wait());
        assert!(!ticks.wait());
        assert!(!ticks.wait(), "Exhausted source stays exhausted");
    }

    #[test]
    fn test_fixed_rate_first_tick_is_immediate() {
        let mut ticks = FixedRate::new(Duration::from_millis(INTERVAL_MS));
        let start = Instant::now();
        assert!(ticks.wait());
        assert!(
            start.elapsed() < Duration::from_millis(SLEEP_MARGIN_MS),
            "First tick must not wait a full interval"
        );
    }

    #[test]
    fn test_fixed_rate_paces_subsequent_ticks() {
        let mut ticks = FixedRate::new(Duration::from_millis(INTERVAL_MS));
        assert!(ticks.wait());

        let start = Instant::now();
        assert!(ticks.wait());
        assert!(
            start.elapsed() >= Duration::from_millis(INTERVAL_MS - 5),
            "Second tick must sleep out the interval"
        );
    }
}
