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

// Cadence sandbox
// Minimal demo: a counter store, two components sharing a group, and a few
// manually driven frames.

use anyhow::{anyhow, Result};
use cadence_runtime::prelude::*;

struct CanvasData {
    count: i64,
}

fn main() -> Result<()> {
    env_logger::init();

    let definition = StoreDefinition::new(|| CanvasData { count: 0 }, |d| d.count)
        .mutation("set", |ctx, payload| {
            let n = *payload
                .downcast::<i64>()
                .map_err(|_| anyhow!("set expects an i64 payload"))?;
            ctx.data.count = n;
            ctx.trigger("canvas");
            Ok(())
        })
        .mutation("increment", |ctx, payload| {
            let n = *payload
                .downcast::<i64>()
                .map_err(|_| anyhow!("increment expects an i64 payload"))?;
            ctx.data.count += n;
            ctx.trigger("canvas");
            Ok(())
        })
        .action("reset", |ctx, _| {
            ctx.mutate("set", Box::new(0i64))?;
            Ok(())
        });

    let mut engine = Engine::new(definition);

    let canvas = ComponentDescriptor::new(OwnerId::new()).bind(
        "draw",
        GroupRef::single("canvas"),
        |count: &i64| {
            println!("canvas: count = {count}");
            Ok(())
        },
    );
    // Bound to both groups, but deduplicated when both are queued.
    let overlay = ComponentDescriptor::new(OwnerId::new()).bind(
        "draw",
        GroupRef::many(["canvas", "debug"]),
        |count: &i64| {
            println!("overlay: count = {count}");
            Ok(())
        },
    );

    engine.add_component(&canvas)?;
    engine.add_component(&overlay)?;

    // Initial render: registration queued both groups.
    engine.step_once();

    engine.mutate("increment", Box::new(5i64))?;
    engine.step_once();

    engine.mutate("increment", Box::new(2i64))?;
    engine.action("reset", Box::new(()))?;
    engine.step_once();

    // A short driven loop; nothing is queued, so these frames are empty.
    let mut ticks = ManualTicks::new(2);
    engine.run(&mut ticks);

    log::info!("Final state: {}", engine.state());
    Ok(())
}
