//! Benchmark profiles for the wat object graph.
//!
//! - [`reference_world`]: 16 chunks of 8 entities, 4 players
//! - [`stress_world`]: 256 chunks of 32 entities, 64 players
//! - [`sign_lines`]: four sign lines with color codes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use wat_entity::{StringArray, World};
use wat_heap::Shared;
use wat_test_utils::{strings, TestWorldBuilder};

/// Build a world with `chunks` chunks of `entities` entities each and
/// `players` online players.
pub fn world_profile(chunks: usize, entities: usize, players: usize) -> Shared<World> {
    (0..players)
        .fold(
            TestWorldBuilder::new()
                .name("bench")
                .chunks(chunks)
                .entities_per_chunk(entities),
            |builder, i| builder.player(&format!("player{i}")),
        )
        .build()
}

/// 128 entities in 16 chunks, 4 players.
pub fn reference_world() -> Shared<World> {
    world_profile(16, 8, 4)
}

/// 8192 entities in 256 chunks, 64 players.
pub fn stress_world() -> Shared<World> {
    world_profile(256, 32, 64)
}

/// A typical sign edit.
pub fn sign_lines() -> Shared<StringArray> {
    strings(&["&4[Shop]", "&lDiamond", "64 for &a$10", "&&1 each"])
}
