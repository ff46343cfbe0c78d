//! 16x16 column of terrain and the entities inside it.

use wat_core::Uuid;
use wat_heap::{Owned, Shared};

use crate::EntityArray;

record! {
    /// A loaded or unloaded chunk.
    pub struct Chunk {
        /// Chunk X.
        pub x: i32,
        /// Chunk Z.
        pub z: i32,
        /// The world this chunk is in.
        pub world_id: Option<Owned<Uuid>>,
        /// Entities currently inside.
        pub entities: Option<Shared<EntityArray>>,
        /// Currently loaded.
        pub loaded: bool,
        /// Slimes may spawn here.
        pub slime_chunk: bool,
    }
}

impl Chunk {
    /// Number of entities, zero when the array is absent.
    pub fn entity_count(&self) -> usize {
        self.entities.as_ref().map_or(0, |a| a.len())
    }
}
