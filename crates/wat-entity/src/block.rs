//! Single blocks and the chunk they belong to.

use wat_core::{LifecycleError, Uuid};
use wat_heap::{DeepCopy, Shared, WatString};

use crate::location::Location;

/// Chunk containing a block, by coordinate.
///
/// A block names its chunk instead of holding a stake in it: the chunk owns
/// the graph below it, and a block is not part of that graph.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// Chunk X (block X divided by 16, rounded down).
    pub x: i32,
    /// Chunk Z (block Z divided by 16, rounded down).
    pub z: i32,
}

impl ChunkCoord {
    /// The chunk holding block column `(block_x, block_z)`.
    pub fn containing(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x >> 4,
            z: block_z >> 4,
        }
    }
}

impl DeepCopy for ChunkCoord {
    fn deep_copy(&self) -> Result<Self, LifecycleError> {
        Ok(*self)
    }
}

record! {
    /// One block of terrain.
    pub struct Block {
        /// Material name.
        pub r#type: Option<WatString>,
        /// Combined light level, 0 to 15.
        pub light_level: i8,
        /// Light from the sky, 0 to 15.
        pub light_from_sky: i8,
        /// Light from emitting blocks, 0 to 15.
        pub light_from_blocks: i8,
        /// Where the block is.
        pub location: Option<Shared<Location>>,
        /// The chunk the block is in. Coordinates name a chunk only within
        /// one world: resolve them together with `location.world_id`, as
        /// [`Block::world_chunk`] does.
        pub chunk: ChunkCoord,
    }
}

impl Block {
    /// Point `chunk` at the chunk containing `location`.
    pub fn sync_chunk(&mut self) {
        if let Some(loc) = &self.location {
            let v = loc.to_vector();
            self.chunk = ChunkCoord::containing(v.block_x, v.block_z);
        }
    }

    /// The world and chunk the block is in, or `None` when the block has no
    /// location or the location no world.
    pub fn world_chunk(&self) -> Option<(Uuid, ChunkCoord)> {
        let world = self.location.as_ref()?.world_id.as_deref()?;
        Some((*world, self.chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_coords_round_down() {
        assert_eq!(ChunkCoord::containing(15, 16), ChunkCoord { x: 0, z: 1 });
        assert_eq!(ChunkCoord::containing(-1, -17), ChunkCoord { x: -1, z: -2 });
    }

    #[test]
    fn sync_chunk_follows_location() {
        let mut b = Block {
            location: Some(Shared::try_new(Location::at(None, 33.5, 64.0, -0.5).unwrap()).unwrap()),
            ..Block::default()
        };
        b.sync_chunk();
        assert_eq!(b.chunk, ChunkCoord { x: 2, z: -1 });
    }

    #[test]
    fn same_coords_in_two_worlds_are_different_chunks() {
        let overworld = Uuid::from_u128(1);
        let nether = Uuid::from_u128(2);
        let block_in = |world| {
            let location = Location::at(Some(world), 33.5, 64.0, -0.5).unwrap();
            let mut b = Block {
                location: Some(Shared::try_new(location).unwrap()),
                ..Block::default()
            };
            b.sync_chunk();
            b
        };
        let (a, b) = (block_in(overworld), block_in(nether));
        assert_eq!(a.chunk, b.chunk);
        assert_eq!(a.world_chunk(), Some((overworld, ChunkCoord { x: 2, z: -1 })));
        assert_ne!(a.world_chunk(), b.world_chunk());
        assert_eq!(Block::default().world_chunk(), None);
    }

    #[test]
    fn deep_copy_keeps_chunk_by_value() {
        let b = Block {
            r#type: Some(WatString::try_from_str("STONE").unwrap()),
            light_level: 7,
            chunk: ChunkCoord { x: 4, z: 5 },
            ..Block::default()
        };
        let c = b.deep_copy().unwrap();
        assert_eq!(c.chunk, b.chunk);
        assert_eq!(c.r#type.as_ref().unwrap(), "STONE");
        assert_ne!(c.r#type.as_ref().unwrap().as_ptr(), b.r#type.as_ref().unwrap().as_ptr());
    }
}
