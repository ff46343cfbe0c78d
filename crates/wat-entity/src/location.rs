//! A position in a specific world, with facing.

use wat_core::{LifecycleError, Uuid};
use wat_heap::Owned;

use crate::vector::Vector;

record! {
    /// Position plus orientation. `world_id` names the world by value and
    /// never links to a world record.
    pub struct Location {
        /// The world this position is in.
        pub world_id: Option<Owned<Uuid>>,
        /// X coordinate.
        pub x: f64,
        /// Y coordinate.
        pub y: f64,
        /// Z coordinate.
        pub z: f64,
        /// Vertical rotation in degrees.
        pub pitch: f32,
        /// Horizontal rotation in degrees.
        pub yaw: f32,
    }
}

impl Location {
    /// A location in `world` at `(x, y, z)` with zero rotation.
    pub fn at(world: Option<Uuid>, x: f64, y: f64, z: f64) -> Result<Self, LifecycleError> {
        Ok(Self {
            world_id: world.map(Owned::try_new).transpose()?,
            x,
            y,
            z,
            ..Self::default()
        })
    }

    /// The position as a [`Vector`].
    pub fn to_vector(&self) -> Vector {
        Vector::new(self.x, self.y, self.z)
    }

    /// The world identifier, if set.
    pub fn world(&self) -> Option<Uuid> {
        self.world_id.as_deref().copied()
    }
}
