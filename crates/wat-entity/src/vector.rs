//! Three-component position or velocity.

record! {
    /// A point or direction in world space, with its containing block.
    pub struct Vector {
        /// X component.
        pub x: f64,
        /// Y component.
        pub y: f64,
        /// Z component.
        pub z: f64,
        /// `floor(x)`.
        pub block_x: i32,
        /// `floor(y)`.
        pub block_y: i32,
        /// `floor(z)`.
        pub block_z: i32,
    }
}

fn block_of(coord: f64) -> i32 {
    // `as` saturates at the i32 range and maps NaN to 0.
    coord.floor() as i32
}

impl Vector {
    /// A vector at `(x, y, z)` with block coordinates derived.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            block_x: block_of(x),
            block_y: block_of(y),
            block_z: block_of(z),
        }
    }

    /// Move to `(x, y, z)`, keeping the block coordinates in step.
    pub fn set(&mut self, x: f64, y: f64, z: f64) {
        *self = Self::new(x, y, z);
    }
}
