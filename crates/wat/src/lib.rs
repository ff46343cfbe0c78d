//! Wat: the game-server object graph shared with native plugins.
//!
//! This is the top-level facade crate that re-exports the public API of the
//! wat sub-crates. Plugins written in Rust depend on `wat` alone; the C
//! ABI lives in `wat-ffi`.
//!
//! # Quick start
//!
//! ```rust
//! use wat::prelude::*;
//!
//! let registry = Registry::new();
//! registry.register::<SignChangeEvent, _>(|event| {
//!     if let Some(event) = event.get_mut() {
//!         event.cancel = true;
//!     }
//! });
//!
//! let player = Shared::try_new(Player::named("alex", Uuid::from_u128(7))?)?;
//! let lines = Array::try_from_iter([WatString::try_from_str("hello")?])?;
//! let lines = Shared::try_new(lines)?;
//!
//! let outcome = wat::event::fire_sign_change(&registry, Some(&player), Some(&lines))?
//!     .expect("a callback is registered");
//! assert!(outcome.cancelled);
//! // The event's stakes were released when dispatch returned.
//! assert_eq!(player.ref_count(), 1);
//! # Ok::<(), LifecycleError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `wat-core` | identifiers, errors, configuration, event kinds |
//! | [`heap`] | `wat-heap` | `Shared`, `Array`, `WatString`, deep copy, lifecycle |
//! | [`entity`] | `wat-entity` | the record schema |
//! | [`event`] | `wat-event` | callback registry and host-side dispatch |
//! | [`colors`] | `wat-colors` | sign color-code plugin |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Identifiers, error types, configuration and event kinds (`wat-core`).
pub use wat_core as types;

/// Reference-counted cells, arrays, strings and the lifecycle functions
/// (`wat-heap`).
///
/// [`heap::lifecycle`] holds the nullable forms of delete, clone, deep
/// copy, reassign and append.
pub use wat_heap as heap;

/// Record schema (`wat-entity`).
pub use wat_entity as entity;

/// Event registry (`wat-event`).
///
/// Use [`event::global`] for the process-wide registry the C boundary
/// dispatches through.
pub use wat_event as event;

/// Sign color-code plugin (`wat-colors`).
pub use wat_colors as colors;

/// Common imports for typical wat usage.
///
/// ```rust
/// use wat::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use wat_core::{EventKind, LifecycleError, Uuid, WatConfig};

    // Heap
    pub use wat_heap::{lifecycle, AppendMode, Array, DeepCopy, Element, Shared, WatString};

    // Records
    pub use wat_entity::{
        Block, Chunk, ChunkArray, Entity, EntityArray, Location, Player, PlayerArray,
        PlayerJoinEvent, SignChangeEvent, StringArray, Vector, World,
    };

    // Events
    pub use wat_event::{Event, Registry};
}
