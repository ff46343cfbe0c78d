//! Record schema for the wat object graph.
//!
//! Each record is declared once with the `record!` macro, which derives its
//! C layout, deep copy and constructor. The lifecycle itself (clone,
//! delete, reassign) comes from [`wat_heap::Shared`], so every record and
//! array type follows the same protocol.
//!
//! ```text
//! World ─┬─ loaded_chunks: ChunkArray ── Chunk ── entities: EntityArray ── Entity
//!        ├─ entities / living_entities: EntityArray
//!        ├─ players: PlayerArray ── Player ── compass_target / bed_spawn_location
//!        ├─ spawn_location: Location
//!        └─ game_rules: StringArray
//! ```
//!
//! `world_id` fields copy the identifier and never link back to a world,
//! which keeps the graph acyclic.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

#[macro_use]
mod record;

pub mod block;
pub mod chunk;
pub mod entity;
pub mod event;
pub mod location;
pub mod player;
pub mod vector;
pub mod world;

use wat_heap::{Array, Shared, WatString};

pub use block::{Block, ChunkCoord};
pub use chunk::Chunk;
pub use entity::Entity;
pub use event::{PlayerJoinEvent, SignChangeEvent};
pub use location::Location;
pub use player::Player;
pub use vector::Vector;
pub use world::World;

/// Array of player stakes.
pub type PlayerArray = Array<Shared<Player>>;
/// Array of chunk stakes.
pub type ChunkArray = Array<Shared<Chunk>>;
/// Array of entity stakes.
pub type EntityArray = Array<Shared<Entity>>;
/// Array of owned strings.
pub type StringArray = Array<WatString>;
