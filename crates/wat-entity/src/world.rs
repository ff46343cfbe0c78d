//! Worlds: the root of the object graph.

use wat_core::Uuid;
use wat_heap::{Owned, Shared, WatString};

use crate::location::Location;
use crate::{ChunkArray, EntityArray, PlayerArray, StringArray};

record! {
    /// One dimension of the server: its chunks, entities, players and rules.
    pub struct World {
        /// Chunks currently loaded.
        pub loaded_chunks: Option<Shared<ChunkArray>>,
        /// Every entity in the world.
        pub entities: Option<Shared<EntityArray>>,
        /// Living entities only.
        pub living_entities: Option<Shared<EntityArray>>,
        /// Players in the world.
        pub players: Option<Shared<PlayerArray>>,
        /// World name.
        pub name: Option<WatString>,
        /// World identifier.
        pub world_id: Option<Owned<Uuid>>,
        /// Default spawn point.
        pub spawn_location: Option<Shared<Location>>,
        /// Time of day in ticks.
        pub time: i64,
        /// Absolute time in ticks.
        pub full_time: i64,
        /// Raining or snowing.
        pub has_storm: bool,
        /// Ticks until the weather changes.
        pub weather_duration: i32,
        /// Thunderstorm active.
        pub thundering: bool,
        /// Ticks until the thunder state changes.
        pub thunder_duration: i32,
        /// Terrain seed.
        pub seed: i64,
        /// Players may damage each other.
        pub pvp: bool,
        /// Animals may spawn.
        pub allow_animals: bool,
        /// Monsters may spawn.
        pub allow_monsters: bool,
        /// Build height limit.
        pub max_height: i32,
        /// Sea level.
        pub sea_level: i32,
        /// Spawn chunks stay loaded.
        pub keep_spawn_in_memory: bool,
        /// Saved automatically.
        pub auto_save: bool,
        /// Generator type name.
        pub world_type: Option<WatString>,
        /// Structures generate in new chunks.
        pub can_generate_structures: bool,
        /// Ticks between animal spawn attempts.
        pub ticks_per_animal_spawns: i64,
        /// Ticks between monster spawn attempts.
        pub ticks_per_monster_spawns: i64,
        /// Monster cap per chunk.
        pub monster_spawn_limit: i32,
        /// Animal cap per chunk.
        pub animal_spawn_limit: i32,
        /// Water animal cap per chunk.
        pub water_animal_spawn_limit: i32,
        /// Ambient mob cap per chunk.
        pub ambient_spawn_limit: i32,
        /// Game rule names.
        pub game_rules: Option<Shared<StringArray>>,
    }
}

impl World {
    /// A world with a name and identifier and everything else defaulted.
    pub fn named(name: &str, id: Uuid) -> Result<Self, wat_core::LifecycleError> {
        Ok(Self {
            name: Some(WatString::try_from_str(name)?),
            world_id: Some(Owned::try_new(id)?),
            ..Self::default()
        })
    }

    /// The world identifier, if set.
    pub fn id(&self) -> Option<Uuid> {
        self.world_id.as_deref().copied()
    }
}
