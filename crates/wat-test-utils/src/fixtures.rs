//! Reusable object-graph fixtures.
//!
//! - [`strings`]: a shared string array.
//! - [`entity`], [`player`], [`chunk`]: single records with the fields
//!   tests usually inspect.
//! - [`TestWorldBuilder`]: a world with chunks, entities and players, where
//!   every chunk entity is also listed (shared) in the world's entity array.

use wat_core::Uuid;
use wat_entity::{Chunk, Entity, Location, Player, Vector, World};
use wat_heap::{AppendMode, Array, Owned, Shared, WatString};

pub fn uuid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn strings(items: &[&str]) -> Shared<wat_entity::StringArray> {
    let array = Array::try_from_iter(
        items
            .iter()
            .map(|s| WatString::try_from_str(s).expect("fixture text has no NUL")),
    )
    .expect("fixture allocation");
    Shared::try_new(array).expect("fixture allocation")
}

pub fn entity(entity_id: i32, world: Uuid) -> Shared<Entity> {
    let location = Location::at(Some(world), entity_id as f64, 64.0, 0.0).expect("fixture allocation");
    Shared::try_new(Entity {
        location: Some(Shared::try_new(location).expect("fixture allocation")),
        velocity: Some(Shared::try_new(Vector::new(0.0, 0.0, 0.0)).expect("fixture allocation")),
        world_id: Some(Owned::try_new(world).expect("fixture allocation")),
        unique_id: Some(Owned::try_new(uuid(1_000 + entity_id as u128)).expect("fixture allocation")),
        entity_id,
        entity_type: Some(WatString::try_from_str("ZOMBIE").expect("fixture allocation")),
        is_valid: true,
        scoreboard_tags: Some(strings(&["fixture"])),
        ..Entity::default()
    })
    .expect("fixture allocation")
}

pub fn player(name: &str, id: u128) -> Shared<Player> {
    Shared::try_new(Player::named(name, uuid(id)).expect("fixture allocation"))
        .expect("fixture allocation")
}

pub fn chunk(x: i32, z: i32, world: Uuid, entities: &[Shared<Entity>]) -> Shared<Chunk> {
    let mut list = Array::new();
    for e in entities {
        list.append(Some(e), AppendMode::Share).expect("fixture allocation");
    }
    Shared::try_new(Chunk {
        x,
        z,
        world_id: Some(Owned::try_new(world).expect("fixture allocation")),
        entities: Some(Shared::try_new(list).expect("fixture allocation")),
        loaded: true,
        ..Chunk::default()
    })
    .expect("fixture allocation")
}

/// Builder for a populated [`World`].
pub struct TestWorldBuilder {
    name: String,
    id: Uuid,
    chunks: usize,
    entities_per_chunk: usize,
    players: Vec<String>,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self {
            name: "world".to_string(),
            id: uuid(1),
            chunks: 1,
            entities_per_chunk: 1,
            players: Vec::new(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn chunks(mut self, chunks: usize) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn entities_per_chunk(mut self, n: usize) -> Self {
        self.entities_per_chunk = n;
        self
    }

    pub fn player(mut self, name: &str) -> Self {
        self.players.push(name.to_string());
        self
    }

    pub fn build(self) -> Shared<World> {
        let mut world = World::named(&self.name, self.id).expect("fixture allocation");
        let mut chunks = Array::new();
        let mut all = Array::new();
        let mut next_id = 0;
        for c in 0..self.chunks {
            let members: Vec<_> = (0..self.entities_per_chunk)
                .map(|_| {
                    next_id += 1;
                    entity(next_id, self.id)
                })
                .collect();
            for e in &members {
                all.append(Some(e), AppendMode::Share).expect("fixture allocation");
            }
            let ch = chunk(c as i32, 0, self.id, &members);
            chunks.append(Some(&ch), AppendMode::Share).expect("fixture allocation");
        }
        let mut players = Array::new();
        for (i, name) in self.players.iter().enumerate() {
            let p = player(name, 500 + i as u128);
            players.append(Some(&p), AppendMode::Share).expect("fixture allocation");
        }
        world.loaded_chunks = Some(Shared::try_new(chunks).expect("fixture allocation"));
        world.entities = Some(Shared::try_new(all).expect("fixture allocation"));
        world.players = Some(Shared::try_new(players).expect("fixture allocation"));
        world.game_rules = Some(strings(&["doDaylightCycle", "keepInventory"]));
        world.spawn_location = Some(
            Shared::try_new(Location::at(Some(self.id), 0.0, 64.0, 0.0).expect("fixture allocation"))
                .expect("fixture allocation"),
        );
        Shared::try_new(world).expect("fixture allocation")
    }
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}
