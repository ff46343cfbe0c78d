//! Any entity present in a world.

use wat_core::Uuid;
use wat_heap::{Owned, Shared, WatString};

use crate::location::Location;
use crate::vector::Vector;
use crate::StringArray;

record! {
    /// A mob, item, projectile, vehicle, or player body in a world.
    pub struct Entity {
        /// Current position.
        pub location: Option<Shared<Location>>,
        /// Current velocity.
        pub velocity: Option<Shared<Vector>>,
        /// Bounding box height.
        pub height: f64,
        /// Bounding box width.
        pub width: f64,
        /// Supported by a block.
        pub on_ground: bool,
        /// The world this entity is in.
        pub world_id: Option<Owned<Uuid>>,
        /// Server-local numeric id.
        pub entity_id: i32,
        /// Ticks until the entity stops burning.
        pub fire_ticks: i32,
        /// Ticks a fire lasts on this entity.
        pub max_fire_ticks: i32,
        /// Dead and awaiting removal.
        pub is_dead: bool,
        /// Still tracked by the server.
        pub is_valid: bool,
        /// Has no passenger.
        pub is_empty: bool,
        /// Blocks fallen since last on ground.
        pub fall_distance: f32,
        /// Persistent identifier.
        pub unique_id: Option<Owned<Uuid>>,
        /// Age in ticks.
        pub ticks_lived: i32,
        /// Entity type name.
        pub entity_type: Option<WatString>,
        /// Riding a vehicle.
        pub inside_vehicle: bool,
        /// The vehicle being ridden.
        pub vehicle_id: Option<Owned<Uuid>>,
        /// Name tag shown without looking at the entity.
        pub custom_name_visible: bool,
        /// Outlined through walls.
        pub glowing: bool,
        /// Ignores damage.
        pub invulnerable: bool,
        /// Makes no sound.
        pub silent: bool,
        /// Subject to gravity.
        pub gravity: bool,
        /// Ticks before the entity may use a portal again.
        pub portal_cooldown: i32,
        /// Scoreboard tags.
        pub scoreboard_tags: Option<Shared<StringArray>>,
        /// How a piston moving into the entity affects it.
        pub piston_move_reaction: Option<WatString>,
    }
}

impl Entity {
    /// Identifier text of the entity type, if set.
    pub fn type_name(&self) -> Option<&WatString> {
        self.entity_type.as_ref()
    }

    /// `true` while burning.
    pub fn is_on_fire(&self) -> bool {
        self.fire_ticks > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wat_heap::{stats, AppendMode, Array, DeepCopy};

    fn sample() -> Entity {
        let mut tags = Array::new();
        for tag in ["boss", "named"] {
            tags.push(WatString::try_from_str(tag).unwrap()).unwrap();
        }
        Entity {
            location: Some(Shared::try_new(Location::at(None, 1.0, 2.0, 3.0).unwrap()).unwrap()),
            velocity: Some(Shared::try_new(Vector::new(0.0, -0.08, 0.0)).unwrap()),
            entity_id: 17,
            fire_ticks: 40,
            entity_type: Some(WatString::try_from_str("ZOMBIE").unwrap()),
            unique_id: Some(Owned::try_new(Uuid::from_u128(5)).unwrap()),
            scoreboard_tags: Some(Shared::try_new(tags).unwrap()),
            ..Entity::default()
        }
    }

    #[test]
    fn deep_copy_children_are_distinct() {
        let e = sample();
        let c = e.deep_copy().unwrap();
        assert_eq!(c, e);
        let (a, b) = (e.location.as_ref().unwrap(), c.location.as_ref().unwrap());
        assert!(!Shared::ptr_eq(a, b));
        assert_eq!(b.ref_count(), 1);
        let (a, b) = (
            e.scoreboard_tags.as_ref().unwrap(),
            c.scoreboard_tags.as_ref().unwrap(),
        );
        assert!(!Shared::ptr_eq(a, b));
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn shared_child_survives_record_drop() {
        let e = sample();
        let loc = e.location.clone().unwrap();
        assert_eq!(loc.ref_count(), 2);
        drop(e);
        assert_eq!(loc.ref_count(), 1);
        assert_eq!(loc.x, 1.0);
    }

    #[test]
    fn dropping_record_releases_graph() {
        let before = stats();
        drop(sample());
        assert_eq!(stats().since(before).live(), 0);
    }

    #[test]
    fn fire_state_tracks_ticks() {
        let mut e = Entity::default();
        assert!(!e.is_on_fire());
        e.fire_ticks = 3;
        assert!(e.is_on_fire());
    }

    #[test]
    fn entity_array_share_and_isolate() {
        let one = Entity::try_new().unwrap();
        let mut array: Array<Shared<Entity>> = Array::new();
        array.append(Some(&one), AppendMode::Share).unwrap();
        array.append(Some(&one), AppendMode::Isolate).unwrap();
        assert_eq!(one.ref_count(), 2);
        assert!(Shared::ptr_eq(&array.as_slice()[0], &one));
        assert!(!Shared::ptr_eq(&array.as_slice()[1], &one));
    }
}
