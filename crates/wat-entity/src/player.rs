//! Connected players.

use wat_core::Uuid;
use wat_heap::{Owned, Shared, WatString};

use crate::location::Location;

record! {
    /// A player connected to the server.
    pub struct Player {
        /// Name shown in chat.
        pub display_name: Option<WatString>,
        /// Name shown in the tab list.
        pub player_list_name: Option<WatString>,
        /// Where the compass points.
        pub compass_target: Option<Shared<Location>>,
        /// Sneaking.
        pub sneaking: bool,
        /// Sprinting.
        pub sprinting: bool,
        /// Excluded from the sleep vote.
        pub sleeping_ignored: bool,
        /// Experience points ever collected.
        pub total_experience: i32,
        /// Experience level.
        pub level: i32,
        /// Food saturation.
        pub saturation: f32,
        /// Hunger bar.
        pub food_level: i32,
        /// Bed spawn point, if set.
        pub bed_spawn_location: Option<Shared<Location>>,
        /// Account identifier.
        pub uuid: Option<Owned<Uuid>>,
    }
}

impl Player {
    /// A player with a display name and account identifier.
    pub fn named(name: &str, uuid: Uuid) -> Result<Self, wat_core::LifecycleError> {
        Ok(Self {
            display_name: Some(WatString::try_from_str(name)?),
            player_list_name: Some(WatString::try_from_str(name)?),
            uuid: Some(Owned::try_new(uuid)?),
            ..Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wat_heap::{alloc::FailAfter, stats, DeepCopy};

    #[test]
    fn named_fills_identity() {
        let p = Player::named("Notch", Uuid::from_u128(1)).unwrap();
        assert_eq!(p.display_name.as_ref().unwrap(), "Notch");
        assert_eq!(p.uuid.as_deref(), Some(&Uuid::from_u128(1)));
    }

    #[test]
    fn compass_and_bed_may_share_location() {
        let spawn = Shared::try_new(Location::default()).unwrap();
        let p = Player {
            compass_target: Some(spawn.clone()),
            bed_spawn_location: Some(spawn.clone()),
            ..Player::default()
        };
        assert_eq!(spawn.ref_count(), 3);
        let copy = p.deep_copy().unwrap();
        let (a, b) = (
            copy.compass_target.as_ref().unwrap(),
            copy.bed_spawn_location.as_ref().unwrap(),
        );
        assert!(!Shared::ptr_eq(a, b));
        drop(p);
        assert_eq!(spawn.ref_count(), 1);
    }

    #[test]
    fn failed_copy_releases_everything() {
        let p = Player::named("Dinnerbone", Uuid::from_u128(2)).unwrap();
        let before = stats();
        for budget in 0..3 {
            let _guard = FailAfter::new(budget);
            assert!(p.deep_copy().is_err());
        }
        assert_eq!(stats().since(before).live(), 0);
    }
}
