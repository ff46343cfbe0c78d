//! Event records handed to plugin callbacks.

use wat_heap::{Shared, WatString};

use crate::player::Player;
use crate::StringArray;

record! {
    /// A player edited the text of a sign.
    ///
    /// The callback may replace `lines` or set `cancel`; the host reads both
    /// back after the callback returns.
    pub struct SignChangeEvent {
        /// The player editing the sign.
        pub player: Option<Shared<Player>>,
        /// The new sign text, one entry per line.
        pub lines: Option<Shared<StringArray>>,
        /// Set to discard the edit.
        pub cancel: bool,
    }
}

record! {
    /// A player joined the server.
    ///
    /// The callback may replace `join_message`; a null message suppresses
    /// the broadcast.
    pub struct PlayerJoinEvent {
        /// The player who joined.
        pub player: Option<Shared<Player>>,
        /// Broadcast to everyone on join.
        pub join_message: Option<WatString>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wat_core::Uuid;
    use wat_heap::{Array, DeepCopy};

    #[test]
    fn sign_event_shares_player() {
        let player = Shared::try_new(Player::named("Alex", Uuid::from_u128(4)).unwrap()).unwrap();
        let event = SignChangeEvent {
            player: Some(player.clone()),
            lines: Some(Shared::try_new(Array::new()).unwrap()),
            cancel: false,
        };
        assert_eq!(player.ref_count(), 2);
        drop(event);
        assert_eq!(player.ref_count(), 1);
    }

    #[test]
    fn join_message_is_owned_text() {
        let event = PlayerJoinEvent {
            player: None,
            join_message: Some(WatString::try_from_str("Alex joined the game").unwrap()),
        };
        let copy = event.deep_copy().unwrap();
        assert_eq!(copy.join_message.as_ref().unwrap(), "Alex joined the game");
    }
}
