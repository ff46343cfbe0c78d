//! Host-side raising of the concrete events.
//!
//! The host passes the live objects involved; each helper builds the event
//! record around stakes in them, dispatches it, and reads back what the
//! callback decided.

use wat_core::LifecycleError;
use wat_entity::{Player, PlayerJoinEvent, SignChangeEvent, StringArray};
use wat_heap::{Shared, WatString};

use crate::registry::Registry;

/// What a sign-change callback decided.
#[derive(Debug)]
pub struct SignChangeOutcome {
    /// The edit must be discarded.
    pub cancelled: bool,
    /// The lines to write to the sign. A stake in the event's final array,
    /// which is the host's own array unless the callback reassigned it.
    pub lines: Option<Shared<StringArray>>,
}

/// Raise a sign change for `player` writing `lines`.
///
/// `Ok(None)` means no callback is registered and the edit stands as is.
pub fn fire_sign_change(
    registry: &Registry,
    player: Option<&Shared<Player>>,
    lines: Option<&Shared<StringArray>>,
) -> Result<Option<SignChangeOutcome>, LifecycleError> {
    registry.dispatch(
        || {
            Ok(SignChangeEvent {
                player: player.cloned(),
                lines: lines.cloned(),
                cancel: false,
            })
        },
        |event| {
            Ok(SignChangeOutcome {
                cancelled: event.cancel,
                lines: event.lines.clone(),
            })
        },
    )
}

/// What a player-join callback decided.
#[derive(Debug, PartialEq)]
pub struct PlayerJoinOutcome {
    /// The message to broadcast; `None` suppresses it.
    pub join_message: Option<WatString>,
}

/// Raise a join for `player` with the default broadcast `message`.
///
/// `Ok(None)` means no callback is registered and `message` stands.
pub fn fire_player_join(
    registry: &Registry,
    player: Option<&Shared<Player>>,
    message: Option<&str>,
) -> Result<Option<PlayerJoinOutcome>, LifecycleError> {
    registry.dispatch(
        || {
            Ok(PlayerJoinEvent {
                player: player.cloned(),
                join_message: message.map(WatString::try_from_str).transpose()?,
            })
        },
        |event| {
            Ok(PlayerJoinOutcome {
                join_message: event
                    .join_message
                    .as_ref()
                    .map(WatString::duplicate)
                    .transpose()?,
            })
        },
    )
}
