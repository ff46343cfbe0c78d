//! Event kinds the host can raise.

use std::fmt;

/// A named condition the host may signal. Each kind has at most one
/// registered callback at a time.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// A player finished editing a sign.
    SignChange = 0,
    /// A player joined the server.
    PlayerJoin = 1,
}

impl EventKind {
    /// Every kind, in discriminant order.
    pub const ALL: [EventKind; 2] = [EventKind::SignChange, EventKind::PlayerJoin];

    /// Stable lowercase name used in log output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SignChange => "sign_change",
            Self::PlayerJoin => "player_join",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for EventKind {
    type Error = i32;

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        Self::ALL.into_iter().find(|k| *k as i32 == v).ok_or(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminants_are_stable() {
        assert_eq!(EventKind::SignChange as i32, 0);
        assert_eq!(EventKind::PlayerJoin as i32, 1);
    }

    #[test]
    fn try_from_round_trips_and_rejects_unknown() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::try_from(kind as i32), Ok(kind));
        }
        assert_eq!(EventKind::try_from(9), Err(9));
    }
}
