//! The 16-byte [`Uuid`] identifier.
//!
//! Identifiers are plain values: compared and copied by value, never
//! reference counted, never interned. An absent identifier is modelled by
//! the container (`Option`, a null pointer in C), never by a zeroed value.

use std::fmt;
use std::str::FromStr;

/// Number of bytes in a [`Uuid`]. ABI-stable.
pub const UUID_SIZE: usize = 16;

/// A 16-byte opaque identifier.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uuid {
    /// Raw identifier bytes, most significant first.
    pub bytes: [u8; UUID_SIZE],
}

const _: () = assert!(std::mem::size_of::<Uuid>() == UUID_SIZE);

impl Uuid {
    /// Build an identifier from raw bytes.
    pub const fn from_bytes(bytes: [u8; UUID_SIZE]) -> Self {
        Self { bytes }
    }

    /// Build an identifier from a big-endian `u128`.
    pub const fn from_u128(value: u128) -> Self {
        Self {
            bytes: value.to_be_bytes(),
        }
    }

    /// The identifier as a big-endian `u128`.
    pub const fn as_u128(&self) -> u128 {
        u128::from_be_bytes(self.bytes)
    }

    /// The most and least significant halves, as the game server stores them.
    pub const fn as_u64_pair(&self) -> (u64, u64) {
        let v = self.as_u128();
        ((v >> 64) as u64, v as u64)
    }

    /// Build an identifier from most and least significant halves.
    pub const fn from_u64_pair(most: u64, least: u64) -> Self {
        Self::from_u128(((most as u128) << 64) | least as u128)
    }
}

impl From<uuid::Uuid> for Uuid {
    fn from(id: uuid::Uuid) -> Self {
        Self::from_bytes(id.into_bytes())
    }
}

impl From<Uuid> for uuid::Uuid {
    fn from(id: Uuid) -> Self {
        uuid::Uuid::from_bytes(id.bytes)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&uuid::Uuid::from(*self).hyphenated(), f)
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uuid({self})")
    }
}

impl From<u128> for Uuid {
    fn from(v: u128) -> Self {
        Self::from_u128(v)
    }
}

impl FromStr for Uuid {
    type Err = uuid::Error;

    /// Parses the hyphenated form (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`),
    /// the bare 32-digit form, and the braced and `urn:uuid:` forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::try_parse(s).map(Self::from)
    }
}
