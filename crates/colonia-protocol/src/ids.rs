//! Identifiers for objects in the authoritative game state.
//!
//! On the wire every reference is a plain string such as `"unit:12"`.
//! Each kind of object gets its own newtype so a settlement id cannot be
//! passed where a unit id is expected, even though both are strings
//! underneath. Decoding never checks that the object exists; that is the
//! server's job when it handles the message.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Defines a string-backed object identifier newtype.
///
/// `prefix` is the conventional namespace used when ids are minted from
/// a number (`UnitId::numbered(12)` is `"unit:12"`). Ids received from
/// the wire are kept verbatim, prefix or not.
macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Namespace used by [`Self::numbered`].
            pub const PREFIX: &'static str = $prefix;

            /// Wraps a raw identifier string.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Mints `"<prefix>:<n>"`.
            pub fn numbered(n: u32) -> Self {
                Self(format!("{}:{}", $prefix, n))
            }

            /// Returns the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        // Lets maps keyed by the id be queried with a raw wire string.
        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

object_id!(
    /// A unit (colonist, scout, wagon, ...).
    UnitId,
    "unit"
);
object_id!(
    /// A native settlement that can be traded with.
    SettlementId,
    "settlement"
);
object_id!(
    /// A player-owned colony.
    ColonyId,
    "colony"
);
object_id!(
    /// A building or colony tile where a unit can work.
    WorkLocationId,
    "workLocation"
);

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// A player, as established by authentication.
///
/// Numeric internally (the authenticator hands one out), written as
/// `"player:<n>"` in envelopes so it reads like every other reference.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl PlayerId {
    /// Wire prefix for player references.
    pub const PREFIX: &'static str = "player";
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", Self::PREFIX, self.0)
    }
}

/// Returned when a string is not a `player:<n>` reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a player reference: {0:?}")]
pub struct InvalidPlayerId(pub String);

impl FromStr for PlayerId {
    type Err = InvalidPlayerId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("player:")
            .and_then(|n| n.parse().ok())
            .map(PlayerId)
            .ok_or_else(|| InvalidPlayerId(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// A map coordinate. Written as `"x,y"` on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Tile {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Tile {
    /// Creates a tile coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns `true` if `other` is one of the eight neighbours of `self`.
    pub fn is_adjacent(&self, other: &Tile) -> bool {
        self != other
            && (self.x - other.x).abs() <= 1
            && (self.y - other.y).abs() <= 1
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Returned when a string is not an `x,y` coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a tile coordinate: {0:?}")]
pub struct InvalidTile(pub String);

impl FromStr for Tile {
    type Err = InvalidTile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || InvalidTile(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(bad)?;
        Ok(Tile {
            x: x.trim().parse().map_err(|_| bad())?,
            y: y.trim().parse().map_err(|_| bad())?,
        })
    }
}
