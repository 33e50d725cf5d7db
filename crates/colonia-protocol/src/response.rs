//! What the server sends back for every request.
//!
//! A request produces exactly one response:
//!
//! - **`update`**: it worked. The children describe every object whose
//!   client-visible state changed, so the client can reconcile its copy.
//! - **`error`**: it was refused. `reason` is a machine-readable code and
//!   `message` a human-readable explanation. Nothing changed.
//!
//! ```text
//! update
//! ├── player  id="player:1" gold="700"
//! ├── goods   type="CLOTH" amount="50" location="unit:12"
//! └── goods   type="CLOTH" amount="150" location="settlement:3"
//!
//! error  reason="goodsNotAtSettlement" message="Goods 50 CLOTH are not at settlement settlement:3"
//! ```

use std::fmt;
use std::str::FromStr;

use crate::param::{decode_revealed, encode_revealed};
use crate::{
    Envelope, Goods, GoodsType, NumericParam, PlayerId, ProtocolError, Revealed,
    Tile, UnitId, UnitType, WorkLocationId,
};

// ---------------------------------------------------------------------------
// ErrorReason / ClientError
// ---------------------------------------------------------------------------

/// Machine-readable reason a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorReason {
    /// An identifier did not resolve to an object the player may use.
    UnresolvedReference,
    /// A parameter was missing, malformed or out of range.
    InvalidParameter,
    /// The goods in a trade are not where the request says they are.
    GoodsNotAtSettlement,
    /// A work location belongs to a different colony than the unit.
    WrongColony,
    /// The work location cannot take this unit.
    CannotAdd,
    /// The unit is not on the map.
    NotOnMap,
    /// The unit is not inside a colony.
    NotInColony,
    /// The unit is not next to the target.
    NotAdjacent,
    /// The settlement or player cannot afford the trade.
    TradeRejected,
    /// No message type is registered for the tag.
    UnknownMessage,
    /// The frame could not be read as an envelope.
    MalformedEnvelope,
    /// Login failed, or a request arrived before login.
    NotAuthenticated,
    /// Something went wrong on the server side.
    Internal,
}

impl ErrorReason {
    pub const ALL: [ErrorReason; 13] = [
        ErrorReason::UnresolvedReference,
        ErrorReason::InvalidParameter,
        ErrorReason::GoodsNotAtSettlement,
        ErrorReason::WrongColony,
        ErrorReason::CannotAdd,
        ErrorReason::NotOnMap,
        ErrorReason::NotInColony,
        ErrorReason::NotAdjacent,
        ErrorReason::TradeRejected,
        ErrorReason::UnknownMessage,
        ErrorReason::MalformedEnvelope,
        ErrorReason::NotAuthenticated,
        ErrorReason::Internal,
    ];

    /// The wire code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorReason::UnresolvedReference => "unresolvedReference",
            ErrorReason::InvalidParameter => "invalidParameter",
            ErrorReason::GoodsNotAtSettlement => "goodsNotAtSettlement",
            ErrorReason::WrongColony => "wrongColony",
            ErrorReason::CannotAdd => "cannotAdd",
            ErrorReason::NotOnMap => "notOnMap",
            ErrorReason::NotInColony => "notInColony",
            ErrorReason::NotAdjacent => "notAdjacent",
            ErrorReason::TradeRejected => "tradeRejected",
            ErrorReason::UnknownMessage => "unknownMessage",
            ErrorReason::MalformedEnvelope => "malformedEnvelope",
            ErrorReason::NotAuthenticated => "notAuthenticated",
            ErrorReason::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ErrorReason {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorReason::ALL
            .into_iter()
            .find(|r| r.code() == s)
            .ok_or_else(|| {
                ProtocolError::payload(ClientError::TAG, format!("unknown reason {s:?}"))
            })
    }
}

/// A refusal the client can act on.
///
/// This is a value, not a fault: it is always sent back to the client
/// that made the request and never tears down the connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}: {message}")]
pub struct ClientError {
    pub reason: ErrorReason,
    pub message: String,
}

impl ClientError {
    /// Wire tag of the error response.
    pub const TAG: &'static str = "error";

    pub fn new(reason: ErrorReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    /// Shorthand for [`ErrorReason::InvalidParameter`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorReason::InvalidParameter, message)
    }

    /// Shorthand for [`ErrorReason::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorReason::Internal, message)
    }

    pub fn to_envelope(&self) -> Envelope {
        Envelope::new(Self::TAG)
            .with_attribute("reason", self.reason.code())
            .with_attribute("message", self.message.as_str())
    }

    /// # Errors
    /// [`ProtocolError`] if the envelope is not a well-formed `error`.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        Ok(Self {
            reason: envelope.require_attribute("reason")?.parse()?,
            message: envelope.attribute("message").unwrap_or_default().to_string(),
        })
    }
}

impl From<&ProtocolError> for ClientError {
    fn from(err: &ProtocolError) -> Self {
        let reason = match err {
            ProtocolError::UnknownMessageType(_) => ErrorReason::UnknownMessage,
            ProtocolError::MalformedEnvelope(_) => ErrorReason::MalformedEnvelope,
            ProtocolError::UnexpectedTag { .. }
            | ProtocolError::MissingAttribute { .. }
            | ProtocolError::InvalidPayload { .. } => ErrorReason::InvalidParameter,
            #[cfg(feature = "json")]
            ProtocolError::Encode(_) => ErrorReason::Internal,
        };
        Self::new(reason, err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Changes
// ---------------------------------------------------------------------------

/// Where a unit is, as far as the owner can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitLocation {
    /// On a map tile (including the tile of a colony, outside it).
    Tile(Tile),
    /// Inside a colony, at a building or colony tile.
    WorkLocation(WorkLocationId),
    /// Off the map, in Europe.
    Europe,
}

/// The owner-visible state of a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitView {
    pub id: UnitId,
    pub owner: PlayerId,
    pub unit_type: UnitType,
    pub location: UnitLocation,
}

/// What a player knows about a native settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementView {
    pub id: crate::SettlementId,
    /// Whether this player's scout has spoken to the chief.
    pub visited: bool,
    /// Skill taught here. `Known(None)` once it has been taught away.
    pub learnable_skill: Revealed<Option<UnitType>>,
    /// The three most wanted goods, most wanted first.
    pub wanted_goods: [Revealed<Option<GoodsType>>; 3],
}

const WANTED_GOODS_KEYS: [&str; 3] = ["wantedGoods0", "wantedGoods1", "wantedGoods2"];

/// One client-visible state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A unit was created, moved or otherwise changed.
    Unit(UnitView),
    /// An object no longer exists.
    Removed { id: String },
    /// A player's treasury changed.
    Gold { player: PlayerId, gold: u32 },
    /// A container now holds this many goods of this type.
    Goods(Goods),
    /// A settlement's revealed information changed.
    Settlement(SettlementView),
}

impl Change {
    pub fn to_envelope(&self) -> Envelope {
        match self {
            Change::Unit(unit) => {
                let env = Envelope::new("unit")
                    .with_attribute("id", unit.id.as_str())
                    .with_attribute("owner", unit.owner.to_string())
                    .with_attribute("type", unit.unit_type.as_str());
                match &unit.location {
                    UnitLocation::Tile(tile) => env.with_attribute("tile", tile.to_string()),
                    UnitLocation::WorkLocation(wl) => {
                        env.with_attribute("workLocation", wl.as_str())
                    }
                    UnitLocation::Europe => env.with_attribute("inEurope", "true"),
                }
            }
            Change::Removed { id } => Envelope::new("remove").with_attribute("id", id.as_str()),
            Change::Gold { player, gold } => Envelope::new("player")
                .with_attribute("id", player.to_string())
                .with_attribute("gold", gold.to_string()),
            Change::Goods(goods) => goods.to_envelope(),
            Change::Settlement(view) => {
                let mut env = Envelope::new("settlement")
                    .with_attribute("id", view.id.as_str())
                    .with_attribute("visited", view.visited.to_string())
                    .with_optional_attribute(
                        "learnableSkill",
                        encode_revealed(&view.learnable_skill),
                    );
                for (key, wanted) in WANTED_GOODS_KEYS.iter().zip(&view.wanted_goods) {
                    env = env.with_optional_attribute(*key, encode_revealed(wanted));
                }
                env
            }
        }
    }

    /// # Errors
    /// [`ProtocolError`] for an unknown change tag or unreadable fields.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        let tag = envelope.tag.as_str();
        let bad = |what: String| ProtocolError::payload(tag, what);
        match tag {
            "unit" => {
                let location = match (
                    envelope.attribute("tile"),
                    envelope.attribute("workLocation"),
                    envelope.attribute("inEurope"),
                ) {
                    (Some(tile), _, _) => UnitLocation::Tile(
                        tile.parse().map_err(|e: crate::InvalidTile| bad(e.to_string()))?,
                    ),
                    (None, Some(wl), _) => UnitLocation::WorkLocation(WorkLocationId::new(wl)),
                    (None, None, Some("true")) => UnitLocation::Europe,
                    _ => return Err(bad("unit without location".into())),
                };
                Ok(Change::Unit(UnitView {
                    id: UnitId::new(envelope.require_attribute("id")?),
                    owner: envelope
                        .require_attribute("owner")?
                        .parse()
                        .map_err(|e: crate::InvalidPlayerId| bad(e.to_string()))?,
                    unit_type: envelope
                        .require_attribute("type")?
                        .parse()
                        .map_err(|e: crate::UnknownName| bad(e.to_string()))?,
                    location,
                }))
            }
            "remove" => Ok(Change::Removed {
                id: envelope.require_attribute("id")?.to_string(),
            }),
            "player" => Ok(Change::Gold {
                player: envelope
                    .require_attribute("id")?
                    .parse()
                    .map_err(|e: crate::InvalidPlayerId| bad(e.to_string()))?,
                gold: NumericParam::from_raw(envelope.attribute("gold"))
                    .parse()
                    .map_err(|e| bad(e.to_string()))?,
            }),
            Goods::TAG => Goods::from_envelope(envelope).map(Change::Goods),
            "settlement" => {
                let revealed_goods = |key: &str| {
                    decode_revealed::<GoodsType>(envelope.attribute(key))
                        .map_err(|e| bad(e.to_string()))
                };
                Ok(Change::Settlement(SettlementView {
                    id: crate::SettlementId::new(envelope.require_attribute("id")?),
                    visited: envelope.attribute("visited") == Some("true"),
                    learnable_skill: decode_revealed(envelope.attribute("learnableSkill"))
                        .map_err(|e: crate::UnknownName| bad(e.to_string()))?,
                    wanted_goods: [
                        revealed_goods(WANTED_GOODS_KEYS[0])?,
                        revealed_goods(WANTED_GOODS_KEYS[1])?,
                        revealed_goods(WANTED_GOODS_KEYS[2])?,
                    ],
                }))
            }
            other => Err(bad(format!("unknown change <{other}>"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// The server's answer to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Update(Vec<Change>),
    Error(ClientError),
}

impl Response {
    /// Wire tag of a successful response.
    pub const UPDATE_TAG: &'static str = "update";

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    /// The refusal, if this is one.
    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Response::Error(e) => Some(e),
            Response::Update(_) => None,
        }
    }

    /// The changes, or an empty slice for an error.
    pub fn changes(&self) -> &[Change] {
        match self {
            Response::Update(changes) => changes,
            Response::Error(_) => &[],
        }
    }

    pub fn to_envelope(&self) -> Envelope {
        match self {
            Response::Update(changes) => Envelope::new(Self::UPDATE_TAG)
                .with_children(changes.iter().map(Change::to_envelope)),
            Response::Error(err) => err.to_envelope(),
        }
    }

    /// # Errors
    /// [`ProtocolError::UnknownMessageType`] for a tag that is neither
    /// `update` nor `error`, or the error of the failing child.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ProtocolError> {
        match envelope.tag.as_str() {
            Self::UPDATE_TAG => envelope
                .children
                .iter()
                .map(Change::from_envelope)
                .collect::<Result<_, _>>()
                .map(Response::Update),
            ClientError::TAG => ClientError::from_envelope(envelope).map(Response::Error),
            other => Err(ProtocolError::UnknownMessageType(other.to_string())),
        }
    }
}

impl From<ClientError> for Response {
    fn from(err: ClientError) -> Self {
        Response::Error(err)
    }
}
