//! Scalar parameters that need more care than a plain string.
//!
//! Two situations show up again and again in the message catalog:
//!
//! - **Numbers carried as text.** A price arrives as `gold="300"`. The raw
//!   string is kept as received so re-encoding is lossless, and it is only
//!   parsed when someone asks. [`NumericParam::parse`] gives an explicit
//!   `Result`; [`NumericParam::value_or_sentinel`] gives the legacy
//!   "negative means invalid" form for callers that want a plain integer.
//! - **Values the player has not learned yet.** A native settlement's
//!   skill is unknown until a scout visits. [`Revealed`] keeps "unknown"
//!   as its own case instead of overloading a magic number.

use std::fmt;
use std::str::FromStr;

/// Why a numeric parameter could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidNumber {
    /// The attribute was not sent at all.
    #[error("missing number")]
    Missing,
    /// The text is not an integer (or does not fit).
    #[error("not a number: {0:?}")]
    Malformed(String),
    /// The integer is negative; all protocol quantities are non-negative.
    #[error("negative number: {0}")]
    Negative(String),
}

/// A non-negative integer parameter kept in its wire (string) form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NumericParam(Option<String>);

impl NumericParam {
    /// What [`Self::value_or_sentinel`] returns for an unusable value.
    pub const INVALID: i64 = -1;

    /// Captures a known-good value (client-side construction).
    pub fn from_value(value: u32) -> Self {
        Self(Some(value.to_string()))
    }

    /// Captures whatever the wire carried, including nothing.
    pub fn from_raw(raw: Option<&str>) -> Self {
        Self(raw.map(str::to_string))
    }

    /// The raw text, exactly as received.
    pub fn raw(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Parses the value.
    ///
    /// # Errors
    /// [`InvalidNumber`] describing why the text is unusable.
    pub fn parse(&self) -> Result<u32, InvalidNumber> {
        let raw = self.0.as_deref().ok_or(InvalidNumber::Missing)?;
        let value: i64 = raw
            .parse()
            .map_err(|_| InvalidNumber::Malformed(raw.to_string()))?;
        if value < 0 {
            return Err(InvalidNumber::Negative(raw.to_string()));
        }
        u32::try_from(value).map_err(|_| InvalidNumber::Malformed(raw.to_string()))
    }

    /// Parses the value, or returns [`Self::INVALID`] (`-1`).
    ///
    /// The sentinel must be checked before use; handlers should prefer
    /// [`Self::parse`].
    pub fn value_or_sentinel(&self) -> i64 {
        self.parse().map(i64::from).unwrap_or(Self::INVALID)
    }
}

impl fmt::Display for NumericParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(raw) => f.write_str(raw),
            None => f.write_str("<missing>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Revealed
// ---------------------------------------------------------------------------

/// A value that may not have been revealed to this player yet.
///
/// Kept distinct from "revealed, and the answer is nothing": a settlement
/// that has already taught its skill is `Known(None)`, while one nobody has
/// visited is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Revealed<T> {
    /// Not yet revealed.
    #[default]
    Unknown,
    /// Revealed.
    Known(T),
}

impl<T> Revealed<T> {
    /// Returns `true` once the value is revealed.
    pub fn is_known(&self) -> bool {
        matches!(self, Revealed::Known(_))
    }

    /// Returns the revealed value, if any.
    pub fn known(&self) -> Option<&T> {
        match self {
            Revealed::Known(v) => Some(v),
            Revealed::Unknown => None,
        }
    }

    /// Maps the revealed value, keeping `Unknown` as is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Revealed<U> {
        match self {
            Revealed::Known(v) => Revealed::Known(f(v)),
            Revealed::Unknown => Revealed::Unknown,
        }
    }
}

/// Wire literal for "revealed, and there is nothing".
pub const NONE_LITERAL: &str = "none";

/// Encodes an optional-and-maybe-unknown value as an attribute value.
///
/// `Unknown` becomes an absent attribute, `Known(None)` becomes `"none"`.
pub fn encode_revealed<T: fmt::Display>(
    value: &Revealed<Option<T>>,
) -> Option<String> {
    match value {
        Revealed::Unknown => None,
        Revealed::Known(None) => Some(NONE_LITERAL.to_string()),
        Revealed::Known(Some(v)) => Some(v.to_string()),
    }
}

/// Decodes the attribute form written by [`encode_revealed`].
///
/// # Errors
/// The `FromStr` error of `T` if the text is neither `"none"` nor a valid
/// `T`.
pub fn decode_revealed<T: FromStr>(
    raw: Option<&str>,
) -> Result<Revealed<Option<T>>, T::Err> {
    match raw {
        None => Ok(Revealed::Unknown),
        Some(NONE_LITERAL) => Ok(Revealed::Known(None)),
        Some(text) => text.parse().map(|v| Revealed::Known(Some(v))),
    }
}
