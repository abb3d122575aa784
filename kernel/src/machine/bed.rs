//! Needle-bed coordinates.
//!
//! A two-bed machine has a front and a back row of needles. Every loop rests
//! on exactly one `(Bed, Needle)` location at a time.

use std::fmt;
use std::str::FromStr;

/// Needle index on a bed. Negative needles are legal: loops may be parked
/// left of needle 0 while in transit.
pub type Needle = i32;

/// One of the two needle beds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bed {
    Front,
    Back,
}

impl Bed {
    /// The bed a transfer from `self` lands on.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }

    /// Single-letter machine code (`f` / `b`).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Front => 'f',
            Self::Back => 'b',
        }
    }

    /// Parse a single-letter machine code.
    #[must_use]
    pub const fn from_letter(c: char) -> Option<Self> {
        match c {
            'f' => Some(Self::Front),
            'b' => Some(Self::Back),
            _ => None,
        }
    }
}

/// A needle on a specific bed. Orders front before back, then by needle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BedNeedle {
    pub bed: Bed,
    pub needle: Needle,
}

impl BedNeedle {
    #[must_use]
    pub const fn new(bed: Bed, needle: Needle) -> Self {
        Self { bed, needle }
    }

    #[must_use]
    pub const fn front(needle: Needle) -> Self {
        Self::new(Bed::Front, needle)
    }

    #[must_use]
    pub const fn back(needle: Needle) -> Self {
        Self::new(Bed::Back, needle)
    }
}

impl fmt::Display for BedNeedle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.bed.letter(), self.needle)
    }
}

/// Failure to parse a `BedNeedle` token such as `f3` or `b-2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BedNeedleParseError {
    /// The token was empty.
    Empty,
    /// The first character was not `f` or `b`.
    UnknownBed { token: String },
    /// The needle part was not a signed integer.
    BadNeedle { token: String },
}

impl fmt::Display for BedNeedleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty bed/needle token"),
            Self::UnknownBed { token } => write!(f, "unknown bed in token '{token}'"),
            Self::BadNeedle { token } => write!(f, "bad needle number in token '{token}'"),
        }
    }
}

impl std::error::Error for BedNeedleParseError {}

impl FromStr for BedNeedle {
    type Err = BedNeedleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let first = chars.next().ok_or(BedNeedleParseError::Empty)?;
        let bed = Bed::from_letter(first).ok_or_else(|| BedNeedleParseError::UnknownBed {
            token: s.to_string(),
        })?;
        let needle = chars
            .as_str()
            .parse::<Needle>()
            .map_err(|_| BedNeedleParseError::BadNeedle {
                token: s.to_string(),
            })?;
        Ok(Self { bed, needle })
    }
}
