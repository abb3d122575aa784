//! A single needle-to-needle transfer.

use std::fmt;
use std::str::FromStr;

use crate::machine::bed::{Bed, BedNeedle, BedNeedleParseError, Needle};

/// Move every loop on `source` to `destination` on the opposite bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Transfer {
    pub source: BedNeedle,
    pub destination: BedNeedle,
}

impl Transfer {
    #[must_use]
    pub const fn new(source: BedNeedle, destination: BedNeedle) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// True when the two ends are on different beds. Same-bed transfers are
    /// physically impossible and rejected wherever a transfer is applied.
    #[must_use]
    pub fn is_cross_bed(&self) -> bool {
        self.source.bed != self.destination.bed
    }

    /// Bed the carriage draws loops from.
    #[must_use]
    pub const fn source_bed(&self) -> Bed {
        self.source.bed
    }

    /// Needle on the front bed involved in this transfer.
    #[must_use]
    pub const fn front_needle(&self) -> Needle {
        match self.source.bed {
            Bed::Front => self.source.needle,
            Bed::Back => self.destination.needle,
        }
    }

    /// Needle on the back bed involved in this transfer.
    #[must_use]
    pub const fn back_needle(&self) -> Needle {
        match self.source.bed {
            Bed::Front => self.destination.needle,
            Bed::Back => self.source.needle,
        }
    }

    /// True when both [`Transfer::rack`] and [`Transfer::shift`] fit in a
    /// [`Needle`]. Every transfer applied to a machine satisfies this.
    #[must_use]
    pub const fn in_range(&self) -> bool {
        self.front_needle().checked_sub(self.back_needle()).is_some()
            && self
                .destination
                .needle
                .checked_sub(self.source.needle)
                .is_some()
    }

    /// Racking this transfer needs: front needle minus back needle.
    ///
    /// Overflows unless [`Transfer::in_range`] holds.
    #[must_use]
    pub const fn rack(&self) -> i32 {
        self.front_needle() - self.back_needle()
    }

    /// Horizontal displacement applied to every carried loop.
    #[must_use]
    pub const fn shift(&self) -> i32 {
        self.destination.needle - self.source.needle
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.source, self.destination)
    }
}

/// Failure to parse a `"<src> <dst>"` transfer line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferParseError {
    /// Not exactly two whitespace-separated tokens.
    WrongArity { found: usize },
    /// One of the two tokens was malformed.
    Endpoint(BedNeedleParseError),
    /// Both ends named the same bed.
    SameBed { line: String },
    /// The needles are too far apart for any racking.
    RackOverflow { line: String },
}

impl fmt::Display for TransferParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongArity { found } => {
                write!(f, "transfer needs 2 tokens, found {found}")
            }
            Self::Endpoint(e) => write!(f, "{e}"),
            Self::SameBed { line } => write!(f, "transfer '{line}' stays on one bed"),
            Self::RackOverflow { line } => {
                write!(f, "transfer '{line}' needs a racking outside the needle range")
            }
        }
    }
}

impl std::error::Error for TransferParseError {}

impl From<BedNeedleParseError> for TransferParseError {
    fn from(e: BedNeedleParseError) -> Self {
        Self::Endpoint(e)
    }
}

impl FromStr for Transfer {
    type Err = TransferParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let [src, dst] = tokens.as_slice() else {
            return Err(TransferParseError::WrongArity {
                found: tokens.len(),
            });
        };
        let transfer = Self::new(src.parse()?, dst.parse()?);
        if !transfer.is_cross_bed() {
            return Err(TransferParseError::SameBed {
                line: s.trim().to_string(),
            });
        }
        if !transfer.in_range() {
            return Err(TransferParseError::RackOverflow {
                line: s.trim().to_string(),
            });
        }
        Ok(transfer)
    }
}
