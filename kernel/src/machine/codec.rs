//! Plain-text `.xfers` format: one `"<bed><needle> <bed><needle>"` line per
//! transfer, in application order.

use std::fmt;

use crate::machine::bed::BedNeedle;
use crate::machine::transfer::{Transfer, TransferParseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Token count is odd; the last source has no destination.
    DanglingToken { token: String },
    /// A source/destination pair failed to parse.
    BadTransfer {
        /// 1-based position of the pair in the stream.
        ordinal: usize,
        source: TransferParseError,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingToken { token } => {
                write!(f, "transfer source '{token}' has no destination")
            }
            Self::BadTransfer { ordinal, source } => write!(f, "transfer #{ordinal}: {source}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BadTransfer { source, .. } => Some(source),
            Self::DanglingToken { .. } => None,
        }
    }
}

/// Render transfers as `.xfers` text. The empty list renders as `""`.
#[must_use]
pub fn render_xfers(transfers: &[Transfer]) -> String {
    let mut out = String::with_capacity(transfers.len() * 8);
    for t in transfers {
        out.push_str(&t.to_string());
        out.push('\n');
    }
    out
}

/// Parse `.xfers` text.
///
/// Tokens are whitespace separated and consumed in source/destination pairs,
/// so line breaks carry no meaning beyond separating tokens.
///
/// # Errors
///
/// Returns [`CodecError`] on an odd token count, a malformed endpoint, a
/// same-bed pair, or a pair whose racking overflows.
pub fn parse_xfers(text: &str) -> Result<Vec<Transfer>, CodecError> {
    let mut tokens = text.split_whitespace();
    let mut transfers = Vec::new();
    while let Some(src) = tokens.next() {
        let ordinal = transfers.len() + 1;
        let Some(dst) = tokens.next() else {
            return Err(CodecError::DanglingToken {
                token: src.to_string(),
            });
        };
        let endpoint = |tok: &str| {
            tok.parse::<BedNeedle>()
                .map_err(|e| CodecError::BadTransfer {
                    ordinal,
                    source: e.into(),
                })
        };
        let transfer = Transfer::new(endpoint(src)?, endpoint(dst)?);
        if !transfer.is_cross_bed() {
            return Err(CodecError::BadTransfer {
                ordinal,
                source: TransferParseError::SameBed {
                    line: format!("{src} {dst}"),
                },
            });
        }
        if !transfer.in_range() {
            return Err(CodecError::BadTransfer {
                ordinal,
                source: TransferParseError::RackOverflow {
                    line: format!("{src} {dst}"),
                },
            });
        }
        transfers.push(transfer);
    }
    Ok(transfers)
}
