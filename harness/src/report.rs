//! `.xout` result files.
//!
//! ```text
//! ;{"offsets":[1,1],"firsts":[false,false],"orders":[0,0],"transferMax":1}
//! xfer f0 b0
//! xfer f1 b1
//! xfer b0 f1
//! xfer b1 f2
//! ```
//!
//! The header echoes exactly the four case fields, in that order, so no
//! other field of the input leaks into the output.

use std::path::{Path, PathBuf};

use serde_json::Value;

use knitxfer_kernel::machine::transfer::Transfer;

use crate::case::{Case, CaseError};

/// Extension of result files.
pub const XOUT_EXTENSION: &str = "xout";

const XFER_PREFIX: &str = "xfer ";

/// Error writing or reading an `.xout` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    Io { detail: String },
    MissingHeader,
    Header(CaseError),
    BadLine { line_no: usize, detail: String },
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::MissingHeader => write!(f, "missing ';' header line"),
            Self::Header(e) => write!(f, "bad header: {e}"),
            Self::BadLine { line_no, detail } => write!(f, "line {line_no}: {detail}"),
        }
    }
}

impl std::error::Error for ReportError {}

/// Render the `.xout` text for `case` solved by `transfers`.
#[must_use]
pub fn render_xout(case: &Case, transfers: &[Transfer]) -> String {
    let mut out = format!(
        ";{{\"offsets\":{},\"firsts\":{},\"orders\":{},\"transferMax\":{}}}\n",
        Value::from(case.offsets.clone()),
        Value::from(case.firsts.clone()),
        Value::from(case.orders.clone()),
        case.transfer_max,
    );
    for t in transfers {
        out.push_str(XFER_PREFIX);
        out.push_str(&t.to_string());
        out.push('\n');
    }
    out
}

/// Write `<out_dir>/<case.name>.xout`, creating `out_dir` if needed.
///
/// # Errors
///
/// Returns [`ReportError::Io`] on any filesystem failure.
pub fn write_xout(
    out_dir: &Path,
    case: &Case,
    transfers: &[Transfer],
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(out_dir).map_err(|e| ReportError::Io {
        detail: format!("create_dir_all {}: {e}", out_dir.display()),
    })?;
    let path = out_dir.join(format!("{}.{XOUT_EXTENSION}", case.name));
    write_atomic(&path, render_xout(case, transfers).as_bytes())?;
    Ok(path)
}

/// Parse `.xout` text back into its case header and transfers.
///
/// # Errors
///
/// Returns [`ReportError`] if the header or any transfer line is malformed.
pub fn parse_xout(name: &str, text: &str) -> Result<(Case, Vec<Transfer>), ReportError> {
    let mut lines = text.lines();
    let header = lines
        .next()
        .and_then(|l| l.strip_prefix(';'))
        .ok_or(ReportError::MissingHeader)?;
    let case = Case::from_json(name, header.as_bytes()).map_err(ReportError::Header)?;

    let mut transfers = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = i + 2;
        let body = line
            .strip_prefix(XFER_PREFIX)
            .ok_or_else(|| ReportError::BadLine {
                line_no,
                detail: format!("expected '{}' prefix", XFER_PREFIX.trim_end()),
            })?;
        let transfer = body.parse::<Transfer>().map_err(|e| ReportError::BadLine {
            line_no,
            detail: format!("{e}"),
        })?;
        transfers.push(transfer);
    }
    Ok((case, transfers))
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ReportError> {
    let dir = path.parent().ok_or_else(|| ReportError::Io {
        detail: "no parent directory".into(),
    })?;
    let temp_path = dir.join(format!(
        ".tmp_{}",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));
    std::fs::write(&temp_path, content).map_err(|e| ReportError::Io {
        detail: format!("write {}: {e}", temp_path.display()),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| ReportError::Io {
        detail: format!("rename {} -> {}: {e}", temp_path.display(), path.display()),
    })
}
