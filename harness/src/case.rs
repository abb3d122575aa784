//! Case files: one JSON object per file describing a transfer problem.
//!
//! ```text
//! {"offsets":[0,1,-1], "firsts":[0,1,0], "orders":[0,0,0], "transferMax":4}
//! ```
//!
//! `firsts` entries may be booleans or numbers; they are normalized to
//! booleans on load (zero, `null` and `""` are false). `orders` is carried
//! through to reports but does not affect planning.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

/// A loaded and shape-checked case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    /// File stem the case was loaded from.
    pub name: String,
    pub offsets: Vec<i32>,
    pub firsts: Vec<bool>,
    pub orders: Vec<i32>,
    pub transfer_max: u32,
}

/// Shape features used to skip categories of cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseTraits {
    /// Some pair of neighbours crosses (`i-1+offset[i-1] > i+offset[i]`).
    pub has_cables: bool,
    /// Two loops share a target needle.
    pub has_lace: bool,
    /// Some `|offset|` exceeds `transferMax`.
    pub has_long: bool,
}

/// Error loading a case file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseError {
    Io { detail: String },
    Json { detail: String },
    InvalidTransferMax,
    InvalidOffsets { detail: String },
    InvalidFirsts { detail: String },
    InvalidOrders { detail: String },
}

impl std::fmt::Display for CaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::Json { detail } => write!(f, "JSON parse error: {detail}"),
            Self::InvalidTransferMax => write!(f, "invalid transferMax"),
            Self::InvalidOffsets { detail } => write!(f, "invalid offsets: {detail}"),
            Self::InvalidFirsts { detail } => write!(f, "invalid firsts: {detail}"),
            Self::InvalidOrders { detail } => write!(f, "invalid orders: {detail}"),
        }
    }
}

impl std::error::Error for CaseError {}

impl Case {
    /// Load a case from `path`. The case name is the file stem.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] if the file cannot be read or is malformed.
    pub fn load(path: &Path) -> Result<Self, CaseError> {
        let bytes = std::fs::read(path).map_err(|e| CaseError::Io {
            detail: format!("read {}: {e}", path.display()),
        })?;
        let name = path
            .file_stem()
            .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
        Self::from_json(name, &bytes)
    }

    /// Parse a case from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] on malformed JSON or inconsistent fields.
    pub fn from_json(name: impl Into<String>, bytes: &[u8]) -> Result<Self, CaseError> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| CaseError::Json {
            detail: format!("{e}"),
        })?;

        let transfer_max = value["transferMax"]
            .as_u64()
            .filter(|&m| m >= 1)
            .and_then(|m| u32::try_from(m).ok())
            .ok_or(CaseError::InvalidTransferMax)?;

        let offsets = int_array(&value["offsets"])
            .map_err(|detail| CaseError::InvalidOffsets { detail })?;

        let firsts = match value["firsts"].as_array() {
            Some(items) if items.len() == offsets.len() => {
                items.iter().map(truthy).collect::<Vec<_>>()
            }
            Some(items) => {
                return Err(CaseError::InvalidFirsts {
                    detail: format!("{} entries for {} offsets", items.len(), offsets.len()),
                })
            }
            None => {
                return Err(CaseError::InvalidFirsts {
                    detail: "not an array".into(),
                })
            }
        };

        let orders =
            int_array(&value["orders"]).map_err(|detail| CaseError::InvalidOrders { detail })?;
        if orders.len() != offsets.len() {
            return Err(CaseError::InvalidOrders {
                detail: format!("{} entries for {} offsets", orders.len(), offsets.len()),
            });
        }

        Ok(Self {
            name: name.into(),
            offsets,
            firsts,
            orders,
            transfer_max,
        })
    }

    /// Classify the case for the runner's skip options.
    #[must_use]
    pub fn traits(&self) -> CaseTraits {
        let max = i64::from(self.transfer_max);
        let mut traits = CaseTraits::default();
        let mut by_target: BTreeMap<i64, usize> = BTreeMap::new();
        let mut prev_target: Option<i64> = None;

        for (i, &offset) in self.offsets.iter().enumerate() {
            let offset = i64::from(offset);
            if offset.abs() > max {
                traits.has_long = true;
            }
            let target = target_of(i, offset);
            if prev_target.is_some_and(|prev| prev > target) {
                traits.has_cables = true;
            }
            prev_target = Some(target);

            let count = by_target.entry(target).or_default();
            *count += 1;
            if *count > 1 {
                traits.has_lace = true;
            }
        }
        traits
    }
}

#[allow(clippy::cast_possible_wrap)]
fn target_of(index: usize, offset: i64) -> i64 {
    index as i64 + offset
}

fn int_array(value: &Value) -> Result<Vec<i32>, String> {
    let items = value.as_array().ok_or_else(|| "not an array".to_string())?;
    items
        .iter()
        .map(|item| {
            item.as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| format!("{item} is not a 32-bit integer"))
        })
        .collect()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
