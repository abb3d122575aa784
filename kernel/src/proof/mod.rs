//! Proof module: canonical hashing and replay verification.
//!
//! Depends on `machine`. Nothing depends on `proof` within the kernel.

pub mod hash;
pub mod replay;
