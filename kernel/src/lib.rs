//! Knitxfer kernel: the deterministic machine model for needle-bed transfers.
//!
//! # API Surface
//!
//! - [`machine::state::MachineState`] -- loop positions and needle stacks,
//!   advanced one [`machine::transfer::Transfer`] at a time
//! - [`machine::slack::SlackProfile`] -- yarn stretch limits between adjacent loops
//! - [`machine::codec`] -- the `.xfers` text format
//! - [`proof::replay::replay_verify`] -- verify a transfer list by deterministic replay
//!
//! # Module Dependency Direction
//!
//! `machine` ← `proof`
//!
//! One-way only. `machine` depends on nothing internal.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod machine;
pub mod proof;
