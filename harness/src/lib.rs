//! Knitxfer harness: batch runs of transfer cases.
//!
//! The harness loads JSON case files, plans each one through
//! `knitxfer_search`, checks the plan with the kernel's `replay_verify`,
//! and writes `.xout` result files for the cases that pass.
//!
//! The harness does NOT plan or verify on its own; it delegates to the
//! search crate and the kernel.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod case;
pub mod report;
pub mod runner;
