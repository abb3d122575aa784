//! Machine model: beds, needles, transfers, and the loop layout they act on.

pub mod bed;
pub mod codec;
pub mod slack;
pub mod state;
pub mod transfer;
