//! Goldpot round lifecycle engine.
//!
//! This crate contains the deterministic part of the table: the configuration
//! store, the player registry, stake-weighted winner selection and the
//! [`RoundEngine`] state machine that ties them together.
//!
//! ## Determinism requirements
//! - Do not read the wall clock here. Every time-dependent operation takes
//!   `now` (unix seconds) from the caller.
//! - Do not create randomness here. The engine draws only from the
//!   [`rand::Rng`] it was constructed with.
//!
//! ## Side effects
//! The engine never performs I/O. Settlements and configuration changes are
//! handed to a [`HistorySink`], and everything clients should see is returned
//! as [`goldpot_types::OutboundEvent`]s for the caller to broadcast.

pub mod config_store;
pub mod engine;
pub mod history;
pub mod parse;
pub mod registry;
pub mod selector;

mod rejection;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use config_store::{ConfigChange, ConfigStore};
pub use engine::{Countdown, RoundEngine, TableConfig};
pub use history::HistorySink;
pub use registry::PlayerRegistry;
pub use rejection::Rejection;
pub use selector::select_winner;
