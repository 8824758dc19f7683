//! Common types shared by the goldpot round engine and the live table service.
//!
//! Everything here is plain data: the tunable [`Config`], the players of the
//! in-progress round, the [`Snapshot`] pushed to clients, the append-only
//! [`HistoryRecord`]s and the JSON messages exchanged over the websocket.

pub mod api;
pub mod history;
pub mod round;

pub use api::{InboundMessage, NumericInput, OutboundEvent};
pub use history::{ConfigChangeRecord, HistoryRecord, RoundRecord};
pub use round::{
    Config, Player, PlayerView, RoundStatus, RoundView, Snapshot, Winner, MIN_ROUND_DURATION_SECS,
    MIN_STAKE_FLOOR, QUORUM,
};
