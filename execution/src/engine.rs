//! Round state machine.
//!
//! A round moves through three states:
//! 1. **Waiting** - stakes are accepted, no countdown
//! 2. **Running** - quorum reached, countdown armed, stakes still accepted
//! 3. **Settling** - transient: winner drawn, history written, state cleared
//!
//! Settling collapses back to Waiting inside a single call, so it is never
//! observable from outside.
//!
//! ## Countdown
//!
//! Every Waiting -> Running transition arms a countdown tagged with a fresh
//! generation. The driver feeding [`RoundEngine::tick`] must pass the
//! generation it was armed with; ticks carrying any other generation are
//! ignored, so a driver that outlives its round can never settle the next one.

use std::collections::HashMap;

use goldpot_types::{
    Config, ConfigChangeRecord, NumericInput, OutboundEvent, RoundRecord, RoundStatus, RoundView,
    Snapshot, Winner, QUORUM,
};
use rand::Rng;
use tracing::{debug, info};

use crate::{
    parse::parse_positive, selector::select_winner, ConfigStore, HistorySink, PlayerRegistry,
    Rejection,
};

const DEFAULT_ADMIN_NAME: &str = "admin";

/// Static settings used to build an engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableConfig {
    /// Configuration in effect at startup.
    pub config: Config,
    /// Reserved identity allowed to change the configuration (case-insensitive).
    pub admin_name: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            config: Config::default(),
            admin_name: DEFAULT_ADMIN_NAME.to_string(),
        }
    }
}

/// The countdown of the running round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    pub generation: u64,
    pub ends_at: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Waiting,
    Running { start: u64, end: u64, generation: u64 },
}

pub struct RoundEngine<H: HistorySink, R: Rng> {
    config: ConfigStore,
    players: PlayerRegistry,
    identities: HashMap<u64, String>,
    phase: Phase,
    last_winner: Option<String>,
    generation: u64,
    history: H,
    rng: R,
}

impl<H: HistorySink, R: Rng> RoundEngine<H, R> {
    pub fn new(table: TableConfig, history: H, rng: R) -> Self {
        Self {
            config: ConfigStore::new(table.config, table.admin_name),
            players: PlayerRegistry::new(),
            identities: HashMap::new(),
            phase: Phase::Waiting,
            last_winner: None,
            generation: 0,
            history,
            rng,
        }
    }

    pub fn config(&self) -> Config {
        self.config.config()
    }

    pub fn status(&self) -> RoundStatus {
        match self.phase {
            Phase::Waiting => RoundStatus::Waiting,
            Phase::Running { .. } => RoundStatus::Running,
        }
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn last_winner(&self) -> Option<&str> {
        self.last_winner.as_deref()
    }

    pub fn identity(&self, connection: u64) -> Option<&str> {
        self.identities.get(&connection).map(String::as_str)
    }

    /// Countdown that should currently be driving [`Self::tick`], if any.
    pub fn countdown(&self) -> Option<Countdown> {
        match self.phase {
            Phase::Waiting => None,
            Phase::Running {
                end, generation, ..
            } => Some(Countdown {
                generation,
                ends_at: end,
            }),
        }
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// A new client connected; everyone receives a fresh snapshot.
    pub fn connect(&mut self, connection: u64) -> Vec<OutboundEvent> {
        debug!(connection, "client connected");
        vec![self.state_event()]
    }

    /// Drop the identity binding of a closed connection. Its player, if any,
    /// stays in the round.
    pub fn disconnect(&mut self, connection: u64) {
        let Some(name) = self.identities.remove(&connection) else {
            return;
        };
        match self.players.get(&name) {
            Some(player) if player.connection == connection => {
                info!(
                    connection,
                    name = %name,
                    stake = player.stake,
                    "staked player disconnected"
                );
            }
            _ => debug!(connection, name = %name, "client disconnected"),
        }
    }

    /// Bind a trimmed, non-empty `name` to `connection`.
    pub fn set_identity(
        &mut self,
        connection: u64,
        name: &str,
    ) -> Result<Vec<OutboundEvent>, Rejection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Rejection::EmptyName);
        }
        info!(connection, name, "identity bound");
        self.identities.insert(connection, name.to_string());
        Ok(vec![self.state_event()])
    }

    /// Add `amount` to the stake of the identity bound to `connection`.
    ///
    /// Emits a snapshot, then starts the countdown if quorum was just reached
    /// (emitting a second snapshot with the running round).
    pub fn place_stake(
        &mut self,
        connection: u64,
        amount: &NumericInput,
        now: u64,
    ) -> Result<Vec<OutboundEvent>, Rejection> {
        let name = self
            .identities
            .get(&connection)
            .cloned()
            .ok_or(Rejection::Unbound)?;
        let amount = parse_positive(amount).ok_or(Rejection::InvalidAmount)?;
        let minimum = self.config.config().minimum_stake;
        if amount < minimum {
            return Err(Rejection::BelowMinimum { amount, minimum });
        }

        let stake = self
            .players
            .add_stake(&name, amount, connection)
            .ok_or(Rejection::InvalidAmount)?;
        info!(name = %name, amount, stake, "stake placed");

        let mut events = vec![self.state_event()];
        if self.start_if_quorum(now) {
            events.push(self.state_event());
        }
        Ok(events)
    }

    /// Apply an administrator configuration update and log the change.
    pub fn update_config(
        &mut self,
        connection: u64,
        duration_seconds: Option<&NumericInput>,
        minimum_stake: Option<&NumericInput>,
        now: u64,
    ) -> Result<Vec<OutboundEvent>, Rejection> {
        let requester = self
            .identities
            .get(&connection)
            .cloned()
            .ok_or(Rejection::Unbound)?;
        let change = self
            .config
            .update(&requester, duration_seconds, minimum_stake)?;
        self.history.record_config_change(ConfigChangeRecord {
            at: now,
            admin: requester,
            old_config: change.old,
            new_config: change.new,
        });
        Ok(vec![self.state_event()])
    }

    /// Drive the countdown armed with `generation`.
    ///
    /// Before expiry this only re-broadcasts the snapshot; at or after expiry
    /// it settles the round.
    pub fn tick(&mut self, generation: u64, now: u64) -> Vec<OutboundEvent> {
        let end = match self.phase {
            Phase::Running {
                end,
                generation: current,
                ..
            } if current == generation => end,
            _ => {
                debug!(generation, "ignoring stale countdown tick");
                return Vec::new();
            }
        };
        if now >= end {
            self.settle(now)
        } else {
            vec![self.state_event()]
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let (start_time, end_time) = match self.phase {
            Phase::Waiting => (None, None),
            Phase::Running { start, end, .. } => (Some(start), Some(end)),
        };
        Snapshot {
            config: self.config.config(),
            round: RoundView {
                status: self.status(),
                total_pot: self.players.total_active(),
                active_player_count: self.players.active_count(),
                last_winner: self.last_winner.clone(),
                start_time,
                end_time,
                players: self.players.views(),
            },
        }
    }

    fn state_event(&self) -> OutboundEvent {
        OutboundEvent::StateSnapshot(self.snapshot())
    }

    fn start_if_quorum(&mut self, now: u64) -> bool {
        if self.phase != Phase::Waiting || self.players.active_count() < QUORUM {
            return false;
        }
        let start = now;
        let end = start.saturating_add(self.config.config().duration_seconds);
        self.generation = self.generation.saturating_add(1);
        self.phase = Phase::Running {
            start,
            end,
            generation: self.generation,
        };
        info!(
            start,
            end,
            generation = self.generation,
            players = self.players.active_count(),
            "round started"
        );
        true
    }

    fn settle(&mut self, now: u64) -> Vec<OutboundEvent> {
        let (start_time, end_time) = match self.phase {
            Phase::Waiting => (None, None),
            Phase::Running { start, end, .. } => (Some(start), Some(end)),
        };
        let pot = self.players.total_active();
        let active = self.players.active();
        let winner = select_winner(&active, &mut self.rng).map(|player| Winner {
            name: player.name.clone(),
            pot,
            stake: player.stake,
        });

        self.history.record_round(RoundRecord {
            finished_at: now,
            config: self.config.config(),
            start_time,
            end_time,
            actual_wait_sec: start_time
                .zip(end_time)
                .map(|(start, end)| end.saturating_sub(start)),
            total_gold: pot,
            players: active.iter().map(|player| (*player).into()).collect(),
            winner: winner.clone(),
        });

        match &winner {
            Some(winner) => {
                info!(name = %winner.name, pot, stake = winner.stake, "round settled");
                self.last_winner = Some(winner.name.clone());
            }
            None => info!("round settled without winner"),
        }

        self.players.clear();
        self.phase = Phase::Waiting;

        vec![
            OutboundEvent::WinnerAnnounced { winner },
            self.state_event(),
        ]
    }
}
