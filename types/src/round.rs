use serde::{Deserialize, Serialize};

/// Shortest round duration (seconds) the administrator may configure.
pub const MIN_ROUND_DURATION_SECS: u64 = 5;

/// Lowest value the minimum stake may be set to.
pub const MIN_STAKE_FLOOR: u64 = 1;

/// Number of active players required to start the countdown.
pub const QUORUM: usize = 2;

const DEFAULT_ROUND_DURATION_SECS: u64 = 60;

/// Tunables of the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Length of the countdown once quorum is reached.
    pub duration_seconds: u64,
    /// Smallest accepted single stake.
    pub minimum_stake: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration_seconds: DEFAULT_ROUND_DURATION_SECS,
            minimum_stake: MIN_STAKE_FLOOR,
        }
    }
}

impl Config {
    /// Validate the configuration against the floors an administrator is held to.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.duration_seconds < MIN_ROUND_DURATION_SECS {
            return Err("duration_seconds must be at least 5");
        }
        if self.minimum_stake < MIN_STAKE_FLOOR {
            return Err("minimum_stake must be at least 1");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Waiting,
    Running,
}

/// A participant of the in-progress round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub stake: u64,
    /// Connection that placed the first stake under this name.
    pub connection: u64,
}

impl Player {
    /// Only players with a positive stake count for quorum, pot and selection.
    pub fn is_active(&self) -> bool {
        self.stake > 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub name: String,
    pub stake: u64,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            stake: player.stake,
        }
    }
}

/// Outcome of a settled round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub name: String,
    /// Total pot of the round.
    pub pot: u64,
    /// The winner's own stake.
    pub stake: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub status: RoundStatus,
    pub total_pot: u64,
    pub active_player_count: usize,
    pub last_winner: Option<String>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    /// Every player of the round, including those without stake.
    pub players: Vec<PlayerView>,
}

/// Externally visible view of config and round state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub config: Config,
    pub round: RoundView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());

        let short = Config {
            duration_seconds: 4,
            ..Config::default()
        };
        assert!(short.validate().is_err());

        let free = Config {
            minimum_stake: 0,
            ..Config::default()
        };
        assert!(free.validate().is_err());
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let snapshot = Snapshot {
            config: Config::default(),
            round: RoundView {
                status: RoundStatus::Waiting,
                total_pot: 0,
                active_player_count: 0,
                last_winner: None,
                start_time: None,
                end_time: None,
                players: vec![PlayerView {
                    name: "alice".to_string(),
                    stake: 0,
                }],
            },
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            json!({
                "config": { "durationSeconds": 60, "minimumStake": 1 },
                "round": {
                    "status": "waiting",
                    "totalPot": 0,
                    "activePlayerCount": 0,
                    "lastWinner": null,
                    "startTime": null,
                    "endTime": null,
                    "players": [{ "name": "alice", "stake": 0 }]
                }
            })
        );
    }

    #[test]
    fn test_player_activity() {
        let mut player = Player {
            name: "bob".to_string(),
            stake: 0,
            connection: 7,
        };
        assert!(!player.is_active());
        player.stake = 1;
        assert!(player.is_active());
    }
}
