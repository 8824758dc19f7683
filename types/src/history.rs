//! Append-only records written to the history logs, one JSON object per line.

use serde::{Deserialize, Serialize};

use crate::round::{Config, PlayerView, Winner};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HistoryRecord {
    Round(RoundRecord),
    AdminConfigChange(ConfigChangeRecord),
}

/// A settled round, captured before the round state is cleared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub finished_at: u64,
    /// Configuration in effect when the round settled.
    pub config: Config,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub actual_wait_sec: Option<u64>,
    pub total_gold: u64,
    /// Active players only.
    pub players: Vec<PlayerView>,
    pub winner: Option<Winner>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigChangeRecord {
    pub at: u64,
    pub admin: String,
    pub old_config: Config,
    pub new_config: Config,
}

impl HistoryRecord {
    /// Serialize as a single newline-terminated line.
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_record_line() {
        let record = HistoryRecord::Round(RoundRecord {
            finished_at: 1_060,
            config: Config::default(),
            start_time: Some(1_000),
            end_time: Some(1_060),
            actual_wait_sec: Some(60),
            total_gold: 40,
            players: vec![
                PlayerView {
                    name: "alice".to_string(),
                    stake: 10,
                },
                PlayerView {
                    name: "bob".to_string(),
                    stake: 30,
                },
            ],
            winner: Some(Winner {
                name: "bob".to_string(),
                pot: 40,
                stake: 30,
            }),
        });
        let line = record.to_line().unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);

        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["type"], "round");
        assert_eq!(value["totalGold"], 40);
        assert_eq!(value["actualWaitSec"], 60);
        assert_eq!(value["players"].as_array().unwrap().len(), 2);
        assert_eq!(value["winner"]["name"], "bob");
        assert_eq!(value["config"]["durationSeconds"], 60);
    }

    #[test]
    fn test_config_change_record_line() {
        let record = HistoryRecord::AdminConfigChange(ConfigChangeRecord {
            at: 5,
            admin: "Admin".to_string(),
            old_config: Config::default(),
            new_config: Config {
                duration_seconds: 30,
                minimum_stake: 5,
            },
        });
        let line = record.to_line().unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["type"], "adminConfigChange");
        assert_eq!(value["admin"], "Admin");
        assert_eq!(value["oldConfig"]["minimumStake"], 1);
        assert_eq!(value["newConfig"]["durationSeconds"], 30);

        let parsed: HistoryRecord = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_round_without_winner() {
        let record = HistoryRecord::Round(RoundRecord {
            finished_at: 10,
            config: Config::default(),
            start_time: None,
            end_time: None,
            actual_wait_sec: None,
            total_gold: 0,
            players: Vec::new(),
            winner: None,
        });
        let value: serde_json::Value =
            serde_json::from_str(record.to_line().unwrap().trim_end()).unwrap();
        assert!(value["winner"].is_null());
        assert!(value["actualWaitSec"].is_null());
    }
}
