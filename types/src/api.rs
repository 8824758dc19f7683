//! JSON messages exchanged with websocket clients.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::round::{Snapshot, Winner};

/// A number that clients may send either as a JSON number or as a string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl From<u64> for NumericInput {
    fn from(value: u64) -> Self {
        NumericInput::Number(value as f64)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    SetIdentity {
        #[serde(default, deserialize_with = "lenient_name")]
        name: String,
    },
    PlaceStake {
        amount: NumericInput,
    },
    #[serde(rename_all = "camelCase")]
    UpdateConfig {
        #[serde(default)]
        duration_seconds: Option<NumericInput>,
        #[serde(default)]
        minimum_stake: Option<NumericInput>,
    },
}

/// Accept any JSON value as a name. Scalars are stringified, while null,
/// `false`, zero and containers become empty and are later refused.
fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(name) => name,
        Value::Number(number) if number.as_f64() != Some(0.0) => number.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => String::new(),
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundEvent {
    StateSnapshot(Snapshot),
    /// `winner` is null when nobody had stake at settlement.
    WinnerAnnounced { winner: Option<Winner> },
}
