use goldpot_types::{Config, NumericInput, MIN_ROUND_DURATION_SECS, MIN_STAKE_FLOOR};
use tracing::info;

use crate::{parse::parse_integer, Rejection};

/// Before/after pair produced by every authorized update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigChange {
    pub old: Config,
    pub new: Config,
}

/// Holds the table tunables and applies administrator updates.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    config: Config,
    admin_name: String,
}

impl ConfigStore {
    pub fn new(config: Config, admin_name: impl Into<String>) -> Self {
        Self {
            config,
            admin_name: admin_name.into(),
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn is_admin(&self, identity: &str) -> bool {
        identity.to_lowercase() == self.admin_name.to_lowercase()
    }

    /// Apply an update requested by `requester`.
    ///
    /// Each field is validated on its own: an invalid field is dropped while a
    /// valid sibling still applies. An authorized call always yields a change,
    /// even when neither field was accepted.
    pub fn update(
        &mut self,
        requester: &str,
        duration_seconds: Option<&NumericInput>,
        minimum_stake: Option<&NumericInput>,
    ) -> Result<ConfigChange, Rejection> {
        if !self.is_admin(requester) {
            return Err(Rejection::Unauthorized(requester.to_string()));
        }
        let old = self.config;

        if let Some(duration) = duration_seconds
            .and_then(parse_integer)
            .filter(|value| *value >= MIN_ROUND_DURATION_SECS as i64)
        {
            self.config.duration_seconds = duration as u64;
        }
        if let Some(minimum) = minimum_stake
            .and_then(parse_integer)
            .filter(|value| *value >= MIN_STAKE_FLOOR as i64)
        {
            self.config.minimum_stake = minimum as u64;
        }

        info!(
            admin = requester,
            duration_seconds = self.config.duration_seconds,
            minimum_stake = self.config.minimum_stake,
            "configuration updated"
        );
        Ok(ConfigChange {
            old,
            new: self.config,
        })
    }
}
