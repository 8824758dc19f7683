use goldpot_types::{Player, PlayerView};

/// Players of the in-progress round, in the order they first staked.
#[derive(Clone, Debug, Default)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the stake of `name`, creating the player on first stake.
    ///
    /// Returns the player's accumulated stake, or `None` without touching the
    /// registry if the pot would no longer fit in a `u64`.
    pub fn add_stake(&mut self, name: &str, amount: u64, connection: u64) -> Option<u64> {
        self.total_active().checked_add(amount)?;
        let index = match self.players.iter().position(|p| p.name == name) {
            Some(index) => index,
            None => {
                self.players.push(Player {
                    name: name.to_string(),
                    stake: 0,
                    connection,
                });
                self.players.len() - 1
            }
        };
        let player = &mut self.players[index];
        player.stake += amount;
        Some(player.stake)
    }

    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Players with a positive stake, in insertion order.
    pub fn active(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.is_active()).collect()
    }

    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_active()).count()
    }

    /// Sum of active stakes. Recomputed on every call.
    pub fn total_active(&self) -> u64 {
        self.players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.stake)
            .sum()
    }

    /// Every player, including those without stake.
    pub fn views(&self) -> Vec<PlayerView> {
        self.players.iter().map(PlayerView::from).collect()
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
