//! Stake-weighted winner selection.
//!
//! Stakes are laid out as consecutive integer intervals over `[1, total]` and
//! a single uniform draw picks the interval it lands in, so each player wins
//! with probability `stake / total` exactly.

use goldpot_types::Player;
use rand::Rng;

/// Draw a winner from `active` (players with positive stake, in order).
///
/// The stakes must sum to at most `u64::MAX`, which `PlayerRegistry` enforces.
pub fn select_winner<'a, R: Rng + ?Sized>(active: &[&'a Player], rng: &mut R) -> Option<&'a Player> {
    if active.is_empty() {
        return None;
    }
    let total = active
        .iter()
        .fold(0u64, |total, p| total.saturating_add(p.stake));
    if total == 0 {
        return active.last().copied();
    }
    let draw = rng.gen_range(1..=total);
    locate(active, draw)
}

/// Return the first player whose cumulative stake reaches `draw`.
///
/// Falls back to the last player if the walk never reaches `draw`.
pub fn locate<'a>(active: &[&'a Player], draw: u64) -> Option<&'a Player> {
    let mut running = 0u64;
    for player in active {
        running = running.saturating_add(player.stake);
        if draw <= running {
            return Some(*player);
        }
    }
    active.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn player(name: &str, stake: u64) -> Player {
        Player {
            name: name.to_string(),
            stake,
            connection: 0,
        }
    }

    #[test]
    fn test_empty_has_no_winner() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            assert!(select_winner(&[], &mut rng).is_none());
        }
    }

    #[test]
    fn test_single_player_always_wins() {
        let alice = player("alice", 5);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            assert_eq!(select_winner(&[&alice], &mut rng).unwrap().name, "alice");
        }
    }

    #[test]
    fn test_interval_boundaries() {
        let a = player("a", 3);
        let b = player("b", 7);
        let active = [&a, &b];
        assert_eq!(locate(&active, 1).unwrap().name, "a");
        assert_eq!(locate(&active, 3).unwrap().name, "a");
        assert_eq!(locate(&active, 4).unwrap().name, "b");
        assert_eq!(locate(&active, 10).unwrap().name, "b");
    }

    #[test]
    fn test_out_of_range_draw_falls_back_to_last() {
        let a = player("a", 3);
        let b = player("b", 7);
        assert_eq!(locate(&[&a, &b], 11).unwrap().name, "b");
        assert!(locate(&[], 1).is_none());
    }

    #[test]
    fn test_win_rate_is_proportional() {
        let a = player("a", 3);
        let b = player("b", 7);
        let active = [&a, &b];
        let mut rng = StdRng::seed_from_u64(42);

        let trials = 10_000;
        let wins = (0..trials)
            .filter(|_| select_winner(&active, &mut rng).unwrap().name == "a")
            .count();
        let rate = wins as f64 / trials as f64;
        // Expected 0.30 with a standard deviation of roughly 0.0046.
        assert!((0.27..=0.33).contains(&rate), "win rate {rate}");
    }

    #[test]
    fn test_every_interval_is_reachable() {
        let a = player("a", 1);
        let b = player("b", 1);
        let c = player("c", 1);
        let active = [&a, &b, &c];
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let winner = select_winner(&active, &mut rng).unwrap();
            let index = active.iter().position(|p| p.name == winner.name).unwrap();
            seen[index] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }
}
