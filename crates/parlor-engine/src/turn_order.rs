//! First-speaker weighted sampling and the remaining turn-order shuffle.

use parlor_protocol::{GameMode, SessionId};

use crate::config::IMPOSTER_FIRST_SPEAKER_WEIGHT;

/// Builds the speaking order for a round: the imposter is weighted
/// `IMPOSTER_FIRST_SPEAKER_WEIGHT` to go first (citizens weight `1.0`
/// each); the remaining players follow in an unbiased shuffle.
///
/// `rand` is called once per weighted draw plus once per shuffle swap;
/// `game_mode` does not currently change the weighting (both modes use
/// the same weight today) but is threaded through so a future mode can.
pub fn select_turn_order(
    players: &[SessionId],
    imposter_id: &SessionId,
    _game_mode: GameMode,
    mut rand: impl FnMut() -> f64,
) -> Vec<SessionId> {
    if players.is_empty() {
        return Vec::new();
    }

    let weights: Vec<f64> = players
        .iter()
        .map(|p| if p == imposter_id { IMPOSTER_FIRST_SPEAKER_WEIGHT } else { 1.0 })
        .collect();
    let total_weight: f64 = weights.iter().sum();

    let mut r = rand() * total_weight;
    let mut first_index = players.len() - 1;
    for (i, w) in weights.iter().enumerate() {
        r -= w;
        if r <= 0.0 {
            first_index = i;
            break;
        }
    }

    let mut remaining: Vec<SessionId> = players
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != first_index)
        .map(|(_, p)| p.clone())
        .collect();

    // Fisher-Yates: for i from last down to 1, swap with a uniformly
    // random j in [0, i].
    for i in (1..remaining.len()).rev() {
        let j = (rand() * (i as f64 + 1.0)) as usize;
        let j = j.min(i);
        remaining.swap(i, j);
    }

    let mut order = Vec::with_capacity(players.len());
    order.push(players[first_index].clone());
    order.extend(remaining);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> SessionId {
        SessionId(s.into())
    }

    #[test]
    fn test_select_turn_order_keeps_all_players_exactly_once() {
        let players = vec![sid("p1"), sid("p2"), sid("p3"), sid("p4")];
        let order = select_turn_order(&players, &sid("p2"), GameMode::Classic, || 0.3);
        let mut sorted_order = order.clone();
        sorted_order.sort_by(|a, b| a.0.cmp(&b.0));
        let mut sorted_players = players.clone();
        sorted_players.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(sorted_order, sorted_players);
    }

    #[test]
    fn test_select_turn_order_rand_zero_picks_first_weighted_candidate() {
        // r = 0 * totalWeight = 0, first iteration subtracts p1's weight
        // and immediately satisfies r <= 0.
        let players = vec![sid("p1"), sid("p2"), sid("p3")];
        let order = select_turn_order(&players, &sid("p2"), GameMode::Classic, || 0.0);
        assert_eq!(order[0], sid("p1"));
    }

    #[test]
    fn test_select_turn_order_high_rand_can_pick_imposter_first() {
        // Weights [1.0, 0.5, 1.0], total 2.5. r = 0.99 * 2.5 = 2.475:
        // subtract p1 (1.0) -> 1.475, subtract imposter p2 (0.5) -> 0.975,
        // subtract p3 (1.0) -> -0.025 <= 0 => p3 picked, not the imposter.
        // Use r landing exactly in the imposter's weighted band instead.
        let players = vec![sid("p1"), sid("p2"), sid("p3")];
        // total weight = 2.5; band for p2 (imposter) is (1.0, 1.5].
        // r = 1.2 => rand() = 1.2 / 2.5 = 0.48
        let order = select_turn_order(&players, &sid("p2"), GameMode::Classic, || 0.48);
        assert_eq!(order[0], sid("p2"));
    }

    #[test]
    fn test_select_turn_order_single_player() {
        let players = vec![sid("p1")];
        let order = select_turn_order(&players, &sid("p1"), GameMode::Classic, || 0.5);
        assert_eq!(order, vec![sid("p1")]);
    }
}
