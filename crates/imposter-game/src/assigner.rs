//! Imposter selection.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;

/// The most imposters a roster of `participants` may hold.
///
/// Small groups get one, mid-sized groups two, ten or more three.
pub fn imposter_cap(participants: usize) -> usize {
    match participants {
        0..6 => 1,
        6..10 => 2,
        _ => 3,
    }
}

/// Picks which roster positions become imposters.
///
/// Returns `min(requested, imposter_cap(participants), participants)`
/// distinct positions in `0..participants`. Positions are shuffled with
/// Fisher-Yates and the first ones taken, so every subset of that size
/// is equally likely.
///
/// Callers enforce the minimum roster size; below three players the
/// result is well-formed but makes for a poor game.
pub fn assign_imposters<R: Rng + ?Sized>(
    rng: &mut R,
    participants: usize,
    requested: usize,
) -> BTreeSet<usize> {
    let effective = requested
        .min(imposter_cap(participants))
        .min(participants);

    let mut positions: Vec<usize> = (0..participants).collect();
    positions.shuffle(rng);
    positions.into_iter().take(effective).collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_imposter_cap_boundaries() {
        assert_eq!(imposter_cap(3), 1);
        assert_eq!(imposter_cap(5), 1);
        assert_eq!(imposter_cap(6), 2);
        assert_eq!(imposter_cap(9), 2);
        assert_eq!(imposter_cap(10), 3);
        assert_eq!(imposter_cap(40), 3);
    }

    #[test]
    fn test_assign_twelve_players_five_requested_yields_three() {
        let mut rng = StdRng::seed_from_u64(12);
        let picked = assign_imposters(&mut rng, 12, 5);
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|&p| p < 12));
    }

    #[test]
    fn test_assign_requested_below_cap_is_honoured() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(assign_imposters(&mut rng, 12, 1).len(), 1);
        assert_eq!(assign_imposters(&mut rng, 7, 5).len(), 2);
    }

    #[test]
    fn test_assign_never_exceeds_participants() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(assign_imposters(&mut rng, 0, 3).len(), 0);
        assert_eq!(assign_imposters(&mut rng, 1, 3), BTreeSet::from([0]));
    }

    #[test]
    fn test_assign_positions_uniform_over_many_runs() {
        // 10,000 draws of 3 from 12: each position expected 2,500 times.
        let mut rng = StdRng::seed_from_u64(2024);
        let mut hits = [0usize; 12];
        for _ in 0..10_000 {
            for p in assign_imposters(&mut rng, 12, 5) {
                hits[p] += 1;
            }
        }
        assert_eq!(hits.iter().sum::<usize>(), 30_000);
        for (position, &count) in hits.iter().enumerate() {
            assert!(
                (2_250..=2_750).contains(&count),
                "position {position} drawn {count} times"
            );
        }
    }

    #[test]
    fn test_assign_single_imposter_uniform() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut hits = [0usize; 3];
        for _ in 0..9_000 {
            let picked = assign_imposters(&mut rng, 3, 1);
            assert_eq!(picked.len(), 1);
            hits[*picked.iter().next().unwrap()] += 1;
        }
        for &count in &hits {
            assert!((2_700..=3_300).contains(&count));
        }
    }
}
