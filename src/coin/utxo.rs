//! Unspent output selection.
//!
//! Greedy best-fit: each round picks the single remaining output closest to
//! the amount still needed, until the target is covered. Local, not
//! exhaustive; an exact match always beats combining smaller outputs.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::core::types::{sum_unspents, UnspentOutput};

/// Order candidates by closeness to `remaining`.
///
/// Smaller absolute distance first; at equal distance the output that does
/// not exceed `remaining` comes first. Candidates with equal amounts compare
/// equal, so the earlier one in the pool wins.
pub fn best_fit_order(remaining: Decimal, a: &UnspentOutput, b: &UnspentOutput) -> Ordering {
    let da = a.amount - remaining;
    let db = b.amount - remaining;
    da.abs().cmp(&db.abs()).then(da.cmp(&db))
}

/// Select outputs whose sum covers `target`.
///
/// Returns `None` when the whole pool falls short, or when the pool runs out
/// before the target is reached. Never returns a partial selection.
pub fn select_unspents(unspents: &[UnspentOutput], target: Decimal) -> Option<Vec<UnspentOutput>> {
    if sum_unspents(unspents) < target {
        return None;
    }

    let mut pool: Vec<&UnspentOutput> = unspents.iter().collect();
    let mut selected: Vec<UnspentOutput> = Vec::new();
    let mut selected_sum = Decimal::ZERO;

    while !pool.is_empty() {
        let remaining = target - selected_sum;
        let (index, _) = pool
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| best_fit_order(remaining, a, b))?;

        let chosen = pool.remove(index);
        selected_sum += chosen.amount;
        selected.push(chosen.clone());

        if selected_sum >= target {
            return Some(selected);
        }
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn pool(amounts: &[Decimal]) -> Vec<UnspentOutput> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| UnspentOutput::new(format!("{:064x}", i), i as u32, *amount))
            .collect()
    }

    fn amounts(selection: &[UnspentOutput]) -> Vec<Decimal> {
        selection.iter().map(|u| u.amount).collect()
    }

    #[test]
    fn test_exact_match_preferred_over_combination() {
        let unspents = pool(&[dec!(0.4), dec!(0.2), dec!(0.6)]);
        let selected = select_unspents(&unspents, dec!(0.6)).unwrap();
        assert_eq!(amounts(&selected), vec![dec!(0.6)]);
    }

    #[test]
    fn test_uses_all_outputs_when_needed() {
        let unspents = pool(&[dec!(0.4), dec!(0.2), dec!(0.6)]);
        let selected = select_unspents(&unspents, dec!(1.2)).unwrap();
        assert_eq!(amounts(&selected), vec![dec!(0.6), dec!(0.4), dec!(0.2)]);
    }

    #[test]
    fn test_insufficient_funds() {
        let unspents = pool(&[dec!(0.4), dec!(0.2), dec!(0.6)]);
        assert!(select_unspents(&unspents, dec!(1.21)).is_none());
        assert!(select_unspents(&[], dec!(0.00000001)).is_none());
    }

    #[test]
    fn test_fee_inclusive_target() {
        let unspents = pool(&[dec!(2), dec!(3)]);
        let selected = select_unspents(&unspents, dec!(3.02)).unwrap();
        assert_eq!(amounts(&selected), vec![dec!(3), dec!(2)]);
        assert_eq!(sum_unspents(&selected) - dec!(3.02), dec!(1.98));
    }

    #[test]
    fn test_tie_prefers_undershoot() {
        let a = UnspentOutput::new("aa", 0, dec!(0.7));
        let b = UnspentOutput::new("bb", 0, dec!(0.3));
        assert_eq!(best_fit_order(dec!(0.5), &b, &a), Ordering::Less);
        assert_eq!(best_fit_order(dec!(0.5), &a, &b), Ordering::Greater);

        // Equal distance either side of 0.5; the smaller output goes first.
        let unspents = pool(&[dec!(0.7), dec!(0.3)]);
        let selected = select_unspents(&unspents, dec!(0.5)).unwrap();
        assert_eq!(amounts(&selected), vec![dec!(0.3), dec!(0.7)]);
    }

    #[test]
    fn test_closer_overshoot_beats_farther_undershoot() {
        let a = UnspentOutput::new("aa", 0, dec!(0.51));
        let b = UnspentOutput::new("bb", 0, dec!(0.4));
        assert_eq!(best_fit_order(dec!(0.5), &a, &b), Ordering::Less);
    }

    #[test]
    fn test_equal_amounts_keep_pool_order() {
        let unspents = pool(&[dec!(1), dec!(1), dec!(1)]);
        let selected = select_unspents(&unspents, dec!(1)).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].vout, 0);
    }

    #[test]
    fn test_deterministic() {
        let unspents = pool(&[dec!(0.13), dec!(0.5), dec!(0.07), dec!(0.29), dec!(1.1)]);
        let first = select_unspents(&unspents, dec!(0.8)).unwrap();
        let second = select_unspents(&unspents, dec!(0.8)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let unspents = pool(&[dec!(0.4), dec!(0.2), dec!(0.6)]);
        let before = unspents.clone();
        let _ = select_unspents(&unspents, dec!(1.0));
        assert_eq!(unspents, before);
    }

    proptest! {
        #[test]
        fn prop_selection_covers_target_or_fails(
            minor_units in prop::collection::vec(1u64..500_000_000, 0..12),
            target_units in 1u64..3_000_000_000,
        ) {
            let amounts: Vec<Decimal> = minor_units.iter().map(|n| Decimal::new(*n as i64, 8)).collect();
            let unspents = pool(&amounts);
            let target = Decimal::new(target_units as i64, 8);

            match select_unspents(&unspents, target) {
                None => prop_assert!(sum_unspents(&unspents) < target),
                Some(selected) => {
                    prop_assert!(sum_unspents(&selected) >= target);

                    let available: HashSet<_> = unspents.iter().map(|u| u.outpoint()).collect();
                    let chosen: HashSet<_> = selected.iter().map(|u| u.outpoint()).collect();
                    prop_assert_eq!(chosen.len(), selected.len());
                    prop_assert!(chosen.is_subset(&available));
                }
            }
        }

        #[test]
        fn prop_exact_match_is_picked_alone(
            minor_units in prop::collection::vec(1u64..500_000_000, 1..12),
            pick in any::<prop::sample::Index>(),
        ) {
            let amounts: Vec<Decimal> = minor_units.iter().map(|n| Decimal::new(*n as i64, 8)).collect();
            let unspents = pool(&amounts);
            let target = amounts[pick.index(amounts.len())];

            let selected = select_unspents(&unspents, target).unwrap();
            prop_assert_eq!(selected.len(), 1);
            prop_assert_eq!(selected[0].amount, target);
        }
    }
}
