//! Genome manipulation utilities for evolutionary search.
//!
//! A genome is a [`Rule`]. Provides random generation, crossover, and
//! mutation operations; every operator returns a valid rule with non-empty
//! births and survivals.

use rand::prelude::*;

use crate::schema::{MAX_NEIGHBORS, NeighborSet, Rule, RulePart};

/// Every neighbor count a rule can mention.
const DIGITS: [u8; MAX_NEIGHBORS as usize + 1] = [0, 1, 2, 3, 4, 5, 6, 7, 8];

/// Random number generator wrapper for genome operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Underlying generator, for selection draws.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Generate a random rule. Each set gets 1 to 9 distinct digits.
    pub fn random_rule(&mut self) -> Rule {
        let births = self.random_set();
        let survivals = self.random_set();
        Rule::new(births, survivals).unwrap_or_else(|_| Rule::game_of_life())
    }

    fn random_set(&mut self) -> NeighborSet {
        let size = self.rng.gen_range(1..=DIGITS.len());
        DIGITS.choose_multiple(&mut self.rng, size).copied().collect()
    }

    /// Single-point crossover of two parents, split at the midpoint of each
    /// digit list independently for births and survivals.
    ///
    /// Child 1 takes the first halves of `parent1` and the second halves of
    /// `parent2`; child 2 is the mirror combination. Duplicates introduced by
    /// the concatenation collapse when the digits are collected into sets.
    pub fn crossover(&mut self, parent1: &Rule, parent2: &Rule) -> (Rule, Rule) {
        (splice(parent1, parent2), splice(parent2, parent1))
    }

    /// Mutate a rule with probability `rate`.
    ///
    /// A mutation picks births or survivals uniformly, then replaces one digit
    /// with a digit not already in that set. Set sizes are preserved, so the
    /// result is never degenerate. A non-finite `rate` counts as 0.
    pub fn mutate(&mut self, rule: &Rule, rate: f64) -> Rule {
        if !rate.is_finite() || !self.rng.gen_bool(rate.clamp(0.0, 1.0)) {
            return *rule;
        }

        let mut part = if self.rng.gen_bool(0.5) {
            RulePart::Births
        } else {
            RulePart::Survivals
        };
        // A full set has no novel digit to swap in
        if rule.part(part).is_full() {
            part = match part {
                RulePart::Births => RulePart::Survivals,
                RulePart::Survivals => RulePart::Births,
            };
            if rule.part(part).is_full() {
                return *rule;
            }
        }

        let set = rule.part(part);
        let mut digits = set.digits();
        let novel: Vec<u8> = DIGITS
            .iter()
            .copied()
            .filter(|&d| !set.contains(d as usize))
            .collect();

        let position = self.rng.gen_range(0..digits.len());
        let Some(&replacement) = novel.choose(&mut self.rng) else {
            return *rule;
        };
        digits[position] = replacement;

        let mutated: NeighborSet = digits.into_iter().collect();
        let result = match part {
            RulePart::Births => Rule::new(mutated, rule.survivals()),
            RulePart::Survivals => Rule::new(rule.births(), mutated),
        };
        result.unwrap_or(*rule)
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }
}

/// First half of `head`'s digits followed by the second half of `tail`'s.
fn splice_set(head: NeighborSet, tail: NeighborSet) -> NeighborSet {
    let head = head.digits();
    let tail = tail.digits();
    head[..head.len() / 2]
        .iter()
        .chain(&tail[tail.len() / 2..])
        .copied()
        .collect()
}

fn splice(head: &Rule, tail: &Rule) -> Rule {
    let births = splice_set(head.births(), tail.births());
    let survivals = splice_set(head.survivals(), tail.survivals());
    // The second half of a non-empty list is never empty
    Rule::new(births, survivals).unwrap_or(*tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_random_rule() {
        let mut rng = GenomeRng::new(42);
        for _ in 0..200 {
            let rule = rng.random_rule();
            assert!(!rule.births().is_empty());
            assert!(!rule.survivals().is_empty());
            assert!(crate::schema::is_canonical(&rule.to_string()));
        }
    }

    #[test]
    fn test_random_rule_covers_full_sets() {
        let mut rng = GenomeRng::new(7);
        let saw_full = (0..2000).any(|_| {
            let rule = rng.random_rule();
            rule.births().is_full() || rule.survivals().is_full()
        });
        assert!(saw_full);
    }

    #[test]
    fn test_crossover_midpoints() {
        let mut rng = GenomeRng::new(0);
        let p1 = Rule::parse("B1234/S01").unwrap();
        let p2 = Rule::parse("B5678/S2345").unwrap();

        let (c1, c2) = rng.crossover(&p1, &p2);
        assert_eq!(c1.to_string(), "B1278/S045");
        assert_eq!(c2.to_string(), "B3456/S123");
    }

    #[test]
    fn test_crossover_collapses_duplicates() {
        let mut rng = GenomeRng::new(0);
        let p1 = Rule::parse("B36/S23").unwrap();
        let p2 = Rule::parse("B3/S23").unwrap();

        // "3" + "3" and "2" + "3"
        let (c1, c2) = rng.crossover(&p1, &p2);
        assert_eq!(c1.to_string(), "B3/S23");
        // "" + "6" and "2" + "3"
        assert_eq!(c2.to_string(), "B6/S23");
    }

    #[test]
    fn test_crossover_single_digit_parents() {
        let mut rng = GenomeRng::new(0);
        let p1 = Rule::parse("B1/S8").unwrap();
        let p2 = Rule::parse("B2/S7").unwrap();

        let (c1, c2) = rng.crossover(&p1, &p2);
        assert_eq!(c1, p2);
        assert_eq!(c2, p1);
    }

    #[test]
    fn test_mutation_rate_zero_is_identity() {
        let mut rng = GenomeRng::new(1);
        let rule = Rule::parse("B36/S125").unwrap();
        for _ in 0..100 {
            assert_eq!(rng.mutate(&rule, 0.0), rule);
        }
    }

    #[test]
    fn test_mutation_non_finite_rate_is_identity() {
        let mut rng = GenomeRng::new(1);
        let rule = Rule::game_of_life();
        for rate in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(rng.mutate(&rule, rate), rule);
        }
    }

    #[test]
    fn test_mutation_changes_exactly_one_digit() {
        let mut rng = GenomeRng::new(3);
        let rule = Rule::game_of_life();
        for _ in 0..100 {
            let mutated = rng.mutate(&rule, 1.0);
            assert_ne!(mutated, rule);
            assert_eq!(mutated.births().len(), rule.births().len());
            assert_eq!(mutated.survivals().len(), rule.survivals().len());

            let births_changed = mutated.births() != rule.births();
            let survivals_changed = mutated.survivals() != rule.survivals();
            assert!(births_changed ^ survivals_changed);
        }
    }

    #[test]
    fn test_mutation_of_full_set_switches_part() {
        let mut rng = GenomeRng::new(5);
        let rule = Rule::parse("B012345678/S2").unwrap();
        for _ in 0..50 {
            let mutated = rng.mutate(&rule, 1.0);
            assert!(mutated.births().is_full());
            assert_ne!(mutated.survivals(), rule.survivals());
        }
    }

    #[test]
    fn test_mutation_of_saturated_rule_is_noop() {
        let mut rng = GenomeRng::new(5);
        let rule = Rule::parse("B012345678/S012345678").unwrap();
        assert_eq!(rng.mutate(&rule, 1.0), rule);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = GenomeRng::new(99);
        let mut b = GenomeRng::new(99);
        for _ in 0..20 {
            assert_eq!(a.random_rule(), b.random_rule());
            assert_eq!(a.next_seed(), b.next_seed());
        }
    }

    proptest! {
        #[test]
        fn prop_mutation_stays_valid(seed in any::<u64>(), rate in 0.0f64..=1.0) {
            let mut rng = GenomeRng::new(seed);
            let rule = rng.random_rule();
            let mutated = rng.mutate(&rule, rate);
            prop_assert!(!mutated.births().is_empty());
            prop_assert!(!mutated.survivals().is_empty());
            prop_assert!(crate::schema::is_canonical(&mutated.to_string()));
        }

        #[test]
        fn prop_crossover_children_are_valid(seed in any::<u64>()) {
            let mut rng = GenomeRng::new(seed);
            let p1 = rng.random_rule();
            let p2 = rng.random_rule();
            let (c1, c2) = rng.crossover(&p1, &p2);
            for child in [c1, c2] {
                prop_assert!(!child.births().is_empty());
                prop_assert!(!child.survivals().is_empty());
                prop_assert!(crate::schema::is_canonical(&child.to_string()));
            }
        }
    }
}
