//! Per-day shift rankings.
//!
//! Each (employee, day) ranking is produced independently; two days of the
//! same employee are never correlated. The source is injectable so runs can
//! be reproduced from a seed or pinned completely in tests.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::types::{Day, ShiftType};

/// Produces a ranking (best first) over `shifts` for one employee and day.
pub trait PreferenceSource {
    fn rank(&mut self, employee: &str, day: Day, shifts: &[ShiftType]) -> Vec<ShiftType>;
}

/// Uniformly random permutation per (employee, day).
#[derive(Debug, Clone)]
pub struct RandomPreferences<R = StdRng> {
    rng: R,
}

impl RandomPreferences<StdRng> {
    /// Reproducible rankings: the same seed and roster give the same week.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomPreferences<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> PreferenceSource for RandomPreferences<R> {
    fn rank(&mut self, _employee: &str, _day: Day, shifts: &[ShiftType]) -> Vec<ShiftType> {
        let mut ranking = shifts.to_vec();
        ranking.shuffle(&mut self.rng);
        ranking
    }
}

/// Everyone prefers shifts in taxonomy order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxonomyOrder;

impl PreferenceSource for TaxonomyOrder {
    fn rank(&mut self, _employee: &str, _day: Day, shifts: &[ShiftType]) -> Vec<ShiftType> {
        shifts.to_vec()
    }
}

/// Explicit rankings for some (employee, day) pairs, delegating the rest.
#[derive(Debug, Clone, Default)]
pub struct FixedPreferences<F = TaxonomyOrder> {
    rankings: HashMap<(String, Day), Vec<ShiftType>>,
    fallback: F,
}

impl FixedPreferences<TaxonomyOrder> {
    pub fn new() -> Self {
        Self::with_fallback(TaxonomyOrder)
    }
}

impl<F: PreferenceSource> FixedPreferences<F> {
    pub fn with_fallback(fallback: F) -> Self {
        Self {
            rankings: HashMap::new(),
            fallback,
        }
    }

    pub fn set(&mut self, employee: &str, day: Day, ranking: Vec<ShiftType>) {
        self.rankings.insert((employee.to_string(), day), ranking);
    }

    /// Builder form of [`FixedPreferences::set`].
    pub fn with(mut self, employee: &str, day: Day, ranking: &[ShiftType]) -> Self {
        self.set(employee, day, ranking.to_vec());
        self
    }

    /// Same ranking for every day in `days`.
    pub fn with_every_day(mut self, employee: &str, days: &[Day], ranking: &[ShiftType]) -> Self {
        for &day in days {
            self.set(employee, day, ranking.to_vec());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rankings.is_empty()
    }
}

impl<F: PreferenceSource> PreferenceSource for FixedPreferences<F> {
    fn rank(&mut self, employee: &str, day: Day, shifts: &[ShiftType]) -> Vec<ShiftType> {
        match self.rankings.get(&(employee.to_string(), day)) {
            Some(ranking) => ranking.clone(),
            None => self.fallback.rank(employee, day, shifts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(ranking: &[ShiftType]) -> bool {
        let mut sorted = ranking.to_vec();
        sorted.sort();
        sorted == ShiftType::ALL.to_vec()
    }

    #[test]
    fn random_rankings_are_permutations() {
        let mut source = RandomPreferences::seeded(1);
        for day in Day::ALL {
            let ranking = source.rank("Alice", day, &ShiftType::ALL);
            assert!(is_permutation(&ranking), "{:?}", ranking);
        }
    }

    #[test]
    fn same_seed_same_rankings() {
        let mut a = RandomPreferences::seeded(42);
        let mut b = RandomPreferences::seeded(42);
        for day in Day::ALL {
            assert_eq!(
                a.rank("Bob", day, &ShiftType::ALL),
                b.rank("Bob", day, &ShiftType::ALL)
            );
        }
    }

    #[test]
    fn days_are_ranked_independently() {
        // With 6 possible permutations, 70 draws all identical would mean
        // the days are not independent.
        let mut source = RandomPreferences::seeded(3);
        let first = source.rank("Carol", Day::Monday, &ShiftType::ALL);
        let varied = (0..70).any(|_| source.rank("Carol", Day::Tuesday, &ShiftType::ALL) != first);
        assert!(varied);
    }

    #[test]
    fn random_rankings_cover_configured_shifts_only() {
        let mut source = RandomPreferences::seeded(5);
        let shifts = [ShiftType::Evening, ShiftType::Morning];
        let mut ranking = source.rank("Dan", Day::Friday, &shifts);
        ranking.sort();
        assert_eq!(ranking, vec![ShiftType::Morning, ShiftType::Evening]);
    }

    #[test]
    fn fixed_overrides_then_falls_back() {
        let mut source = FixedPreferences::new().with(
            "Eve",
            Day::Monday,
            &[ShiftType::Evening, ShiftType::Morning, ShiftType::Afternoon],
        );
        assert_eq!(
            source.rank("Eve", Day::Monday, &ShiftType::ALL),
            vec![ShiftType::Evening, ShiftType::Morning, ShiftType::Afternoon]
        );
        assert_eq!(source.rank("Eve", Day::Tuesday, &ShiftType::ALL), ShiftType::ALL.to_vec());
        assert_eq!(source.rank("Frank", Day::Monday, &ShiftType::ALL), ShiftType::ALL.to_vec());
    }
}
