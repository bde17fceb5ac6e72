//! Level table and XP → level/progress resolution.
//!
//! A [`LevelTable`] is an ascending list of XP thresholds where index `i`
//! holds the minimum total XP for level `i + 1`. The first threshold is
//! always 0, so level 1 is the floor.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// D&D 5th edition character advancement thresholds (levels 1-20).
pub const DND_5E_THRESHOLDS: [i64; 20] = [
    0, 300, 900, 2_700, 6_500, 14_000, 23_000, 34_000, 48_000, 64_000, 85_000, 100_000, 120_000,
    140_000, 165_000, 195_000, 225_000, 265_000, 305_000, 355_000,
];

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// Resolved position of a total XP value in the level table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelProgress {
    pub level: i32,
    /// XP required for the current level.
    pub current_threshold: i64,
    /// XP required for the next level; `None` at the table's maximum.
    pub next_threshold: Option<i64>,
    /// Fraction of the way from `current_threshold` to `next_threshold`,
    /// in `[0.0, 1.0)`. Always 0 at the maximum level.
    pub progress: f64,
}

/// Outcome of an XP award as reported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAwardResult {
    pub old_level: i32,
    pub new_level: i32,
    pub new_total_xp: i64,
    pub leveled_up: bool,
}

/// Static, monotonically increasing XP thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    thresholds: Vec<i64>,
}

impl LevelTable {
    /// Build a table, validating that thresholds start at 0 and strictly
    /// increase.
    pub fn new(thresholds: Vec<i64>) -> Result<Self, CoreError> {
        match thresholds.first() {
            None => {
                return Err(CoreError::Validation(
                    "Level table must have at least one threshold".to_string(),
                ))
            }
            Some(&first) if first != 0 => {
                return Err(CoreError::Validation(format!(
                    "Level table must start at 0 XP, got {first}"
                )))
            }
            _ => {}
        }

        if let Some(pair) = thresholds.windows(2).find(|w| w[1] <= w[0]) {
            return Err(CoreError::Validation(format!(
                "Level thresholds must strictly increase, found {} then {}",
                pair[0], pair[1]
            )));
        }

        Ok(Self { thresholds })
    }

    /// Parse a comma-separated threshold list such as `"0,300,900"`.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let thresholds = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i64>().map_err(|_| {
                    CoreError::Validation(format!("Invalid level threshold '{s}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(thresholds)
    }

    /// Highest level in the table.
    pub fn max_level(&self) -> i32 {
        i32::try_from(self.thresholds.len()).unwrap_or(i32::MAX)
    }

    pub fn thresholds(&self) -> &[i64] {
        &self.thresholds
    }

    /// Level for `total_xp`; negative XP resolves to level 1.
    pub fn level_for(&self, total_xp: i64) -> i32 {
        let reached = self.thresholds.partition_point(|t| *t <= total_xp).max(1);
        i32::try_from(reached).unwrap_or(i32::MAX)
    }

    /// Level and intra-level progress for `total_xp`.
    pub fn resolve(&self, total_xp: i64) -> LevelProgress {
        let reached = self.thresholds.partition_point(|t| *t <= total_xp).max(1);
        let current_threshold = self.thresholds[reached - 1];
        let next_threshold = self.thresholds.get(reached).copied();

        let progress = match next_threshold {
            Some(next) => {
                let into = (total_xp - current_threshold).max(0) as f64;
                into / (next - current_threshold) as f64
            }
            None => 0.0,
        };

        LevelProgress {
            level: i32::try_from(reached).unwrap_or(i32::MAX),
            current_threshold,
            next_threshold,
            progress,
        }
    }

    /// Compare levels before and after an award.
    pub fn award_result(&self, old_total_xp: i64, new_total_xp: i64) -> XpAwardResult {
        let old_level = self.level_for(old_total_xp);
        let new_level = self.level_for(new_total_xp);
        XpAwardResult {
            old_level,
            new_level,
            new_total_xp,
            leveled_up: new_level > old_level,
        }
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            thresholds: DND_5E_THRESHOLDS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn small_table() -> LevelTable {
        LevelTable::new(vec![0, 10, 30, 60]).unwrap()
    }

    // -- Construction ---------------------------------------------------------

    #[test]
    fn default_table_is_valid() {
        let table = LevelTable::default();
        assert_eq!(LevelTable::new(table.thresholds().to_vec()).unwrap(), table);
        assert_eq!(table.max_level(), 20);
    }

    #[test]
    fn rejects_empty_table() {
        assert_matches!(LevelTable::new(vec![]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_nonzero_floor() {
        assert_matches!(LevelTable::new(vec![5, 10]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_non_increasing_thresholds() {
        assert_matches!(
            LevelTable::new(vec![0, 10, 10, 20]),
            Err(CoreError::Validation(_))
        );
        assert_matches!(LevelTable::new(vec![0, 10, 5]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn parse_comma_separated() {
        let table = LevelTable::parse(" 0, 10 ,30,60 ").unwrap();
        assert_eq!(table, small_table());
        assert!(LevelTable::parse("0,ten").is_err());
    }

    // -- Resolution -----------------------------------------------------------

    #[test]
    fn resolve_within_level() {
        let p = small_table().resolve(20);
        assert_eq!(p.level, 2);
        assert_eq!(p.current_threshold, 10);
        assert_eq!(p.next_threshold, Some(30));
        assert!((p.progress - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn resolve_exact_threshold_starts_next_level() {
        let p = small_table().resolve(30);
        assert_eq!(p.level, 3);
        assert_eq!(p.progress, 0.0);
    }

    #[test]
    fn resolve_at_maximum_has_zero_progress() {
        let p = small_table().resolve(1_000);
        assert_eq!(p.level, 4);
        assert_eq!(p.next_threshold, None);
        assert_eq!(p.progress, 0.0);
    }

    #[test]
    fn negative_xp_floors_at_level_one() {
        let table = small_table();
        assert_eq!(table.level_for(-5), 1);
        assert_eq!(table.resolve(-5).progress, 0.0);
    }

    #[test]
    fn dnd_table_levels() {
        let table = LevelTable::default();
        assert_eq!(table.level_for(0), 1);
        assert_eq!(table.level_for(299), 1);
        assert_eq!(table.level_for(300), 2);
        assert_eq!(table.level_for(355_000), 20);
    }

    #[test]
    fn level_is_monotonic_in_xp() {
        let table = LevelTable::default();
        let mut previous = table.level_for(0);
        for xp in (0..400_000).step_by(250) {
            let level = table.level_for(xp);
            assert!(level >= previous, "level dropped at {xp} XP");
            assert_eq!(level, table.resolve(xp).level);
            previous = level;
        }
    }

    // -- Award results --------------------------------------------------------

    #[test]
    fn award_crossing_a_threshold_levels_up() {
        let result = small_table().award_result(9, 11);
        assert_eq!(result.old_level, 1);
        assert_eq!(result.new_level, 2);
        assert_eq!(result.new_total_xp, 11);
        assert!(result.leveled_up);
    }

    #[test]
    fn award_within_a_level_does_not_level_up() {
        let result = small_table().award_result(11, 12);
        assert_eq!(result.old_level, result.new_level);
        assert!(!result.leveled_up);
    }
}
