//! Position-specific bonus on top of the base score

use crate::domain::player::Position;
use crate::domain::season_stat::CategoryStats;

const CLEARANCE_TERM_CAP: f64 = 8.0;
const SAVE_TERM_CAP: f64 = 10.0;
const LOG_SCALE: f64 = 3.0;

/// Stateless calculator for the per-position bonus.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionBonusCalculator;

impl PositionBonusCalculator {
    /// Bonus for a raw provider label. Labels other than the four known ones,
    /// and a missing label, score zero.
    pub fn bonus(raw_position: Option<&str>, stats: &CategoryStats) -> f64 {
        match raw_position.map(Position::from_raw) {
            Some(position) => Self::bonus_for(&position, stats),
            None => 0.0,
        }
    }

    pub fn bonus_for(position: &Position, stats: &CategoryStats) -> f64 {
        let value = match position {
            Position::Attacker => {
                f64::from(stats.goals) * 0.5
                    + f64::from(stats.assists) * 0.3
                    + f64::from(stats.shots) * 0.1
            }
            Position::Midfielder => {
                f64::from(stats.assists) * 0.4
                    + f64::from(stats.key_passes) * 0.3
                    + finite_or_zero(stats.pass_accuracy) * 0.05
            }
            Position::Defender => {
                f64::from(stats.tackles) * 0.3
                    + f64::from(stats.interceptions) * 0.04
                    + Self::clearance_term(stats.clearances)
            }
            Position::Goalkeeper => {
                Self::save_term(stats.saves) - f64::from(stats.goals_conceded) * 0.3
            }
            Position::Other(_) => 0.0,
        };

        finite_or_zero(value)
    }

    /// Log-scaled clearance contribution, capped so volume cannot dominate.
    pub fn clearance_term(clearances: u32) -> f64 {
        capped_log(clearances, CLEARANCE_TERM_CAP)
    }

    /// Log-scaled save contribution, capped.
    pub fn save_term(saves: u32) -> f64 {
        capped_log(saves, SAVE_TERM_CAP)
    }
}

fn capped_log(count: u32, cap: f64) -> f64 {
    ((f64::from(count) + 1.0).ln() * LOG_SCALE).min(cap)
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_attacker_bonus() {
        let stats = CategoryStats { goals: 10, assists: 5, shots: 20, ..Default::default() };
        approx(PositionBonusCalculator::bonus(Some("Attacker"), &stats), 8.5);
    }

    #[test]
    fn test_midfielder_bonus() {
        let stats = CategoryStats {
            assists: 6,
            key_passes: 40,
            pass_accuracy: 88.0,
            ..Default::default()
        };
        // 6*0.4 + 40*0.3 + 88*0.05 = 2.4 + 12 + 4.4
        approx(PositionBonusCalculator::bonus(Some("Midfielder"), &stats), 18.8);
    }

    #[test]
    fn test_defender_clearance_term_is_capped() {
        let stats =
            CategoryStats { tackles: 50, interceptions: 20, clearances: 1000, ..Default::default() };
        approx(PositionBonusCalculator::clearance_term(1000), 8.0);
        approx(PositionBonusCalculator::bonus(Some("Defender"), &stats), 23.8);
    }

    #[test]
    fn test_defender_clearance_term_below_cap() {
        // ln(10) * 3 ≈ 6.9078 stays under the cap
        approx(PositionBonusCalculator::clearance_term(9), 10f64.ln() * 3.0);
        assert!(PositionBonusCalculator::clearance_term(u32::MAX) <= 8.0);
    }

    #[test]
    fn test_goalkeeper_save_term_is_capped() {
        assert!(PositionBonusCalculator::save_term(u32::MAX) <= 10.0);
        approx(PositionBonusCalculator::save_term(0), 0.0);

        let stats = CategoryStats { saves: 5000, goals_conceded: 30, ..Default::default() };
        approx(PositionBonusCalculator::bonus(Some("Goalkeeper"), &stats), 10.0 - 9.0);
    }

    #[test]
    fn test_goalkeeper_bonus_can_go_negative() {
        let stats = CategoryStats { saves: 0, goals_conceded: 60, ..Default::default() };
        approx(PositionBonusCalculator::bonus(Some("Goalkeeper"), &stats), -18.0);
    }

    #[test]
    fn test_unknown_or_missing_position_scores_zero() {
        let stats = CategoryStats { goals: 30, tackles: 90, ..Default::default() };
        assert_eq!(PositionBonusCalculator::bonus(Some("FW"), &stats), 0.0);
        assert_eq!(PositionBonusCalculator::bonus(Some(""), &stats), 0.0);
        assert_eq!(PositionBonusCalculator::bonus(None, &stats), 0.0);
    }

    #[test]
    fn test_non_finite_pass_accuracy_is_ignored() {
        let stats = CategoryStats { pass_accuracy: f64::NAN, key_passes: 10, ..Default::default() };
        approx(PositionBonusCalculator::bonus(Some("Midfielder"), &stats), 3.0);
    }
}
