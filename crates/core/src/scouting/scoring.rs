//! Scoring algorithms for scouting candidates

use serde::Serialize;

use super::bonus::{finite_or_zero, PositionBonusCalculator};
use super::team_summary::TeamSummary;
use super::{
    AGING_TEAM_AVG_AGE, BALANCED_PLAYER_REASON, VETERAN_MIN_AGE, YOUNG_PLAYER_MAX_AGE,
};
use crate::domain::player::Position;
use crate::domain::season_stat::{CategoryStats, SeasonStat};

/// Weights and multipliers for candidate scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Per appearance (default: 0.4)
    pub appearance: f64,
    /// Per 90 minutes played (default: 0.3)
    pub minutes_per_match: f64,
    /// Per rating point scaled by 10 (default: 0.3)
    pub rating: f64,
    /// Candidate fills a weak position (default: 1.3)
    pub weak_position_boost: f64,
    /// Candidate position is already covered (default: 0.7)
    pub filled_position_penalty: f64,
    /// Young candidate for an aging team (default: 1.1)
    pub young_for_aging_team_boost: f64,
    /// Candidate aged 29 or more (default: 0.9)
    pub veteran_penalty: f64,
    /// Potential multiplier for young candidates joining an aging team (default: 1.2)
    pub aging_team_potential_boost: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

/// Intermediate values of one candidate's score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base_score: f64,
    pub position_bonus: f64,
    pub position_multiplier: f64,
    pub age_multiplier: f64,
    pub final_score: f64,
    pub potential_score: f64,
}

/// Score calculator for scouting candidates
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    weights: ScoringWeights,
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self { weights: ScoringWeights::default() }
    }

    /// Appearances, minutes and rating; a missing rating counts as zero.
    pub fn base_score(&self, appearances: u32, minutes_played: u32, rating: f64) -> f64 {
        let value = f64::from(appearances) * self.weights.appearance
            + (f64::from(minutes_played) / 90.0) * self.weights.minutes_per_match
            + finite_or_zero(rating) * 10.0 * self.weights.rating;
        finite_or_zero(value)
    }

    /// Binary gate: weak positions are boosted, every other position is penalized.
    pub fn position_multiplier(&self, position: &Position, team: &TeamSummary) -> f64 {
        if team.is_weak(position) {
            self.weights.weak_position_boost
        } else {
            self.weights.filled_position_penalty
        }
    }

    pub fn age_multiplier(&self, age: u32, aging_team: bool) -> f64 {
        if age <= YOUNG_PLAYER_MAX_AGE && aging_team {
            self.weights.young_for_aging_team_boost
        } else if age >= VETERAN_MIN_AGE {
            self.weights.veteran_penalty
        } else {
            1.0
        }
    }

    pub fn potential_score(&self, age: u32, rating: f64, aging_team: bool) -> f64 {
        let age_tier = match age {
            0..=23 => 10.0,
            24..=26 => 6.0,
            _ => 2.0,
        };
        let mut potential = age_tier + finite_or_zero(rating) * 2.0;
        if aging_team && age <= YOUNG_PLAYER_MAX_AGE {
            potential *= self.weights.aging_team_potential_boost;
        }
        finite_or_zero(potential)
    }

    /// Full score of a candidate against a target team. The position multiplier
    /// is applied before the age multiplier.
    pub fn score_candidate(&self, stat: &SeasonStat, age: u32, team: &TeamSummary) -> ScoreBreakdown {
        let rating = stat.rating_or_zero();
        let position = stat.normalized_position();
        let aging_team = is_aging(team);

        let base_score = self.base_score(stat.appearances, stat.minutes_played, rating);
        let position_bonus = PositionBonusCalculator::bonus(stat.position.as_deref(), &stat.categories);
        let position_multiplier = self.position_multiplier(&position, team);
        let age_multiplier = self.age_multiplier(age, aging_team);

        let final_score =
            finite_or_zero((base_score + position_bonus) * position_multiplier * age_multiplier);

        ScoreBreakdown {
            base_score,
            position_bonus,
            position_multiplier,
            age_multiplier,
            final_score,
            potential_score: self.potential_score(age, rating, aging_team),
        }
    }

    /// Short trait summary from fixed per-position thresholds.
    pub fn generate_reason(&self, position: &Position, stats: &CategoryStats) -> String {
        let mut traits = Vec::new();

        match position {
            Position::Midfielder => {
                if stats.key_passes >= 40 {
                    traits.push("playmaking");
                }
                if stats.pass_accuracy >= 85.0 {
                    traits.push("build-up passing");
                }
                if stats.shots >= 30 {
                    traits.push("long-range threat");
                }
            }
            Position::Defender => {
                if stats.tackles.saturating_add(stats.interceptions) >= 60 {
                    traits.push("defensive duels");
                }
                if stats.clearances >= 80 {
                    traits.push("box defending");
                }
            }
            Position::Attacker => {
                if stats.goals >= 10 {
                    traits.push("finishing");
                }
                if stats.assists >= 7 {
                    traits.push("link-up play");
                }
            }
            Position::Goalkeeper => {
                if stats.saves >= 70 {
                    traits.push("shot stopping");
                }
                if stats.goals_conceded <= 40 {
                    traits.push("composure");
                }
            }
            Position::Other(_) => {}
        }

        if traits.is_empty() {
            BALANCED_PLAYER_REASON.to_string()
        } else {
            traits.join(", ")
        }
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_aging(team: &TeamSummary) -> bool {
    team.avg_age >= AGING_TEAM_AVG_AGE
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::domain::player::{PlayerId, Season, TeamId};

    fn team(weak: &[Position], avg_age: f64) -> TeamSummary {
        TeamSummary {
            team_id: TeamId(1),
            season: Season(2024),
            position_counts: BTreeMap::new(),
            position_avg_ratings: BTreeMap::new(),
            avg_age,
            avg_rating: 0.0,
            weakest_position_by_rating: None,
            weak_positions: weak.iter().cloned().collect::<BTreeSet<_>>(),
        }
    }

    fn attacker() -> SeasonStat {
        SeasonStat {
            player_id: PlayerId(11),
            team_id: TeamId(2),
            season: Season(2024),
            position: Some("Attacker".to_string()),
            appearances: 30,
            minutes_played: 2500,
            avg_rating: Some(7.2),
            categories: CategoryStats { goals: 10, assists: 5, shots: 20, ..Default::default() },
        }
    }

    #[test]
    fn test_base_score_formula() {
        let calculator = ScoreCalculator::new();
        let base = calculator.base_score(30, 2500, 7.2);
        // 12 + 8.333 + 21.6
        assert!((base - 41.9333333).abs() < 1e-6);
    }

    #[test]
    fn test_young_attacker_for_aging_team_with_weak_forward_line() {
        let calculator = ScoreCalculator::new();
        let breakdown = calculator.score_candidate(&attacker(), 22, &team(&[Position::Attacker], 28.0));

        assert!((breakdown.position_bonus - 8.5).abs() < 1e-9);
        assert_eq!(breakdown.position_multiplier, 1.3);
        assert_eq!(breakdown.age_multiplier, 1.1);
        // 50.4333 * 1.3 * 1.1
        assert!((breakdown.final_score - 72.1197).abs() < 1e-3);
        // (10 + 7.2 * 2) * 1.2 evaluates to 29.28
        assert!((breakdown.potential_score - 29.28).abs() < 1e-9);
    }

    #[test]
    fn test_weak_position_beats_identical_filled_position() {
        let calculator = ScoreCalculator::new();
        let candidate = attacker();
        let weak = calculator.score_candidate(&candidate, 26, &team(&[Position::Attacker], 25.0));
        let filled = calculator.score_candidate(&candidate, 26, &team(&[Position::Defender], 25.0));

        assert!(weak.final_score > filled.final_score);
        assert!((weak.final_score / filled.final_score - 1.3 / 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_age_multiplier_rules() {
        let calculator = ScoreCalculator::new();
        assert_eq!(calculator.age_multiplier(24, true), 1.1);
        assert_eq!(calculator.age_multiplier(24, false), 1.0);
        assert_eq!(calculator.age_multiplier(25, true), 1.0);
        assert_eq!(calculator.age_multiplier(29, true), 0.9);
        assert_eq!(calculator.age_multiplier(33, false), 0.9);
    }

    #[test]
    fn test_potential_age_tiers() {
        let calculator = ScoreCalculator::new();
        assert_eq!(calculator.potential_score(23, 0.0, false), 10.0);
        assert_eq!(calculator.potential_score(24, 0.0, false), 6.0);
        assert_eq!(calculator.potential_score(26, 5.0, false), 16.0);
        assert_eq!(calculator.potential_score(27, 5.0, true), 12.0);
        assert!((calculator.potential_score(24, 5.0, true) - 19.2).abs() < 1e-9);
    }

    #[test]
    fn test_unrated_unknown_position_scores_on_base_only() {
        let calculator = ScoreCalculator::new();
        let mut candidate = attacker();
        candidate.position = Some("Libero".to_string());
        candidate.avg_rating = None;

        let breakdown = calculator.score_candidate(&candidate, 27, &team(&[], 25.0));

        assert_eq!(breakdown.position_bonus, 0.0);
        let expected_base = 30.0 * 0.4 + (2500.0 / 90.0) * 0.3;
        assert!((breakdown.base_score - expected_base).abs() < 1e-9);
        assert!((breakdown.final_score - expected_base * 0.7).abs() < 1e-9);
        assert_eq!(breakdown.potential_score, 2.0);
    }

    #[test]
    fn test_scores_stay_finite_for_extreme_inputs() {
        let calculator = ScoreCalculator::new();
        let mut candidate = attacker();
        candidate.appearances = u32::MAX;
        candidate.minutes_played = u32::MAX;
        candidate.avg_rating = Some(f64::INFINITY);
        candidate.categories.pass_accuracy = f64::NAN;

        let breakdown = calculator.score_candidate(&candidate, 0, &team(&[], 40.0));

        assert!(breakdown.final_score.is_finite());
        assert!(breakdown.potential_score.is_finite());

        let empty = SeasonStat {
            appearances: 0,
            minutes_played: 0,
            avg_rating: None,
            position: None,
            categories: CategoryStats::default(),
            ..attacker()
        };
        let zero = calculator.score_candidate(&empty, 20, &team(&[], 0.0));
        assert_eq!(zero.final_score, 0.0);
    }

    #[test]
    fn test_reason_thresholds() {
        let calculator = ScoreCalculator::new();

        let playmaker = CategoryStats { key_passes: 40, pass_accuracy: 85.0, ..Default::default() };
        assert_eq!(
            calculator.generate_reason(&Position::Midfielder, &playmaker),
            "playmaking, build-up passing"
        );

        let stopper = CategoryStats { tackles: 40, interceptions: 20, clearances: 79, ..Default::default() };
        assert_eq!(calculator.generate_reason(&Position::Defender, &stopper), "defensive duels");

        let striker = CategoryStats { goals: 9, assists: 7, ..Default::default() };
        assert_eq!(calculator.generate_reason(&Position::Attacker, &striker), "link-up play");

        let keeper = CategoryStats { saves: 70, goals_conceded: 41, ..Default::default() };
        assert_eq!(calculator.generate_reason(&Position::Goalkeeper, &keeper), "shot stopping");
    }

    #[test]
    fn test_reason_falls_back_to_balanced_player() {
        let calculator = ScoreCalculator::new();
        let quiet = CategoryStats::default();

        assert_eq!(calculator.generate_reason(&Position::Attacker, &quiet), BALANCED_PLAYER_REASON);
        assert_eq!(
            calculator.generate_reason(&Position::Other("Libero".into()), &quiet),
            BALANCED_PLAYER_REASON
        );
        // a keeper with no goals conceded still reads as composed
        assert_eq!(calculator.generate_reason(&Position::Goalkeeper, &quiet), "composure");
    }
}
