//! Squad shape of a team for one season

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::player::{Position, Season, TeamId};
use crate::domain::season_stat::SeasonStat;
use crate::ports::{PlayerDirectory, PortResult, StatSource};

const SHORTAGE_WEIGHT: f64 = 0.7;
const RATING_WEAKNESS_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub team_id: TeamId,
    pub season: Season,
    pub position_counts: BTreeMap<Position, u32>,
    /// Positions whose players all lack a rating have no entry.
    pub position_avg_ratings: BTreeMap<Position, f64>,
    pub avg_age: f64,
    pub avg_rating: f64,
    pub weakest_position_by_rating: Option<Position>,
    pub weak_positions: BTreeSet<Position>,
}

impl TeamSummary {
    pub fn is_weak(&self, position: &Position) -> bool {
        self.weak_positions.contains(position)
    }

    pub fn count(&self, position: &Position) -> u32 {
        self.position_counts.get(position).copied().unwrap_or(0)
    }

    /// Priority of each known position against a league reference rating.
    pub fn position_priorities(&self, league_avg_rating: f64) -> BTreeMap<Position, f64> {
        Position::KNOWN
            .into_iter()
            .map(|position| {
                let required = position.min_squad_size().unwrap_or(0);
                let rating = self
                    .position_avg_ratings
                    .get(&position)
                    .copied()
                    .unwrap_or(league_avg_rating);
                let priority =
                    position_priority(self.count(&position), required, rating, league_avg_rating);
                (position, priority)
            })
            .collect()
    }
}

/// Blend of headcount shortage and rating weakness, in `[0, 1]`.
pub fn position_priority(
    current_count: u32,
    required_count: u32,
    avg_rating: f64,
    league_avg_rating: f64,
) -> f64 {
    let shortage = if required_count > 0 && current_count < required_count {
        f64::from(required_count - current_count) / f64::from(required_count)
    } else {
        0.0
    };

    let rating_weakness = if league_avg_rating > 0.0
        && avg_rating.is_finite()
        && avg_rating < league_avg_rating
    {
        ((league_avg_rating - avg_rating) / league_avg_rating).min(1.0)
    } else {
        0.0
    };

    shortage * SHORTAGE_WEIGHT + rating_weakness * RATING_WEAKNESS_WEIGHT
}

/// Per (team, position) averages over a season, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionStatRow {
    pub team_id: TeamId,
    pub position: Position,
    pub player_count: u32,
    pub avg_appearances: f64,
    pub avg_minutes: f64,
    pub avg_rating: Option<f64>,
}

#[derive(Default)]
struct PositionTotals {
    count: u32,
    appearances: u64,
    minutes: u64,
    rating_sum: f64,
    rated: u32,
}

impl PositionTotals {
    fn add(&mut self, stat: &SeasonStat) {
        self.count += 1;
        self.appearances += u64::from(stat.appearances);
        self.minutes += u64::from(stat.minutes_played);
        if let Some(rating) = stat.avg_rating.filter(|rating| rating.is_finite()) {
            self.rating_sum += rating;
            self.rated += 1;
        }
    }

    fn avg_rating(&self) -> Option<f64> {
        (self.rated > 0).then(|| self.rating_sum / f64::from(self.rated))
    }
}

pub struct TeamSummaryAnalyzer {
    stats: Arc<dyn StatSource>,
    players: Arc<dyn PlayerDirectory>,
}

impl TeamSummaryAnalyzer {
    pub fn new(stats: Arc<dyn StatSource>, players: Arc<dyn PlayerDirectory>) -> Self {
        Self { stats, players }
    }

    pub async fn summarize(&self, team_id: TeamId, season: Season) -> PortResult<TeamSummary> {
        let rows = self.stats.list_team_stats(team_id, season).await?;

        let mut ages = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(age) = self.players.get_age(row.player_id).await? {
                ages.push(age);
            }
        }

        let summary = Self::summarize_rows(team_id, season, &rows, &ages);
        debug!(
            event_name = "scouting.team_summary.computed",
            team_id = %team_id,
            season = %season,
            roster_size = rows.len(),
            avg_age = summary.avg_age,
            weak_positions = ?summary.weak_positions,
            "team summary computed"
        );
        Ok(summary)
    }

    /// Pure part of the summary; `ages` holds the known ages of the roster.
    pub fn summarize_rows(
        team_id: TeamId,
        season: Season,
        rows: &[SeasonStat],
        ages: &[u32],
    ) -> TeamSummary {
        let mut totals: BTreeMap<Position, PositionTotals> = BTreeMap::new();
        for row in rows {
            totals.entry(row.normalized_position()).or_default().add(row);
        }

        let position_counts: BTreeMap<Position, u32> =
            totals.iter().map(|(position, t)| (position.clone(), t.count)).collect();
        let position_avg_ratings: BTreeMap<Position, f64> = totals
            .iter()
            .filter_map(|(position, t)| t.avg_rating().map(|avg| (position.clone(), avg)))
            .collect();

        let (weighted_sum, weighted_count) = position_avg_ratings.iter().fold(
            (0.0, 0u32),
            |(sum, count), (position, avg)| {
                let players = position_counts.get(position).copied().unwrap_or(0);
                (sum + avg * f64::from(players), count + players)
            },
        );
        let avg_rating =
            if weighted_count == 0 { 0.0 } else { weighted_sum / f64::from(weighted_count) };

        let avg_age = if ages.is_empty() {
            0.0
        } else {
            ages.iter().map(|age| f64::from(*age)).sum::<f64>() / ages.len() as f64
        };

        // BTreeMap iteration is ordered by position, so ties resolve to the
        // lowest position in that order.
        let weakest_position_by_rating = position_avg_ratings
            .iter()
            .fold(None::<(&Position, f64)>, |best, (position, avg)| match best {
                Some((_, best_avg)) if *avg >= best_avg => best,
                _ => Some((position, *avg)),
            })
            .map(|(position, _)| position.clone());

        // No season rows means nothing to assess, not a squad missing everywhere.
        let weak_positions = Position::KNOWN
            .into_iter()
            .filter(|_| !rows.is_empty())
            .filter(|position| {
                let required = position.min_squad_size().unwrap_or(0);
                position_counts.get(position).copied().unwrap_or(0) < required
            })
            .collect();

        TeamSummary {
            team_id,
            season,
            position_counts,
            position_avg_ratings,
            avg_age,
            avg_rating,
            weakest_position_by_rating,
            weak_positions,
        }
    }

    /// Averages per (team, position) across every season stat row.
    pub fn position_stat_report(rows: &[SeasonStat]) -> Vec<PositionStatRow> {
        let mut totals: BTreeMap<(TeamId, Position), PositionTotals> = BTreeMap::new();
        for row in rows {
            totals.entry((row.team_id, row.normalized_position())).or_default().add(row);
        }

        totals
            .into_iter()
            .map(|((team_id, position), t)| PositionStatRow {
                team_id,
                position,
                player_count: t.count,
                avg_appearances: t.appearances as f64 / f64::from(t.count),
                avg_minutes: t.minutes as f64 / f64::from(t.count),
                avg_rating: t.avg_rating(),
            })
            .collect()
    }
}
