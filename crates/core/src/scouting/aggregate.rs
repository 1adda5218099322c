//! Match records to season totals

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::player::{PlayerId, Season};
use crate::domain::season_stat::{MatchRecord, SeasonAggregate};
use crate::ports::{PortResult, SeasonStatStore, StatSource};

#[derive(Default)]
struct Accumulator {
    appearances: u32,
    total_minutes: u32,
    rating_sum: f64,
    rated_matches: u32,
}

/// Reduces match-level records into one aggregate per (player, season).
pub struct SeasonStatAggregator {
    source: Arc<dyn StatSource>,
    store: Arc<dyn SeasonStatStore>,
}

impl SeasonStatAggregator {
    pub fn new(source: Arc<dyn StatSource>, store: Arc<dyn SeasonStatStore>) -> Self {
        Self { source, store }
    }

    /// Every record counts as an appearance, including 0-minute squad listings.
    /// Ratings average over non-null values only. Output is ordered by
    /// (season, player) so repeated runs produce identical sequences.
    pub fn aggregate(records: &[MatchRecord]) -> Vec<SeasonAggregate> {
        let mut totals: BTreeMap<(Season, PlayerId), Accumulator> = BTreeMap::new();

        for record in records {
            let entry = totals.entry((record.season, record.player_id)).or_default();
            entry.appearances = entry.appearances.saturating_add(1);
            entry.total_minutes = entry.total_minutes.saturating_add(record.minutes_played);
            if let Some(rating) = record.rating.filter(|rating| rating.is_finite()) {
                entry.rating_sum += rating;
                entry.rated_matches += 1;
            }
        }

        totals
            .into_iter()
            .map(|((season, player_id), acc)| SeasonAggregate {
                player_id,
                season,
                appearances: acc.appearances,
                total_minutes: acc.total_minutes,
                avg_rating: (acc.rated_matches > 0)
                    .then(|| acc.rating_sum / f64::from(acc.rated_matches)),
            })
            .collect()
    }

    /// Recomputes and overwrites the season aggregates. Returns rows written.
    pub async fn recompute_season(&self, season: Season) -> PortResult<usize> {
        let records = self.source.list_match_records(season).await?;
        let aggregates: Vec<_> = Self::aggregate(&records)
            .into_iter()
            .filter(|aggregate| aggregate.season == season)
            .collect();

        for aggregate in &aggregates {
            debug!(
                event_name = "scouting.aggregate.row",
                player_id = %aggregate.player_id,
                season = %aggregate.season,
                appearances = aggregate.appearances,
                total_minutes = aggregate.total_minutes,
                "replacing season aggregate"
            );
            self.store.replace_aggregate(aggregate).await?;
        }

        info!(
            event_name = "scouting.aggregate.completed",
            season = %season,
            match_records = records.len(),
            rows_written = aggregates.len(),
            "season aggregation completed"
        );

        Ok(aggregates.len())
    }
}
