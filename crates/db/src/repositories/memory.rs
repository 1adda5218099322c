use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use scoutbook_core::domain::player::{Player, PlayerId, Season, Team, TeamId};
use scoutbook_core::domain::recommendation::{
    Recommendation, RecommendationKey, RecommendationView,
};
use scoutbook_core::domain::season_stat::{MatchRecord, SeasonAggregate, SeasonStat};
use scoutbook_core::ports::{
    PlayerDirectory, PortResult, RecommendationStore, SeasonStatStore, StatSource, TeamDirectory,
};

/// Every storage port over process memory. Integration tests drive the
/// engine through it without a database.
#[derive(Default)]
pub struct InMemoryScoutStore {
    teams: RwLock<BTreeMap<(TeamId, Season), Team>>,
    players: RwLock<HashMap<PlayerId, Player>>,
    matches: RwLock<Vec<MatchRecord>>,
    season_stats: RwLock<BTreeMap<(PlayerId, Season), SeasonStat>>,
    recommendations: RwLock<HashMap<RecommendationKey, Recommendation>>,
}

impl InMemoryScoutStore {
    pub async fn add_team(&self, team: Team) {
        self.teams.write().await.insert((team.id, team.season), team);
    }

    pub async fn add_player(&self, player: Player) {
        self.players.write().await.insert(player.id, player);
    }

    pub async fn add_match(&self, record: MatchRecord) {
        self.matches.write().await.push(record);
    }

    pub async fn add_season_stat(&self, stat: SeasonStat) {
        self.season_stats.write().await.insert((stat.player_id, stat.season), stat);
    }

    pub async fn season_stat(&self, player_id: PlayerId, season: Season) -> Option<SeasonStat> {
        self.season_stats.read().await.get(&(player_id, season)).cloned()
    }

    pub async fn recommendation(&self, key: &RecommendationKey) -> Option<Recommendation> {
        self.recommendations.read().await.get(key).cloned()
    }

    async fn stats_where(&self, season: Season, keep: impl Fn(TeamId) -> bool) -> Vec<SeasonStat> {
        let stats = self.season_stats.read().await;
        let players = self.players.read().await;
        stats
            .values()
            .filter(|stat| stat.season == season && keep(stat.team_id))
            .map(|stat| {
                let mut stat = stat.clone();
                if stat.position.is_none() {
                    stat.position = players.get(&stat.player_id).map(|p| p.position.clone());
                }
                stat
            })
            .collect()
    }
}

#[async_trait]
impl StatSource for InMemoryScoutStore {
    async fn list_match_records(&self, season: Season) -> PortResult<Vec<MatchRecord>> {
        let matches = self.matches.read().await;
        Ok(matches.iter().filter(|record| record.season == season).cloned().collect())
    }

    async fn list_candidate_stats(
        &self,
        season: Season,
        exclude_team: TeamId,
    ) -> PortResult<Vec<SeasonStat>> {
        Ok(self.stats_where(season, |team| team != exclude_team).await)
    }

    async fn list_team_stats(&self, team_id: TeamId, season: Season) -> PortResult<Vec<SeasonStat>> {
        Ok(self.stats_where(season, |team| team == team_id).await)
    }
}

#[async_trait]
impl SeasonStatStore for InMemoryScoutStore {
    async fn replace_aggregate(&self, aggregate: &SeasonAggregate) -> PortResult<()> {
        let mut stats = self.season_stats.write().await;
        if let Some(stat) = stats.get_mut(&(aggregate.player_id, aggregate.season)) {
            stat.appearances = aggregate.appearances;
            stat.minutes_played = aggregate.total_minutes;
            stat.avg_rating = aggregate.avg_rating;
            return Ok(());
        }

        let players = self.players.read().await;
        if let Some(player) = players.get(&aggregate.player_id) {
            stats.insert(
                (aggregate.player_id, aggregate.season),
                SeasonStat {
                    player_id: player.id,
                    team_id: player.team_id,
                    season: aggregate.season,
                    position: Some(player.position.clone()),
                    appearances: aggregate.appearances,
                    minutes_played: aggregate.total_minutes,
                    avg_rating: aggregate.avg_rating,
                    categories: Default::default(),
                },
            );
        }
        Ok(())
    }
}

#[async_trait]
impl PlayerDirectory for InMemoryScoutStore {
    async fn get_age(&self, player_id: PlayerId) -> PortResult<Option<u32>> {
        Ok(self.players.read().await.get(&player_id).map(|player| player.age))
    }

    async fn get_name(&self, player_id: PlayerId) -> PortResult<Option<String>> {
        Ok(self.players.read().await.get(&player_id).map(|player| player.name.clone()))
    }
}

#[async_trait]
impl TeamDirectory for InMemoryScoutStore {
    async fn list_team_ids(&self, season: Season) -> PortResult<Vec<TeamId>> {
        let teams = self.teams.read().await;
        Ok(teams.keys().filter(|(_, s)| *s == season).map(|(id, _)| *id).collect())
    }

    async fn get_team_name(&self, team_id: TeamId) -> PortResult<Option<String>> {
        let teams = self.teams.read().await;
        Ok(teams
            .iter()
            .rev()
            .find(|((id, _), _)| *id == team_id)
            .map(|(_, team)| team.name.clone()))
    }
}

#[async_trait]
impl RecommendationStore for InMemoryScoutStore {
    async fn upsert(&self, recommendation: &Recommendation) -> PortResult<()> {
        let mut rows = self.recommendations.write().await;
        let narrative = rows.get(&recommendation.key).and_then(|row| row.narrative.clone());
        let mut row = recommendation.clone();
        row.narrative = narrative;
        rows.insert(recommendation.key, row);
        Ok(())
    }

    async fn find_narrative(&self, key: &RecommendationKey) -> PortResult<Option<String>> {
        Ok(self.recommendations.read().await.get(key).and_then(|row| row.narrative.clone()))
    }

    async fn store_narrative(&self, key: &RecommendationKey, text: &str) -> PortResult<()> {
        if let Some(row) = self.recommendations.write().await.get_mut(key) {
            row.narrative = Some(text.to_string());
        }
        Ok(())
    }

    async fn list_for_team(
        &self,
        team_id: TeamId,
        season: Season,
        limit: u32,
    ) -> PortResult<Vec<RecommendationView>> {
        let rows = self.recommendations.read().await;
        let players = self.players.read().await;

        let mut views: Vec<RecommendationView> = rows
            .values()
            .filter(|row| row.key.team_id == team_id && row.key.season == season)
            .map(|row| {
                let player = players.get(&row.key.player_id);
                RecommendationView {
                    player_id: row.key.player_id,
                    player_name: player.map(|p| p.name.clone()).unwrap_or_default(),
                    age: player.map(|p| p.age),
                    position: row.position.code().to_string(),
                    score: row.score,
                    potential_score: row.potential_score,
                    reason: row.reason.clone(),
                    narrative: row.narrative.clone(),
                }
            })
            .collect();

        views.sort_by(|left, right| {
            right
                .score
                .partial_cmp(&left.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| left.player_id.cmp(&right.player_id))
        });
        views.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(views)
    }
}
