use async_trait::async_trait;
use scoutbook_core::domain::player::{PlayerId, Season, TeamId};
use scoutbook_core::domain::recommendation::{
    Recommendation, RecommendationKey, RecommendationView,
};
use scoutbook_core::ports::{PortResult, RecommendationStore};
use sqlx::{sqlite::SqliteRow, Row};

use super::{optional_count_column, RepositoryError};
use crate::DbPool;

pub struct SqlRecommendationRepository {
    pool: DbPool,
}

impl SqlRecommendationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// One statement per key; the narrative column is not in the update list.
    async fn upsert_row(&self, recommendation: &Recommendation) -> Result<(), RepositoryError> {
        let key = &recommendation.key;
        sqlx::query(
            r#"
            INSERT INTO scout_recommendation (
                team_id, player_id, season, position, score, potential_score, reason
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(team_id, player_id, season) DO UPDATE SET
                position = excluded.position,
                score = excluded.score,
                potential_score = excluded.potential_score,
                reason = excluded.reason,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key.team_id.0)
        .bind(key.player_id.0)
        .bind(key.season.0)
        .bind(recommendation.position.code())
        .bind(recommendation.score)
        .bind(recommendation.potential_score)
        .bind(&recommendation.reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn select_narrative(
        &self,
        key: &RecommendationKey,
    ) -> Result<Option<String>, RepositoryError> {
        let narrative: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT narrative FROM scout_recommendation
            WHERE team_id = ? AND player_id = ? AND season = ?
            "#,
        )
        .bind(key.team_id.0)
        .bind(key.player_id.0)
        .bind(key.season.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(narrative.flatten())
    }

    async fn update_narrative(
        &self,
        key: &RecommendationKey,
        text: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE scout_recommendation
            SET narrative = ?, updated_at = CURRENT_TIMESTAMP
            WHERE team_id = ? AND player_id = ? AND season = ?
            "#,
        )
        .bind(text)
        .bind(key.team_id.0)
        .bind(key.player_id.0)
        .bind(key.season.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn select_for_team(
        &self,
        team_id: TeamId,
        season: Season,
        limit: u32,
    ) -> Result<Vec<RecommendationView>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT
                r.player_id,
                COALESCE(p.name, '') AS player_name,
                p.age,
                r.position,
                r.score,
                r.potential_score,
                r.reason,
                r.narrative
            FROM scout_recommendation r
            LEFT JOIN player p ON p.id = r.player_id
            WHERE r.team_id = ? AND r.season = ?
            ORDER BY r.score DESC, r.player_id ASC
            LIMIT ?
            "#,
        )
        .bind(team_id.0)
        .bind(season.0)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(view_from_row).collect()
    }
}

#[async_trait]
impl RecommendationStore for SqlRecommendationRepository {
    async fn upsert(&self, recommendation: &Recommendation) -> PortResult<()> {
        Ok(self.upsert_row(recommendation).await?)
    }

    async fn find_narrative(&self, key: &RecommendationKey) -> PortResult<Option<String>> {
        Ok(self.select_narrative(key).await?)
    }

    async fn store_narrative(&self, key: &RecommendationKey, text: &str) -> PortResult<()> {
        Ok(self.update_narrative(key, text).await?)
    }

    async fn list_for_team(
        &self,
        team_id: TeamId,
        season: Season,
        limit: u32,
    ) -> PortResult<Vec<RecommendationView>> {
        Ok(self.select_for_team(team_id, season, limit).await?)
    }
}

fn view_from_row(row: &SqliteRow) -> Result<RecommendationView, RepositoryError> {
    Ok(RecommendationView {
        player_id: PlayerId(row.try_get("player_id")?),
        player_name: row.try_get("player_name")?,
        age: optional_count_column(row, "age")?,
        position: row.try_get("position")?,
        score: row.try_get("score")?,
        potential_score: row.try_get("potential_score")?,
        reason: row.try_get("reason")?,
        narrative: row.try_get("narrative")?,
    })
}

#[cfg(test)]
mod tests {
    use scoutbook_core::domain::player::{PlayerId, Position, Season, TeamId};
    use scoutbook_core::domain::recommendation::{Recommendation, RecommendationKey};
    use scoutbook_core::ports::RecommendationStore;

    use super::SqlRecommendationRepository;
    use crate::{connect_with_settings, migrations, DbPool};

    type TestResult<T> = Result<T, String>;

    async fn setup_pool() -> TestResult<DbPool> {
        let pool = connect_with_settings("sqlite::memory:", 1, 30)
            .await
            .map_err(|error| format!("connect test pool: {error}"))?;
        migrations::run_pending(&pool).await.map_err(|error| format!("run migrations: {error}"))?;
        for (id, name, age) in [(7, "Tomas Brenner", Some(23)), (8, "Ari Lund", None)] {
            sqlx::query("INSERT INTO player (id, team_id, name, age, position) VALUES (?, 2, ?, ?, 'Attacker')")
                .bind(id)
                .bind(name)
                .bind(age)
                .execute(&pool)
                .await
                .map_err(|error| format!("insert player fixture: {error}"))?;
        }
        Ok(pool)
    }

    fn recommendation(player: i64, score: f64, reason: &str) -> Recommendation {
        Recommendation {
            key: RecommendationKey::new(TeamId(1), PlayerId(player), Season(2024)),
            position: Position::Attacker,
            score,
            potential_score: 20.0,
            reason: reason.to_string(),
            narrative: None,
        }
    }

    #[tokio::test]
    async fn upsert_keeps_existing_narrative() -> TestResult<()> {
        let repo = SqlRecommendationRepository::new(setup_pool().await?);
        let first = recommendation(7, 40.0, "finishing");
        repo.upsert(&first).await.map_err(|error| format!("upsert: {error}"))?;
        repo.store_narrative(&first.key, "Sharp in the box.")
            .await
            .map_err(|error| format!("store narrative: {error}"))?;

        repo.upsert(&recommendation(7, 55.5, "finishing, link-up play"))
            .await
            .map_err(|error| format!("second upsert: {error}"))?;

        let narrative = repo
            .find_narrative(&first.key)
            .await
            .map_err(|error| format!("find narrative: {error}"))?;
        if narrative.as_deref() != Some("Sharp in the box.") {
            return Err(format!("narrative should survive the upsert: {narrative:?}"));
        }

        let views = repo
            .list_for_team(TeamId(1), Season(2024), 10)
            .await
            .map_err(|error| format!("list: {error}"))?;
        match views.as_slice() {
            [view] if view.score == 55.5 && view.reason == "finishing, link-up play" => Ok(()),
            other => Err(format!("expected a single overwritten row, got {other:?}")),
        }
    }

    #[tokio::test]
    async fn missing_narrative_reads_as_none() -> TestResult<()> {
        let repo = SqlRecommendationRepository::new(setup_pool().await?);
        let row = recommendation(7, 40.0, "finishing");
        repo.upsert(&row).await.map_err(|error| format!("upsert: {error}"))?;

        let stored = repo.find_narrative(&row.key).await.map_err(|error| format!("{error}"))?;
        let absent = repo
            .find_narrative(&RecommendationKey::new(TeamId(1), PlayerId(8), Season(2024)))
            .await
            .map_err(|error| format!("{error}"))?;
        if stored.is_some() || absent.is_some() {
            return Err("no narrative should be present".to_string());
        }
        Ok(())
    }

    #[tokio::test]
    async fn view_orders_by_score_and_joins_player() -> TestResult<()> {
        let repo = SqlRecommendationRepository::new(setup_pool().await?);
        repo.upsert(&recommendation(7, 31.0, "finishing")).await.map_err(|e| e.to_string())?;
        repo.upsert(&recommendation(8, 64.0, "balanced player")).await.map_err(|e| e.to_string())?;

        let views =
            repo.list_for_team(TeamId(1), Season(2024), 10).await.map_err(|e| e.to_string())?;
        if views.len() != 2 || views[0].player_id != PlayerId(8) {
            return Err(format!("expected best score first: {views:?}"));
        }
        if views[0].age.is_some() || views[1].age != Some(23) {
            return Err("ages should come from the player join".to_string());
        }
        if views[1].player_name != "Tomas Brenner" || views[1].position != "FW" {
            return Err(format!("unexpected joined row: {:?}", views[1]));
        }

        let limited =
            repo.list_for_team(TeamId(1), Season(2024), 1).await.map_err(|e| e.to_string())?;
        if limited.len() != 1 {
            return Err("limit should cap the view".to_string());
        }
        Ok(())
    }
}
