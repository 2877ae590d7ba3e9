use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{CompetitionStore, FixtureStore, StoreError, StoreResult};
use crate::models::competition::{
    BracketSlotAssignment, Competition, CompetitionStatus, CompetitionType, NewCompetition, Team,
};
use crate::models::fixture::{
    Fixture, InsertOutcome, NewFixture, ResultSubmission, SubmissionStatus, TieResolution,
};

const FIXTURE_COLUMNS: &str = r#"
    id, competition_id, round, slot_number, leg, home_team_id, away_team_id,
    home_score, away_score, approved, scheduled_for, created_at, updated_at
"#;

/// PostgreSQL implementation of both store traits.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// Insert one fixture, falling back to the canonical row when another writer
/// already holds the key.
async fn insert_fixture_row(
    conn: &mut PgConnection,
    fixture: &NewFixture,
) -> Result<InsertOutcome, sqlx::Error> {
    let inserted = sqlx::query_as::<_, Fixture>(&format!(
        r#"
        INSERT INTO fixtures (
            id, competition_id, round, slot_number, leg,
            home_team_id, away_team_id, scheduled_for
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (competition_id, round, slot_number, leg) DO NOTHING
        RETURNING {}
        "#,
        FIXTURE_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(fixture.competition_id)
    .bind(fixture.round)
    .bind(fixture.slot_number)
    .bind(fixture.leg)
    .bind(fixture.home_team_id)
    .bind(fixture.away_team_id)
    .bind(fixture.scheduled_for)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = inserted {
        return Ok(InsertOutcome::Inserted(row));
    }

    tracing::debug!("Fixture {} already exists, re-reading canonical row", fixture.key());

    let existing = sqlx::query_as::<_, Fixture>(&format!(
        r#"
        SELECT {}
        FROM fixtures
        WHERE competition_id = $1 AND round = $2 AND slot_number = $3 AND leg = $4
        "#,
        FIXTURE_COLUMNS
    ))
    .bind(fixture.competition_id)
    .bind(fixture.round)
    .bind(fixture.slot_number)
    .bind(fixture.leg)
    .fetch_one(&mut *conn)
    .await?;

    Ok(InsertOutcome::AlreadyExists(existing))
}

#[async_trait]
impl FixtureStore for PgStore {
    async fn list_fixtures(&self, competition_id: Uuid) -> StoreResult<Vec<Fixture>> {
        let fixtures = sqlx::query_as::<_, Fixture>(&format!(
            r#"
            SELECT {}
            FROM fixtures
            WHERE competition_id = $1
            ORDER BY round ASC, slot_number ASC, leg ASC
            "#,
            FIXTURE_COLUMNS
        ))
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(fixtures)
    }

    async fn get_fixture(&self, fixture_id: Uuid) -> StoreResult<Option<Fixture>> {
        let fixture = sqlx::query_as::<_, Fixture>(&format!(
            "SELECT {} FROM fixtures WHERE id = $1",
            FIXTURE_COLUMNS
        ))
        .bind(fixture_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fixture)
    }

    async fn insert_fixture(&self, fixture: NewFixture) -> StoreResult<InsertOutcome> {
        let mut conn = self.pool.acquire().await?;
        Ok(insert_fixture_row(&mut conn, &fixture).await?)
    }

    async fn insert_fixtures(&self, fixtures: Vec<NewFixture>) -> StoreResult<Vec<InsertOutcome>> {
        let mut tx = self.pool.begin().await?;
        let mut outcomes = Vec::with_capacity(fixtures.len());

        for fixture in &fixtures {
            outcomes.push(insert_fixture_row(&mut tx, fixture).await?);
        }

        tx.commit().await?;
        Ok(outcomes)
    }

    async fn update_approval(
        &self,
        fixture_id: Uuid,
        home_score: i32,
        away_score: i32,
        approved: bool,
    ) -> StoreResult<Fixture> {
        let updated = sqlx::query_as::<_, Fixture>(&format!(
            r#"
            UPDATE fixtures
            SET home_score = $2,
                away_score = $3,
                approved = $4,
                updated_at = NOW()
            WHERE id = $1 AND approved = FALSE
            RETURNING {}
            "#,
            FIXTURE_COLUMNS
        ))
        .bind(fixture_id)
        .bind(home_score)
        .bind(away_score)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(fixture) = updated {
            return Ok(fixture);
        }

        match self.get_fixture(fixture_id).await? {
            Some(_) => Err(StoreError::Conflict(format!(
                "Fixture {} is already approved",
                fixture_id
            ))),
            None => Err(StoreError::NotFound(format!("Fixture {}", fixture_id))),
        }
    }

    async fn reschedule_fixture(
        &self,
        fixture_id: Uuid,
        scheduled_for: DateTime<Utc>,
    ) -> StoreResult<Fixture> {
        sqlx::query_as::<_, Fixture>(&format!(
            r#"
            UPDATE fixtures
            SET scheduled_for = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FIXTURE_COLUMNS
        ))
        .bind(fixture_id)
        .bind(scheduled_for)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Fixture {}", fixture_id)))
    }

    async fn delete_fixture(&self, fixture_id: Uuid) -> StoreResult<()> {
        let deleted = sqlx::query("DELETE FROM fixtures WHERE id = $1 AND approved = FALSE")
            .bind(fixture_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted > 0 {
            return Ok(());
        }

        match self.get_fixture(fixture_id).await? {
            Some(_) => Err(StoreError::Conflict(format!(
                "Fixture {} is approved and cannot be deleted",
                fixture_id
            ))),
            None => Err(StoreError::NotFound(format!("Fixture {}", fixture_id))),
        }
    }

    async fn upsert_result_submission(
        &self,
        fixture_id: Uuid,
        team_id: Uuid,
        home_score: i32,
        away_score: i32,
    ) -> StoreResult<ResultSubmission> {
        sqlx::query_as::<_, ResultSubmission>(
            r#"
            INSERT INTO match_results (id, fixture_id, team_id, home_score, away_score, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            ON CONFLICT (fixture_id, team_id) DO UPDATE
            SET home_score = EXCLUDED.home_score,
                away_score = EXCLUDED.away_score,
                status = 'pending',
                updated_at = NOW()
            RETURNING id, fixture_id, team_id, home_score, away_score, status, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fixture_id)
        .bind(team_id)
        .bind(home_score)
        .bind(away_score)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::NotFound(format!("Fixture {}", fixture_id))
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn list_result_submissions(&self, fixture_id: Uuid) -> StoreResult<Vec<ResultSubmission>> {
        let submissions = sqlx::query_as::<_, ResultSubmission>(
            r#"
            SELECT id, fixture_id, team_id, home_score, away_score, status, created_at, updated_at
            FROM match_results
            WHERE fixture_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(fixture_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }

    async fn set_result_submissions_status(
        &self,
        fixture_id: Uuid,
        status: SubmissionStatus,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE match_results SET status = $2, updated_at = NOW() WHERE fixture_id = $1",
        )
        .bind(fixture_id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn record_tie_resolution(&self, resolution: TieResolution) -> StoreResult<TieResolution> {
        sqlx::query_as::<_, TieResolution>(
            r#"
            INSERT INTO tie_resolutions (competition_id, round, slot_number, winner_team_id, resolved_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (competition_id, round, slot_number) DO UPDATE
            SET winner_team_id = EXCLUDED.winner_team_id,
                resolved_by = EXCLUDED.resolved_by,
                created_at = EXCLUDED.created_at
            RETURNING competition_id, round, slot_number, winner_team_id, resolved_by, created_at
            "#,
        )
        .bind(resolution.competition_id)
        .bind(resolution.round)
        .bind(resolution.slot_number)
        .bind(resolution.winner_team_id)
        .bind(&resolution.resolved_by)
        .bind(resolution.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn list_tie_resolutions(&self, competition_id: Uuid) -> StoreResult<Vec<TieResolution>> {
        let resolutions = sqlx::query_as::<_, TieResolution>(
            r#"
            SELECT competition_id, round, slot_number, winner_team_id, resolved_by, created_at
            FROM tie_resolutions
            WHERE competition_id = $1
            "#,
        )
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(resolutions)
    }
}

#[async_trait]
impl CompetitionStore for PgStore {
    async fn create_competition(&self, competition: NewCompetition) -> StoreResult<Competition> {
        let row = sqlx::query_as::<_, Competition>(
            r#"
            INSERT INTO competitions (id, name, competition_type, team_count, status)
            VALUES ($1, $2, $3, $4, 'active')
            RETURNING id, name, competition_type, team_count, status, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&competition.name)
        .bind(competition.competition_type)
        .bind(competition.team_count)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_competition(&self, competition_id: Uuid) -> StoreResult<Option<Competition>> {
        let row = sqlx::query_as::<_, Competition>(
            r#"
            SELECT id, name, competition_type, team_count, status, created_at, updated_at
            FROM competitions
            WHERE id = $1
            "#,
        )
        .bind(competition_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_competitions(&self) -> StoreResult<Vec<Competition>> {
        let rows = sqlx::query_as::<_, Competition>(
            r#"
            SELECT id, name, competition_type, team_count, status, created_at, updated_at
            FROM competitions
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_active_competitions(
        &self,
        competition_type: CompetitionType,
    ) -> StoreResult<Vec<Competition>> {
        let rows = sqlx::query_as::<_, Competition>(
            r#"
            SELECT id, name, competition_type, team_count, status, created_at, updated_at
            FROM competitions
            WHERE competition_type = $1 AND status = 'active'
            ORDER BY created_at ASC
            "#,
        )
        .bind(competition_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn set_competition_status(
        &self,
        competition_id: Uuid,
        status: CompetitionStatus,
    ) -> StoreResult<()> {
        let updated = sqlx::query(
            "UPDATE competitions SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(competition_id)
        .bind(status)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(StoreError::NotFound(format!("Competition {}", competition_id)));
        }
        Ok(())
    }

    async fn create_team(&self, name: String) -> StoreResult<Team> {
        sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict(format!("Team name '{}' is already taken", name))
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn get_team(&self, team_id: Uuid) -> StoreResult<Option<Team>> {
        let team = sqlx::query_as::<_, Team>("SELECT id, name, created_at FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(team)
    }

    async fn list_teams(&self) -> StoreResult<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>("SELECT id, name, created_at FROM teams ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(teams)
    }

    async fn add_competition_team(&self, competition_id: Uuid, team_id: Uuid) -> StoreResult<()> {
        sqlx::query("INSERT INTO competition_teams (competition_id, team_id) VALUES ($1, $2)")
            .bind(competition_id)
            .bind(team_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict(format!(
                        "Team {} is already registered in competition {}",
                        team_id, competition_id
                    ))
                } else if is_foreign_key_violation(&e) {
                    StoreError::NotFound(format!("Competition {} or team {}", competition_id, team_id))
                } else {
                    StoreError::Database(e)
                }
            })?;

        Ok(())
    }

    async fn list_competition_teams(&self, competition_id: Uuid) -> StoreResult<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.id, t.name, t.created_at
            FROM teams t
            JOIN competition_teams ct ON ct.team_id = t.id
            WHERE ct.competition_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(teams)
    }

    async fn save_bracket_slots(
        &self,
        competition_id: Uuid,
        slots: Vec<BracketSlotAssignment>,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM bracket_slots WHERE competition_id = $1")
            .bind(competition_id)
            .execute(&mut *tx)
            .await?;

        for slot in &slots {
            sqlx::query(
                "INSERT INTO bracket_slots (competition_id, position, team_id) VALUES ($1, $2, $3)",
            )
            .bind(competition_id)
            .bind(slot.position)
            .bind(slot.team_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!("Saved {} bracket slots for competition {}", slots.len(), competition_id);
        Ok(())
    }

    async fn list_bracket_slots(&self, competition_id: Uuid) -> StoreResult<Vec<BracketSlotAssignment>> {
        let slots = sqlx::query_as::<_, BracketSlotAssignment>(
            r#"
            SELECT competition_id, position, team_id
            FROM bracket_slots
            WHERE competition_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }
}
