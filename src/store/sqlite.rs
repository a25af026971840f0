use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use super::{OccurrenceStore, ProfileDirectory};
use crate::error::{EscolaFlowError, Result};
use crate::lifecycle::{
    policy, Action, ActionType, Occurrence, OccurrenceFilter, OccurrenceStatus, Profile, Role,
    RosterEntity, SchoolClass, StatusChange, Student,
};

const OCCURRENCE_COLUMNS: &str = "id, student_id, author_id, tutor_id, description_original, \
     description_formal, status, created_at, updated_at";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates or upgrades the schema.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, full_name, role, whatsapp_number, email, active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.full_name)
        .bind(profile.role.as_str())
        .bind(&profile.whatsapp_number)
        .bind(&profile.email)
        .bind(profile.active)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_class(&self, class: &SchoolClass) -> Result<()> {
        sqlx::query("INSERT INTO classes (id, name, year, active) VALUES (?1, ?2, ?3, ?4)")
            .bind(class.id)
            .bind(&class.name)
            .bind(class.year)
            .bind(class.active)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_student(&self, student: &Student) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO students (id, name, registration, class_id, tutor_id, guardian_phone, active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(student.id)
        .bind(&student.name)
        .bind(&student.registration)
        .bind(student.class_id)
        .bind(student.tutor_id)
        .bind(&student.guardian_phone)
        .bind(student.active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn roster_table(entity: RosterEntity) -> &'static str {
    match entity {
        RosterEntity::Profile => "profiles",
        RosterEntity::Class => "classes",
        RosterEntity::Student => "students",
    }
}

fn parse_status(value: &str) -> Result<OccurrenceStatus> {
    value.parse().map_err(EscolaFlowError::Corrupt)
}

fn occurrence_from_row(row: &SqliteRow) -> Result<Occurrence> {
    let status: String = row.try_get("status")?;
    Ok(Occurrence {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        author_id: row.try_get("author_id")?,
        tutor_id: row.try_get("tutor_id")?,
        description_original: row.try_get("description_original")?,
        description_formal: row.try_get("description_formal")?,
        status: parse_status(&status)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn action_from_row(row: &SqliteRow) -> Result<Action> {
    let action_type: String = row.try_get("action_type")?;
    Ok(Action {
        id: row.try_get("id")?,
        occurrence_id: row.try_get("occurrence_id")?,
        author_id: row.try_get("author_id")?,
        action_type: action_type
            .parse::<ActionType>()
            .map_err(EscolaFlowError::Corrupt)?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

fn profile_from_row(row: &SqliteRow) -> Result<Profile> {
    let role: String = row.try_get("role")?;
    Ok(Profile {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        role: role.parse::<Role>().map_err(EscolaFlowError::Corrupt)?,
        whatsapp_number: row.try_get("whatsapp_number")?,
        email: row.try_get("email")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
    })
}

impl ProfileDirectory for SqliteStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT * FROM profiles WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(profile_from_row).transpose()
    }

    async fn list_vice_directors(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query(
            "SELECT * FROM profiles WHERE role = ?1 AND active = 1 ORDER BY full_name",
        )
        .bind(Role::ViceDirector.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(profile_from_row).collect()
    }
}

impl OccurrenceStore for SqliteStore {
    async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
        let row = sqlx::query("SELECT * FROM students WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(Student {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            registration: row.try_get("registration")?,
            class_id: row.try_get("class_id")?,
            tutor_id: row.try_get("tutor_id")?,
            guardian_phone: row.try_get("guardian_phone")?,
            active: row.try_get("active")?,
        }))
    }

    async fn get_occurrence(&self, id: Uuid) -> Result<Option<Occurrence>> {
        let row = sqlx::query(&format!(
            "SELECT {OCCURRENCE_COLUMNS} FROM occurrences WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(occurrence_from_row).transpose()
    }

    async fn insert_occurrence(&self, occurrence: &Occurrence) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO occurrences ({OCCURRENCE_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ))
        .bind(occurrence.id)
        .bind(occurrence.student_id)
        .bind(occurrence.author_id)
        .bind(occurrence.tutor_id)
        .bind(&occurrence.description_original)
        .bind(&occurrence.description_formal)
        .bind(occurrence.status.as_str())
        .bind(occurrence.created_at)
        .bind(occurrence.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn apply_transition(&self, change: &StatusChange) -> Result<Occurrence> {
        let action_type = change.action.action_type;
        if policy::edge(change.from, action_type) != Some(change.to) {
            return Err(EscolaFlowError::InvalidTransition {
                from: change.from,
                action: action_type,
            });
        }

        let mut tx = self.pool.begin().await?;

        // Conditional on the status the decision was made against.
        let updated = sqlx::query(
            "UPDATE occurrences SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        )
        .bind(change.to.as_str())
        .bind(Utc::now())
        .bind(change.occurrence_id)
        .bind(change.from.as_str())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM occurrences WHERE id = ?1")
                    .bind(change.occurrence_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;
            debug!(occurrence_id = %change.occurrence_id, ?current, "status moved underneath transition");
            return match current {
                Some(status) => Err(EscolaFlowError::InvalidTransition {
                    from: parse_status(&status)?,
                    action: action_type,
                }),
                None => Err(EscolaFlowError::not_found("occurrence", change.occurrence_id)),
            };
        }

        sqlx::query(
            r#"
            INSERT INTO actions (id, occurrence_id, author_id, action_type, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(change.action.id)
        .bind(change.action.occurrence_id)
        .bind(change.action.author_id)
        .bind(action_type.as_str())
        .bind(&change.action.description)
        .bind(change.action.created_at)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(&format!(
            "SELECT {OCCURRENCE_COLUMNS} FROM occurrences WHERE id = ?1"
        ))
        .bind(change.occurrence_id)
        .fetch_one(&mut *tx)
        .await?;
        let occurrence = occurrence_from_row(&row)?;

        tx.commit().await?;
        Ok(occurrence)
    }

    async fn list_actions(&self, occurrence_id: Uuid) -> Result<Vec<Action>> {
        let rows = sqlx::query(
            "SELECT * FROM actions WHERE occurrence_id = ?1 ORDER BY created_at, rowid",
        )
        .bind(occurrence_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(action_from_row).collect()
    }

    async fn list_occurrences(&self, filter: &OccurrenceFilter) -> Result<Vec<Occurrence>> {
        let rows = sqlx::query(&format!(
            "SELECT {OCCURRENCE_COLUMNS} FROM occurrences \
             WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR student_id = ?2) \
             ORDER BY created_at DESC"
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.student_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(occurrence_from_row).collect()
    }

    async fn delete_occurrence(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM actions WHERE occurrence_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM occurrences WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(deleted.rows_affected() > 0)
    }

    async fn set_student_tutor(&self, student_id: Uuid, tutor_id: Option<Uuid>) -> Result<bool> {
        let updated = sqlx::query("UPDATE students SET tutor_id = ?1 WHERE id = ?2")
            .bind(tutor_id)
            .bind(student_id)
            .execute(&self.pool)
            .await?;
        Ok(updated.rows_affected() > 0)
    }

    async fn set_active(&self, entity: RosterEntity, id: Uuid, active: bool) -> Result<bool> {
        let updated = sqlx::query(&format!(
            "UPDATE {} SET active = ?1 WHERE id = ?2",
            roster_table(entity)
        ))
        .bind(active)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(updated.rows_affected() > 0)
    }
}
