//! Postgres `JobStore` adapter.
//!
//! Queries are bound at runtime; the compare-and-swap is the classic
//! conditional update, with the row count telling the winner from the loser.

use crate::error::{BookingError, Result};
use crate::models::{
    Gender, Job, JobType, QualificationTag, SessionTime, TranslatorAssignment, TranslatorProfile,
    TranslatorType,
};
use crate::state_machine::states::JobStatus;
use crate::store::JobStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_column<T>(value: &str, column: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| BookingError::DatabaseError(format!("bad value in column {column}: {e}")))
}

fn job_from_row(row: &PgRow) -> Result<Job> {
    let status: String = row.try_get("status")?;
    let job_type: String = row.try_get("job_type")?;
    let gender: Option<String> = row.try_get("gender")?;
    let certified: Option<String> = row.try_get("certified")?;
    let session_time: Option<String> = row.try_get("session_time")?;

    Ok(Job {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        status: parse_column::<JobStatus>(&status, "status")?,
        due: row.try_get("due")?,
        immediate: row.try_get("immediate")?,
        job_type: parse_column::<JobType>(&job_type, "job_type")?,
        from_language_id: row.try_get("from_language_id")?,
        gender: gender
            .map(|g| parse_column::<Gender>(&g, "gender"))
            .transpose()?,
        certified: certified
            .map(|c| parse_column(&c, "certified"))
            .transpose()?,
        customer_phone_type: row.try_get("customer_phone_type")?,
        customer_physical_type: row.try_get("customer_physical_type")?,
        town: row.try_get("town")?,
        duration_minutes: row.try_get("duration_minutes")?,
        session_time: session_time
            .map(|s| parse_column::<SessionTime>(&s, "session_time"))
            .transpose()?,
        admin_comments: row.try_get("admin_comments")?,
        will_expire_at: row.try_get("will_expire_at")?,
        end_at: row.try_get("end_at")?,
        withdraw_at: row.try_get("withdraw_at")?,
        created_at: row.try_get("created_at")?,
        customer_email: row.try_get("customer_email")?,
        customer_name: row.try_get("customer_name")?,
    })
}

fn assignment_from_row(row: &PgRow) -> Result<TranslatorAssignment> {
    Ok(TranslatorAssignment {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        translator_id: row.try_get("translator_id")?,
        created_at: row.try_get("created_at")?,
        completed_at: row.try_get("completed_at")?,
        cancel_at: row.try_get("cancel_at")?,
        completed_by: row.try_get("completed_by")?,
    })
}

fn profile_from_row(row: &PgRow) -> Result<TranslatorProfile> {
    let translator_type: String = row.try_get("translator_type")?;
    let gender: Option<String> = row.try_get("gender")?;
    let qualifications: Vec<String> = row.try_get("qualifications")?;

    let qualifications = qualifications
        .iter()
        .map(|q| parse_column::<QualificationTag>(q, "qualifications"))
        .collect::<Result<Vec<_>>>()?;

    Ok(TranslatorProfile {
        translator_id: row.try_get("translator_id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        mobile: row.try_get("mobile")?,
        translator_type: parse_column::<TranslatorType>(&translator_type, "translator_type")?,
        languages: row.try_get("languages")?,
        gender: gender
            .map(|g| parse_column::<Gender>(&g, "gender"))
            .transpose()?,
        city: row.try_get("city")?,
        qualifications,
        not_get_emergency: row.try_get("not_get_emergency")?,
        not_get_nighttime: row.try_get("not_get_nighttime")?,
        not_get_notification: row.try_get("not_get_notification")?,
        is_active: row.try_get("is_active")?,
    })
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn load_job(&self, id: Uuid) -> Result<Job> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => job_from_row(&row),
            None => Err(BookingError::NotFound(format!("job {id}"))),
        }
    }

    async fn save_job(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, customer_id, status, due, immediate, job_type,
                from_language_id, gender, certified, customer_phone_type,
                customer_physical_type, town, duration_minutes, session_time,
                admin_comments, will_expire_at, end_at, withdraw_at,
                created_at, customer_email, customer_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                due = EXCLUDED.due,
                immediate = EXCLUDED.immediate,
                job_type = EXCLUDED.job_type,
                from_language_id = EXCLUDED.from_language_id,
                gender = EXCLUDED.gender,
                certified = EXCLUDED.certified,
                customer_phone_type = EXCLUDED.customer_phone_type,
                customer_physical_type = EXCLUDED.customer_physical_type,
                town = EXCLUDED.town,
                duration_minutes = EXCLUDED.duration_minutes,
                session_time = EXCLUDED.session_time,
                admin_comments = EXCLUDED.admin_comments,
                will_expire_at = EXCLUDED.will_expire_at,
                end_at = EXCLUDED.end_at,
                withdraw_at = EXCLUDED.withdraw_at,
                created_at = EXCLUDED.created_at,
                customer_email = EXCLUDED.customer_email,
                customer_name = EXCLUDED.customer_name
            "#,
        )
        .bind(job.id)
        .bind(job.customer_id)
        .bind(job.status.to_string())
        .bind(job.due)
        .bind(job.immediate)
        .bind(job.job_type.to_string())
        .bind(job.from_language_id)
        .bind(job.gender.map(|g| g.to_string()))
        .bind(job.certified.map(|c| c.to_string()))
        .bind(job.customer_phone_type)
        .bind(job.customer_physical_type)
        .bind(job.town.clone())
        .bind(job.duration_minutes)
        .bind(job.session_time.map(|s| s.to_string()))
        .bind(job.admin_comments.clone())
        .bind(job.will_expire_at)
        .bind(job.end_at)
        .bind(job.withdraw_at)
        .bind(job.created_at)
        .bind(job.customer_email.clone())
        .bind(job.customer_name.clone())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn atomic_status_update(
        &self,
        id: Uuid,
        expected: JobStatus,
        new: JobStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE jobs SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(expected.to_string())
            .bind(new.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_assignment(&self, assignment: &TranslatorAssignment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO translator_assignments
                (id, job_id, translator_id, created_at, completed_at, cancel_at, completed_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.job_id)
        .bind(assignment.translator_id)
        .bind(assignment.created_at)
        .bind(assignment.completed_at)
        .bind(assignment.cancel_at)
        .bind(assignment.completed_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_assignment(&self, assignment: &TranslatorAssignment) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE translator_assignments
            SET completed_at = $2, cancel_at = $3, completed_by = $4
            WHERE id = $1
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.completed_at)
        .bind(assignment.cancel_at)
        .bind(assignment.completed_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn active_assignment(&self, job_id: Uuid) -> Result<Option<TranslatorAssignment>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM translator_assignments
            WHERE job_id = $1 AND completed_at IS NULL AND cancel_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| assignment_from_row(&row)).transpose()
    }

    async fn assignments_for_job(&self, job_id: Uuid) -> Result<Vec<TranslatorAssignment>> {
        let rows =
            sqlx::query("SELECT * FROM translator_assignments WHERE job_id = $1 ORDER BY created_at")
                .bind(job_id)
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(assignment_from_row).collect()
    }

    async fn active_assignments_for_translator(
        &self,
        translator_id: Uuid,
    ) -> Result<Vec<TranslatorAssignment>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM translator_assignments
            WHERE translator_id = $1 AND completed_at IS NULL AND cancel_at IS NULL
            "#,
        )
        .bind(translator_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(assignment_from_row).collect()
    }

    async fn cancel_active_assignments(&self, job_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE translator_assignments
            SET cancel_at = $2
            WHERE job_id = $1 AND completed_at IS NULL AND cancel_at IS NULL
            "#,
        )
        .bind(job_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn translator_profile(&self, translator_id: Uuid) -> Result<Option<TranslatorProfile>> {
        let row = sqlx::query("SELECT * FROM translator_profiles WHERE translator_id = $1")
            .bind(translator_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| profile_from_row(&row)).transpose()
    }

    async fn active_translators(&self) -> Result<Vec<TranslatorProfile>> {
        let rows = sqlx::query("SELECT * FROM translator_profiles WHERE is_active")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(profile_from_row).collect()
    }

    async fn blacklisted_translators(&self, customer_id: Uuid) -> Result<HashSet<Uuid>> {
        let rows = sqlx::query("SELECT translator_id FROM blacklist WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get("translator_id").map_err(BookingError::from))
            .collect()
    }

    async fn language_name(&self, language_id: i32) -> Result<Option<String>> {
        let row = sqlx::query("SELECT language FROM languages WHERE id = $1")
            .bind(language_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row.try_get("language").map_err(BookingError::from))
            .transpose()
    }
}
