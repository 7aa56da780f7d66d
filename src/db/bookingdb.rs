// db/bookingdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Error, Postgres, QueryBuilder};
use uuid::Uuid;

use super::db::DBClient;
use super::userdb::UserExt;
use crate::{
    dtos::bookingdtos::JobFilterDto,
    models::{
        bookingmodel::*,
        usermodel::{TranslatorCandidate, TranslatorCategory, TranslatorLevel},
    },
    utils::time::{parse_filter_from, parse_filter_to},
};

// Outcome of the atomic accept. The caller turns AlreadyBooked/NotPending into
// user-facing conflict messages; nothing has been written in those cases.
#[derive(Debug)]
pub enum AcceptOutcome {
    Accepted(Job),
    AlreadyBooked(Job),
    NotPending(Job),
    NotFound,
}

#[async_trait]
pub trait BookingExt {
    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    async fn insert_job(&self, new_job: &NewJob) -> Result<Job, Error>;

    async fn update_job_row(&self, job: &Job) -> Result<Job, Error>;

    async fn reopen_job_in_place(
        &self,
        job_id: Uuid,
        now: DateTime<Utc>,
        will_expire_at: Option<DateTime<Utc>>,
    ) -> Result<Job, Error>;

    async fn accept_job_atomic(
        &self,
        job_id: Uuid,
        translator_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AcceptOutcome, Error>;

    //Assignment ledger
    async fn active_assignment_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Option<TranslatorAssignment>, Error>;

    async fn latest_completed_assignment_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Option<TranslatorAssignment>, Error>;

    async fn create_or_replace_assignment(
        &self,
        replaced: Option<Uuid>,
        translator_id: Uuid,
        job_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TranslatorAssignment, Error>;

    async fn close_assignment(
        &self,
        assignment_id: Uuid,
        completed_at: DateTime<Utc>,
        completed_by: Uuid,
    ) -> Result<TranslatorAssignment, Error>;

    async fn delete_assignment(&self, assignment_id: Uuid) -> Result<(), Error>;

    async fn cancel_open_assignments_for_job(
        &self,
        job_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, Error>;

    //Matching queries
    async fn pending_jobs_for_translator(
        &self,
        job_type: JobType,
        language_ids: &[Uuid],
        gender: Option<Gender>,
        acceptable_certified: &[CertifiedRequirement],
        now: DateTime<Utc>,
    ) -> Result<Vec<Job>, Error>;

    async fn eligible_translator_candidates(
        &self,
        required_category: TranslatorCategory,
        language_id: Uuid,
        gender: Option<Gender>,
        levels: &[TranslatorLevel],
        blacklist: &[Uuid],
    ) -> Result<Vec<TranslatorCandidate>, Error>;

    //Operator list / filter layer
    async fn list_jobs(
        &self,
        filter: &JobFilterDto,
        restrict_job_type: Option<JobType>,
    ) -> Result<Vec<Job>, Error>;

    async fn jobs_for_customer_active(&self, user_id: Uuid) -> Result<Vec<Job>, Error>;

    async fn jobs_for_customer_history(
        &self,
        user_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Job>, Error>;

    async fn jobs_for_translator_active(&self, user_id: Uuid) -> Result<Vec<Job>, Error>;

    async fn jobs_for_translator_history(
        &self,
        user_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Job>, Error>;

    async fn session_alert_candidates(&self) -> Result<Vec<Job>, Error>;

    async fn expired_pending_jobs(&self, now: DateTime<Utc>) -> Result<Vec<Job>, Error>;

    async fn set_ignore_expiring(&self, job_id: Uuid) -> Result<(), Error>;

    async fn set_ignore_expired(&self, job_id: Uuid) -> Result<(), Error>;

    async fn set_ignore_feedback(&self, job_id: Uuid) -> Result<(), Error>;

    //Distance feed
    async fn upsert_job_distance(
        &self,
        job_id: Uuid,
        distance: Option<String>,
        travel_time: Option<String>,
    ) -> Result<(), Error>;

    async fn update_job_feed_flags(
        &self,
        job_id: Uuid,
        admin_comments: Option<String>,
        session_time: Option<String>,
        flagged: bool,
        manually_handled: bool,
        by_admin: bool,
    ) -> Result<Job, Error>;
}

#[async_trait]
impl BookingExt for DBClient {
    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn insert_job(&self, new_job: &NewJob) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
            (id, user_id, user_email, from_language_id, immediate, due, duration,
             gender, certified, job_type, customer_phone_type, customer_physical_type,
             town, address, instructions, reference, admin_comments, status,
             specific_translator_id, will_expire_at, by_admin, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_job.user_id)
        .bind(&new_job.user_email)
        .bind(new_job.from_language_id)
        .bind(new_job.immediate)
        .bind(new_job.due)
        .bind(new_job.duration)
        .bind(new_job.gender)
        .bind(new_job.certified)
        .bind(new_job.job_type)
        .bind(new_job.customer_phone_type)
        .bind(new_job.customer_physical_type)
        .bind(&new_job.town)
        .bind(&new_job.address)
        .bind(&new_job.instructions)
        .bind(&new_job.reference)
        .bind(&new_job.admin_comments)
        .bind(new_job.status)
        .bind(new_job.specific_translator_id)
        .bind(new_job.will_expire_at)
        .bind(new_job.by_admin)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_job_row(&self, job: &Job) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET
                user_email = $2,
                from_language_id = $3,
                immediate = $4,
                due = $5,
                duration = $6,
                session_time = $7,
                gender = $8,
                certified = $9,
                job_type = $10,
                customer_phone_type = $11,
                customer_physical_type = $12,
                town = $13,
                address = $14,
                instructions = $15,
                reference = $16,
                admin_comments = $17,
                status = $18,
                specific_translator_id = $19,
                withdraw_at = $20,
                end_at = $21,
                will_expire_at = $22,
                ignore_flag = $23,
                ignore_expired = $24,
                ignore_feedback = $25,
                flagged = $26,
                manually_handled = $27,
                by_admin = $28,
                reminder_16h_sent = $29,
                reminder_48h_sent = $30,
                created_at = $31,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(&job.user_email)
        .bind(job.from_language_id)
        .bind(job.immediate)
        .bind(job.due)
        .bind(job.duration)
        .bind(&job.session_time)
        .bind(job.gender)
        .bind(job.certified)
        .bind(job.job_type)
        .bind(job.customer_phone_type)
        .bind(job.customer_physical_type)
        .bind(&job.town)
        .bind(&job.address)
        .bind(&job.instructions)
        .bind(&job.reference)
        .bind(&job.admin_comments)
        .bind(job.status)
        .bind(job.specific_translator_id)
        .bind(job.withdraw_at)
        .bind(job.end_at)
        .bind(job.will_expire_at)
        .bind(job.ignore_flag)
        .bind(job.ignore_expired)
        .bind(job.ignore_feedback)
        .bind(job.flagged)
        .bind(job.manually_handled)
        .bind(job.by_admin)
        .bind(job.reminder_16h_sent)
        .bind(job.reminder_48h_sent)
        .bind(job.created_at)
        .fetch_one(&self.pool)
        .await
    }

    async fn reopen_job_in_place(
        &self,
        job_id: Uuid,
        now: DateTime<Utc>,
        will_expire_at: Option<DateTime<Utc>>,
    ) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET
                status = 'pending',
                created_at = $2,
                will_expire_at = $3,
                reminder_16h_sent = false,
                reminder_48h_sent = false,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(now)
        .bind(will_expire_at)
        .fetch_one(&self.pool)
        .await
    }

    // Check "not already booked at this due time" + "status is pending" and
    // insert the ledger row as one atomic unit; two concurrent accepts for the
    // same job must not both succeed.
    async fn accept_job_atomic(
        &self,
        job_id: Uuid,
        translator_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AcceptOutcome, Error> {
        let mut tx = self.pool.begin().await?;

        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1 FOR UPDATE")
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await?;

        let job = match job {
            Some(job) => job,
            None => return Ok(AcceptOutcome::NotFound),
        };

        if job.status != JobStatus::Pending {
            tx.rollback().await?;
            return Ok(AcceptOutcome::NotPending(job));
        }

        let (already_booked,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM translator_assignments ta
                JOIN jobs j ON j.id = ta.job_id
                WHERE ta.user_id = $1
                  AND ta.cancel_at IS NULL
                  AND ta.completed_at IS NULL
                  AND j.due = $2
                  AND j.id <> $3
            )
            "#,
        )
        .bind(translator_id)
        .bind(job.due)
        .bind(job_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_booked {
            tx.rollback().await?;
            return Ok(AcceptOutcome::AlreadyBooked(job));
        }

        sqlx::query(
            r#"
            INSERT INTO translator_assignments (id, user_id, job_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(translator_id)
        .bind(job_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET status = 'assigned', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?;

        match updated {
            Some(updated) => {
                tx.commit().await?;
                Ok(AcceptOutcome::Accepted(updated))
            }
            None => {
                tx.rollback().await?;
                Ok(AcceptOutcome::NotPending(job))
            }
        }
    }

    async fn active_assignment_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Option<TranslatorAssignment>, Error> {
        sqlx::query_as::<_, TranslatorAssignment>(
            r#"
            SELECT * FROM translator_assignments
            WHERE job_id = $1 AND cancel_at IS NULL AND completed_at IS NULL
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn latest_completed_assignment_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Option<TranslatorAssignment>, Error> {
        sqlx::query_as::<_, TranslatorAssignment>(
            r#"
            SELECT * FROM translator_assignments
            WHERE job_id = $1 AND completed_at IS NOT NULL
            ORDER BY completed_at DESC
            LIMIT 1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    // Replacement is one transaction: stamp cancel_at on the superseded row,
    // then insert the new one. The partial unique index on open assignments
    // holds at every statement boundary; history rows are never overwritten.
    async fn create_or_replace_assignment(
        &self,
        replaced: Option<Uuid>,
        translator_id: Uuid,
        job_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TranslatorAssignment, Error> {
        let mut tx = self.pool.begin().await?;

        if let Some(replaced_id) = replaced {
            sqlx::query(
                r#"
                UPDATE translator_assignments SET cancel_at = $2
                WHERE id = $1 AND cancel_at IS NULL
                "#,
            )
            .bind(replaced_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let new_assignment = sqlx::query_as::<_, TranslatorAssignment>(
            r#"
            INSERT INTO translator_assignments (id, user_id, job_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(translator_id)
        .bind(job_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(new_assignment)
    }

    async fn close_assignment(
        &self,
        assignment_id: Uuid,
        completed_at: DateTime<Utc>,
        completed_by: Uuid,
    ) -> Result<TranslatorAssignment, Error> {
        sqlx::query_as::<_, TranslatorAssignment>(
            r#"
            UPDATE translator_assignments SET completed_at = $2, completed_by = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(assignment_id)
        .bind(completed_at)
        .bind(completed_by)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_assignment(&self, assignment_id: Uuid) -> Result<(), Error> {
        sqlx::query("DELETE FROM translator_assignments WHERE id = $1")
            .bind(assignment_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn cancel_open_assignments_for_job(
        &self,
        job_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE translator_assignments SET cancel_at = $2
            WHERE job_id = $1 AND cancel_at IS NULL
            "#,
        )
        .bind(job_id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn pending_jobs_for_translator(
        &self,
        job_type: JobType,
        language_ids: &[Uuid],
        gender: Option<Gender>,
        acceptable_certified: &[CertifiedRequirement],
        now: DateTime<Utc>,
    ) -> Result<Vec<Job>, Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT * FROM jobs WHERE status = 'pending' AND job_type = ",
        );
        qb.push_bind(job_type);
        qb.push(" AND due >= ");
        qb.push_bind(now);
        qb.push(" AND from_language_id = ANY(");
        qb.push_bind(language_ids.to_vec());
        qb.push(")");

        match gender {
            Some(g) => {
                qb.push(" AND (gender IS NULL OR gender = ");
                qb.push_bind(g);
                qb.push(")");
            }
            None => {
                qb.push(" AND gender IS NULL");
            }
        }

        if !acceptable_certified.is_empty() {
            qb.push(" AND (certified IS NULL OR certified = ANY(");
            qb.push_bind(acceptable_certified.to_vec());
            qb.push("))");
        }

        qb.push(" ORDER BY due ASC");

        qb.build_query_as::<Job>().fetch_all(&self.pool).await
    }

    async fn eligible_translator_candidates(
        &self,
        required_category: TranslatorCategory,
        language_id: Uuid,
        gender: Option<Gender>,
        levels: &[TranslatorLevel],
        blacklist: &[Uuid],
    ) -> Result<Vec<TranslatorCandidate>, Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT u.id, u.name, u.email, u.phone,
                   p.city, p.gender, p.translator_type, p.translator_level,
                   p.not_get_emergency, p.not_get_nighttime, p.not_get_notification
            FROM users u
            JOIN user_profiles p ON p.user_id = u.id
            WHERE u.role = 'translator' AND u.active = true
            "#,
        );

        if !blacklist.is_empty() {
            qb.push(" AND u.id <> ALL(");
            qb.push_bind(blacklist.to_vec());
            qb.push(")");
        }

        qb.push(" AND (p.translator_type = ");
        qb.push_bind(required_category);
        qb.push(" OR p.translator_type = 'both')");

        qb.push(
            " AND EXISTS (SELECT 1 FROM user_languages ul WHERE ul.user_id = u.id AND ul.lang_id = ",
        );
        qb.push_bind(language_id);
        qb.push(")");

        if let Some(g) = gender {
            qb.push(" AND p.gender = ");
            qb.push_bind(g);
        }

        if !levels.is_empty() {
            qb.push(" AND p.translator_level = ANY(");
            qb.push_bind(levels.to_vec());
            qb.push(")");
        }

        qb.build_query_as::<TranslatorCandidate>()
            .fetch_all(&self.pool)
            .await
    }

    async fn list_jobs(
        &self,
        filter: &JobFilterDto,
        restrict_job_type: Option<JobType>,
    ) -> Result<Vec<Job>, Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT j.* FROM jobs j WHERE 1=1");

        if let Some(job_type) = restrict_job_type {
            qb.push(" AND j.job_type = ");
            qb.push_bind(job_type);
        }

        if let Some(ids) = &filter.id {
            if !ids.is_empty() {
                qb.push(" AND j.id = ANY(");
                qb.push_bind(ids.clone());
                qb.push(")");
            }
        }

        // Date bounds only apply when the operator picked a time column.
        let time_column = match filter.filter_timetype.as_deref() {
            Some("created") => Some("j.created_at"),
            Some("due") => Some("j.due"),
            _ => None,
        };
        if let Some(column) = time_column {
            if let Some(from) = filter.from.as_deref().and_then(parse_filter_from) {
                qb.push(format!(" AND {} >= ", column));
                qb.push_bind(from);
            }
            if let Some(to) = filter.to.as_deref().and_then(parse_filter_to) {
                qb.push(format!(" AND {} <= ", column));
                qb.push_bind(to);
            }
        }

        match filter.booking_type.as_deref() {
            Some("physical") => {
                qb.push(" AND j.customer_physical_type = true");
            }
            Some("phone") => {
                qb.push(" AND j.customer_phone_type = true");
            }
            _ => {}
        }

        if filter.feedback == Some(true) {
            qb.push(
                " AND j.ignore_feedback = false AND EXISTS \
                 (SELECT 1 FROM job_feedback f WHERE f.job_id = j.id AND f.rating <= 3)",
            );
        }

        if let Some(langs) = &filter.lang {
            if !langs.is_empty() {
                qb.push(" AND j.from_language_id = ANY(");
                qb.push_bind(langs.clone());
                qb.push(")");
            }
        }

        if let Some(statuses) = &filter.status {
            if !statuses.is_empty() {
                qb.push(" AND j.status = ANY(");
                qb.push_bind(statuses.clone());
                qb.push(")");
            }
        }

        if let Some(types) = &filter.job_type {
            if !types.is_empty() {
                qb.push(" AND j.job_type = ANY(");
                qb.push_bind(types.clone());
                qb.push(")");
            }
        }

        // Email filters resolve to ids first; an unknown address leaves the
        // list unfiltered, matching the operator screen's behavior.
        if let Some(email) = filter.customer_email.as_deref() {
            if let Some(user) = self.get_user_by_email(email).await? {
                qb.push(" AND j.user_id = ");
                qb.push_bind(user.id);
            }
        }

        if let Some(email) = filter.translator_email.as_deref() {
            if let Some(user) = self.get_user_by_email(email).await? {
                qb.push(" AND j.id IN (SELECT job_id FROM translator_assignments WHERE user_id = ");
                qb.push_bind(user.id);
                qb.push(")");
            }
        }

        let limit = filter.limit.unwrap_or(15).min(100) as i64;
        let page = filter.page.unwrap_or(1).max(1) as i64;
        qb.push(" ORDER BY j.created_at DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind((page - 1) * limit);

        qb.build_query_as::<Job>().fetch_all(&self.pool).await
    }

    async fn jobs_for_customer_active(&self, user_id: Uuid) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE user_id = $1 AND status IN ('pending', 'assigned', 'started')
            ORDER BY due ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn jobs_for_customer_history(
        &self,
        user_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE user_id = $1
              AND status IN ('completed', 'withdrawbefore24', 'withdrawafter24', 'timedout')
            ORDER BY due DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .bind(((page.max(1) - 1) * limit) as i64)
        .fetch_all(&self.pool)
        .await
    }

    async fn jobs_for_translator_active(&self, user_id: Uuid) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT j.* FROM jobs j
            JOIN translator_assignments ta ON ta.job_id = j.id
            WHERE ta.user_id = $1
              AND ta.cancel_at IS NULL AND ta.completed_at IS NULL
              AND j.status IN ('assigned', 'started')
            ORDER BY j.due ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn jobs_for_translator_history(
        &self,
        user_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT j.* FROM jobs j
            JOIN translator_assignments ta ON ta.job_id = j.id
            WHERE ta.user_id = $1 AND ta.completed_at IS NOT NULL
            ORDER BY j.due DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .bind(((page.max(1) - 1) * limit) as i64)
        .fetch_all(&self.pool)
        .await
    }

    async fn session_alert_candidates(&self) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE status = 'completed' AND session_time IS NOT NULL AND ignore_flag = false
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn expired_pending_jobs(&self, now: DateTime<Utc>) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE status = 'pending' AND ignore_expired = false AND due >= $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
    }

    async fn set_ignore_expiring(&self, job_id: Uuid) -> Result<(), Error> {
        sqlx::query("UPDATE jobs SET ignore_flag = true, updated_at = NOW() WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_ignore_expired(&self, job_id: Uuid) -> Result<(), Error> {
        sqlx::query("UPDATE jobs SET ignore_expired = true, updated_at = NOW() WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_ignore_feedback(&self, job_id: Uuid) -> Result<(), Error> {
        sqlx::query("UPDATE jobs SET ignore_feedback = true, updated_at = NOW() WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_job_distance(
        &self,
        job_id: Uuid,
        distance: Option<String>,
        travel_time: Option<String>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO job_distances (job_id, distance, travel_time)
            VALUES ($1, $2, $3)
            ON CONFLICT (job_id) DO UPDATE SET distance = $2, travel_time = $3
            "#,
        )
        .bind(job_id)
        .bind(distance)
        .bind(travel_time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_job_feed_flags(
        &self,
        job_id: Uuid,
        admin_comments: Option<String>,
        session_time: Option<String>,
        flagged: bool,
        manually_handled: bool,
        by_admin: bool,
    ) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET
                admin_comments = COALESCE($2, admin_comments),
                session_time = COALESCE($3, session_time),
                flagged = $4,
                manually_handled = $5,
                by_admin = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(admin_comments)
        .bind(session_time)
        .bind(flagged)
        .bind(manually_handled)
        .bind(by_admin)
        .fetch_one(&self.pool)
        .await
    }
}
