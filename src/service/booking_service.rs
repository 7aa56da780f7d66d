// service/booking_service.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    db::{
        bookingdb::{AcceptOutcome, BookingExt},
        db::DBClient,
        userdb::UserExt,
    },
    dtos::bookingdtos::*,
    models::{bookingmodel::*, usermodel::UserRole},
    service::{
        audit_service::AuditService,
        error::ServiceError,
        notification_service::NotificationService,
        transition::{
            plan_update, AssignmentSnapshot, Effect, ReminderParty, SessionParty, TranslatorRef,
            UpdateChanges, UpdateContext, UpdatePlan,
        },
    },
    utils::time::{parse_due, session_interval, session_minutes, will_expire_at},
};

#[derive(Debug, Clone)]
pub struct BookingService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
    audit_service: Arc<AuditService>,
}

/// Customer cancellations classify by proximity to the due time: a full 24
/// hours of notice still counts as "before".
pub fn customer_withdraw_status(due: DateTime<Utc>, now: DateTime<Utc>) -> JobStatus {
    if due - now >= Duration::hours(24) {
        JobStatus::Withdrawbefore24
    } else {
        JobStatus::Withdrawafter24
    }
}

/// Translators may only cancel with strictly more than 24 hours of notice;
/// anything at or inside the boundary goes through the phone channel.
pub fn translator_can_cancel(due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    due - now > Duration::hours(24)
}

/// The distance feed posts stringly-typed booleans; true iff the literal
/// "true" was submitted, absent or anything else is false.
pub fn parse_feed_flag(value: Option<&str>) -> bool {
    matches!(value, Some("true"))
}

/// A completed session is flagged for operator review when it ran at least
/// twice as long as planned.
pub fn session_exceeds_alert(session_time: &str, duration: i32) -> bool {
    match session_minutes(session_time) {
        Some(minutes) => minutes >= (duration as i64) * 2,
        None => false,
    }
}

/// Gender and certification requirement from the create form's job_for tags.
pub fn parse_job_for(job_for: &[String]) -> (Option<Gender>, Option<CertifiedRequirement>) {
    let gender = if job_for.iter().any(|t| t == "male") {
        Some(Gender::Male)
    } else if job_for.iter().any(|t| t == "female") {
        Some(Gender::Female)
    } else {
        None
    };

    let wants_normal = job_for.iter().any(|t| t == "normal");
    let wants_certified = job_for.iter().any(|t| t == "certified");
    let certified = if job_for.iter().any(|t| t == "certified_in_law") {
        Some(CertifiedRequirement::Law)
    } else if job_for.iter().any(|t| t == "certified_in_health") {
        Some(CertifiedRequirement::Health)
    } else if wants_normal && wants_certified {
        Some(CertifiedRequirement::Both)
    } else if wants_certified {
        Some(CertifiedRequirement::Yes)
    } else {
        Some(CertifiedRequirement::Normal)
    };

    (gender, certified)
}

impl BookingService {
    pub fn new(
        db_client: Arc<DBClient>,
        notification_service: Arc<NotificationService>,
        audit_service: Arc<AuditService>,
    ) -> Self {
        Self {
            db_client,
            notification_service,
            audit_service,
        }
    }

    pub async fn create_job(&self, data: CreateJobDto) -> Result<JobCreatedDto, ServiceError> {
        let user = self
            .db_client
            .get_user(data.user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(data.user_id))?;

        if user.role == UserRole::Translator {
            return Err(ServiceError::validation(
                "user_id",
                "Translators can not create bookings",
            ));
        }

        let from_language_id = data
            .from_language_id
            .ok_or_else(|| ServiceError::validation("from_language_id", "You must fill in all fields"))?;

        let now = Utc::now();
        let (due, customer_phone_type, customer_physical_type, duration) = if data.immediate {
            let duration = data
                .duration
                .ok_or_else(|| ServiceError::validation("duration", "You must fill in all fields"))?;
            // Immediate bookings start in five minutes and are always by phone.
            (now + Duration::minutes(5), true, false, duration)
        } else {
            let due_date = data
                .due_date
                .as_deref()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ServiceError::validation("due_date", "You must fill in all fields"))?;
            let due_time = data
                .due_time
                .as_deref()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ServiceError::validation("due_time", "You must fill in all fields"))?;
            let phone = data.customer_phone_type.ok_or_else(|| {
                ServiceError::validation("customer_phone_type", "You must fill in all fields")
            })?;
            let physical = data.customer_physical_type.ok_or_else(|| {
                ServiceError::validation("customer_physical_type", "You must fill in all fields")
            })?;
            let duration = data
                .duration
                .ok_or_else(|| ServiceError::validation("duration", "You must fill in all fields"))?;

            let due = parse_due(due_date, due_time)
                .ok_or_else(|| ServiceError::validation("due_date", "Invalid date or time"))?;
            if due <= now {
                return Err(ServiceError::validation(
                    "due_date",
                    "Can not create a booking in the past",
                ));
            }
            (due, phone, physical, duration)
        };

        let (gender, certified) = parse_job_for(&data.job_for);

        let profile = self.db_client.get_user_profile(user.id).await?;
        let job_type = profile
            .and_then(|p| p.consumer_type)
            .map(|c| c.job_type())
            .unwrap_or(JobType::Paid);

        let new_job = NewJob {
            user_id: user.id,
            user_email: None,
            from_language_id,
            immediate: data.immediate,
            due,
            duration,
            gender,
            certified,
            job_type,
            customer_phone_type,
            customer_physical_type,
            town: data.town,
            address: None,
            instructions: None,
            reference: None,
            admin_comments: None,
            status: JobStatus::Pending,
            specific_translator_id: None,
            will_expire_at: Some(will_expire_at(due, now)),
            by_admin: data.by_admin.unwrap_or(false),
        };

        let job = self.db_client.insert_job(&new_job).await?;

        Ok(JobCreatedDto {
            id: job.id,
            booking_type: if job.immediate { "immediate" } else { "regular" }.to_string(),
            status: job.status,
            due: job.due,
        })
    }

    // Second step of booking creation: contact overrides, the confirmation
    // email, and the fan-out to eligible translators.
    pub async fn store_job_email(&self, data: JobEmailDto) -> Result<Job, ServiceError> {
        let mut job = self
            .db_client
            .get_job(data.job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(data.job_id))?;

        if let Some(email) = data.user_email.filter(|e| !e.is_empty()) {
            job.user_email = Some(email);
        }
        if let Some(reference) = data.reference {
            job.reference = Some(reference);
        }
        if let Some(address) = data.address.filter(|a| !a.is_empty()) {
            let profile = self.db_client.get_user_profile(job.user_id).await?;
            job.address = Some(address);
            job.instructions = data
                .instructions
                .or_else(|| profile.as_ref().and_then(|p| p.instructions.clone()));
            job.town = data.town.or_else(|| profile.and_then(|p| p.city));
        }

        let saved = self.db_client.update_job_row(&job).await?;

        if let Err(e) = self.notification_service.notify_booking_received(&saved).await {
            tracing::warn!("Confirmation email for job {} failed: {}", saved.id, e);
        }
        if let Err(e) = self
            .notification_service
            .broadcast_job_to_translators(&saved, None)
            .await
        {
            tracing::warn!("Broadcast for job {} failed: {}", saved.id, e);
        }
        if let Err(e) = self.notification_service.send_sms_to_translators(&saved).await {
            tracing::warn!("SMS broadcast for job {} failed: {}", saved.id, e);
        }

        Ok(saved)
    }

    pub async fn update_job(
        &self,
        job_id: Uuid,
        data: UpdateJobDto,
    ) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        let acting_user = self
            .db_client
            .get_user(data.acting_user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(data.acting_user_id))?;

        // Prefer the assignment in force; fall back to the latest completed
        // one so historical bookings still display their translator.
        let current_assignment = match self.db_client.active_assignment_for_job(job_id).await? {
            Some(assignment) => Some(assignment),
            None => self
                .db_client
                .latest_completed_assignment_for_job(job_id)
                .await?,
        };
        let current_snapshot = match &current_assignment {
            Some(assignment) => {
                let user = self
                    .db_client
                    .get_user(assignment.user_id)
                    .await?
                    .ok_or(ServiceError::TranslatorNotFound)?;
                Some(AssignmentSnapshot {
                    id: assignment.id,
                    user_id: assignment.user_id,
                    user_email: user.email,
                })
            }
            None => None,
        };

        let requested_translator = self
            .resolve_translator(data.translator, data.translator_email.as_deref())
            .await?;

        let old_language_name = self.language_name(job.from_language_id).await;
        let new_language_name = match data.from_language_id {
            Some(lang) if lang != job.from_language_id => Some(self.language_name(lang).await),
            _ => None,
        };

        let changes = UpdateChanges {
            status: data.status,
            due: data.due,
            from_language_id: data.from_language_id,
            translator: requested_translator,
            admin_comments: data.admin_comments,
            reference: data.reference,
            session_time: data.session_time,
        };
        let ctx = UpdateContext {
            now: Utc::now(),
            old_language_name,
            new_language_name,
        };

        let plan = plan_update(&job, current_snapshot.as_ref(), &changes, &ctx);

        // Persist first: ledger replacement, then the job row, then the audit
        // trail. Only after everything is on disk do notifications fire.
        if let Some(new_translator) = &plan.new_translator {
            self.db_client
                .create_or_replace_assignment(
                    plan.replaced_assignment,
                    new_translator.id,
                    job.id,
                    ctx.now,
                )
                .await?;
        }

        let saved = self.db_client.update_job_row(&plan.job).await?;

        self.audit_service
            .log_booking_update(acting_user.id, &acting_user.name, job.id, &plan.audit)
            .await?;

        if plan.past_due {
            // Past-due bookings save silently; notifying about an expired
            // booking helps nobody.
            return Ok(saved);
        }

        self.dispatch_effects(&saved, &plan).await;

        Ok(saved)
    }

    async fn resolve_translator(
        &self,
        translator: Option<Uuid>,
        translator_email: Option<&str>,
    ) -> Result<Option<TranslatorRef>, ServiceError> {
        if let Some(email) = translator_email.filter(|e| !e.is_empty()) {
            let user = self
                .db_client
                .get_user_by_email(email)
                .await?
                .ok_or(ServiceError::TranslatorNotFound)?;
            return Ok(Some(TranslatorRef {
                id: user.id,
                email: user.email,
            }));
        }
        if let Some(id) = translator {
            let user = self
                .db_client
                .get_user(id)
                .await?
                .ok_or(ServiceError::TranslatorNotFound)?;
            return Ok(Some(TranslatorRef {
                id: user.id,
                email: user.email,
            }));
        }
        Ok(None)
    }

    async fn language_name(&self, language_id: Uuid) -> String {
        match self.db_client.get_language(language_id).await {
            Ok(Some(language)) => language.name,
            _ => "unknown".to_string(),
        }
    }

    // Effects are fire-and-forget: a failed notification must not fail the
    // already-persisted update.
    async fn dispatch_effects(&self, job: &Job, plan: &UpdatePlan) {
        for effect in &plan.effects {
            let result = match effect {
                Effect::EmailBookingReopened => {
                    self.notification_service.notify_booking_reopened(job).await
                }
                Effect::EmailJobAccepted => {
                    self.notification_service.notify_job_accepted(job).await
                }
                Effect::EmailJobAcceptedToTranslator => match &plan.new_translator {
                    Some(new_translator) => {
                        self.notification_service
                            .notify_job_accepted_to_translator(job, new_translator.id)
                            .await
                    }
                    None => Ok(()),
                },
                Effect::EmailSessionEnded {
                    recipient,
                    session_time,
                } => match recipient {
                    SessionParty::Customer => {
                        self.notification_service
                            .notify_session_ended_customer(job, session_time)
                            .await
                    }
                    SessionParty::ActiveTranslator => {
                        self.notification_service
                            .notify_session_ended_translator(job, session_time)
                            .await
                    }
                },
                Effect::EmailBookingCancelled => {
                    self.notification_service.notify_booking_cancelled(job).await
                }
                Effect::EmailJobCancelledToTranslator => {
                    self.notification_service
                        .notify_job_cancelled_translator(job)
                        .await
                }
                Effect::EmailChangedDate { old_due } => {
                    self.notification_service.notify_changed_date(job, *old_due).await
                }
                Effect::EmailChangedTranslator {
                    old_translator,
                    new_translator,
                } => {
                    self.notification_service
                        .notify_changed_translator(job, old_translator.as_ref(), new_translator)
                        .await
                }
                Effect::EmailChangedLanguage { old_language } => {
                    self.notification_service
                        .notify_changed_language(job, old_language)
                        .await
                }
                Effect::SessionStartReminder { recipient } => {
                    let user_id = match recipient {
                        ReminderParty::Customer => Some(job.user_id),
                        ReminderParty::NewTranslator => {
                            plan.new_translator.as_ref().map(|t| t.id)
                        }
                    };
                    match user_id {
                        Some(user_id) => {
                            self.notification_service
                                .send_session_start_reminder(job, user_id)
                                .await
                        }
                        None => Ok(()),
                    }
                }
                Effect::BroadcastToTranslators => self
                    .notification_service
                    .broadcast_job_to_translators(job, None)
                    .await
                    .map(|_| ()),
            };

            if let Err(e) = result {
                tracing::warn!("Effect dispatch failed for job {}: {}", job.id, e);
            }
        }
    }

    pub async fn accept_job(&self, data: AcceptJobDto) -> Result<Job, ServiceError> {
        let now = Utc::now();
        match self
            .db_client
            .accept_job_atomic(data.job_id, data.user_id, now)
            .await?
        {
            AcceptOutcome::Accepted(job) => {
                // The acceptance is committed; notification trouble is not a
                // reason to report failure to the translator.
                if let Err(e) = self.notification_service.notify_job_accepted(&job).await {
                    tracing::warn!("Accept email for job {} failed: {}", job.id, e);
                }
                if let Err(e) = self
                    .notification_service
                    .push_job_accepted_to_customer(&job)
                    .await
                {
                    tracing::warn!("Accept push for job {} failed: {}", job.id, e);
                }
                Ok(job)
            }
            AcceptOutcome::AlreadyBooked(_) => Err(ServiceError::BookingConflict(
                "You already have a booking at that time! The booking was not accepted."
                    .to_string(),
            )),
            AcceptOutcome::NotPending(_) => Err(ServiceError::BookingConflict(
                "This booking has already been accepted by another interpreter. \
                 You did not get this booking."
                    .to_string(),
            )),
            AcceptOutcome::NotFound => Err(ServiceError::JobNotFound(data.job_id)),
        }
    }

    pub async fn cancel_job(&self, data: CancelJobDto) -> Result<Job, ServiceError> {
        let user = self
            .db_client
            .get_user(data.user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(data.user_id))?;
        let job = self
            .db_client
            .get_job(data.job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(data.job_id))?;
        let assignment = self.db_client.active_assignment_for_job(job.id).await?;
        let now = Utc::now();

        if user.role == UserRole::Customer {
            let mut updated = job.clone();
            updated.withdraw_at = Some(now);
            updated.status = customer_withdraw_status(job.due, now);
            let saved = self.db_client.update_job_row(&updated).await?;

            if let Some(assignment) = assignment {
                if let Err(e) = self
                    .notification_service
                    .push_job_cancelled(&saved, assignment.user_id)
                    .await
                {
                    tracing::warn!("Cancel push for job {} failed: {}", saved.id, e);
                }
            }

            return Ok(saved);
        }

        // Translator-side cancellation: only with more than 24 hours of
        // notice; the booking goes back on the market.
        if !translator_can_cancel(job.due, now) {
            return Err(ServiceError::CancellationWindowClosed(
                "You can not cancel a booking that starts within 24 hours through the app. \
                 Please call the office to cancel by phone. Thank you!"
                    .to_string(),
            ));
        }

        let mut updated = job.clone();
        updated.status = JobStatus::Pending;
        updated.created_at = now;
        updated.will_expire_at = Some(will_expire_at(job.due, now));
        let saved = self.db_client.update_job_row(&updated).await?;

        if let Some(assignment) = &assignment {
            self.db_client.delete_assignment(assignment.id).await?;
        }

        if let Err(e) = self
            .notification_service
            .push_job_cancelled(&saved, saved.user_id)
            .await
        {
            tracing::warn!("Cancel push for job {} failed: {}", saved.id, e);
        }
        if let Err(e) = self
            .notification_service
            .broadcast_job_to_translators(&saved, assignment.map(|a| a.user_id))
            .await
        {
            tracing::warn!("Rebroadcast for job {} failed: {}", saved.id, e);
        }

        Ok(saved)
    }

    pub async fn end_job(&self, data: EndJobDto) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job(data.job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(data.job_id))?;

        if job.status != JobStatus::Started {
            return Ok(job);
        }

        let now = Utc::now();
        let interval = session_interval(job.due, now);
        let human = crate::utils::time::humanize_session_time(&interval)
            .unwrap_or_else(|| interval.clone());

        let mut updated = job.clone();
        updated.end_at = Some(now);
        updated.status = JobStatus::Completed;
        updated.session_time = Some(interval);
        let saved = self.db_client.update_job_row(&updated).await?;

        if let Err(e) = self
            .notification_service
            .notify_session_ended_customer(&saved, &human)
            .await
        {
            tracing::warn!("Session-ended email for job {} failed: {}", saved.id, e);
        }
        if let Err(e) = self
            .notification_service
            .notify_session_ended_translator(&saved, &human)
            .await
        {
            tracing::warn!("Session-ended email for job {} failed: {}", saved.id, e);
        }

        if let Some(assignment) = self.db_client.active_assignment_for_job(saved.id).await? {
            self.db_client
                .close_assignment(assignment.id, now, data.user_id)
                .await?;

            let other_party = if data.user_id == saved.user_id {
                assignment.user_id
            } else {
                saved.user_id
            };
            if let Err(e) = self
                .notification_service
                .notify_session_ended_event(&saved, other_party)
                .await
            {
                tracing::warn!("Session-ended event for job {} failed: {}", saved.id, e);
            }
        } else {
            tracing::warn!("Job {} ended without an active assignment", saved.id);
        }

        Ok(saved)
    }

    pub async fn customer_not_call(&self, data: CustomerNotCallDto) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job(data.job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(data.job_id))?;

        let now = Utc::now();
        let mut updated = job.clone();
        updated.end_at = Some(now);
        updated.status = JobStatus::NotCarriedOutCustomer;
        let saved = self.db_client.update_job_row(&updated).await?;

        if let Some(assignment) = self.db_client.active_assignment_for_job(saved.id).await? {
            // The translator showed up; they close their own assignment.
            self.db_client
                .close_assignment(assignment.id, now, assignment.user_id)
                .await?;
        }

        Ok(saved)
    }

    /// Reopening a timed-out booking creates a fresh job row; any other status
    /// is reset to pending in place.
    pub async fn reopen(&self, data: ReopenJobDto) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job(data.job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(data.job_id))?;

        let now = Utc::now();
        let expires = Some(will_expire_at(job.due, now));

        if job.status != JobStatus::Timedout {
            let reopened = self
                .db_client
                .reopen_job_in_place(job.id, now, expires)
                .await?;
            self.db_client
                .cancel_open_assignments_for_job(job.id, now)
                .await?;
            return Ok(reopened);
        }

        let copy = NewJob {
            user_id: job.user_id,
            user_email: job.user_email.clone(),
            from_language_id: job.from_language_id,
            immediate: job.immediate,
            due: job.due,
            duration: job.duration,
            gender: job.gender,
            certified: job.certified,
            job_type: job.job_type,
            customer_phone_type: job.customer_phone_type,
            customer_physical_type: job.customer_physical_type,
            town: job.town.clone(),
            address: job.address.clone(),
            instructions: job.instructions.clone(),
            reference: job.reference.clone(),
            admin_comments: Some(format!(
                "This booking is a reopening of booking #{}",
                job.id
            )),
            status: JobStatus::Pending,
            specific_translator_id: None,
            will_expire_at: expires,
            by_admin: job.by_admin,
        };
        let new_job = self.db_client.insert_job(&copy).await?;

        self.db_client
            .cancel_open_assignments_for_job(job.id, now)
            .await?;
        if let Err(e) = self
            .notification_service
            .broadcast_job_to_translators(&new_job, None)
            .await
        {
            tracing::warn!("Rebroadcast for job {} failed: {}", new_job.id, e);
        }

        Ok(new_job)
    }

    pub async fn list_jobs(&self, filter: &JobFilterDto) -> Result<Vec<Job>, ServiceError> {
        let restrict_job_type = self.job_type_restriction(filter.acting_user_id).await?;
        Ok(self.db_client.list_jobs(filter, restrict_job_type).await?)
    }

    // Operators see everything; a regular consumer account only its own kind
    // of bookings.
    async fn job_type_restriction(
        &self,
        acting_user_id: Option<Uuid>,
    ) -> Result<Option<JobType>, ServiceError> {
        let Some(user_id) = acting_user_id else {
            return Ok(None);
        };
        let Some(user) = self.db_client.get_user(user_id).await? else {
            return Ok(None);
        };
        if user.role.is_admin() {
            return Ok(None);
        }
        let consumer_type = self
            .db_client
            .get_user_profile(user_id)
            .await?
            .and_then(|p| p.consumer_type);
        Ok(Some(match consumer_type {
            Some(crate::models::usermodel::ConsumerType::Rwsconsumer) => JobType::Rws,
            _ => JobType::Unpaid,
        }))
    }

    pub async fn get_users_jobs(&self, user_id: Uuid) -> Result<UserJobsDto, ServiceError> {
        let user = self
            .db_client
            .get_user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let (jobs, usertype) = match user.role {
            UserRole::Translator => (
                self.db_client.jobs_for_translator_active(user_id).await?,
                "translator",
            ),
            _ => (
                self.db_client.jobs_for_customer_active(user_id).await?,
                "customer",
            ),
        };

        let (emergency_jobs, normal_jobs): (Vec<Job>, Vec<Job>) =
            jobs.into_iter().partition(|job| job.immediate);

        Ok(UserJobsDto {
            emergency_jobs,
            normal_jobs,
            usertype: usertype.to_string(),
        })
    }

    pub async fn get_users_jobs_history(
        &self,
        user_id: Uuid,
        page: u32,
    ) -> Result<Vec<Job>, ServiceError> {
        let user = self
            .db_client
            .get_user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let jobs = match user.role {
            UserRole::Translator => {
                self.db_client
                    .jobs_for_translator_history(user_id, page, 15)
                    .await?
            }
            _ => {
                self.db_client
                    .jobs_for_customer_history(user_id, page, 15)
                    .await?
            }
        };
        Ok(jobs)
    }

    /// Completed bookings whose session ran at least twice the planned
    /// duration, for the operator alert screen.
    pub async fn session_alerts(&self) -> Result<Vec<Job>, ServiceError> {
        let candidates = self.db_client.session_alert_candidates().await?;
        Ok(candidates
            .into_iter()
            .filter(|job| {
                job.session_time
                    .as_deref()
                    .map(|st| session_exceeds_alert(st, job.duration))
                    .unwrap_or(false)
            })
            .collect())
    }

    pub async fn expired_no_accepted(&self) -> Result<Vec<Job>, ServiceError> {
        Ok(self.db_client.expired_pending_jobs(Utc::now()).await?)
    }

    pub async fn ignore_expiring(&self, job_id: Uuid) -> Result<(), ServiceError> {
        self.db_client.set_ignore_expiring(job_id).await?;
        Ok(())
    }

    pub async fn ignore_expired(&self, job_id: Uuid) -> Result<(), ServiceError> {
        self.db_client.set_ignore_expired(job_id).await?;
        Ok(())
    }

    pub async fn ignore_feedback(&self, job_id: Uuid) -> Result<(), ServiceError> {
        self.db_client.set_ignore_feedback(job_id).await?;
        Ok(())
    }

    pub async fn distance_feed(&self, data: DistanceFeedDto) -> Result<Job, ServiceError> {
        if data.distance.is_some() || data.time.is_some() {
            self.db_client
                .upsert_job_distance(data.job_id, data.distance.clone(), data.time.clone())
                .await?;
        }

        let job = self
            .db_client
            .update_job_feed_flags(
                data.job_id,
                data.admin_comment.clone(),
                data.session_time.clone(),
                parse_feed_flag(data.flagged.as_deref()),
                parse_feed_flag(data.manually_handled.as_deref()),
                parse_feed_flag(data.by_admin.as_deref()),
            )
            .await?;

        Ok(job)
    }

    pub async fn resend_notifications(&self, job_id: Uuid) -> Result<usize, ServiceError> {
        let job = self
            .db_client
            .get_job(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;
        self.notification_service
            .broadcast_job_to_translators(&job, None)
            .await
    }

    /// SMS resend; transport trouble comes back as a soft message, not an
    /// error, so the operator screen can show it.
    pub async fn resend_sms_notifications(&self, job_id: Uuid) -> Result<String, ServiceError> {
        let job = self
            .db_client
            .get_job(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;
        match self.notification_service.send_sms_to_translators(&job).await {
            Ok(count) => Ok(format!("SMS sent to {} interpreters", count)),
            Err(ServiceError::Notification(message)) => Ok(message),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(s: &str) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap(),
        )
    }

    #[test]
    fn customer_withdraw_at_exactly_24h_counts_as_before() {
        let now = ts("2024-06-01 10:00:00");
        assert_eq!(
            customer_withdraw_status(ts("2024-06-02 10:00:00"), now),
            JobStatus::Withdrawbefore24
        );
        assert_eq!(
            customer_withdraw_status(ts("2024-06-02 09:59:59"), now),
            JobStatus::Withdrawafter24
        );
    }

    #[test]
    fn translator_cancel_boundary_is_strict() {
        let now = ts("2024-06-01 10:00:00");
        // Exactly 24h of notice is rejected.
        assert!(!translator_can_cancel(ts("2024-06-02 10:00:00"), now));
        // One second more and the cancellation goes through.
        assert!(translator_can_cancel(ts("2024-06-02 10:00:01"), now));
        assert!(!translator_can_cancel(ts("2024-06-01 12:00:00"), now));
    }

    #[test]
    fn feed_flags_are_true_only_for_the_literal_string() {
        assert!(parse_feed_flag(Some("true")));
        assert!(!parse_feed_flag(Some("TRUE")));
        assert!(!parse_feed_flag(Some("yes")));
        assert!(!parse_feed_flag(Some("")));
        assert!(!parse_feed_flag(None));
    }

    #[test]
    fn session_alert_threshold_is_twice_the_duration() {
        assert!(session_exceeds_alert("2:0:0", 60));
        assert!(session_exceeds_alert("1:0:0", 30));
        assert!(!session_exceeds_alert("0:59:0", 30));
        assert!(!session_exceeds_alert("garbage", 30));
    }

    #[test]
    fn job_for_tags_select_gender_and_certification() {
        let (gender, certified) = parse_job_for(&["male".to_string()]);
        assert_eq!(gender, Some(Gender::Male));
        assert_eq!(certified, Some(CertifiedRequirement::Normal));

        let (gender, certified) =
            parse_job_for(&["female".to_string(), "certified".to_string()]);
        assert_eq!(gender, Some(Gender::Female));
        assert_eq!(certified, Some(CertifiedRequirement::Yes));

        let (_, certified) =
            parse_job_for(&["normal".to_string(), "certified".to_string()]);
        assert_eq!(certified, Some(CertifiedRequirement::Both));

        let (_, certified) = parse_job_for(&["certified_in_law".to_string()]);
        assert_eq!(certified, Some(CertifiedRequirement::Law));

        let (_, certified) = parse_job_for(&["certified_in_health".to_string()]);
        assert_eq!(certified, Some(CertifiedRequirement::Health));
    }
}
