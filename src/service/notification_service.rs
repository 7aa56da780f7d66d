// service/notification_service.rs
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
    config::Config,
    db::{bookingdb::BookingExt, db::DBClient, userdb::UserExt},
    mail::mails,
    models::{bookingmodel::Job, usermodel::TranslatorCandidate},
    service::{
        error::ServiceError,
        matching_service::MatchingService,
        push_service::{PushRecipient, PushService},
        transition::{AssignmentSnapshot, TranslatorRef},
    },
    utils::time::is_night_time,
};

// Decides whether and whom to notify and renders the payload content.
// Delivery is fire-and-forget: the booking state is already persisted when
// any of this runs, so transport failures are logged, never propagated.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
    matching_service: Arc<MatchingService>,
    push_service: PushService,
    config: Config,
}

impl NotificationService {
    pub fn new(
        db_client: Arc<DBClient>,
        matching_service: Arc<MatchingService>,
        push_service: PushService,
        config: Config,
    ) -> Self {
        Self {
            db_client,
            matching_service,
            push_service,
            config,
        }
    }

    // The job-level email override wins over the customer's account email.
    async fn customer_contact(&self, job: &Job) -> Result<(String, String), ServiceError> {
        let user = self
            .db_client
            .get_user(job.user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(job.user_id))?;

        let email = job.user_email.clone().unwrap_or(user.email);
        Ok((email, user.name))
    }

    async fn language_name(&self, language_id: Uuid) -> String {
        match self.db_client.get_language(language_id).await {
            Ok(Some(language)) => language.name,
            _ => "unknown".to_string(),
        }
    }

    fn log_mail_failure(&self, what: &str, job_id: Uuid, result: Result<(), String>) {
        if let Err(e) = result {
            tracing::warn!("Failed to send {} email for job {}: {}", what, job_id, e);
        }
    }

    pub async fn notify_booking_received(&self, job: &Job) -> Result<(), ServiceError> {
        let (email, name) = self.customer_contact(job).await?;
        let result = mails::send_booking_received_email(
            &self.config,
            &email,
            &name,
            &job.id.to_string(),
            &job.due.format("%Y-%m-%d %H:%M").to_string(),
            &job.duration.to_string(),
        )
        .await;
        self.log_mail_failure("booking-received", job.id, result);
        Ok(())
    }

    pub async fn notify_booking_reopened(&self, job: &Job) -> Result<(), ServiceError> {
        let (email, name) = self.customer_contact(job).await?;
        let language = self.language_name(job.from_language_id).await;
        let result = mails::send_booking_reopened_email(
            &self.config,
            &email,
            &name,
            &job.id.to_string(),
            &language,
        )
        .await;
        self.log_mail_failure("booking-reopened", job.id, result);
        Ok(())
    }

    pub async fn notify_job_accepted(&self, job: &Job) -> Result<(), ServiceError> {
        let (email, name) = self.customer_contact(job).await?;
        let result =
            mails::send_job_accepted_email(&self.config, &email, &name, &job.id.to_string()).await;
        self.log_mail_failure("job-accepted", job.id, result);
        Ok(())
    }

    pub async fn notify_job_accepted_to_translator(
        &self,
        job: &Job,
        translator_id: Uuid,
    ) -> Result<(), ServiceError> {
        let translator = self
            .db_client
            .get_user(translator_id)
            .await?
            .ok_or(ServiceError::TranslatorNotFound)?;

        let result = mails::send_job_accepted_translator_email(
            &self.config,
            &translator.email,
            &translator.name,
            &job.id.to_string(),
            &job.due.format("%Y-%m-%d %H:%M").to_string(),
            &job.duration.to_string(),
        )
        .await;
        self.log_mail_failure("job-accepted-translator", job.id, result);
        Ok(())
    }

    pub async fn notify_session_ended_customer(
        &self,
        job: &Job,
        session_time: &str,
    ) -> Result<(), ServiceError> {
        let (email, name) = self.customer_contact(job).await?;
        let result = mails::send_session_ended_email(
            &self.config,
            &email,
            &name,
            &job.id.to_string(),
            session_time,
            "invoice",
        )
        .await;
        self.log_mail_failure("session-ended", job.id, result);
        Ok(())
    }

    pub async fn notify_session_ended_translator(
        &self,
        job: &Job,
        session_time: &str,
    ) -> Result<(), ServiceError> {
        let assignment = match self.db_client.active_assignment_for_job(job.id).await? {
            Some(assignment) => assignment,
            None => {
                tracing::warn!("No active assignment for job {}, skipping translator email", job.id);
                return Ok(());
            }
        };
        let translator = self
            .db_client
            .get_user(assignment.user_id)
            .await?
            .ok_or(ServiceError::TranslatorNotFound)?;

        let result = mails::send_session_ended_email(
            &self.config,
            &translator.email,
            &translator.name,
            &job.id.to_string(),
            session_time,
            "salary",
        )
        .await;
        self.log_mail_failure("session-ended", job.id, result);
        Ok(())
    }

    pub async fn notify_booking_cancelled(&self, job: &Job) -> Result<(), ServiceError> {
        let (email, name) = self.customer_contact(job).await?;
        let result =
            mails::send_booking_cancelled_email(&self.config, &email, &name, &job.id.to_string())
                .await;
        self.log_mail_failure("booking-cancelled", job.id, result);
        Ok(())
    }

    pub async fn notify_job_cancelled_translator(&self, job: &Job) -> Result<(), ServiceError> {
        let assignment = match self.db_client.active_assignment_for_job(job.id).await? {
            Some(assignment) => assignment,
            None => return Ok(()),
        };
        let translator = self
            .db_client
            .get_user(assignment.user_id)
            .await?
            .ok_or(ServiceError::TranslatorNotFound)?;

        let result = mails::send_job_cancelled_translator_email(
            &self.config,
            &translator.email,
            &translator.name,
            &job.id.to_string(),
        )
        .await;
        self.log_mail_failure("job-cancelled-translator", job.id, result);
        Ok(())
    }

    pub async fn notify_changed_date(
        &self,
        job: &Job,
        old_due: chrono::DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let (email, name) = self.customer_contact(job).await?;
        let result = mails::send_changed_date_email(
            &self.config,
            &email,
            &name,
            &job.id.to_string(),
            &old_due.format("%Y-%m-%d %H:%M").to_string(),
            &job.due.format("%Y-%m-%d %H:%M").to_string(),
        )
        .await;
        self.log_mail_failure("changed-date", job.id, result);
        Ok(())
    }

    // Customer, replaced translator and new translator each get a copy.
    pub async fn notify_changed_translator(
        &self,
        job: &Job,
        old_translator: Option<&AssignmentSnapshot>,
        new_translator: &TranslatorRef,
    ) -> Result<(), ServiceError> {
        let (email, name) = self.customer_contact(job).await?;
        let result = mails::send_changed_translator_customer_email(
            &self.config,
            &email,
            &name,
            &job.id.to_string(),
        )
        .await;
        self.log_mail_failure("changed-translator", job.id, result);

        if let Some(old) = old_translator {
            if let Some(user) = self.db_client.get_user(old.user_id).await? {
                let result = mails::send_changed_translator_old_email(
                    &self.config,
                    &user.email,
                    &user.name,
                    &job.id.to_string(),
                )
                .await;
                self.log_mail_failure("changed-translator", job.id, result);
            }
        }

        if let Some(user) = self.db_client.get_user(new_translator.id).await? {
            let result = mails::send_changed_translator_new_email(
                &self.config,
                &user.email,
                &user.name,
                &job.id.to_string(),
            )
            .await;
            self.log_mail_failure("changed-translator", job.id, result);
        }

        Ok(())
    }

    pub async fn notify_changed_language(
        &self,
        job: &Job,
        old_language: &str,
    ) -> Result<(), ServiceError> {
        let (email, name) = self.customer_contact(job).await?;
        let new_language = self.language_name(job.from_language_id).await;
        let result = mails::send_changed_language_email(
            &self.config,
            &email,
            &name,
            &job.id.to_string(),
            old_language,
            &new_language,
        )
        .await;
        self.log_mail_failure("changed-lang", job.id, result);
        Ok(())
    }

    pub async fn send_session_start_reminder(
        &self,
        job: &Job,
        user_id: Uuid,
    ) -> Result<(), ServiceError> {
        let user = self
            .db_client
            .get_user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;
        let profile = self.db_client.get_user_profile(user_id).await?;

        let send = profile.as_ref().map_or(true, |p| !p.not_get_notification);
        if !send {
            return Ok(());
        }
        let now = Utc::now();
        let delayed = profile.map_or(false, |p| p.not_get_nighttime) && is_night_time(now);

        let language = self.language_name(job.from_language_id).await;
        let location = if job.customer_physical_type {
            format!("on site in {}", job.town.as_deref().unwrap_or("town"))
        } else {
            "by phone".to_string()
        };
        let message = format!(
            "Reminder: you have a {} interpretation ({}) at {} on {}, lasting {} min. \
             Good luck, and remember to leave feedback afterwards!",
            language,
            location,
            job.due.format("%H:%M"),
            job.due.format("%Y-%m-%d"),
            job.duration
        );

        let result = self
            .push_service
            .send_to_users(
                &[PushRecipient { email: user.email }],
                job.id,
                json!({ "notification_type": "session_start_remind" }),
                &message,
                delayed,
                now,
            )
            .await;
        if let Err(e) = result {
            tracing::warn!("Failed to push session reminder for job {}: {}", job.id, e);
        }
        Ok(())
    }

    pub async fn push_job_accepted_to_customer(&self, job: &Job) -> Result<(), ServiceError> {
        let user = self
            .db_client
            .get_user(job.user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(job.user_id))?;
        let profile = self.db_client.get_user_profile(job.user_id).await?;
        if profile.as_ref().is_some_and(|p| p.not_get_notification) {
            return Ok(());
        }
        let now = Utc::now();
        let delayed = profile.is_some_and(|p| p.not_get_nighttime) && is_night_time(now);

        let language = self.language_name(job.from_language_id).await;
        let message = format!(
            "Your booking for a {} interpreter, {}min, {} has been accepted by an interpreter. \
             Open the app to see the details.",
            language,
            job.duration,
            job.due.format("%Y-%m-%d %H:%M")
        );

        let result = self
            .push_service
            .send_to_users(
                &[PushRecipient { email: user.email }],
                job.id,
                json!({ "notification_type": "job_accepted" }),
                &message,
                delayed,
                now,
            )
            .await;
        if let Err(e) = result {
            tracing::warn!("Failed to push job-accepted for job {}: {}", job.id, e);
        }
        Ok(())
    }

    pub async fn push_job_cancelled(&self, job: &Job, user_id: Uuid) -> Result<(), ServiceError> {
        let user = self
            .db_client
            .get_user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;
        let profile = self.db_client.get_user_profile(user_id).await?;
        if profile.as_ref().is_some_and(|p| p.not_get_notification) {
            return Ok(());
        }
        let now = Utc::now();
        let delayed = profile.is_some_and(|p| p.not_get_nighttime) && is_night_time(now);

        let language = self.language_name(job.from_language_id).await;
        let message = format!(
            "The customer has cancelled the booking for a {} interpreter, {}min, {}. \
             Check your previous bookings for details.",
            language,
            job.duration,
            job.due.format("%Y-%m-%d %H:%M")
        );

        let result = self
            .push_service
            .send_to_users(
                &[PushRecipient { email: user.email }],
                job.id,
                json!({ "notification_type": "job_cancelled" }),
                &message,
                delayed,
                now,
            )
            .await;
        if let Err(e) = result {
            tracing::warn!("Failed to push job-cancelled for job {}: {}", job.id, e);
        }
        Ok(())
    }

    // Carries the id of whichever party did not initiate the end action.
    pub async fn notify_session_ended_event(
        &self,
        job: &Job,
        other_party_id: Uuid,
    ) -> Result<(), ServiceError> {
        let user = match self.db_client.get_user(other_party_id).await? {
            Some(user) => user,
            None => return Ok(()),
        };

        let message = format!("The interpretation session for booking #{} has ended.", job.id);
        let result = self
            .push_service
            .send_to_users(
                &[PushRecipient { email: user.email }],
                job.id,
                json!({
                    "notification_type": "session_ended",
                    "other_party_id": other_party_id,
                }),
                &message,
                false,
                Utc::now(),
            )
            .await;
        if let Err(e) = result {
            tracing::warn!("Failed to push session-ended for job {}: {}", job.id, e);
        }
        Ok(())
    }

    /// Fan the job out to every eligible translator, honoring the opt-outs:
    /// `not_get_notification` drops the push, `not_get_emergency` skips
    /// immediate-job broadcasts, `not_get_nighttime` delays to the next
    /// business morning.
    pub async fn broadcast_job_to_translators(
        &self,
        job: &Job,
        exclude_user_id: Option<Uuid>,
    ) -> Result<usize, ServiceError> {
        let candidates = self.matching_service.find_eligible_translators(job).await?;
        let now = Utc::now();

        let mut immediate_send: Vec<PushRecipient> = Vec::new();
        let mut delayed_send: Vec<PushRecipient> = Vec::new();

        for candidate in eligible_recipients(&candidates, job, exclude_user_id) {
            let recipient = PushRecipient {
                email: candidate.email.clone(),
            };
            if candidate.not_get_nighttime && is_night_time(now) {
                delayed_send.push(recipient);
            } else {
                immediate_send.push(recipient);
            }
        }

        let language = self.language_name(job.from_language_id).await;
        let message = if job.immediate {
            format!(
                "New emergency booking for a {} interpreter, {}min",
                language, job.duration
            )
        } else {
            format!(
                "New booking for a {} interpreter, {}min, {}",
                language,
                job.duration,
                job.due.format("%Y-%m-%d %H:%M")
            )
        };
        let data = json!({
            "notification_type": if job.immediate { "emergency_job" } else { "suitable_job" },
            "immediate": job.immediate,
            "language": language,
            "duration": job.duration,
            "due": job.due.format("%Y-%m-%d %H:%M").to_string(),
        });

        let total = immediate_send.len() + delayed_send.len();
        tracing::info!("Broadcasting job {} to {} translators", job.id, total);

        if let Err(e) = self
            .push_service
            .send_to_users(&immediate_send, job.id, data.clone(), &message, false, now)
            .await
        {
            tracing::warn!("Broadcast push failed for job {}: {}", job.id, e);
        }
        if let Err(e) = self
            .push_service
            .send_to_users(&delayed_send, job.id, data, &message, true, now)
            .await
        {
            tracing::warn!("Delayed broadcast push failed for job {}: {}", job.id, e);
        }

        Ok(total)
    }

    /// SMS fan-out to eligible translators. Per-number failures are logged
    /// and skipped; a missing gateway is the only hard (but still soft to the
    /// caller) failure.
    pub async fn send_sms_to_translators(&self, job: &Job) -> Result<usize, ServiceError> {
        if self.config.sms_gateway_url.is_empty() {
            return Err(ServiceError::Notification(
                "SMS gateway is not configured".to_string(),
            ));
        }

        let candidates = self.matching_service.find_eligible_translators(job).await?;

        let customer_city = self
            .db_client
            .get_user_profile(job.user_id)
            .await?
            .and_then(|p| p.city);
        let city = job
            .town
            .clone()
            .or(customer_city)
            .unwrap_or_else(|| "town".to_string());

        let date = job.due.format("%d.%m.%Y").to_string();
        let time = job.due.format("%H:%M").to_string();
        let duration = crate::utils::time::convert_to_hours_mins(job.duration);

        // Physical-only bookings get the on-site wording.
        let message = if job.customer_physical_type && !job.customer_phone_type {
            format!(
                "You have an on-site interpretation in {} on {} at {}, duration {}. Booking ref: {}",
                city, date, time, duration, job.id
            )
        } else {
            format!(
                "You have a phone interpretation on {} at {}, duration {}. Booking ref: {}",
                date, time, duration, job.id
            )
        };

        let mut sent = 0usize;
        for candidate in &candidates {
            let Some(phone) = candidate.phone.as_deref() else {
                continue;
            };
            match self.send_sms(phone, &message).await {
                Ok(()) => {
                    tracing::info!("Sent SMS to {} ({})", candidate.email, phone);
                    sent += 1;
                }
                Err(e) => {
                    tracing::warn!("SMS to {} ({}) failed: {}", candidate.email, phone, e);
                }
            }
        }

        Ok(sent)
    }

    async fn send_sms(&self, to_number: &str, message: &str) -> Result<(), String> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.notify_timeout_secs))
            .build()
            .map_err(|e| format!("Client error: {}", e))?;

        let response = client
            .post(&self.config.sms_gateway_url)
            .json(&json!({
                "from": self.config.sms_sender_number,
                "to": to_number,
                "message": message,
            }))
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(format!("SMS gateway error ({}): {}", status.as_u16(), body))
        }
    }

}

// Opt-out filter for broadcasts, shared so the push and SMS fan-outs cannot
// drift apart.
pub fn eligible_recipients<'a>(
    candidates: &'a [TranslatorCandidate],
    job: &Job,
    exclude_user_id: Option<Uuid>,
) -> Vec<&'a TranslatorCandidate> {
    candidates
        .iter()
        .filter(|c| Some(c.id) != exclude_user_id)
        .filter(|c| !c.not_get_notification)
        .filter(|c| !(job.immediate && c.not_get_emergency))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bookingmodel::{JobStatus, JobType};

    fn candidate(
        not_get_notification: bool,
        not_get_emergency: bool,
    ) -> TranslatorCandidate {
        TranslatorCandidate {
            id: Uuid::new_v4(),
            name: "Translator".to_string(),
            email: "translator@example.com".to_string(),
            phone: Some("+46700000000".to_string()),
            city: None,
            gender: None,
            translator_type: None,
            translator_level: None,
            not_get_emergency,
            not_get_nighttime: false,
            not_get_notification,
        }
    }

    fn job(immediate: bool) -> Job {
        Job {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_email: None,
            from_language_id: Uuid::new_v4(),
            immediate,
            due: Utc::now(),
            duration: 30,
            session_time: None,
            gender: None,
            certified: None,
            job_type: JobType::Paid,
            customer_phone_type: true,
            customer_physical_type: false,
            town: None,
            address: None,
            instructions: None,
            reference: None,
            admin_comments: None,
            status: JobStatus::Pending,
            specific_translator_id: None,
            withdraw_at: None,
            end_at: None,
            will_expire_at: None,
            ignore_flag: false,
            ignore_expired: false,
            ignore_feedback: false,
            flagged: false,
            manually_handled: false,
            by_admin: false,
            reminder_16h_sent: false,
            reminder_48h_sent: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn opted_out_translators_are_never_pushed() {
        let candidates = vec![candidate(true, false), candidate(false, false)];
        let recipients = eligible_recipients(&candidates, &job(false), None);
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].id, candidates[1].id);
    }

    #[test]
    fn emergency_opt_out_only_applies_to_immediate_jobs() {
        let candidates = vec![candidate(false, true)];
        assert_eq!(eligible_recipients(&candidates, &job(true), None).len(), 0);
        assert_eq!(eligible_recipients(&candidates, &job(false), None).len(), 1);
    }

    #[test]
    fn excluded_translator_is_skipped() {
        let candidates = vec![candidate(false, false)];
        let excluded = candidates[0].id;
        assert!(eligible_recipients(&candidates, &job(false), Some(excluded)).is_empty());
    }
}
