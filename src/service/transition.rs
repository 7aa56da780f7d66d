// service/transition.rs
//
// Pure planner for booking updates. Given the persisted job, the active
// assignment and the requested changes, it computes the next state, the audit
// trail and an ordered side-effect list. Nothing here touches the database or
// the notification gateway; the booking service persists the plan and then
// dispatches the effects.
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::bookingmodel::{Job, JobStatus};
use crate::utils::time::humanize_session_time;

// What the engine needs to know about the assignment currently in force.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentSnapshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
}

// A requested translator, already resolved from id or email.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatorRef {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateChanges {
    pub status: Option<JobStatus>,
    pub due: Option<DateTime<Utc>>,
    pub from_language_id: Option<Uuid>,
    pub translator: Option<TranslatorRef>,
    pub admin_comments: Option<String>,
    pub reference: Option<String>,
    pub session_time: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateContext {
    pub now: DateTime<Utc>,
    // Display names for the language audit entry; `new_language_name` is only
    // looked up when the requested language differs.
    pub old_language_name: String,
    pub new_language_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionParty {
    Customer,
    ActiveTranslator,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReminderParty {
    Customer,
    NewTranslator,
}

// Side effects the executor dispatches after the state change is persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    EmailBookingReopened,
    EmailJobAccepted,
    EmailJobAcceptedToTranslator,
    EmailSessionEnded {
        recipient: SessionParty,
        session_time: String,
    },
    EmailBookingCancelled,
    EmailJobCancelledToTranslator,
    EmailChangedDate {
        old_due: DateTime<Utc>,
    },
    EmailChangedTranslator {
        old_translator: Option<AssignmentSnapshot>,
        new_translator: TranslatorRef,
    },
    EmailChangedLanguage {
        old_language: String,
    },
    SessionStartReminder {
        recipient: ReminderParty,
    },
    BroadcastToTranslators,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub field: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

impl AuditEntry {
    fn new(field: &str, old: Option<String>, new: Option<String>) -> Self {
        AuditEntry {
            field: field.to_string(),
            old,
            new,
        }
    }
}

#[derive(Debug)]
pub struct UpdatePlan {
    // Mutated copy of the job, ready to persist.
    pub job: Job,
    pub translator_changed: bool,
    pub date_changed: bool,
    pub lang_changed: bool,
    pub status_changed: bool,
    // Ledger replacement to execute: insert for `new_translator`, stamp
    // cancel_at on `replaced_assignment`.
    pub new_translator: Option<TranslatorRef>,
    pub replaced_assignment: Option<Uuid>,
    pub audit: Vec<AuditEntry>,
    pub effects: Vec<Effect>,
    // Past-due bookings are saved silently: mutations stand, effects dropped.
    pub past_due: bool,
}

impl UpdatePlan {
    pub fn has_changes(&self) -> bool {
        self.translator_changed || self.date_changed || self.lang_changed || self.status_changed
    }
}

pub fn plan_update(
    job: &Job,
    current_assignment: Option<&AssignmentSnapshot>,
    changes: &UpdateChanges,
    ctx: &UpdateContext,
) -> UpdatePlan {
    let mut job = job.clone();
    let mut audit: Vec<AuditEntry> = Vec::new();
    let mut effects: Vec<Effect> = Vec::new();

    // Translator delta: a change happens when the requested translator differs
    // from the active one, or when there is none and one is requested.
    let (translator_changed, new_translator, replaced_assignment) =
        match (current_assignment, &changes.translator) {
            (Some(current), Some(requested)) if requested.id != current.user_id => {
                audit.push(AuditEntry::new(
                    "translator",
                    Some(current.user_email.clone()),
                    Some(requested.email.clone()),
                ));
                (true, Some(requested.clone()), Some(current.id))
            }
            (None, Some(requested)) => {
                audit.push(AuditEntry::new(
                    "translator",
                    None,
                    Some(requested.email.clone()),
                ));
                (true, Some(requested.clone()), None)
            }
            _ => (false, None, None),
        };

    // Due delta
    let mut date_changed = false;
    let mut old_due: Option<DateTime<Utc>> = None;
    if let Some(due) = changes.due {
        if due != job.due {
            audit.push(AuditEntry::new(
                "due",
                Some(job.due.to_rfc3339()),
                Some(due.to_rfc3339()),
            ));
            old_due = Some(job.due);
            job.due = due;
            date_changed = true;
        }
    }

    // Language delta
    let mut lang_changed = false;
    let mut old_language: Option<String> = None;
    if let Some(lang) = changes.from_language_id {
        if lang != job.from_language_id {
            audit.push(AuditEntry::new(
                "language",
                Some(ctx.old_language_name.clone()),
                ctx.new_language_name.clone(),
            ));
            old_language = Some(ctx.old_language_name.clone());
            job.from_language_id = lang;
            lang_changed = true;
        }
    }

    // Status delta, dispatched on the job's current status.
    let old_status = job.status;
    let status_changed = plan_status_change(&mut job, changes, translator_changed, ctx, &mut effects);
    if status_changed {
        audit.push(AuditEntry::new(
            "status",
            Some(old_status.to_str().to_string()),
            Some(job.status.to_str().to_string()),
        ));
    }

    if let Some(comment) = &changes.admin_comments {
        job.admin_comments = Some(comment.clone());
    }
    if let Some(reference) = &changes.reference {
        job.reference = Some(reference.clone());
    }

    if let Some(old_due) = old_due {
        effects.push(Effect::EmailChangedDate { old_due });
    }
    if let Some(new_translator) = &new_translator {
        effects.push(Effect::EmailChangedTranslator {
            old_translator: current_assignment.cloned(),
            new_translator: new_translator.clone(),
        });
    }
    if let Some(old_language) = old_language {
        effects.push(Effect::EmailChangedLanguage { old_language });
    }

    let past_due = job.due <= ctx.now;
    if past_due {
        effects.clear();
    }

    UpdatePlan {
        job,
        translator_changed,
        date_changed,
        lang_changed,
        status_changed,
        new_translator,
        replaced_assignment,
        audit,
        effects,
        past_due,
    }
}

// One arm per current status. A handler either mutates the job and returns
// true, or returns false: the transition is illegal and nothing changes.
fn plan_status_change(
    job: &mut Job,
    changes: &UpdateChanges,
    translator_changed: bool,
    ctx: &UpdateContext,
    effects: &mut Vec<Effect>,
) -> bool {
    let target = match changes.status {
        Some(target) if target != job.status => target,
        _ => return false,
    };
    let comment = changes.admin_comments.as_deref().unwrap_or("");

    match job.status {
        JobStatus::Timedout => {
            if target == JobStatus::Pending {
                // Reopen in place: fresh response window, reminders rearmed.
                job.status = JobStatus::Pending;
                job.created_at = ctx.now;
                job.reminder_16h_sent = false;
                job.reminder_48h_sent = false;
                effects.push(Effect::EmailBookingReopened);
                effects.push(Effect::BroadcastToTranslators);
                true
            } else if translator_changed {
                job.status = target;
                effects.push(Effect::EmailJobAccepted);
                true
            } else {
                false
            }
        }
        JobStatus::Completed => {
            job.status = target;
            true
        }
        JobStatus::Started => {
            if comment.is_empty() {
                return false;
            }
            if target == JobStatus::Completed {
                let session_time = changes.session_time.as_deref().unwrap_or("");
                if session_time.is_empty() {
                    return false;
                }
                job.end_at = Some(ctx.now);
                job.session_time = Some(session_time.to_string());
                let human = humanize_session_time(session_time)
                    .unwrap_or_else(|| session_time.to_string());
                effects.push(Effect::EmailSessionEnded {
                    recipient: SessionParty::Customer,
                    session_time: human.clone(),
                });
                effects.push(Effect::EmailSessionEnded {
                    recipient: SessionParty::ActiveTranslator,
                    session_time: human,
                });
            }
            job.status = target;
            true
        }
        JobStatus::Pending => {
            if target == JobStatus::Timedout && comment.is_empty() {
                return false;
            }
            job.status = target;
            if target == JobStatus::Assigned && translator_changed {
                effects.push(Effect::EmailJobAccepted);
                effects.push(Effect::EmailJobAcceptedToTranslator);
                effects.push(Effect::SessionStartReminder {
                    recipient: ReminderParty::Customer,
                });
                effects.push(Effect::SessionStartReminder {
                    recipient: ReminderParty::NewTranslator,
                });
            } else {
                effects.push(Effect::EmailBookingCancelled);
            }
            true
        }
        JobStatus::Withdrawafter24 => {
            if target == JobStatus::Timedout && !comment.is_empty() {
                job.status = target;
                true
            } else {
                false
            }
        }
        JobStatus::Assigned => {
            let withdraw = matches!(
                target,
                JobStatus::Withdrawbefore24 | JobStatus::Withdrawafter24
            );
            if !withdraw && target != JobStatus::Timedout {
                return false;
            }
            if target == JobStatus::Timedout && comment.is_empty() {
                return false;
            }
            job.status = target;
            if withdraw {
                effects.push(Effect::EmailBookingCancelled);
                effects.push(Effect::EmailJobCancelledToTranslator);
            }
            true
        }
        // Withdrawn and not-carried-out bookings are closed for status edits;
        // only the translator/due/language deltas still apply.
        JobStatus::Withdrawbefore24 | JobStatus::NotCarriedOutCustomer => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bookingmodel::{CertifiedRequirement, Gender, JobType};
    use chrono::{Duration, TimeZone};

    fn ts(s: &str) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap(),
        )
    }

    fn base_job(status: JobStatus) -> Job {
        Job {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_email: None,
            from_language_id: Uuid::new_v4(),
            immediate: false,
            due: ts("2024-06-10 10:00:00"),
            duration: 60,
            session_time: None,
            gender: Some(Gender::Female),
            certified: Some(CertifiedRequirement::Normal),
            job_type: JobType::Paid,
            customer_phone_type: true,
            customer_physical_type: false,
            town: Some("Stockholm".to_string()),
            address: None,
            instructions: None,
            reference: None,
            admin_comments: None,
            status,
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
            reminder_16h_sent: true,
            reminder_48h_sent: true,
            created_at: ts("2024-06-01 10:00:00"),
            updated_at: ts("2024-06-01 10:00:00"),
        }
    }

    fn ctx_at(now: DateTime<Utc>) -> UpdateContext {
        UpdateContext {
            now,
            old_language_name: "French".to_string(),
            new_language_name: None,
        }
    }

    fn ctx() -> UpdateContext {
        ctx_at(ts("2024-06-05 10:00:00"))
    }

    fn snapshot() -> AssignmentSnapshot {
        AssignmentSnapshot {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_email: "old.translator@example.com".to_string(),
        }
    }

    fn translator_ref() -> TranslatorRef {
        TranslatorRef {
            id: Uuid::new_v4(),
            email: "new.translator@example.com".to_string(),
        }
    }

    #[test]
    fn identical_payload_is_a_no_op() {
        let job = base_job(JobStatus::Assigned);
        let current = snapshot();
        let changes = UpdateChanges {
            status: Some(job.status),
            due: Some(job.due),
            from_language_id: Some(job.from_language_id),
            translator: Some(TranslatorRef {
                id: current.user_id,
                email: current.user_email.clone(),
            }),
            ..Default::default()
        };

        let plan = plan_update(&job, Some(&current), &changes, &ctx());

        assert!(!plan.has_changes());
        assert!(plan.effects.is_empty());
        assert!(plan.audit.is_empty());
        assert!(plan.new_translator.is_none());
    }

    #[test]
    fn past_due_saves_silently_with_zero_effects() {
        let now = ts("2024-06-05 10:00:00");
        let mut job = base_job(JobStatus::Pending);
        job.due = now - Duration::seconds(10);

        let changes = UpdateChanges {
            status: Some(JobStatus::Assigned),
            due: Some(now - Duration::seconds(1)),
            from_language_id: Some(Uuid::new_v4()),
            translator: Some(translator_ref()),
            ..Default::default()
        };
        let mut ctx = ctx_at(now);
        ctx.new_language_name = Some("German".to_string());

        let plan = plan_update(&job, None, &changes, &ctx);

        assert!(plan.past_due);
        assert!(plan.translator_changed);
        assert!(plan.date_changed);
        assert!(plan.lang_changed);
        assert!(plan.status_changed);
        // The record is updated but no notification fires.
        assert_eq!(plan.job.due, now - Duration::seconds(1));
        assert!(plan.effects.is_empty());
        assert_eq!(plan.audit.len(), 4);
    }

    #[test]
    fn pending_to_assigned_with_new_translator_notifies_both_parties() {
        let job = base_job(JobStatus::Pending);
        let changes = UpdateChanges {
            status: Some(JobStatus::Assigned),
            translator: Some(translator_ref()),
            ..Default::default()
        };

        let plan = plan_update(&job, None, &changes, &ctx());

        assert!(plan.status_changed);
        assert_eq!(plan.job.status, JobStatus::Assigned);
        assert_eq!(
            plan.effects[..4],
            [
                Effect::EmailJobAccepted,
                Effect::EmailJobAcceptedToTranslator,
                Effect::SessionStartReminder {
                    recipient: ReminderParty::Customer
                },
                Effect::SessionStartReminder {
                    recipient: ReminderParty::NewTranslator
                },
            ]
        );
        // The translator-change notification follows the status effects.
        assert!(matches!(
            plan.effects[4],
            Effect::EmailChangedTranslator { .. }
        ));
    }

    #[test]
    fn pending_to_timedout_requires_admin_comment() {
        let job = base_job(JobStatus::Pending);
        let changes = UpdateChanges {
            status: Some(JobStatus::Timedout),
            ..Default::default()
        };

        let plan = plan_update(&job, None, &changes, &ctx());

        assert!(!plan.status_changed);
        assert_eq!(plan.job.status, JobStatus::Pending);
        assert!(plan.effects.is_empty());
    }

    #[test]
    fn pending_to_other_status_emails_cancellation() {
        let job = base_job(JobStatus::Pending);
        let changes = UpdateChanges {
            status: Some(JobStatus::Withdrawbefore24),
            ..Default::default()
        };

        let plan = plan_update(&job, None, &changes, &ctx());

        assert!(plan.status_changed);
        assert_eq!(plan.effects, vec![Effect::EmailBookingCancelled]);
    }

    #[test]
    fn started_rejects_without_comment() {
        let job = base_job(JobStatus::Started);
        let changes = UpdateChanges {
            status: Some(JobStatus::Completed),
            session_time: Some("1:30:00".to_string()),
            ..Default::default()
        };

        let plan = plan_update(&job, None, &changes, &ctx());

        assert!(!plan.status_changed);
        assert_eq!(plan.job.status, JobStatus::Started);
    }

    #[test]
    fn started_to_completed_requires_session_time() {
        let job = base_job(JobStatus::Started);
        let changes = UpdateChanges {
            status: Some(JobStatus::Completed),
            admin_comments: Some("wrapped up by operator".to_string()),
            ..Default::default()
        };

        let plan = plan_update(&job, None, &changes, &ctx());

        assert!(!plan.status_changed);
        assert!(plan.job.end_at.is_none());
    }

    #[test]
    fn started_to_completed_emails_both_with_human_duration() {
        let job = base_job(JobStatus::Started);
        let changes = UpdateChanges {
            status: Some(JobStatus::Completed),
            admin_comments: Some("wrapped up by operator".to_string()),
            session_time: Some("1:30:00".to_string()),
            ..Default::default()
        };
        let ctx = ctx();

        let plan = plan_update(&job, None, &changes, &ctx);

        assert!(plan.status_changed);
        assert_eq!(plan.job.status, JobStatus::Completed);
        assert_eq!(plan.job.end_at, Some(ctx.now));
        assert_eq!(plan.job.session_time.as_deref(), Some("1:30:00"));
        assert_eq!(
            plan.effects,
            vec![
                Effect::EmailSessionEnded {
                    recipient: SessionParty::Customer,
                    session_time: "1h 30min".to_string(),
                },
                Effect::EmailSessionEnded {
                    recipient: SessionParty::ActiveTranslator,
                    session_time: "1h 30min".to_string(),
                },
            ]
        );
    }

    #[test]
    fn timedout_to_pending_reopens_and_rebroadcasts() {
        let job = base_job(JobStatus::Timedout);
        let changes = UpdateChanges {
            status: Some(JobStatus::Pending),
            ..Default::default()
        };
        let ctx = ctx();

        let plan = plan_update(&job, None, &changes, &ctx);

        assert!(plan.status_changed);
        assert_eq!(plan.job.status, JobStatus::Pending);
        assert_eq!(plan.job.created_at, ctx.now);
        assert!(!plan.job.reminder_16h_sent);
        assert!(!plan.job.reminder_48h_sent);
        assert_eq!(
            plan.effects,
            vec![Effect::EmailBookingReopened, Effect::BroadcastToTranslators]
        );
    }

    #[test]
    fn timedout_with_translator_change_accepts() {
        let job = base_job(JobStatus::Timedout);
        let current = snapshot();
        let changes = UpdateChanges {
            status: Some(JobStatus::Assigned),
            translator: Some(translator_ref()),
            ..Default::default()
        };

        let plan = plan_update(&job, Some(&current), &changes, &ctx());

        assert!(plan.status_changed);
        assert_eq!(plan.job.status, JobStatus::Assigned);
        // created_at untouched on this path.
        assert_eq!(plan.job.created_at, base_job(JobStatus::Timedout).created_at);
        assert_eq!(plan.effects[0], Effect::EmailJobAccepted);
        assert_eq!(plan.replaced_assignment, Some(current.id));
    }

    #[test]
    fn timedout_without_translator_or_reopen_is_rejected() {
        let job = base_job(JobStatus::Timedout);
        let changes = UpdateChanges {
            status: Some(JobStatus::Completed),
            ..Default::default()
        };

        let plan = plan_update(&job, None, &changes, &ctx());

        assert!(!plan.status_changed);
    }

    #[test]
    fn completed_stores_any_requested_status() {
        let job = base_job(JobStatus::Completed);
        let changes = UpdateChanges {
            status: Some(JobStatus::Timedout),
            admin_comments: Some("closed too early".to_string()),
            ..Default::default()
        };

        let plan = plan_update(&job, None, &changes, &ctx());

        assert!(plan.status_changed);
        assert_eq!(plan.job.status, JobStatus::Timedout);
        assert_eq!(plan.job.admin_comments.as_deref(), Some("closed too early"));
        assert!(plan.effects.is_empty());
    }

    #[test]
    fn withdrawafter24_only_goes_to_timedout_with_comment() {
        let job = base_job(JobStatus::Withdrawafter24);

        let no_comment = UpdateChanges {
            status: Some(JobStatus::Timedout),
            ..Default::default()
        };
        assert!(!plan_update(&job, None, &no_comment, &ctx()).status_changed);

        let wrong_target = UpdateChanges {
            status: Some(JobStatus::Pending),
            admin_comments: Some("note".to_string()),
            ..Default::default()
        };
        assert!(!plan_update(&job, None, &wrong_target, &ctx()).status_changed);

        let ok = UpdateChanges {
            status: Some(JobStatus::Timedout),
            admin_comments: Some("note".to_string()),
            ..Default::default()
        };
        let plan = plan_update(&job, None, &ok, &ctx());
        assert!(plan.status_changed);
        assert!(plan.effects.is_empty());
    }

    #[test]
    fn assigned_withdraw_notifies_customer_and_translator() {
        let job = base_job(JobStatus::Assigned);
        let changes = UpdateChanges {
            status: Some(JobStatus::Withdrawafter24),
            ..Default::default()
        };

        let plan = plan_update(&job, None, &changes, &ctx());

        assert!(plan.status_changed);
        assert_eq!(
            plan.effects,
            vec![
                Effect::EmailBookingCancelled,
                Effect::EmailJobCancelledToTranslator,
            ]
        );
    }

    #[test]
    fn assigned_rejects_disallowed_targets() {
        let job = base_job(JobStatus::Assigned);
        let changes = UpdateChanges {
            status: Some(JobStatus::Completed),
            admin_comments: Some("note".to_string()),
            ..Default::default()
        };

        let plan = plan_update(&job, None, &changes, &ctx());

        assert!(!plan.status_changed);
        assert_eq!(plan.job.status, JobStatus::Assigned);
    }

    #[test]
    fn assigned_to_timedout_requires_comment() {
        let job = base_job(JobStatus::Assigned);
        let changes = UpdateChanges {
            status: Some(JobStatus::Timedout),
            ..Default::default()
        };
        assert!(!plan_update(&job, None, &changes, &ctx()).status_changed);
    }

    #[test]
    fn replacing_translator_records_old_and_new_email() {
        let job = base_job(JobStatus::Assigned);
        let current = snapshot();
        let requested = translator_ref();
        let changes = UpdateChanges {
            translator: Some(requested.clone()),
            ..Default::default()
        };

        let plan = plan_update(&job, Some(&current), &changes, &ctx());

        assert!(plan.translator_changed);
        assert_eq!(plan.replaced_assignment, Some(current.id));
        assert_eq!(plan.new_translator, Some(requested.clone()));
        assert_eq!(
            plan.audit,
            vec![AuditEntry::new(
                "translator",
                Some(current.user_email.clone()),
                Some(requested.email.clone()),
            )]
        );
        assert_eq!(
            plan.effects,
            vec![Effect::EmailChangedTranslator {
                old_translator: Some(current),
                new_translator: requested,
            }]
        );
    }

    #[test]
    fn same_translator_requested_is_not_a_change() {
        let job = base_job(JobStatus::Assigned);
        let current = snapshot();
        let changes = UpdateChanges {
            translator: Some(TranslatorRef {
                id: current.user_id,
                email: current.user_email.clone(),
            }),
            ..Default::default()
        };

        let plan = plan_update(&job, Some(&current), &changes, &ctx());

        assert!(!plan.translator_changed);
        assert!(plan.new_translator.is_none());
    }

    #[test]
    fn due_and_language_changes_audit_and_notify_in_order() {
        let mut job = base_job(JobStatus::Withdrawbefore24);
        job.due = ts("2024-06-10 10:00:00");
        let new_due = ts("2024-06-11 09:00:00");
        let new_lang = Uuid::new_v4();
        let changes = UpdateChanges {
            due: Some(new_due),
            from_language_id: Some(new_lang),
            ..Default::default()
        };
        let mut ctx = ctx();
        ctx.new_language_name = Some("German".to_string());

        let plan = plan_update(&job, None, &changes, &ctx);

        assert!(plan.date_changed);
        assert!(plan.lang_changed);
        // Status delta is a no-op for withdrawn bookings.
        assert!(!plan.status_changed);
        assert_eq!(
            plan.effects,
            vec![
                Effect::EmailChangedDate {
                    old_due: ts("2024-06-10 10:00:00")
                },
                Effect::EmailChangedLanguage {
                    old_language: "French".to_string()
                },
            ]
        );
        assert_eq!(plan.audit[0].field, "due");
        assert_eq!(plan.audit[1].field, "language");
        assert_eq!(plan.audit[1].new.as_deref(), Some("German"));
    }
}
