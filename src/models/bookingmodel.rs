use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Assigned,
    Started,
    Completed,
    Withdrawbefore24,
    Withdrawafter24,
    Timedout,
    NotCarriedOutCustomer,
}

impl JobStatus {
    pub fn to_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Assigned => "assigned",
            JobStatus::Started => "started",
            JobStatus::Completed => "completed",
            JobStatus::Withdrawbefore24 => "withdrawbefore24",
            JobStatus::Withdrawafter24 => "withdrawafter24",
            JobStatus::Timedout => "timedout",
            JobStatus::NotCarriedOutCustomer => "not_carried_out_customer",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed
                | JobStatus::Withdrawbefore24
                | JobStatus::Withdrawafter24
                | JobStatus::Timedout
                | JobStatus::NotCarriedOutCustomer
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "job_type", rename_all = "snake_case")]
pub enum JobType {
    Paid,
    Rws,
    Unpaid,
}

impl JobType {
    pub fn to_str(&self) -> &str {
        match self {
            JobType::Paid => "paid",
            JobType::Rws => "rws",
            JobType::Unpaid => "unpaid",
        }
    }
}

// What certification the customer asked for. The n_* variants are the
// "preferred but not mandatory" flavors of law/health.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "certified_requirement", rename_all = "snake_case")]
pub enum CertifiedRequirement {
    Normal,
    Yes,
    Both,
    Law,
    NLaw,
    Health,
    NHealth,
}

impl CertifiedRequirement {
    pub fn to_str(&self) -> &str {
        match self {
            CertifiedRequirement::Normal => "normal",
            CertifiedRequirement::Yes => "yes",
            CertifiedRequirement::Both => "both",
            CertifiedRequirement::Law => "law",
            CertifiedRequirement::NLaw => "n_law",
            CertifiedRequirement::Health => "health",
            CertifiedRequirement::NHealth => "n_health",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "gender_kind", rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn to_str(&self) -> &str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub user_id: Uuid,
    // Overrides the customer's account email for notifications when present.
    pub user_email: Option<String>,
    pub from_language_id: Uuid,
    pub immediate: bool,
    pub due: DateTime<Utc>,
    pub duration: i32,
    pub session_time: Option<String>,
    pub gender: Option<Gender>,
    pub certified: Option<CertifiedRequirement>,
    pub job_type: JobType,
    pub customer_phone_type: bool,
    pub customer_physical_type: bool,
    pub town: Option<String>,
    pub address: Option<String>,
    pub instructions: Option<String>,
    pub reference: Option<String>,
    pub admin_comments: Option<String>,
    pub status: JobStatus,
    // Pre-earmarks the job for one translator, excluding all others.
    pub specific_translator_id: Option<Uuid>,
    pub withdraw_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub will_expire_at: Option<DateTime<Utc>>,
    // Operator suppression markers for the admin alert/expiry screens.
    pub ignore_flag: bool,
    pub ignore_expired: bool,
    pub ignore_feedback: bool,
    pub flagged: bool,
    pub manually_handled: bool,
    pub by_admin: bool,
    // Customer reminder bookkeeping, cleared when a booking is reopened.
    pub reminder_16h_sent: bool,
    pub reminder_48h_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// One row per translator-job linkage. At most one row per job may have both
// completed_at and cancel_at null (the active assignment); replacement stamps
// cancel_at on the superseded row, never overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TranslatorAssignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<Uuid>,
    pub cancel_at: Option<DateTime<Utc>>,
}

impl TranslatorAssignment {
    pub fn is_active(&self) -> bool {
        self.completed_at.is_none() && self.cancel_at.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Language {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobFeedback {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobDistance {
    pub job_id: Uuid,
    pub distance: Option<String>,
    pub travel_time: Option<String>,
}

// Insert payload for jobs; the db layer fills id/created_at/updated_at.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub user_id: Uuid,
    pub user_email: Option<String>,
    pub from_language_id: Uuid,
    pub immediate: bool,
    pub due: DateTime<Utc>,
    pub duration: i32,
    pub gender: Option<Gender>,
    pub certified: Option<CertifiedRequirement>,
    pub job_type: JobType,
    pub customer_phone_type: bool,
    pub customer_physical_type: bool,
    pub town: Option<String>,
    pub address: Option<String>,
    pub instructions: Option<String>,
    pub reference: Option<String>,
    pub admin_comments: Option<String>,
    pub status: JobStatus,
    pub specific_translator_id: Option<Uuid>,
    pub will_expire_at: Option<DateTime<Utc>>,
    pub by_admin: bool,
}
