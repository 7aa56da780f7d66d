use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::bookingmodel::*;

//Booking creation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobDto {
    pub user_id: Uuid,

    pub from_language_id: Option<Uuid>,

    pub immediate: bool,

    // "m/d/Y" and "H:M", required for non-immediate bookings
    pub due_date: Option<String>,
    pub due_time: Option<String>,

    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration: Option<i32>,

    pub customer_phone_type: Option<bool>,
    pub customer_physical_type: Option<bool>,

    // Requirement tags picked by the customer: male/female,
    // normal/certified/certified_in_law/certified_in_health
    #[serde(default)]
    pub job_for: Vec<String>,

    pub town: Option<String>,

    pub by_admin: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobCreatedDto {
    pub id: Uuid,
    pub booking_type: String, // "immediate" or "regular"
    pub status: JobStatus,
    pub due: DateTime<Utc>,
}

//Booking update (admin screen)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateJobDto {
    pub acting_user_id: Uuid,

    pub status: Option<JobStatus>,

    pub due: Option<DateTime<Utc>>,

    pub from_language_id: Option<Uuid>,

    pub translator: Option<Uuid>,

    #[validate(email(message = "Translator email is invalid"))]
    pub translator_email: Option<String>,

    #[validate(length(max = 2000, message = "Admin comment is too long"))]
    pub admin_comments: Option<String>,

    #[validate(length(max = 200, message = "Reference is too long"))]
    pub reference: Option<String>,

    // "H:M:S", required when completing a started booking
    pub session_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JobEmailDto {
    pub job_id: Uuid,

    #[validate(email(message = "Email is invalid"))]
    pub user_email: Option<String>,

    pub reference: Option<String>,
    pub address: Option<String>,
    pub instructions: Option<String>,
    pub town: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptJobDto {
    pub job_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelJobDto {
    pub job_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndJobDto {
    pub job_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerNotCallDto {
    pub job_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReopenJobDto {
    pub job_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendNotificationsDto {
    pub job_id: Uuid,
}

// The distance feed posts stringly-typed booleans; parsing is explicit in the
// service (a flag is true iff the value is the literal "true").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceFeedDto {
    pub job_id: Uuid,
    pub distance: Option<String>,
    pub time: Option<String>,
    pub admin_comment: Option<String>,
    pub session_time: Option<String>,
    pub flagged: Option<String>,
    pub manually_handled: Option<String>,
    pub by_admin: Option<String>,
}

//Operator list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct JobFilterDto {
    pub acting_user_id: Option<Uuid>,

    pub id: Option<Vec<Uuid>>,

    // "created" or "due"
    pub filter_timetype: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,

    // "physical" or "phone"
    pub booking_type: Option<String>,

    pub feedback: Option<bool>,

    pub lang: Option<Vec<Uuid>>,
    pub status: Option<Vec<JobStatus>>,
    pub job_type: Option<Vec<JobType>>,

    pub customer_email: Option<String>,
    pub translator_email: Option<String>,

    #[validate(range(min = 1, message = "Page must be positive"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotentialJobsDto {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserJobsDto {
    pub emergency_jobs: Vec<Job>,
    pub normal_jobs: Vec<Job>,
    pub usertype: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: &str) -> ApiResponse<()> {
        ApiResponse {
            status: "fail".to_string(),
            message: message.to_string(),
            data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub status: String,
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}
