use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::bookingmodel::{Gender, JobType};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Customer,
    Translator,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::SuperAdmin => "super_admin",
            UserRole::Admin => "admin",
            UserRole::Customer => "customer",
            UserRole::Translator => "translator",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "consumer_type", rename_all = "snake_case")]
pub enum ConsumerType {
    Paid,
    Rwsconsumer,
    Ngo,
}

impl ConsumerType {
    pub fn to_str(&self) -> &str {
        match self {
            ConsumerType::Paid => "paid",
            ConsumerType::Rwsconsumer => "rwsconsumer",
            ConsumerType::Ngo => "ngo",
        }
    }

    // The consumer category of the creating customer decides how the job is billed.
    pub fn job_type(&self) -> JobType {
        match self {
            ConsumerType::Rwsconsumer => JobType::Rws,
            ConsumerType::Ngo => JobType::Unpaid,
            ConsumerType::Paid => JobType::Paid,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "translator_category", rename_all = "snake_case")]
pub enum TranslatorCategory {
    Professional,
    Rwstranslator,
    Volunteer,
    Both,
}

impl TranslatorCategory {
    pub fn to_str(&self) -> &str {
        match self {
            TranslatorCategory::Professional => "professional",
            TranslatorCategory::Rwstranslator => "rwstranslator",
            TranslatorCategory::Volunteer => "volunteer",
            TranslatorCategory::Both => "both",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "translator_level", rename_all = "snake_case")]
pub enum TranslatorLevel {
    Certified,
    CertifiedLaw,
    CertifiedHealth,
    Layman,
    ReadCourses,
}

impl TranslatorLevel {
    pub fn to_str(&self) -> &str {
        match self {
            TranslatorLevel::Certified => "certified",
            TranslatorLevel::CertifiedLaw => "certified_law",
            TranslatorLevel::CertifiedHealth => "certified_health",
            TranslatorLevel::Layman => "layman",
            TranslatorLevel::ReadCourses => "read_courses",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub active: bool,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

// Marketplace-specific profile data; one row per user. Customers carry a
// consumer type, translators a category/level and notification opt-outs.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub consumer_type: Option<ConsumerType>,
    pub translator_type: Option<TranslatorCategory>,
    pub translator_level: Option<TranslatorLevel>,
    pub gender: Option<Gender>,
    pub city: Option<String>,
    pub instructions: Option<String>,
    pub not_get_emergency: bool,
    pub not_get_nighttime: bool,
    pub not_get_notification: bool,
}

// Joined user + profile row returned by the translator matching query.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct TranslatorCandidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub gender: Option<Gender>,
    pub translator_type: Option<TranslatorCategory>,
    pub translator_level: Option<TranslatorLevel>,
    pub not_get_emergency: bool,
    pub not_get_nighttime: bool,
    pub not_get_notification: bool,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct UserLanguage {
    pub user_id: Uuid,
    pub lang_id: Uuid,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct BlacklistEntry {
    pub user_id: Uuid,
    pub translator_id: Uuid,
}
