// service/matching_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{bookingdb::BookingExt, db::DBClient, userdb::UserExt},
    models::{
        bookingmodel::{CertifiedRequirement, Job, JobType},
        usermodel::{TranslatorCandidate, TranslatorCategory, TranslatorLevel},
    },
    service::error::ServiceError,
};

#[derive(Debug, Clone)]
pub struct MatchingService {
    db_client: Arc<DBClient>,
}

pub fn required_category_for(job_type: JobType) -> TranslatorCategory {
    match job_type {
        JobType::Paid => TranslatorCategory::Professional,
        JobType::Rws => TranslatorCategory::Rwstranslator,
        JobType::Unpaid => TranslatorCategory::Volunteer,
    }
}

pub fn job_type_for_category(category: TranslatorCategory) -> JobType {
    match category {
        TranslatorCategory::Professional => JobType::Paid,
        TranslatorCategory::Rwstranslator => JobType::Rws,
        _ => JobType::Unpaid,
    }
}

/// Translator levels that satisfy a job's certification requirement. An empty
/// requirement accepts every level, which the queries express by skipping the
/// level filter entirely.
pub fn acceptable_levels_for(certified: Option<CertifiedRequirement>) -> Vec<TranslatorLevel> {
    match certified {
        Some(CertifiedRequirement::Yes) | Some(CertifiedRequirement::Both) => vec![
            TranslatorLevel::Certified,
            TranslatorLevel::CertifiedLaw,
            TranslatorLevel::CertifiedHealth,
        ],
        Some(CertifiedRequirement::Law) | Some(CertifiedRequirement::NLaw) => {
            vec![TranslatorLevel::CertifiedLaw]
        }
        Some(CertifiedRequirement::Health) | Some(CertifiedRequirement::NHealth) => {
            vec![TranslatorLevel::CertifiedHealth]
        }
        Some(CertifiedRequirement::Normal) => {
            vec![TranslatorLevel::Layman, TranslatorLevel::ReadCourses]
        }
        None => vec![],
    }
}

/// Inverse of `acceptable_levels_for`: which certification requirements a
/// translator of the given level can serve.
pub fn acceptable_certified_for_level(level: TranslatorLevel) -> Vec<CertifiedRequirement> {
    match level {
        TranslatorLevel::Certified => {
            vec![CertifiedRequirement::Yes, CertifiedRequirement::Both]
        }
        TranslatorLevel::CertifiedLaw => vec![
            CertifiedRequirement::Yes,
            CertifiedRequirement::Both,
            CertifiedRequirement::Law,
            CertifiedRequirement::NLaw,
        ],
        TranslatorLevel::CertifiedHealth => vec![
            CertifiedRequirement::Yes,
            CertifiedRequirement::Both,
            CertifiedRequirement::Health,
            CertifiedRequirement::NHealth,
        ],
        TranslatorLevel::Layman | TranslatorLevel::ReadCourses => {
            vec![CertifiedRequirement::Normal]
        }
    }
}

/// The one exclusion predicate both matching directions share. A job is closed
/// to a translator when it is earmarked for somebody else, or when it demands
/// physical presence with no phone fallback and the towns differ.
pub fn is_job_open_to_translator(
    job: &Job,
    translator_id: Uuid,
    translator_town: Option<&str>,
    customer_town: Option<&str>,
) -> bool {
    if let Some(locked_to) = job.specific_translator_id {
        if locked_to != translator_id {
            return false;
        }
    }

    if job.customer_physical_type && !job.customer_phone_type {
        let job_town = job.town.as_deref().or(customer_town);
        let same_town = match (job_town, translator_town) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        };
        if !same_town {
            return false;
        }
    }

    true
}

impl MatchingService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn find_eligible_translators(
        &self,
        job: &Job,
    ) -> Result<Vec<TranslatorCandidate>, ServiceError> {
        let blacklist = self
            .db_client
            .get_blacklisted_translators(job.user_id)
            .await?;

        let candidates = self
            .db_client
            .eligible_translator_candidates(
                required_category_for(job.job_type),
                job.from_language_id,
                job.gender,
                &acceptable_levels_for(job.certified),
                &blacklist,
            )
            .await?;

        let customer_town = self
            .db_client
            .get_user_profile(job.user_id)
            .await?
            .and_then(|profile| profile.city);

        Ok(candidates
            .into_iter()
            .filter(|candidate| {
                is_job_open_to_translator(
                    job,
                    candidate.id,
                    candidate.city.as_deref(),
                    customer_town.as_deref(),
                )
            })
            .collect())
    }

    pub async fn find_potential_jobs_for_translator(
        &self,
        translator_id: Uuid,
    ) -> Result<Vec<Job>, ServiceError> {
        let profile = self
            .db_client
            .get_user_profile(translator_id)
            .await?
            .ok_or(ServiceError::UserNotFound(translator_id))?;

        let category = profile
            .translator_type
            .unwrap_or(TranslatorCategory::Volunteer);
        let languages = self.db_client.get_user_languages(translator_id).await?;

        let acceptable_certified = profile
            .translator_level
            .map(acceptable_certified_for_level)
            .unwrap_or_default();

        let jobs = self
            .db_client
            .pending_jobs_for_translator(
                job_type_for_category(category),
                &languages,
                profile.gender,
                &acceptable_certified,
                chrono::Utc::now(),
            )
            .await?;

        let mut open_jobs = Vec::with_capacity(jobs.len());
        for job in jobs {
            let customer_town = self
                .db_client
                .get_user_profile(job.user_id)
                .await?
                .and_then(|p| p.city);
            if is_job_open_to_translator(
                &job,
                translator_id,
                profile.city.as_deref(),
                customer_town.as_deref(),
            ) {
                open_jobs.push(job);
            }
        }

        Ok(open_jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bookingmodel::{Gender, JobStatus};
    use chrono::Utc;

    fn job_with_channel(physical: bool, phone: bool) -> Job {
        Job {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_email: None,
            from_language_id: Uuid::new_v4(),
            immediate: false,
            due: Utc::now(),
            duration: 30,
            session_time: None,
            gender: Some(Gender::Male),
            certified: None,
            job_type: JobType::Paid,
            customer_phone_type: phone,
            customer_physical_type: physical,
            town: Some("Uppsala".to_string()),
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
    fn test_required_category_mapping() {
        assert_eq!(
            required_category_for(JobType::Paid),
            TranslatorCategory::Professional
        );
        assert_eq!(
            required_category_for(JobType::Rws),
            TranslatorCategory::Rwstranslator
        );
        assert_eq!(
            required_category_for(JobType::Unpaid),
            TranslatorCategory::Volunteer
        );
    }

    #[test]
    fn test_acceptable_levels_table() {
        assert_eq!(
            acceptable_levels_for(Some(CertifiedRequirement::Yes)),
            vec![
                TranslatorLevel::Certified,
                TranslatorLevel::CertifiedLaw,
                TranslatorLevel::CertifiedHealth,
            ]
        );
        assert_eq!(
            acceptable_levels_for(Some(CertifiedRequirement::NLaw)),
            vec![TranslatorLevel::CertifiedLaw]
        );
        assert_eq!(
            acceptable_levels_for(Some(CertifiedRequirement::Health)),
            vec![TranslatorLevel::CertifiedHealth]
        );
        assert_eq!(
            acceptable_levels_for(Some(CertifiedRequirement::Normal)),
            vec![TranslatorLevel::Layman, TranslatorLevel::ReadCourses]
        );
        // No requirement accepts all levels: expressed as an empty filter.
        assert!(acceptable_levels_for(None).is_empty());
    }

    #[test]
    fn test_level_and_requirement_tables_agree() {
        // The forward and inverse tables must describe the same relation,
        // otherwise the two matching directions drift apart.
        for level in [
            TranslatorLevel::Certified,
            TranslatorLevel::CertifiedLaw,
            TranslatorLevel::CertifiedHealth,
            TranslatorLevel::Layman,
            TranslatorLevel::ReadCourses,
        ] {
            for certified in acceptable_certified_for_level(level) {
                assert!(
                    acceptable_levels_for(Some(certified)).contains(&level),
                    "level {:?} accepts {:?} but the forward table disagrees",
                    level,
                    certified
                );
            }
        }
    }

    #[test]
    fn specific_job_lock_excludes_other_translators() {
        let holder = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut job = job_with_channel(false, true);
        job.specific_translator_id = Some(holder);

        assert!(is_job_open_to_translator(&job, holder, None, None));
        assert!(!is_job_open_to_translator(&job, other, None, None));
    }

    #[test]
    fn physical_only_job_requires_same_town() {
        let translator = Uuid::new_v4();
        let job = job_with_channel(true, false);

        assert!(is_job_open_to_translator(
            &job,
            translator,
            Some("Uppsala"),
            None
        ));
        assert!(is_job_open_to_translator(
            &job,
            translator,
            Some("uppsala"),
            None
        ));
        assert!(!is_job_open_to_translator(
            &job,
            translator,
            Some("Lund"),
            None
        ));
        assert!(!is_job_open_to_translator(&job, translator, None, None));
    }

    #[test]
    fn physical_job_falls_back_to_customer_town() {
        let translator = Uuid::new_v4();
        let mut job = job_with_channel(true, false);
        job.town = None;

        assert!(is_job_open_to_translator(
            &job,
            translator,
            Some("Lund"),
            Some("Lund")
        ));
        assert!(!is_job_open_to_translator(
            &job,
            translator,
            Some("Lund"),
            Some("Uppsala")
        ));
    }

    #[test]
    fn phone_fallback_ignores_towns() {
        let translator = Uuid::new_v4();
        let job = job_with_channel(true, true);

        assert!(is_job_open_to_translator(
            &job,
            translator,
            Some("Lund"),
            Some("Uppsala")
        ));
    }

    #[test]
    fn predicate_is_direction_independent() {
        // The same (job, translator) pair must get the same answer whether we
        // start from the job or from the translator; both directions call this
        // exact predicate, so agreement here is agreement everywhere.
        let translator = Uuid::new_v4();
        let mut job = job_with_channel(true, false);
        job.specific_translator_id = Some(translator);

        let from_job_side = is_job_open_to_translator(&job, translator, Some("Uppsala"), None);
        let from_translator_side =
            is_job_open_to_translator(&job, translator, Some("Uppsala"), None);
        assert_eq!(from_job_side, from_translator_side);
    }
}
