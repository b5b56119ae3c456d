//! Ingestion boundary: validates new submissions and stamps them.
//!
//! This is the only place strict validation happens. The engine consumes
//! whatever the store holds and never rejects historical data.

use chrono::Utc;
use uuid::Uuid;

use crate::config::IngestConfig;
use crate::error::ValidationError;
use crate::types::{NewSubmission, Submission};

/// Minimum number of admitted universities per submission.
pub const MIN_ADMITTED: usize = 2;

/// Check a payload against the ingestion rules without modifying it.
///
/// Names are compared after trimming surrounding whitespace, the same
/// normalization [`accept`] applies before storing.
pub fn validate(new: &NewSubmission, config: &IngestConfig) -> Result<(), ValidationError> {
    let count = new.admitted_universities.len();
    if count < MIN_ADMITTED {
        return Err(ValidationError::TooFewUniversities { count });
    }

    for (index, name) in new.admitted_universities.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(ValidationError::BlankUniversity { index });
        }
    }

    if config.reject_duplicate_universities {
        let mut seen = std::collections::HashSet::new();
        for name in &new.admitted_universities {
            if !seen.insert(name.trim()) {
                return Err(ValidationError::DuplicateUniversity {
                    university: name.trim().to_string(),
                });
            }
        }
    }

    let registered = new.registered_university.trim();
    if registered.is_empty() {
        return Err(ValidationError::MissingRegistered);
    }
    if !new
        .admitted_universities
        .iter()
        .any(|u| u.trim() == registered)
    {
        return Err(ValidationError::RegisteredNotAdmitted {
            university: registered.to_string(),
        });
    }

    Ok(())
}

/// Validate a payload and turn it into a stored [`Submission`].
///
/// Trims every name, drops blank or unrelated major entries, and assigns
/// `id` and `createdAt`.
pub fn accept(new: NewSubmission, config: &IngestConfig) -> Result<Submission, ValidationError> {
    validate(&new, config)?;

    let admitted_universities: Vec<String> = new
        .admitted_universities
        .iter()
        .map(|u| u.trim().to_string())
        .collect();

    let admitted_majors = new
        .admitted_majors
        .into_iter()
        .map(|(uni, major)| (uni.trim().to_string(), major.trim().to_string()))
        .filter(|(uni, major)| !major.is_empty() && admitted_universities.contains(uni))
        .collect();

    let submission = Submission {
        id: generate_id(),
        admitted_universities,
        registered_university: new.registered_university.trim().to_string(),
        admitted_majors,
        registered_major: new
            .registered_major
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty()),
        created_at: Utc::now(),
    };

    tracing::debug!(
        id = %submission.id,
        admitted = submission.admitted_universities.len(),
        "Accepted cross-admit submission"
    );

    Ok(submission)
}

/// `crossadmit-<unix millis>-<9 random base-16 chars>`.
pub fn generate_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("crossadmit-{}-{}", Utc::now().timestamp_millis(), &random[..9])
}
