//! Profile assembly turns a stored user document into a fully-populated
//! `CandidateProfile`. Every absent or mistyped field is defaulted here so the
//! prompt builder never has to branch on missing data.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::AppError;
use crate::models::user::UserRecord;
use crate::store::JobStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidateProfile {
    pub name: String,
    pub headline: String,
    /// Unique, in first-seen order.
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub job_preferences: JobPreferences,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobPreferences {
    pub job_types: Vec<String>,
    pub locations: Vec<String>,
    pub salary: SalaryPreference,
    pub remote: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SalaryPreference {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Looks up the user by email and normalizes their profile.
/// `NotFound` is the only failure besides store errors.
pub async fn assemble_profile(
    store: &dyn JobStore,
    email: &str,
) -> Result<CandidateProfile, AppError> {
    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let profile = CandidateProfile::from_user(&user);
    debug!(
        "Assembled profile for {email}: {} skills, {} experience, {} education entries",
        profile.skills.len(),
        profile.experience.len(),
        profile.education.len()
    );
    Ok(profile)
}

impl CandidateProfile {
    pub fn from_user(user: &UserRecord) -> Self {
        let null = Value::Null;
        let doc = user.profile.as_ref().unwrap_or(&null);

        let mut skills: Vec<String> = Vec::new();
        for skill in string_list(doc.get("skills")) {
            if !skills.contains(&skill) {
                skills.push(skill);
            }
        }

        let experience = objects(doc.get("experience"))
            .map(|entry| ExperienceEntry {
                title: text(entry.get("title")).unwrap_or_default(),
                company: text(entry.get("company")).unwrap_or_default(),
                duration: text(entry.get("duration")),
            })
            .filter(|e| !e.title.is_empty() || !e.company.is_empty())
            .collect();

        let education = objects(doc.get("education"))
            .map(|entry| EducationEntry {
                degree: text(entry.get("degree")).unwrap_or_default(),
                institution: text(entry.get("institution")).unwrap_or_default(),
                year: text(entry.get("year")),
            })
            .filter(|e| !e.degree.is_empty() || !e.institution.is_empty())
            .collect();

        let prefs = doc.get("jobPreferences").unwrap_or(&null);
        let salary = prefs.get("salary").unwrap_or(&null);

        CandidateProfile {
            name: user
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or_default()
                .to_string(),
            headline: text(doc.get("headline")).unwrap_or_default(),
            skills,
            experience,
            education,
            job_preferences: JobPreferences {
                job_types: string_list(prefs.get("jobTypes")),
                locations: string_list(prefs.get("locations")),
                salary: SalaryPreference {
                    min: number(salary.get("min")),
                    max: number(salary.get("max")),
                },
                remote: prefs.get("remote").and_then(Value::as_bool),
            },
        }
    }
}

/// Text with surrounding whitespace trimmed; inner text is kept as is.
/// Empty results are `None`. Numbers are accepted (e.g. `"year": 2020`).
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|item| text(Some(item))).collect())
        .unwrap_or_default()
}

fn objects(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|item| item.is_object())
}

fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}
