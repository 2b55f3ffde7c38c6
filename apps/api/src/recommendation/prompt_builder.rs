//! Renders a candidate profile and a job sample into the matching prompt.

use crate::models::job::JobRecord;
use crate::recommendation::profile::{CandidateProfile, SalaryPreference};
use crate::recommendation::prompts::{
    JOBS_HEADER, MATCH_TASK_INSTRUCTION, NO_JOBS, PROFILE_HEADER,
};

/// Jobs beyond this many are not rendered, whatever the caller passes.
pub const MAX_PROMPT_JOBS: usize = 20;

const NOT_AVAILABLE: &str = "N/A";

/// Pure and deterministic: the same profile and jobs always yield the same text.
pub fn build_prompt(profile: &CandidateProfile, jobs: &[JobRecord]) -> String {
    let listings = if jobs.is_empty() {
        format!("{NO_JOBS}\n")
    } else {
        jobs.iter()
            .take(MAX_PROMPT_JOBS)
            .map(render_job)
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "{profile}\n{JOBS_HEADER}\n{listings}\n{MATCH_TASK_INSTRUCTION}\n",
        profile = render_profile(profile),
    )
}

fn render_profile(profile: &CandidateProfile) -> String {
    let prefs = &profile.job_preferences;

    let experience = join_or(
        profile.experience.iter().map(|e| {
            format!(
                "{} at {} ({})",
                e.title,
                e.company,
                e.duration.as_deref().unwrap_or(NOT_AVAILABLE)
            )
        }),
        "; ",
        "None",
    );
    let education = join_or(
        profile.education.iter().map(|e| {
            format!(
                "{} at {} ({})",
                e.degree,
                e.institution,
                e.year.as_deref().unwrap_or(NOT_AVAILABLE)
            )
        }),
        "; ",
        "None",
    );
    let remote = match prefs.remote {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "No preference",
    };

    format!(
        "{PROFILE_HEADER}
Name: {name}
Headline: {headline}
Skills: {skills}
Experience: {experience}
Education: {education}
Job Preferences:
  Job Types: {job_types}
  Locations: {locations}
  Salary Range: {salary}
  Remote: {remote}
",
        name = or_na(&profile.name),
        headline = or_na(&profile.headline),
        skills = join_or(profile.skills.iter().cloned(), ", ", "None"),
        job_types = join_or(prefs.job_types.iter().cloned(), ", ", NOT_AVAILABLE),
        locations = join_or(prefs.locations.iter().cloned(), ", ", NOT_AVAILABLE),
        salary = salary_range(&prefs.salary),
    )
}

fn render_job(job: &JobRecord) -> String {
    format!(
        "Job ID: {id}
Title: {title}
Company: {company}
Location: {location}
Job Type: {job_type}
Salary Range: {salary}
Required Skills: {skills}
Description: {description}
",
        id = job.id,
        title = job.title,
        company = job.company,
        location = opt_or_na(&job.location),
        job_type = opt_or_na(&job.job_type),
        salary = opt_or_na(&job.salary_range),
        skills = join_or(job.skills.iter().cloned(), ", ", "None"),
        description = job.description,
    )
}

fn salary_range(salary: &SalaryPreference) -> String {
    let bound = |v: Option<f64>| v.map_or_else(|| NOT_AVAILABLE.to_string(), |n| n.to_string());
    format!("{} - {}", bound(salary.min), bound(salary.max))
}

fn join_or(items: impl Iterator<Item = String>, sep: &str, empty: &str) -> String {
    let joined = items.collect::<Vec<_>>().join(sep);
    if joined.is_empty() {
        empty.to_string()
    } else {
        joined
    }
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}

fn opt_or_na(value: &Option<String>) -> &str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
}
