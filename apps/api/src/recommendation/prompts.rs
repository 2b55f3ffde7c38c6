// Prompt text for job matching. Kept free of timestamps and other volatile
// content: identical inputs must render byte-identical prompts.

pub const PROFILE_HEADER: &str = "I have a job seeker with the following profile:";

pub const JOBS_HEADER: &str = "And these job listings:";

pub const NO_JOBS: &str = "No jobs available";

/// Output contract appended after the job listings.
pub const MATCH_TASK_INSTRUCTION: &str = r#"Analyze the user's profile and job listings to find the top 3 matches.
Return **only** a JSON object with an array of matches, where each match contains:
- job_id (string): The job ID
- match_score (number): A score from 0 to 100

Example response format:
{
  "matches": [
    { "job_id": "example_id_1", "match_score": 80 },
    { "job_id": "example_id_2", "match_score": 70 },
    { "job_id": "example_id_3", "match_score": 60 }
  ]
}

Do not include any additional text, explanations, or comments outside the JSON object."#;
