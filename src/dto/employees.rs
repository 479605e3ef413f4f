use serde::Deserialize;

use crate::validate::{FieldError, JOB_TITLE_RE, LOCATION_RE, NAME_RE, char_len};

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeForm {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub badges: String,
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Debug, Clone)]
pub struct EmployeeInput {
    pub fullname: String,
    pub location: String,
    pub job_title: String,
    pub badges: Vec<String>,
}

impl EmployeeForm {
    pub fn validate(&self) -> Result<EmployeeInput, Vec<FieldError>> {
        let mut errors = Vec::new();
        let fullname = self.fullname.trim();
        let location = self.location.trim();
        let job_title = self.job_title.trim();

        if fullname.is_empty() {
            errors.push(FieldError::new("fullname", "Full name is required"));
        } else {
            if char_len(fullname) < 2 || char_len(fullname) > 100 {
                errors.push(FieldError::new(
                    "fullname",
                    "Full name must be between 2 and 100 characters",
                ));
            }
            if !NAME_RE.is_match(fullname) {
                errors.push(FieldError::new(
                    "fullname",
                    "Full name can only contain letters, spaces, hyphens, apostrophes, and periods",
                ));
            }
        }

        if location.is_empty() {
            errors.push(FieldError::new("location", "Location is required"));
        } else {
            if char_len(location) < 2 || char_len(location) > 100 {
                errors.push(FieldError::new(
                    "location",
                    "Location must be between 2 and 100 characters",
                ));
            }
            if !LOCATION_RE.is_match(location) {
                errors.push(FieldError::new(
                    "location",
                    "Location can only contain letters, numbers, spaces, hyphens, apostrophes, periods, and commas",
                ));
            }
        }

        if job_title.is_empty() {
            errors.push(FieldError::new("job_title", "Job title is required"));
        } else {
            if char_len(job_title) < 2 || char_len(job_title) > 100 {
                errors.push(FieldError::new(
                    "job_title",
                    "Job title must be between 2 and 100 characters",
                ));
            }
            if !JOB_TITLE_RE.is_match(job_title) {
                errors.push(FieldError::new(
                    "job_title",
                    "Job title can only contain letters, numbers, spaces, hyphens, apostrophes, periods, commas, and ampersands",
                ));
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(EmployeeInput {
            fullname: fullname.to_string(),
            location: location.to_string(),
            job_title: job_title.to_string(),
            badges: parse_badges(&self.badges),
        })
    }
}

/// Badges arrive as one comma-separated text field. Tags are free-form;
/// the catalog only decides which ones get a pretty label.
pub fn parse_badges(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|badge| !badge.is_empty())
        .map(str::to_string)
        .collect()
}
