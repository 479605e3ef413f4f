use serde::Deserialize;

use crate::validate::{AGE_RE, BREED_RE, FieldError, NAME_RE, char_len};

pub const DOG_SIZES: &[&str] = &["small", "medium", "large"];

#[derive(Debug, Default, Deserialize)]
pub struct DogForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub approx_age: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub breed_type: String,
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Debug, Clone)]
pub struct DogInput {
    pub name: String,
    pub approx_age: String,
    pub size: String,
    pub breed_type: String,
}

impl DogForm {
    pub fn validate(&self) -> Result<DogInput, Vec<FieldError>> {
        let mut errors = Vec::new();
        let name = self.name.trim();
        let approx_age = self.approx_age.trim();
        let size = self.size.trim();
        let breed_type = self.breed_type.trim();

        if name.is_empty() {
            errors.push(FieldError::new("name", "Dog name is required"));
        } else {
            if char_len(name) < 2 || char_len(name) > 100 {
                errors.push(FieldError::new(
                    "name",
                    "Dog name must be between 2 and 100 characters",
                ));
            }
            if !NAME_RE.is_match(name) {
                errors.push(FieldError::new(
                    "name",
                    "Dog name can only contain letters, spaces, hyphens, apostrophes, and periods",
                ));
            }
        }

        if approx_age.is_empty() {
            errors.push(FieldError::new("approx_age", "Approximate age is required"));
        } else {
            if char_len(approx_age) < 2 || char_len(approx_age) > 50 {
                errors.push(FieldError::new(
                    "approx_age",
                    "Age must be between 2 and 50 characters",
                ));
            }
            if !AGE_RE.is_match(approx_age) {
                errors.push(FieldError::new(
                    "approx_age",
                    "Age can only contain letters, numbers, spaces, hyphens, apostrophes, and periods",
                ));
            }
        }

        if size.is_empty() {
            errors.push(FieldError::new("size", "Size is required"));
        } else if !DOG_SIZES.contains(&size) {
            errors.push(FieldError::new("size", "Not a valid choice."));
        }

        if breed_type.is_empty() {
            errors.push(FieldError::new("breed_type", "Breed/Type is required"));
        } else {
            if char_len(breed_type) < 2 || char_len(breed_type) > 100 {
                errors.push(FieldError::new(
                    "breed_type",
                    "Breed/Type must be between 2 and 100 characters",
                ));
            }
            if !BREED_RE.is_match(breed_type) {
                errors.push(FieldError::new(
                    "breed_type",
                    "Breed/Type can only contain letters, spaces, hyphens, apostrophes, periods, commas, and ampersands",
                ));
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(DogInput {
            name: name.to_string(),
            approx_age: approx_age.to_string(),
            size: size.to_string(),
            breed_type: breed_type.to_string(),
        })
    }
}
