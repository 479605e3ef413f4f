use serde::{Deserialize, Serialize};

use crate::models::Role;
use crate::validate::{
    EMAIL_RE, FieldError, NAME_RE, USERNAME_RE, char_len, password_meets_complexity,
};

/// Session token claims carried in the `session` cookie (or a bearer token).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub csrf: String,
    pub exp: usize,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginInput, Vec<FieldError>> {
        let mut errors = Vec::new();
        let username = self.username.trim();

        if username.is_empty() {
            errors.push(FieldError::new("username", "Username is required"));
        } else if char_len(username) < 3 || char_len(username) > 80 {
            errors.push(FieldError::new(
                "username",
                "Username must be between 3 and 80 characters",
            ));
        }

        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        } else if char_len(&self.password) < 6 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 6 characters",
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(LoginInput {
            username: username.to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role: Role,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterInput, Vec<FieldError>> {
        let mut errors = Vec::new();
        let username = self.username.trim();
        let email = self.email.trim();
        let full_name = self.full_name.trim();
        let role = self.role.trim();

        if username.is_empty() {
            errors.push(FieldError::new("username", "Username is required"));
        } else {
            if char_len(username) < 3 || char_len(username) > 80 {
                errors.push(FieldError::new(
                    "username",
                    "Username must be between 3 and 80 characters",
                ));
            }
            if !USERNAME_RE.is_match(username) {
                errors.push(FieldError::new(
                    "username",
                    "Username can only contain letters, numbers, underscores, and hyphens",
                ));
            }
        }

        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else {
            if !EMAIL_RE.is_match(email) {
                errors.push(FieldError::new("email", "Please enter a valid email address"));
            }
            if char_len(email) > 120 {
                errors.push(FieldError::new("email", "Email cannot exceed 120 characters"));
            }
        }

        if full_name.is_empty() {
            errors.push(FieldError::new("full_name", "Full name is required"));
        } else {
            if char_len(full_name) < 2 || char_len(full_name) > 100 {
                errors.push(FieldError::new(
                    "full_name",
                    "Full name must be between 2 and 100 characters",
                ));
            }
            if !NAME_RE.is_match(full_name) {
                errors.push(FieldError::new(
                    "full_name",
                    "Full name can only contain letters, spaces, hyphens, apostrophes, and periods",
                ));
            }
        }

        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        } else {
            if char_len(&self.password) < 8 {
                errors.push(FieldError::new(
                    "password",
                    "Password must be at least 8 characters",
                ));
            }
            if !password_meets_complexity(&self.password) {
                errors.push(FieldError::new(
                    "password",
                    "Password must contain at least one uppercase letter, one lowercase letter, one number, and one special character",
                ));
            }
        }

        let parsed_role = if role.is_empty() {
            errors.push(FieldError::new("role", "Role is required"));
            None
        } else {
            match role.parse::<Role>() {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    errors.push(FieldError::new(
                        "role",
                        "Role must be admin, manager, or employee",
                    ));
                    None
                }
            }
        };

        match (errors.is_empty(), parsed_role) {
            (true, Some(parsed_role)) => Ok(RegisterInput {
                username: username.to_string(),
                email: email.to_string(),
                full_name: full_name.to_string(),
                password: self.password.clone(),
                role: parsed_role,
            }),
            _ => Err(errors),
        }
    }
}

/// Bare CSRF echo for forms with no other fields, such as the delete buttons.
#[derive(Debug, Deserialize)]
pub struct CsrfForm {
    #[serde(default)]
    pub csrf_token: String,
}
