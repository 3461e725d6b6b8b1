//! Request schemas. Each check collects every failing field before reporting,
//! so a client sees all problems with a payload at once.

use std::str::FromStr;

use axum::extract::rejection::JsonRejection;

use crate::api::models::{SignInRequest, SignUpRequest, UpdateUserRequest};
use crate::core::errors::{AcquisitionsError, FieldError};
use crate::core::models::user::Role;
use crate::core::services::UserUpdate;

const NAME_MIN: usize = 1;
const NAME_MAX: usize = 255;
const EMAIL_MAX: usize = 255;
const PASSWORD_MIN: usize = 6;
/// bcrypt only reads the first 72 bytes of its input.
const PASSWORD_MAX_BYTES: usize = 72;

#[derive(Debug)]
pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn required(&mut self, field: &str, value: Option<String>) -> Option<String> {
        if value.is_none() {
            self.fail(field, format!("{} is required", field));
        }
        value
    }

    fn name(&mut self, value: Option<String>) -> Option<String> {
        let name = value?.trim().to_string();
        let len = name.chars().count();
        if len < NAME_MIN {
            self.fail("name", "name cannot be blank");
        } else if len > NAME_MAX {
            self.fail("name", format!("name cannot exceed {} characters", NAME_MAX));
        }
        Some(name)
    }

    fn email(&mut self, value: Option<String>) -> Option<String> {
        let email = value?.trim().to_lowercase();
        if email.chars().count() > EMAIL_MAX {
            self.fail("email", format!("email cannot exceed {} characters", EMAIL_MAX));
        } else if !is_valid_email(&email) {
            self.fail("email", "email must be a valid email address");
        }
        Some(email)
    }

    fn password(&mut self, value: Option<String>) -> Option<String> {
        let password = value?;
        if password.chars().count() < PASSWORD_MIN {
            self.fail("password", format!("password must be at least {} characters", PASSWORD_MIN));
        } else if password.len() > PASSWORD_MAX_BYTES {
            self.fail("password", format!("password cannot exceed {} bytes", PASSWORD_MAX_BYTES));
        }
        Some(password)
    }

    fn role(&mut self, value: Option<String>) -> Option<Role> {
        let raw = value?;
        match Role::from_str(raw.trim()) {
            Ok(role) => Some(role),
            Err(_) => {
                self.fail("role", "role must be either 'user' or 'admin'");
                None
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, AcquisitionsError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(AcquisitionsError::Validation(self.errors))
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

pub fn validate_sign_up(req: SignUpRequest) -> Result<SignUpInput, AcquisitionsError> {
    let mut checker = Checker::default();
    let name = checker.required("name", req.name);
    let name = checker.name(name);
    let email = checker.required("email", req.email);
    let email = checker.email(email);
    let password = checker.required("password", req.password);
    let password = checker.password(password);
    let role = checker.role(req.role);

    match (name, email, password) {
        (Some(name), Some(email), Some(password)) => checker.finish(SignUpInput {
            name,
            email,
            password,
            role: role.unwrap_or_default(),
        }),
        _ => Err(AcquisitionsError::Validation(checker.errors)),
    }
}

pub fn validate_sign_in(req: SignInRequest) -> Result<SignInInput, AcquisitionsError> {
    let mut checker = Checker::default();
    let email = checker.required("email", req.email);
    let email = checker.email(email);
    let password = checker.required("password", req.password);
    if password.as_deref().is_some_and(str::is_empty) {
        checker.fail("password", "password is required");
    }

    match (email, password) {
        (Some(email), Some(password)) => checker.finish(SignInInput { email, password }),
        _ => Err(AcquisitionsError::Validation(checker.errors)),
    }
}

pub fn validate_user_update(req: UpdateUserRequest) -> Result<UserUpdate, AcquisitionsError> {
    let mut checker = Checker::default();
    let update = UserUpdate {
        name: checker.name(req.name),
        email: checker.email(req.email),
        password: checker.password(req.password),
        role: checker.role(req.role),
    };
    let nothing_given =
        update.name.is_none() && update.email.is_none() && update.password.is_none() && update.role.is_none();
    if nothing_given && checker.errors.is_empty() {
        checker.fail("body", "at least one field must be provided for update");
    }
    checker.finish(update)
}

/// Path ids are positive integers.
pub fn parse_user_id(raw: &str) -> Result<i64, AcquisitionsError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AcquisitionsError::invalid("id", "id must be a positive integer")),
    }
}

pub fn reject_body(rejection: JsonRejection) -> AcquisitionsError {
    AcquisitionsError::invalid("body", rejection.body_text())
}
