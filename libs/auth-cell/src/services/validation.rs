use regex::Regex;

use shared_models::validation::ValidationErrors;

use crate::models::{LoginForm, RegisterUserRequest, RegistrationForm, UserRole};

const MOBILE_PATTERN: &str = r"^\+?1?\d{9,15}$";
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

pub const MIN_LOGIN_PASSWORD_LEN: usize = 4;
pub const MIN_REGISTER_PASSWORD_LEN: usize = 8;

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

pub fn validate_login(form: &LoginForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if form.username.trim().is_empty() {
        errors.add("username", "Username is required");
    }

    if form.password.is_empty() {
        errors.add("password", "Password is required");
    } else if form.password.chars().count() < MIN_LOGIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Password must be at least {} characters", MIN_LOGIN_PASSWORD_LEN),
        );
    }

    errors.into_result()
}

/// Checks the sign-up form and converts it into the backend payload.
pub fn validate_registration(form: &RegistrationForm) -> Result<RegisterUserRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if form.first_name.trim().is_empty() {
        errors.add("first_name", "First name is required");
    }
    if form.last_name.trim().is_empty() {
        errors.add("last_name", "Last name is required");
    }

    let age = match form.age.trim().parse::<u32>() {
        Ok(age) if age > 0 => Some(age),
        _ if form.age.trim().is_empty() => {
            errors.add("age", "Age is required");
            None
        }
        _ => {
            errors.add("age", "Please enter a valid age");
            None
        }
    };

    if form.gender.trim().is_empty() {
        errors.add("gender", "Gender is required");
    }

    if form.mobile_no.trim().is_empty() {
        errors.add("mobile_no", "Mobile number is required");
    } else if !matches(MOBILE_PATTERN, form.mobile_no.trim()) {
        errors.add("mobile_no", "Please enter a valid mobile number");
    }

    if form.gmail.trim().is_empty() {
        errors.add("gmail", "Email is required");
    } else if !matches(EMAIL_PATTERN, form.gmail.trim()) {
        errors.add("gmail", "Please enter a valid email address");
    }

    if form.password.is_empty() {
        errors.add("password", "Password is required");
    } else if form.password.chars().count() < MIN_REGISTER_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Password must be at least {} characters", MIN_REGISTER_PASSWORD_LEN),
        );
    }

    let role = UserRole::parse(&form.user_role);
    if role.is_none() {
        errors.add("user_role", "Please choose patient or doctor");
    }

    errors.into_result()?;

    Ok(RegisterUserRequest {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        age: age.unwrap_or_default(),
        gender: form.gender.trim().to_string(),
        mobile_no: form.mobile_no.trim().to_string(),
        gmail: form.gmail.trim().to_string(),
        password: form.password.clone(),
        user_role: role.map(|r| r.as_str()).unwrap_or("patient").to_string(),
    })
}
