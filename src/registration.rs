use std::collections::HashMap;

use crate::accounts::CredentialStore;
use crate::error::RegisterError;

pub const REGISTERED: &str = "Registration successful! Please complete the questionnaire.";

/// What a student enters on the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub password: String,
    pub district: String,
    pub college_name: String,
    pub course: String,
    pub year_of_study: String,
    pub gender: String,
    pub age_group: String,
}

impl Profile {
    /// Absent optional fields become empty strings.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, RegisterError> {
        let optional = |key: &str| {
            form.get(key)
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };
        let required = |key: &'static str| match form.get(key).map(|value| value.trim()) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(RegisterError::MissingField(key)),
        };
        Ok(Self {
            username: required("username")?,
            password: required("password")?,
            district: optional("district"),
            college_name: optional("college_name"),
            course: optional("course"),
            year_of_study: optional("year_of_study"),
            gender: optional("gender"),
            age_group: optional("age_group"),
        })
    }
}

/// Carries a fresh registration to the questionnaire that follows it.
///
/// Submitting the questionnaire consumes the ticket, so a profile is
/// recorded at most once.
#[derive(Debug)]
pub struct RegistrationTicket {
    profile: Profile,
}

impl RegistrationTicket {
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn username(&self) -> &str {
        &self.profile.username
    }
}

/// Creates the student account and hands back the ticket for the questionnaire.
pub fn register<C: CredentialStore>(
    accounts: &mut C,
    form: &HashMap<String, String>,
) -> Result<RegistrationTicket, RegisterError> {
    let profile = Profile::from_form(form)?;
    if accounts.contains(&profile.username) {
        tracing::info!(username = %profile.username, "registration refused, username taken");
        return Err(RegisterError::UsernameTaken(profile.username));
    }
    accounts
        .insert(&profile.username, &profile.password)
        .map_err(|_| RegisterError::UsernameTaken(profile.username.clone()))?;
    tracing::info!(username = %profile.username, "student registered");
    Ok(RegistrationTicket { profile })
}
