//! Student and counselor credentials.
//!
//! Passwords are compared in plain text. The tables only guard the demo flow
//! and make no claim to being an authentication system.

use std::collections::HashMap;

use crate::error::AccountError;
use crate::SEED;

pub const LOGGED_IN: &str = "Login successful!";
pub const BAD_LOGIN: &str = "Invalid username or password.";
pub const COUNSELOR_LOGGED_IN: &str = "Counselor login successful!";
pub const BAD_COUNSELOR_LOGIN: &str = "Invalid credentials.";
pub const LOGGED_OUT: &str = "Logged out successfully.";

pub trait CredentialStore {
    fn contains(&self, username: &str) -> bool;

    fn verify(&self, username: &str, password: &str) -> bool;

    /// Adds a new account. An existing username is never overwritten.
    fn insert(&mut self, username: &str, password: &str) -> Result<(), AccountError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentials {
    accounts: HashMap<String, String>,
}

impl InMemoryCredentials {
    /// Students known before anyone registers.
    pub fn seeded_students() -> Self {
        Self {
            accounts: SEED.students.clone(),
        }
    }

    pub fn seeded_counselors() -> Self {
        Self {
            accounts: SEED.counselors.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl CredentialStore for InMemoryCredentials {
    fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    fn verify(&self, username: &str, password: &str) -> bool {
        self.accounts
            .get(username)
            .map_or(false, |expected| expected == password)
    }

    fn insert(&mut self, username: &str, password: &str) -> Result<(), AccountError> {
        if self.accounts.contains_key(username) {
            return Err(AccountError::AlreadyExists(username.to_string()));
        }
        self.accounts.insert(username.to_string(), password.to_string());
        Ok(())
    }
}

/// Checks a login and returns the message to show the user.
pub fn login<C: CredentialStore>(
    accounts: &C,
    username: &str,
    password: &str,
) -> Result<&'static str, &'static str> {
    if accounts.verify(username, password) {
        tracing::info!(username = %username, "student logged in");
        Ok(LOGGED_IN)
    } else {
        tracing::info!(username = %username, "student login rejected");
        Err(BAD_LOGIN)
    }
}

pub fn counselor_login<C: CredentialStore>(
    counselors: &C,
    username: &str,
    password: &str,
) -> Result<&'static str, &'static str> {
    if counselors.verify(username, password) {
        tracing::info!(counselor = %username, "counselor logged in");
        Ok(COUNSELOR_LOGGED_IN)
    } else {
        tracing::info!(counselor = %username, "counselor login rejected");
        Err(BAD_COUNSELOR_LOGIN)
    }
}
