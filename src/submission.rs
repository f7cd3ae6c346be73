use crate::record::{AssessmentRecord, StudentId};
use crate::registration::RegistrationTicket;
use crate::store::CsvStore;
use crate::AnswerStore;

/// Result of a questionnaire submission as the user sees it.
#[derive(Debug)]
pub enum Outcome {
    Saved(AssessmentRecord),
    /// No registration preceded the questionnaire; nothing was written.
    RegistrationMissing,
    /// The store could not be read or written; the answers are dropped.
    StorageFailed,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Saved(_))
    }

    pub fn message(&self) -> &'static str {
        match self {
            Outcome::Saved(_) => "Questionnaire submitted successfully!",
            Outcome::RegistrationMissing => "Registration data not found. Please register again.",
            Outcome::StorageFailed => "An error occurred while saving your data. Please contact support.",
        }
    }

    pub fn student_id(&self) -> Option<StudentId> {
        match self {
            Outcome::Saved(record) => Some(record.student_id),
            _ => None,
        }
    }

    pub fn record(&self) -> Option<&AssessmentRecord> {
        match self {
            Outcome::Saved(record) => Some(record),
            _ => None,
        }
    }
}

/// Records the questionnaire of a student who has just registered.
///
/// The ticket is consumed whatever happens, so a failed save means
/// registering again, as with any lost submission.
pub fn submit_questionnaire(
    store: &CsvStore,
    ticket: Option<RegistrationTicket>,
    answers: &AnswerStore,
) -> Outcome {
    let Some(ticket) = ticket else {
        tracing::warn!("questionnaire submitted without a registration");
        return Outcome::RegistrationMissing;
    };
    match store.submit(ticket.profile(), answers) {
        Ok(record) => Outcome::Saved(record),
        Err(error) => {
            tracing::error!(
                path = %store.path().display(),
                username = %ticket.username(),
                %error,
                "could not write assessment"
            );
            Outcome::StorageFailed
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages() {
        assert!(!Outcome::RegistrationMissing.is_success());
        assert_eq!(
            Outcome::StorageFailed.message(),
            "An error occurred while saving your data. Please contact support."
        );
        assert_eq!(Outcome::StorageFailed.student_id(), None);
    }
}
