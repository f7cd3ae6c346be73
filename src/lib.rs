use std::collections::HashMap;
use std::ops::Range;

use once_cell::sync::Lazy;
use serde::Deserialize;

pub mod accounts;
pub mod booking;
pub mod chat;
pub mod config;
pub mod error;
pub mod language;
pub mod record;
pub mod registration;
pub mod scoring;
pub mod store;
pub mod submission;

pub use accounts::{CredentialStore, InMemoryCredentials};
pub use booking::{book, Appointment, AppointmentBook, BookingOutcome, InMemoryAppointments};
pub use chat::{ChatService, CommandResponder, Responder};
pub use config::Config;
pub use error::{AccountError, BookingError, ChatError, Error, RegisterError, StoreError};
pub use language::Language;
pub use record::{build_record, AssessmentRecord, StudentId};
pub use registration::{register, Profile, RegistrationTicket};
pub use scoring::{GadCategory, GhqCategory, PhqCategory, RiskLevel, Scores};
pub use store::CsvStore;
pub use submission::{submit_questionnaire, Outcome};

pub static QUESTIONS: Lazy<Questionnaire> = Lazy::new(|| {
    serde_json::from_str(include_str!("../resources/questionnaire.json"))
        .expect("resources/questionnaire.json is valid")
});

pub static SEED: Lazy<Seed> = Lazy::new(|| {
    serde_json::from_str(include_str!("../resources/seed.json"))
        .expect("resources/seed.json is valid")
});

pub const PHQ_ITEMS: usize = 9;
pub const GAD_ITEMS: usize = 7;
pub const GHQ_ITEMS: usize = 4;
pub const TOTAL_ITEMS: usize = PHQ_ITEMS + GAD_ITEMS + GHQ_ITEMS;

/// Highest point on the four-step answer scale.
pub const MAX_ANSWER: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Phq,
    Gad,
    Ghq,
}

impl Instrument {
    pub const ALL: [Instrument; 3] = [Instrument::Phq, Instrument::Gad, Instrument::Ghq];

    /// Form field prefix, `phq1`..`phq9` and so on.
    pub fn prefix(self) -> &'static str {
        match self {
            Instrument::Phq => "phq",
            Instrument::Gad => "gad",
            Instrument::Ghq => "ghq",
        }
    }

    pub fn len(self) -> usize {
        match self {
            Instrument::Phq => PHQ_ITEMS,
            Instrument::Gad => GAD_ITEMS,
            Instrument::Ghq => GHQ_ITEMS,
        }
    }

    /// Position of this instrument's items inside the 20 numbered answers.
    pub fn span(self) -> Range<usize> {
        match self {
            Instrument::Phq => 0..PHQ_ITEMS,
            Instrument::Gad => PHQ_ITEMS..PHQ_ITEMS + GAD_ITEMS,
            Instrument::Ghq => PHQ_ITEMS + GAD_ITEMS..TOTAL_ITEMS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub score: u8,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    /// Form field name, e.g. `gad4`
    pub key: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct Section {
    pub instrument: Instrument,
    pub title: String,
    pub questions: Vec<Question>,
}

/// The PHQ-9, GAD-7 and selected GHQ items in the order they are asked
#[derive(Debug, Deserialize)]
pub struct Questionnaire {
    pub sections: Vec<Section>,
    pub choices: Vec<Choice>,
}

/// Demo accounts and appointments the service starts with.
#[derive(Debug, Deserialize)]
pub struct Seed {
    pub students: HashMap<String, String>,
    pub counselors: HashMap<String, String>,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    values: [u8; TOTAL_ITEMS],
    offset: usize,
}

impl AnswerStore {
    pub fn from_parts(phq: [u8; PHQ_ITEMS], gad: [u8; GAD_ITEMS], ghq: [u8; GHQ_ITEMS]) -> Self {
        let mut values = [0; TOTAL_ITEMS];
        values[Instrument::Phq.span()].copy_from_slice(&phq);
        values[Instrument::Gad.span()].copy_from_slice(&gad);
        values[Instrument::Ghq.span()].copy_from_slice(&ghq);
        Self {
            values,
            offset: TOTAL_ITEMS,
        }
    }

    /// Reads `phq1..phq9`, `gad1..gad7` and `ghq1..ghq4` from submitted form fields.
    ///
    /// A missing field counts as 0. So does a value that is not a number in
    /// 0..=3; it is logged and never reaches the scores.
    pub fn from_form(form: &HashMap<String, String>) -> Self {
        let mut store = Self {
            values: [0; TOTAL_ITEMS],
            offset: TOTAL_ITEMS,
        };
        for instrument in Instrument::ALL {
            for (item, index) in instrument.span().enumerate() {
                let key = format!("{}{}", instrument.prefix(), item + 1);
                let value = match form.get(&key).map(|value| value.trim()) {
                    None | Some("") => continue,
                    Some(value) => value,
                };
                let stored = value
                    .parse::<u8>()
                    .map_or(false, |score| store.insert(index as u8 + 1, score).is_ok());
                if !stored {
                    tracing::warn!(field = %key, value = %value, "answer out of range, counted as 0");
                }
            }
        }
        store
    }

    /// Stores the next answer in question order.
    /// Only 0..=3 is accepted.
    pub fn push(&mut self, score: u8) -> Result<(), Error> {
        if score <= MAX_ANSWER {
            if self.offset < TOTAL_ITEMS {
                self.values[self.offset] = score;
                self.offset += 1;
                Ok(())
            } else {
                Err(Error::IllegalQuestion)
            }
        } else {
            Err(Error::IllegalAnswer)
        }
    }

    /// Stores an answer by its 1-based question number (`Q1`..`Q20`).
    pub fn insert(&mut self, question_no: u8, score: u8) -> Result<(), Error> {
        if question_no < 1 {
            return Err(Error::IllegalQuestion);
        }
        if score <= MAX_ANSWER {
            let offset: usize = (question_no - 1).into();
            if offset < TOTAL_ITEMS {
                self.values[offset] = score;
                Ok(())
            } else {
                Err(Error::IllegalQuestion)
            }
        } else {
            Err(Error::IllegalAnswer)
        }
    }

    pub fn values(&self) -> &[u8; TOTAL_ITEMS] {
        &self.values
    }

    pub fn instrument(&self, instrument: Instrument) -> &[u8] {
        &self.values[instrument.span()]
    }

    pub fn to_scores(&self) -> Scores {
        let sum = |instrument| {
            self.instrument(instrument)
                .iter()
                .map(|&value| i32::from(value))
                .sum::<i32>()
        };
        Scores {
            phq: sum(Instrument::Phq),
            gad: sum(Instrument::Gad),
            ghq: sum(Instrument::Ghq),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sections_follow_instrument_spans() {
        assert_eq!(
            QUESTIONS
                .sections
                .iter()
                .map(|section| section.instrument)
                .collect::<Vec<Instrument>>(),
            Instrument::ALL
        );
        for section in &QUESTIONS.sections {
            assert_eq!(section.questions.len(), section.instrument.len());
            for (item, question) in section.questions.iter().enumerate() {
                assert_eq!(
                    question.key,
                    format!("{}{}", section.instrument.prefix(), item + 1)
                );
            }
        }
        assert_eq!(QUESTIONS.choices.len(), usize::from(MAX_ANSWER) + 1);
    }

    #[test]
    fn test_seed() {
        assert_eq!(SEED.students.get("student1").map(String::as_str), Some("password123"));
        assert_eq!(SEED.counselors.len(), 2);
        assert_eq!(SEED.appointments.len(), 4);
    }

    #[test]
    fn test_answer_store_push() {
        let mut store = AnswerStore::default();
        for _ in 0..TOTAL_ITEMS {
            assert!(store.push(3).is_ok());
        }
        assert!(matches!(store.push(3), Err(Error::IllegalQuestion)));
        let scores = store.to_scores();
        assert_eq!((scores.phq, scores.gad, scores.ghq), (27, 21, 12));
    }

    #[test]
    fn test_answer_store_rejects_out_of_scale() {
        let mut store = AnswerStore::default();
        assert!(matches!(store.push(4), Err(Error::IllegalAnswer)));
    }

    #[test]
    fn test_insert() {
        let mut store = AnswerStore::default();
        assert!(store.insert(0, 1).is_err());
        assert!(store.insert(1, 1).is_ok());
        assert!(store.insert(20, 2).is_ok());
        assert!(store.insert(21, 1).is_err());
        assert!(store.insert(10, 4).is_err());
        assert_eq!(store.values()[0], 1);
        assert_eq!(store.values()[19], 2);
    }

    #[test]
    fn test_from_parts_keeps_instrument_order() {
        let store = AnswerStore::from_parts([1; 9], [2; 7], [3; 4]);
        assert!(store.instrument(Instrument::Phq).iter().all(|&v| v == 1));
        assert!(store.instrument(Instrument::Gad).iter().all(|&v| v == 2));
        assert!(store.instrument(Instrument::Ghq).iter().all(|&v| v == 3));
        let scores = store.to_scores();
        assert_eq!((scores.phq, scores.gad, scores.ghq), (9, 14, 12));
    }

    #[test]
    fn test_from_form() {
        let mut form = HashMap::new();
        form.insert("phq1".to_string(), "3".to_string());
        form.insert("phq9".to_string(), " 2 ".to_string());
        form.insert("gad1".to_string(), "7".to_string());
        form.insert("gad2".to_string(), "-1".to_string());
        form.insert("gad3".to_string(), "often".to_string());
        form.insert("ghq4".to_string(), "1".to_string());

        let store = AnswerStore::from_form(&form);
        assert_eq!(store.values()[0], 3);
        assert_eq!(store.values()[8], 2);
        assert_eq!(&store.instrument(Instrument::Gad)[..3], &[0, 0, 0]);
        assert_eq!(store.values()[19], 1);
        let scores = store.to_scores();
        assert_eq!((scores.phq, scores.gad, scores.ghq), (5, 0, 1));
    }

    #[test]
    fn test_from_empty_form() {
        let store = AnswerStore::from_form(&HashMap::new());
        assert_eq!(store.values(), &[0; TOTAL_ITEMS]);
    }
}
