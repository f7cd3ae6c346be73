use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::BookingError;
use crate::SEED;

pub const AVAILABLE_SLOTS: [&str; 8] = [
    "09:00 - 10:00",
    "10:00 - 11:00",
    "11:00 - 12:00",
    "12:00 - 13:00",
    "14:00 - 15:00",
    "15:00 - 16:00",
    "16:00 - 17:00",
    "17:00 - 18:00",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Appointment {
    pub student_name: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub notes: String,
}

pub trait AppointmentBook {
    fn find(&self, student_name: &str) -> Option<&Appointment>;

    /// Replaces the student's appointment, or adds one if they have none.
    /// Returns true when an existing appointment was replaced.
    fn upsert(&mut self, appointment: Appointment) -> bool;

    fn list(&self) -> &[Appointment];
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryAppointments {
    appointments: Vec<Appointment>,
}

impl InMemoryAppointments {
    pub fn seeded() -> Self {
        Self {
            appointments: SEED.appointments.clone(),
        }
    }
}

impl AppointmentBook for InMemoryAppointments {
    fn find(&self, student_name: &str) -> Option<&Appointment> {
        self.appointments
            .iter()
            .find(|appointment| appointment.student_name == student_name)
    }

    fn upsert(&mut self, appointment: Appointment) -> bool {
        match self
            .appointments
            .iter_mut()
            .find(|existing| existing.student_name == appointment.student_name)
        {
            Some(existing) => {
                *existing = appointment;
                true
            }
            None => {
                self.appointments.push(appointment);
                false
            }
        }
    }

    fn list(&self) -> &[Appointment] {
        &self.appointments
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked,
    Rescheduled,
}

impl BookingOutcome {
    pub fn message(self) -> &'static str {
        match self {
            BookingOutcome::Booked => "Slot booked successfully!",
            BookingOutcome::Rescheduled => "Slot updated successfully!",
        }
    }
}

/// Books `slot` for the student.
///
/// A student holds one appointment at most: booking again only moves the
/// time and keeps the original date and notes.
pub fn book<B: AppointmentBook>(
    appointments: &mut B,
    student_name: &str,
    slot: &str,
    today: NaiveDate,
) -> Result<BookingOutcome, BookingError> {
    if !AVAILABLE_SLOTS.contains(&slot) {
        return Err(BookingError::UnknownSlot(slot.to_string()));
    }
    let appointment = match appointments.find(student_name) {
        Some(existing) => Appointment {
            time: slot.to_string(),
            ..existing.clone()
        },
        None => Appointment {
            student_name: student_name.to_string(),
            date: today.format("%Y-%m-%d").to_string(),
            time: slot.to_string(),
            notes: String::new(),
        },
    };
    let outcome = if appointments.upsert(appointment) {
        BookingOutcome::Rescheduled
    } else {
        BookingOutcome::Booked
    };
    tracing::info!(student = %student_name, slot = %slot, ?outcome, "appointment saved");
    Ok(outcome)
}

#[cfg(test)]
mod test {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 21).unwrap()
    }

    #[test]
    fn test_book_new() {
        let mut appointments = InMemoryAppointments::seeded();
        let outcome = book(&mut appointments, "student1", "14:00 - 15:00", today()).unwrap();
        assert_eq!(outcome, BookingOutcome::Booked);
        assert_eq!(outcome.message(), "Slot booked successfully!");
        assert_eq!(appointments.list().len(), 5);
        assert_eq!(
            appointments.find("student1"),
            Some(&Appointment {
                student_name: "student1".to_string(),
                date: "2025-09-21".to_string(),
                time: "14:00 - 15:00".to_string(),
                notes: String::new(),
            })
        );
    }

    #[test]
    fn test_book_twice_reschedules() {
        let mut appointments = InMemoryAppointments::default();
        book(&mut appointments, "student1", "09:00 - 10:00", today()).unwrap();
        let later = NaiveDate::from_ymd_opt(2025, 9, 25).unwrap();
        let outcome = book(&mut appointments, "student1", "17:00 - 18:00", later).unwrap();
        assert_eq!(outcome, BookingOutcome::Rescheduled);
        assert_eq!(appointments.list().len(), 1);
        let appointment = appointments.find("student1").unwrap();
        assert_eq!(appointment.time, "17:00 - 18:00");
        assert_eq!(appointment.date, "2025-09-21");
    }

    #[test]
    fn test_reschedule_keeps_seeded_notes() {
        let mut appointments = InMemoryAppointments::seeded();
        book(&mut appointments, "Alex Johnson", "16:00 - 17:00", today()).unwrap();
        let appointment = appointments.find("Alex Johnson").unwrap();
        assert_eq!(appointment.notes, "Anxiety over exams.");
        assert_eq!(appointment.date, "2025-09-18");
        assert_eq!(appointments.list().len(), 4);
    }

    #[test]
    fn test_unknown_slot() {
        let mut appointments = InMemoryAppointments::default();
        assert!(matches!(
            book(&mut appointments, "student1", "13:00 - 14:00", today()),
            Err(BookingError::UnknownSlot(_))
        ));
        assert!(appointments.list().is_empty());
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let appointments = InMemoryAppointments::seeded();
        let names = appointments
            .list()
            .iter()
            .map(|appointment| appointment.student_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["Alex Johnson", "Brenda Smith", "Charles Davis", "Diana Miller"]
        );
    }
}
