use std::collections::HashMap;
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mindcare::accounts::{self, LOGGED_OUT};
use mindcare::booking::AVAILABLE_SLOTS;
use mindcare::chat::RESET;
use mindcare::registration::REGISTERED;
use mindcare::{
    book, register, submit_questionnaire, AnswerStore, AppointmentBook, ChatService,
    CommandResponder, Config, CsvStore, Error, InMemoryAppointments, InMemoryCredentials,
    Language, Outcome, RegistrationTicket, QUESTIONS,
};

#[derive(Parser)]
#[command(about = "MindCare student support desk")]
struct Args {
    /// Assessment CSV, overrides MINDCARE_STORE
    #[arg(long)]
    store: Option<PathBuf>,
    /// Model name, overrides MINDCARE_MODEL
    #[arg(long)]
    model: Option<String>,
    /// Seconds to wait for a chat reply, overrides MINDCARE_CHAT_TIMEOUT_SECS
    #[arg(long)]
    chat_timeout: Option<u64>,
}

const REGISTRATION_FIELDS: [(&str, &str); 8] = [
    ("username", "Username"),
    ("password", "Password"),
    ("district", "District"),
    ("college_name", "College name"),
    ("course", "Course"),
    ("year_of_study", "Year of study"),
    ("gender", "Gender"),
    ("age_group", "Age group"),
];

/// Who is signed in at this terminal.
#[derive(Default)]
struct Session {
    student: Option<String>,
    counselor: Option<String>,
    registration: Option<RegistrationTicket>,
}

struct Desk {
    store: CsvStore,
    students: InMemoryCredentials,
    counselors: InMemoryCredentials,
    appointments: InMemoryAppointments,
    chat: ChatService<CommandResponder>,
    session: Session,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mindcare=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(store) = args.store {
        config.store_path = store;
    }
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(seconds) = args.chat_timeout {
        config.chat_timeout = std::time::Duration::from_secs(seconds);
    }
    tracing::info!(
        store = %config.store_path.display(),
        model = %config.model,
        chat_timeout = ?config.chat_timeout,
        "configuration loaded"
    );

    let mut desk = Desk {
        store: CsvStore::new(&config.store_path),
        students: InMemoryCredentials::seeded_students(),
        counselors: InMemoryCredentials::seeded_counselors(),
        appointments: InMemoryAppointments::seeded(),
        chat: ChatService::new(CommandResponder::from_config(&config)),
        session: Session::default(),
    };

    loop {
        println!();
        println!("1) Log in  2) Register  3) Book a session  4) Chat  5) Counselor view  6) Log out  q) Quit");
        match prompt("> ")?.as_str() {
            "1" => desk.login()?,
            "2" => desk.register()?,
            "3" => desk.booking()?,
            "4" => desk.chat()?,
            "5" => desk.counselor()?,
            "6" => {
                desk.session = Session::default();
                println!("{}", LOGGED_OUT);
            }
            "q" | "" => break,
            other => println!("Unknown choice {}", other),
        }
    }
    Ok(())
}

impl Desk {
    fn login(&mut self) -> Result<(), Error> {
        if let Some(ref student) = self.session.student {
            println!("Already logged in as {}.", student);
            return self.booking();
        }
        let username = prompt("Username: ")?;
        let password = prompt("Password: ")?;
        match accounts::login(&self.students, &username, &password) {
            Ok(message) => {
                println!("{}", message);
                self.session.student = Some(username);
                self.booking()
            }
            Err(message) => {
                println!("{}", message);
                Ok(())
            }
        }
    }

    fn register(&mut self) -> Result<(), Error> {
        let mut form = HashMap::new();
        for (key, label) in REGISTRATION_FIELDS {
            form.insert(key.to_string(), prompt(&format!("{}: ", label))?);
        }
        match register(&mut self.students, &form) {
            Ok(ticket) => {
                println!("{}", REGISTERED);
                self.session.student = Some(ticket.username().to_string());
                self.session.registration = Some(ticket);
                self.questionnaire()
            }
            Err(error) => {
                println!("{}", error);
                Ok(())
            }
        }
    }

    fn questionnaire(&mut self) -> Result<(), Error> {
        let mut answers = AnswerStore::default();
        for section in &QUESTIONS.sections {
            println!();
            println!("{}", section.title);
            let count = section.instrument.len();
            for (item, question) in section.questions.iter().enumerate() {
                println!("{}/{} {}", item + 1, count, question.text);
                for choice in &QUESTIONS.choices {
                    print!("  {} => {}", choice.score, choice.text);
                }
                println!();
                loop {
                    // no answer counts as 0
                    let line = prompt("")?;
                    let score = if line.is_empty() { Ok(0) } else { line.parse::<u8>() };
                    match score
                        .map_err(|_| Error::IllegalAnswer)
                        .and_then(|score| answers.push(score))
                    {
                        Ok(()) => break,
                        Err(_) => println!("Please answer with a number from 0 to 3."),
                    }
                }
            }
        }

        let outcome = submit_questionnaire(&self.store, self.session.registration.take(), &answers);
        println!("{}", outcome.message());
        match outcome {
            Outcome::Saved(record) => {
                println!("Your student id is {}.", record.student_id);
                println!(
                    "PHQ-9 {} ({}), GAD-7 {} ({}), GHQ {} ({}): {}",
                    record.phq_score,
                    record.phq_category,
                    record.gad_score,
                    record.gad_category,
                    record.ghq_score,
                    record.ghq_category,
                    record.risk_level
                );
                self.booking()
            }
            Outcome::RegistrationMissing => self.register(),
            Outcome::StorageFailed => Ok(()),
        }
    }

    fn booking(&mut self) -> Result<(), Error> {
        let Some(student) = self.session.student.clone() else {
            println!("Please log in first.");
            return Ok(());
        };
        if let Some(appointment) = self.appointments.find(&student) {
            println!(
                "Your session: {} at {}",
                appointment.date, appointment.time
            );
        }
        for (index, slot) in AVAILABLE_SLOTS.iter().enumerate() {
            println!("  {}) {}", index + 1, slot);
        }
        let choice = prompt("Slot (empty to skip): ")?;
        if choice.is_empty() {
            return Ok(());
        }
        let slot = choice
            .parse::<usize>()
            .ok()
            .and_then(|no| no.checked_sub(1))
            .and_then(|index| AVAILABLE_SLOTS.get(index).copied())
            .unwrap_or(choice.as_str());
        match book(&mut self.appointments, &student, slot, Local::now().date_naive()) {
            Ok(outcome) => println!("{}", outcome.message()),
            Err(error) => println!("{}", error),
        }
        Ok(())
    }

    fn chat(&mut self) -> Result<(), Error> {
        let code = prompt("Language (en / hi / ks): ")?;
        let language = Language::from_code(&code).unwrap_or_default();
        println!("{}", self.chat.reply("", Some(language.code())));
        loop {
            let message = prompt("you> ")?;
            match message.as_str() {
                "/exit" => return Ok(()),
                "/reset" => {
                    println!("{}", RESET);
                    return self.chat();
                }
                _ if message.is_empty() => return Ok(()),
                _ => println!("{}", self.chat.reply(&message, Some(language.code()))),
            }
        }
    }

    fn counselor(&mut self) -> Result<(), Error> {
        if self.session.counselor.is_none() {
            let username = prompt("Counselor: ")?;
            let password = prompt("Password: ")?;
            match accounts::counselor_login(&self.counselors, &username, &password) {
                Ok(message) => {
                    println!("{}", message);
                    self.session.counselor = Some(username);
                }
                Err(message) => {
                    println!("{}", message);
                    return Ok(());
                }
            }
        }
        for appointment in self.appointments.list() {
            println!(
                "{:<20} {} {:<14} {}",
                appointment.student_name, appointment.date, appointment.time, appointment.notes
            );
        }
        Ok(())
    }
}

/// Reads one trimmed line. End of input reads as an empty line.
fn prompt(label: &str) -> Result<String, Error> {
    print!("{}", label);
    stdout().flush()?;
    let mut buffer = String::new();
    stdin().read_line(&mut buffer)?;
    Ok(buffer.trim().to_string())
}
