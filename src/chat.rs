//! Chat helper backed by a language model running on the same machine.
//!
//! The model is reached through the [`Responder`] capability. The stock
//! implementation runs `ollama run <model> <prompt>` once per message; there
//! is no conversation memory and no streaming.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::ChatError;
use crate::language::Language;

const SYSTEM_PROMPT: &str = include_str!("../resources/system_prompt.txt");

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub const FALLBACK: &str = "I'm sorry, I can't respond right now. Please try again in a moment, \
or reach out to a counselor. If you are in crisis, call 14416 or 1-800-891-4416.";

pub const RESET: &str =
    "Language reset. Which language would you like to talk in? (English / हिंदी / اُردُو)";

/// Turns a prompt into a reply.
pub trait Responder {
    fn respond(&self, prompt: &str) -> Result<String, ChatError>;
}

/// Runs an external program with the prompt as its last argument and reads
/// the reply from its stdout.
#[derive(Debug, Clone)]
pub struct CommandResponder {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandResponder {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `<model_program> run <model>`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.model_program.clone(), config.chat_timeout)
            .arg("run")
            .arg(config.model.clone())
    }
}

impl Responder for CommandResponder {
    fn respond(&self, prompt: &str) -> Result<String, ChatError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ChatError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdout = child.stdout.take().ok_or_else(|| {
            ChatError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "model stdout was not captured",
            ))
        })?;
        let reader = thread::spawn(move || {
            let mut reply = String::new();
            stdout.read_to_string(&mut reply).map(|_| reply)
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(error) => {
                    stop(&mut child);
                    return Err(error.into());
                }
            }
            if Instant::now() >= deadline {
                tracing::warn!(program = %self.program, timeout = ?self.timeout, "model timed out, killing it");
                stop(&mut child);
                return Err(ChatError::Timeout(self.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(ChatError::Failed(status));
        }
        let reply = reader.join().map_err(|_| {
            ChatError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "reader thread panicked",
            ))
        })??;
        Ok(reply.trim().to_string())
    }
}

/// Kills the child and reaps it so no zombie is left behind.
fn stop(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Builds prompts for the chosen language and shields the user from
/// model failures.
pub struct ChatService<R> {
    responder: R,
}

impl<R: Responder> ChatService<R> {
    pub fn new(responder: R) -> Self {
        Self { responder }
    }

    /// `lang` is a page language code; anything unknown means English.
    pub fn reply(&self, message: &str, lang: Option<&str>) -> String {
        let language = lang.and_then(Language::from_code).unwrap_or_default();
        let message = message.trim();
        if message.is_empty() {
            return language.greeting().to_string();
        }

        let prompt = build_prompt(language, message);
        let started = Instant::now();
        match self.responder.respond(&prompt) {
            Ok(reply) if !reply.is_empty() => {
                tracing::debug!(language = %language, elapsed = ?started.elapsed(), "model replied");
                reply
            }
            Ok(_) => {
                tracing::warn!(language = %language, "model returned an empty reply");
                FALLBACK.to_string()
            }
            Err(error) => {
                tracing::warn!(language = %language, %error, "model call failed");
                FALLBACK.to_string()
            }
        }
    }
}

pub fn system_prompt(language: Language) -> String {
    SYSTEM_PROMPT.replace("{language}", language.name())
}

pub fn build_prompt(language: Language, message: &str) -> String {
    format!(
        "System: {}\nUser: {}\nAssistant:",
        system_prompt(language).trim(),
        message
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;

    struct Recorder {
        prompts: RefCell<Vec<String>>,
        reply: Result<&'static str, ()>,
    }

    impl Recorder {
        fn replying(reply: &'static str) -> Self {
            Self {
                prompts: RefCell::new(Vec::new()),
                reply: Ok(reply),
            }
        }

        fn failing() -> Self {
            Self {
                prompts: RefCell::new(Vec::new()),
                reply: Err(()),
            }
        }
    }

    impl Responder for &Recorder {
        fn respond(&self, prompt: &str) -> Result<String, ChatError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            match self.reply {
                Ok(reply) => Ok(reply.to_string()),
                Err(()) => Err(ChatError::Timeout(Duration::from_secs(1))),
            }
        }
    }

    #[test]
    fn test_empty_message_greets() {
        let recorder = Recorder::replying("unused");
        let chat = ChatService::new(&recorder);
        assert_eq!(chat.reply("   ", Some("hi")), Language::Hindi.greeting());
        assert_eq!(chat.reply("", Some("xx")), Language::English.greeting());
        assert!(recorder.prompts.borrow().is_empty());
    }

    #[test]
    fn test_reply_uses_chosen_language() {
        let recorder = Recorder::replying("That sounds heavy. What is hardest right now?");
        let chat = ChatService::new(&recorder);
        let reply = chat.reply(" I'm stressed about exams ", Some("ks"));
        assert_eq!(reply, "That sounds heavy. What is hardest right now?");

        let prompts = recorder.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("System: "));
        assert!(prompts[0].contains("The user has chosen to speak in Kashmiri."));
        assert!(prompts[0].ends_with("\nUser: I'm stressed about exams\nAssistant:"));
        assert!(!prompts[0].contains("{language}"));
    }

    #[test]
    fn test_failure_falls_back() {
        let recorder = Recorder::failing();
        let chat = ChatService::new(&recorder);
        assert_eq!(chat.reply("hello", None), FALLBACK);
    }

    #[test]
    fn test_empty_reply_falls_back() {
        let recorder = Recorder::replying("");
        let chat = ChatService::new(&recorder);
        assert_eq!(chat.reply("hello", Some("en")), FALLBACK);
    }

    #[test]
    fn test_missing_program() {
        let responder = CommandResponder::new("/nonexistent/mindcare-model", Duration::from_secs(1));
        assert!(matches!(
            responder.respond("hi"),
            Err(ChatError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_reply_is_trimmed() {
        // sh -c passes the next argument, the prompt, as $0
        let responder = CommandResponder::new("sh", Duration::from_secs(10))
            .arg("-c")
            .arg("echo \"  heard: $0  \"");
        assert_eq!(responder.respond("hello").unwrap(), "heard: hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure() {
        let responder = CommandResponder::new("sh", Duration::from_secs(10))
            .arg("-c")
            .arg("exit 3");
        assert!(matches!(responder.respond("hello"), Err(ChatError::Failed(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_timeout() {
        let responder = CommandResponder::new("sh", Duration::from_millis(200))
            .arg("-c")
            .arg("exec sleep 5");
        let started = Instant::now();
        assert!(matches!(responder.respond("hello"), Err(ChatError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_reaps_child() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        stop(&mut child);
        assert!(matches!(child.try_wait(), Ok(Some(status)) if !status.success()));
    }

    #[test]
    fn test_from_config() {
        let responder = CommandResponder::from_config(&Config::default());
        assert_eq!(responder.program, "ollama");
        assert_eq!(responder.args, vec!["run".to_string(), "gemma3:1b".to_string()]);
        assert_eq!(responder.timeout, Duration::from_secs(60));
    }
}
