use std::fmt;

/// Languages the pages and the chat helper are offered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Kashmiri,
}

/// Pages that have a translated variant.
pub const PAGES: [&str; 4] = ["index", "resources", "support", "chat-support"];

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Hindi, Language::Kashmiri];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::English),
            "hi" => Some(Language::Hindi),
            "ks" => Some(Language::Kashmiri),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Kashmiri => "ks",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Kashmiri => "Kashmiri",
        }
    }

    /// First line the chat helper says when the user sends nothing.
    pub fn greeting(self) -> &'static str {
        match self {
            Language::English => "Hello! I'm your MindCare assistant. How are you feeling today?",
            Language::Hindi => "नमस्ते! मैं आपका MindCare सहायक हूँ। आप आज कैसा महसूस कर रहे हैं?",
            Language::Kashmiri => "سلام! میں آپ کا MindCare معاون ہوں۔ آج آپ کیسا محسوس کر رہے ہیں؟",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of the page to show: `page` for the default, `page_<code>` for a
/// translation. Unknown pages and unknown language codes fall back to the
/// default page.
pub fn page_name(page: &str, code: Option<&str>) -> Option<String> {
    if !PAGES.contains(&page) {
        return None;
    }
    match code.and_then(Language::from_code) {
        Some(language) => Some(format!("{}_{}", page, language.code())),
        None => Some(page.to_string()),
    }
}
