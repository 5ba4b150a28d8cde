use minijinja::{context, Environment};
use pdf_qa::{ChatEntry, Session};
use serde::Serialize;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

#[derive(Serialize)]
struct HistoryEntry<'a> {
    question: &'a str,
    answer: String,
    failed: bool,
}

impl<'a> From<&'a ChatEntry> for HistoryEntry<'a> {
    fn from(entry: &'a ChatEntry) -> Self {
        Self {
            question: &entry.question,
            answer: entry.answer.text(),
            failed: !entry.answer.is_reply(),
        }
    }
}

/// Renders the single page of the app. Templates ending in `.html` are
/// auto-escaped.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(&self, session: &Session) -> Result<String, minijinja::Error> {
        let history: Vec<HistoryEntry> = session.chat_history().iter().map(HistoryEntry::from).collect();

        self.env.get_template("index.html")?.render(context! {
            notice => session.notice(),
            content_ready => session.is_content_ready(),
            history => history,
            draft => session.draft_question(),
        })
    }
}
