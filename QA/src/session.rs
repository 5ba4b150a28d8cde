//! Per-session conversation state.
//!
//! Every transition consumes the session and returns the next one. Side
//! effects (PDF extraction, model calls) happen in [`crate::QueryService`],
//! which feeds their results into these transitions.

use crate::models::*;

pub const UPLOAD_FAILED_NOTICE: &str = "No se pudo procesar el PDF. Intenta con otro archivo.";
pub const NOT_A_PDF_NOTICE: &str = "El archivo debe ser un PDF.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pdf_content: Option<String>,
    chat_history: Vec<ChatEntry>,
    draft_question: String,
    notice: Option<Notice>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pdf_content(&self) -> Option<&str> {
        self.pdf_content.as_deref()
    }

    pub fn is_content_ready(&self) -> bool {
        self.pdf_content.is_some()
    }

    pub fn chat_history(&self) -> &[ChatEntry] {
        &self.chat_history
    }

    pub fn draft_question(&self) -> &str {
        &self.draft_question
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// True while no document text has been accepted yet.
    pub fn wants_upload(&self) -> bool {
        self.pdf_content.is_none()
    }

    /// Applies the outcome of an extraction. Ignored once content is set.
    pub fn with_extraction(mut self, outcome: Result<String, String>) -> Self {
        if self.pdf_content.is_some() {
            return self;
        }

        match outcome {
            Ok(text) if !text.is_empty() => {
                self.notice = Some(Notice::Success(format!(
                    "PDF procesado exitosamente. Contenido extraído: {} caracteres.",
                    text.chars().count()
                )));
                self.pdf_content = Some(text);
            }
            Ok(_) => {
                self.notice = Some(Notice::Error(UPLOAD_FAILED_NOTICE.to_string()));
            }
            Err(message) => {
                self.notice = Some(Notice::Error(format!(
                    "Error al extraer texto del PDF: {}. {}",
                    message, UPLOAD_FAILED_NOTICE
                )));
            }
        }
        self
    }

    /// A file that was refused before extraction. Content, if any, is kept.
    pub fn with_rejected_upload(mut self) -> Self {
        self.notice = Some(Notice::Error(NOT_A_PDF_NOTICE.to_string()));
        self
    }

    /// Notices are shown on one render only.
    pub fn without_notice(mut self) -> Self {
        self.notice = None;
        self
    }

    pub fn with_draft(mut self, draft: impl Into<String>) -> Self {
        self.draft_question = draft.into();
        self
    }

    /// The question a submit would send, if one is allowed right now.
    pub fn pending_question(&self) -> Option<&str> {
        let question = self.draft_question.trim();
        if question.is_empty() || !self.is_content_ready() {
            None
        } else {
            Some(question)
        }
    }

    /// Conversation turns for the next request: every answered entry as a
    /// user/assistant pair, then `question` as the final user turn.
    pub fn turns_for(&self, question: &str) -> Vec<Turn> {
        build_turns(&self.chat_history, question)
    }

    /// Records an answered question and clears the draft.
    pub fn with_answer(mut self, question: impl Into<String>, answer: Answer) -> Self {
        self.chat_history.push(ChatEntry {
            question: question.into(),
            answer,
        });
        self.draft_question.clear();
        self
    }
}

/// Failed entries are skipped as whole pairs so the sequence keeps
/// alternating and error text never reaches the model as assistant content.
pub fn build_turns(history: &[ChatEntry], question: &str) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(history.len() * 2 + 1);

    for entry in history {
        if let Answer::Reply(text) = &entry.answer {
            turns.push(Turn::user(entry.question.clone()));
            turns.push(Turn::assistant(text.clone()));
        }
    }

    turns.push(Turn::user(question));
    turns
}
