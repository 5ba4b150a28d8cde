use crate::claude_service::AnswerGenerator;
use crate::config::{Config, SYSTEM_PREAMBLE};
use crate::document_processor::TextExtractor;
use crate::models::*;
use crate::session::Session;
use std::sync::Arc;

pub struct QueryService {
    extractor: Arc<dyn TextExtractor>,
    generator: Arc<dyn AnswerGenerator>,
    context_chars: usize,
}

impl QueryService {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn AnswerGenerator>,
        config: &Config,
    ) -> Self {
        Self {
            extractor,
            generator,
            context_chars: config.context_chars,
        }
    }

    /// Extracts an uploaded PDF unless the session already holds content.
    pub async fn upload(&self, session: Session, bytes: Vec<u8>) -> Session {
        if !session.wants_upload() {
            log::debug!("Ignoring upload: document already loaded for this session");
            return session;
        }

        let extractor = self.extractor.clone();
        let outcome = tokio::task::spawn_blocking(move || extractor.extract_text(&bytes))
            .await
            .map_err(|e| e.to_string())
            .and_then(|result| result.map_err(|e| e.to_string()));

        if let Err(message) = &outcome {
            log::warn!("PDF extraction failed: {}", message);
        }

        session.with_extraction(outcome)
    }

    /// Submits `draft` as the next question. An empty draft or a session
    /// without content leaves the history untouched.
    pub async fn ask(&self, session: Session, draft: &str) -> Session {
        let session = session.with_draft(draft);

        let prepared = match (session.pending_question(), session.pdf_content()) {
            (Some(question), Some(content)) => Some((
                question.to_string(),
                session.turns_for(question),
                build_system_prompt(content, self.context_chars),
            )),
            _ => None,
        };
        let Some((question, turns, system)) = prepared else {
            return session;
        };

        log::info!(
            "Answering question #{} ({} turns)",
            session.chat_history().len() + 1,
            turns.len()
        );

        let answer = Answer::from(self.generator.generate(&system, &turns).await);
        if let Answer::Failed(err) = &answer {
            log::warn!("Answer generation failed: {}", err);
        }

        session.with_answer(question, answer)
    }
}

/// Preamble followed by at most `limit` characters of the document.
pub fn build_system_prompt(content: &str, limit: usize) -> String {
    let prefix: String = content.chars().take(limit).collect();
    format!("{}{}", SYSTEM_PREAMBLE, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingExtractor {
        calls: AtomicUsize,
        pages: Vec<&'static str>,
    }

    impl TextExtractor for CountingExtractor {
        fn extract_text(&self, _bytes: &[u8]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pages.concat())
        }
    }

    struct FailingExtractor;

    impl TextExtractor for FailingExtractor {
        fn extract_text(&self, _bytes: &[u8]) -> Result<String> {
            Err(anyhow::anyhow!("invalid file trailer"))
        }
    }

    #[derive(Default)]
    struct RecordingGenerator {
        calls: Mutex<Vec<(String, Vec<Turn>)>>,
        fail: bool,
    }

    #[async_trait]
    impl AnswerGenerator for RecordingGenerator {
        async fn generate(&self, system: &str, turns: &[Turn]) -> Result<String, GenerationError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((system.to_string(), turns.to_vec()));
            if self.fail {
                Err(GenerationError::Network("connection reset".to_string()))
            } else {
                Ok(format!("answer {}", calls.len()))
            }
        }
    }

    fn service(
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<RecordingGenerator>,
    ) -> QueryService {
        QueryService::new(extractor, generator, &Config::new("sk-test"))
    }

    fn two_page_extractor() -> Arc<CountingExtractor> {
        Arc::new(CountingExtractor {
            calls: AtomicUsize::new(0),
            pages: vec!["Hello", ""],
        })
    }

    #[test]
    fn system_prompt_starts_with_preamble_and_truncates_by_chars() {
        let content = "é".repeat(10_000);
        let prompt = build_system_prompt(&content, 8000);
        assert!(prompt.starts_with(SYSTEM_PREAMBLE));
        assert_eq!(prompt.chars().count(), SYSTEM_PREAMBLE.chars().count() + 8000);
    }

    #[test]
    fn short_documents_are_kept_whole() {
        assert_eq!(
            build_system_prompt("Hello", 8000),
            format!("{}Hello", SYSTEM_PREAMBLE)
        );
    }

    #[tokio::test]
    async fn second_upload_does_not_reinvoke_extractor() {
        let extractor = two_page_extractor();
        let service = service(extractor.clone(), Arc::new(RecordingGenerator::default()));

        let session = service.upload(Session::new(), b"%PDF".to_vec()).await;
        let session = service.upload(session, b"%PDF".to_vec()).await;

        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.pdf_content(), Some("Hello"));
    }

    #[tokio::test]
    async fn failed_upload_keeps_qa_closed() {
        let service = service(Arc::new(FailingExtractor), Arc::new(RecordingGenerator::default()));

        let session = service.upload(Session::new(), b"junk".to_vec()).await;
        assert!(!session.is_content_ready());
        assert!(matches!(session.notice(), Some(Notice::Error(m)) if m.contains("invalid file trailer")));
    }

    #[tokio::test]
    async fn conversation_replays_history_in_order() {
        let generator = Arc::new(RecordingGenerator::default());
        let service = service(two_page_extractor(), generator.clone());

        let session = service.upload(Session::new(), b"%PDF".to_vec()).await;
        let session = service.ask(session, "What does it say?").await;
        let session = service.ask(session, "Anything else?").await;

        let calls = generator.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);

        let (system, turns) = &calls[0];
        assert!(system.starts_with(SYSTEM_PREAMBLE));
        assert!(system.contains("Hello"));
        assert_eq!(turns, &vec![Turn::user("What does it say?")]);

        assert_eq!(
            calls[1].1,
            vec![
                Turn::user("What does it say?"),
                Turn::assistant("answer 1"),
                Turn::user("Anything else?"),
            ]
        );

        assert_eq!(session.chat_history().len(), 2);
        assert_eq!(session.draft_question(), "");
    }

    #[tokio::test]
    async fn empty_question_is_not_submitted() {
        let generator = Arc::new(RecordingGenerator::default());
        let service = service(two_page_extractor(), generator.clone());

        let session = service.upload(Session::new(), b"%PDF".to_vec()).await;
        let session = service.ask(session, "  ").await;

        assert!(generator.calls.lock().unwrap().is_empty());
        assert!(session.chat_history().is_empty());
    }

    #[tokio::test]
    async fn question_before_upload_is_not_submitted() {
        let generator = Arc::new(RecordingGenerator::default());
        let service = service(two_page_extractor(), generator.clone());

        let session = service.ask(Session::new(), "hello?").await;

        assert!(generator.calls.lock().unwrap().is_empty());
        assert!(session.chat_history().is_empty());
    }

    #[tokio::test]
    async fn generation_failure_is_stored_as_failed_answer() {
        let generator = Arc::new(RecordingGenerator {
            fail: true,
            ..Default::default()
        });
        let service = service(two_page_extractor(), generator);

        let session = service.upload(Session::new(), b"%PDF".to_vec()).await;
        let session = service.ask(session, "What does it say?").await;

        let entry = &session.chat_history()[0];
        assert!(!entry.answer.is_reply());
        assert!(entry.answer.text().starts_with("Error al generar respuesta:"));
        assert_eq!(session.draft_question(), "");
    }
}
