pub mod models;
pub mod config;
pub mod document_processor;
pub mod claude_service;
pub mod session;
pub mod query_service;

pub use models::*;
pub use config::Config;
pub use document_processor::{DocumentProcessor, TextExtractor};
pub use claude_service::{AnswerGenerator, ClaudeService};
pub use session::Session;
pub use query_service::QueryService;
