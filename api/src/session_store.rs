use pdf_qa::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory sessions keyed by the browser's session cookie. Nothing is
/// evicted; everything is lost when the process exits.
///
/// Each session sits behind its own mutex. A handler holds that lock for the
/// whole transition, including extraction and the model call, so requests
/// from one browser run one after another.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored session, or a fresh one under a new id when the
    /// cookie is missing or unknown. The flag is true for fresh sessions.
    pub async fn load_or_create(&self, id: Option<Uuid>) -> (Uuid, SessionHandle, bool) {
        if let Some(id) = id {
            if let Some(handle) = self.sessions.read().await.get(&id) {
                return (id, handle.clone(), false);
            }
        }

        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(Session::new()));
        self.sessions.write().await.insert(id, handle.clone());
        log::info!("Started session {}", id);
        (id, handle, true)
    }
}

/// Runs one async transition on the locked session and stores the result.
pub async fn transition<F, Fut>(handle: &SessionHandle, apply: F)
where
    F: FnOnce(Session) -> Fut,
    Fut: std::future::Future<Output = Session>,
{
    let mut session = handle.lock().await;
    let current = std::mem::take(&mut *session);
    *session = apply(current).await;
}
