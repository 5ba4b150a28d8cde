use serde::Deserialize;

#[derive(Deserialize)]
pub struct AskPayload {
    #[serde(default)]
    pub question: String,
}
