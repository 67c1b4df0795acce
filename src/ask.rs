//! Question answering over the stored document records.
//!
//! Every record in the store is flattened into a context block, prepended to
//! the question, and sent to the [`ChatModel`] in a single message:
//!
//! ```text
//! Context:
//! Document: report.txt, Path: uploads/report.txt
//! Document: notes.md, Path: uploads/notes.md
//!
//! Question: which files mention the budget?
//! ```
//!
//! The context is unbounded. Every record is included on every request with
//! no ranking and no token budget, so prompt size grows linearly with the
//! store and will eventually exceed the model's context window.

use anyhow::Result;

use crate::llm::ChatModel;
use crate::models::DocumentRecord;
use crate::store::DocumentStore;

/// Reply returned when the store holds no records.
pub const NO_DOCUMENTS_MESSAGE: &str = "No documents are stored in the database.";

/// Outcome of [`answer_question`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The store was empty; the model was not called.
    NoDocuments,
    /// The model's reply, unmodified.
    Reply(String),
}

impl Answer {
    /// Text to hand back to the caller.
    pub fn into_text(self) -> String {
        match self {
            Answer::NoDocuments => NO_DOCUMENTS_MESSAGE.to_string(),
            Answer::Reply(text) => text,
        }
    }
}

/// One `Document: {name}, Path: {path}` line per record, joined by `\n`.
pub fn build_context(records: &[DocumentRecord]) -> String {
    records
        .iter()
        .map(|r| format!("Document: {}, Path: {}", r.name, r.path))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(records: &[DocumentRecord], question: &str) -> String {
    format!(
        "Context:\n{}\n\nQuestion: {}",
        build_context(records),
        question
    )
}

/// List all records, build the prompt, and ask the model.
///
/// # Errors
///
/// Propagates store and model failures as-is. Nothing is retried.
pub async fn answer_question(
    store: &dyn DocumentStore,
    model: &dyn ChatModel,
    question: &str,
) -> Result<Answer> {
    let records = store.list_documents().await?;
    if records.is_empty() {
        tracing::info!("question asked with an empty document store");
        return Ok(Answer::NoDocuments);
    }

    let prompt = build_prompt(&records, question);
    tracing::debug!(
        documents = records.len(),
        prompt_bytes = prompt.len(),
        model = model.model_name(),
        "sending question to model"
    );

    let reply = model.chat(&prompt).await?;
    Ok(Answer::Reply(reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoModel {
        prompts: Mutex<Vec<String>>,
    }

    impl EchoModel {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for EchoModel {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn chat(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(format!("echo: {}", prompt.len()))
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn chat(&self, _prompt: &str) -> Result<String> {
            anyhow::bail!("model unavailable")
        }
    }

    #[test]
    fn test_build_context_single() {
        let records = vec![DocumentRecord::new("a.txt", "uploads/a.txt")];
        assert_eq!(build_context(&records), "Document: a.txt, Path: uploads/a.txt");
    }

    #[test]
    fn test_build_prompt_layout() {
        let records = vec![
            DocumentRecord::new("a.txt", "uploads/a.txt"),
            DocumentRecord::new("b.pdf", "uploads/b.pdf"),
        ];
        let prompt = build_prompt(&records, "what is in b?");
        assert_eq!(
            prompt,
            "Context:\nDocument: a.txt, Path: uploads/a.txt\nDocument: b.pdf, Path: uploads/b.pdf\n\nQuestion: what is in b?"
        );
    }

    #[tokio::test]
    async fn test_empty_store_skips_model() {
        let store = InMemoryStore::new();
        let model = EchoModel::new();

        let answer = answer_question(&store, &model, "anything?").await.unwrap();
        assert_eq!(answer, Answer::NoDocuments);
        assert!(model.prompts.lock().unwrap().is_empty());
        assert_eq!(answer.into_text(), NO_DOCUMENTS_MESSAGE);
    }

    #[tokio::test]
    async fn test_reply_is_returned_unmodified() {
        let store = InMemoryStore::with_records(vec![DocumentRecord::new("a", "uploads/a")]);
        let model = EchoModel::new();

        let answer = answer_question(&store, &model, "q").await.unwrap();
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(
            answer,
            Answer::Reply(format!("echo: {}", prompts[0].len()))
        );
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let store = InMemoryStore::with_records(vec![DocumentRecord::new("a", "uploads/a")]);
        let err = answer_question(&store, &FailingModel, "q")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model unavailable"));
    }
}
