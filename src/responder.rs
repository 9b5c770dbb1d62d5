//! Retrieval-augmented responder.
//!
//! Grounds language-model output in the semantic index: summarization runs
//! a single-shot prompt over the indexed content, and question answering
//! retrieves the top-k most similar chunks and supplies them with the full
//! prior turn sequence in original-language form. Collaborator failures
//! propagate to the caller; there are no retries at this layer beyond the
//! HTTP clients' own backoff.

use std::sync::Arc;

use anyhow::Result;

use crate::embedding::Embedder;
use crate::index::SemanticIndex;
use crate::llm::{ChatMessage, LlmClient};
use crate::models::ConversationTurn;

pub struct Responder {
    index: Arc<SemanticIndex>,
    embedder: Arc<dyn Embedder>,
    llm: LlmClient,
    top_k: usize,
    context_budget_chars: usize,
}

impl Responder {
    pub fn new(
        index: Arc<SemanticIndex>,
        embedder: Arc<dyn Embedder>,
        llm: LlmClient,
        top_k: usize,
        context_budget_chars: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            llm,
            top_k,
            context_budget_chars,
        }
    }

    pub fn llm(&self) -> &LlmClient {
        &self.llm
    }

    /// Number of chunks in the bound index.
    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    /// Condense the indexed content into a Markdown summary of
    /// approximately `words` words. No conversation history is involved.
    pub async fn summarize(&self, words: usize) -> Result<String> {
        let context = self.whole_index_context();
        let messages = build_summary_messages(&context, words);
        self.llm.complete(&messages).await
    }

    /// Answer a question grounded in the top-k retrieved chunks, with the
    /// prior turns passed in original (non-display) language so translation
    /// drift never compounds across the conversation.
    pub async fn answer(&self, question: &str, history: &[ConversationTurn]) -> Result<String> {
        let query_vec = self.embedder.embed_query(question).await?;
        let hits = self.index.top_k(&query_vec, self.top_k);
        let context = hits
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n---\n");

        let messages = build_answer_messages(&context, history, question);
        self.llm.complete(&messages).await
    }

    /// All chunk texts up to the configured context budget, in index order.
    fn whole_index_context(&self) -> String {
        let mut context = String::new();
        for text in self.index.chunk_texts() {
            if !context.is_empty() && context.len() + text.len() + 2 > self.context_budget_chars {
                break;
            }
            if !context.is_empty() {
                context.push_str("\n\n");
            }
            context.push_str(text);
        }
        context
    }
}

/// Message list for the single-shot summarization call.
pub fn build_summary_messages(context: &str, words: usize) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "You are a helpful assistant that summarises documents. \
             Use only the provided content.\n\nContent:\n{}",
            context
        )),
        ChatMessage::user(format!(
            "Summarise the provided content in clear Markdown. Use headings (##), \
             bullet points, and **bold** for key terms. The summary should be \
             approximately {} words.",
            words
        )),
    ]
}

/// Message list for a retrieval-grounded answer: system context, then the
/// prior turns as (role, original-language text), then the question.
pub fn build_answer_messages(
    context: &str,
    history: &[ConversationTurn],
    question: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(format!(
        "You are a helpful assistant that answers questions about a document. \
         Answer using only the context below; say so when the context does not \
         contain the answer.\n\nContext:\n{}",
        context
    )));
    for turn in history {
        messages.push(ChatMessage {
            role: turn.role.as_str().to_string(),
            content: turn.original.clone(),
        });
    }
    messages.push(ChatMessage::user(question));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn answer_messages_carry_original_language_history() {
        let history = vec![
            ConversationTurn {
                role: Role::User,
                original: "What is chapter one about?".to_string(),
                display: "¿De qué trata el primer capítulo?".to_string(),
            },
            ConversationTurn {
                role: Role::Assistant,
                original: "It introduces the setting.".to_string(),
                display: "Presenta el escenario.".to_string(),
            },
        ];

        let messages = build_answer_messages("ctx", &history, "And chapter two?");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "What is chapter one about?");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[2].content, "It introduces the setting.");
        assert_eq!(messages[3].role, "user");
        assert_eq!(messages[3].content, "And chapter two?");
    }

    #[test]
    fn single_prior_turn_yields_single_history_message() {
        let history = vec![ConversationTurn {
            role: Role::User,
            original: "first question".to_string(),
            display: "first question".to_string(),
        }];
        let messages = build_answer_messages("ctx", &history, "second question");
        // system + one prior turn + new question
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "first question");
    }

    #[test]
    fn summary_messages_request_word_target() {
        let messages = build_summary_messages("some content", 250);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("some content"));
        assert!(messages[1].content.contains("approximately 250 words"));
    }
}
