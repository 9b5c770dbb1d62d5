//! Explicit session context.
//!
//! One session is active at a time; a new processing action replaces it
//! wholesale. The session owns the conversation turn log (append-only, in
//! chronological order) and the responder handle bound to the active
//! index.

use crate::fingerprint::Fingerprint;
use crate::models::{ConversationTurn, Role};
use crate::responder::Responder;
use crate::translate::Language;

pub struct Session {
    pub fingerprint: Fingerprint,
    pub language: Language,
    /// Model-facing summary, always in the base language.
    pub summary_original: String,
    /// Summary shown to the user in the display language.
    pub summary_display: String,
    pub turns: Vec<ConversationTurn>,
    pub responder: Responder,
}

impl Session {
    pub fn new(
        fingerprint: Fingerprint,
        language: Language,
        summary_original: String,
        summary_display: String,
        responder: Responder,
    ) -> Self {
        Self {
            fingerprint,
            language,
            summary_original,
            summary_display,
            turns: Vec::new(),
            responder,
        }
    }

    pub fn push_turn(&mut self, role: Role, original: String, display: String) {
        self.turns.push(ConversationTurn {
            role,
            original,
            display,
        });
    }

    /// Base name for export artifacts: `report_<fp8>_<lang>`.
    pub fn export_stem(&self) -> String {
        format!("report_{}_{}", self.fingerprint.short(), self.language.code())
    }
}
