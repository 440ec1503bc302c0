use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One utterance in a conversation. Turns are append-only and never mutated;
/// `seq` is strictly increasing within a session.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub seq: u64,
    pub created_at: DateTime<Utc>,
}

/// Append-only log for a single session. Lives for the process lifetime and
/// is never persisted.
#[derive(Debug, Default)]
pub struct SessionMemory {
    turns: Vec<ConversationTurn>,
}

impl SessionMemory {
    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        let seq = self.turns.len() as u64;
        self.turns.push(ConversationTurn {
            role,
            text: text.into(),
            seq,
            created_at: Utc::now(),
        });
    }

    /// 1-indexed lookup counting backward from the most recent turn of
    /// `role`. Out-of-range `n` (including zero and negatives) is `None`,
    /// never an error.
    pub fn nth_most_recent(&self, role: Role, n: i64) -> Option<&str> {
        if n <= 0 {
            return None;
        }
        self.turns
            .iter()
            .rev()
            .filter(|turn| turn.role == role)
            .nth((n - 1) as usize)
            .map(|turn| turn.text.as_str())
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }
}

/// Session-scoped conversation memories keyed by session id. One entry per
/// active session; turns from different sessions never share a log.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, SessionMemory>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, session_id: &str, role: Role, text: impl Into<String>) {
        if let Ok(mut sessions) = self.inner.lock() {
            sessions
                .entry(session_id.to_string())
                .or_default()
                .append(role, text);
        }
    }

    pub fn nth_most_recent(&self, session_id: &str, role: Role, n: i64) -> Option<String> {
        let sessions = self.inner.lock().ok()?;
        sessions
            .get(session_id)?
            .nth_most_recent(role, n)
            .map(str::to_string)
    }

    /// Snapshot of a session's turns in order, for building model context.
    pub fn context(&self, session_id: &str) -> Vec<(Role, String)> {
        match self.inner.lock() {
            Ok(sessions) => sessions
                .get(session_id)
                .map(|memory| {
                    memory
                        .turns()
                        .iter()
                        .map(|turn| (turn.role, turn.text.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_strict_seq_order() {
        let mut memory = SessionMemory::default();
        memory.append(Role::User, "hi");
        memory.append(Role::Assistant, "hello there");
        memory.append(Role::User, "hello");

        let seqs: Vec<u64> = memory.turns().iter().map(|t| t.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(memory.nth_most_recent(Role::User, 1), Some("hello"));
    }

    #[test]
    fn nth_most_recent_counts_backward_per_role() {
        let mut memory = SessionMemory::default();
        for text in ["hi", "hello", "how are you"] {
            memory.append(Role::User, text);
            memory.append(Role::Assistant, "ack");
        }

        assert_eq!(memory.nth_most_recent(Role::User, 1), Some("how are you"));
        assert_eq!(memory.nth_most_recent(Role::User, 2), Some("hello"));
        assert_eq!(memory.nth_most_recent(Role::User, 3), Some("hi"));
    }

    #[test]
    fn out_of_range_lookups_are_none() {
        let mut memory = SessionMemory::default();
        memory.append(Role::User, "only one");

        assert_eq!(memory.nth_most_recent(Role::User, 2), None);
        assert_eq!(memory.nth_most_recent(Role::User, 0), None);
        assert_eq!(memory.nth_most_recent(Role::User, -3), None);
        assert_eq!(memory.nth_most_recent(Role::Assistant, 1), None);
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::new();
        store.append("a", Role::User, "from a");
        store.append("b", Role::User, "from b");

        assert_eq!(
            store.nth_most_recent("a", Role::User, 1),
            Some("from a".to_string())
        );
        assert_eq!(
            store.nth_most_recent("b", Role::User, 1),
            Some("from b".to_string())
        );
        assert_eq!(store.nth_most_recent("c", Role::User, 1), None);
        assert_eq!(store.context("a").len(), 1);
    }
}
