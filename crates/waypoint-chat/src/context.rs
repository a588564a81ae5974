//! Conversation context management.
//!
//! Keeps a bounded, ordered log of recent turns in memory and hands the
//! most recent slice back to the orchestrator for the next model request.
//! Nothing is persisted; the log lives as long as its owner.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Default number of retained turns (4 exchanges).
pub const DEFAULT_MAX_TURNS: usize = 8;

// =============================================================================
// Turn
// =============================================================================

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used when a turn is serialized into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One role-tagged utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role.label(), self.text)
    }
}

// =============================================================================
// ContextStore
// =============================================================================

/// Bounded FIFO turn log, safe to share between concurrent requests.
///
/// After every append the log holds at most `max_turns` entries; the oldest
/// are evicted first.
pub struct ContextStore {
    turns: Mutex<VecDeque<Turn>>,
    max_turns: usize,
}

impl ContextStore {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Mutex::new(VecDeque::with_capacity(max_turns + 2)),
            max_turns,
        }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Append one turn at the end of the log.
    pub fn append(&self, role: Role, text: impl Into<String>) -> Result<(), ChatError> {
        let mut turns = self.lock()?;
        turns.push_back(Turn::new(role, text));
        self.enforce_bound(&mut turns);
        Ok(())
    }

    /// Append a user turn and its reply under a single lock, so concurrent
    /// exchanges never interleave.
    pub fn append_exchange(
        &self,
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
    ) -> Result<(), ChatError> {
        let mut turns = self.lock()?;
        turns.push_back(Turn::user(user_text));
        turns.push_back(Turn::assistant(assistant_text));
        self.enforce_bound(&mut turns);
        Ok(())
    }

    /// The last `n` turns (fewer if the log is shorter), oldest first.
    pub fn recent(&self, n: usize) -> Result<Vec<Turn>, ChatError> {
        let turns = self.lock()?;
        let skip = turns.len().saturating_sub(n);
        Ok(turns.iter().skip(skip).cloned().collect())
    }

    /// Every retained turn, oldest first.
    pub fn snapshot(&self) -> Result<Vec<Turn>, ChatError> {
        Ok(self.lock()?.iter().cloned().collect())
    }

    pub fn len(&self) -> Result<usize, ChatError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ChatError> {
        Ok(self.lock()?.is_empty())
    }

    /// Forget every turn.
    pub fn clear(&self) -> Result<(), ChatError> {
        self.lock()?.clear();
        Ok(())
    }

    // -- Private helpers --

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<Turn>>, ChatError> {
        self.turns
            .lock()
            .map_err(|e| ChatError::Context(format!("history lock poisoned: {}", e)))
    }

    fn enforce_bound(&self, turns: &mut VecDeque<Turn>) {
        while turns.len() > self.max_turns {
            turns.pop_front();
        }
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn texts(turns: &[Turn]) -> Vec<String> {
        turns.iter().map(|t| t.text.clone()).collect()
    }

    // ---- Append / recent ----

    #[test]
    fn test_new_store_is_empty() {
        let store = ContextStore::default();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.max_turns(), DEFAULT_MAX_TURNS);
        assert!(store.recent(4).unwrap().is_empty());
    }

    #[test]
    fn test_append_keeps_order_and_role() {
        let store = ContextStore::new(8);
        store.append(Role::User, "hi").unwrap();
        store.append(Role::Assistant, "hello").unwrap();

        let turns = store.snapshot().unwrap();
        assert_eq!(texts(&turns), vec!["hi", "hello"]);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
        assert!(turns[0].at <= turns[1].at);
    }

    #[test]
    fn test_recent_returns_tail_in_order() {
        let store = ContextStore::new(8);
        for i in 0..5 {
            store.append(Role::User, format!("t{}", i)).unwrap();
        }
        assert_eq!(texts(&store.recent(2).unwrap()), vec!["t3", "t4"]);
    }

    #[test]
    fn test_recent_more_than_available() {
        let store = ContextStore::new(8);
        store.append(Role::User, "only").unwrap();
        assert_eq!(texts(&store.recent(10).unwrap()), vec!["only"]);
    }

    #[test]
    fn test_recent_zero() {
        let store = ContextStore::new(8);
        store.append(Role::User, "x").unwrap();
        assert!(store.recent(0).unwrap().is_empty());
    }

    // ---- Bound enforcement ----

    #[test]
    fn test_bound_never_exceeded() {
        let store = ContextStore::new(8);
        for i in 0..30 {
            store.append(Role::User, format!("t{}", i)).unwrap();
            assert!(store.len().unwrap() <= 8);
        }
    }

    #[test]
    fn test_eviction_keeps_most_recent_max() {
        let store = ContextStore::new(8);
        for i in 0..11 {
            store.append(Role::User, format!("t{}", i)).unwrap();
        }
        let expected: Vec<String> = (3..11).map(|i| format!("t{}", i)).collect();
        assert_eq!(texts(&store.recent(8).unwrap()), expected);
    }

    #[test]
    fn test_exchange_eviction_drops_oldest_exchange() {
        let store = ContextStore::new(4);
        store.append_exchange("q1", "a1").unwrap();
        store.append_exchange("q2", "a2").unwrap();
        store.append_exchange("q3", "a3").unwrap();
        assert_eq!(texts(&store.snapshot().unwrap()), vec!["q2", "a2", "q3", "a3"]);
    }

    #[test]
    fn test_zero_bound_keeps_nothing() {
        let store = ContextStore::new(0);
        store.append_exchange("q", "a").unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_clear() {
        let store = ContextStore::new(8);
        store.append_exchange("q", "a").unwrap();
        store.clear().unwrap();
        assert_eq!(store.len().unwrap(), 0);
    }

    // ---- Concurrency ----

    #[test]
    fn test_concurrent_exchanges_stay_paired() {
        let store = Arc::new(ContextStore::new(1000));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..20 {
                        store
                            .append_exchange(format!("q{}-{}", t, i), format!("a{}-{}", t, i))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let turns = store.snapshot().unwrap();
        assert_eq!(turns.len(), 320);
        for pair in turns.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
            assert_eq!(pair[0].text[1..], pair[1].text[1..]);
        }
    }

    // ---- Display ----

    #[test]
    fn test_turn_display() {
        assert_eq!(Turn::user("Where to eat?").to_string(), "User: Where to eat?");
        assert_eq!(Turn::assistant("Try FC Road.").to_string(), "Assistant: Try FC Road.");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }
}
