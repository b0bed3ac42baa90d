//! Insight generator collaborator: monthly summaries and the budgeting chat.
//!
//! The implementation lives outside this crate (an LLM-backed service). From
//! the ledger's point of view it is a pure function over transaction views;
//! its failures surface as `Error::Upstream` and never touch ledger state.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::constants::CHAT_SESSION_CAPACITY;
use crate::errors::Result;
use crate::transactions::TransactionView;

/// Trait implemented by the external insight generator.
#[async_trait]
pub trait InsightGeneratorTrait: Send + Sync {
    /// Produces a free-form financial summary from a transaction feed.
    async fn summarize(&self, transactions: &[TransactionView]) -> Result<String>;

    /// Answers one chat message in the owner's coaching conversation.
    async fn chat(&self, owner_id: &str, message: &str) -> Result<String>;
}

/// One turn in a coaching conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// Per-owner chat history for the insight collaborator. Bounded: when the
/// store is full, the least recently touched session is evicted to make
/// room. Sessions can also be evicted explicitly (e.g. on logout).
pub struct ChatSessionStore {
    sessions: DashMap<String, ChatSession>,
    capacity: usize,
    clock: std::sync::atomic::AtomicU64,
}

struct ChatSession {
    messages: Vec<ChatMessage>,
    last_touched: u64,
}

impl ChatSessionStore {
    pub fn new() -> Self {
        Self::with_capacity(CHAT_SESSION_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            capacity: capacity.max(1),
            clock: std::sync::atomic::AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }

    /// Appends a turn to an owner's session, creating the session if needed.
    pub fn append(&self, owner_id: &str, message: ChatMessage) {
        let stamp = self.tick();

        if !self.sessions.contains_key(owner_id) && self.sessions.len() >= self.capacity {
            self.evict_oldest();
        }

        let mut session = self
            .sessions
            .entry(owner_id.to_string())
            .or_insert_with(|| ChatSession {
                messages: Vec::new(),
                last_touched: stamp,
            });
        session.messages.push(message);
        session.last_touched = stamp;
    }

    /// Snapshot of an owner's conversation so far.
    pub fn history(&self, owner_id: &str) -> Vec<ChatMessage> {
        let stamp = self.tick();
        match self.sessions.get_mut(owner_id) {
            Some(mut session) => {
                session.last_touched = stamp;
                session.messages.clone()
            }
            None => Vec::new(),
        }
    }

    /// Drops an owner's session outright.
    pub fn evict(&self, owner_id: &str) {
        self.sessions.remove(owner_id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn evict_oldest(&self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|entry| entry.value().last_touched)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.sessions.remove(&key);
        }
    }
}

impl Default for ChatSessionStore {
    fn default() -> Self {
        Self::new()
    }
}
