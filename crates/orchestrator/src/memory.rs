//! In-process conversation memory.
//!
//! Facts are kept per session and matched by plain keyword overlap. Good
//! enough for single-process deployments; a vector-backed store can slot in
//! behind the same trait.

use async_trait::async_trait;
use dashmap::DashMap;

use tripflow_core::traits::MemoryStore;
use tripflow_core::Result;

#[derive(Default)]
pub struct InMemoryMemoryStore {
    facts: DashMap<String, Vec<String>>,
}

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn retrieve_relevant(&self, user_id: &str, query: &str) -> Result<Vec<String>> {
        let Some(facts) = self.facts.get(user_id) else {
            return Ok(Vec::new());
        };
        let query_words: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.len() > 3)
            .map(str::to_string)
            .collect();
        let relevant: Vec<String> = facts
            .iter()
            .filter(|fact| {
                let lower = fact.to_lowercase();
                query_words.iter().any(|w| lower.contains(w.as_str()))
            })
            .cloned()
            .collect();
        // Nothing matched: hand back the most recent facts rather than none.
        if relevant.is_empty() {
            Ok(facts.iter().rev().take(5).cloned().collect())
        } else {
            Ok(relevant)
        }
    }

    async fn remember(&self, user_id: &str, fact: &str) -> Result<()> {
        self.facts
            .entry(user_id.to_string())
            .or_default()
            .push(fact.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keyword_overlap_selects_relevant_facts() {
        let store = InMemoryMemoryStore::new();
        store.remember("s1", "Traveller prefers hotels near the beach").await.unwrap();
        store.remember("s1", "Traveller is vegetarian").await.unwrap();

        let facts = store.retrieve_relevant("s1", "find me beach hotels").await.unwrap();
        assert_eq!(facts, vec!["Traveller prefers hotels near the beach".to_string()]);
    }

    #[tokio::test]
    async fn unknown_session_has_no_facts() {
        let store = InMemoryMemoryStore::new();
        assert!(store.retrieve_relevant("nobody", "anything").await.unwrap().is_empty());
    }
}
