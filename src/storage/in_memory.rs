//! In-memory document store.
//!
//! Thread-safe implementation of [`DocumentStore`] over nested `HashMap`s
//! guarded by an async `RwLock`. Designed for testing and development, and
//! as the reference semantics other backends must match.
//!
//! # Performance characteristics
//!
//! * PUT/GET/DELETE: O(1) average case
//! * LIST: O(n log n) in the collection size (sorted by id)
//! * FIND_BY_FIELD: O(n) with dot-path traversal per document

use crate::storage::{Collection, DocumentKey, DocumentStore, StorageError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory document store.
///
/// Structure: `collection` → `document id` → `document`. Cloning is cheap
/// and shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<HashMap<Collection, HashMap<String, Value>>>>,
}

/// Occupancy counters for debugging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryStoreStats {
    pub collection_count: usize,
    pub total_documents: usize,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get occupancy statistics.
    pub async fn stats(&self) -> InMemoryStoreStats {
        let guard = self.data.read().await;
        InMemoryStoreStats {
            collection_count: guard.values().filter(|c| !c.is_empty()).count(),
            total_documents: guard.values().map(|c| c.len()).sum(),
        }
    }

    /// Extract a dot-path field value from a document as a comparable string.
    fn extract_field(document: &Value, path: &str) -> Option<String> {
        let mut current = document;
        for part in path.split('.') {
            current = if let Ok(index) = part.parse::<usize>() {
                current.get(index)?
            } else {
                current.get(part)?
            };
        }
        match current {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl DocumentStore for InMemoryStore {
    type Error = StorageError;

    async fn put(&self, key: DocumentKey, document: Value) -> Result<Value, Self::Error> {
        let mut guard = self.data.write().await;
        guard
            .entry(key.collection())
            .or_default()
            .insert(key.id().to_string(), document.clone());
        Ok(document)
    }

    async fn get(&self, key: DocumentKey) -> Result<Option<Value>, Self::Error> {
        let guard = self.data.read().await;
        Ok(guard
            .get(&key.collection())
            .and_then(|docs| docs.get(key.id()))
            .cloned())
    }

    async fn delete(&self, key: DocumentKey) -> Result<bool, Self::Error> {
        let mut guard = self.data.write().await;
        Ok(guard
            .get_mut(&key.collection())
            .is_some_and(|docs| docs.remove(key.id()).is_some()))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<(DocumentKey, Value)>, Self::Error> {
        let guard = self.data.read().await;
        let mut entries: Vec<(DocumentKey, Value)> = guard
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| (DocumentKey::new(collection, id.clone()), doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|(a, _), (b, _)| a.id().cmp(b.id()));
        Ok(entries)
    }

    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<(DocumentKey, Value)>, Self::Error> {
        if field.is_empty() {
            return Err(StorageError::invalid_query(collection, "empty field path"));
        }
        let guard = self.data.read().await;
        let mut matches: Vec<(DocumentKey, Value)> = guard
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| {
                        Self::extract_field(doc, field).as_deref() == Some(value)
                    })
                    .map(|(id, doc)| (DocumentKey::new(collection, id.clone()), doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        matches.sort_by(|(a, _), (b, _)| a.id().cmp(b.id()));
        Ok(matches)
    }

    async fn count(&self, collection: Collection) -> Result<usize, Self::Error> {
        let guard = self.data.read().await;
        Ok(guard.get(&collection).map(|docs| docs.len()).unwrap_or(0))
    }

    async fn clear(&self) -> Result<(), Self::Error> {
        let mut guard = self.data.write().await;
        guard.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_doc(id: &str, username: &str) -> Value {
        json!({
            "id": id,
            "username": username,
            "display_name": format!("User {username}"),
        })
    }

    #[tokio::test]
    async fn test_put_get_delete_round_trip() {
        let store = InMemoryStore::new();
        let key = DocumentKey::new(Collection::Users, "u-1");

        let stored = store.put(key.clone(), user_doc("u-1", "an")).await.unwrap();
        assert_eq!(stored["username"], "an");

        let retrieved = store.get(key.clone()).await.unwrap();
        assert_eq!(retrieved, Some(stored));

        assert!(store.delete(key.clone()).await.unwrap());
        assert!(!store.delete(key.clone()).await.unwrap());
        assert_eq!(store.get(key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = InMemoryStore::new();
        let key = DocumentKey::new(Collection::Users, "u-1");
        store.put(key.clone(), user_doc("u-1", "an")).await.unwrap();
        store
            .put(key.clone(), user_doc("u-1", "binh"))
            .await
            .unwrap();

        let doc = store.get(key).await.unwrap().unwrap();
        assert_eq!(doc["username"], "binh");
        assert_eq!(store.count(Collection::Users).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let store = InMemoryStore::new();
        for id in ["u-3", "u-1", "u-2"] {
            store
                .put(DocumentKey::new(Collection::Users, id), user_doc(id, id))
                .await
                .unwrap();
        }
        let listed = store.list(Collection::Users).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|(k, _)| k.id()).collect();
        assert_eq!(ids, vec!["u-1", "u-2", "u-3"]);
    }

    #[tokio::test]
    async fn test_find_by_field_exact_match() {
        let store = InMemoryStore::new();
        store
            .put(DocumentKey::new(Collection::Users, "u-1"), user_doc("u-1", "an"))
            .await
            .unwrap();
        store
            .put(DocumentKey::new(Collection::Users, "u-2"), user_doc("u-2", "binh"))
            .await
            .unwrap();

        let found = store
            .find_by_field(Collection::Users, "username", "an")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0.id(), "u-1");

        let none = store
            .find_by_field(Collection::Users, "username", "chi")
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_nested_field() {
        let store = InMemoryStore::new();
        let doc = json!({
            "id": "c-1",
            "image": {"file_id": "f-77", "url": "https://example.test/f-77"},
        });
        store
            .put(DocumentKey::new(Collection::Certificates, "c-1"), doc)
            .await
            .unwrap();

        let found = store
            .find_by_field(Collection::Certificates, "image.file_id", "f-77")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = InMemoryStore::new();
        store
            .put(DocumentKey::new(Collection::Users, "x"), json!({"id": "x"}))
            .await
            .unwrap();
        assert_eq!(store.count(Collection::Certificates).await.unwrap(), 0);
        assert!(
            store
                .get(DocumentKey::new(Collection::Certificates, "x"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_clear_empties_everything() {
        let store = InMemoryStore::new();
        store
            .put(DocumentKey::new(Collection::Users, "x"), json!({"id": "x"}))
            .await
            .unwrap();
        store.clear().await.unwrap();
        let stats = store.stats().await;
        assert_eq!(stats.total_documents, 0);
    }
}
