//! Principal repository.

use crate::model::User;
use crate::repository::{RepositoryError, RepositoryResult, decode_document};
use crate::storage::{Collection, DocumentKey, DocumentStore};
use log::debug;

/// Typed access to the `Users` collection.
///
/// Enforces username uniqueness on save; everything else is plain CRUD over
/// the store with shape-at-read decoding.
#[derive(Debug, Clone)]
pub struct UserRepository<S> {
    store: S,
}

impl<S: DocumentStore> UserRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist a principal, rejecting a username already held by a
    /// different account.
    pub async fn save(&self, user: &User) -> RepositoryResult<()> {
        self.ensure_username_free(&user.username, Some(&user.id))
            .await?;
        let doc = serde_json::to_value(user)?;
        self.store
            .put(DocumentKey::new(Collection::Users, user.id.clone()), doc)
            .await
            .map_err(RepositoryError::storage)?;
        debug!("saved user {} ({})", user.id, user.username);
        Ok(())
    }

    /// Fetch one principal by id.
    pub async fn get(&self, id: &str) -> RepositoryResult<Option<User>> {
        let key = DocumentKey::new(Collection::Users, id);
        let doc = self
            .store
            .get(key.clone())
            .await
            .map_err(RepositoryError::storage)?;
        Ok(doc.and_then(|d| decode_document(&key, d)))
    }

    /// Fetch one principal by username.
    pub async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let matches = self
            .store
            .find_by_field(Collection::Users, "username", username)
            .await
            .map_err(RepositoryError::storage)?;
        Ok(matches
            .into_iter()
            .find_map(|(key, doc)| decode_document(&key, doc)))
    }

    /// List every well-formed principal document.
    pub async fn list(&self) -> RepositoryResult<Vec<User>> {
        let entries = self
            .store
            .list(Collection::Users)
            .await
            .map_err(RepositoryError::storage)?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, doc)| decode_document(&key, doc))
            .collect())
    }

    /// Delete a principal; `true` if one existed.
    pub async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        self.store
            .delete(DocumentKey::new(Collection::Users, id))
            .await
            .map_err(RepositoryError::storage)
    }

    /// Fail if `username` belongs to an account other than `exclude_id`.
    async fn ensure_username_free(
        &self,
        username: &str,
        exclude_id: Option<&str>,
    ) -> RepositoryResult<()> {
        let matches = self
            .store
            .find_by_field(Collection::Users, "username", username)
            .await
            .map_err(RepositoryError::storage)?;
        for (key, _) in matches {
            if Some(key.id()) != exclude_id {
                return Err(RepositoryError::Duplicate {
                    collection: Collection::Users,
                    field: "username".to_string(),
                    value: username.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewUser, Role};
    use crate::storage::InMemoryStore;
    use serde_json::json;

    fn make_user(username: &str) -> User {
        User::new(
            NewUser {
                username: username.into(),
                display_name: format!("User {username}"),
                password: "unused".into(),
                role: Role::Staff,
                department_id: None,
                title_id: None,
            },
            "hash".into(),
        )
    }

    #[tokio::test]
    async fn test_save_and_fetch() {
        let repo = UserRepository::new(InMemoryStore::new());
        let user = make_user("an");
        repo.save(&user).await.unwrap();

        let by_id = repo.get(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "an");

        let by_name = repo.find_by_username("an").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = UserRepository::new(InMemoryStore::new());
        repo.save(&make_user("an")).await.unwrap();

        let err = repo.save(&make_user("an")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_resave_same_account_allowed() {
        let repo = UserRepository::new(InMemoryStore::new());
        let mut user = make_user("an");
        repo.save(&user).await.unwrap();

        user.display_name = "Nguyễn Văn An".into();
        repo.save(&user).await.unwrap();
        let fetched = repo.get(&user.id).await.unwrap().unwrap();
        assert_eq!(fetched.display_name, "Nguyễn Văn An");
    }

    #[tokio::test]
    async fn test_malformed_document_is_skipped() {
        let store = InMemoryStore::new();
        let repo = UserRepository::new(store.clone());
        repo.save(&make_user("an")).await.unwrap();
        store
            .put(
                DocumentKey::new(Collection::Users, "broken"),
                json!({"id": "broken", "username": 42}),
            )
            .await
            .unwrap();

        let users = repo.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "an");
    }
}
