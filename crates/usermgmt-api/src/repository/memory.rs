//! 메모리 기반 사용자 저장소.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use usermgmt_core::{Identity, NewIdentity, StoreError, UserStore};

/// `RwLock<HashMap>` 기반 저장소.
///
/// 이메일 유일성 검사와 삽입이 같은 쓰기 잠금 안에서 수행되므로
/// 동시 가입 경합에서도 하나만 성공합니다.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, Identity>>,
    departments: RwLock<HashSet<Uuid>>,
    fail_updates: AtomicBool,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 부서 등록.
    pub async fn add_department(&self, department_id: Uuid) {
        self.departments.write().await.insert(department_id);
    }

    /// `update` 실패 주입 (장애 시나리오 테스트용).
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// 저장된 사용자 수.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Identity, StoreError> {
        let email = Identity::normalize_email(email);
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Identity, StoreError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        let mut users = self.users.write().await;

        let email = Identity::normalize_email(&identity.email);
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail(email));
        }

        let mut created = identity.into_identity(Uuid::new_v4(), Utc::now());
        created.email = email;
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, identity: &Identity) -> Result<(), StoreError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("update rejected".to_string()));
        }

        let mut users = self.users.write().await;
        let slot = users.get_mut(&identity.id).ok_or(StoreError::NotFound)?;
        *slot = Identity {
            updated_at: Utc::now(),
            ..identity.clone()
        };
        Ok(())
    }

    async fn department_exists(&self, department_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.departments.read().await.contains(&department_id))
    }

    async fn list(&self) -> Result<Vec<Identity>, StoreError> {
        let mut users: Vec<Identity> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use usermgmt_core::Role;

    fn new_identity(email: &str) -> NewIdentity {
        NewIdentity {
            email: email.to_string(),
            name: "Test".to_string(),
            password_hash: "$argon2id$dummy".to_string(),
            role: Role::Employee,
            department_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryUserStore::new();
        let created = store.create(new_identity("a@b.com")).await.unwrap();

        assert!(created.is_active);
        assert_eq!(store.find_by_email("A@B.com").await.unwrap().id, created.id);
        assert_eq!(store.find_by_id(created.id).await.unwrap().email, "a@b.com");
        assert!(matches!(
            store.find_by_id(Uuid::new_v4()).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_case_insensitive() {
        let store = InMemoryUserStore::new();
        store.create(new_identity("a@b.com")).await.unwrap();

        let result = store.create(new_identity("A@B.COM")).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_create_single_winner() {
        let store = Arc::new(InMemoryUserStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create(new_identity("race@b.com")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_and_fail_injection() {
        let store = InMemoryUserStore::new();
        let mut user = store.create(new_identity("a@b.com")).await.unwrap();

        user.is_active = false;
        store.update(&user).await.unwrap();
        assert!(!store.find_by_id(user.id).await.unwrap().is_active);

        store.fail_updates(true);
        user.is_active = true;
        assert!(matches!(
            store.update(&user).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(!store.find_by_id(user.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let store = InMemoryUserStore::new();
        let ghost = new_identity("ghost@b.com").into_identity(Uuid::new_v4(), Utc::now());
        assert!(matches!(store.update(&ghost).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_departments() {
        let store = InMemoryUserStore::new();
        let department = Uuid::new_v4();
        assert!(!store.department_exists(department).await.unwrap());

        store.add_department(department).await;
        assert!(store.department_exists(department).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_in_creation_order() {
        let store = InMemoryUserStore::new();
        let first = store.create(new_identity("first@b.com")).await.unwrap();
        let second = store.create(new_identity("second@b.com")).await.unwrap();

        let ids: Vec<Uuid> = store.list().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), 2);
        if first.created_at != second.created_at {
            assert_eq!(ids, vec![first.id, second.id]);
        }
    }
}
