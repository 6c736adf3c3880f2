use crate::api::auth::{role_from_token, Role};
use crate::error::ClientResult;
use crate::storage::{keys, KeyValueStore};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct AuthState {
    token: String,
    role: Role,
}

/// Application context shared by every screen: the auth token and the last selected course.
///
/// Writes go through to the persistent store so a restart restores them.
#[derive(Clone)]
pub struct AppContext {
    store: Arc<dyn KeyValueStore>,
    auth: Arc<RwLock<Option<AuthState>>>,
    selected_course: Arc<RwLock<Option<i64>>>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            auth: Arc::new(RwLock::new(None)),
            selected_course: Arc::new(RwLock::new(None)),
        }
    }

    /// Restore token, role and selected course from the store
    pub async fn restore(store: Arc<dyn KeyValueStore>) -> ClientResult<Self> {
        let context = Self::new(store);

        if let Some(token) = context.store.get(keys::AUTH_TOKEN).await? {
            let role = role_from_token(&token);
            info!("Restored stored session with role {}", role);
            *context.auth.write().await = Some(AuthState { token, role });
        }

        if let Some(raw) = context.store.get(keys::SELECTED_COURSE).await? {
            match raw.parse::<i64>() {
                Ok(course_id) => *context.selected_course.write().await = Some(course_id),
                Err(_) => warn!("Ignoring stored course id '{}'", raw),
            }
        }

        Ok(context)
    }

    /// Store a freshly issued token and return the role it carries
    pub async fn sign_in(&self, token: String) -> ClientResult<Role> {
        let role = role_from_token(&token);
        self.store.set(keys::AUTH_TOKEN, token.clone()).await?;
        *self.auth.write().await = Some(AuthState { token, role });
        info!("Signed in as {}", role);
        Ok(role)
    }

    /// Forget the token and the selected course
    pub async fn sign_out(&self) -> ClientResult<()> {
        self.store.remove(keys::AUTH_TOKEN).await?;
        self.store.remove(keys::SELECTED_COURSE).await?;
        *self.auth.write().await = None;
        *self.selected_course.write().await = None;
        debug!("Signed out");
        Ok(())
    }

    pub async fn token(&self) -> Option<String> {
        self.auth.read().await.as_ref().map(|a| a.token.clone())
    }

    pub async fn role(&self) -> Option<Role> {
        self.auth.read().await.as_ref().map(|a| a.role)
    }

    pub async fn is_signed_in(&self) -> bool {
        self.auth.read().await.is_some()
    }

    pub async fn selected_course(&self) -> Option<i64> {
        *self.selected_course.read().await
    }

    /// Remember the course the user last opened
    pub async fn select_course(&self, course_id: Option<i64>) -> ClientResult<()> {
        match course_id {
            Some(id) => self.store.set(keys::SELECTED_COURSE, id.to_string()).await?,
            None => self.store.remove(keys::SELECTED_COURSE).await?,
        }
        *self.selected_course.write().await = course_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::tests::token_with_role;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn sign_in_persists_and_restores() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let context = AppContext::new(Arc::clone(&store));
        assert!(!context.is_signed_in().await);

        let role = context.sign_in(token_with_role("student")).await.unwrap();
        assert_eq!(role, Role::Student);
        context.select_course(Some(12)).await.unwrap();

        let restored = AppContext::restore(Arc::clone(&store)).await.unwrap();
        assert_eq!(restored.role().await, Some(Role::Student));
        assert_eq!(restored.selected_course().await, Some(12));

        restored.sign_out().await.unwrap();
        assert!(restored.token().await.is_none());
        assert!(store.get(keys::AUTH_TOKEN).await.unwrap().is_none());
        assert!(store.get(keys::SELECTED_COURSE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bad_stored_course_id_is_ignored() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(keys::SELECTED_COURSE, "abc".to_string()).await.unwrap();
        let context = AppContext::restore(store).await.unwrap();
        assert_eq!(context.selected_course().await, None);
    }
}
