use std::sync::Arc;

use aqua_tracking::{User, UserId, Users, UsersError};

use super::rows::TrackingState;
use crate::storage::{HasStorage, TransactionalStorage};

/// `Users` repository over in-memory rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUsers {
    storage: Arc<TransactionalStorage<TrackingState>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage(storage: Arc<TransactionalStorage<TrackingState>>) -> Self {
        Self { storage }
    }

    /// Detached copy of every row.
    pub fn state(&self) -> Result<TrackingState, UsersError> {
        Ok(self.storage.view()?)
    }
}

impl HasStorage for InMemoryUsers {
    type State = TrackingState;

    fn storage(&self) -> &Arc<TransactionalStorage<TrackingState>> {
        &self.storage
    }
}

#[async_trait::async_trait]
impl Users for InMemoryUsers {
    async fn user_with_id(&self, user_id: UserId) -> Result<Option<User>, UsersError> {
        self.storage
            .read(|state| state.user(user_id))?
            .map_err(|e| UsersError::Storage(e.to_string()))
    }

    async fn contains_with_id(&self, user_id: UserId) -> Result<bool, UsersError> {
        Ok(self
            .storage
            .read(|state| state.users.contains_key(&user_id))?)
    }
}
