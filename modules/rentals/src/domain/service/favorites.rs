use tracing::{debug, instrument};
use uuid::Uuid;

use super::{db_err, Principal, Service};
use crate::contract::model::FlatWithOwner;
use crate::domain::error::DomainError;

impl Service {
    #[instrument(name = "rentals.service.list_favorites", skip(self, caller), fields(user_id = %caller.id))]
    pub async fn list_favorites(&self, caller: &Principal) -> Result<Vec<FlatWithOwner>, DomainError> {
        self.repos
            .favorites
            .list(caller.id)
            .await
            .map_err(db_err)
    }

    /// Idempotent; the flat must exist.
    #[instrument(name = "rentals.service.add_favorite", skip(self, caller), fields(user_id = %caller.id, flat_id = %flat_id))]
    pub async fn add_favorite(&self, caller: &Principal, flat_id: Uuid) -> Result<(), DomainError> {
        if self
            .repos
            .flats
            .find_by_id(flat_id)
            .await
            .map_err(db_err)?
            .is_none()
        {
            return Err(DomainError::flat_not_found(flat_id));
        }
        self.repos
            .favorites
            .add(caller.id, flat_id, Self::now())
            .await
            .map_err(db_err)?;
        debug!("Favorite added");
        Ok(())
    }

    /// Idempotent.
    #[instrument(name = "rentals.service.remove_favorite", skip(self, caller), fields(user_id = %caller.id, flat_id = %flat_id))]
    pub async fn remove_favorite(&self, caller: &Principal, flat_id: Uuid) -> Result<(), DomainError> {
        let removed = self
            .repos
            .favorites
            .remove(caller.id, flat_id)
            .await
            .map_err(db_err)?;
        debug!(removed, "Favorite removed");
        Ok(())
    }
}
