use tracing::{info, instrument};
use uuid::Uuid;

use super::{db_err, Principal, Service};
use crate::contract::model::{Message, MessageWithSender};
use crate::domain::error::DomainError;
use crate::domain::validation;

impl Service {
    #[instrument(name = "rentals.service.send_message", skip(self, caller, content), fields(flat_id = %flat_id, sender_id = %caller.id))]
    pub async fn send_message(
        &self,
        caller: &Principal,
        flat_id: Uuid,
        content: &str,
    ) -> Result<Message, DomainError> {
        let content = validation::message_content(content)?;
        let flat = self
            .repos
            .flats
            .find_by_id(flat_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::flat_not_found(flat_id))?;
        if flat.owner_id == caller.id {
            return Err(DomainError::forbidden("you cannot message your own flat"));
        }

        let message = Message {
            id: Uuid::now_v7(),
            flat_id,
            sender_id: caller.id,
            content,
            created_at: Self::now(),
        };
        self.repos
            .messages
            .insert(message.clone())
            .await
            .map_err(db_err)?;
        info!(message_id = %message.id, "Message sent");
        Ok(message)
    }

    /// The owner reads every message on the flat; anyone else only their own.
    #[instrument(name = "rentals.service.list_messages", skip(self, caller), fields(flat_id = %flat_id))]
    pub async fn list_messages(
        &self,
        caller: &Principal,
        flat_id: Uuid,
    ) -> Result<Vec<MessageWithSender>, DomainError> {
        let flat = self
            .repos
            .flats
            .find_by_id(flat_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::flat_not_found(flat_id))?;
        let sender = (flat.owner_id != caller.id).then_some(caller.id);
        self.repos
            .messages
            .list_for_flat(flat_id, sender)
            .await
            .map_err(db_err)
    }
}
