//! SeaORM implementation of MessageRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::domain::error::DomainResult;
use crate::domain::message::{Message, MessageDirection, MessageRepository};
use crate::infrastructure::database::entities::message;

pub struct SeaOrmMessageRepository {
    db: DatabaseConnection,
}

impl SeaOrmMessageRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: message::Model) -> Message {
    Message {
        id: m.id,
        direction: MessageDirection::from_str(&m.direction).unwrap_or(MessageDirection::Outbound),
        to_phone: m.to_phone,
        from_phone: m.from_phone,
        body: m.body,
        provider_message_id: m.provider_message_id,
        delivery_status: m.delivery_status,
        error_code: m.error_code,
        error_message: m.error_message,
        job_id: m.job_id,
        provider_id: m.provider_id,
        created_at: m.created_at,
    }
}

fn domain_to_active_model(m: &Message) -> message::ActiveModel {
    message::ActiveModel {
        id: Set(m.id.clone()),
        direction: Set(m.direction.as_str().to_string()),
        to_phone: Set(m.to_phone.clone()),
        from_phone: Set(m.from_phone.clone()),
        body: Set(m.body.clone()),
        provider_message_id: Set(m.provider_message_id.clone()),
        delivery_status: Set(m.delivery_status.clone()),
        error_code: Set(m.error_code.clone()),
        error_message: Set(m.error_message.clone()),
        job_id: Set(m.job_id.clone()),
        provider_id: Set(m.provider_id.clone()),
        created_at: Set(m.created_at),
    }
}

#[async_trait]
impl MessageRepository for SeaOrmMessageRepository {
    async fn insert(&self, message: Message) -> DomainResult<Message> {
        let model = domain_to_active_model(&message);
        model.insert(&self.db).await?;
        Ok(message)
    }

    async fn find_all(&self) -> DomainResult<Vec<Message>> {
        let models = message::Entity::find()
            .order_by_desc(message::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_provider_message_id(
        &self,
        provider_message_id: &str,
    ) -> DomainResult<Option<Message>> {
        let model = message::Entity::find()
            .filter(message::Column::ProviderMessageId.eq(provider_message_id))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }
}
