//! SeaORM implementation of PhotoRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::domain::error::DomainResult;
use crate::domain::photo::{Photo, PhotoRepository, PhotoScope, PhotoSource};
use crate::infrastructure::database::entities::photo;

pub struct SeaOrmPhotoRepository {
    db: DatabaseConnection,
}

impl SeaOrmPhotoRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: photo::Model) -> Photo {
    let scope = match (m.session_id, m.job_id) {
        (Some(session_id), _) => PhotoScope::Session(session_id),
        (None, Some(job_id)) => PhotoScope::Job(job_id),
        (None, None) => PhotoScope::None,
    };

    Photo {
        id: m.id,
        scope,
        source: PhotoSource::from_str(&m.source).unwrap_or(PhotoSource::WebUpload),
        bucket: m.bucket,
        content_type: m.content_type,
        byte_count: m.byte_count,
        mms_media_id: m.mms_media_id,
        created_at: m.created_at,
    }
}

fn domain_to_active_model(p: &Photo) -> photo::ActiveModel {
    let (session_id, job_id) = match &p.scope {
        PhotoScope::Session(id) => (Some(id.clone()), None),
        PhotoScope::Job(id) => (None, Some(id.clone())),
        PhotoScope::None => (None, None),
    };

    photo::ActiveModel {
        id: Set(p.id.clone()),
        session_id: Set(session_id),
        job_id: Set(job_id),
        source: Set(p.source.as_str().to_string()),
        bucket: Set(p.bucket.clone()),
        content_type: Set(p.content_type.clone()),
        byte_count: Set(p.byte_count),
        mms_media_id: Set(p.mms_media_id.clone()),
        created_at: Set(p.created_at),
    }
}

#[async_trait]
impl PhotoRepository for SeaOrmPhotoRepository {
    async fn insert(&self, photo: Photo) -> DomainResult<Photo> {
        let model = domain_to_active_model(&photo);
        model.insert(&self.db).await?;
        Ok(photo)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Photo>> {
        let model = photo::Entity::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_session(&self, session_id: &str) -> DomainResult<Vec<Photo>> {
        let models = photo::Entity::find()
            .filter(photo::Column::SessionId.eq(session_id))
            .order_by_asc(photo::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
