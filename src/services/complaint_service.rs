//! Complaint ticketing: creation with screenshots, role-scoped reads, and
//! admin-only status changes and replies.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use std::sync::Arc;

use crate::config::{
    ALLOWED_IMAGE_TYPES, COMPLAINT_IMAGE_DIR, MAX_COMPLAINT_IMAGES, MAX_COMPLAINT_IMAGE_BYTES,
};
use crate::domain::{
    Complaint, ComplaintDetails, ComplaintListItem, ComplaintQuery, ComplaintResponse,
    ComplaintStats, ComplaintStatus, CurrentUser, NewComplaint,
};
use crate::errors::{AppError, AppResult, FieldErrors, OptionExt};
use crate::infra::{FileStorage, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

/// One uploaded screenshot as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// File extension for an accepted content type.
    fn extension(&self) -> Option<&'static str> {
        match self.content_type.as_deref()? {
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/png" => Some("png"),
            _ => None,
        }
    }
}

/// Check count, type and size of attached images.
pub fn validate_images(images: &[ImageUpload]) -> AppResult<()> {
    let mut messages = Vec::new();
    if images.len() > MAX_COMPLAINT_IMAGES {
        messages.push(format!(
            "Maksimal {} gambar per pengaduan",
            MAX_COMPLAINT_IMAGES
        ));
    }
    for (index, image) in images.iter().enumerate() {
        let accepted = image
            .content_type
            .as_deref()
            .is_some_and(|ct| ALLOWED_IMAGE_TYPES.contains(&ct));
        if !accepted {
            messages.push(format!("Gambar {} harus berformat jpeg, jpg, atau png", index + 1));
        }
        if image.bytes.len() > MAX_COMPLAINT_IMAGE_BYTES {
            messages.push(format!(
                "Gambar {} melebihi {} KB",
                index + 1,
                MAX_COMPLAINT_IMAGE_BYTES / 1024
            ));
        }
    }

    if messages.is_empty() {
        Ok(())
    } else {
        let mut errors = FieldErrors::new();
        errors.insert("images".to_string(), messages);
        Err(AppError::Validation(errors))
    }
}

fn require_admin(actor: &CurrentUser) -> AppResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        tracing::warn!(user_id = %actor.id, "Non-admin attempted an admin complaint action");
        Err(AppError::Forbidden)
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ComplaintService: Send + Sync {
    async fn create(
        &self,
        actor: &CurrentUser,
        complaint: NewComplaint,
        images: Vec<ImageUpload>,
    ) -> AppResult<ComplaintDetails>;

    /// Kaders only ever see their own tickets.
    async fn list(
        &self,
        actor: &CurrentUser,
        query: ComplaintQuery,
        page: PaginationParams,
    ) -> AppResult<Paginated<ComplaintListItem>>;

    async fn get(&self, actor: &CurrentUser, id: i64) -> AppResult<ComplaintDetails>;

    async fn update_status(
        &self,
        actor: &CurrentUser,
        id: i64,
        status: ComplaintStatus,
    ) -> AppResult<Complaint>;

    async fn add_response(
        &self,
        actor: &CurrentUser,
        id: i64,
        response: String,
    ) -> AppResult<ComplaintResponse>;

    async fn stats(&self, actor: &CurrentUser) -> AppResult<ComplaintStats>;

    /// Soft delete by the owner or an admin.
    async fn delete(&self, actor: &CurrentUser, id: i64) -> AppResult<()>;
}

pub struct ComplaintManager<U: UnitOfWork> {
    uow: Arc<U>,
    storage: Arc<dyn FileStorage>,
}

impl<U: UnitOfWork> ComplaintManager<U> {
    pub fn new(uow: Arc<U>, storage: Arc<dyn FileStorage>) -> Self {
        Self { uow, storage }
    }

    async fn discard(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.storage.remove(path).await {
                tracing::error!(path = %path, error = %e, "Failed to remove orphaned upload");
            }
        }
    }

    async fn store_images(&self, images: Vec<ImageUpload>) -> AppResult<Vec<String>> {
        let mut stored = Vec::with_capacity(images.len());
        for image in images {
            let extension = image
                .extension()
                .ok_or_else(|| AppError::validation("images", "Format gambar tidak didukung"))?;
            match self
                .storage
                .put(COMPLAINT_IMAGE_DIR, extension, image.bytes)
                .await
            {
                Ok(path) => stored.push(path),
                Err(e) => {
                    self.discard(&stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }
}

#[async_trait]
impl<U: UnitOfWork> ComplaintService for ComplaintManager<U> {
    async fn create(
        &self,
        actor: &CurrentUser,
        complaint: NewComplaint,
        images: Vec<ImageUpload>,
    ) -> AppResult<ComplaintDetails> {
        validate_images(&images)?;
        let paths = self.store_images(images).await?;

        let created = match self
            .uow
            .complaints()
            .create(actor.id, complaint, paths.clone())
            .await
        {
            Ok(created) => created,
            Err(e) => {
                self.discard(&paths).await;
                return Err(e);
            }
        };

        tracing::info!(
            pengaduan_id = created.id,
            user_id = %actor.id,
            images = paths.len(),
            "Complaint submitted"
        );
        self.uow
            .complaints()
            .find_details(created.id)
            .await?
            .ok_or_not_found("Pengaduan")
    }

    async fn list(
        &self,
        actor: &CurrentUser,
        query: ComplaintQuery,
        page: PaginationParams,
    ) -> AppResult<Paginated<ComplaintListItem>> {
        let (rows, total) = self
            .uow
            .complaints()
            .list(query.scoped_to(actor), page)
            .await?;
        Ok(Paginated::new(rows, page, total))
    }

    async fn get(&self, actor: &CurrentUser, id: i64) -> AppResult<ComplaintDetails> {
        let details = self
            .uow
            .complaints()
            .find_details(id)
            .await?
            .ok_or_not_found("Pengaduan")?;
        details.complaint.ensure_visible_to(actor)?;
        Ok(details)
    }

    async fn update_status(
        &self,
        actor: &CurrentUser,
        id: i64,
        status: ComplaintStatus,
    ) -> AppResult<Complaint> {
        require_admin(actor)?;
        let complaint = self.uow.complaints().update_status(id, status).await?;
        tracing::info!(pengaduan_id = id, status = status.as_str(), "Complaint status changed");
        Ok(complaint)
    }

    async fn add_response(
        &self,
        actor: &CurrentUser,
        id: i64,
        response: String,
    ) -> AppResult<ComplaintResponse> {
        require_admin(actor)?;
        self.uow
            .complaints()
            .add_response(id, actor.id, response)
            .await
    }

    async fn stats(&self, actor: &CurrentUser) -> AppResult<ComplaintStats> {
        require_admin(actor)?;
        let counts = self.uow.complaints().count_by_status().await?;
        Ok(ComplaintStats::from_counts(counts))
    }

    async fn delete(&self, actor: &CurrentUser, id: i64) -> AppResult<()> {
        let complaint = self
            .uow
            .complaints()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Pengaduan")?;
        complaint.ensure_visible_to(actor)?;

        self.uow.complaints().soft_delete(id).await?;
        tracing::info!(pengaduan_id = id, user_id = %actor.id, "Complaint deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(content_type: &str, size: usize) -> ImageUpload {
        ImageUpload {
            content_type: Some(content_type.to_string()),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn accepts_up_to_three_small_images() {
        let images = vec![image("image/png", 10), image("image/jpeg", 10), image("image/jpg", 10)];
        assert!(validate_images(&images).is_ok());
        assert_eq!(images[2].extension(), Some("jpg"));
    }

    #[test]
    fn rejects_fourth_image() {
        let images = vec![image("image/png", 1); 4];
        assert!(matches!(validate_images(&images), Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_wrong_type_and_oversize() {
        let images = vec![
            image("image/gif", 1),
            image("image/png", MAX_COMPLAINT_IMAGE_BYTES + 1),
        ];
        match validate_images(&images) {
            Err(AppError::Validation(errors)) => assert_eq!(errors["images"].len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}
