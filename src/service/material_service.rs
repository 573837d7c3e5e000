use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{CreateMaterial, Material, Role, User},
    error::{AppError, Result},
    repository::MaterialRepository,
    service::{access::{require_owner, require_role, AccessGuard}, require_text, Page},
    uploads::{FileStore, UploadKind, UploadedFile},
};

pub struct MaterialService {
    repo: Arc<dyn MaterialRepository>,
    files: Arc<FileStore>,
    guard: AccessGuard,
}

impl MaterialService {
    pub fn new(repo: Arc<dyn MaterialRepository>, files: Arc<FileStore>, guard: AccessGuard) -> Self {
        Self { repo, files, guard }
    }

    pub async fn list_for_course(&self, user: &User, course_id: Uuid, page: Page) -> Result<Vec<Material>> {
        self.guard.require_enrollment(user, course_id).await?;
        self.repo.list_for_course(course_id, page.limit, page.offset).await
    }

    pub async fn get(&self, user: &User, id: Uuid) -> Result<Material> {
        let material = self.find(id).await?;
        self.guard.require_enrollment(user, material.course_id).await?;
        Ok(material)
    }

    pub async fn create(&self, user: &User, request: CreateMaterial, upload: UploadedFile) -> Result<Material> {
        require_role(user, Role::Professor, "upload learning materials")?;
        self.guard.require_enrollment(user, request.course_id).await?;

        let request = CreateMaterial {
            course_id: request.course_id,
            title: require_text(&request.title, "Title")?,
            description: request
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        };

        let stored = self.files.save(UploadKind::Material, &upload).await?;
        let stored_path = stored.path.clone();

        match self.repo.create(user.id, request, stored).await {
            Ok(material) => {
                tracing::info!(
                    material_id = %material.id,
                    course_id = %material.course_id,
                    size = material.file_size,
                    "Uploaded learning material"
                );
                Ok(material)
            }
            Err(e) => {
                if let Err(cleanup) = self.files.delete(&stored_path).await {
                    tracing::warn!("Failed to remove orphaned upload {}: {}", stored_path, cleanup);
                }
                Err(e)
            }
        }
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> Result<()> {
        require_role(user, Role::Professor, "delete learning materials")?;
        let material = self.find(id).await?;
        require_owner(user, material.author_id, "learning materials")?;
        self.guard.require_enrollment(user, material.course_id).await?;

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Learning material not found".to_string()));
        }

        if let Err(e) = self.files.delete(&material.file_path).await {
            tracing::warn!("Failed to remove material file {}: {}", material.file_path, e);
        }

        tracing::info!(material_id = %id, "Deleted learning material");
        Ok(())
    }

    /// Locate the file behind a material the user may read.
    pub async fn download(&self, user: &User, id: Uuid) -> Result<(Material, PathBuf)> {
        let material = self.get(user, id).await?;

        let path = self.files
            .resolve(&material.file_path)
            .filter(|p| p.is_file())
            .ok_or_else(|| AppError::NotFound("File not found on server".to_string()))?;

        Ok((material, path))
    }

    async fn find(&self, id: Uuid) -> Result<Material> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Learning material not found".to_string()))
    }
}
