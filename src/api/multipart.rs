use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    uploads::UploadedFile,
};

fn multipart_error(err: MultipartError, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::Validation("Upload exceeds the request size limit".to_string());
    }
    AppError::BadRequest(format!("{}: {}", context, err.body_text()))
}

/// A fully buffered multipart form: text fields plus any attached files.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, "Malformed multipart body"))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name.is_empty() {
                continue;
            }

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| multipart_error(e, "Failed to read upload"))?;

                    // Browsers submit an empty part when no file was chosen
                    if !file_name.is_empty() && !data.is_empty() {
                        form.files.insert(name, UploadedFile {
                            file_name,
                            data: data.to_vec(),
                        });
                    }
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, "Failed to read form field"))?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    pub fn required_text(&self, name: &str) -> Result<String> {
        self.text(name)
            .ok_or_else(|| AppError::Validation(format!("Missing field: {}", name)))
    }

    pub fn required_id(&self, name: &str) -> Result<Uuid> {
        let raw = self.required_text(name)?;
        Uuid::parse_str(raw.trim())
            .map_err(|_| AppError::Validation(format!("Invalid {}: {}", name, raw)))
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

#[async_trait]
impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let multipart = Multipart::from_request(req, state).await?;
        Self::read(multipart).await
    }
}
