pub mod root;
pub mod auth;
pub mod courses;
pub mod announcements;
pub mod comments;
pub mod materials;

use serde::{Deserialize, Serialize};

use crate::service::Page;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ListParams> for Page {
    fn from(params: ListParams) -> Self {
        Page::new(params.limit, params.offset)
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
