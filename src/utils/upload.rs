//! Multipart helpers for image upload endpoints.

use axum::extract::Multipart;

use scolara_core::AppError;

/// An uploaded image with its optional caption field.
pub struct ImageUpload {
    pub mime_type: String,
    pub content: Vec<u8>,
    pub title: Option<String>,
}

/// Read an image upload from a multipart body: a required `file` part and an
/// optional `title` text part. Anything else is ignored.
pub async fn read_image_upload(multipart: &mut Multipart) -> Result<ImageUpload, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::bad_request(anyhow::anyhow!("Failed to read file field: {e}"))
                })?;
                file = Some((mime_type, bytes.to_vec()));
            }
            Some("title") => {
                let text = field.text().await.map_err(|e| {
                    AppError::bad_request(anyhow::anyhow!("Failed to read title field: {e}"))
                })?;
                if !text.is_empty() {
                    title = Some(text);
                }
            }
            _ => {}
        }
    }

    let (mime_type, content) = file
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Missing file field in upload")))?;

    Ok(ImageUpload {
        mime_type,
        content,
        title,
    })
}
