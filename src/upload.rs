//! Reading the multipart forms used to create teams and players, which may
//! carry an image.

use std::collections::HashMap;

use axum::extract::{Multipart, multipart::MultipartError};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use crate::validation::{PlayerForm, TeamForm};

/// The text fields of a multipart form, plus at most one image.
#[derive(Debug, Default)]
pub struct Upload {
    fields: HashMap<String, String>,
    image: Option<String>,
}

impl Upload {
    /// Drains `multipart`. The part named `image_field` is encoded as a
    /// `data:` URI; every other part is read as text. A file input with
    /// nothing chosen arrives as an empty part and yields no image.
    pub async fn read(
        mut multipart: Multipart,
        image_field: &str,
    ) -> Result<Self, MultipartError> {
        let mut upload = Upload::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == image_field {
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                upload.image = data_uri(&mime, &bytes);
            } else {
                let text = field.text().await?;
                upload.fields.insert(name, text);
            }
        }

        Ok(upload)
    }

    fn take(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }

    pub fn into_team_form(mut self) -> TeamForm {
        TeamForm {
            name: self.take("name"),
            logo: self.image,
        }
    }

    pub fn into_player_form(mut self) -> PlayerForm {
        PlayerForm {
            name: self.take("name"),
            team_id: self.take("team_id"),
            photo: self.image,
        }
    }
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    Some(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
}
