//! Inline (`data:` URL) encoding of selected files.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::try_join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use super::state::FormState;

/// A file selected by the requester.
#[derive(Debug, Clone)]
pub enum FileInput {
    Path(PathBuf),
    Memory {
        name: String,
        media_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl FileInput {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn memory(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::Memory {
            name: name.into(),
            media_type: None,
            bytes,
        }
    }

    /// Decodes a base64 upload. `media_type` overrides the guess from `name`.
    pub fn from_base64(
        name: impl Into<String>,
        media_type: Option<String>,
        data: &str,
    ) -> Result<Self, EncodeError> {
        let name = name.into();
        let bytes = match STANDARD.decode(data.trim()) {
            Ok(bytes) => bytes,
            Err(source) => return Err(EncodeError::InvalidData { name, source }),
        };
        Ok(Self::Memory {
            name,
            media_type: media_type.filter(|value| !value.trim().is_empty()),
            bytes,
        })
    }

    pub fn name(&self) -> String {
        match self {
            Self::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Memory { name, .. } => name.clone(),
        }
    }
}

/// Which list of the record an encoded batch lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentTarget {
    Photos,
    Documents,
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("unable to read '{name}': {source}")]
    Unreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{name}' is not valid base64: {source}")]
    InvalidData {
        name: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("'{name}' is {media_type}, not an image")]
    NotAnImage { name: String, media_type: String },
}

impl EncodeError {
    /// Name of the file that failed the batch.
    pub fn name(&self) -> &str {
        match self {
            Self::Unreadable { name, .. }
            | Self::InvalidData { name, .. }
            | Self::NotAnImage { name, .. } => name,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Unreadable { name, .. } | Self::InvalidData { name, .. } => format!(
                "Não foi possível ler o arquivo \"{name}\". Nenhum arquivo foi adicionado."
            ),
            Self::NotAnImage { name, .. } => format!(
                "O arquivo \"{name}\" não é uma imagem. Nenhuma foto foi adicionada."
            ),
        }
    }
}

/// Borrowed view of a `data:<media-type>;base64,<payload>` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineData<'a> {
    pub media_type: &'a str,
    pub payload: &'a str,
}

pub fn encode_bytes(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

pub fn parse_inline_data(encoded: &str) -> Option<InlineData<'_>> {
    let rest = encoded.strip_prefix("data:")?;
    let (media_type, payload) = rest.split_once(";base64,")?;
    if media_type.is_empty() {
        return None;
    }
    Some(InlineData {
        media_type,
        payload,
    })
}

fn guess_media_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

pub async fn encode_file(input: FileInput) -> Result<String, EncodeError> {
    let name = input.name();
    match input {
        FileInput::Path(path) => {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|source| EncodeError::Unreadable { name, source })?;
            Ok(encode_bytes(&guess_media_type(&path), &bytes))
        }
        FileInput::Memory {
            media_type, bytes, ..
        } => {
            let media_type =
                media_type.unwrap_or_else(|| guess_media_type(Path::new(name.as_str())));
            Ok(encode_bytes(&media_type, &bytes))
        }
    }
}

/// Encodes every input concurrently. Results keep selection order; the first
/// unreadable file fails the whole batch.
pub async fn encode_batch(inputs: Vec<FileInput>) -> Result<Vec<String>, EncodeError> {
    try_join_all(inputs.into_iter().map(encode_file)).await
}

/// Encodes `inputs` and appends them to the chosen list only when the entire
/// batch succeeded. Photo batches must be images throughout. Returns the
/// number of files added.
pub async fn attach_files(
    form: &mut FormState,
    target: AttachmentTarget,
    inputs: Vec<FileInput>,
) -> Result<usize, EncodeError> {
    let requested = inputs.len();
    let names: Vec<String> = inputs.iter().map(FileInput::name).collect();
    let checked = encode_batch(inputs).await.and_then(|encoded| {
        if target == AttachmentTarget::Photos {
            ensure_images(&names, &encoded)?;
        }
        Ok(encoded)
    });
    let encoded = match checked {
        Ok(encoded) => encoded,
        Err(err) => {
            warn!(?target, requested, error = %err, "attachment batch rejected");
            return Err(err);
        }
    };

    let added = encoded.len();
    match target {
        AttachmentTarget::Photos => form.append_photos(encoded),
        AttachmentTarget::Documents => form.append_document_files(encoded),
    }
    debug!(?target, added, "attachments encoded");
    Ok(added)
}

fn ensure_images(names: &[String], encoded: &[String]) -> Result<(), EncodeError> {
    for (name, item) in names.iter().zip(encoded) {
        let media_type = parse_inline_data(item).map_or("", |inline| inline.media_type);
        if !media_type.starts_with("image/") {
            return Err(EncodeError::NotAnImage {
                name: name.clone(),
                media_type: media_type.to_string(),
            });
        }
    }
    Ok(())
}
