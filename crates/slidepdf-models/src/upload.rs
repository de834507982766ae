//! Upload filename validation.

use thiserror::Error;

/// Presentation formats accepted for conversion.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".ppt", ".pptx"];

/// Rejected upload input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadValidationError {
    #[error("File must have a filename")]
    MissingFilename,

    #[error("Only .ppt, .pptx files allowed")]
    UnsupportedExtension,
}

/// Extract the file extension from a filename, including the dot, lowercased.
///
/// Returns an empty string when the filename has no extension.
pub fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => String::new(),
    }
}

/// Validate that an uploaded filename names an accepted presentation format.
pub fn validate_upload_filename(filename: &str) -> Result<(), UploadValidationError> {
    if filename.trim().is_empty() {
        return Err(UploadValidationError::MissingFilename);
    }

    let ext = file_extension(filename);
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(UploadValidationError::UnsupportedExtension);
    }

    Ok(())
}
