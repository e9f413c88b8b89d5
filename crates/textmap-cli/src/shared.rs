use std::path::Path;

use textmap::{Document, TextmapError};
use tracing::error;

/// Print `Error: …` to stderr and map to exit code 1.
pub fn fail(err: TextmapError) -> i32 {
    eprintln!("Error: {err}");
    1
}

/// Open a PDF with user-friendly error messages.
///
/// On a decryption failure without a password, logs a hint to pass
/// `--encryption-password`.
pub fn open_document(path: &Path, password: Option<&str>) -> Result<Document, i32> {
    Document::open_file(path, password).map_err(|e| {
        if matches!(
            e,
            TextmapError::PasswordRequired | TextmapError::InvalidPassword
        ) {
            error!("PDF decryption failed: {e}");
            if password.is_none() {
                error!("Please provide --encryption-password if PDF is encrypted");
            }
        }
        fail(e)
    })
}
