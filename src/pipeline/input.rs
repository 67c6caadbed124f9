//! Input resolution: validate a user-supplied source path.
//!
//! pdfium crashes unhelpfully on non-PDF input, so the `%PDF` magic bytes
//! are checked here before the file ever reaches the engine. The check also
//! turns "file missing" and "no read permission" into specific errors with
//! actionable messages instead of a generic open failure later on.

use crate::error::Pdf2PngError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve a local file path, validating existence and PDF magic bytes.
pub fn resolve_source(path_str: &str) -> Result<PathBuf, Pdf2PngError> {
    if path_str.is_empty() {
        return Err(Pdf2PngError::FileNotFound {
            path: PathBuf::new(),
        });
    }

    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(Pdf2PngError::FileNotFound { path });
    }

    check_magic(&path)?;

    debug!("Resolved source PDF: {}", path.display());
    Ok(path)
}

/// Verify the file starts with `%PDF`.
fn check_magic(path: &Path) -> Result<(), Pdf2PngError> {
    match std::fs::File::open(path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2PngError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Pdf2PngError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(Pdf2PngError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}
