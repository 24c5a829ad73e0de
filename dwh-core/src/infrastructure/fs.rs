use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;

/// Replace a file's content through a temp file in the same directory.
///
/// Readers see either the old or the new content, never a truncated file.
/// The configuration file carries credentials, so an existing file keeps its
/// permissions across the rename.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let previous_permissions = std::fs::metadata(path).ok().map(|m| m.permissions());

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file.as_file().sync_all()?;

    if let Some(perms) = previous_permissions {
        temp_file.as_file().set_permissions(perms)?;
    }

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}
