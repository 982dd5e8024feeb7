use crate::error::{CoursePressError, Result};
use crate::paths;
use crate::types::AvatarSource;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub name: String,
    pub source: AvatarSource,
    pub url: String,
    pub content_type: String,
}

impl Avatar {
    fn new(name: String, source: AvatarSource) -> Self {
        let content_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .to_string();
        let url = format!("/{}/{}", source.dir(), name);
        Self {
            name,
            source,
            url,
            content_type,
        }
    }
}

/// Image MIME type for a file extension, if it is one.
fn image_mime(ext: &str) -> Option<mime_guess::Mime> {
    mime_guess::from_ext(ext)
        .first()
        .filter(|m| m.type_() == mime_guess::mime::IMAGE)
}

/// A bare file name: no separators, no parent references, not hidden.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains('/')
        && !name.contains('\\')
        && name != ".."
}

/// List the image files of one avatar directory, sorted by name.
/// A missing directory yields an empty list.
pub fn list_source(root: &Path, source: AvatarSource) -> Result<Vec<Avatar>> {
    let dir = root.join(source.dir());
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut avatars = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_plain_file_name(&name) {
            continue;
        }
        let is_image = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(image_mime)
            .is_some();
        if is_image {
            avatars.push(Avatar::new(name, source));
        }
    }
    avatars.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(avatars)
}

/// Built-in avatars first, then uploaded ones.
pub fn list_avatars(root: &Path) -> Result<Vec<Avatar>> {
    let mut all = list_source(root, AvatarSource::Builtin)?;
    all.extend(list_source(root, AvatarSource::Uploaded)?);
    Ok(all)
}

/// Store an uploaded avatar under a sanitized name and return it.
///
/// The stem is slugged and the extension lowercased. When the name is taken
/// a short random suffix is appended.
pub fn save_avatar(root: &Path, filename: &str, bytes: &[u8], max_bytes: usize) -> Result<Avatar> {
    if bytes.len() > max_bytes {
        return Err(CoursePressError::AvatarTooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    let original = Path::new(filename);
    let ext = original
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| CoursePressError::UnsupportedAvatarType(filename.to_string()))?;
    if image_mime(&ext).is_none() {
        return Err(CoursePressError::UnsupportedAvatarType(filename.to_string()));
    }
    let stem = original
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| paths::slugify_or(s, "avatar"))
        .unwrap_or_else(|| "avatar".to_string());

    let dir = root.join(AvatarSource::Uploaded.dir());
    crate::io::ensure_dir(&dir)?;

    let mut name = format!("{stem}.{ext}");
    if dir.join(&name).exists() {
        let tag = uuid::Uuid::new_v4().simple().to_string();
        name = format!("{stem}-{}.{ext}", &tag[..8]);
    }

    crate::io::atomic_write(&dir.join(&name), bytes)?;
    tracing::info!(avatar = %name, size = bytes.len(), "stored avatar");
    Ok(Avatar::new(name, AvatarSource::Uploaded))
}

/// Delete an uploaded avatar. Built-in avatars cannot be deleted.
pub fn delete_avatar(root: &Path, name: &str) -> Result<()> {
    if !is_plain_file_name(name) {
        return Err(CoursePressError::AvatarNotFound(name.to_string()));
    }
    let path = root.join(AvatarSource::Uploaded.dir()).join(name);
    match std::fs::remove_file(&path) {
        Ok(()) => {
            tracing::info!(avatar = %name, "deleted avatar");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(CoursePressError::AvatarNotFound(name.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn list_merges_both_sources() {
        let dir = TempDir::new().unwrap();
        let builtin = dir.path().join(paths::AVATARS_DIR);
        std::fs::create_dir_all(&builtin).unwrap();
        std::fs::write(builtin.join("zorro.png"), PNG).unwrap();
        std::fs::write(builtin.join("ardilla.svg"), "<svg/>").unwrap();
        std::fs::write(builtin.join("readme.txt"), "not an image").unwrap();
        save_avatar(dir.path(), "Mi Foto.PNG", PNG, 1024).unwrap();

        let all = list_avatars(dir.path()).unwrap();
        let names: Vec<_> = all.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["ardilla.svg", "zorro.png", "mi-foto.png"]);
        assert_eq!(all[0].content_type, "image/svg+xml");
        assert_eq!(all[2].source, AvatarSource::Uploaded);
        assert_eq!(all[2].url, "/uploads/avatars/mi-foto.png");
    }

    #[test]
    fn list_missing_dirs_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list_avatars(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn save_rejects_non_images() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            save_avatar(dir.path(), "script.js", b"alert(1)", 1024),
            Err(CoursePressError::UnsupportedAvatarType(_))
        ));
        assert!(matches!(
            save_avatar(dir.path(), "noext", PNG, 1024),
            Err(CoursePressError::UnsupportedAvatarType(_))
        ));
    }

    #[test]
    fn save_enforces_size_limit() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            save_avatar(dir.path(), "big.png", &[0u8; 16], 8),
            Err(CoursePressError::AvatarTooLarge { size: 16, limit: 8 })
        ));
    }

    #[test]
    fn save_avoids_collisions() {
        let dir = TempDir::new().unwrap();
        let a = save_avatar(dir.path(), "cara.png", PNG, 1024).unwrap();
        let b = save_avatar(dir.path(), "cara.png", PNG, 1024).unwrap();
        assert_eq!(a.name, "cara.png");
        assert_ne!(a.name, b.name);
        assert!(b.name.starts_with("cara-") && b.name.ends_with(".png"));
    }

    #[test]
    fn save_strips_directories_from_name() {
        let dir = TempDir::new().unwrap();
        let a = save_avatar(dir.path(), "../../etc/evil.png", PNG, 1024).unwrap();
        assert_eq!(a.name, "evil.png");
        assert!(dir.path().join("uploads/avatars/evil.png").exists());
    }

    #[test]
    fn delete_only_touches_uploads() {
        let dir = TempDir::new().unwrap();
        let builtin = dir.path().join(paths::AVATARS_DIR);
        std::fs::create_dir_all(&builtin).unwrap();
        std::fs::write(builtin.join("zorro.png"), PNG).unwrap();

        assert!(matches!(
            delete_avatar(dir.path(), "zorro.png"),
            Err(CoursePressError::AvatarNotFound(_))
        ));
        assert!(builtin.join("zorro.png").exists());

        save_avatar(dir.path(), "mia.png", PNG, 1024).unwrap();
        delete_avatar(dir.path(), "mia.png").unwrap();
        assert!(matches!(
            delete_avatar(dir.path(), "../avatars/zorro.png"),
            Err(CoursePressError::AvatarNotFound(_))
        ));
    }
}
