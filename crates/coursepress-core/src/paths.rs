use crate::error::{CoursePressError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const COURSES_DIR: &str = "cursos";
pub const MODULE_DIR: &str = "module";
pub const METADATA_FILE: &str = "course-metadata.json";

pub const TEMPLATE_BASE_DIR: &str = "template/base";
pub const TEMPLATE_SCORM_DIR: &str = "template/scorm";
pub const TEMPLATE_MOMENTS_DIR: &str = "template/moments";

pub const AVATARS_DIR: &str = "avatars";
pub const UPLOADED_AVATARS_DIR: &str = "uploads/avatars";

pub const STATE_DIR: &str = ".coursepress";
pub const CATALOG_FILE: &str = ".coursepress/catalog.redb";
pub const CONFIG_FILE: &str = "coursepress.yaml";

pub const MANIFEST_FILE: &str = "imsmanifest.xml";

pub const MAX_SLUG_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn courses_dir(root: &Path) -> PathBuf {
    root.join(COURSES_DIR)
}

pub fn course_dir(root: &Path, id: &str) -> PathBuf {
    courses_dir(root).join(id)
}

/// Scratch directory a course tree is rendered into before it goes live.
/// Hidden so directory scans skip it; `tag` keeps concurrent rebuilds apart.
pub fn course_staging_dir(root: &Path, id: &str, tag: &str) -> PathBuf {
    courses_dir(root).join(format!(".{id}.staging-{tag}"))
}

/// Where the previous tree of a course is parked while the new one is
/// renamed into place.
pub fn course_backup_dir(root: &Path, id: &str, tag: &str) -> PathBuf {
    courses_dir(root).join(format!(".{id}.old-{tag}"))
}

pub fn course_metadata(root: &Path, id: &str) -> PathBuf {
    course_dir(root, id).join(METADATA_FILE)
}

pub fn lesson_dir_name(lesson: u32) -> String {
    format!("leccion{lesson}")
}

pub fn moment_dir_name(lesson: u32, moment: u32) -> String {
    format!("momento{lesson}_{moment}")
}

pub fn lesson_dir(root: &Path, id: &str, lesson: u32) -> PathBuf {
    course_dir(root, id)
        .join(MODULE_DIR)
        .join(lesson_dir_name(lesson))
}

pub fn moment_dir(root: &Path, id: &str, lesson: u32, moment: u32) -> PathBuf {
    lesson_dir(root, id, lesson).join(moment_dir_name(lesson, moment))
}

/// Path of a moment's directory relative to its course root, with forward slashes.
pub fn moment_rel_path(lesson: u32, moment: u32) -> String {
    format!(
        "{MODULE_DIR}/{}/{}",
        lesson_dir_name(lesson),
        moment_dir_name(lesson, moment)
    )
}

pub fn template_moment_dir(root: &Path, moment_type: &str) -> PathBuf {
    root.join(TEMPLATE_MOMENTS_DIR).join(moment_type)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn catalog_path(root: &Path) -> PathBuf {
    root.join(CATALOG_FILE)
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN || !slug_re().is_match(slug) {
        return Err(CoursePressError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' | 'Á' | 'À' | 'Ä' | 'Â' | 'Ã' | 'Å' => 'a',
        'é' | 'è' | 'ë' | 'ê' | 'É' | 'È' | 'Ë' | 'Ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' | 'Í' | 'Ì' | 'Ï' | 'Î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' | 'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' | 'Ú' | 'Ù' | 'Ü' | 'Û' => 'u',
        'ñ' | 'Ñ' => 'n',
        'ç' | 'Ç' => 'c',
        other => other,
    }
}

/// Turn a free-form course name into a filesystem-safe folder name.
///
/// Accents are folded, every other non-alphanumeric run becomes a single
/// hyphen, and the result is capped at [`MAX_SLUG_LEN`]. Names with nothing
/// usable fall back to `curso`.
pub fn slugify(name: &str) -> String {
    slugify_or(name, "curso")
}

/// [`slugify`] with a caller-chosen fallback for names with nothing usable.
pub fn slugify_or(name: &str, fallback: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.trim().chars().map(fold_accent) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// Upper bound on the `-N` suffixes tried for one course name.
const MAX_SLUG_SUFFIX: u32 = 1000;

fn suffixed_slug(base: &str, n: u32) -> String {
    let suffix = format!("-{n}");
    let mut stem = base.to_string();
    if stem.len() + suffix.len() > MAX_SLUG_LEN {
        stem.truncate(MAX_SLUG_LEN - suffix.len());
        while stem.ends_with('-') {
            stem.pop();
        }
    }
    format!("{stem}{suffix}")
}

/// Claim a course folder for `name`. The slug gets `-2`, `-3`, ... until
/// `create_dir` succeeds, so concurrent callers never share a folder. The
/// returned folder exists and is empty.
pub fn reserve_course_slug(root: &Path, name: &str) -> Result<String> {
    let base = slugify(name);
    std::fs::create_dir_all(courses_dir(root))?;
    for n in 1..=MAX_SLUG_SUFFIX {
        let candidate = if n == 1 {
            base.clone()
        } else {
            suffixed_slug(&base, n)
        };
        match std::fs::create_dir(course_dir(root, &candidate)) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(CoursePressError::CourseExists(base))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
