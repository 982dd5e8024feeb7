use crate::catalog::CourseRecord;
use crate::error::{CoursePressError, Result};
use crate::paths;
use crate::template::{self, MomentTemplate};
use crate::types::{MomentFile, MomentType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Moment / Lesson / GlossaryEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moment {
    /// `momento<lesson>_<moment>`. Assigned from position on every save.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub moment_type: MomentType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Moment {
    pub fn new(moment_type: MomentType, name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            moment_type,
            name: name.into(),
            image: None,
            content: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// 1-based position, also the `leccion<id>` directory suffix.
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub moments: Vec<Moment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

/// Lesson structure used when a course has none on record.
pub fn default_lessons() -> Vec<Lesson> {
    let mut lessons = vec![Lesson {
        id: 1,
        name: "Lección 1".to_string(),
        moments: vec![Moment::new(MomentType::Slider, "Momento 1")],
    }];
    renumber(&mut lessons);
    lessons
}

fn renumber(lessons: &mut [Lesson]) {
    for (li, lesson) in lessons.iter_mut().enumerate() {
        let l = li as u32 + 1;
        lesson.id = l;
        for (mi, moment) in lesson.moments.iter_mut().enumerate() {
            moment.id = paths::moment_dir_name(l, mi as u32 + 1);
        }
    }
}

// ---------------------------------------------------------------------------
// CourseDraft
// ---------------------------------------------------------------------------

/// What the course form submits on create and on edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub glossary: Vec<GlossaryEntry>,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub custom_video: Option<String>,
}

impl CourseDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate names, fill in the default lesson structure when none was
    /// submitted, and renumber lesson and moment ids from their positions.
    pub fn normalize(mut self) -> Result<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(CoursePressError::InvalidCourse(
                "course name must not be empty".to_string(),
            ));
        }

        if self.lessons.is_empty() {
            self.lessons = default_lessons();
        }

        for (li, lesson) in self.lessons.iter().enumerate() {
            if lesson.name.trim().is_empty() {
                return Err(CoursePressError::InvalidCourse(format!(
                    "lesson {} has no name",
                    li + 1
                )));
            }
            for (mi, moment) in lesson.moments.iter().enumerate() {
                if moment.name.trim().is_empty() {
                    return Err(CoursePressError::InvalidCourse(format!(
                        "moment {}_{} has no name",
                        li + 1,
                        mi + 1
                    )));
                }
            }
        }

        self.objectives.retain(|o| !o.trim().is_empty());
        self.glossary.retain(|g| !g.term.trim().is_empty());
        if self
            .custom_video
            .as_deref()
            .is_some_and(|v| v.trim().is_empty())
        {
            self.custom_video = None;
        }

        renumber(&mut self.lessons);
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// CourseData
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseData {
    pub name: String,
    pub folder_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub lessons: Vec<Lesson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub glossary: Vec<GlossaryEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objectives: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_video: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseData {
    fn from_draft(folder_name: String, draft: CourseDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            name: draft.name,
            folder_name,
            description: draft.description,
            category: draft.category,
            lessons: draft.lessons,
            glossary: draft.glossary,
            objectives: draft.objectives,
            custom_video: draft.custom_video,
            created_at,
            updated_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.folder_name
    }

    pub fn moment_count(&self) -> usize {
        self.lessons.iter().map(|l| l.moments.len()).sum()
    }

    pub fn moment(&self, lesson: u32, moment: u32) -> Option<&Moment> {
        let l = self.lessons.get((lesson as usize).checked_sub(1)?)?;
        l.moments.get((moment as usize).checked_sub(1)?)
    }

    pub fn summary(&self) -> CourseRecord {
        CourseRecord {
            id: self.folder_name.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            lesson_count: self.lessons.len(),
            moment_count: self.moment_count(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn create(root: &Path, draft: CourseDraft) -> Result<Self> {
        let draft = draft.normalize()?;
        let id = paths::reserve_course_slug(root, &draft.name)?;

        let course = Self::from_draft(id, draft, Utc::now());
        if let Err(e) = course.install(root) {
            let _ = crate::io::remove_dir_if_exists(&paths::course_dir(root, &course.folder_name));
            return Err(e);
        }
        tracing::info!(course = %course.folder_name, "created course");
        Ok(course)
    }

    /// Replace a course with a freshly rendered tree. The folder name and
    /// creation time survive; everything else on disk is rewritten.
    pub fn update(root: &Path, id: &str, draft: CourseDraft) -> Result<Self> {
        let existing = Self::load(root, id)?;
        let draft = draft.normalize()?;

        let course = Self::from_draft(existing.folder_name, draft, existing.created_at);
        course.install(root)?;
        tracing::info!(course = %course.folder_name, "rewrote course");
        Ok(course)
    }

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        paths::validate_slug(id)?;
        let manifest = paths::course_metadata(root, id);
        if !manifest.exists() {
            return Err(CoursePressError::CourseNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&manifest)?;
        let course: CourseData = serde_json::from_str(&data)?;
        Ok(course)
    }

    pub fn delete(root: &Path, id: &str) -> Result<()> {
        paths::validate_slug(id)?;
        let dir = paths::course_dir(root, id);
        if !crate::io::remove_dir_if_exists(&dir)? {
            return Err(CoursePressError::CourseNotFound(id.to_string()));
        }
        tracing::info!(course = %id, "deleted course");
        Ok(())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = paths::courses_dir(root);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut courses = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().into_owned();
            if id.starts_with('.') {
                continue;
            }
            match Self::load(root, &id) {
                Ok(c) => courses.push(c),
                Err(CoursePressError::CourseNotFound(_)) | Err(CoursePressError::InvalidSlug(_)) => {
                    tracing::debug!(folder = %id, "skipping folder without course metadata");
                }
                Err(e) => return Err(e),
            }
        }
        courses.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(courses)
    }

    /// Lessons of a course, or the default structure when the folder exists
    /// but its metadata file is gone.
    pub fn lessons_or_default(root: &Path, id: &str) -> Result<Vec<Lesson>> {
        paths::validate_slug(id)?;
        if !paths::course_dir(root, id).is_dir() {
            return Err(CoursePressError::CourseNotFound(id.to_string()));
        }
        match Self::load(root, id) {
            Ok(c) => Ok(c.lessons),
            Err(CoursePressError::CourseNotFound(_)) => Ok(default_lessons()),
            Err(e) => Err(e),
        }
    }

    // -----------------------------------------------------------------------
    // Tree rendering
    // -----------------------------------------------------------------------

    /// Build the course tree in a staging folder, then swap it in place of
    /// the live folder.
    fn install(&self, root: &Path) -> Result<()> {
        let tag = uuid::Uuid::new_v4().simple().to_string();
        let staging = paths::course_staging_dir(root, &self.folder_name, &tag);

        if let Err(e) = self.write_tree(root, &staging) {
            let _ = crate::io::remove_dir_if_exists(&staging);
            return Err(e);
        }

        let live = paths::course_dir(root, &self.folder_name);
        let backup = paths::course_backup_dir(root, &self.folder_name, &tag);
        if let Err(e) = swap_in(&staging, &live, &backup) {
            let _ = crate::io::remove_dir_if_exists(&staging);
            return Err(e);
        }
        Ok(())
    }

    fn write_tree(&self, root: &Path, dest: &Path) -> Result<()> {
        crate::io::ensure_dir(dest)?;
        template::stamp_base(root, dest)?;

        let mut templates: HashMap<MomentType, MomentTemplate> = HashMap::new();
        for lesson in &self.lessons {
            let lesson_dir = dest
                .join(paths::MODULE_DIR)
                .join(paths::lesson_dir_name(lesson.id));
            for moment in &lesson.moments {
                if !templates.contains_key(&moment.moment_type) {
                    let t = MomentTemplate::load(root, moment.moment_type)?;
                    templates.insert(moment.moment_type, t);
                }
                let tpl = &templates[&moment.moment_type];
                let vars = [
                    ("course_name", self.name.as_str()),
                    ("lesson_name", lesson.name.as_str()),
                    ("moment_name", moment.name.as_str()),
                    ("moment_id", moment.id.as_str()),
                    ("moment_type", moment.moment_type.as_str()),
                    ("content", moment.content.as_deref().unwrap_or("")),
                    ("image", moment.image.as_deref().unwrap_or("")),
                ];
                let moment_dir = lesson_dir.join(&moment.id);
                for &file in MomentFile::all() {
                    let rendered = template::render(tpl.get(file), &vars);
                    crate::io::atomic_write(&moment_dir.join(file.filename()), rendered.as_bytes())?;
                }
            }
        }

        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(&dest.join(paths::METADATA_FILE), data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Rename `staging` to `live`, parking any current `live` at `backup` until
/// the new tree is in place. If the second rename fails the old tree is put
/// back.
fn swap_in(staging: &Path, live: &Path, backup: &Path) -> Result<()> {
    let had_live = live.exists();
    if had_live {
        std::fs::rename(live, backup)?;
    }
    if let Err(e) = std::fs::rename(staging, live) {
        if had_live {
            if let Err(restore) = std::fs::rename(backup, live) {
                tracing::error!(
                    live = %live.display(),
                    backup = %backup.display(),
                    error = %restore,
                    "could not restore course tree"
                );
            }
        }
        return Err(e.into());
    }
    if had_live {
        crate::io::remove_dir_if_exists(backup)?;
    }
    Ok(())
}
