use crate::course::CourseData;
use crate::error::{CoursePressError, Result};
use crate::paths;
use crate::types::MomentFile;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The three editable files of one moment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MomentFiles {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl MomentFiles {
    pub fn get(&self, file: MomentFile) -> &str {
        match file {
            MomentFile::Html => &self.html,
            MomentFile::Css => &self.css,
            MomentFile::Js => &self.js,
        }
    }
}

fn require_moment(root: &Path, id: &str, lesson: u32, moment: u32) -> Result<CourseData> {
    let course = CourseData::load(root, id)?;
    if lesson == 0 || lesson as usize > course.lessons.len() {
        return Err(CoursePressError::LessonNotFound {
            course: id.to_string(),
            lesson,
        });
    }
    if course.moment(lesson, moment).is_none() {
        return Err(CoursePressError::MomentNotFound {
            course: id.to_string(),
            lesson,
            moment,
        });
    }
    Ok(course)
}

/// Read a moment's html/css/js. Individual files that are missing read as
/// empty strings; a missing moment directory is an error.
pub fn load_moment(root: &Path, id: &str, lesson: u32, moment: u32) -> Result<MomentFiles> {
    require_moment(root, id, lesson, moment)?;
    let dir = paths::moment_dir(root, id, lesson, moment);
    if !dir.is_dir() {
        return Err(CoursePressError::MomentNotFound {
            course: id.to_string(),
            lesson,
            moment,
        });
    }

    let read = |file: MomentFile| -> Result<String> {
        match std::fs::read_to_string(dir.join(file.filename())) {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    };

    Ok(MomentFiles {
        html: read(MomentFile::Html)?,
        css: read(MomentFile::Css)?,
        js: read(MomentFile::Js)?,
    })
}

/// Overwrite one file of an existing moment.
pub fn save_moment_file(
    root: &Path,
    id: &str,
    lesson: u32,
    moment: u32,
    file: MomentFile,
    contents: &str,
) -> Result<()> {
    require_moment(root, id, lesson, moment)?;
    let path = paths::moment_dir(root, id, lesson, moment).join(file.filename());
    crate::io::atomic_write(&path, contents.as_bytes())?;
    tracing::debug!(course = %id, lesson, moment, file = %file, "saved moment file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::CourseDraft;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        CourseData::create(dir.path(), CourseDraft::new("Vial")).unwrap();
        dir
    }

    #[test]
    fn load_returns_rendered_files() {
        let dir = setup();
        let files = load_moment(dir.path(), "vial", 1, 1).unwrap();
        assert!(files.html.contains("Momento 1"));
        assert!(!files.css.is_empty());
        assert!(!files.js.is_empty());
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = setup();
        std::fs::remove_file(paths::moment_dir(dir.path(), "vial", 1, 1).join("slider.js")).unwrap();
        let files = load_moment(dir.path(), "vial", 1, 1).unwrap();
        assert_eq!(files.js, "");
    }

    #[test]
    fn save_overwrites_single_file() {
        let dir = setup();
        save_moment_file(dir.path(), "vial", 1, 1, MomentFile::Css, "body{color:red}").unwrap();
        let files = load_moment(dir.path(), "vial", 1, 1).unwrap();
        assert_eq!(files.get(MomentFile::Css), "body{color:red}");
        assert!(files.html.contains("<html"));
    }

    #[test]
    fn unknown_positions_are_rejected() {
        let dir = setup();
        assert!(matches!(
            load_moment(dir.path(), "vial", 2, 1),
            Err(CoursePressError::LessonNotFound { lesson: 2, .. })
        ));
        assert!(matches!(
            save_moment_file(dir.path(), "vial", 1, 9, MomentFile::Html, "x"),
            Err(CoursePressError::MomentNotFound { moment: 9, .. })
        ));
        assert!(matches!(
            load_moment(dir.path(), "otro", 1, 1),
            Err(CoursePressError::CourseNotFound(_))
        ));
    }

    #[test]
    fn removed_moment_directory_is_not_found() {
        let dir = setup();
        std::fs::remove_dir_all(paths::moment_dir(dir.path(), "vial", 1, 1)).unwrap();
        assert!(matches!(
            load_moment(dir.path(), "vial", 1, 1),
            Err(CoursePressError::MomentNotFound { .. })
        ));
    }
}
