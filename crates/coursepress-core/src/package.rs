//! SCORM 1.2 ZIP export.
//!
//! The archive is assembled in memory and never written to disk. Entry order:
//! the generated `imsmanifest.xml`, the course tree (minus its metadata
//! file), then `template/scorm/` files the course did not already provide.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::course::CourseData;
use crate::error::{CoursePressError, Result};
use crate::paths;
use crate::template::escape_html;
use crate::types::MomentFile;

fn zip_err(e: zip::result::ZipError) -> CoursePressError {
    CoursePressError::Archive(e.to_string())
}

/// Download file name for a course archive.
pub fn archive_name(course: &CourseData) -> String {
    format!("{}.zip", course.folder_name)
}

/// Render the SCORM 1.2 manifest: one organization, one item per lesson,
/// one SCO per moment.
pub fn manifest_xml(course: &CourseData) -> String {
    let id = &course.folder_name;
    let mut xml = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        xml,
        r#"<manifest identifier="coursepress-{id}" version="1.0"
  xmlns="http://www.imsproject.org/xsd/imscp_rootv1p1p2"
  xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2"
  xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
  xsi:schemaLocation="http://www.imsproject.org/xsd/imscp_rootv1p1p2 imscp_rootv1p1p2.xsd http://www.imsglobal.org/xsd/imsmd_rootv1p2p1 imsmd_rootv1p2p1.xsd http://www.adlnet.org/xsd/adlcp_rootv1p2 adlcp_rootv1p2.xsd">"#
    );
    let _ = writeln!(
        xml,
        "  <metadata>\n    <schema>ADL SCORM</schema>\n    <schemaversion>1.2</schemaversion>\n  </metadata>"
    );
    let _ = writeln!(xml, r#"  <organizations default="ORG-{id}">"#);
    let _ = writeln!(xml, r#"    <organization identifier="ORG-{id}">"#);
    let _ = writeln!(xml, "      <title>{}</title>", escape_html(&course.name));
    for lesson in &course.lessons {
        let _ = writeln!(
            xml,
            r#"      <item identifier="ITEM-L{}">"#,
            lesson.id
        );
        let _ = writeln!(xml, "        <title>{}</title>", escape_html(&lesson.name));
        for moment in &lesson.moments {
            let _ = writeln!(
                xml,
                r#"        <item identifier="ITEM-{m}" identifierref="RES-{m}">"#,
                m = moment.id
            );
            let _ = writeln!(xml, "          <title>{}</title>", escape_html(&moment.name));
            let _ = writeln!(xml, "        </item>");
        }
        let _ = writeln!(xml, "      </item>");
    }
    let _ = writeln!(xml, "    </organization>");
    let _ = writeln!(xml, "  </organizations>");
    let _ = writeln!(xml, "  <resources>");
    for lesson in &course.lessons {
        for (mi, moment) in lesson.moments.iter().enumerate() {
            let base = paths::moment_rel_path(lesson.id, mi as u32 + 1);
            let _ = writeln!(
                xml,
                r#"    <resource identifier="RES-{}" type="webcontent" adlcp:scormtype="sco" href="{base}/{}">"#,
                moment.id,
                MomentFile::Html.filename()
            );
            for &file in MomentFile::all() {
                let _ = writeln!(xml, r#"      <file href="{base}/{}"/>"#, file.filename());
            }
            let _ = writeln!(xml, "    </resource>");
        }
    }
    let _ = writeln!(xml, "  </resources>");
    let _ = writeln!(xml, "</manifest>");
    xml
}

/// Files under `dir` as (forward-slash relative path, absolute path), sorted.
fn collect_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((rel, entry.path().to_path_buf()));
    }
    Ok(files)
}

/// Build the downloadable SCORM archive for a course and return its bytes.
pub fn export_zip(root: &Path, id: &str) -> Result<Vec<u8>> {
    let course = CourseData::load(root, id)?;
    let course_dir = paths::course_dir(root, id);

    let opts = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut seen: HashSet<String> = HashSet::new();

    zip.start_file(paths::MANIFEST_FILE, opts).map_err(zip_err)?;
    zip.write_all(manifest_xml(&course).as_bytes())?;
    seen.insert(paths::MANIFEST_FILE.to_string());

    let course_files = collect_files(&course_dir)?;
    let scorm_files = collect_files(&root.join(paths::TEMPLATE_SCORM_DIR))?;

    for (rel, path) in course_files.into_iter().chain(scorm_files) {
        if rel == paths::METADATA_FILE || !seen.insert(rel.clone()) {
            continue;
        }
        let data = std::fs::read(&path)?;
        zip.start_file(rel.as_str(), opts).map_err(zip_err)?;
        zip.write_all(&data)?;
    }

    let cursor = zip.finish().map_err(zip_err)?;
    let bytes = cursor.into_inner();
    tracing::info!(course = %id, entries = seen.len(), size = bytes.len(), "built course archive");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{CourseDraft, Lesson, Moment};
    use crate::types::MomentType;
    use std::io::Read;
    use tempfile::TempDir;

    fn setup() -> (TempDir, CourseData) {
        let dir = TempDir::new().unwrap();
        let scorm = dir.path().join(paths::TEMPLATE_SCORM_DIR);
        std::fs::create_dir_all(scorm.join("lib")).unwrap();
        std::fs::write(scorm.join("lib/scorm-api.js"), "// api").unwrap();
        std::fs::write(scorm.join(paths::MANIFEST_FILE), "<stale/>").unwrap();
        std::fs::write(scorm.join("index.html"), "template launcher").unwrap();

        let base = dir.path().join(paths::TEMPLATE_BASE_DIR);
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(base.join("index.html"), "course launcher").unwrap();

        let draft = CourseDraft {
            name: "Riesgos & Prevención".to_string(),
            lessons: vec![
                Lesson {
                    id: 0,
                    name: "Uno".to_string(),
                    moments: vec![
                        Moment::new(MomentType::Slider, "A"),
                        Moment::new(MomentType::Quiz, "B"),
                    ],
                },
                Lesson {
                    id: 0,
                    name: "Dos".to_string(),
                    moments: vec![Moment::new(MomentType::Video, "C")],
                },
            ],
            ..CourseDraft::default()
        };
        let course = CourseData::create(dir.path(), draft).unwrap();
        (dir, course)
    }

    fn read_entry(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut s = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn archive_contains_manifest_course_and_runtime() {
        let (dir, course) = setup();
        let bytes = export_zip(dir.path(), &course.folder_name).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.by_index(0).unwrap().name(), "imsmanifest.xml");
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"module/leccion1/momento1_2/index.html".to_string()));
        assert!(names.contains(&"module/leccion2/momento2_1/slider.js".to_string()));
        assert!(names.contains(&"lib/scorm-api.js".to_string()));
        assert!(!names.contains(&"course-metadata.json".to_string()));

        // Course tree wins over the runtime template on path collisions.
        assert_eq!(read_entry(&mut archive, "index.html"), "course launcher");
        // The generated manifest replaces any template-provided one.
        let manifest = read_entry(&mut archive, "imsmanifest.xml");
        assert!(manifest.contains("<schemaversion>1.2</schemaversion>"));
        assert_eq!(names.iter().filter(|n| *n == "imsmanifest.xml").count(), 1);
    }

    #[test]
    fn manifest_lists_every_moment() {
        let (_dir, course) = setup();
        let xml = manifest_xml(&course);
        assert_eq!(xml.matches("adlcp:scormtype=\"sco\"").count(), 3);
        assert!(xml.contains(r#"href="module/leccion2/momento2_1/index.html""#));
        assert!(xml.contains("<title>Riesgos &amp; Prevención</title>"));
        assert!(xml.contains(r#"identifierref="RES-momento1_2""#));
    }

    #[test]
    fn export_missing_course_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            export_zip(dir.path(), "nada"),
            Err(CoursePressError::CourseNotFound(_))
        ));
    }

    #[test]
    fn archive_name_uses_folder() {
        let (_dir, course) = setup();
        assert_eq!(archive_name(&course), "riesgos-prevencion.zip");
    }
}
