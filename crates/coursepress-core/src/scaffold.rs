use crate::config::Config;
use crate::error::Result;
use crate::{io, paths, template};
use std::path::Path;

const BASE_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="utf-8">
  <title>Curso</title>
  <script src="scorm-api.js"></script>
</head>
<body>
  <iframe id="stage" src="module/leccion1/momento1_1/index.html" title="Curso"></iframe>
</body>
</html>
"#;

const SCORM_API_JS: &str = r#"// Locate the SCORM 1.2 API object exposed by the LMS and report completion.
(function (w) {
  function findAPI(win) {
    var tries = 0;
    while (!win.API && win.parent && win.parent !== win && tries < 10) {
      win = win.parent;
      tries++;
    }
    return win.API || null;
  }
  var api = findAPI(w) || (w.opener && findAPI(w.opener));
  w.CoursePress = {
    start: function () {
      if (api) api.LMSInitialize("");
    },
    complete: function () {
      if (!api) return;
      api.LMSSetValue("cmi.core.lesson_status", "completed");
      api.LMSCommit("");
    },
    finish: function () {
      if (api) api.LMSFinish("");
    }
  };
})(window);
"#;

/// Prepare a CoursePress workspace under `root`. Safe to run repeatedly:
/// existing config and template files are never overwritten.
///
/// Returns the workspace-relative paths that were created.
pub fn init(root: &Path, site_name: &str) -> Result<Vec<String>> {
    let mut created = Vec::new();

    for dir in [
        paths::COURSES_DIR,
        paths::AVATARS_DIR,
        paths::UPLOADED_AVATARS_DIR,
        paths::STATE_DIR,
        paths::TEMPLATE_BASE_DIR,
        paths::TEMPLATE_SCORM_DIR,
        paths::TEMPLATE_MOMENTS_DIR,
    ] {
        let p = root.join(dir);
        if !p.exists() {
            io::ensure_dir(&p)?;
            created.push(dir.to_string());
        }
    }

    if !paths::config_path(root).exists() {
        Config::new(site_name).save(root)?;
        created.push(paths::CONFIG_FILE.to_string());
    }

    let files = [
        (
            format!("{}/index.html", paths::TEMPLATE_BASE_DIR),
            BASE_INDEX_HTML,
        ),
        (
            format!("{}/scorm-api.js", paths::TEMPLATE_SCORM_DIR),
            SCORM_API_JS,
        ),
    ];
    for (rel, content) in files {
        if io::write_if_missing(&root.join(&rel), content.as_bytes())? {
            created.push(rel);
        }
    }

    created.extend(template::write_default_moment_templates(root)?);

    tracing::info!(root = %root.display(), created = created.len(), "initialized workspace");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_layout() {
        let dir = TempDir::new().unwrap();
        let created = init(dir.path(), "Academia").unwrap();
        assert!(created.contains(&"coursepress.yaml".to_string()));
        assert!(dir.path().join("cursos").is_dir());
        assert!(dir.path().join("uploads/avatars").is_dir());
        assert!(dir.path().join("template/base/index.html").exists());
        assert!(dir.path().join("template/scorm/scorm-api.js").exists());
        assert!(dir.path().join("template/moments/quiz/index.html").exists());
        assert_eq!(Config::load(dir.path()).unwrap().site.name, "Academia");
    }

    #[test]
    fn init_is_idempotent_and_preserves_edits() {
        let dir = TempDir::new().unwrap();
        init(dir.path(), "Academia").unwrap();
        let launcher = dir.path().join("template/base/index.html");
        std::fs::write(&launcher, "custom").unwrap();

        let created = init(dir.path(), "Otro").unwrap();
        assert!(created.is_empty());
        assert_eq!(std::fs::read_to_string(&launcher).unwrap(), "custom");
        assert_eq!(Config::load(dir.path()).unwrap().site.name, "Academia");
    }
}
