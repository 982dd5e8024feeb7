//! Base-template stamping and per-moment file rendering.
//!
//! A workspace carries three template trees:
//!
//! ```text
//! template/base/              copied into every course folder
//! template/scorm/             added to the ZIP at export time only
//! template/moments/<type>/    index.html, slider.css, slider.js per moment type
//! ```
//!
//! Moment templates fall back to built-in defaults when the workspace does
//! not provide them.

use crate::error::Result;
use crate::io;
use crate::paths;
use crate::types::{MomentFile, MomentType};
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Built-in moment templates
// ---------------------------------------------------------------------------

const MOMENT_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="utf-8">
  <title>{{moment_name}} | {{course_name}}</title>
  <link rel="stylesheet" href="slider.css">
</head>
<body class="moment moment-{{moment_type}}" data-moment="{{moment_id}}">
  <header>
    <p class="lesson">{{lesson_name}}</p>
    <h1>{{moment_name}}</h1>
  </header>
  <main>
    {{body}}
  </main>
  <script src="slider.js"></script>
</body>
</html>
"#;

const SLIDER_BODY: &str = r#"<section class="slides">
      <figure class="slide active"><img src="{{image}}" alt=""><figcaption>{{content}}</figcaption></figure>
    </section>
    <nav><button class="prev">&larr;</button><button class="next">&rarr;</button></nav>"#;

const VIDEO_BODY: &str = r#"<video class="player" controls src="{{content}}" poster="{{image}}"></video>"#;

const INTERACTIVE_BODY: &str = r#"<section class="activity">
      <p>{{content}}</p>
      <div class="dropzone"></div>
    </section>"#;

const QUIZ_BODY: &str = r#"<form class="quiz">
      <p class="question">{{content}}</p>
      <button type="submit">Comprobar</button>
    </form>"#;

const MOMENT_CSS: &str = r#"body.moment {
  font-family: system-ui, sans-serif;
  margin: 0;
  padding: 1.5rem;
}
.moment header h1 {
  margin: 0 0 1rem;
}
"#;

const MOMENT_JS: &str = r#"(function () {
  var id = document.body.getAttribute("data-moment");
  try {
    localStorage.setItem("coursepress:visited:" + id, "1");
  } catch (e) {}
})();
"#;

/// Default `{html, css, js}` for a moment type.
fn builtin(moment_type: MomentType) -> MomentTemplate {
    let body = match moment_type {
        MomentType::Slider => SLIDER_BODY,
        MomentType::Video => VIDEO_BODY,
        MomentType::Interactive => INTERACTIVE_BODY,
        MomentType::Quiz => QUIZ_BODY,
    };
    MomentTemplate {
        html: MOMENT_HTML.replace("{{body}}", body),
        css: MOMENT_CSS.to_string(),
        js: MOMENT_JS.to_string(),
    }
}

// ---------------------------------------------------------------------------
// MomentTemplate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MomentTemplate {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl MomentTemplate {
    /// Load the workspace template for `moment_type`, file by file, falling
    /// back to the built-in default for any file the workspace lacks.
    pub fn load(root: &Path, moment_type: MomentType) -> Result<Self> {
        let dir = paths::template_moment_dir(root, moment_type.as_str());
        let mut tpl = builtin(moment_type);
        for &file in MomentFile::all() {
            let path = dir.join(file.filename());
            if path.is_file() {
                *tpl.slot_mut(file) = std::fs::read_to_string(&path)?;
            }
        }
        Ok(tpl)
    }

    pub fn get(&self, file: MomentFile) -> &str {
        match file {
            MomentFile::Html => &self.html,
            MomentFile::Css => &self.css,
            MomentFile::Js => &self.js,
        }
    }

    fn slot_mut(&mut self, file: MomentFile) -> &mut String {
        match file {
            MomentFile::Html => &mut self.html,
            MomentFile::Css => &mut self.css,
            MomentFile::Js => &mut self.js,
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Substitute `{{key}}` placeholders with HTML-escaped values.
/// Placeholders with no matching key are left as written.
/// Substitution is a single pass over `text`, so placeholders that appear
/// inside values are emitted literally.
pub fn render(text: &str, vars: &[(&str, &str)]) -> String {
    placeholder_re()
        .replace_all(text, |caps: &Captures| {
            let key = &caps[1];
            match vars.iter().find(|(k, _)| *k == key) {
                Some((_, value)) => escape_html(value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").unwrap())
}

// ---------------------------------------------------------------------------
// Stamping
// ---------------------------------------------------------------------------

/// Copy `template/base/**` into `dest`. Returns the number of files copied.
pub fn stamp_base(root: &Path, dest: &Path) -> Result<usize> {
    let copied = io::copy_dir_all(&root.join(paths::TEMPLATE_BASE_DIR), dest)?;
    tracing::debug!(dest = %dest.display(), copied, "stamped base template");
    Ok(copied)
}

/// Write the built-in moment templates into `template/moments/` without
/// touching files the user already customised. Returns the paths written.
pub fn write_default_moment_templates(root: &Path) -> Result<Vec<String>> {
    let mut written = Vec::new();
    for &t in MomentType::all() {
        let tpl = builtin(t);
        let dir = paths::template_moment_dir(root, t.as_str());
        for &file in MomentFile::all() {
            let path = dir.join(file.filename());
            if io::write_if_missing(&path, tpl.get(file).as_bytes())? {
                written.push(format!(
                    "{}/{}/{}",
                    paths::TEMPLATE_MOMENTS_DIR,
                    t.as_str(),
                    file.filename()
                ));
            }
        }
    }
    Ok(written)
}
