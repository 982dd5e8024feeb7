use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// MomentType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum MomentType {
    Slider,
    Video,
    Interactive,
    Quiz,
}

impl MomentType {
    pub fn all() -> &'static [MomentType] {
        &[
            MomentType::Slider,
            MomentType::Video,
            MomentType::Interactive,
            MomentType::Quiz,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MomentType::Slider => "slider",
            MomentType::Video => "video",
            MomentType::Interactive => "interactive",
            MomentType::Quiz => "quiz",
        }
    }
}

impl fmt::Display for MomentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MomentType {
    type Err = crate::error::CoursePressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slider" => Ok(MomentType::Slider),
            "video" => Ok(MomentType::Video),
            "interactive" => Ok(MomentType::Interactive),
            "quiz" => Ok(MomentType::Quiz),
            _ => Err(crate::error::CoursePressError::InvalidMomentType(
                s.to_string(),
            )),
        }
    }
}

impl TryFrom<String> for MomentType {
    type Error = crate::error::CoursePressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// MomentFile
// ---------------------------------------------------------------------------

/// One of the three files every moment directory holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentFile {
    Html,
    Css,
    Js,
}

impl MomentFile {
    pub fn all() -> &'static [MomentFile] {
        &[MomentFile::Html, MomentFile::Css, MomentFile::Js]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MomentFile::Html => "html",
            MomentFile::Css => "css",
            MomentFile::Js => "js",
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            MomentFile::Html => "index.html",
            MomentFile::Css => "slider.css",
            MomentFile::Js => "slider.js",
        }
    }
}

impl fmt::Display for MomentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MomentFile {
    type Err = crate::error::CoursePressError;

    /// Accepts either the short name (`html`) or the file name (`index.html`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" | "index.html" => Ok(MomentFile::Html),
            "css" | "slider.css" => Ok(MomentFile::Css),
            "js" | "slider.js" => Ok(MomentFile::Js),
            _ => Err(crate::error::CoursePressError::InvalidMomentFile(
                s.to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// AvatarSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarSource {
    Builtin,
    Uploaded,
}

impl AvatarSource {
    pub fn as_str(self) -> &'static str {
        match self {
            AvatarSource::Builtin => "builtin",
            AvatarSource::Uploaded => "uploaded",
        }
    }

    pub fn dir(self) -> &'static str {
        match self {
            AvatarSource::Builtin => crate::paths::AVATARS_DIR,
            AvatarSource::Uploaded => crate::paths::UPLOADED_AVATARS_DIR,
        }
    }
}

impl fmt::Display for AvatarSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
