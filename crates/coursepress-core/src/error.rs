use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoursePressError {
    #[error("not initialized: run 'coursepress init'")]
    NotInitialized,

    #[error("course not found: {0}")]
    CourseNotFound(String),

    #[error("course already exists: {0}")]
    CourseExists(String),

    #[error("lesson {lesson} not found in course '{course}'")]
    LessonNotFound { course: String, lesson: u32 },

    #[error("moment {lesson}_{moment} not found in course '{course}'")]
    MomentNotFound {
        course: String,
        lesson: u32,
        moment: u32,
    },

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid moment type '{0}': expected slider, video, interactive or quiz")]
    InvalidMomentType(String),

    #[error("invalid moment file '{0}': expected html, css or js")]
    InvalidMomentFile(String),

    #[error("invalid course: {0}")]
    InvalidCourse(String),

    #[error("avatar not found: {0}")]
    AvatarNotFound(String),

    #[error("unsupported avatar type '{0}': only images are accepted")]
    UnsupportedAvatarType(String),

    #[error("avatar is {size} bytes, limit is {limit}")]
    AvatarTooLarge { size: usize, limit: usize },

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoursePressError>;
