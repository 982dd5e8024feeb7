use coursepress_core::catalog::CourseCatalog;
use coursepress_core::config::Config;
use coursepress_core::CoursePressError;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub catalog: Arc<CourseCatalog>,
}

impl AppState {
    /// Load the workspace config, open the course catalog, and bring the
    /// catalog in line with the course folders on disk.
    ///
    /// A workspace without `coursepress.yaml` runs on default settings.
    pub fn new(root: PathBuf) -> coursepress_core::Result<Self> {
        let config = match Config::load(&root) {
            Ok(cfg) => cfg,
            Err(CoursePressError::NotInitialized) => {
                tracing::warn!(root = %root.display(), "no coursepress.yaml found, using defaults");
                let name = root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "coursepress".to_string());
                Config::new(name)
            }
            Err(e) => return Err(e),
        };

        let catalog = CourseCatalog::open(&root)?;
        catalog.reindex(&root)?;

        Ok(Self {
            root,
            config: Arc::new(config),
            catalog: Arc::new(catalog),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursepress_core::course::{CourseData, CourseDraft};

    #[test]
    fn new_state_stores_root_and_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(state.root, dir.path());
        assert_eq!(state.config.server.port, 3141);
    }

    #[test]
    fn new_state_indexes_existing_courses() {
        let dir = tempfile::TempDir::new().unwrap();
        CourseData::create(dir.path(), CourseDraft::new("Vial")).unwrap();
        let state = AppState::new(dir.path().to_path_buf()).unwrap();
        assert!(state.catalog.get("vial").unwrap().is_some());
    }
}
