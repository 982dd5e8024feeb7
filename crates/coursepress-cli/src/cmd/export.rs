use anyhow::Context;
use coursepress_core::{config::Config, course::CourseData, io, package};
use std::path::{Path, PathBuf};

pub fn run(root: &Path, id: &str, out: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    Config::load(root)?;
    let course = CourseData::load(root, id)?;
    let bytes = package::export_zip(root, id)
        .with_context(|| format!("failed to package course '{id}'"))?;

    let out = out.unwrap_or_else(|| PathBuf::from(package::archive_name(&course)));
    io::atomic_write(&out, &bytes).with_context(|| format!("failed to write {}", out.display()))?;

    if json {
        crate::output::print_json(&serde_json::json!({
            "id": id,
            "path": out.display().to_string(),
            "bytes": bytes.len(),
        }))?;
    } else {
        println!("Exported {id} → {} ({} bytes)", out.display(), bytes.len());
    }
    Ok(())
}
