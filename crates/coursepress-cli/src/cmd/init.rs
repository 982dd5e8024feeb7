use anyhow::Context;
use coursepress_core::{config::Config, paths, scaffold};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let site_name = name.map(str::to_string).unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "coursepress".to_string())
    });

    let created = scaffold::init(root, &site_name)
        .with_context(|| format!("failed to initialize {}", root.display()))?;

    if json {
        return crate::output::print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "created": created,
        }));
    }

    println!("Initializing CoursePress in: {}", root.display());
    if created.is_empty() {
        println!("  nothing to do, workspace already set up");
    }
    for path in &created {
        println!("  created: {path}");
    }

    let config = Config::load(root).context("failed to read coursepress.yaml")?;
    for w in config.validate() {
        println!("  warning: {}", w.message);
    }
    println!("\nNext: coursepress course create \"<name>\"");
    println!("Config: {}", paths::CONFIG_FILE);
    Ok(())
}
