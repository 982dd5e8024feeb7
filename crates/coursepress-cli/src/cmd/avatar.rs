use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use coursepress_core::{avatar, config::Config};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum AvatarSubcommand {
    /// List built-in and uploaded avatars
    List,
    /// Copy an image into the uploaded avatars
    Add { path: PathBuf },
    /// Remove an uploaded avatar
    Remove { name: String },
}

pub fn run(root: &Path, subcmd: AvatarSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    match subcmd {
        AvatarSubcommand::List => list(root, json),
        AvatarSubcommand::Add { path } => add(root, &config, &path, json),
        AvatarSubcommand::Remove { name } => remove(root, &name, json),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let avatars = avatar::list_avatars(root)?;

    if json {
        print_json(&avatars)?;
        return Ok(());
    }

    if avatars.is_empty() {
        println!("No avatars.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = avatars
        .iter()
        .map(|a| vec![a.name.clone(), a.source.to_string(), a.url.clone()])
        .collect();
    print_table(&["NAME", "SOURCE", "URL"], rows);
    Ok(())
}

fn add(root: &Path, config: &Config, path: &Path, json: bool) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let saved = avatar::save_avatar(root, &filename, &bytes, config.uploads.max_avatar_bytes)?;

    if json {
        print_json(&saved)?;
    } else {
        println!("Added avatar: {} ({})", saved.name, saved.url);
    }
    Ok(())
}

fn remove(root: &Path, name: &str, json: bool) -> anyhow::Result<()> {
    avatar::delete_avatar(root, name)?;

    if json {
        print_json(&serde_json::json!({ "name": name, "deleted": true }))?;
    } else {
        println!("Removed avatar: {name}");
    }
    Ok(())
}
