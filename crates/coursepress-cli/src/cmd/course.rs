use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use coursepress_core::{
    catalog::CourseCatalog,
    config::Config,
    course::{CourseData, CourseDraft, Lesson, Moment},
    types::MomentType,
};
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum CourseSubcommand {
    /// Create a course and render its folder tree
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Number of lessons to generate
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=99))]
        lessons: u32,
        /// Moments per lesson
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=99))]
        moments: u32,
        /// Moment type: slider, video, interactive or quiz
        #[arg(long = "type", default_value = "slider")]
        moment_type: String,
    },
    /// List courses from the catalog
    List,
    /// Show a course with its lessons and moments
    Show { id: String },
    /// Delete a course folder
    Delete { id: String },
    /// Rebuild the catalog from the course folders on disk
    Reindex,
}

pub fn run(root: &Path, subcmd: CourseSubcommand, json: bool) -> anyhow::Result<()> {
    Config::load(root)?;
    match subcmd {
        CourseSubcommand::Create {
            name,
            description,
            category,
            lessons,
            moments,
            moment_type,
        } => {
            let moment_type = MomentType::from_str(&moment_type)?;
            let mut draft = CourseDraft::new(name);
            draft.description = description.unwrap_or_default();
            draft.category = category.unwrap_or_default();
            draft.lessons = outline(lessons, moments, moment_type);
            create(root, draft, json)
        }
        CourseSubcommand::List => list(root, json),
        CourseSubcommand::Show { id } => show(root, &id, json),
        CourseSubcommand::Delete { id } => delete(root, &id, json),
        CourseSubcommand::Reindex => reindex(root, json),
    }
}

/// `lessons` lessons of `moments` moments each, all of one type.
fn outline(lessons: u32, moments: u32, moment_type: MomentType) -> Vec<Lesson> {
    (1..=lessons)
        .map(|l| Lesson {
            id: l,
            name: format!("Lección {l}"),
            moments: (1..=moments)
                .map(|m| Moment::new(moment_type, format!("Momento {m}")))
                .collect(),
        })
        .collect()
}

/// Apply `f` to the catalog. A catalog held open by a running server is
/// only a warning: the server reindexes on its next start.
fn sync_catalog(root: &Path, f: impl FnOnce(&CourseCatalog) -> coursepress_core::Result<()>) {
    let result = CourseCatalog::open(root).and_then(|catalog| f(&catalog));
    if let Err(e) = result {
        tracing::warn!(error = %e, "catalog not updated");
    }
}

fn create(root: &Path, draft: CourseDraft, json: bool) -> anyhow::Result<()> {
    let name = draft.name.clone();
    let course = CourseData::create(root, draft)
        .with_context(|| format!("failed to create course '{name}'"))?;
    sync_catalog(root, |catalog| catalog.upsert(&course.summary()));

    if json {
        print_json(&course)?;
    } else {
        println!("Created course: {} ({})", course.id(), course.name);
        println!(
            "  {} lessons, {} moments under cursos/{}/",
            course.lessons.len(),
            course.moment_count(),
            course.id()
        );
        println!("Next: coursepress export {}", course.id());
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let catalog = CourseCatalog::open(root).context("failed to open catalog")?;
    let records = catalog.list().context("failed to list courses")?;

    if json {
        print_json(&records)?;
        return Ok(());
    }

    if records.is_empty() {
        println!("No courses yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.lesson_count.to_string(),
                r.moment_count.to_string(),
                r.category.clone(),
                r.name.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "LESSONS", "MOMENTS", "CATEGORY", "NAME"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let course = CourseData::load(root, id)?;

    if json {
        print_json(&course)?;
        return Ok(());
    }

    println!("Course:   {} ({})", course.name, course.id());
    if !course.description.is_empty() {
        println!("Desc:     {}", course.description);
    }
    if !course.category.is_empty() {
        println!("Category: {}", course.category);
    }
    println!("Created:  {}", course.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated:  {}", course.updated_at.format("%Y-%m-%d %H:%M"));

    for lesson in &course.lessons {
        println!("\n{}. {}", lesson.id, lesson.name);
        for moment in &lesson.moments {
            println!("  [{}] {:<12} {}", moment.id, moment.moment_type.as_str(), moment.name);
        }
    }

    if !course.objectives.is_empty() {
        println!("\nObjectives:");
        for o in &course.objectives {
            println!("  - {o}");
        }
    }
    if !course.glossary.is_empty() {
        println!("\nGlossary:");
        for g in &course.glossary {
            println!("  {}: {}", g.term, g.definition);
        }
    }
    Ok(())
}

fn delete(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    CourseData::delete(root, id)?;
    sync_catalog(root, |catalog| catalog.remove(id).map(|_| ()));

    if json {
        print_json(&serde_json::json!({ "id": id, "deleted": true }))?;
    } else {
        println!("Deleted course: {id}");
    }
    Ok(())
}

fn reindex(root: &Path, json: bool) -> anyhow::Result<()> {
    let catalog = CourseCatalog::open(root).context("failed to open catalog")?;
    let count = catalog.reindex(root)?;

    if json {
        print_json(&serde_json::json!({ "indexed": count }))?;
    } else {
        println!("Indexed {count} course(s).");
    }
    Ok(())
}
