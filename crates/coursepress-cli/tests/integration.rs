#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn coursepress(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("coursepress").unwrap();
    cmd.current_dir(dir.path())
        .env("COURSEPRESS_ROOT", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn init_workspace(dir: &TempDir) {
    coursepress(dir)
        .args(["init", "--name", "Academia"])
        .assert()
        .success();
}

fn json_of(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

// ---------------------------------------------------------------------------
// coursepress init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_workspace_layout() {
    let dir = TempDir::new().unwrap();
    coursepress(&dir)
        .args(["init", "--name", "Academia"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created: coursepress.yaml"));

    assert!(dir.path().join("coursepress.yaml").exists());
    assert!(dir.path().join("cursos").is_dir());
    assert!(dir.path().join("template/base/index.html").exists());
    assert!(dir.path().join("template/scorm/scorm-api.js").exists());
    assert!(dir.path().join("template/moments/slider/index.html").exists());

    let config = std::fs::read_to_string(dir.path().join("coursepress.yaml")).unwrap();
    assert!(config.contains("Academia"));
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    coursepress(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already set up"));
}

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    coursepress(&dir)
        .args(["course", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("coursepress init"));
}

// ---------------------------------------------------------------------------
// coursepress course
// ---------------------------------------------------------------------------

#[test]
fn course_create_renders_tree() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);

    coursepress(&dir)
        .args([
            "course",
            "create",
            "Primeros Auxilios",
            "--category",
            "salud",
            "--lessons",
            "2",
            "--moments",
            "2",
            "--type",
            "quiz",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created course: primeros-auxilios"));

    let course = dir.path().join("cursos/primeros-auxilios");
    assert!(course.join("course-metadata.json").exists());
    assert!(course.join("index.html").exists());
    assert!(course.join("module/leccion2/momento2_2/index.html").exists());
    assert!(course.join("module/leccion2/momento2_2/slider.js").exists());
}

#[test]
fn course_create_twice_gets_suffixed_id() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    coursepress(&dir)
        .args(["course", "create", "Vial"])
        .assert()
        .success();

    let json = json_of(coursepress(&dir).args(["--json", "course", "create", "Vial"]));
    assert_eq!(json["folderName"], "vial-2");
}

#[test]
fn course_create_rejects_unknown_type() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    coursepress(&dir)
        .args(["course", "create", "Vial", "--type", "carousel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid moment type"));
}

#[test]
fn course_list_and_show() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    coursepress(&dir)
        .args(["course", "create", "Seguridad Vial", "--lessons", "3"])
        .assert()
        .success();

    coursepress(&dir)
        .args(["course", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("seguridad-vial"))
        .stdout(predicate::str::contains("Seguridad Vial"));

    let json = json_of(coursepress(&dir).args(["course", "list", "--json"]));
    assert_eq!(json[0]["lessonCount"], 3);

    coursepress(&dir)
        .args(["course", "show", "seguridad-vial"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lección 3"))
        .stdout(predicate::str::contains("momento3_1"));
}

#[test]
fn course_show_missing_fails() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    coursepress(&dir)
        .args(["course", "show", "nada"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("course not found"));
}

#[test]
fn course_delete_removes_folder_and_row() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    coursepress(&dir)
        .args(["course", "create", "Vial"])
        .assert()
        .success();

    coursepress(&dir)
        .args(["course", "delete", "vial"])
        .assert()
        .success();
    assert!(!dir.path().join("cursos/vial").exists());

    coursepress(&dir)
        .args(["course", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No courses yet."));
}

#[test]
fn course_reindex_picks_up_copied_folders() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    coursepress(&dir)
        .args(["course", "create", "Vial"])
        .assert()
        .success();
    std::fs::remove_file(dir.path().join(".coursepress/catalog.redb")).unwrap();

    let json = json_of(coursepress(&dir).args(["--json", "course", "reindex"]));
    assert_eq!(json["indexed"], 1);

    let json = json_of(coursepress(&dir).args(["--json", "course", "list"]));
    assert_eq!(json[0]["id"], "vial");
}

// ---------------------------------------------------------------------------
// coursepress export
// ---------------------------------------------------------------------------

#[test]
fn export_writes_scorm_zip() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    coursepress(&dir)
        .args(["course", "create", "Vial", "--moments", "2"])
        .assert()
        .success();

    let out = dir.path().join("dist/vial.zip");
    coursepress(&dir)
        .args(["export", "vial", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported vial"));

    let file = std::fs::File::open(&out).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert!(archive.by_name("imsmanifest.xml").is_ok());
    assert!(archive.by_name("module/leccion1/momento1_2/index.html").is_ok());
    assert!(archive.by_name("course-metadata.json").is_err());
}

#[test]
fn export_requires_init() {
    let dir = TempDir::new().unwrap();
    coursepress(&dir)
        .args(["export", "vial"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("coursepress init"));
}

#[test]
fn export_missing_course_fails() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    coursepress(&dir)
        .args(["export", "nada"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// coursepress avatar
// ---------------------------------------------------------------------------

#[test]
fn avatar_add_list_remove() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    let img = dir.path().join("Profesora.PNG");
    std::fs::write(&img, b"\x89PNG").unwrap();

    coursepress(&dir)
        .args(["avatar", "add"])
        .arg(&img)
        .assert()
        .success()
        .stdout(predicate::str::contains("profesora.png"));
    assert!(dir.path().join("uploads/avatars/profesora.png").exists());

    let json = json_of(coursepress(&dir).args(["--json", "avatar", "list"]));
    assert_eq!(json[0]["source"], "uploaded");

    coursepress(&dir)
        .args(["avatar", "remove", "profesora.png"])
        .assert()
        .success();
    assert!(!dir.path().join("uploads/avatars/profesora.png").exists());
}

#[test]
fn avatar_add_rejects_non_image() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    let doc = dir.path().join("notas.txt");
    std::fs::write(&doc, "hola").unwrap();

    coursepress(&dir)
        .args(["avatar", "add"])
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported avatar type"));
}
