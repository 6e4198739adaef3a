//! Export-shaped archives survive a zip/unzip cycle with their layout intact.

use std::fs;

use lab_assets::naming::definition_file_name;
use lab_assets::{Archiver, AssetStore, LocalAssetStore, ZipArchiver, find_files};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

fn staged_study(tmp: &TempDir) -> (LocalAssetStore, std::path::PathBuf, std::path::PathBuf) {
    let store = LocalAssetStore::new(tmp.path().join("studies")).unwrap();
    let dir = store.create_dir("stu-0000abcd").unwrap();
    fs::write(dir.join("intro.html"), "<p>welcome</p>").unwrap();
    fs::create_dir(dir.join("media")).unwrap();
    fs::write(dir.join("media").join("beep.wav"), [0u8, 1, 2, 3, 4]).unwrap();
    fs::create_dir(dir.join("empty")).unwrap();

    let definition = tmp.path().join(definition_file_name("Stroop Task"));
    fs::write(&definition, br#"{"version":1,"title":"Stroop Task"}"#).unwrap();
    (store, dir, definition)
}

#[test]
fn zip_then_unzip_restores_layout() {
    let tmp = TempDir::new().unwrap();
    let (_store, dir, definition) = staged_study(&tmp);

    let bytes = ZipArchiver.zip(&dir, &definition).unwrap();
    let extracted = ZipArchiver.unzip(&bytes).unwrap();
    let root = extracted.path();

    let studies = find_files(root, "", ".study").unwrap();
    assert_eq!(studies.len(), 1);
    assert_eq!(
        studies[0].file_name().unwrap().to_string_lossy(),
        "Stroop_Task.study"
    );

    let dirs = find_files(root, "study_", "").unwrap();
    assert_eq!(dirs.len(), 1);
    let study_dir = &dirs[0];
    assert_eq!(
        fs::read_to_string(study_dir.join("intro.html")).unwrap(),
        "<p>welcome</p>"
    );
    assert_eq!(
        fs::read(study_dir.join("media").join("beep.wav")).unwrap(),
        vec![0u8, 1, 2, 3, 4]
    );
    assert!(study_dir.join("empty").is_dir());
}

#[test]
fn empty_study_dir_still_round_trips() {
    let tmp = TempDir::new().unwrap();
    let store = LocalAssetStore::new(tmp.path().join("studies")).unwrap();
    let dir = store.create_dir("stu-empty").unwrap();
    let definition = tmp.path().join("x.study");
    fs::write(&definition, "{}").unwrap();

    let bytes = ZipArchiver.zip(&dir, &definition).unwrap();
    let extracted = ZipArchiver.unzip(&bytes).unwrap();
    assert!(extracted.path().join("study_stu-empty").is_dir());
}

#[test]
fn extracted_dir_moves_into_store() {
    let tmp = TempDir::new().unwrap();
    let (store, dir, definition) = staged_study(&tmp);
    let bytes = ZipArchiver.zip(&dir, &definition).unwrap();
    let extracted = ZipArchiver.unzip(&bytes).unwrap();

    let src = find_files(extracted.path(), "study_", "").unwrap().remove(0);
    let moved = store.move_dir(&src, "stu-0000beef").unwrap();
    assert!(moved.join("intro.html").exists());
    assert!(!src.exists());
}

#[rstest]
#[case::missing_dir("does-not-exist", "x.study")]
#[case::missing_definition("studies", "nope.study")]
fn zip_with_missing_input_fails(#[case] dir: &str, #[case] extra: &str) {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("studies")).unwrap();
    fs::write(tmp.path().join("x.study"), "{}").unwrap();
    let result = ZipArchiver.zip(&tmp.path().join(dir), &tmp.path().join(extra));
    assert!(result.is_err());
}
