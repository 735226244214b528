use super::*;
use tempfile::TempDir;

fn touch(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

#[test]
fn test_missing_path_is_path_not_found() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("does-not-exist.mp3");

    let err = discover(&missing, false).unwrap_err();
    assert_eq!(err.kind(), "path-not-found");
}

#[test]
fn test_single_supported_file_yields_one_item() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("voice.mp3");
    touch(&file, b"abc");

    let items = discover(&file, false).unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].extension, "mp3");
    assert_eq!(items[0].size_bytes, 3);
    assert_eq!(items[0].file_name(), "voice.mp3");
    assert!(items[0].path.is_absolute());
}

#[test]
fn test_single_unsupported_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("notes.txt");
    touch(&file, b"text");

    let err = discover(&file, false).unwrap_err();
    assert_eq!(err.kind(), "unsupported-format");
    assert!(err.to_string().contains("mp3"));
}

#[test]
fn test_file_without_extension_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("recording");
    touch(&file, b"raw");

    assert!(discover(&file, false).is_err());
}

#[test]
fn test_extension_matching_is_case_insensitive() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("VOICE.MP3");
    touch(&file, b"abc");

    let items = discover(&file, false).unwrap();
    assert_eq!(items[0].extension, "mp3");
}

#[test]
fn test_directory_skips_unsupported_files() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("a.mp3"), b"a");
    touch(&temp.path().join("b.wav"), b"b");
    touch(&temp.path().join("readme.md"), b"m");
    touch(&temp.path().join("cover.jpg"), b"j");

    let mut items = discover(temp.path(), false).unwrap();
    items.sort_by(|a, b| a.path.cmp(&b.path));

    let names: Vec<String> = items.iter().map(MediaItem::file_name).collect();
    assert_eq!(names, vec!["a.mp3", "b.wav"]);
}

#[test]
fn test_non_recursive_excludes_nested_directories() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("top.mp3"), b"t");
    touch(&temp.path().join("nested/inner.mp3"), b"i");
    touch(&temp.path().join("nested/deeper/deep.wav"), b"d");

    let items = discover(temp.path(), false).unwrap();

    let names: Vec<String> = items.iter().map(MediaItem::file_name).collect();
    assert_eq!(names, vec!["top.mp3"]);
}

#[test]
fn test_recursive_includes_nested_directories() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("top.mp3"), b"t");
    touch(&temp.path().join("nested/inner.mp3"), b"i");
    touch(&temp.path().join("nested/deeper/deep.wav"), b"d");

    let items = discover(temp.path(), true).unwrap();

    let mut names: Vec<String> = items.iter().map(MediaItem::file_name).collect();
    names.sort();
    assert_eq!(names, vec!["deep.wav", "inner.mp3", "top.mp3"]);
}

#[test]
fn test_empty_directory_yields_no_items() {
    let temp = TempDir::new().unwrap();
    let items = discover(temp.path(), true).unwrap();
    assert!(items.is_empty());
}

#[test]
fn test_rescan_returns_same_items() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("a.mp3"), b"a");
    touch(&temp.path().join("b.flac"), b"bb");

    let mut first = discover(temp.path(), false).unwrap();
    let mut second = discover(temp.path(), false).unwrap();
    first.sort_by(|a, b| a.path.cmp(&b.path));
    second.sort_by(|a, b| a.path.cmp(&b.path));

    assert_eq!(first, second);
}

#[test]
fn test_is_supported() {
    assert!(is_supported(Path::new("/x/a.mp3")));
    assert!(is_supported(Path::new("/x/a.MKV")));
    assert!(!is_supported(Path::new("/x/a.txt")));
    assert!(!is_supported(Path::new("/x/noext")));
}
