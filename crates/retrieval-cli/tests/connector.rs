use std::fs;
use tempfile::tempdir;

#[path = "../src/connector.rs"]
mod connector;

#[test]
fn walks_nested_markdown_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("readme.md"), "hello world").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/notes.markdown"), "more content").unwrap();
    fs::write(dir.path().join("ignored.txt"), "skip me").unwrap();

    let documents = connector::load_documents(dir.path()).unwrap();
    assert_eq!(documents.len(), 2);
    assert!(documents.iter().any(|d| d.id == "readme.md"));
    assert!(documents
        .iter()
        .any(|d| d.id.replace('\\', "/") == "sub/notes.markdown"));
}

#[test]
fn empty_directory_yields_no_documents() {
    let dir = tempdir().unwrap();
    let documents = connector::load_documents(dir.path()).unwrap();
    assert!(documents.is_empty());
}
