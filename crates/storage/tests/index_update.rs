#![forbid(unsafe_code)]

use mb_core::{Document, DocumentInit, DocumentPath, DocumentType, Scope, Tag};
use mb_storage::{
    DocumentRepository, DocumentSelector, FileStorage, LocalFileStorage, StoreError, update_index,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("mb_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn open_repo(root: &PathBuf) -> DocumentRepository {
    let files: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new());
    DocumentRepository::open(files, root).expect("open repository")
}

fn doc(path: &str, tags: &[&str], content: serde_json::Value) -> Document {
    Document::create(DocumentInit {
        id: None,
        path: DocumentPath::try_new(path).expect("valid path"),
        title: path.to_string(),
        doc_type: DocumentType::Generic,
        tags: tags
            .iter()
            .map(|t| Tag::try_new(*t).expect("valid tag"))
            .collect(),
        content,
    })
    .expect("valid document")
}

#[test]
fn full_rebuild_reports_the_tag_vocabulary() {
    let root = temp_dir("full_rebuild_reports_the_tag_vocabulary");
    let mut repo = open_repo(&root);
    let scope = Scope::Global;

    repo.save(&scope, &doc("a.json", &["x", "y"], json!({"n": 1})))
        .expect("save a");
    repo.save(&scope, &doc("b.json", &["y", "z"], json!({"n": 2})))
        .expect("save b");

    let outcome = update_index(&mut repo, &scope, true).expect("update index");
    assert_eq!(outcome.scope, "global");
    assert!(outcome.full_rebuild);
    assert_eq!(outcome.document_count, 2);
    let tags: Vec<&str> = outcome.tags.iter().map(Tag::as_str).collect();
    assert_eq!(tags, vec!["x", "y", "z"]);
    assert!(!outcome.updated_at.is_empty());
}

#[test]
fn unknown_branch_fails_before_any_indexing() {
    let root = temp_dir("unknown_branch_fails_before_any_indexing");
    let mut repo = open_repo(&root);
    let scope = Scope::branch("feature/never-created").expect("valid branch");

    let err = update_index(&mut repo, &scope, true).expect_err("unknown branch");
    assert!(matches!(err, StoreError::UnknownBranch));
    // No index record was written for the missing branch.
    assert!(!root.join("indexes").join("feature-never-created.json").exists());
}

#[test]
fn branch_scope_updates_once_the_branch_exists() {
    let root = temp_dir("branch_scope_updates_once_the_branch_exists");
    let mut repo = open_repo(&root);
    let scope = Scope::branch("feature/login").expect("valid branch");

    repo.save(&scope, &doc("ctx.json", &["auth"], json!({"n": 1})))
        .expect("save branch doc");

    let outcome = update_index(&mut repo, &scope, false).expect("update index");
    assert_eq!(outcome.scope, "feature/login");
    assert!(!outcome.full_rebuild);
    assert_eq!(outcome.document_count, 1);
    let tags: Vec<&str> = outcome.tags.iter().map(Tag::as_str).collect();
    assert_eq!(tags, vec!["auth"]);
}

#[test]
fn incremental_update_leaves_orphans_and_rebuild_prunes_them() {
    let root = temp_dir("incremental_update_leaves_orphans_and_rebuild_prunes_them");
    let mut repo = open_repo(&root);
    let scope = Scope::Global;

    repo.save(&scope, &doc("kept.json", &["keep"], json!({"n": 1})))
        .expect("save kept");
    repo.save(&scope, &doc("gone.json", &["drop"], json!({"n": 2})))
        .expect("save gone");

    // Remove the file without touching the index: the entry is now orphaned.
    std::fs::remove_file(root.join("global").join("gone.json")).expect("remove file");

    let incremental = update_index(&mut repo, &scope, false).expect("incremental update");
    assert_eq!(incremental.document_count, 1);
    // The vanished document's tag is still in the vocabulary: incremental
    // updates do not prune.
    let tags: Vec<&str> = incremental.tags.iter().map(Tag::as_str).collect();
    assert_eq!(tags, vec!["drop", "keep"]);

    let rebuilt = update_index(&mut repo, &scope, true).expect("full rebuild");
    assert_eq!(rebuilt.document_count, 1);
    let tags: Vec<&str> = rebuilt.tags.iter().map(Tag::as_str).collect();
    assert_eq!(tags, vec!["keep"]);
}

#[test]
fn update_after_delete_keeps_index_and_scan_in_agreement() {
    let root = temp_dir("update_after_delete_keeps_index_and_scan_in_agreement");
    let mut repo = open_repo(&root);
    let scope = Scope::Global;

    let target = doc("a.json", &["x"], json!({"n": 1}));
    repo.save(&scope, &target).expect("save document");
    repo.save(&scope, &doc("b.json", &["y"], json!({"n": 2})))
        .expect("save document");
    assert!(repo
        .delete(&scope, &DocumentSelector::for_document(&target))
        .expect("delete"));

    let outcome = update_index(&mut repo, &scope, false).expect("update index");
    assert_eq!(outcome.document_count, 1);
    let tags: Vec<&str> = outcome.tags.iter().map(Tag::as_str).collect();
    assert_eq!(tags, vec!["y"]);
}
