#![forbid(unsafe_code)]

use mb_core::{Document, DocumentInit, DocumentPath, DocumentType, Scope, Tag};
use mb_storage::{DocumentRepository, DocumentSelector, FileStorage, LocalFileStorage};
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
        title: "Test".to_string(),
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
fn save_then_find_by_path_round_trips() {
    let root = temp_dir("save_then_find_by_path_round_trips");
    let mut repo = open_repo(&root);
    let scope = Scope::Global;

    let created = doc("notes/a.json", &["x", "y"], json!({"msg": "hi"}));
    repo.save(&scope, &created).expect("save document");

    let path = DocumentPath::try_new("notes/a.json").expect("valid path");
    let found = repo
        .find_by_path(&scope, &path)
        .expect("find by path")
        .expect("document present");
    assert_eq!(found.version(), 1);
    let tags: Vec<&str> = found.tags().iter().map(Tag::as_str).collect();
    assert_eq!(tags, vec!["x", "y"]);
    assert_eq!(found.content(), &json!({"msg": "hi"}));

    // Content-only update keeps the tag set and bumps the version.
    let updated = found
        .with_content(json!({"msg": "bye"}))
        .expect("valid content");
    repo.save(&scope, &updated).expect("save update");
    let reloaded = repo
        .find_by_path(&scope, &path)
        .expect("find by path")
        .expect("document present");
    assert_eq!(reloaded.version(), 2);
    let tags: Vec<&str> = reloaded.tags().iter().map(Tag::as_str).collect();
    assert_eq!(tags, vec!["x", "y"]);
}

#[test]
fn find_by_path_returns_none_for_absent_document() {
    let root = temp_dir("find_by_path_returns_none_for_absent_document");
    let mut repo = open_repo(&root);
    let path = DocumentPath::try_new("missing.json").expect("valid path");
    assert!(repo
        .find_by_path(&Scope::Global, &path)
        .expect("find by path")
        .is_none());
}

#[test]
fn exists_reflects_saved_documents() {
    let root = temp_dir("exists_reflects_saved_documents");
    let mut repo = open_repo(&root);
    let scope = Scope::Global;
    let path = DocumentPath::try_new("a.json").expect("valid path");

    assert!(!repo.exists(&scope, &path).expect("exists"));
    repo.save(&scope, &doc("a.json", &[], json!({"msg": "hi"})))
        .expect("save document");
    assert!(repo.exists(&scope, &path).expect("exists"));
}

#[test]
fn branch_scopes_are_isolated() {
    let root = temp_dir("branch_scopes_are_isolated");
    let mut repo = open_repo(&root);
    let global = Scope::Global;
    let branch = Scope::branch("feature/login").expect("valid branch");

    repo.save(&global, &doc("shared.json", &["g"], json!({"where": "global"})))
        .expect("save global");
    repo.save(&branch, &doc("shared.json", &["b"], json!({"where": "branch"})))
        .expect("save branch");

    let path = DocumentPath::try_new("shared.json").expect("valid path");
    let from_global = repo
        .find_by_path(&global, &path)
        .expect("find global")
        .expect("present");
    let from_branch = repo
        .find_by_path(&branch, &path)
        .expect("find branch")
        .expect("present");
    assert_eq!(from_global.content(), &json!({"where": "global"}));
    assert_eq!(from_branch.content(), &json!({"where": "branch"}));
}

#[test]
fn find_by_id_scans_global_then_branches() {
    let root = temp_dir("find_by_id_scans_global_then_branches");
    let mut repo = open_repo(&root);
    let branch = Scope::branch("fix/crash").expect("valid branch");

    let branch_doc = doc("only/in/branch.json", &["t"], json!({"msg": "hi"}));
    repo.save(&branch, &branch_doc).expect("save branch doc");

    let (scope, found) = repo
        .find_by_id(branch_doc.id())
        .expect("find by id")
        .expect("document present");
    assert_eq!(scope, branch);
    assert_eq!(found.path().as_str(), "only/in/branch.json");

    let absent = mb_core::DocumentId::generate();
    assert!(repo.find_by_id(&absent).expect("find by id").is_none());
}

#[test]
fn delete_by_each_selector_kind() {
    let root = temp_dir("delete_by_each_selector_kind");
    let mut repo = open_repo(&root);
    let scope = Scope::Global;

    let by_path = doc("a.json", &["x"], json!({"n": 1}));
    let by_id = doc("b.json", &["x"], json!({"n": 2}));
    let by_value = doc("c.json", &["x"], json!({"n": 3}));
    for d in [&by_path, &by_id, &by_value] {
        repo.save(&scope, d).expect("save document");
    }

    assert!(repo
        .delete(
            &scope,
            &DocumentSelector::ByPath(by_path.path().clone())
        )
        .expect("delete by path"));
    assert!(repo
        .delete(&scope, &DocumentSelector::ById(by_id.id().clone()))
        .expect("delete by id"));
    assert!(repo
        .delete(&scope, &DocumentSelector::for_document(&by_value))
        .expect("delete by value"));

    assert!(repo.list_all(&scope).expect("list all").is_empty());

    // Deleting again reports that nothing was removed.
    assert!(!repo
        .delete(
            &scope,
            &DocumentSelector::ByPath(by_path.path().clone())
        )
        .expect("repeat delete"));
}

#[test]
fn reopened_repository_reads_the_persisted_index() {
    let root = temp_dir("reopened_repository_reads_the_persisted_index");
    {
        let mut repo = open_repo(&root);
        repo.save(
            &Scope::Global,
            &doc("kept.json", &["keep"], json!({"msg": "hi"})),
        )
        .expect("save document");
    }

    let mut repo = open_repo(&root);
    let tag = Tag::try_new("keep").expect("valid tag");
    let found = repo
        .find_by_tags(&Scope::Global, &[tag], false)
        .expect("find by tags");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].path().as_str(), "kept.json");
}
