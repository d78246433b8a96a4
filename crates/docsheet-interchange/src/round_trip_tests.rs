//! Export → artifact → import round trips against in-memory stores

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{
    Artifact, CollisionDecision, ExportOptions, Exporter, ImportOptions, Importer, SheetOutcome,
    SkipReason, read_workbook,
};
use docsheet_core::{Document, DocumentStore, IDENTIFIER_FIELD, MemoryStore, ObjectId, Value};
use pretty_assertions::assert_eq;

/// Initialize logging for tests if not already initialized
fn initialize_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("docsheet_interchange=debug".parse().unwrap()),
            )
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn user(id: &str, name: &str, age: i32, admin: bool, score: f64) -> Document {
    [
        (IDENTIFIER_FIELD, Value::ObjectId(ObjectId::parse_str(id).unwrap())),
        ("name", Value::from(name)),
        ("age", Value::Int32(age)),
        ("admin", Value::Bool(admin)),
        ("score", Value::Double(score)),
    ]
    .into_iter()
    .collect()
}

fn users() -> Vec<Document> {
    vec![
        user("507f1f77bcf86cd799439011", "ada", 36, true, 99.5),
        user("507f1f77bcf86cd799439012", "grace", 0, false, 0.25),
        user("507f1f77bcf86cd799439013", "alan", -4, false, 12.75),
    ]
}

/// Documents compared as sets, independent of store order
fn as_set(documents: &[Document]) -> BTreeSet<String> {
    documents.iter().map(|d| format!("{:?}", d)).collect()
}

async fn export_to_artifact(source: MemoryStore, dir: &std::path::Path) -> Artifact {
    let exporter = Exporter::new(
        Arc::new(source),
        ExportOptions::default().with_backup_dir(dir),
    );
    let result = exporter.export_database("shop").await.unwrap();
    Artifact::from_path(&result.artifact).unwrap()
}

#[tokio::test]
async fn test_scalar_collection_round_trips() {
    initialize_logging();
    let dir = tempfile::tempdir().unwrap();
    let source = MemoryStore::new().with_collection("shop", "users", users());
    let artifact = export_to_artifact(source, dir.path()).await;
    assert_eq!(artifact.database(), "shop");

    let target = Arc::new(MemoryStore::new());
    let report = Importer::new(target.clone(), ImportOptions::default())
        .import_artifact(&artifact, &CollisionDecision::Skip)
        .await
        .unwrap();

    assert_eq!(report.loaded("users"), Some(3));
    let restored = target.documents("shop", "users").unwrap();
    assert_eq!(as_set(&restored), as_set(&users()));
}

#[tokio::test]
async fn test_identifier_survives_as_identifier() {
    initialize_logging();
    let dir = tempfile::tempdir().unwrap();
    let source = MemoryStore::new().with_collection("shop", "users", users());
    let artifact = export_to_artifact(source, dir.path()).await;

    let target = Arc::new(MemoryStore::new());
    Importer::new(target.clone(), ImportOptions::default())
        .import_artifact(&artifact, &CollisionDecision::Skip)
        .await
        .unwrap();

    let expected = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
    let restored = target.documents("shop", "users").unwrap();
    let ada = restored
        .iter()
        .find(|d| d.get("name") == Some(&Value::from("ada")))
        .unwrap();
    assert_eq!(ada.get(IDENTIFIER_FIELD), Some(&Value::ObjectId(expected)));
}

#[tokio::test]
async fn test_restore_over_existing_database() {
    initialize_logging();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new().with_collection("shop", "users", users()));
    let exporter = Exporter::new(store.clone(), ExportOptions::default().with_backup_dir(dir.path()));
    let result = exporter.export_database("shop").await.unwrap();
    let artifact = Artifact::from_path(&result.artifact).unwrap();

    store
        .insert_many(
            "shop",
            "users",
            vec![[("name", Value::from("intruder"))].into_iter().collect()],
        )
        .await
        .unwrap();

    let importer = Importer::new(store.clone(), ImportOptions::default());
    let declined = importer
        .import_artifact(&artifact, &CollisionDecision::Skip)
        .await
        .unwrap();
    assert_eq!(declined.sheets[0].outcome, SheetOutcome::Declined);
    assert_eq!(store.documents("shop", "users").unwrap().len(), 4);

    let replaced = importer
        .import_artifact(&artifact, &CollisionDecision::Overwrite)
        .await
        .unwrap();
    assert_eq!(
        replaced.sheets[0].outcome,
        SheetOutcome::Loaded {
            documents: 3,
            replaced: 4
        }
    );
    assert_eq!(
        as_set(&store.documents("shop", "users").unwrap()),
        as_set(&users())
    );
}

#[tokio::test]
async fn test_nested_values_come_back_as_text() {
    initialize_logging();
    let dir = tempfile::tempdir().unwrap();
    let nested: Document = [
        ("name", Value::from("ada")),
        ("address", Value::Json(serde_json::json!({ "city": "Oslo" }))),
    ]
    .into_iter()
    .collect();
    let source = MemoryStore::new().with_collection("shop", "people", [nested]);
    let artifact = export_to_artifact(source, dir.path()).await;

    let target = Arc::new(MemoryStore::new());
    Importer::new(target.clone(), ImportOptions::default())
        .import_artifact(&artifact, &CollisionDecision::Skip)
        .await
        .unwrap();

    let restored = &target.documents("shop", "people").unwrap()[0];
    assert_eq!(
        restored.get("address"),
        Some(&Value::String(r#"{"city":"Oslo"}"#.into()))
    );
}

#[tokio::test]
async fn test_empty_collection_exports_an_empty_sheet_and_imports_nothing() {
    initialize_logging();
    let dir = tempfile::tempdir().unwrap();
    let source = MemoryStore::new()
        .with_collection("shop", "empty", [])
        .with_collection("shop", "users", users());
    let artifact = export_to_artifact(source, dir.path()).await;

    let workbook = read_workbook(artifact.path()).unwrap();
    assert!(workbook.sheet("empty").unwrap().is_empty());

    let target = Arc::new(MemoryStore::new());
    let report = Importer::new(target.clone(), ImportOptions::default())
        .import_artifact(&artifact, &CollisionDecision::Skip)
        .await
        .unwrap();
    assert_eq!(report.total_loaded(), 3);
    assert_eq!(target.documents("shop", "empty"), None);
}

#[tokio::test]
async fn test_collection_of_blank_documents_comes_back_as_skipped() {
    initialize_logging();
    let dir = tempfile::tempdir().unwrap();
    let blank: Document = [("note", Value::from(""))].into_iter().collect();
    let source = MemoryStore::new().with_collection("shop", "notes", [blank]);
    let artifact = export_to_artifact(source, dir.path()).await;

    // The blank data row is not written, so only the header row survives.
    let workbook = read_workbook(artifact.path()).unwrap();
    assert_eq!(workbook.sheet("notes").unwrap().rows().len(), 1);

    let target = Arc::new(MemoryStore::new());
    let report = Importer::new(target.clone(), ImportOptions::default())
        .import_artifact(&artifact, &CollisionDecision::Overwrite)
        .await
        .unwrap();
    assert_eq!(
        report.sheets[0].outcome,
        SheetOutcome::Skipped {
            reason: SkipReason::TooFewRows
        }
    );
    assert_eq!(report.loaded("notes"), None);
    assert_eq!(target.documents("shop", "notes"), None);
}
