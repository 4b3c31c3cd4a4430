use docsort_core::db::open_db_in_memory;
use docsort_core::{
    CategorizeError, CategorizeRequest, FileOutcome, LedgerError, LedgerRepository, MarkOutcome,
    Placement, SortError, SortOutcome, SortService, SortState, SqliteLedgerRepository,
};
use rusqlite::Connection;
use std::cell::RefCell;
use std::path::PathBuf;
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    docs: PathBuf,
    sorted: PathBuf,
}

fn workspace_with(files: &[(&str, &str)]) -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    for (name, content) in files {
        std::fs::write(docs.join(name), content).unwrap();
    }
    let sorted = dir.path().join("sorted");
    Workspace {
        _dir: dir,
        docs,
        sorted,
    }
}

fn by_keyword(request: &CategorizeRequest<'_>) -> Result<Placement, CategorizeError> {
    let text = request.content_text();
    let category = if text.contains("invoice") {
        "Finance"
    } else if text.contains("kernel") {
        "Tech"
    } else {
        return Err(CategorizeError::new("no matching category"));
    };
    let stem = request.identifier.trim_end_matches(".txt");
    Ok(Placement::new(
        category,
        format!("{stem}_{}.txt", category.to_lowercase()),
    ))
}

fn service<'conn>(
    conn: &'conn Connection,
    workspace: &Workspace,
) -> SortService<
    SqliteLedgerRepository<'conn>,
    fn(&CategorizeRequest<'_>) -> Result<Placement, CategorizeError>,
> {
    SortService::new(
        SqliteLedgerRepository::new(conn),
        &workspace.docs,
        &workspace.sorted,
        by_keyword as fn(&CategorizeRequest<'_>) -> Result<Placement, CategorizeError>,
    )
}

#[test]
fn manual_operations_follow_documented_scenario() {
    let workspace = workspace_with(&[("a.txt", "kernel notes"), ("b.txt", "invoice")]);
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, &workspace);

    let report = service
        .ingest(&["a.txt".to_string(), "b.txt".to_string()])
        .unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(service.is_sorted("a.txt").unwrap(), SortState::NotSorted);

    let outcome = service.file("a.txt", "tech", "a_tech_01.txt").unwrap();
    assert!(matches!(outcome, FileOutcome::Filed { .. }));
    assert_eq!(service.list_categories().unwrap(), vec!["tech"]);

    assert_eq!(service.mark_sorted("a.txt").unwrap(), MarkOutcome::Updated);
    assert_eq!(service.is_sorted("a.txt").unwrap(), SortState::Sorted);
    assert_eq!(service.is_sorted("c.txt").unwrap(), SortState::NotFound);
}

#[test]
fn empty_sorted_root_lists_no_categories() {
    let workspace = workspace_with(&[]);
    let conn = open_db_in_memory().unwrap();
    assert!(service(&conn, &workspace)
        .list_categories()
        .unwrap()
        .is_empty());
}

#[test]
fn ingest_source_dir_registers_files_once() {
    let workspace = workspace_with(&[("a.txt", "kernel"), ("b.txt", "invoice")]);
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, &workspace);

    let first = service.ingest_source_dir().unwrap();
    assert_eq!((first.inserted, first.skipped), (2, 0));

    std::fs::write(workspace.docs.join("c.txt"), "kernel panic").unwrap();
    let second = service.ingest_source_dir().unwrap();
    assert_eq!((second.inserted, second.skipped), (1, 2));
}

#[test]
fn sort_document_files_marks_and_then_short_circuits() {
    let workspace = workspace_with(&[("a.txt", "kernel scheduler notes")]);
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, &workspace);
    service.ingest_source_dir().unwrap();

    let outcome = service.sort_document("a.txt").unwrap();
    let destination = workspace.sorted.join("tech").join("a_tech.txt");
    assert_eq!(
        outcome,
        SortOutcome::Filed {
            category: "tech".to_string(),
            new_name: "a_tech.txt".to_string(),
            destination: destination.clone(),
        }
    );
    assert!(destination.exists());
    assert!(workspace.docs.join("a.txt").exists());
    assert_eq!(service.is_sorted("a.txt").unwrap(), SortState::Sorted);

    std::fs::remove_file(&destination).unwrap();
    assert_eq!(
        service.sort_document("a.txt").unwrap(),
        SortOutcome::AlreadySorted
    );
    assert!(!destination.exists());
}

#[test]
fn unknown_document_is_not_filed() {
    let workspace = workspace_with(&[("stray.txt", "kernel")]);
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, &workspace);

    assert_eq!(
        service.sort_document("stray.txt").unwrap(),
        SortOutcome::NotFound
    );
    assert!(!workspace.sorted.exists());
}

#[test]
fn ingested_document_without_source_is_reported_missing() {
    let workspace = workspace_with(&[]);
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, &workspace);
    service.ingest(&["gone.txt".to_string()]).unwrap();

    assert_eq!(
        service.sort_document("gone.txt").unwrap(),
        SortOutcome::SourceMissing {
            source: workspace.docs.join("gone.txt")
        }
    );
    assert_eq!(service.is_sorted("gone.txt").unwrap(), SortState::NotSorted);
}

#[test]
fn categorizer_sees_existing_categories_and_content() {
    let workspace = workspace_with(&[("a.txt", "hello")]);
    std::fs::create_dir_all(workspace.sorted.join("tech")).unwrap();
    std::fs::create_dir_all(workspace.sorted.join("finance")).unwrap();
    let conn = open_db_in_memory().unwrap();
    let seen = RefCell::new(None);

    let service = SortService::new(
        SqliteLedgerRepository::new(&conn),
        &workspace.docs,
        &workspace.sorted,
        |request: &CategorizeRequest<'_>| -> Result<Placement, CategorizeError> {
            *seen.borrow_mut() = Some((request.categories.to_vec(), request.content.to_vec()));
            Ok(Placement::new("Greetings", "hello.txt"))
        },
    );
    service.ingest_source_dir().unwrap();
    service.sort_document("a.txt").unwrap();

    let (categories, content) = seen.borrow_mut().take().unwrap();
    assert_eq!(categories, vec!["finance", "tech"]);
    assert_eq!(content, b"hello");
    assert_eq!(
        service.list_categories().unwrap(),
        vec!["finance", "greetings", "tech"]
    );
}

#[test]
fn batch_continues_past_per_document_failures() {
    let workspace = workspace_with(&[
        ("a.txt", "kernel"),
        ("b.txt", "poetry"),
        ("c.txt", "invoice"),
    ]);
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, &workspace);
    service.ingest_source_dir().unwrap();
    service.ingest(&["d.txt".to_string()]).unwrap();

    let report = service.sort_pending().unwrap();
    assert_eq!(report.entries.len(), 4);
    assert_eq!(report.filed(), 2);
    assert_eq!(report.failed(), 1);

    let b = report
        .entries
        .iter()
        .find(|entry| entry.identifier == "b.txt")
        .unwrap();
    assert!(matches!(b.result, Err(SortError::Categorize { .. })));
    let d = report
        .entries
        .iter()
        .find(|entry| entry.identifier == "d.txt")
        .unwrap();
    assert!(matches!(d.result, Ok(SortOutcome::SourceMissing { .. })));

    assert_eq!(service.is_sorted("a.txt").unwrap(), SortState::Sorted);
    assert_eq!(service.is_sorted("b.txt").unwrap(), SortState::NotSorted);
    assert_eq!(service.is_sorted("c.txt").unwrap(), SortState::Sorted);

    let rerun = service.sort_pending().unwrap();
    assert_eq!(rerun.entries.len(), 2);
    assert_eq!(rerun.filed(), 0);
}

/// Ledger whose mark always fails, to exercise the filed-but-unmarked window.
struct FailingMark<'conn>(SqliteLedgerRepository<'conn>);

impl LedgerRepository for FailingMark<'_> {
    fn sort_state(&self, identifier: &str) -> docsort_core::LedgerResult<SortState> {
        self.0.sort_state(identifier)
    }

    fn mark_sorted(&self, _identifier: &str) -> docsort_core::LedgerResult<MarkOutcome> {
        Err(LedgerError::InvalidData("simulated mark failure".to_string()))
    }

    fn ingest(
        &self,
        identifiers: &[String],
    ) -> docsort_core::LedgerResult<docsort_core::IngestReport> {
        self.0.ingest(identifiers)
    }

    fn get_document(
        &self,
        identifier: &str,
    ) -> docsort_core::LedgerResult<Option<docsort_core::DocumentRecord>> {
        self.0.get_document(identifier)
    }

    fn list_documents(
        &self,
        filter: docsort_core::DocumentFilter,
    ) -> docsort_core::LedgerResult<Vec<docsort_core::DocumentRecord>> {
        self.0.list_documents(filter)
    }
}

#[test]
fn failed_mark_leaves_artifact_and_retry_converges() {
    let workspace = workspace_with(&[("a.txt", "kernel")]);
    let conn = open_db_in_memory().unwrap();

    let failing = SortService::new(
        FailingMark(SqliteLedgerRepository::new(&conn)),
        &workspace.docs,
        &workspace.sorted,
        by_keyword,
    );
    failing.ingest_source_dir().unwrap();
    let err = failing.sort_document("a.txt").unwrap_err();
    let destination = workspace.sorted.join("tech").join("a_tech.txt");
    match err {
        SortError::MarkFailed {
            destination: reported,
            ..
        } => assert_eq!(reported, destination),
        other => panic!("unexpected error: {other}"),
    }
    assert!(destination.exists());
    assert_eq!(failing.is_sorted("a.txt").unwrap(), SortState::NotSorted);

    let healthy = service(&conn, &workspace);
    assert!(matches!(
        healthy.sort_document("a.txt").unwrap(),
        SortOutcome::Filed { .. }
    ));
    assert_eq!(healthy.is_sorted("a.txt").unwrap(), SortState::Sorted);
    assert_eq!(healthy.list_categories().unwrap(), vec!["tech"]);
}
