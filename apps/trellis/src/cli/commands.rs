//! # CLI Command Implementations

use crate::api;
use crate::config::Settings;
use std::path::{Path, PathBuf};
use trellis_core::{NewStatement, Page, Statement, StatementPage, StatementStore, StoreError};

/// Maximum file size for ingestion (100 MB).
const MAX_INGEST_FILE_SIZE: u64 = 100 * 1024 * 1024;

// =============================================================================
// HELPERS
// =============================================================================

/// Open the store a resolved configuration names.
pub fn open_store(settings: &Settings) -> Result<StatementStore, StoreError> {
    let config = settings.store_config()?;
    tracing::debug!(endpoint = %config.endpoint, "opening store");
    StatementStore::connect(&config)
}

/// Resolve symlinks and `..`, and require a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, StoreError> {
    let canonical = path.canonicalize().map_err(|e| {
        StoreError::InvalidArgument(format!("Invalid file path '{}': {}", path.display(), e))
    })?;
    if !canonical.is_file() {
        return Err(StoreError::InvalidArgument(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }
    Ok(canonical)
}

fn validate_file_size(path: &Path, max_size: u64) -> Result<(), StoreError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| StoreError::InvalidArgument(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > max_size {
        return Err(StoreError::InvalidArgument(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Interpret CLI object text: JSON if it parses, otherwise a JSON string.
pub fn parse_object(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), StoreError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_statement(statement: &Statement) {
    println!(
        "{}  {} -[{}]-> {}",
        statement.id, statement.subject_identifier, statement.predicate, statement.object_value
    );
    println!(
        "    source: {}  timestamp: {}  created: {}",
        statement.source_id.as_deref().unwrap_or("-"),
        statement.statement_timestamp,
        statement.created_at
    );
}

fn print_page(page: &StatementPage) {
    for statement in &page.statements {
        print_statement(statement);
    }
    println!();
    println!(
        "{} of {} statements{}",
        page.statements.len(),
        page.total_count,
        if page.has_more { " (more available)" } else { "" }
    );
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(settings: Settings) -> Result<(), StoreError> {
    let store = open_store(&settings)?;
    let addr = settings.bind_address();

    println!("Trellis Statement Store Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:  {}", addr);
    println!("  Backend:  {}", store.backend_name());
    println!();
    println!("Endpoints:");
    println!("  GET    /statements             - Page all statements");
    println!("  GET    /statements/by-subject  - Page by subject");
    println!("  GET    /statements/by-predicate - Page by predicate");
    println!("  GET    /statements/search      - Search");
    println!("  GET    /statements/{{id}}        - Get statement");
    println!("  POST   /statements             - Create statement");
    println!("  DELETE /statements/{{id}}        - Delete statement");
    println!("  POST   /ingest                 - Bulk ingest");
    println!("  GET    /subjects, /status, /health");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&addr, store).await
}

// =============================================================================
// READ COMMANDS
// =============================================================================

pub fn cmd_status(store: &StatementStore, json_mode: bool) -> Result<(), StoreError> {
    let statements = store.statement_count()?;
    let identifiers = store.identifier_count(None)?;
    let subjects = store.list_subjects()?.len();

    if json_mode {
        return print_json(&serde_json::json!({
            "backend": store.backend_name(),
            "statement_count": statements,
            "identifier_count": identifiers,
            "subject_count": subjects,
        }));
    }

    println!("Trellis Store Status");
    println!("====================");
    println!("Backend:     {}", store.backend_name());
    println!();
    println!("Statements:  {}", statements);
    println!("Identifiers: {}", identifiers);
    println!("Subjects:    {}", subjects);
    Ok(())
}

pub fn cmd_subjects(store: &StatementStore, json_mode: bool) -> Result<(), StoreError> {
    let subjects = store.list_subjects()?;
    if json_mode {
        return print_json(&subjects);
    }
    for subject in &subjects {
        println!("{}", subject);
    }
    Ok(())
}

pub fn cmd_list(
    store: &StatementStore,
    json_mode: bool,
    limit: i64,
    offset: i64,
) -> Result<(), StoreError> {
    let page = store.paginated_statements(Page::new(limit, offset)?)?;
    if json_mode {
        return print_json(&page);
    }
    print_page(&page);
    Ok(())
}

pub fn cmd_get(store: &StatementStore, json_mode: bool, id: &str) -> Result<(), StoreError> {
    let statement = store.statement(id)?;
    if json_mode {
        return print_json(&statement);
    }
    match statement {
        Some(statement) => print_statement(&statement),
        None => println!("Statement not found: {}", id),
    }
    Ok(())
}

pub fn cmd_search(store: &StatementStore, json_mode: bool, query: &str) -> Result<(), StoreError> {
    let found = store.search_statements(query)?;
    if json_mode {
        return print_json(&found);
    }
    for statement in &found {
        print_statement(statement);
    }
    println!();
    println!("{} match(es)", found.len());
    Ok(())
}

// =============================================================================
// WRITE COMMANDS
// =============================================================================

/// Positional and optional arguments of `create`.
#[derive(Debug, Clone)]
pub struct CreateArgs {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub source: Option<String>,
    pub timestamp: Option<String>,
}

pub fn cmd_create(
    store: &StatementStore,
    json_mode: bool,
    args: CreateArgs,
) -> Result<(), StoreError> {
    let mut input = NewStatement::new(args.subject, args.predicate, parse_object(&args.object));
    input.source_id = args.source;
    input.statement_timestamp = args.timestamp;

    let created = store.create_statement(input)?;
    if json_mode {
        return print_json(&created);
    }
    println!("Created statement {}", created.id);
    Ok(())
}

pub fn cmd_delete(store: &StatementStore, json_mode: bool, id: &str) -> Result<(), StoreError> {
    let outcome = store.delete_statement(id)?;
    if json_mode {
        return print_json(&outcome);
    }
    println!("{}: {}", outcome.message, outcome.id);
    Ok(())
}

pub fn cmd_ingest(
    store: &StatementStore,
    json_mode: bool,
    file: &Path,
    source: Option<String>,
) -> Result<(), StoreError> {
    let path = validate_file_path(file)?;
    validate_file_size(&path, MAX_INGEST_FILE_SIZE)?;

    let data = std::fs::read_to_string(&path).map_err(|e| {
        StoreError::InvalidArgument(format!("Cannot read '{}': {}", path.display(), e))
    })?;
    let source = source.or_else(|| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
    });

    let report = store.ingest(&data, source.as_deref())?;
    if json_mode {
        return print_json(&report);
    }
    println!("{}", report.message);
    println!("  Subjects:   {}", report.entities_created);
    println!("  Statements: {}", report.statements_created);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn object_text_falls_back_to_string() {
        assert_eq!(parse_object("30"), json!(30));
        assert_eq!(parse_object(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_object("bob"), json!("bob"));
    }

    #[test]
    fn ingest_reads_file_and_tags_source() {
        let store = StatementStore::in_memory();
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "a,likes,b\nbadline\nc,knows,d").expect("write");

        cmd_ingest(&store, true, file.path(), None).expect("ingest");

        let page = store.paginated_statements(Page::at(10, 0)).expect("page");
        assert_eq!(page.total_count, 2);
        let expected = file
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        assert_eq!(page.statements[0].source_id, expected);
    }

    #[test]
    fn ingest_rejects_directories() {
        let store = StatementStore::in_memory();
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            cmd_ingest(&store, false, dir.path(), None),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn create_rejects_bad_timestamp() {
        let store = StatementStore::in_memory();
        let args = CreateArgs {
            subject: "alice".into(),
            predicate: "born".into(),
            object: "1990".into(),
            source: None,
            timestamp: Some("last tuesday".into()),
        };
        assert!(cmd_create(&store, false, args).is_err());
    }
}
