//! Migration Source - Registry of migration units
//!
//! Units come from two places: `.sql` files in the migrations directory, each
//! parsed into a [`SqlMigration`], and units registered in code. The directory
//! is rescanned on every discovery so a freshly created file is picked up
//! without restarting the process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Location, Token, TokenWithLocation, Tokenizer};
use sqlx::{Any, Executor, Transaction};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use super::definitions::MigrationUnit;
use crate::error::{MigrationError, MigrationResult};

/// File extension of migration artifacts
pub const MIGRATION_EXTENSION: &str = "sql";

/// A migration unit backed by SQL text with up and down sections
#[derive(Debug, Clone)]
pub struct SqlMigration {
    version: String,
    up_sql: String,
    down_sql: String,
    path: Option<PathBuf>,
}

impl SqlMigration {
    /// Build a unit from in-memory SQL
    pub fn new(
        version: impl Into<String>,
        up_sql: impl Into<String>,
        down_sql: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            up_sql: up_sql.into(),
            down_sql: down_sql.into(),
            path: None,
        }
    }

    /// Load a unit from a migration file; the version is the file stem
    pub fn from_file(path: &Path) -> MigrationResult<Self> {
        let version = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                MigrationError::InvalidUnit(format!(
                    "invalid migration filename: {}",
                    path.display()
                ))
            })?
            .to_string();

        let content = fs::read_to_string(path)?;
        let mut migration = Self::parse(version, &content)?;
        migration.path = Some(path.to_path_buf());
        Ok(migration)
    }

    /// Parse migration content into up and down sections.
    ///
    /// Sections start at a `-- Up migration` / `-- Down migration` marker
    /// (`-- up` / `-- down` also work). Full-line comments and blank lines are
    /// dropped; SQL appearing before the first marker is rejected. Lines that
    /// continue a multi-line string or dollar-quoted body are kept verbatim,
    /// even when they look like a comment or a marker.
    pub fn parse(version: impl Into<String>, content: &str) -> MigrationResult<Self> {
        let version = version.into();
        let mut up_sql = Vec::new();
        let mut down_sql = Vec::new();
        let mut current_section = None;
        let mut literal = Literal::Outside;

        for line in content.lines() {
            let trimmed = line.trim();

            if literal == Literal::Outside {
                if let Some(comment) = trimmed.strip_prefix("--") {
                    match comment.trim_start_matches('-').trim().to_lowercase().as_str() {
                        "up" | "up migration" => current_section = Some(true),
                        "down" | "down migration" => current_section = Some(false),
                        _ => {}
                    }
                    continue;
                }

                if trimmed.is_empty() {
                    continue;
                }
            }

            literal = literal.scan(line);
            match current_section {
                Some(true) => up_sql.push(line),
                Some(false) => down_sql.push(line),
                None => {
                    return Err(MigrationError::InvalidUnit(format!(
                        "{version}: SQL found before the '-- Up migration' marker"
                    )))
                }
            }
        }

        Ok(Self {
            up_sql: up_sql.join("\n").trim().to_string(),
            down_sql: down_sql.join("\n").trim().to_string(),
            path: None,
            version,
        })
    }

    /// SQL run by `up`
    pub fn up_sql(&self) -> &str {
        &self.up_sql
    }

    /// SQL run by `down`
    pub fn down_sql(&self) -> &str {
        &self.down_sql
    }

    /// File the unit was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[async_trait]
impl MigrationUnit for SqlMigration {
    fn version(&self) -> &str {
        &self.version
    }

    async fn up<'a>(&self, tx: &mut Transaction<'a, Any>) -> MigrationResult<()> {
        execute_statements(tx, &self.up_sql).await
    }

    async fn down<'a>(&self, tx: &mut Transaction<'a, Any>) -> MigrationResult<()> {
        execute_statements(tx, &self.down_sql).await
    }
}

/// Quoting state carried from one line of a migration file to the next
#[derive(Debug, Clone, PartialEq, Eq)]
enum Literal {
    Outside,
    Single,
    /// Inside a `$tag$ ... $tag$` body; holds the full delimiter
    Dollar(String),
}

impl Literal {
    /// State after reading `line`, starting from `self`
    fn scan(self, line: &str) -> Literal {
        let mut state = self;
        let mut rest = line;

        loop {
            let (consumed, next) = match &state {
                Literal::Outside => {
                    let Some(pos) = rest.find(|c: char| matches!(c, '\'' | '$' | '-')) else {
                        return Literal::Outside;
                    };
                    let tail = &rest[pos..];
                    if tail.starts_with("--") {
                        return Literal::Outside;
                    }
                    if tail.starts_with('\'') {
                        (pos + 1, Literal::Single)
                    } else if let Some(tag) = dollar_tag(tail) {
                        (pos + tag.len(), Literal::Dollar(tag))
                    } else {
                        (pos + 1, Literal::Outside)
                    }
                }
                // A doubled '' closes and immediately reopens
                Literal::Single => match rest.find('\'') {
                    Some(pos) => (pos + 1, Literal::Outside),
                    None => return state.clone(),
                },
                Literal::Dollar(tag) => match rest.find(tag.as_str()) {
                    Some(pos) => (pos + tag.len(), Literal::Outside),
                    None => return state.clone(),
                },
            };
            rest = &rest[consumed..];
            state = next;
        }
    }
}

/// `$$` or `$tag$` at the start of `s`
fn dollar_tag(s: &str) -> Option<String> {
    let body = s.strip_prefix('$')?;
    let tag = &body[..body.find('$')?];
    let valid = tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !tag.starts_with(|c: char| c.is_ascii_digit());
    valid.then(|| format!("${tag}$"))
}

/// Run every statement of `sql` on the transaction, in order, as written
async fn execute_statements(tx: &mut Transaction<'_, Any>, sql: &str) -> MigrationResult<()> {
    for statement in split_sql_statements(sql) {
        tracing::debug!(statement = %statement, "executing migration statement");
        (&mut **tx).execute(statement.as_str()).await?;
    }
    Ok(())
}

/// Split SQL into statements at top-level semicolons.
///
/// Each statement is a slice of the input text, so it runs exactly as the
/// author wrote it. Semicolons inside literals, dollar-quoted bodies and the
/// `BEGIN ... END` block of a trigger or routine do not end a statement. If
/// the text cannot be tokenized it is returned whole and the database reports
/// the problem.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    if sql.trim().is_empty() {
        return Vec::new();
    }

    let dialect = GenericDialect {};
    let tokens = match Tokenizer::new(&dialect, sql).tokenize_with_location() {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::warn!("SQL tokenizing failed, executing section as one batch: {}", e);
            return vec![sql.trim().to_string()];
        }
    };

    let offsets = LineOffsets::new(sql);
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_content = false;
    let mut leading = Vec::new();
    let mut depth = 0usize;

    for TokenWithLocation { token, location } in tokens {
        match &token {
            Token::Whitespace(_) => continue,
            Token::SemiColon if depth == 0 => {
                let end = offsets.byte_offset(&location);
                if has_content {
                    statements.push(sql[start..end].trim().to_string());
                }
                start = end + 1;
                has_content = false;
                leading.clear();
                continue;
            }
            Token::Word(word) => {
                if leading.len() < 5 {
                    leading.push(word.keyword);
                }
                if opens_block(&leading) {
                    match word.keyword {
                        Keyword::BEGIN | Keyword::CASE => depth += 1,
                        Keyword::END => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        has_content = true;
    }

    if has_content && start < sql.len() {
        statements.push(sql[start..].trim().to_string());
    }
    statements
}

/// `CREATE [OR REPLACE] [TEMP] TRIGGER | FUNCTION | PROCEDURE` may carry a
/// `BEGIN ... END` body with its own semicolons
fn opens_block(leading: &[Keyword]) -> bool {
    leading.first() == Some(&Keyword::CREATE)
        && leading
            .iter()
            .any(|k| matches!(k, Keyword::TRIGGER | Keyword::FUNCTION | Keyword::PROCEDURE))
}

/// Maps tokenizer locations (1-based line, 1-based char column) to byte offsets
struct LineOffsets<'a> {
    sql: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineOffsets<'a> {
    fn new(sql: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(sql.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { sql, starts }
    }

    fn byte_offset(&self, location: &Location) -> usize {
        let line = (location.line as usize).saturating_sub(1);
        let column = (location.column as usize).saturating_sub(1);
        let Some(&line_start) = self.starts.get(line) else {
            return self.sql.len();
        };
        self.sql[line_start..]
            .char_indices()
            .nth(column)
            .map_or(self.sql.len(), |(i, _)| line_start + i)
    }
}

/// Turn a human-readable name into a version slug
pub fn sanitize_name(name: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let separators =
        SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("separator pattern is valid"));

    separators
        .replace_all(&name.to_lowercase(), "_")
        .trim_matches('_')
        .to_string()
}

/// Registry of migration units keyed by version
#[derive(Clone, Default)]
pub struct MigrationSource {
    dir: Option<PathBuf>,
    registered: BTreeMap<String, Arc<dyn MigrationUnit>>,
}

impl MigrationSource {
    /// Create an empty source with no directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source that scans `dir` for `.sql` units
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            registered: BTreeMap::new(),
        }
    }

    /// Directory scanned for units, if any
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Register a unit defined in code
    pub fn register(&mut self, unit: impl MigrationUnit + 'static) -> MigrationResult<()> {
        let version = unit.version().to_string();
        if version.is_empty() {
            return Err(MigrationError::InvalidUnit(
                "migration version cannot be empty".to_string(),
            ));
        }
        if self.registered.contains_key(&version) {
            return Err(MigrationError::InvalidUnit(format!(
                "duplicate migration version: {version}"
            )));
        }
        self.registered.insert(version, Arc::new(unit));
        Ok(())
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_unit(mut self, unit: impl MigrationUnit + 'static) -> MigrationResult<Self> {
        self.register(unit)?;
        Ok(self)
    }

    /// Every unit currently available, ordered by version
    pub fn discover(&self) -> MigrationResult<BTreeMap<String, Arc<dyn MigrationUnit>>> {
        let mut units = self.registered.clone();

        for path in self.unit_files()? {
            let migration = SqlMigration::from_file(&path)?;
            let version = migration.version().to_string();
            if units.contains_key(&version) {
                return Err(MigrationError::InvalidUnit(format!(
                    "duplicate migration version: {version}"
                )));
            }
            units.insert(version, Arc::new(migration));
        }

        Ok(units)
    }

    /// Versions of every available unit, ascending
    pub fn versions(&self) -> MigrationResult<Vec<String>> {
        Ok(self.discover()?.into_keys().collect())
    }

    /// Load a single unit by version
    pub fn load(&self, version: &str) -> MigrationResult<Arc<dyn MigrationUnit>> {
        if let Some(unit) = self.registered.get(version) {
            return Ok(Arc::clone(unit));
        }

        if !is_plain_version(version) {
            return Err(MigrationError::unit_not_found(version));
        }

        let Some(dir) = &self.dir else {
            return Err(MigrationError::unit_not_found(version));
        };

        let path = dir.join(format!("{version}.{MIGRATION_EXTENSION}"));
        if !path.is_file() {
            return Err(MigrationError::unit_not_found(version));
        }

        Ok(Arc::new(SqlMigration::from_file(&path)?))
    }

    /// Create a new migration file stamped with the current time
    pub fn create(&self, name: &str) -> MigrationResult<PathBuf> {
        self.create_at(name, Utc::now())
    }

    /// Create a new migration file stamped with `now`
    pub fn create_at(&self, name: &str, now: DateTime<Utc>) -> MigrationResult<PathBuf> {
        let dir = self.dir.as_ref().ok_or_else(|| {
            MigrationError::Configuration("migration source has no directory".to_string())
        })?;

        let slug = sanitize_name(name);
        if slug.is_empty() {
            return Err(MigrationError::InvalidUnit(format!(
                "migration name '{name}' has no usable characters"
            )));
        }

        // Ensure migrations directory exists
        fs::create_dir_all(dir)?;

        let version = format!("{}_{}", now.format("%Y%m%d_%H%M%S"), slug);
        let filepath = dir.join(format!("{version}.{MIGRATION_EXTENSION}"));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&filepath)?;
        file.write_all(migration_template(name, &version, now).as_bytes())?;

        tracing::info!(version = %version, "created migration {}", filepath.display());
        Ok(filepath)
    }

    /// Migration files in the directory, skipping non-unit artifacts
    fn unit_files(&self) -> MigrationResult<Vec<PathBuf>> {
        let Some(dir) = &self.dir else {
            return Ok(Vec::new());
        };
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if is_non_unit_artifact(file_name) {
                continue;
            }
            if path.extension().map_or(false, |ext| ext == MIGRATION_EXTENSION) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}

/// Versions must name a file directly inside the migrations directory
fn is_plain_version(version: &str) -> bool {
    !version.is_empty() && !is_non_unit_artifact(version) && !version.contains(['/', '\\'])
}

/// Hidden files and `__init__`-style artifacts never hold a unit
fn is_non_unit_artifact(file_name: &str) -> bool {
    file_name.starts_with('.') || file_name.starts_with("__")
}

/// Scaffold written for new migrations; both sections start out empty
fn migration_template(name: &str, version: &str, now: DateTime<Utc>) -> String {
    format!(
        "-- Migration: {name}\n\
         -- Version: {version}\n\
         -- Created: {created}\n\
         \n\
         -- Up migration\n\
         -- Add your schema changes here, for example:\n\
         -- CREATE TABLE example (\n\
         --     id SERIAL PRIMARY KEY,\n\
         --     name VARCHAR(255) NOT NULL\n\
         -- );\n\
         \n\
         \n\
         -- Down migration\n\
         -- Add rollback statements here, for example:\n\
         -- DROP TABLE IF EXISTS example;\n\
         \n",
        created = now.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

impl std::fmt::Debug for MigrationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationSource")
            .field("dir", &self.dir)
            .field("registered", &self.registered.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Create Users Table"), "create_users_table");
        assert_eq!(sanitize_name("  add--short_id index! "), "add_short_id_index");
        assert_eq!(sanitize_name("***"), "");
    }

    #[test]
    fn test_parse_sections() {
        let content = "-- Migration: init\n\
                       -- Up migration\n\
                       CREATE TABLE t (id INTEGER PRIMARY KEY);\n\
                       -- a comment inside the section\n\
                       CREATE INDEX idx_t ON t (id);\n\
                       \n\
                       -- Down migration  \n\
                       DROP TABLE t;\n";

        let migration = SqlMigration::parse("20240101_000000_init", content).unwrap();
        assert_eq!(
            migration.up_sql(),
            "CREATE TABLE t (id INTEGER PRIMARY KEY);\nCREATE INDEX idx_t ON t (id);"
        );
        assert_eq!(migration.down_sql(), "DROP TABLE t;");
        assert_eq!(migration.name(), "init");
    }

    #[test]
    fn test_parse_shipped_urls_migration() {
        let content = include_str!("../../../../migrations/20250727_000000_create_urls_table.sql");
        let migration = SqlMigration::parse("20250727_000000_create_urls_table", content).unwrap();

        let up = split_sql_statements(migration.up_sql());
        assert_eq!(up.len(), 2);
        assert!(up[0].contains("CREATE TABLE IF NOT EXISTS urls"));
        assert!(up[1].contains("idx_urls_short_id"));

        let down = split_sql_statements(migration.down_sql());
        assert_eq!(down.len(), 2);
        assert!(down[1].contains("DROP TABLE IF EXISTS urls"));
        assert_eq!(migration.name(), "create urls table");
    }

    #[test]
    fn test_parse_rejects_sql_outside_sections() {
        let result = SqlMigration::parse("20240101_000000_init", "CREATE TABLE t (id INTEGER);");
        assert!(matches!(result, Err(MigrationError::InvalidUnit(_))));
    }

    #[test]
    fn test_split_sql_statements() {
        let statements = split_sql_statements(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, note TEXT);\nINSERT INTO t (id, note) VALUES (1, 'a;b');",
        );
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE t"));
        assert!(statements[1].contains("'a;b'"));

        assert!(split_sql_statements("  \n ").is_empty());
    }

    #[test]
    fn test_split_keeps_trigger_body_whole() {
        let trigger = "CREATE TRIGGER count_clicks AFTER INSERT ON clicks\n\
                       BEGIN\n    UPDATE urls SET clicks = clicks + 1 WHERE id = NEW.url_id;\nEND";
        let sql = format!("CREATE TABLE clicks (url_id INTEGER);\n{trigger};\n-- trailing note\n");

        let statements = split_sql_statements(&sql);
        assert_eq!(statements, vec!["CREATE TABLE clicks (url_id INTEGER)", trigger]);
    }

    #[test]
    fn test_split_keeps_statement_text_verbatim() {
        let function = "CREATE OR REPLACE FUNCTION touch_url() RETURNS trigger AS $$\n\
                        BEGIN\n    NEW.created_at := now();\n    RETURN NEW;\nEND;\n\
                        $$ LANGUAGE plpgsql";
        let insert = "INSERT INTO urls (short_id, long_url) VALUES ('it''s', 'https://example.com/?a=1;b=2')";
        let sql = format!("{function};\n{insert};");

        let statements = split_sql_statements(&sql);
        assert_eq!(statements, vec![function, insert]);

        let case = "SELECT CASE WHEN 1 = 1 THEN 'a' ELSE 'b' END; SELECT 2";
        assert_eq!(split_sql_statements(case).len(), 2);
    }

    #[test]
    fn test_parse_keeps_comment_like_lines_inside_literals() {
        let content = "-- Up migration\n\
                       INSERT INTO t (x) VALUES ('a\n\
                       -- down\n\
                       b');\n\
                       CREATE FUNCTION f() RETURNS int AS $body$\n\
                       -- Down migration\n\
                       SELECT 1;\n\
                       $body$ LANGUAGE sql;\n\
                       -- Down migration\n\
                       DROP FUNCTION f;\n";

        let migration = SqlMigration::parse("20240101_000000_literals", content).unwrap();
        assert!(migration.up_sql().contains("VALUES ('a\n-- down\nb');"));
        assert!(migration.up_sql().contains("$body$\n-- Down migration\nSELECT 1;\n$body$"));
        assert_eq!(migration.down_sql(), "DROP FUNCTION f;");
        assert_eq!(split_sql_statements(migration.up_sql()).len(), 2);
    }

    #[test]
    fn test_discovery_skips_non_unit_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let unit = "-- Up migration\nCREATE TABLE a (id INTEGER);\n-- Down migration\nDROP TABLE a;\n";

        fs::write(dir.join("20240102_000000_second.sql"), unit).unwrap();
        fs::write(dir.join("20240101_000000_first.sql"), unit).unwrap();
        fs::write(dir.join(".20240103_000000_hidden.sql"), unit).unwrap();
        fs::write(dir.join("__init__.sql"), unit).unwrap();
        fs::write(dir.join("README.md"), "# migrations").unwrap();
        fs::create_dir(dir.join("archive.sql")).unwrap();

        let source = MigrationSource::from_dir(dir);
        assert_eq!(
            source.versions().unwrap(),
            vec!["20240101_000000_first", "20240102_000000_second"]
        );
    }

    #[test]
    fn test_missing_directory_discovers_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let source = MigrationSource::from_dir(temp_dir.path().join("absent"));
        assert!(source.versions().unwrap().is_empty());
    }

    #[test]
    fn test_registered_units_merge_with_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("20240102_000000_file.sql"),
            "-- Up migration\n-- Down migration\n",
        )
        .unwrap();

        let source = MigrationSource::from_dir(temp_dir.path())
            .with_unit(SqlMigration::new("20240101_000000_code", "", ""))
            .unwrap();
        assert_eq!(
            source.versions().unwrap(),
            vec!["20240101_000000_code", "20240102_000000_file"]
        );

        let mut source = source;
        let duplicate = source.register(SqlMigration::new("20240101_000000_code", "", ""));
        assert!(matches!(duplicate, Err(MigrationError::InvalidUnit(_))));

        let clash = MigrationSource::from_dir(temp_dir.path())
            .with_unit(SqlMigration::new("20240102_000000_file", "", ""))
            .unwrap();
        assert!(matches!(clash.discover(), Err(MigrationError::InvalidUnit(_))));
    }

    #[test]
    fn test_load_unknown_version() {
        let temp_dir = TempDir::new().unwrap();
        let source = MigrationSource::from_dir(temp_dir.path());

        let unit = "-- Up migration\nCREATE TABLE a (id INTEGER);\n-- Down migration\nDROP TABLE a;\n";
        fs::write(temp_dir.path().join("__init__.sql"), unit).unwrap();
        fs::write(temp_dir.path().join(".hidden.sql"), unit).unwrap();

        for version in ["20240101_000000_missing", "../etc/passwd", "", "__init__", ".hidden"] {
            let err = source.load(version).err().unwrap();
            assert!(matches!(err, MigrationError::UnitNotFound { .. }));
        }
    }

    #[test]
    fn test_create_writes_loadable_scaffold() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("migrations");
        let source = MigrationSource::from_dir(&dir);
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        let path = source.create_at("Add Analytics", now).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "20240309_140507_add_analytics.sql"
        );

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("-- Migration: Add Analytics"));
        assert!(content.contains("-- Up migration"));
        assert!(content.contains("-- Down migration"));

        let unit = SqlMigration::from_file(&path).unwrap();
        assert!(unit.up_sql().is_empty());
        assert!(unit.down_sql().is_empty());
        assert_eq!(source.versions().unwrap(), vec!["20240309_140507_add_analytics"]);

        // Same second, same name: the existing file is never overwritten
        let again = source.create_at("add analytics", now);
        assert!(matches!(again, Err(MigrationError::Io(_))));
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let temp_dir = TempDir::new().unwrap();
        let source = MigrationSource::from_dir(temp_dir.path());
        assert!(matches!(source.create("!!!"), Err(MigrationError::InvalidUnit(_))));
    }
}
