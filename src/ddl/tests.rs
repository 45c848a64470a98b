use super::*;
use crate::error::SchemagenError;
use crate::schema_loader::SchemaLoader;
use crate::types::SchemaDocument;
use serde_json::{json, Value};

fn create_test_document() -> SchemaDocument {
    load(json!({
        "package": "com.example.media",
        "prefix": "OMU",
        "database": "omu.db",
        "tables": ["album", "content"],
        "album": {
            "columns": [
                { "name": "name", "type": "varchar(100)", "options": "unique" },
                { "name": "added_at", "type": "timestamp", "options": "default current_timestamp" },
                { "name": "updated_at", "type": "timestamp", "options": "default current_timestamp" }
            ],
            "indexes": [
                { "columns": ["name"], "unique": true }
            ]
        },
        "content": {
            "columns": [
                { "name": "album_id", "type": "integer" },
                { "name": "type", "type": "integer" },
                { "name": "uri", "type": "varchar(100)" },
                { "name": "description", "type": "varchar(1024)" },
                { "name": "added_at", "type": "timestamp", "options": "default current_timestamp" },
                { "name": "updated_at", "type": "timestamp", "options": "default current_timestamp" }
            ],
            "indexes": [
                { "columns": ["album_id"], "unique": false },
                { "columns": ["album_id", "type"], "unique": false }
            ]
        }
    }))
}

fn load(raw: Value) -> SchemaDocument {
    SchemaLoader::new().load(&raw).expect("test document should load")
}

#[test]
fn test_album_table_and_unique_index() {
    let ddl = DdlGenerator::new().generate_ddl(&create_test_document()).unwrap();
    let album: Vec<&DdlStatement> = ddl.statements_for("album").collect();

    assert_eq!(album.len(), 2);
    assert_eq!(album[0].statement_type, StatementType::CreateTable);
    assert_eq!(
        album[0].sql,
        "CREATE TABLE \"album\" (\n  \"name\" VARCHAR(100) UNIQUE,\n  \"added_at\" TIMESTAMP DEFAULT CURRENT_TIMESTAMP,\n  \"updated_at\" TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n);"
    );
    assert_eq!(album[1].statement_type, StatementType::CreateIndex);
    assert_eq!(
        album[1].sql,
        r#"CREATE UNIQUE INDEX "album__name__idx" ON "album" ("name");"#
    );
}

#[test]
fn test_content_composite_index() {
    let ddl = DdlGenerator::new().generate_ddl(&create_test_document()).unwrap();
    let content: Vec<&DdlStatement> = ddl.statements_for("content").collect();

    assert_eq!(content.len(), 3);
    assert!(content[0]
        .sql
        .starts_with("CREATE TABLE \"content\" (\n  \"album_id\" INTEGER,\n  \"type\" INTEGER,\n"));
    assert!(content[0].sql.contains("  \"description\" VARCHAR(1024),\n"));
    assert_eq!(
        content[1].sql,
        r#"CREATE INDEX "content__album_id__idx" ON "content" ("album_id");"#
    );
    assert_eq!(
        content[2].sql,
        r#"CREATE INDEX "content__album_id__type__idx" ON "content" ("album_id", "type");"#
    );
}

#[test]
fn test_statement_order_follows_table_list() {
    let ddl = DdlGenerator::new().generate_ddl(&create_test_document()).unwrap();
    let order: Vec<(&str, StatementType)> = ddl
        .statements
        .iter()
        .map(|s| (s.table_name.as_str(), s.statement_type))
        .collect();

    assert_eq!(
        order,
        vec![
            ("album", StatementType::CreateTable),
            ("album", StatementType::CreateIndex),
            ("content", StatementType::CreateTable),
            ("content", StatementType::CreateIndex),
            ("content", StatementType::CreateIndex),
        ]
    );
}

#[test]
fn test_generation_is_deterministic() {
    let generator = DdlGenerator::new();
    let first = generator.generate_ddl(&create_test_document()).unwrap();
    let second = generator.generate_ddl(&create_test_document()).unwrap();

    assert_eq!(first.all_statements(), second.all_statements());
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_row_id_and_if_not_exists() {
    let generator = DdlGenerator::with_config(DdlConfig {
        row_id_column: Some("_id".to_string()),
        if_not_exists: true,
    });
    let statements = generator
        .generate_ddl(&create_test_document())
        .unwrap()
        .all_statements();

    assert!(statements[0].starts_with(
        "CREATE TABLE IF NOT EXISTS \"album\" (\n  \"_id\" INTEGER PRIMARY KEY,\n  \"name\" VARCHAR(100) UNIQUE,"
    ));
    assert_eq!(
        statements[1],
        r#"CREATE UNIQUE INDEX IF NOT EXISTS "album__name__idx" ON "album" ("name");"#
    );
}

#[test]
fn test_modifiers_render_in_written_order() {
    let document = load(json!({
        "package": "p",
        "prefix": "P",
        "database": "p.db",
        "tables": ["setting"],
        "setting": {
            "columns": [
                { "name": "key", "type": "varchar(32)", "options": "not null unique" },
                { "name": "value", "type": "text", "options": "default 'it''s'" },
                { "name": "enabled", "type": "bool", "options": "default false" },
                { "name": "weight", "type": "double", "options": "default -1.25" }
            ]
        }
    }));

    let statements = DdlGenerator::new().generate_ddl(&document).unwrap().all_statements();
    assert_eq!(
        statements,
        vec![
            "CREATE TABLE \"setting\" (\n  \"key\" VARCHAR(32) NOT NULL UNIQUE,\n  \"value\" TEXT DEFAULT 'it''s',\n  \"enabled\" BOOLEAN DEFAULT FALSE,\n  \"weight\" REAL DEFAULT -1.25\n);"
                .to_string()
        ]
    );
}

#[test]
fn test_unrecognized_types_reported_per_column() {
    let document = load(json!({
        "package": "p",
        "prefix": "P",
        "database": "p.db",
        "tables": ["blob", "other"],
        "blob": {
            "columns": [
                { "name": "id", "type": "integer" },
                { "name": "payload", "type": "blob128" }
            ]
        },
        "other": {
            "columns": [{ "name": "data", "type": "geometry" }]
        }
    }));

    match DdlGenerator::new().generate_ddl(&document) {
        Err(SchemagenError::TypeMapping(errors)) => {
            let columns: Vec<(&str, &str)> = errors
                .iter()
                .map(|e| (e.table.as_str(), e.column.as_str()))
                .collect();
            assert_eq!(columns, vec![("blob", "payload"), ("other", "data")]);
            assert_eq!(errors[0].declared, "blob128");
        }
        other => panic!("expected type mapping errors, got {:?}", other),
    }
}

#[test]
fn test_drop_and_upgrade_scripts() {
    let generator = DdlGenerator::new();
    let document = create_test_document();

    let drop = generator.generate_drop(&document).all_statements();
    assert_eq!(
        drop,
        vec![
            r#"DROP TABLE IF EXISTS "album";"#,
            r#"DROP INDEX IF EXISTS "album__name__idx";"#,
            r#"DROP TABLE IF EXISTS "content";"#,
            r#"DROP INDEX IF EXISTS "content__album_id__idx";"#,
            r#"DROP INDEX IF EXISTS "content__album_id__type__idx";"#,
        ]
    );

    let upgrade = generator.generate_upgrade(&document).unwrap();
    let create = generator.generate_ddl(&document).unwrap();
    assert_eq!(upgrade.statements.len(), drop.len() + create.statements.len());
    assert_eq!(upgrade.all_statements()[..drop.len()], drop[..]);
    assert_eq!(upgrade.statements[drop.len()..], create.statements[..]);
}

#[test]
fn test_display_joins_statements_by_line() {
    let ddl = DdlGenerator::new().generate_ddl(&create_test_document()).unwrap();
    let text = ddl.to_string();

    assert!(text.ends_with("ON \"content\" (\"album_id\", \"type\");\n"));
    assert_eq!(text.matches("CREATE TABLE").count(), 2);
    assert_eq!(text.matches("CREATE INDEX").count(), 2);
    assert_eq!(text.matches("CREATE UNIQUE INDEX").count(), 1);
}

#[test]
fn test_keyword_names_are_quoted() {
    let document = load(json!({
        "package": "p",
        "prefix": "P",
        "database": "p.db",
        "tables": ["group"],
        "group": {
            "columns": [{ "name": "order", "type": "integer" }],
            "indexes": [{ "columns": ["order"], "unique": false }]
        }
    }));
    let generator = DdlGenerator::new();

    assert_eq!(
        generator.generate_ddl(&document).unwrap().all_statements(),
        vec![
            "CREATE TABLE \"group\" (\n  \"order\" INTEGER\n);".to_string(),
            r#"CREATE INDEX "group__order__idx" ON "group" ("order");"#.to_string(),
        ]
    );
    assert_eq!(
        generator.generate_drop(&document).all_statements(),
        vec![
            r#"DROP TABLE IF EXISTS "group";"#,
            r#"DROP INDEX IF EXISTS "group__order__idx";"#,
        ]
    );
}

#[test]
fn test_quote_identifier_doubles_quotes() {
    assert_eq!(quote_identifier("album"), "\"album\"");
    assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
}
