use super::{FormStore, FormWriter, StoreError};
use form_common::model::field_type::FieldType;
use form_common::model::form::{FieldDefinition, FieldOption, Form, StoredResponse};
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Row, Transaction};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Every table created by the schema.
pub const TABLES: [&str; 5] = [
    "forms",
    "form_fields",
    "field_options",
    "field_responses",
    "response_options",
];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS forms (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    owner_id      TEXT NOT NULL,
    created_at_ms INTEGER NOT NULL,
    updated_at_ms INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS forms_owner ON forms(owner_id);

CREATE TABLE IF NOT EXISTS form_fields (
    id         TEXT PRIMARY KEY,
    form_id    TEXT NOT NULL REFERENCES forms(id),
    position   INTEGER NOT NULL,
    text       TEXT NOT NULL,
    field_type TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS form_fields_form ON form_fields(form_id);

CREATE TABLE IF NOT EXISTS field_options (
    id       TEXT PRIMARY KEY,
    field_id TEXT NOT NULL REFERENCES form_fields(id),
    position INTEGER NOT NULL,
    text     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS field_options_field ON field_options(field_id);

CREATE TABLE IF NOT EXISTS field_responses (
    id            TEXT PRIMARY KEY,
    field_id      TEXT NOT NULL REFERENCES form_fields(id),
    user_id       TEXT NOT NULL,
    value         TEXT,
    updated_at_ms INTEGER NOT NULL,
    UNIQUE (field_id, user_id)
);

CREATE TABLE IF NOT EXISTS response_options (
    response_id TEXT NOT NULL REFERENCES field_responses(id),
    option_id   TEXT NOT NULL REFERENCES field_options(id),
    PRIMARY KEY (response_id, option_id)
);
"#;

/// SQLite implementation of the storage port.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Number of rows in `table`. Only used to assert cascades in tests;
    /// `table` must be one of [`TABLES`].
    pub fn count_rows(&self, table: &str) -> Result<i64, StoreError> {
        let Some(table) = TABLES.iter().find(|known| **known == table) else {
            return Err(StoreError::UnknownTable(table.to_string()));
        };
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }
}

fn form_from_row(row: &Row<'_>) -> rusqlite::Result<Form> {
    Ok(Form {
        id: row.get(0)?,
        name: row.get(1)?,
        owner_id: row.get(2)?,
        created_at_ms: row.get(3)?,
        updated_at_ms: row.get(4)?,
    })
}

impl FormStore for SqliteStore {
    fn list_forms(&self, owner_id: &str) -> Result<Vec<Form>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, owner_id, created_at_ms, updated_at_ms FROM forms \
             WHERE owner_id = ?1 ORDER BY updated_at_ms DESC, created_at_ms DESC",
        )?;
        let forms = stmt
            .query_map(params![owner_id], form_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(forms)
    }

    fn find_form(&self, form_id: &str) -> Result<Option<Form>, StoreError> {
        let form = self
            .conn
            .query_row(
                "SELECT id, name, owner_id, created_at_ms, updated_at_ms FROM forms WHERE id = ?1",
                params![form_id],
                form_from_row,
            )
            .optional()?;
        Ok(form)
    }

    fn find_fields(&self, form_id: &str) -> Result<Vec<FieldDefinition>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, form_id, position, text, field_type FROM form_fields \
             WHERE form_id = ?1 ORDER BY position",
        )?;
        let rows = stmt
            .query_map(params![form_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut fields = rows
            .into_iter()
            .map(|(id, form_id, position, text, tag)| {
                let field_type = tag
                    .parse::<FieldType>()
                    .map_err(|e| StoreError::Corrupt(format!("field {}: {}", id, e)))?;
                Ok(FieldDefinition {
                    id,
                    form_id,
                    position,
                    text,
                    field_type,
                    options: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let mut opt_stmt = self.conn.prepare(
            "SELECT o.id, o.field_id, o.position, o.text FROM field_options o \
             JOIN form_fields f ON f.id = o.field_id \
             WHERE f.form_id = ?1 ORDER BY o.position",
        )?;
        let options = opt_stmt
            .query_map(params![form_id], |row| {
                Ok(FieldOption {
                    id: row.get(0)?,
                    field_id: row.get(1)?,
                    position: row.get(2)?,
                    text: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for option in options {
            if let Some(field) = fields.iter_mut().find(|f| f.id == option.field_id) {
                field.options.push(option);
            }
        }
        Ok(fields)
    }

    fn find_responses(
        &self,
        form_id: &str,
        user_id: &str,
    ) -> Result<Vec<StoredResponse>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT r.id, r.field_id, r.user_id, r.value, r.updated_at_ms FROM field_responses r \
             JOIN form_fields f ON f.id = r.field_id \
             WHERE f.form_id = ?1 AND r.user_id = ?2 ORDER BY f.position",
        )?;
        let mut responses = stmt
            .query_map(params![form_id, user_id], |row| {
                Ok(StoredResponse {
                    id: row.get(0)?,
                    field_id: row.get(1)?,
                    user_id: row.get(2)?,
                    value: row.get(3)?,
                    option_ids: Vec::new(),
                    updated_at_ms: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut link_stmt = self.conn.prepare(
            "SELECT ro.response_id, ro.option_id FROM response_options ro \
             JOIN field_responses r ON r.id = ro.response_id \
             JOIN form_fields f ON f.id = r.field_id \
             JOIN field_options o ON o.id = ro.option_id \
             WHERE f.form_id = ?1 AND r.user_id = ?2 ORDER BY o.position",
        )?;
        let mut links: HashMap<String, Vec<String>> = HashMap::new();
        let rows = link_stmt.query_map(params![form_id, user_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (response_id, option_id) = row?;
            links.entry(response_id).or_default().push(option_id);
        }

        for response in &mut responses {
            if let Some(option_ids) = links.remove(&response.id) {
                response.option_ids = option_ids;
            }
        }
        Ok(responses)
    }

    fn write<T, E>(
        &mut self,
        work: impl FnOnce(&mut dyn FormWriter) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let tx = self.conn.transaction().map_err(StoreError::from)?;
        let mut writer = SqliteWriter { tx };
        let out = work(&mut writer as &mut dyn FormWriter)?;
        writer.tx.commit().map_err(StoreError::from)?;
        Ok(out)
    }
}

/// Writes issued through one open transaction. Dropped without commit, it
/// rolls back.
struct SqliteWriter<'conn> {
    tx: Transaction<'conn>,
}

fn map_unique_violation(err: rusqlite::Error, what: &'static str) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && (failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY) =>
        {
            StoreError::Conflict(what)
        }
        other => StoreError::Sql(other),
    }
}

impl SqliteWriter<'_> {
    fn link_options(&self, response_id: &str, option_ids: &[String]) -> Result<(), StoreError> {
        let mut stmt = self
            .tx
            .prepare("INSERT INTO response_options (response_id, option_id) VALUES (?1, ?2)")?;
        for option_id in option_ids {
            stmt.execute(params![response_id, option_id])
                .map_err(|e| map_unique_violation(e, "option selected twice"))?;
        }
        Ok(())
    }
}

impl FormWriter for SqliteWriter<'_> {
    fn insert_form(&mut self, form: &Form) -> Result<(), StoreError> {
        self.tx
            .execute(
                "INSERT INTO forms (id, name, owner_id, created_at_ms, updated_at_ms) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    form.id,
                    form.name,
                    form.owner_id,
                    form.created_at_ms,
                    form.updated_at_ms
                ],
            )
            .map_err(|e| map_unique_violation(e, "form already exists"))?;
        Ok(())
    }

    fn insert_field(&mut self, field: &FieldDefinition) -> Result<(), StoreError> {
        self.tx.execute(
            "INSERT INTO form_fields (id, form_id, position, text, field_type) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                field.id,
                field.form_id,
                field.position,
                field.text,
                field.field_type.as_str()
            ],
        )?;
        Ok(())
    }

    fn insert_option(&mut self, option: &FieldOption) -> Result<(), StoreError> {
        self.tx.execute(
            "INSERT INTO field_options (id, field_id, position, text) VALUES (?1, ?2, ?3, ?4)",
            params![option.id, option.field_id, option.position, option.text],
        )?;
        Ok(())
    }

    fn insert_response(&mut self, response: &StoredResponse) -> Result<(), StoreError> {
        self.tx
            .execute(
                "INSERT INTO field_responses (id, field_id, user_id, value, updated_at_ms) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    response.id,
                    response.field_id,
                    response.user_id,
                    response.value,
                    response.updated_at_ms
                ],
            )
            .map_err(|e| map_unique_violation(e, "response already exists for this field and user"))?;
        self.link_options(&response.id, &response.option_ids)
    }

    fn update_response_value(
        &mut self,
        response_id: &str,
        value: &str,
        updated_at_ms: i64,
    ) -> Result<(), StoreError> {
        let changed = self.tx.execute(
            "UPDATE field_responses SET value = ?1, updated_at_ms = ?2 WHERE id = ?3",
            params![value, updated_at_ms, response_id],
        )?;
        if changed == 0 {
            return Err(StoreError::Conflict("response no longer exists"));
        }
        Ok(())
    }

    fn replace_response_options(
        &mut self,
        response_id: &str,
        option_ids: &[String],
        updated_at_ms: i64,
    ) -> Result<(), StoreError> {
        let changed = self.tx.execute(
            "UPDATE field_responses SET value = NULL, updated_at_ms = ?1 WHERE id = ?2",
            params![updated_at_ms, response_id],
        )?;
        if changed == 0 {
            return Err(StoreError::Conflict("response no longer exists"));
        }
        self.tx.execute(
            "DELETE FROM response_options WHERE response_id = ?1",
            params![response_id],
        )?;
        self.link_options(response_id, option_ids)
    }

    fn touch_form(&mut self, form_id: &str, updated_at_ms: i64) -> Result<(), StoreError> {
        let changed = self.tx.execute(
            "UPDATE forms SET updated_at_ms = ?1 WHERE id = ?2",
            params![updated_at_ms, form_id],
        )?;
        if changed == 0 {
            return Err(StoreError::Conflict("form no longer exists"));
        }
        Ok(())
    }

    fn delete_responses_for_form(&mut self, form_id: &str) -> Result<usize, StoreError> {
        self.tx.execute(
            "DELETE FROM response_options WHERE response_id IN ( \
                 SELECT r.id FROM field_responses r \
                 JOIN form_fields f ON f.id = r.field_id WHERE f.form_id = ?1)",
            params![form_id],
        )?;
        let removed = self.tx.execute(
            "DELETE FROM field_responses WHERE field_id IN ( \
                 SELECT id FROM form_fields WHERE form_id = ?1)",
            params![form_id],
        )?;
        Ok(removed)
    }

    fn delete_options_for_form(&mut self, form_id: &str) -> Result<usize, StoreError> {
        let removed = self.tx.execute(
            "DELETE FROM field_options WHERE field_id IN ( \
                 SELECT id FROM form_fields WHERE form_id = ?1)",
            params![form_id],
        )?;
        Ok(removed)
    }

    fn delete_fields_for_form(&mut self, form_id: &str) -> Result<usize, StoreError> {
        let removed = self
            .tx
            .execute("DELETE FROM form_fields WHERE form_id = ?1", params![form_id])?;
        Ok(removed)
    }

    fn delete_form(&mut self, form_id: &str) -> Result<usize, StoreError> {
        let removed = self
            .tx
            .execute("DELETE FROM forms WHERE id = ?1", params![form_id])?;
        Ok(removed)
    }
}
