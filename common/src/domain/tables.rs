//! Relational layout of the application, used for ddl generation.

/// Represents table in a database
#[derive(Debug)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKeyConstraint>,
    pub indexes: Vec<Index>,
}

/// Represents one column in the database table
#[derive(Debug)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub not_null: bool,
    pub unique: bool,
    pub primary_key: bool,
    pub default_value: Option<String>,
}

/// Represents Column types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigSerial,
    BigInt,
    BigIntArray,
    SmallInt,
    Integer,
    Text,
    Varchar(usize),
    Boolean,
    TimestampTZ,
    Jsonb,
}

impl ColumnType {
    pub fn sql(&self) -> String {
        match self {
            ColumnType::BigSerial => "BIGSERIAL".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::BigIntArray => "BIGINT[]".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Varchar(length) => format!("VARCHAR({})", length),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::TimestampTZ => "TIMESTAMPTZ".to_string(),
            ColumnType::Jsonb => "JSONB".to_string(),
        }
    }
}

/// Represents foreign key constraint in the database table
#[derive(Debug)]
pub struct ForeignKeyConstraint {
    pub table_name: String,
    pub column_name: String,
    pub referenced_table_name: String,
    pub referenced_column_name: String,
}

/// Represents an index in the database table
#[derive(Debug)]
pub struct Index {
    pub table_name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Table {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    fn id(self) -> Self {
        self.column(Column::primary_key("id", ColumnType::BigSerial))
    }

    fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    fn timestamps(self) -> Self {
        self.column(Column::new("created_at", ColumnType::TimestampTZ, true).default("now()"))
            .column(Column::new("updated_at", ColumnType::TimestampTZ, true).default("now()"))
    }

    fn references(mut self, column_name: &str, referenced_table_name: &str) -> Self {
        self.foreign_keys.push(ForeignKeyConstraint {
            table_name: self.name.clone(),
            column_name: column_name.to_string(),
            referenced_table_name: referenced_table_name.to_string(),
            referenced_column_name: "id".to_string(),
        });
        self
    }

    fn index(mut self, columns: &[&str], unique: bool) -> Self {
        self.indexes.push(Index {
            table_name: self.name.clone(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique,
        });
        self
    }

    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

impl Column {
    pub fn new(name: &str, column_type: ColumnType, not_null: bool) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            not_null,
            unique: false,
            primary_key: false,
            default_value: None,
        }
    }

    pub fn primary_key(name: &str, column_type: ColumnType) -> Self {
        Self {
            primary_key: true,
            ..Self::new(name, column_type, true)
        }
    }

    fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    fn default(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }
}

pub const USERS_TABLE: &str = "users";
pub const ROLES_TABLE: &str = "roles";
pub const ROLE_USER_TABLE: &str = "role_user";
pub const SESSIONS_TABLE: &str = "sessions";
pub const PUBLICATIONS_TABLE: &str = "publications";
pub const PUBLICATION_USER_TABLE: &str = "publication_user";
pub const STYLE_CRITERIAS_TABLE: &str = "style_criterias";
pub const SUBMISSIONS_TABLE: &str = "submissions";
pub const SUBMISSION_USER_TABLE: &str = "submission_user";
pub const SUBMISSION_CONTENTS_TABLE: &str = "submission_contents";
pub const COMMENTS_TABLE: &str = "comments";
pub const NOTIFICATIONS_TABLE: &str = "notifications";

/// All tables of the application, each one after the tables it references.
pub fn catalogue() -> Vec<Table> {
    use ColumnType::*;

    vec![
        Table::new(USERS_TABLE)
            .id()
            .column(Column::new("name", Text, false))
            .column(Column::new("username", Varchar(256), true).unique())
            .column(Column::new("email", Varchar(256), true).unique())
            .column(Column::new("password", Text, true))
            .column(Column::new("profile_metadata", Jsonb, true).default("'{}'::jsonb"))
            .column(Column::new("email_verified_at", TimestampTZ, false))
            .column(Column::new("staged", Boolean, true).default("false"))
            .timestamps(),
        Table::new(ROLES_TABLE)
            .column(Column::primary_key("id", SmallInt))
            .column(Column::new("name", Varchar(64), true).unique()),
        Table::new(ROLE_USER_TABLE)
            .column(Column::primary_key("user_id", BigInt))
            .column(Column::primary_key("role_id", SmallInt))
            .references("user_id", USERS_TABLE)
            .references("role_id", ROLES_TABLE),
        Table::new(SESSIONS_TABLE)
            .column(Column::primary_key("token", Varchar(64)))
            .column(Column::new("user_id", BigInt, true))
            .column(Column::new("created_at", TimestampTZ, true).default("now()"))
            .references("user_id", USERS_TABLE)
            .index(&["user_id"], false),
        Table::new(PUBLICATIONS_TABLE)
            .id()
            .column(Column::new("name", Varchar(256), true).unique())
            .column(Column::new("is_publicly_visible", Boolean, true).default("true"))
            .column(Column::new("is_accepting_submissions", Boolean, true).default("true"))
            .timestamps(),
        Table::new(PUBLICATION_USER_TABLE)
            .id()
            .column(Column::new("publication_id", BigInt, true))
            .column(Column::new("user_id", BigInt, true))
            .column(Column::new("role_id", SmallInt, true))
            .references("publication_id", PUBLICATIONS_TABLE)
            .references("user_id", USERS_TABLE)
            .index(&["publication_id", "user_id", "role_id"], true)
            .timestamps(),
        Table::new(STYLE_CRITERIAS_TABLE)
            .id()
            .column(Column::new("publication_id", BigInt, true))
            .column(Column::new("name", Varchar(20), true))
            .column(Column::new("description", Text, false))
            .column(Column::new("icon", Varchar(64), false))
            .references("publication_id", PUBLICATIONS_TABLE)
            .timestamps(),
        Table::new(SUBMISSIONS_TABLE)
            .id()
            .column(Column::new("title", Varchar(512), true))
            .column(Column::new("publication_id", BigInt, true))
            .column(Column::new("status", SmallInt, true).default("0"))
            .column(Column::new("status_change_comment", Text, false))
            .column(Column::new("content_id", BigInt, false))
            .column(Column::new("created_by", BigInt, true))
            .column(Column::new("updated_by", BigInt, true))
            .references("publication_id", PUBLICATIONS_TABLE)
            .timestamps(),
        // several rows per (submission, user) pair are allowed
        Table::new(SUBMISSION_USER_TABLE)
            .id()
            .column(Column::new("submission_id", BigInt, true))
            .column(Column::new("user_id", BigInt, true))
            .column(Column::new("role_id", SmallInt, true))
            .references("submission_id", SUBMISSIONS_TABLE)
            .references("user_id", USERS_TABLE)
            .index(&["user_id"], false)
            .timestamps(),
        Table::new(SUBMISSION_CONTENTS_TABLE)
            .id()
            .column(Column::new("submission_id", BigInt, true))
            .column(Column::new("data", Text, true))
            .column(Column::new("created_at", TimestampTZ, true).default("now()"))
            .references("submission_id", SUBMISSIONS_TABLE)
            .index(&["submission_id"], false),
        Table::new(COMMENTS_TABLE)
            .id()
            .column(Column::new("submission_id", BigInt, true))
            .column(Column::new("kind", SmallInt, true))
            .column(Column::new("content", Text, true))
            .column(Column::new("from_offset", Integer, false))
            .column(Column::new("to_offset", Integer, false))
            .column(Column::new("style_criteria", BigIntArray, true).default("'{}'"))
            .column(Column::new("parent_id", BigInt, false))
            .column(Column::new("reply_to_id", BigInt, false))
            .column(Column::new("created_by", BigInt, true))
            .column(Column::new("updated_by", BigInt, true))
            .column(Column::new("deleted_at", TimestampTZ, false))
            .references("submission_id", SUBMISSIONS_TABLE)
            .references("created_by", USERS_TABLE)
            .index(&["submission_id"], false)
            .timestamps(),
        Table::new(NOTIFICATIONS_TABLE)
            .id()
            .column(Column::new("user_id", BigInt, true))
            .column(Column::new("kind", Varchar(64), true))
            .column(Column::new("data", Jsonb, true))
            .column(Column::new("read_at", TimestampTZ, false))
            .column(Column::new("created_at", TimestampTZ, true).default("now()"))
            .references("user_id", USERS_TABLE)
            .index(&["user_id"], false),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn references_point_backwards() {
        let mut seen = HashSet::new();
        for table in catalogue() {
            for fk in table.foreign_keys.iter() {
                assert!(
                    seen.contains(&fk.referenced_table_name) || fk.referenced_table_name == table.name,
                    "{} references {} before it exists",
                    table.name,
                    fk.referenced_table_name
                );
            }
            seen.insert(table.name.clone());
        }
    }

    #[test]
    fn every_table_has_a_primary_key() {
        for table in catalogue() {
            assert!(!table.primary_key_columns().is_empty(), "{}", table.name);
        }
    }

    #[test]
    fn role_user_has_composite_key() {
        let tables = catalogue();
        let role_user = tables.iter().find(|t| t.name == ROLE_USER_TABLE).unwrap();
        assert_eq!(role_user.primary_key_columns(), vec!["user_id", "role_id"]);
    }
}
