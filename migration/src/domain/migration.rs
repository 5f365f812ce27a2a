use std::collections::HashSet;

use folio_common::Role;
use folio_common::tables::{Column, ForeignKeyConstraint, Index, ROLES_TABLE, Table, catalogue};

use crate::domain::persistence::Persistence;

/// A group of statements applied in one transaction.
#[derive(Debug)]
pub struct MigrationStep {
    pub ctx: &'static str,
    pub ddls: Vec<String>,
}

impl MigrationStep {
    fn create_table(database_schema: &str, table: &Table) -> Self {
        Self {
            ctx: "CREATE TABLE",
            ddls: create_table_ddl(database_schema, table),
        }
    }

    // role ids are stable, rows that already exist are left alone
    fn seed_roles(database_schema: &str) -> Self {
        let values = Role::ALL
            .iter()
            .map(|role| format!("({}, '{}')", role.id(), role.name()))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            ctx: "SEED ROLES",
            ddls: vec![format!(
                "INSERT INTO \"{}\".\"{}\" (\"id\", \"name\") VALUES {} ON CONFLICT (\"id\") DO NOTHING",
                database_schema, ROLES_TABLE, values
            )],
        }
    }
}

pub struct Migration<P: Persistence> {
    persistence: P,
}

impl<P: Persistence> Migration<P> {
    pub fn new(persistence: P) -> Self {
        Self { persistence }
    }

    pub async fn migrate(&self) -> Result<(), anyhow::Error> {
        let actual_schema = self.persistence.load().await?;
        let steps = migration_steps(self.persistence.database_schema(), &actual_schema);
        tracing::info!("applying {} migration steps", steps.len());
        self.persistence.apply_migration_steps(steps).await
    }
}

pub fn migration_steps(database_schema: &str, actual_schema: &HashSet<String>) -> Vec<MigrationStep> {
    let mut result: Vec<MigrationStep> = catalogue()
        .iter()
        .filter(|table| !actual_schema.contains(&table.name))
        .map(|table| MigrationStep::create_table(database_schema, table))
        .collect();

    result.push(MigrationStep::seed_roles(database_schema));
    result
}

fn create_table_ddl(schema: &str, table: &Table) -> Vec<String> {
    let columns: Vec<String> = table.columns.iter().map(column_ddl).collect();

    let columns_sql = columns.join(",\n    ");
    let pk_columns_sql = table
        .primary_key_columns()
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(",");

    let table_ddl = format!(
        "CREATE TABLE \"{}\".\"{}\" (\n    {},\n    PRIMARY KEY({})\n)",
        schema, table.name, columns_sql, pk_columns_sql
    );

    let mut ddls = vec![table_ddl];

    for fk in table.foreign_keys.iter() {
        ddls.push(create_fk_ddl(schema, fk));
    }

    for index in table.indexes.iter() {
        ddls.push(create_index_ddl(schema, index));
    }

    ddls
}

fn column_ddl(column: &Column) -> String {
    let mut sql = format!("\"{}\" {}", column.name, column.column_type.sql());
    if column.not_null {
        sql.push_str(" NOT NULL");
    }
    if let Some(default_value) = &column.default_value {
        sql.push_str(format!(" DEFAULT {}", default_value).as_str());
    }
    if column.unique {
        sql.push_str(" UNIQUE");
    }
    sql
}

fn create_fk_ddl(schema: &str, fk: &ForeignKeyConstraint) -> String {
    format!(
        "ALTER TABLE \"{}\".\"{}\" ADD CONSTRAINT \"{}_{}_fkey\" FOREIGN KEY (\"{}\") REFERENCES \"{}\".\"{}\" (\"{}\") ON DELETE CASCADE",
        schema,
        fk.table_name,
        fk.table_name,
        fk.column_name,
        fk.column_name,
        schema,
        fk.referenced_table_name,
        fk.referenced_column_name
    )
}

fn create_index_ddl(schema: &str, index: &Index) -> String {
    let columns_sql = index
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE {}INDEX \"{}_{}_idx\" ON \"{}\".\"{}\" ({})",
        if index.unique { "UNIQUE " } else { "" },
        index.table_name,
        index.columns.join("_"),
        schema,
        index.table_name,
        columns_sql
    )
}
