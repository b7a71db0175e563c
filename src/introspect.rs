//! Catalog introspection: reads table, constraint and column metadata from
//! `information_schema` and turns it into [`Table`] objects.

use crate::ir::{self, Column, ColumnType, ForeignKey, OrmTag, Table};
use crate::types::{self, GoScalar, TypeMap};
use anyhow::{Context, Result};
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::Row;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    Other,
}

impl ConstraintKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "PRIMARY KEY" => ConstraintKind::PrimaryKey,
            "UNIQUE" => ConstraintKind::Unique,
            "FOREIGN KEY" => ConstraintKind::ForeignKey,
            _ => ConstraintKind::Other,
        }
    }
}

/// One row of `table_constraints` joined with `key_column_usage`.
#[derive(Debug, Clone)]
pub struct ConstraintRow {
    pub kind: ConstraintKind,
    pub column: String,
    pub ref_schema: String,
    pub ref_table: String,
    pub ref_column: String,
    pub ordinal: u32,
}

impl ConstraintRow {
    pub fn primary_key(column: &str) -> Self {
        ConstraintRow {
            kind: ConstraintKind::PrimaryKey,
            column: column.to_string(),
            ref_schema: String::new(),
            ref_table: String::new(),
            ref_column: String::new(),
            ordinal: 1,
        }
    }

    pub fn foreign_key(column: &str, ref_table: &str, ref_column: &str) -> Self {
        ConstraintRow {
            kind: ConstraintKind::ForeignKey,
            ref_table: ref_table.to_string(),
            ref_column: ref_column.to_string(),
            ..Self::primary_key(column)
        }
    }
}

/// One row of `information_schema.columns`.
#[derive(Debug, Clone, Default)]
pub struct ColumnRow {
    pub name: String,
    pub data_type: String,
    pub column_type: String,
    pub nullable: bool,
    pub default: String,
    pub extra: String,
    pub comment: String,
}

impl ColumnRow {
    /// Shorthand for a column whose full type equals its data type.
    pub fn new(name: &str, data_type: &str) -> Self {
        ColumnRow {
            name: name.to_string(),
            data_type: data_type.to_string(),
            column_type: data_type.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogTable {
    pub name: String,
    pub comment: String,
    pub constraints: Vec<ConstraintRow>,
    pub columns: Vec<ColumnRow>,
}

impl CatalogTable {
    pub fn new(name: &str) -> Self {
        CatalogTable {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_constraint(mut self, row: ConstraintRow) -> Self {
        self.constraints.push(row);
        self
    }

    pub fn with_column(mut self, row: ColumnRow) -> Self {
        self.columns.push(row);
        self
    }
}

/// Raw catalog metadata in discovery order.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub tables: Vec<CatalogTable>,
}

/// Catalog reader over a live MySQL connection. Only issues queries against
/// `information_schema`; values are cast to text so NULLs and binary
/// collations decode uniformly.
pub struct MysqlCatalog {
    pool: MySqlPool,
}

fn text(row: &MySqlRow, idx: usize) -> Result<String> {
    let v: Option<String> = row
        .try_get(idx)
        .with_context(|| format!("could not read catalog column {}", idx))?;
    Ok(v.unwrap_or_default())
}

impl MysqlCatalog {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(url)
            .await
            .with_context(|| format!("could not connect to mysql database '{}'", url))?;
        Ok(MysqlCatalog { pool })
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        MysqlCatalog { pool }
    }

    pub async fn table_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT CAST(table_name AS CHAR) FROM information_schema.tables \
             WHERE table_schema = database() ORDER BY table_name",
        )
        .fetch_all(&self.pool)
        .await
        .context("could not show tables")?;
        rows.iter().map(|r| text(r, 0)).collect()
    }

    pub async fn table_comment(&self, table: &str) -> Result<String> {
        let row = sqlx::query(
            "SELECT CAST(table_comment AS CHAR) FROM information_schema.tables \
             WHERE table_name = ? AND table_schema = database()",
        )
        .bind(table)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("could not query table comment of '{}'", table))?;
        match row {
            Some(r) => text(&r, 0),
            None => Ok(String::new()),
        }
    }

    pub async fn constraints(&self, table: &str) -> Result<Vec<ConstraintRow>> {
        let rows = sqlx::query(
            "SELECT CAST(c.constraint_type AS CHAR), CAST(u.column_name AS CHAR), \
             CAST(u.referenced_table_schema AS CHAR), CAST(u.referenced_table_name AS CHAR), \
             CAST(u.referenced_column_name AS CHAR), CAST(u.ordinal_position AS CHAR) \
             FROM information_schema.table_constraints c \
             INNER JOIN information_schema.key_column_usage u \
             ON c.constraint_name = u.constraint_name AND c.table_name = u.table_name \
             WHERE c.table_schema = database() AND c.table_name = ? \
             AND u.table_schema = database() AND u.table_name = ? \
             ORDER BY c.constraint_name, u.ordinal_position",
        )
        .bind(table)
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("could not query PK/UK/FK information of '{}'", table))?;

        let mut out = Vec::with_capacity(rows.len());
        for r in &rows {
            out.push(ConstraintRow {
                kind: ConstraintKind::parse(&text(r, 0)?),
                column: text(r, 1)?,
                ref_schema: text(r, 2)?,
                ref_table: text(r, 3)?,
                ref_column: text(r, 4)?,
                ordinal: text(r, 5)?.parse().unwrap_or(0),
            });
        }
        Ok(out)
    }

    pub async fn columns(&self, table: &str) -> Result<Vec<ColumnRow>> {
        let rows = sqlx::query(
            "SELECT CAST(column_name AS CHAR), CAST(data_type AS CHAR), CAST(column_type AS CHAR), \
             CAST(is_nullable AS CHAR), CAST(column_default AS CHAR), CAST(extra AS CHAR), \
             CAST(column_comment AS CHAR) \
             FROM information_schema.columns \
             WHERE table_schema = database() AND table_name = ? \
             ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("could not query column information of '{}'", table))?;

        let mut out = Vec::with_capacity(rows.len());
        for r in &rows {
            out.push(ColumnRow {
                name: text(r, 0)?,
                data_type: text(r, 1)?.to_lowercase(),
                column_type: text(r, 2)?.to_lowercase(),
                nullable: text(r, 3)? == "YES",
                default: text(r, 4)?,
                extra: text(r, 5)?,
                comment: text(r, 6)?,
            });
        }
        Ok(out)
    }

    /// Read the whole catalog of the current database.
    pub async fn snapshot(&self) -> Result<CatalogSnapshot> {
        info!("Analyzing database tables...");
        let mut snapshot = CatalogSnapshot::default();
        for name in self.table_names().await? {
            let comment = self.table_comment(&name).await?;
            let constraints = self.constraints(&name).await?;
            let columns = self.columns(&name).await?;
            debug!(table = %name, columns = columns.len(), "read table metadata");
            snapshot.tables.push(CatalogTable {
                name,
                comment,
                constraints,
                columns,
            });
        }
        Ok(snapshot)
    }
}

/// Fill primary, unique and foreign keys. Tables without exactly one primary
/// key column go on the blacklist so no other struct references them.
fn apply_constraints(table: &mut Table, rows: &[ConstraintRow], blacklist: &mut HashSet<String>) {
    let pk_cols: Vec<&ConstraintRow> = rows
        .iter()
        .filter(|r| r.kind == ConstraintKind::PrimaryKey)
        .collect();
    if pk_cols.len() == 1 {
        table.pk = pk_cols[0].column.clone();
    } else {
        table.pk.clear();
        blacklist.insert(table.name.clone());
    }

    for row in rows {
        match row.kind {
            ConstraintKind::Unique => table.uk.push(row.column.clone()),
            ConstraintKind::ForeignKey => {
                table.fk.insert(
                    row.column.clone(),
                    ForeignKey {
                        name: row.column.clone(),
                        ref_schema: row.ref_schema.clone(),
                        ref_table: row.ref_table.clone(),
                        ref_column: row.ref_column.clone(),
                    },
                );
            }
            ConstraintKind::PrimaryKey | ConstraintKind::Other => {}
        }
    }
}

fn build_column(
    table: &mut Table,
    row: &ColumnRow,
    type_map: &TypeMap,
    blacklist: &HashSet<String>,
) -> Result<Column> {
    let mut ty = ColumnType::Scalar(type_map.lookup(&row.data_type)?);
    let mut name = ir::pascal_case(&row.name);
    let mut tag = OrmTag {
        column: row.name.clone(),
        comment: row.comment.clone(),
        default: row.default.clone(),
        ..Default::default()
    };

    let fk_target = table
        .fk
        .get(&row.name)
        .filter(|fk| !blacklist.contains(&fk.ref_table))
        .map(|fk| fk.ref_table.clone());

    if table.pk == row.name {
        name = "Id".to_string();
        ty = ColumnType::Scalar(GoScalar::Int);
        tag.pk = true;
        tag.auto = row.extra == "auto_increment";
    } else if let Some(ref_table) = fk_target {
        tag.rel_fk = true;
        ty = ColumnType::Ref(ir::pascal_case(&ref_table));
    } else {
        if row.name == "id" {
            name = "Id_RENAME".to_string();
        }
        tag.null = row.nullable;
        if types::is_signed_int(&row.data_type)
            && types::int_signedness(&row.column_type).contains("unsigned")
            && row.extra != "auto_increment"
        {
            ty = ColumnType::Scalar(type_map.lookup(&format!("{} unsigned", row.data_type))?);
        }
        if types::is_string(&row.data_type)
            || types::is_binary(&row.data_type)
            || types::is_bit(&row.data_type)
        {
            tag.size = types::column_size(&row.column_type).unwrap_or_default();
        }
        if types::is_temporal(&row.data_type) {
            tag.sql_type = row.data_type.clone();
            if row.default == "CURRENT_TIMESTAMP" && row.extra == "on update CURRENT_TIMESTAMP" {
                tag.auto_now = true;
            } else if row.default == "CURRENT_TIMESTAMP" {
                tag.auto_now_add = true;
            }
            table.import_time_pkg = true;
        }
        if types::is_decimal(&row.data_type) {
            if let Some((digits, decimals)) = types::decimal_parts(&row.column_type) {
                tag.digits = digits;
                tag.decimals = decimals;
            }
        }
    }

    Ok(Column {
        name,
        ty,
        is_need: true,
        tag,
    })
}

/// Turn catalog metadata into tables with typed columns. Relation inference
/// runs afterwards over the returned tables.
pub fn build_tables(snapshot: &CatalogSnapshot, type_map: &TypeMap) -> Result<Vec<Table>> {
    let mut blacklist = HashSet::new();
    let mut tables = Vec::with_capacity(snapshot.tables.len());
    for raw in &snapshot.tables {
        let mut table = Table::new(raw.name.clone());
        table.comment = raw.comment.clone();
        apply_constraints(&mut table, &raw.constraints, &mut blacklist);
        tables.push(table);
    }

    for (table, raw) in tables.iter_mut().zip(&snapshot.tables) {
        for row in &raw.columns {
            let col = build_column(table, row, type_map, &blacklist)
                .with_context(|| format!("table '{}', column '{}'", raw.name, row.name))?;
            table.columns.push(col);
        }
    }

    if !blacklist.is_empty() {
        let mut weak: Vec<_> = blacklist.into_iter().collect();
        weak.sort();
        debug!(tables = ?weak, "tables without a single-column primary key");
    }
    Ok(tables)
}
