// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Lint, build and test orchestration for the Clark workspace.
//!
//! - `cargo xtask ci` runs every check the pipeline runs
//! - `cargo xtask verify-migrations` applies the `SQLite` migrations to an
//!   in-memory database, checks the resulting schema and reverts it again

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{io, process::Output};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run every check the pipeline runs
    CI,

    /// Build every workspace target
    #[command(visible_alias = "b")]
    Build,

    /// Check dependency licenses and advisories
    #[command(visible_alias = "cd")]
    Deny,

    /// Check for unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Run clippy, rustdoc and rustfmt checks
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy with warnings denied
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Build the docs of every workspace crate with warnings denied
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check formatting
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Apply formatting
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run every test, doc tests included
    #[command(visible_alias = "t")]
    Test,

    /// Verify the `SQLite` migrations apply, produce the expected schema and revert
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => run_cargo(vec!["build", "--workspace", "--all-targets"]),
            Self::Deny => run_cargo(vec!["deny", "check"]),
            Self::Machete => machete(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => run_cargo(vec!["fmt", "--all", "--check"]),
            Self::FixFormatting => run_cargo(vec!["fmt", "--all"]),
            Self::Test => run_cargo(vec!["test", "--workspace"]),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Lint, audit dependencies, build, test and verify the migrations
fn ci() -> Result<()> {
    for step in [
        Command::Lint,
        Command::Deny,
        Command::Machete,
        Command::Build,
        Command::Test,
        Command::VerifyMigrations,
    ] {
        tracing::info!("ci step: {step:?}");
        step.run()?;
    }
    Ok(())
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    run_cargo(vec!["fmt", "--all", "--check"])
}

fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--workspace",
        "--all-targets",
        "--",
        "-D",
        "warnings",
    ])
}

/// Documents each `clark*` crate on its own so a broken intra-doc link names
/// the crate it lives in
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_packages() {
        if !package.name.starts_with("clark") {
            continue;
        }
        cmd("cargo", ["doc", "--no-deps", "--package", &package.name])
            .env("RUSTDOCFLAGS", "-D warnings")
            .run_with_trace()?;
    }

    Ok(())
}

fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Tables the migrations must create.
const EXPECTED_TABLES: [&str; 13] = [
    "async_job_logs",
    "audit_events",
    "contracts",
    "documents",
    "inquiries",
    "inquiry_categories",
    "interactions",
    "notifications",
    "offer_options",
    "offers",
    "opportunities",
    "payback_accounts",
    "payback_transactions",
];

/// Verify the `SQLite` migrations
///
/// ## What This Command Does
///
/// 1. Applies every migration in `crates/persistence/migrations` to an
///    in-memory `SQLite` database with foreign keys enabled
/// 2. Introspects the resulting schema (tables, columns, constraints)
/// 3. Checks the tables, the uniqueness rules the engine relies on, and
///    that every foreign key points at an existing table and column
/// 4. Reverts every migration and checks that no table is left behind
///
/// ## Usage
///
/// ```bash
/// cargo xtask verify-migrations
/// ```
///
/// ## Failures
///
/// The command fails if a migration does not apply or revert, or if the
/// schema does not match.
fn verify_migrations() -> Result<()> {
    use diesel::Connection;
    use diesel_migrations::{embed_migrations, MigrationHarness};

    const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
        embed_migrations!("../crates/persistence/migrations");

    tracing::info!("Starting migration verification");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to apply SQLite migrations: {}", e))?;
    tracing::info!("SQLite migrations applied successfully");

    let schema = introspect_sqlite_schema(&mut conn)?;
    check_schema(&schema)?;

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to revert SQLite migrations: {}", e))?;
    let reverted = introspect_sqlite_schema(&mut conn)?;
    if !reverted.tables.is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "Tables left after reverting migrations: {:?}",
            reverted.tables.keys().collect::<Vec<_>>()
        ));
    }

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique_constraints: BTreeSet<UniqueConstraint>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    name: String,
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UniqueConstraint {
    columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    name: String,
    columns: Vec<String>,
}

/// Introspect `SQLite` schema
#[allow(clippy::too_many_lines)]
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            unique_constraints: BTreeSet::new(),
            indexes: BTreeSet::new(),
        };

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            let normalized_type = normalize_sqlite_type(&col.r#type);
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    name: col.name.clone(),
                    normalized_type,
                    nullable: col.notnull == 0,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            let column_names: Vec<String> = index_columns.into_iter().map(|c| c.name).collect();

            // origin 'u' marks a UNIQUE constraint, including sqlite_autoindex_*
            if idx.origin == "u" {
                table_info.unique_constraints.insert(UniqueConstraint {
                    columns: column_names,
                });
            } else if !idx.name.starts_with("sqlite_autoindex_") {
                table_info.indexes.insert(Index {
                    name: idx.name,
                    columns: column_names,
                });
            }
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string()
    }
}

/// Check the introspected schema and fail on the first violation
fn check_schema(schema: &Schema) -> Result<()> {
    let actual: BTreeSet<&str> = schema.tables.keys().map(String::as_str).collect();
    let expected: BTreeSet<&str> = EXPECTED_TABLES.into_iter().collect();
    if actual != expected {
        return Err(color_eyre::eyre::eyre!(
            "Table mismatch. Missing: {:?}, unexpected: {:?}",
            expected.difference(&actual).collect::<Vec<_>>(),
            actual.difference(&expected).collect::<Vec<_>>()
        ));
    }

    require_unique(schema, "documents", &["contract_id", "checksum"])?;
    require_unique(schema, "payback_accounts", &["payback_number"])?;

    for (name, table) in &schema.tables {
        if table.primary_keys.is_empty() {
            return Err(color_eyre::eyre::eyre!("Table {} has no primary key", name));
        }
        for fk in &table.foreign_keys {
            let target_exists = schema
                .tables
                .get(&fk.to_table)
                .is_some_and(|target| target.columns.contains_key(&fk.to_column));
            if !target_exists {
                return Err(color_eyre::eyre::eyre!(
                    "Foreign key {}.{} references missing {}.{}",
                    name,
                    fk.from_column,
                    fk.to_table,
                    fk.to_column
                ));
            }
            let nullable = table
                .columns
                .get(&fk.from_column)
                .is_none_or(|column| column.nullable);
            if nullable {
                return Err(color_eyre::eyre::eyre!(
                    "Foreign key column {}.{} must be NOT NULL",
                    name,
                    fk.from_column
                ));
            }
        }
        tracing::debug!(
            "{}: {} columns, {} indexes",
            name,
            table.columns.len(),
            table.indexes.len()
        );
    }

    Ok(())
}

/// Fail unless `table` carries a UNIQUE constraint over exactly `columns`
fn require_unique(schema: &Schema, table: &str, columns: &[&str]) -> Result<()> {
    let wanted = UniqueConstraint {
        columns: columns.iter().map(ToString::to_string).collect(),
    };
    let present = schema
        .tables
        .get(table)
        .is_some_and(|t| t.unique_constraints.contains(&wanted));
    if present {
        Ok(())
    } else {
        Err(color_eyre::eyre::eyre!(
            "Table {} is missing UNIQUE ({})",
            table,
            columns.join(", ")
        ))
    }
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
