//! [`TableReader`] backed by a single sqlx connection
//!
//! The generation pipeline is synchronous, so the reader owns a
//! current-thread tokio runtime and blocks on each catalog query.

use super::{CatalogColumn, Dialect, TableReader};
use crate::config::ConnectionDescriptor;
use crate::error::SchemaError;
use sqlx::{Connection, MySqlConnection, PgConnection, Row, SqliteConnection};
use tokio::runtime::Runtime;

const MYSQL_COLUMNS: &str = "\
SELECT CAST(COLUMN_NAME AS CHAR), CAST(COLUMN_TYPE AS CHAR), CAST(IS_NULLABLE AS CHAR), \
       CAST(COLUMN_COMMENT AS CHAR), CAST(COLUMN_KEY AS CHAR), CAST(EXTRA AS CHAR) \
FROM information_schema.COLUMNS \
WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
ORDER BY ORDINAL_POSITION";

const POSTGRES_COLUMNS: &str = "\
SELECT c.column_name::text,
       CASE WHEN c.character_maximum_length IS NOT NULL
            THEN c.data_type::text || '(' || c.character_maximum_length::text || ')'
            ELSE c.data_type::text END,
       c.is_nullable::text = 'YES',
       COALESCE(col_description(format('%I.%I', c.table_schema, c.table_name)::regclass::oid,
                                c.ordinal_position::int), ''),
       EXISTS (
           SELECT 1
           FROM information_schema.table_constraints tc
           JOIN information_schema.key_column_usage k
             ON tc.constraint_name = k.constraint_name
            AND tc.table_schema = k.table_schema
            AND tc.table_name = k.table_name
           WHERE tc.constraint_type = 'PRIMARY KEY'
             AND tc.table_schema = c.table_schema
             AND tc.table_name = c.table_name
             AND k.column_name = c.column_name),
       COALESCE(c.column_default::text LIKE 'nextval(%', false) OR c.is_identity::text = 'YES'
FROM information_schema.columns c
WHERE c.table_schema = current_schema() AND c.table_name = $1
ORDER BY c.ordinal_position";

const SQLITE_COLUMNS: &str = r#"SELECT name, type, "notnull", pk FROM pragma_table_info(?) ORDER BY cid"#;

enum Catalog {
    MySql(MySqlConnection),
    Postgres(PgConnection),
    Sqlite(SqliteConnection),
}

/// Catalog reader holding one connection for the duration of a run
pub struct SqlxTableReader {
    runtime: Runtime,
    catalog: Option<Catalog>,
    driver: String,
}

impl std::fmt::Debug for SqlxTableReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlxTableReader")
            .field("driver", &self.driver)
            .field("open", &self.catalog.is_some())
            .finish_non_exhaustive()
    }
}

impl SqlxTableReader {
    /// Open a connection for the descriptor's driver
    ///
    /// # Errors
    ///
    /// - [`SchemaError::UnsupportedDriver`] if the driver has no translation table
    /// - [`SchemaError::ConnectFailed`] if the runtime or connection cannot be created
    pub fn connect(descriptor: &ConnectionDescriptor) -> Result<Self, SchemaError> {
        let dialect = Dialect::require(&descriptor.driver)?;
        let connect_failed = |message: String| SchemaError::ConnectFailed {
            driver: descriptor.driver.clone(),
            message,
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| connect_failed(e.to_string()))?;

        let dsn = descriptor.dsn.as_str();
        let catalog = runtime
            .block_on(async {
                match dialect {
                    Dialect::MySql => MySqlConnection::connect(dsn).await.map(Catalog::MySql),
                    Dialect::Postgres => PgConnection::connect(dsn).await.map(Catalog::Postgres),
                    Dialect::Sqlite => SqliteConnection::connect(dsn).await.map(Catalog::Sqlite),
                }
            })
            .map_err(|e| connect_failed(e.to_string()))?;

        tracing::debug!(driver = %descriptor.driver, "opened catalog connection");
        Ok(Self {
            runtime,
            catalog: Some(catalog),
            driver: descriptor.driver.clone(),
        })
    }

    /// Close the connection, reporting any error from the driver
    pub fn close(mut self) {
        let Some(catalog) = self.catalog.take() else {
            return;
        };
        let result = self.runtime.block_on(async {
            match catalog {
                Catalog::MySql(conn) => conn.close().await,
                Catalog::Postgres(conn) => conn.close().await,
                Catalog::Sqlite(conn) => conn.close().await,
            }
        });
        if let Err(e) = result {
            tracing::warn!(driver = %self.driver, error = %e, "failed to close catalog connection");
        }
    }
}

impl TableReader for SqlxTableReader {
    fn read_table(&mut self, table: &str) -> Result<Option<Vec<CatalogColumn>>, SchemaError> {
        let catalog_error = |e: sqlx::Error| SchemaError::Catalog {
            table: table.to_string(),
            message: e.to_string(),
        };
        let Some(catalog) = self.catalog.as_mut() else {
            return Err(SchemaError::CatalogUnavailable(table.to_string()));
        };

        let columns = self
            .runtime
            .block_on(async {
                match catalog {
                    Catalog::MySql(conn) => {
                        let rows = sqlx::query(MYSQL_COLUMNS)
                            .bind(table)
                            .fetch_all(&mut *conn)
                            .await?;
                        rows.iter()
                            .map(|row| {
                                let extra: String = row.try_get(5)?;
                                Ok(CatalogColumn {
                                    name: row.try_get(0)?,
                                    native_type: row.try_get(1)?,
                                    nullable: row.try_get::<String, _>(2)? == "YES",
                                    comment: row.try_get(3)?,
                                    primary_key: row.try_get::<String, _>(4)? == "PRI",
                                    auto_increment: extra.contains("auto_increment"),
                                })
                            })
                            .collect::<Result<Vec<_>, sqlx::Error>>()
                    }
                    Catalog::Postgres(conn) => {
                        let rows = sqlx::query(POSTGRES_COLUMNS)
                            .bind(table)
                            .fetch_all(&mut *conn)
                            .await?;
                        rows.iter()
                            .map(|row| {
                                Ok(CatalogColumn {
                                    name: row.try_get(0)?,
                                    native_type: row.try_get(1)?,
                                    nullable: row.try_get(2)?,
                                    comment: row.try_get(3)?,
                                    primary_key: row.try_get(4)?,
                                    auto_increment: row.try_get(5)?,
                                })
                            })
                            .collect::<Result<Vec<_>, sqlx::Error>>()
                    }
                    Catalog::Sqlite(conn) => {
                        let rows = sqlx::query(SQLITE_COLUMNS)
                            .bind(table)
                            .fetch_all(&mut *conn)
                            .await?;
                        let pk_count = rows
                            .iter()
                            .filter(|row| row.try_get::<i64, _>(3).unwrap_or(0) > 0)
                            .count();
                        rows.iter()
                            .map(|row| {
                                let native_type: String = row.try_get(1)?;
                                let primary_key = row.try_get::<i64, _>(3)? > 0;
                                // A lone INTEGER PRIMARY KEY aliases the rowid
                                let auto_increment = primary_key
                                    && pk_count == 1
                                    && native_type.eq_ignore_ascii_case("integer");
                                Ok(CatalogColumn {
                                    name: row.try_get(0)?,
                                    native_type,
                                    nullable: row.try_get::<i64, _>(2)? == 0 && !primary_key,
                                    comment: String::new(),
                                    primary_key,
                                    auto_increment,
                                })
                            })
                            .collect::<Result<Vec<_>, sqlx::Error>>()
                    }
                }
            })
            .map_err(catalog_error)?;

        tracing::debug!(table, columns = columns.len(), "read catalog table");
        Ok((!columns.is_empty()).then_some(columns))
    }
}
