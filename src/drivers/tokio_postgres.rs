use std::error::Error as StdError;

use async_trait::async_trait;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::{Client, NoTls};
use tracing::error;

use crate::error::{DaoError, Result};
use crate::traits::DatabaseDriver;
use crate::types::{RawQueryResult, SqlValue};

/// PostgreSQL driver implementation using tokio-postgres.
pub struct TokioPostgresDriver {
    client: Client,
}

impl TokioPostgresDriver {
    /// Connect to a PostgreSQL database.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| DaoError::ConnectionFailed(e.to_string()))?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        Ok(Self { client })
    }

    /// Wrap an already connected client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        query_client(&self.client, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        execute_client(&self.client, sql, params).await
    }
}

pub(crate) async fn query_client(
    client: &Client,
    sql: &str,
    params: &[SqlValue],
) -> Result<RawQueryResult> {
    let sql = to_postgres_sql(sql);
    let rows = client
        .query(sql.as_str(), &param_refs(params))
        .await
        .map_err(map_error)?;

    // Extract column names
    let columns: Vec<String> = match rows.first() {
        Some(row) => row
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
        None => Vec::new(),
    };

    let result_rows = rows
        .iter()
        .map(|row| {
            row.columns()
                .iter()
                .enumerate()
                .map(|(i, col)| cell_value(row, i, col.name(), col.type_()))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RawQueryResult::new(columns, result_rows))
}

pub(crate) async fn execute_client(client: &Client, sql: &str, params: &[SqlValue]) -> Result<u64> {
    let sql = to_postgres_sql(sql);
    client
        .execute(sql.as_str(), &param_refs(params))
        .await
        .map_err(map_error)
}

fn param_refs(params: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// Storage that was never reached is a connectivity failure; anything the
/// server answered is a query failure. A parameter that could not be
/// encoded keeps its `TypeMismatch`.
pub(crate) fn map_error(e: tokio_postgres::Error) -> DaoError {
    if let Some(DaoError::TypeMismatch {
        column,
        expected,
        found,
    }) = e.source().and_then(|source| source.downcast_ref::<DaoError>())
    {
        return DaoError::TypeMismatch {
            column: column.clone(),
            expected: *expected,
            found: *found,
        };
    }
    let io_failure = e
        .source()
        .map_or(false, |source| source.is::<std::io::Error>());
    if e.is_closed() || (e.as_db_error().is_none() && io_failure) {
        DaoError::ConnectionFailed(e.to_string())
    } else {
        DaoError::QueryFailed(e.to_string())
    }
}

/// Rewrites canonical statement text for PostgreSQL:
/// `?` becomes `$n`, backtick identifiers become double-quoted and a
/// trailing `LIMIT o,n` becomes `LIMIT n OFFSET o`. Quoted literals are
/// copied untouched.
pub fn to_postgres_sql(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 16);
    let mut chars = sql.chars().peekable();
    let mut param = 0;

    while let Some(c) = chars.next() {
        match c {
            '?' => {
                param += 1;
                out.push('$');
                out.push_str(&param.to_string());
            }
            '\'' | '"' => {
                out.push(c);
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == c {
                        break;
                    }
                }
            }
            '`' => {
                out.push('"');
                while let Some(inner) = chars.next() {
                    match inner {
                        '`' if chars.peek() == Some(&'`') => {
                            chars.next();
                            out.push('`');
                        }
                        '`' => break,
                        '"' => out.push_str("\"\""),
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            other => out.push(other),
        }
    }

    rewrite_limit(out)
}

fn rewrite_limit(sql: String) -> String {
    let Some(pos) = sql.rfind(" LIMIT ") else {
        return sql;
    };
    let tail = &sql[pos + " LIMIT ".len()..];
    let Some((offset, count)) = tail.trim().split_once(',') else {
        return sql;
    };
    match (offset.trim().parse::<u64>(), count.trim().parse::<u64>()) {
        (Ok(offset), Ok(count)) => format!("{} LIMIT {} OFFSET {}", &sql[..pos], count, offset),
        _ => sql,
    }
}

/// Decodes one cell into a SqlValue according to its column type.
fn cell_value(row: &tokio_postgres::Row, index: usize, name: &str, ty: &Type) -> Result<SqlValue> {
    let decode = |e: tokio_postgres::Error| {
        DaoError::QueryFailed(format!("failed to decode column '{}': {}", name, e))
    };

    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(index).map(SqlValue::from)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(index)
            .map(|v| SqlValue::from(v.map(i32::from)))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(index).map(SqlValue::from)
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(index).map(SqlValue::from)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(index)
            .map(|v| SqlValue::from(v.map(f64::from)))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(index).map(SqlValue::from)
    } else if [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME].contains(ty) {
        row.try_get::<_, Option<String>>(index).map(SqlValue::from)
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<NaiveDateTime>>(index)
            .map(SqlValue::from)
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<DateTime<Utc>>>(index)
            .map(|v| SqlValue::from(v.map(|ts| ts.naive_utc())))
    } else if *ty == Type::BYTEA {
        row.try_get::<_, Option<Vec<u8>>>(index).map(SqlValue::from)
    } else {
        return Err(DaoError::UnsupportedType {
            column: name.to_string(),
            type_name: ty.name().to_string(),
        });
    };

    value.map_err(decode)
}

/// Binds a SqlValue to whatever type the server expects for the parameter,
/// narrowing or widening numbers where that is lossless. Text headed for a
/// numeric or boolean parameter is parsed first.
impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn StdError + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Int32(n) => integer_to_sql(i64::from(*n), ty, out),
            SqlValue::Int64(n) => integer_to_sql(*n, ty, out),
            SqlValue::Float64(f) => float_to_sql(*f, ty, out),
            SqlValue::Text(s) => text_to_sql(s, ty, out),
            SqlValue::Bool(b) => b.to_sql(ty, out),
            SqlValue::Timestamp(ts) => {
                if *ty == Type::TIMESTAMPTZ {
                    Utc.from_utc_datetime(ts).to_sql(ty, out)
                } else {
                    ts.to_sql(ty, out)
                }
            }
            SqlValue::Bytes(b) => b.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn integer_to_sql(
    n: i64,
    ty: &Type,
    out: &mut BytesMut,
) -> std::result::Result<IsNull, Box<dyn StdError + Sync + Send>> {
    if *ty == Type::INT2 {
        i16::try_from(n)?.to_sql(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(n)?.to_sql(ty, out)
    } else if *ty == Type::FLOAT8 {
        (n as f64).to_sql(ty, out)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR {
        n.to_string().to_sql(ty, out)
    } else {
        n.to_sql(ty, out)
    }
}

fn float_to_sql(
    f: f64,
    ty: &Type,
    out: &mut BytesMut,
) -> std::result::Result<IsNull, Box<dyn StdError + Sync + Send>> {
    if *ty == Type::FLOAT4 {
        (f as f32).to_sql(ty, out)
    } else {
        f.to_sql(ty, out)
    }
}

fn text_to_sql(
    s: &str,
    ty: &Type,
    out: &mut BytesMut,
) -> std::result::Result<IsNull, Box<dyn StdError + Sync + Send>> {
    let unparsable = |expected: &'static str| DaoError::TypeMismatch {
        column: format!("parameter of type {}", ty.name()),
        expected,
        found: "text",
    };

    if [Type::INT2, Type::INT4, Type::INT8].contains(ty) {
        let n = s.trim().parse::<i64>().map_err(|_| unparsable("integer"))?;
        integer_to_sql(n, ty, out)
    } else if *ty == Type::FLOAT4 || *ty == Type::FLOAT8 {
        let f = s.trim().parse::<f64>().map_err(|_| unparsable("float"))?;
        float_to_sql(f, ty, out)
    } else if *ty == Type::BOOL {
        let b = s.trim().parse::<bool>().map_err(|_| unparsable("bool"))?;
        b.to_sql(ty, out)
    } else {
        s.to_sql(ty, out)
    }
}
