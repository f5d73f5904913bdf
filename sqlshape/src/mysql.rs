//! MySQL driver over a single sqlx connection

use crate::config::DbConfig;
use crate::db::Db;
use crate::driver::{Cursor, Driver, Record};
use futures::StreamExt;
use sqlshape_core::{Binds, Error, Prepared, Result, Value};
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Connection, Executor, Row, TypeInfo, ValueRef};
use std::sync::Arc;

/// A [`Driver`] owning one MySQL connection
pub struct MySqlDriver {
    conn: MySqlConnection,
    in_tx: bool,
    last_insert_id: u64,
}

impl MySqlDriver {
    /// Connect with the given settings
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .charset(&config.charset);
        if let Some(password) = &config.password {
            options = options.password(password);
        }
        if let Some(database) = &config.database {
            options = options.database(database);
        }
        let conn = MySqlConnection::connect_with(&options).await?;
        Ok(Self::from_connection(conn))
    }

    /// Connect from a `mysql://` URL
    pub async fn connect_url(url: &str) -> Result<Self> {
        let conn = MySqlConnection::connect(url).await?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: MySqlConnection) -> Self {
        Self {
            conn,
            in_tx: false,
            last_insert_id: 0,
        }
    }

    pub fn into_inner(self) -> MySqlConnection {
        self.conn
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}

impl Db<MySqlDriver> {
    /// Connect and apply the debug settings from `config`
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let driver = MySqlDriver::connect(config).await?;
        Ok(Db::with_debug(driver, &config.debug))
    }
}

impl Driver for MySqlDriver {
    async fn prepare(&mut self, statement: &Prepared) -> Result<()> {
        self.conn.prepare(statement.positional_sql()).await?;
        Ok(())
    }

    async fn execute(&mut self, statement: &Prepared, binds: &Binds) -> Result<u64> {
        let values = statement.arrange(binds)?;
        let result = bind_values(sqlx::query(statement.positional_sql()), values)
            .execute(&mut self.conn)
            .await?;
        if result.last_insert_id() != 0 {
            self.last_insert_id = result.last_insert_id();
        }
        Ok(result.rows_affected())
    }

    async fn execute_unprepared(&mut self, sql: &str) -> Result<u64> {
        let result = self.conn.execute(sql).await?;
        if result.last_insert_id() != 0 {
            self.last_insert_id = result.last_insert_id();
        }
        Ok(result.rows_affected())
    }

    async fn fetch_all(&mut self, statement: &Prepared, binds: &Binds) -> Result<Vec<Record>> {
        let values = statement.arrange(binds)?;
        let rows = bind_values(sqlx::query(statement.positional_sql()), values)
            .fetch_all(&mut self.conn)
            .await?;
        decode_rows(&rows)
    }

    async fn fetch_unprepared(&mut self, sql: &str) -> Result<Vec<Record>> {
        let rows = self.conn.fetch_all(sql).await?;
        decode_rows(&rows)
    }

    fn fetch<'c>(&'c mut self, statement: &'c Prepared, binds: Option<&'c Binds>) -> Cursor<'c> {
        let rows = match binds {
            None => self.conn.fetch(statement.sql()),
            Some(binds) => match statement.arrange(binds) {
                Ok(values) => bind_values(sqlx::query(statement.positional_sql()), values)
                    .fetch(&mut self.conn),
                Err(e) => return futures::stream::once(async move { Err(e) }).boxed(),
            },
        };

        let mut columns: Option<Arc<[String]>> = None;
        rows.map(move |row| {
            let row = row?;
            let columns = columns.get_or_insert_with(|| column_names(&row)).clone();
            decode_row(&row, columns)
        })
        .boxed()
    }

    async fn begin(&mut self) -> Result<()> {
        self.conn.execute("START TRANSACTION").await?;
        self.in_tx = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT").await?;
        self.in_tx = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.in_tx = false;
        self.conn.execute("ROLLBACK").await?;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.in_tx
    }

    fn last_insert_id(&self) -> u64 {
        self.last_insert_id
    }
}

/// Bind values to a query in marker order
fn bind_values<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    values: Vec<Value>,
) -> Query<'q, MySql, MySqlArguments> {
    for value in values {
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(b),
            Value::I32(i) => query.bind(i),
            Value::I64(i) => query.bind(i),
            Value::U64(u) => query.bind(u),
            Value::F32(f) => query.bind(f),
            Value::F64(f) => query.bind(f),
            Value::String(s) => query.bind(s),
            Value::Bytes(b) => query.bind(b),
        };
    }
    query
}

fn column_names(row: &MySqlRow) -> Arc<[String]> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

fn decode_rows(rows: &[MySqlRow]) -> Result<Vec<Record>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let columns = column_names(first);
    rows.iter()
        .map(|row| decode_row(row, Arc::clone(&columns)))
        .collect()
}

fn decode_row(row: &MySqlRow, columns: Arc<[String]>) -> Result<Record> {
    let values = (0..row.len())
        .map(|index| decode_value(row, index))
        .collect::<Result<Vec<_>>>()?;
    Ok(Record::new(columns, values))
}

/// How a column's MySQL type maps onto [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Bool,
    /// TINYINT to INT, and unsigned types up to MEDIUMINT
    Int32,
    /// BIGINT and INT UNSIGNED
    Int64,
    UInt64,
    Year,
    Float,
    Double,
    Date,
    DateTime,
    Time,
    Decimal,
    Bytes,
    Text,
}

fn column_kind(type_name: &str) -> Kind {
    match type_name {
        "BOOLEAN" => Kind::Bool,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" => Kind::Int32,
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" => Kind::Int32,
        "BIGINT" | "INT UNSIGNED" => Kind::Int64,
        "BIGINT UNSIGNED" => Kind::UInt64,
        "YEAR" => Kind::Year,
        "FLOAT" => Kind::Float,
        "DOUBLE" => Kind::Double,
        "DATE" => Kind::Date,
        "DATETIME" | "TIMESTAMP" => Kind::DateTime,
        "TIME" => Kind::Time,
        "DECIMAL" => Kind::Decimal,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => Kind::Bytes,
        _ => Kind::Text,
    }
}

fn signed<T: TryFrom<i64>>(value: i64, type_name: &str) -> Result<T> {
    T::try_from(value)
        .map_err(|_| Error::driver(format!("{type_name} value {value} is out of range")))
}

fn unsigned<T: TryFrom<u64>>(value: u64, type_name: &str) -> Result<T> {
    T::try_from(value)
        .map_err(|_| Error::driver(format!("{type_name} value {value} is out of range")))
}

fn decode_value(row: &MySqlRow, index: usize) -> Result<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_info = raw.type_info();
    let name = type_info.name();
    let value = match column_kind(name) {
        Kind::Bool => Value::Bool(row.try_get(index)?),
        Kind::Int32 if name.ends_with("UNSIGNED") => {
            Value::I32(unsigned(row.try_get::<u64, _>(index)?, name)?)
        }
        Kind::Int32 => Value::I32(signed(row.try_get::<i64, _>(index)?, name)?),
        Kind::Int64 if name.ends_with("UNSIGNED") => {
            Value::I64(unsigned(row.try_get::<u64, _>(index)?, name)?)
        }
        Kind::Int64 => Value::I64(row.try_get(index)?),
        Kind::UInt64 => Value::U64(row.try_get(index)?),
        Kind::Year => Value::I32(i32::from(row.try_get_unchecked::<u16, _>(index)?)),
        Kind::Float => Value::F32(row.try_get(index)?),
        Kind::Double => Value::F64(row.try_get(index)?),
        Kind::Date => Value::String(row.try_get::<chrono::NaiveDate, _>(index)?.to_string()),
        Kind::DateTime => {
            Value::String(row.try_get::<chrono::NaiveDateTime, _>(index)?.to_string())
        }
        Kind::Time => Value::String(row.try_get::<chrono::NaiveTime, _>(index)?.to_string()),
        #[cfg(feature = "decimal-support")]
        Kind::Decimal => {
            Value::String(row.try_get::<rust_decimal::Decimal, _>(index)?.to_string())
        }
        Kind::Bytes => Value::Bytes(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        #[cfg(not(feature = "decimal-support"))]
        Kind::Decimal => Value::String(row.try_get_unchecked::<String, _>(index)?),
        Kind::Text => Value::String(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
