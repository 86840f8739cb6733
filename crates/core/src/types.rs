/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All row timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Money and percentage columns are NUMERIC, carried as fixed-point decimals.
pub type Amount = rust_decimal::Decimal;
