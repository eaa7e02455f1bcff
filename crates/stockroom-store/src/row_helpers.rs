//! Small helpers shared by the repositories.

use std::str::FromStr;

use rusqlite::Row;
use rusqlite::types::Type;

/// Read a TEXT column into a closed enum, reporting unknown values as a
/// conversion failure.
pub fn get_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a TEXT column into any `From<String>` ID type.
pub fn get_id<T: From<String>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    row.get::<_, String>(idx).map(T::from)
}

/// Read a nullable TEXT column into an optional ID.
pub fn get_opt_id<T: From<String>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>> {
    Ok(row.get::<_, Option<String>>(idx)?.map(T::from))
}

/// Escape LIKE special characters; use with `ESCAPE '\'`.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// `%term%` pattern for a case-insensitive substring search.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term.trim()))
}

/// Convert a `COUNT(*)` result.
pub fn count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or_default()
}
