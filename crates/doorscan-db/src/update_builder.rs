//! Parameterized `UPDATE ... SET` construction for partial updates.
//!
//! Column names only ever come from the repositories themselves; request
//! values are always bound as parameters.

use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;

/// Typed value bound into an update statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// `TEXT` column.
    Text(String),
    /// `SMALLINT` column.
    SmallInt(i16),
    /// `INT` column.
    Int(i32),
    /// `BIGINT` column.
    BigInt(i64),
    /// Double precision, used for coordinates.
    Float(f64),
}

/// Builds `UPDATE <table> SET ... WHERE <key> = $1 RETURNING *`.
///
/// The key is always `$1`; assignments are numbered from `$2` in the order
/// they were added. `mdfcn_dt = NOW()` is appended to every statement.
#[derive(Debug)]
pub struct UpdateBuilder {
    table: &'static str,
    key_column: &'static str,
    key: SqlValue,
    assignments: Vec<String>,
    params: Vec<SqlValue>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str, key_column: &'static str, key: SqlValue) -> Self {
        Self {
            table,
            key_column,
            key,
            assignments: Vec::new(),
            params: Vec::new(),
        }
    }

    fn next_placeholder(&mut self, value: SqlValue) -> String {
        self.params.push(value);
        // +1 for the key parameter
        format!("${}", self.params.len() + 1)
    }

    /// `column = $n` when `value` is present.
    pub fn set(&mut self, column: &'static str, value: Option<SqlValue>) -> &mut Self {
        if let Some(value) = value {
            let placeholder = self.next_placeholder(value);
            self.assignments.push(format!("{} = {}", column, placeholder));
        }
        self
    }

    /// `column = <expr>` where each `?` in `template` is replaced by the next
    /// bound value, e.g. `ST_SetSRID(ST_MakePoint(?, ?), 4326)`.
    pub fn set_expr(
        &mut self,
        column: &'static str,
        template: &str,
        values: Vec<SqlValue>,
    ) -> &mut Self {
        debug_assert_eq!(template.matches('?').count(), values.len());
        let mut values = values.into_iter();
        let mut expr = String::with_capacity(template.len() + 8);
        for ch in template.chars() {
            if ch == '?' {
                if let Some(value) = values.next() {
                    let placeholder = self.next_placeholder(value);
                    expr.push_str(&placeholder);
                    continue;
                }
            }
            expr.push(ch);
        }
        self.assignments.push(format!("{} = {}", column, expr));
        self
    }

    /// Whether any column assignment has been added.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Render the statement. `None` when there is nothing to update.
    pub fn sql(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(format!(
            "UPDATE {} SET {}, mdfcn_dt = NOW() WHERE {} = $1 RETURNING *",
            self.table,
            self.assignments.join(", "),
            self.key_column
        ))
    }

    /// Bind the key and every assignment value, in placeholder order.
    pub fn bind<'q, O>(
        &'q self,
        mut query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for value in std::iter::once(&self.key).chain(self.params.iter()) {
            query = match value {
                SqlValue::Text(v) => query.bind(v),
                SqlValue::SmallInt(v) => query.bind(v),
                SqlValue::Int(v) => query.bind(v),
                SqlValue::BigInt(v) => query.bind(v),
                SqlValue::Float(v) => query.bind(v),
            };
        }
        query
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder_renders_nothing() {
        let builder = UpdateBuilder::new("kor3.bldg", "bldg_id", SqlValue::BigInt(1));
        assert!(builder.is_empty());
        assert_eq!(builder.sql(), None);
    }

    #[test]
    fn test_skips_absent_values() {
        let mut builder = UpdateBuilder::new("kor3.bldg", "bldg_id", SqlValue::BigInt(7));
        builder
            .set("bldg_nm", Some(SqlValue::Text("Hall".into())))
            .set("bldg_sn", None)
            .set("gro_flo_co", Some(SqlValue::Int(3)));

        assert_eq!(
            builder.sql().unwrap(),
            "UPDATE kor3.bldg SET bldg_nm = $2, gro_flo_co = $3, mdfcn_dt = NOW() \
             WHERE bldg_id = $1 RETURNING *"
        );
        assert_eq!(
            builder.params(),
            &[SqlValue::Text("Hall".into()), SqlValue::Int(3)]
        );
    }

    #[test]
    fn test_expression_placeholders_are_numbered_in_order() {
        let mut builder = UpdateBuilder::new("kor3.poi", "poi_id", SqlValue::BigInt(2));
        builder
            .set("poi_nm", Some(SqlValue::Text("Cafe".into())))
            .set_expr(
                "poi_geom",
                "ST_SetSRID(ST_MakePoint(?, ?), 4326)",
                vec![SqlValue::Float(127.0), SqlValue::Float(37.5)],
            )
            .set("phone", Some(SqlValue::Text("02".into())));

        assert_eq!(
            builder.sql().unwrap(),
            "UPDATE kor3.poi SET poi_nm = $2, poi_geom = ST_SetSRID(ST_MakePoint($3, $4), 4326), \
             phone = $5, mdfcn_dt = NOW() WHERE poi_id = $1 RETURNING *"
        );
        assert_eq!(builder.params().len(), 4);
    }

    #[test]
    fn test_text_key() {
        let mut builder =
            UpdateBuilder::new("kor3.\"user\"", "user_uid", SqlValue::Text("uid-1".into()));
        builder.set("user_lgn_type_cd", Some(SqlValue::SmallInt(2)));
        assert!(builder
            .sql()
            .unwrap()
            .ends_with("WHERE user_uid = $1 RETURNING *"));
    }
}
