// SPDX-License-Identifier: MIT OR Apache-2.0

use purposize_core::{
    Constraint, FieldSchema, FieldType, Join, PurposeId, Query, Record, RecordId, TableSchema,
    Value,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, query, query_as};
use tracing::trace;

use crate::records::RecordStore;
use crate::sqlite::{SqliteError, SqliteStore, bind_value, placeholders, quote_identifier};
use crate::validation::{ID_FIELD, validate_query, validate_record, validate_schema};

fn column_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Text => "TEXT",
        FieldType::Integer => "INTEGER",
        FieldType::Real => "REAL",
        FieldType::Boolean => "BOOLEAN",
    }
}

/// SQL condition and the values bound to its placeholders.
fn constraint_condition(column: &str, constraint: &Constraint) -> (String, Vec<Value>) {
    match constraint {
        Constraint::Eq(Value::Null) => (format!("{column} IS NULL"), vec![]),
        Constraint::Ne(Value::Null) => (format!("{column} IS NOT NULL"), vec![]),
        Constraint::Eq(value) => (format!("{column} = ?"), vec![value.clone()]),
        Constraint::Ne(value) => (format!("{column} != ?"), vec![value.clone()]),
        Constraint::In(values) if values.is_empty() => ("0".into(), vec![]),
        Constraint::In(values) => (
            format!("{column} IN ({})", placeholders(values.len())),
            values.clone(),
        ),
        Constraint::Gt(value) => (format!("{column} > ?"), vec![value.clone()]),
        Constraint::Gte(value) => (format!("{column} >= ?"), vec![value.clone()]),
        Constraint::Lt(value) => (format!("{column} < ?"), vec![value.clone()]),
        Constraint::Lte(value) => (format!("{column} <= ?"), vec![value.clone()]),
    }
}

fn decode_value(row: &SqliteRow, index: usize, field_type: FieldType) -> Result<Value, SqliteError> {
    let value = match field_type {
        FieldType::Text => row.try_get::<Option<String>, _>(index)?.map(Value::Text),
        FieldType::Integer => row.try_get::<Option<i64>, _>(index)?.map(Value::Integer),
        FieldType::Real => row.try_get::<Option<f64>, _>(index)?.map(Value::Real),
        FieldType::Boolean => row.try_get::<Option<bool>, _>(index)?.map(Value::Boolean),
    };
    Ok(value.unwrap_or(Value::Null))
}

impl SqliteStore {
    /// Selects records of a table, optionally narrowed down to a single id.
    async fn select_records(
        &self,
        schema: &TableSchema,
        query: &Query,
        id: Option<RecordId>,
    ) -> Result<Vec<Record>, SqliteError> {
        let table = quote_identifier(&schema.name);

        let columns: Vec<&FieldSchema> = match &query.attributes {
            Some(attributes) => schema
                .fields
                .iter()
                .filter(|field| attributes.contains(&field.name))
                .collect(),
            None => schema.fields.iter().collect(),
        };

        let mut select_columns = vec![format!("{table}.{}", quote_identifier(ID_FIELD))];
        select_columns.extend(
            columns
                .iter()
                .map(|field| format!("{table}.{}", quote_identifier(&field.name))),
        );

        let mut conditions = Vec::new();
        let mut args = Vec::new();

        if let Some(id) = id {
            conditions.push(format!("{table}.{} = ?", quote_identifier(ID_FIELD)));
            args.push(Value::Integer(id));
        }

        for (field, constraint) in &query.filter {
            let column = format!("{table}.{}", quote_identifier(field));
            let (condition, values) = constraint_condition(&column, constraint);
            conditions.push(condition);
            args.extend(values);
        }

        for join in &query.include {
            match join {
                Join::AttachedPurposes { any_of } if any_of.is_empty() => {
                    conditions.push("0".into());
                }
                Join::AttachedPurposes { any_of } => {
                    conditions.push(format!(
                        "EXISTS (
                            SELECT 1
                            FROM purpose_attachments_v1
                            WHERE purpose_attachments_v1.table_name = ?
                                AND purpose_attachments_v1.record_id = {table}.{}
                                AND purpose_attachments_v1.purpose IN ({})
                        )",
                        quote_identifier(ID_FIELD),
                        placeholders(any_of.len())
                    ));
                    args.push(Value::Text(schema.name.clone()));
                    args.extend(any_of.iter().map(|purpose| Value::Text(purpose.to_string())));
                }
            }
        }

        let mut sql = format!("SELECT {} FROM {table}", select_columns.join(", "));
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(&format!(" ORDER BY {table}.{}", quote_identifier(ID_FIELD)));
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            args.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }

        trace!(%sql, "select records");

        let mut select = sqlx::query(&sql);
        for value in &args {
            select = bind_value(select, value);
        }
        let rows = select.fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<Record, SqliteError> {
                let mut record = Record::new(&schema.name).with_id(row.try_get(0)?);
                for (index, field) in columns.iter().enumerate() {
                    record.set(&field.name, decode_value(row, index + 1, field.field_type)?);
                }
                Ok(record)
            })
            .collect()
    }

    async fn fetch_record(&self, schema: &TableSchema, id: RecordId) -> Result<Record, SqliteError> {
        self.select_records(schema, &Query::new(), Some(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SqliteError::RecordNotFound(schema.name.clone(), id))
    }
}

impl RecordStore for SqliteStore {
    type Error = SqliteError;

    async fn create_table(&self, schema: &TableSchema) -> Result<(), Self::Error> {
        validate_schema(schema)?;

        let mut columns = vec![format!(
            "{} INTEGER PRIMARY KEY AUTOINCREMENT",
            quote_identifier(ID_FIELD)
        )];
        columns.extend(schema.fields.iter().map(|field| {
            format!(
                "{} {}",
                quote_identifier(&field.name),
                column_type(field.field_type)
            )
        }));

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_identifier(&schema.name),
            columns.join(", ")
        );
        query(&sql).execute(&self.pool).await?;

        Ok(())
    }

    async fn find_all(
        &self,
        schema: &TableSchema,
        query: &Query,
    ) -> Result<Vec<Record>, Self::Error> {
        validate_query(schema, query)?;
        self.select_records(schema, query, None).await
    }

    async fn find_one(
        &self,
        schema: &TableSchema,
        query: &Query,
    ) -> Result<Option<Record>, Self::Error> {
        validate_query(schema, query)?;
        let query = query.clone().limit(1);
        let records = self.select_records(schema, &query, None).await?;
        Ok(records.into_iter().next())
    }

    async fn save(&self, schema: &TableSchema, record: Record) -> Result<Record, Self::Error> {
        validate_record(schema, &record)?;

        let table = quote_identifier(&schema.name);
        let fields: Vec<(&String, &Value)> = record.values.iter().collect();

        match record.id {
            Some(id) => {
                if !fields.is_empty() {
                    let assignments: Vec<String> = fields
                        .iter()
                        .map(|(field, _)| format!("{} = ?", quote_identifier(field)))
                        .collect();
                    let sql = format!(
                        "UPDATE {table} SET {} WHERE {} = ?",
                        assignments.join(", "),
                        quote_identifier(ID_FIELD)
                    );

                    let mut update = query(&sql);
                    for (_, value) in &fields {
                        update = bind_value(update, value);
                    }
                    let result = update.bind(id).execute(&self.pool).await?;

                    if result.rows_affected() == 0 {
                        return Err(SqliteError::RecordNotFound(schema.name.clone(), id));
                    }
                }

                self.fetch_record(schema, id).await
            }
            None => {
                let sql = if fields.is_empty() {
                    format!("INSERT INTO {table} DEFAULT VALUES")
                } else {
                    let columns: Vec<String> = fields
                        .iter()
                        .map(|(field, _)| quote_identifier(field))
                        .collect();
                    format!(
                        "INSERT INTO {table} ({}) VALUES ({})",
                        columns.join(", "),
                        placeholders(fields.len())
                    )
                };

                let mut insert = query(&sql);
                for (_, value) in &fields {
                    insert = bind_value(insert, value);
                }
                let result = insert.execute(&self.pool).await?;

                self.fetch_record(schema, result.last_insert_rowid()).await
            }
        }
    }

    async fn attached_purposes(
        &self,
        table: &str,
        id: RecordId,
    ) -> Result<Vec<PurposeId>, Self::Error> {
        let rows = query_as::<_, (String,)>(
            "
            SELECT
                purpose
            FROM
                purpose_attachments_v1
            WHERE
                table_name = ?
                AND record_id = ?
            ORDER BY
                rowid
            ",
        )
        .bind(table)
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| PurposeId::from(row.0)).collect())
    }

    async fn attach_purpose(
        &self,
        table: &str,
        id: RecordId,
        purpose: &PurposeId,
    ) -> Result<bool, Self::Error> {
        let result = query(
            "
            INSERT OR IGNORE
            INTO
                purpose_attachments_v1 (
                    table_name,
                    record_id,
                    purpose
                )
            VALUES
                (?, ?, ?)
            ",
        )
        .bind(table)
        .bind(id)
        .bind(purpose.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
