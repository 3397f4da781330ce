// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use purposize_core::{LoggingLevel, PersonalDataField, PurposeDefinition, PurposeGrant, PurposeId};
use sqlx::{query, query_as};

use crate::metadata::{MetadataStore, MetadataWriter};
use crate::sqlite::{DecodeError, SqliteError, SqliteStore, placeholders};

fn decode_definition(
    purpose: String,
    logging_level: String,
    compatible_with: Vec<String>,
) -> Result<PurposeDefinition, SqliteError> {
    let logging_level: LoggingLevel = logging_level
        .parse()
        .map_err(|err| SqliteError::Decode("logging_level".into(), DecodeError::from(err)))?;

    Ok(PurposeDefinition {
        id: PurposeId::from(purpose),
        logging_level,
        compatible_with: compatible_with.into_iter().map(PurposeId::from).collect(),
    })
}

impl MetadataStore for SqliteStore {
    type Error = SqliteError;

    async fn purpose(&self, id: &PurposeId) -> Result<Option<PurposeDefinition>, Self::Error> {
        let row = query_as::<_, (String, String)>(
            "
            SELECT
                purpose,
                logging_level
            FROM
                purposes_v1
            WHERE
                purpose = ?
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some((purpose, logging_level)) = row else {
            return Ok(None);
        };

        let compatible_with = query_as::<_, (String,)>(
            "
            SELECT
                compatible_with
            FROM
                purpose_compatibility_v1
            WHERE
                purpose = ?
            ORDER BY
                compatible_with
            ",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| row.0)
        .collect();

        decode_definition(purpose, logging_level, compatible_with).map(Some)
    }

    async fn purposes(&self) -> Result<Vec<PurposeDefinition>, Self::Error> {
        let rows = query_as::<_, (String, String)>(
            "
            SELECT
                purpose,
                logging_level
            FROM
                purposes_v1
            ORDER BY
                purpose
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let edges = query_as::<_, (String, String)>(
            "
            SELECT
                purpose,
                compatible_with
            FROM
                purpose_compatibility_v1
            ORDER BY
                purpose,
                compatible_with
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut compatible: HashMap<String, Vec<String>> = HashMap::new();
        for (purpose, compatible_with) in edges {
            compatible.entry(purpose).or_default().push(compatible_with);
        }

        rows.into_iter()
            .map(|(purpose, logging_level)| {
                let compatible_with = compatible.remove(&purpose).unwrap_or_default();
                decode_definition(purpose, logging_level, compatible_with)
            })
            .collect()
    }

    async fn personal_fields(&self, table: &str) -> Result<Vec<String>, Self::Error> {
        let rows = query_as::<_, (String,)>(
            "
            SELECT
                field_name
            FROM
                personal_data_fields_v1
            WHERE
                table_name = ?
            ORDER BY
                field_name
            ",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    async fn granted_fields(
        &self,
        purposes: &[PurposeId],
        table: &str,
    ) -> Result<Vec<String>, Self::Error> {
        if purposes.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "
            SELECT DISTINCT
                field_name
            FROM
                purpose_data_fields_v1
            WHERE
                table_name = ?
                AND purpose IN ({})
            ORDER BY
                field_name
            ",
            placeholders(purposes.len())
        );

        let mut select = query_as::<_, (String,)>(&sql).bind(table);
        for purpose in purposes {
            select = select.bind(purpose.as_str());
        }

        let rows = select.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|row| row.0).collect())
    }
}

impl MetadataWriter for SqliteStore {
    type Error = SqliteError;

    async fn insert_purpose(&self, definition: PurposeDefinition) -> Result<bool, Self::Error> {
        // The purpose and its compatibility edges are inserted atomically, the transaction rolls
        // back when it gets dropped early.
        let mut tx = self.pool.begin().await?;

        let result = query(
            "
            INSERT OR IGNORE
            INTO
                purposes_v1 (
                    purpose,
                    logging_level
                )
            VALUES
                (?, ?)
            ",
        )
        .bind(definition.id.as_str())
        .bind(definition.logging_level.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        for compatible_with in &definition.compatible_with {
            query(
                "
                INSERT OR IGNORE
                INTO
                    purpose_compatibility_v1 (
                        purpose,
                        compatible_with
                    )
                VALUES
                    (?, ?)
                ",
            )
            .bind(definition.id.as_str())
            .bind(compatible_with.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn insert_personal_field(&self, field: PersonalDataField) -> Result<bool, Self::Error> {
        let result = query(
            "
            INSERT OR IGNORE
            INTO
                personal_data_fields_v1 (
                    table_name,
                    field_name
                )
            VALUES
                (?, ?)
            ",
        )
        .bind(field.table)
        .bind(field.field)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_grant(&self, grant: PurposeGrant) -> Result<bool, Self::Error> {
        let result = query(
            "
            INSERT OR IGNORE
            INTO
                purpose_data_fields_v1 (
                    purpose,
                    table_name,
                    field_name
                )
            VALUES
                (?, ?, ?)
            ",
        )
        .bind(grant.purpose.as_str().to_string())
        .bind(grant.table)
        .bind(grant.field)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
