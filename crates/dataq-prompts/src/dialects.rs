//! Dialect Registry
//!
//! Static SQL guidance per datasource family, appended to every generation
//! prompt so the model writes syntax the backend will actually accept.
//! Lookup is total over `DatasourceKind`; string tags go through the
//! alias-resolving parser and unknown tags fail loudly, because an agent
//! with no dialect text would generate invalid queries that look fine.

use dataq_core::{DatasourceKind, Result};

const POSTGRES: &str = "\
## PostgreSQL Guidelines

1. Syntax:
   - DATE_TRUNC(), DATE_PART(), EXTRACT(YEAR FROM date) for date handling
   - NOW(), CURRENT_DATE, CURRENT_TIMESTAMP for current time
   - TEXT, INTEGER, BIGINT, NUMERIC, BOOLEAN data types
   - double-quote identifiers that need escaping

2. Aggregation:
   - SUM(), AVG(), COUNT(), MIN(), MAX()
   - COUNT(*) FILTER (WHERE condition) for conditional counts
   - ARRAY_AGG(), STRING_AGG() to collapse groups

3. Strings: CONCAT(), SUBSTRING(), UPPER(), LOWER(), TRIM(); the ~ operator for regex

4. Conventions:
   - qualify columns with table aliases
   - LIMIT results unless the user asks otherwise
   - schema-qualify table names: schema.table";

const AZURE_SQL: &str = "\
## Azure SQL / SQL Server Guidelines

1. T-SQL syntax:
   - DATEPART(), DATEDIFF(), DATEADD() for date handling
   - GETDATE(), GETUTCDATE() for current time
   - VARCHAR, NVARCHAR, INT, BIGINT, DECIMAL, BIT data types
   - square brackets for identifiers: [schema].[table]

2. Aggregation:
   - SUM(), AVG(), COUNT(), MIN(), MAX()
   - COUNT with CASE for conditional counts
   - STRING_AGG() (SQL Server 2017+)

3. Strings: CONCAT(), SUBSTRING(), UPPER(), LOWER(), LTRIM(), RTRIM(); LIKE with wildcards

4. Conventions:
   - qualify columns with table aliases
   - TOP N, never LIMIT
   - schema-qualify table names: [schema].[table]";

const SYNAPSE: &str = "\
## Azure Synapse Analytics Guidelines

1. Synapse SQL syntax (T-SQL with distributed-query behavior):
   - DATEPART(), DATEDIFF(), DATEADD() for date handling
   - GETDATE(), GETUTCDATE() for current time
   - VARCHAR, NVARCHAR, INT, BIGINT, DECIMAL data types

2. Aggregation:
   - SUM(), AVG(), COUNT(), MIN(), MAX()
   - APPROX_COUNT_DISTINCT() on large tables

3. Conventions:
   - TOP N, never LIMIT
   - filter on distribution columns when possible
   - schema-qualify table names; avoid SELECT * on large tables";

const COSMOS: &str = "\
## Azure Cosmos DB SQL Guidelines

1. Cosmos SQL syntax:
   - SELECT, FROM, WHERE, ORDER BY, TOP
   - no JOINs between containers; JOIN only traverses arrays within a document
   - array functions: ARRAY_CONTAINS(), ARRAY_LENGTH()

2. Query limits:
   - include the partition key in WHERE for efficiency
   - cross-partition queries are expensive
   - aggregations without a partition key filter may time out

3. Conventions:
   - filter by partition key first
   - TOP, never LIMIT
   - prefer point reads over queries when possible";

const DATABRICKS: &str = "\
## Databricks SQL Guidelines

1. Syntax:
   - DATE_TRUNC(), DATE_ADD(), DATE_SUB() for date handling
   - CURRENT_DATE(), CURRENT_TIMESTAMP() for current time
   - STRING, INT, BIGINT, DOUBLE, DECIMAL, BOOLEAN data types

2. Aggregation:
   - SUM(), AVG(), COUNT(), MIN(), MAX()
   - APPROX_COUNT_DISTINCT() for large cardinality
   - COLLECT_LIST(), COLLECT_SET() for arrays

3. Conventions:
   - qualify columns with table aliases
   - LIMIT results
   - three-part names: catalog.schema.table
   - Delta tables support time travel: SELECT * FROM table@v1";

const BIGQUERY: &str = "\
## BigQuery SQL Guidelines

1. Syntax:
   - DATE_TRUNC, DATE_ADD, DATE_SUB for date handling
   - CURRENT_DATE(), CURRENT_TIMESTAMP() for current time
   - EXTRACT(YEAR FROM date), EXTRACT(MONTH FROM date) for date parts
   - STRING, INT64, FLOAT64, NUMERIC, BOOL data types
   - backtick table names: `project.dataset.table`

2. Aggregation:
   - SUM(), AVG(), COUNT(), MIN(), MAX()
   - COUNTIF() for conditional counts
   - APPROX_COUNT_DISTINCT() for large cardinality

3. Strings: CONCAT(), SUBSTR(), UPPER(), LOWER(), TRIM(); REGEXP_CONTAINS(), REGEXP_EXTRACT()

4. Conventions:
   - qualify columns with table aliases
   - LIMIT results unless the user asks otherwise
   - fully qualified table names; partition filters improve cost and speed";

/// Dialect guidance for a datasource family. Total and never empty.
pub fn guidelines(kind: DatasourceKind) -> &'static str {
    match kind {
        DatasourceKind::Postgres => POSTGRES,
        DatasourceKind::AzureSql => AZURE_SQL,
        DatasourceKind::Synapse => SYNAPSE,
        DatasourceKind::Cosmos => COSMOS,
        DatasourceKind::Databricks => DATABRICKS,
        DatasourceKind::BigQuery => BIGQUERY,
    }
}

/// Dialect guidance for a raw type tag.
///
/// Aliases resolve to the same text; unknown tags are a configuration error
/// rather than silently empty guidance.
pub fn guidelines_for(tag: &str) -> Result<&'static str> {
    let kind: DatasourceKind = tag.parse()?;
    Ok(guidelines(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataq_core::Error;

    #[test]
    fn test_every_kind_has_nonempty_guidance() {
        for kind in DatasourceKind::ALL {
            assert!(!guidelines(*kind).is_empty(), "no guidance for {kind}");
        }
    }

    #[test]
    fn test_aliases_return_identical_text() {
        assert_eq!(
            guidelines_for("postgres").unwrap(),
            guidelines_for("postgresql").unwrap()
        );
        assert_eq!(
            guidelines_for("mssql").unwrap(),
            guidelines_for("azure_sql").unwrap()
        );
        assert_eq!(
            guidelines_for("cosmos").unwrap(),
            guidelines_for("CosmosDB").unwrap()
        );
    }

    #[test]
    fn test_unknown_tag_fails() {
        assert!(matches!(
            guidelines_for("oracle"),
            Err(Error::Configuration(_))
        ));
    }
}
