//! Narrows a base SQL query to the slice described by one fragment's metadata.
use crate::dialect::{db_product, DbProduct};
use crate::enumerator::millis_to_date;
use crate::partition::{PartitionPlan, DATE_FORMAT};
use common::byte_util::{decode_i32, decode_i64, split, I32_LEN, I64_LEN};
use common::FragmenterError;

/// Appends the predicate of a fragment to `origin_sql`.
///
/// Returns `origin_sql` unchanged when the metadata is absent or empty (whole-table
/// fragment). A `WHERE 1=1` is added first when the query has no `WHERE` yet.
///
/// # Arguments
///
/// * `origin_sql` - Query to narrow.
/// * `db_name` - Database product name, selects how date literals are written.
/// * `plan` - Partition plan the fragment was produced from.
/// * `metadata` - Metadata of the fragment.
pub fn build_fragment_sql(
    origin_sql: &str,
    db_name: &str,
    plan: Option<&PartitionPlan>,
    metadata: Option<&[u8]>,
) -> Result<String, FragmenterError> {
    let metadata = match metadata {
        Some(m) if !m.is_empty() => m,
        _ => return Ok(origin_sql.to_string()),
    };
    let plan = plan.ok_or_else(|| {
        FragmenterError::MalformedMetadata(String::from(
            "fragment carries metadata but the request has no partition plan",
        ))
    })?;
    let predicate = predicate(plan, db_product(db_name), metadata)?;

    let mut sql = String::from(origin_sql);
    if !origin_sql.contains("WHERE") {
        sql.push_str(" WHERE 1=1 ");
    }
    sql.push_str(" AND ");
    sql.push_str(&predicate);
    debug!("Narrowed query: {}", sql);
    Ok(sql)
}

fn predicate(
    plan: &PartitionPlan,
    dialect: &dyn DbProduct,
    metadata: &[u8],
) -> Result<String, FragmenterError> {
    match plan {
        PartitionPlan::Date { column, .. } => {
            let (start, end) = split(metadata, I64_LEN)?;
            let start = millis_to_date(decode_i64(start)?)?;
            let end = millis_to_date(decode_i64(end)?)?;
            Ok(format!(
                "{col} >= {} AND {col} < {}",
                dialect.wrap_date(&start.format(DATE_FORMAT).to_string()),
                dialect.wrap_date(&end.format(DATE_FORMAT).to_string()),
                col = column
            ))
        }
        PartitionPlan::Int { column, .. } => {
            let (start, end) = split(metadata, I32_LEN)?;
            Ok(format!(
                "{col} >= {} AND {col} < {}",
                decode_i32(start)?,
                decode_i32(end)?,
                col = column
            ))
        }
        PartitionPlan::Enum { column, .. } => {
            let value = std::str::from_utf8(metadata).map_err(|e| {
                FragmenterError::MalformedMetadata(format!("enum value is not UTF-8: {}", e))
            })?;
            // Values without quotes render exactly as they always have.
            Ok(format!("{}='{}'", column, value.replace('\'', "''")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerator::date_to_millis;
    use crate::partition::IntervalUnit;
    use chrono::NaiveDate;
    use common::byte_util::{concat, encode_i32, encode_i64};

    fn int_plan() -> PartitionPlan {
        PartitionPlan::Int {
            column: String::from("year"),
            start: 0,
            end: 100,
            interval: 5,
        }
    }

    fn date_plan() -> PartitionPlan {
        PartitionPlan::Date {
            column: String::from("d"),
            start: NaiveDate::from_ymd_opt(2008, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
            interval: 1,
            unit: IntervalUnit::Year,
        }
    }

    fn enum_plan() -> PartitionPlan {
        PartitionPlan::Enum {
            column: String::from("grade"),
            values: vec![String::from("excellent")],
        }
    }

    fn date_metadata(start: (i32, u32, u32), end: (i32, u32, u32)) -> Vec<u8> {
        let start = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap();
        let end = NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap();
        concat(
            &encode_i64(date_to_millis(start)),
            &encode_i64(date_to_millis(end)),
        )
    }

    #[test]
    fn test_int_without_where() {
        let meta = concat(&encode_i32(5), &encode_i32(10));
        let sql = build_fragment_sql(
            "SELECT * FROM t",
            "MySQL",
            Some(&int_plan()),
            Some(meta.as_slice()),
        )
        .unwrap();
        assert_eq!("SELECT * FROM t WHERE 1=1  AND year >= 5 AND year < 10", sql);
    }

    #[test]
    fn test_negative_int_bounds() {
        let meta = concat(&encode_i32(-10), &encode_i32(-5));
        let sql = build_fragment_sql(
            "SELECT * FROM t WHERE x>0",
            "PostgreSQL",
            Some(&int_plan()),
            Some(meta.as_slice()),
        )
        .unwrap();
        assert_eq!("SELECT * FROM t WHERE x>0 AND year >= -10 AND year < -5", sql);
    }

    #[test]
    fn test_date_oracle_with_where() {
        let meta = date_metadata((2008, 1, 1), (2009, 1, 1));
        let sql = build_fragment_sql(
            "SELECT * FROM t WHERE x>0",
            "Oracle",
            Some(&date_plan()),
            Some(meta.as_slice()),
        )
        .unwrap();
        assert_eq!(
            "SELECT * FROM t WHERE x>0 AND d >= to_date('2008-01-01','YYYY-MM-DD') AND d < to_date('2009-01-01','YYYY-MM-DD')",
            sql
        );
    }

    #[test]
    fn test_date_dialects() {
        let meta = date_metadata((2008, 3, 1), (2008, 4, 15));
        let sql = build_fragment_sql(
            "SELECT a FROM t",
            "MySQL",
            Some(&date_plan()),
            Some(meta.as_slice()),
        )
        .unwrap();
        assert_eq!(
            "SELECT a FROM t WHERE 1=1  AND d >= DATE('2008-03-01') AND d < DATE('2008-04-15')",
            sql
        );
        let sql = build_fragment_sql(
            "SELECT a FROM t",
            "Derby",
            Some(&date_plan()),
            Some(meta.as_slice()),
        )
        .unwrap();
        assert_eq!(
            "SELECT a FROM t WHERE 1=1  AND d >= date '2008-03-01' AND d < date '2008-04-15'",
            sql
        );
    }

    #[test]
    fn test_enum() {
        let sql = build_fragment_sql(
            "SELECT * FROM t",
            "MySQL",
            Some(&enum_plan()),
            Some(&b"excellent"[..]),
        )
        .unwrap();
        assert_eq!("SELECT * FROM t WHERE 1=1  AND grade='excellent'", sql);
    }

    #[test]
    fn test_enum_quote_is_escaped() {
        let sql = build_fragment_sql(
            "SELECT * FROM t WHERE a=1",
            "MySQL",
            Some(&enum_plan()),
            Some(&b"o'neil"[..]),
        )
        .unwrap();
        assert_eq!("SELECT * FROM t WHERE a=1 AND grade='o''neil'", sql);
    }

    #[test]
    fn test_where_match_is_case_sensitive() {
        let meta = concat(&encode_i32(1), &encode_i32(2));
        let sql = build_fragment_sql(
            "select * from t where x>0",
            "MySQL",
            Some(&int_plan()),
            Some(meta.as_slice()),
        )
        .unwrap();
        assert_eq!(
            "select * from t where x>0 WHERE 1=1  AND year >= 1 AND year < 2",
            sql
        );
    }

    #[test]
    fn test_empty_metadata_leaves_query() {
        let base = "SELECT * FROM t";
        assert_eq!(
            base,
            build_fragment_sql(base, "MySQL", Some(&int_plan()), None).unwrap()
        );
        assert_eq!(
            base,
            build_fragment_sql(base, "MySQL", Some(&int_plan()), Some(&[][..])).unwrap()
        );
        assert_eq!(base, build_fragment_sql(base, "MySQL", None, None).unwrap());
    }

    #[test]
    fn test_malformed_metadata() {
        let short = [0u8, 0, 0, 5, 0, 0];
        let res = build_fragment_sql("SELECT 1", "MySQL", Some(&int_plan()), Some(&short[..]));
        assert!(matches!(res, Err(FragmenterError::MalformedMetadata(_))));

        let res = build_fragment_sql("SELECT 1", "MySQL", Some(&date_plan()), Some(&[1u8, 2, 3][..]));
        assert!(matches!(res, Err(FragmenterError::MalformedMetadata(_))));

        let long = concat(&encode_i32(1), &encode_i64(2));
        let res = build_fragment_sql("SELECT 1", "MySQL", Some(&int_plan()), Some(long.as_slice()));
        assert!(matches!(res, Err(FragmenterError::MalformedMetadata(_))));

        let res = build_fragment_sql("SELECT 1", "MySQL", Some(&enum_plan()), Some(&[0xffu8, 0xfe][..]));
        assert!(matches!(res, Err(FragmenterError::MalformedMetadata(_))));

        let res = build_fragment_sql("SELECT 1", "MySQL", None, Some(&b"excellent"[..]));
        assert_eq!(500, res.unwrap_err().http_status());
    }
}
