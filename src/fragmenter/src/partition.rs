//! Parsing of the `PARTITION_BY`, `RANGE` and `INTERVAL` user properties.
//!
//! ```text
//! PARTITION_BY = <column>:<type>      type in {date, int, enum}
//! RANGE        = <tok>[:<tok>]*       exactly 2 tokens for date/int, may be empty for enum
//! INTERVAL     = <n>[:<unit>]         n >= 1, unit in {day, month, year} for date
//! ```
use chrono::NaiveDate;
use common::{FragmenterError, InputData};

pub const PARTITION_BY: &str = "PARTITION_BY";
pub const RANGE: &str = "RANGE";
pub const INTERVAL: &str = "INTERVAL";
/// Format of date range tokens and of dates rendered into SQL.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const SEPARATOR: char = ':';

/// Domain of the partitioning column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    Date,
    Int,
    Enum,
}

impl PartitionKind {
    fn from_token(token: &str) -> Result<Self, FragmenterError> {
        match token.to_uppercase().as_str() {
            "DATE" => Ok(PartitionKind::Date),
            "INT" => Ok(PartitionKind::Int),
            "ENUM" => Ok(PartitionKind::Enum),
            _ => Err(FragmenterError::UserDataError(format!(
                "unknown partition type '{}'",
                token
            ))),
        }
    }
}

/// Calendar unit of a date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    Day,
    Month,
    Year,
}

impl IntervalUnit {
    fn from_token(token: &str) -> Result<Self, FragmenterError> {
        match token.to_uppercase().as_str() {
            "DAY" => Ok(IntervalUnit::Day),
            "MONTH" => Ok(IntervalUnit::Month),
            "YEAR" => Ok(IntervalUnit::Year),
            _ => Err(FragmenterError::UserDataError(format!(
                "unknown interval unit '{}'",
                token
            ))),
        }
    }
}

/// Validated partition properties of one request.
///
/// Ranges are half-open: `start` is included, `end` is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionPlan {
    Date {
        column: String,
        start: NaiveDate,
        end: NaiveDate,
        interval: u32,
        unit: IntervalUnit,
    },
    Int {
        column: String,
        start: i32,
        end: i32,
        interval: i32,
    },
    Enum {
        column: String,
        values: Vec<String>,
    },
}

impl PartitionPlan {
    /// Parses the partition properties of a request.
    ///
    /// Returns `Ok(None)` when `PARTITION_BY` is absent, meaning the whole table is read as
    /// a single fragment.
    ///
    /// # Arguments
    ///
    /// * `input` - Request carrying the user properties.
    pub fn from_input(input: &InputData) -> Result<Option<Self>, FragmenterError> {
        let partition_by = match input.user_property(PARTITION_BY) {
            Some(p) => p,
            None => return Ok(None),
        };
        let (column, kind) = parse_partition_by(partition_by)?;
        let interval = match input.user_property(INTERVAL) {
            Some(i) => Some(parse_interval(i)?),
            None => None,
        };
        let range = input.user_property(RANGE);

        let plan = match kind {
            PartitionKind::Date => {
                let (start, end) = range_bounds(range, kind)?;
                let (start, end) = (parse_date(start)?, parse_date(end)?);
                check_order(start, end)?;
                let (interval, unit) = match interval {
                    Some((value, Some(unit))) => (value as u32, unit),
                    _ => {
                        return Err(FragmenterError::UserDataError(String::from(
                            "The parameter{INTERVAL} must be '<n>:<unit>' with unit day, month or year for partition type 'date'",
                        )))
                    }
                };
                PartitionPlan::Date {
                    column,
                    start,
                    end,
                    interval,
                    unit,
                }
            }
            PartitionKind::Int => {
                let (start, end) = range_bounds(range, kind)?;
                let (start, end) = (parse_int(start)?, parse_int(end)?);
                check_order(start, end)?;
                let interval = match interval {
                    Some((value, unit)) => {
                        if let Some(unit) = unit {
                            warn!("Ignoring interval unit {:?} for partition type 'int'", unit);
                        }
                        value
                    }
                    None => 1,
                };
                PartitionPlan::Int {
                    column,
                    start,
                    end,
                    interval,
                }
            }
            PartitionKind::Enum => {
                if interval.is_some() {
                    warn!("Ignoring parameter{{INTERVAL}} for partition type 'enum'");
                }
                let values = enum_values(range)?;
                PartitionPlan::Enum { column, values }
            }
        };
        debug!("Parsed partition plan {:?}", plan);
        Ok(Some(plan))
    }

    /// Name of the partitioning column.
    pub fn column(&self) -> &str {
        match self {
            PartitionPlan::Date { column, .. }
            | PartitionPlan::Int { column, .. }
            | PartitionPlan::Enum { column, .. } => column,
        }
    }

    pub fn kind(&self) -> PartitionKind {
        match self {
            PartitionPlan::Date { .. } => PartitionKind::Date,
            PartitionPlan::Int { .. } => PartitionKind::Int,
            PartitionPlan::Enum { .. } => PartitionKind::Enum,
        }
    }
}

fn parse_partition_by(value: &str) -> Result<(String, PartitionKind), FragmenterError> {
    let parts: Vec<&str> = value.split(SEPARATOR).collect();
    if parts.len() != 2 || parts[0].is_empty() {
        return Err(FragmenterError::UserDataError(format!(
            "The parameter{{PARTITION_BY}} must be '<column>:<type>', but actual is '{}'",
            value
        )));
    }
    let kind = PartitionKind::from_token(parts[1])?;
    Ok((parts[0].to_string(), kind))
}

/// Parses `<n>[:<unit>]`.
fn parse_interval(value: &str) -> Result<(i32, Option<IntervalUnit>), FragmenterError> {
    let mut parts = value.split(SEPARATOR);
    let raw = parts.next().unwrap_or_default();
    let n: i32 = raw.trim().parse().map_err(|_| {
        FragmenterError::UserDataError(format!(
            "The parameter{{INTERVAL}} must be an integer, but actual is '{}'",
            raw
        ))
    })?;
    if n < 1 {
        return Err(FragmenterError::UserDataError(format!(
            "The parameter{{INTERVAL}} must > 1, but actual is '{}'",
            n
        )));
    }
    let unit = match parts.next() {
        Some(u) => Some(IntervalUnit::from_token(u)?),
        None => None,
    };
    Ok((n, unit))
}

/// Splits a date or int `RANGE` into its two bounds.
fn range_bounds(range: Option<&str>, kind: PartitionKind) -> Result<(&str, &str), FragmenterError> {
    let range = range.ok_or_else(|| {
        FragmenterError::UserDataError(format!(
            "The parameter{{RANGE}} is required for partition type '{:?}'",
            kind
        ))
    })?;
    let tokens: Vec<&str> = range.split(SEPARATOR).collect();
    if tokens.len() != 2 {
        return Err(FragmenterError::UserDataError(format!(
            "The parameter{{RANGE}} must be '<start>:<end>' for partition type '{:?}', but actual is '{}'",
            kind, range
        )));
    }
    Ok((tokens[0], tokens[1]))
}

fn enum_values(range: Option<&str>) -> Result<Vec<String>, FragmenterError> {
    let range = range.unwrap_or_default();
    let values: Vec<String> = range.split(SEPARATOR).map(String::from).collect();
    // A lone empty value is the whole-table fragment; among other values it is a typo.
    if values.len() > 1 && values.iter().any(|v| v.is_empty()) {
        return Err(FragmenterError::UserDataError(format!(
            "The parameter{{RANGE}} must list non-empty values for partition type 'enum', but actual is '{}'",
            range
        )));
    }
    Ok(values)
}

fn parse_date(token: &str) -> Result<NaiveDate, FragmenterError> {
    NaiveDate::parse_from_str(token, DATE_FORMAT).map_err(|_| {
        FragmenterError::UserDataError(format!(
            "The parameter{{RANGE}} value '{}' is not a date in the format yyyy-MM-dd",
            token
        ))
    })
}

fn parse_int(token: &str) -> Result<i32, FragmenterError> {
    token.parse().map_err(|_| {
        FragmenterError::UserDataError(format!(
            "The parameter{{RANGE}} value '{}' is not an integer",
            token
        ))
    })
}

fn check_order<T: PartialOrd + std::fmt::Display>(start: T, end: T) -> Result<(), FragmenterError> {
    if start > end {
        return Err(FragmenterError::UserDataError(format!(
            "The parameter{{RANGE}} start '{}' is after its end '{}'",
            start, end
        )));
    }
    Ok(())
}
