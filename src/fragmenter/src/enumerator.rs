//! Walks the key domain of a partition plan and produces fragment metadata.
//!
//! Every fragment covers a half-open interval `[start, end)`. Consecutive fragments abut and
//! the last one is clipped to the range end.
use crate::partition::{IntervalUnit, PartitionPlan};
use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime};
use common::byte_util::{concat, encode_i32, encode_i64};
use common::FragmenterError;

/// Steps over `[start, end)` of an int plan.
pub struct IntSteps {
    next: i32,
    end: i32,
    interval: i32,
}

impl IntSteps {
    pub fn new(start: i32, end: i32, interval: i32) -> Self {
        Self {
            next: start,
            end,
            interval,
        }
    }
}

impl Iterator for IntSteps {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let frag_start = self.next;
        // Overflow past i32::MAX is necessarily past the range end.
        let frag_end = match frag_start.checked_add(self.interval) {
            Some(e) if e <= self.end => e,
            _ => self.end,
        };
        self.next = frag_end;
        Some((frag_start, frag_end))
    }
}

/// Steps over `[start, end)` of a date plan using calendar arithmetic.
///
/// Each fragment starts where the previous one ended, so month steps from the 31st drift to
/// the end of shorter months the same way repeated calendar additions do.
pub struct DateSteps {
    next: NaiveDate,
    end: NaiveDate,
    interval: u32,
    unit: IntervalUnit,
}

impl DateSteps {
    pub fn new(start: NaiveDate, end: NaiveDate, interval: u32, unit: IntervalUnit) -> Self {
        Self {
            next: start,
            end,
            interval,
            unit,
        }
    }
}

impl Iterator for DateSteps {
    type Item = (NaiveDate, NaiveDate);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let frag_start = self.next;
        let frag_end = match add_interval(frag_start, self.interval, self.unit) {
            Some(e) if e <= self.end => e,
            _ => self.end,
        };
        self.next = frag_end;
        Some((frag_start, frag_end))
    }
}

fn add_interval(date: NaiveDate, n: u32, unit: IntervalUnit) -> Option<NaiveDate> {
    match unit {
        IntervalUnit::Day => date.checked_add_days(Days::new(u64::from(n))),
        IntervalUnit::Month => date.checked_add_months(Months::new(n)),
        IntervalUnit::Year => n
            .checked_mul(12)
            .and_then(|months| date.checked_add_months(Months::new(months))),
    }
}

/// Milliseconds since the Unix epoch of midnight UTC on `date`.
pub fn date_to_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// UTC calendar date of an epoch-millisecond timestamp.
pub fn millis_to_date(millis: i64) -> Result<NaiveDate, FragmenterError> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| {
            FragmenterError::MalformedMetadata(format!(
                "timestamp {} is out of the supported date range",
                millis
            ))
        })
}

/// Produces the metadata of every fragment of a plan, in enumeration order.
///
/// Without a plan the whole table is a single fragment with empty metadata.
///
/// # Arguments
///
/// * `plan` - Parsed partition plan, if any.
/// * `max_fragments` - Upper bound on the number of fragments. Exceeding it fails the whole
///   request rather than returning a truncated list.
pub fn fragment_metadata(
    plan: Option<&PartitionPlan>,
    max_fragments: Option<usize>,
) -> Result<Vec<Vec<u8>>, FragmenterError> {
    let metadata: Box<dyn Iterator<Item = Vec<u8>> + '_> = match plan {
        None => Box::new(std::iter::once(Vec::new())),
        Some(PartitionPlan::Date {
            start,
            end,
            interval,
            unit,
            ..
        }) => Box::new(
            DateSteps::new(*start, *end, *interval, *unit).map(|(s, e)| {
                concat(
                    &encode_i64(date_to_millis(s)),
                    &encode_i64(date_to_millis(e)),
                )
            }),
        ),
        Some(PartitionPlan::Int {
            start,
            end,
            interval,
            ..
        }) => Box::new(
            IntSteps::new(*start, *end, *interval)
                .map(|(s, e)| concat(&encode_i32(s), &encode_i32(e))),
        ),
        Some(PartitionPlan::Enum { values, .. }) => {
            Box::new(values.iter().map(|v| v.as_bytes().to_vec()))
        }
    };

    let mut fragments = Vec::new();
    for m in metadata {
        if let Some(max) = max_fragments {
            if fragments.len() >= max {
                return Err(FragmenterError::UserDataError(format!(
                    "The partition parameters yield more than {} fragments",
                    max
                )));
            }
        }
        fragments.push(m);
    }
    if fragments.is_empty() {
        warn!("Partition range is empty, no fragments produced");
    }
    Ok(fragments)
}
