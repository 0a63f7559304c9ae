//! Dates and date intervals.
//!
//! A date node is identified by its owner (a work or an interval), its role
//! there (`date`, `start`, `end`) and its value. No two places share a date
//! node, even when they hold the same date. Intervals are identified by the
//! entity they belong to. Editing one end of an interval therefore replaces
//! exactly the link to that end and the three value facts of the date.

use chrono::NaiveDate;

use crate::graph::{Graph, Iri, Literal};
use crate::identity::{Attributes, IdentifierStrategy, attrs};
use crate::source::non_empty;
use crate::vocab::{rdf, rdfs, vivo};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A date known to year, year-month, or year-month-day precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParts {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

impl DateParts {
    /// Build from loosely-typed source strings.
    ///
    /// The year must be exactly four digits; anything else (`"in press"`,
    /// `"n.d."`) means there is no date. An unparseable month drops the month
    /// and day; a day that does not exist in that month drops the day.
    pub fn parse(year: Option<&str>, month: Option<&str>, day: Option<&str>) -> Option<Self> {
        let year = year.and_then(non_empty)?;
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let month = month.and_then(parse_month);
        let day = month.and(day.and_then(non_empty)).and_then(|d| d.parse::<u32>().ok());
        Some(Self::checked(year, month, day))
    }

    /// Build from numeric parts, as found in Crossref `date-parts`.
    pub fn from_numbers(year: i64, month: Option<i64>, day: Option<i64>) -> Option<Self> {
        if !(1000..=9999).contains(&year) {
            return None;
        }
        let month = month
            .and_then(|m| u32::try_from(m).ok())
            .filter(|m| (1..=12).contains(m));
        let day = month.and(day).and_then(|d| u32::try_from(d).ok());
        Some(Self::checked(year as i32, month, day))
    }

    pub fn year_only(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    fn checked(year: i32, month: Option<u32>, day: Option<u32>) -> Self {
        let day = match (month, day) {
            (Some(m), Some(d)) => NaiveDate::from_ymd_opt(year, m, d).map(|_| d),
            _ => None,
        };
        Self { year, month, day }
    }

    pub fn precision(&self) -> &'static str {
        match (self.month, self.day) {
            (Some(_), Some(_)) => vivo::YEAR_MONTH_DAY_PRECISION,
            (Some(_), None) => vivo::YEAR_MONTH_PRECISION,
            _ => vivo::YEAR_PRECISION,
        }
    }

    /// `xsd:dateTime` lexical form at midnight, missing parts as `01`.
    pub fn date_time(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}T00:00:00",
            self.year,
            self.month.unwrap_or(1),
            self.day.unwrap_or(1)
        )
    }

    /// Human-readable label matching the precision: `1997`, `June 1997`,
    /// `June 11, 1997`.
    pub fn label(&self) -> String {
        match (self.month, self.day) {
            (Some(m), Some(d)) => format!("{} {d}, {}", month_name(m), self.year),
            (Some(m), None) => format!("{} {}", month_name(m), self.year),
            _ => self.year.to_string(),
        }
    }

    fn identity(&self) -> Attributes {
        Attributes::new()
            .with("year", self.year.to_string())
            .with("month", self.month.map(|m| format!("{m:02}")))
            .with("day", self.day.map(|d| format!("{d:02}")))
    }
}

fn month_name(month: u32) -> &'static str {
    MONTHS[(month as usize - 1) % 12]
}

/// A month given as a number (`"06"`, `"6"`) or an English name or
/// three-letter abbreviation.
fn parse_month(value: &str) -> Option<u32> {
    let value = non_empty(value)?;
    if let Ok(n) = value.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let lower = value.trim_end_matches('.').to_lowercase();
    MONTHS
        .iter()
        .position(|m| {
            let m = m.to_lowercase();
            m == lower || (lower.len() == 3 && m.starts_with(&lower))
        })
        .map(|i| i as u32 + 1)
}

/// Emit the value facts of the date `owner` holds as `role` and return its
/// identifier.
pub fn add_date(
    ids: &dyn IdentifierStrategy,
    graph: &mut Graph,
    owner: &Iri,
    role: &str,
    date: &DateParts,
) -> Iri {
    let identity = date.identity().with("owner", owner).with("role", role);
    let iri = ids.identifier_for(vivo::DATE_TIME_VALUE, &identity, None);
    graph.add(&iri, vivo::DATE_TIME_PRECISION, Iri::from(date.precision()));
    graph.add(&iri, vivo::DATE_TIME, Literal::date_time(date.date_time()));
    graph.add(&iri, rdfs::LABEL, Literal::plain(date.label()));
    iri
}

/// Link `subject` to an interval with the given ends. Nothing is emitted
/// when both ends are absent.
pub fn add_date_interval(
    ids: &dyn IdentifierStrategy,
    graph: &mut Graph,
    subject: &Iri,
    start: Option<&DateParts>,
    end: Option<&DateParts>,
) -> Option<Iri> {
    if start.is_none() && end.is_none() {
        return None;
    }
    let interval = ids.identifier_for(vivo::DATE_TIME_INTERVAL, &attrs("subject", subject), None);
    graph.add(&interval, rdf::TYPE, Iri::from(vivo::DATE_TIME_INTERVAL));
    graph.add(subject, vivo::DATE_TIME_INTERVAL_PROP, &interval);
    if let Some(start) = start {
        let start = add_date(ids, graph, &interval, "start", start);
        graph.add(&interval, vivo::START, start);
    }
    if let Some(end) = end {
        let end = add_date(ids, graph, &interval, "end", end);
        graph.add(&interval, vivo::END, end);
    }
    Some(interval)
}
