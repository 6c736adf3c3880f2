use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone};
use std::fmt;

/// Academic term of a semester code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    Spring,
    Summer,
    Fall,
}

impl Term {
    /// Term for a zero-based month index (0 = January)
    pub fn for_month0(month0: u32) -> Self {
        match month0 {
            0..=4 => Term::Spring,
            5..=6 => Term::Summer,
            _ => Term::Fall,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Term::Spring => "Spring",
            Term::Summer => "Summer",
            Term::Fall => "Fall",
        };
        f.write_str(name)
    }
}

fn two_digit_year(year: i32) -> String {
    format!("{:02}", year.rem_euclid(100))
}

/// Semester code such as `Spring24` for the given date
pub fn semester_code(date: NaiveDate) -> String {
    format!("{}{}", Term::for_month0(date.month0()), two_digit_year(date.year()))
}

/// Semester code for "now" in the given timezone
pub fn current_semester_code<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    semester_code(now.date_naive())
}

/// Compare semester codes ignoring case (`SPRING24` == `Spring24`)
pub fn semester_matches(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Options for listing selectable semesters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemesterRangeOptions {
    pub years_back: i32,
    pub years_forward: i32,
    pub include_summer: bool,
    pub start_year: Option<i32>,
}

impl Default for SemesterRangeOptions {
    fn default() -> Self {
        Self {
            years_back: 1,
            years_forward: 2,
            include_summer: true,
            start_year: None,
        }
    }
}

/// Semester codes from `start_year` through `year + years_forward`, term by term
pub fn semester_options(date: NaiveDate, options: SemesterRangeOptions) -> Vec<String> {
    let start_year = options.start_year.unwrap_or(date.year() - options.years_back);
    let end_year = date.year() + options.years_forward;
    let terms: &[Term] = if options.include_summer {
        &[Term::Spring, Term::Summer, Term::Fall]
    } else {
        &[Term::Spring, Term::Fall]
    };

    let mut codes = Vec::new();
    for year in start_year..=end_year {
        let yy = two_digit_year(year);
        for term in terms {
            codes.push(format!("{}{}", term, yy));
        }
    }
    codes
}

/// Inclusive first/last day of a month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthRange {
    /// Range for a 1-based month; `None` for a month outside 1..=12
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        // Day zero of the following month
        let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self { start, end })
    }

    /// Date-only strings for the API query, `(start_date, end_date)`
    pub fn query_dates(&self) -> (String, String) {
        (
            self.start.format("%Y-%m-%d").to_string(),
            self.end.format("%Y-%m-%d").to_string(),
        )
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> u32 {
        self.end.day()
    }
}

/// Range of the month containing `anchor`
pub fn month_range(anchor: NaiveDate) -> MonthRange {
    MonthRange::for_month(anchor.year(), anchor.month()).unwrap_or(MonthRange {
        start: anchor,
        end: anchor,
    })
}

/// First day of the previous month
pub fn previous_month(anchor: NaiveDate) -> NaiveDate {
    let first = month_range(anchor).start;
    first.checked_sub_months(Months::new(1)).unwrap_or(first)
}

/// First day of the next month
pub fn next_month(anchor: NaiveDate) -> NaiveDate {
    let first = month_range(anchor).start;
    first.checked_add_months(Months::new(1)).unwrap_or(first)
}
