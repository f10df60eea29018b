use std::collections::HashSet;
use std::io::Read;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// RawRecord – one source row before any coercion
// ---------------------------------------------------------------------------

/// Columns every source file must provide. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "game_name",
    "developer",
    "price",
    "reviews_like_rate",
    "rating",
    "estimated_downloads",
    "release_date",
    "user_defined_tags",
    "supported_os",
    "age_restriction",
    "length",
    "difficulty",
    "all_reviews_number",
];

/// A source row with every cell still as text. Every loader (CSV, JSON,
/// Parquet) produces these; [`Dataset::from_raw`] does the cleaning.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    pub game_name: Option<String>,
    pub developer: Option<String>,
    pub price: Option<String>,
    pub reviews_like_rate: Option<String>,
    pub rating: Option<String>,
    pub estimated_downloads: Option<String>,
    pub release_date: Option<String>,
    pub user_defined_tags: Option<String>,
    pub supported_os: Option<String>,
    pub age_restriction: Option<String>,
    pub length: Option<String>,
    pub difficulty: Option<String>,
    pub all_reviews_number: Option<String>,
}

impl RawRecord {
    /// Build a record from a cell accessor keyed by column name.
    pub fn from_cells(mut cell: impl FnMut(&str) -> Option<String>) -> Self {
        RawRecord {
            game_name: cell("game_name"),
            developer: cell("developer"),
            price: cell("price"),
            reviews_like_rate: cell("reviews_like_rate"),
            rating: cell("rating"),
            estimated_downloads: cell("estimated_downloads"),
            release_date: cell("release_date"),
            user_defined_tags: cell("user_defined_tags"),
            supported_os: cell("supported_os"),
            age_restriction: cell("age_restriction"),
            length: cell("length"),
            difficulty: cell("difficulty"),
            all_reviews_number: cell("all_reviews_number"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Parse a numeric cell. Anything that is not a finite number becomes `None`.
pub fn coerce_number(cell: Option<&str>) -> Option<f64> {
    let text = cell?.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b, %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a date cell in any of the formats seen in exported Steam listings.
pub fn coerce_date(cell: Option<&str>) -> Option<NaiveDate> {
    let text = cell?.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

// ---------------------------------------------------------------------------
// GameRecord – one cleaned row
// ---------------------------------------------------------------------------

/// A single game after type coercion and derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub game_name: String,
    pub developer: String,
    pub price: Option<f64>,
    pub reviews_like_rate: Option<f64>,
    pub rating: Option<f64>,
    pub estimated_downloads: Option<f64>,
    pub release_date: Option<NaiveDate>,
    /// Year of `release_date`, `None` when the date is unknown.
    pub release_year: Option<i32>,
    /// True when the price is missing or zero.
    pub is_free: bool,
    pub supported_os: Option<String>,
    /// Comma-separated tags; empty when the source had none.
    pub user_defined_tags: String,
    pub age_restriction: Option<f64>,
    pub length: Option<f64>,
    pub difficulty: Option<f64>,
    pub all_reviews_number: Option<f64>,
}

impl GameRecord {
    /// Coerce a raw row. Never fails: unparsable cells become `None`.
    pub fn from_raw(raw: RawRecord) -> Self {
        let price = coerce_number(raw.price.as_deref());
        let release_date = coerce_date(raw.release_date.as_deref());
        GameRecord {
            game_name: raw.game_name.unwrap_or_default(),
            developer: raw.developer.unwrap_or_default(),
            price,
            reviews_like_rate: coerce_number(raw.reviews_like_rate.as_deref()),
            rating: coerce_number(raw.rating.as_deref()),
            estimated_downloads: coerce_number(raw.estimated_downloads.as_deref()),
            release_date,
            release_year: release_date.map(|d| d.year()),
            is_free: price.unwrap_or(0.0) == 0.0,
            supported_os: raw.supported_os.filter(|s| !s.is_empty()),
            user_defined_tags: raw.user_defined_tags.unwrap_or_default(),
            age_restriction: coerce_number(raw.age_restriction.as_deref()),
            length: coerce_number(raw.length.as_deref()),
            difficulty: coerce_number(raw.difficulty.as_deref()),
            all_reviews_number: coerce_number(raw.all_reviews_number.as_deref()),
        }
    }

    /// "Free" or "Paid", the label used by the developer hierarchies.
    pub fn free_label(&self) -> &'static str {
        if self.is_free {
            "Free"
        } else {
            "Paid"
        }
    }

    /// Non-empty, trimmed tags in source order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.user_defined_tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// First tag, or "Unknown" when the first slot is empty.
    pub fn primary_tag(&self) -> &str {
        match self.user_defined_tags.split(',').next().map(str::trim) {
            Some(tag) if !tag.is_empty() => tag,
            _ => "Unknown",
        }
    }

    /// Supported OS list with all whitespace removed.
    pub fn compact_os(&self) -> Option<String> {
        self.supported_os
            .as_deref()
            .map(|os| os.chars().filter(|c| !c.is_whitespace()).collect())
    }

    /// Human label for the age restriction code. Missing codes count as 0.
    pub fn age_label(&self) -> String {
        let code = self.age_restriction.unwrap_or(0.0).trunc() as i64;
        match code {
            0 => "All Ages".to_string(),
            13 => "Teen 13+".to_string(),
            17 => "Mature 17+".to_string(),
            other => other.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete cleaned dataset
// ---------------------------------------------------------------------------

/// The cleaned dataset. Built once and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<GameRecord>,
    /// Rows removed by (game_name, developer) deduplication.
    duplicates_dropped: usize,
}

impl Dataset {
    /// Clean raw rows: coerce, deduplicate on (game_name, developer) keeping
    /// the first occurrence, derive `release_year` and `is_free`.
    pub fn from_raw(rows: Vec<RawRecord>) -> Self {
        let total = rows.len();
        let mut seen: HashSet<(String, String)> = HashSet::with_capacity(total);
        let mut records = Vec::with_capacity(total);

        for raw in rows {
            let record = GameRecord::from_raw(raw);
            if seen.insert((record.game_name.clone(), record.developer.clone())) {
                records.push(record);
            }
        }

        let duplicates_dropped = total - records.len();
        Dataset {
            records,
            duplicates_dropped,
        }
    }

    /// Parse CSV bytes with a header row into a dataset.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers().context("reading CSV headers")?.clone();
        super::check_columns(headers.iter())?;

        let mut rows = Vec::new();
        for (row_no, result) in reader.deserialize::<RawRecord>().enumerate() {
            let raw = result.with_context(|| format!("CSV row {row_no}"))?;
            rows.push(raw);
        }
        Ok(Dataset::from_raw(rows))
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    /// Number of games.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    pub(crate) const HEADER: &str = "game_name,developer,price,reviews_like_rate,rating,estimated_downloads,release_date,user_defined_tags,supported_os,age_restriction,length,difficulty,all_reviews_number";

    /// Build a dataset from CSV body lines under the standard header.
    pub(crate) fn dataset_from_lines(lines: &[&str]) -> Dataset {
        let text = format!("{HEADER}\n{}\n", lines.join("\n"));
        Dataset::from_csv_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn coerces_invalid_cells_to_none() {
        let ds = dataset_from_lines(&[
            "Alpha,Studio,abc,n/a,4.5,1000,not a date,,Windows,x,12,3,10",
        ]);
        let g = &ds.records()[0];
        assert_eq!(g.price, None);
        assert_eq!(g.reviews_like_rate, None);
        assert_eq!(g.rating, Some(4.5));
        assert_eq!(g.estimated_downloads, Some(1000.0));
        assert_eq!(g.release_date, None);
        assert_eq!(g.release_year, None);
        assert_eq!(g.age_restriction, None);
        assert_eq!(g.user_defined_tags, "");
    }

    #[test]
    fn nan_and_infinity_are_not_numbers() {
        assert_eq!(coerce_number(Some("NaN")), None);
        assert_eq!(coerce_number(Some("inf")), None);
        assert_eq!(coerce_number(Some(" 12.5 ")), Some(12.5));
        assert_eq!(coerce_number(Some("")), None);
        assert_eq!(coerce_number(None), None);
    }

    #[test]
    fn parses_common_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2020, 10, 12);
        assert_eq!(coerce_date(Some("2020-10-12")), expected);
        assert_eq!(coerce_date(Some("2020/10/12")), expected);
        assert_eq!(coerce_date(Some("10/12/2020")), expected);
        assert_eq!(coerce_date(Some("12 Oct, 2020")), expected);
        assert_eq!(coerce_date(Some("Oct 12, 2020")), expected);
        assert_eq!(coerce_date(Some("October 12, 2020")), expected);
        assert_eq!(coerce_date(Some("2020-10-12 08:30:00")), expected);
        assert_eq!(coerce_date(Some("soon")), None);
    }

    #[test]
    fn deduplicates_on_name_and_developer_keeping_first() {
        let ds = dataset_from_lines(&[
            "Alpha,Studio,10,90,4,100,2020-01-01,RPG,Windows,0,10,2,50",
            "Alpha,Other,10,90,4,200,2020-01-01,RPG,Windows,0,10,2,50",
            "Alpha,Studio,0,50,1,999,2021-01-01,Action,Linux,0,10,2,50",
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.duplicates_dropped(), 1);
        assert_eq!(ds.records()[0].estimated_downloads, Some(100.0));
        assert_eq!(ds.records()[1].developer, "Other");
    }

    #[test]
    fn missing_price_counts_as_free() {
        let ds = dataset_from_lines(&[
            "A,S,,90,4,100,2020-01-01,RPG,Windows,0,10,2,50",
            "B,S,0,90,4,100,2020-01-01,RPG,Windows,0,10,2,50",
            "C,S,4.99,90,4,100,2020-01-01,RPG,Windows,0,10,2,50",
        ]);
        let free: Vec<bool> = ds.records().iter().map(|g| g.is_free).collect();
        assert_eq!(free, vec![true, true, false]);
        assert_eq!(ds.records()[2].free_label(), "Paid");
    }

    #[test]
    fn tags_and_primary_tag() {
        let ds = dataset_from_lines(&[
            "A,S,0,90,4,100,2020-01-01,\"RPG, Action,,Indie\",Windows,0,10,2,50",
            "B,S,0,90,4,100,2020-01-01,,Windows,0,10,2,50",
        ]);
        let a = &ds.records()[0];
        assert_eq!(a.tags().collect::<Vec<_>>(), vec!["RPG", "Action", "Indie"]);
        assert_eq!(a.primary_tag(), "RPG");
        assert_eq!(ds.records()[1].primary_tag(), "Unknown");
    }

    #[test]
    fn age_labels() {
        let mut g = GameRecord::from_raw(RawRecord::default());
        assert_eq!(g.age_label(), "All Ages");
        g.age_restriction = Some(13.0);
        assert_eq!(g.age_label(), "Teen 13+");
        g.age_restriction = Some(17.0);
        assert_eq!(g.age_label(), "Mature 17+");
        g.age_restriction = Some(18.0);
        assert_eq!(g.age_label(), "18");
    }

    #[test]
    fn missing_column_is_an_error() {
        let text = "game_name,developer,price\nA,S,1\n";
        let err = Dataset::from_csv_reader(text.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("reviews_like_rate"));
    }

    #[test]
    fn loading_twice_is_deterministic() {
        let lines = [
            "A,S,1,90,4,100,2020-01-01,RPG,Windows,0,10,2,50",
            "B,T,,80,3,50,bad,Action,\"Windows, macOS\",13,5,1,20",
        ];
        assert_eq!(dataset_from_lines(&lines), dataset_from_lines(&lines));
    }

    proptest! {
        #[test]
        fn free_flag_matches_price(price in proptest::option::of(0.0f64..100.0), zero in any::<bool>()) {
            let price = if zero { Some(0.0) } else { price };
            let raw = RawRecord {
                price: price.map(|p| p.to_string()),
                ..RawRecord::default()
            };
            let g = GameRecord::from_raw(raw);
            prop_assert_eq!(g.is_free, price.map_or(true, |p| p == 0.0));
        }

        #[test]
        fn release_year_follows_release_date(y in 1990i32..2030, m in 1u32..=12, d in 1u32..=28, valid in any::<bool>()) {
            let cell = if valid { format!("{y:04}-{m:02}-{d:02}") } else { format!("{y}?{m}") };
            let raw = RawRecord { release_date: Some(cell), ..RawRecord::default() };
            let g = GameRecord::from_raw(raw);
            match g.release_date {
                Some(date) => prop_assert_eq!(g.release_year, Some(date.year())),
                None => prop_assert_eq!(g.release_year, None),
            }
            prop_assert_eq!(g.release_date.is_some(), valid);
        }
    }
}
