use std::collections::{BTreeSet, HashMap};

use super::model::{Dataset, GameRecord};

// ---------------------------------------------------------------------------
// Filter domain: what each sidebar control can offer
// ---------------------------------------------------------------------------

/// Value ranges and option lists for the sidebar controls, derived from
/// the cleaned dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterDomain {
    /// Smallest and largest known download count.
    pub download_bounds: Option<(f64, f64)>,
    /// Earliest and latest known release year.
    pub year_bounds: Option<(i32, i32)>,
    /// Developers ordered by number of games, most prolific first.
    pub developer_options: Vec<String>,
    /// Distinct OS names, sorted.
    pub os_options: Vec<String>,
}

impl FilterDomain {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let records = dataset.records();

        let download_bounds = min_max(records.iter().filter_map(|g| g.estimated_downloads));
        let year_bounds = records
            .iter()
            .filter_map(|g| g.release_year)
            .fold(None, |acc: Option<(i32, i32)>, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            });

        FilterDomain {
            download_bounds,
            year_bounds,
            developer_options: developers_by_frequency(records),
            os_options: os_tokens(records),
        }
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Distinct non-empty developers, most games first. Ties keep
/// first-appearance order.
fn developers_by_frequency(records: &[GameRecord]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for g in records.iter().filter(|g| !g.developer.is_empty()) {
        let count = counts.entry(g.developer.as_str()).or_insert(0);
        if *count == 0 {
            order.push(g.developer.as_str());
        }
        *count += 1;
    }
    order.sort_by_key(|dev| std::cmp::Reverse(counts[dev]));
    order.into_iter().map(str::to_string).collect()
}

/// Split every `supported_os` value on commas after removing whitespace.
fn os_tokens(records: &[GameRecord]) -> Vec<String> {
    let tokens: BTreeSet<String> = records
        .iter()
        .filter_map(GameRecord::compact_os)
        .flat_map(|os| {
            os.split(',')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();
    tokens.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// The sidebar selections. Empty sets mean "no restriction".
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub selected_developers: BTreeSet<String>,
    pub selected_os: BTreeSet<String>,
    /// Games with fewer (or unknown) downloads are hidden.
    pub min_downloads: f64,
    /// Inclusive release year range. Games without a year are hidden.
    pub year_range: (i32, i32),
    /// Only show games whose price is exactly zero.
    pub free_only: bool,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            selected_developers: BTreeSet::new(),
            selected_os: BTreeSet::new(),
            min_downloads: 0.0,
            year_range: (i32::MIN, i32::MAX),
            free_only: false,
        }
    }
}

impl FilterParams {
    /// Initial selections for a freshly loaded dataset: everything in range.
    pub fn for_domain(domain: &FilterDomain) -> Self {
        Self {
            year_range: domain.year_bounds.unwrap_or((i32::MIN, i32::MAX)),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// One independent sidebar predicate. The filtered view is the conjunction
/// of all of them, so their order does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Developer,
    OperatingSystem,
    Downloads,
    Year,
    FreeOnly,
}

impl Predicate {
    pub const ALL: [Predicate; 5] = [
        Predicate::Developer,
        Predicate::OperatingSystem,
        Predicate::Downloads,
        Predicate::Year,
        Predicate::FreeOnly,
    ];

    pub fn matches(self, game: &GameRecord, params: &FilterParams) -> bool {
        match self {
            Predicate::Developer => {
                params.selected_developers.is_empty()
                    || params.selected_developers.contains(&game.developer)
            }
            Predicate::OperatingSystem => {
                if params.selected_os.is_empty() {
                    return true;
                }
                // Substring match: "OS" also matches "macOS".
                game.compact_os().is_some_and(|os| {
                    params.selected_os.iter().any(|token| os.contains(token.as_str()))
                })
            }
            Predicate::Downloads => game
                .estimated_downloads
                .is_some_and(|d| d >= params.min_downloads),
            Predicate::Year => game.release_year.is_some_and(|y| {
                let (lo, hi) = params.year_range;
                lo <= y && y <= hi
            }),
            Predicate::FreeOnly => !params.free_only || game.price == Some(0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// The games passing every active filter, in dataset order, together with
/// their dataset indices.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    indices: Vec<usize>,
    records: Vec<&'a GameRecord>,
}

impl<'a> FilteredView<'a> {
    /// View over the dataset rows at `indices`. Out-of-range indices are skipped.
    pub fn from_indices(dataset: &'a Dataset, indices: &[usize]) -> Self {
        let all = dataset.records();
        let (indices, records) = indices
            .iter()
            .filter_map(|&i| all.get(i).map(|g| (i, g)))
            .unzip();
        Self { indices, records }
    }

    /// Dataset positions of the visible games, the form `AppState` caches.
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn records(&self) -> &[&'a GameRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a GameRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Indices of the games passing every predicate.
fn filtered_indices(dataset: &Dataset, params: &FilterParams) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, g)| Predicate::ALL.iter().all(|p| p.matches(g, params)))
        .map(|(i, _)| i)
        .collect()
}

/// Apply the sidebar filters to the dataset.
pub fn apply_filters<'a>(dataset: &'a Dataset, params: &FilterParams) -> FilteredView<'a> {
    FilteredView::from_indices(dataset, &filtered_indices(dataset, params))
}
