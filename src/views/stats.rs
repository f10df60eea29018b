use std::collections::BTreeMap;

use crate::data::filter::FilteredView;
use crate::data::model::GameRecord;

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

pub const CORRELATION_LABELS: [&str; 5] = ["Downloads", "Rating", "Price", "Length", "Like rate"];

/// Pairwise Pearson correlation of five numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: [&'static str; 5],
    /// `None` where a column is constant and the coefficient is undefined.
    pub cells: [[Option<f64>; 5]; 5],
    /// Number of complete rows the matrix was computed from.
    pub rows: usize,
}

fn correlation_row(g: &GameRecord) -> Option<[f64; 5]> {
    Some([
        g.estimated_downloads?,
        g.rating?,
        g.price?,
        g.length?,
        g.reviews_like_rate?,
    ])
}

/// Correlate downloads, rating, price, length and like rate over rows where
/// all five are known. `None` when no such row exists.
pub fn correlation_matrix(view: &FilteredView) -> Option<CorrelationMatrix> {
    let rows: Vec<[f64; 5]> = view.iter().filter_map(correlation_row).collect();
    if rows.is_empty() {
        return None;
    }
    let n = rows.len() as f64;

    let mut means = [0.0; 5];
    for row in &rows {
        for (m, v) in means.iter_mut().zip(row) {
            *m += v / n;
        }
    }

    // Co-moment sums; only the upper triangle is filled, then mirrored.
    let mut co = [[0.0; 5]; 5];
    for row in &rows {
        for i in 0..5 {
            let di = row[i] - means[i];
            for j in i..5 {
                co[i][j] += di * (row[j] - means[j]);
            }
        }
    }

    let mut cells = [[None; 5]; 5];
    for i in 0..5 {
        cells[i][i] = Some(1.0);
        for j in (i + 1)..5 {
            let denom = (co[i][i] * co[j][j]).sqrt();
            let r = (denom > 0.0).then(|| (co[i][j] / denom).clamp(-1.0, 1.0));
            cells[i][j] = r;
            cells[j][i] = r;
        }
    }

    Some(CorrelationMatrix {
        labels: CORRELATION_LABELS,
        cells,
        rows: rows.len(),
    })
}

// ---------------------------------------------------------------------------
// Downloads per year
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearTotal {
    pub year: i32,
    pub downloads: f64,
}

/// Summed downloads per release year, oldest first. Games without a year
/// are skipped; unknown downloads add nothing.
pub fn yearly_downloads(view: &FilteredView) -> Vec<YearTotal> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for g in view.iter() {
        if let Some(year) = g.release_year {
            *totals.entry(year).or_insert(0.0) += g.estimated_downloads.unwrap_or(0.0);
        }
    }
    totals
        .into_iter()
        .map(|(year, downloads)| YearTotal { year, downloads })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::dataset_from_lines;
    use crate::data::model::Dataset;
    use proptest::prelude::*;

    fn view_all(ds: &Dataset) -> FilteredView<'_> {
        let all: Vec<usize> = (0..ds.len()).collect();
        FilteredView::from_indices(ds, &all)
    }

    #[test]
    fn perfectly_correlated_columns() {
        let ds = dataset_from_lines(&[
            "A,S,1,10,1,100,2020-01-01,RPG,Windows,0,2,1,5",
            "B,S,2,20,2,200,2020-01-01,RPG,Windows,0,4,1,5",
            "C,S,3,30,3,300,2020-01-01,RPG,Windows,0,6,1,5",
        ]);
        let m = correlation_matrix(&view_all(&ds)).unwrap();
        assert_eq!(m.rows, 3);
        for i in 0..5 {
            assert_eq!(m.cells[i][i], Some(1.0));
            for j in 0..5 {
                let r = m.cells[i][j].unwrap();
                assert!((r - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn constant_column_is_undefined_off_diagonal() {
        let ds = dataset_from_lines(&[
            "A,S,5,10,1,100,2020-01-01,RPG,Windows,0,2,1,5",
            "B,S,5,20,2,200,2020-01-01,RPG,Windows,0,4,1,5",
        ]);
        let m = correlation_matrix(&view_all(&ds)).unwrap();
        assert_eq!(m.cells[2][2], Some(1.0));
        assert_eq!(m.cells[2][0], None);
        assert_eq!(m.cells[0][2], None);
    }

    #[test]
    fn incomplete_rows_are_skipped() {
        let ds = dataset_from_lines(&["A,S,5,,1,100,2020-01-01,RPG,Windows,0,2,1,5"]);
        assert!(correlation_matrix(&view_all(&ds)).is_none());
        assert!(correlation_matrix(&FilteredView::default()).is_none());
    }

    #[test]
    fn sums_downloads_per_year() {
        let ds = dataset_from_lines(&[
            "A,S,0,90,4,100,2021-01-01,RPG,Windows,0,10,2,50",
            "B,S,0,90,4,300,2020-05-01,RPG,Windows,0,10,2,50",
            "C,S,0,90,4,,2020-06-01,RPG,Windows,0,10,2,50",
            "D,S,0,90,4,50,2020-07-01,RPG,Windows,0,10,2,50",
            "E,S,0,90,4,70,,RPG,Windows,0,10,2,50",
        ]);
        let totals = yearly_downloads(&view_all(&ds));
        assert_eq!(
            totals,
            vec![
                YearTotal { year: 2020, downloads: 350.0 },
                YearTotal { year: 2021, downloads: 100.0 },
            ]
        );
    }

    proptest! {
        #[test]
        fn matrix_is_symmetric_with_unit_diagonal(
            rows in proptest::collection::vec(
                (1.0f64..1e6, 0.0f64..5.0, 0.0f64..60.0, 1.0f64..100.0, 0.0f64..100.0),
                1..30,
            )
        ) {
            let lines: Vec<String> = rows
                .iter()
                .enumerate()
                .map(|(i, (d, r, p, l, like))| {
                    format!("G{i},S,{p},{like},{r},{d},2020-01-01,RPG,Windows,0,{l},1,5")
                })
                .collect();
            let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
            let ds = dataset_from_lines(&refs);
            let m = correlation_matrix(&view_all(&ds)).unwrap();
            for i in 0..5 {
                prop_assert_eq!(m.cells[i][i], Some(1.0));
                for j in 0..5 {
                    prop_assert_eq!(m.cells[i][j], m.cells[j][i]);
                    if let Some(r) = m.cells[i][j] {
                        prop_assert!((-1.0..=1.0).contains(&r));
                    }
                }
            }
        }
    }
}
