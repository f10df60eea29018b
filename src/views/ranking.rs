use crate::data::filter::FilteredView;
use crate::data::model::{Dataset, GameRecord};

use super::{by_downloads_desc, desc_nulls_last};

// ---------------------------------------------------------------------------
// Top downloads bar chart
// ---------------------------------------------------------------------------

/// The `n` most downloaded games.
pub fn top_downloads<'a>(view: &FilteredView<'a>, n: usize) -> Vec<&'a GameRecord> {
    let mut top = by_downloads_desc(view.iter());
    top.truncate(n);
    top
}

// ---------------------------------------------------------------------------
// Parallel coordinates
// ---------------------------------------------------------------------------

/// Axis labels of [`ParallelRow::axes`], in drawing order.
pub const PARALLEL_AXES: [&str; 5] = ["Downloads", "Rating", "Price", "Length", "Difficulty"];

/// A game with all five parallel-coordinate dimensions known.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelRow {
    pub game_name: String,
    pub developer: String,
    pub downloads: f64,
    pub rating: f64,
    pub price: f64,
    pub length: f64,
    pub difficulty: f64,
}

impl ParallelRow {
    fn from_record(g: &GameRecord) -> Option<Self> {
        Some(ParallelRow {
            game_name: g.game_name.clone(),
            developer: g.developer.clone(),
            downloads: g.estimated_downloads?,
            rating: g.rating?,
            price: g.price?,
            length: g.length?,
            difficulty: g.difficulty?,
        })
    }

    pub fn axes(&self) -> [f64; 5] {
        [self.downloads, self.rating, self.price, self.length, self.difficulty]
    }
}

/// Complete rows only, most downloaded first, at most `n`.
pub fn parallel_coordinates(view: &FilteredView, n: usize) -> Vec<ParallelRow> {
    let mut rows: Vec<ParallelRow> = view.iter().filter_map(ParallelRow::from_record).collect();
    rows.sort_by(|a, b| b.downloads.total_cmp(&a.downloads));
    rows.truncate(n);
    rows
}

// ---------------------------------------------------------------------------
// Price vs rating bubbles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub game_name: String,
    pub developer: String,
    pub price: f64,
    pub rating: f64,
    /// Drives the marker size.
    pub downloads: f64,
}

/// Take the `n` most downloaded games, then keep those that can be placed
/// (known price, rating and downloads).
pub fn price_rating_bubbles(view: &FilteredView, n: usize) -> Vec<Bubble> {
    top_downloads(view, n)
        .into_iter()
        .filter_map(|g| {
            Some(Bubble {
                game_name: g.game_name.clone(),
                developer: g.developer.clone(),
                price: g.price?,
                rating: g.rating?,
                downloads: g.estimated_downloads?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// 3D views (unfiltered)
// ---------------------------------------------------------------------------

/// Difficulty / length / rating of one game.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePoint {
    pub game_name: String,
    pub developer: String,
    pub difficulty: f64,
    pub length: f64,
    pub rating: f64,
}

/// Best rated `n` games with a complete design profile. Reads the whole
/// dataset; sidebar filters do not apply.
pub fn design_profile(dataset: &Dataset, n: usize) -> Vec<ProfilePoint> {
    let mut points: Vec<ProfilePoint> = dataset
        .records()
        .iter()
        .filter(|g| !g.game_name.is_empty() && !g.developer.is_empty())
        .filter_map(|g| {
            Some(ProfilePoint {
                game_name: g.game_name.clone(),
                developer: g.developer.clone(),
                difficulty: g.difficulty?,
                length: g.length?,
                rating: g.rating?,
            })
        })
        .collect();
    points.sort_by(|a, b| desc_nulls_last(Some(a.rating), Some(b.rating)));
    points.truncate(n);
    points
}

/// Price / rating / length of one game, sized by its review count.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPoint {
    pub game_name: String,
    pub developer: String,
    pub price: f64,
    pub rating: f64,
    pub length: f64,
    pub all_reviews_number: f64,
    pub downloads: f64,
}

/// Most downloaded `n` games with all five fields known. Reads the whole
/// dataset; sidebar filters do not apply.
pub fn price_rating_length(dataset: &Dataset, n: usize) -> Vec<ReviewPoint> {
    let mut points: Vec<ReviewPoint> = dataset
        .records()
        .iter()
        .filter_map(|g| {
            Some(ReviewPoint {
                game_name: g.game_name.clone(),
                developer: g.developer.clone(),
                price: g.price?,
                rating: g.rating?,
                length: g.length?,
                all_reviews_number: g.all_reviews_number?,
                downloads: g.estimated_downloads?,
            })
        })
        .collect();
    points.sort_by(|a, b| b.downloads.total_cmp(&a.downloads));
    points.truncate(n);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filters, FilterParams};
    use crate::data::model::tests::dataset_from_lines;

    fn sample() -> Dataset {
        dataset_from_lines(&[
            "A,S,0,90,4.5,100,2015-01-01,RPG,Windows,0,10,2,50",
            "B,S,9.99,80,,300,2018-06-01,Action,Windows,13,20,3,70",
            "C,T,5,70,3.5,,2020-03-03,RPG,Linux,0,5,1,10",
            "D,T,19.99,60,3.0,200,2021-01-01,Action,Windows,17,30,,90",
            "E,U,1,50,4.9,50,,Indie,Windows,0,2,1,5",
        ])
    }

    fn all(ds: &Dataset) -> FilteredView<'_> {
        let params = FilterParams {
            year_range: (2000, 2030),
            ..FilterParams::default()
        };
        apply_filters(ds, &params)
    }

    #[test]
    fn top_downloads_sorts_and_truncates() {
        let ds = sample();
        let view = FilteredView::from_indices(&ds, &[0, 1, 2, 3, 4]);
        let top: Vec<&str> = top_downloads(&view, 3).iter().map(|g| g.game_name.as_str()).collect();
        assert_eq!(top, vec!["B", "D", "A"]);
        assert!(top_downloads(&FilteredView::default(), 20).is_empty());
    }

    #[test]
    fn parallel_rows_need_every_dimension() {
        let ds = sample();
        let view = FilteredView::from_indices(&ds, &[0, 1, 2, 3, 4]);
        let rows = parallel_coordinates(&view, 200);
        let names: Vec<&str> = rows.iter().map(|r| r.game_name.as_str()).collect();
        // B lacks rating, C lacks downloads, D lacks difficulty.
        assert_eq!(names, vec!["A", "E"]);
        assert_eq!(rows[0].axes(), [100.0, 4.5, 0.0, 10.0, 2.0]);
    }

    #[test]
    fn bubbles_drop_unplaceable_games_after_truncation() {
        let ds = sample();
        let view = FilteredView::from_indices(&ds, &[0, 1, 2, 3, 4]);
        let bubbles = price_rating_bubbles(&view, 2);
        // Top two are B (no rating) and D.
        assert_eq!(bubbles.len(), 1);
        assert_eq!(bubbles[0].game_name, "D");
    }

    #[test]
    fn three_d_views_ignore_filters() {
        let ds = sample();
        let view = all(&ds);
        assert!(view.len() < ds.len());

        let profile = design_profile(&ds, 200);
        let names: Vec<&str> = profile.iter().map(|p| p.game_name.as_str()).collect();
        assert_eq!(names, vec!["E", "A", "C"]);

        let reviews = price_rating_length(&ds, 1);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].game_name, "D");
    }
}
