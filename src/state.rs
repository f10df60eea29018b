use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::color::CategoryColors;
use crate::config::{ChartLayout, IcicleLimits};
use crate::data::filter::{apply_filters, FilterDomain, FilterParams, FilteredView};
use crate::data::model::Dataset;
use crate::ui::layout::Orbit;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset. Replaced wholesale on reload, never mutated.
    pub dataset: Dataset,

    /// File the dataset came from.
    pub source: PathBuf,

    /// Ranges and option lists offered by the sidebar.
    pub domain: FilterDomain,

    /// Current sidebar selections.
    pub filters: FilterParams,

    /// Indices of games passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Genre icicle sliders.
    pub icicle: IcicleLimits,

    /// Which chart line-up is shown.
    pub layout: ChartLayout,

    /// Stable developer colours across every chart.
    pub developer_colors: CategoryColors,

    /// Camera of each 3D chart.
    pub profile_orbit: Orbit,
    pub reviews_orbit: Orbit,

    /// Search boxes of the multi-selects.
    pub developer_search: String,
    pub os_search: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: Dataset, source: &Path) -> Self {
        let mut state = Self {
            dataset: Dataset::default(),
            source: PathBuf::new(),
            domain: FilterDomain::default(),
            filters: FilterParams::default(),
            visible_indices: Vec::new(),
            icicle: IcicleLimits::default(),
            layout: ChartLayout::default(),
            developer_colors: CategoryColors::new(std::iter::empty::<&str>()),
            profile_orbit: Orbit::default(),
            reviews_orbit: Orbit::default(),
            developer_search: String::new(),
            os_search: String::new(),
            status_message: None,
        };
        state.set_dataset(dataset, source);
        state
    }

    /// Ingest a newly loaded dataset, initialise filters and colours.
    pub fn set_dataset(&mut self, dataset: Dataset, source: &Path) {
        self.domain = FilterDomain::from_dataset(&dataset);
        self.filters = FilterParams::for_domain(&self.domain);
        self.developer_colors =
            CategoryColors::new(self.domain.developer_options.iter().map(String::as_str));
        self.dataset = dataset;
        self.source = source.to_path_buf();
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        self.visible_indices = apply_filters(&self.dataset, &self.filters).into_indices();
        log::debug!(
            "{} of {} games pass the filters",
            self.visible_indices.len(),
            self.dataset.len()
        );
    }

    /// The games currently passing the filters.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::from_indices(&self.dataset, &self.visible_indices)
    }

    /// Toggle a developer in the multi-select.
    pub fn toggle_developer(&mut self, developer: &str) {
        toggle(&mut self.filters.selected_developers, developer);
        self.refilter();
    }

    /// Toggle an OS in the multi-select.
    pub fn toggle_os(&mut self, os: &str) {
        toggle(&mut self.filters.selected_os, os);
        self.refilter();
    }

    /// Set the year range, swapping the ends if they cross.
    pub fn set_year_range(&mut self, lo: i32, hi: i32) {
        self.filters.year_range = (lo.min(hi), lo.max(hi));
        self.refilter();
    }

    /// Back to the initial selections for this dataset.
    pub fn reset_filters(&mut self) {
        self.filters = FilterParams::for_domain(&self.domain);
        self.developer_search.clear();
        self.os_search.clear();
        self.refilter();
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::dataset_from_lines;

    fn state() -> AppState {
        let ds = dataset_from_lines(&[
            "A,Valve,0,90,4.5,100000,2015-01-01,RPG,Windows,0,10,2,50",
            "B,Valve,9.99,80,4.0,300000,2018-06-01,Action,Linux,13,20,3,70",
            "C,Indie,,70,3.5,250000,2020-03-03,RPG,Linux,0,5,1,10",
        ]);
        AppState::new(ds, Path::new("games.csv"))
    }

    #[test]
    fn starts_with_everything_visible() {
        let s = state();
        assert_eq!(s.visible_indices, vec![0, 1, 2]);
        assert_eq!(s.filters.year_range, (2015, 2020));
        assert_eq!(s.view().len(), 3);
    }

    #[test]
    fn toggling_refilters() {
        let mut s = state();
        s.toggle_developer("Indie");
        assert_eq!(s.visible_indices, vec![2]);
        s.toggle_developer("Indie");
        assert_eq!(s.visible_indices, vec![0, 1, 2]);

        s.toggle_os("Linux");
        assert_eq!(s.visible_indices, vec![1, 2]);
    }

    #[test]
    fn year_range_is_kept_ordered_and_reset_restores() {
        let mut s = state();
        s.set_year_range(2019, 2016);
        assert_eq!(s.filters.year_range, (2016, 2019));
        assert_eq!(s.visible_indices, vec![1]);

        s.reset_filters();
        assert_eq!(s.visible_indices, vec![0, 1, 2]);
    }
}
