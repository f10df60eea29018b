//! Compile-time defaults. The app has no config file; everything the user
//! can change lives in the sidebar.

/// Dataset loaded at startup, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data/bestSelling_games.csv";

pub const WINDOW_SIZE: [f32; 2] = [1400.0, 900.0];
pub const MIN_WINDOW_SIZE: [f32; 2] = [800.0, 500.0];

/// Step of the "Minimum downloads" input.
pub const DOWNLOAD_STEP: f64 = 100_000.0;

// Row limits per chart.
pub const TOP_BAR_GAMES: usize = 20;
pub const PARALLEL_ROWS: usize = 200;
pub const BUBBLE_GAMES: usize = 100;
pub const TAG_SUNBURST_GAMES: usize = 10;
pub const YEAR_SUNBURST_GAMES: usize = 20;
pub const DEVELOPER_ICICLE_GAMES: usize = 20;
pub const SCATTER_3D_POINTS: usize = 200;

/// User-adjustable limits of the genre icicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcicleLimits {
    pub max_tags: usize,
    pub max_games: usize,
}

impl IcicleLimits {
    pub const TAG_RANGE: std::ops::RangeInclusive<usize> = 3..=30;
    pub const GAME_RANGE: std::ops::RangeInclusive<usize> = 3..=50;
}

impl Default for IcicleLimits {
    fn default() -> Self {
        Self {
            max_tags: 8,
            max_games: 10,
        }
    }
}

/// Which of the two chart line-ups is shown. Both share the bar, treemap,
/// parallel coordinates, bubble, heatmap and line charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartLayout {
    /// Tag sunburst, genre icicle, 3D design profile.
    #[default]
    Genres,
    /// Year sunburst, developer icicle, 3D price/rating/length scatter.
    Developers,
}

impl ChartLayout {
    pub fn label(self) -> &'static str {
        match self {
            ChartLayout::Genres => "Genres",
            ChartLayout::Developers => "Developers",
        }
    }
}
