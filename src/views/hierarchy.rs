use std::collections::{HashMap, HashSet};

use crate::data::filter::FilteredView;
use crate::data::model::GameRecord;

use super::by_downloads_desc;

// ---------------------------------------------------------------------------
// Hierarchy – the shared view behind treemap, sunburst and icicle charts
// ---------------------------------------------------------------------------

/// One weighted leaf before grouping: `path` runs from the outermost level
/// down to the leaf label.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyLeaf {
    pub path: Vec<String>,
    pub value: f64,
    pub color: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub label: String,
    /// Sum of the leaf values below (or at) this node.
    pub value: f64,
    /// Value-weighted mean of the leaf colours below this node.
    pub color: Option<f64>,
    /// Sorted by value, biggest first.
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A forest of labelled, weighted nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hierarchy {
    /// Name of each level, outermost first.
    pub levels: Vec<&'static str>,
    pub roots: Vec<HierarchyNode>,
}

impl Hierarchy {
    /// Group leaves by path. Leaves without a positive finite value are
    /// dropped; leaves sharing a full path are merged.
    pub fn from_leaves(levels: &[&'static str], leaves: Vec<HierarchyLeaf>) -> Self {
        let kept: Vec<&HierarchyLeaf> = leaves
            .iter()
            .filter(|l| l.value.is_finite() && l.value > 0.0 && !l.path.is_empty())
            .collect();
        let dropped = leaves.len() - kept.len();
        if dropped > 0 {
            log::trace!("{dropped} hierarchy leaves without a usable weight");
        }

        Hierarchy {
            levels: levels.to_vec(),
            roots: build_level(&kept, 0).into_iter().map(|b| b.node).collect(),
        }
    }

    pub fn total(&self) -> f64 {
        self.roots.iter().map(|n| n.value).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Largest and smallest colour value among all nodes.
    pub fn color_range(&self) -> Option<(f64, f64)> {
        fn walk(nodes: &[HierarchyNode], acc: &mut Option<(f64, f64)>) {
            for n in nodes {
                if let Some(c) = n.color {
                    *acc = Some(match *acc {
                        None => (c, c),
                        Some((lo, hi)) => (lo.min(c), hi.max(c)),
                    });
                }
                walk(&n.children, acc);
            }
        }
        let mut acc = None;
        walk(&self.roots, &mut acc);
        acc
    }

    /// Leaf nodes in depth-first order.
    pub fn leaves(&self) -> Vec<&HierarchyNode> {
        fn walk<'a>(nodes: &'a [HierarchyNode], out: &mut Vec<&'a HierarchyNode>) {
            for n in nodes {
                if n.is_leaf() {
                    out.push(n);
                } else {
                    walk(&n.children, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.roots, &mut out);
        out
    }
}

struct Built {
    node: HierarchyNode,
    /// Σ colour·value over leaves that have a colour.
    color_mass: f64,
    /// Σ value over leaves that have a colour.
    color_weight: f64,
}

fn build_level(leaves: &[&HierarchyLeaf], depth: usize) -> Vec<Built> {
    let mut groups: Vec<(&str, Vec<&HierarchyLeaf>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for &leaf in leaves {
        let Some(label) = leaf.path.get(depth) else {
            continue;
        };
        let slot = *index.entry(label.as_str()).or_insert_with(|| {
            groups.push((label.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(leaf);
    }

    let mut built: Vec<Built> = groups
        .into_iter()
        .map(|(label, members)| {
            let deeper: Vec<&HierarchyLeaf> = members
                .iter()
                .copied()
                .filter(|l| l.path.len() > depth + 1)
                .collect();
            let here = members.iter().filter(|l| l.path.len() == depth + 1);

            let mut value = 0.0;
            let mut color_mass = 0.0;
            let mut color_weight = 0.0;
            for leaf in here {
                value += leaf.value;
                if let Some(c) = leaf.color {
                    color_mass += c * leaf.value;
                    color_weight += leaf.value;
                }
            }

            let children = build_level(&deeper, depth + 1);
            for child in &children {
                value += child.node.value;
                color_mass += child.color_mass;
                color_weight += child.color_weight;
            }

            Built {
                node: HierarchyNode {
                    label: label.to_string(),
                    value,
                    color: (color_weight > 0.0).then(|| color_mass / color_weight),
                    children: children.into_iter().map(|c| c.node).collect(),
                },
                color_mass,
                color_weight,
            }
        })
        .collect();

    built.sort_by(|a, b| b.node.value.total_cmp(&a.node.value));
    built
}

fn leaf(path: [&str; 3], value: Option<f64>, color: Option<f64>) -> Option<HierarchyLeaf> {
    Some(HierarchyLeaf {
        path: path.iter().map(|s| s.to_string()).collect(),
        value: value?,
        color,
    })
}

// ---------------------------------------------------------------------------
// Developer → Free/Paid → Game
// ---------------------------------------------------------------------------

pub const DEVELOPER_LEVELS: [&str; 3] = ["Developer", "Free", "Game"];

/// Treemap over every filtered game, coloured by like rate.
pub fn developer_treemap(view: &FilteredView) -> Hierarchy {
    let leaves = view
        .iter()
        .filter_map(|g| {
            leaf(
                [&g.developer, g.free_label(), &g.game_name],
                g.estimated_downloads,
                g.reviews_like_rate,
            )
        })
        .collect();
    Hierarchy::from_leaves(&DEVELOPER_LEVELS, leaves)
}

/// Icicle over the `n` most downloaded games, coloured by rating.
pub fn developer_icicle(view: &FilteredView, n: usize) -> Hierarchy {
    let leaves = by_downloads_desc(view.iter())
        .into_iter()
        .take(n)
        .filter_map(|g| {
            leaf(
                [&g.developer, g.free_label(), &g.game_name],
                g.estimated_downloads,
                g.rating,
            )
        })
        .collect();
    Hierarchy::from_leaves(&DEVELOPER_LEVELS, leaves)
}

// ---------------------------------------------------------------------------
// Tag → Developer → Game sunburst
// ---------------------------------------------------------------------------

/// One exploded (game, tag) row.
#[derive(Debug, Clone, PartialEq)]
pub struct TagShare {
    pub tag: String,
    pub developer: String,
    pub game_name: String,
    /// The game's downloads divided evenly over its tags.
    pub weight: f64,
    pub rating: Option<f64>,
}

/// Split the `n` most downloaded games into one row per tag. Games without
/// tags or without downloads produce no rows.
pub fn explode_tags(view: &FilteredView, n: usize) -> Vec<TagShare> {
    by_downloads_desc(view.iter())
        .into_iter()
        .take(n)
        .flat_map(|g| {
            let tags: Vec<&str> = g.tags().collect();
            let share = g.estimated_downloads.map(|d| d / tags.len().max(1) as f64);
            tags.into_iter().filter_map(move |tag| {
                Some(TagShare {
                    tag: tag.to_string(),
                    developer: g.developer.clone(),
                    game_name: g.game_name.clone(),
                    weight: share?,
                    rating: g.rating,
                })
            })
        })
        .collect()
}

pub const TAG_LEVELS: [&str; 3] = ["Tag", "Developer", "Game"];

pub fn tag_sunburst(view: &FilteredView, n: usize) -> Hierarchy {
    let leaves = explode_tags(view, n)
        .into_iter()
        .map(|s| HierarchyLeaf {
            path: vec![s.tag, s.developer, s.game_name],
            value: s.weight,
            color: s.rating,
        })
        .collect();
    Hierarchy::from_leaves(&TAG_LEVELS, leaves)
}

// ---------------------------------------------------------------------------
// Year → Developer → Game sunburst
// ---------------------------------------------------------------------------

pub const YEAR_LEVELS: [&str; 3] = ["Year", "Developer", "Game"];

/// Sunburst over the `n` most downloaded games; unknown years group under "0".
pub fn year_sunburst(view: &FilteredView, n: usize) -> Hierarchy {
    let leaves = by_downloads_desc(view.iter())
        .into_iter()
        .take(n)
        .filter_map(|g| {
            let year = g.release_year.unwrap_or(0).to_string();
            leaf([&year, &g.developer, &g.game_name], g.estimated_downloads, g.rating)
        })
        .collect();
    Hierarchy::from_leaves(&YEAR_LEVELS, leaves)
}

// ---------------------------------------------------------------------------
// Age → Genre → Game icicle
// ---------------------------------------------------------------------------

pub const GENRE_LEVELS: [&str; 3] = ["Age", "Genre", "Game"];

/// Keep the `max_tags` primary tags with the most downloads and, inside
/// each, its `max_games` most downloaded games.
pub fn genre_icicle(view: &FilteredView, max_tags: usize, max_games: usize) -> Hierarchy {
    let top_tags = top_primary_tags(view, max_tags);

    let mut per_tag: HashMap<&str, usize> = HashMap::new();
    let kept: Vec<&GameRecord> = by_downloads_desc(view.iter())
        .into_iter()
        .filter(|g| {
            let tag = g.primary_tag();
            if !top_tags.contains(tag) {
                return false;
            }
            let taken = per_tag.entry(tag).or_insert(0);
            *taken += 1;
            *taken <= max_games
        })
        .collect();

    let leaves = kept
        .into_iter()
        .filter_map(|g| {
            let age = g.age_label();
            leaf(
                [&age, g.primary_tag(), &g.game_name],
                g.estimated_downloads,
                g.rating,
            )
        })
        .collect();
    Hierarchy::from_leaves(&GENRE_LEVELS, leaves)
}

/// Primary tags ranked by summed downloads (unknown downloads count as 0).
fn top_primary_tags<'a>(view: &FilteredView<'a>, n: usize) -> HashSet<&'a str> {
    let mut totals: Vec<(&str, f64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for g in view.iter() {
        let tag = g.primary_tag();
        let slot = *index.entry(tag).or_insert_with(|| {
            totals.push((tag, 0.0));
            totals.len() - 1
        });
        totals[slot].1 += g.estimated_downloads.unwrap_or(0.0);
    }
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals.into_iter().take(n).map(|(tag, _)| tag).collect()
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

    fn leaf_of(path: &[&str], value: f64, color: Option<f64>) -> HierarchyLeaf {
        HierarchyLeaf {
            path: path.iter().map(|s| s.to_string()).collect(),
            value,
            color,
        }
    }

    fn check_sums(nodes: &[HierarchyNode]) {
        for n in nodes {
            if !n.is_leaf() {
                let sum: f64 = n.children.iter().map(|c| c.value).sum();
                assert!((sum - n.value).abs() < 1e-9, "{} != {}", sum, n.value);
                check_sums(&n.children);
            }
        }
    }

    #[test]
    fn builds_weighted_tree() {
        let h = Hierarchy::from_leaves(
            &["a", "b"],
            vec![
                leaf_of(&["X", "x1"], 1.0, Some(0.0)),
                leaf_of(&["Y", "y1"], 5.0, Some(1.0)),
                leaf_of(&["X", "x2"], 3.0, Some(4.0)),
                leaf_of(&["X", "x2"], 1.0, None),
                leaf_of(&["Z", "z1"], 0.0, Some(1.0)),
            ],
        );
        assert_eq!(h.roots.len(), 2);
        assert_eq!(h.roots[0].label, "X");
        assert_eq!(h.roots[0].value, 5.0);
        assert_eq!(h.roots[0].children[0].label, "x2");
        assert_eq!(h.roots[0].children[0].value, 4.0);
        assert_eq!(h.roots[0].children[0].color, Some(4.0));
        // (0*1 + 4*3) / (1 + 3)
        assert_eq!(h.roots[0].color, Some(3.0));
        assert_eq!(h.total(), 10.0);
        assert_eq!(h.color_range(), Some((0.0, 4.0)));
        check_sums(&h.roots);
    }

    #[test]
    fn tag_explode_example() {
        let ds = dataset_from_lines(&[
            "A,S,0,90,4,1000,2020-01-01,\"RPG,Action\",Windows,0,10,2,50",
            "B,S,0,90,4,500,2020-01-01,,Windows,0,10,2,50",
        ]);
        let rows = explode_tags(&view_all(&ds), 10);
        let pairs: Vec<(&str, f64)> = rows.iter().map(|r| (r.tag.as_str(), r.weight)).collect();
        assert_eq!(pairs, vec![("RPG", 500.0), ("Action", 500.0)]);
        assert!(rows.iter().all(|r| r.game_name == "A"));

        let h = tag_sunburst(&view_all(&ds), 10);
        assert_eq!(h.total(), 1000.0);
        assert_eq!(h.levels, TAG_LEVELS.to_vec());
    }

    #[test]
    fn treemap_labels_free_and_paid() {
        let ds = dataset_from_lines(&[
            "A,S,0,90,4,100,2020-01-01,RPG,Windows,0,10,2,50",
            "B,S,5,70,4,300,2020-01-01,RPG,Windows,0,10,2,50",
            "C,S,,80,4,,2020-01-01,RPG,Windows,0,10,2,50",
        ]);
        let h = developer_treemap(&view_all(&ds));
        assert_eq!(h.roots.len(), 1);
        let labels: Vec<&str> = h.roots[0].children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Paid", "Free"]);
        assert_eq!(h.leaves().len(), 2);
        check_sums(&h.roots);
    }

    #[test]
    fn year_sunburst_groups_unknown_years_under_zero() {
        let ds = dataset_from_lines(&[
            "A,S,0,90,4,100,2020-01-01,RPG,Windows,0,10,2,50",
            "B,T,5,70,4,300,someday,RPG,Windows,0,10,2,50",
        ]);
        let h = year_sunburst(&view_all(&ds), 20);
        let years: Vec<&str> = h.roots.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(years, vec!["0", "2020"]);
    }

    #[test]
    fn developer_icicle_takes_top_games() {
        let ds = dataset_from_lines(&[
            "A,S,0,90,4,100,2020-01-01,RPG,Windows,0,10,2,50",
            "B,T,5,70,4,300,2020-01-01,RPG,Windows,0,10,2,50",
            "C,T,5,70,4,200,2020-01-01,RPG,Windows,0,10,2,50",
        ]);
        let h = developer_icicle(&view_all(&ds), 2);
        assert_eq!(h.total(), 500.0);
        assert_eq!(h.roots[0].label, "T");
        assert_eq!(h.roots.len(), 1);
    }

    #[test]
    fn genre_icicle_keeps_top_tags_and_games() {
        let ds = dataset_from_lines(&[
            "R1,S,0,90,4,100,2020-01-01,RPG,Windows,0,10,2,50",
            "R2,S,0,90,4,500,2020-01-01,\"RPG,Action\",Windows,13,10,2,50",
            "R3,S,0,90,4,300,2020-01-01,RPG,Windows,17,10,2,50",
            "R4,S,0,90,4,200,2020-01-01,RPG,Windows,0,10,2,50",
            "R5,S,0,90,4,50,2020-01-01,RPG,Windows,0,10,2,50",
            "A1,S,0,90,4,900,2020-01-01,Action,Windows,0,10,2,50",
            "A2,S,0,90,4,10,2020-01-01,Action,Windows,0,10,2,50",
        ]);
        let h = genre_icicle(&view_all(&ds), 1, 3);
        let mut games: Vec<&str> = h.leaves().iter().map(|n| n.label.as_str()).collect();
        games.sort();
        assert_eq!(games, vec!["R2", "R3", "R4"]);
        let ages: Vec<&str> = h.roots.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(ages, vec!["Teen 13+", "Mature 17+", "All Ages"]);
    }

    #[test]
    fn genre_icicle_uses_unknown_for_untagged_games() {
        let ds = dataset_from_lines(&["A,S,0,90,4,100,2020-01-01,,Windows,,10,2,50"]);
        let h = genre_icicle(&view_all(&ds), 8, 10);
        assert_eq!(h.roots[0].label, "All Ages");
        assert_eq!(h.roots[0].children[0].label, "Unknown");
    }

    #[test]
    fn empty_view_gives_empty_hierarchies() {
        let view = FilteredView::default();
        assert!(developer_treemap(&view).is_empty());
        assert!(tag_sunburst(&view, 10).is_empty());
        assert!(year_sunburst(&view, 20).is_empty());
        assert!(genre_icicle(&view, 8, 10).is_empty());
        assert!(developer_icicle(&view, 20).is_empty());
    }

    proptest! {
        #[test]
        fn tag_weights_sum_to_downloads(
            downloads in 1.0f64..1e9,
            tags in proptest::collection::vec("[A-Za-z]{1,8}", 1..6),
        ) {
            let line = format!("G,S,0,90,4,{downloads},2020-01-01,\"{}\",Windows,0,10,2,50", tags.join(","));
            let ds = dataset_from_lines(&[&line]);
            let rows = explode_tags(&view_all(&ds), 10);
            prop_assert_eq!(rows.len(), tags.len());
            let total: f64 = rows.iter().map(|r| r.weight).sum();
            prop_assert!((total - downloads).abs() <= downloads * 1e-9);
        }
    }
}
