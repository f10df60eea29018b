use eframe::egui::{pos2, vec2, Rect, Vec2};

// ---------------------------------------------------------------------------
// Proportional spans (sunburst angles, icicle bands)
// ---------------------------------------------------------------------------

/// Split `[start, start + span)` proportionally to `values`.
/// Returns one `(start, span)` pair per value.
pub fn split_span(values: &[f64], start: f64, span: f64) -> Vec<(f64, f64)> {
    let total: f64 = values.iter().sum();
    let mut cursor = start;
    values
        .iter()
        .map(|&v| {
            let part = if total > 0.0 { span * v / total } else { 0.0 };
            let out = (cursor, part);
            cursor += part;
            out
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Squarified treemap
// ---------------------------------------------------------------------------

/// Lay out `values` (biggest first) inside `rect` with the squarified
/// algorithm. The returned rectangles tile `rect` and keep the input order.
pub fn squarify(values: &[f64], rect: Rect) -> Vec<Rect> {
    let n = values.len();
    let total: f64 = values.iter().sum();
    if n == 0 || total <= 0.0 || rect.width() <= 0.0 || rect.height() <= 0.0 {
        return vec![Rect::from_min_size(rect.min, Vec2::ZERO); n];
    }

    let scale = (rect.width() * rect.height()) as f64 / total;
    let areas: Vec<f64> = values.iter().map(|v| v * scale).collect();

    let mut out = Vec::with_capacity(n);
    let mut remaining = rect;
    let mut i = 0;
    while i < n {
        let side = remaining.width().min(remaining.height()) as f64;
        let mut end = i + 1;
        let mut row_sum = areas[i];
        let mut best = worst_ratio(&areas[i..end], row_sum, side);
        while end < n {
            let next_sum = row_sum + areas[end];
            let ratio = worst_ratio(&areas[i..=end], next_sum, side);
            if ratio > best {
                break;
            }
            best = ratio;
            row_sum = next_sum;
            end += 1;
        }

        // The last row takes whatever is left so rounding never leaves gaps.
        let last_row = end == n;
        if remaining.width() >= remaining.height() {
            let col_w = if last_row {
                remaining.width()
            } else {
                (row_sum / remaining.height() as f64) as f32
            };
            let mut y = remaining.min.y;
            for (k, &a) in areas[i..end].iter().enumerate() {
                let h = if k + 1 == end - i {
                    remaining.max.y - y
                } else {
                    (a / col_w as f64) as f32
                };
                out.push(Rect::from_min_size(pos2(remaining.min.x, y), vec2(col_w, h)));
                y += h;
            }
            remaining.min.x += col_w;
        } else {
            let row_h = if last_row {
                remaining.height()
            } else {
                (row_sum / remaining.width() as f64) as f32
            };
            let mut x = remaining.min.x;
            for (k, &a) in areas[i..end].iter().enumerate() {
                let w = if k + 1 == end - i {
                    remaining.max.x - x
                } else {
                    (a / row_h as f64) as f32
                };
                out.push(Rect::from_min_size(pos2(x, remaining.min.y), vec2(w, row_h)));
                x += w;
            }
            remaining.min.y += row_h;
        }
        i = end;
    }
    out
}

/// Worst aspect ratio of a row of `areas` laid along a side of length `side`.
fn worst_ratio(areas: &[f64], sum: f64, side: f64) -> f64 {
    let side2 = side * side;
    let sum2 = sum * sum;
    areas
        .iter()
        .map(|&a| (side2 * a / sum2).max(sum2 / (side2 * a)))
        .fold(0.0, f64::max)
}

// ---------------------------------------------------------------------------
// 3D orbit camera
// ---------------------------------------------------------------------------

/// Orthographic camera orbiting the unit cube; z is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.35,
        }
    }
}

impl Orbit {
    const MAX_PITCH: f32 = 1.5;

    /// Rotate by a mouse drag in points.
    pub fn drag(&mut self, delta: Vec2) {
        self.yaw += delta.x * 0.01;
        self.pitch = (self.pitch + delta.y * 0.01).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
    }

    /// Screen offset (y down) and depth of a point in model space.
    pub fn project(&self, p: [f32; 3]) -> (Vec2, f32) {
        let [x, y, z] = p;
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let rx = x * cy - y * sy;
        let ry = x * sy + y * cy;
        let up = z * cp + ry * sp;
        let depth = ry * cp - z * sp;
        (vec2(rx, -up), depth)
    }
}

/// Map `v` from `[lo, hi]` onto `[-1, 1]`; a flat range maps to 0.
pub fn to_unit(v: f64, lo: f64, hi: f64) -> f32 {
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        0.0
    } else {
        ((v - lo) / span * 2.0 - 1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn spans_are_proportional() {
        let spans = split_span(&[1.0, 3.0], 10.0, 8.0);
        assert_eq!(spans, vec![(10.0, 2.0), (12.0, 6.0)]);
        assert_eq!(split_span(&[0.0], 0.0, 1.0), vec![(0.0, 0.0)]);
    }

    #[test]
    fn single_value_fills_rect() {
        let rect = Rect::from_min_size(pos2(5.0, 5.0), vec2(100.0, 50.0));
        assert_eq!(squarify(&[42.0], rect), vec![rect]);
    }

    #[test]
    fn degenerate_inputs_give_empty_rects() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(0.0, 50.0));
        let out = squarify(&[1.0, 2.0], rect);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.area() == 0.0));
    }

    #[test]
    fn orbit_identity_projection() {
        let orbit = Orbit { yaw: 0.0, pitch: 0.0 };
        assert_eq!(orbit.project([1.0, 0.0, 0.0]).0, vec2(1.0, 0.0));
        assert_eq!(orbit.project([0.0, 0.0, 1.0]).0, vec2(0.0, -1.0));
        assert_eq!(to_unit(5.0, 0.0, 10.0), 0.0);
        assert_eq!(to_unit(3.0, 3.0, 3.0), 0.0);
    }

    proptest! {
        #[test]
        fn squarify_tiles_the_rect(
            mut values in proptest::collection::vec(0.5f64..1000.0, 1..40),
            w in 10.0f32..800.0,
            h in 10.0f32..800.0,
        ) {
            values.sort_by(|a, b| b.total_cmp(a));
            let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(w, h));
            let rects = squarify(&values, rect);
            prop_assert_eq!(rects.len(), values.len());

            let covered: f32 = rects.iter().map(|r| r.area()).sum();
            prop_assert!((covered - rect.area()).abs() <= rect.area() * 1e-3);

            let total: f64 = values.iter().sum();
            for (r, v) in rects.iter().zip(&values) {
                let expected = (v / total) as f32 * rect.area();
                prop_assert!((r.area() - expected).abs() <= rect.area() * 1e-3 + 1.0);
                prop_assert!(rect.expand(0.5).contains_rect(*r));
            }
        }

        #[test]
        fn projection_preserves_length(
            yaw in -6.0f32..6.0,
            pitch in -1.5f32..1.5,
            p in proptest::array::uniform3(-1.0f32..1.0),
        ) {
            let (screen, depth) = Orbit { yaw, pitch }.project(p);
            let before = p.iter().map(|c| c * c).sum::<f32>();
            let after = screen.length_sq() + depth * depth;
            prop_assert!((before - after).abs() < 1e-4);
        }
    }
}
