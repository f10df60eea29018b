use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{
    self, pos2, vec2, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Shape, Stroke,
    StrokeKind, Ui,
};

use crate::color::ContinuousColors;
use crate::views::hierarchy::{Hierarchy, HierarchyNode};

use super::layout::{split_span, squarify};
use super::{empty_chart, text_color_for, thousands, truncate_label};

/// Where a node ended up on screen.
#[derive(Debug, Clone, Copy)]
enum Extent {
    Rect(Rect),
    /// Annular sector, angles in radians clockwise from 12 o'clock.
    Arc {
        start: f32,
        span: f32,
        inner: f32,
        outer: f32,
    },
}

struct Placed<'a> {
    node: &'a HierarchyNode,
    depth: usize,
    path: Vec<&'a str>,
    extent: Extent,
}

/// How hovered tiles describe their colour value.
pub struct Legend<'a> {
    pub value_name: &'a str,
    pub color_name: &'a str,
}

// ---------------------------------------------------------------------------
// Treemap
// ---------------------------------------------------------------------------

const HEADER: f32 = 16.0;
const PAD: f32 = 2.0;

pub fn treemap(ui: &mut Ui, h: &Hierarchy, colors: &ContinuousColors, legend: &Legend, height: f32) {
    if h.is_empty() {
        empty_chart(ui, height);
        return;
    }
    let (response, painter) = allocate(ui, height);
    let mut placed = Vec::new();
    place_treemap(&h.roots, response.rect, 0, &[], &mut placed);

    for p in &placed {
        if let Extent::Rect(r) = p.extent {
            let fill = colors.color_for(p.node.color);
            painter.rect_filled(r, 2.0, fill);
            painter.rect_stroke(r, 2.0, Stroke::new(1.0, Color32::WHITE), StrokeKind::Inside);
            let header_only = !p.node.is_leaf();
            draw_rect_label(&painter, r, &p.node.label, fill, header_only);
        }
    }
    show_tooltip(response, &placed, h, legend);
}

fn place_treemap<'a>(
    nodes: &'a [HierarchyNode],
    rect: Rect,
    depth: usize,
    parent: &[&'a str],
    out: &mut Vec<Placed<'a>>,
) {
    let values: Vec<f64> = nodes.iter().map(|n| n.value).collect();
    for (node, r) in nodes.iter().zip(squarify(&values, rect)) {
        let mut path = parent.to_vec();
        path.push(node.label.as_str());
        out.push(Placed {
            node,
            depth,
            path: path.clone(),
            extent: Extent::Rect(r),
        });
        if !node.is_leaf() && r.height() > HEADER + 2.0 * PAD && r.width() > 2.0 * PAD {
            let inner = Rect::from_min_max(
                pos2(r.min.x + PAD, r.min.y + HEADER),
                pos2(r.max.x - PAD, r.max.y - PAD),
            );
            place_treemap(&node.children, inner, depth + 1, &path, out);
        }
    }
}

// ---------------------------------------------------------------------------
// Sunburst
// ---------------------------------------------------------------------------

const HOLE: f32 = 0.12;

pub fn sunburst(ui: &mut Ui, h: &Hierarchy, colors: &ContinuousColors, legend: &Legend, height: f32) {
    if h.is_empty() {
        empty_chart(ui, height);
        return;
    }
    let (response, painter) = allocate(ui, height);
    let rect = response.rect;
    let center = rect.center();
    let radius = rect.width().min(rect.height()) * 0.5 - 4.0;
    let hole = radius * HOLE;
    let ring = (radius - hole) / h.levels.len().max(1) as f32;

    let mut placed = Vec::new();
    place_arcs(&h.roots, 0.0, TAU, 0, hole, ring, &[], &mut placed);

    for p in &placed {
        if let Extent::Arc { start, span, inner, outer } = p.extent {
            let fill = colors.color_for(p.node.color);
            paint_arc(&painter, center, start, span, inner, outer, fill);
            let mid_r = (inner + outer) * 0.5;
            if span * mid_r > 28.0 {
                let pos = polar(center, start + span * 0.5, mid_r);
                let max_chars = ((outer - inner) / 6.5) as usize;
                painter.text(
                    pos,
                    Align2::CENTER_CENTER,
                    truncate_label(&p.node.label, max_chars.max(3)),
                    FontId::proportional(10.0),
                    text_color_for(fill),
                );
            }
        }
    }
    show_tooltip_polar(response, center, &placed, h, legend);
}

#[allow(clippy::too_many_arguments)]
fn place_arcs<'a>(
    nodes: &'a [HierarchyNode],
    start: f32,
    span: f32,
    depth: usize,
    hole: f32,
    ring: f32,
    parent: &[&'a str],
    out: &mut Vec<Placed<'a>>,
) {
    let values: Vec<f64> = nodes.iter().map(|n| n.value).collect();
    for (node, (s, w)) in nodes.iter().zip(split_span(&values, start as f64, span as f64)) {
        let mut path = parent.to_vec();
        path.push(node.label.as_str());
        let inner = hole + ring * depth as f32;
        out.push(Placed {
            node,
            depth,
            path: path.clone(),
            extent: Extent::Arc {
                start: s as f32,
                span: w as f32,
                inner,
                outer: inner + ring,
            },
        });
        place_arcs(&node.children, s as f32, w as f32, depth + 1, hole, ring, &path, out);
    }
}

/// Point at `angle` (clockwise from 12 o'clock) and distance `r`.
fn polar(center: Pos2, angle: f32, r: f32) -> Pos2 {
    let a = angle - FRAC_PI_2;
    center + vec2(a.cos(), a.sin()) * r
}

/// Fill an annular sector with convex quads small enough to look round.
fn paint_arc(
    painter: &Painter,
    center: Pos2,
    start: f32,
    span: f32,
    inner: f32,
    outer: f32,
    fill: Color32,
) {
    if span <= 0.0 {
        return;
    }
    let steps = ((span / 0.05).ceil() as usize).max(1);
    let step = span / steps as f32;
    for k in 0..steps {
        let a0 = start + step * k as f32;
        let a1 = a0 + step;
        let quad = vec![
            polar(center, a0, inner),
            polar(center, a0, outer),
            polar(center, a1, outer),
            polar(center, a1, inner),
        ];
        painter.add(Shape::convex_polygon(quad, fill, Stroke::NONE));
    }
    let edge = Stroke::new(1.0, Color32::WHITE);
    painter.line_segment([polar(center, start, inner), polar(center, start, outer)], edge);
}

// ---------------------------------------------------------------------------
// Icicle
// ---------------------------------------------------------------------------

/// Levels run left to right; each node's height is proportional to its value.
pub fn icicle(ui: &mut Ui, h: &Hierarchy, colors: &ContinuousColors, legend: &Legend, height: f32) {
    if h.is_empty() {
        empty_chart(ui, height);
        return;
    }
    let (response, painter) = allocate(ui, height);
    let rect = response.rect;
    let band = rect.width() / h.levels.len().max(1) as f32;

    let mut placed = Vec::new();
    place_bands(&h.roots, rect.min.y, rect.height(), 0, rect.min.x, band, &[], &mut placed);

    for p in &placed {
        if let Extent::Rect(r) = p.extent {
            let fill = colors.color_for(p.node.color);
            painter.rect_filled(r, 0.0, fill);
            painter.rect_stroke(r, 0.0, Stroke::new(1.0, Color32::WHITE), StrokeKind::Inside);
            draw_rect_label(&painter, r, &p.node.label, fill, false);
        }
    }
    show_tooltip(response, &placed, h, legend);
}

#[allow(clippy::too_many_arguments)]
fn place_bands<'a>(
    nodes: &'a [HierarchyNode],
    top: f32,
    height: f32,
    depth: usize,
    left: f32,
    band: f32,
    parent: &[&'a str],
    out: &mut Vec<Placed<'a>>,
) {
    let values: Vec<f64> = nodes.iter().map(|n| n.value).collect();
    for (node, (y, h)) in nodes.iter().zip(split_span(&values, top as f64, height as f64)) {
        let mut path = parent.to_vec();
        path.push(node.label.as_str());
        let x = left + band * depth as f32;
        let r = Rect::from_min_size(pos2(x, y as f32), vec2(band, h as f32));
        out.push(Placed {
            node,
            depth,
            path: path.clone(),
            extent: Extent::Rect(r),
        });
        place_bands(&node.children, y as f32, h as f32, depth + 1, left, band, &path, out);
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn allocate(ui: &mut Ui, height: f32) -> (egui::Response, Painter) {
    ui.allocate_painter(vec2(ui.available_width(), height), Sense::hover())
}

fn draw_rect_label(painter: &Painter, r: Rect, label: &str, fill: Color32, top: bool) {
    if r.width() < 30.0 || r.height() < 14.0 {
        return;
    }
    let max_chars = (r.width() / 6.5) as usize;
    let (pos, align) = if top {
        (r.left_top() + vec2(4.0, 2.0), Align2::LEFT_TOP)
    } else {
        (r.center(), Align2::CENTER_CENTER)
    };
    painter.text(
        pos,
        align,
        truncate_label(label, max_chars),
        FontId::proportional(11.0),
        text_color_for(fill),
    );
}

fn tooltip_text(p: &Placed, h: &Hierarchy, legend: &Legend) -> String {
    let level = h.levels.get(p.depth).copied().unwrap_or("");
    let mut text = format!(
        "{}\n{level}: {}\n{}: {}",
        p.path.join(" / "),
        p.node.label,
        legend.value_name,
        thousands(p.node.value)
    );
    if let Some(c) = p.node.color {
        text.push_str(&format!("\n{}: {c:.2}", legend.color_name));
    }
    text
}

/// Hovered tile: the deepest rectangle under the pointer.
fn show_tooltip(response: egui::Response, placed: &[Placed], h: &Hierarchy, legend: &Legend) {
    let Some(pointer) = response.hover_pos() else {
        return;
    };
    let hit = placed
        .iter()
        .filter(|p| matches!(p.extent, Extent::Rect(r) if r.contains(pointer)))
        .max_by_key(|p| p.depth);
    if let Some(p) = hit {
        response.on_hover_text_at_pointer(tooltip_text(p, h, legend));
    }
}

fn show_tooltip_polar(
    response: egui::Response,
    center: Pos2,
    placed: &[Placed],
    h: &Hierarchy,
    legend: &Legend,
) {
    let Some(pointer) = response.hover_pos() else {
        return;
    };
    let d = pointer - center;
    let r = d.length();
    let angle = (d.y.atan2(d.x) + FRAC_PI_2).rem_euclid(TAU);
    let hit = placed.iter().find(|p| match p.extent {
        Extent::Arc { start, span, inner, outer } => {
            r >= inner && r < outer && angle >= start && angle < start + span
        }
        Extent::Rect(_) => false,
    });
    if let Some(p) = hit {
        response.on_hover_text_at_pointer(tooltip_text(p, h, legend));
    }
}
