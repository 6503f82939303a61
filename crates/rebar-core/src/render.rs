//! SVG rendering of cutting plans.
//!
//! Each pattern is drawn as one stock bar with segments scaled to the cut
//! lengths and a hatched offcut.

use crate::types::{GroupResult, OptimizationResult, Pattern};
use std::fmt::{self, Write};

const MARGIN: f64 = 20.0;
const BAR_WIDTH: f64 = 600.0;
const BAR_HEIGHT: f64 = 24.0;
const ROW_SPACING: f64 = 10.0;
const GROUP_HEADER: f64 = 28.0;
const GROUP_SPACING: f64 = 24.0;
const BADGE_WIDTH: f64 = 60.0;
const FOOTER: f64 = 24.0;

/// Formats a length with at most two decimals, dropping trailing zeros.
pub fn format_length(value: f64) -> String {
    let formatted = format!("{value:.2}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Renders every group of a result as an SVG document.
pub fn render_svg(result: &OptimizationResult) -> Result<String, fmt::Error> {
    let mut svg = String::new();
    let scale = if result.stock_length > 0.0 {
        BAR_WIDTH / result.stock_length
    } else {
        0.0
    };

    let content_height: f64 = result.groups.values().map(group_height).sum();
    let svg_width = BAR_WIDTH + BADGE_WIDTH + (2.0 * MARGIN);
    let svg_height = content_height + FOOTER + (2.0 * MARGIN);

    writeln!(&mut svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        &mut svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        svg_width, svg_height, svg_width, svg_height
    )?;
    writeln!(&mut svg, "  <defs>")?;
    writeln!(
        &mut svg,
        r##"    <pattern id="waste" width="6" height="6" patternUnits="userSpaceOnUse" patternTransform="rotate(45)"><rect width="6" height="6" fill="#fdecea"/><line x1="0" y1="0" x2="0" y2="6" stroke="#e57373" stroke-width="2"/></pattern>"##
    )?;
    writeln!(&mut svg, "  </defs>")?;
    writeln!(
        &mut svg,
        r##"  <rect width="100%" height="100%" fill="#f5f5f5"/>"##
    )?;

    let mut y_offset = MARGIN;
    for group in result.groups.values() {
        write_group(&mut svg, group, scale, y_offset)?;
        y_offset += group_height(group);
    }

    writeln!(
        &mut svg,
        r##"  <text x="{}" y="{}" font-family="Arial" font-size="12" fill="#666">Bars: {} | Waste: {:.1}% ({}m)</text>"##,
        MARGIN,
        svg_height - MARGIN,
        result.summary.total_bars,
        result.summary.waste_percentage,
        format_length(result.summary.total_waste)
    )?;
    writeln!(&mut svg, "</svg>")?;

    Ok(svg)
}

fn group_height(group: &GroupResult) -> f64 {
    GROUP_HEADER + group.patterns.len() as f64 * (BAR_HEIGHT + ROW_SPACING) + GROUP_SPACING
}

fn write_group(svg: &mut String, group: &GroupResult, scale: f64, top: f64) -> fmt::Result {
    writeln!(
        svg,
        r##"  <text x="{}" y="{}" font-family="Arial" font-size="14" font-weight="bold" fill="#333">Φ{} | {} bars | waste {:.1}% ({}m)</text>"##,
        MARGIN,
        top + 16.0,
        escape(&group.group_key),
        group.total_bars,
        group.waste_percentage,
        format_length(group.total_waste)
    )?;

    let mut y = top + GROUP_HEADER;
    for pattern in &group.patterns {
        write_pattern(svg, pattern, scale, y)?;
        y += BAR_HEIGHT + ROW_SPACING;
    }

    Ok(())
}

fn write_pattern(svg: &mut String, pattern: &Pattern, scale: f64, y: f64) -> fmt::Result {
    let mut x = MARGIN;

    for cut in &pattern.cuts {
        let width = cut * scale;
        writeln!(
            svg,
            r##"  <rect x="{}" y="{}" width="{}" height="{}" fill="#4CAF50" stroke="#2E7D32" stroke-width="1"/>"##,
            x, y, width, BAR_HEIGHT
        )?;
        writeln!(
            svg,
            r##"  <text x="{}" y="{}" font-family="Arial" font-size="10" fill="#fff" text-anchor="middle">{}m</text>"##,
            x + width / 2.0,
            y + BAR_HEIGHT / 2.0 + 3.0,
            format_length(*cut)
        )?;
        x += width;
    }

    if pattern.remaining > 0.0 {
        writeln!(
            svg,
            r##"  <rect x="{}" y="{}" width="{}" height="{}" fill="url(#waste)" stroke="#c62828" stroke-width="1"><title>Waste: {:.2}m</title></rect>"##,
            x,
            y,
            pattern.remaining * scale,
            BAR_HEIGHT,
            pattern.remaining
        )?;
    }

    writeln!(
        svg,
        r##"  <text x="{}" y="{}" font-family="Arial" font-size="12" font-weight="bold" fill="#333">x{}</text>"##,
        MARGIN + BAR_WIDTH + 10.0,
        y + BAR_HEIGHT / 2.0 + 4.0,
        pattern.count
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
