//! Resolution-independent flyer composition.
//!
//! [`compose`] lays out one text variation on one canvas as a tree of
//! positioned shapes and text runs; rasterization happens elsewhere. Sizing
//! is width-relative with absolute minimums, and vertical anchors are fixed
//! fractions of the height, so the same layout serves square, story and
//! landscape formats without branching.

use crate::color;
use crate::models::{CanvasConfig, TextVariation};

const FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";

/// Average-glyph-width factor shared by the wrap estimate and the CTA button.
/// A heuristic, kept as-is for visual parity; not real text measurement.
const GLYPH_WIDTH_FACTOR: f64 = 0.6;
const LINE_HEIGHT_FACTOR: f64 = 1.2;

#[derive(Debug, Clone)]
pub enum Node {
    Text {
        x: f64,
        y: f64,
        size: f64,
        weight: &'static str,
        fill: String,
        content: String,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rx: f64,
        fill: String,
        opacity: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
        opacity: f64,
    },
}

/// A composed flyer: canvas size, two background gradient stops, and shapes
/// in paint order.
#[derive(Debug, Clone)]
pub struct FlyerDocument {
    pub width: u32,
    pub height: u32,
    pub gradient_top: String,
    pub gradient_bottom: String,
    pub nodes: Vec<Node>,
}

pub fn compose(variation: &TextVariation, config: &CanvasConfig) -> FlyerDocument {
    let w = config.width as f64;
    let h = config.height as f64;

    let title_size = (w * 0.055).max(24.0);
    let subtitle_size = (w * 0.028).max(16.0);
    let description_size = (w * 0.02).max(12.0);
    let cta_size = (w * 0.024).max(14.0);

    let mut nodes = Vec::new();

    // ornamentation, under the text
    nodes.push(Node::Circle {
        cx: w * 0.85,
        cy: h * 0.15,
        r: w * 0.10,
        fill: config.accent_color.clone(),
        opacity: 0.15,
    });
    nodes.push(Node::Rect {
        x: w * 0.08,
        y: h * 0.78,
        width: w * 0.22,
        height: w * 0.10,
        rx: w * 0.02,
        fill: config.accent_color.clone(),
        opacity: 0.12,
    });

    let title_y = h * 0.25;
    nodes.push(Node::Text {
        x: w / 2.0,
        y: title_y,
        size: title_size,
        weight: "bold",
        fill: config.text_color.clone(),
        content: variation.title.clone(),
    });
    nodes.push(Node::Text {
        x: w / 2.0,
        y: title_y + title_size * 1.3,
        size: subtitle_size,
        weight: "normal",
        fill: config.text_color.clone(),
        content: variation.subtitle.clone(),
    });

    // description block, centered on 55% of the height
    let lines = wrap_text(&variation.description, w * 0.8, description_size);
    let line_height = description_size * LINE_HEIGHT_FACTOR;
    let first_y = h * 0.55 - (lines.len().saturating_sub(1) as f64) * line_height / 2.0;
    for (idx, line) in lines.into_iter().enumerate() {
        nodes.push(Node::Text {
            x: w / 2.0,
            y: first_y + idx as f64 * line_height,
            size: description_size,
            weight: "normal",
            fill: config.text_color.clone(),
            content: line,
        });
    }

    // CTA button, width estimated from the label length
    let cta_chars = variation.call_to_action.chars().count() as f64;
    let button_width = cta_chars * cta_size * GLYPH_WIDTH_FACTOR + cta_size * 2.0;
    let button_height = cta_size * 2.2;
    let cta_center_y = h * 0.80;
    nodes.push(Node::Rect {
        x: (w - button_width) / 2.0,
        y: cta_center_y - button_height / 2.0,
        width: button_width,
        height: button_height,
        rx: button_height / 2.0,
        fill: config.accent_color.clone(),
        opacity: 1.0,
    });
    nodes.push(Node::Text {
        x: w / 2.0,
        y: cta_center_y + cta_size * 0.35,
        size: cta_size,
        weight: "bold",
        fill: color::contrast_color(&config.accent_color),
        content: variation.call_to_action.clone(),
    });

    FlyerDocument {
        width: config.width,
        height: config.height,
        gradient_top: config.background_color.clone(),
        gradient_bottom: color::darken(&config.background_color, 0.2),
        nodes,
    }
}

/// Greedy word wrap against an estimated characters-per-line budget of
/// `available_width / (font_size * 0.6)`. A single word longer than the
/// budget still gets its own line rather than being dropped.
pub fn wrap_text(text: &str, available_width: f64, font_size: f64) -> Vec<String> {
    let chars_per_line = ((available_width / (font_size * GLYPH_WIDTH_FACTOR)).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if current.is_empty() || candidate <= chars_per_line {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Escape the five XML-significant characters for markup embedding.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

impl FlyerDocument {
    /// Serialize to SVG markup.
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#,
            w = self.width,
            h = self.height,
        );
        svg.push_str(&format!(
            r#"<defs><linearGradient id="bg" x1="0%" y1="0%" x2="0%" y2="100%"><stop offset="0%" stop-color="{}"/><stop offset="100%" stop-color="{}"/></linearGradient></defs>"#,
            escape_xml(&self.gradient_top),
            escape_xml(&self.gradient_bottom),
        ));
        svg.push_str(&format!(
            r#"<rect width="{}" height="{}" fill="url(#bg)"/>"#,
            self.width, self.height
        ));

        for node in &self.nodes {
            match node {
                Node::Rect { x, y, width, height, rx, fill, opacity } => {
                    svg.push_str(&format!(
                        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="{:.1}" fill="{}" opacity="{}"/>"#,
                        x, y, width, height, rx, escape_xml(fill), opacity
                    ));
                }
                Node::Circle { cx, cy, r, fill, opacity } => {
                    svg.push_str(&format!(
                        r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" opacity="{}"/>"#,
                        cx, cy, r, escape_xml(fill), opacity
                    ));
                }
                Node::Text { x, y, size, weight, fill, content } => {
                    svg.push_str(&format!(
                        r#"<text x="{:.1}" y="{:.1}" font-family="{}" font-size="{:.1}" font-weight="{}" fill="{}" text-anchor="middle">{}</text>"#,
                        x, y, FONT_FAMILY, size, weight, escape_xml(fill), escape_xml(content)
                    ));
                }
            }
        }

        svg.push_str("</svg>");
        svg
    }
}
