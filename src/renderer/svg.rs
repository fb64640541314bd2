//! SVG generation from a render model

use crate::layout::{
    BoundingBox, CellDensity, CellLayout, LabelLayout, PointLayout, RenderMode, RenderModel, TextAnchor,
};
use crate::model::Dimension;
use crate::stylesheet::Stylesheet;

use super::SvgConfig;

pub const DOMAIN_AXIS_TITLE: &str = "Domain Coverage";
pub const GRANULARITY_AXIS_TITLE: &str = "Terminology Granularity";

const CELL_CORNER_RADIUS: f64 = 8.0;
const POINT_STROKE_WIDTH: f64 = 2.5;
const AXIS_STROKE_WIDTH: f64 = 2.0;
const AXIS_TITLE_FONT_SIZE: f64 = 14.0;
const X_TITLE_OFFSET: f64 = 70.0;
const Y_TITLE_OFFSET: f64 = 120.0;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    styles: Vec<String>,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            styles: vec![],
            elements: vec![],
            indent: 1,
        }
    }

    /// Add CSS custom properties and hover rules from a stylesheet
    pub fn add_stylesheet(&mut self, stylesheet: &Stylesheet) {
        let mut tokens: Vec<(&String, &String)> = stylesheet.colors.iter().collect();
        tokens.sort();

        let mut css = String::from(":root {\n");
        for (token, value) in tokens {
            css.push_str(&format!("    --{}: {};\n", token, value));
        }
        css.push_str("  }\n");

        let prefix = self.prefix();
        for density in [
            CellDensity::Empty,
            CellDensity::Low,
            CellDensity::Medium,
            CellDensity::High,
        ] {
            css.push_str(&format!(
                "  .{p}{class}:hover {{ stroke: {c}; }}\n",
                p = prefix,
                class = density.stroke_token(),
                c = stylesheet.resolve_or_default(density.hover_token()),
            ));
        }
        css.push_str(&format!(
            "  .{p}tick-domain:hover {{ fill: {c}; }}\n",
            p = prefix,
            c = stylesheet.resolve_or_default("axis-domain-hover"),
        ));
        css.push_str(&format!(
            "  .{p}tick-granularity:hover {{ fill: {c}; }}",
            p = prefix,
            c = stylesheet.resolve_or_default("axis-granularity-hover"),
        ));
        if let Some(family) = stylesheet.resolve("font-family") {
            css.push_str(&format!("\n  .{}text {{ font-family: {}; }}", prefix, family));
        }
        self.styles.push(css);
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone()
    }

    fn class_list(&self, kind: &str, classes: &[String]) -> String {
        let prefix = self.prefix();
        std::iter::once(format!("{}{}", prefix, kind))
            .chain(classes.iter().map(|c| format!("{}{}", prefix, c)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, id: Option<&str>, bounds: &BoundingBox, classes: &[String], styles: &str) {
        let id_attr = id.map(|i| format!(r#" id="{}""#, escape_xml(i))).unwrap_or_default();
        self.elements.push(format!(
            r#"{}<rect{} class="{}" x="{}" y="{}" width="{}" height="{}"{}/>"#,
            self.indent_str(),
            id_attr,
            self.class_list("rect", classes),
            num(bounds.x),
            num(bounds.y),
            num(bounds.width),
            num(bounds.height),
            styles
        ));
    }

    /// Add a circle element
    pub fn add_circle(
        &mut self,
        id: Option<&str>,
        cx: f64,
        cy: f64,
        r: f64,
        classes: &[String],
        styles: &str,
    ) {
        let id_attr = id.map(|i| format!(r#" id="{}""#, escape_xml(i))).unwrap_or_default();
        self.elements.push(format!(
            r#"{}<circle{} class="{}" cx="{}" cy="{}" r="{}"{}/>"#,
            self.indent_str(),
            id_attr,
            self.class_list("circle", classes),
            num(cx),
            num(cy),
            num(r),
            styles
        ));
    }

    /// Add a line element
    pub fn add_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, classes: &[String], styles: &str) {
        self.elements.push(format!(
            r#"{}<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
            self.indent_str(),
            self.class_list("line", classes),
            num(x1),
            num(y1),
            num(x2),
            num(y2),
            styles
        ));
    }

    /// Add a text element, vertically centered on `y`
    #[allow(clippy::too_many_arguments)]
    pub fn add_text_element(
        &mut self,
        id: Option<&str>,
        text: &str,
        x: f64,
        y: f64,
        anchor: &TextAnchor,
        classes: &[String],
        styles: &str,
    ) {
        let id_attr = id.map(|i| format!(r#" id="{}""#, escape_xml(i))).unwrap_or_default();
        let anchor_str = match anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };
        self.elements.push(format!(
            r#"{}<text{} class="{}" x="{}" y="{}" text-anchor="{}" dominant-baseline="middle"{}>{}</text>"#,
            self.indent_str(),
            id_attr,
            self.class_list("text", classes),
            num(x),
            num(y),
            anchor_str,
            styles,
            escape_xml(text)
        ));
    }

    /// Open a group element with optional ID, classes and transform
    pub fn start_group(&mut self, id: Option<&str>, classes: &[String], transform: Option<&str>) {
        let id_attr = id.map(|i| format!(r#" id="{}""#, escape_xml(i))).unwrap_or_default();
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            let prefix = self.prefix();
            let list = classes
                .iter()
                .map(|c| format!("{}{}", prefix, c))
                .collect::<Vec<_>>()
                .join(" ");
            format!(r#" class="{}""#, list)
        };
        let transform_attr = transform
            .map(|t| format!(r#" transform="{}""#, t))
            .unwrap_or_default();

        self.elements.push(format!(
            "{}<g{}{}{}>",
            self.indent_str(),
            id_attr,
            class_attr,
            transform_attr
        ));
        self.indent += 1;
    }

    /// Close a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Build the final SVG string
    pub fn build(self, viewbox: BoundingBox) -> String {
        let (vb_x, vb_y, vb_w, vb_h) = (viewbox.x, viewbox.y, viewbox.width, viewbox.height);

        let nl = self.newline();
        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
            num(vb_w),
            num(vb_h),
            num(vb_x),
            num(vb_y),
            num(vb_w),
            num(vb_h)
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str("  <style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str("    ");
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str("  </style>");
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Render a model to an SVG string (with default stylesheet)
pub fn render_svg(model: &RenderModel, config: &SvgConfig) -> String {
    render_svg_with_stylesheet(model, config, &Stylesheet::default(), false)
}

/// Render a model to an SVG string with a custom stylesheet
///
/// With `debug` set, label boxes and cell ids are drawn on top.
pub fn render_svg_with_stylesheet(
    model: &RenderModel,
    config: &SvgConfig,
    stylesheet: &Stylesheet,
    debug: bool,
) -> String {
    let mut builder = SvgBuilder::new(config.clone());
    builder.add_stylesheet(stylesheet);

    let viewport = BoundingBox::new(0.0, 0.0, model.viewport.width, model.viewport.height);
    builder.add_rect(
        None,
        &viewport,
        &["background".to_string()],
        &format!(r#" fill="{}""#, stylesheet.resolve_or_default("background-1")),
    );

    let origin = model.frame.origin;
    builder.start_group(
        Some("plot"),
        &["plot".to_string()],
        Some(&format!("translate({},{})", num(origin.x), num(origin.y))),
    );
    let t = model.transform;
    let mode_class = match model.mode {
        RenderMode::Points => "mode-points",
        RenderMode::Summary => "mode-summary",
        RenderMode::Detail => "mode-detail",
    };
    builder.start_group(
        Some("content"),
        &["content".to_string(), mode_class.to_string()],
        Some(&format!(
            "translate({},{}) scale({})",
            num(t.translate_x),
            num(t.translate_y),
            num(t.scale)
        )),
    );

    if !model.is_empty() {
        render_axes(model, &mut builder, stylesheet);
    }

    builder.start_group(Some("cells"), &["cells".to_string()], None);
    for cell in &model.cells {
        render_cell(cell, &mut builder, stylesheet);
    }
    builder.end_group();

    if !model.points.is_empty() {
        builder.start_group(Some("points"), &["points".to_string()], None);
        for point in &model.points {
            render_point(point, &mut builder, stylesheet);
        }
        builder.end_group();
    }

    if !model.labels.is_empty() {
        builder.start_group(Some("labels"), &["labels".to_string()], None);
        for label in &model.labels {
            render_label(label, &mut builder, stylesheet);
        }
        builder.end_group();
    }

    if debug {
        render_debug_overlay(model, &mut builder);
    }

    builder.end_group();
    builder.end_group();

    builder.build(viewport)
}

fn render_axes(model: &RenderModel, builder: &mut SvgBuilder, stylesheet: &Stylesheet) {
    let baseline = model.frame.inner_height;
    let axis_style = format!(
        r#" stroke="{}" stroke-width="{}""#,
        stylesheet.resolve_or_default("axis-line"),
        AXIS_STROKE_WIDTH
    );
    builder.add_line(
        0.0,
        baseline,
        model.plot_width,
        baseline,
        &["axis".to_string(), "axis-domain".to_string()],
        &axis_style,
    );
    builder.add_line(
        0.0,
        baseline,
        0.0,
        baseline - model.plot_height,
        &["axis".to_string(), "axis-granularity".to_string()],
        &axis_style,
    );

    let text_fill = stylesheet.resolve_or_default("text-1");
    for tick in &model.axis_ticks {
        let axis_class = match tick.axis {
            Dimension::DomainCoverage => "tick-domain",
            Dimension::TerminologyGranularity => "tick-granularity",
        };
        builder.add_text_element(
            Some(&tick.id),
            &tick.value,
            tick.position.x,
            tick.position.y,
            &tick.anchor,
            &["tick".to_string(), axis_class.to_string()],
            &format!(
                r#" font-size="{}" font-weight="600" fill="{}" data-axis="{}""#,
                num(tick.font_size),
                text_fill,
                tick.axis.axis_name()
            ),
        );
    }

    let title_style = format!(
        r#" font-size="{}" font-weight="700" fill="{}""#,
        AXIS_TITLE_FONT_SIZE, text_fill
    );
    if let Some(title) = builder.config.domain_title.clone() {
        builder.add_text_element(
            None,
            &title,
            model.plot_width / 2.0,
            baseline + X_TITLE_OFFSET,
            &TextAnchor::Middle,
            &["axis-title".to_string()],
            &title_style,
        );
    }
    if let Some(title) = builder.config.granularity_title.clone() {
        let y_mid = baseline - model.plot_height / 2.0;
        builder.add_text_element(
            None,
            &title,
            -Y_TITLE_OFFSET,
            y_mid,
            &TextAnchor::Middle,
            &["axis-title".to_string()],
            &format!(
                r#"{} transform="rotate(-90,{},{})""#,
                title_style,
                num(-Y_TITLE_OFFSET),
                num(y_mid)
            ),
        );
    }
}

fn render_cell(cell: &CellLayout, builder: &mut SvgBuilder, stylesheet: &Stylesheet) {
    let density_class = cell.density.stroke_token().to_string();
    builder.add_rect(
        Some(&cell.id),
        &cell.bounds,
        &["cell".to_string(), density_class],
        &format!(
            r#" rx="{r}" ry="{r}" fill="none" stroke="{}" stroke-width="{}" data-domain="{}" data-granularity="{}" data-count="{}""#,
            stylesheet.resolve_or_default(cell.density.stroke_token()),
            num(cell.density.stroke_width()),
            escape_xml(&cell.domain),
            escape_xml(&cell.granularity),
            cell.cq_count,
            r = CELL_CORNER_RADIUS,
        ),
    );
}

fn render_point(point: &PointLayout, builder: &mut SvgBuilder, stylesheet: &Stylesheet) {
    builder.add_circle(
        Some(&point.id),
        point.position.x,
        point.position.y,
        point.radius,
        &["point".to_string(), point.cq_type.color_token().to_string()],
        &format!(
            r#" fill="{}" stroke="{}" stroke-width="{}" data-cq="{}""#,
            stylesheet.resolve_or_default(point.cq_type.color_token()),
            stylesheet.resolve_or_default("point-stroke"),
            POINT_STROKE_WIDTH,
            escape_xml(&point.cq_id)
        ),
    );
}

fn render_label(label: &LabelLayout, builder: &mut SvgBuilder, stylesheet: &Stylesheet) {
    let mut classes = vec!["term".to_string(), label.cq_type.color_token().to_string()];
    if label.forced {
        classes.push("term-forced".to_string());
    }
    builder.add_text_element(
        Some(&label.id),
        &label.text,
        label.position.x,
        label.position.y,
        &TextAnchor::Middle,
        &classes,
        &format!(
            r#" font-size="{}" font-weight="600" fill="{}" data-cq="{}""#,
            num(label.font_size),
            stylesheet.resolve_or_default(label.cq_type.color_token()),
            escape_xml(&label.cq_id)
        ),
    );
}

fn render_debug_overlay(model: &RenderModel, builder: &mut SvgBuilder) {
    builder.start_group(Some("debug"), &["debug".to_string()], None);
    let outline = r##" fill="none" stroke="#ef4444" stroke-width="0.5" stroke-dasharray="2,2""##;
    for label in &model.labels {
        builder.add_rect(None, &label.bounds(), &["debug-box".to_string()], outline);
    }
    for cell in &model.cells {
        builder.add_text_element(
            None,
            &cell.id,
            cell.bounds.x + 2.0,
            cell.bounds.y + 6.0,
            &TextAnchor::Start,
            &["debug-id".to_string()],
            r##" font-size="6" fill="#ef4444""##,
        );
    }
    builder.end_group();
}

/// Format a coordinate with at most two decimals
fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
