//! Core types for the layout engine

use crate::model::{CqType, Dimension};

/// A 2D point in the coordinate system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A bounding box representing the spatial extent of an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box of the given size centered on a point
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }

    /// Create a zero-sized bounding box at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Check if this bounding box contains a point
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Check if another box lies fully inside this one
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }

    /// Check if this bounding box intersects another
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Grow (or shrink, with a negative amount) the box on every side
    pub fn inflate(&self, amount: f64) -> BoundingBox {
        BoundingBox::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// Compute the union of two bounding boxes (smallest box containing both)
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// Size of the drawing surface in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1200.0, 900.0)
    }
}

/// Pan/zoom transform applied to the plot content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl ZoomTransform {
    pub const MIN_SCALE: f64 = 0.5;
    pub const MAX_SCALE: f64 = 10.0;

    /// Create a transform; the scale is clamped to the zoom extent
    pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale: clamp_scale(scale),
            translate_x: finite_or(translate_x, 0.0),
            translate_y: finite_or(translate_y, 0.0),
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub fn with_scale(scale: f64) -> Self {
        Self::new(scale, 0.0, 0.0)
    }

    /// Zoom by a factor, keeping `anchor` (in transformed space) fixed
    pub fn zoom_by(&self, factor: f64, anchor: Point) -> Self {
        let scale = clamp_scale(self.scale * factor);
        let ratio = scale / self.scale;
        Self {
            scale,
            translate_x: anchor.x - (anchor.x - self.translate_x) * ratio,
            translate_y: anchor.y - (anchor.y - self.translate_y) * ratio,
        }
    }

    pub fn pan_by(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.scale, self.translate_x + dx, self.translate_y + dy)
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.translate_x,
            p.y * self.scale + self.translate_y,
        )
    }

    pub fn invert(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.translate_x) / self.scale,
            (p.y - self.translate_y) / self.scale,
        )
    }
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::identity()
    }
}

fn clamp_scale(scale: f64) -> f64 {
    finite_or(scale, 1.0).clamp(ZoomTransform::MIN_SCALE, ZoomTransform::MAX_SCALE)
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}

/// Which marks are drawn at the current zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// One colored point per question
    Points,
    /// One label per question: first term plus a `(+N)` suffix
    Summary,
    /// One label per term
    Detail,
}

/// Text anchor position for labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Outer placement of the plot inside the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotFrame {
    /// Screen offset of the content origin (before pan/zoom)
    pub origin: Point,
    /// Unexpanded plot extent
    pub inner_width: f64,
    pub inner_height: f64,
}

/// How busy a cell is, used for its stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDensity {
    Empty,
    Low,
    Medium,
    High,
}

impl CellDensity {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => CellDensity::Empty,
            1..=3 => CellDensity::Low,
            4..=6 => CellDensity::Medium,
            _ => CellDensity::High,
        }
    }

    /// Stylesheet token for the resting stroke
    pub fn stroke_token(self) -> &'static str {
        match self {
            CellDensity::Empty => "cell-empty",
            CellDensity::Low => "cell-low",
            CellDensity::Medium => "cell-medium",
            CellDensity::High => "cell-high",
        }
    }

    /// Stylesheet token for the hover stroke
    pub fn hover_token(self) -> &'static str {
        match self {
            CellDensity::Empty => "cell-empty-hover",
            CellDensity::Low => "cell-low-hover",
            CellDensity::Medium => "cell-medium-hover",
            CellDensity::High => "cell-high-hover",
        }
    }

    pub fn stroke_width(self) -> f64 {
        match self {
            CellDensity::Empty => 1.0,
            CellDensity::Low => 1.5,
            CellDensity::Medium => 2.0,
            CellDensity::High => 2.5,
        }
    }
}

/// One grid intersection
#[derive(Debug, Clone, PartialEq)]
pub struct CellLayout {
    pub id: String,
    pub domain: String,
    pub granularity: String,
    pub column: usize,
    pub row: usize,
    pub bounds: BoundingBox,
    pub cq_count: usize,
    pub density: CellDensity,
}

/// Normalized position of a question inside its cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubCellPosition {
    pub x: f64,
    pub y: f64,
    /// Sub-grid slot, `-1` when the fallback was used
    pub grid_x: i32,
    pub grid_y: i32,
}

impl SubCellPosition {
    pub fn is_fallback(&self) -> bool {
        self.grid_x < 0 || self.grid_y < 0
    }
}

/// A question marker drawn at low zoom
#[derive(Debug, Clone, PartialEq)]
pub struct PointLayout {
    pub id: String,
    pub cq_id: String,
    pub cell_id: String,
    pub position: Point,
    pub radius: f64,
    pub slot: SubCellPosition,
    pub cq_type: CqType,
}

/// A term label drawn at higher zoom
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub id: String,
    pub cq_id: String,
    pub cell_id: String,
    pub text: String,
    /// Center of the text box
    pub position: Point,
    pub font_size: f64,
    pub cq_type: CqType,
    /// Placed by the crowded-cell fallback rather than the spiral search
    pub forced: bool,
}

impl LabelLayout {
    /// Estimated extent of the rendered text
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::centered(
            self.position,
            super::labels::estimate_text_width(&self.text, self.font_size),
            self.font_size,
        )
    }
}

/// A clickable category label on one of the axes
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub id: String,
    pub axis: Dimension,
    pub value: String,
    pub position: Point,
    pub anchor: TextAnchor,
    pub font_size: f64,
}

impl AxisTick {
    pub fn bounds(&self) -> BoundingBox {
        let width = super::labels::estimate_text_width(&self.value, self.font_size);
        let left = match self.anchor {
            TextAnchor::Start => self.position.x,
            TextAnchor::Middle => self.position.x - width / 2.0,
            TextAnchor::End => self.position.x - width,
        };
        BoundingBox::new(
            left,
            self.position.y - self.font_size / 2.0,
            width,
            self.font_size,
        )
    }
}

/// Reference to any element of a render model, for the UI shell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementRef<'a> {
    Cell(&'a CellLayout),
    Point(&'a PointLayout),
    Label(&'a LabelLayout),
    AxisTick(&'a AxisTick),
}

/// The complete result of one layout computation
///
/// All element coordinates are in content space; `frame` and `transform`
/// map them onto the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub viewport: Viewport,
    pub frame: PlotFrame,
    pub transform: ZoomTransform,
    pub mode: RenderMode,
    /// Expanded plot extent
    pub plot_width: f64,
    pub plot_height: f64,
    pub cells: Vec<CellLayout>,
    pub points: Vec<PointLayout>,
    pub labels: Vec<LabelLayout>,
    pub axis_ticks: Vec<AxisTick>,
}

impl RenderModel {
    /// Nothing to draw: one of the axes has no values
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Map a content-space point to viewport pixels
    pub fn to_screen(&self, p: Point) -> Point {
        let t = self.transform.apply(p);
        Point::new(t.x + self.frame.origin.x, t.y + self.frame.origin.y)
    }

    /// Map viewport pixels back to content space
    pub fn to_content(&self, p: Point) -> Point {
        self.transform.invert(Point::new(
            p.x - self.frame.origin.x,
            p.y - self.frame.origin.y,
        ))
    }

    pub fn cell(&self, domain: &str, granularity: &str) -> Option<&CellLayout> {
        self.cells
            .iter()
            .find(|c| c.domain == domain && c.granularity == granularity)
    }

    pub fn point_for(&self, cq_id: &str) -> Option<&PointLayout> {
        self.points.iter().find(|p| p.cq_id == cq_id)
    }

    pub fn labels_for<'a>(&'a self, cq_id: &'a str) -> impl Iterator<Item = &'a LabelLayout> {
        self.labels.iter().filter(move |l| l.cq_id == cq_id)
    }

    /// Look up an element by its id
    pub fn element(&self, id: &str) -> Option<ElementRef<'_>> {
        if let Some(c) = self.cells.iter().find(|c| c.id == id) {
            return Some(ElementRef::Cell(c));
        }
        if let Some(p) = self.points.iter().find(|p| p.id == id) {
            return Some(ElementRef::Point(p));
        }
        if let Some(l) = self.labels.iter().find(|l| l.id == id) {
            return Some(ElementRef::Label(l));
        }
        self.axis_ticks
            .iter()
            .find(|t| t.id == id)
            .map(ElementRef::AxisTick)
    }

    /// Content-space box covering the cells and the axis labels
    pub fn content_bounds(&self) -> BoundingBox {
        let mut iter = self
            .cells
            .iter()
            .map(|c| c.bounds)
            .chain(self.axis_ticks.iter().map(|t| t.bounds()));
        let Some(first) = iter.next() else {
            return BoundingBox::zero();
        };
        iter.fold(first, |acc, b| acc.union(&b))
    }
}
