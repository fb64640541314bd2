//! Stateful plot controller for a UI shell
//!
//! [`ScatterPlot`] owns the current data, viewport and zoom transform, keeps
//! the last [`RenderModel`] and turns clicks into [`PlotEvents`] callbacks.
//! All placement state is still recomputed from scratch on every refresh.

use tracing::debug;

use crate::layout::{compute_layout, hit_test, Hit, LayoutConfig, Point, RenderModel, Viewport, ZoomTransform};
use crate::model::{CompetencyQuestion, Dimension, PlotData};

/// Callbacks raised by the plot; every method defaults to a no-op
pub trait PlotEvents {
    fn on_cell_click(&mut self, _domain: &str, _granularity: &str, _center_x: f64, _center_y: f64) {}

    fn on_axis_value_click(&mut self, _value: &str, _axis: Dimension) {}

    fn on_point_click(&mut self, _cq: &CompetencyQuestion) {}

    fn on_label_click(&mut self, _cq: &CompetencyQuestion) {}

    /// Fires once after every layout
    fn on_render_complete(&mut self) {}
}

/// Event sink that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEvents;

impl PlotEvents for NoEvents {}

pub struct ScatterPlot<E: PlotEvents> {
    data: PlotData,
    viewport: Viewport,
    transform: ZoomTransform,
    config: LayoutConfig,
    model: RenderModel,
    events: E,
}

impl<E: PlotEvents> ScatterPlot<E> {
    pub fn new(data: PlotData, viewport: Viewport, config: LayoutConfig, events: E) -> Self {
        let transform = ZoomTransform::identity();
        let model = compute_layout(&data, &viewport, &transform, &config);
        let mut plot = Self {
            data,
            viewport,
            transform,
            config,
            model,
            events,
        };
        plot.events.on_render_complete();
        plot
    }

    /// Replace the plot data (new questions or axis values)
    pub fn set_data(&mut self, data: PlotData) {
        self.data = data;
        self.refresh();
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.refresh();
    }

    pub fn set_transform(&mut self, transform: ZoomTransform) {
        self.transform = transform;
        self.refresh();
    }

    /// Zoom around a viewport position
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) {
        let origin = self.model.frame.origin;
        let local = Point::new(anchor.x - origin.x, anchor.y - origin.y);
        self.transform = self.transform.zoom_by(factor, local);
        self.refresh();
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transform = self.transform.pan_by(dx, dy);
        self.refresh();
    }

    /// Handle a click at a viewport position and dispatch the matching event
    pub fn click(&mut self, screen: Point) -> Option<Hit> {
        let hit = hit_test(&self.model, screen)?;
        debug!(?hit, "click");
        match &hit {
            Hit::Cell {
                domain,
                granularity,
                center,
            } => self
                .events
                .on_cell_click(domain, granularity, center.x, center.y),
            Hit::AxisValue { value, axis } => self.events.on_axis_value_click(value, *axis),
            Hit::Point { cq_id } => {
                if let Some(cq) = find_question(&self.data, cq_id) {
                    self.events.on_point_click(cq);
                }
            }
            Hit::Label { cq_id } => {
                if let Some(cq) = find_question(&self.data, cq_id) {
                    self.events.on_label_click(cq);
                }
            }
        }
        Some(hit)
    }

    pub fn model(&self) -> &RenderModel {
        &self.model
    }

    pub fn data(&self) -> &PlotData {
        &self.data
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    fn refresh(&mut self) {
        self.model = compute_layout(&self.data, &self.viewport, &self.transform, &self.config);
        self.events.on_render_complete();
    }
}

fn find_question<'a>(data: &'a PlotData, id: &str) -> Option<&'a CompetencyQuestion> {
    data.competency_questions.iter().find(|cq| cq.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RenderMode;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
        renders: usize,
    }

    impl PlotEvents for Recorder {
        fn on_cell_click(&mut self, domain: &str, granularity: &str, _x: f64, _y: f64) {
            self.log.push(format!("cell {} {}", domain, granularity));
        }

        fn on_axis_value_click(&mut self, value: &str, axis: Dimension) {
            self.log.push(format!("axis {} {}", axis.axis_name(), value));
        }

        fn on_point_click(&mut self, cq: &CompetencyQuestion) {
            self.log.push(format!("point {}", cq.id));
        }

        fn on_label_click(&mut self, cq: &CompetencyQuestion) {
            self.log.push(format!("label {}", cq.id));
        }

        fn on_render_complete(&mut self) {
            self.renders += 1;
        }
    }

    fn plot() -> ScatterPlot<Recorder> {
        let data = PlotData::from_axes(["Clinical", "Devices"], ["L1", "L2"]).with_question(
            CompetencyQuestion::new("q1", "Which patients?", "Clinical", "L1")
                .with_terms(["Patient"]),
        );
        ScatterPlot::new(data, Viewport::default(), LayoutConfig::default(), Recorder::default())
    }

    #[test]
    fn test_render_complete_fires_per_layout() {
        let mut plot = plot();
        assert_eq!(plot.events().renders, 1);
        plot.pan_by(10.0, 0.0);
        plot.resize(Viewport::new(800.0, 600.0));
        assert_eq!(plot.events().renders, 3);
    }

    #[test]
    fn test_zoom_switches_mode() {
        let mut plot = plot();
        assert_eq!(plot.model().mode, RenderMode::Summary);
        plot.zoom_by(0.25, Point::new(600.0, 450.0));
        assert_eq!(plot.transform().scale, 0.5);
        assert_eq!(plot.model().mode, RenderMode::Points);
        plot.set_transform(ZoomTransform::with_scale(3.0));
        assert_eq!(plot.model().mode, RenderMode::Detail);
    }

    #[test]
    fn test_clicks_dispatch_events() {
        let mut plot = plot();
        plot.set_transform(ZoomTransform::with_scale(0.5));

        let point = plot.model().point_for("q1").unwrap().position;
        let screen = plot.model().to_screen(point);
        plot.click(screen);

        let cell = plot.model().cell("Devices", "L2").unwrap().bounds.center();
        let screen = plot.model().to_screen(cell);
        plot.click(screen);

        assert_eq!(plot.events().log, vec!["point q1", "cell Devices L2"]);
    }

    #[test]
    fn test_label_click_reports_owner() {
        let mut plot = plot();
        plot.set_transform(ZoomTransform::with_scale(2.0));
        let label = plot.model().labels[0].position;
        let screen = plot.model().to_screen(label);
        assert!(matches!(plot.click(screen), Some(Hit::Label { .. })));
        assert_eq!(plot.events().log, vec!["label q1"]);
    }
}
