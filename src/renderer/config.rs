//! Output options for the SVG renderer

use super::svg::{DOMAIN_AXIS_TITLE, GRANULARITY_AXIS_TITLE};

/// How a render model is written out as SVG
#[derive(Debug, Clone, PartialEq)]
pub struct SvgConfig {
    /// Emit the XML declaration before the root element
    pub standalone: bool,

    /// One element per line, indented by group depth
    pub pretty_print: bool,

    /// Prepended to every CSS class (`os-` gives `os-cell`, `os-term`, ...)
    pub class_prefix: String,

    /// Title under the X axis; `None` leaves it out
    pub domain_title: Option<String>,

    /// Title left of the Y axis; `None` leaves it out
    pub granularity_title: Option<String>,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            standalone: true,
            pretty_print: true,
            class_prefix: "os-".to_string(),
            domain_title: Some(DOMAIN_AXIS_TITLE.to_string()),
            granularity_title: Some(GRANULARITY_AXIS_TITLE.to_string()),
        }
    }
}

impl SvgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Use a different CSS class prefix, e.g. to embed two plots in one page
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    /// Rename the axis titles, e.g. for a localized export
    pub fn with_axis_titles(mut self, domain: impl Into<String>, granularity: impl Into<String>) -> Self {
        self.domain_title = Some(domain.into());
        self.granularity_title = Some(granularity.into());
        self
    }

    /// Drop both axis titles; the UI shell draws its own
    pub fn without_axis_titles(mut self) -> Self {
        self.domain_title = None;
        self.granularity_title = None;
        self
    }
}
