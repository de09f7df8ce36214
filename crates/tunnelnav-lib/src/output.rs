use std::fmt::Write;

use serde::Serialize;

use crate::routing::RouteResult;
use crate::segment::{RouteStep, SegmentType};

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    PlainText,
    RichText,
}

/// A composed route together with the building it leads to.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub target: String,
    #[serde(flatten)]
    pub route: RouteResult,
}

impl RouteSummary {
    pub fn new(target: impl Into<String>, route: RouteResult) -> Self {
        Self {
            target: target.into(),
            route,
        }
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::RichText => self.render_rich(),
        }
    }

    fn headline(&self) -> String {
        format!(
            "{} segment{}, {:.0} m, {}",
            self.route.segments.len(),
            if self.route.segments.len() == 1 { "" } else { "s" },
            self.route.total_distance_meters,
            format_duration(self.route.total_time_seconds)
        )
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(buffer, "Route to {}: {}", self.target, self.headline());

        for segment in &self.route.segments {
            let _ = writeln!(buffer, "{}:", segment_label(segment.segment_type));
            for (index, step) in segment.steps.iter().enumerate() {
                let _ = writeln!(buffer, "{:>3}. {}", index + 1, describe_step(step));
            }
        }
        buffer
    }

    fn render_rich(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(buffer, "**Route to {}** ({})", self.target, self.headline());

        for segment in &self.route.segments {
            let _ = writeln!(buffer, "\n_{}_", segment_label(segment.segment_type));
            for step in &segment.steps {
                let _ = writeln!(buffer, "* {}", describe_step(step));
            }
        }
        buffer
    }
}

fn segment_label(segment_type: SegmentType) -> &'static str {
    match segment_type {
        SegmentType::Indoor => "Indoor",
        SegmentType::Outdoor => "Outdoor",
    }
}

fn describe_step(step: &RouteStep) -> String {
    let label = step
        .instruction
        .as_ref()
        .map(|instruction| instruction.label.as_str())
        .unwrap_or("Start");

    match step.segment_type {
        SegmentType::Indoor => format!(
            "{} ({}, floor {})",
            label, step.node.building_name, step.floor
        ),
        SegmentType::Outdoor => label.to_string(),
    }
}

/// Human-friendly duration such as `45 s` or `6 min 5 s`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (minutes, seconds) = (total / 60, total % 60);
    match (minutes, seconds) {
        (0, s) => format!("{s} s"),
        (m, 0) => format!("{m} min"),
        (m, s) => format!("{m} min {s} s"),
    }
}
