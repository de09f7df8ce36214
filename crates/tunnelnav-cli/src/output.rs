//! Output formatting for composed routes and building listings.

use std::fmt::Write;

use clap::ValueEnum;
use tunnelnav_lib::output::format_duration;
use tunnelnav_lib::{InstructionKind, RouteRenderMode, RouteStep, RouteSummary, SegmentType};

use crate::terminal::ColorPalette;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Numbered plain-text instructions.
    Text,
    /// Markdown-flavoured text.
    Rich,
    /// Tagged, colored turn-by-turn view.
    #[default]
    Enhanced,
    /// Pretty-printed JSON.
    Json,
}

/// Render a route summary in the requested format.
pub fn render_route(
    summary: &RouteSummary,
    format: OutputFormat,
    palette: ColorPalette,
) -> serde_json::Result<String> {
    Ok(match format {
        OutputFormat::Text => summary.render(RouteRenderMode::PlainText),
        OutputFormat::Rich => summary.render(RouteRenderMode::RichText),
        OutputFormat::Enhanced => EnhancedRenderer::new(palette).render(summary),
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(summary)?),
    })
}

/// Render a list of building names.
pub fn render_names(names: &[String], format: OutputFormat) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(names)?));
    }
    let mut buffer = String::new();
    for name in names {
        let _ = writeln!(buffer, "{name}");
    }
    Ok(buffer)
}

/// Turn-by-turn view with a badge per segment.
#[derive(Debug, Clone, Copy)]
pub struct EnhancedRenderer {
    palette: ColorPalette,
}

impl EnhancedRenderer {
    #[must_use]
    pub const fn new(palette: ColorPalette) -> Self {
        Self { palette }
    }

    pub fn render(&self, summary: &RouteSummary) -> String {
        let p = &self.palette;
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Route to {}{}{}:",
            p.heading, summary.target, p.reset
        );

        for segment in &summary.route.segments {
            let (tag_color, tag_text) = match segment.segment_type {
                SegmentType::Indoor => (p.tag_indoor, "INDR"),
                SegmentType::Outdoor => (p.tag_outdoor, "OUTD"),
            };
            for step in &segment.steps {
                let _ = writeln!(
                    buffer,
                    "{}{}{} {}",
                    tag_color,
                    tag_text,
                    p.reset,
                    self.describe(step)
                );
            }
        }

        let _ = writeln!(
            buffer,
            "\n{}Distance:{} {:.0} m",
            p.muted, p.reset, summary.route.total_distance_meters
        );
        let _ = writeln!(
            buffer,
            "{}Walking time:{} {}",
            p.muted,
            p.reset,
            format_duration(summary.route.total_time_seconds)
        );
        buffer
    }

    fn describe(&self, step: &RouteStep) -> String {
        let p = &self.palette;
        let (label, is_arrival) = match &step.instruction {
            Some(instruction) => (
                instruction.label.as_str(),
                instruction.kind == InstructionKind::Final,
            ),
            None => ("Start", false),
        };
        let label = if is_arrival {
            format!("{}{}{}", p.arrival, label, p.reset)
        } else {
            label.to_string()
        };

        match step.segment_type {
            SegmentType::Indoor => format!(
                "{} {}({}, floor {}){}",
                label, p.muted, step.node.building_name, step.floor, p.reset
            ),
            SegmentType::Outdoor => label,
        }
    }
}
