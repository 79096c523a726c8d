//! Chart rendering for presence arrays.
//!
//! The presence array is rendered as a bar chart of 0/1 values, one bar per
//! bucket, written out as a standalone HTML file.

use crate::core::presence::Presence;
use plotly::common::color::NamedColor;
use plotly::common::{Marker, Title};
use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing a chart.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Labeling options for the presence chart.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Chart title.
    pub title: String,
    /// Bucket width in milliseconds, shown on the x-axis label.
    pub bucket_ms: u64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Binary Representation of Keystroke Timings".to_string(),
            bucket_ms: 10,
        }
    }
}

fn x_axis_label(bucket_ms: u64) -> String {
    format!("Time Slot ({bucket_ms} ms intervals)")
}

/// Build the presence bar chart.
pub fn presence_chart(presence: &Presence, options: &ChartOptions) -> Plot {
    let x: Vec<usize> = (0..presence.len()).collect();
    let y: Vec<u8> = presence.slots().to_vec();

    let trace = Bar::new(x, y).marker(Marker::new().color(NamedColor::Black));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(
        Layout::new()
            .title(Title::new(&options.title))
            .x_axis(Axis::new().title(Title::new(&x_axis_label(options.bucket_ms))))
            .y_axis(Axis::new().title(Title::new("Presence (1 = detected, 0 = not detected)"))),
    );
    plot
}

/// Render the chart to a standalone HTML file.
pub fn write_chart(
    presence: &Presence,
    options: &ChartOptions,
    path: &Path,
) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| RenderError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }

    presence_chart(presence, options).write_html(path);
    Ok(())
}
