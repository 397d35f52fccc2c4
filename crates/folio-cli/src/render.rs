//! Terminal rendering of the working set and of merge progress.

use std::time::Duration;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use folio_core::{MergeEvent, ProgressPhase};
use folio_model::{Entry, Resolution};
use indicatif::{ProgressBar, ProgressStyle};

const PENDING: &str = "…";

/// Bar resolution: one step per tenth of a percent.
const BAR_STEPS: u64 = 1000;

/// Cell text for each entry in display order: position, name, pages, size,
/// status.
pub fn entry_rows(view: &[&Entry]) -> Vec<[String; 5]> {
    view.iter()
        .enumerate()
        .map(|(index, entry)| {
            [
                (index + 1).to_string(),
                entry.display_name.clone(),
                resolved_text(&entry.page_count),
                resolved_text(&entry.byte_size),
                status_text(entry).to_string(),
            ]
        })
        .collect()
}

fn resolved_text<T: ToString>(value: &Resolution<T>) -> String {
    value
        .resolved()
        .map_or_else(|| PENDING.to_string(), ToString::to_string)
}

fn status_text(entry: &Entry) -> &'static str {
    if entry.is_resolved() { "ready" } else { "pending" }
}

pub fn entry_table(view: &[&Entry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Document"),
        header_cell("Pages"),
        header_cell("Size"),
        header_cell("Status"),
    ]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
    for index in [0, 2, 3] {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    for [position, name, pages, size, status] in entry_rows(view) {
        let status_cell = if status == "ready" {
            Cell::new(status).fg(Color::Green)
        } else {
            dim_cell(status)
        };
        table.add_row(vec![
            dim_cell(position),
            Cell::new(name),
            value_cell(pages),
            value_cell(size),
            status_cell,
        ]);
    }
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn dim_cell(text: impl ToString) -> Cell {
    Cell::new(text).add_attribute(Attribute::Dim)
}

fn value_cell(text: String) -> Cell {
    if text == PENDING {
        dim_cell(text)
    } else {
        Cell::new(text)
    }
}

/// Label shown next to the bar.
pub fn progress_label(phase: ProgressPhase, value: f64) -> String {
    match phase {
        ProgressPhase::Idle => "idle".to_string(),
        ProgressPhase::Live => format!("merging {value:.0}%"),
        ProgressPhase::Finishing => format!("finishing {value:.1}%"),
    }
}

/// Bar position for a displayed value in `[0, 100]`.
pub fn bar_position(value: f64) -> u64 {
    (value.clamp(0.0, 100.0) * 10.0).round() as u64
}

/// Progress bar fed by [`MergeEvent`]s.
pub struct MergeProgress {
    bar: ProgressBar,
}

impl MergeProgress {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(BAR_STEPS))
    }

    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_length(BAR_STEPS);
        let style = ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn handle(&self, event: &MergeEvent) {
        match event {
            MergeEvent::Started { documents, .. } => {
                self.bar.enable_steady_tick(Duration::from_millis(100));
                self.bar.set_position(0);
                self.bar.set_message(format!("merging {documents} documents"));
            }
            MergeEvent::Progress { phase, value } => {
                self.bar.set_position(bar_position(*value));
                self.bar.set_message(progress_label(*phase, *value));
            }
            MergeEvent::Accepted { start } => {
                self.bar
                    .set_message(progress_label(ProgressPhase::Finishing, *start));
            }
            MergeEvent::Succeeded { .. } => {
                self.bar.set_position(BAR_STEPS);
                self.bar.finish_with_message("done");
            }
            MergeEvent::Failed { reason } => {
                self.bar.abandon_with_message(format!("failed: {reason}"));
            }
            MergeEvent::Cancelled => self.bar.abandon_with_message("cancelled"),
        }
    }
}

impl Default for MergeProgress {
    fn default() -> Self {
        Self::new()
    }
}
