//! Table output formatting for CLI commands
//!
//! Renders result matrices and failure lists using comfy-table. Rows are
//! inner densities and columns outer densities, both ascending; cells
//! without a result show `-`.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::domain::models::CaseFailure;
use crate::services::{Metric, ResultGrid};

const MISSING: &str = "-";

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self {
            use_colors: console::colors_enabled(),
            max_width: None,
        }
    }

    /// Create a new table formatter with custom settings
    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// One metric as an inner-by-outer matrix
    pub fn format_matrix(&self, grid: &ResultGrid, metric: Metric) -> String {
        let mut table = self.create_base_table();

        let mut header = vec![Cell::new(format!("{metric} (inner \\ outer)"))
            .add_attribute(Attribute::Bold)];
        header.extend(
            grid.columns
                .iter()
                .map(|c| Cell::new(c).add_attribute(Attribute::Bold)),
        );
        table.set_header(header);

        for (row_value, row) in grid.rows.iter().zip(grid.matrix(metric)) {
            let mut cells = vec![Cell::new(row_value).add_attribute(Attribute::Bold)];
            cells.extend(row.iter().map(|value| self.value_cell(*value)));
            table.add_row(cells);
        }

        table.to_string()
    }

    /// Failed cells of a run
    pub fn format_failures(&self, failures: &[CaseFailure]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Inner").add_attribute(Attribute::Bold),
            Cell::new("Outer").add_attribute(Attribute::Bold),
            Cell::new("Project").add_attribute(Attribute::Bold),
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("Error").add_attribute(Attribute::Bold),
        ]);

        for failure in failures {
            let stage = Cell::new(failure.stage);
            let stage = if self.use_colors {
                stage.fg(Color::Red)
            } else {
                stage
            };
            table.add_row(vec![
                Cell::new(failure.pair.inner),
                Cell::new(failure.pair.outer),
                Cell::new(&failure.project),
                stage,
                Cell::new(&failure.message),
            ]);
        }

        table.to_string()
    }

    fn value_cell(&self, value: Option<f64>) -> Cell {
        match value {
            Some(v) => Cell::new(format!("{v:.6}")).set_alignment(CellAlignment::Right),
            None if self.use_colors => Cell::new(MISSING)
                .fg(Color::DarkGrey)
                .set_alignment(CellAlignment::Center),
            None => Cell::new(MISSING).set_alignment(CellAlignment::Center),
        }
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        // Use UTF-8 preset for nice borders
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        if !self.use_colors {
            table.force_no_tty();
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}
