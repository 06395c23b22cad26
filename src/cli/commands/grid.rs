//! Implementation of the `meshsweep grid` command.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::json;

use crate::adapters::FileResultStore;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{Config, ParameterGrid};
use crate::services::{Metric, ResultGrid, ResultGridBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    Lift,
    Drag,
    Moment,
    Efficiency,
    All,
}

impl MetricArg {
    pub fn metrics(self) -> Vec<Metric> {
        match self {
            Self::Lift => vec![Metric::Lift],
            Self::Drag => vec![Metric::Drag],
            Self::Moment => vec![Metric::Moment],
            Self::Efficiency => vec![Metric::Efficiency],
            Self::All => Metric::ALL.to_vec(),
        }
    }
}

#[derive(Args, Debug)]
pub struct GridArgs {
    /// Coefficient to show
    #[arg(short, long, value_enum, default_value_t = MetricArg::All)]
    pub metric: MetricArg,

    /// Use the configured sweep axes so unrun cells appear as gaps
    #[arg(long)]
    pub plan: bool,
}

#[derive(Debug, Serialize)]
pub struct GridOutput {
    pub result_log: PathBuf,
    pub records: usize,
    pub metrics: Vec<Metric>,
    pub grid: ResultGrid,
}

impl CommandOutput for GridOutput {
    fn to_human(&self) -> String {
        if self.records == 0 {
            return format!("No results in {}", self.result_log.display());
        }

        let formatter = TableFormatter::new();
        let mut sections: Vec<String> = self
            .metrics
            .iter()
            .map(|metric| formatter.format_matrix(&self.grid, *metric))
            .collect();

        let mut summary = format!(
            "{} records from {}: {} of {} cells filled",
            self.records,
            self.result_log.display(),
            self.grid.filled_count(),
            self.grid.rows.len() * self.grid.columns.len()
        );
        if self.grid.duplicates_resolved > 0 {
            summary.push_str(&format!(
                ", {} superseded by later runs",
                self.grid.duplicates_resolved
            ));
        }
        if self.grid.outside_plan > 0 {
            summary.push_str(&format!(", {} outside the plan", self.grid.outside_plan));
        }
        sections.push(summary);
        sections.join("\n\n")
    }

    fn to_json(&self) -> serde_json::Value {
        let matrices: serde_json::Map<String, serde_json::Value> = self
            .metrics
            .iter()
            .map(|metric| {
                (
                    metric.as_str().to_string(),
                    json!(self.grid.matrix(*metric)),
                )
            })
            .collect();
        json!({
            "result_log": self.result_log,
            "records": self.records,
            "rows": self.grid.rows,
            "columns": self.grid.columns,
            "matrices": matrices,
            "missing": self.grid.missing_count(),
            "duplicates_resolved": self.grid.duplicates_resolved,
            "outside_plan": self.grid.outside_plan,
        })
    }
}

pub async fn execute(args: GridArgs, config: &Config, json_mode: bool) -> Result<()> {
    let result_log = config.result_log_path();
    let records = FileResultStore::read_records(&result_log).await?;

    let grid = if args.plan {
        let plan = ParameterGrid::new(&config.sweep.inner_axis(), &config.sweep.outer_axis())?;
        ResultGridBuilder::build_for_plan(&records, &plan)
    } else {
        ResultGridBuilder::build(&records)
    };

    let output_data = GridOutput {
        result_log,
        records: records.len(),
        metrics: args.metric.metrics(),
        grid,
    };
    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ResultRecord;

    fn sample_output(metric: MetricArg) -> GridOutput {
        let records = vec![ResultRecord {
            inner: 0.01,
            outer: 1.0,
            lift: 0.3,
            drag: 0.02,
            moment: -0.1,
            efficiency: 15.0,
        }];
        GridOutput {
            result_log: PathBuf::from("dataOut/convergenceResult.txt"),
            records: records.len(),
            metrics: metric.metrics(),
            grid: ResultGridBuilder::build(&records),
        }
    }

    #[test]
    fn json_contains_only_requested_metrics() {
        let value = sample_output(MetricArg::Drag).to_json();
        assert_eq!(value["matrices"]["drag"][0][0], json!(0.02));
        assert!(value["matrices"].get("lift").is_none());
        assert_eq!(value["missing"], json!(0));
    }

    #[test]
    fn human_output_has_summary() {
        let text = sample_output(MetricArg::All).to_human();
        assert!(text.contains("1 records"));
        assert!(text.contains("1 of 1 cells filled"));
        assert!(text.contains("efficiency"));
    }

    #[test]
    fn empty_log_is_reported() {
        let output = GridOutput {
            result_log: PathBuf::from("x.txt"),
            records: 0,
            metrics: Metric::ALL.to_vec(),
            grid: ResultGridBuilder::build(&[]),
        };
        assert_eq!(output.to_human(), "No results in x.txt");
    }
}
