//! Writes projection tables and the run summary to an output directory.
use anyhow::{bail, Context as _};
use epicensus::{EpiSummary, ParameterBundle, Table};
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::path::PathBuf;

/// Where reports go and whether existing files may be replaced.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub output_dir: PathBuf,
    pub overwrite: bool,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    parameters: &'a ParameterBundle,
    summary: &'a EpiSummary,
}

impl ReportOptions {
    #[must_use]
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Fails on the first of `file_names` that already exists, unless overwriting is allowed.
    /// Call before writing anything.
    pub fn check_clobber<'a>(
        &self,
        file_names: impl IntoIterator<Item = &'a str>,
    ) -> anyhow::Result<()> {
        if self.overwrite {
            return Ok(());
        }
        for file_name in file_names {
            let path = self.path(file_name);
            if path.exists() {
                bail!(
                    "output file already exists: {} (pass --overwrite to replace it)",
                    path.display()
                );
            }
        }
        Ok(())
    }

    fn create(&self, file_name: &str) -> anyhow::Result<(PathBuf, File)> {
        create_dir_all(&self.output_dir).with_context(|| {
            format!("could not create output directory {}", self.output_dir.display())
        })?;
        let path = self.path(file_name);
        let file = File::create(&path)
            .with_context(|| format!("could not create {}", path.display()))?;
        Ok((path, file))
    }

    /// Writes `table` as a CSV file with a header row of its column names.
    pub fn write_table(&self, file_name: &str, table: &Table) -> anyhow::Result<PathBuf> {
        let (path, file) = self.create(file_name)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(table.column_names())?;
        for record in table.records() {
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(path)
    }

    /// Writes the parameters used and the summary statistics as pretty-printed JSON.
    pub fn write_summary(
        &self,
        file_name: &str,
        parameters: &ParameterBundle,
        summary: &EpiSummary,
    ) -> anyhow::Result<PathBuf> {
        let (path, file) = self.create(file_name)?;
        serde_json::to_writer_pretty(
            file,
            &SummaryReport {
                parameters,
                summary,
            },
        )?;
        Ok(path)
    }
}

/// The file names written for one scenario.
#[must_use]
pub fn scenario_file_names(scenario: &str) -> [String; 3] {
    [
        format!("{scenario}_trajectory.csv"),
        format!("{scenario}_admissions.csv"),
        format!("{scenario}_census.csv"),
    ]
}
