//! Runs the standard epicensus projections from a JSON parameter file and writes one CSV per
//! scenario and table, plus `summary.json`.
mod report;

use anyhow::Context as _;
use clap::Parser;
use epicensus::log::apply_log_spec;
use epicensus::{
    add_date_column, load_parameters, DateOptions, ParameterBundle, Region, StandardProjections,
    Table,
};
use log::info;
use report::{scenario_file_names, ReportOptions};
use std::path::PathBuf;

const SUMMARY_FILE: &str = "summary.json";

#[derive(Parser, Debug)]
#[command(version, about = "Project hospital census from compartmental epidemic models")]
struct Args {
    /// JSON parameter file. Fields left out take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start from a region's population, first-case date and distancing dates:
    /// `united-states`, `new-york-state` or `erie-county`
    #[arg(short, long, conflicts_with = "config")]
    region: Option<Region>,

    /// Directory for the CSV reports and summary
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Log level, e.g. `info`, or per-module filters such as `info,epicensus::simulator=trace`
    #[arg(short, long)]
    log_level: Option<String>,

    /// Add a calendar date column computed from the start date
    #[arg(long)]
    as_dates: bool,

    /// strftime format for the date column; implies --as-dates
    #[arg(long)]
    date_format: Option<String>,

    /// Replace existing report files
    #[arg(long)]
    overwrite: bool,
}

fn dated(table: &Table, parameters: &ParameterBundle, args: &Args) -> anyhow::Result<Table> {
    if !args.as_dates && args.date_format.is_none() {
        return Ok(table.clone());
    }
    let options = DateOptions {
        drop_day_column: false,
        date_format: args.date_format.clone(),
    };
    Ok(add_date_column(table, parameters.start_date, &options)?)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(spec) = &args.log_level {
        apply_log_spec(spec)?;
    }

    let parameters = match (&args.config, args.region) {
        (Some(path), _) => load_parameters(path)
            .with_context(|| format!("could not load parameters from {}", path.display()))?,
        (None, Some(region)) => ParameterBundle::for_region(region)?,
        (None, None) => ParameterBundle::default(),
    };

    info!(
        "Projecting {} days for a population of {}",
        parameters.n_days, parameters.population
    );
    let projections = StandardProjections::run(&parameters)?;
    let tables = projections.tables();

    let options = ReportOptions {
        output_dir: args.output_dir.clone(),
        overwrite: args.overwrite,
    };
    let file_names: Vec<[String; 3]> = tables
        .iter()
        .map(|scenario| scenario_file_names(&scenario.name))
        .collect();
    options.check_clobber(
        file_names
            .iter()
            .flatten()
            .map(String::as_str)
            .chain([SUMMARY_FILE]),
    )?;

    for (scenario, [trajectory, admissions, census]) in tables.iter().zip(&file_names) {
        options.write_table(trajectory, &dated(&scenario.trajectory, &parameters, &args)?)?;
        options.write_table(admissions, &dated(&scenario.admissions, &parameters, &args)?)?;
        options.write_table(census, &dated(&scenario.census, &parameters, &args)?)?;
        info!("Wrote reports for {}", scenario.name);
    }
    let summary_path = options.write_summary(SUMMARY_FILE, &parameters, &projections.summary)?;

    let summary = &projections.summary;
    println!(
        "R0 {:.2}, peak admissions {:.0} on day {} ({:.0} without distancing), projected deaths {:.0}",
        summary.r_naught,
        summary.admissions_peak.intervention_peak,
        summary.admissions_peak.intervention_day,
        summary.admissions_peak.baseline_peak,
        summary.totals.fatalities
    );
    println!("Summary written to {}", summary_path.display());
    Ok(())
}
