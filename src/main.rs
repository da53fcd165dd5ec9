//! PAYG projection CLI
//!
//! Runs one scenario and writes the yearly results to CSV

use anyhow::{Context, Result};
use clap::Parser;
use payg_projection::dataset::default_dataset_path;
use payg_projection::{Dataset, ScenarioParams, ScenarioResult, ScenarioRunner};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "payg_projection", version, about = "Population and PAYG pension balance projection")]
struct Args {
    /// Dataset JSON; falls back to data/dataset.json if present, then to the
    /// built-in reference dataset
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Write the dataset in use (after any population override) as JSON
    #[arg(long)]
    export_dataset: Option<PathBuf>,

    /// Base population CSV (age,male,female) replacing the dataset's
    #[arg(long)]
    population: Option<PathBuf>,

    /// Scenario parameters JSON; missing fields take dataset defaults
    #[arg(long)]
    params: Option<PathBuf>,

    #[arg(long)]
    horizon: Option<u32>,

    #[arg(long)]
    tfr: Option<f64>,

    #[arg(long)]
    e0_male: Option<f64>,

    #[arg(long)]
    e0_female: Option<f64>,

    /// Net migration per 1000 population
    #[arg(long, allow_hyphen_values = true)]
    migration: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    wage_growth: Option<f64>,

    #[arg(long)]
    unemployment: Option<f64>,

    #[arg(long)]
    contribution_rate: Option<f64>,

    #[arg(long)]
    retirement_age: Option<u32>,

    /// Attach equilibrium solves to every year
    #[arg(long)]
    equilibrium: bool,

    #[arg(long)]
    equilibrium_min_age: Option<u32>,

    #[arg(long)]
    equilibrium_max_age: Option<u32>,

    /// Year point CSV output
    #[arg(long, default_value = "projection_output.csv")]
    output: PathBuf,

    /// Population pyramid CSV output (year,age,male,female)
    #[arg(long)]
    pyramids: Option<PathBuf>,

    /// Print the full result as JSON on stdout instead of the table
    #[arg(long)]
    json: bool,
}

impl Args {
    fn scenario_params(&self, dataset: &Dataset) -> Result<ScenarioParams> {
        let mut params = match &self.params {
            Some(path) => ScenarioParams::from_json_path(path)
                .with_context(|| format!("failed to read parameters from {}", path.display()))?,
            None => ScenarioParams::from_dataset(dataset),
        };

        if let Some(v) = self.horizon { params.horizon_years = v; }
        if let Some(v) = self.tfr { params.tfr = v; }
        if let Some(v) = self.e0_male { params.e0_male = v; }
        if let Some(v) = self.e0_female { params.e0_female = v; }
        if let Some(v) = self.migration { params.net_migration_per_1000 = v; }
        if let Some(v) = self.wage_growth { params.real_wage_growth = v; }
        if let Some(v) = self.unemployment { params.unemployment_rate = v; }
        if let Some(v) = self.contribution_rate { params.contribution_rate = v; }
        if let Some(v) = self.retirement_age { params.retirement_age = v; }
        if let Some(v) = self.equilibrium_min_age { params.equilibrium_age_bounds.min_age = v; }
        if let Some(v) = self.equilibrium_max_age { params.equilibrium_age_bounds.max_age = v; }
        params.compute_equilibrium |= self.equilibrium;

        Ok(params)
    }
}

fn write_points(result: &ScenarioResult, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("unable to create {}", path.display()))?;
    for point in result.points() {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_pyramids(result: &ScenarioResult, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(
        File::create(path).with_context(|| format!("unable to create {}", path.display()))?,
    );
    writeln!(file, "year,age,male,female")?;
    for pyramid in result.pyramids() {
        for (age, (male, female)) in pyramid.male.iter().zip(&pyramid.female).enumerate() {
            writeln!(file, "{},{},{:.2},{:.2}", pyramid.year, age, male, female)?;
        }
    }
    file.flush()?;
    Ok(())
}

fn print_table(result: &ScenarioResult) {
    println!(
        "{:>5} {:>12} {:>10} {:>10} {:>11} {:>11} {:>10} {:>16} {:>8} {:>6}",
        "Year", "Population", "Births", "Deaths", "Workers", "Pensioners", "AvgPension", "Balance", "ReqRate", "Dep"
    );
    println!("{}", "-".repeat(110));
    for p in result.points() {
        println!(
            "{:>5} {:>12.0} {:>10.0} {:>10.0} {:>11.0} {:>11.0} {:>10.0} {:>16.0} {:>8.4} {:>6.3}",
            p.year,
            p.total_population,
            p.births,
            p.deaths,
            p.workers,
            p.pensioners,
            p.average_pension,
            p.balance,
            p.required_rate,
            p.dependency_ratio,
        );
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Years: {}", summary.years);
    println!("  Population: {:.0} -> {:.0}", summary.initial_population, summary.final_population);
    match summary.first_deficit_year {
        Some(year) => println!("  First deficit year: {}", year),
        None => println!("  First deficit year: none"),
    }
    println!("  Cumulative balance: {:.0}", summary.cumulative_balance);
    println!("  Peak required rate: {:.4}", summary.peak_required_rate);
    println!("  Final dependency ratio: {:.3}", summary.final_dependency_ratio);

    let calibration = result.calibration();
    println!(
        "  Mortality scaling: male k={:.4} (e0 {:.2}), female k={:.4} (e0 {:.2})",
        calibration.male.scaling_factor,
        calibration.male.achieved_e0,
        calibration.female.scaling_factor,
        calibration.female.achieved_e0,
    );
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset_path = args.dataset.as_deref().or_else(|| default_dataset_path());
    let mut dataset = match dataset_path {
        Some(path) => Dataset::from_json_path(path)
            .with_context(|| format!("failed to load dataset {}", path.display()))?,
        None => Dataset::reference(),
    };
    if let Some(path) = &args.population {
        dataset = dataset
            .with_population_csv(path)
            .with_context(|| format!("failed to load population {}", path.display()))?;
    }
    if let Some(path) = &args.export_dataset {
        dataset
            .write_json(path)
            .with_context(|| format!("unable to write dataset to {}", path.display()))?;
        eprintln!("Dataset written to {}", path.display());
    }

    let params = args.scenario_params(&dataset)?;
    let runner = ScenarioRunner::with_dataset(dataset)?;
    let result = runner.run(params).context("scenario run failed")?;

    if args.json {
        serde_json::to_writer_pretty(std::io::stdout().lock(), &result)?;
        println!();
    } else {
        print_table(&result);
    }

    write_points(&result, &args.output)?;
    eprintln!("Year points written to {}", args.output.display());
    if let Some(path) = &args.pyramids {
        write_pyramids(&result, path)?;
        eprintln!("Pyramids written to {}", path.display());
    }

    Ok(())
}
