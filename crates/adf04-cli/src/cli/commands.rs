use super::CliError;
use adf04_core::common::units::EnergyUnit;
use adf04_core::modules::crossmatch::{cross_match, substituted_a_column, CrossMatchMode};
use adf04_core::modules::merge::{
    assign_term_groups, merge_a_coefficients, merge_infinite_points, MergeMode, MergeOutcome,
};
use adf04_core::modules::remap::{remap_levels, remap_transitions};
use adf04_core::support::io::{
    read_document, read_permutation_file, read_reference_dataset, write_column, write_document,
};
use adf04_core::{Document, TermComposite};
use anyhow::Context;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum UnitArg {
    /// Wavenumbers, as stored in the file
    Cm,
    /// Rydbergs
    Ryd,
    /// Electron volts
    Ev,
}

impl UnitArg {
    fn as_unit(self) -> EnergyUnit {
        match self {
            Self::Cm => EnergyUnit::InverseCm,
            Self::Ryd => EnergyUnit::Rydberg,
            Self::Ev => EnergyUnit::ElectronVolt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum MergeFieldArg {
    /// The A-coefficient column
    A,
    /// The trailing infinite-energy column
    Infinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum MergeModeArg {
    /// Overlay wins wherever it has the transition
    Overwrite,
    /// Overlay only fills placeholder values
    Fill,
}

impl MergeModeArg {
    fn as_mode(self) -> MergeMode {
        match self {
            Self::Overwrite => MergeMode::OverwriteAll,
            Self::Fill => MergeMode::FillPlaceholdersOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum CompositeArg {
    /// Two trailing descriptor tokens
    Two,
    /// Three trailing descriptor tokens
    Three,
}

impl CompositeArg {
    fn as_composite(self) -> TermComposite {
        match self {
            Self::Two => TermComposite::TwoToken,
            Self::Three => TermComposite::ThreeToken,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct RoundtripArgs {
    /// Input ADF04 file
    input: PathBuf,

    /// Output ADF04 file
    output: PathBuf,

    /// Unit for the parsed ionization potential
    #[arg(long, value_enum, default_value = "ryd")]
    unit: UnitArg,
}

pub(super) fn run_roundtrip(args: RoundtripArgs) -> Result<i32, CliError> {
    let document = read_document(&args.input, args.unit.as_unit())?;
    tracing::info!(
        levels = document.levels.len(),
        transitions = document.rates.len(),
        "parsed {}",
        args.input.display()
    );
    write_document(&args.output, &document)?;
    Ok(0)
}

#[derive(clap::Args)]
pub(super) struct ReorderArgs {
    /// Input ADF04 file
    input: PathBuf,

    /// JSON file mapping old level indices to new
    mapping: PathBuf,

    /// Output ADF04 file
    output: PathBuf,
}

pub(super) fn run_reorder(args: ReorderArgs) -> Result<i32, CliError> {
    let document = read_document(&args.input, EnergyUnit::Rydberg)?;
    let permutation = read_permutation_file(&args.mapping)?;
    let levels = remap_levels(&document.levels, &permutation)?;
    let rates = remap_transitions(&document.rates, &permutation)?;
    let reordered = Document {
        header: document.header,
        levels,
        temperatures: document.temperatures,
        rates,
    };
    write_document(&args.output, &reordered)?;
    Ok(0)
}

#[derive(clap::Args)]
pub(super) struct MergeArgs {
    /// Base ADF04 file; its transition order defines the output column
    base: PathBuf,

    /// Overlay ADF04 file supplying replacement values
    overlay: PathBuf,

    /// Output column file, one value per base transition
    output: PathBuf,

    /// Which value column to merge
    #[arg(long, value_enum, default_value = "a")]
    field: MergeFieldArg,

    /// How overlay values replace base values
    #[arg(long, value_enum, default_value = "fill")]
    mode: MergeModeArg,

    /// Optional JSON report path
    #[arg(long)]
    report: Option<PathBuf>,
}

pub(super) fn run_merge(args: MergeArgs) -> Result<i32, CliError> {
    let base = read_document(&args.base, EnergyUnit::Rydberg)?;
    let overlay = read_document(&args.overlay, EnergyUnit::Rydberg)?;
    let outcome: MergeOutcome = match args.field {
        MergeFieldArg::A => {
            merge_a_coefficients(&base.rates, &overlay.rates, args.mode.as_mode())?
        }
        MergeFieldArg::Infinite => {
            merge_infinite_points(&base.rates, &overlay.rates, args.mode.as_mode())?
        }
    };
    write_column(&args.output, &outcome.column)?;
    if let Some(report) = &args.report {
        write_json_report(report, &outcome.report)?;
    }
    println!(
        "{} transitions: {} replaced, {} kept, {} missing in overlay",
        outcome.report.total,
        outcome.report.replaced,
        outcome.report.kept,
        outcome.report.missing_in_overlay.len()
    );
    Ok(0)
}

#[derive(clap::Args)]
pub(super) struct CompareArgs {
    /// Input ADF04 file
    input: PathBuf,

    /// Comma-separated reference dataset
    reference: PathBuf,

    /// Optional JSON report path; outcomes print to stdout otherwise
    #[arg(long)]
    report: Option<PathBuf>,
}

pub(super) fn run_compare(args: CompareArgs) -> Result<i32, CliError> {
    let document = read_document(&args.input, EnergyUnit::Rydberg)?;
    let dataset = read_reference_dataset(&args.reference)?;
    warn_on_malformed_rows(&dataset);
    let outcomes = cross_match(&document, &dataset, CrossMatchMode::Comparison)?;
    match &args.report {
        Some(report) => write_json_report(report, &outcomes)?,
        None => {
            let rendered =
                serde_json::to_string_pretty(&outcomes).context("rendering outcome report")?;
            println!("{rendered}");
        }
    }
    Ok(0)
}

#[derive(clap::Args)]
pub(super) struct SubstituteArgs {
    /// Input ADF04 file
    input: PathBuf,

    /// Comma-separated reference dataset
    reference: PathBuf,

    /// Output A-coefficient column file
    output: PathBuf,
}

pub(super) fn run_substitute(args: SubstituteArgs) -> Result<i32, CliError> {
    let document = read_document(&args.input, EnergyUnit::Rydberg)?;
    let dataset = read_reference_dataset(&args.reference)?;
    warn_on_malformed_rows(&dataset);
    let column = substituted_a_column(&document, &dataset);
    write_column(&args.output, &column)?;
    Ok(0)
}

#[derive(clap::Args)]
pub(super) struct TermGroupsArgs {
    /// Input ADF04 file
    input: PathBuf,

    /// How many descriptor tokens form the grouping key
    #[arg(long, value_enum, default_value = "three")]
    composite: CompositeArg,
}

pub(super) fn run_term_groups(args: TermGroupsArgs) -> Result<i32, CliError> {
    let document = read_document(&args.input, EnergyUnit::Rydberg)?;
    let groups = assign_term_groups(&document.levels, args.composite.as_composite())?;
    for (entry, group) in document.levels.iter().zip(&groups) {
        println!("{} {}", entry.index(), group);
    }
    Ok(0)
}

fn write_json_report<T: serde::Serialize>(path: &Path, report: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(report).context("rendering JSON report")?;
    std::fs::write(path, rendered)
        .with_context(|| format!("writing report to '{}'", path.display()))?;
    Ok(())
}

fn warn_on_malformed_rows(dataset: &adf04_core::modules::crossmatch::ReferenceDataset) {
    for row in &dataset.malformed {
        tracing::warn!(line = row.line, "skipping malformed reference row: {}", row.reason);
    }
}
