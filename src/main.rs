mod input;
mod logging;
mod model;
mod pipeline;
mod plot;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::input::settings::load_settings;
use crate::input::{InputError, load_template, load_workbook};
use crate::model::layout::QUADRANTS;
use crate::pipeline::stage5_export::run_stage5;
use crate::pipeline::stage6_decorate::run_stage6;
use crate::pipeline::{PipelineError, RunInputs, run_pipeline, summarize_workbook};
use crate::plot::{PlotRenderer, PlotRequest, RenderedPlots, RscriptRenderer, collect_plate_pngs};

#[derive(Debug, Parser)]
#[command(
    name = "nta-workbook",
    version,
    about = "Assemble neutralization-titration plate-reader CSV into a plate workbook with a censored titre summary."
)]
struct Cli {
    /// -v info, -vv debug, -vvv trace. RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build plates, Summary and imputation from a plate-reader CSV.
    Run(RunArgs),
    /// Rebuild the Summary sheet of an existing workbook.
    Summarize(SummarizeArgs),
    /// Embed already rendered plot images into a workbook.
    Decorate(DecorateArgs),
    /// Render plots with the R script and embed them.
    Plot(PlotArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    #[arg(long)]
    csv: PathBuf,
    #[arg(long)]
    template: PathBuf,
    /// Sheet of the template to copy; defaults to the first sheet.
    #[arg(long)]
    template_sheet: Option<String>,
    #[arg(long)]
    title: String,
    /// Pseudotype names separated by commas or newlines.
    #[arg(long, default_value = "")]
    pseudotypes: String,
    /// Sample IDs separated by commas or newlines.
    #[arg(long, default_value = "")]
    samples: String,
    /// Pseudotypes per plate (1-4).
    #[arg(long, allow_negative_numbers = true)]
    count: i64,
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Defaults to `<title>.xlsx` with spaces replaced by underscores.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Date-stamp the default file name (`<title>_YYYY-MM-DD.xlsx`).
    #[arg(long)]
    timestamp: bool,
}

#[derive(Debug, Args)]
struct SummarizeArgs {
    #[arg(long)]
    workbook: PathBuf,
    /// Pseudotype count the plates were assembled with.
    #[arg(long, allow_negative_numbers = true)]
    pseudotypes: Option<i64>,
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Defaults to overwriting the input workbook.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct DecorateArgs {
    #[arg(long)]
    workbook: PathBuf,
    /// Summary plot PNG.
    #[arg(long)]
    image: PathBuf,
    /// Directory holding `PlateN.png` images.
    #[arg(long)]
    plate_images: Option<PathBuf>,
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct PlotArgs {
    #[arg(long)]
    workbook: PathBuf,
    #[arg(long)]
    script: PathBuf,
    #[arg(long, default_value = "Rscript")]
    rscript: String,
    /// Defaults to the workbook file name without extension.
    #[arg(long)]
    title: Option<String>,
    /// Four `#rrggbb` colours, comma separated.
    #[arg(long, value_delimiter = ',')]
    colours: Option<Vec<String>>,
    /// 1-based quadrant to leave out of the plot; repeatable.
    #[arg(long = "hide-quadrant")]
    hide_quadrants: Vec<usize>,
    #[arg(long)]
    no_timestamp: bool,
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli.command) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), PipelineError> {
    match command {
        Command::Run(args) => run_assay(args),
        Command::Summarize(args) => run_summarize(args),
        Command::Decorate(args) => run_decorate(args),
        Command::Plot(args) => run_plot(args),
    }
}

fn run_assay(args: RunArgs) -> Result<(), PipelineError> {
    let settings = load_settings(args.settings.as_deref())?;
    let sheet = args
        .template_sheet
        .as_deref()
        .or(settings.template_sheet.as_deref());
    let template = load_template(&args.template, sheet)?;
    let csv = File::open(&args.csv).map_err(InputError::from)?;

    let output = run_pipeline(
        BufReader::new(csv),
        &template,
        &RunInputs {
            assay_title: &args.title,
            pseudotypes: &args.pseudotypes,
            sample_ids: &args.samples,
            pseudotype_count: args.count,
        },
        &settings,
    )?;

    let date = (args.timestamp || settings.timestamp_in_filename)
        .then(|| chrono::Local::now().format("%Y-%m-%d").to_string());
    let out = resolve_output_path(args.out.as_deref(), &args.title, date.as_deref());
    run_stage5(&output.workbook, &out)?;
    Ok(())
}

fn run_summarize(args: SummarizeArgs) -> Result<(), PipelineError> {
    let settings = load_settings(args.settings.as_deref())?;
    let mut workbook = load_workbook(&args.workbook)?;
    summarize_workbook(&mut workbook, &settings, args.pseudotypes)?;
    run_stage5(&workbook, args.out.as_deref().unwrap_or(&args.workbook))?;
    Ok(())
}

fn run_decorate(args: DecorateArgs) -> Result<(), PipelineError> {
    let settings = load_settings(args.settings.as_deref())?;
    let mut workbook = load_workbook(&args.workbook)?;
    let plots = RenderedPlots {
        summary_png: read_input(&args.image)?,
        plate_pngs: match &args.plate_images {
            Some(dir) => collect_plate_pngs(dir)?,
            None => Default::default(),
        },
    };
    run_stage6(&mut workbook, &plots, &settings);
    run_stage5(&workbook, args.out.as_deref().unwrap_or(&args.workbook))?;
    Ok(())
}

fn run_plot(args: PlotArgs) -> Result<(), PipelineError> {
    let settings = load_settings(args.settings.as_deref())?;
    let request = plot_request(&args)?;
    let renderer = RscriptRenderer {
        program: args.rscript.clone(),
        script: args.script.clone(),
    };
    let plots = renderer.render(&args.workbook, &request)?;

    let mut workbook = load_workbook(&args.workbook)?;
    run_stage6(&mut workbook, &plots, &settings);
    run_stage5(&workbook, args.out.as_deref().unwrap_or(&args.workbook))?;
    Ok(())
}

fn plot_request(args: &PlotArgs) -> Result<PlotRequest, PipelineError> {
    let title = match &args.title {
        Some(title) => title.clone(),
        None => args
            .workbook
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    let mut request = PlotRequest::new(title);
    request.include_timestamp = !args.no_timestamp;
    if let Some(colours) = &args.colours {
        request.colours = colours.clone().try_into().map_err(|given: Vec<String>| {
            InputError::MissingInput(format!(
                "--colours needs {QUADRANTS} values, got {}",
                given.len()
            ))
        })?;
    }
    for &q in &args.hide_quadrants {
        if q == 0 || q > QUADRANTS {
            return Err(InputError::MissingInput(format!(
                "--hide-quadrant must be 1-{QUADRANTS}, got {q}"
            ))
            .into());
        }
        request.quadrants[q - 1] = false;
    }
    request.validate()?;
    Ok(request)
}

fn read_input(path: &Path) -> Result<Vec<u8>, InputError> {
    if !path.is_file() {
        return Err(InputError::MissingInput(format!(
            "file not found: {}",
            path.display()
        )));
    }
    Ok(fs::read(path)?)
}

fn resolve_output_path(out: Option<&Path>, title: &str, date: Option<&str>) -> PathBuf {
    if let Some(out) = out {
        return out.to_path_buf();
    }
    let mut stem = title.trim().replace(' ', "_");
    if stem.is_empty() {
        stem = "nta_workbook".to_string();
    }
    match date {
        Some(date) => PathBuf::from(format!("{stem}_{date}.xlsx")),
        None => PathBuf::from(format!("{stem}.xlsx")),
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
