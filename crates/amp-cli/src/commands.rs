use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::info;

use amp_transform::{AmplitudeTransformation, BatmobileFilter, Transformation, WebUserId};
use amp_validate::{ValidationReport, Validator};

use amp_cli::config::load_config;
use amp_cli::runner::{RunStats, run_lines};

use crate::cli::{RecipeArg, RunArgs, ValidateArgs};

pub fn run_validate(args: &ValidateArgs) -> Result<ValidationReport> {
    let raw = load_config(&args.config)?;
    let report = Validator::new().fail_fast(args.fail_fast).check(&raw);
    info!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "configuration checked"
    );
    Ok(report)
}

pub fn run_transform(args: &RunArgs) -> Result<RunStats> {
    match args.recipe {
        RecipeArg::Amplitude => {
            let path = args
                .config
                .as_deref()
                .ok_or_else(|| anyhow!("--config is required for the amplitude recipe"))?;
            let transformation = AmplitudeTransformation::from_raw(load_config(path)?)
                .with_context(|| format!("configure transformation from {}", path.display()))?;
            execute(&transformation, args)
        }
        RecipeArg::WebUid => execute(&WebUserId, args),
        RecipeArg::Batmobile => execute(&BatmobileFilter, args),
    }
}

fn execute<T: Transformation>(transformation: &T, args: &RunArgs) -> Result<RunStats> {
    let reader = open_input(args.input.as_deref())?;
    let writer = open_output(args.output.as_deref())?;
    info!(transformation = transformation.name(), "starting run");
    run_lines(transformation, reader, writer)
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("open input {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("create output {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
