mod reports;
mod source;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use gentime_model::constants::{DEFAULT_SWEEP_STEPS, MAX_SWEEP_STEPS};
use gentime_model::presets::catalog;
use gentime_model::{ModelInputs, TimingModel, sweep};

use reports::{Evaluation, MachineReport, SweepReport};
use source::InputArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelChoice {
    /// Poisson arrivals with dead-time lockout
    Continuous,
    /// One skill check poll per second
    Discrete,
    /// Evaluate both strategies side by side
    Both,
}

impl ModelChoice {
    fn models(self) -> &'static [TimingModel] {
        match self {
            Self::Continuous => &[TimingModel::Continuous],
            Self::Discrete => &[TimingModel::Discrete],
            Self::Both => &TimingModel::ALL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
    Csv,
}

#[derive(Debug, Clone, Args)]
struct OutputArgs {
    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct EvalArgs {
    #[command(flatten)]
    inputs: InputArgs,

    /// Timing strategy to evaluate
    #[arg(long, value_enum, default_value_t = ModelChoice::Both)]
    model: ModelChoice,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
struct SweepArgs {
    #[command(flatten)]
    inputs: InputArgs,

    /// Timing strategy to sweep
    #[arg(long, value_enum, default_value_t = ModelChoice::Both)]
    model: ModelChoice,

    /// Number of intervals between chance 0 and 1
    #[arg(long, default_value_t = DEFAULT_SWEEP_STEPS, value_parser = parse_steps())]
    steps: usize,

    #[command(flatten)]
    output: OutputArgs,
}

fn parse_steps() -> clap::builder::RangedU64ValueParser<usize> {
    let max = u64::try_from(MAX_SWEEP_STEPS).unwrap_or(u64::MAX);
    clap::builder::RangedU64ValueParser::new().range(0..=max)
}

#[derive(Debug, Clone, Args)]
struct MachineArgs {
    #[command(flatten)]
    inputs: InputArgs,

    /// Timing strategy to run the machine with
    #[arg(long, value_enum, default_value_t = ModelChoice::Both)]
    model: ModelChoice,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate expected completion time for one parameter set
    Eval(EvalArgs),
    /// Tabulate completion time as the skill check chance goes from 0 to 1
    Sweep(SweepArgs),
    /// Repair one machine with head starts and timed items from the loadout
    Machine(MachineArgs),
    /// List the bundled preset scenarios
    Presets(OutputArgs),
}

#[derive(Debug, Parser)]
#[command(name = "gentime", version)]
#[command(about = "Expected machine completion times with skill checks and dead-time lockout")]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Eval(args) => run_eval(&args),
        Command::Sweep(args) => run_sweep(&args),
        Command::Machine(args) => run_machine(&args),
        Command::Presets(args) => run_presets(&args),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run_eval(args: &EvalArgs) -> Result<()> {
    let inputs = args.inputs.resolve()?;
    let evaluation = evaluate(&inputs, args.model)?;
    log::info!("evaluated {} strategies", evaluation.results.len());

    let mut output_target = OutputTarget::new(args.output.output.clone())?;
    match args.output.report {
        ReportFormat::Console => {
            reports::write_console_evaluation(&mut output_target, &evaluation)?;
        }
        ReportFormat::Json => reports::write_json(&mut output_target, &evaluation)?,
        ReportFormat::Markdown => {
            reports::write_markdown_evaluation(&mut output_target, &evaluation)?;
        }
        ReportFormat::Csv => reports::write_csv_evaluation(&mut output_target, &evaluation)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

fn evaluate(inputs: &ModelInputs, choice: ModelChoice) -> Result<Evaluation> {
    let mut results = Vec::new();
    for &model in choice.models() {
        let result = model
            .evaluate(inputs)
            .with_context(|| format!("{model} model rejected the inputs"))?;
        results.push((model, result));
    }
    Ok(Evaluation::new(*inputs, results))
}

fn run_sweep(args: &SweepArgs) -> Result<()> {
    let inputs = args.inputs.resolve()?;
    let mut sweeps = Vec::new();
    for &model in args.model.models() {
        let points = sweep(&inputs, model, args.steps)
            .with_context(|| format!("{model} sweep rejected the inputs"))?;
        sweeps.push(SweepReport { model, points });
    }
    log::info!("swept {} strategies over {} steps", sweeps.len(), args.steps);

    let mut output_target = OutputTarget::new(args.output.output.clone())?;
    match args.output.report {
        ReportFormat::Console => reports::write_console_sweep(&mut output_target, &sweeps)?,
        ReportFormat::Json => reports::write_json(&mut output_target, &sweeps)?,
        ReportFormat::Markdown => reports::write_markdown_sweep(&mut output_target, &sweeps)?,
        ReportFormat::Csv => reports::write_csv_sweep(&mut output_target, &sweeps)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

fn run_machine(args: &MachineArgs) -> Result<()> {
    let base = args.inputs.resolve_base()?;
    let loadout = args.inputs.loadout()?;
    let mut machines = Vec::new();
    for &model in args.model.models() {
        let run = loadout
            .run_machine(model, &base)
            .with_context(|| format!("{model} machine run rejected the inputs"))?;
        machines.push(MachineReport { model, run });
    }
    log::info!("ran {} strategies through the machine", machines.len());

    let mut output_target = OutputTarget::new(args.output.output.clone())?;
    match args.output.report {
        ReportFormat::Console => reports::write_console_machine(&mut output_target, &machines)?,
        ReportFormat::Json => reports::write_json(&mut output_target, &machines)?,
        ReportFormat::Markdown => reports::write_markdown_machine(&mut output_target, &machines)?,
        ReportFormat::Csv => reports::write_csv_machine(&mut output_target, &machines)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

fn run_presets(args: &OutputArgs) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => reports::write_json(&mut output_target, catalog())?,
        _ => {
            writeln!(output_target.writer(), "{}", "Available presets:".bold())?;
            for preset in catalog().iter() {
                let id = format!("{:15}", preset.id);
                writeln!(
                    output_target.writer(),
                    "  {} - {}",
                    id.cyan(),
                    preset.description
                )?;
            }
        }
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            colored::control::set_override(false);
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
