use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use gentime_model::{MachineRun, ModelInputs, ModelResult, SweepPoint, TimingModel};

/// One strategy's result tagged with the strategy that produced it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelRow {
    pub model: TimingModel,
    #[serde(flatten)]
    pub result: ModelResult,
}

/// Everything an `eval` report prints.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub inputs: ModelInputs,
    pub dead_time: f64,
    pub results: Vec<ModelRow>,
}

impl Evaluation {
    pub fn new(inputs: ModelInputs, results: Vec<(TimingModel, ModelResult)>) -> Self {
        Self {
            dead_time: inputs.dead_time(),
            inputs,
            results: results
                .into_iter()
                .map(|(model, result)| ModelRow { model, result })
                .collect(),
        }
    }
}

/// Sweep points for one strategy.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub model: TimingModel,
    pub points: Vec<SweepPoint>,
}

/// A phased machine run for one strategy.
#[derive(Debug, Clone, Serialize)]
pub struct MachineReport {
    pub model: TimingModel,
    pub run: MachineRun,
}

fn hazard_cell(hazard: Option<f64>) -> String {
    hazard.map_or_else(|| "-".to_string(), |value| format!("{value:.6}"))
}

pub fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_console_evaluation(out: &mut impl Write, evaluation: &Evaluation) -> Result<()> {
    let inputs = &evaluation.inputs;
    writeln!(out, "{}", "Generator Timing".bright_cyan().bold())?;
    writeln!(out, "{}", "================".cyan())?;
    writeln!(
        out,
        "Extraction speed: {} u/s over {} units",
        inputs.extraction_speed, inputs.total_units
    )?;
    writeln!(
        out,
        "Skill checks: p={} bonus={} success={}",
        inputs.skill_check_chance, inputs.skill_check_units, inputs.skill_check_success
    )?;
    writeln!(out, "Dead time: {:.3}s", evaluation.dead_time)?;
    writeln!(out)?;

    for row in &evaluation.results {
        let result = &row.result;
        writeln!(out, "{}", row.model.as_str().bold())?;
        writeln!(
            out,
            "   Average time: {} (default {:.2}s, saves {:.2}s)",
            format!("{:.2}s", result.average_time).green(),
            result.default_time,
            result.time_saved()
        )?;
        writeln!(
            out,
            "   Skill checks: {:.3} expected, {:.3} successful",
            result.expected_skill_checks, result.expected_successful_checks
        )?;
        writeln!(
            out,
            "   Rates: {:.6} checks/s, {:.4} units/s",
            result.effective_check_rate, result.effective_progress_rate
        )?;
        writeln!(out, "   Hazard: {}", hazard_cell(result.hazard_rate))?;
        writeln!(out)?;
    }

    if let [first, second] = evaluation.results.as_slice() {
        let (faster, slower) = if first.result.average_time <= second.result.average_time {
            (first, second)
        } else {
            (second, first)
        };
        writeln!(
            out,
            "{} finishes {:.3}s sooner than {}",
            faster.model.as_str().yellow(),
            slower.result.average_time - faster.result.average_time,
            slower.model.as_str()
        )?;
    }
    Ok(())
}

pub fn write_markdown_evaluation(out: &mut impl Write, evaluation: &Evaluation) -> Result<()> {
    let inputs = &evaluation.inputs;
    writeln!(out, "# Generator Timing\n")?;
    writeln!(out, "| Parameter | Value |")?;
    writeln!(out, "|-----------|-------|")?;
    writeln!(out, "| Extraction speed | {} |", inputs.extraction_speed)?;
    writeln!(out, "| Skill check chance | {} |", inputs.skill_check_chance)?;
    writeln!(out, "| Bonus units | {} |", inputs.skill_check_units)?;
    writeln!(out, "| Success chance | {} |", inputs.skill_check_success)?;
    writeln!(out, "| Total units | {} |", inputs.total_units)?;
    writeln!(out, "| Dead time | {:.3} |", evaluation.dead_time)?;
    writeln!(out)?;

    writeln!(
        out,
        "| Model | Average Time | Default Time | Checks | Successes | Check Rate | Progress Rate | Hazard |"
    )?;
    writeln!(
        out,
        "|-------|--------------|--------------|--------|-----------|------------|---------------|--------|"
    )?;
    for row in &evaluation.results {
        let result = &row.result;
        writeln!(
            out,
            "| {} | {:.4} | {:.4} | {:.4} | {:.4} | {:.6} | {:.4} | {} |",
            row.model,
            result.average_time,
            result.default_time,
            result.expected_skill_checks,
            result.expected_successful_checks,
            result.effective_check_rate,
            result.effective_progress_rate,
            hazard_cell(result.hazard_rate)
        )?;
    }
    Ok(())
}

pub fn write_csv_evaluation(out: &mut impl Write, evaluation: &Evaluation) -> Result<()> {
    writeln!(
        out,
        "model,average_time,default_time,expected_skill_checks,expected_successful_checks,effective_check_rate,effective_progress_rate,hazard_rate"
    )?;
    for row in &evaluation.results {
        let result = &row.result;
        writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            row.model,
            result.average_time,
            result.default_time,
            result.expected_skill_checks,
            result.expected_successful_checks,
            result.effective_check_rate,
            result.effective_progress_rate,
            result.hazard_rate.map(|h| h.to_string()).unwrap_or_default()
        )?;
    }
    Ok(())
}

pub fn write_console_sweep(out: &mut impl Write, sweeps: &[SweepReport]) -> Result<()> {
    for report in sweeps {
        writeln!(
            out,
            "{}",
            format!("Sweep: {}", report.model).bright_cyan().bold()
        )?;
        writeln!(out, "{:>8} {:>12} {:>10} {:>12}", "chance", "avg time", "checks", "check rate")?;
        for point in &report.points {
            writeln!(
                out,
                "{:>8.3} {:>12.4} {:>10.4} {:>12.6}",
                point.chance,
                point.result.average_time,
                point.result.expected_skill_checks,
                point.result.effective_check_rate
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_markdown_sweep(out: &mut impl Write, sweeps: &[SweepReport]) -> Result<()> {
    writeln!(out, "# Skill Check Chance Sweep")?;
    for report in sweeps {
        writeln!(out, "\n## {}\n", report.model)?;
        writeln!(out, "| Chance | Average Time | Checks | Check Rate |")?;
        writeln!(out, "|--------|--------------|--------|------------|")?;
        for point in &report.points {
            writeln!(
                out,
                "| {:.3} | {:.4} | {:.4} | {:.6} |",
                point.chance,
                point.result.average_time,
                point.result.expected_skill_checks,
                point.result.effective_check_rate
            )?;
        }
    }
    Ok(())
}

pub fn write_csv_sweep(out: &mut impl Write, sweeps: &[SweepReport]) -> Result<()> {
    writeln!(
        out,
        "model,chance,average_time,expected_skill_checks,expected_successful_checks,effective_check_rate"
    )?;
    for report in sweeps {
        for point in &report.points {
            writeln!(
                out,
                "{},{},{},{},{},{}",
                report.model,
                point.chance,
                point.result.average_time,
                point.result.expected_skill_checks,
                point.result.expected_successful_checks,
                point.result.effective_check_rate
            )?;
        }
    }
    Ok(())
}

pub fn write_console_machine(out: &mut impl Write, machines: &[MachineReport]) -> Result<()> {
    for report in machines {
        let run = &report.run;
        writeln!(
            out,
            "{}",
            format!("Machine: {}", report.model).bright_cyan().bold()
        )?;
        if run.is_instant() {
            writeln!(out, "   {}", "Completed instantly by head starts".green())?;
            writeln!(out)?;
            continue;
        }
        writeln!(out, "   Starting units: {:.2}", run.starting_units)?;
        for step in &run.steps {
            writeln!(
                out,
                "   {:>6.2}s..{:<6.2}s  U={:.3} p={:.3}  +{:.2} units, {:.3} checks{}",
                step.starts_at,
                step.ends_at,
                step.inputs.extraction_speed,
                step.inputs.skill_check_chance,
                step.progress.units_completed,
                step.progress.expected_skill_checks,
                if step.progress.is_complete { " (done)" } else { "" }
            )?;
        }
        writeln!(
            out,
            "   Average time: {} (default {:.2}s)",
            format!("{:.2}s", run.average_time).green(),
            run.default_time
        )?;
        writeln!(
            out,
            "   Skill checks: {:.3} expected, {:.3} successful",
            run.expected_skill_checks, run.expected_successful_checks
        )?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_markdown_machine(out: &mut impl Write, machines: &[MachineReport]) -> Result<()> {
    writeln!(out, "# Machine Run")?;
    for report in machines {
        let run = &report.run;
        writeln!(out, "\n## {}\n", report.model)?;
        writeln!(out, "| Starting Units | Average Time | Default Time | Checks | Successes |")?;
        writeln!(out, "|----------------|--------------|--------------|--------|-----------|")?;
        writeln!(
            out,
            "| {:.2} | {:.4} | {:.4} | {:.4} | {:.4} |",
            run.starting_units,
            run.average_time,
            run.default_time,
            run.expected_skill_checks,
            run.expected_successful_checks
        )?;
        if run.steps.is_empty() {
            continue;
        }
        writeln!(out, "\n| Window | Units Completed | Units Remaining | Checks | Complete |")?;
        writeln!(out, "|--------|-----------------|-----------------|--------|----------|")?;
        for step in &run.steps {
            writeln!(
                out,
                "| {:.2}-{:.2} | {:.4} | {:.4} | {:.4} | {} |",
                step.starts_at,
                step.ends_at,
                step.progress.units_completed,
                step.progress.units_remaining,
                step.progress.expected_skill_checks,
                step.progress.is_complete
            )?;
        }
    }
    Ok(())
}

pub fn write_csv_machine(out: &mut impl Write, machines: &[MachineReport]) -> Result<()> {
    writeln!(
        out,
        "model,starting_units,average_time,default_time,expected_skill_checks,expected_successful_checks,timed_windows"
    )?;
    for report in machines {
        let run = &report.run;
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            report.model,
            run.starting_units,
            run.average_time,
            run.default_time,
            run.expected_skill_checks,
            run.expected_successful_checks,
            run.steps.len()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gentime_model::{HeadStart, Loadout, compare, sweep};

    fn evaluation() -> Evaluation {
        let inputs = ModelInputs::new(1.5, 0.25, 3.0).with_skill_check_success(0.9);
        let comparison = compare(&inputs).unwrap();
        Evaluation::new(
            inputs,
            TimingModel::ALL
                .iter()
                .map(|&model| (model, *comparison.get(model)))
                .collect(),
        )
    }

    fn render(write: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn json_flattens_results_with_model_tag() {
        let output = render(|out| write_json(out, &evaluation()));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["results"][0]["model"], "continuous");
        assert_eq!(value["results"][1]["model"], "discrete");
        assert!(value["results"][1]["hazard_rate"].is_null());
        assert!(value["results"][0]["average_time"].as_f64().unwrap() > 23.0);
        assert!((value["dead_time"].as_f64().unwrap() - 3.625).abs() < 1e-12);
        assert_eq!(value["inputs"]["skill_check_chance"], 0.25);
    }

    #[test]
    fn console_names_the_faster_strategy() {
        let output = render(|out| write_console_evaluation(out, &evaluation()));
        assert!(output.contains("Dead time: 3.625s"));
        assert!(output.contains("continuous finishes"));
        assert!(output.contains("Hazard: -"));
    }

    #[test]
    fn csv_has_one_row_per_strategy() {
        let output = render(|out| write_csv_evaluation(out, &evaluation()));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("model,average_time"));
        assert!(lines[2].starts_with("discrete,"));
        assert!(lines[2].ends_with(','));
    }

    #[test]
    fn markdown_evaluation_lists_parameters() {
        let output = render(|out| write_markdown_evaluation(out, &evaluation()));
        assert!(output.starts_with("# Generator Timing"));
        assert!(output.contains("| Dead time | 3.625 |"));
        assert!(output.contains("| continuous |"));
    }

    #[test]
    fn sweep_reports_cover_every_point() {
        let inputs = ModelInputs::new(1.0, 0.5, 3.0);
        let sweeps = vec![SweepReport {
            model: TimingModel::Discrete,
            points: sweep(&inputs, TimingModel::Discrete, 4).unwrap(),
        }];

        let csv = render(|out| write_csv_sweep(out, &sweeps));
        assert_eq!(csv.lines().count(), 6);
        assert!(csv.lines().nth(1).unwrap().starts_with("discrete,0,"));

        let markdown = render(|out| write_markdown_sweep(out, &sweeps));
        assert!(markdown.contains("## discrete"));
        assert!(markdown.contains("| 1.000 |"));

        let console = render(|out| write_console_sweep(out, &sweeps));
        assert!(console.contains("Sweep: discrete"));
        assert_eq!(console.lines().count(), 8);
    }

    fn machines(loadout: &Loadout) -> Vec<MachineReport> {
        let inputs = ModelInputs::new(1.5, 0.25, 3.0).with_skill_check_success(0.9);
        TimingModel::ALL
            .iter()
            .map(|&model| MachineReport {
                model,
                run: loadout.run_machine(model, &inputs).unwrap(),
            })
            .collect()
    }

    #[test]
    fn machine_reports_describe_each_strategy() {
        let reports = machines(&Loadout::default());

        let csv = render(|out| write_csv_machine(out, &reports));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("continuous,45,"));
        assert!(lines[2].ends_with(",0"));

        let console = render(|out| write_console_machine(out, &reports));
        assert!(console.contains("Machine: continuous"));
        assert!(console.contains("Starting units: 45.00"));

        let markdown = render(|out| write_markdown_machine(out, &reports));
        assert!(markdown.contains("## discrete"));
        assert!(!markdown.contains("| Window |"));
    }

    #[test]
    fn instant_machine_is_called_out() {
        let loadout = Loadout {
            head_starts: vec![HeadStart::PerCopy {
                fraction: 0.5,
                count: 2,
            }],
            ..Loadout::default()
        };
        let console = render(|out| write_console_machine(out, &machines(&loadout)));
        assert!(console.contains("Completed instantly"));
        assert!(!console.contains("Average time"));
    }
}
