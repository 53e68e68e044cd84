//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the input CSV (flag or interactive picker)
//! - runs the ingest/fit/forecast pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, ComponentsArgs, ForecastArgs, SampleArgs};
use crate::domain::ForecastConfig;
use crate::error::AppError;
use crate::fit::forecaster::FittedModel;
use crate::session::SessionState;

pub mod pipeline;

/// Entry point for the `aqid` binary.
pub fn run() -> Result<(), AppError> {
    // We want `aqid` and `aqid -f data.csv` to behave like `aqid tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Components(args) => handle_components(args),
        Command::Sample(args) => handle_sample(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args)?;
    let run = pipeline::run_forecast(&config)?;

    // The forecast and its model live in session state; everything below
    // reads from there, exactly as the components view would.
    let mut session = SessionState::new();
    session.store(run.forecast.clone(), run.selection.best.model.clone());
    let outcome = session.get()?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, &run.selection, &config)
    );
    println!("{}", crate::report::format_forecast_tail(&outcome.forecast));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.ingest.daily,
            &outcome.forecast,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_forecast_csv(path, &outcome.forecast)?;
        println!("Wrote forecast CSV: {}", path.display());
    }
    if let Some(path) = &config.export_forecast {
        crate::io::forecast_file::write_forecast_json(
            path,
            &run.selection.best,
            &run.ingest.stats,
            &outcome.forecast,
        )?;
        println!("Wrote forecast JSON: {}", path.display());
    }

    Ok(())
}

fn handle_components(args: ComponentsArgs) -> Result<(), AppError> {
    let saved = crate::io::forecast_file::read_forecast_json(&args.forecast)?;

    let components = saved.model.decompose(saved.forecast.horizon);

    println!(
        "Model: {} | fitted on {} day(s), {} → {}",
        saved.model.display_name, saved.stats.n_days, saved.stats.first_date, saved.stats.last_date
    );
    println!("{}", crate::report::format_components(&components));

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    match args.synthetic_days {
        Some(days) => {
            crate::data::write_synthetic_csv(&args.output, days, args.seed, args.start)?;
            println!(
                "Wrote synthetic AQI CSV ({days} day(s), seed={}): {}",
                args.seed,
                args.output.display()
            );
        }
        None => {
            crate::data::write_sample_csv(&args.output)?;
            println!("Wrote sample CSV: {}", args.output.display());
        }
    }
    Ok(())
}

fn handle_tui(args: ForecastArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

/// Build a pipeline configuration from CLI args, resolving the CSV path via
/// the interactive picker when `-f` was not given.
pub fn forecast_config_from_args(args: &ForecastArgs) -> Result<ForecastConfig, AppError> {
    let csv_path = match &args.file {
        Some(path) => crate::cli::picker::validate_csv_path(path)?,
        None => crate::cli::picker::prompt_for_csv_path()?,
    };

    Ok(ForecastConfig {
        csv_path,
        horizon: args.horizon,
        interval_width: args.interval,
        model_spec: args.model,
        weekly_order_max: args.weekly_orders,
        yearly_order_max: args.yearly_orders,
        preview_rows: args.preview,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_forecast: args.export_forecast.clone(),
    })
}

/// Rewrite argv so `aqid` defaults to `aqid tui`.
///
/// Rules:
/// - `aqid`                      -> `aqid tui`
/// - `aqid -f data.csv ...`      -> `aqid tui -f data.csv ...`
/// - `aqid --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "forecast" | "components" | "sample" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["aqid"])), argv(&["aqid", "tui"]));
    }

    #[test]
    fn leading_flag_is_treated_as_tui_flags() {
        assert_eq!(
            rewrite_args(argv(&["aqid", "-f", "data.csv"])),
            argv(&["aqid", "tui", "-f", "data.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["aqid", "forecast", "-f", "x.csv"])),
            argv(&["aqid", "forecast", "-f", "x.csv"])
        );
        assert_eq!(rewrite_args(argv(&["aqid", "--help"])), argv(&["aqid", "--help"]));
    }
}
