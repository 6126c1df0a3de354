//! rheopath CLI - lattice toolpaths for shear-thinning inks
//!
//! Collects process inputs from flags, a TOML file or the terminal, then
//! writes the G-code program and an optional SVG plot of the pattern.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use rheopath_flow::ModelKind;
use rheopath_gcode::{check_file, write_gcode, DEFAULT_OUTPUT_FILE};
use rheopath_lattice::{plan, ExtrusionMode, RunSummary};
use rheopath_plot::write_svg;
use std::io::IsTerminal;
use std::path::PathBuf;

mod config;
mod prompt;

use config::{ProcessInputs, RunConfig};

#[derive(Parser)]
#[command(name = "rheopath")]
#[command(about = "Lattice toolpath generator for power-law inks", long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    PowerLaw,
    Newtonian,
}

impl From<ModelArg> for ModelKind {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::PowerLaw => ModelKind::PowerLaw,
            ModelArg::Newtonian => ModelKind::Newtonian,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a G-code program
    Generate {
        /// TOML run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Lattice pitch in X (mm)
        #[arg(long)]
        deltax: Option<f64>,
        /// Lattice pitch in Y (mm)
        #[arg(long)]
        deltay: Option<f64>,
        /// Feed rate of one zone (mm/min); repeat once per zone
        #[arg(long = "feed-rate")]
        feed_rates: Vec<f64>,
        /// Nozzle diameter (mm)
        #[arg(long)]
        nozzle_diameter: Option<f64>,
        /// Wall shear rate (1/s)
        #[arg(long)]
        shear_rate: Option<f64>,
        /// Power-law index n
        #[arg(long)]
        power_law_index: Option<f64>,
        /// Flow model
        #[arg(long, value_enum)]
        model: Option<ModelArg>,
        /// Pure running-integral extrusion (no hidden advance at zone changes;
        /// the park move extrudes)
        #[arg(long)]
        strict_extrusion: bool,
        /// Output G-code file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write an SVG plot of the XY pattern
        #[arg(long)]
        plot: Option<PathBuf>,
        /// Write the run summary as comments at the top of the program
        #[arg(long)]
        header: bool,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
        /// Use reference values instead of asking for missing inputs
        #[arg(long)]
        no_prompt: bool,
    },
    /// Check that a program's extrusion never decreases
    Check {
        /// G-code file
        file: PathBuf,
    },
    /// Print the reference configuration as TOML
    Defaults,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Generate {
            config,
            deltax,
            deltay,
            feed_rates,
            nozzle_diameter,
            shear_rate,
            power_law_index,
            model,
            strict_extrusion,
            output,
            plot,
            header,
            json,
            no_prompt,
        } => {
            let flags = ProcessInputs {
                deltax,
                deltay,
                feed_rates: (!feed_rates.is_empty()).then_some(feed_rates),
                nozzle_diameter,
                shear_rate,
                power_law_index,
                model: model.map(ModelKind::from),
            };
            let options = GenerateOptions {
                config,
                strict_extrusion,
                output,
                plot,
                header,
                json,
                no_prompt,
            };
            cmd_generate(flags, options)?;
        }
        Commands::Check { file } => {
            cmd_check(&file)?;
        }
        Commands::Defaults => {
            print!("{}", RunConfig::reference().to_toml()?);
        }
    }

    Ok(())
}

struct GenerateOptions {
    config: Option<PathBuf>,
    strict_extrusion: bool,
    output: Option<PathBuf>,
    plot: Option<PathBuf>,
    header: bool,
    json: bool,
    no_prompt: bool,
}

fn cmd_generate(flags: ProcessInputs, options: GenerateOptions) -> Result<()> {
    let mut config = match &options.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if options.strict_extrusion {
        config.lattice.extrusion_mode = ExtrusionMode::Strict;
    }
    if options.header {
        config.gcode.header = true;
    }

    let inputs = config.process.clone().overlay(flags);
    let inputs = if options.no_prompt || inputs.is_complete() {
        inputs
    } else if std::io::stdin().is_terminal() {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        prompt::fill_missing(inputs, &mut stdin.lock(), &mut stdout)?
    } else {
        bail!("missing process inputs and stdin is not a terminal; pass them as flags, in --config, or use --no-prompt");
    };
    let params = inputs.or_defaults();

    let result = plan(&params, &config.lattice).context("failed to plan toolpath")?;
    let summary = RunSummary::new(&params, &result);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }

    let output = options
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));
    write_gcode(&output, &result.path, Some(&summary), &config.gcode)?;
    if !options.json {
        println!("G-code written to {}", output.display());
    }

    if let Some(plot) = options.plot {
        write_svg(&plot, &result.path.projection(), &config.plot)?;
        if !options.json {
            println!("Plot written to {}", plot.display());
        }
    }

    Ok(())
}

fn cmd_check(file: &PathBuf) -> Result<()> {
    let report = check_file(file)?;
    println!("{report}");
    if !report.is_ok() {
        bail!(
            "extrusion decreases {} time(s) in {}",
            report.regressions.len(),
            file.display()
        );
    }
    Ok(())
}
