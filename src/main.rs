use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use aga3_flow::dataset::{Dataset, DatasetError};
use aga3_flow::meter::ConfigError;
use aga3_flow::modbus;
use aga3_flow::pressure::TapLocation;
use aga3_flow::report::{self, mcf_per_day};
use aga3_flow::solver::{SolverConfig, SolverConfigError};
use aga3_flow::{compute, compute_batch, FlowError, FlowOutcome, MeterConfig, Reading};
use clap::Parser;
use log::{error, info, warn};
use thiserror::Error;
use tokio_modbus::prelude::*;

/// Gas flow rate through an orifice meter according to AGA-3.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Verbose. Prints rate values after each calculation.
    #[arg(short, long)]
    verbose: bool,

    /// Meter configuration file (TOML). Flags below override its values.
    #[arg(long)]
    meter: Option<PathBuf>,

    /// CSV export of readings. Uses the columns Gas Diff, Static Pressure,
    /// Modeled Gas Temp (degF), Plate and Density-DryGas. -99999 marks a missing value.
    #[arg(long, conflicts_with = "modbus")]
    readings: Option<PathBuf>,

    /// Write the readings back out with q_v_MCFD and q_b_MCFD appended.
    #[arg(long, requires = "readings")]
    output: Option<PathBuf>,

    /// If selected, readings are polled from a Modbus block in the order: diff, pressure,
    /// temperature, orifice, density. Starting from the register selected by --register.
    #[arg(long)]
    modbus: bool,

    /// Modbus server IP address
    #[arg(short, long)]
    ip: Option<String>,

    /// Modbus server port. Defaults to 502.
    #[arg(short, long, default_value_t = 502)]
    port: u16,

    /// Start register for reading values. Defaults to 0.
    #[arg(long, default_value_t = 0)]
    register: u16,

    /// Start register for writing actual and base MCF/D. Defaults to 10.
    #[arg(long, default_value_t = 10)]
    write: u16,

    /// Scan rate in milliseconds. Defaults to 1000.
    #[arg(long, default_value_t = 1000)]
    scan: u64,

    /// Orifice plate diameter at reference temperature, in
    #[arg(short, long)]
    orifice: Option<f64>,

    /// Flowing static pressure, psi
    #[arg(long)]
    pressure: Option<f64>,

    /// Flowing temperature, °F
    #[arg(short, long)]
    temperature: Option<f64>,

    /// Flowing differential pressure, inH2O
    #[arg(short, long)]
    differential: Option<f64>,

    /// Flowing density, lbm/ft³
    #[arg(long)]
    density: Option<f64>,

    /// Meter tube internal diameter at reference temperature, in
    #[arg(short, long)]
    bore: Option<f64>,

    /// Isentropic exponent. Zero disables the expansion factor.
    #[arg(long)]
    k: Option<f64>,

    /// Dynamic viscosity, cP
    #[arg(long)]
    mu: Option<f64>,

    /// Density at base conditions, lbm/ft³
    #[arg(long)]
    rho_base: Option<f64>,

    /// Static pressure is measured at the downstream tap.
    #[arg(long)]
    downstream: bool,

    /// Atmospheric pressure added to gauge static readings, psi
    #[arg(long)]
    atmospheric: Option<f64>,

    /// Iteration limit for the discharge coefficient.
    #[arg(long, default_value_t = 20)]
    max_iters: usize,

    /// Convergence tolerance for the discharge coefficient.
    #[arg(long, default_value_t = 1e-6)]
    tolerance: f64,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Solver(#[from] SolverConfigError),

    #[error("failed to open {}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to process {}", .path.display())]
    Dataset {
        path: PathBuf,
        #[source]
        source: DatasetError,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("--ip is required with --modbus")]
    MissingIp,

    #[error("invalid modbus address {0}")]
    Address(String),
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    info!(" [!] Parsed arguments.");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let meter = meter_config(args)?;

    if args.modbus {
        poll_modbus(args, &meter)
    } else if let Some(path) = &args.readings {
        let dataset = load_readings(path)?;
        info!(" [!] Loaded {} readings from {}.", dataset.len(), path.display());

        let outcomes: Vec<_> = compute_batch(dataset.readings(), &meter).collect();
        for (index, outcome) in outcomes.iter().enumerate() {
            if let Err(err) = outcome {
                error!("reading {index}: {err}");
            }
        }

        if let Some(output) = &args.output {
            write_results(&dataset, &outcomes, output)?;
            info!(" [!] Wrote results to {}.", output.display());
        }
        println!("{}", report::render(&outcomes));
        Ok(())
    } else {
        let reading = Reading {
            differential: args.differential,
            static_pressure: args.pressure,
            temperature: args.temperature,
            orifice_d: args.orifice,
            density: args.density,
        };
        let outcome = compute(&reading, &meter);
        println!("{}", report::render([&outcome]));
        Ok(())
    }
}

fn meter_config(args: &Args) -> Result<MeterConfig, CliError> {
    let mut meter = match &args.meter {
        Some(path) => MeterConfig::load(path)?,
        None => MeterConfig::default(),
    };

    if let Some(bore) = args.bore {
        meter.pipe_d = bore;
    }
    if let Some(k) = args.k {
        meter.k = k;
    }
    if let Some(mu) = args.mu {
        meter.mu = mu;
    }
    if let Some(rho_base) = args.rho_base {
        meter.rho_base = rho_base;
    }
    if let Some(atmospheric) = args.atmospheric {
        meter.atmospheric_pressure = atmospheric;
    }
    if args.downstream {
        meter.tap = TapLocation::Downstream;
    }
    meter.solver = SolverConfig::new(args.max_iters, args.tolerance)?;
    meter.validate()?;

    info!(" [!] Meter: {meter:?}");
    Ok(meter)
}

fn load_readings(path: &Path) -> Result<Dataset, CliError> {
    let file = File::open(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })?;
    Dataset::read(file).map_err(|source| CliError::Dataset {
        path: path.to_path_buf(),
        source,
    })
}

fn write_results(
    dataset: &Dataset,
    outcomes: &[Result<FlowOutcome, FlowError>],
    path: &Path,
) -> Result<(), CliError> {
    let file = File::create(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })?;
    dataset
        .write_results(outcomes, io::BufWriter::new(file))
        .map_err(|source| CliError::Dataset {
            path: path.to_path_buf(),
            source,
        })
}

fn poll_modbus(args: &Args, meter: &MeterConfig) -> Result<(), CliError> {
    let ip = args.ip.as_deref().ok_or(CliError::MissingIp)?;
    let address = format!("{}:{}", ip, args.port);
    let socket = address.parse().map_err(|_| CliError::Address(address.clone()))?;
    let mut ctx = sync::tcp::connect(socket)?;

    info!(" [!] Connected to {address}.");

    loop {
        let reading = modbus::read_reading(&mut ctx, args.register)?;

        match compute(&reading, meter) {
            Ok(FlowOutcome::Computed(result)) => {
                let q_v = mcf_per_day(result.q_actual);
                let q_b = mcf_per_day(result.q_base);
                modbus::write_flows(&mut ctx, args.write, q_v, q_b)?;

                if args.verbose {
                    let now = chrono::Local::now();
                    print!("\r[{now}]    Qv = {q_v:.3} MCF/D,    Qb = {q_b:.3} MCF/D");
                    io::stdout().flush()?;
                }
            }
            Ok(FlowOutcome::Uncomputable(reason)) => warn!("reading skipped: {reason}"),
            Err(err) => error!("reading rejected: {err}"),
        }

        thread::sleep(Duration::from_millis(args.scan));
    }
}
