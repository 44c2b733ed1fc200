//! Air humidity against elapsed seconds, counted from the logger cycles.

use crate::chart::{x_limits, ChartSpec, Trace, XFormat, YAxis};
use crate::numeric::column_to_numeric;
use crate::output::{arg_dpi, arg_out, arg_show, arg_verbose, parse_dpi, parse_f64, present, Outputs};
use crate::table::{Delimiter, Table};
use crate::timeaxis::{cycle_seconds, spaced_ticks};
use crate::{drop_nan_rows, PlotError, VERSION};
use clap::{App, Arg, ArgMatches};
use log::{debug, info};
use plotters::prelude::BLUE;
use std::error::Error;
use std::path::PathBuf;

pub const FIGSIZE: (f64, f64) = (10., 5.);
/// seconds per logger cycle
pub const CYCLE_PERIOD: f64 = 2.;
pub const MAX_X_LABELS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub csvin: PathBuf,
    pub outputs: Outputs,
    pub period: f64,
    pub dpi: u32,
    pub verbose: bool,
}

pub fn cli_app() -> App<'static, 'static> {
    let arg_csvin = Arg::with_name("csv_path")
        .help("csv log with cycle and humidity columns, e.g. humedad.csv")
        .required(true)
        .index(1);
    let arg_period = Arg::with_name("period")
        .help("seconds per logger cycle")
        .long("period")
        .takes_value(true)
        .default_value("2");
    App::new("lanza_humidity")
        .version(VERSION.unwrap_or("unknown"))
        .about("plot air humidity against time from the cycle counter")
        .arg(arg_csvin)
        .arg(arg_out())
        .arg(arg_show())
        .arg(arg_period)
        .arg(arg_dpi())
        .arg(arg_verbose())
}

/// Takes the CLI arguments of the humidity chart.
pub fn parse_cli() -> Result<Args, PlotError> {
    args_from(&cli_app().get_matches())
}

pub fn args_from(m: &ArgMatches) -> Result<Args, PlotError> {
    Ok(Args {
        csvin: PathBuf::from(m.value_of("csv_path").unwrap_or_default()),
        outputs: Outputs::optional_out(m.value_of("out").unwrap_or_default(), m.is_present("show")),
        period: parse_f64(m, "period", CYCLE_PERIOD)?,
        dpi: parse_dpi(m)?,
        verbose: m.is_present("verbose"),
    })
}

pub fn build_chart(table: &Table, period: f64, dpi: u32) -> Result<ChartSpec, PlotError> {
    let col_cycle = table.find_column("ciclo")?;
    let col_hum = table.find_column("hum")?;

    let mut cycle = column_to_numeric(&table.column(col_cycle));
    let mut hum = column_to_numeric(&table.column(col_hum));
    drop_nan_rows(&mut [&mut cycle, &mut hum]);
    if cycle.is_empty() {
        return Err(PlotError::NotEnoughSamples {
            found: 0,
            needed: 1,
        });
    }
    debug!("{} of {} rows with cycle and humidity", cycle.len(), table.len());

    let t = cycle_seconds(&cycle, period);
    Ok(ChartSpec {
        figsize: FIGSIZE,
        dpi,
        x_range: x_limits(&t),
        x_ticks: spaced_ticks(&t, MAX_X_LABELS),
        x_format: XFormat::Seconds,
        x_desc: Some("(s)".to_string()),
        left: YAxis::new("(%)", 0.0..100.0),
        right: None,
        traces: vec![Trace::new("Hum Aire", t, hum, BLUE, 2.)],
        highlight: None,
    })
}

pub fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    println!("read data from {}", args.csvin.display());
    let table = Table::from_csv(&args.csvin, Delimiter::Comma)?;
    info!("{} rows, columns {:?}", table.len(), table.headers);
    let spec = build_chart(&table, args.period, args.dpi)?;
    present(&spec, &args.outputs, &args.csvin)
}
