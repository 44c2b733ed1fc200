//! Soil humidity and temperature of a probe logged every `dt` seconds from a
//! known start time. The log carries no timestamps, so the clock axis is
//! rebuilt from the start time and the sampling period.

use crate::chart::{x_limits, ChartSpec, Trace, XFormat, YAxis, ORANGE_RED};
use crate::numeric::column_to_numeric_clean;
use crate::output::{arg_dpi, arg_show, arg_verbose, parse_dpi, parse_f64, present, Outputs};
use crate::table::{Delimiter, Table};
use crate::timeaxis::{clock_ticks, parse_start, synthetic_seconds};
use crate::{drop_nan_rows, PlotError, VERSION};
use chrono::prelude::*;
use clap::{App, Arg, ArgMatches};
use log::{debug, info};
use plotters::prelude::BLUE;
use std::error::Error;
use std::path::PathBuf;

pub const FIGSIZE: (f64, f64) = (12., 5.);
pub const DEFAULT_INPUT: &str = "hum_temp_terreno.csv";
pub const DEFAULT_OUTPUT: &str = "hum_temp_terreno.png";
pub const DEFAULT_START: &str = "09:10";
/// sampling period of the probe, seconds
pub const DEFAULT_DT: f64 = 10.;
pub const MAX_X_TICKS: usize = 12;
pub const MIN_SAMPLES: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub csvin: PathBuf,
    pub start: NaiveTime,
    pub dt: f64,
    pub outputs: Outputs,
    pub dpi: u32,
    pub verbose: bool,
}

pub fn cli_app() -> App<'static, 'static> {
    let arg_csvin = Arg::with_name("input")
        .help("input csv log, delimiter detected")
        .short("i")
        .long("input")
        .takes_value(true)
        .default_value(DEFAULT_INPUT);
    let arg_start = Arg::with_name("start")
        .help("time of the first sample, HH:MM")
        .long("start")
        .takes_value(true)
        .default_value(DEFAULT_START);
    let arg_dt = Arg::with_name("dt")
        .help("sampling period, seconds")
        .long("dt")
        .takes_value(true)
        .default_value("10");
    let arg_out = Arg::with_name("out")
        .help("output image (png, jpg, bmp or svg)")
        .short("o")
        .long("out")
        .takes_value(true)
        .default_value(DEFAULT_OUTPUT);
    App::new("lanza_soil")
        .version(VERSION.unwrap_or("unknown"))
        .about("plot soil humidity and temperature with the time of day on the x axis")
        .arg(arg_csvin)
        .arg(arg_start)
        .arg(arg_dt)
        .arg(arg_out)
        .arg(arg_show())
        .arg(arg_dpi())
        .arg(arg_verbose())
}

/// Takes the CLI arguments of the soil chart.
pub fn parse_cli() -> Result<Args, PlotError> {
    args_from(&cli_app().get_matches())
}

pub fn args_from(m: &ArgMatches) -> Result<Args, PlotError> {
    Ok(Args {
        csvin: PathBuf::from(m.value_of("input").unwrap_or(DEFAULT_INPUT)),
        start: parse_start(m.value_of("start").unwrap_or(DEFAULT_START))?,
        dt: parse_f64(m, "dt", DEFAULT_DT)?,
        outputs: Outputs::always_save(m.value_of("out").unwrap_or(DEFAULT_OUTPUT), m.is_present("show")),
        dpi: parse_dpi(m)?,
        verbose: m.is_present("verbose"),
    })
}

/// humidity and temperature columns, the soil ones when present
pub fn detect_columns(table: &Table) -> Result<(usize, usize), PlotError> {
    let hum = table
        .pick_column(&["hum", "suelo"])
        .or_else(|| table.pick_column(&["hum"]));
    let temp = table
        .pick_column(&["temp", "suelo"])
        .or_else(|| table.pick_column(&["temp"]));
    match (hum, temp) {
        (Some(h), Some(t)) => Ok((h, t)),
        _ => Err(PlotError::ColumnNotDetected {
            what: "Hum/Temp",
            columns: table.headers.clone(),
        }),
    }
}

pub fn build_chart(
    table: &Table,
    start: NaiveDateTime,
    dt: f64,
    dpi: u32,
) -> Result<ChartSpec, PlotError> {
    let (col_hum, col_temp) = detect_columns(table)?;
    debug!(
        "humidity column {:?}, temperature column {:?}",
        table.header(col_hum),
        table.header(col_temp)
    );

    let mut hum = column_to_numeric_clean(&table.column(col_hum));
    let mut temp = column_to_numeric_clean(&table.column(col_temp));
    drop_nan_rows(&mut [&mut hum, &mut temp]);
    if hum.len() < MIN_SAMPLES {
        return Err(PlotError::NotEnoughSamples {
            found: hum.len(),
            needed: MIN_SAMPLES,
        });
    }

    let t = synthetic_seconds(start, dt, hum.len());
    let x_range = x_limits(&t);
    let x_ticks = clock_ticks(x_range.start, x_range.end, MAX_X_TICKS);
    Ok(ChartSpec {
        figsize: FIGSIZE,
        dpi,
        x_range,
        x_ticks,
        x_format: XFormat::Clock,
        x_desc: None,
        left: YAxis::new("(%)", 0.0..100.0),
        right: Some(YAxis::new("°C", 0.0..40.0)),
        traces: vec![
            Trace::new("Hum Suelo", t.clone(), hum, BLUE, 1.8),
            Trace::new("Temp Suelo", t, temp, ORANGE_RED, 1.8).on_right(),
        ],
        highlight: None,
    })
}

pub fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    println!("read data from {}", args.csvin.display());
    let table = Table::from_csv(&args.csvin, Delimiter::Sniff)?;
    info!("{} rows, columns {:?}", table.len(), table.headers);
    // only the clock is shown, the date is today's
    let start = Local::now().date_naive().and_time(args.start);
    let spec = build_chart(&table, start, args.dt, args.dpi)?;
    present(&spec, &args.outputs, &args.csvin)
}
