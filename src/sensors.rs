//! Air and soil temperature with air humidity over the logged clock time.

use crate::chart::{x_limits, ChartSpec, Trace, XFormat, YAxis, ORANGE};
use crate::numeric::to_numeric;
use crate::output::{arg_dpi, arg_out, arg_show, arg_verbose, parse_dpi, present, Outputs};
use crate::table::{Delimiter, Table};
use crate::timeaxis::{alternate_ticks, timestamps, to_seconds};
use crate::{PlotError, VERSION};
use clap::{App, Arg, ArgMatches};
use log::{debug, info};
use plotters::prelude::BLUE;
use std::error::Error;
use std::path::PathBuf;

pub const FIGSIZE: (f64, f64) = (10., 5.);

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub csvin: PathBuf,
    pub outputs: Outputs,
    pub dpi: u32,
    pub verbose: bool,
}

pub fn cli_app() -> App<'static, 'static> {
    let arg_csvin = Arg::with_name("csv_path")
        .help("csv log with date, time, air/soil temperature and air humidity, e.g. sensores.csv")
        .required(true)
        .index(1);
    App::new("lanza_sensors")
        .version(VERSION.unwrap_or("unknown"))
        .about("plot air/soil temperature and air humidity from the station log")
        .arg(arg_csvin)
        .arg(arg_out())
        .arg(arg_show())
        .arg(arg_dpi())
        .arg(arg_verbose())
}

/// Takes the CLI arguments of the sensors chart.
pub fn parse_cli() -> Result<Args, PlotError> {
    args_from(&cli_app().get_matches())
}

pub fn args_from(m: &ArgMatches) -> Result<Args, PlotError> {
    Ok(Args {
        csvin: PathBuf::from(m.value_of("csv_path").unwrap_or_default()),
        outputs: Outputs::optional_out(m.value_of("out").unwrap_or_default(), m.is_present("show")),
        dpi: parse_dpi(m)?,
        verbose: m.is_present("verbose"),
    })
}

pub fn build_chart(table: &Table, dpi: u32) -> Result<ChartSpec, PlotError> {
    let col_date = table.find_column("fecha")?;
    let col_time = table.find_column("hora")?;
    // SHT31
    let col_air_temp = table.find_column("temp aire")?;
    // DS18B20
    let col_soil_temp = table.find_column("temp suelo")?;
    // SHT31
    let col_air_hum = table.find_column("hum aire")?;

    let rows = timestamps(&table.column(col_date), &table.column(col_time));
    if rows.is_empty() {
        return Err(PlotError::NotEnoughSamples {
            found: 0,
            needed: 1,
        });
    }
    debug!("{} of {} rows with a valid timestamp", rows.len(), table.len());

    let numeric = |col: usize| -> Vec<f64> {
        let cells = table.column(col);
        rows.iter().map(|&(i, _)| to_numeric(cells[i])).collect()
    };
    let x: Vec<f64> = rows.iter().map(|(_, dt)| to_seconds(dt)).collect();

    let traces = vec![
        Trace::new("Temp (SHT31)", x.clone(), numeric(col_air_temp), ORANGE, 2.),
        Trace::new("Temp (DS18B20)", x.clone(), numeric(col_soil_temp), ORANGE, 2.).dashed(),
        Trace::new("Hum (SHT31)", x.clone(), numeric(col_air_hum), BLUE, 2.).on_right(),
    ];

    Ok(ChartSpec {
        figsize: FIGSIZE,
        dpi,
        x_range: x_limits(&x),
        x_ticks: alternate_ticks(&x),
        x_format: XFormat::Clock,
        x_desc: None,
        left: YAxis::new("(°C)", 15.0..25.0),
        right: Some(YAxis::new("(%)", 0.0..100.0)),
        traces,
        highlight: None,
    })
}

pub fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    println!("read data from {}", args.csvin.display());
    let table = Table::from_csv(&args.csvin, Delimiter::Comma)?;
    info!("{} rows, columns {:?}", table.len(), table.headers);
    let spec = build_chart(&table, args.dpi)?;
    present(&spec, &args.outputs, &args.csvin)
}
