//! Battery voltage and solar irradiance over the logged clock time, with the
//! battery drop between the first and the last reading highlighted.

use crate::chart::{auto_range, x_limits, ChartSpec, Highlight, Trace, XFormat, YAxis, DEFAULT_BLUE};
use crate::numeric::to_numeric;
use crate::output::{arg_dpi, arg_out, arg_show, arg_verbose, parse_dpi, present, Outputs};
use crate::table::{Delimiter, Table};
use crate::timeaxis::{alternate_ticks, timestamps, to_seconds};
use crate::{PlotError, VERSION};
use clap::{App, Arg, ArgMatches};
use log::{debug, info};
use plotters::prelude::RED;
use std::error::Error;
use std::path::PathBuf;

pub const FIGSIZE: (f64, f64) = (10., 5.);
/// fixed battery scale, volts, before the margin
pub const BATTERY_MIN: f64 = 3.6;
pub const BATTERY_MAX: f64 = 4.12;
pub const BATTERY_MARGIN: f64 = 0.03;

const PAREN_UNITS: [&str; 4] = ["(V)", "(v)", "(W/m2)", "(W/m^2)"];
const BARE_UNITS: [&str; 6] = ["V", "v", "W/m2", "W/m^2", "W/m", "w/m"];

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub csvin: PathBuf,
    pub outputs: Outputs,
    pub dpi: u32,
    pub verbose: bool,
}

pub fn cli_app() -> App<'static, 'static> {
    let arg_csvin = Arg::with_name("csv_path")
        .help("csv log with date, time, battery and irradiance columns, e.g. autonomia.csv")
        .required(true)
        .index(1);
    App::new("lanza_autonomy")
        .version(VERSION.unwrap_or("unknown"))
        .about("plot battery voltage and solar irradiance from the station log")
        .arg(arg_csvin)
        .arg(arg_out())
        .arg(arg_show())
        .arg(arg_dpi())
        .arg(arg_verbose())
}

/// Takes the CLI arguments of the autonomy chart.
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

/// Column name without its unit, for the legend: "Batería (V)" -> "Batería"
pub fn strip_units(label: &str) -> String {
    let mut s = label.to_string();
    for token in PAREN_UNITS.iter() {
        s = s.replace(token, "");
    }
    let s = s.replace("()", "");
    let words: Vec<String> = s
        .split_whitespace()
        .map(without_units)
        .filter(|w| !w.is_empty())
        .collect();
    words.join(" ").trim_matches(is_separator).to_string()
}

/// the word without the bare unit parts glued to it by `_` or punctuation
fn without_units(word: &str) -> String {
    let parts: Vec<&str> = word
        .split('_')
        .filter(|p| !BARE_UNITS.contains(&p.trim_matches(is_separator)))
        .collect();
    parts.join("_").trim_matches(is_separator).to_string()
}

fn is_separator(c: char) -> bool {
    c == ' ' || c == '-' || c == '_' || c == ':'
}

pub fn build_chart(table: &Table, dpi: u32) -> Result<ChartSpec, PlotError> {
    let col_date = table.find_column("fecha")?;
    let col_time = table.find_column("hora")?;
    let col_bat = table.find_column("bateria")?;
    let col_irr = table.find_column("irradiancia")?;

    let rows = timestamps(&table.column(col_date), &table.column(col_time));
    if rows.is_empty() {
        return Err(PlotError::NotEnoughSamples {
            found: 0,
            needed: 1,
        });
    }
    debug!("{} of {} rows with a valid timestamp", rows.len(), table.len());

    let bat_cells = table.column(col_bat);
    let irr_cells = table.column(col_irr);
    let x: Vec<f64> = rows.iter().map(|(_, dt)| to_seconds(dt)).collect();
    let bat: Vec<f64> = rows.iter().map(|&(i, _)| to_numeric(bat_cells[i])).collect();
    let irr: Vec<f64> = rows.iter().map(|&(i, _)| to_numeric(irr_cells[i])).collect();

    let highlight = battery_highlight(&x, &bat);
    let right = YAxis::new("(W/m²)", auto_range(&irr));
    let bat_trace = Trace::new(&strip_units(table.header(col_bat)), x.clone(), bat, RED, 2.);
    let irr_trace =
        Trace::new(&strip_units(table.header(col_irr)), x.clone(), irr, DEFAULT_BLUE, 2.).on_right();

    Ok(ChartSpec {
        figsize: FIGSIZE,
        dpi,
        x_range: x_limits(&x),
        x_ticks: alternate_ticks(&x),
        x_format: XFormat::Clock,
        x_desc: None,
        left: YAxis::new(
            "(V)",
            (BATTERY_MIN - BATTERY_MARGIN)..(BATTERY_MAX + BATTERY_MARGIN),
        ),
        right: Some(right),
        traces: vec![bat_trace, irr_trace],
        highlight,
    })
}

/// first and last valid battery readings and their difference
pub fn battery_highlight(x: &[f64], bat: &[f64]) -> Option<Highlight> {
    let first = bat.iter().position(|v| v.is_finite())?;
    let last = bat.iter().rposition(|v| v.is_finite())?;
    let (y0, y1) = (bat[first], bat[last]);
    Some(Highlight {
        start: (x[first], y0),
        end: (x[last], y1),
        color: RED,
        text: format!("ΔV = {:+.3} V", y1 - y0),
    })
}

pub fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    println!("read data from {}", args.csvin.display());
    let table = Table::from_csv(&args.csvin, Delimiter::Comma)?;
    info!("{} rows, columns {:?}", table.len(), table.headers);
    let spec = build_chart(&table, args.dpi)?;
    present(&spec, &args.outputs, &args.csvin)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "Fecha,Hora,Bateria (V),Irradiancia (W/m2)\n\
        01/03/2025,10:10:00,\"3,95\",410\n\
        01/03/2025,10:00:00,4.02,380\n\
        01/03/2025,10:05:00,,395\n\
        sin fecha,10:07:00,3.99,400\n\
        01/03/2025,10:15:00,3.91,error\n";

    fn table() -> Table {
        Table::from_str_with(LOG, b',').unwrap()
    }

    #[test]
    fn legend_names_without_units() {
        assert_eq!(strip_units("Batería (V)"), "Batería");
        assert_eq!(strip_units("Irradiancia W/m2"), "Irradiancia");
        assert_eq!(strip_units("Irradiancia (W/m^2):"), "Irradiancia");
        assert_eq!(strip_units("  Bateria   V  "), "Bateria");
        assert_eq!(strip_units("Voltaje bateria"), "Voltaje bateria");
        assert_eq!(strip_units("Irradiancia W/m2:"), "Irradiancia");
        assert_eq!(strip_units("Bateria_V"), "Bateria");
        assert_eq!(strip_units("Bateria - V"), "Bateria");
        assert_eq!(strip_units("Hum_Aire"), "Hum_Aire");
    }

    #[test]
    fn cli_defaults_to_show() {
        let m = cli_app().get_matches_from(vec!["lanza_autonomy", "autonomia.csv"]);
        let args = args_from(&m).unwrap();
        assert_eq!(args.csvin, PathBuf::from("autonomia.csv"));
        assert_eq!(args.outputs.save, None);
        assert!(args.outputs.show);
        assert_eq!(args.dpi, 200);
        assert!(!args.verbose);
    }

    #[test]
    fn cli_with_out() {
        let m = cli_app().get_matches_from(vec!["lanza_autonomy", "a.csv", "--out", "a.svg", "-v"]);
        let args = args_from(&m).unwrap();
        assert_eq!(args.outputs.save, Some(PathBuf::from("a.svg")));
        assert!(!args.outputs.show);
        assert!(args.verbose);
    }

    #[test]
    fn rows_sorted_and_cleaned() {
        let spec = build_chart(&table(), 200).unwrap();
        let bat = &spec.traces[0];
        assert_eq!(bat.label, "Bateria");
        assert_eq!(bat.y.len(), 4);
        assert_eq!(bat.y[0], 4.02);
        assert!(bat.y[1].is_nan());
        assert_eq!(bat.y[2], 3.95);
        assert_eq!(bat.y[3], 3.91);
        let irr = &spec.traces[1];
        assert_eq!(irr.label, "Irradiancia");
        assert!(irr.y[3].is_nan());
        assert_eq!(spec.x_range.end - spec.x_range.start, 900.);
        assert_eq!(spec.x_ticks.len(), 2);
    }

    #[test]
    fn battery_scale_is_fixed() {
        let spec = build_chart(&table(), 200).unwrap();
        assert!((spec.left.range.start - 3.57).abs() < 1e-12);
        assert!((spec.left.range.end - 4.15).abs() < 1e-12);
        assert_eq!(spec.left.desc, "(V)");
        assert_eq!(spec.right.unwrap().desc, "(W/m²)");
    }

    #[test]
    fn voltage_drop_is_annotated() {
        let spec = build_chart(&table(), 200).unwrap();
        let h = spec.highlight.unwrap();
        assert_eq!(h.text, "ΔV = -0.110 V");
        assert_eq!(h.start.1, 4.02);
        assert_eq!(h.end.1, 3.91);
    }

    #[test]
    fn no_valid_battery_no_highlight() {
        assert!(battery_highlight(&[0., 1.], &[f64::NAN, f64::NAN]).is_none());
    }

    #[test]
    fn missing_column_is_reported() {
        let t = Table::from_str_with("Fecha,Hora,Bateria\n01/03/2025,10:00,4.0\n", b',').unwrap();
        match build_chart(&t, 200) {
            Err(PlotError::ColumnNotFound { needle, .. }) => assert_eq!(needle, "irradiancia"),
            _ => panic!("expected a missing column"),
        }
    }

    #[test]
    fn no_timestamps_is_an_error() {
        let t = Table::from_str_with("Fecha,Hora,Bateria,Irradiancia\nx,y,4.0,1\n", b',').unwrap();
        assert!(matches!(
            build_chart(&t, 200),
            Err(PlotError::NotEnoughSamples { found: 0, .. })
        ));
    }
}
