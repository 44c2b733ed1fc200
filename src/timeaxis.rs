use crate::PlotError;
use chrono::prelude::*;

/// day-first date layouts, two digit years before four digit ones
const DATE_FORMATS: [&str; 8] = [
    "%d/%m/%y", "%d-%m-%y", "%d.%m.%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d",
];
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

pub const CLOCK_FMT: &str = "%H:%M";

/// "nice" tick steps for the clock axis, seconds
const CLOCK_STEPS: [i64; 17] = [
    1, 2, 5, 10, 15, 30, 60, 120, 300, 600, 900, 1800, 3600, 7200, 10800, 21600, 43200,
];
const DAY: i64 = 86400;

/// parse a date and a time cell, day first as written by the loggers
pub fn parse_day_first(date: &str, time: &str) -> Option<NaiveDateTime> {
    let joined = format!("{} {}", date.trim(), time.trim());
    for dfmt in DATE_FORMATS.iter() {
        for tfmt in TIME_FORMATS.iter() {
            let fmt = format!("{} {}", dfmt, tfmt);
            if let Ok(dt) = NaiveDateTime::parse_from_str(&joined, &fmt) {
                return Some(dt);
            }
        }
    }
    None
}

/// Parses the date and time columns and returns, sorted by time, the
/// timestamps with the row they come from; unparsable rows are dropped.
pub fn timestamps(dates: &[&str], times: &[&str]) -> Vec<(usize, NaiveDateTime)> {
    let mut dts: Vec<(usize, NaiveDateTime)> = dates
        .iter()
        .zip(times.iter())
        .enumerate()
        .filter_map(|(i, (d, t))| parse_day_first(d, t).map(|dt| (i, dt)))
        .collect();
    dts.sort_by_key(|&(_, dt)| dt);
    dts
}

/// datetime as seconds from the unix epoch, the unit of the chart x axis
pub fn to_seconds(dt: &NaiveDateTime) -> f64 {
    Utc.from_utc_datetime(dt).timestamp_millis() as f64 / 1000.
}

pub fn from_seconds(s: f64) -> Option<NaiveDateTime> {
    Utc.timestamp_millis_opt((s * 1000.).round() as i64)
        .single()
        .map(|dt| dt.naive_utc())
}

pub fn format_clock(s: f64) -> String {
    from_seconds(s)
        .map(|dt| dt.format(CLOCK_FMT).to_string())
        .unwrap_or_default()
}

/// seconds without a trailing ".0" for whole values
pub fn format_seconds(s: f64) -> String {
    if s.fract() == 0. {
        format!("{:.0}", s)
    } else {
        format!("{}", s)
    }
}

/// elapsed seconds from the first cycle, each cycle lasting `period` seconds
pub fn cycle_seconds(cycles: &[f64], period: f64) -> Vec<f64> {
    match cycles.first() {
        Some(&c0) => cycles.iter().map(|c| (c - c0) * period).collect(),
        None => Vec::new(),
    }
}

/// parse the "HH:MM" start of the synthetic time axis
pub fn parse_start(s: &str) -> Result<NaiveTime, PlotError> {
    let invalid = || PlotError::InvalidStartTime(s.to_string());
    let fields: Vec<&str> = s.trim().split(':').collect();
    if fields.len() != 2 {
        return Err(invalid());
    }
    let hh: u32 = fields[0].trim().parse().map_err(|_| invalid())?;
    let mm: u32 = fields[1].trim().parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hh, mm, 0).ok_or_else(invalid)
}

/// n instants from `start`, one every `dt` seconds, as chart seconds
pub fn synthetic_seconds(start: NaiveDateTime, dt: f64, n: usize) -> Vec<f64> {
    let s0 = to_seconds(&start);
    (0..n).map(|i| s0 + i as f64 * dt).collect()
}

/// every other distinct instant of the time-sorted `xs`, starting from the first
pub fn alternate_ticks(xs: &[f64]) -> Vec<f64> {
    let mut unique = xs.to_vec();
    unique.dedup();
    unique.into_iter().step_by(2).collect()
}

/// every step-th value so that at most `max_labels` ticks are shown
pub fn spaced_ticks(xs: &[f64], max_labels: usize) -> Vec<f64> {
    let max_labels = max_labels.max(1);
    let step = ((xs.len() + max_labels - 1) / max_labels).max(1);
    xs.iter().copied().step_by(step).collect()
}

/// Round clock ticks inside [x0, x1]: the finest step of the table giving
/// at most `max_ticks` ticks, whole days beyond.
pub fn clock_ticks(x0: f64, x1: f64, max_ticks: usize) -> Vec<f64> {
    let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
    let count = |step: i64| {
        let first = (lo / step as f64).ceil() as i64;
        let last = (hi / step as f64).floor() as i64;
        (first, (last - first + 1).max(0) as usize)
    };
    let mut step = CLOCK_STEPS
        .iter()
        .copied()
        .find(|&s| count(s).1 <= max_ticks)
        .unwrap_or(DAY);
    while count(step).1 > max_ticks {
        step += DAY;
    }
    let (first, n) = count(step);
    (0..n as i64)
        .map(|k| ((first + k) * step) as f64)
        .collect()
}
