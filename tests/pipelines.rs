use lanza_plot::chart::{save_chart, ChartSpec};
use lanza_plot::table::{Delimiter, Table};
use lanza_plot::timeaxis::format_clock;
use lanza_plot::{autonomy, humidity, sensors, soil, PlotError};
use std::fs;
use std::path::PathBuf;

fn write_log(name: &str, content: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("lanza_plot_{}_{}", std::process::id(), name));
    fs::write(&path, content).unwrap();
    path
}

fn render_svg(spec: &ChartSpec, name: &str) -> String {
    let path = std::env::temp_dir().join(format!("lanza_plot_{}_{}.svg", std::process::id(), name));
    save_chart(spec, &path).unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    fs::remove_file(path).unwrap();
    svg
}

fn assert_texts(svg: &str, texts: &[&str]) {
    for text in texts {
        assert!(svg.contains(text), "{:?} not in the chart", text);
    }
}

#[test]
fn autonomy_from_latin1_export() {
    let mut content = b"Fecha,Hora,Bater\xeda (V),Irradiancia (W/m2)\n".to_vec();
    content.extend_from_slice(b"05/03/2025,12:00:00,\"4,10\",820\n");
    content.extend_from_slice(b"05/03/2025,12:30:00,\"4,05\",790\n");
    content.extend_from_slice(b"05/03/2025,13:00:00,\"4,01\",760\n");
    let path = write_log("autonomia.csv", &content);

    let table = Table::from_csv(&path, Delimiter::Comma).unwrap();
    let spec = autonomy::build_chart(&table, 100).unwrap();
    assert_eq!(spec.traces[0].label, "Batería");
    assert_eq!(spec.pixel_size(), (1000, 500));
    assert_eq!(format_clock(spec.x_range.start), "12:00");
    assert_eq!(format_clock(spec.x_range.end), "13:00");
    let ticks: Vec<String> = spec.x_ticks.iter().map(|&t| format_clock(t)).collect();
    assert_eq!(ticks, vec!["12:00", "13:00"]);
    assert_eq!(spec.highlight.as_ref().unwrap().text, "ΔV = -0.090 V");
    let svg = render_svg(&spec, "autonomia");
    assert_texts(&svg, &["Batería", "Irradiancia", "ΔV = -0.090 V", "(V)", "(W/m²)", "12:00"]);
    fs::remove_file(path).unwrap();
}

#[test]
fn sensors_from_file() {
    let path = write_log(
        "sensores.csv",
        "Fecha,Hora,Temp Aire,Temp Suelo,Hum Aire\n\
         06/03/2025,07:00,16,15.5,80\n\
         06/03/2025,07:15,17,15.75,78\n"
            .as_bytes(),
    );
    let table = Table::from_csv(&path, Delimiter::Comma).unwrap();
    let spec = sensors::build_chart(&table, 200).unwrap();
    assert_eq!(spec.traces.len(), 3);
    assert_eq!(spec.traces[1].y, vec![15.5, 15.75]);
    assert_texts(
        &render_svg(&spec, "sensores"),
        &["Temp (SHT31)", "Temp (DS18B20)", "Hum (SHT31)", "(°C)", "07:00"],
    );
    fs::remove_file(path).unwrap();
}

#[test]
fn unplugged_probe_stays_in_the_legend() {
    let table = Table::from_str_with(
        "Fecha,Hora,Temp Aire,Temp Suelo,Hum Aire
         06/03/2025,07:00,16,,80
         06/03/2025,07:15,17,,78
",
        b',',
    )
    .unwrap();
    let spec = sensors::build_chart(&table, 72).unwrap();
    assert!(spec.traces[1].y.iter().all(|v| v.is_nan()));
    assert_texts(
        &render_svg(&spec, "sin_sonda"),
        &["Temp (SHT31)", "Temp (DS18B20)", "Hum (SHT31)"],
    );
}

#[test]
fn humidity_from_file() {
    let path = write_log("humedad.csv", b"ciclo,hum_aire\n1,40\n2,41\n3,42\n");
    let table = Table::from_csv(&path, Delimiter::Comma).unwrap();
    let spec = humidity::build_chart(&table, humidity::CYCLE_PERIOD, 200).unwrap();
    assert_eq!(spec.traces[0].x, vec![0., 2., 4.]);
    assert_texts(&render_svg(&spec, "humedad"), &["Hum Aire", "(s)", "(%)"]);
    fs::remove_file(path).unwrap();
}

#[test]
fn soil_sniffs_semicolons() {
    let path = write_log(
        "hum_temp_terreno.csv",
        b"Hum Suelo (%);Temp Suelo (C)\n30,1;12,5\n30,4;12,7\n30,9;12,6\n",
    );
    let table = Table::from_csv(&path, Delimiter::Sniff).unwrap();
    assert_eq!(table.headers.len(), 2);
    let start = chrono::NaiveDate::from_ymd_opt(2025, 3, 6)
        .unwrap()
        .and_hms_opt(9, 10, 0)
        .unwrap();
    let spec = soil::build_chart(&table, start, 10., 200).unwrap();
    assert_eq!(spec.traces[0].y, vec![30.1, 30.4, 30.9]);
    assert_eq!(spec.traces[1].y, vec![12.5, 12.7, 12.6]);
    assert_texts(&render_svg(&spec, "terreno"), &["Hum Suelo", "Temp Suelo", "°C", "09:10"]);
    fs::remove_file(path).unwrap();
}

#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join("lanza_plot_does_not_exist.csv");
    assert!(matches!(
        Table::from_csv(&path, Delimiter::Comma),
        Err(PlotError::Io(_))
    ));
}
