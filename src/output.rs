use crate::chart::{save_chart, ChartSpec};
use crate::{PlotError, DEFAULT_DPI};
use clap::{Arg, ArgMatches};
use log::{debug, warn};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::Command;

/// above this the image no longer fits in memory comfortably
pub const MAX_DPI: u32 = 1200;

/// Where the rendered chart goes
#[derive(Debug, Clone, PartialEq)]
pub struct Outputs {
    pub save: Option<PathBuf>,
    pub show: bool,
}

impl Outputs {
    /// save only when an output path is given, show when asked or when not saving
    pub fn optional_out(out: &str, show: bool) -> Outputs {
        let out = out.trim();
        let save = if out.is_empty() {
            None
        } else {
            Some(PathBuf::from(out))
        };
        let show = show || save.is_none();
        Outputs { save, show }
    }

    /// always save, show only when asked
    pub fn always_save(out: &str, show: bool) -> Outputs {
        Outputs {
            save: Some(PathBuf::from(out)),
            show,
        }
    }
}

/// optional image path; without it the chart is shown
pub fn arg_out() -> Arg<'static, 'static> {
    Arg::with_name("out")
        .help("save the image (png, jpg, bmp or svg) to this path")
        .short("o")
        .long("out")
        .takes_value(true)
}

pub fn arg_show() -> Arg<'static, 'static> {
    Arg::with_name("show")
        .help("show the chart")
        .long("show")
        .takes_value(false)
}

pub fn arg_dpi() -> Arg<'static, 'static> {
    Arg::with_name("dpi")
        .help("resolution of the image, dots per inch")
        .long("dpi")
        .takes_value(true)
        .default_value(DEFAULT_DPI)
}

pub fn arg_verbose() -> Arg<'static, 'static> {
    Arg::with_name("verbose")
        .help("print debug information")
        .short("v")
        .long("verbose")
        .takes_value(false)
}

pub fn parse_dpi(m: &ArgMatches) -> Result<u32, PlotError> {
    let value = m.value_of("dpi").unwrap_or(DEFAULT_DPI);
    match value.parse::<u32>() {
        Ok(dpi) if dpi > 0 && dpi <= MAX_DPI => Ok(dpi),
        _ => Err(PlotError::InvalidArgument {
            arg: "dpi",
            value: value.to_string(),
        }),
    }
}

/// finite float argument, `default` when absent
pub fn parse_f64(m: &ArgMatches, arg: &'static str, default: f64) -> Result<f64, PlotError> {
    match m.value_of(arg) {
        None => Ok(default),
        Some(value) => match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(PlotError::InvalidArgument {
                arg,
                value: value.to_string(),
            }),
        },
    }
}

/// png in the temp directory named after the csv log, used for the show request
pub fn show_path(csvin: &Path) -> PathBuf {
    let stem = csvin
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("chart");
    std::env::temp_dir().join(format!("{}_lanza_plot.png", stem))
}

/// the desktop command opening a file with its default application
pub fn viewer_command(image: &Path) -> Command {
    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(&["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    cmd.arg(image);
    cmd
}

/// Opens the image in the system viewer. Without a desktop the chart stays
/// on disk and its path is logged.
pub fn show_image(image: &Path) {
    let mut cmd = viewer_command(image);
    debug!("{:?}", cmd);
    if let Err(e) = cmd.spawn() {
        warn!("cannot open a viewer ({}), the chart is at {}", e, image.display());
    }
}

/// save and/or show the chart
pub fn present(spec: &ChartSpec, outputs: &Outputs, csvin: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(fout) = &outputs.save {
        save_chart(spec, fout)?;
        println!("saved chart to {}", fout.display());
    }
    if outputs.show {
        // the saved image is shown as is, otherwise a temporary png
        let fshow = match &outputs.save {
            Some(fout) => fout.clone(),
            None => {
                let fshow = show_path(csvin);
                save_chart(spec, &fshow)?;
                fshow
            }
        };
        show_image(&fshow);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_out_means_show() {
        let o = Outputs::optional_out("", false);
        assert_eq!(o.save, None);
        assert!(o.show);
    }

    #[test]
    fn out_without_show() {
        let o = Outputs::optional_out("bat.png", false);
        assert_eq!(o.save, Some(PathBuf::from("bat.png")));
        assert!(!o.show);
        assert!(Outputs::optional_out("bat.png", true).show);
    }

    #[test]
    fn soil_always_saves() {
        let o = Outputs::always_save("hum_temp_terreno.png", false);
        assert_eq!(o.save, Some(PathBuf::from("hum_temp_terreno.png")));
        assert!(!o.show);
    }

    #[test]
    fn dpi_within_bounds() {
        let app = || clap::App::new("t").arg(arg_dpi());
        assert_eq!(parse_dpi(&app().get_matches_from(vec!["t"])).unwrap(), 200);
        assert_eq!(parse_dpi(&app().get_matches_from(vec!["t", "--dpi", "100"])).unwrap(), 100);
        assert!(parse_dpi(&app().get_matches_from(vec!["t", "--dpi", "0"])).is_err());
        assert!(parse_dpi(&app().get_matches_from(vec!["t", "--dpi", "high"])).is_err());
        assert_eq!(parse_dpi(&app().get_matches_from(vec!["t", "--dpi", "1200"])).unwrap(), 1200);
        assert!(matches!(
            parse_dpi(&app().get_matches_from(vec!["t", "--dpi", "4000000000"])),
            Err(PlotError::InvalidArgument { arg: "dpi", .. })
        ));
    }

    #[test]
    fn viewer_gets_the_image() {
        let image = Path::new("/tmp/autonomia_lanza_plot.png");
        let cmd = viewer_command(image);
        let args: Vec<&std::ffi::OsStr> = cmd.get_args().collect();
        assert_eq!(args.last().copied(), Some(image.as_os_str()));
    }

    #[test]
    fn float_args() {
        let app = || {
            clap::App::new("t").arg(Arg::with_name("dt").long("dt").takes_value(true))
        };
        let m = app().get_matches_from(vec!["t"]);
        assert_eq!(parse_f64(&m, "dt", 10.).unwrap(), 10.);
        let m = app().get_matches_from(vec!["t", "--dt", "2.5"]);
        assert_eq!(parse_f64(&m, "dt", 10.).unwrap(), 2.5);
        let m = app().get_matches_from(vec!["t", "--dt", "nan"]);
        assert!(parse_f64(&m, "dt", 10.).is_err());
    }

    #[test]
    fn show_path_is_png_in_temp() {
        let p = show_path(Path::new("logs/autonomia.csv"));
        assert!(p.starts_with(std::env::temp_dir()));
        assert_eq!(p.file_name().unwrap(), "autonomia_lanza_plot.png");
    }
}
