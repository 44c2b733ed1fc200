pub mod autonomy;
pub mod chart;
pub mod error;
pub mod humidity;
pub mod numeric;
pub mod output;
pub mod sensors;
pub mod soil;
pub mod table;
pub mod timeaxis;

pub use error::PlotError;

pub const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// default resolution of the saved images, dots per inch
pub const DEFAULT_DPI: &str = "200";

/// Init the env_logger, `RUST_LOG` wins over the verbose flag
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(level);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init()
        .unwrap_or(());
}

/// min and max over the finite values, NAN and infinities are skipped.
/// None if there are no finite values.
pub fn min_and_max(s: &[f64]) -> Option<(f64, f64)> {
    let mut finite = s.iter().copied().filter(|v| v.is_finite());
    let first = finite.next()?;
    let (mut min, mut max) = (first, first);
    for es in finite {
        if es > max {
            max = es
        }
        if es < min {
            min = es
        }
    }
    Some((min, max))
}

/// keep only the positions where all the columns hold a finite value
pub fn drop_nan_rows(columns: &mut [&mut Vec<f64>]) {
    let len = columns.iter().map(|c| c.len()).min().unwrap_or(0);
    let keep: Vec<bool> = (0..len)
        .map(|i| columns.iter().all(|c| c[i].is_finite()))
        .collect();
    for c in columns.iter_mut() {
        let mut k = keep.iter();
        c.truncate(len);
        c.retain(|_| *k.next().unwrap_or(&false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_and_max_skips_nan() {
        let v = [f64::NAN, 3.0, -1.5, f64::NAN, 7.25];
        assert_eq!(min_and_max(&v), Some((-1.5, 7.25)));
    }

    #[test]
    fn min_and_max_of_nothing() {
        assert_eq!(min_and_max(&[]), None);
        assert_eq!(min_and_max(&[f64::NAN, f64::INFINITY]), None);
    }

    #[test]
    fn drop_nan_rows_keeps_aligned_pairs() {
        let mut a = vec![1.0, f64::NAN, 3.0, 4.0];
        let mut b = vec![10.0, 20.0, f64::NAN, 40.0];
        drop_nan_rows(&mut [&mut a, &mut b]);
        assert_eq!(a, vec![1.0, 4.0]);
        assert_eq!(b, vec![10.0, 40.0]);
    }
}
