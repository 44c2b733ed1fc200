use lanza_plot::sensors::{parse_cli, run};
use log::error;

fn main() {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };
    lanza_plot::init_logging(args.verbose);
    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
