mod commands;
mod env;

use tracing::{error, info};

const USAGE: &str = "Usage: busmetric collect | busmetric analyze <predictions.csv>...";

fn main() {
    tracing_subscriber::fmt().init();

    let args: Vec<_> = std::env::args().collect();
    let result = match args.get(1).map(String::as_str) {
        Some("collect") => commands::collect(),
        Some("analyze") => commands::analyze(&args[2..]),
        _ => {
            error!("{USAGE}");
            std::process::exit(2);
        }
    };

    match result {
        Ok(()) => info!("Done"),
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    }
}
