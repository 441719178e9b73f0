use clap::Parser;
use log::{debug, info};
use snafu::ErrorCompat;

mod args;
mod survey;

fn main() {
    let args = args::Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();
    debug!("args: {:?}", args);

    match survey::run_survey(&args) {
        Ok(record_id) => {
            info!("Survey stored as {}", record_id);
            println!("Control number: {}", record_id);
        }
        Err(e) => {
            eprintln!("An error occured: {}", e);
            if let Some(bt) = ErrorCompat::backtrace(&e) {
                eprintln!("trace: {}", bt);
            }
            std::process::exit(1);
        }
    }
}
