//! PhyloSVG CLI entry point.

use std::process;

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use phylosvg::PhyloSvgError;
use phylosvg_cli::{Args, error_adapter::to_reportables, exit_status};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logging(&args);
    debug!(args:?; "Parsed arguments");

    match phylosvg_cli::run(&args) {
        Ok(()) => info!(output_prefix = args.output; "Tree image processed"),
        Err(err) => {
            report_error(&args.input, &err);
            process::exit(exit_status(&err));
        }
    }
}

fn init_logging(args: &Args) {
    let level = args.log_level_filter().unwrap_or_else(|| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();
}

fn report_error(input: &str, err: &PhyloSvgError) {
    let reporter = miette::GraphicalReportHandler::new();
    for reportable in to_reportables(err) {
        let mut rendered = String::new();
        match reporter.render_report(&mut rendered, &reportable) {
            Ok(()) => error!("{rendered}"),
            Err(_) => error!("{reportable}"),
        }
    }
    error!(input; "Tree image was not processed");
}
