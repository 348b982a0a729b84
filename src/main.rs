use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use yolo_dataset_builder::{
    discover_samples, process_dataset, purge_upload_area, Cli, Commands, ConvertArgs, Result,
    SourceArgs,
};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Convert(args) => convert(&args),
        Commands::Samples(args) => samples(&args),
        Commands::Purge(args) => purge(&args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn convert(args: &ConvertArgs) -> Result<()> {
    info!("Starting the conversion process...");
    let summary = process_dataset(args)?;
    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize summary: {}", e),
        }
    } else {
        summary.print_summary();
    }
    Ok(())
}

fn samples(args: &SourceArgs) -> Result<()> {
    for sample in discover_samples(&args.source_dir)? {
        println!("{}", sample.name);
    }
    Ok(())
}

fn purge(args: &SourceArgs) -> Result<()> {
    purge_upload_area(&args.source_dir)?;
    info!("Emptied {}", args.source_dir.display());
    Ok(())
}
