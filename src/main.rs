use clap::Parser;
use element_discovery::cli::commands::{cmd_discover, cmd_run};
use element_discovery::cli::config::{Cli, Commands, load_config};
use element_discovery::cli::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);
    let mut config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Discover { url, output } => {
            cmd_discover(&config, &url, output.as_deref())?;
        }
        Commands::Run {
            record,
            format,
            output,
            artifacts,
            headed,
        } => {
            // CLI > config file > defaults
            if let Some(dir) = artifacts {
                config.artifacts.directory = dir;
            }
            if headed {
                config.browser.headless = false;
            }
            let all_passed = cmd_run(&config, &record, &format, output.as_deref())?;
            if !all_passed {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
