//! Ali je vroče CLI - is it hot today, and how does this season compare?

use ajv_core::VroceError;
use clap::Parser;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "ajv-cli",
    version,
    about = "Seasonal temperature statistics for Slovenian weather stations"
)]
struct Cli {
    #[command(flatten)]
    config: ajv_cmd::Config,

    #[command(subcommand)]
    command: ajv_cmd::Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match ajv_cmd::run(cli.config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            match e.downcast_ref::<VroceError>() {
                Some(vroce) => eprintln!("{}", vroce.user_message()),
                None => eprintln!("Napaka: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}
