mod cli;
mod commands;
mod settings;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let config = match campus_config::load_config_from(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("campus: {e}");
            std::process::exit(2);
        }
    };

    let log_directive = match &args.log_level {
        Some(level) => format!("campus={level}"),
        None => config.logging.directive_for("campus"),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_directive.into()))
        .init();

    if let Err(e) = commands::run(args, config).await {
        eprintln!("campus: {e}");
        std::process::exit(1);
    }
}
