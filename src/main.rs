use std::env;
use std::io;
use std::process;

use imgen::{
    config::API_KEY_VAR,
    logger::{self, LoggerConfig},
    repl::Terminal,
    session::LineReader,
    signal::CtrlC,
    Config, ImageClient, ImageStore, Session,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // before anything can block, so Ctrl-C never kills the process outright
    let mut interrupts = CtrlC::install()?;
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(LoggerConfig::from_lookup(|key| env::var(key).ok()))?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::info!("No .env file found, using system environment variables");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {} environment variable not set.", API_KEY_VAR);
            eprintln!("Please set the variable in a .env file and try again.");
            eprintln!("Example: {}=your-api-key-here", API_KEY_VAR);
            process::exit(1);
        }
    };
    logger::log_config_info(&config);

    let client = ImageClient::new(&config);
    let store = ImageStore::new(&config.output_dir);
    let mut input = LineReader::spawn(Terminal::new);
    let mut session = Session::new(client, store, io::stdout());

    session.run(&mut input, &mut interrupts).await?;
    Ok(())
}
