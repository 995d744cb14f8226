use crate::scorer::{LexiconScorer, Scorer};
use clap::{value_t, App, Arg, ArgMatches};
use log::{error, info, Level};
use std::sync::Arc;

mod config;
mod error;
mod request;
mod scorer;
mod server;

struct CmdLine {
    config: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    log_level: Level,
}

fn cmd_line_config() -> CmdLine {
    let matches = App::new("sibyl-sentiment")
        .version("0.1")
        .about("Polarity scoring of text over HTTP")
        .author("Sam De Roeck")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("config-file")
                .takes_value(true)
                .help("Configuration file, defaults to config.toml when present"),
        )
        .arg(
            Arg::with_name("host")
                .long("host")
                .value_name("host")
                .takes_value(true)
                .help("Host address to listen on"),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("port")
                .takes_value(true)
                .help("Port to listen on"),
        )
        .arg(
            Arg::with_name("log-level")
                .short("l")
                .long("log-level")
                .value_name("level")
                .takes_value(true)
                .default_value("info")
                .possible_values(&["error", "warn", "info", "debug", "trace"])
                .help("Logging verbosity"),
        )
        .get_matches();

    CmdLine {
        config: matches.value_of("config").map(|path| path.trim().to_owned()),
        host: matches.value_of("host").map(str::to_owned),
        port: optional_port(&matches),
        log_level: value_t!(matches, "log-level", Level).unwrap_or_else(|e| e.exit()),
    }
}

fn optional_port(matches: &ArgMatches) -> Option<u16> {
    if matches.is_present("port") {
        Some(value_t!(matches, "port", u16).unwrap_or_else(|e| e.exit()))
    } else {
        None
    }
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    let cmd_line = cmd_line_config();

    // Initialize logging
    if let Err(err) = simple_logger::init_with_level(cmd_line.log_level) {
        eprintln!("Could not initialize the logging framework: {}", err);
    }

    // Fetch configuration
    let mut config = match config::resolve_config(cmd_line.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };
    if let Some(host) = cmd_line.host {
        config.server.host = host;
    }
    if let Some(port) = cmd_line.port {
        config.server.port = port;
    }
    info!("Running with configuration:\n{}", config);

    let scorer: Arc<dyn Scorer> = Arc::new(LexiconScorer::new());
    let address = config.server.bind_address();
    let server = server::run(config.server, scorer).map_err(|err| {
        error!("Could not bind to {}: {}", address, err);
        err
    })?;
    info!("Serving sentiment requests on {}", address);
    server.await
}
