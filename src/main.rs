mod cli;

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use is_terminal::IsTerminal;

use ledis::client::ExecuteClient;
use ledis::config::Config;
use ledis::console::ReplyOrder;
use ledis::handlers::{oneshot::OneShotHandler, repl::ReplHandler};
use ledis::printer::LogPrinter;
use ledis::server::{self, ServerConfig};
use ledis::storage::Ledis;
use ledis::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let cfg = Config::load();

    // CLI overrides config; the server is chattier by default than the console
    let log_level = args
        .log_level
        .clone()
        .or_else(|| cfg.get("LOG_LEVEL"))
        .unwrap_or_else(|| if args.serve { "info" } else { "warn" }.to_string());
    let log_file = cfg.log_file();

    if args.serve {
        logging::init(&log_level, log_file.as_deref(), true)?;
        return run_server(&args, &cfg).await;
    }

    let server_url = args.url.clone().unwrap_or_else(|| cfg.server_url());
    let timeout = match args.timeout {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => cfg.request_timeout(),
    };
    let client = ExecuteClient::new(&server_url, timeout)?;
    let order = ReplyOrder::from_flag(args.ordered || cfg.ordered_replies());
    let color = !args.no_color;

    if let Some(command) = args.command.as_deref() {
        logging::init(&log_level, log_file.as_deref(), true)?;
        let printer = LogPrinter::new(color && io::stdout().is_terminal());
        if !OneShotHandler::run(&client, command, printer).await? {
            std::process::exit(1);
        }
        return Ok(());
    }

    let use_tui = !args.no_tui;
    let tui_active = use_tui && io::stdin().is_terminal() && io::stdout().is_terminal();
    logging::init(&log_level, log_file.as_deref(), !tui_active)?;
    log::debug!("console talking to {} ({:?} order)", client.endpoint(), order);

    ReplHandler::run(client, server_url, order, use_tui, color).await
}

async fn run_server(args: &cli::Cli, cfg: &Config) -> Result<()> {
    let bind_addr = args.bind.clone().unwrap_or_else(|| cfg.bind_addr());
    let bind_addr = parse_bind_addr(&bind_addr)?;
    let static_dir = match &args.static_dir {
        Some(dir) => Some(PathBuf::from(dir)),
        None => cfg.static_dir(),
    };

    let server_cfg = ServerConfig {
        bind_addr,
        static_dir,
        gc_interval: cfg.gc_interval(),
    };
    log::info!("Serving static files from {:?}", server_cfg.static_dir);

    server::serve(server_cfg, Ledis::new(), server::shutdown_signal()).await
}

/// Accepts `host:port` or a bare `:port`, which listens on every interface.
fn parse_bind_addr(addr: &str) -> Result<SocketAddr> {
    let full = if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    };
    full.parse()
        .map_err(|e| anyhow!("Invalid bind address '{}': {}", addr, e))
}
