//! Interactive console: TUI when attached to a terminal, line mode otherwise.

use anyhow::Result;
use is_terminal::IsTerminal;
use std::io;

use super::line::LineHandler;
use crate::client::ExecuteClient;
use crate::console::ReplyOrder;
use crate::printer::LogPrinter;
use crate::tui::run_tui;

pub struct ReplHandler;

impl ReplHandler {
    pub async fn run(
        client: ExecuteClient,
        server_url: String,
        order: ReplyOrder,
        use_tui: bool,
        color: bool,
    ) -> Result<()> {
        let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
        if use_tui && interactive {
            return run_tui(client, server_url, order).await;
        }
        if use_tui {
            log::info!("stdin/stdout is not a terminal; using line mode");
        }
        LineHandler::run(client, order, LogPrinter::new(color && io::stdout().is_terminal())).await
    }
}
