//! Line console: commands from stdin, log entries to stdout.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::client::ExecuteClient;
use crate::console::{spawn_request, Completion, Console, ReplyOrder};
use crate::printer::LogPrinter;

pub struct LineHandler;

impl LineHandler {
    pub async fn run(client: ExecuteClient, order: ReplyOrder, printer: LogPrinter) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        run_lines(&client, order, printer, stdin, &mut stdout).await?;
        Ok(())
    }
}

/// Submit every line of `input` and print the log as it grows.
///
/// Lines are read while earlier requests are still pending. After EOF the
/// loop keeps rendering until every request has completed.
pub async fn run_lines<R, W>(
    client: &ExecuteClient,
    order: ReplyOrder,
    printer: LogPrinter,
    input: R,
    out: &mut W,
) -> Result<Console>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut console = Console::new(order);
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut lines = input.lines();
    let mut input_open = true;
    let mut printed = 0;

    loop {
        if !input_open && console.is_idle() {
            break;
        }
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(mut line) => {
                    if let Some(submission) = console.submit(&mut line) {
                        spawn_request(client, submission, tx.clone());
                    }
                }
                None => input_open = false,
            },
            Some(done) = rx.recv() => {
                console.complete(done.seq, done.outcome);
            }
        }
        printed = printer.print_new(console.log(), printed, out)?;
    }

    Ok(console)
}
