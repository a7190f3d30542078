//! One-shot handler: send a single command and print its echo and reply.

use anyhow::Result;
use tokio::sync::mpsc;

use crate::client::ExecuteClient;
use crate::console::{spawn_request, Completion, Console, ReplyOrder};
use crate::printer::LogPrinter;

pub struct OneShotHandler;

impl OneShotHandler {
    /// Returns `true` when the reply was not an error.
    pub async fn run(client: &ExecuteClient, command: &str, printer: LogPrinter) -> Result<bool> {
        let mut console = Console::new(ReplyOrder::Resolution);
        let mut input = command.to_string();
        let Some(submission) = console.submit(&mut input) else {
            return Ok(true);
        };

        let mut stdout = std::io::stdout();
        printer.print_new(console.log(), 0, &mut stdout)?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
        spawn_request(client, submission, tx);

        let mut succeeded = false;
        if let Some(done) = rx.recv().await {
            succeeded = done.outcome.is_ok();
            console.complete(done.seq, done.outcome);
        }
        printer.print_new(console.log(), 1, &mut stdout)?;
        Ok(succeeded)
    }
}
