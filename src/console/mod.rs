//! Console core: input capture, echo, request dispatch and reply rendering.
//!
//! The TUI, the line console and one-shot mode all drive a [`Console`]. A
//! submission echoes `> <command>` into the log and hands back a
//! [`Submission`]; the caller spawns the request with [`spawn_request`] and
//! feeds the resulting [`Completion`] back through [`Console::complete`] on the
//! same event loop, so the log is only ever mutated from one place.

pub mod log;

use std::collections::BTreeMap;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::client::ExecuteClient;
use crate::error::ConsoleError;

pub use self::log::OutputLog;

pub type Outcome = Result<String, ConsoleError>;

/// Order in which replies are appended when several requests overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyOrder {
    /// Whichever response arrives first is shown first.
    #[default]
    Resolution,
    /// Replies are held back until every earlier submission has been shown.
    Submission,
}

impl ReplyOrder {
    pub fn from_flag(ordered: bool) -> Self {
        if ordered {
            Self::Submission
        } else {
            Self::Resolution
        }
    }
}

/// A command accepted by the console, tagged with its submission number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub seq: u64,
    pub command: String,
}

/// The result of one `/execute` round trip.
#[derive(Debug)]
pub struct Completion {
    pub seq: u64,
    pub outcome: Outcome,
}

/// Take the input value as a command if it is non-empty, clearing the field.
///
/// Whitespace counts as content: only a zero-length value is ignored.
pub fn take_command(input: &mut String) -> Option<String> {
    if input.is_empty() {
        return None;
    }
    Some(std::mem::take(input))
}

/// Text appended to the log for a finished request.
pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Ok(text) => text.clone(),
        Err(e) => format!("Error: {}", e),
    }
}

#[derive(Debug)]
pub struct Console {
    log: OutputLog,
    order: ReplyOrder,
    next_seq: u64,
    next_to_render: u64,
    held: BTreeMap<u64, String>,
    in_flight: usize,
}

impl Console {
    pub fn new(order: ReplyOrder) -> Self {
        Self {
            log: OutputLog::new(),
            order,
            next_seq: 0,
            next_to_render: 0,
            held: BTreeMap::new(),
            in_flight: 0,
        }
    }

    /// Handle an Enter press on `input`.
    ///
    /// Returns `None` and leaves `input` untouched when it is empty. Otherwise
    /// clears it, echoes the command and returns the submission to send.
    pub fn submit(&mut self, input: &mut String) -> Option<Submission> {
        let command = take_command(input)?;
        self.log.append(format!("> {}", command));
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight += 1;
        Some(Submission { seq, command })
    }

    /// Render a finished request. Returns how many entries were appended.
    pub fn complete(&mut self, seq: u64, outcome: Outcome) -> usize {
        self.in_flight = self.in_flight.saturating_sub(1);
        let text = render_outcome(&outcome);
        match self.order {
            ReplyOrder::Resolution => {
                self.log.append(text);
                1
            }
            ReplyOrder::Submission => {
                self.held.insert(seq, text);
                let mut appended = 0;
                while let Some(text) = self.held.remove(&self.next_to_render) {
                    self.log.append(text);
                    self.next_to_render += 1;
                    appended += 1;
                }
                appended
            }
        }
    }

    pub fn log(&self) -> &OutputLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut OutputLog {
        &mut self.log
    }

    pub fn order(&self) -> ReplyOrder {
        self.order
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }
}

/// Send one submission in the background; its [`Completion`] arrives on `tx`.
///
/// Nothing is awaited here, so the caller keeps accepting input while the
/// request is pending.
pub fn spawn_request<E>(
    client: &ExecuteClient,
    submission: Submission,
    tx: UnboundedSender<E>,
) -> JoinHandle<()>
where
    E: From<Completion> + Send + 'static,
{
    let client = client.clone();
    tokio::spawn(async move {
        let Submission { seq, command } = submission;
        let outcome = client.execute(&command).await;
        if let Err(e) = &outcome {
            ::log::debug!("request #{} failed: {}", seq, e);
        }
        // Receiver gone means the console has exited.
        let _ = tx.send(E::from(Completion { seq, outcome }));
    })
}
