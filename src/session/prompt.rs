use std::io::{self, BufRead, Write};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::oneshot;

/// Waits for the user to acknowledge a question.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn confirm(&self, question: &str) -> Result<()>;
}

/// Asks on stdout and waits for a line on stdin.
pub struct StdinPrompter;

#[async_trait]
impl Prompter for StdinPrompter {
    async fn confirm(&self, question: &str) -> Result<()> {
        print!("{question} ");
        io::stdout().flush()?;

        // A plain thread keeps the blocking read from holding the runtime open when the session
        // is cancelled while waiting.
        let (sender, receiver) = oneshot::channel();
        std::thread::spawn(move || {
            let _ = sender.send(read_answer(&mut io::stdin().lock()));
        });
        receiver.await??;
        Ok(())
    }
}

/// Reads one answer line. A closed input is an error, nobody is there to confirm.
fn read_answer(input: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    match input.read_line(&mut line)? {
        0 => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stdin closed while waiting for an answer",
        )),
        _ => Ok(line),
    }
}
