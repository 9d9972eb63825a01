//! Command-line handlers. Each handler takes already-built session objects and
//! talks to the user over stdin/stdout.

pub mod chat;
pub mod credentials;

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line reader over stdin shared by the interactive handlers
pub type Input = Lines<BufReader<Stdin>>;

pub fn stdin_lines() -> Input {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Print `prompt` and read one trimmed line. `None` on end of input.
pub async fn read_line(input: &mut Input, prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    Ok(input.next_line().await?.map(|line| line.trim().to_string()))
}
