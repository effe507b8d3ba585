// src/console.rs
use anyhow::{bail, Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// What the user typed at the "go" gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Go,
    Exit,
}

/// Case-insensitive `go` / `exit`; anything else is unrecognized.
pub fn interpret_gate(answer: &str) -> Option<Gate> {
    match answer.trim().to_lowercase().as_str() {
        "go" => Some(Gate::Go),
        "exit" => Some(Gate::Exit),
        _ => None,
    }
}

/// Line-oriented prompts over any async reader (stdin in the binary).
pub struct Prompter<R> {
    lines: Lines<R>,
}

impl Prompter<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Prompter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Print `query` and read one trimmed line. `None` at end of input.
    async fn read_answer(&mut self, query: &str) -> Result<Option<String>> {
        print!("{query}");
        std::io::stdout().flush().ok();
        let line = self.lines.next_line().await.context("failed to read input")?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    pub async fn ask(&mut self, query: &str) -> Result<String> {
        match self.read_answer(query).await? {
            Some(answer) => Ok(answer),
            None => bail!("input closed while waiting for an answer"),
        }
    }

    /// Ask for a non-empty answer, re-prompting on blanks.
    pub async fn ask_required(&mut self, query: &str) -> Result<String> {
        loop {
            let answer = self.ask(query).await?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            println!("This one is required.");
        }
    }

    /// Numbered menu; blank input picks `default`. Accepts the number or the
    /// choice text (case-insensitive).
    pub async fn choose(&mut self, query: &str, choices: &[&str], default: usize) -> Result<String> {
        println!("{query}");
        for (i, c) in choices.iter().enumerate() {
            let marker = if i == default { " (default)" } else { "" };
            println!("  {}) {c}{marker}", i + 1);
        }
        loop {
            let answer = self.ask("> ").await?;
            if let Some(choice) = pick_choice(&answer, choices, default) {
                return Ok(choice.to_string());
            }
            println!("Pick a number between 1 and {}.", choices.len());
        }
    }

    /// Block until the user types `go` or `exit`. End of input counts as exit.
    pub async fn wait_for_go(&mut self) -> Result<Gate> {
        loop {
            let Some(answer) = self
                .read_answer("Type \"go\" to start AI autofill (or exit): ")
                .await?
            else {
                return Ok(Gate::Exit);
            };
            match interpret_gate(&answer) {
                Some(gate) => return Ok(gate),
                None => println!("Unrecognized input. Type \"go\" to proceed or \"exit\" to quit."),
            }
        }
    }
}

fn pick_choice<'a>(answer: &str, choices: &[&'a str], default: usize) -> Option<&'a str> {
    let answer = answer.trim();
    if answer.is_empty() {
        return choices.get(default).copied();
    }
    if let Ok(n) = answer.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| choices.get(i)).copied();
    }
    choices
        .iter()
        .find(|c| c.eq_ignore_ascii_case(answer))
        .copied()
}
