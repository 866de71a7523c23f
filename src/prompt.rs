use anyhow::{Result, bail};
use std::io::{BufRead, Write};

use crate::cli::{ModeArg, SourceArg};

/// Interactive fallback for options not given on the command line.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    pub fn address_source(&mut self) -> Result<SourceArg> {
        writeln!(self.output, "\nChoose address loading option:")?;
        writeln!(self.output, "1. Load addresses from file")?;
        writeln!(self.output, "2. Load addresses from URL")?;
        match self.ask("\nEnter your choice (1-2): ")?.as_str() {
            "1" => Ok(SourceArg::File),
            "2" => Ok(SourceArg::Url),
            other => bail!("Invalid choice `{other}`"),
        }
    }

    /// `None` when the user just presses Enter.
    pub fn max_addresses(&mut self) -> Result<Option<usize>> {
        let answer = self.ask("\nEnter maximum number of addresses (press Enter for no limit): ")?;
        if answer.is_empty() {
            return Ok(None);
        }
        match answer.parse::<usize>() {
            Ok(max) => Ok(Some(max)),
            Err(_) => bail!("Invalid number entered: `{answer}`"),
        }
    }

    /// Anything other than `2` means native transfers.
    pub fn transfer_mode(&mut self) -> Result<ModeArg> {
        writeln!(self.output, "\nChoose transaction type:")?;
        writeln!(self.output, "1. Send native token (ETH)")?;
        writeln!(self.output, "2. Send custom token")?;
        let mode = match self.ask("\nEnter your choice (1-2): ")?.as_str() {
            "2" => ModeArg::Token,
            _ => ModeArg::Native,
        };
        Ok(mode)
    }
}
