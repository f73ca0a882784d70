/*
    trill_invoke Copyright 2025 The trill_invoke contributors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.
*/

//! The interactive shell. Each input line is one of a handful of console commands, or a device
//! command name followed by its arguments.

use std::io::{self, BufRead, Write};
use std::iter::Peekable;
use std::str::Chars;
use std::{error::Error, fmt::Display};

use trill_osc_client::osc::OscType;

use crate::dispatcher::{Command, CommandDispatcher};
use crate::help::SHELL_HELP;
use crate::printer::PrinterConfig;

pub const PROMPT: &str = ">> ";

/// [ShellCommand] is a parsed line of shell input.
#[derive(Clone, Debug, PartialEq)]
pub enum ShellCommand {
    Empty,
    Help,
    ShowLogReadings,
    SetLogReadings(bool),
    Quit,
    Send(Command),
}

/// [ShellError] represents the ways a line of shell input can fail to parse.
#[derive(Clone, Debug, PartialEq)]
pub enum ShellError {
    UnterminatedQuote,
    MissingCommandName,
    BadFlagValue(String),
    TooManyArguments(&'static str),
}

impl Error for ShellError {}
impl Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellError::UnterminatedQuote => write!(f, "Unterminated quoted string."),
            ShellError::MissingCommandName => write!(f, "Expected a command name after `send`."),
            ShellError::BadFlagValue(v) => {
                write!(f, "Expected on, off, true, false, 1 or 0, got '{}'.", v)
            }
            ShellError::TooManyArguments(cmd) => write!(f, "Too many arguments for `{}`.", cmd),
        }
    }
}

#[derive(Debug, PartialEq)]
struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    /// Quoted tokens are always strings. Bare tokens are floats when they read as a number
    /// that fits in an `f32`, strings otherwise.
    fn to_arg(&self) -> OscType {
        if !self.quoted {
            if let Ok(v) = self.text.parse::<f64>() {
                let f = v as f32;
                if f.is_finite() {
                    return OscType::Float(f);
                }
            }
        }
        OscType::String(self.text.clone())
    }
}

fn read_quoted(chars: &mut Peekable<Chars>, quote: char) -> Result<String, ShellError> {
    let mut text = String::new();
    loop {
        match chars.next() {
            None => return Err(ShellError::UnterminatedQuote),
            Some(c) if c == quote => return Ok(text),
            Some('\\') => match chars.next() {
                Some(e) if e == quote || e == '\\' => text.push(e),
                Some(e) => {
                    text.push('\\');
                    text.push(e);
                }
                None => return Err(ShellError::UnterminatedQuote),
            },
            Some(c) => text.push(c),
        }
    }
}

fn tokenize(line: &str) -> Result<Vec<Token>, ShellError> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let Some(&c) = chars.peek() else {
            break;
        };

        if c == '"' || c == '\'' {
            chars.next();
            let text = read_quoted(&mut chars, c)?;
            tokens.push(Token { text, quoted: true });
        } else {
            let mut text = String::new();
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                text.push(c);
            }
            tokens.push(Token {
                text,
                quoted: false,
            });
        }
    }
    Ok(tokens)
}

fn parse_flag(token: &Token) -> Result<bool, ShellError> {
    match token.text.to_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(ShellError::BadFlagValue(token.text.clone())),
    }
}

fn command_from(name: &Token, args: &[Token]) -> ShellCommand {
    ShellCommand::Send(Command::with_args(
        name.text.clone(),
        args.iter().map(Token::to_arg).collect(),
    ))
}

/// Parse one line of shell input.
pub fn parse_line(line: &str) -> Result<ShellCommand, ShellError> {
    let tokens = tokenize(line.trim())?;
    let Some((first, rest)) = tokens.split_first() else {
        return Ok(ShellCommand::Empty);
    };

    // A quoted first word is always a device command.
    if first.quoted {
        return Ok(command_from(first, rest));
    }

    match first.text.as_str() {
        "help" => {
            if !rest.is_empty() {
                return Err(ShellError::TooManyArguments("help"));
            }
            Ok(ShellCommand::Help)
        }
        "quit" | "exit" => {
            if !rest.is_empty() {
                return Err(ShellError::TooManyArguments("quit"));
            }
            Ok(ShellCommand::Quit)
        }
        "logReadings" => match rest {
            [] => Ok(ShellCommand::ShowLogReadings),
            [value] => Ok(ShellCommand::SetLogReadings(parse_flag(value)?)),
            _ => Err(ShellError::TooManyArguments("logReadings")),
        },
        "send" => match rest.split_first() {
            Some((name, args)) => Ok(command_from(name, args)),
            None => Err(ShellError::MissingCommandName),
        },
        _ => Ok(command_from(first, rest)),
    }
}

/// The [Shell] evaluates operator input against the dispatcher and the printer settings.
pub struct Shell<'a> {
    dispatcher: &'a CommandDispatcher,
    config: PrinterConfig,
}

impl<'a> Shell<'a> {
    pub fn new(dispatcher: &'a CommandDispatcher, config: PrinterConfig) -> Self {
        Shell { dispatcher, config }
    }

    /// Evaluate one line. Parse errors are reported on `out` and are not fatal. Returns false
    /// once the operator asks to quit.
    pub fn evaluate<W: Write>(&self, line: &str, out: &mut W) -> io::Result<bool> {
        match parse_line(line) {
            Ok(ShellCommand::Empty) => {}
            Ok(ShellCommand::Help) => out.write_all(SHELL_HELP.as_bytes())?,
            Ok(ShellCommand::ShowLogReadings) => {
                writeln!(out, "logReadings: {}", self.config.log_readings())?
            }
            Ok(ShellCommand::SetLogReadings(enabled)) => {
                self.config.set_log_readings(enabled);
                writeln!(out, "logReadings: {}", enabled)?;
            }
            Ok(ShellCommand::Quit) => return Ok(false),
            Ok(ShellCommand::Send(cmd)) => {
                log::debug!("Sending command {:?}", cmd);
                self.dispatcher.send_command(&cmd);
            }
            Err(e) => writeln!(out, "{}", e)?,
        }
        Ok(true)
    }

    /// Read and evaluate lines until end of input or `quit`.
    pub fn run<R: BufRead, W: Write>(&self, input: R, out: &mut W) -> io::Result<()> {
        out.write_all(PROMPT.as_bytes())?;
        out.flush()?;

        for line in input.lines() {
            if !self.evaluate(&line?, out)? {
                return Ok(());
            }
            out.write_all(PROMPT.as_bytes())?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }
}
