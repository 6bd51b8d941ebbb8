//! Terminal front-end: parses one line of user input into a [`Command`].
//!
//! The binary reads stdin line by line and dispatches each parsed command to
//! the connection manager or the draft editor.  Parsing is kept here, free of
//! I/O, so it can be tested on plain strings.

use std::str::FromStr;

use thiserror::Error;

use crate::application::{DraftError, SensorField};

/// Printed by `help` and after an unknown command.
pub const HELP: &str = "\
commands:
  connect [host] [port]   open a session (defaults from config)
  disconnect              close the session
  show                    print the draft record
  set <field> <value>     edit the draft (pressure, tpms, temperature, lights, fuel)
  send                    send the draft record
  help                    show this text
  quit                    exit";

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect { host: Option<String>, port: Option<u16> },
    Disconnect,
    Show,
    Set { field: SensorField, value: String },
    Send,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{command}` needs a {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("`{command}` takes no more than {max} argument(s)")]
    TooManyArguments { command: &'static str, max: usize },
    #[error("invalid port `{0}`")]
    InvalidPort(String),
    #[error(transparent)]
    Field(#[from] DraftError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        match name.as_str() {
            "connect" | "c" => {
                if args.len() > 2 {
                    return Err(CommandError::TooManyArguments {
                        command: "connect",
                        max: 2,
                    });
                }
                let host = args.first().map(|h| (*h).to_string());
                let port = args
                    .get(1)
                    .map(|p| {
                        p.parse::<u16>()
                            .ok()
                            .filter(|port| *port != 0)
                            .ok_or_else(|| CommandError::InvalidPort((*p).to_string()))
                    })
                    .transpose()?;
                Ok(Command::Connect { host, port })
            }
            "disconnect" | "d" => no_args("disconnect", &args, Command::Disconnect),
            "show" | "s" => no_args("show", &args, Command::Show),
            "send" => no_args("send", &args, Command::Send),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => no_args("quit", &args, Command::Quit),
            "set" => {
                let field = args.first().ok_or(CommandError::MissingArgument {
                    command: "set",
                    argument: "field",
                })?;
                if args.len() < 2 {
                    return Err(CommandError::MissingArgument {
                        command: "set",
                        argument: "value",
                    });
                }
                Ok(Command::Set {
                    field: field.parse()?,
                    // Values never contain spaces; extra words are an error.
                    value: match args.len() {
                        2 => args[1].to_string(),
                        _ => {
                            return Err(CommandError::TooManyArguments {
                                command: "set",
                                max: 2,
                            })
                        }
                    },
                })
            }
            _ => Err(CommandError::Unknown(name)),
        }
    }
}

fn no_args(command: &'static str, args: &[&str], parsed: Command) -> Result<Command, CommandError> {
    if args.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::TooManyArguments { command, max: 0 })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
