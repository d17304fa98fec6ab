// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations for the `remcol` binary.
//!
//! Collection commands run against any [`RemoteStore`]; the binary hands
//! them a [`DaemonClient`], tests hand them a
//! [`MemoryStore`](remcol_core::MemoryStore).

use std::io::Write;
use std::sync::Arc;

use remcol_core::{End, RemoteStore, Timeout, Token};
use serde_json::Value;

use crate::cli::{Cli, Command, DaemonCommand};
use crate::client::DaemonClient;
use crate::config::{Config, Settings};
use crate::error::{Error, Result};
use crate::lifecycle;
use crate::queue::{Outcome, PopOptions, Queue};
use crate::sequence::List;
use crate::slice::Slice;

/// Runs one parsed command line, writing results to `out`.
pub fn execute(cli: Cli, config: &Config, out: &mut dyn Write) -> Result<()> {
    let settings = Settings::resolve(cli.socket, cli.codec.as_deref(), config)?;
    match cli.command {
        Command::Daemon(command) => daemon(command, &settings, out),
        command => {
            let client = DaemonClient::connect(&settings.socket).map_err(|e| {
                Error::Daemon(format!(
                    "{}\n  hint: start the daemon with 'remcol daemon start'",
                    e
                ))
            })?;
            collection(command, Arc::new(client), &settings, out)
        }
    }
}

/// Runs a collection command against `store`.
pub fn collection(
    command: Command,
    store: Arc<dyn RemoteStore>,
    settings: &Settings,
    out: &mut dyn Write,
) -> Result<()> {
    let codec = settings.codec;
    let list = |token: &str| -> Result<List<Value>> {
        Ok(List::open(Arc::clone(&store), Some(Token::from(token)), codec)?)
    };

    match command {
        Command::Push {
            token,
            values,
            front,
        } => {
            let values = values
                .iter()
                .map(|v| parse_value(v))
                .collect::<Result<Vec<_>>>()?;
            let list = list(&token)?;
            let len = if front {
                let mut len = list.len()?;
                for value in &values {
                    len = list.push_front(value)?;
                }
                len
            } else {
                list.extend(&values)?
            };
            writeln!(out, "{}", len)?;
        }

        Command::Pop {
            token,
            aux,
            tail,
            block,
            timeout,
            channel,
        } => {
            let queue: Queue<Value> = Queue::open(Arc::clone(&store), Some(Token::from(token)), codec)?;
            let aux: Vec<Token> = aux.into_iter().map(Token::from).collect();
            let options = PopOptions {
                block,
                timeout: timeout
                    .as_deref()
                    .map(Timeout::parse)
                    .unwrap_or(settings.timeout),
                end: if tail { End::Tail } else { End::Head },
            };
            match queue.pop(&aux, options)? {
                Outcome::Delivered {
                    channel: from,
                    value,
                } => {
                    if channel {
                        write!(out, "{}\t", from)?;
                    }
                    print_value(out, &value)?;
                }
                Outcome::TimedOut | Outcome::Empty => {}
            }
        }

        Command::Get { token, index } => {
            if let Some(value) = list(&token)?.get(index)? {
                print_value(out, &value)?;
            }
        }

        Command::Range { token, slice } => {
            for value in list(&token)?.get_range(&slice)? {
                print_value(out, &value)?;
            }
        }

        Command::Set {
            token,
            index,
            value,
        } => {
            let value = parse_value(&value)?;
            list(&token)?.set(index, &value)?;
        }

        Command::Insert {
            token,
            index,
            value,
        } => {
            let value = parse_value(&value)?;
            list(&token)?.shift_insert_at(index, &value)?;
        }

        Command::Delete { token, target } => {
            let list = list(&token)?;
            if target.contains(':') {
                list.delete_range(&target.parse::<Slice>()?)?;
            } else {
                let index = target
                    .trim()
                    .parse::<isize>()
                    .map_err(|_| Error::InvalidIndex(target.clone()))?;
                list.delete(index)?;
            }
        }

        Command::Len { token } => {
            writeln!(out, "{}", list(&token)?.len()?)?;
        }

        Command::Rotate { token, to } => {
            let target = to.map(Token::from);
            if let Some(value) = list(&token)?.circulate(target.as_ref())? {
                print_value(out, &value)?;
            }
        }

        Command::Drop { token } => {
            let removed = store.delete(&Token::from(token))?;
            writeln!(out, "{}", u8::from(removed))?;
        }

        Command::Daemon(command) => return daemon(command, settings, out),
    }
    Ok(())
}

fn daemon(command: DaemonCommand, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    match command {
        DaemonCommand::Start => {
            let pid = lifecycle::spawn_daemon(&settings.state_dir, &settings.socket)?;
            writeln!(out, "daemon running (pid {})", pid)?;
        }
        DaemonCommand::Ping => {
            let version = connect(settings)?.hello()?;
            writeln!(out, "pong (remcold v{})", version)?;
        }
        DaemonCommand::Status => {
            let status = connect(settings)?.status()?;
            writeln!(out, "pid: {}", status.pid)?;
            writeln!(out, "uptime: {}s", status.uptime_secs)?;
            writeln!(out, "keys: {}", status.keys)?;
        }
        DaemonCommand::Stop => match lifecycle::detect_daemon(&settings.socket) {
            Some(client) => {
                client.shutdown()?;
                writeln!(out, "daemon stopped")?;
            }
            None => writeln!(out, "daemon not running")?,
        },
    }
    Ok(())
}

fn connect(settings: &Settings) -> Result<DaemonClient> {
    DaemonClient::connect(&settings.socket).map_err(|e| Error::Daemon(e.to_string()))
}

/// Parses one command line value as JSON.
pub fn parse_value(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| Error::InvalidValue {
        value: text.to_string(),
        reason: e.to_string(),
    })
}

fn print_value(out: &mut dyn Write, value: &Value) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string(value)?)?;
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
