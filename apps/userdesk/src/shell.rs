//! Interactive session: loads on start, then edits a draft and issues commands.

use std::io::Write;

use anyhow::Result;
use client_core::{SyncController, SyncError};
use shared::domain::{update_field, Draft, DraftField, RecordId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::render::{render_draft, View};

const HELP: &str = "\
commands:
  load                     reload the users table
  set <name|email|city> V  set a field of the new-user draft
  draft                    show the draft
  submit                   create a user from the draft
  delete <id>              delete the user with this id
  help                     show this help
  quit                     leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Load,
    Set(DraftField, String),
    ShowDraft,
    Submit,
    Delete(RecordId),
    Help,
    Quit,
    Nothing,
}

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((line, ""));

    match verb {
        "" => Ok(ShellCommand::Nothing),
        "load" | "l" => Ok(ShellCommand::Load),
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .map(|(field, value)| (field, value.trim()))
                .unwrap_or((rest, ""));
            if field.is_empty() {
                return Err("usage: set <name|email|city> <value>".to_string());
            }
            Ok(ShellCommand::Set(field.parse()?, value.to_string()))
        }
        "draft" => Ok(ShellCommand::ShowDraft),
        "submit" | "add" => Ok(ShellCommand::Submit),
        "delete" | "rm" => {
            if rest.is_empty() {
                return Err("usage: delete <id>".to_string());
            }
            Ok(ShellCommand::Delete(RecordId::new(rest)))
        }
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{other}'; type 'help'")),
    }
}

pub async fn run(controller: &SyncController, view: &View) -> Result<()> {
    let mut draft = Draft::default();

    load(controller).await;
    println!("{}", view.render(&controller.state()));
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Ok(ShellCommand::Nothing) => {}
            Ok(ShellCommand::Load) => {
                load(controller).await;
                println!("{}", view.render(&controller.state()));
            }
            Ok(ShellCommand::Set(field, value)) => {
                draft = update_field(&draft, field, value);
            }
            Ok(ShellCommand::ShowDraft) => print!("{}", render_draft(&draft)),
            Ok(ShellCommand::Submit) => {
                settle(controller.create(&mut draft).await);
                println!("{}", view.render(&controller.state()));
            }
            Ok(ShellCommand::Delete(id)) => {
                settle(controller.delete(&id).await);
                println!("{}", view.render(&controller.state()));
            }
            Ok(ShellCommand::Help) => println!("{HELP}"),
            Ok(ShellCommand::Quit) => break,
            Err(message) => println!("{message}"),
        }
    }

    Ok(())
}

/// Lists while printing the loading indicator if the request is still pending.
async fn load(controller: &SyncController) {
    let mut state = controller.subscribe_state();
    let indicator = async {
        if state.wait_for(|state| state.is_loading).await.is_ok() {
            println!("Loading...");
        }
        std::future::pending::<()>().await
    };

    tokio::select! {
        outcome = controller.list() => settle(outcome),
        _ = indicator => {}
    }
}

// Failures are already mirrored into the rendered state.
fn settle<T>(outcome: Result<T, SyncError>) {
    if let Err(err) = outcome {
        debug!(kind = err.kind().as_str(), error = %err, "shell: command failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_with_spaces_in_value() {
        assert_eq!(
            parse_command("set city  New Delhi "),
            Ok(ShellCommand::Set(DraftField::City, "New Delhi".into()))
        );
        assert_eq!(
            parse_command("set NAME"),
            Ok(ShellCommand::Set(DraftField::Name, String::new()))
        );
    }

    #[test]
    fn rejects_unknown_fields_and_missing_arguments() {
        assert!(parse_command("set phone 123").is_err());
        assert!(parse_command("set").is_err());
        assert!(parse_command("delete").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn parses_delete_and_simple_verbs() {
        assert_eq!(
            parse_command("delete 65f0c0ffee"),
            Ok(ShellCommand::Delete(RecordId::new("65f0c0ffee")))
        );
        assert_eq!(parse_command("  "), Ok(ShellCommand::Nothing));
        assert_eq!(parse_command("load"), Ok(ShellCommand::Load));
        assert_eq!(parse_command("submit"), Ok(ShellCommand::Submit));
        assert_eq!(parse_command("q"), Ok(ShellCommand::Quit));
    }
}
