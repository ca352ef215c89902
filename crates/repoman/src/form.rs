//! Line-oriented driver for the connection details form.

use parking_lot::Mutex;
use repoman_core::{
    ConnectionRecord, DetailsController, FinishState, NavigationTarget, RepoError, RepoState,
    SavedRepository,
};
use std::io::{BufRead, Write};
use std::sync::Arc;

const HELP: &str = "\
commands:
  name <text>        set the display name
  db <text>          set the database connection
  desc <text>        set the description
  default on|off     launch this repository by default
  select             pick a database connection
  finish             save the repository
  back               leave the form
  show               print the form
  list               list saved repositories
  edit <name>        edit a saved repository
  delete <name>      delete a saved repository
  new                start a blank form
  quit               exit";

/// How a form was left.
enum FormExit {
    Saved(SavedRepository),
    Left(NavigationTarget),
    Edit(SavedRepository),
    New,
    Quit,
}

/// Run forms until the user quits or input ends.
pub fn run<R: BufRead, W: Write>(state: &RepoState, input: R, mut out: W) -> Result<(), RepoError> {
    let mut lines = input.lines();
    let mut record = ConnectionRecord::default();
    let mut editing: Option<SavedRepository> = None;

    writeln!(out, "{HELP}")?;

    loop {
        let exit = run_form(state, &mut record, editing.as_ref(), &mut lines, &mut out)?;
        match exit {
            FormExit::Saved(repository) => {
                writeln!(out, "saved '{}'", repository.display_name)?;
                record = ConnectionRecord::default();
                editing = None;
            }
            FormExit::Left(target) => {
                writeln!(out, "-> {target}")?;
                record = ConnectionRecord::default();
                editing = None;
            }
            FormExit::Edit(repository) => {
                record = repository.to_record();
                editing = Some(repository);
            }
            FormExit::New => {
                record = ConnectionRecord::default();
                editing = None;
            }
            FormExit::Quit => return Ok(()),
        }
    }
}

fn run_form<R: BufRead, W: Write>(
    state: &RepoState,
    record: &mut ConnectionRecord,
    editing: Option<&SavedRepository>,
    lines: &mut std::io::Lines<R>,
    out: &mut W,
) -> Result<FormExit, RepoError> {
    let pending = Arc::new(Mutex::new(None::<String>));
    let sink = Arc::clone(&pending);
    let mut form = state.details_controller(
        record,
        Box::new(move |message: Option<String>| *sink.lock() = message),
    );

    show(&form, out)?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            return Ok(FormExit::Quit);
        };
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        match command {
            "" => continue,
            "name" => form.connection_mut().display_name = arg.to_string(),
            "db" => form.connection_mut().database_connection = arg.to_string(),
            "desc" => form.connection_mut().description = arg.to_string(),
            "default" => match arg {
                "on" => form.set_default_connection(true),
                "off" => form.set_default_connection(false),
                _ => writeln!(out, "usage: default on|off")?,
            },
            "select" => {
                form.select_database();
                write!(out, "database connection: ")?;
                out.flush()?;
                if let Some(choice) = lines.next().transpose()? {
                    let choice = choice.trim();
                    if !choice.is_empty() {
                        form.connection_mut().database_connection = choice.to_string();
                    }
                }
            }
            "finish" => {
                if !form.can_finish() {
                    let finish = &form.labels().finish;
                    writeln!(out, "{finish} is disabled: fill in a name and pick a database")?;
                    continue;
                }
                form.reset_error_message();
                if state.block_on(form.finish()) == FinishState::Success {
                    match state.complete_loading(form.connection(), editing.map(|r| r.id)) {
                        Ok(saved) => return Ok(FormExit::Saved(saved)),
                        Err(e) => {
                            tracing::warn!(error = %e, "Saving repository failed");
                            *pending.lock() = Some(e.to_string());
                        }
                    }
                }
            }
            "back" => {
                form.back();
                let target = state.router().current().unwrap_or(NavigationTarget::Manager);
                return Ok(FormExit::Left(target));
            }
            "show" => show(&form, out)?,
            "list" => {
                for repository in state.storage().load_all_repositories()? {
                    let marker = if repository.is_default { "*" } else { " " };
                    writeln!(
                        out,
                        "{marker} {} ({})",
                        repository.display_name, repository.database_connection
                    )?;
                }
            }
            "edit" => match state.storage().find_by_display_name(arg)? {
                Some(repository) => return Ok(FormExit::Edit(repository)),
                None => writeln!(out, "no repository named '{arg}'")?,
            },
            "delete" => match state.storage().find_by_display_name(arg)? {
                Some(repository) => match state.storage().delete_repository(repository.id) {
                    Ok(()) => {
                        writeln!(out, "deleted '{}'", repository.display_name)?;
                        if editing.is_some_and(|r| r.id == repository.id) {
                            return Ok(FormExit::New);
                        }
                    }
                    Err(e) => *pending.lock() = Some(e.to_string()),
                },
                None => writeln!(out, "no repository named '{arg}'")?,
            },
            "new" => return Ok(FormExit::New),
            "quit" | "exit" => return Ok(FormExit::Quit),
            "help" => writeln!(out, "{HELP}")?,
            other => writeln!(out, "unknown command '{other}', try 'help'")?,
        }

        if let Some(message) = pending.lock().take() {
            writeln!(out, "error: {message}")?;
        }
    }
}

fn show<W: Write>(form: &DetailsController<'_>, out: &mut W) -> Result<(), RepoError> {
    let labels = form.labels();
    let connection = form.connection();
    writeln!(out, "== {} ==", labels.connection_details)?;
    writeln!(out, "{}: {}", labels.display_name, connection.display_name)?;
    writeln!(out, "{}: {}", labels.database_connection, connection.database_connection)?;
    writeln!(out, "{}: {}", labels.description, connection.description)?;
    writeln!(out, "[{}] {}", if connection.is_default { "x" } else { " " }, labels.launch)?;
    writeln!(
        out,
        "[{}{}] [{}]",
        labels.finish,
        if form.can_finish() { "" } else { " (disabled)" },
        labels.back
    )?;
    Ok(())
}
