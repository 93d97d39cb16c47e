use std::sync::Arc;

use livelocals_core::{Frame, FrameGuard, livelocals};
use rustyline::{DefaultEditor, error::ReadlineError};

use crate::command::{Command, HELP};

/// One read from the line editor.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Line(String),
    Interrupted,
    Eof,
}

/// Ctrl-C and Ctrl-D are part of the session; any other editor failure
/// (a closed terminal, an I/O error on stdin) ends it.
pub fn read_input(read: Result<String, ReadlineError>) -> anyhow::Result<Input> {
    match read {
        Ok(line) => Ok(Input::Line(line)),
        Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
        Err(ReadlineError::Eof) => Ok(Input::Eof),
        Err(e) => Err(anyhow::Error::new(e).context("Readline error")),
    }
}

fn print_repl_help(frame: &Frame) {
    println!("livelocals REPL on {} (frame {})", frame.code().name(), frame.id());
    println!("{}", HELP);
    println!("  :quit | :q | :exit       leave the REPL");
}

pub fn run(frame: Arc<Frame>) -> anyhow::Result<()> {
    // The frame stays current for the whole session.
    let _guard = FrameGuard::enter(&frame);
    let ll = livelocals(None)?;

    let mut rl = DefaultEditor::new()?;
    print_repl_help(&frame);

    loop {
        let line = match read_input(rl.readline("livelocals> "))? {
            Input::Line(line) => line,
            Input::Interrupted => {
                eprintln!("^C");
                continue;
            }
            Input::Eof => {
                println!();
                return Ok(());
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        if trimmed.starts_with(':') {
            match trimmed {
                ":quit" | ":exit" | ":q" => return Ok(()),
                ":help" => print_repl_help(&frame),
                _ => eprintln!("Unknown command. Type :help for help."),
            }
            continue;
        }

        match trimmed.parse::<Command>().and_then(|cmd| cmd.execute(&ll)) {
            Ok(lines) => lines.iter().for_each(|l| println!("{}", l)),
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}
