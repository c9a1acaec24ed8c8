use std::io::BufRead;
use std::sync::mpsc::Sender;

use log::{debug, warn};

use crate::backend::BackendVariant;
use crate::controller::{Event, UiCommand};

/// Parses one line typed by the user.
pub fn parse_command(line: &str) -> Result<Event, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "enable" | "on" => UiCommand::Enable,
        "disable" | "off" => UiCommand::Disable,
        "backend" => match rest {
            "local" => UiCommand::SelectBackend(BackendVariant::Local),
            "remote" => UiCommand::SelectBackend(BackendVariant::Remote),
            _ => return Err(format!("Unknown backend: {:?}", rest)),
        },
        "fen" | "position" if !rest.is_empty() => UiCommand::SetPosition(rest.to_string()),
        "move" if !rest.is_empty() => UiCommand::PlayMove(rest.to_string()),
        "autoplay" => match rest {
            "on" => UiCommand::AutoPlay(true),
            "off" => UiCommand::AutoPlay(false),
            _ => return Err("Usage: autoplay on|off".to_string()),
        },
        "quit" | "exit" => return Ok(Event::Quit),
        _ => return Err(format!("Unknown command: {:?}", line)),
    };

    Ok(Event::Ui(command))
}

/// Forwards commands from `reader` until it ends or a quit is read.
pub fn read_commands<R: BufRead>(reader: R, events: Sender<Event>) {
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(event) => {
                let quit = matches!(event, Event::Quit);
                if events.send(event).is_err() || quit {
                    return;
                }
            }
            Err(e) => warn!("{}", e),
        }
    }

    debug!("Input closed");
    let _ = events.send(Event::Quit);
}
