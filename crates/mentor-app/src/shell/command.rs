//! Parsing of shell input lines into intents.

/// A session picked by its position in the recency list (1-based) or by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Index(usize),
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text: send it to the active session.
    Send(String),
    New,
    List,
    Select(Target),
    Delete(Target),
    Help,
    Quit,
    /// Blank line.
    Empty,
    /// Unrecognized command or missing argument, with a usage hint.
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  <text>            send a message to the active session
  /new              start a new session
  /list             list sessions, most recent first
  /select <n|id>    switch to a session
  /delete <n|id>    delete a session
  /help             show this help
  /quit             exit";

/// Parse one input line.
pub fn parse(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Send(trimmed.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "new" => Command::New,
        "list" | "ls" => Command::List,
        "select" | "s" => match parse_target(arg) {
            Some(target) => Command::Select(target),
            None => Command::Invalid("usage: /select <n|id>".into()),
        },
        "delete" | "rm" => match parse_target(arg) {
            Some(target) => Command::Delete(target),
            None => Command::Invalid("usage: /delete <n|id>".into()),
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => Command::Invalid(format!("unknown command /{other}, try /help")),
    }
}

fn parse_target(arg: &str) -> Option<Target> {
    if arg.is_empty() {
        return None;
    }
    match arg.parse::<usize>() {
        Ok(0) => None,
        Ok(n) => Some(Target::Index(n)),
        Err(_) => Some(Target::Id(arg.to_string())),
    }
}
