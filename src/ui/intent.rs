use thiserror::Error;

/// A user intent read from one line of terminal input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Plain text replaces the query (empty text is passed through as-is)
    SetQuery(String),

    /// `:open N` selects the N-th result (1-based)
    OpenPosition(usize),

    /// `:id ID` selects a book by identifier
    OpenId(String),

    /// `:search` re-runs the current query
    Refresh,

    Help,

    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    #[error("Unknown command :{0} (type :help)")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    MissingArgument(&'static str),

    #[error("'{0}' is not a result number")]
    InvalidPosition(String),
}

pub const HELP_TEXT: &str = "\
Type to search. Commands:
  :open N    show details for result N
  :id ID     show details for a catalog id
  :search    repeat the current search
  :help      show this help
  :quit      exit";

impl Intent {
    pub fn parse(line: &str) -> Result<Self, IntentError> {
        let line = line.trim_end_matches(['\r', '\n']);

        let Some(command) = line.strip_prefix(':') else {
            return Ok(Intent::SetQuery(line.to_string()));
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match name {
            "open" | "o" => {
                if arg.is_empty() {
                    return Err(IntentError::MissingArgument(":open N"));
                }
                match arg.parse::<usize>() {
                    Ok(position) if position > 0 => Ok(Intent::OpenPosition(position)),
                    _ => Err(IntentError::InvalidPosition(arg.to_string())),
                }
            }
            "id" => {
                if arg.is_empty() {
                    Err(IntentError::MissingArgument(":id ID"))
                } else {
                    Ok(Intent::OpenId(arg.to_string()))
                }
            }
            "search" | "s" => Ok(Intent::Refresh),
            "help" | "h" | "?" => Ok(Intent::Help),
            "quit" | "q" | "exit" => Ok(Intent::Quit),
            other => Err(IntentError::UnknownCommand(other.to_string())),
        }
    }
}
