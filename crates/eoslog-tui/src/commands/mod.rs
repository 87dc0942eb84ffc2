// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

use eoslog_core::ingest::{ConnectionParams, Credentials};

/// A parsed, validated command ready to be executed by the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    // Change theme
    Theme(String),
    // Toggle display of timestamps
    Timestamps,
    // Jump to end of log stream and unpause
    Tail,
    // Drop the current connection (if any) and open a new one
    Connect(ConnectionParams),
    Disconnect,
    // Forget every group
    Clear,
}

const CONNECT_USAGE: &str = "usage: connect <server> <port> [<tag> <realm> <secret>]";

impl Command {
    /// Parse a raw command string (the text after the `:` prefix).
    ///
    /// Returns `Ok(cmd)` on success, `Err(message)` on failure. An empty
    /// string returns `Err("")` as a sentinel meaning "close without acting".
    pub fn parse(input: &str) -> Result<Command, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(String::new());
        }

        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((input, ""));

        match word {
            "q" | "quit" => Ok(Command::Quit),
            "help" => Ok(Command::Help),
            "ts" | "timestamps" => Ok(Command::Timestamps),
            "tail" => Ok(Command::Tail),
            "disconnect" => Ok(Command::Disconnect),
            "clear" => Ok(Command::Clear),
            "theme" => {
                if rest.is_empty() {
                    Err("usage: theme <default|gruvbox>".to_string())
                } else {
                    Ok(Command::Theme(rest.to_string()))
                }
            }
            "connect" => parse_connect(rest).map(Command::Connect),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

fn parse_connect(rest: &str) -> Result<ConnectionParams, String> {
    let args: Vec<&str> = rest.split_whitespace().collect();
    let (server, port, credentials) = match args.as_slice() {
        [server, port] => (*server, *port, None),
        [server, port, tag, realm, secret] => (
            *server,
            *port,
            Some(Credentials {
                tag: tag.to_string(),
                realm: realm.to_string(),
                secret: secret.to_string(),
            }),
        ),
        _ => return Err(CONNECT_USAGE.to_string()),
    };

    let port = port
        .parse::<u16>()
        .map_err(|_| format!("invalid port: {port}"))?;

    let params = ConnectionParams::new(server, port);
    Ok(match credentials {
        Some(credentials) => params.with_credentials(credentials),
        None => params,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
