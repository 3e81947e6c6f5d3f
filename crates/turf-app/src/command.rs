//! Slash-command parsing.
//!
//! Any line that does not start with `/` is a chat message.

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/join <room>`: switch to a room.
    Join {
        /// Target room id
        room: String,
    },
    /// `/dm <user>`: switch to the direct room shared with a user.
    Direct {
        /// Other participant's user id
        user: String,
    },
    /// `/retry`: reconnect the current room.
    Retry,
    /// `/rooms`: reload the room list.
    Rooms,
    /// `/quit`: exit.
    Quit,
    /// Plain text to send.
    Message {
        /// Text as typed
        text: String,
    },
    /// Unrecognised command.
    Unknown {
        /// The line as typed
        input: String,
    },
    /// Known command, wrong arguments.
    InvalidArgs {
        /// Command name without the slash
        command: &'static str,
        /// What is wrong
        error: &'static str,
    },
}

/// Parse one input line.
pub fn parse(line: &str) -> Command {
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Command::Message { text: line.to_owned() };
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.next();
    let extra = words.next().is_some();

    match (name, arg, extra) {
        ("join" | "j", Some(room), false) => Command::Join { room: room.to_owned() },
        ("join" | "j", _, _) => {
            Command::InvalidArgs { command: "join", error: "usage: /join <room>" }
        },
        ("dm", Some(user), false) => Command::Direct { user: user.to_owned() },
        ("dm", _, _) => Command::InvalidArgs { command: "dm", error: "usage: /dm <user>" },
        ("retry", None, _) => Command::Retry,
        ("rooms", None, _) => Command::Rooms,
        ("quit" | "q", None, _) => Command::Quit,
        _ => Command::Unknown { input: line.trim().to_owned() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(parse("hello there"), Command::Message { text: "hello there".into() });
    }

    #[test]
    fn join_takes_one_room() {
        assert_eq!(parse("/join downtown"), Command::Join { room: "downtown".into() });
        assert_eq!(parse("/j downtown"), Command::Join { room: "downtown".into() });
        assert!(matches!(parse("/join"), Command::InvalidArgs { command: "join", .. }));
        assert!(matches!(parse("/join a b"), Command::InvalidArgs { command: "join", .. }));
    }

    #[test]
    fn dm_takes_one_user() {
        assert_eq!(parse("/dm bob"), Command::Direct { user: "bob".into() });
        assert!(matches!(parse("/dm"), Command::InvalidArgs { command: "dm", .. }));
    }

    #[test]
    fn bare_commands() {
        assert_eq!(parse("/retry"), Command::Retry);
        assert_eq!(parse("/rooms"), Command::Rooms);
        assert_eq!(parse("/quit"), Command::Quit);
        assert_eq!(parse("  /q"), Command::Quit);
    }

    #[test]
    fn unknown_command() {
        assert_eq!(parse("/dance now"), Command::Unknown { input: "/dance now".into() });
        assert_eq!(parse("/retry please"), Command::Unknown { input: "/retry please".into() });
    }
}
