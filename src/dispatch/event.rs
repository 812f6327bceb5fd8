//! Parsed textual commands and their accumulated replies.

/// One inbound line of text, parsed into a command and its arguments.
///
/// Handlers append replies; the transport drains them once the dispatcher
/// returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    /// First whitespace-delimited token of the line
    pub command: String,
    /// Everything after the command, leading whitespace removed
    pub rest: String,
    /// Whitespace tokens of `rest`
    pub args: Vec<String>,
    /// Label of the transport client the line came from
    pub origin: Option<String>,
    replies: Vec<String>,
    done: bool,
}

impl Event {
    pub fn parse(text: &str) -> Self {
        let line = text.trim_end_matches(['\r', '\n']).trim_start();
        let (command, rest) = match line.find(char::is_whitespace) {
            Some(idx) => (&line[..idx], line[idx..].trim_start()),
            None => (line, ""),
        };
        Self {
            command: command.to_string(),
            rest: rest.to_string(),
            args: rest.split_whitespace().map(str::to_string).collect(),
            origin: None,
            replies: Vec::new(),
            done: false,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Append a reply line
    pub fn reply(&mut self, text: impl Into<String>) {
        self.replies.push(text.into());
    }

    /// Acknowledge with `ok` and mark the event complete
    pub fn ok(&mut self) {
        self.reply("ok");
        self.complete();
    }

    pub fn complete(&mut self) {
        self.done = true;
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn replies(&self) -> &[String] {
        &self.replies
    }

    pub fn take_replies(&mut self) -> Vec<String> {
        std::mem::take(&mut self.replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_and_args() {
        let event = Event::parse("log  buy milk\r\n");
        assert_eq!(event.command, "log");
        assert_eq!(event.rest, "buy milk");
        assert_eq!(event.args, vec!["buy".to_string(), "milk".to_string()]);
    }

    #[test]
    fn test_parse_bare_command() {
        let event = Event::parse("cmd");
        assert_eq!(event.command, "cmd");
        assert_eq!(event.rest, "");
        assert!(event.args.is_empty());
    }

    #[test]
    fn test_parse_empty_line() {
        let event = Event::parse("   \n");
        assert_eq!(event.command, "");
        assert!(event.args.is_empty());
    }

    #[test]
    fn test_ok_completes() {
        let mut event = Event::parse("tdo x").with_origin("console");
        assert!(!event.is_done());
        event.reply("first");
        event.ok();
        assert!(event.is_done());
        assert_eq!(event.replies(), ["first".to_string(), "ok".to_string()]);
        assert_eq!(event.take_replies().len(), 2);
        assert!(event.replies().is_empty());
        assert_eq!(event.origin.as_deref(), Some("console"));
    }
}
