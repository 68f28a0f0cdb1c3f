use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

use crate::error::RelayError;

/// One message seen in a chat.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub chat_id: String,
    pub sender: String,
    pub body: String,
    pub from_self: bool,
    pub is_group: bool,
    pub timestamp: DateTime<Utc>,
}

/// Where messages come from and replies go to.
#[async_trait]
pub trait ChatTransport: Send {
    /// Next inbound message, or `None` when the source is exhausted.
    async fn next_message(&mut self) -> Result<Option<InboundMessage>, RelayError>;

    /// Up to `limit` most recent messages of a chat, oldest first, that
    /// arrived before `before`.
    async fn recent_messages(
        &mut self,
        chat_id: &str,
        before: &InboundMessage,
        limit: usize,
    ) -> Result<Vec<InboundMessage>, RelayError>;

    async fn reply(&mut self, to: &InboundMessage, text: &str) -> Result<(), RelayError>;
}

const CONSOLE_CHAT: &str = "console";
const KEPT_LINES: usize = 50;

/// Reads one message per stdin line and prints replies on stdout.
pub struct ConsoleTransport {
    lines: Lines<BufReader<Stdin>>,
    stdout: Stdout,
    seen: VecDeque<InboundMessage>,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            stdout: tokio::io::stdout(),
            seen: VecDeque::with_capacity(KEPT_LINES),
        }
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>, RelayError> {
        let Some(line) = self.lines.next_line().await? else {
            return Ok(None);
        };

        let message = InboundMessage {
            chat_id: CONSOLE_CHAT.to_string(),
            sender: "stdin".to_string(),
            body: line,
            from_self: false,
            is_group: false,
            timestamp: Utc::now(),
        };
        if self.seen.len() == KEPT_LINES {
            self.seen.pop_front();
        }
        self.seen.push_back(message.clone());
        Ok(Some(message))
    }

    async fn recent_messages(
        &mut self,
        chat_id: &str,
        before: &InboundMessage,
        limit: usize,
    ) -> Result<Vec<InboundMessage>, RelayError> {
        Ok(recent_before(self.seen.iter(), chat_id, before, limit))
    }

    async fn reply(&mut self, _to: &InboundMessage, text: &str) -> Result<(), RelayError> {
        self.stdout.write_all(text.as_bytes()).await?;
        self.stdout.write_all(b"\n").await?;
        self.stdout.flush().await?;
        Ok(())
    }
}

/// The `limit` messages of `chat_id` preceding `before`, oldest first.
pub fn recent_before<'a>(
    history: impl DoubleEndedIterator<Item = &'a InboundMessage>,
    chat_id: &str,
    before: &InboundMessage,
    limit: usize,
) -> Vec<InboundMessage> {
    let mut recent: Vec<InboundMessage> = history
        .rev()
        .skip_while(|m| *m != before)
        .skip(1)
        .filter(|m| m.chat_id == chat_id)
        .take(limit)
        .cloned()
        .collect();
    recent.reverse();
    recent
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(body: &str, chat: &str) -> InboundMessage {
        InboundMessage {
            chat_id: chat.into(),
            sender: "someone".into(),
            body: body.into(),
            from_self: false,
            is_group: false,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn recent_before_keeps_chat_order_and_limit() {
        let history = vec![
            msg("one", "a"),
            msg("other chat", "b"),
            msg("two", "a"),
            msg("three", "a"),
            msg("@ai now", "a"),
            msg("later", "a"),
        ];
        let current = history[4].clone();

        let recent = recent_before(history.iter(), "a", &current, 2);
        let bodies: Vec<&str> = recent.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["two", "three"]);

        let all = recent_before(history.iter(), "a", &current, 10);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].body, "one");
    }
}
