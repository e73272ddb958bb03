use tokio::sync::broadcast;

use crate::domains::message::Message;

/// Append-only chat history. Every appended message is also broadcast so a
/// front end can render it before the turn finishes.
pub struct Transcript {
    messages: Vec<Message>,
    events: broadcast::Sender<Message>,
}

impl Transcript {
    pub fn new(events: broadcast::Sender<Message>) -> Self {
        Self {
            messages: Vec::new(),
            events,
        }
    }

    pub fn push(&mut self, message: Message) {
        // No subscribers is fine; the history is the source of truth.
        let _ = self.events.send(message.clone());
        self.messages.push(message);
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn since(&self, start: usize) -> Vec<Message> {
        self.messages.get(start..).map(<[Message]>::to_vec).unwrap_or_default()
    }
}
