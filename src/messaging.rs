//! Message threads with vendors and support.
//!
//! Every thread opens with a greeting. Each message the buyer sends is
//! answered with a canned reply once the reply timer fires; the
//! [`Storefront`](crate::Storefront) schedules those timers and feeds them
//! back through [`Thread::receive_reply`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorefrontError};
use crate::models::MessageId;

/// First message in a vendor thread.
pub const VENDOR_GREETING: &str = "-----BEGIN PGP SIGNED MESSAGE-----\nSecure connection established. How can I assist you with your order today?";

/// Reply to every message sent to a vendor.
pub const VENDOR_REPLY: &str =
    "Message received. Decrypting... I will review your request and get back to you shortly.";

/// First message in the support thread.
pub const SUPPORT_GREETING: &str =
    "Welcome to Secure Support. All communications are PGP encrypted. How can we assist you today?";

/// Reply to every message sent to support.
pub const SUPPORT_REPLY: &str = "Thank you. An agent will review your encrypted ticket shortly. Average response time: < 15 mins.";

/// The other side of a thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Correspondent {
    /// A vendor, by display name.
    Vendor(String),
    /// Marketplace support.
    Support,
}

impl Correspondent {
    /// Message a new thread starts with.
    #[inline]
    #[must_use]
    pub const fn greeting(&self) -> &'static str {
        match *self {
            Self::Vendor(_) => VENDOR_GREETING,
            Self::Support => SUPPORT_GREETING,
        }
    }

    /// Canned answer to a buyer message.
    #[inline]
    #[must_use]
    pub const fn reply(&self) -> &'static str {
        match *self {
            Self::Vendor(_) => VENDOR_REPLY,
            Self::Support => SUPPORT_REPLY,
        }
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The signed-in buyer.
    Buyer,
    /// The vendor or support agent.
    Correspondent,
}

/// A single message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Generated identifier.
    pub id: MessageId,
    /// Author.
    pub sender: Sender,
    /// Body text.
    pub text: String,
    /// When the message was added to the thread.
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped with the current time.
    fn new(sender: Sender, text: String) -> Self {
        Self {
            id: MessageId::generate(),
            sender,
            text,
            sent_at: Utc::now(),
        }
    }
}

/// A conversation with one correspondent.
#[derive(Debug, Clone)]
pub struct Thread {
    /// Other side of the conversation.
    with: Correspondent,
    /// Messages, oldest first.
    messages: Vec<Message>,
    /// Buyer messages still waiting for their reply.
    awaiting: u32,
}

impl Thread {
    /// Opens a thread holding only the correspondent's greeting.
    #[inline]
    #[must_use]
    pub fn new(with: Correspondent) -> Self {
        let greeting = Message::new(Sender::Correspondent, with.greeting().to_owned());
        Self {
            with,
            messages: vec![greeting],
            awaiting: 0,
        }
    }

    /// The other side of the conversation.
    #[inline]
    #[must_use]
    pub const fn correspondent(&self) -> &Correspondent {
        &self.with
    }

    /// Messages, oldest first.
    #[inline]
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of buyer messages not yet answered.
    #[inline]
    #[must_use]
    pub const fn awaiting_replies(&self) -> u32 {
        self.awaiting
    }

    /// Appends a buyer message.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::EmptyMessage`] for blank text; the thread
    /// is unchanged.
    #[inline]
    pub fn post(&mut self, text: &str) -> Result<Message> {
        let body = text.trim();
        if body.is_empty() {
            return Err(StorefrontError::EmptyMessage);
        }
        self.awaiting = self.awaiting.saturating_add(1);
        tracing::debug!(with = ?self.with, awaiting = self.awaiting, "message sent");
        Ok(self.push(Sender::Buyer, body.to_owned()))
    }

    /// Appends the correspondent's reply if a buyer message is waiting.
    #[inline]
    pub fn receive_reply(&mut self) -> Option<Message> {
        self.awaiting = self.awaiting.checked_sub(1)?;
        Some(self.push(Sender::Correspondent, self.with.reply().to_owned()))
    }

    /// Drops every outstanding reply, returning how many there were.
    #[inline]
    pub const fn cancel_replies(&mut self) -> u32 {
        let dropped = self.awaiting;
        self.awaiting = 0;
        dropped
    }

    /// Appends a message and returns a copy of it.
    fn push(&mut self, sender: Sender, text: String) -> Message {
        let message = Message::new(sender, text);
        self.messages.push(message.clone());
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor() -> Correspondent {
        Correspondent::Vendor("Alpha".to_owned())
    }

    #[test]
    fn thread_opens_with_greeting() {
        let thread = Thread::new(Correspondent::Support);
        assert_eq!(thread.messages().len(), 1);
        assert_eq!(thread.messages()[0].sender, Sender::Correspondent);
        assert_eq!(thread.messages()[0].text, SUPPORT_GREETING);
    }

    #[test]
    fn each_message_earns_one_reply() {
        let mut thread = Thread::new(vendor());
        let sent = thread.post("  is the 1g tier in stock?  ").unwrap();
        assert_eq!(sent.text, "is the 1g tier in stock?");
        assert_eq!(thread.awaiting_replies(), 1);

        let reply = thread.receive_reply().unwrap();
        assert_eq!(reply.sender, Sender::Correspondent);
        assert_eq!(reply.text, VENDOR_REPLY);
        assert!(thread.receive_reply().is_none());
        assert_eq!(thread.messages().len(), 3);
    }

    #[test]
    fn blank_message_is_refused() {
        let mut thread = Thread::new(vendor());
        assert!(matches!(thread.post("   "), Err(StorefrontError::EmptyMessage)));
        assert_eq!(thread.messages().len(), 1);
        assert_eq!(thread.awaiting_replies(), 0);
    }

    #[test]
    fn cancelled_replies_never_arrive() {
        let mut thread = Thread::new(vendor());
        let _first = thread.post("hello").unwrap();
        let _second = thread.post("anyone?").unwrap();
        assert_eq!(thread.cancel_replies(), 2);
        assert!(thread.receive_reply().is_none());
    }
}
