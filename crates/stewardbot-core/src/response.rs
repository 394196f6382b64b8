//! Outbound replies handed back to the transport

use std::fmt;

/// Where a reply is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Posted to `origin`, optionally addressed to one identity
    Public {
        origin: String,
        addressee: Option<String>,
    },
    /// Sent only to `recipient`
    Private { recipient: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub delivery: Delivery,
    pub text: String,
}

impl Response {
    /// Reply in `origin`, addressed to `addressee`.
    pub fn to(origin: impl Into<String>, addressee: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            delivery: Delivery::Public {
                origin: origin.into(),
                addressee: Some(addressee.into()),
            },
            text: text.into(),
        }
    }

    /// Unaddressed message in `origin`.
    pub fn broadcast(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            delivery: Delivery::Public {
                origin: origin.into(),
                addressee: None,
            },
            text: text.into(),
        }
    }

    pub fn private(recipient: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            delivery: Delivery::Private {
                recipient: recipient.into(),
            },
            text: text.into(),
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self.delivery, Delivery::Private { .. })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.delivery {
            Delivery::Public {
                origin,
                addressee: Some(addressee),
            } => write!(f, "[{}] {}: {}", origin, addressee, self.text),
            Delivery::Public {
                origin,
                addressee: None,
            } => write!(f, "[{}] {}", origin, self.text),
            Delivery::Private { recipient } => write!(f, "[private -> {}] {}", recipient, self.text),
        }
    }
}
