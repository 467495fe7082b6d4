//! Status and role enums for the persisted entities
//!
//! Stored as lowercase text; the database carries matching CHECK
//! constraints so rows written outside this process stay in range.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Conversation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Open,
    Pending,
    Closed,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Pending => "pending",
            Self::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "open" => Ok(Self::Open),
            "pending" => Ok(Self::Pending),
            "closed" => Ok(Self::Closed),
            _ => Err(ValidationError::InvalidVariant {
                field: "conversation status",
                value: value.to_owned(),
            }),
        }
    }
}

/// Sales lead status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Won,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "qualified" => Ok(Self::Qualified),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            _ => Err(ValidationError::InvalidVariant {
                field: "lead status",
                value: value.to_owned(),
            }),
        }
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ValidationError::InvalidVariant {
                field: "order status",
                value: value.to_owned(),
            }),
        }
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    User,
    Agent,
    System,
}

impl MessageSender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "user" => Ok(Self::User),
            "agent" => Ok(Self::Agent),
            "system" => Ok(Self::System),
            _ => Err(ValidationError::InvalidVariant {
                field: "sender",
                value: value.to_owned(),
            }),
        }
    }
}

/// Message direction relative to the business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Incoming,
    Outgoing,
}

impl MessageDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "incoming" => Ok(Self::Incoming),
            "outgoing" => Ok(Self::Outgoing),
            _ => Err(ValidationError::InvalidVariant {
                field: "direction",
                value: value.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_text() {
        for status in [
            ConversationStatus::Open,
            ConversationStatus::Pending,
            ConversationStatus::Closed,
        ] {
            assert_eq!(ConversationStatus::parse(status.as_str()).unwrap(), status);
        }

        for status in [
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::Qualified,
            LeadStatus::Won,
            LeadStatus::Lost,
        ] {
            assert_eq!(LeadStatus::parse(status.as_str()).unwrap(), status);
        }

        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn rejects_unknown_variants() {
        assert!(ConversationStatus::parse("archived").is_err());
        assert!(LeadStatus::parse("interested").is_err());
        assert!(OrderStatus::parse("returned").is_err());
        assert!(MessageSender::parse("bot").is_err());
        assert!(MessageDirection::parse("inbound").is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&LeadStatus::Won).unwrap();
        assert_eq!(json, "\"won\"");

        let parsed: MessageSender = serde_json::from_str("\"agent\"").unwrap();
        assert_eq!(parsed, MessageSender::Agent);
    }
}
