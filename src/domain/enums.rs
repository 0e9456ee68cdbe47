//! Fixed enumerations shared across the domain.

use serde::{Deserialize, Serialize};

/// Category assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    Complaint,
    DataChange,
    Consultation,
    Claim,
    AppMalfunction,
    Fraud,
    Spam,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complaint => "complaint",
            Self::DataChange => "data_change",
            Self::Consultation => "consultation",
            Self::Claim => "claim",
            Self::AppMalfunction => "app_malfunction",
            Self::Fraud => "fraud",
            Self::Spam => "spam",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "complaint" => Some(Self::Complaint),
            "data_change" => Some(Self::DataChange),
            "consultation" => Some(Self::Consultation),
            "claim" => Some(Self::Claim),
            "app_malfunction" => Some(Self::AppMalfunction),
            "fraud" => Some(Self::Fraud),
            "spam" => Some(Self::Spam),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    KZ,
    ENG,
    RU,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KZ => "KZ",
            Self::ENG => "ENG",
            Self::RU => "RU",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "KZ" => Some(Self::KZ),
            "ENG" => Some(Self::ENG),
            "RU" => Some(Self::RU),
            _ => None,
        }
    }
}

/// Customer tier. VIP and Priority both require the "VIP" handling skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Mass,
    VIP,
    Priority,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mass => "mass",
            Self::VIP => "vip",
            Self::Priority => "priority",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "mass" => Some(Self::Mass),
            "vip" => Some(Self::VIP),
            "priority" => Some(Self::Priority),
            _ => None,
        }
    }
}

/// Manager seniority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Specialist,
    SeniorSpecialist,
    ChiefSpecialist,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Specialist => "specialist",
            Self::SeniorSpecialist => "senior_specialist",
            Self::ChiefSpecialist => "chief_specialist",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "specialist" => Some(Self::Specialist),
            "senior_specialist" => Some(Self::SeniorSpecialist),
            "chief_specialist" => Some(Self::ChiefSpecialist),
            _ => None,
        }
    }
}

/// Where a ticket's address resolution landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoStatus {
    Pending,
    Resolved,
    Failed,
    Abroad,
}

impl GeoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Failed => "failed",
            Self::Abroad => "abroad",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "resolved" => Some(Self::Resolved),
            "failed" => Some(Self::Failed),
            "abroad" => Some(Self::Abroad),
            _ => None,
        }
    }
}
