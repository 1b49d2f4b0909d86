use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CivicError;

// --- Geo Types ---

/// A WGS84 point. Field order follows the storage convention: (longitude, latitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

// --- Issue lifecycle ---

/// Review lifecycle of a reported issue. Every state is reachable from every
/// other state through the same transition operation; there is no terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "issue_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    Reported,
    InProgress,
    Resolved,
    Rejected,
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Reported => "REPORTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

impl FromStr for IssueStatus {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REPORTED" => Ok(Self::Reported),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "RESOLVED" => Ok(Self::Resolved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(CivicError::InvalidStatus(other.to_string())),
        }
    }
}

// --- Verification ---

/// Authenticity verdict of the evidence check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "verdict_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictStatus {
    Real,
    Fake,
    Uncertain,
}

impl FromStr for VerdictStatus {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REAL" => Ok(Self::Real),
            "FAKE" => Ok(Self::Fake),
            "UNCERTAIN" => Ok(Self::Uncertain),
            other => Err(CivicError::InvalidStatus(other.to_string())),
        }
    }
}

/// Outcome of the Evidence Verifier: status, confidence in [0, 1], and a short
/// human-readable explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub confidence: f64,
    pub analysis: String,
}

impl Verdict {
    pub fn uncertain(analysis: impl Into<String>) -> Self {
        Self {
            status: VerdictStatus::Uncertain,
            confidence: 0.0,
            analysis: analysis.into(),
        }
    }
}

// --- Users ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}
