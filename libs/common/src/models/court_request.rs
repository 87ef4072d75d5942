//! Court request model and related functionality

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::PublicUser;

/// Lifecycle state of a court request
///
/// `Pending` is the only initial state. The other three are assigned by an
/// administrator and are terminal for the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RequestStatus::Pending),
            "APPROVED" => Ok(RequestStatus::Approved),
            "REJECTED" => Ok(RequestStatus::Rejected),
            "CANCELLED" => Ok(RequestStatus::Cancelled),
            other => Err(format!("Unknown request status: {}", other)),
        }
    }
}

/// An administrator's decision on a request: the valid targets of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
    Cancel,
}

impl Decision {
    pub fn status(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
            Decision::Cancel => RequestStatus::Cancelled,
        }
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<RequestStatus>()? {
            RequestStatus::Approved => Ok(Decision::Approve),
            RequestStatus::Rejected => Ok(Decision::Reject),
            RequestStatus::Cancelled => Ok(Decision::Cancel),
            RequestStatus::Pending => {
                Err("Status must be one of APPROVED, REJECTED or CANCELLED".to_string())
            }
        }
    }
}

/// Court request entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub status: RequestStatus,
    pub admin_observation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CourtRequest {
    /// A new request as submitted by its owner
    pub fn pending(user_id: Uuid, date: NaiveDate, start_time: String, end_time: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            start_time,
            end_time,
            status: RequestStatus::Pending,
            admin_observation: None,
            created_at: Utc::now(),
        }
    }
}

/// A court request joined with the public data of its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestWithOwner {
    #[serde(flatten)]
    pub request: CourtRequest,
    pub user: PublicUser,
}

/// Filters accepted by the administrator listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    /// Exact status match
    pub status: Option<RequestStatus>,
    /// Inclusive lower bound
    pub date_from: Option<NaiveDate>,
    /// Inclusive of the whole named day
    pub date_to: Option<NaiveDate>,
}

impl RequestFilter {
    /// Exclusive upper bound: the day after `date_to`
    pub fn date_before(&self) -> Option<NaiveDate> {
        self.date_to.and_then(|day| day.succ_opt())
    }

    pub fn matches(&self, request: &CourtRequest) -> bool {
        if let Some(status) = self.status {
            if request.status != status {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if request.date < from {
                return false;
            }
        }
        if let Some(before) = self.date_before() {
            if request.date >= before {
                return false;
            }
        }
        true
    }
}
