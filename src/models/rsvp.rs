//! RSVP model.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Smallest party size accepted for an RSVP.
pub const MIN_GUESTS: i64 = 1;
/// Largest party size accepted for an RSVP.
pub const MAX_GUESTS: i64 = 10;

/// Lifecycle of a single RSVP.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    #[default]
    Confirmed,
    Cancelled,
    Waitlisted,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Confirmed => "confirmed",
            RsvpStatus::Cancelled => "cancelled",
            RsvpStatus::Waitlisted => "waitlisted",
        }
    }

}

impl FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(RsvpStatus::Confirmed),
            "cancelled" => Ok(RsvpStatus::Cancelled),
            "waitlisted" => Ok(RsvpStatus::Waitlisted),
            other => Err(format!("unknown RSVP status '{}'", other)),
        }
    }
}

/// A guest's reservation for an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rsvp {
    pub id: i64,
    pub event_id: i64,
    pub event_slug: String,
    pub name: String,
    pub email: String,
    pub guests: i64,
    pub status: RsvpStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}

/// Request body for the public RSVP form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRsvpRequest {
    #[serde(default)]
    pub event_slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Forms may post the party size as a string or a float
    #[serde(default, deserialize_with = "lenient_guests")]
    pub guests: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for changing an RSVP's status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRsvpStatusRequest {
    pub status: RsvpStatus,
}

/// Public headcount for an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpSummary {
    pub event_slug: String,
    /// Number of non-cancelled RSVPs
    pub count: i64,
    /// Sum of their party sizes
    pub total_guests: i64,
}

/// Accept a party size as an integer, a float (truncated) or a numeric string.
/// Anything else reads as absent.
fn lenient_guests<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }))
}

/// Clamp a requested party size into `[MIN_GUESTS, MAX_GUESTS]`; absent means one.
pub fn clamp_guests(guests: Option<i64>) -> i64 {
    guests.unwrap_or(MIN_GUESTS).clamp(MIN_GUESTS, MAX_GUESTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_guests() {
        assert_eq!(clamp_guests(Some(0)), 1);
        assert_eq!(clamp_guests(Some(15)), 10);
        assert_eq!(clamp_guests(Some(-3)), 1);
        assert_eq!(clamp_guests(Some(4)), 4);
        assert_eq!(clamp_guests(None), 1);
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&RsvpStatus::Waitlisted).unwrap(),
            "\"waitlisted\""
        );
        let parsed: UpdateRsvpStatusRequest =
            serde_json::from_str(r#"{"status":"cancelled"}"#).unwrap();
        assert_eq!(parsed.status, RsvpStatus::Cancelled);
        assert!(serde_json::from_str::<UpdateRsvpStatusRequest>(r#"{"status":"maybe"}"#).is_err());
    }

    #[test]
    fn test_status_str_round_trip() {
        for status in [
            RsvpStatus::Confirmed,
            RsvpStatus::Cancelled,
            RsvpStatus::Waitlisted,
        ] {
            assert_eq!(status.as_str().parse::<RsvpStatus>(), Ok(status));
        }
        assert!("pending".parse::<RsvpStatus>().is_err());
    }

    #[test]
    fn test_guests_read_leniently() {
        let guests = |body: &str| {
            serde_json::from_str::<CreateRsvpRequest>(body)
                .unwrap()
                .guests
        };

        assert_eq!(guests(r#"{"guests":4}"#), Some(4));
        assert_eq!(guests(r#"{"guests":"3"}"#), Some(3));
        assert_eq!(guests(r#"{"guests":" 7 "}"#), Some(7));
        assert_eq!(guests(r#"{"guests":2.5}"#), Some(2));
        assert_eq!(guests(r#"{"guests":"2.9"}"#), Some(2));
        assert_eq!(guests(r#"{"guests":"lots"}"#), None);
        assert_eq!(guests(r#"{"guests":true}"#), None);
        assert_eq!(guests(r#"{"guests":null}"#), None);
        assert_eq!(guests(r#"{}"#), None);

        assert_eq!(clamp_guests(guests(r#"{"guests":"15"}"#)), 10);
        assert_eq!(clamp_guests(guests(r#"{"guests":"lots"}"#)), 1);
    }
}
