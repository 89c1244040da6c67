//! Event model matching the website's Event interface.

use serde::{Deserialize, Serialize};

/// A person or crew presenting an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A public event listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub date: String,
    pub time: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_color: Option<String>,
    pub summary: String,
    /// Cached join of organizer names, recomputed on every save
    pub presented_by: String,
    pub organizers: Vec<Organizer>,
    pub featured: bool,
    pub tickets_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsvp_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_opens: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating (no `id`) or updating (with `id`) an event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEventRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub badge_text: Option<String>,
    #[serde(default)]
    pub badge_color: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub presented_by: String,
    #[serde(default)]
    pub organizers: Vec<Organizer>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub tickets_available: bool,
    #[serde(default)]
    pub rsvp_link: Option<String>,
    #[serde(default)]
    pub registration_opens: Option<String>,
}

impl SaveEventRequest {
    /// Normalize the slug, drop blank organizers and recompute `presented_by`.
    ///
    /// A blank slug stays empty so it is reported as missing.
    pub fn normalized(mut self) -> Self {
        self.slug = if self.slug.trim().is_empty() {
            String::new()
        } else {
            normalize_slug(&self.slug)
        };
        self.organizers.retain(|o| !o.name.trim().is_empty());
        for organizer in &mut self.organizers {
            organizer.name = organizer.name.trim().to_string();
        }
        self.presented_by = presented_by(&self.organizers, &self.presented_by);
        self
    }

    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("slug", &self.slug),
            ("date", &self.date),
            ("time", &self.time),
            ("location", &self.location),
            ("summary", &self.summary),
            ("presentedBy", &self.presented_by),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Request body for deleting an event.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteEventRequest {
    #[serde(default)]
    pub slug: String,
}

/// Lowercase and replace every character outside `[a-z0-9-]` with `-`.
pub fn normalize_slug(slug: &str) -> String {
    slug.chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Join non-empty organizer names; keep `fallback` when there are none.
pub fn presented_by(organizers: &[Organizer], fallback: &str) -> String {
    let names: Vec<&str> = organizers
        .iter()
        .map(|o| o.name.trim())
        .filter(|n| !n.is_empty())
        .collect();

    if names.is_empty() {
        fallback.trim().to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organizer(name: &str) -> Organizer {
        Organizer {
            name: name.to_string(),
            url: None,
        }
    }

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("Summer Event!"), "summer-event-");
        assert_eq!(normalize_slug("Test Night!"), "test-night-");
        assert_eq!(normalize_slug("already-normal-2"), "already-normal-2");
        assert_eq!(normalize_slug("Café_Nuit"), "caf--nuit");
    }

    #[test]
    fn test_normalize_slug_idempotent() {
        for input in ["Summer Event!", "A/B C", "ÜBER__rave", "--x--", ""] {
            let once = normalize_slug(input);
            assert_eq!(normalize_slug(&once), once);
        }
    }

    #[test]
    fn test_presented_by_joins_names() {
        let organizers = vec![organizer("Nightshift"), organizer("  "), organizer("Low Tide")];
        assert_eq!(presented_by(&organizers, "ignored"), "Nightshift, Low Tide");
    }

    #[test]
    fn test_presented_by_fallback() {
        assert_eq!(presented_by(&[], " The Collective "), "The Collective");
        assert_eq!(presented_by(&[organizer("")], ""), "");
    }

    #[test]
    fn test_normalized_request() {
        let request = SaveEventRequest {
            slug: "Test Night!".to_string(),
            presented_by: "stale value".to_string(),
            organizers: vec![organizer(" Nightshift "), organizer("")],
            ..Default::default()
        }
        .normalized();

        assert_eq!(request.slug, "test-night-");
        assert_eq!(request.presented_by, "Nightshift");
        assert_eq!(request.organizers, vec![organizer("Nightshift")]);
    }

    #[test]
    fn test_normalized_slug_keeps_surrounding_whitespace() {
        let request = SaveEventRequest {
            slug: " Test Night! ".to_string(),
            ..Default::default()
        }
        .normalized();
        assert_eq!(request.slug, "-test-night--");

        let blank = SaveEventRequest {
            slug: "   ".to_string(),
            ..Default::default()
        }
        .normalized();
        assert_eq!(blank.slug, "");
        assert!(blank.missing_fields().contains(&"slug"));
    }

    #[test]
    fn test_missing_fields() {
        let request = SaveEventRequest {
            title: "Night".to_string(),
            slug: "night".to_string(),
            date: "2026-11-01".to_string(),
            ..Default::default()
        };
        assert_eq!(
            request.missing_fields(),
            vec!["time", "location", "summary", "presentedBy"]
        );
    }
}
