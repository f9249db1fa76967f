//! Push-notification campaigns and templates.
//!
//! Campaigns and their delivery statistics are owned by the backend. The
//! dashboard creates, sends and deletes them and displays the aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CampaignId, CampaignStatus, TemplateId, UserId};

/// Invalid campaign or template input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CampaignError {
    #[error("a custom audience needs at least one user")]
    EmptyCustomAudience,
    #[error("segment name cannot be empty")]
    EmptySegment,
    #[error("{0} cannot be empty")]
    MissingField(&'static str),
    #[error("scheduled send time is in the past")]
    ScheduleInPast,
}

/// Who a campaign is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetAudience {
    /// Every user with push enabled.
    All,
    /// A named backend segment, e.g. `vip` or `lapsed_90d`.
    Segment { segment: String },
    /// An explicit list of users.
    Custom {
        #[serde(rename = "userIds")]
        user_ids: Vec<UserId>,
    },
}

impl TargetAudience {
    /// Reject audiences that can never match anyone.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank segment or an empty custom list.
    pub fn validate(&self) -> Result<(), CampaignError> {
        match self {
            Self::All => Ok(()),
            Self::Segment { segment } if segment.trim().is_empty() => {
                Err(CampaignError::EmptySegment)
            }
            Self::Segment { .. } => Ok(()),
            Self::Custom { user_ids } if user_ids.is_empty() => {
                Err(CampaignError::EmptyCustomAudience)
            }
            Self::Custom { .. } => Ok(()),
        }
    }
}

/// The message itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_link: Option<String>,
}

impl NotificationContent {
    fn validate(&self) -> Result<(), CampaignError> {
        if self.title.trim().is_empty() {
            return Err(CampaignError::MissingField("title"));
        }
        if self.body.trim().is_empty() {
            return Err(CampaignError::MissingField("body"));
        }
        Ok(())
    }
}

/// When a campaign goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CampaignSchedule {
    #[default]
    Immediate,
    At {
        #[serde(rename = "sendAt")]
        send_at: DateTime<Utc>,
    },
}

/// A campaign as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCampaign {
    pub id: CampaignId,
    pub name: String,
    pub content: NotificationContent,
    pub audience: TargetAudience,
    pub schedule: CampaignSchedule,
    pub status: CampaignStatus,
    #[serde(default)]
    pub template_id: Option<TemplateId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

/// A create-campaign request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub name: String,
    pub content: NotificationContent,
    pub audience: TargetAudience,
    #[serde(default)]
    pub schedule: CampaignSchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
}

impl NewCampaign {
    /// Check the request before it is sent.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), CampaignError> {
        if self.name.trim().is_empty() {
            return Err(CampaignError::MissingField("name"));
        }
        self.content.validate()?;
        self.audience.validate()?;
        if let CampaignSchedule::At { send_at } = self.schedule
            && send_at <= now
        {
            return Err(CampaignError::ScheduleInPast);
        }
        Ok(())
    }
}

/// Delivery statistics for one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStats {
    pub targeted: u64,
    pub sent: u64,
    pub delivered: u64,
    pub opened: u64,
    pub clicked: u64,
    pub failed: u64,
}

/// A reusable message template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplate {
    pub id: TemplateId,
    pub name: String,
    pub content: NotificationContent,
    pub created_at: DateTime<Utc>,
}

/// A create-template request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    pub content: NotificationContent,
}

impl NewTemplate {
    /// # Errors
    ///
    /// Returns the first blank required field.
    pub fn validate(&self) -> Result<(), CampaignError> {
        if self.name.trim().is_empty() {
            return Err(CampaignError::MissingField("name"));
        }
        self.content.validate()
    }
}

/// Dashboard-wide notification aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOverview {
    pub total_campaigns: u64,
    pub sent_last_30_days: u64,
    pub subscribers: u64,
    pub delivered: u64,
    pub opened: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn content() -> NotificationContent {
        NotificationContent {
            title: "The Autumn Edit".to_string(),
            body: "New arrivals, now in boutique.".to_string(),
            image_url: None,
            deep_link: Some("/products?category=new".to_string()),
        }
    }

    #[test]
    fn test_audience_wire_format() {
        assert_eq!(
            serde_json::to_value(TargetAudience::All).unwrap(),
            serde_json::json!({ "type": "all" })
        );
        assert_eq!(
            serde_json::to_value(TargetAudience::Segment {
                segment: "vip".to_string()
            })
            .unwrap(),
            serde_json::json!({ "type": "segment", "segment": "vip" })
        );
        let custom: TargetAudience =
            serde_json::from_str(r#"{"type":"custom","userIds":[4,9]}"#).unwrap();
        assert_eq!(
            custom,
            TargetAudience::Custom {
                user_ids: vec![UserId::new(4), UserId::new(9)]
            }
        );
    }

    #[test]
    fn test_audience_mixed_shape_is_rejected() {
        // A segment tag without its segment field does not parse.
        let result = serde_json::from_str::<TargetAudience>(r#"{"type":"segment","userIds":[1]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_audience_validation() {
        assert!(TargetAudience::All.validate().is_ok());
        assert_eq!(
            TargetAudience::Custom { user_ids: vec![] }.validate(),
            Err(CampaignError::EmptyCustomAudience)
        );
        assert_eq!(
            TargetAudience::Segment {
                segment: " ".to_string()
            }
            .validate(),
            Err(CampaignError::EmptySegment)
        );
    }

    #[test]
    fn test_schedule_wire_format() {
        assert_eq!(
            serde_json::to_value(CampaignSchedule::Immediate).unwrap(),
            serde_json::json!({ "type": "immediate" })
        );
        let at: CampaignSchedule =
            serde_json::from_str(r#"{"type":"at","sendAt":"2026-11-01T09:00:00Z"}"#).unwrap();
        assert!(matches!(at, CampaignSchedule::At { .. }));
    }

    #[test]
    fn test_new_campaign_validation() {
        let now = Utc::now();
        let mut campaign = NewCampaign {
            name: "Autumn".to_string(),
            content: content(),
            audience: TargetAudience::All,
            schedule: CampaignSchedule::Immediate,
            template_id: None,
        };
        assert!(campaign.validate(now).is_ok());

        campaign.schedule = CampaignSchedule::At {
            send_at: now - Duration::hours(1),
        };
        assert_eq!(campaign.validate(now), Err(CampaignError::ScheduleInPast));

        campaign.schedule = CampaignSchedule::Immediate;
        campaign.content.body = String::new();
        assert_eq!(
            campaign.validate(now),
            Err(CampaignError::MissingField("body"))
        );
    }

    #[test]
    fn test_new_campaign_schedule_defaults_to_immediate() {
        let campaign: NewCampaign = serde_json::from_value(serde_json::json!({
            "name": "Flash",
            "content": { "title": "Hi", "body": "There" },
            "audience": { "type": "all" }
        }))
        .unwrap();
        assert_eq!(campaign.schedule, CampaignSchedule::Immediate);
    }
}
