//! Push-notification campaign and template handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use maison_core::notifications::{
    CampaignSchedule, CampaignStats, NewCampaign, NewTemplate, NotificationCampaign,
    NotificationContent, NotificationOverview, NotificationTemplate, TargetAudience,
};
use maison_core::{AccessToken, CampaignId, CampaignStatus, TemplateId, Toast};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::routes::after_mutation;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Campaign row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignView {
    pub id: CampaignId,
    pub name: String,
    pub content: NotificationContent,
    pub audience: TargetAudience,
    pub schedule: CampaignSchedule,
    pub status: CampaignStatus,
    pub status_label: &'static str,
    pub sendable: bool,
    pub template_id: Option<TemplateId>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl From<NotificationCampaign> for CampaignView {
    fn from(campaign: NotificationCampaign) -> Self {
        Self {
            status_label: campaign.status.label(),
            sendable: campaign.status.is_sendable(),
            id: campaign.id,
            name: campaign.name,
            content: campaign.content,
            audience: campaign.audience,
            schedule: campaign.schedule,
            status: campaign.status,
            template_id: campaign.template_id,
            created_at: campaign.created_at,
            sent_at: campaign.sent_at,
        }
    }
}

/// Campaign list with an optional toast.
#[derive(Debug, Serialize)]
pub struct CampaignsView {
    pub campaigns: Vec<CampaignView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
}

/// One campaign with its delivery statistics.
#[derive(Debug, Serialize)]
pub struct CampaignDetailView {
    pub campaign: CampaignView,
    pub stats: CampaignStats,
}

/// Template list with an optional toast.
#[derive(Debug, Serialize)]
pub struct TemplatesView {
    pub templates: Vec<NotificationTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
}

// =============================================================================
// Campaigns
// =============================================================================

/// Dashboard-wide aggregates.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn overview(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<NotificationOverview>> {
    let overview = state.api().notification_overview(&admin.token).await?;
    Ok(Json(overview))
}

/// Campaign list.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn campaigns(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<CampaignsView>> {
    let campaigns = state.api().list_campaigns(&admin.token).await?;
    Ok(Json(CampaignsView {
        campaigns: campaigns.into_iter().map(CampaignView::from).collect(),
        toast: None,
    }))
}

/// Create a campaign.
#[instrument(skip_all, fields(admin_id = %admin.id, name = %campaign.name))]
pub async fn create_campaign(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Json(campaign): Json<NewCampaign>,
) -> Result<Json<CampaignsView>> {
    campaign
        .validate(Utc::now())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state.api().create_campaign(&admin.token, &campaign).await?;
    let toast = match campaign.schedule {
        CampaignSchedule::Immediate => Toast::success("Campaign created"),
        CampaignSchedule::At { send_at } => Toast::success(format!(
            "Campaign scheduled for {}",
            send_at.format("%Y-%m-%d %H:%M UTC")
        )),
    };
    Ok(refreshed_campaigns(&state, &admin.token, toast).await)
}

/// Campaign detail with delivery statistics.
#[instrument(skip_all, fields(admin_id = %admin.id, campaign_id = %id))]
pub async fn show_campaign(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<CampaignId>,
) -> Result<Json<CampaignDetailView>> {
    let (campaign, stats) = tokio::try_join!(
        state.api().get_campaign(&admin.token, id),
        state.api().campaign_stats(&admin.token, id)
    )
    .map_err(|e| {
        if e.is_not_found() {
            AppError::NotFound(format!("campaign {id}"))
        } else {
            AppError::Api(e)
        }
    })?;

    Ok(Json(CampaignDetailView {
        campaign: CampaignView::from(campaign),
        stats,
    }))
}

/// Delivery statistics only.
#[instrument(skip_all, fields(admin_id = %admin.id, campaign_id = %id))]
pub async fn campaign_stats(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<CampaignId>,
) -> Result<Json<CampaignStats>> {
    let stats = state.api().campaign_stats(&admin.token, id).await?;
    Ok(Json(stats))
}

/// Send a campaign now.
#[instrument(skip_all, fields(admin_id = %admin.id, campaign_id = %id))]
pub async fn send_campaign(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<CampaignId>,
) -> Result<Json<CampaignsView>> {
    state.api().send_campaign(&admin.token, id).await?;
    info!("Campaign sent by operator");
    Ok(refreshed_campaigns(&state, &admin.token, Toast::success("Campaign is sending")).await)
}

/// Delete a campaign.
#[instrument(skip_all, fields(admin_id = %admin.id, campaign_id = %id))]
pub async fn delete_campaign(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<CampaignId>,
) -> Result<Json<CampaignsView>> {
    state.api().delete_campaign(&admin.token, id).await?;
    info!("Campaign deleted");
    Ok(refreshed_campaigns(&state, &admin.token, Toast::success("Campaign deleted")).await)
}

async fn refreshed_campaigns(
    state: &AppState,
    token: &AccessToken,
    toast: Toast,
) -> Json<CampaignsView> {
    let campaigns =
        after_mutation("campaigns", state.api().list_campaigns(token).await).unwrap_or_default();
    Json(CampaignsView {
        campaigns: campaigns.into_iter().map(CampaignView::from).collect(),
        toast: Some(toast),
    })
}

// =============================================================================
// Templates
// =============================================================================

/// Template list.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn templates(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<TemplatesView>> {
    let templates = state.api().list_templates(&admin.token).await?;
    Ok(Json(TemplatesView {
        templates,
        toast: None,
    }))
}

/// Create a template.
#[instrument(skip_all, fields(admin_id = %admin.id, name = %template.name))]
pub async fn create_template(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Json(template): Json<NewTemplate>,
) -> Result<Json<TemplatesView>> {
    template
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state.api().create_template(&admin.token, &template).await?;
    Ok(refreshed_templates(&state, &admin.token, Toast::success("Template saved")).await)
}

/// Delete a template.
#[instrument(skip_all, fields(admin_id = %admin.id, template_id = %id))]
pub async fn delete_template(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<TemplateId>,
) -> Result<Json<TemplatesView>> {
    state.api().delete_template(&admin.token, id).await?;
    Ok(refreshed_templates(&state, &admin.token, Toast::success("Template deleted")).await)
}

async fn refreshed_templates(
    state: &AppState,
    token: &AccessToken,
    toast: Toast,
) -> Json<TemplatesView> {
    let templates =
        after_mutation("templates", state.api().list_templates(token).await).unwrap_or_default();
    Json(TemplatesView {
        templates,
        toast: Some(toast),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_campaign_view_flags_sendable() {
        let campaign: NotificationCampaign = serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "Autumn",
            "content": { "title": "The Autumn Edit", "body": "Now in boutique." },
            "audience": { "type": "segment", "segment": "vip" },
            "schedule": { "type": "immediate" },
            "status": "sent",
            "createdAt": "2026-10-01T09:00:00Z",
            "sentAt": "2026-10-01T09:05:00Z"
        }))
        .unwrap();

        let view = CampaignView::from(campaign);
        assert!(!view.sendable);
        assert_eq!(view.status_label, "Sent");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["audience"]["type"], "segment");
        assert_eq!(json["statusLabel"], "Sent");
    }
}
