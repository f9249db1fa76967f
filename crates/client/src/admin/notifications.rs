//! Push-notification campaign and template endpoints.

use chrono::Utc;
use maison_core::AccessToken;
use maison_core::notifications::{
    CampaignStats, NewCampaign, NewTemplate, NotificationCampaign, NotificationOverview,
    NotificationTemplate,
};
use maison_core::types::{CampaignId, TemplateId};
use reqwest::Method;
use tracing::{info, instrument};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// List campaigns, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip_all)]
    pub async fn list_campaigns(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<NotificationCampaign>, ApiError> {
        self.get("/api/admin/notifications/campaigns", &[], Some(token))
            .await
    }

    /// Get one campaign.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token), fields(campaign_id = %id))]
    pub async fn get_campaign(
        &self,
        token: &AccessToken,
        id: CampaignId,
    ) -> Result<NotificationCampaign, ApiError> {
        self.get(
            &format!("/api/admin/notifications/campaigns/{id}"),
            &[],
            Some(token),
        )
        .await
    }

    /// Create a campaign.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the campaign fails validation, or
    /// error if the API request fails.
    #[instrument(skip(self, token, campaign), fields(name = %campaign.name))]
    pub async fn create_campaign(
        &self,
        token: &AccessToken,
        campaign: &NewCampaign,
    ) -> Result<NotificationCampaign, ApiError> {
        campaign
            .validate(Utc::now())
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let created: NotificationCampaign = self
            .post("/api/admin/notifications/campaigns", campaign, Some(token))
            .await?;
        info!(campaign_id = %created.id, "Campaign created");
        Ok(created)
    }

    /// Ask the backend to send a campaign now.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token), fields(campaign_id = %id))]
    pub async fn send_campaign(&self, token: &AccessToken, id: CampaignId) -> Result<(), ApiError> {
        self.send_empty(
            Method::POST,
            &format!("/api/admin/notifications/campaigns/{id}/send"),
            Some(token),
        )
        .await?;
        info!("Campaign send requested");
        Ok(())
    }

    /// Delete a campaign.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token), fields(campaign_id = %id))]
    pub async fn delete_campaign(&self, token: &AccessToken, id: CampaignId) -> Result<(), ApiError> {
        self.delete(
            &format!("/api/admin/notifications/campaigns/{id}"),
            Some(token),
        )
        .await
    }

    /// Delivery statistics for one campaign.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token), fields(campaign_id = %id))]
    pub async fn campaign_stats(
        &self,
        token: &AccessToken,
        id: CampaignId,
    ) -> Result<CampaignStats, ApiError> {
        self.get(
            &format!("/api/admin/notifications/campaigns/{id}/stats"),
            &[],
            Some(token),
        )
        .await
    }

    /// List templates.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip_all)]
    pub async fn list_templates(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<NotificationTemplate>, ApiError> {
        self.get("/api/admin/notifications/templates", &[], Some(token))
            .await
    }

    /// Create a template.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if a required field is blank, or
    /// error if the API request fails.
    #[instrument(skip(self, token, template), fields(name = %template.name))]
    pub async fn create_template(
        &self,
        token: &AccessToken,
        template: &NewTemplate,
    ) -> Result<NotificationTemplate, ApiError> {
        template
            .validate()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.post("/api/admin/notifications/templates", template, Some(token))
            .await
    }

    /// Delete a template.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, token), fields(template_id = %id))]
    pub async fn delete_template(&self, token: &AccessToken, id: TemplateId) -> Result<(), ApiError> {
        self.delete(
            &format!("/api/admin/notifications/templates/{id}"),
            Some(token),
        )
        .await
    }

    /// Dashboard-wide aggregates.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip_all)]
    pub async fn notification_overview(
        &self,
        token: &AccessToken,
    ) -> Result<NotificationOverview, ApiError> {
        self.get("/api/admin/notifications/stats", &[], Some(token))
            .await
    }
}
