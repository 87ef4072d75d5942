//! API models for request and response payloads

use common::models::RequestWithOwner;
use serde::{Deserialize, Serialize};

use crate::notification::Notification;

/// Body of `POST /requests`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCourtRequest {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

/// Query of `GET /admin/requests`; empty values are ignored
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestListQuery {
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Body of `PATCH /admin/requests/:id/status`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub admin_observation: Option<String>,
}

/// Result of a status transition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub request: RequestWithOwner,
    pub whatsapp_message_preview: String,
    pub whatsapp_link: Option<String>,
}

impl StatusChangeResponse {
    pub fn new(request: RequestWithOwner, notification: Notification) -> Self {
        Self {
            request,
            whatsapp_message_preview: notification.message,
            whatsapp_link: notification.link,
        }
    }
}

/// Query of `GET /guard/agenda`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgendaQuery {
    pub date: Option<String>,
}

/// Body of `POST /admin/guards`; at least one of `email`/`username` is required
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateGuardRequest {
    pub name: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: String,
    pub whatsapp: Option<String>,
}
