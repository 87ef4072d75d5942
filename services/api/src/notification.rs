//! Status-change notifications
//!
//! Renders the message an administrator sends to a student after deciding on
//! a request, plus a `wa.me` deep link pre-filled with that message. Nothing
//! is sent from here; the link is opened by a person.

use common::models::{RequestStatus, RequestWithOwner};

const DEFAULT_COUNTRY_CODE: &str = "55";
const DEEP_LINK_BASE: &str = "https://wa.me";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Prefixed to contact numbers that do not already start with it
    pub country_code: String,
    pub link_base: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            link_base: DEEP_LINK_BASE.to_string(),
        }
    }
}

impl NotificationConfig {
    /// # Environment Variables
    /// - `WHATSAPP_COUNTRY_CODE`: Country calling code (default: 55)
    pub fn from_env() -> Self {
        let country_code = std::env::var("WHATSAPP_COUNTRY_CODE")
            .ok()
            .map(|code| code.chars().filter(char::is_ascii_digit).collect::<String>())
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string());

        Self {
            country_code,
            ..Self::default()
        }
    }
}

/// Message plus an optional deep link; the link is absent when the owner has
/// no usable contact number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationFormatter {
    config: NotificationConfig,
}

impl NotificationFormatter {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }

    pub fn notify(&self, item: &RequestWithOwner) -> Notification {
        let message = render_message(item);
        let link = self
            .contact_number(item.user.whatsapp.as_deref())
            .map(|number| {
                format!(
                    "{}/{}?text={}",
                    self.config.link_base,
                    number,
                    urlencoding::encode(&message)
                )
            });

        Notification { message, link }
    }

    /// Digits only, with the country code applied exactly once
    pub fn contact_number(&self, contact: Option<&str>) -> Option<String> {
        let digits: String = contact?.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }

        if digits.starts_with(&self.config.country_code) {
            Some(digits)
        } else {
            Some(format!("{}{}", self.config.country_code, digits))
        }
    }
}

/// Message body for the request's current status
pub fn render_message(item: &RequestWithOwner) -> String {
    let request = &item.request;
    let date = request.date.format("%d/%m/%Y");
    let time = format!("{} to {}", request.start_time, request.end_time);
    let observation = request
        .admin_observation
        .as_deref()
        .map(str::trim)
        .filter(|obs| !obs.is_empty());

    let mut message = format!("Hello, {}.\n\n", item.user.name);

    match request.status {
        RequestStatus::Approved => {
            message.push_str("✅ Your IFMA court reservation has been *APPROVED*.\n\n");
            message.push_str(&format!("📅 Date: {}\n⏰ Time: {}\n", date, time));
            if let Some(obs) = observation {
                message.push_str(&format!("\n📝 Observations:\n{}\n", obs));
            }
            message.push_str("\nIf you have any questions, contact the coordination.");
        }
        RequestStatus::Rejected => {
            message.push_str("❌ Your IFMA court reservation was *NOT APPROVED*.\n\n");
            message.push_str(&format!(
                "📅 Requested date: {}\n⏰ Requested time: {}\n",
                date, time
            ));
            match observation {
                Some(obs) => message.push_str(&format!("\n📝 Reason/Observations:\n{}\n", obs)),
                None => message.push_str("\nFor more information, contact the coordination."),
            }
        }
        RequestStatus::Cancelled => {
            message.push_str("🚫 Your IFMA court reservation has been *CANCELLED*.\n\n");
            message.push_str(&format!("📅 Date: {}\n⏰ Time: {}\n", date, time));
            if let Some(obs) = observation {
                message.push_str(&format!("\n📝 Observations:\n{}\n", obs));
            }
        }
        RequestStatus::Pending => {
            message.push_str(&format!(
                "Your IFMA court reservation has status: {}.\n\n",
                request.status
            ));
            message.push_str(&format!("📅 Date: {}\n⏰ Time: {}\n", date, time));
        }
    }

    message
}
