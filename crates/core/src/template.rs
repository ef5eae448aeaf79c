//! Campaign email rendering.
//!
//! Produces one self-contained HTML document per campaign. Email clients
//! strip `<style>` blocks and external stylesheets, so every rule is an
//! inline `style` attribute. Plain-text fields (subject, sender name,
//! company, email) are HTML-escaped by askama; the campaign body is
//! authored HTML and is inserted as-is.

use askama::Template;

use crate::error::CoreError;

/// Literal token left in footer links where the recipient address belongs.
///
/// All recipients of a batch share one rendered body, so it is not
/// substituted per recipient.
pub const RECIPIENT_EMAIL_PLACEHOLDER: &str = "{{email}}";

/// Sender details shown in the author block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSender {
    pub name: String,
    pub company_name: Option<String>,
    pub email: String,
    pub years_of_experience: Option<i32>,
}

#[derive(Template)]
#[template(path = "campaign_email.html")]
struct CampaignEmail<'a> {
    subject: &'a str,
    content: &'a str,
    sender_name: &'a str,
    company_name: &'a str,
    sender_email: &'a str,
    credential: String,
    unsubscribe_url: String,
    preferences_url: String,
}

/// Renders campaign emails with footer links rooted at `base_url`.
#[derive(Debug, Clone)]
pub struct EmailRenderer {
    base_url: String,
}

impl EmailRenderer {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Render the full HTML document for a campaign.
    pub fn render(
        &self,
        subject: &str,
        content_html: &str,
        sender: &TemplateSender,
    ) -> Result<String, CoreError> {
        let company_name = sender
            .company_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(sender.name.as_str());

        let template = CampaignEmail {
            subject,
            content: content_html,
            sender_name: &sender.name,
            company_name,
            sender_email: &sender.email,
            credential: credential_line(sender.years_of_experience),
            unsubscribe_url: format!(
                "{}/unsubscribe?email={RECIPIENT_EMAIL_PLACEHOLDER}",
                self.base_url
            ),
            preferences_url: format!(
                "{}/preferences?email={RECIPIENT_EMAIL_PLACEHOLDER}",
                self.base_url
            ),
        };

        template
            .render()
            .map_err(|e| CoreError::Internal(format!("Failed to render campaign email: {e}")))
    }
}

fn credential_line(years: Option<i32>) -> String {
    match years {
        Some(1) => "1 year of experience".to_string(),
        Some(n) if n > 1 => format!("{n} years of experience"),
        _ => String::new(),
    }
}
