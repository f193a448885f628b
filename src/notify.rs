//! Outbound reminder delivery: posts adaptive-card activities to the bot
//! conversation recorded on each goal.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::traits::Notifier;
use crate::types::{PersonalGoal, TeamGoal};

/// Posts reminder cards through the conversation REST endpoint stored on the
/// goal record (`{service_url}/v3/conversations/{conversation_id}/activities`).
pub struct BotNotifier {
    http: reqwest::Client,
    bearer_token: Option<String>,
}

impl BotNotifier {
    pub fn new(bearer_token: Option<String>, request_timeout: std::time::Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_default();
        Self { http, bearer_token }
    }

    async fn post_activity(
        &self,
        service_url: &str,
        conversation_id: &str,
        payload: Value,
    ) -> anyhow::Result<()> {
        let url = activity_url(service_url, conversation_id);
        debug!(url = %url, "Posting reminder activity");

        let mut request = self.http.post(&url).json(&payload);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Activity post to {} failed: {} {}", url, status, body);
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for BotNotifier {
    async fn send_personal_reminder(
        &self,
        goal: &PersonalGoal,
        before_three_days: bool,
    ) -> anyhow::Result<()> {
        let payload = personal_reminder_activity(goal, before_three_days);
        self.post_activity(&goal.service_url, &goal.conversation_id, payload)
            .await
    }

    async fn send_team_reminder(
        &self,
        goal: &TeamGoal,
        before_three_days: bool,
    ) -> anyhow::Result<()> {
        let payload = team_reminder_activity(goal, before_three_days);
        self.post_activity(&goal.service_url, &goal.channel_conversation_id, payload)
            .await
    }
}

fn activity_url(service_url: &str, conversation_id: &str) -> String {
    format!(
        "{}/v3/conversations/{}/activities",
        service_url.trim_end_matches('/'),
        conversation_id
    )
}

/// Message activity carrying a single adaptive card attachment.
fn card_activity(card: Value) -> Value {
    json!({
        "type": "message",
        "attachments": [{
            "contentType": "application/vnd.microsoft.card.adaptive",
            "content": card,
        }]
    })
}

pub(crate) fn personal_reminder_activity(goal: &PersonalGoal, before_three_days: bool) -> Value {
    let heading = if before_three_days {
        format!("Your goal \"{}\" ends on {}", goal.name, goal.end_date)
    } else {
        format!("Checking in on \"{}\"", goal.name)
    };
    let body = if before_three_days {
        "Three days left in this goal cycle. Update your status and notes before it closes."
    } else {
        "Scheduled reminder: take a moment to log your progress."
    };

    card_activity(json!({
        "$schema": "http://adaptivecards.io/schemas/adaptive-card.json",
        "type": "AdaptiveCard",
        "version": "1.2",
        "body": [
            { "type": "TextBlock", "weight": "Bolder", "size": "Medium", "text": heading, "wrap": true },
            { "type": "TextBlock", "text": body, "wrap": true },
            { "type": "TextBlock", "isSubtle": true,
              "text": format!("Status: {} | Cycle: {} to {}", goal.status.as_str(), goal.start_date, goal.end_date),
              "wrap": true }
        ]
    }))
}

pub(crate) fn team_reminder_activity(goal: &TeamGoal, before_three_days: bool) -> Value {
    let heading = if before_three_days {
        format!("Team goal \"{}\" ends on {}", goal.name, goal.end_date)
    } else {
        format!("Checking in on team goal \"{}\"", goal.name)
    };
    let body = if before_three_days {
        "Three days left in this goal cycle. Team members with aligned goals should update their status."
    } else {
        "Scheduled reminder: review progress on this team goal and your aligned personal goals."
    };

    card_activity(json!({
        "$schema": "http://adaptivecards.io/schemas/adaptive-card.json",
        "type": "AdaptiveCard",
        "version": "1.2",
        "body": [
            { "type": "TextBlock", "weight": "Bolder", "size": "Medium", "text": heading, "wrap": true },
            { "type": "TextBlock", "text": body, "wrap": true },
            { "type": "TextBlock", "isSubtle": true,
              "text": format!("Cycle: {} to {}", goal.start_date, goal.end_date),
              "wrap": true }
        ]
    }))
}
