use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use google_gmail1::{hyper, hyper_rustls, oauth2, Gmail};
use log::{debug, info, warn};

use crate::config::GmailConfig;
use crate::extractor::{RawBody, RawHeader, RawPayload};

/// Seconds to wait before the single retry after a 429 response (the typed
/// client does not surface the Retry-After header).
const RATE_LIMIT_WAIT_SECS: u64 = 60;

/// One message fetched in full: its wire-shaped payload plus the snippet
/// Gmail computes server-side.
pub struct RawMessage {
    pub id: String,
    pub payload: RawPayload,
    pub snippet: String,
}

pub struct GmailClient {
    hub: Gmail<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>,
}

impl GmailClient {
    pub async fn new(config: &GmailConfig) -> Result<Self> {
        info!("Connecting to Gmail API via OAuth2");

        // Read OAuth2 client credentials from file
        let secret = oauth2::read_application_secret(&config.credentials_path)
            .await
            .context("Unable to read OAuth2 client credentials file")?;

        // Create authenticator with token persistence
        // Note: We use Scope::Modify on all API calls, which is the broadest scope available
        // in google-gmail1 (covers reading, modifying labels, and managing emails)
        let auth = oauth2::InstalledFlowAuthenticator::builder(
            secret,
            oauth2::InstalledFlowReturnMethod::HTTPRedirect,
        )
        .persist_tokens_to_disk(&config.token_cache_path)
        .build()
        .await
        .context("Unable to create OAuth2 authenticator")?;

        // Create HTTP client
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()?
            .https_or_http()
            .enable_http1()
            .build();

        let client = hyper::Client::builder().build(connector);

        let hub = Gmail::new(client, auth);

        info!("✅ Gmail API connection established successfully");

        Ok(GmailClient { hub })
    }

    /// List the ids of unread messages, newest first, up to `max_results`.
    pub async fn fetch_unread_messages(&self, max_results: u32) -> Result<Vec<String>> {
        info!("Searching for unread messages (max {})", max_results);

        let user_id = "me";
        let query = "is:unread";

        debug!("Search criteria: {}", query);

        let mut retried = false;
        let result = loop {
            let result = self
                .hub
                .users()
                .messages_list(user_id)
                .q(query)
                .max_results(max_results)
                .add_scope(google_gmail1::api::Scope::Modify)
                .doit()
                .await;

            match result {
                Err(e) if !retried && is_rate_limited(&e) => {
                    retried = true;
                    wait_for_rate_limit().await;
                }
                other => break other,
            }
        }
        .context("Error listing unread messages")?;

        let message_ids: Vec<String> = result
            .1
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|msg| msg.id)
            .collect();

        info!("Found {} unread message(s)", message_ids.len());

        Ok(message_ids)
    }

    /// Retrieve one message in full, with its complete MIME part tree.
    pub async fn fetch_message(&self, message_id: &str) -> Result<RawMessage> {
        debug!("Retrieving full message for ID: {}", message_id);

        let user_id = "me";

        let mut retried = false;
        let result = loop {
            let result = self
                .hub
                .users()
                .messages_get(user_id, message_id)
                .format("full")
                .add_scope(google_gmail1::api::Scope::Modify)
                .doit()
                .await;

            match result {
                Err(e) if !retried && is_rate_limited(&e) => {
                    retried = true;
                    wait_for_rate_limit().await;
                }
                other => break other,
            }
        }
        .with_context(|| format!("Unable to retrieve message {}", message_id))?;

        let message = result.1;

        let payload = message
            .payload
            .map(payload_from_api)
            .unwrap_or_default();

        Ok(RawMessage {
            id: message_id.to_string(),
            payload,
            snippet: message.snippet.unwrap_or_default(),
        })
    }

    /// Move a message to the trash by swapping the TRASH label in for INBOX.
    pub async fn move_to_trash(&self, message_id: &str) -> Result<()> {
        info!("Moving message {} to trash", message_id);

        let user_id = "me";

        let mut retried = false;
        let result = loop {
            // TRASH and INBOX are system labels; their ids are the names themselves
            let mut modify_request = google_gmail1::api::ModifyMessageRequest::default();
            modify_request.add_label_ids = Some(vec!["TRASH".to_string()]);
            modify_request.remove_label_ids = Some(vec!["INBOX".to_string()]);

            let result = self
                .hub
                .users()
                .messages_modify(modify_request, user_id, message_id)
                .add_scope(google_gmail1::api::Scope::Modify)
                .doit()
                .await;

            match result {
                Err(e) if !retried && is_rate_limited(&e) => {
                    retried = true;
                    wait_for_rate_limit().await;
                }
                other => break other,
            }
        };

        result.with_context(|| format!("Unable to move message {} to trash", message_id))?;

        info!("✅ Message {} moved to trash", message_id);
        Ok(())
    }
}

fn is_rate_limited(error: &google_gmail1::Error) -> bool {
    matches!(
        error,
        google_gmail1::Error::Failure(resp)
            if resp.status() == hyper::StatusCode::TOO_MANY_REQUESTS
    )
}

async fn wait_for_rate_limit() {
    warn!(
        "Rate limit exceeded. Waiting {} seconds before retrying...",
        RATE_LIMIT_WAIT_SECS
    );
    tokio::time::sleep(tokio::time::Duration::from_secs(RATE_LIMIT_WAIT_SECS)).await;
}

/// Map an API message part onto the wire-shaped payload model.
///
/// google-gmail1 eagerly decodes the base64url body bytes during
/// deserialization; the extractor owns the decode policy (padding, lossy
/// UTF-8), so the wire encoding is restored here.
fn payload_from_api(part: google_gmail1::api::MessagePart) -> RawPayload {
    RawPayload {
        mime_type: part.mime_type,
        headers: part
            .headers
            .unwrap_or_default()
            .into_iter()
            .filter_map(|h| match (h.name, h.value) {
                (Some(name), Some(value)) => Some(RawHeader { name, value }),
                _ => None,
            })
            .collect(),
        body: part.body.map(|b| RawBody {
            data: b.data.map(|bytes| general_purpose::URL_SAFE_NO_PAD.encode(bytes)),
        }),
        parts: part
            .parts
            .map(|parts| parts.into_iter().map(payload_from_api).collect()),
    }
}
