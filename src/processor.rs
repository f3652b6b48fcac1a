use anyhow::{Context, Result};
use log::{debug, error, info};

use crate::classifier::{Classify, KeywordClassifier};
use crate::config::Config;
use crate::extractor::ContentExtractor;
use crate::gmail_client::GmailClient;

/// Counters accumulated over one triage run.
#[derive(Debug, Default)]
pub struct TriageSummary {
    pub processed: usize,
    pub spam: usize,
    pub safe: usize,
    pub trashed: usize,
    pub errors: usize,
}

pub struct TriageProcessor {
    config: Config,
    classifier: KeywordClassifier,
}

impl TriageProcessor {
    pub fn new(config: Config) -> Self {
        info!("Initializing triage processor with keyword classifier");

        TriageProcessor {
            config,
            classifier: KeywordClassifier::new(),
        }
    }

    /// Fetch unread messages, classify each one and (outside dry-run mode)
    /// move the spam to the trash. Per-message failures are counted and the
    /// run continues with the next message.
    pub async fn run(&self, dry_run: bool, limit: Option<usize>) -> Result<TriageSummary> {
        // 1. Se connecter à l'API Gmail
        let gmail_client = GmailClient::new(&self.config.gmail)
            .await
            .context("Unable to connect to the Gmail API")?;

        // 2. Rechercher les messages non lus
        let message_ids = gmail_client
            .fetch_unread_messages(self.config.max_results)
            .await
            .context("Error while fetching unread messages")?;

        if message_ids.is_empty() {
            println!("No unread messages to process.");
            return Ok(TriageSummary::default());
        }

        let messages_to_process: Vec<String> = if let Some(limit) = limit {
            message_ids.into_iter().take(limit).collect()
        } else {
            message_ids
        };

        let mut summary = TriageSummary::default();

        // 3. Traiter chaque message trouvé
        for (index, message_id) in messages_to_process.iter().enumerate() {
            println!(
                "\n📧 Message {}/{} (ID: {})",
                index + 1,
                messages_to_process.len(),
                message_id
            );
            println!("{}", "-".repeat(60));

            match self
                .process_single_message(&gmail_client, message_id, dry_run, &mut summary)
                .await
            {
                Ok(()) => summary.processed += 1,
                Err(e) => {
                    error!("Error processing message {}: {}", message_id, e);
                    summary.errors += 1;
                }
            }
        }

        self.print_summary(&summary, messages_to_process.len(), dry_run);

        Ok(summary)
    }

    async fn process_single_message(
        &self,
        gmail_client: &GmailClient,
        message_id: &str,
        dry_run: bool,
        summary: &mut TriageSummary,
    ) -> Result<()> {
        debug!("Processing message ID: {}", message_id);

        let message = gmail_client
            .fetch_message(message_id)
            .await
            .context("Unable to retrieve message content")?;

        let email = ContentExtractor::extract(&message.payload, &message.snippet);

        println!("   From: {}", display_or(&email.from_email, "Unknown"));
        println!("   Subject: {}", truncate(display_or(&email.subject, "(No Subject)"), 50));

        let verdict = self.classifier.classify(&email.subject, &email.body);

        if verdict.is_spam {
            summary.spam += 1;
            println!(
                "   🚨 Classified as SPAM (confidence: {:.0}%)",
                verdict.confidence * 100.0
            );

            if dry_run {
                println!("   [DRY-RUN] Would move message {} to trash", message_id);
            } else {
                match gmail_client.move_to_trash(message_id).await {
                    Ok(()) => {
                        summary.trashed += 1;
                        println!("   ✅ Moved to trash");
                    }
                    Err(e) => {
                        error!("Unable to move message {} to trash: {}", message_id, e);
                        summary.errors += 1;
                    }
                }
            }
        } else {
            summary.safe += 1;
            println!(
                "   ✅ Classified as SAFE (confidence: {:.0}%)",
                verdict.confidence * 100.0
            );
        }

        Ok(())
    }

    fn print_summary(&self, summary: &TriageSummary, total: usize, dry_run: bool) {
        println!("\n{}", "=".repeat(60));
        println!("🏁 Triage complete: {} message(s) processed out of {}", summary.processed, total);
        println!("   - Spam:   {}", summary.spam);
        println!("   - Safe:   {}", summary.safe);
        println!("   - Errors: {}", summary.errors);

        if dry_run {
            println!("\n🧪 DRY-RUN mode was enabled - no messages were actually moved");
        } else {
            println!("\n✅ {} message(s) moved to trash", summary.trashed);
        }
        println!("{}", "=".repeat(60));
    }
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let prefix: String = value.chars().take(max_chars).collect();
        format!("{}...", prefix)
    }
}
