use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub gmail: GmailConfig,
    /// Maximum number of unread messages requested per run.
    pub max_results: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GmailConfig {
    pub credentials_path: String,
    pub token_cache_path: String,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Vérifier que les variables essentielles sont définies
        Self::check_required_env_vars()?;

        Ok(Config {
            gmail: GmailConfig {
                credentials_path: std::env::var("GMAIL_CREDENTIALS_PATH")
                    .expect("GMAIL_CREDENTIALS_PATH doit être défini"),
                token_cache_path: std::env::var("GMAIL_TOKEN_CACHE_PATH")
                    .unwrap_or_else(|_| "./gmail-token-cache.json".to_string()),
            },
            max_results: std::env::var("MAX_RESULTS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
        })
    }

    fn check_required_env_vars() -> Result<()> {
        let required_vars = [
            "GMAIL_CREDENTIALS_PATH",
        ];

        let mut missing_vars = Vec::new();

        for var in &required_vars {
            if std::env::var(var).is_err() {
                missing_vars.push(*var);
            }
        }

        if !missing_vars.is_empty() {
            anyhow::bail!(
                "Variables d'environnement manquantes: {}\n\
                 \n\
                 💡 Solutions :\n\
                 1. Créer un fichier .env avec vos credentials :\n\
                    cp .env.example .env\n\
                    # Puis éditer .env avec vos valeurs\n\
                 \n\
                 2. Ou définir les variables manuellement :\n\
                    export GMAIL_CREDENTIALS_PATH=/path/to/client_credentials.json\n\
                    export GMAIL_TOKEN_CACHE_PATH=./gmail-token-cache.json\n\
                    cargo run -- --dry-run",
                missing_vars.join(", ")
            );
        }

        Ok(())
    }
}
