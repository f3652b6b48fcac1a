use log::debug;

/// Spam verdict for one email.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub is_spam: bool,
    /// Always within [0.0, 1.0]; grows with the number of distinct
    /// keyword matches.
    pub confidence: f64,
}

/// Classification strategy seam. The keyword matcher is the only
/// implementation today; a model-backed scorer can slot in behind the
/// same contract later.
pub trait Classify {
    fn classify(&self, subject: &str, body: &str) -> Classification;
}

/// Common spam phrases checked against every message.
const SPAM_KEYWORDS: [&str; 20] = [
    "urgent",
    "lottery",
    "wire transfer",
    "click here",
    "limited time",
    "act now",
    "winner",
    "prize",
    "congratulations",
    "free money",
    "claim now",
    "expires soon",
    "guaranteed",
    "risk-free",
    "no obligation",
    "limited offer",
    "exclusive deal",
    "one-time offer",
    "act immediately",
    "don't miss out",
];

/// Keyword-based spam classifier.
///
/// The phrase list is fixed at construction and matched case-insensitively
/// as substrings of `subject + " " + body`. One hit is enough to flag a
/// message as spam; confidence scales with the number of distinct phrases
/// that matched.
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    /// Build a classifier with the built-in spam phrase list.
    pub fn new() -> Self {
        Self::with_keywords(SPAM_KEYWORDS.iter().map(|k| k.to_string()).collect())
    }

    /// Build a classifier with a caller-supplied phrase list.
    pub fn with_keywords(keywords: Vec<String>) -> Self {
        KeywordClassifier {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classify for KeywordClassifier {
    fn classify(&self, subject: &str, body: &str) -> Classification {
        let text = format!("{} {}", subject, body).to_lowercase();

        let matches = self
            .keywords
            .iter()
            .filter(|keyword| text.contains(keyword.as_str()))
            .count();

        let total = self.keywords.len();
        let confidence = if total > 0 {
            // Matches are weighted double so a handful of hits already
            // reads as high confidence, capped at 1.0.
            (matches as f64 / total as f64 * 2.0).min(1.0)
        } else {
            0.0
        };

        debug!(
            "Keyword classification: {}/{} phrases matched (confidence {:.2})",
            matches, total, confidence
        );

        Classification {
            is_spam: matches > 0,
            confidence,
        }
    }
}
