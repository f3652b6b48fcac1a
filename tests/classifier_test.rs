use mailsweep::classifier::{Classify, KeywordClassifier};

#[test]
fn test_two_keyword_list_full_confidence() {
    // Both phrases match: confidence = min(1.0, (2/2) * 2.0) = 1.0
    let classifier =
        KeywordClassifier::with_keywords(vec!["urgent".to_string(), "lottery".to_string()]);

    let verdict = classifier.classify("Urgent: You Won!", "Claim your lottery prize now");

    assert!(verdict.is_spam);
    assert_eq!(verdict.confidence, 1.0);
}

#[test]
fn test_safe_email_with_default_keywords() {
    let classifier = KeywordClassifier::new();

    let verdict = classifier.classify("Meeting notes", "See attached agenda for tomorrow.");

    assert!(!verdict.is_spam);
    assert_eq!(verdict.confidence, 0.0);
}

#[test]
fn test_single_match_flags_spam_despite_low_confidence() {
    let classifier = KeywordClassifier::new();
    assert_eq!(classifier.keyword_count(), 20);

    let verdict = classifier.classify("About that lottery ticket", "just one phrase matches");

    // One hit out of twenty: confidence is low but the verdict is spam
    assert!(verdict.is_spam);
    assert!((verdict.confidence - 0.1).abs() < 1e-9);
}

#[test]
fn test_confidence_stays_within_bounds() {
    let classifier = KeywordClassifier::new();

    // A message stuffed with every phrase from the default list
    let body = "urgent lottery wire transfer click here limited time act now winner \
                prize congratulations free money claim now expires soon guaranteed \
                risk-free no obligation limited offer exclusive deal one-time offer \
                act immediately don't miss out";

    let verdict = classifier.classify("everything at once", body);

    assert!(verdict.is_spam);
    assert!(verdict.confidence >= 0.0 && verdict.confidence <= 1.0);
    assert_eq!(verdict.confidence, 1.0);
}

#[test]
fn test_confidence_monotonic_in_match_count() {
    let classifier = KeywordClassifier::with_keywords(vec![
        "alpha".to_string(),
        "beta".to_string(),
        "gamma".to_string(),
        "delta".to_string(),
    ]);

    let one = classifier.classify("alpha", "").confidence;
    let two = classifier.classify("alpha beta", "").confidence;
    let three = classifier.classify("alpha beta", "gamma").confidence;

    assert!(one <= two, "confidence dropped from {} to {}", one, two);
    assert!(two <= three, "confidence dropped from {} to {}", two, three);
}

#[test]
fn test_no_match_means_safe_and_zero_confidence() {
    let classifier = KeywordClassifier::with_keywords(vec!["xyzzy".to_string()]);

    let verdict = classifier.classify("Quarterly results", "Revenue grew by 4% this quarter.");

    assert!(!verdict.is_spam);
    assert_eq!(verdict.confidence, 0.0);
}

#[test]
fn test_empty_keyword_set_never_flags() {
    let classifier = KeywordClassifier::with_keywords(Vec::new());

    let verdict = classifier.classify("urgent lottery winner", "free money everywhere");

    assert!(!verdict.is_spam);
    assert_eq!(verdict.confidence, 0.0);
}

#[test]
fn test_matching_is_case_insensitive_both_ways() {
    // Keywords are lowercased at construction, text at classification time
    let classifier = KeywordClassifier::with_keywords(vec!["FREE MONEY".to_string()]);

    let verdict = classifier.classify("FrEe MoNeY inside", "");

    assert!(verdict.is_spam);
}

#[test]
fn test_distinct_keywords_counted_not_occurrences() {
    let classifier = KeywordClassifier::with_keywords(vec![
        "urgent".to_string(),
        "lottery".to_string(),
        "winner".to_string(),
        "prize".to_string(),
    ]);

    // "urgent" appears three times but counts once: 1 of 4 keywords matched,
    // so confidence is min(1.0, (1/4) * 2.0) = 0.5, not 1.0
    let verdict = classifier.classify("urgent urgent", "this is urgent");

    assert!(verdict.is_spam);
    assert!((verdict.confidence - 0.5).abs() < 1e-9);
}
