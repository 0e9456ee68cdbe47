//! Rule-based classifier and the deterministic post-adjustment pass.
//!
//! The marker lists below are data, not control flow — a non-engineer
//! extending the spam lexicon or adding a new fraud phrase only ever
//! touches an array literal here.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::Classifier;
use crate::domain::{Analysis, Language, Sentiment, TicketType};

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)https?://\S+").unwrap());
static EXCLAMATION_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!{2,}").unwrap());
static WORD_SUD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bсуд\b").unwrap());

const SPAM_MARKERS_WITH_URL: &[&str] = &[
    "выгодное предложение", "специальные цены", "в наличии", "минимальный заказ",
    "отгрузка", "подберем оборудование", "питомник", "тюльпаны", "скидк",
    "купите", "закажите", "реклама",
];

const SPAM_MARKERS_NO_URL: &[&str] = &[
    "специальные цены", "минимальный заказ", "в наличии", "оптов", "прайс",
    "коммерческое предложение",
];

const STRONG_NEGATIVE_PHRASES: &[&str] = &[
    "верните", "требую", "обман", "ужас", "безобраз", "недопустимо",
    "жалоб", "претенз", "прокуратур", "регулятор", "задолбал", "достали",
];

const STRONG_POSITIVE: &[&str] = &[
    "всё решено", "все решено", "решили", "помогли", "всё заработало",
    "все заработало", "доволен", "довольна", "замечательно", "прекрасно",
    "молодцы", "great", "well done", "resolved", "fixed", "it works now",
];

const WEAK_POSITIVE: &[&str] = &[
    "спасибо", "спс", "рахмет", "thank you", "thanks", "благодарю",
    "благодарен", "благодарна",
];

const ISSUE_MARKERS: &[&str] = &[
    "проблем", "вопрос", "подскажите", "помогите", "как сделать",
    "как изменить", "не получается", "доступ", "нужна помощь",
    "консультация", "уточнить", "разъяснить", "не понимаю",
    "how to", "question", "help me", "issue",
];

const FRAUD_MARKERS: &[&str] = &[
    "мошенн", "fraud", "scam", "алаяқ", "списали деньги", "деньги пропали",
    "несанкционирован", "unauthorized",
];

const BLOCKED_MARKERS: &[&str] =
    &["заблок", "не могу войти", "счета заблокированы", "account blocked", "locked out"];

const URGENCY_MARKERS: &[&str] = &["срочно", "немедленно", "сейчас же", "urgent", "asap", "immediately"];

const KZ_LANGUAGE_MARKERS: &[&str] = &["сәлем", "қалай", "мен", "маған", "жасау", "өтініш", "рахмет"];
const ENG_LANGUAGE_MARKERS: &[&str] =
    &["hello", "please", "want", "need", "help", "issue", "thank you", "thanks"];

const FRAUD_TYPE_MARKERS: &[&str] = &["мошен", "fraud", "алаяқ", "взлом", "украли", "списали деньги"];
const COMPLAINT_TYPE_MARKERS: &[&str] = &["жалоб", "complaint", "шағым"];
const BLOCKED_TYPE_MARKERS: &[&str] = &["заблок", "счета заблокированы", "не могу войти", "доступ"];
const DATA_CHANGE_TYPE_MARKERS: &[&str] = &["смена данных", "изменить", "данные", "деректер"];
const APP_MALFUNCTION_TYPE_MARKERS: &[&str] = &["приложен", "app", "қосымша", "не работает", "ошибк"];
const CLAIM_TYPE_MARKERS: &[&str] = &["претенз", "claim", "талап"];

fn has_any_phrase(lowered: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| lowered.contains(p))
}

/// Spam heuristic: a URL together with marketing lexicon, or long
/// link-bearing text with offer/price terms, or offer-lexicon with no URL.
pub fn looks_like_spam(text: &str) -> bool {
    let t = text.to_lowercase();

    if URL_RE.is_match(&t) {
        if has_any_phrase(&t, SPAM_MARKERS_WITH_URL) {
            return true;
        }
        if t.len() > 200 && t.matches("http").count() >= 1 && (t.contains("предлож") || t.contains("цена")) {
            return true;
        }
    }

    has_any_phrase(&t, SPAM_MARKERS_NO_URL)
}

/// True only when there is strong evidence of negative sentiment: severe
/// escalation phrases, the word-boundary "суд" (so it doesn't match inside
/// "судьба"), or two-or-more consecutive exclamation marks.
fn has_strong_negative_evidence(text: &str) -> bool {
    let t = text.to_lowercase();
    has_any_phrase(&t, STRONG_NEGATIVE_PHRASES) || WORD_SUD_RE.is_match(text) || EXCLAMATION_RUN_RE.is_match(text)
}

fn has_urgency(text: &str) -> bool {
    let t = text.to_lowercase();
    has_any_phrase(&t, URGENCY_MARKERS) || has_any_phrase(&t, BLOCKED_MARKERS)
}

fn detect_sentiment_markers(text: &str) -> Sentiment {
    if looks_like_spam(text) {
        return Sentiment::Neutral;
    }

    let t = text.to_lowercase();
    let has_issue = has_any_phrase(&t, ISSUE_MARKERS);
    let has_strong_pos = has_any_phrase(&t, STRONG_POSITIVE);
    let has_weak_pos = has_any_phrase(&t, WEAK_POSITIVE);

    if has_strong_negative_evidence(text) {
        return Sentiment::Negative;
    }
    if has_issue {
        return Sentiment::Neutral;
    }
    if has_strong_pos {
        return Sentiment::Positive;
    }
    if has_weak_pos {
        return Sentiment::Neutral;
    }

    Sentiment::Neutral
}

fn detect_language(text: &str) -> Language {
    let t = text.to_lowercase();
    if has_any_phrase(&t, KZ_LANGUAGE_MARKERS) {
        Language::KZ
    } else if has_any_phrase(&t, ENG_LANGUAGE_MARKERS) {
        Language::ENG
    } else {
        Language::RU
    }
}

fn spam_analysis() -> Analysis {
    Analysis {
        id: None,
        ticket_id: 0,
        ticket_type: TicketType::Spam,
        sentiment: Sentiment::Neutral,
        priority_score: 1,
        language: Language::RU,
        summary: "advertising".to_string(),
        model_tag: "spam-heuristic".to_string(),
    }
}

/// Rule-based classification: keyword buckets for fraud, complaint,
/// data-change, app-malfunction, claim, consultation; summary is the
/// first 200 characters of the text.
pub fn heuristic_classify(text: &str) -> Analysis {
    if looks_like_spam(text) {
        let mut a = spam_analysis();
        a.model_tag = "heuristic-fallback".to_string();
        return a;
    }

    let t = text.to_lowercase();
    let language = detect_language(text);
    let sentiment = detect_sentiment_markers(text);

    let (ticket_type, priority_score) = if has_any_phrase(&t, FRAUD_TYPE_MARKERS) {
        (TicketType::Fraud, 9)
    } else if has_any_phrase(&t, COMPLAINT_TYPE_MARKERS) {
        (TicketType::Complaint, 7)
    } else if has_any_phrase(&t, BLOCKED_TYPE_MARKERS) {
        (TicketType::Complaint, 8)
    } else if has_any_phrase(&t, DATA_CHANGE_TYPE_MARKERS) {
        (TicketType::DataChange, 5)
    } else if has_any_phrase(&t, APP_MALFUNCTION_TYPE_MARKERS) {
        (TicketType::AppMalfunction, 6)
    } else if has_any_phrase(&t, CLAIM_TYPE_MARKERS) {
        (TicketType::Claim, 7)
    } else {
        (TicketType::Consultation, 4)
    };

    let summary: String = text.chars().take(200).collect();

    Analysis {
        id: None,
        ticket_id: 0,
        ticket_type,
        sentiment,
        priority_score,
        language,
        summary,
        model_tag: "heuristic-fallback".to_string(),
    }
}

/// Deterministic sentiment/priority normalizer applied after both the LLM
/// and heuristic paths. Spam is left untouched.
pub fn post_adjust(mut analysis: Analysis, original_text: &str) -> Analysis {
    if analysis.ticket_type == TicketType::Spam {
        return analysis;
    }

    let text = original_text.trim();
    let t = text.to_lowercase();

    let strong_neg = has_strong_negative_evidence(text);
    let strong_pos = has_any_phrase(&t, STRONG_POSITIVE);
    let weak_pos_only = has_any_phrase(&t, WEAK_POSITIVE) && !strong_pos;

    let is_fraud = has_any_phrase(&t, FRAUD_MARKERS);
    let is_blocked = has_any_phrase(&t, BLOCKED_MARKERS);
    let is_urgent = has_urgency(text);

    if is_fraud {
        analysis.priority_score = analysis.priority_score.max(9);
    } else if is_blocked || is_urgent {
        analysis.priority_score = analysis.priority_score.max(8);
    }

    if strong_neg {
        analysis.sentiment = Sentiment::Negative;
    } else if strong_pos {
        analysis.sentiment = Sentiment::Positive;
    } else if weak_pos_only {
        analysis.sentiment = Sentiment::Neutral;
    } else if analysis.sentiment == Sentiment::Negative {
        // LLM said negative but no strong evidence backs it up.
        analysis.sentiment = Sentiment::Neutral;
    }

    analysis.clamp_priority();
    analysis
}

/// Rule-based fallback classifier, used both standalone (no LLM provider
/// configured) and as the degradation path when the LLM path is exhausted.
pub struct HeuristicClassifier;

#[async_trait]
impl Classifier for HeuristicClassifier {
    async fn analyze(&self, description: &str, _attachments: Option<&str>) -> Analysis {
        if looks_like_spam(description) {
            return spam_analysis();
        }
        post_adjust(heuristic_classify(description), description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraud_marker_forces_priority_at_least_nine() {
        let a = post_adjust(heuristic_classify("Мошенники списали деньги с моего счета"), "Мошенники списали деньги с моего счета");
        assert!(a.priority_score >= 9);
    }

    #[test]
    fn blocked_access_forces_priority_at_least_eight() {
        let a = post_adjust(heuristic_classify("Счета заблокированы, подскажите что делать"), "Счета заблокированы, подскажите что делать");
        assert!(a.priority_score >= 8);
    }

    #[test]
    fn sud_does_not_match_inside_sudba() {
        assert!(!has_strong_negative_evidence("Это моя судьба, ничего не поделать"));
        assert!(has_strong_negative_evidence("Подам в суд на вас"));
    }

    #[test]
    fn double_exclamation_is_strong_negative() {
        assert!(has_strong_negative_evidence("Немедленно решите проблему!!"));
    }

    #[test]
    fn spam_short_circuits_to_fixed_result() {
        let text = "Выгодное предложение! В наличии, минимальный заказ от 10 штук, http://shop.example.com";
        let a = heuristic_classify(text);
        assert_eq!(a.ticket_type, TicketType::Spam);
        assert_eq!(a.priority_score, 1);
    }

    #[test]
    fn bare_thanks_stays_neutral() {
        assert_eq!(detect_sentiment_markers("Спасибо"), Sentiment::Neutral);
    }

    #[test]
    fn priority_is_always_clamped() {
        let mut a = heuristic_classify("Консультация по тарифам");
        a.priority_score = 99;
        a.clamp_priority();
        assert_eq!(a.priority_score, 10);
    }
}
