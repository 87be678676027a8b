//! Smart actions: call, text, email and open-URL results synthesized from the
//! raw query text.
//!
//! Detection runs on every (debounced) keystroke, so it is a pure function over
//! precompiled patterns. The four checks are independent: a bare phone number
//! yields both a call and a text action, and a trigger whose remainder does not
//! match simply contributes nothing for that check.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::search::SearchResult;
use crate::platform::{IconRef, SystemIcon};

pub const NAMESPACE: &str = "smart_actions";

pub const CALL_SCORE: i32 = 100;
pub const SMS_SCORE: i32 = 99;
pub const EMAIL_SCORE: i32 = 100;
pub const URL_SCORE: i32 = 98;

/// Shortest phone-like string treated as a number.
const MIN_PHONE_LEN: usize = 3;

const CALL_TRIGGERS: &[&str] = &["call "];
const SMS_TRIGGERS: &[&str] = &["sms ", "text "];
const EMAIL_TRIGGERS: &[&str] = &["email ", "mailto "];

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+[0-9]+[\- .]*)?(\([0-9]+\)[\- .]*)?([0-9][0-9\- .]+[0-9])$")
        .expect("phone pattern compiles")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$",
    )
    .expect("email pattern compiles")
});

static WEB_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?i:(?:https?|rtsp)://)?",
        r"(?:[^\s@/]+(?::[^\s@/]*)?@)?",
        r"(?:",
        r"(?:[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63}",
        r"|(?:[0-9]{1,3}\.){3}[0-9]{1,3}",
        r")",
        r"(?::[0-9]{1,5})?",
        r"(?:[/?#][^\s]*)?$",
    ))
    .expect("url pattern compiles")
});

/// Synthesize smart actions for `query`, highest priority first.
pub fn detect(query: &str) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if let Some(phone) = detect_phone(query) {
        if phone.call {
            results.push(call_action(phone.number));
        }
        if phone.text {
            results.push(sms_action(phone.number));
        }
    }

    if let Some(address) = detect_email(query) {
        results.push(email_action(address));
    }

    if WEB_URL.is_match(query) {
        results.push(url_action(query));
    }

    results
}

pub fn is_phone_number(text: &str) -> bool {
    PHONE.is_match(text) && text.chars().count() >= MIN_PHONE_LEN
}

pub fn is_email_address(text: &str) -> bool {
    EMAIL.is_match(text)
}

pub fn is_web_url(text: &str) -> bool {
    WEB_URL.is_match(text)
}

struct PhoneMatch<'a> {
    number: &'a str,
    call: bool,
    text: bool,
}

fn detect_phone(query: &str) -> Option<PhoneMatch<'_>> {
    let implicit = is_phone_number(query);

    let call_remainder = strip_trigger(query, CALL_TRIGGERS);
    let sms_remainder = strip_trigger(query, SMS_TRIGGERS);
    let is_call_trigger = call_remainder.is_some();
    let is_sms_trigger = sms_remainder.is_some();

    let explicit = call_remainder
        .or(sms_remainder)
        .filter(|remainder| is_phone_number(remainder));

    let number = match (explicit, implicit) {
        (Some(remainder), _) => remainder,
        (None, true) => query,
        (None, false) => return None,
    };

    Some(PhoneMatch {
        number,
        call: implicit || is_call_trigger,
        text: implicit || is_sms_trigger,
    })
}

fn detect_email(query: &str) -> Option<&str> {
    if let Some(remainder) = strip_trigger(query, EMAIL_TRIGGERS) {
        if is_email_address(remainder) {
            return Some(remainder);
        }
    }

    is_email_address(query).then_some(query)
}

/// Strip the first matching trigger (ASCII case-insensitive) and trim the rest.
fn strip_trigger<'a>(query: &'a str, triggers: &[&str]) -> Option<&'a str> {
    triggers.iter().find_map(|trigger| {
        let head = query.get(..trigger.len())?;
        head.eq_ignore_ascii_case(trigger)
            .then(|| query[trigger.len()..].trim())
    })
}

/// Prefix `https://` unless the text already names an http(s) scheme.
pub fn normalize_url(text: &str) -> String {
    if text.starts_with("http://") || text.starts_with("https://") {
        text.to_string()
    } else {
        format!("https://{}", text)
    }
}

fn call_action(number: &str) -> SearchResult {
    smart_action(
        format!("smart_action_call_{}", number),
        format!("Call {}", number),
        "Phone",
        SystemIcon::Call,
        "com.android.dialer",
        format!("tel:{}", number),
        CALL_SCORE,
    )
}

fn sms_action(number: &str) -> SearchResult {
    smart_action(
        format!("smart_action_sms_{}", number),
        format!("Text {}", number),
        "SMS",
        SystemIcon::Message,
        "com.android.mms",
        format!("sms:{}", number),
        SMS_SCORE,
    )
}

fn email_action(address: &str) -> SearchResult {
    smart_action(
        format!("smart_action_email_{}", address),
        format!("Send Email to {}", address),
        "Email",
        SystemIcon::Email,
        "com.android.email",
        format!("mailto:{}", address),
        EMAIL_SCORE,
    )
}

fn url_action(query: &str) -> SearchResult {
    smart_action(
        format!("smart_action_url_{}", query),
        format!("Open {}", query),
        "Website",
        SystemIcon::Browser,
        "com.android.chrome",
        normalize_url(query),
        URL_SCORE,
    )
}

fn smart_action(
    id: String,
    title: String,
    subtitle: &str,
    icon: SystemIcon,
    package_name: &str,
    deep_link: String,
    ranking_score: i32,
) -> SearchResult {
    SearchResult::Content {
        id,
        namespace: NAMESPACE.to_string(),
        title,
        subtitle: Some(subtitle.to_string()),
        icon: Some(IconRef::System { icon }),
        package_name: Some(package_name.to_string()),
        deep_link: Some(deep_link),
        ranking_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn bare_number_yields_call_and_text() {
        let results = detect("5551234");
        assert_eq!(
            ids(&results),
            vec!["smart_action_call_5551234", "smart_action_sms_5551234"]
        );
        assert_eq!(results[0].ranking_score(), 100);
        assert_eq!(results[1].ranking_score(), 99);
    }

    #[test]
    fn formatted_number_is_a_phone() {
        let results = detect("+1 (555) 123-4567");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title(), "Call +1 (555) 123-4567");
    }

    #[test]
    fn call_trigger_threshold_is_three_chars() {
        let results = detect("call 911");
        assert_eq!(ids(&results), vec!["smart_action_call_911"]);

        assert!(detect("call 91").is_empty());
    }

    #[test]
    fn sms_trigger_yields_text_only() {
        let results = detect("sms 12345");
        assert_eq!(ids(&results), vec!["smart_action_sms_12345"]);
        assert_eq!(results[0].ranking_score(), 99);
    }

    #[test]
    fn text_trigger_strips_five_chars() {
        let results = detect("Text  555 0100");
        assert_eq!(ids(&results), vec!["smart_action_sms_555 0100"]);
    }

    #[test]
    fn trigger_with_non_phone_remainder_falls_through() {
        assert!(detect("call mom").is_empty());
        assert!(detect("text me later").is_empty());
    }

    #[test]
    fn email_implicit_and_triggered() {
        let results = detect("ada@example.org");
        assert_eq!(
            ids(&results),
            vec![
                "smart_action_email_ada@example.org",
                "smart_action_url_ada@example.org"
            ]
        );
        assert_eq!(results[0].ranking_score(), 100);
        assert_eq!(results[1].ranking_score(), 98);

        let results = detect("mailto grace@navy.mil");
        assert_eq!(ids(&results), vec!["smart_action_email_grace@navy.mil"]);

        let results = detect("EMAIL ada@example.org");
        assert_eq!(results[0].title(), "Send Email to ada@example.org");

        assert!(detect("email nobody").is_empty());
    }

    #[test]
    fn url_is_normalized() {
        let results = detect("example.com/docs");
        assert_eq!(ids(&results), vec!["smart_action_url_example.com/docs"]);
        assert_eq!(results[0].ranking_score(), 98);
        match &results[0] {
            SearchResult::Content { deep_link, .. } => {
                assert_eq!(deep_link.as_deref(), Some("https://example.com/docs"))
            }
            other => panic!("unexpected result {:?}", other),
        }

        let results = detect("http://example.com");
        match &results[0] {
            SearchResult::Content { deep_link, .. } => {
                assert_eq!(deep_link.as_deref(), Some("http://example.com"))
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn url_accepts_user_info() {
        assert!(is_web_url("user:pw@example.com/x"));
        assert!(is_web_url("https://ops@intranet.example.com:8443/"));
        assert!(!is_web_url("user@@example.com"));
        assert!(!is_web_url("@example"));
    }

    #[test]
    fn plain_words_yield_nothing() {
        assert!(detect("weather").is_empty());
        assert!(detect("maps tokyo").is_empty());
        assert!(detect("").is_empty());
    }

    #[test]
    fn trigger_stripping_handles_multibyte_queries() {
        assert!(detect("é").is_empty());
        assert!(detect("cal€ 911").is_empty());
    }
}
