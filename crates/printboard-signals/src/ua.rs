//! Browser and OS classification from a user-agent string.
//!
//! Ordered substring rules, first match wins. Order matters: Chromium-based
//! browsers also advertise `Chrome` and `Safari`, so the specific names are
//! checked first.

const BROWSER_RULES: &[(&str, &[&str])] = &[
    ("Firefox", &["Firefox"]),
    ("Samsung Browser", &["SamsungBrowser"]),
    ("Opera", &["Opera", "OPR"]),
    ("Edge", &["Edge", "Edg/"]),
    ("Chrome", &["Chrome"]),
    ("Safari", &["Safari"]),
];

const OS_RULES: &[(&str, &[&str])] = &[
    ("Windows", &["Windows"]),
    ("MacOS", &["Mac"]),
    ("Linux", &["Linux"]),
    ("Android", &["Android"]),
    ("iOS", &["iOS", "iPhone", "iPad"]),
];

pub const UNCLASSIFIED: &str = "Unknown";

fn classify(user_agent: &str, rules: &[(&'static str, &[&str])]) -> &'static str {
    rules
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| user_agent.contains(n)))
        .map(|(name, _)| *name)
        .unwrap_or(UNCLASSIFIED)
}

pub fn classify_browser(user_agent: &str) -> &'static str {
    classify(user_agent, BROWSER_RULES)
}

pub fn classify_os(user_agent: &str) -> &'static str {
    classify(user_agent, OS_RULES)
}
