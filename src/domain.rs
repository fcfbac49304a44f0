/// Domain label resolution for sorting and grouping tabs
use std::cmp::Ordering;
use url::{Host, Url};

/// Label for new-tab pages; always sorts last
pub const NEW_TAB_DOMAIN: &str = "new";

/// Label for tabs without a usable web URL
pub const SYSTEM_DOMAIN: &str = "system";

/// Label for local files
pub const FILE_DOMAIN: &str = "file";

const NEW_TAB_PREFIXES: &[&str] = &[
    "chrome://newtab",
    "chrome-search://local-ntp",
    "edge://newtab",
    "about:newtab",
    "about:home",
];

/// Resolve the domain label of a tab URL, treating an absent URL as a system page
pub fn domain_label(url: Option<&str>) -> String {
    url.map(extract_domain)
        .unwrap_or_else(|| SYSTEM_DOMAIN.to_string())
}

/// Extract the domain label from a URL with smart TLD handling
///
/// Algorithm:
/// 1. New-tab pages → "new"
/// 2. Parse the URL; unparseable input → "system"
/// 3. Web schemes (http, https, ftp):
///    - IP hosts and single-label hosts (localhost) are returned as-is
///    - if the TLD is 2 letters AND second-to-last is "co" or "com":
///      → last 3 labels (e.g., "example.com.au", "bbc.co.uk")
///    - else → last 2 labels (e.g., "microsoft.com", "zinfandel.io")
/// 4. file: → "file"; every other scheme → "system"
///
/// Examples:
/// - https://www.google.com/search → google.com
/// - https://news.bbc.co.uk/article → bbc.co.uk
/// - chrome://newtab/ → new
/// - chrome://extensions/ → system
pub fn extract_domain(url: &str) -> String {
    let url = url.trim();
    if NEW_TAB_PREFIXES.iter().any(|prefix| url.starts_with(prefix)) {
        return NEW_TAB_DOMAIN.to_string();
    }

    let Ok(parsed) = Url::parse(url) else {
        return SYSTEM_DOMAIN.to_string();
    };

    match parsed.scheme() {
        "http" | "https" | "ftp" => match parsed.host() {
            Some(Host::Domain(hostname)) => registrable_domain(hostname),
            Some(ip) => ip.to_string(),
            None => SYSTEM_DOMAIN.to_string(),
        },
        "file" => FILE_DOMAIN.to_string(),
        _ => SYSTEM_DOMAIN.to_string(),
    }
}

fn registrable_domain(hostname: &str) -> String {
    let hostname = hostname.trim_end_matches('.');
    let parts: Vec<&str> = hostname.split('.').collect();

    // Need at least 2 parts for a registrable domain
    if parts.len() < 2 {
        return hostname.to_string();
    }

    let tld = parts[parts.len() - 1];
    let num_parts = if parts.len() >= 3
        && tld.len() == 2
        && matches!(parts[parts.len() - 2], "co" | "com")
    {
        3
    } else {
        2
    };

    parts[parts.len() - num_parts..].join(".")
}

/// Order two domain labels: "new" after everything, the rest by byte-wise `str`
/// comparison. This is not locale-aware collation; hostnames are lowercase
/// ASCII or punycode after URL parsing, so the two agree on real labels.
pub fn compare_domains(a: &str, b: &str) -> Ordering {
    match (a == NEW_TAB_DOMAIN, b == NEW_TAB_DOMAIN) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}
