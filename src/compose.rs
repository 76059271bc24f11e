//! mailto: link construction for the composition shortcut

/// Build a `mailto:` URI with percent-encoded subject and body.
pub fn mailto_link(to: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        to,
        urlencode(subject),
        urlencode(body)
    )
}

/// Placeholder recipient address derived from the customer's first name.
pub fn default_address(name: &str, domain: &str) -> String {
    let first = name
        .split_whitespace()
        .next()
        .map(|n| n.to_lowercase())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "customer".to_string());

    format!("{}@{}", first, domain)
}

/// URL-encode a string (RFC 3986 unreserved characters pass through)
fn urlencode(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '~' => result.push(c),
            _ => {
                for b in c.to_string().as_bytes() {
                    result.push_str(&format!("%{:02X}", b));
                }
            }
        }
    }
    result
}
