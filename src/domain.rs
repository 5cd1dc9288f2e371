/// Hostname extraction for provider templates and the domain set behind the header rules
use std::collections::BTreeSet;

use url::Url;

/// Extract the hostname from a URL or provider template
///
/// The placeholder token is left in place; it only ever appears in the
/// path or query, so it never affects the host.
///
/// Examples:
/// - https://translate.google.com/?sl=auto&tl=en&text=%s → translate.google.com
/// - https://www.perplexity.ai/?q=%s → www.perplexity.ai
/// - http://localhost:3000/x → localhost
/// - not-a-url → None
pub fn extract_domain(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = Url::parse(trimmed).ok()?;
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(|host| host.to_lowercase())
}

/// Collect the distinct hostnames of a list of URLs, skipping malformed entries
pub fn collect_domains<I, S>(urls: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    urls.into_iter()
        .filter_map(|url| extract_domain(url.as_ref()))
        .collect()
}

/// Whether `host` is `domain` itself or one of its subdomains
pub fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.to_lowercase();
    let domain = domain.to_lowercase();

    host == domain
        || host
            .strip_suffix(domain.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}
