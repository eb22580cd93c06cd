//! Static denylist of destination domains, host keywords and TLDs.
//!
//! The lists are compiled into the binary and never mutated at runtime.

/// Read-only denylist consulted by [`crate::utils::url_validator::UrlValidator`].
#[derive(Debug)]
pub struct Blocklist {
    /// Blocked registrable domains. Subdomains are blocked too.
    pub domains: &'static [&'static str],
    /// Substrings that must not appear anywhere in the host.
    pub keywords: &'static [&'static str],
    /// Blocked top-level domains, including the leading dot.
    pub tlds: &'static [&'static str],
}

/// Process-wide denylist.
pub static BLOCKLIST: Blocklist = Blocklist {
    domains: &["malicious-site.com", "spam-domain.com", "phishing-example.com"],
    keywords: &[
        "porn", "xxx", "adult", "gambling", "bet", "warez", "crack", "hack", "pirate", "malware",
        "phishing",
    ],
    tlds: &[".xxx", ".sex", ".porn", ".adult"],
};

impl Blocklist {
    /// Returns the blocked domain matching `host` exactly or as a parent domain.
    pub fn blocked_domain(&self, host: &str) -> Option<&'static str> {
        self.domains.iter().copied().find(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    /// Returns the blocked TLD `host` ends with.
    pub fn blocked_tld(&self, host: &str) -> Option<&'static str> {
        self.tlds.iter().copied().find(|tld| host.ends_with(tld))
    }

    /// Returns the first blocked keyword contained in `host`.
    pub fn blocked_keyword(&self, host: &str) -> Option<&'static str> {
        self.keywords.iter().copied().find(|kw| host.contains(kw))
    }
}
