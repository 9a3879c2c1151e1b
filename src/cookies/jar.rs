//! In-memory cookie jar
//!
//! Default [`CookieStore`] implementation. Scoping follows RFC 6265 request
//! matching: host-only vs. domain cookies, default-path computation,
//! path-match, secure-only over https, and expiry via Max-Age (priority) or
//! Expires. Same-scope cookies (name, domain, path) replace each other;
//! distinct scopes with the same name are kept side by side.

use time::{Duration, OffsetDateTime};
use tracing::debug;
use url::Url;

use super::{parse_set_cookie, CookieStore, RawCookie};

#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    value: String,
    domain: String,
    host_only: bool,
    path: String,
    secure: bool,
    /// `None` means a session cookie, kept for the lifetime of the jar
    expires_at: Option<OffsetDateTime>,
    /// Insertion order, used to break path-length ties when serializing
    sequence: u64,
}

impl StoredCookie {
    fn is_expired(&self, now: OffsetDateTime) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }

    fn domain_matches(&self, host: &str) -> bool {
        if self.host_only {
            return host == self.domain;
        }
        host == self.domain || host.ends_with(&format!(".{}", self.domain))
    }

    fn path_matches(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }
        if !request_path.starts_with(&self.path) {
            return false;
        }
        self.path.ends_with('/') || request_path[self.path.len()..].starts_with('/')
    }
}

/// Default in-memory cookie store, one per walk.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Vec<StoredCookie>,
    next_sequence: u64,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired cookies currently stored.
    pub fn len(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        self.cookies.iter().filter(|c| !c.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn store(&mut self, raw: RawCookie, url: &Url) {
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return;
        };

        let (domain, host_only) = match raw.domain {
            Some(domain) => {
                // A response may only set cookies for its own registrable scope.
                if host != domain && !host.ends_with(&format!(".{domain}")) {
                    debug!(%host, %domain, "rejecting out-of-scope domain cookie");
                    return;
                }
                (domain, false)
            }
            None => (host, true),
        };

        let path = match raw.path {
            Some(path) if path.starts_with('/') => path,
            _ => default_path(url),
        };

        let now = OffsetDateTime::now_utc();
        let expires_at = match raw.max_age {
            Some(seconds) => Some(now + Duration::seconds(seconds)),
            None => raw.expires,
        };

        self.cookies.retain(|existing| {
            existing.name != raw.name || existing.domain != domain || existing.path != path
        });

        // An already-expired directive is a deletion, not an insert.
        if matches!(expires_at, Some(at) if at <= now) {
            return;
        }

        self.cookies.push(StoredCookie {
            name: raw.name,
            value: raw.value,
            domain,
            host_only,
            path,
            secure: raw.secure,
            expires_at,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
    }
}

impl CookieStore for MemoryCookieJar {
    fn cookie_string_for(&self, url: &Url) -> String {
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return String::new();
        };
        let secure_channel = url.scheme() == "https" || url.scheme() == "wss";
        let request_path = if url.path().is_empty() { "/" } else { url.path() };
        let now = OffsetDateTime::now_utc();

        let mut matches: Vec<&StoredCookie> = self
            .cookies
            .iter()
            .filter(|c| !c.is_expired(now))
            .filter(|c| !c.secure || secure_channel)
            .filter(|c| c.domain_matches(&host))
            .filter(|c| c.path_matches(request_path))
            .collect();

        // Longer paths first, then oldest first, the order browsers send them.
        matches.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then(a.sequence.cmp(&b.sequence))
        });

        matches
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn absorb(&mut self, set_cookie: &str, url: &Url) {
        match parse_set_cookie(set_cookie) {
            Some(raw) => self.store(raw, url),
            None => debug!(line = %set_cookie, "ignoring malformed set-cookie directive"),
        }
    }
}

/// Default cookie path for a request URL, per RFC 6265 section 5.1.4.
fn default_path(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() || !path.starts_with('/') {
        return "/".to_string();
    }
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(last_slash) => path[..last_slash].to_string(),
    }
}
