// file: src/extractor/annotate.rs
// description: post-extraction annotations for private networks and known-benign infrastructure
// reference: rfc 1918 / rfc 3927 ranges, workflow ignore marker

use crate::models::{Observable, ObservableType, TAG_PRIVATE_NETWORK, TAG_WORKFLOW_IGNORE};
use ::url::{Host, Url};
use std::collections::HashSet;
use std::net::Ipv4Addr;

/// Domains that show up in almost every report and are never indicators.
pub const DEFAULT_WHITELIST: [&str; 10] = [
    "github.com",
    "google.com",
    "microsoft.com",
    "apple.com",
    "amazon.com",
    "example.com",
    "localhost",
    "archive.ph",
    "archive.org",
    "web.archive.org",
];

pub trait Annotator: Send + Sync {
    fn annotate(&self, observable: &mut Observable);
}

/// Tags addresses that can never be reached from the internet.
pub struct PrivateNetworkAnnotator;

impl PrivateNetworkAnnotator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PrivateNetworkAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

fn is_private_ip(ip: &Ipv4Addr) -> bool {
    ip.is_private() || ip.is_loopback() || ip.is_link_local()
}

fn url_host(value: &str) -> Option<Host<String>> {
    Url::parse(value).ok()?.host().map(|h| h.to_owned())
}

impl Annotator for PrivateNetworkAnnotator {
    fn annotate(&self, observable: &mut Observable) {
        let private = match observable.kind {
            ObservableType::Ipv4 => observable
                .value
                .parse::<Ipv4Addr>()
                .is_ok_and(|ip| is_private_ip(&ip)),
            ObservableType::Url => {
                matches!(url_host(&observable.value), Some(Host::Ipv4(ip)) if is_private_ip(&ip))
            }
            _ => false,
        };
        if private {
            observable.add_tag(TAG_PRIVATE_NETWORK);
        }
    }
}

/// Marks observables on whitelisted domains (or their subdomains) so the
/// downstream workflow can skip them. The observable itself is kept.
pub struct WhitelistAnnotator {
    domains: HashSet<String>,
}

impl WhitelistAnnotator {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_end_matches('.').to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    pub fn is_whitelisted(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_lowercase();
        let mut candidate = host.as_str();
        loop {
            if self.domains.contains(candidate) {
                return true;
            }
            match candidate.split_once('.') {
                Some((_, parent)) => candidate = parent,
                None => return false,
            }
        }
    }
}

impl Default for WhitelistAnnotator {
    fn default() -> Self {
        Self::new(DEFAULT_WHITELIST)
    }
}

impl Annotator for WhitelistAnnotator {
    fn annotate(&self, observable: &mut Observable) {
        let listed = match observable.kind {
            ObservableType::Fqdn => self.is_whitelisted(&observable.value),
            ObservableType::Url => match url_host(&observable.value) {
                Some(Host::Domain(domain)) => self.is_whitelisted(&domain),
                _ => false,
            },
            _ => false,
        };
        if listed {
            observable.add_tag(TAG_WORKFLOW_IGNORE);
        }
    }
}
