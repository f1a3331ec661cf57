use std::time::Duration;

use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::{Resolver, error::ResolveError, error::ResolveErrorKind};

use super::{Error, MxRecord, MxStatus};

const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(5);

/// Lookup MX records for `domain`.
///
/// The domain is normalized via IDNA before querying DNS. The resulting
/// [`MxStatus`] lists records ascending by priority; ties keep the order the
/// resolver returned them in.
pub fn check_mx(domain: &str) -> Result<MxStatus, Error> {
    let ascii = normalize_domain(domain)?;
    let resolver = bounded_resolver(DEFAULT_DNS_TIMEOUT)?;
    resolve_with(&resolver, &ascii)
}

/// Cheap existence check: does `domain` publish at least one MX record?
///
/// Lookup failures count as "no usable mail exchange" and yield `false`.
pub fn has_mx_record(domain: &str) -> bool {
    matches!(check_mx(domain), Ok(MxStatus::Records(_)))
}

/// Resolver with a bounded per-query timeout, so an unresponsive DNS server
/// cannot stall the pipeline.
pub(crate) fn bounded_resolver(timeout: Duration) -> Result<Resolver, Error> {
    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.attempts = 2;
    Resolver::new(ResolverConfig::default(), opts).map_err(Error::resolver_init)
}

pub(crate) fn resolve_with<R>(resolver: &R, ascii_domain: &str) -> Result<MxStatus, Error>
where
    R: LookupMx,
{
    let mut records = resolver
        .lookup_mx(ascii_domain)
        .map_err(|source| Error::lookup(ascii_domain, source))?;

    // stable sort: equal priorities must keep resolver order
    records.sort_by_key(|record| record.priority);

    debug!(
        domain = ascii_domain,
        records = records.len(),
        "mx lookup complete"
    );

    if records.is_empty() {
        Ok(MxStatus::NoRecords)
    } else {
        Ok(MxStatus::Records(records))
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, Error> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(Error::idna)
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

pub(crate) trait LookupMx {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = match Resolver::mx_lookup(self, domain) {
            Ok(lookup) => lookup,
            // an authoritative "no records" answer is not a transport failure
            Err(err) if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }
}

#[cfg(test)]
impl LookupMx for crate::mx::tests::StubResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        (self.on_lookup)(domain)
    }
}
