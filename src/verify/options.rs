use phf::phf_set;

use crate::probe::ProbeOptions;

/// Default provider domains reported as `is_known_provider`.
static DEFAULT_KNOWN_PROVIDERS: phf::Set<&'static str> = phf_set! {
    "gmail.com",
    "outlook.com",
    "icloud.com",
    "yahoo.com",
    "projectexodus.net",
};

/// Controls one verification run.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Provider domains matched case-insensitively. Informational only:
    /// membership never changes the verdict.
    pub known_providers: Vec<String>,
    pub probe: ProbeOptions,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            known_providers: DEFAULT_KNOWN_PROVIDERS
                .iter()
                .map(|domain| (*domain).to_string())
                .collect(),
            probe: ProbeOptions::default(),
        }
    }
}

impl VerifyOptions {
    pub(crate) fn is_known_provider(&self, domain: &str) -> bool {
        self.known_providers
            .iter()
            .any(|provider| provider.eq_ignore_ascii_case(domain))
    }
}
