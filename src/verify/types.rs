/// Composite deliverability report for a well-formed address.
///
/// `is_valid` holds only when the domain publishes an MX record *and* the
/// probed exchange accepted the recipient. `is_known_provider` is purely
/// informational and never influences `is_valid`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverabilityReport {
    pub is_valid: bool,
    pub domain: String,
    pub is_known_provider: bool,
    pub has_mx_record: bool,
    pub smtp_detail: String,
}

/// Sole output of the verification pipeline.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationVerdict {
    /// The address failed the shape check; no network access was attempted.
    InvalidFormat { reason: String },
    /// The address was checked against DNS and its mail exchange.
    Checked(DeliverabilityReport),
}

impl VerificationVerdict {
    pub(crate) fn invalid_format() -> Self {
        Self::InvalidFormat {
            reason: "Invalid email format".to_string(),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Self::InvalidFormat { .. } => false,
            Self::Checked(report) => report.is_valid,
        }
    }
}
