/// One mail-exchange entry for a domain. Lower `priority` means higher
/// precedence.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub exchange: String,
    pub priority: u16,
}

impl MxRecord {
    pub fn new(priority: u16, exchange: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            priority,
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MxStatus {
    /// Non-empty, sorted ascending by priority; equal priorities keep the
    /// order the resolver returned them in.
    Records(Vec<MxRecord>),
    NoRecords,
}

impl MxStatus {
    pub fn records(&self) -> &[MxRecord] {
        match self {
            Self::Records(records) => records.as_slice(),
            Self::NoRecords => &[],
        }
    }

    pub fn has_records(&self) -> bool {
        !self.records().is_empty()
    }
}
