use crate::evidence::EvidenceRecord;

/// Which reviewer path produced (or would produce) a verdict. Part of the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewKind {
    Text,
    Visual,
}

impl ReviewKind {
    #[inline]
    pub fn as_tag(&self) -> &'static str {
        match self {
            ReviewKind::Text => "text",
            ReviewKind::Visual => "visual",
        }
    }
}

impl std::fmt::Display for ReviewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Content handed to the backend.
#[derive(Debug, Clone, Copy)]
pub enum ReviewPayload<'a> {
    Text(&'a str),
    Visual(&'a [u8]),
}

impl ReviewPayload<'_> {
    pub fn kind(&self) -> ReviewKind {
        match self {
            ReviewPayload::Text(_) => ReviewKind::Text,
            ReviewPayload::Visual(_) => ReviewKind::Visual,
        }
    }
}

/// Why the gateway answered with a neutral record instead of a remote verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradeReason {
    /// Payload could not be fingerprinted (missing or empty content).
    NoFingerprint,
    /// Gateway disabled or backend lacks credentials.
    Disabled,
    /// Sliding-window call ceiling reached.
    RateLimited,
    /// Remote call failed, timed out, or returned a malformed payload.
    Failed(String),
}

impl std::fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradeReason::NoFingerprint => write!(f, "no content fingerprint"),
            DegradeReason::Disabled => write!(f, "reviewer disabled"),
            DegradeReason::RateLimited => write!(f, "reviewer rate limited"),
            DegradeReason::Failed(reason) => write!(f, "reviewer failure: {}", reason),
        }
    }
}

/// Result of a gateway review. Never an error: failures arrive as [`ReviewOutcome::Degraded`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    /// Fresh verdict from the remote backend.
    Reviewed(EvidenceRecord),
    /// Verdict served from the cache inside the cooldown window.
    Cached(EvidenceRecord),
    /// Neutral fallback.
    Degraded {
        reason: DegradeReason,
        record: EvidenceRecord,
    },
}

impl ReviewOutcome {
    pub fn degraded(reason: DegradeReason) -> Self {
        let record = EvidenceRecord::neutral(reason.to_string());
        ReviewOutcome::Degraded { reason, record }
    }

    pub fn record(&self) -> &EvidenceRecord {
        match self {
            ReviewOutcome::Reviewed(record)
            | ReviewOutcome::Cached(record)
            | ReviewOutcome::Degraded { record, .. } => record,
        }
    }

    pub fn into_record(self) -> EvidenceRecord {
        match self {
            ReviewOutcome::Reviewed(record)
            | ReviewOutcome::Cached(record)
            | ReviewOutcome::Degraded { record, .. } => record,
        }
    }

    pub fn degrade_reason(&self) -> Option<&DegradeReason> {
        match self {
            ReviewOutcome::Degraded { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ReviewOutcome::Degraded { .. })
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, ReviewOutcome::Cached(_))
    }

    /// Short status string for logs and decision traces.
    pub fn status(&self) -> &'static str {
        match self {
            ReviewOutcome::Reviewed(_) => "REVIEWED",
            ReviewOutcome::Cached(_) => "CACHED",
            ReviewOutcome::Degraded { .. } => "DEGRADED",
        }
    }
}
