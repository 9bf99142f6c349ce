//! Intent module - business purpose of a document

use serde::{Serialize, Serializer};
use std::fmt;

/// Business intent of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Billing, payment requests, statements requiring payment
    Invoice,

    /// Request for quotation: pricing, proposals, vendor quotes
    Rfq,

    /// Dissatisfaction, problems or grievances about products or services
    Complaint,

    /// Rules, legal documents, compliance requirements, policies
    Regulation,

    /// Anything that does not clearly fit the categories above
    Other,
}

impl Intent {
    /// Every intent the oracle may return, in prompt order
    pub const ALL: [Intent; 5] = [
        Intent::Invoice,
        Intent::Rfq,
        Intent::Complaint,
        Intent::Regulation,
        Intent::Other,
    ];

    /// Get the intent name as sent to and returned by the oracle
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Invoice => "Invoice",
            Intent::Rfq => "RFQ",
            Intent::Complaint => "Complaint",
            Intent::Regulation => "Regulation",
            Intent::Other => "Other",
        }
    }

    /// Parse an intent name exactly as the oracle is instructed to spell it
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|intent| intent.as_str() == s)
    }

    /// Map any oracle value onto the closed set, unknown values become `Other`
    pub fn coerce(s: &str) -> Self {
        Self::parse(s).unwrap_or(Intent::Other)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why no business intent could be determined
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IntentFailure {
    /// The oracle client was never configured
    ClientNotInitialized,

    /// Analyzable content was empty, the oracle was not called
    EmptyContent,

    /// Raw input was empty, the oracle was not called
    EmptyInput,

    /// Oracle JSON had no usable `intent` value
    MalformedResponse,

    /// Oracle refused the prompt on safety grounds
    PromptBlocked {
        /// Reason reported by the oracle
        reason: String,
    },

    /// Oracle text contained no parseable intent object
    ParsingResponse,

    /// Oracle returned no text at all
    EmptyResponse,

    /// The oracle call itself failed
    OracleCall,
}

impl IntentFailure {
    /// External tag for this failure
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentFailure::ClientNotInitialized => "Error_ClientNotInitialized",
            IntentFailure::EmptyContent => "Unknown_EmptyContent",
            IntentFailure::EmptyInput => "Unknown_EmptyInput",
            IntentFailure::MalformedResponse => "Error_MalformedResponse",
            IntentFailure::PromptBlocked { .. } => "Error_PromptBlocked",
            IntentFailure::ParsingResponse => "Error_ParsingResponse",
            IntentFailure::EmptyResponse => "Error_EmptyResponseFromAPI",
            IntentFailure::OracleCall => "Error_IntentAPI",
        }
    }
}

impl fmt::Display for IntentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of intent classification: an intent or a failure tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IntentOutcome {
    /// The oracle produced an intent
    Classified(Intent),

    /// No intent could be determined
    Failed(IntentFailure),
}

impl IntentOutcome {
    /// External tag (`"Invoice"`, `"Error_PromptBlocked"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentOutcome::Classified(intent) => intent.as_str(),
            IntentOutcome::Failed(failure) => failure.as_str(),
        }
    }

    /// The classified intent, if any
    pub fn intent(&self) -> Option<Intent> {
        match self {
            IntentOutcome::Classified(intent) => Some(*intent),
            IntentOutcome::Failed(_) => None,
        }
    }

    /// Whether classification failed
    pub fn is_failure(&self) -> bool {
        matches!(self, IntentOutcome::Failed(_))
    }
}

impl From<Intent> for IntentOutcome {
    fn from(intent: Intent) -> Self {
        IntentOutcome::Classified(intent)
    }
}

impl From<IntentFailure> for IntentOutcome {
    fn from(failure: IntentFailure) -> Self {
        IntentOutcome::Failed(failure)
    }
}

impl fmt::Display for IntentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IntentOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
