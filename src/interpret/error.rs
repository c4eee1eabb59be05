use rust_decimal::Decimal;
use thiserror::Error;

/// Why a structurally matched rule was not accepted. Rejections never abort
/// extraction; the next rule is tried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum Rejection {
    #[error("rule {rule_index}: amount {amount} is outside (0, 10000]")]
    AmountOutOfRange { rule_index: usize, amount: Decimal },

    #[error("rule {rule_index}: description {description:?} is shorter than 2 characters")]
    DescriptionTooShort {
        rule_index: usize,
        description: String,
    },

    #[error("rule {rule_index}: {raw:?} is not a valid number")]
    MalformedNumber { rule_index: usize, raw: String },
}

impl Rejection {
    pub(crate) fn rule_index(&self) -> usize {
        match self {
            Self::AmountOutOfRange { rule_index, .. }
            | Self::DescriptionTooShort { rule_index, .. }
            | Self::MalformedNumber { rule_index, .. } => *rule_index,
        }
    }

    /// Bounds or length check failed on a well-formed candidate.
    pub(crate) fn is_semantic(&self) -> bool {
        matches!(
            self,
            Self::AmountOutOfRange { .. } | Self::DescriptionTooShort { .. }
        )
    }
}

/// Outcome of an extraction that accepted no rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no extraction rule accepted the command ({rules_tried} rules tried, {} rejected)", .rejections.len())]
pub(crate) struct NoMatch {
    pub(crate) rules_tried: usize,
    pub(crate) rejections: Vec<Rejection>,
}

impl NoMatch {
    /// No rule matched the shape of the input at all.
    pub(crate) fn is_structural(&self) -> bool {
        self.rejections.is_empty()
    }
}

#[derive(Debug, Error)]
pub(crate) enum RuleTableError {
    #[error("extraction rule table is empty")]
    Empty,

    #[error("extraction rule {index} ({pattern:?}) does not compile")]
    InvalidPattern {
        index: usize,
        pattern: &'static str,
        #[source]
        source: regex::Error,
    },
}
