//! Natural-language command interpreter.
//!
//! Turns a phrase such as `"Gravar 12 euros café starbucks"` into an amount,
//! a description and a category. Pure and synchronous: the rule and keyword
//! tables are built once and only read afterwards, so one [`Interpreter`]
//! can serve any number of callers.

mod error;
mod extract;

pub(crate) use error::{NoMatch, Rejection, RuleTableError};
pub(crate) use extract::{Extraction, Extractor, MAX_AMOUNT, MIN_DESCRIPTION_CHARS};

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::categorize::Categorizer;
use crate::models::{Category, TransactionType};
use extract::AmountSpotter;

pub(crate) const UNRECOGNIZED_COMMAND: &str = "Formato de comando não reconhecido";

pub(crate) const EXAMPLE_COMMANDS: &[&str] = &[
    "Gravar 15 euros pizza delivery",
    "Paguei 8 reais café da manhã",
    "Gastei 25 euros uber centro",
    "Comprei 12 euros supermercado",
    "15 euros jantar restaurante",
];

pub(crate) const SPEAKING_TIP: &str = "Fale de forma natural: 'Gravar [valor] euros [descrição]'";

/// A command that was understood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Interpretation {
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) amount: Decimal,
    pub(crate) category: Category,
    pub(crate) description: String,
    pub(crate) rule_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Diagnostics {
    pub(crate) command_length: usize,
    pub(crate) has_numbers: bool,
    pub(crate) patterns_tested: usize,
    /// Candidates that matched a rule but failed validation, in rule order.
    pub(crate) rejections: Vec<String>,
}

/// A command that was not understood, with hints for the speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Failure {
    #[serde(rename = "error")]
    pub(crate) reason: String,
    pub(crate) examples: Vec<String>,
    pub(crate) received_command: String,
    pub(crate) tip: String,
    pub(crate) diagnostics: Diagnostics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommandOutcome {
    Success(Interpretation),
    Failure(Failure),
}

impl CommandOutcome {
    pub(crate) fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum OutcomeBody<'a> {
    Success(&'a Interpretation),
    Failure(&'a Failure),
}

#[derive(Serialize)]
struct OutcomeRecord<'a> {
    success: bool,
    #[serde(flatten)]
    body: OutcomeBody<'a>,
}

// Wire shape: `{"success": true, ...Interpretation}` or `{"success": false, ...Failure}`.
impl Serialize for CommandOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = match self {
            Self::Success(i) => OutcomeRecord {
                success: true,
                body: OutcomeBody::Success(i),
            },
            Self::Failure(f) => OutcomeRecord {
                success: false,
                body: OutcomeBody::Failure(f),
            },
        };
        record.serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Confidence {
    High,
    Medium,
}

/// Result of classifying free text that is not a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Classification {
    pub(crate) category: Category,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) amount: Decimal,
    #[serde(rename = "type")]
    pub(crate) kind: TransactionType,
    pub(crate) confidence: Confidence,
}

pub(crate) struct Interpreter {
    extractor: Extractor,
    categorizer: Categorizer,
    spotter: AmountSpotter,
}

impl Interpreter {
    pub(crate) fn new() -> Result<Self, RuleTableError> {
        Self::with_categorizer(Categorizer::default())
    }

    pub(crate) fn with_categorizer(categorizer: Categorizer) -> Result<Self, RuleTableError> {
        Ok(Self {
            extractor: Extractor::new()?,
            categorizer,
            spotter: AmountSpotter::new()?,
        })
    }

    pub(crate) fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub(crate) fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    pub(crate) fn extract(&self, text: &str) -> Result<Extraction, NoMatch> {
        self.extractor.extract(text)
    }

    pub(crate) fn categorize(&self, description: &str) -> Category {
        self.categorizer.categorize(description)
    }

    pub(crate) fn interpret(&self, raw_text: &str) -> CommandOutcome {
        let command = extract::normalize(raw_text);
        match self.extractor.extract(&command) {
            Ok(extraction) => {
                let category = self.categorizer.categorize(&extraction.description);
                CommandOutcome::Success(Interpretation {
                    amount: extraction.amount,
                    category,
                    description: extraction.description,
                    rule_index: extraction.rule_index,
                })
            }
            Err(no_match) => {
                debug!(
                    structural = no_match.is_structural(),
                    semantic = no_match.rejections.iter().filter(|r| r.is_semantic()).count(),
                    rejected = ?no_match.rejections.iter().map(Rejection::rule_index).collect::<Vec<_>>(),
                    "command not recognized"
                );
                CommandOutcome::Failure(Failure {
                    reason: UNRECOGNIZED_COMMAND.to_string(),
                    examples: EXAMPLE_COMMANDS.iter().map(|e| e.to_string()).collect(),
                    diagnostics: Diagnostics {
                        command_length: command.chars().count(),
                        has_numbers: self.extractor.has_digit(&command),
                        patterns_tested: no_match.rules_tried,
                        rejections: no_match.rejections.iter().map(|r| r.to_string()).collect(),
                    },
                    received_command: command,
                    tip: SPEAKING_TIP.to_string(),
                })
            }
        }
    }

    /// Categorizes arbitrary text and picks up a currency-marked amount if one
    /// is present. Always reports an expense.
    pub(crate) fn classify(&self, text: &str) -> Classification {
        let amount = self.spotter.spot(text).unwrap_or(Decimal::ZERO);
        Classification {
            category: self.categorizer.categorize(text),
            amount,
            kind: TransactionType::Expense,
            confidence: if amount > Decimal::ZERO {
                Confidence::High
            } else {
                Confidence::Medium
            },
        }
    }
}

#[cfg(test)]
mod tests;
