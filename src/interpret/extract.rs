use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use super::error::{NoMatch, Rejection, RuleTableError};

/// Largest amount a spoken command may record.
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
pub(crate) const MIN_DESCRIPTION_CHARS: usize = 2;

/// Command grammar, most specific first. Group 1 is the amount, group 2 the
/// description. The first rule whose candidate passes validation wins, so the
/// order decides ambiguous phrases and must not be shuffled.
pub(crate) const RULE_PATTERNS: &[&str] = &[
    // gravar 12 euros café
    r"gravar\s+(\d+(?:[.,]\d{1,2})?)\s+(?:euros?|reais?)\s+(.+)",
    r"gravar\s+(\d+(?:[.,]\d{1,2})?)\s+(.+)",
    // paguei 8 reais pão
    r"paguei\s+(\d+(?:[.,]\d{1,2})?)\s+(?:euros?|reais?)\s+(.+)",
    r"paguei\s+(\d+(?:[.,]\d{1,2})?)\s+(.+)",
    // gastei 25 euros uber
    r"gastei\s+(\d+(?:[.,]\d{1,2})?)\s+(?:euros?|reais?)\s+(.+)",
    r"gastei\s+(\d+(?:[.,]\d{1,2})?)\s+(.+)",
    // comprei 12 euros supermercado
    r"comprei\s+(\d+(?:[.,]\d{1,2})?)\s+(?:euros?|reais?)\s+(.+)",
    r"comprei\s+(\d+(?:[.,]\d{1,2})?)\s+(.+)",
    // adicionar 30 euros gasolina
    r"adicionar\s+(\d+(?:[.,]\d{1,2})?)\s+(?:euros?|reais?)\s+(.+)",
    r"adicionar\s+(\d+(?:[.,]\d{1,2})?)\s+(.+)",
    // gasto 5 euros estacionamento
    r"gasto\s+(\d+(?:[.,]\d{1,2})?)\s+(?:euros?|reais?)\s+(.+)",
    r"gasto\s+(\d+(?:[.,]\d{1,2})?)\s+(.+)",
    // gravar €15 pizza
    r"gravar\s+€?(\d+(?:[.,]\d{1,2})?)\s+(.+)",
    r"paguei\s+€?(\d+(?:[.,]\d{1,2})?)\s+(.+)",
    r"gastei\s+€?(\d+(?:[.,]\d{1,2})?)\s+(.+)",
    r"comprei\s+€?(\d+(?:[.,]\d{1,2})?)\s+(.+)",
    // registrar / anotar / despesa de, unit optional
    r"registrar\s+(\d+(?:[.,]\d{1,2})?)\s+(?:euros?|reais?)?\s*(.+)",
    r"anotar\s+(\d+(?:[.,]\d{1,2})?)\s+(?:euros?|reais?)?\s*(.+)",
    r"despesa\s+(?:de\s+)?(\d+(?:[.,]\d{1,2})?)\s+(?:euros?|reais?)?\s*(.+)",
    // 15 euros jantar
    r"(\d+(?:[.,]\d{1,2})?)\s+(?:euros?|reais?)\s+(.+)",
    // 15 jantar: matches nearly any text holding a number
    r"(\d+(?:[.,]\d{1,2})?)\s+(.+)",
];

/// Currency-marked amounts spotted in free text, first match wins.
pub(crate) const MONEY_PATTERNS: &[&str] = &[
    r"€(\d+(?:[.,]\d{1,2})?)",
    r"\$(\d+(?:[.,]\d{1,2})?)",
    r"(\d+(?:[.,]\d{1,2})?)€",
    r"(\d+(?:[.,]\d{1,2})?)(?:\s*euros?)",
    r"(\d+(?:[.,]\d{1,2})?)(?:\s*reais?)",
    r"r\$\s*(\d+(?:[.,]\d{1,2})?)",
    r"(\d+(?:[.,]\d{1,2})?)\s*(?:eur|usd|brl)",
];

/// Accepted candidate of one extraction rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Extraction {
    pub(crate) amount: Decimal,
    pub(crate) description: String,
    pub(crate) rule_index: usize,
}

struct CompiledRule {
    pattern: &'static str,
    regex: Regex,
}

fn compile(patterns: &'static [&'static str]) -> Result<Vec<CompiledRule>, RuleTableError> {
    if patterns.is_empty() {
        return Err(RuleTableError::Empty);
    }
    patterns
        .iter()
        .enumerate()
        .map(|(index, &pattern)| {
            Regex::new(pattern)
                .map(|regex| CompiledRule { pattern, regex })
                .map_err(|source| RuleTableError::InvalidPattern {
                    index,
                    pattern,
                    source,
                })
        })
        .collect()
}

/// Lower-cases and trims a raw command before matching.
pub(crate) fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Parses an amount token, accepting a decimal comma.
pub(crate) fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.replace(',', ".")).ok()
}

pub(crate) struct Extractor {
    rules: Vec<CompiledRule>,
    digit: Regex,
}

impl Extractor {
    pub(crate) fn new() -> Result<Self, RuleTableError> {
        Self::with_patterns(RULE_PATTERNS)
    }

    pub(crate) fn with_patterns(patterns: &'static [&'static str]) -> Result<Self, RuleTableError> {
        let digit = Regex::new(r"\d").map_err(|source| RuleTableError::InvalidPattern {
            index: 0,
            pattern: r"\d",
            source,
        })?;
        Ok(Self {
            rules: compile(patterns)?,
            digit,
        })
    }

    pub(crate) fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub(crate) fn pattern(&self, rule_index: usize) -> Option<&'static str> {
        self.rules.get(rule_index).map(|r| r.pattern)
    }

    pub(crate) fn has_digit(&self, text: &str) -> bool {
        self.digit.is_match(text)
    }

    /// Tries every rule in order and returns the first accepted candidate.
    pub(crate) fn extract(&self, text: &str) -> Result<Extraction, NoMatch> {
        let command = normalize(text);
        let mut rejections = Vec::new();

        for (rule_index, rule) in self.rules.iter().enumerate() {
            let Some(caps) = rule.regex.captures(&command) else {
                continue;
            };
            let raw_amount = caps.get(1).map_or("", |m| m.as_str());
            let description = caps.get(2).map_or("", |m| m.as_str()).trim();
            debug!(rule_index, raw_amount, description, "extraction rule matched");

            match validate(rule_index, raw_amount, description) {
                Ok(extraction) => return Ok(extraction),
                Err(rejection) => {
                    debug!(%rejection, "candidate rejected");
                    rejections.push(rejection);
                }
            }
        }

        debug!(command = %command, rejected = rejections.len(), "no extraction rule accepted");
        Err(NoMatch {
            rules_tried: self.rules.len(),
            rejections,
        })
    }
}

fn validate(rule_index: usize, raw_amount: &str, description: &str) -> Result<Extraction, Rejection> {
    let amount = parse_amount(raw_amount).ok_or_else(|| Rejection::MalformedNumber {
        rule_index,
        raw: raw_amount.to_string(),
    })?;
    if amount <= Decimal::ZERO || amount > MAX_AMOUNT {
        return Err(Rejection::AmountOutOfRange { rule_index, amount });
    }
    if description.chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(Rejection::DescriptionTooShort {
            rule_index,
            description: description.to_string(),
        });
    }
    Ok(Extraction {
        amount,
        description: description.to_string(),
        rule_index,
    })
}

/// Finds a currency-marked amount anywhere in free text.
pub(crate) struct AmountSpotter {
    patterns: Vec<CompiledRule>,
}

impl AmountSpotter {
    pub(crate) fn new() -> Result<Self, RuleTableError> {
        Ok(Self {
            patterns: compile(MONEY_PATTERNS)?,
        })
    }

    /// Amount of the first matching pattern; `None` when nothing matches or
    /// the matched token does not parse.
    pub(crate) fn spot(&self, text: &str) -> Option<Decimal> {
        let lower = text.to_lowercase();
        self.patterns
            .iter()
            .find_map(|p| p.regex.captures(&lower))
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_amount(m.as_str()))
    }
}
