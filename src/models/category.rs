use serde::{Deserialize, Serialize};

/// Spending category assigned to every ledger entry.
///
/// The declaration order is significant: the categorizer scores the keyword
/// categories in this order and keeps the first maximal score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub(crate) enum Category {
    #[serde(rename = "alimentação")]
    Food,
    #[serde(rename = "transporte")]
    Transport,
    #[serde(rename = "lazer")]
    Leisure,
    #[serde(rename = "moradia")]
    Housing,
    #[serde(rename = "outros")]
    Other,
}

impl Category {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "alimentação",
            Self::Transport => "transporte",
            Self::Leisure => "lazer",
            Self::Housing => "moradia",
            Self::Other => "outros",
        }
    }

    /// Accepts the stored names, their unaccented spelling and the English labels.
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "alimentação" | "alimentacao" | "food" => Some(Self::Food),
            "transporte" | "transport" => Some(Self::Transport),
            "lazer" | "leisure" => Some(Self::Leisure),
            "moradia" | "housing" => Some(Self::Housing),
            "outros" | "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub(crate) fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Transport,
            Self::Leisure,
            Self::Housing,
            Self::Other,
        ]
    }

    /// Categories that own a keyword set, in scoring order.
    pub(crate) fn scored() -> &'static [Category] {
        &[Self::Food, Self::Transport, Self::Leisure, Self::Housing]
    }

    pub(crate) fn fallback() -> Self {
        Self::Other
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
