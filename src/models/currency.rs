use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum Currency {
    Eur,
    Usd,
    Brl,
}

impl Currency {
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Usd => "USD",
            Self::Brl => "BRL",
        }
    }

    pub(crate) fn symbol(&self) -> &'static str {
        match self {
            Self::Eur => "€",
            Self::Usd => "$",
            Self::Brl => "R$",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EUR" | "€" => Some(Self::Eur),
            "USD" | "$" => Some(Self::Usd),
            "BRL" | "R$" => Some(Self::Brl),
            _ => None,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
