//! Currency conversion at commercial rates.
//!
//! A [`RateProvider`] supplies mid-market rates; the converter derives the
//! commercial rate from them and keeps each quote for an hour. When no
//! provider is configured, or it fails, a fixed fallback table is used.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Currency;

pub(crate) const QUOTE_TTL: Duration = Duration::from_secs(60 * 60);

/// Commercial rate = mid × factor. Conversions into BRL carry a wider spread.
const INTO_BRL_FACTOR: Decimal = Decimal::from_parts(9362, 0, 0, false, 4);
const DEFAULT_FACTOR: Decimal = Decimal::from_parts(98, 0, 0, false, 2);

/// (from, to, mid rate, commercial rate)
const FALLBACK_RATES: &[(Currency, Currency, Decimal, Decimal)] = &[
    (Currency::Eur, Currency::Brl, dec2(615), dec2(576)),
    (Currency::Usd, Currency::Brl, dec2(545), dec2(510)),
    (Currency::Brl, Currency::Eur, dec3(163), dec3(152)),
    (Currency::Brl, Currency::Usd, dec3(184), dec3(172)),
    (Currency::Eur, Currency::Usd, dec2(112), dec2(110)),
    (Currency::Usd, Currency::Eur, dec2(89), dec2(87)),
];

const fn dec2(hundredths: u32) -> Decimal {
    Decimal::from_parts(hundredths, 0, 0, false, 2)
}

const fn dec3(thousandths: u32) -> Decimal {
    Decimal::from_parts(thousandths, 0, 0, false, 3)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ConversionError {
    #[error("Taxa não disponível para {from} -> {to}")]
    Unsupported { from: Currency, to: Currency },

    #[error("amount must not be negative: {0}")]
    InvalidAmount(Decimal),

    #[error("{amount} {from} is too large to convert to {to}")]
    Overflow {
        amount: Decimal,
        from: Currency,
        to: Currency,
    },
}

/// Source of live mid-market rates.
pub(crate) trait RateProvider: Send + Sync {
    fn mid_rate(&self, from: Currency, to: Currency) -> anyhow::Result<Decimal>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RateSource {
    LiveApi,
    Fallback,
}

impl std::fmt::Display for RateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LiveApi => write!(f, "live_api"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct RateQuote {
    pub(crate) from_currency: Currency,
    pub(crate) to_currency: Currency,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) commercial_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) spread: Decimal,
    pub(crate) timestamp: String,
    pub(crate) source: RateSource,
}

impl RateQuote {
    fn new(
        from: Currency,
        to: Currency,
        rate: Decimal,
        commercial_rate: Decimal,
        source: RateSource,
    ) -> Self {
        Self {
            from_currency: from,
            to_currency: to,
            rate,
            commercial_rate,
            spread: rate - commercial_rate,
            timestamp: chrono::Local::now().to_rfc3339(),
            source,
        }
    }
}

/// Commercial rate applied to a live mid-market rate.
pub(crate) fn commercial_rate(mid: Decimal, to: Currency) -> Decimal {
    let factor = if to == Currency::Brl {
        INTO_BRL_FACTOR
    } else {
        DEFAULT_FACTOR
    };
    mid * factor
}

pub(crate) fn fallback_quote(from: Currency, to: Currency) -> Option<RateQuote> {
    FALLBACK_RATES
        .iter()
        .find(|(f, t, _, _)| *f == from && *t == to)
        .map(|&(_, _, rate, commercial)| {
            RateQuote::new(from, to, rate, commercial, RateSource::Fallback)
        })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Conversion {
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) original_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) converted_amount: Decimal,
    pub(crate) from_currency: Currency,
    pub(crate) to_currency: Currency,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) rate_used: Decimal,
    pub(crate) timestamp: String,
    pub(crate) source: RateSource,
}

pub(crate) struct CurrencyConverter {
    provider: Option<Arc<dyn RateProvider>>,
    cache: Cache<(Currency, Currency), RateQuote>,
}

impl CurrencyConverter {
    #[cfg(test)]
    pub(crate) fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self::with_ttl(Some(provider), QUOTE_TTL)
    }

    /// Converter that only knows the fallback table.
    pub(crate) fn offline() -> Self {
        Self::with_ttl(None, QUOTE_TTL)
    }

    pub(crate) fn with_ttl(provider: Option<Arc<dyn RateProvider>>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(ttl)
            .build();
        Self { provider, cache }
    }

    /// Live quotes are cached per pair; fallback quotes never are.
    pub(crate) fn quote(&self, from: Currency, to: Currency) -> Result<RateQuote, ConversionError> {
        if from == to {
            return Err(ConversionError::Unsupported { from, to });
        }
        if let Some(quote) = self.cache.get(&(from, to)) {
            debug!(%from, %to, "rate cache hit");
            return Ok(quote);
        }

        if let Some(provider) = &self.provider {
            match provider.mid_rate(from, to) {
                Ok(mid) if mid > Decimal::ZERO => {
                    let quote = RateQuote::new(
                        from,
                        to,
                        mid,
                        commercial_rate(mid, to),
                        RateSource::LiveApi,
                    );
                    self.cache.insert((from, to), quote.clone());
                    return Ok(quote);
                }
                Ok(mid) => warn!(%from, %to, %mid, "rate provider returned a non-positive rate, using fallback"),
                Err(e) => warn!(%from, %to, error = %e, "rate provider failed, using fallback"),
            }
        }

        fallback_quote(from, to).ok_or(ConversionError::Unsupported { from, to })
    }

    pub(crate) fn convert(
        &self,
        amount: Decimal,
        from: Currency,
        to: Currency,
    ) -> Result<Conversion, ConversionError> {
        if amount < Decimal::ZERO {
            return Err(ConversionError::InvalidAmount(amount));
        }
        let quote = self.quote(from, to)?;
        let converted = amount
            .checked_mul(quote.commercial_rate)
            .ok_or(ConversionError::Overflow { amount, from, to })?;
        Ok(Conversion {
            original_amount: amount,
            converted_amount: converted.round_dp(2),
            from_currency: from,
            to_currency: to,
            rate_used: quote.commercial_rate,
            timestamp: quote.timestamp,
            source: quote.source,
        })
    }
}
