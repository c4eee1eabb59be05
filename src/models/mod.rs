mod category;
mod currency;
mod transaction;
mod trip;

pub(crate) use category::Category;
pub(crate) use currency::Currency;
pub(crate) use transaction::{Source, Transaction, TransactionType};
pub(crate) use trip::Trip;

#[cfg(test)]
mod tests;
