pub(crate) mod dashboard;
pub(crate) mod transactions;
pub(crate) mod trips;
