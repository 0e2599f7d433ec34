//! Source of "today" for the system preamble.

use chrono::{NaiveDate, Utc};

/// Supplies the current UTC date.
///
/// The engine asks the clock once per send; swapping in a fixed clock makes
/// date-dependent behaviour reproducible.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDate + Send + Sync,
{
    fn today(&self) -> NaiveDate {
        self()
    }
}
