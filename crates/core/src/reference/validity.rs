use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::types::RefDataType;

/// Values that can be normalized to a date-only as-of value.
pub trait AsDate {
    fn as_date(&self) -> NaiveDate;
}

impl AsDate for NaiveDate {
    fn as_date(&self) -> NaiveDate {
        *self
    }
}

impl AsDate for NaiveDateTime {
    fn as_date(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> AsDate for DateTime<Tz> {
    fn as_date(&self) -> NaiveDate {
        self.date_naive()
    }
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// As-of dates used to evaluate item validity within one operation.
///
/// Each logical operation owns its own context; it is a plain value and is
/// not meant to be shared across unrelated requests.
#[derive(Debug, Clone)]
pub struct ValidityContext {
    date: Option<NaiveDate>,
    overrides: HashMap<RefDataType, NaiveDate>,
    today: fn() -> NaiveDate,
}

impl Default for ValidityContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidityContext {
    /// Creates a context that defaults to today's UTC date.
    pub fn new() -> Self {
        Self::with_today(utc_today)
    }

    /// Creates a context using `today` as the fallback clock.
    pub fn with_today(today: fn() -> NaiveDate) -> Self {
        Self {
            date: None,
            overrides: HashMap::new(),
            today,
        }
    }

    /// Creates a context pinned to `date`.
    pub fn at(date: impl AsDate) -> Self {
        let mut ctx = Self::new();
        ctx.set_date(date);
        ctx
    }

    /// Returns the default as-of date.
    pub fn date(&self) -> NaiveDate {
        self.date.unwrap_or_else(self.today)
    }

    /// Sets the default as-of date, dropping any time-of-day component.
    pub fn set_date(&mut self, date: impl AsDate) {
        self.date = Some(date.as_date());
    }

    /// Returns the as-of date for `ty`, falling back to [`date`](Self::date).
    pub fn date_for(&self, ty: &RefDataType) -> NaiveDate {
        self.overrides
            .get(ty)
            .copied()
            .unwrap_or_else(|| self.date())
    }

    /// Overrides the as-of date for a single type.
    pub fn set_date_for(&mut self, ty: &RefDataType, date: impl AsDate) {
        self.overrides.insert(ty.clone(), date.as_date());
    }

    /// Clears the default date and every per-type override.
    pub fn reset(&mut self) {
        self.date = None;
        self.overrides.clear();
    }
}
