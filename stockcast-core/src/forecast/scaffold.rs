//! Future date scaffold: history dates followed by daily dates past the last one.

use chrono::{Duration, NaiveDate};

use super::ForecastError;

#[derive(Debug, Clone, PartialEq)]
pub struct FutureScaffold {
    history: Vec<NaiveDate>,
    future: Vec<NaiveDate>,
}

impl FutureScaffold {
    /// Extend `history` by `periods` consecutive calendar days.
    ///
    /// Weekends and holidays are included: the scaffold is daily, not trading-daily.
    pub fn new(history: &[NaiveDate], periods: usize) -> Result<Self, ForecastError> {
        let last = *history
            .iter()
            .max()
            .ok_or(ForecastError::TooFewRows { rows: 0 })?;

        let future = (1..=periods as i64)
            .map(|k| last + Duration::days(k))
            .collect();

        Ok(Self {
            history: history.to_vec(),
            future,
        })
    }

    pub fn future(&self) -> &[NaiveDate] {
        &self.future
    }

    /// History then future, in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.history.iter().chain(&self.future).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.history.len() + self.future.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::HorizonMonths;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn six_months_extends_180_days() {
        let history = vec![day(2024, 5, 30), day(2024, 5, 31)];
        let horizon = HorizonMonths::new(6).unwrap();
        let scaffold = FutureScaffold::new(&history, horizon.days()).unwrap();

        assert_eq!(scaffold.future().len(), 180);
        assert_eq!(scaffold.future()[0], day(2024, 6, 1));
        assert_eq!(
            *scaffold.future().last().unwrap(),
            day(2024, 5, 31) + Duration::days(180)
        );
        assert_eq!(scaffold.len(), 182);
    }

    #[test]
    fn dates_keep_history_first() {
        let history = vec![day(2024, 1, 2), day(2024, 1, 3)];
        let scaffold = FutureScaffold::new(&history, 2).unwrap();
        assert_eq!(
            scaffold.dates(),
            vec![day(2024, 1, 2), day(2024, 1, 3), day(2024, 1, 4), day(2024, 1, 5)]
        );
    }

    #[test]
    fn empty_history_is_an_error() {
        assert!(FutureScaffold::new(&[], 30).is_err());
    }
}
