//! Additive regression forecaster.
//!
//! `y(t) = trend(t) + weekly(t) + yearly(t) + noise`
//!
//! - trend: piecewise linear, with slope changes allowed at evenly spaced
//!   changepoints inside the first `changepoint_range` of the history
//! - weekly / yearly: Fourier series on days since 1970-01-01
//! - coefficients: ridge-regularized least squares on a max-abs scaled target
//! - interval: residual standard deviation, widened with distance past the
//!   last observation

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, info};

use super::linalg::NormalEquations;
use super::result::{Components, Forecast, ForecastRow};
use super::training::TrainingSeries;
use super::ForecastError;

const WEEK_DAYS: f64 = 7.0;
const YEAR_DAYS: f64 = 365.25;

/// History length needed before a seasonal term is fitted.
const MIN_DAYS_FOR_YEARLY: i64 = 730;
const MIN_DAYS_FOR_WEEKLY: i64 = 14;

/// Observation noise variance assumed when turning prior scales into ridge penalties.
const NOISE_VARIANCE: f64 = 0.01;

/// Penalty on intercept and base slope, only there to keep the system definite.
const BASE_PENALTY: f64 = 1e-8;

/// Model hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Probability mass covered by `[yhat_lower, yhat_upper]`.
    pub interval_width: f64,
    pub n_changepoints: usize,
    /// Share of the history (by row) in which changepoints are placed.
    pub changepoint_range: f64,
    /// Larger values let the trend bend more.
    pub changepoint_prior_scale: f64,
    /// Larger values let seasonal terms grow more.
    pub seasonality_prior_scale: f64,
    pub yearly_order: usize,
    pub weekly_order: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            interval_width: 0.8,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            yearly_order: 10,
            weekly_order: 3,
        }
    }
}

impl ModelSettings {
    /// `interval_width` must be a probability strictly between 0 and 1.
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.interval_width > 0.0 && self.interval_width < 1.0 {
            Ok(())
        } else {
            Err(ForecastError::IntervalWidth(self.interval_width))
        }
    }
}

/// Seam between the forecast adapter and the model doing the work.
pub trait Forecaster {
    fn fit(&mut self, series: &TrainingSeries) -> Result<(), ForecastError>;

    /// Predict every date in `dates`. Requires a prior successful `fit`.
    fn predict(&self, dates: &[NaiveDate]) -> Result<Forecast, ForecastError>;
}

/// Column layout of the design matrix.
#[derive(Debug, Clone, PartialEq)]
struct Layout {
    changepoints: Vec<f64>,
    yearly_order: usize,
    weekly_order: usize,
}

impl Layout {
    fn trend_width(&self) -> usize {
        2 + self.changepoints.len()
    }

    fn yearly_width(&self) -> usize {
        2 * self.yearly_order
    }

    fn weekly_width(&self) -> usize {
        2 * self.weekly_order
    }

    fn width(&self) -> usize {
        self.trend_width() + self.yearly_width() + self.weekly_width()
    }
}

#[derive(Debug, Clone)]
struct Fitted {
    layout: Layout,
    start: NaiveDate,
    last: NaiveDate,
    span_days: f64,
    y_scale: f64,
    coef: Vec<f64>,
    /// Residual standard deviation in price units.
    sigma: f64,
}

impl Fitted {
    fn t(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    fn trend(&self, date: NaiveDate) -> f64 {
        trend_features(self.t(date), &self.layout.changepoints)
            .iter()
            .zip(&self.coef)
            .map(|(x, b)| x * b)
            .sum::<f64>()
            * self.y_scale
    }

    fn yearly(&self, date: NaiveDate) -> f64 {
        let offset = self.layout.trend_width();
        let coef = &self.coef[offset..offset + self.layout.yearly_width()];
        dot(&fourier(date, YEAR_DAYS, self.layout.yearly_order), coef) * self.y_scale
    }

    fn weekly(&self, date: NaiveDate) -> f64 {
        let offset = self.layout.trend_width() + self.layout.yearly_width();
        let coef = &self.coef[offset..offset + self.layout.weekly_width()];
        dot(&fourier(date, WEEK_DAYS, self.layout.weekly_order), coef) * self.y_scale
    }

    fn row(&self, date: NaiveDate) -> Vec<f64> {
        let mut row = trend_features(self.t(date), &self.layout.changepoints);
        row.extend(fourier(date, YEAR_DAYS, self.layout.yearly_order));
        row.extend(fourier(date, WEEK_DAYS, self.layout.weekly_order));
        row
    }
}

/// Piecewise-linear trend plus Fourier seasonality.
#[derive(Debug, Clone, Default)]
pub struct AdditiveModel {
    settings: ModelSettings,
    fitted: Option<Fitted>,
}

impl AdditiveModel {
    pub fn new(settings: ModelSettings) -> Self {
        Self {
            settings,
            fitted: None,
        }
    }

    /// Whether the yearly / weekly terms were switched on by the last fit.
    pub fn seasonalities(&self) -> Option<(bool, bool)> {
        self.fitted
            .as_ref()
            .map(|f| (f.layout.yearly_order > 0, f.layout.weekly_order > 0))
    }

    fn layout_for(&self, series: &TrainingSeries, t: &[f64], span: i64) -> Layout {
        let n = series.len();
        let hist = ((n as f64) * self.settings.changepoint_range.clamp(0.0, 1.0)).floor() as usize;
        let n_cp = self.settings.n_changepoints.min(hist.saturating_sub(1));

        let mut changepoints = Vec::with_capacity(n_cp);
        if n_cp > 0 {
            let last_idx = (hist - 1) as f64;
            for k in 1..=n_cp {
                let idx = (last_idx * k as f64 / n_cp as f64).round() as usize;
                let c = t[idx];
                if c > 0.0 && changepoints.last().map_or(true, |&p| c > p) {
                    changepoints.push(c);
                }
            }
        }

        Layout {
            changepoints,
            yearly_order: if span >= MIN_DAYS_FOR_YEARLY {
                self.settings.yearly_order
            } else {
                0
            },
            weekly_order: if span >= MIN_DAYS_FOR_WEEKLY {
                self.settings.weekly_order
            } else {
                0
            },
        }
    }

    fn penalties(&self, layout: &Layout) -> Vec<f64> {
        let cp = NOISE_VARIANCE / self.settings.changepoint_prior_scale.powi(2).max(f64::EPSILON);
        let seasonal =
            NOISE_VARIANCE / self.settings.seasonality_prior_scale.powi(2).max(f64::EPSILON);

        let mut p = vec![BASE_PENALTY, BASE_PENALTY];
        p.extend(std::iter::repeat(cp).take(layout.changepoints.len()));
        p.extend(std::iter::repeat(seasonal).take(layout.yearly_width() + layout.weekly_width()));
        p
    }

    fn components(&self, fitted: &Fitted) -> Components {
        // Reference week/year, Monday 2017-01-02
        let monday = NaiveDate::from_ymd_opt(2017, 1, 2).unwrap_or_default();
        let weekly = (fitted.layout.weekly_order > 0).then(|| {
            (0..7)
                .map(|k| {
                    let d = monday + Duration::days(k);
                    (d.weekday(), fitted.weekly(d))
                })
                .collect::<Vec<(Weekday, f64)>>()
        });

        let jan1 = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or_default();
        let yearly = (fitted.layout.yearly_order > 0).then(|| {
            (0..365)
                .map(|k| {
                    let d = jan1 + Duration::days(k);
                    (d, fitted.yearly(d))
                })
                .collect::<Vec<(NaiveDate, f64)>>()
        });

        Components { weekly, yearly }
    }
}

impl Forecaster for AdditiveModel {
    fn fit(&mut self, series: &TrainingSeries) -> Result<(), ForecastError> {
        self.settings.validate()?;
        if series.len() < 2 {
            return Err(ForecastError::TooFewRows { rows: series.len() });
        }
        let (start, last) = match (series.first_date(), series.last_date()) {
            (Some(s), Some(l)) => (s, l),
            _ => return Err(ForecastError::TooFewRows { rows: 0 }),
        };
        let span = (last - start).num_days();
        if span <= 0 {
            return Err(ForecastError::DegenerateSpan);
        }

        let y_scale = series
            .y
            .iter()
            .fold(0.0_f64, |m, v| m.max(v.abs()))
            .max(f64::EPSILON);
        let t: Vec<f64> = series
            .ds
            .iter()
            .map(|d| (*d - start).num_days() as f64 / span as f64)
            .collect();

        let layout = self.layout_for(series, &t, span);
        let mut fitted = Fitted {
            layout,
            start,
            last,
            span_days: span as f64,
            y_scale,
            coef: Vec::new(),
            sigma: 0.0,
        };

        let mut eq = NormalEquations::new(fitted.layout.width());
        for (d, y) in series.ds.iter().zip(&series.y) {
            eq.push(&fitted.row(*d), y / y_scale);
        }
        fitted.coef = eq
            .solve_ridge(&self.penalties(&fitted.layout))
            .ok_or(ForecastError::Singular)?;

        let sse: f64 = series
            .ds
            .iter()
            .zip(&series.y)
            .map(|(d, y)| {
                let r = dot(&fitted.row(*d), &fitted.coef) * y_scale - y;
                r * r
            })
            .sum();
        fitted.sigma = (sse / (series.len() - 1) as f64).sqrt();

        debug!(
            features = fitted.layout.width(),
            changepoints = fitted.layout.changepoints.len(),
            yearly = fitted.layout.yearly_order > 0,
            weekly = fitted.layout.weekly_order > 0,
            "design matrix"
        );
        info!(rows = series.len(), sigma = fitted.sigma, "fitted additive model");

        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict(&self, dates: &[NaiveDate]) -> Result<Forecast, ForecastError> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotFitted)?;
        let z = z_score(self.settings.interval_width);

        let rows = dates
            .iter()
            .map(|&ds| {
                let trend = fitted.trend(ds);
                let yearly = fitted.yearly(ds);
                let weekly = fitted.weekly(ds);
                let yhat = trend + yearly + weekly;

                let ahead = (ds - fitted.last).num_days().max(0) as f64;
                let half_width = z * fitted.sigma * (1.0 + ahead / fitted.span_days).sqrt();

                ForecastRow {
                    ds,
                    yhat,
                    yhat_lower: yhat - half_width,
                    yhat_upper: yhat + half_width,
                    trend,
                    weekly,
                    yearly,
                }
            })
            .collect();

        Ok(Forecast {
            rows,
            last_observed: fitted.last,
            interval_width: self.settings.interval_width,
            components: self.components(fitted),
        })
    }
}

fn trend_features(t: f64, changepoints: &[f64]) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 + changepoints.len());
    row.push(1.0);
    row.push(t);
    row.extend(changepoints.iter().map(|c| (t - c).max(0.0)));
    row
}

fn fourier(date: NaiveDate, period: f64, order: usize) -> Vec<f64> {
    let days = date.signed_duration_since(NaiveDate::default()).num_days() as f64;
    let mut out = Vec::with_capacity(2 * order);
    for k in 1..=order {
        let x = 2.0 * PI * k as f64 * days / period;
        out.push(x.sin());
        out.push(x.cos());
    }
    out
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Two-sided standard normal quantile for a central interval of `width`.
///
/// `width` must lie in (0, 1); see [`ModelSettings::validate`].
pub fn z_score(width: f64) -> f64 {
    normal_quantile((1.0 + width) / 2.0)
}

/// Inverse standard normal CDF (Acklam's rational approximation,
/// relative error below 1.2e-9 on (0, 1)).
fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_690e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.02425;

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p <= 0.0 {
        f64::NEG_INFINITY
    } else if p >= 1.0 {
        f64::INFINITY
    } else if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p > 1.0 - P_LOW {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    } else {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily(start: NaiveDate, n: usize, f: impl Fn(usize, NaiveDate) -> f64) -> TrainingSeries {
        let rows = (0..n)
            .map(|i| {
                let d = start + Duration::days(i as i64);
                (d, f(i, d))
            })
            .collect();
        TrainingSeries::from_pairs(rows).unwrap()
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, 3).unwrap()
    }

    #[test]
    fn predict_before_fit_fails() {
        let model = AdditiveModel::default();
        assert!(matches!(
            model.predict(&[start()]),
            Err(ForecastError::NotFitted)
        ));
    }

    #[test]
    fn recovers_linear_trend() {
        let series = daily(start(), 200, |i, _| 100.0 + 0.5 * i as f64);
        let mut model = AdditiveModel::new(ModelSettings::default());
        model.fit(&series).unwrap();

        let ahead = start() + Duration::days(230);
        let forecast = model.predict(&[ahead]).unwrap();
        let row = &forecast.rows[0];
        assert!((row.yhat - 215.0).abs() < 2.0, "yhat = {}", row.yhat);
        assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
    }

    #[test]
    fn recovers_weekly_pattern() {
        let bump = |d: NaiveDate| if d.weekday() == Weekday::Mon { 5.0 } else { 0.0 };
        let series = daily(start(), 140, |_, d| 50.0 + bump(d));
        let mut model = AdditiveModel::default();
        model.fit(&series).unwrap();

        let (yearly, weekly) = model.seasonalities().unwrap();
        assert!(!yearly);
        assert!(weekly);

        let forecast = model.predict(&series.ds).unwrap();
        let profile = forecast.components.weekly.as_ref().unwrap();
        let monday = profile.iter().find(|(w, _)| *w == Weekday::Mon).unwrap().1;
        let tuesday = profile.iter().find(|(w, _)| *w == Weekday::Tue).unwrap().1;
        assert!(monday - tuesday > 2.5, "monday {monday}, tuesday {tuesday}");
        assert!(forecast.components.yearly.is_none());
    }

    #[test]
    fn yearly_enabled_with_two_years() {
        let series = daily(start(), 800, |i, _| 10.0 + (i as f64 / 58.0).sin());
        let mut model = AdditiveModel::default();
        model.fit(&series).unwrap();
        assert_eq!(model.seasonalities(), Some((true, true)));

        let forecast = model.predict(&[start()]).unwrap();
        assert_eq!(forecast.components.yearly.as_ref().unwrap().len(), 365);
        assert_eq!(forecast.components.weekly.as_ref().unwrap().len(), 7);
    }

    #[test]
    fn interval_widens_past_last_observation() {
        let series = daily(start(), 120, |i, _| 20.0 + (i % 3) as f64);
        let mut model = AdditiveModel::default();
        model.fit(&series).unwrap();

        let last = *series.ds.last().unwrap();
        let forecast = model.predict(&[last, last + Duration::days(180)]).unwrap();
        let near = forecast.rows[0].yhat_upper - forecast.rows[0].yhat_lower;
        let far = forecast.rows[1].yhat_upper - forecast.rows[1].yhat_lower;
        assert!(far > near);
    }

    #[test]
    fn components_sum_to_yhat() {
        let series = daily(start(), 60, |i, _| 30.0 + i as f64 * 0.1);
        let mut model = AdditiveModel::default();
        model.fit(&series).unwrap();
        for row in model.predict(&series.ds).unwrap().rows {
            assert!((row.trend + row.weekly + row.yearly - row.yhat).abs() < 1e-9);
        }
    }

    #[test]
    fn two_points_fit() {
        let series = daily(start(), 2, |i, _| i as f64);
        let mut model = AdditiveModel::default();
        model.fit(&series).unwrap();
        let f = model.predict(&[start() + Duration::days(2)]).unwrap();
        assert!((f.rows[0].yhat - 2.0).abs() < 1e-3);
    }

    #[test]
    fn z_score_matches_normal_quantiles() {
        for (width, z) in [
            (0.5, 0.674_49),
            (0.8, 1.281_55),
            (0.85, 1.439_53),
            (0.9, 1.644_85),
            (0.95, 1.959_96),
            (0.99, 2.575_83),
        ] {
            assert!((z_score(width) - z).abs() < 1e-4, "width {width}: {}", z_score(width));
        }
        assert!(z_score(0.94) > z_score(0.9) && z_score(0.94) < z_score(0.95));
    }

    #[test]
    fn band_tracks_configured_width() {
        let series = daily(start(), 90, |i, _| 40.0 + ((i * 7) % 5) as f64);
        let width_at = |interval_width: f64| {
            let mut model = AdditiveModel::new(ModelSettings {
                interval_width,
                ..ModelSettings::default()
            });
            model.fit(&series).unwrap();
            let row = model.predict(&[start()]).unwrap().rows.remove(0);
            row.yhat_upper - row.yhat_lower
        };
        let ratio = width_at(0.85) / width_at(0.8);
        assert!((ratio - 1.439_53 / 1.281_55).abs() < 1e-3, "ratio {ratio}");
    }

    #[test]
    fn fit_rejects_out_of_range_width() {
        let series = daily(start(), 30, |i, _| i as f64);
        for interval_width in [0.0, 1.0, 1.5, f64::NAN] {
            let mut model = AdditiveModel::new(ModelSettings {
                interval_width,
                ..ModelSettings::default()
            });
            assert!(matches!(
                model.fit(&series),
                Err(ForecastError::IntervalWidth(_))
            ));
        }
    }
}
