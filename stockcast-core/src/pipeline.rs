//! One rerun of the forecast adapter: price frame in, forecast out.

use polars::prelude::DataFrame;
use tracing::info;

use crate::forecast::{
    training_frame, AdditiveModel, Forecast, ForecastError, Forecaster, FutureScaffold,
    ModelSettings, TrainingSeries,
};
use crate::inputs::HorizonMonths;

/// Everything produced by one forecast pass.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub training: TrainingSeries,
    pub scaffold: FutureScaffold,
    pub forecast: Forecast,
}

/// Rename, fit with the default additive model, extend by `horizon`, predict.
pub fn run_forecast(
    prices: &DataFrame,
    horizon: HorizonMonths,
    settings: &ModelSettings,
) -> Result<ForecastRun, ForecastError> {
    let mut model = AdditiveModel::new(settings.clone());
    run_forecast_with(&mut model, prices, horizon)
}

/// Same as [`run_forecast`] with a caller-supplied model.
pub fn run_forecast_with<F: Forecaster>(
    model: &mut F,
    prices: &DataFrame,
    horizon: HorizonMonths,
) -> Result<ForecastRun, ForecastError> {
    let train = training_frame(prices)?;
    let training = TrainingSeries::from_frame(&train)?;
    model.fit(&training)?;

    let scaffold = FutureScaffold::new(&training.ds, horizon.days())?;
    let forecast = model.predict(&scaffold.dates())?;

    info!(
        history = training.len(),
        future = scaffold.future().len(),
        "forecast complete"
    );

    Ok(ForecastRun {
        training,
        scaffold,
        forecast,
    })
}
