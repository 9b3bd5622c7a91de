//! Pluggable generator of per-variant quality metrics.

use crate::domain::comparator::ComparisonSet;
use crate::domain::error::StockcastError;
use crate::domain::instrument::Instrument;
use crate::domain::series::HistoricalSeries;
use rand::RngCore;

pub trait MetricsPort {
    fn name(&self) -> &'static str;

    /// Produce a complete comparison for the instrument's current series.
    fn compare(
        &mut self,
        instrument: &Instrument,
        history: &HistoricalSeries,
        rng: &mut dyn RngCore,
    ) -> Result<ComparisonSet, StockcastError>;
}
