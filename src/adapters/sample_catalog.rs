//! Built-in catalog used when no CSV catalog is configured.

use crate::domain::instrument::Instrument;
use crate::ports::catalog_port::CatalogPort;

pub struct SampleCatalog;

impl CatalogPort for SampleCatalog {
    fn all(&self) -> Vec<Instrument> {
        vec![
            Instrument::new("AAPL", "Apple Inc.", 182.63, 180.25, 63_492_387, 2.84e12),
            Instrument::new("MSFT", "Microsoft Corporation", 417.88, 415.56, 22_361_984, 3.1e12),
            Instrument::new("AMZN", "Amazon.com, Inc.", 178.15, 179.62, 30_517_624, 1.85e12),
            Instrument::new("NVDA", "NVIDIA Corporation", 122.46, 118.20, 420_693_541, 3.02e12),
            Instrument::new("GOOGL", "Alphabet Inc.", 163.24, 164.52, 18_264_397, 2.04e12),
        ]
    }
}
