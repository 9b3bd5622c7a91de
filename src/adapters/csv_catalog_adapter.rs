//! CSV instrument catalog adapter.
//!
//! Expects a header row followed by
//! `symbol,name,price,previous_close,volume,market_cap` records.

use crate::domain::error::StockcastError;
use crate::domain::instrument::Instrument;
use crate::ports::catalog_port::CatalogPort;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub struct CsvCatalogAdapter {
    instruments: Vec<Instrument>,
}

impl CsvCatalogAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StockcastError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| StockcastError::Catalog {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let adapter = Self::from_reader(content.as_bytes())?;
        log::info!(
            "loaded {} instruments from {}",
            adapter.instruments.len(),
            path.display()
        );
        Ok(adapter)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, StockcastError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut instruments = Vec::new();
        let mut seen = HashSet::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| StockcastError::Catalog {
                reason: format!("CSV parse error: {}", e),
            })?;
            // header is line 1
            let line = row + 2;

            let symbol = text(&record, 0, "symbol", line)?;
            let name = text(&record, 1, "name", line)?;
            let price: f64 = number(&record, 2, "price", line)?;
            let previous_close: f64 = number(&record, 3, "previous_close", line)?;
            let volume: u64 = number(&record, 4, "volume", line)?;
            let market_cap: f64 = number(&record, 5, "market_cap", line)?;

            if price <= 0.0 || !price.is_finite() {
                return Err(StockcastError::Catalog {
                    reason: format!("line {}: price must be positive", line),
                });
            }

            let instrument =
                Instrument::new(symbol, name, price, previous_close, volume, market_cap);
            if !seen.insert(instrument.symbol.clone()) {
                return Err(StockcastError::Catalog {
                    reason: format!("line {}: duplicate symbol {}", line, instrument.symbol),
                });
            }
            instruments.push(instrument);
        }

        Ok(Self { instruments })
    }
}

fn text<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    column: &str,
    line: usize,
) -> Result<&'r str, StockcastError> {
    match record.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(StockcastError::Catalog {
            reason: format!("line {}: missing {} column", line, column),
        }),
    }
}

fn number<T>(
    record: &csv::StringRecord,
    index: usize,
    column: &str,
    line: usize,
) -> Result<T, StockcastError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    text(record, index, column, line)?
        .parse()
        .map_err(|e| StockcastError::Catalog {
            reason: format!("line {}: invalid {} value: {}", line, column, e),
        })
}

impl CatalogPort for CsvCatalogAdapter {
    fn all(&self) -> Vec<Instrument> {
        self.instruments.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "symbol,name,price,previous_close,volume,market_cap\n";

    fn catalog(rows: &str) -> Result<CsvCatalogAdapter, StockcastError> {
        CsvCatalogAdapter::from_reader(format!("{}{}", HEADER, rows).as_bytes())
    }

    #[test]
    fn loads_rows_in_order() {
        let adapter = catalog(
            "tsla,Tesla Inc.,250.10,245.00,100000,8.0e11\nibm, IBM ,190.5,191.0,5000,1.7e11\n",
        )
        .unwrap();
        let all = adapter.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].symbol, "TSLA");
        assert_eq!(all[1].name, "IBM");
        assert_eq!(all[1].volume, 5000);
    }

    #[test]
    fn find_and_search() {
        let adapter = catalog(
            "TSLA,Tesla Inc.,250.10,245.00,100000,8.0e11\nIBM,International Business Machines,190.5,191.0,5000,1.7e11\n",
        )
        .unwrap();
        assert_eq!(adapter.find("tsla").unwrap().name, "Tesla Inc.");
        assert!(adapter.find("AAPL").is_none());

        let hits: Vec<_> = adapter.search("in").into_iter().map(|i| i.symbol).collect();
        assert_eq!(hits, vec!["TSLA", "IBM"]);
        assert!(adapter.search("").is_empty());
    }

    #[test]
    fn duplicate_symbol_is_rejected() {
        let err = catalog("TSLA,Tesla,1,1,1,1\ntsla,Tesla again,1,1,1,1\n")
            .err()
            .unwrap();
        assert!(matches!(err, StockcastError::Catalog { reason } if reason.contains("duplicate")));
    }

    #[test]
    fn bad_number_names_the_line() {
        let err = catalog("TSLA,Tesla,abc,1,1,1\n").err().unwrap();
        assert!(matches!(err, StockcastError::Catalog { reason } if reason.contains("line 2")));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        assert!(catalog("TSLA,Tesla,0,1,1,1\n").is_err());
    }

    #[test]
    fn from_file_reads_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}AMD,Advanced Micro Devices,160.0,158.0,1000,2.6e11\n", HEADER).unwrap();
        let adapter = CsvCatalogAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.all()[0].symbol, "AMD");
    }

    #[test]
    fn missing_file_is_catalog_error() {
        let result = CsvCatalogAdapter::from_file("/nonexistent/instruments.csv");
        assert!(matches!(result, Err(StockcastError::Catalog { .. })));
    }
}
