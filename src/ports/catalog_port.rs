//! Instrument catalog port trait.

use crate::domain::instrument::Instrument;

pub trait CatalogPort {
    /// Every instrument, in catalog order.
    fn all(&self) -> Vec<Instrument>;

    fn find(&self, symbol: &str) -> Option<Instrument> {
        let wanted = symbol.trim();
        self.all()
            .into_iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(wanted))
    }

    /// Case-insensitive substring match on symbol or name. An empty query
    /// matches nothing.
    fn search(&self, query: &str) -> Vec<Instrument> {
        let mut seen = std::collections::HashSet::new();
        self.all()
            .into_iter()
            .filter(|i| i.matches(query))
            .filter(|i| seen.insert(i.symbol.clone()))
            .collect()
    }
}
