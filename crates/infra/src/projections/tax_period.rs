use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use tracing::debug;

use recon_core::{DomainResult, EntryId};
use recon_tax::{TaxEvent, TaxPeriod, TaxPeriodEntry, TaxPeriodSummary};

use crate::store::table::poisoned;

#[derive(Debug, Default)]
struct State {
    summaries: BTreeMap<TaxPeriod, TaxPeriodSummary>,
    seen: HashSet<EntryId>,
}

/// Per-period output/input tax totals.
///
/// Entries are deduplicated by `entry_id`, so redelivered events are ignored.
#[derive(Debug, Default)]
pub struct TaxPeriodProjection {
    state: RwLock<State>,
}

impl TaxPeriodProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one tax event. Returns `false` for a duplicate.
    pub fn apply(&self, event: &TaxEvent) -> DomainResult<bool> {
        match event {
            TaxEvent::PeriodEntryRecorded(entry) => self.apply_entry(entry),
        }
    }

    pub fn apply_entry(&self, entry: &TaxPeriodEntry) -> DomainResult<bool> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.seen.contains(&entry.entry_id) {
            debug!(entry_id = %entry.entry_id, "duplicate tax period entry ignored");
            return Ok(false);
        }

        state
            .summaries
            .entry(entry.period)
            .or_insert_with(|| TaxPeriodSummary::new(entry.period))
            .apply(entry)?;
        state.seen.insert(entry.entry_id);
        Ok(true)
    }

    pub fn summary(&self, period: TaxPeriod) -> DomainResult<Option<TaxPeriodSummary>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.summaries.get(&period).cloned())
    }

    /// Every period seen so far, oldest first.
    pub fn summaries(&self) -> DomainResult<Vec<TaxPeriodSummary>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.summaries.values().cloned().collect())
    }

    /// Drop everything and replay `events` in the given order.
    pub fn rebuild_from_scratch(
        &self,
        events: impl IntoIterator<Item = TaxEvent>,
    ) -> DomainResult<()> {
        {
            let mut state = self.state.write().map_err(poisoned)?;
            *state = State::default();
        }
        for event in events {
            self.apply(&event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use recon_core::{InvoiceId, TransactionKind};
    use recon_tax::TaxBreakdown;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn entry(kind: TransactionKind, month: u32, taxable: Decimal, tax: Decimal) -> TaxEvent {
        let at = Utc.with_ymd_and_hms(2026, month, 15, 10, 0, 0).unwrap();
        TaxEvent::PeriodEntryRecorded(TaxPeriodEntry::for_invoice(
            InvoiceId::new(),
            kind,
            TaxBreakdown::split(taxable, tax, false).unwrap(),
            at,
        ))
    }

    #[test]
    fn redelivered_entries_are_counted_once() {
        let projection = TaxPeriodProjection::new();
        let sale = entry(TransactionKind::Sale, 10, dec!(1000), dec!(180));

        assert!(projection.apply(&sale).unwrap());
        assert!(!projection.apply(&sale).unwrap());

        let summary = projection
            .summary(TaxPeriod::new(2026, 10).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(summary.entries, 1);
        assert_eq!(summary.output.total_tax, dec!(180));
    }

    #[test]
    fn net_payable_nets_returns_and_input_credit() {
        let projection = TaxPeriodProjection::new();
        for event in [
            entry(TransactionKind::Sale, 10, dec!(1000), dec!(180)),
            entry(TransactionKind::SaleReturn, 10, dec!(100), dec!(18)),
            entry(TransactionKind::Purchase, 10, dec!(500), dec!(90)),
        ] {
            projection.apply(&event).unwrap();
        }

        let summary = projection
            .summary(TaxPeriod::new(2026, 10).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(summary.output.total_tax, dec!(162));
        assert_eq!(summary.input.total_tax, dec!(90));
        assert_eq!(summary.net_payable().unwrap(), dec!(72));
    }

    #[test]
    fn periods_are_kept_apart_and_ordered() {
        let projection = TaxPeriodProjection::new();
        projection
            .apply(&entry(TransactionKind::Sale, 11, dec!(10), dec!(1)))
            .unwrap();
        projection
            .apply(&entry(TransactionKind::Sale, 9, dec!(10), dec!(1)))
            .unwrap();

        let months: Vec<u32> = projection
            .summaries()
            .unwrap()
            .iter()
            .map(|s| s.period.month)
            .collect();
        assert_eq!(months, vec![9, 11]);
    }

    #[test]
    fn rebuild_discards_previous_state() {
        let projection = TaxPeriodProjection::new();
        let sale = entry(TransactionKind::Sale, 10, dec!(1000), dec!(180));
        projection.apply(&sale).unwrap();

        projection
            .rebuild_from_scratch([sale.clone(), sale])
            .unwrap();

        let summaries = projection.summaries().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].entries, 1);
    }
}
