use crate::domain::instrument::InstrumentDescriptor;
use crate::domain::ports::InstrumentStoreRef;
use crate::error::{PaymentRequestError, Result};
use std::collections::HashSet;
use tracing::debug;

/// Read-only view over installed instruments.
///
/// Injected into each request coordinator; cloning shares the same store.
#[derive(Clone)]
pub struct InstrumentRegistry {
    store: InstrumentStoreRef,
}

impl InstrumentRegistry {
    pub fn new(store: InstrumentStoreRef) -> Self {
        Self { store }
    }

    /// Computes the instruments the user may pick for a request.
    ///
    /// The result keeps the merchant's declared order; installation order
    /// plays no role. Fails with `NoAvailablePaymentInstruments` when nothing
    /// the merchant supports is installed.
    pub async fn eligible(&self, supported: &[String]) -> Result<Vec<String>> {
        let installed = self.store.get_all().await?;
        let eligible = ordered_intersection(supported, &installed);

        debug!(?supported, ?eligible, "computed eligible instruments");

        if eligible.is_empty() {
            return Err(PaymentRequestError::NoAvailablePaymentInstruments(
                supported.to_vec(),
            ));
        }
        Ok(eligible)
    }

    /// All installed descriptors, sorted by name.
    pub async fn installed(&self) -> Result<Vec<InstrumentDescriptor>> {
        let mut installed: Vec<_> = self
            .store
            .get_all()
            .await?
            .into_iter()
            .filter(InstrumentDescriptor::is_installed)
            .collect();
        installed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(installed)
    }
}

/// Names from `supported` that are installed, in `supported` order.
pub fn ordered_intersection(supported: &[String], installed: &[InstrumentDescriptor]) -> Vec<String> {
    let installed: HashSet<&str> = installed
        .iter()
        .filter(|d| d.is_installed())
        .map(|d| d.name.as_str())
        .collect();

    supported
        .iter()
        .filter(|name| installed.contains(name.as_str()))
        .cloned()
        .collect()
}
