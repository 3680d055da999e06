use crate::domain::instrument::{InstallState, InstrumentDescriptor};
use crate::error::{PaymentRequestError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct ManifestRecord {
    name: String,
    #[serde(default)]
    state: Option<InstallState>,
    #[serde(default)]
    schemes: String,
}

impl TryFrom<ManifestRecord> for InstrumentDescriptor {
    type Error = PaymentRequestError;

    fn try_from(record: ManifestRecord) -> Result<Self> {
        if record.name.is_empty() {
            return Err(PaymentRequestError::InvalidRequest(
                "manifest entry without instrument name".to_string(),
            ));
        }
        Ok(Self {
            name: record.name,
            state: record.state.unwrap_or_default(),
            schemes: record
                .schemes
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        })
    }
}

/// Reads installed instruments from a CSV manifest.
///
/// Expected header: `name, state, schemes`, where `schemes` is a
/// space-separated list. A missing `state` means `installed`.
pub struct InstrumentManifestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> InstrumentManifestReader<R> {
    /// Creates a new reader from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads manifest entries.
    ///
    /// A malformed row yields an error for that row only.
    pub fn instruments(self) -> impl Iterator<Item = Result<InstrumentDescriptor>> {
        self.reader
            .into_deserialize::<ManifestRecord>()
            .map(|result| -> Result<InstrumentDescriptor> {
                result.map_err(PaymentRequestError::from)?.try_into()
            })
    }
}
