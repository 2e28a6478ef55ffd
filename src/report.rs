use std::collections::BTreeMap;
use std::io::Write;

use tracing::warn;

use crate::Anomaly;

/// Sink for detected anomalies. The checker hands every anomaly to the sink
/// as soon as a feature has been processed; implementations route each kind
/// to its own named layer (see [`crate::AnomalyKind::layer_name`]).
pub trait AnomalyReporter {
    fn report(&mut self, anomaly: Anomaly);
}

/// Collects anomalies in memory, one vector per output layer.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    layers: BTreeMap<&'static str, Vec<Anomaly>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        MemoryReporter::default()
    }

    /// The anomalies routed to a layer; empty for unknown names.
    pub fn layer(&self, name: &str) -> &[Anomaly] {
        self.layers.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn layers(&self) -> impl Iterator<Item = (&'static str, &[Anomaly])> + '_ {
        self.layers
            .iter()
            .map(|(name, anomalies)| (*name, anomalies.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_layers(self) -> BTreeMap<&'static str, Vec<Anomaly>> {
        self.layers
    }
}

impl AnomalyReporter for MemoryReporter {
    fn report(&mut self, anomaly: Anomaly) {
        self.layers
            .entry(anomaly.kind.layer_name())
            .or_default()
            .push(anomaly);
    }
}

/// Writes each anomaly as one JSON object per line. A failing write drops the
/// record with a warning; the sink never stops the pipeline.
#[derive(Debug)]
pub struct JsonLinesReporter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesReporter<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesReporter { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, anomaly: &Anomaly) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, anomaly)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> AnomalyReporter for JsonLinesReporter<W> {
    fn report(&mut self, anomaly: Anomaly) {
        if let Err(error) = self.write(&anomaly) {
            warn!(feature = anomaly.feature, %error, "dropping anomaly: sink write failed");
        }
    }
}
