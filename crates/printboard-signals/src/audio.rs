//! Audio probe: oscillator -> dynamics compressor -> analyser.
//! The compressor's processing differs subtly between audio stacks; the
//! analyser's frequency bins after a short window are the signal.

use printboard_core::CollectionError;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct AudioProbeSettings {
    pub oscillator_type: &'static str,
    pub frequency_hz: f64,
    pub threshold_db: f64,
    pub knee_db: f64,
    pub ratio: f64,
    pub attack_s: f64,
    pub release_s: f64,
    pub fft_size: u32,
    /// How long the oscillator runs before it is stopped.
    pub tone_length: Duration,
}

impl Default for AudioProbeSettings {
    fn default() -> Self {
        Self {
            oscillator_type: "triangle",
            frequency_hz: 440.0,
            threshold_db: -50.0,
            knee_db: 40.0,
            ratio: 12.0,
            attack_s: 0.0,
            release_s: 0.25,
            fft_size: 1024,
            tone_length: Duration::from_millis(100),
        }
    }
}

/// A live audio-processing graph. `close` must be idempotent.
pub trait AudioGraph: Send {
    fn configure(&mut self, settings: &AudioProbeSettings) -> Result<(), CollectionError>;
    fn start(&mut self) -> Result<(), CollectionError>;
    /// Byte frequency data from the analyser, `fft_size / 2` bins.
    fn frequency_data(&mut self) -> Result<Vec<u8>, CollectionError>;
    fn close(&mut self);
}

/// Closes the wrapped graph when dropped, whichever way the probe exits.
pub(crate) struct GraphGuard(pub(crate) Box<dyn AudioGraph>);

impl Drop for GraphGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Run the probe: configure, start, wait `window`, sample.
pub async fn sample(
    graph: Box<dyn AudioGraph>,
    settings: &AudioProbeSettings,
    window: Duration,
) -> Result<String, CollectionError> {
    let mut guard = GraphGuard(graph);
    guard.0.configure(settings)?;
    guard.0.start()?;
    tokio::time::sleep(window).await;
    let bins = guard.0.frequency_data()?;
    Ok(encode_bins(&bins))
}

pub fn encode_bins(bins: &[u8]) -> String {
    bins.iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
