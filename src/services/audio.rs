//! Alert tones emitted on control actions and phase boundaries

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::AudioError;

/// The two tones the timer produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneKind {
    /// User-initiated action
    Click,
    /// Phase boundary
    Alert,
}

/// Oscillator settings a client needs to synthesize a tone
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToneShape {
    pub waveform: &'static str,
    pub frequency_hz: u32,
    pub gain: f32,
    pub duration_ms: u32,
}

impl ToneKind {
    pub fn shape(self) -> ToneShape {
        match self {
            ToneKind::Click => ToneShape {
                waveform: "sine",
                frequency_hz: 600,
                gain: 0.5,
                duration_ms: 100,
            },
            ToneKind::Alert => ToneShape {
                waveform: "triangle",
                frequency_hz: 880,
                gain: 0.3,
                duration_ms: 200,
            },
        }
    }

    /// Terminal bell sequence standing in for the tone
    fn bell(self) -> &'static [u8] {
        match self {
            ToneKind::Click => b"\x07",
            ToneKind::Alert => b"\x07\x07",
        }
    }
}

/// Tone notification pushed to connected clients
#[derive(Debug, Clone, Serialize)]
pub struct ToneEvent {
    pub tone: ToneKind,
    pub shape: ToneShape,
    pub timestamp: DateTime<Utc>,
}

impl ToneEvent {
    pub fn new(tone: ToneKind) -> Self {
        Self {
            tone,
            shape: tone.shape(),
            timestamp: Utc::now(),
        }
    }
}

/// Best-effort audio output.
///
/// Implementations must not block the caller and must swallow their own
/// failures.
pub trait AlertEmitter: Send + Sync {
    /// Prepare the output on a user-initiated interaction. Repeated calls reuse
    /// the existing handle.
    fn prime(&self);

    /// Play a tone
    fn emit(&self, tone: ToneKind);
}

/// Emitter that stays quiet
#[derive(Debug, Default)]
pub struct SilentEmitter;

impl AlertEmitter for SilentEmitter {
    fn prime(&self) {}

    fn emit(&self, tone: ToneKind) {
        debug!("Silent mode, dropping {:?} tone", tone);
    }
}

type SharedOutput = Arc<Mutex<Box<dyn Write + Send>>>;
type OutputFactory = Box<dyn Fn() -> io::Result<Box<dyn Write + Send>> + Send + Sync>;

/// Rings the terminal bell.
///
/// The output handle is only opened once the first user action primes it.
pub struct BellEmitter {
    open: OutputFactory,
    output: Mutex<Option<SharedOutput>>,
}

impl BellEmitter {
    /// Bell on the process's stderr
    pub fn stderr() -> Self {
        Self::with_output(|| Ok(Box::new(io::stderr()) as Box<dyn Write + Send>))
    }

    /// Bell on a custom writer, opened lazily
    pub fn with_output<F>(open: F) -> Self
    where
        F: Fn() -> io::Result<Box<dyn Write + Send>> + Send + Sync + 'static,
    {
        Self {
            open: Box::new(open),
            output: Mutex::new(None),
        }
    }

    /// Whether the output handle has been opened
    pub fn is_primed(&self) -> bool {
        self.output
            .lock()
            .map(|output| output.is_some())
            .unwrap_or(false)
    }

    fn handle(&self) -> Result<SharedOutput, AudioError> {
        self.output
            .lock()
            .ok()
            .and_then(|output| output.clone())
            .ok_or(AudioError::NotPrimed)
    }
}

impl AlertEmitter for BellEmitter {
    fn prime(&self) {
        let Ok(mut output) = self.output.lock() else {
            warn!("Bell output lock poisoned, audio disabled");
            return;
        };
        if output.is_some() {
            return;
        }

        match (self.open)() {
            Ok(writer) => {
                debug!("Bell output opened");
                *output = Some(Arc::new(Mutex::new(writer)));
            }
            Err(e) => warn!("Failed to open bell output: {}", e),
        }
    }

    fn emit(&self, tone: ToneKind) {
        let output = match self.handle() {
            Ok(output) => output,
            Err(e) => {
                debug!("Skipping {:?} tone: {}", tone, e);
                return;
            }
        };

        let ring = move || {
            if let Err(e) = ring_bell(&output, tone) {
                warn!("Failed to play {:?} tone: {}", tone, e);
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(ring);
            }
            Err(_) => ring(),
        }
    }
}

fn ring_bell(output: &SharedOutput, tone: ToneKind) -> Result<(), AudioError> {
    let mut writer = output
        .lock()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "bell output lock poisoned"))?;
    writer.write_all(tone.bell())?;
    writer.flush()?;
    Ok(())
}

/// Forwards tones to connected clients so they can synthesize them
pub struct BroadcastEmitter {
    tx: broadcast::Sender<ToneEvent>,
}

impl BroadcastEmitter {
    pub fn new(tx: broadcast::Sender<ToneEvent>) -> Self {
        Self { tx }
    }
}

impl AlertEmitter for BroadcastEmitter {
    fn prime(&self) {}

    fn emit(&self, tone: ToneKind) {
        // No connected clients is fine
        if self.tx.send(ToneEvent::new(tone)).is_err() {
            debug!("No tone subscribers for {:?}", tone);
        }
    }
}

/// Fans every call out to a set of emitters
#[derive(Default)]
pub struct MultiEmitter {
    emitters: Vec<Arc<dyn AlertEmitter>>,
}

impl MultiEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, emitter: Arc<dyn AlertEmitter>) -> Self {
        self.emitters.push(emitter);
        self
    }
}

impl AlertEmitter for MultiEmitter {
    fn prime(&self) {
        for emitter in &self.emitters {
            emitter.prime();
        }
    }

    fn emit(&self, tone: ToneKind) {
        for emitter in &self.emitters {
            emitter.emit(tone);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn bell_is_silent_until_primed() {
        let sink = Sink::default();
        let writer = sink.clone();
        let bell = BellEmitter::with_output(move || Ok(Box::new(writer.clone()) as Box<dyn Write + Send>));

        bell.emit(ToneKind::Alert);
        assert!(sink.0.lock().unwrap().is_empty());

        bell.prime();
        bell.emit(ToneKind::Click);
        bell.emit(ToneKind::Alert);
        assert_eq!(sink.0.lock().unwrap().as_slice(), b"\x07\x07\x07");
    }

    #[test]
    fn priming_opens_output_once() {
        let opened = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&opened);
        let bell = BellEmitter::with_output(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Sink::default()) as Box<dyn Write + Send>)
        });

        bell.prime();
        bell.prime();
        bell.prime();
        assert!(bell.is_primed());
        assert_eq!(opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unavailable_output_is_tolerated() {
        let bell = BellEmitter::with_output(|| {
            Err(io::Error::new(io::ErrorKind::NotFound, "no audio device"))
        });
        bell.prime();
        assert!(!bell.is_primed());
        bell.emit(ToneKind::Alert);
    }

    #[test]
    fn write_failures_are_swallowed() {
        let bell = BellEmitter::with_output(|| Ok(Box::new(Broken) as Box<dyn Write + Send>));
        bell.prime();
        bell.emit(ToneKind::Click);
        bell.emit(ToneKind::Alert);
    }

    #[test]
    fn broadcast_without_subscribers_is_fine() {
        let (tx, _) = broadcast::channel(4);
        let emitter = BroadcastEmitter::new(tx);
        emitter.emit(ToneKind::Alert);
    }

    #[test]
    fn broadcast_carries_tone_shape() {
        let (tx, mut rx) = broadcast::channel(4);
        let emitter = BroadcastEmitter::new(tx);
        emitter.emit(ToneKind::Click);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.tone, ToneKind::Click);
        assert_eq!(event.shape.frequency_hz, 600);
        assert_eq!(event.shape.waveform, "sine");
    }

    #[test]
    fn multi_emitter_fans_out() {
        let (tx, mut rx) = broadcast::channel(4);
        let multi = MultiEmitter::new()
            .with(Arc::new(SilentEmitter))
            .with(Arc::new(BroadcastEmitter::new(tx)));
        multi.prime();
        multi.emit(ToneKind::Alert);
        assert_eq!(rx.try_recv().unwrap().tone, ToneKind::Alert);
    }
}
