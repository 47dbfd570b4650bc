//! Ring cue playback

use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

use voice_concierge_config::RingSettings;
use voice_concierge_core::{AudioContext, AudioDevice, Result};

use crate::{render, RingCadence};

/// Completion signal of one ring cue
///
/// Resolves at cue start + completion delay, or immediately when the cue
/// could not be played. Dropping it does not stop the cue or leak the audio
/// context; the context is released by the background timer either way.
#[derive(Debug)]
pub struct RingCompletion {
    rx: Option<oneshot::Receiver<()>>,
}

impl RingCompletion {
    fn ready() -> Self {
        Self { rx: None }
    }

    /// True when playback failed and the cue resolved without sound
    pub fn is_silent(&self) -> bool {
        self.rx.is_none()
    }
}

impl Future for RingCompletion {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match self.rx.as_mut() {
            None => Poll::Ready(()),
            // A dropped sender also counts as done
            Some(rx) => Pin::new(rx).poll(cx).map(|_| ()),
        }
    }
}

/// Plays the two-burst ring on an audio device
pub struct RingCue {
    device: Arc<dyn AudioDevice>,
    cadence: RingCadence,
    completion: Duration,
    /// Rendered samples keyed by sample rate
    cache: Mutex<Option<(u32, Arc<[f32]>)>>,
}

impl RingCue {
    pub fn new(device: Arc<dyn AudioDevice>, cadence: RingCadence, completion: Duration) -> Self {
        Self {
            device,
            cadence,
            completion,
            cache: Mutex::new(None),
        }
    }

    pub fn from_settings(device: Arc<dyn AudioDevice>, settings: &RingSettings) -> Self {
        Self::new(
            device,
            RingCadence::from_settings(settings),
            settings.completion(),
        )
    }

    pub fn completion_delay(&self) -> Duration {
        self.completion
    }

    /// Start the cue and return its completion signal. Never fails.
    ///
    /// Everything up to scheduling the samples, including resuming a
    /// suspended context, happens synchronously inside this call so it stays
    /// within the caller's user-gesture turn.
    pub fn play(&self) -> RingCompletion {
        let started = Instant::now();

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("No async runtime for ring cue timer; skipping cue");
                return RingCompletion::ready();
            },
        };

        let ctx = match self.start_playback() {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::debug!(error = %e, "Ring cue unavailable, continuing silently");
                return RingCompletion::ready();
            },
        };

        let (tx, rx) = oneshot::channel();
        let deadline = started + self.completion;
        runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut ctx = ctx;
            if let Err(e) = ctx.close() {
                tracing::debug!(error = %e, "Failed to close ring cue audio context");
            }
            let _ = tx.send(());
        });

        RingCompletion { rx: Some(rx) }
    }

    fn start_playback(&self) -> Result<Box<dyn AudioContext>> {
        let mut ctx = self.device.open()?;

        if let Err(e) = self.schedule(ctx.as_mut()) {
            // Release a partially set up context
            if let Err(close_err) = ctx.close() {
                tracing::debug!(error = %close_err, "Failed to close audio context");
            }
            return Err(e);
        }

        Ok(ctx)
    }

    fn schedule(&self, ctx: &mut dyn AudioContext) -> Result<()> {
        if ctx.is_suspended() {
            if let Err(e) = ctx.resume() {
                tracing::warn!(error = %e, "Audio context resume refused");
            }
        }
        let samples = self.samples(ctx.sample_rate());
        ctx.play(samples)
    }

    fn samples(&self, sample_rate: u32) -> Arc<[f32]> {
        let mut cache = self.cache.lock();
        if let Some((rate, samples)) = cache.as_ref() {
            if *rate == sample_rate {
                return samples.clone();
            }
        }
        let samples: Arc<[f32]> = render(&self.cadence, sample_rate).into();
        *cache = Some((sample_rate, samples.clone()));
        samples
    }
}

impl std::fmt::Debug for RingCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingCue")
            .field("cadence", &self.cadence)
            .field("completion", &self.completion)
            .finish()
    }
}
