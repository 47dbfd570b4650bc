//! Audio devices for hosts without a live sound card

use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::PathBuf;
use std::sync::Arc;

use voice_concierge_core::{AudioContext, AudioDevice, Error, Result};

/// Device that is never available; the ring cue degrades to a silent no-op
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudioDevice;

impl AudioDevice for NullAudioDevice {
    fn open(&self) -> Result<Box<dyn AudioContext>> {
        Err(Error::audio("no audio output device"))
    }
}

/// Device that captures everything played into a 16-bit mono WAV file
///
/// The file is written when the context is closed.
#[derive(Debug, Clone)]
pub struct WavFileDevice {
    path: PathBuf,
    sample_rate: u32,
}

impl WavFileDevice {
    pub fn new(path: impl Into<PathBuf>, sample_rate: u32) -> Self {
        Self {
            path: path.into(),
            sample_rate,
        }
    }
}

impl AudioDevice for WavFileDevice {
    fn open(&self) -> Result<Box<dyn AudioContext>> {
        Ok(Box::new(WavContext {
            path: self.path.clone(),
            sample_rate: self.sample_rate,
            buffer: Vec::new(),
            closed: false,
        }))
    }
}

struct WavContext {
    path: PathBuf,
    sample_rate: u32,
    buffer: Vec<f32>,
    closed: bool,
}

impl WavContext {
    fn write(&self) -> std::result::Result<(), hound::Error> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&self.path, spec)?;
        for sample in &self.buffer {
            let clamped = sample.clamp(-1.0, 1.0);
            writer.write_sample((clamped * i16::MAX as f32) as i16)?;
        }
        writer.finalize()
    }
}

impl AudioContext for WavContext {
    fn is_suspended(&self) -> bool {
        false
    }

    fn resume(&mut self) -> Result<()> {
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn play(&mut self, samples: Arc<[f32]>) -> Result<()> {
        if self.closed {
            return Err(Error::audio("context already closed"));
        }
        self.buffer.extend_from_slice(&samples);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.write()
            .map_err(|e| Error::audio(format!("failed to write {}: {}", self.path.display(), e)))?;
        tracing::debug!(
            path = %self.path.display(),
            samples = self.buffer.len(),
            "Ring cue written to WAV"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_device_is_unavailable() {
        assert!(matches!(
            NullAudioDevice.open(),
            Err(Error::AudioUnavailable(_))
        ));
    }

    #[test]
    fn test_wav_written_on_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ring.wav");
        let device = WavFileDevice::new(&path, 8_000);

        let mut ctx = device.open().unwrap();
        ctx.play(Arc::from(vec![0.0f32, 0.5, -0.5, 1.5])).unwrap();
        assert!(!path.exists());
        ctx.close().unwrap();
        // Closing twice is harmless
        ctx.close().unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8_000);
        let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16_383, -16_383, i16::MAX]);
    }
}
