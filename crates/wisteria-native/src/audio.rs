//! cpal output stream and a small voice mixer.
//!
//! Voices are queued with an absolute start frame on the stream's own sample
//! clock, so triggers the core schedules ahead of time sound on time.

use std::f32::consts::{FRAC_PI_4, PI, TAU};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Clone, Copy, Debug)]
pub enum WaveKind {
    Sine,
    Square,
    Saw,
    Triangle,
    Noise,
}

/// Everything needed to render one note or drum hit.
#[derive(Clone, Debug)]
pub struct VoiceSpec {
    pub wave: WaveKind,
    pub frequency_hz: f32,
    /// Frequency multiplier reached at the end of the voice (1.0 = steady).
    pub pitch_drop: f32,
    pub amplitude: f32,
    pub start_sec: f64,
    pub duration_sec: f32,
    pub attack_sec: f32,
    pub release_sec: f32,
    /// -1 left .. 1 right
    pub pan: f32,
    /// One-pole lowpass coefficient in (0, 1]; 1 passes everything.
    pub lowpass: f32,
}

struct ActiveVoice {
    amplitude: f32,
    phase: f32,     // radians
    phase_inc: f32, // radians per sample
    phase_inc_end: f32,
    start_frame: u64,
    total_samples: u32,
    samples_emitted: u32,
    attack_samples: u32,
    release_samples: u32,
    wave: WaveKind,
    left_gain: f32,
    right_gain: f32,
    lowpass: f32,
    filtered: f32,
    noise: Option<StdRng>,
}

pub struct Mixer {
    sample_rate: f32,
    frames_played: u64,
    voices: Vec<ActiveVoice>,
    next_noise_seed: u64,
}

pub type SharedMixer = Arc<Mutex<Mixer>>;

impl Mixer {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            frames_played: 0,
            voices: Vec::new(),
            next_noise_seed: 0x9E37_79B9_7F4A_7C15,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn push(&mut self, spec: &VoiceSpec) {
        let sr = self.sample_rate;
        let total = ((spec.duration_sec * sr) as u32).max(1);
        let start_frame = (spec.start_sec.max(0.0) * sr as f64) as u64;
        // equal-power pan
        let angle = (spec.pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
        let noise = match spec.wave {
            WaveKind::Noise => {
                self.next_noise_seed = self.next_noise_seed.wrapping_add(1);
                Some(StdRng::seed_from_u64(self.next_noise_seed))
            }
            _ => None,
        };
        let phase_inc = TAU * spec.frequency_hz / sr;
        self.voices.push(ActiveVoice {
            amplitude: spec.amplitude.min(1.0),
            phase: 0.0,
            phase_inc,
            phase_inc_end: phase_inc * spec.pitch_drop,
            start_frame,
            total_samples: total,
            samples_emitted: 0,
            attack_samples: ((spec.attack_sec * sr) as u32).min(total),
            release_samples: ((spec.release_sec * sr) as u32).min(total),
            wave: spec.wave,
            left_gain: angle.cos(),
            right_gain: angle.sin(),
            lowpass: spec.lowpass.clamp(0.001, 1.0),
            filtered: 0.0,
            noise,
        });
    }

    fn mix_sample_stereo(&mut self) -> (f32, f32) {
        let frame = self.frames_played;
        self.frames_played += 1;
        let mut left = 0.0f32;
        let mut right = 0.0f32;
        let mut i = 0usize;
        while i < self.voices.len() {
            let v = &mut self.voices[i];
            if frame < v.start_frame {
                i += 1;
                continue;
            }
            let n = v.samples_emitted;
            let env = if n < v.attack_samples {
                n as f32 / v.attack_samples.max(1) as f32
            } else if n > v.total_samples.saturating_sub(v.release_samples) {
                let rel_n = n.saturating_sub(v.total_samples - v.release_samples);
                1.0 - (rel_n as f32 / v.release_samples.max(1) as f32)
            } else {
                1.0
            };
            let raw = match v.noise.as_mut() {
                Some(rng) => rng.gen::<f32>() * 2.0 - 1.0,
                None => render_wave_sample(v.phase, v.wave),
            };
            v.filtered += v.lowpass * (raw - v.filtered);
            let s = v.filtered * v.amplitude * env;
            left += s * v.left_gain;
            right += s * v.right_gain;

            let t = n as f32 / v.total_samples as f32;
            v.phase += v.phase_inc + (v.phase_inc_end - v.phase_inc) * t;
            if v.phase > TAU {
                v.phase -= TAU;
            }
            v.samples_emitted += 1;
            if v.samples_emitted >= v.total_samples {
                self.voices.swap_remove(i);
                continue;
            }
            i += 1;
        }
        (left.tanh(), right.tanh())
    }
}

fn render_wave_sample(phase: f32, wave: WaveKind) -> f32 {
    match wave {
        WaveKind::Sine => phase.sin(),
        WaveKind::Square => {
            if phase.sin() >= 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        WaveKind::Saw => {
            let t = phase / TAU;
            2.0 * (t - t.floor()) - 1.0
        }
        WaveKind::Triangle => {
            let t = phase / TAU;
            let saw = 2.0 * (t - t.floor()) - 1.0;
            (2.0 / PI) * saw.asin()
        }
        WaveKind::Noise => 0.0,
    }
}

/// Open the default output device and start streaming the mixer.
pub fn start_output() -> anyhow::Result<(cpal::Stream, SharedMixer)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("no audio output device"))?;
    let config = device
        .default_output_config()
        .context("querying output config")?;
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    let mixer = Arc::new(Mutex::new(Mixer::new(sample_rate)));
    let err_fn = |err: cpal::StreamError| log::error!("[audio] stream error: {err}");

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(
            &device,
            &config.into(),
            channels,
            Arc::clone(&mixer),
            err_fn,
            |x| x,
        )?,
        cpal::SampleFormat::I16 => build_stream::<i16>(
            &device,
            &config.into(),
            channels,
            Arc::clone(&mixer),
            err_fn,
            |x| (x * i16::MAX as f32) as i16,
        )?,
        cpal::SampleFormat::U16 => build_stream::<u16>(
            &device,
            &config.into(),
            channels,
            Arc::clone(&mixer),
            err_fn,
            |x| ((x * 0.5 + 0.5).clamp(0.0, 1.0) * u16::MAX as f32) as u16,
        )?,
        other => return Err(anyhow!("unsupported sample format {other:?}")),
    };
    stream.play().context("starting output stream")?;
    log::info!("[audio] {sample_rate} Hz, {channels} channel(s)");
    Ok((stream, mixer))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    mixer: SharedMixer,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
    convert: fn(f32) -> T,
) -> anyhow::Result<cpal::Stream>
where
    T: cpal::SizedSample + Send + 'static,
{
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let Ok(mut mixer) = mixer.lock() else {
                return;
            };
            for frame in data.chunks_mut(channels.max(1)) {
                let (l, r) = mixer.mix_sample_stereo();
                match frame {
                    [mono] => *mono = convert(0.5 * (l + r)),
                    [left, right, rest @ ..] => {
                        *left = convert(l);
                        *right = convert(r);
                        for extra in rest {
                            *extra = convert(0.0);
                        }
                    }
                    [] => {}
                }
            }
        },
        err_fn,
        None,
    )?;
    Ok(stream)
}
