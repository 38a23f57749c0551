//! The "FAAAAHHHHH" alert clip.
//!
//! A breathy 'F' that opens into a sustained 'AH' with a falling pitch, rendered
//! as mono 16-bit PCM and wrapped in a WAV container for an external player.

use std::f32::consts::PI;

use rand::Rng;

pub const SAMPLE_RATE: u32 = 44_100;
pub const CLIP_SECONDS: f32 = 3.5;

/// Render the clip at `sample_rate`. Samples are in `[-1.0, 1.0]`.
pub fn synthesize_faaah(sample_rate: u32) -> Vec<f32> {
    let num_samples = (CLIP_SECONDS * sample_rate as f32) as usize;
    let mut rng = rand::thread_rng();

    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let progress = t / CLIP_SECONDS;

            // Rise, sustain, then sag by half
            let pitch = if progress < 0.1 {
                progress / 0.1
            } else if progress < 0.7 {
                1.0
            } else {
                1.0 - ((progress - 0.7) / 0.3) * 0.5
            };
            let base_freq = 120.0 + pitch * 80.0;
            let openness = (progress * 5.0).min(1.0);

            let mut sample = (2.0 * PI * base_freq * t).sin() * 0.4
                + (2.0 * PI * (800.0 * openness + 200.0) * t).sin() * 0.2 * openness
                + (2.0 * PI * 1200.0 * t).sin() * 0.1 * openness
                + (2.0 * PI * base_freq * 3.0 * t).sin() * 0.15;
            if progress > 0.15 {
                sample *= 1.0 + 0.05 * (2.0 * PI * 5.0 * t).sin();
            }

            let attack = (t / 0.05).min(1.0);
            let release = if progress > 0.85 {
                1.0 - (progress - 0.85) / 0.15
            } else {
                1.0
            };

            // The 'F'
            let breath = if progress < 0.1 {
                rng.gen_range(-1.0f32..1.0) * 0.3 * (1.0 - progress / 0.1)
            } else {
                0.0
            };

            ((sample * attack * release + breath) * 0.6).clamp(-1.0, 1.0)
        })
        .collect()
}

/// Encode mono samples as a 16-bit PCM WAV file.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    const CHANNELS: u16 = 1;
    const BITS_PER_SAMPLE: u16 = 16;
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    let data_len = (samples.len() * usize::from(block_align)) as u32;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        let pcm = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        out.extend_from_slice(&pcm.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_length_and_range() {
        let samples = synthesize_faaah(8_000);
        assert_eq!(samples.len(), 28_000);
        assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_clip_fades_out() {
        let samples = synthesize_faaah(8_000);
        let tail = samples.last().copied().unwrap_or(1.0);
        assert!(tail.abs() < 0.01);
        // Loud in the sustained middle
        assert!(samples[10_000..12_000].iter().any(|s| s.abs() > 0.2));
    }

    #[test]
    fn test_wav_header() {
        let wav = encode_wav(&[0.0, 1.0, -1.0], 8_000);

        assert_eq!(wav.len(), 44 + 6);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]), 42);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 8_000);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
        assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([wav[48], wav[49]]), -i16::MAX);
    }
}
