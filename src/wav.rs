use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::{WavReader, WavSpec, WavWriter};
use num_complex::Complex32;

use crate::error::{GainloopError, Result};

/// Complex baseband recording loaded from a stereo WAV file.
#[derive(Debug, Clone)]
pub struct IqRecording {
    pub samples: Vec<Complex32>,
    pub sample_rate: u32,
}

/// Read a stereo WAV file as I/Q samples (left = I, right = Q).
///
/// Integer PCM is normalized to [-1, 1).
pub fn read_iq_wav<P: AsRef<Path>>(path: P) -> Result<IqRecording> {
    let reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    if spec.channels != 2 {
        return Err(GainloopError::Format(format!(
            "expected stereo I/Q WAV file, got {} channels",
            spec.channels
        )));
    }

    let interleaved = read_samples(reader, &spec)?;
    let samples = interleaved
        .chunks_exact(2)
        .map(|pair| Complex32::new(pair[0], pair[1]))
        .collect();

    Ok(IqRecording {
        samples,
        sample_rate: spec.sample_rate,
    })
}

fn read_samples(mut reader: WavReader<BufReader<File>>, spec: &WavSpec) -> Result<Vec<f32>> {
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = 2_i64.pow(spec.bits_per_sample as u32 - 1) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Write I/Q samples as a 32-bit float stereo WAV file.
pub fn save_iq_wav<P: AsRef<Path>>(
    path: P,
    samples: &[Complex32],
    sample_rate: u32,
) -> Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path.as_ref(), spec)?;

    for sample in samples {
        writer.write_sample(sample.re)?;
        writer.write_sample(sample.im)?;
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("gainloop_{}_{}.wav", name, std::process::id()))
    }

    #[test]
    fn test_float_iq_file() {
        let path = temp_path("float");
        let samples = vec![
            Complex32::new(0.5, -0.25),
            Complex32::new(0.0, 1.0),
            Complex32::new(-0.75, 0.125),
        ];
        save_iq_wav(&path, &samples, 8000).unwrap();

        let recording = read_iq_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(recording.sample_rate, 8000);
        assert_eq!(recording.samples, samples);
    }

    #[test]
    fn test_int16_is_normalized() {
        let path = temp_path("int16");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for v in [16384_i16, -32768, 0, 8192] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let recording = read_iq_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(
            recording.samples,
            vec![Complex32::new(0.5, -1.0), Complex32::new(0.0, 0.25)]
        );
    }

    #[test]
    fn test_mono_rejected() {
        let path = temp_path("mono");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        writer.write_sample(0.5_f32).unwrap();
        writer.finalize().unwrap();

        let err = read_iq_wav(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, GainloopError::Format(_)));
    }
}
