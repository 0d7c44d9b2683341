use std::io::Cursor;

use segue_core::wav::{encode_wav_pcm16, write_wav};

#[test]
fn stereo_buffer_round_trips_through_the_header() {
    let left = vec![0.5_f32, -0.5];
    let right = vec![0.5_f32, -0.5];

    let bytes = encode_wav_pcm16(&[left, right], 44_100).expect("encode should succeed");

    let mut reader =
        hound::WavReader::new(Cursor::new(bytes)).expect("encoded bytes should parse");
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44_100);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);

    let samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<Result<_, _>>()
        .expect("samples should decode");
    assert_eq!(samples, vec![16384, 16384, -16384, -16384]);
}

#[test]
fn out_of_range_samples_clamp_to_full_scale() {
    let bytes = encode_wav_pcm16(&[vec![3.0_f32, -3.0]], 22_050).expect("encode should succeed");

    let mut reader =
        hound::WavReader::new(Cursor::new(bytes)).expect("encoded bytes should parse");
    let samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<Result<_, _>>()
        .expect("samples should decode");
    assert_eq!(samples, vec![32767, -32768]);
}

#[test]
fn file_export_matches_the_in_memory_encoding() {
    let channels = vec![vec![0.25_f32; 128], vec![-0.25_f32; 128]];
    let temp_dir = tempfile::tempdir().expect("tempdir should work");
    let path = temp_dir.path().join("export").join("mix.wav");

    write_wav(&path, &channels, 48_000).expect("wav write should succeed");

    let written = std::fs::read(&path).expect("written wav should be readable");
    let encoded = encode_wav_pcm16(&channels, 48_000).expect("encode should succeed");
    assert_eq!(written, encoded);
    assert_eq!(written.len(), 44 + 128 * 2 * 2);
}
