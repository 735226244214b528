use super::*;
use tempfile::TempDir;

fn transcription_with_segments() -> Transcription {
    Transcription {
        text: "سلام دنیا".to_string(),
        segments: vec![
            Segment {
                start: 0.0,
                end: 1.5,
                text: "سلام".to_string(),
            },
            Segment {
                start: 1.5,
                end: 3.0,
                text: "دنیا".to_string(),
            },
        ],
        language: Some("fa".to_string()),
        duration: 3.0,
        processing_time: 0.42,
    }
}

#[test]
fn test_txt_is_plain_text_with_trailing_newline() {
    let bytes = render(
        &transcription_with_segments(),
        Path::new("voice.mp3"),
        "whisper",
        OutputFormat::Txt,
        false,
    )
    .unwrap();

    assert_eq!(String::from_utf8(bytes).unwrap(), "سلام دنیا\n");
}

#[test]
fn test_txt_with_timestamps_prefixes_each_segment() {
    let bytes = render(
        &transcription_with_segments(),
        Path::new("voice.mp3"),
        "whisper",
        OutputFormat::Txt,
        true,
    )
    .unwrap();

    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(
        text,
        "[0:00:00 - 0:00:02] سلام\n[0:00:02 - 0:00:03] دنیا\n"
    );
}

#[test]
fn test_txt_with_timestamps_falls_back_when_no_segments() {
    let mut transcription = transcription_with_segments();
    transcription.segments.clear();

    let bytes = render(
        &transcription,
        Path::new("voice.mp3"),
        "whisper",
        OutputFormat::Txt,
        true,
    )
    .unwrap();

    assert_eq!(String::from_utf8(bytes).unwrap(), "سلام دنیا\n");
}

#[test]
fn test_srt_numbers_cues_and_formats_timing() {
    let bytes = render(
        &transcription_with_segments(),
        Path::new("voice.mp3"),
        "whisper",
        OutputFormat::Srt,
        false,
    )
    .unwrap();

    let expected = "1\n\
                    00:00:00,000 --> 00:00:01,500\n\
                    سلام\n\
                    \n\
                    2\n\
                    00:00:01,500 --> 00:00:03,000\n\
                    دنیا\n";
    assert_eq!(String::from_utf8(bytes).unwrap(), expected);
}

#[test]
fn test_srt_without_segments_emits_single_full_cue() {
    let mut transcription = transcription_with_segments();
    transcription.segments.clear();

    let bytes = render(
        &transcription,
        Path::new("voice.mp3"),
        "whisper",
        OutputFormat::Srt,
        false,
    )
    .unwrap();

    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "1\n00:00:00,000 --> 00:00:03,000\nسلام دنیا\n"
    );
}

#[test]
fn test_srt_of_empty_transcription_is_empty() {
    let transcription = Transcription {
        text: String::new(),
        segments: Vec::new(),
        language: None,
        duration: 0.0,
        processing_time: 0.0,
    };

    let bytes = render(
        &transcription,
        Path::new("silent.wav"),
        "whisper",
        OutputFormat::Srt,
        false,
    )
    .unwrap();

    assert!(bytes.is_empty());
}

#[test]
fn test_srt_time_formatting() {
    assert_eq!(format_srt_time(0.0), "00:00:00,000");
    assert_eq!(format_srt_time(1.5), "00:00:01,500");
    assert_eq!(format_srt_time(3661.25), "01:01:01,250");
    assert_eq!(format_srt_time(0.0014), "00:00:00,001");
    assert_eq!(format_srt_time(-2.0), "00:00:00,000");
}

#[test]
fn test_json_record_fields() {
    let bytes = render(
        &transcription_with_segments(),
        Path::new("clips/voice.mp3"),
        "openai",
        OutputFormat::Json,
        false,
    )
    .unwrap();

    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["file"], "clips/voice.mp3");
    assert_eq!(value["engine"], "openai");
    assert_eq!(value["language"], "fa");
    assert_eq!(value["duration"], 3.0);
    assert_eq!(value["text"], "سلام دنیا");
    assert_eq!(value["segments"].as_array().unwrap().len(), 2);
    assert_eq!(value["segments"][1]["start"], 1.5);
    assert_eq!(value["segments"][1]["text"], "دنیا");

    // Pretty-printed with a trailing newline, like a well-behaved CLI file.
    assert!(bytes.ends_with(b"\n"));
}

#[tokio::test]
async fn test_write_atomic_creates_parents_and_removes_temp() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("nested").join("out.txt");

    write_atomic(&target, "سلام\n".as_bytes()).await.unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "سلام\n");
    assert!(!target.with_extension("tmp").exists());
}

#[tokio::test]
async fn test_write_atomic_overwrites_existing_file() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("out.txt");
    std::fs::write(&target, "old").unwrap();

    write_atomic(&target, b"new\n").await.unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "new\n");
}

#[tokio::test]
async fn test_write_atomic_failure_is_output_write_error() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    // Parent is a regular file, so directory creation must fail.
    let target = blocker.join("out.txt");
    let err = write_atomic(&target, b"data").await.unwrap_err();

    assert_eq!(err.kind(), "output-write");
    assert!(err.to_string().contains("out.txt"));
}
