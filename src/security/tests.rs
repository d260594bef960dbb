use super::*;
use crate::error::{TranscodeError, ValidationError};
use crate::planner::CustomParameters;

fn policy() -> SecurityPolicy {
    SecurityPolicy::default()
}

/// Seeds that would otherwise pass their validator
const CLEAN_SEEDS: [(&str, &str); 5] = [
    ("codec", "libx264"),
    ("bitrate", "2M"),
    ("resolution", "1920x1080"),
    ("framerate", "30"),
    ("path", "clip.mp4"),
];

fn run(policy: &SecurityPolicy, which: &str, value: &str) -> Result<(), ValidationError> {
    match which {
        "codec" => policy.validate_codec(value, CodecKind::Video),
        "bitrate" => policy.validate_bitrate(value),
        "resolution" => policy.validate_resolution(value),
        "framerate" => policy.validate_framerate(value),
        "path" => policy.validate_file_path(value),
        other => panic!("unknown validator {}", other),
    }
}

#[test]
fn test_clean_seeds_pass() {
    let policy = policy();
    for (which, value) in CLEAN_SEEDS {
        assert!(run(&policy, which, value).is_ok(), "{} {:?}", which, value);
    }
}

#[test]
fn test_every_denied_char_fails_every_validator() {
    let policy = policy();
    for (which, seed) in CLEAN_SEEDS {
        for ch in DENIED_CHARS {
            for candidate in [
                format!("{}{}", ch, seed),
                format!("{}{}", seed, ch),
                format!("{}{}{}", &seed[..1], ch, &seed[1..]),
                ch.to_string(),
            ] {
                assert!(
                    run(&policy, which, &candidate).is_err(),
                    "{} accepted {:?}",
                    which,
                    candidate
                );
            }
        }
    }
}

#[test]
fn test_injection_attempts_report_invalid_character() {
    let policy = policy();
    assert_eq!(
        policy.validate_codec("libx264; rm -rf /", CodecKind::Video),
        Err(ValidationError::InvalidCharacter { ch: ';' })
    );
    assert_eq!(
        policy.validate_bitrate("2M$(whoami)"),
        Err(ValidationError::InvalidCharacter { ch: '$' })
    );
    assert_eq!(
        policy.validate_file_path("out.mp4 && curl evil"),
        Err(ValidationError::InvalidCharacter { ch: '&' })
    );
}

#[test]
fn test_codec_whitelist_is_exact() {
    let policy = policy();
    for codec in DEFAULT_VIDEO_CODECS {
        assert!(policy.validate_codec(codec, CodecKind::Video).is_ok());
        for variant in [
            format!(" {}", codec),
            format!("{} ", codec),
            codec.to_uppercase(),
            format!("{}x", codec),
        ] {
            assert!(
                policy.validate_codec(&variant, CodecKind::Video).is_err(),
                "accepted {:?}",
                variant
            );
        }
    }
    for codec in DEFAULT_AUDIO_CODECS {
        assert!(policy.validate_codec(codec, CodecKind::Audio).is_ok());
        assert!(policy
            .validate_codec(&format!("{}\u{a0}", codec), CodecKind::Audio)
            .is_err());
    }
}

#[test]
fn test_codec_kinds_do_not_mix() {
    let policy = policy();
    assert_eq!(
        policy.validate_codec("aac", CodecKind::Video),
        Err(ValidationError::NotAllowed {
            kind: "video".to_string(),
            value: "aac".to_string(),
        })
    );
    assert!(policy.validate_codec("libx264", CodecKind::Audio).is_err());
    assert!(policy.validate_codec("", CodecKind::Audio).is_err());
}

#[test]
fn test_parameter_length_limit() {
    let policy = policy();
    let long = "1".repeat(DEFAULT_MAX_PARAMETER_LENGTH + 1);
    assert_eq!(
        policy.validate_bitrate(&long),
        Err(ValidationError::TooLong {
            len: DEFAULT_MAX_PARAMETER_LENGTH + 1,
            max: DEFAULT_MAX_PARAMETER_LENGTH,
        })
    );
    assert!(policy
        .validate_bitrate(&"1".repeat(DEFAULT_MAX_PARAMETER_LENGTH))
        .is_ok());
}

#[test]
fn test_bitrate_grammar() {
    let policy = policy();
    for ok in ["", "128", "192k", "1500K", "2M", "2.5m", "0.5k"] {
        assert!(policy.validate_bitrate(ok).is_ok(), "rejected {:?}", ok);
    }
    for bad in ["k", "2MB", "1.k", ".5M", "-1M", "2 M", "1e6", "2G"] {
        assert!(
            matches!(
                policy.validate_bitrate(bad),
                Err(ValidationError::InvalidFormat { .. })
            ),
            "accepted {:?}",
            bad
        );
    }
}

#[test]
fn test_resolution_bounds() {
    let policy = policy();
    assert!(policy.validate_resolution("1920x1080").is_ok());
    assert!(policy.validate_resolution("7680x4320").is_ok());
    assert!(policy.validate_resolution("1x1").is_ok());
    assert!(policy.validate_resolution("").is_ok());

    for bad in ["99999x1", "0x0", "7681x4320", "7680x4321", "1920x0"] {
        assert!(
            matches!(
                policy.validate_resolution(bad),
                Err(ValidationError::OutOfRange { .. })
            ),
            "accepted {:?}",
            bad
        );
    }
    assert!(matches!(
        policy.validate_resolution("99999999999999999999x1"),
        Err(ValidationError::OutOfRange { .. })
    ));
    for bad in ["1920X1080", "1920*1080", "x1080", "1920x", "hd"] {
        assert!(matches!(
            policy.validate_resolution(bad),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }
}

#[test]
fn test_framerate_bounds() {
    let policy = policy();
    for ok in ["30", "23.976", "120", "0.5", ""] {
        assert!(policy.validate_framerate(ok).is_ok(), "rejected {:?}", ok);
    }
    assert!(matches!(
        policy.validate_framerate("121"),
        Err(ValidationError::OutOfRange { .. })
    ));
    assert!(matches!(
        policy.validate_framerate("0"),
        Err(ValidationError::OutOfRange { .. })
    ));
    assert!(matches!(
        policy.validate_framerate("120.01"),
        Err(ValidationError::OutOfRange { .. })
    ));
    assert!(matches!(
        policy.validate_framerate("30/1"),
        Err(ValidationError::InvalidFormat { .. })
    ));
}

#[test]
fn test_file_path_traversal() {
    let policy = policy();
    assert_eq!(
        policy.validate_file_path("../../etc/passwd"),
        Err(ValidationError::Traversal {
            path: "../../etc/passwd".to_string()
        })
    );
    assert!(matches!(
        policy.validate_file_path("media/../../secret.mp4"),
        Err(ValidationError::Traversal { .. })
    ));
    assert!(policy.validate_file_path("clip.mp4").is_ok());
    assert!(policy.validate_file_path("media/../clip.mp4").is_ok());
    assert!(policy.validate_file_path("/var/media/clip.mkv").is_ok());
    assert!(policy.validate_file_path("my clip (1).mp4").is_err());
}

#[test]
fn test_file_path_limits_and_controls() {
    let policy = policy();
    assert_eq!(policy.validate_file_path(""), Err(ValidationError::Empty));
    assert!(policy.validate_file_path(&"a".repeat(255)).is_ok());
    assert!(matches!(
        policy.validate_file_path(&"a".repeat(256)),
        Err(ValidationError::TooLong { .. })
    ));
    assert_eq!(
        policy.validate_file_path("clip\u{7}.mp4"),
        Err(ValidationError::InvalidCharacter { ch: '\u{7}' })
    );
}

#[test]
fn test_file_format() {
    let policy = policy();
    for ok in ["a.mp4", "a.MKV", "dir/a.webm", "a.flac", "a.m4a"] {
        assert!(policy.validate_file_format(ok).is_ok(), "rejected {:?}", ok);
    }
    assert_eq!(
        policy.validate_file_format("a.exe"),
        Err(ValidationError::FormatNotAllowed {
            extension: "exe".to_string()
        })
    );
    assert!(policy.validate_file_format("noextension").is_err());
}

#[test]
fn test_sample_rate_and_channels() {
    let policy = policy();
    assert!(policy.validate_sample_rate("44100").is_ok());
    assert!(policy.validate_sample_rate("").is_ok());
    assert!(policy.validate_sample_rate("44101").is_err());
    assert!(policy.validate_sample_rate("44100;").is_err());

    for ok in ALLOWED_CHANNELS {
        assert!(policy.validate_channels(ok).is_ok());
    }
    assert!(policy.validate_channels("3").is_err());
    assert!(policy.validate_channels("02").is_err());
}

#[test]
fn test_compression_level_closed_set() {
    let policy = policy();
    for level in 0..=12 {
        assert!(policy.validate_compression_level(&level.to_string()).is_ok());
    }
    assert!(matches!(
        policy.validate_compression_level("13"),
        Err(ValidationError::OutOfRange { .. })
    ));
    assert!(matches!(
        policy.validate_compression_level("999"),
        Err(ValidationError::OutOfRange { .. })
    ));
    assert!(matches!(
        policy.validate_compression_level("-1"),
        Err(ValidationError::InvalidFormat { .. })
    ));
    assert!(matches!(
        policy.validate_compression_level(""),
        Err(ValidationError::Empty)
    ));
    assert!(policy.validate_compression_level("5;id").is_err());
    assert!(policy.validate_compression_level("5 -y").is_err());
}

#[test]
fn test_validators_are_pure() {
    let policy = policy();
    let inputs = ["1920x1080", "0x0", "30", "121", "2M", "2MB", "../x", "clip.mp4", "a|b"];
    for input in inputs {
        assert_eq!(
            policy.validate_resolution(input),
            policy.validate_resolution(input)
        );
        assert_eq!(
            policy.validate_framerate(input),
            policy.validate_framerate(input)
        );
        assert_eq!(policy.validate_bitrate(input), policy.validate_bitrate(input));
        assert_eq!(
            policy.validate_file_path(input),
            policy.validate_file_path(input)
        );
    }
}

#[test]
fn test_custom_limits() {
    let policy = SecurityPolicy::with_limits(10, 3);
    assert!(policy.validate_bitrate("192k").is_err());
    assert!(policy.validate_bitrate("2M").is_ok());
    assert!(policy.validate_file_path("abcdef.mp4").is_ok());
    assert!(policy.validate_file_path("abcdefg.mp4").is_err());
}

#[test]
fn test_custom_parameters_name_failing_field() {
    let policy = policy();
    let params = CustomParameters {
        video_codec: Some("libx264".to_string()),
        resolution: Some("1920x1080".to_string()),
        framerate: Some("240".to_string()),
        ..Default::default()
    };

    match policy.validate_custom_parameters(&params) {
        Err(TranscodeError::Validation { field, .. }) => assert_eq!(field, "framerate"),
        other => panic!("unexpected result: {:?}", other),
    }

    let empty = CustomParameters::default();
    assert!(policy.validate_custom_parameters(&empty).is_ok());
}
