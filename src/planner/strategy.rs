//! Codec selection strategy

use tracing::{debug, info};

use crate::planner::{CodecDecision, Container, CustomParameters, Preset};
use crate::probe::MediaInfo;

/// Stream-copy sentinel understood by the encoder
pub const COPY: &str = "copy";

/// Everything the selector decides on
#[derive(Debug, Clone, Copy)]
pub struct SelectionInput<'a> {
    pub media_info: &'a MediaInfo,
    pub container: Container,
    pub preset: Preset,
    /// Whether the caller asked for the preset rather than inheriting the default
    pub preset_explicit: bool,
    pub params: &'a CustomParameters,
}

/// Chooses between stream copy and re-encoding and resolves effective codecs.
///
/// Selection is a pure function of its input; no I/O happens here.
#[derive(Debug, Default)]
pub struct CodecSelector;

impl CodecSelector {
    /// Create a new codec selector
    pub fn new() -> Self {
        Self
    }

    /// Decide the effective codecs for a conversion
    pub fn select(&self, input: &SelectionInput<'_>) -> CodecDecision {
        let params = input.params;

        if let (Some(video), Some(audio)) = (params.video_codec(), params.audio_codec()) {
            info!(video, audio, "Using custom codecs");
            return CodecDecision {
                video_codec: video.to_string(),
                audio_codec: audio.to_string(),
                stream_copy: false,
                video_bitrate: params.video_bitrate().map(str::to_string),
                audio_bitrate: params.audio_bitrate().map(str::to_string),
            };
        }

        if params.is_set() {
            info!("Custom parameters present, re-encoding with container defaults");
            return self.resolve_defaults(input);
        }

        if self.can_stream_copy(input) {
            info!(container = %input.container, "Streams are compatible, using stream copy");
            return CodecDecision {
                video_codec: COPY.to_string(),
                audio_codec: COPY.to_string(),
                stream_copy: true,
                video_bitrate: None,
                audio_bitrate: None,
            };
        }

        info!(preset = %input.preset, "Re-encoding with container defaults");
        self.resolve_defaults(input)
    }

    /// Whether both primary streams can be remuxed into the target container
    pub fn can_stream_copy(&self, input: &SelectionInput<'_>) -> bool {
        if input.preset_explicit {
            debug!("Explicit preset requested, stream copy disabled");
            return false;
        }

        let (video, audio) = match (
            input.media_info.primary_video(),
            input.media_info.primary_audio(),
        ) {
            (Some(video), Some(audio)) => (video, audio),
            _ => {
                debug!("Stream copy needs both a video and an audio stream");
                return false;
            }
        };

        let compatible = input.container.accepts_video(&video.codec)
            && input.container.accepts_audio(&audio.codec);
        debug!(
            video = %video.codec,
            audio = %audio.codec,
            container = %input.container,
            compatible,
            "Checked stream copy compatibility"
        );
        compatible
    }

    /// Fill unspecified codecs from the container defaults. Preset bitrates
    /// apply only to a default codec and only when no bitrate was given.
    fn resolve_defaults(&self, input: &SelectionInput<'_>) -> CodecDecision {
        let params = input.params;
        let (default_video, default_audio) = input.container.default_codecs();

        let (video_codec, video_bitrate) = match params.video_codec() {
            Some(codec) => (codec, params.video_bitrate().map(str::to_string)),
            None => (
                default_video,
                Some(
                    params
                        .video_bitrate()
                        .unwrap_or(input.preset.video_bitrate())
                        .to_string(),
                ),
            ),
        };

        let (audio_codec, audio_bitrate) = match params.audio_codec() {
            Some(codec) => (codec, params.audio_bitrate().map(str::to_string)),
            None => (
                default_audio,
                Some(
                    params
                        .audio_bitrate()
                        .unwrap_or(input.preset.audio_bitrate())
                        .to_string(),
                ),
            ),
        };

        CodecDecision {
            video_codec: video_codec.to_string(),
            audio_codec: audio_codec.to_string(),
            stream_copy: false,
            video_bitrate,
            audio_bitrate,
        }
    }
}
