//! Media file precondition checks

use std::path::Path;

use crate::error::{TranscodeError, TranscodeResult};
use crate::probe::MediaInfo;

/// Media file validator
pub struct MediaValidator;

impl MediaValidator {
    /// Check that the input exists before the prober is invoked
    pub fn ensure_exists(&self, path: &str) -> TranscodeResult<()> {
        if !Path::new(path).exists() {
            return Err(TranscodeError::NotFound {
                path: path.to_string(),
            });
        }

        Ok(())
    }

    /// Check that the media can serve as an audio extraction source
    pub fn ensure_audio(&self, media_info: &MediaInfo) -> TranscodeResult<()> {
        if !media_info.has_audio() {
            return Err(TranscodeError::NoAudioStreams {
                path: media_info.filename.clone(),
            });
        }

        Ok(())
    }

    /// Refuse to clobber an existing output unless overwriting was requested
    pub fn ensure_writable(&self, output: &str, overwrite: bool) -> TranscodeResult<()> {
        if !overwrite && Path::new(output).exists() {
            return Err(TranscodeError::OutputExists {
                path: output.to_string(),
            });
        }

        Ok(())
    }
}
