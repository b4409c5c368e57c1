//! Audio upload normalization.
//!
//! Browsers and recording apps report the same encoding under several MIME
//! strings; providers want one canonical token per codec. Unknown or missing
//! content types fall back to wav so a bad `Content-Type` header never fails
//! the upload.

/// Canonical audio encodings accepted by the transcription providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    #[default]
    Wav,
    Mp3,
    Aiff,
    Aac,
    Ogg,
    Flac,
    Webm,
    M4a,
}

impl AudioFormat {
    /// Map an uploaded content type onto a canonical token.
    pub fn from_mime(mime: Option<&str>) -> Self {
        let Some(mime) = mime else {
            return AudioFormat::Wav;
        };
        match mime.trim().to_ascii_lowercase().as_str() {
            "audio/wav" | "audio/x-wav" | "audio/wave" => AudioFormat::Wav,
            "audio/mp3" | "audio/mpeg" => AudioFormat::Mp3,
            "audio/aiff" | "audio/x-aiff" => AudioFormat::Aiff,
            "audio/aac" => AudioFormat::Aac,
            "audio/ogg" | "application/ogg" => AudioFormat::Ogg,
            "audio/flac" | "audio/x-flac" => AudioFormat::Flac,
            "audio/webm" => AudioFormat::Webm,
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" => AudioFormat::M4a,
            _ => AudioFormat::Wav,
        }
    }

    /// File extension used when handing the clip to a provider.
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Aiff => "aiff",
            AudioFormat::Aac => "aac",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Flac => "flac",
            AudioFormat::Webm => "webm",
            AudioFormat::M4a => "m4a",
        }
    }

    /// Canonical MIME string sent to providers.
    pub fn mime(self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mp3",
            AudioFormat::Aiff => "audio/aiff",
            AudioFormat::Aac => "audio/aac",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::Webm => "audio/webm",
            AudioFormat::M4a => "audio/mp4",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
