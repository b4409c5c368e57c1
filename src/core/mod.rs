pub mod assistant;
pub mod audio;
pub mod context;
pub mod llm;
pub mod locale;
pub mod stt;

// Re-export commonly used types for convenience
pub use assistant::{
    AssistantProvider, AssistantQuery, AssistantVariant, AudioUpload, ChatResponse,
    MultiModalAssistant, TranscribeThenChatAssistant,
};
pub use audio::AudioFormat;
pub use context::{SensorReading, build_sensor_context};
pub use llm::{GeminiClient, GeminiConfig, GenerationError, TextGenerator, UserPart};
pub use locale::{Language, Locale};
pub use stt::{SpeechToText, SttError, WhisperStt, WhisperSttConfig};
