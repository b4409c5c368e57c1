//! Language selection and the localized strings used by the assistant.
//!
//! The language set is closed: adding a language means adding a `Locale`
//! constant and wiring it into [`Language::locale`]. A missing string is a
//! compile error rather than a runtime lookup miss.

use serde::{Deserialize, Serialize};

/// Languages supported by the assistant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    It,
}

impl Language {
    /// Parse a form-supplied language tag.
    ///
    /// Anything outside the supported set coerces to English instead of
    /// failing the request.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("it") => Language::It,
            _ => Language::En,
        }
    }

    /// ISO 639-1 code, passed to transcription providers as an accuracy hint.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::It => "it",
        }
    }

    pub fn locale(self) -> &'static Locale {
        match self {
            Language::En => &EN,
            Language::It => &IT,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The fixed set of user-facing strings for one language.
pub struct Locale {
    /// Header line above the sensor context block.
    pub data_header: &'static str,
    /// Placeholder when no `device_data` was supplied.
    pub no_data: &'static str,
    /// Placeholder when `device_data` is valid JSON but not an array.
    pub invalid_format: &'static str,
    /// Placeholder when `device_data` is not valid JSON.
    pub parse_error: &'static str,
    /// Placeholder when the array holds no usable readings.
    pub no_readings: &'static str,
    /// Marker substituted when transcription fails or yields nothing.
    pub unable_to_transcribe: &'static str,
    /// Soft-failure answer when audio was accepted but unintelligible.
    pub retry_answer: &'static str,
    /// Non-sensitive message returned on generation-provider failures.
    pub provider_error: &'static str,
    /// Instruction prepended to multi-modal requests that carry audio inline.
    pub transcribe_instruction: &'static str,
    pub device_label: &'static str,
    pub temperature_label: &'static str,
    pub humidity_label: &'static str,
    pub pressure_label: &'static str,
    pub light_label: &'static str,
    pub noise_label: &'static str,
    pub tof_label: &'static str,
    pub position_label: &'static str,
    pub time_label: &'static str,
    system_template: &'static str,
}

impl Locale {
    /// Render the system instruction with the sensor context embedded.
    pub fn system_instruction(&self, context: &str) -> String {
        self.system_template.replace("{context}", context)
    }
}

static EN: Locale = Locale {
    data_header: "PARK SENSOR DATA:",
    no_data: "(no sensor data provided)",
    invalid_format: "(sensor data is not a JSON array)",
    parse_error: "(sensor data could not be parsed)",
    no_readings: "(no sensor readings available)",
    unable_to_transcribe: "[unable to transcribe audio]",
    retry_answer: "I could not make out any speech in the audio. Please try again, or type your question.",
    provider_error: "The assistant is temporarily unavailable. Please try again later.",
    transcribe_instruction: "1) Transcribe exactly what the user says in the audio.\n\
        2) Then answer the user's question.\n\
        If the audio has no clear speech, set transcript to an empty string and ask the user to repeat.",
    device_label: "Device",
    temperature_label: "Temperature",
    humidity_label: "Humidity",
    pressure_label: "Pressure",
    light_label: "Light",
    noise_label: "Noise",
    tof_label: "Distance (ToF)",
    position_label: "Position",
    time_label: "Time",
    system_template: "You are the assistant for a smart park. You may receive audio and/or text.\n\
        \n\
        GROUNDING DATA (authoritative for park weather and conditions):\n\
        {context}\n\
        \n\
        RULES:\n\
        - For questions about park weather or conditions (temperature, humidity, pressure, light, noise by device), use ONLY the grounding data above.\n\
        - If data is missing for a device or a field, say you do not have sensor data there, then answer in general terms.\n\
        - For general questions or small talk, answer normally.\n\
        - Keep answers concise and include measurement units.",
};

static IT: Locale = Locale {
    data_header: "DATI DEI SENSORI DEL PARCO:",
    no_data: "(nessun dato dei sensori fornito)",
    invalid_format: "(i dati dei sensori non sono un array JSON)",
    parse_error: "(impossibile interpretare i dati dei sensori)",
    no_readings: "(nessuna lettura dei sensori disponibile)",
    unable_to_transcribe: "[impossibile trascrivere l'audio]",
    retry_answer: "Non sono riuscito a riconoscere alcun parlato nell'audio. Riprova oppure scrivi la tua domanda.",
    provider_error: "L'assistente non è al momento disponibile. Riprova più tardi.",
    transcribe_instruction: "1) Trascrivi esattamente ciò che l'utente dice nell'audio.\n\
        2) Poi rispondi alla domanda dell'utente.\n\
        Se l'audio non contiene parlato chiaro, imposta transcript a una stringa vuota e chiedi all'utente di ripetere.",
    device_label: "Dispositivo",
    temperature_label: "Temperatura",
    humidity_label: "Umidità",
    pressure_label: "Pressione",
    light_label: "Luce",
    noise_label: "Rumore",
    tof_label: "Distanza (ToF)",
    position_label: "Posizione",
    time_label: "Ora",
    system_template: "Sei l'assistente di un parco intelligente. Puoi ricevere audio e/o testo.\n\
        \n\
        DATI DI RIFERIMENTO (autorevoli per meteo e condizioni del parco):\n\
        {context}\n\
        \n\
        REGOLE:\n\
        - Per domande su meteo o condizioni del parco (temperatura, umidità, pressione, luce, rumore per dispositivo) usa SOLO i dati di riferimento sopra.\n\
        - Se mancano dati per un dispositivo o un campo, dillo chiaramente e poi rispondi in termini generali.\n\
        - Per domande generiche o conversazione, rispondi normalmente.\n\
        - Mantieni le risposte concise e includi le unità di misura.",
};
