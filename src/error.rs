use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The page never reached a minimally-loaded state
    #[error("NavigationFailure: could not load '{url}': {reason}")]
    NavigationFailure { url: String, reason: String },

    /// The locator cascade ran out of candidates
    #[error("ElementNotFound: target '{target}' (resolved locator '{locator}') matched no element")]
    ElementNotFound { target: String, locator: String },

    /// Malformed step
    #[error("UnknownAction: '{0}' is not a supported step action")]
    UnknownAction(String),

    /// A single driver call exceeded its bound
    #[error("ActionTimeout: {command} on '{locator}' timed out: {detail}")]
    ActionTimeout {
        command: String,
        locator: String,
        detail: String,
    },

    /// Discovery found neither interactive elements nor visible text
    #[error("EmptyPage: '{0}' rendered no interactive elements and no visible text")]
    EmptyPage(String),

    /// Bridge subprocess failed to spawn
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the bridge pipes failed
    #[error("Browser session I/O error: {0}")]
    SessionIo(String),

    /// The bridge answered a command with ok=false
    #[error("Browser command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Artifact persistence failed
    #[error("Artifact store error ({key}): {source}")]
    Artifact {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Run record or config file could not be loaded
    #[error("Invalid input: {0}")]
    Config(String),
}

impl ProbeError {
    /// Timeouts are absorbed by escalation ladders rather than surfaced directly.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::ActionTimeout { .. })
    }
}
