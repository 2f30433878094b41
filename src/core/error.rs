//! Error types for the stream logger

pub type Result<T> = std::result::Result<T, StreamError>;

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// No target stream configured for a buffered stream
    #[error("invalid stream found: no target stream configured")]
    NoStream,

    /// Target stream rejected a flattened blob
    #[error("failed write on stream '{stream}': {message} ({entries} entries lost)")]
    Transmission {
        stream: String,
        entries: usize,
        message: String,
    },

    /// Target stream panicked while writing
    #[error("stream '{stream}' panicked: {message}")]
    StreamPanicked { stream: String, message: String },

    /// Autonomous transmission routine already running
    #[error("routine already running")]
    AlreadyRunning,

    /// Autonomous transmission requested with no interval
    #[error("no scheduling interval set")]
    NoInterval,

    /// Starting the routine from the interval setter failed
    #[error("routine start failed: {0}")]
    RoutineStart(#[source] Box<StreamError>),

    /// Routine terminated after a failed transmission
    #[error("routine has been stopped due to error: {0}")]
    RoutineFailed(#[source] Box<StreamError>),

    /// Unknown log level used as a routing key
    #[error("invalid log level provided: '{0}'")]
    UnknownLevel(String),

    /// One or more streams registered for a level failed
    #[error("dispatch to {level} streams failed: {failed}/{total} streams returned an error")]
    Dispatch {
        level: String,
        failed: usize,
        total: usize,
    },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl StreamError {
    /// Create a transmission error for the named stream
    pub fn transmission(
        stream: impl Into<String>,
        entries: usize,
        message: impl Into<String>,
    ) -> Self {
        StreamError::Transmission {
            stream: stream.into(),
            entries,
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        StreamError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        StreamError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        StreamError::Other(msg.into())
    }

    /// True for failures raised while handing a blob to a target stream
    pub fn is_transmission(&self) -> bool {
        matches!(
            self,
            StreamError::NoStream
                | StreamError::Transmission { .. }
                | StreamError::StreamPanicked { .. }
                | StreamError::RoutineFailed(_)
                | StreamError::WriterError(_)
                | StreamError::IoError(_)
        )
    }
}
