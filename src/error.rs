use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParamError {
    #[error("Format error: {message}{}", line_suffix(.line))]
    Format { message: String, line: Option<usize> },
    #[error("Read-only database: {0}")]
    ReadOnly(String),
    #[error("Lookup error: {0}")]
    Lookup(String),
    #[error("Resource error: {message}")]
    Resource {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
    #[error("Config error: {0}")]
    Config(String),
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" (line {n})"),
        None => String::new(),
    }
}

/// Coarse classification of a [`ParamError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    State,
    Lookup,
    Resource,
    Config,
}

impl ParamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Format { .. } => ErrorKind::Format,
            Self::ReadOnly(_) => ErrorKind::State,
            Self::Lookup(_) => ErrorKind::Lookup,
            Self::Resource { .. } => ErrorKind::Resource,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn format(message: impl Into<String>, line: Option<usize>) -> Self {
        Self::Format { message: message.into(), line }
    }

    /// Attaches a line number to a format error that does not carry one yet.
    pub(crate) fn at_line(self, number: usize) -> Self {
        match self {
            Self::Format { message, line: None } => Self::Format { message, line: Some(number) },
            other => other,
        }
    }

    pub(crate) fn resource(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Resource { message: message.into(), source: Some(source) }
    }
}

pub type Result<T> = std::result::Result<T, ParamError>;

// Helper conversions
impl From<config::ConfigError> for ParamError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
