use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn not_implemented(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::NotImplemented {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn unsupported(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Unsupported {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn out_of_memory(size: usize) -> Error {
        Error(ErrorKind::OutOfMemory { size }.into())
    }

    pub fn capacity_overflow(requested: impl Into<String>) -> Error {
        Error(
            ErrorKind::CapacityOverflow {
                requested: requested.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    /// Returns `true` for malformed, truncated or mistyped containers.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidFormat { .. }
                | ErrorKind::UnsupportedCompression { .. }
                | ErrorKind::ContentTypeMismatch { .. }
        )
    }

    /// Returns `true` for well-formed input the current platform or configuration
    /// cannot handle.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.kind(), ErrorKind::Unsupported { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("not yet implemented: {message}")]
    NotImplemented { message: String },

    #[error("invalid container format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("unsupported compression type {tag}")]
    UnsupportedCompression { tag: u32 },

    #[error("content type mismatch: expected '{expected}', found '{actual}'")]
    ContentTypeMismatch { expected: String, actual: String },

    #[error("unsupported: {message}")]
    Unsupported { message: String },

    #[error("failed to allocate {size} bytes")]
    OutOfMemory { size: usize },

    #[error("capacity overflow: {requested}")]
    CapacityOverflow { requested: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(_: std::convert::Infallible) -> Self {
        Error::invalid_operation("conversion")
    }
}
