use std::io;
use thiserror::Error;

/// Errors that can occur while building a definition.
///
/// Each variant names the stage that failed. Node paths look like `root.children[1].child`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no definition found: {name}")]
    SourceNotFound {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("unable to read definition {name}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("definition has syntax error at {path}: {message}")]
    Syntax { path: String, message: String },
    #[error("element at {path} has no type")]
    MissingType { path: String },
    #[error("no such element type: {type_name} (at {path})")]
    UnknownType { type_name: String, path: String },
    #[error("failed to construct {type_name} at {path}")]
    Constructor {
        type_name: String,
        path: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("{parent} rejected child at {path}: {reason}")]
    ChildRejected {
        parent: String,
        path: String,
        reason: String,
    },
}

impl Error {
    /// The node path the error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::SourceNotFound { .. } | Error::Read { .. } => None,
            Error::Syntax { path, .. }
            | Error::MissingType { path }
            | Error::UnknownType { path, .. }
            | Error::Constructor { path, .. }
            | Error::ChildRejected { path, .. } => Some(path),
        }
    }
}
