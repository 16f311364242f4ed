// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The error type shared by every bank operation.
//!
//! Session operations never abort the process; they return a [`BankError`] that
//! carries both a coarse [`ErrorKind`] (stable, used by callers to branch) and a
//! human-readable message (printed verbatim in command outcome lines).

use std::fmt;
use thiserror::Error;

/// Result type for bank and session operations.
pub type BankResult<T = ()> = Result<T, BankError>;

/// The coarse classification of a [`BankError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An unresolvable path, or an operation that needs a bank that is not loaded.
    NotFound,
    /// A container or image failed to decode or encode.
    FormatError,
    /// A replacement image does not match the stored level dimensions.
    SizeMismatch,
    /// A bank index or mip level is out of bounds.
    OutOfRange,
    /// A command argument is missing or invalid.
    ArgumentError,
    /// A command name is not registered.
    UnknownCommand,
    /// Any other I/O failure.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::FormatError => "FormatError",
            ErrorKind::SizeMismatch => "SizeMismatch",
            ErrorKind::OutOfRange => "OutOfRange",
            ErrorKind::ArgumentError => "ArgumentError",
            ErrorKind::UnknownCommand => "UnknownCommand",
            ErrorKind::Io => "Io",
        };
        f.write_str(name)
    }
}

/// Errors produced by bank loading, saving, editing and command dispatch.
#[derive(Debug, Error)]
pub enum BankError {
    /// Something the operation needs does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Malformed container data, an undecodable image, or an unsupported encoding.
    #[error("{0}")]
    Format(String),

    /// The replacement image has the wrong size for the targeted level.
    #[error("image is {actual_width}x{actual_height} but mip level {level} is {expected_width}x{expected_height}")]
    SizeMismatch {
        /// The mip level that was targeted.
        level: usize,
        /// Stored width of the level.
        expected_width: u32,
        /// Stored height of the level.
        expected_height: u32,
        /// Width of the rejected image.
        actual_width: u32,
        /// Height of the rejected image.
        actual_height: u32,
    },

    /// An index into a bank or a texture's level list is out of bounds.
    #[error("{what} index {index} is out of range (length {len})")]
    OutOfRange {
        /// What was being indexed ("texture", "mip level", ...).
        what: &'static str,
        /// The offending index.
        index: usize,
        /// The length of the indexed sequence.
        len: usize,
    },

    /// A command argument is missing or could not be interpreted.
    #[error("{0}")]
    Argument(String),

    /// The command name is not registered.
    #[error("Unknown command")]
    UnknownCommand(String),

    /// Underlying I/O failure.
    #[error("{context}: {source}")]
    Io {
        /// What was being done when the failure happened.
        context: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl BankError {
    /// Returns the coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BankError::NotFound(_) => ErrorKind::NotFound,
            BankError::Format(_) => ErrorKind::FormatError,
            BankError::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            BankError::OutOfRange { .. } => ErrorKind::OutOfRange,
            BankError::Argument(_) => ErrorKind::ArgumentError,
            BankError::UnknownCommand(_) => ErrorKind::UnknownCommand,
            BankError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorKind::NotFound
            }
            BankError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        BankError::Format(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        BankError::NotFound(msg.into())
    }

    /// Create an argument error
    pub fn argument(msg: impl Into<String>) -> Self {
        BankError::Argument(msg.into())
    }

    /// Wraps an I/O error with a description of the failed operation.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BankError::Io {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_is_classified_as_not_found() {
        let err = BankError::io(
            "opening bank.tpl",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(format!("{err}"), "opening bank.tpl: no such file");

        let denied = BankError::io(
            "opening bank.tpl",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(denied.kind(), ErrorKind::Io);
    }

    #[test]
    fn size_mismatch_display() {
        let err = BankError::SizeMismatch {
            level: 2,
            expected_width: 64,
            expected_height: 64,
            actual_width: 32,
            actual_height: 64,
        };
        assert_eq!(err.kind(), ErrorKind::SizeMismatch);
        assert_eq!(
            format!("{err}"),
            "image is 32x64 but mip level 2 is 64x64"
        );
    }

    #[test]
    fn out_of_range_display() {
        let err = BankError::OutOfRange {
            what: "texture",
            index: 7,
            len: 3,
        };
        assert_eq!(format!("{err}"), "texture index 7 is out of range (length 3)");
        assert_eq!(
            BankError::UnknownCommand("-foo".into()).to_string(),
            "Unknown command"
        );
    }
}
