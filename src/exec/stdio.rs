// src/exec/stdio.rs

//! Stream bindings for units.
//!
//! A [`Redirect`] is what a unit's stdin, stdout or stderr is bound to before
//! it starts. It is cheap to clone: descriptor-backed redirects share one
//! `OwnedFd` and every spawn duplicates it for the child, so the same
//! destination can be handed to several stages (the stderr broadcast) while
//! the parent's copy is closed exactly when the last clone is dropped.

use std::fs::File;
use std::io::{PipeReader, PipeWriter};
use std::os::fd::OwnedFd;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub enum Redirect {
    /// The calling process's own stream.
    #[default]
    Inherit,
    /// `/dev/null`.
    Null,
    /// A file or pipe end owned by the parent.
    Fd(Arc<OwnedFd>),
}

impl Redirect {
    /// Open `path` for reading, for use as a stdin source.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        File::open(path).map(Redirect::from)
    }

    /// Create (or truncate) `path`, for use as a stdout/stderr sink.
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        File::create(path).map(Redirect::from)
    }

    /// Produce a `Stdio` for one child; descriptors are duplicated so the
    /// redirect itself stays usable.
    pub fn to_stdio(&self) -> std::io::Result<Stdio> {
        match self {
            Redirect::Inherit => Ok(Stdio::inherit()),
            Redirect::Null => Ok(Stdio::null()),
            Redirect::Fd(fd) => Ok(Stdio::from(fd.try_clone()?)),
        }
    }
}

impl From<OwnedFd> for Redirect {
    fn from(fd: OwnedFd) -> Self {
        Redirect::Fd(Arc::new(fd))
    }
}

impl From<File> for Redirect {
    fn from(file: File) -> Self {
        Redirect::from(OwnedFd::from(file))
    }
}

impl From<PipeReader> for Redirect {
    fn from(reader: PipeReader) -> Self {
        Redirect::from(OwnedFd::from(reader))
    }
}

impl From<PipeWriter> for Redirect {
    fn from(writer: PipeWriter) -> Self {
        Redirect::from(OwnedFd::from(writer))
    }
}
