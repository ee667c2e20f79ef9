// src/exec/pipe.rs

use crate::errors::{PipejoinError, Result};
use crate::exec::stdio::Redirect;

/// An OS pipe, split into the redirects handed to the two sides of a join.
///
/// The reader observes EOF only once every copy of `writer` is closed: the
/// child's copy when it exits, and the parent's copy when its owner drops it.
#[derive(Debug)]
pub struct Pipe {
    pub reader: Redirect,
    pub writer: Redirect,
}

impl Pipe {
    pub fn new() -> Result<Self> {
        let (reader, writer) = std::io::pipe().map_err(PipejoinError::Pipe)?;
        Ok(Self {
            reader: reader.into(),
            writer: writer.into(),
        })
    }
}
