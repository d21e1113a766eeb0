//! Repository functions — one function per database operation.
//!
//! Every operation opens its own connection through a `Connector`, runs one
//! read-only query and closes the connection before returning.

pub mod jobs;
