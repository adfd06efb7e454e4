//! # etc-hosts
//!
//! Concurrency-safe editing of `hosts(5)` files.
//!
//! Container runtimes and similar tools keep a hosts file per sandbox and
//! edit it from many places at once: one caller writes the initial file,
//! others add or remove peers as they come and go. This crate performs each
//! edit as a locked read-modify-write cycle so no edit is lost and no reader
//! sees a half-written file.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use etc_hosts::{HostsFile, Record};
//!
//! let hosts = HostsFile::with_path("/run/app/hosts");
//!
//! // Defaults (localhost, IPv6 scopes) plus our own name.
//! hosts.build(&[Record::new("172.17.0.2".parse()?, "web.app web")])?;
//!
//! hosts.add(&[Record::new("172.17.0.3".parse()?, "db")])?;
//! hosts.update("172.17.0.4".parse()?, "db")?;
//! hosts.delete(&[Record::new("172.17.0.4".parse()?, "db")])?;
//! ```
//!
//! ## File format
//!
//! One entry per line, address and names separated by a tab, names by
//! spaces:
//!
//! ```text
//! 127.0.0.1	localhost
//! 172.17.0.2	web.app web
//! ```
//!
//! Lines that are not entries (comments, blank lines) are preserved.
//! Host names match only as whole tokens: updating `web` never touches a
//! line for `webserver`.
//!
//! ## Locking
//!
//! Each operation holds an exclusive `flock(2)` on the file for its whole
//! cycle, which serialises threads and independent processes alike. By
//! default new content is written to a temporary file and renamed into
//! place; use [`WriteMode::InPlace`] for bind-mounted files.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod hosts_file;
mod line;
mod lock;
pub mod record;
pub mod store;

pub use error::{HostsError, Result};
pub use hosts_file::HostsFile;
pub use record::Record;
pub use store::WriteMode;
