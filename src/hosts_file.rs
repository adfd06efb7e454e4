//! Read-modify-write operations on a hosts file.
//!
//! Each public operation takes the file lock, rewrites the whole content
//! through a pure transformation below, and commits it in one write.
//! Lines that are not records (blank lines, comments, anything without a
//! leading address) pass through every operation untouched.

use crate::error::Result;
use crate::line;
use crate::record::{self, Record};
use crate::store::{self, WriteMode};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Default system hosts file.
const DEFAULT_HOSTS_PATH: &str = "/etc/hosts";

/// Handle on one hosts file.
///
/// Operations are safe to call concurrently from any number of threads and
/// processes targeting the same path: each one runs under an exclusive
/// advisory lock and sees the complete result of every operation that
/// locked the file before it.
///
/// # Example
///
/// ```rust,ignore
/// use etc_hosts::{HostsFile, Record};
///
/// let hosts = HostsFile::with_path("/var/lib/app/containers/abc/hosts");
/// hosts.build(&[Record::new("172.17.0.2".parse()?, "abc.app abc")])?;
/// hosts.add(&[Record::new("172.17.0.3".parse()?, "db")])?;
/// hosts.update("172.17.0.9".parse()?, "db")?;
/// hosts.delete(&[Record::new("172.17.0.9".parse()?, "db")])?;
/// ```
#[derive(Debug, Clone)]
pub struct HostsFile {
    path: PathBuf,
    mode: WriteMode,
}

impl HostsFile {
    /// Creates a handle on `/etc/hosts`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(DEFAULT_HOSTS_PATH)
    }

    /// Creates a handle on a custom path.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: WriteMode::default(),
        }
    }

    /// Overrides how new content is written.
    #[must_use]
    pub const fn write_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configured write mode.
    #[must_use]
    pub const fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Replaces the file with the default entries followed by `records`.
    ///
    /// Output is identical for identical input.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::InvalidRecord`](crate::HostsError::InvalidRecord)
    /// if a record has no host names or a name is empty or contains
    /// whitespace, or [`HostsError::Io`](crate::HostsError::Io) on I/O failure.
    pub fn build(&self, records: &[Record]) -> Result<()> {
        let content = render(record::default_records().iter().chain(records))?;
        self.commit(|_| Ok(content))?;
        tracing::info!(
            path = %self.path.display(),
            extra = records.len(),
            "Built hosts file"
        );
        Ok(())
    }

    /// Like [`build`](Self::build), for environments without IPv6.
    ///
    /// Only the IPv4 loopback default is written, and records with an IPv6
    /// address are dropped.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_no_ipv6(&self, records: &[Record]) -> Result<()> {
        let localhost = record::ipv4_localhost();
        let ipv4 = records.iter().filter(|r| r.is_ipv4());
        let content = render(std::iter::once(&localhost).chain(ipv4))?;
        self.commit(|_| Ok(content))?;
        tracing::info!(
            path = %self.path.display(),
            dropped = records.iter().filter(|r| !r.is_ipv4()).count(),
            "Built hosts file without IPv6"
        );
        Ok(())
    }

    /// Appends one line per record, in order. Existing entries for the same
    /// names are left in place.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn add(&self, records: &[Record]) -> Result<()> {
        if records.is_empty() {
            tracing::debug!(path = %self.path.display(), "No records to add");
            return Ok(());
        }
        let appended = render(records)?;
        self.commit(|current| {
            let mut content = normalize(current);
            content.push_str(&appended);
            Ok(content)
        })?;
        tracing::info!(path = %self.path.display(), added = records.len(), "Added hosts entries");
        Ok(())
    }

    /// Points every line naming `host_name` at `address`.
    ///
    /// Only whole host-name tokens match; the rest of each matching line is
    /// kept as is. Matching nothing is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Io`](crate::HostsError::Io) on I/O failure.
    pub fn update(&self, address: IpAddr, host_name: &str) -> Result<()> {
        let mut updated = 0;
        self.commit(|current| {
            let (content, count) = apply_update(current, address, host_name);
            updated = count;
            Ok(content)
        })?;

        if updated == 0 {
            tracing::debug!(path = %self.path.display(), host = %host_name, "No entries to update");
        } else {
            tracing::info!(
                path = %self.path.display(),
                host = %host_name,
                %address,
                updated,
                "Updated hosts entries"
            );
        }
        Ok(())
    }

    /// Removes every line whose host names are exactly those of one of
    /// `records`. Addresses are not compared. Absent entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Io`](crate::HostsError::Io) on I/O failure.
    pub fn delete(&self, records: &[Record]) -> Result<()> {
        if records.is_empty() {
            tracing::debug!(path = %self.path.display(), "No records to delete");
            return Ok(());
        }
        let mut removed = 0;
        self.commit(|current| {
            let (content, count) = apply_delete(current, records);
            removed = count;
            Ok(content)
        })?;
        tracing::info!(path = %self.path.display(), removed, "Deleted hosts entries");
        Ok(())
    }

    /// Lists the records currently in the file, in file order.
    ///
    /// A missing file is created empty.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Io`](crate::HostsError::Io) on I/O failure.
    pub fn entries(&self) -> Result<Vec<Record>> {
        let content = store::read_locked(&self.path)?;
        Ok(content.lines().filter_map(line::decode).collect())
    }

    fn commit<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        store::with_lock(&self.path, self.mode, f)
    }
}

impl Default for HostsFile {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Content transformations
// ---------------------------------------------------------------------------

/// Encodes records into consecutive lines.
fn render<'a>(records: impl IntoIterator<Item = &'a Record>) -> Result<String> {
    records
        .into_iter()
        .map(line::encode)
        .collect::<Result<Vec<_>>>()
        .map(|lines| lines.concat())
}

/// Splits content into lines, each paired with its original terminator
/// (`"\n"`, `"\r\n"`, or `""` for an unterminated last line).
fn lines_with_endings(content: &str) -> impl Iterator<Item = (&str, &str)> {
    content.split_inclusive('\n').map(|chunk| {
        let body = chunk
            .strip_suffix('\n')
            .map_or(chunk, |b| b.strip_suffix('\r').unwrap_or(b));
        (body, &chunk[body.len()..])
    })
}

/// Appends one line, terminating it with `'\n'` if it had no terminator.
fn push_line(out: &mut String, body: &str, ending: &str) {
    out.push_str(body);
    out.push_str(if ending.is_empty() { "\n" } else { ending });
}

/// Re-emits `current` with every line terminated.
fn normalize(current: &str) -> String {
    let mut out = String::with_capacity(current.len() + 1);
    for (body, ending) in lines_with_endings(current) {
        push_line(&mut out, body, ending);
    }
    out
}

/// Returns the new content and the number of lines changed.
fn apply_update(current: &str, address: IpAddr, host_name: &str) -> (String, usize) {
    let mut out = String::with_capacity(current.len());
    let mut count = 0;
    let address = address.to_string();
    for (body, ending) in lines_with_endings(current) {
        match line::split(body) {
            Some(parsed) if line::matches_token(parsed.host_field(), host_name) => {
                out.push_str(&address);
                push_line(&mut out, parsed.tail, ending);
                count += 1;
            }
            _ => push_line(&mut out, body, ending),
        }
    }
    (out, count)
}

/// Returns the new content and the number of lines removed.
fn apply_delete(current: &str, records: &[Record]) -> (String, usize) {
    let mut out = String::with_capacity(current.len());
    let mut count = 0;
    for (body, ending) in lines_with_endings(current) {
        let targeted = line::split(body).is_some_and(|parsed| {
            records
                .iter()
                .any(|r| line::same_names(parsed.host_field(), r.host_names()))
        });
        if targeted {
            count += 1;
        } else {
            push_line(&mut out, body, ending);
        }
    }
    (out, count)
}
