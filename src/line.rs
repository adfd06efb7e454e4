//! Line codec: records to and from `<address>\t<names>` lines.
//!
//! Host names are always compared as whole whitespace-delimited tokens.
//! `prefix` never matches a line for `prefixAndMore`.

use crate::error::{HostsError, Result};
use crate::record::Record;
use std::collections::BTreeSet;
use std::net::IpAddr;

/// A line that parsed as a record, borrowing from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RecordLine<'a> {
    /// Parsed address field.
    pub address: IpAddr,
    /// Everything after the address field, leading separator included.
    pub tail: &'a str,
}

impl<'a> RecordLine<'a> {
    /// The host-name field without the leading separator.
    pub fn host_field(&self) -> &'a str {
        self.tail.trim_start()
    }
}

/// Encodes a record as one newline-terminated line.
///
/// # Errors
///
/// Returns [`HostsError::InvalidRecord`] if the record has no host names
/// or a name is empty or contains whitespace.
pub(crate) fn encode(record: &Record) -> Result<String> {
    validate(record)?;
    Ok(format!("{record}\n"))
}

/// Rejects records that would not encode to exactly one line of tokens.
pub(crate) fn validate(record: &Record) -> Result<()> {
    if record.host_names().is_empty() {
        return Err(HostsError::InvalidRecord(format!(
            "no host names for {}",
            record.address()
        )));
    }
    if let Some(bad) = record
        .host_names()
        .iter()
        .find(|h| h.is_empty() || h.contains(char::is_whitespace))
    {
        return Err(HostsError::InvalidRecord(format!(
            "host name {bad:?} for {} is empty or contains whitespace",
            record.address()
        )));
    }
    Ok(())
}

/// Splits a line (without its newline) into address and host-name field.
///
/// Returns `None` for lines that are not records: blank lines, comments,
/// anything whose first token is not an address or that has no names.
pub(crate) fn split(line: &str) -> Option<RecordLine<'_>> {
    let (address, tail) = line.split_at(line.find(char::is_whitespace)?);
    let address = address.parse().ok()?;
    let parsed = RecordLine { address, tail };
    (!parsed.host_field().is_empty()).then_some(parsed)
}

/// Decodes a line into a record, or `None` if it is not a record line.
pub(crate) fn decode(line: &str) -> Option<Record> {
    let parsed = split(line)?;
    Some(Record::from_names(
        parsed.address,
        parsed.host_field().split_whitespace(),
    ))
}

/// Returns `true` if `name` is one complete token of `host_field`.
pub(crate) fn matches_token(host_field: &str, name: &str) -> bool {
    host_field.split_whitespace().any(|token| token == name)
}

/// Returns `true` if `host_field` holds exactly the names in `names`,
/// ignoring order and repeats.
pub(crate) fn same_names(host_field: &str, names: &[String]) -> bool {
    let field: BTreeSet<&str> = host_field.split_whitespace().collect();
    let wanted: BTreeSet<&str> = names.iter().flat_map(|n| n.split_whitespace()).collect();
    !wanted.is_empty() && field == wanted
}
