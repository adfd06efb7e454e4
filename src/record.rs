//! Host records and the fixed default entries.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// One address and the host names bound to it.
///
/// Host names keep their insertion order, which is the order they are
/// written to disk in.
///
/// # Example
///
/// ```
/// use etc_hosts::Record;
/// use std::net::{IpAddr, Ipv4Addr};
///
/// let record = Record::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)), "web.local web");
///
/// assert_eq!(record.host_names(), ["web.local", "web"]);
/// assert_eq!(record.to_string(), "10.0.0.2\tweb.local web");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    address: IpAddr,
    host_names: Vec<String>,
}

impl Record {
    /// Creates a record from a whitespace-separated list of host names.
    #[must_use]
    pub fn new(address: IpAddr, host_names: &str) -> Self {
        Self::from_names(address, host_names.split_whitespace())
    }

    /// Creates a record from individual host names.
    #[must_use]
    pub fn from_names<I, S>(address: IpAddr, host_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            address,
            host_names: host_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the address.
    #[must_use]
    pub const fn address(&self) -> IpAddr {
        self.address
    }

    /// Returns the host names in insertion order.
    #[must_use]
    pub fn host_names(&self) -> &[String] {
        &self.host_names
    }

    /// Returns `true` if the address is IPv4.
    #[must_use]
    pub const fn is_ipv4(&self) -> bool {
        self.address.is_ipv4()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.address, self.host_names.join(" "))
    }
}

/// IPv4 loopback entry, always the first line of a built file.
pub(crate) fn ipv4_localhost() -> Record {
    Record::new(IpAddr::V4(Ipv4Addr::LOCALHOST), "localhost")
}

/// Default entries in the order they are written.
pub(crate) fn default_records() -> [Record; 6] {
    [
        ipv4_localhost(),
        Record::new(
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            "localhost ip6-localhost ip6-loopback",
        ),
        Record::new(
            IpAddr::V6(Ipv6Addr::new(0xfe00, 0, 0, 0, 0, 0, 0, 0)),
            "ip6-localnet",
        ),
        Record::new(
            IpAddr::V6(Ipv6Addr::new(0xff00, 0, 0, 0, 0, 0, 0, 0)),
            "ip6-mcastprefix",
        ),
        Record::new(
            IpAddr::V6(Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 1)),
            "ip6-allnodes",
        ),
        Record::new(
            IpAddr::V6(Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 2)),
            "ip6-allrouters",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_splits_on_whitespace() {
        let r = Record::new(IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4)), "  a.example \t a ");
        assert_eq!(r.host_names(), ["a.example", "a"]);
        assert!(r.is_ipv4());
    }

    #[test]
    fn display_uses_tab_then_spaces() {
        let r = Record::from_names(IpAddr::V6(Ipv6Addr::LOCALHOST), ["x", "y"]);
        assert_eq!(r.to_string(), "::1\tx y");
    }

    #[test]
    fn defaults_render_in_fixed_order() {
        let rendered: Vec<String> = default_records().iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "127.0.0.1\tlocalhost",
                "::1\tlocalhost ip6-localhost ip6-loopback",
                "fe00::\tip6-localnet",
                "ff00::\tip6-mcastprefix",
                "ff02::1\tip6-allnodes",
                "ff02::2\tip6-allrouters",
            ]
        );
    }
}
