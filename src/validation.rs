//! Forwarded IP validation and CIDR expansion.
//!
//! Validation happens in two steps:
//! - a lenient *shape* check ([`is_forwarded_ip_shape`]) that accepts four
//!   groups of 1-3 ASCII digits with an optional `/` and 1-2 digit suffix,
//!   without range-checking any group;
//! - numeric conversion into an [`Ipv4Net`] ([`to_network`]), which is where
//!   `999.1.1.1` or `/99` are finally rejected.
//!
//! Expansion enumerates every address of the block, network and broadcast
//! included, and refuses blocks larger than a configured bound.

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::error::IpfwdError;
use crate::logger::Logger;

/// Default upper bound on the number of addresses one entry may expand to (a /16).
pub const DEFAULT_MAX_EXPANSION: u64 = 65_536;

/// `true` for four `.`-separated groups of 1-3 ASCII digits.
fn is_dotted_quad(s: &str) -> bool {
    let mut groups = 0;
    for group in s.split('.') {
        groups += 1;
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    groups == 4
}

/// Plain address shape, e.g. `10.0.0.1`.
///
/// # Examples
/// ```
/// use ipfwd::validation::is_plain_ip_shape;
/// assert!(is_plain_ip_shape("10.0.0.1"));
/// assert!(is_plain_ip_shape("999.999.999.999"));
/// assert!(!is_plain_ip_shape("10.0.0.1/32"));
/// ```
pub fn is_plain_ip_shape(s: &str) -> bool {
    is_dotted_quad(s)
}

/// Address with prefix suffix, e.g. `10.0.0.0/24`.
///
/// # Examples
/// ```
/// use ipfwd::validation::is_ip_alias_shape;
/// assert!(is_ip_alias_shape("10.0.0.0/24"));
/// assert!(!is_ip_alias_shape("10.0.0.0/"));
/// assert!(!is_ip_alias_shape("10.0.0.0/123"));
/// ```
pub fn is_ip_alias_shape(s: &str) -> bool {
    match s.split_once('/') {
        Some((addr, prefix)) => {
            is_dotted_quad(addr)
                && (1..=2).contains(&prefix.len())
                && prefix.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Either a plain address or an address with a prefix suffix.
pub fn is_forwarded_ip_shape(s: &str) -> bool {
    is_plain_ip_shape(s) || is_ip_alias_shape(s)
}

/// Render an untrusted entry for a log line.
pub fn describe_entry(entry: Option<&str>) -> String {
    match entry {
        Some(s) => format!("\"{}\"", s),
        None => "null".to_string(),
    }
}

/// Convert a shape-valid specification into a network.
///
/// Groups are read as decimal numbers, so `010.0.0.1` is `10.0.0.1`.
/// The host bits are kept: `to_network("1.1.1.1/24")?.addr()` is `1.1.1.1`.
pub fn to_network(spec: &str) -> Result<Ipv4Net, IpfwdError> {
    let invalid = || IpfwdError::InvalidAddress(describe_entry(Some(spec)));
    if !is_forwarded_ip_shape(spec) {
        return Err(invalid());
    }

    let (addr, prefix) = match spec.split_once('/') {
        Some((addr, prefix)) => (addr, prefix.parse::<u8>().map_err(|_| invalid())?),
        None => (spec, 32),
    };

    let mut octets = [0u8; 4];
    for (octet, group) in octets.iter_mut().zip(addr.split('.')) {
        *octet = group.parse::<u8>().map_err(|_| invalid())?;
    }

    Ipv4Net::new(Ipv4Addr::from(octets), prefix).map_err(|_| invalid())
}

/// Number of addresses in a block.
pub fn block_size(net: &Ipv4Net) -> u64 {
    1u64 << (32 - u32::from(net.prefix_len()))
}

/// Every address of `net` from network to broadcast, inclusive.
///
/// # Examples
/// ```
/// use ipfwd::validation::{expand_network, to_network};
/// let net = to_network("1.1.1.1/30").unwrap();
/// let addrs: Vec<String> = expand_network(&net, 256)
///     .unwrap()
///     .iter()
///     .map(|a| a.to_string())
///     .collect();
/// assert_eq!(addrs, ["1.1.1.0", "1.1.1.1", "1.1.1.2", "1.1.1.3"]);
/// ```
pub fn expand_network(net: &Ipv4Net, limit: u64) -> Result<Vec<Ipv4Addr>, IpfwdError> {
    let count = block_size(net);
    if count > limit {
        return Err(IpfwdError::ExpansionTooLarge {
            address: net.to_string(),
            count,
            limit,
        });
    }

    let first = u32::from(net.network());
    let last = u32::from(net.broadcast());
    Ok((first..=last).map(Ipv4Addr::from).collect())
}

/// Parses untrusted forwarded IP lists, reporting rejects to a [`Logger`].
#[derive(Clone)]
pub struct ForwardedIpParser {
    logger: Arc<dyn Logger>,
    max_expansion: u64,
}

impl ForwardedIpParser {
    pub fn new(logger: Arc<dyn Logger>, max_expansion: u64) -> Self {
        Self {
            logger,
            max_expansion,
        }
    }

    pub fn max_expansion(&self) -> u64 {
        self.max_expansion
    }

    /// Expand one specification, without logging.
    pub fn expand(&self, spec: &str) -> Result<Vec<Ipv4Addr>, IpfwdError> {
        let net = to_network(spec)?;
        expand_network(&net, self.max_expansion)
    }

    /// Validate and expand every entry, in order.
    ///
    /// Null, empty, malformed, numerically invalid and oversized entries are
    /// skipped with one warning each. Duplicates are kept.
    pub fn parse_forwarded_ips<I, S>(&self, forwarded_ips: I) -> Vec<String>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let mut addresses = Vec::new();
        for entry in forwarded_ips {
            let entry = entry.as_ref().map(|s| s.as_ref());
            let spec = match entry {
                Some(s) if is_forwarded_ip_shape(s) => s,
                _ => {
                    self.logger
                        .warning(&IpfwdError::InvalidAddress(describe_entry(entry)).to_string());
                    continue;
                }
            };

            match self.expand(spec) {
                Ok(ips) => addresses.extend(ips.iter().map(|ip| ip.to_string())),
                Err(e) => self.logger.warning(&e.to_string()),
            }
        }
        addresses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::mock::RecordingLogger;

    fn parser() -> (ForwardedIpParser, Arc<RecordingLogger>) {
        let logger = Arc::new(RecordingLogger::new());
        (
            ForwardedIpParser::new(logger.clone(), DEFAULT_MAX_EXPANSION),
            logger,
        )
    }

    fn some(entries: &[&str]) -> Vec<Option<String>> {
        entries.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn test_shape_plain() {
        assert!(is_plain_ip_shape("1.1.1.1"));
        assert!(is_plain_ip_shape("123.123.123.123"));
        assert!(is_plain_ip_shape("1.0.0.0"));
        assert!(!is_plain_ip_shape("1111.1.1.1"));
        assert!(!is_plain_ip_shape("1.1.1.1111"));
        assert!(!is_plain_ip_shape("1.1.1.1.1"));
        assert!(!is_plain_ip_shape("1.1.1."));
        assert!(!is_plain_ip_shape("1.1.1.a"));
        assert!(!is_plain_ip_shape("1a1a1a1"));
        assert!(!is_plain_ip_shape(""));
    }

    #[test]
    fn test_shape_alias() {
        assert!(is_ip_alias_shape("1.1.1.1/1"));
        assert!(is_ip_alias_shape("1.1.1.1/11"));
        assert!(is_ip_alias_shape("123.123.123.123/1"));
        assert!(!is_ip_alias_shape("123.123.123.123/123"));
        assert!(!is_ip_alias_shape("123.123.123.123/a"));
        assert!(!is_ip_alias_shape("123.123.123.123/"));
        assert!(!is_ip_alias_shape("1.1.1.1/2/3"));
        assert!(!is_ip_alias_shape("1.1.1.1"));
    }

    #[test]
    fn test_shape_rejects_surrounding_whitespace_and_newlines() {
        assert!(!is_forwarded_ip_shape("1.1.1.1\n"));
        assert!(!is_forwarded_ip_shape(" 1.1.1.1"));
        assert!(!is_forwarded_ip_shape("{{}}\n\"hello\"\n!@#$%^&*()\n\n"));
    }

    #[test]
    fn test_shape_rejects_non_ascii_digits() {
        // Arabic-Indic digit one
        assert!(!is_forwarded_ip_shape("\u{0661}.1.1.1"));
        // Fullwidth digit one
        assert!(!is_forwarded_ip_shape("\u{FF11}.1.1.1"));
    }

    #[test]
    fn test_shape_is_lenient_about_ranges() {
        assert!(is_forwarded_ip_shape("999.999.999.999"));
        assert!(is_forwarded_ip_shape("1.1.1.1/99"));
        assert!(is_forwarded_ip_shape("256.0.0.1/33"));
    }

    #[test]
    fn test_to_network_rejects_out_of_range() {
        assert!(matches!(
            to_network("999.999.999.999"),
            Err(IpfwdError::InvalidAddress(_))
        ));
        assert!(matches!(
            to_network("1.1.1.1/99"),
            Err(IpfwdError::InvalidAddress(_))
        ));
        assert!(to_network("255.255.255.255").is_ok());
        assert!(to_network("0.0.0.0/0").is_ok());
    }

    #[test]
    fn test_to_network_reads_leading_zeros_as_decimal() {
        let net = to_network("010.0.0.1").unwrap();
        assert_eq!(net.addr(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(net.prefix_len(), 32);

        // Three prefix digits fail the shape check
        assert!(matches!(
            to_network("001.002.003.000/030"),
            Err(IpfwdError::InvalidAddress(_))
        ));

        let net = to_network("001.002.003.004/08").unwrap();
        assert_eq!(net.addr(), Ipv4Addr::new(1, 2, 3, 4));
        assert_eq!(net.prefix_len(), 8);
        assert!(to_network("256.0.0.1").is_err());
        assert!(to_network("1.1.1.1/33").is_err());
    }

    #[test]
    fn test_to_network_keeps_host_bits() {
        let net = to_network("1.1.1.1/24").unwrap();
        assert_eq!(net.addr(), Ipv4Addr::new(1, 1, 1, 1));
        assert_eq!(net.prefix_len(), 24);
        assert_eq!(net.network(), Ipv4Addr::new(1, 1, 1, 0));
    }

    #[test]
    fn test_to_network_plain_is_host_route() {
        let net = to_network("10.0.0.7").unwrap();
        assert_eq!(net.prefix_len(), 32);
    }

    #[test]
    fn test_block_size() {
        assert_eq!(block_size(&to_network("1.1.1.1").unwrap()), 1);
        assert_eq!(block_size(&to_network("1.1.1.1/30").unwrap()), 4);
        assert_eq!(block_size(&to_network("0.0.0.0/0").unwrap()), 1u64 << 32);
    }

    #[test]
    fn test_expand_network_includes_network_and_broadcast() {
        let net = to_network("10.0.0.9/29").unwrap();
        let addrs = expand_network(&net, 256).unwrap();
        assert_eq!(addrs.len(), 8);
        assert_eq!(addrs[0], Ipv4Addr::new(10, 0, 0, 8));
        assert_eq!(addrs[7], Ipv4Addr::new(10, 0, 0, 15));
    }

    #[test]
    fn test_expand_network_slash_31_and_32() {
        let pair = expand_network(&to_network("10.0.0.1/31").unwrap(), 256).unwrap();
        assert_eq!(pair, vec![Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(10, 0, 0, 1)]);
        let single = expand_network(&to_network("10.0.0.1/32").unwrap(), 256).unwrap();
        assert_eq!(single, vec![Ipv4Addr::new(10, 0, 0, 1)]);
    }

    #[test]
    fn test_expand_network_top_of_address_space() {
        let addrs = expand_network(&to_network("255.255.255.254/31").unwrap(), 4).unwrap();
        assert_eq!(addrs.last(), Some(&Ipv4Addr::new(255, 255, 255, 255)));
    }

    #[test]
    fn test_expand_network_bound() {
        let net = to_network("10.0.0.0/8").unwrap();
        let result = expand_network(&net, DEFAULT_MAX_EXPANSION);
        assert!(matches!(
            result,
            Err(IpfwdError::ExpansionTooLarge { count: 16_777_216, .. })
        ));
        assert_eq!(expand_network(&to_network("10.0.0.0/16").unwrap(), DEFAULT_MAX_EXPANSION).unwrap().len(), 65_536);
    }

    #[test]
    fn test_parse_empty() {
        let (parser, logger) = parser();
        assert!(parser.parse_forwarded_ips(Vec::<Option<String>>::new()).is_empty());
        assert!(logger.warnings().is_empty());
    }

    #[test]
    fn test_parse_cidr_expands_fully() {
        let (parser, logger) = parser();
        let result = parser.parse_forwarded_ips(some(&["1.1.1.1/30"]));
        assert_eq!(result, vec!["1.1.1.0", "1.1.1.1", "1.1.1.2", "1.1.1.3"]);
        assert!(logger.warnings().is_empty());
    }

    #[test]
    fn test_parse_subnet_variants() {
        let (parser, _) = parser();
        assert_eq!(parser.parse_forwarded_ips(some(&["1.1.1.1"])), vec!["1.1.1.1"]);
        assert_eq!(parser.parse_forwarded_ips(some(&["1.1.1.1/32"])), vec!["1.1.1.1"]);
        assert_eq!(parser.parse_forwarded_ips(some(&["1.1.1.1/24"])).len(), 256);
    }

    #[test]
    fn test_parse_null_and_invalid_in_order() {
        let (parser, logger) = parser();
        let result = parser.parse_forwarded_ips(vec![None, Some("bad"), Some("1.1.1.1")]);
        assert_eq!(result, vec!["1.1.1.1"]);

        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("null"));
        assert!(warnings[1].contains("\"bad\""));
    }

    #[test]
    fn test_parse_each_invalid_entry_warns_once() {
        let (parser, logger) = parser();
        let invalid = ["invalid", "1a1a1a1", "1.1.1.1.1", "1111.1.1.1", "1.1.1.1111", ""];
        for entry in invalid {
            assert!(parser.parse_forwarded_ips(vec![Some(entry)]).is_empty());
        }

        let warnings = logger.warnings();
        assert_eq!(warnings.len(), invalid.len());
        for (warning, entry) in warnings.iter().zip(invalid) {
            assert!(warning.contains(&format!("\"{}\"", entry)), "{}", warning);
        }
    }

    #[test]
    fn test_parse_complex_mix_preserves_order() {
        let (parser, logger) = parser();
        let input = vec![
            Some("{{}}\n\"hello\"\n!@#$%^&*()\n\n"),
            Some("1111.1.1.1"),
            Some("1.1.1.1"),
            Some("hello"),
            Some("123.123.123.123"),
            Some("1.1.1."),
            Some("1.1.1.a"),
            None,
            Some("1.0.0.0"),
            Some("123.123.123.123/123"),
            Some("123.123.123.123/a"),
            Some("123.123.123.123/"),
        ];
        let result = parser.parse_forwarded_ips(input);
        assert_eq!(result, vec!["1.1.1.1", "123.123.123.123", "1.0.0.0"]);

        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 9);
        assert!(warnings[1].contains("1111.1.1.1"));
        assert!(warnings[2].contains("hello"));
        assert!(warnings[5].contains("null"));
        assert!(warnings[8].contains("123.123.123.123/"));
    }

    #[test]
    fn test_parse_keeps_duplicates() {
        let (parser, _) = parser();
        let result = parser.parse_forwarded_ips(some(&["1.1.1.1", "1.1.1.0/31"]));
        assert_eq!(result, vec!["1.1.1.1", "1.1.1.0", "1.1.1.1"]);
    }

    #[test]
    fn test_parse_out_of_range_is_skipped_with_warning() {
        let (parser, logger) = parser();
        let result = parser.parse_forwarded_ips(some(&["999.999.999.999", "1.1.1.1/99", "2.2.2.2"]));
        assert_eq!(result, vec!["2.2.2.2"]);

        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("999.999.999.999"));
        assert!(warnings[1].contains("1.1.1.1/99"));
    }

    #[test]
    fn test_parse_leading_zeros_without_warning() {
        let (parser, logger) = parser();
        let result = parser.parse_forwarded_ips(some(&["010.0.0.1", "192.168.001.000/31"]));
        assert_eq!(result, vec!["10.0.0.1", "192.168.1.0", "192.168.1.1"]);
        assert!(logger.warnings().is_empty());
    }

    #[test]
    fn test_parse_oversized_block_is_skipped_with_warning() {
        let logger = Arc::new(RecordingLogger::new());
        let parser = ForwardedIpParser::new(logger.clone(), 4);
        let result = parser.parse_forwarded_ips(some(&["1.1.1.1/1", "1.1.1.1/30"]));
        assert_eq!(result.len(), 4);

        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Refusing to expand"));
    }

    #[test]
    fn test_parse_accepts_borrowed_tokens() {
        let (parser, _) = parser();
        let tokens = "10.0.0.1 10.0.0.2".split_whitespace().map(Some);
        assert_eq!(parser.parse_forwarded_ips(tokens), vec!["10.0.0.1", "10.0.0.2"]);
    }
}
