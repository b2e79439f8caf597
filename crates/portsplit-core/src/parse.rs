// ── Reconcile configuration splitter ──
//
// One forward pass over the configuration text, driven by an explicit
// two-state machine. The pass yields an ordered list of spans (residual
// lines and interface references) plus the interface bodies keyed by their
// header line. Reserved breakout lanes are then filtered out.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, trace};

/// Header prefixes that open an interface block.
pub const INTERFACE_PREFIXES: [&str; 2] = ["interface Ethernet", "interface Port-Channel"];

/// Minimum indentation of an interface body line.
pub const BODY_INDENT: &str = "   ";

/// Lanes 2-4 of any port on chassis slots 1-8. These positions are
/// reserved and never re-templated.
///
/// The lane number must end there: a bare prefix match would also exclude
/// `Ethernet1/1/22`, which is kept. Subinterfaces such as
/// `Ethernet1/1/2.100` are excluded with their parent lane.
static EXCLUDED_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^interface Ethernet[1-8]/\d+/[2-4](?:\D|$)").expect("valid exclusion pattern")
});

/// Interface header line → ordered body lines, in first-seen order.
pub type InterfaceBlocks = IndexMap<String, Vec<String>>;

/// One element of the input document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// A line that belongs to no interface.
    Residual(String),
    /// An interface header; the body lives in the block maps under this key.
    Interface(String),
}

#[derive(Debug)]
enum ParseState {
    Outside,
    InsideBlock(String),
}

/// Whether `line` opens an interface block.
pub fn is_interface_header(line: &str) -> bool {
    INTERFACE_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// Whether an interface header names a reserved (non-reconcilable) port.
pub fn is_excluded(header: &str) -> bool {
    EXCLUDED_PORT.is_match(header)
}

/// A reconcile configuration split into interface blocks and residual lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitConfig {
    /// Every residual line and interface header, in document order.
    pub spans: Vec<Span>,
    /// Interface blocks that survived the exclusion filter.
    pub blocks: InterfaceBlocks,
    /// Interface blocks removed by the exclusion filter.
    pub excluded: InterfaceBlocks,
}

impl SplitConfig {
    /// Split configuration text.
    ///
    /// A repeated header replaces the earlier block's body; the key keeps
    /// its first-seen position. Indented lines with no open interface and
    /// blank lines are residual.
    pub fn parse(text: &str) -> Self {
        let mut spans = Vec::new();
        let mut blocks = InterfaceBlocks::new();
        let mut state = ParseState::Outside;

        for line in text.lines() {
            if is_interface_header(line) {
                trace!(interface = line, "opening interface block");
                blocks.insert(line.to_owned(), Vec::new());
                spans.push(Span::Interface(line.to_owned()));
                state = ParseState::InsideBlock(line.to_owned());
                continue;
            }

            if line.starts_with(BODY_INDENT) {
                if let ParseState::InsideBlock(ref key) = state {
                    if let Some(body) = blocks.get_mut(key) {
                        body.push(line.to_owned());
                        continue;
                    }
                }
            }

            state = ParseState::Outside;
            spans.push(Span::Residual(line.to_owned()));
        }

        let (excluded, blocks): (InterfaceBlocks, InterfaceBlocks) =
            blocks.into_iter().partition(|(key, _)| is_excluded(key));

        debug!(
            interfaces = blocks.len(),
            excluded = excluded.len(),
            spans = spans.len(),
            "split reconcile configuration"
        );

        Self {
            spans,
            blocks,
            excluded,
        }
    }

    /// Residual lines in document order.
    pub fn residual_lines(&self) -> impl Iterator<Item = &str> {
        self.spans.iter().filter_map(|span| match span {
            Span::Residual(line) => Some(line.as_str()),
            Span::Interface(_) => None,
        })
    }

    /// Consume the split, yielding `(interface blocks, residual lines)`.
    pub fn into_parts(self) -> (InterfaceBlocks, Vec<String>) {
        let residual = self
            .spans
            .into_iter()
            .filter_map(|span| match span {
                Span::Residual(line) => Some(line),
                Span::Interface(_) => None,
            })
            .collect();
        (self.blocks, residual)
    }
}

/// Split configuration text into filtered interface blocks and residual lines.
pub fn split(text: &str) -> (InterfaceBlocks, Vec<String>) {
    SplitConfig::parse(text).into_parts()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn body(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| (*l).to_owned()).collect()
    }

    #[test]
    fn empty_input() {
        let (blocks, residual) = split("");
        assert!(blocks.is_empty());
        assert!(residual.is_empty());
    }

    #[test]
    fn splits_interfaces_from_residual() {
        let text = "hostname leaf1\n\
                    interface Ethernet1/1/1\n   description uplink\n   switchport mode tap\n\
                    router bgp 65000\n   neighbor 10.0.0.1 remote-as 65001\n\
                    interface Port-Channel10\n   switchport mode tool\n\
                    end\n";
        let (blocks, residual) = split(text);

        assert_eq!(
            blocks.keys().collect::<Vec<_>>(),
            vec!["interface Ethernet1/1/1", "interface Port-Channel10"]
        );
        assert_eq!(
            blocks["interface Ethernet1/1/1"],
            body(&["   description uplink", "   switchport mode tap"])
        );
        assert_eq!(
            residual,
            body(&[
                "hostname leaf1",
                "router bgp 65000",
                "   neighbor 10.0.0.1 remote-as 65001",
                "end",
            ])
        );
    }

    #[test]
    fn header_without_body() {
        let (blocks, residual) = split("interface Ethernet1/1/1\n");
        assert_eq!(blocks["interface Ethernet1/1/1"], Vec::<String>::new());
        assert!(residual.is_empty());
    }

    #[test]
    fn blank_line_closes_block() {
        let (blocks, residual) =
            split("interface Ethernet1/1/1\n   shutdown\n\n   description orphan\n");
        assert_eq!(blocks["interface Ethernet1/1/1"], body(&["   shutdown"]));
        assert_eq!(residual, body(&["", "   description orphan"]));
    }

    #[test]
    fn two_space_indent_is_residual() {
        let (blocks, residual) = split("interface Ethernet1/1/1\n  shutdown\n");
        assert!(blocks["interface Ethernet1/1/1"].is_empty());
        assert_eq!(residual, body(&["  shutdown"]));
    }

    #[test]
    fn other_interface_kinds_are_residual() {
        let (blocks, residual) = split("interface Vlan10\n   ip address 10.0.0.1/24\n");
        assert!(blocks.is_empty());
        assert_eq!(residual, body(&["interface Vlan10", "   ip address 10.0.0.1/24"]));
    }

    #[test]
    fn duplicate_header_last_write_wins() {
        let text = "interface Ethernet1/1/1\n   description first\n\
                    interface Ethernet2/1/1\n   shutdown\n\
                    interface Ethernet1/1/1\n   description second\n";
        let (blocks, _) = split(text);
        assert_eq!(
            blocks.keys().collect::<Vec<_>>(),
            vec!["interface Ethernet1/1/1", "interface Ethernet2/1/1"]
        );
        assert_eq!(blocks["interface Ethernet1/1/1"], body(&["   description second"]));
    }

    #[test]
    fn exclusion_boundaries() {
        assert!(is_excluded("interface Ethernet1/1/2"));
        assert!(is_excluded("interface Ethernet8/12/4"));
        assert!(is_excluded("interface Ethernet3/0/3"));
        assert!(!is_excluded("interface Ethernet9/1/4"));
        assert!(!is_excluded("interface Ethernet8/1/1"));
        assert!(!is_excluded("interface Ethernet8/1/5"));
        assert!(!is_excluded("interface Ethernet1/1/22"));
        assert!(is_excluded("interface Ethernet1/1/2.100"));
        assert!(!is_excluded("interface Ethernet0/1/2"));
        assert!(!is_excluded("interface Ethernet1/2"));
        assert!(!is_excluded("interface Port-Channel1/1/2"));
    }

    #[test]
    fn excluded_blocks_leave_blocks_and_residual() {
        let text = "interface Ethernet8/1/4\n   description lane\n\
                    interface Ethernet9/1/4\n   description kept\n";
        let split = SplitConfig::parse(text);

        assert_eq!(split.blocks.keys().collect::<Vec<_>>(), vec!["interface Ethernet9/1/4"]);
        assert_eq!(split.excluded["interface Ethernet8/1/4"], body(&["   description lane"]));
        assert_eq!(split.residual_lines().count(), 0);
    }

    #[test]
    fn residual_without_interfaces_is_identity() {
        let text = "hostname leaf1\n!\nip routing\n   stray indented\n";
        let (blocks, residual) = split(text);
        assert!(blocks.is_empty());
        assert_eq!(residual.join("\n") + "\n", text);
    }

    #[test]
    fn every_line_lands_exactly_once() {
        let text = "hostname leaf1\n\
                    interface Ethernet1/1/1\n   switchport mode tap\n   shutdown\n\
                    interface Ethernet2/3/3\n   description reserved\n\
                    \n\
                    interface Port-Channel5\n   description po\n\
                    management api http-commands\n   no shutdown\n";
        let split = SplitConfig::parse(text);

        let headers = split
            .spans
            .iter()
            .filter(|s| matches!(s, Span::Interface(_)))
            .count();
        let bodies: usize = split
            .blocks
            .values()
            .chain(split.excluded.values())
            .map(Vec::len)
            .sum();
        let residual = split.residual_lines().count();

        assert_eq!(headers + bodies + residual, text.lines().count());
    }

    #[test]
    fn crlf_line_endings_are_stripped() {
        let (blocks, residual) = split("interface Ethernet1/1/1\r\n   shutdown\r\nend\r\n");
        assert_eq!(blocks["interface Ethernet1/1/1"], body(&["   shutdown"]));
        assert_eq!(residual, body(&["end"]));
    }

    #[test]
    fn parse_is_deterministic() {
        let text = "interface Ethernet1/1/1\n   switchport mode tap\n\
                    interface Ethernet1/2/1\n   shutdown\n";
        assert_eq!(SplitConfig::parse(text), SplitConfig::parse(text));
    }
}
