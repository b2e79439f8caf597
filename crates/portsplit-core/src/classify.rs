// ── Port classification ──
//
// Assigns each interface block to at most one automation category by
// scanning its body. Tap and Tool are decided by the first matching line;
// the Shutdown guard looks at the whole body.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::trace;

use crate::parse::InterfaceBlocks;

/// Body line marking a tap (mirror ingress) port.
pub const TAP_MODE_LINE: &str = "   switchport mode tap";

/// Body line marking a tool (mirror egress) port.
pub const TOOL_MODE_LINE: &str = "   switchport mode tool";

/// Semantic role of an interface, derived from its configuration lines.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PortCategory {
    Tap,
    Tool,
    Shutdown,
    Unclassified,
}

impl PortCategory {
    /// Categories that own an automation configlet, in update order.
    pub const TEMPLATED: [Self; 3] = [Self::Tap, Self::Tool, Self::Shutdown];

    /// Name of the automation configlet holding this category for `device`.
    ///
    /// `None` for [`Unclassified`](Self::Unclassified), which is never templated.
    pub fn configlet_name(self, device: &str) -> Option<String> {
        match self {
            Self::Tap => Some(format!("{device}-tapports-automation")),
            Self::Tool => Some(format!("{device}-toolports-automation")),
            Self::Shutdown => Some(format!("{device}-shutdownports-automation")),
            Self::Unclassified => None,
        }
    }
}

/// Classify one interface body.
///
/// The first line containing `tap`, `tool`, or `shutdown` (checked in that
/// order, case-sensitive substring) decides. A `shutdown` line does not
/// decide when the body holds an exact tap or tool mode line anywhere;
/// scanning continues past it instead.
pub fn classify_block(body: &[String]) -> PortCategory {
    let mirrored = body
        .iter()
        .any(|line| line == TAP_MODE_LINE || line == TOOL_MODE_LINE);

    for line in body {
        if line.contains("tap") {
            return PortCategory::Tap;
        }
        if line.contains("tool") {
            return PortCategory::Tool;
        }
        if line.contains("shutdown") && !mirrored {
            return PortCategory::Shutdown;
        }
    }
    PortCategory::Unclassified
}

/// Interface blocks grouped by category. Each block lands in exactly one map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub tap: InterfaceBlocks,
    pub tool: InterfaceBlocks,
    pub shutdown: InterfaceBlocks,
    pub unclassified: InterfaceBlocks,
}

impl Classified {
    /// Classify every block, preserving first-seen order within each category.
    pub fn from_blocks(blocks: InterfaceBlocks) -> Self {
        let mut classified = Self::default();
        for (interface, body) in blocks {
            let category = classify_block(&body);
            trace!(interface = %interface, %category, "classified interface");
            classified.blocks_mut(category).insert(interface, body);
        }
        classified
    }

    /// Blocks assigned to `category`.
    pub fn blocks(&self, category: PortCategory) -> &InterfaceBlocks {
        match category {
            PortCategory::Tap => &self.tap,
            PortCategory::Tool => &self.tool,
            PortCategory::Shutdown => &self.shutdown,
            PortCategory::Unclassified => &self.unclassified,
        }
    }

    fn blocks_mut(&mut self, category: PortCategory) -> &mut InterfaceBlocks {
        match category {
            PortCategory::Tap => &mut self.tap,
            PortCategory::Tool => &mut self.tool,
            PortCategory::Shutdown => &mut self.shutdown,
            PortCategory::Unclassified => &mut self.unclassified,
        }
    }

    /// Category of `interface`, if it was classified at all.
    pub fn category_of(&self, interface: &str) -> Option<PortCategory> {
        PortCategory::TEMPLATED
            .into_iter()
            .chain(std::iter::once(PortCategory::Unclassified))
            .find(|category| self.blocks(*category).contains_key(interface))
    }
}
