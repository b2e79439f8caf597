// ── Configuration re-templating ──
//
// Renders classified interface blocks back into configlet text. Every
// emitted line is newline-terminated; each interface is preceded by a `!`
// separator and the body is closed by a trailing `!`.

use std::fmt::Write;

use crate::classify::PortCategory;
use crate::parse::InterfaceBlocks;

pub const SEPARATOR: &str = "!";
pub const SHUTDOWN_LINE: &str = "   shutdown";
pub const NO_SHUTDOWN_LINE: &str = "   no shutdown";

/// Render one category's interfaces as configlet text.
///
/// Tap and Tool keep their bodies verbatim, with `no shutdown` appended when
/// the body has no exact `shutdown` line. Shutdown discards the body and
/// forces `shutdown`. Unclassified interfaces are never templated and render
/// as an empty string.
pub fn render_category(category: PortCategory, blocks: &InterfaceBlocks) -> String {
    match category {
        PortCategory::Tap | PortCategory::Tool => render_passthrough(blocks),
        PortCategory::Shutdown => render_forced_shutdown(blocks),
        PortCategory::Unclassified => String::new(),
    }
}

fn render_passthrough(blocks: &InterfaceBlocks) -> String {
    let mut out = String::new();
    for (interface, body) in blocks {
        let _ = writeln!(out, "{SEPARATOR}");
        let _ = writeln!(out, "{interface}");
        for line in body {
            let _ = writeln!(out, "{line}");
        }
        if !body.iter().any(|line| line == SHUTDOWN_LINE) {
            let _ = writeln!(out, "{NO_SHUTDOWN_LINE}");
        }
    }
    let _ = writeln!(out, "{SEPARATOR}");
    out
}

fn render_forced_shutdown(blocks: &InterfaceBlocks) -> String {
    let mut out = String::new();
    for interface in blocks.keys() {
        let _ = writeln!(out, "{SEPARATOR}");
        let _ = writeln!(out, "{interface}");
        let _ = writeln!(out, "{SHUTDOWN_LINE}");
    }
    let _ = writeln!(out, "{SEPARATOR}");
    out
}

/// Render residual lines verbatim, each newline-terminated.
pub fn render_residual<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    out
}
