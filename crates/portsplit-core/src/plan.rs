// ── Reconcile plan ──
//
// Pure pipeline from reconcile configlet text to the bodies that will be
// pushed: split, classify, render. No I/O; `Reconciler` executes the plan.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use strum::Display;
use tracing::warn;

use crate::classify::{Classified, PortCategory};
use crate::parse::{InterfaceBlocks, Span, SplitConfig};
use crate::render::{render_category, render_residual};

/// Knobs for building a [`Plan`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Write excluded and unclassified interfaces back into the residual
    /// configuration at their header position instead of dropping them.
    pub retain_unmatched: bool,
}

/// What happens to one interface of the reconcile configlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Disposition {
    /// Moved into its category's automation configlet.
    Templated,
    /// Reserved port position; removed without templating.
    Excluded,
    /// No recognizable role; removed without templating.
    Dropped,
    /// Excluded or unclassified, kept in the residual configuration.
    Retained,
}

/// Per-interface summary, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceOutcome {
    pub interface: String,
    pub category: PortCategory,
    pub disposition: Disposition,
    pub body_lines: usize,
}

/// Rendered result of splitting one reconcile configlet.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub outcomes: Vec<InterfaceOutcome>,
    /// Rendered automation configlet bodies for non-empty categories, in
    /// update order (tap, tool, shutdown).
    pub rendered: IndexMap<PortCategory, String>,
    /// New reconcile configlet text.
    pub residual: String,
    #[serde(skip)]
    pub classified: Classified,
}

impl Plan {
    /// Build a plan from reconcile configlet text.
    pub fn build(text: &str, options: PlanOptions) -> Self {
        let SplitConfig {
            spans,
            blocks,
            excluded,
        } = SplitConfig::parse(text);
        let classified = Classified::from_blocks(blocks);

        let mut rendered = IndexMap::new();
        for category in PortCategory::TEMPLATED {
            let blocks = classified.blocks(category);
            if !blocks.is_empty() {
                rendered.insert(category, render_category(category, blocks));
            }
        }

        let outcomes = outcomes(&spans, &classified, &excluded, options);
        let residual = residual(&spans, &classified.unclassified, &excluded, options);

        Self {
            outcomes,
            rendered,
            residual,
            classified,
        }
    }

    /// Rendered body for `category`, if it has any interfaces.
    pub fn rendered(&self, category: PortCategory) -> Option<&str> {
        self.rendered.get(&category).map(String::as_str)
    }

    /// Number of interfaces moved into automation configlets.
    pub fn templated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.disposition == Disposition::Templated)
            .count()
    }

    /// Interfaces whose configuration is lost from both the automation
    /// configlets and the reconcile configlet.
    pub fn dropped(&self) -> impl Iterator<Item = &InterfaceOutcome> {
        self.outcomes.iter().filter(|o| {
            matches!(o.disposition, Disposition::Excluded | Disposition::Dropped)
        })
    }
}

fn outcomes(
    spans: &[Span],
    classified: &Classified,
    excluded: &InterfaceBlocks,
    options: PlanOptions,
) -> Vec<InterfaceOutcome> {
    let mut seen = HashSet::new();
    let mut outcomes = Vec::new();

    for span in spans {
        let Span::Interface(interface) = span else {
            continue;
        };
        if !seen.insert(interface.as_str()) {
            continue;
        }

        let (category, disposition, body_lines) = if let Some(body) = excluded.get(interface) {
            let disposition = if options.retain_unmatched {
                Disposition::Retained
            } else {
                Disposition::Excluded
            };
            (PortCategory::Unclassified, disposition, body.len())
        } else {
            let Some(category) = classified.category_of(interface) else {
                continue;
            };
            let body_lines = classified.blocks(category).get(interface).map_or(0, Vec::len);
            let disposition = match category {
                PortCategory::Unclassified if options.retain_unmatched => Disposition::Retained,
                PortCategory::Unclassified => Disposition::Dropped,
                _ => Disposition::Templated,
            };
            (category, disposition, body_lines)
        };

        if matches!(disposition, Disposition::Excluded | Disposition::Dropped) {
            warn!(interface = %interface, %disposition, "interface removed without templating");
        }

        outcomes.push(InterfaceOutcome {
            interface: interface.clone(),
            category,
            disposition,
            body_lines,
        });
    }
    outcomes
}

fn residual(
    spans: &[Span],
    unclassified: &InterfaceBlocks,
    excluded: &InterfaceBlocks,
    options: PlanOptions,
) -> String {
    let mut emitted = HashSet::new();
    let mut lines: Vec<&str> = Vec::new();

    for span in spans {
        match span {
            Span::Residual(line) => lines.push(line),
            Span::Interface(interface) if options.retain_unmatched => {
                let body = excluded
                    .get(interface)
                    .or_else(|| unclassified.get(interface));
                if let Some(body) = body {
                    if emitted.insert(interface.as_str()) {
                        lines.push(interface);
                        lines.extend(body.iter().map(String::as_str));
                    }
                }
            }
            Span::Interface(_) => {}
        }
    }
    render_residual(lines)
}
