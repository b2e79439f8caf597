//! Offline split/classify of a local reconcile configlet.

use std::fmt::Write;

use portsplit_core::{Plan, PlanOptions, PortCategory};

use crate::cli::{GlobalOpts, OutputFormat, PreviewArgs, Section};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(args: &PreviewArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let text = util::read_input(&args.file)?;
    let plan = Plan::build(
        &text,
        PlanOptions {
            retain_unmatched: args.retain_unmatched,
        },
    );

    if let Some(section) = args.show {
        // Raw configuration text, independent of --output.
        output::print_output(section_body(&plan, section), global.quiet);
        return Ok(());
    }

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &plan,
        |p| plan_detail(p, color),
        |p| {
            p.outcomes
                .iter()
                .map(output::outcome_plain)
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);

    if global.output == OutputFormat::Table && !global.quiet {
        eprintln!("{}", summary(&plan));
    }
    Ok(())
}

fn section_body(plan: &Plan, section: Section) -> &str {
    let category = match section {
        Section::Tap => PortCategory::Tap,
        Section::Tool => PortCategory::Tool,
        Section::Shutdown => PortCategory::Shutdown,
        Section::Residual => return &plan.residual,
    };
    plan.rendered(category).unwrap_or_default()
}

fn plan_detail(plan: &Plan, color: bool) -> String {
    output::outcome_table(&plan.outcomes, color)
}

fn summary(plan: &Plan) -> String {
    let mut out = format!("{} templated", plan.templated_count());
    for category in PortCategory::TEMPLATED {
        let count = plan.classified.blocks(category).len();
        if count > 0 {
            let _ = write!(out, ", {count} {category}");
        }
    }
    let dropped = plan.dropped().count();
    if dropped > 0 {
        let _ = write!(out, ", {dropped} removed without templating");
    }
    out
}
