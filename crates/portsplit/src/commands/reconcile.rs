//! `portsplit reconcile <device>`

use std::fmt::Write;

use portsplit_core::{ConnectionConfig, PlanOptions, ReconcileOptions, ReconcileReport, Reconciler};

use crate::cli::{GlobalOpts, ReconcileArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    args: &ReconcileArgs,
    config: &ConnectionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let options = ReconcileOptions {
        dry_run: args.dry_run,
        plan: PlanOptions {
            retain_unmatched: args.retain_unmatched,
        },
    };

    if !args.dry_run
        && !util::confirm(
            "reconcile",
            &format!(
                "Replace the automation configlets of {} and rewrite its reconcile configlet?",
                args.device
            ),
            args.yes,
        )?
    {
        eprintln!("Aborted");
        return Ok(());
    }

    let reconciler = Reconciler::connect(config).await?;
    let result = reconciler.run(&args.device, options).await;
    reconciler.disconnect().await;
    let report = result?;

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &report,
        |r| report_detail(r, color),
        |r| r.updated.join("\n"),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn report_detail(report: &ReconcileReport, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Device:              {} ({})", report.device, report.device_mac);
    let _ = writeln!(out, "Reconcile configlet: {}", report.reconcile_configlet);
    if report.dry_run {
        let _ = writeln!(out, "Mode:                dry run, nothing written");
    }
    let updated = if report.updated.is_empty() {
        "-".to_owned()
    } else {
        report.updated.join(", ")
    };
    let _ = writeln!(out, "Updated:             {updated}");
    let _ = writeln!(out);
    out.push_str(&output::outcome_table(&report.plan.outcomes, color));
    out
}
