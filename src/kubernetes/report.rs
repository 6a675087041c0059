use std::fmt;
use std::io::{self, Write};

use crate::kubernetes::config::RunConfiguration;
use crate::kubernetes::reaper::{Disposition, Finding, RunReport};
use crate::kubernetes::resource::{Policy, ResourceTally};

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Listed => f.write_str("pending"),
            Disposition::SkippedDryRun => f.write_str("skipped (dry-run)"),
            Disposition::Protected => f.write_str("skipped (protected)"),
            Disposition::Declined => f.write_str("skipped (declined)"),
            Disposition::Interrupted => f.write_str("skipped (interrupted)"),
            Disposition::Deleted => f.write_str("deleted"),
            Disposition::Failed(error) => write!(f, "deletion failed: {error}"),
        }
    }
}

/// Every checklist kind is listed, so leftovers like ConfigMaps are visible before deleting.
pub fn empty_namespace<W: Write>(
    out: &mut W,
    namespace: &str,
    policy: Policy,
    tally: &ResourceTally,
) -> io::Result<()> {
    writeln!(
        out,
        "Namespace {namespace} is empty of {}.",
        policy.describe()
    )?;
    writeln!(out, "Resources remaining in namespace {namespace}:")?;
    for (kind, count) in tally.iter() {
        writeln!(out, "- {kind}: {count}")?;
    }
    Ok(())
}

pub fn summary<W: Write>(
    out: &mut W,
    config: &RunConfiguration,
    report: &RunReport,
) -> io::Result<()> {
    let checked = report
        .namespaces
        .iter()
        .filter(|namespace| {
            !matches!(namespace.finding, Finding::Filtered | Finding::Unchecked)
        })
        .count();
    let empty = report.empty().count();

    writeln!(out)?;
    writeln!(
        out,
        "Summary: {checked} namespaces checked, {empty} empty of {}.",
        config.policy.describe()
    )?;
    for namespace in &report.namespaces {
        let name = &namespace.namespace;
        match &namespace.finding {
            Finding::Occupied(_) => {}
            Finding::Filtered => writeln!(out, "- {name}: excluded (filtered)")?,
            Finding::Unchecked => writeln!(out, "- {name}: not checked (interrupted)")?,
            Finding::CheckFailed(error) => writeln!(out, "- {name}: check failed: {error}")?,
            Finding::Empty { disposition, .. } => writeln!(out, "- {name}: {disposition}")?,
        }
    }

    if empty == 0 {
        writeln!(
            out,
            "No namespaces empty of {} found.",
            config.policy.describe()
        )?;
    } else if config.dry_run {
        writeln!(out, "Dry-run mode: no namespaces were deleted.")?;
    }
    Ok(())
}
