use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::try_join_all;
use log::{debug, error, info, warn};

use crate::error::Error;
use crate::kubernetes::cluster::Cluster;
use crate::kubernetes::config::{is_protected, Granularity, RunConfiguration};
use crate::kubernetes::confirm::Confirm;
use crate::kubernetes::report;
use crate::kubernetes::resource::{classify, ResourceKind, ResourceTally};

/// Set once the operator asked the run to stop. No delete starts after that.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Triggers on Ctrl-C. Needs a running tokio runtime.
    pub fn listen(&self) {
        let interrupt = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, no further namespaces will be deleted.");
                interrupt.trigger();
            }
        });
    }
}

/// Where an empty namespace ended up.
#[derive(Debug)]
pub enum Disposition {
    /// Found empty, not yet decided.
    Listed,
    SkippedDryRun,
    /// A system namespace, never offered for deletion.
    Protected,
    Declined,
    Interrupted,
    Deleted,
    Failed(Error),
}

#[derive(Debug)]
pub enum Finding {
    /// Left out by the namespace filter.
    Filtered,
    /// Not looked at because the run was interrupted first.
    Unchecked,
    CheckFailed(Error),
    Occupied(ResourceTally),
    Empty {
        tally: ResourceTally,
        disposition: Disposition,
    },
}

#[derive(Debug)]
pub struct NamespaceReport {
    pub namespace: String,
    pub finding: Finding,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub namespaces: Vec<NamespaceReport>,
}

impl RunReport {
    pub fn empty(&self) -> impl Iterator<Item = (&str, &ResourceTally, &Disposition)> {
        self.namespaces.iter().filter_map(|report| match &report.finding {
            Finding::Empty { tally, disposition } => {
                Some((report.namespace.as_str(), tally, disposition))
            }
            _ => None,
        })
    }
}

/// Counts every checklist kind in `namespace`. The first failing query fails the tally.
pub async fn collect_tally<C: Cluster + ?Sized>(
    cluster: &C,
    namespace: &str,
) -> Result<ResourceTally, Error> {
    let counts = try_join_all(ResourceKind::ALL.into_iter().map(|kind| async move {
        cluster
            .count_resources(namespace, kind)
            .await
            .map(|count| (kind, count))
            .map_err(|cause| Error::ResourceQueryFailed {
                kind,
                namespace: namespace.to_string(),
                cause,
            })
    }))
    .await?;
    Ok(counts.into_iter().collect())
}

pub struct Reaper<'a, C: ?Sized, P, W> {
    cluster: &'a C,
    confirm: P,
    out: W,
    config: &'a RunConfiguration,
    interrupt: Interrupt,
}

impl<'a, C, P, W> Reaper<'a, C, P, W>
where
    C: Cluster + ?Sized,
    P: Confirm,
    W: Write,
{
    pub fn new(
        cluster: &'a C,
        confirm: P,
        out: W,
        config: &'a RunConfiguration,
        interrupt: Interrupt,
    ) -> Self {
        Self {
            cluster,
            confirm,
            out,
            config,
            interrupt,
        }
    }

    /// Only a failed namespace listing or a broken terminal ends the run early.
    pub async fn run(mut self) -> Result<RunReport, Error> {
        let namespaces = self.cluster.list_namespaces().await?;
        info!("Found {} namespaces.", namespaces.len());

        let mut reports = Vec::with_capacity(namespaces.len());
        for namespace in namespaces {
            let finding = if self.interrupt.is_triggered() {
                debug!("Not checking namespace {namespace} after the interrupt.");
                Finding::Unchecked
            } else {
                self.inspect(&namespace).await?
            };
            reports.push(NamespaceReport { namespace, finding });
        }

        if self.config.granularity == Granularity::Bulk {
            self.dispose_all(&mut reports).await?;
        }

        let report = RunReport {
            namespaces: reports,
        };
        report::summary(&mut self.out, self.config, &report)?;
        Ok(report)
    }

    async fn inspect(&mut self, namespace: &str) -> Result<Finding, Error> {
        if self.config.filter.excludes(namespace) {
            return Ok(Finding::Filtered);
        }

        writeln!(self.out, "Checking namespace: {namespace}")?;
        let tally = match collect_tally(self.cluster, namespace).await {
            Ok(tally) => tally,
            Err(error) => {
                warn!("{error}");
                writeln!(self.out, "Error checking namespace {namespace}: {error}")?;
                return Ok(Finding::CheckFailed(error));
            }
        };

        if !classify(&tally, self.config.policy.primary_kinds()) {
            debug!("Namespace {namespace} still has workloads.");
            return Ok(Finding::Occupied(tally));
        }

        report::empty_namespace(&mut self.out, namespace, self.config.policy, &tally)?;
        let disposition = if self.config.dry_run {
            Disposition::SkippedDryRun
        } else if is_protected(namespace) {
            writeln!(self.out, "Namespace {namespace} is protected and will not be deleted.")?;
            Disposition::Protected
        } else {
            match self.config.granularity {
                Granularity::PerNamespace => self.dispose(namespace).await?,
                Granularity::Bulk => Disposition::Listed,
            }
        };
        Ok(Finding::Empty { tally, disposition })
    }

    async fn dispose(&mut self, namespace: &str) -> Result<Disposition, Error> {
        if self.interrupt.is_triggered() {
            return Ok(Disposition::Interrupted);
        }

        let question = format!("Do you want to delete the namespace '{namespace}'?");
        if !self.confirm.confirm(&question)? {
            writeln!(self.out, "Skipped deletion of namespace: {namespace}")?;
            return Ok(Disposition::Declined);
        }
        self.delete(namespace).await
    }

    async fn dispose_all(&mut self, reports: &mut [NamespaceReport]) -> Result<(), Error> {
        let listed: Vec<(&str, &mut Disposition)> = reports
            .iter_mut()
            .filter_map(|NamespaceReport { namespace, finding }| match finding {
                Finding::Empty { disposition, .. }
                    if matches!(disposition, Disposition::Listed) =>
                {
                    Some((namespace.as_str(), disposition))
                }
                _ => None,
            })
            .collect();
        if listed.is_empty() {
            return Ok(());
        }

        writeln!(
            self.out,
            "Namespaces empty of {}:",
            self.config.policy.describe()
        )?;
        for (namespace, _) in &listed {
            writeln!(self.out, "- {namespace}")?;
        }

        let confirmed = if self.interrupt.is_triggered() {
            false
        } else {
            let confirmed = self
                .confirm
                .confirm("Do you want to delete all these namespaces?")?;
            if !confirmed {
                writeln!(self.out, "No namespaces were deleted.")?;
            }
            confirmed
        };

        for (namespace, disposition) in listed {
            *disposition = if confirmed {
                self.delete(namespace).await?
            } else if self.interrupt.is_triggered() {
                Disposition::Interrupted
            } else {
                Disposition::Declined
            };
        }
        Ok(())
    }

    async fn delete(&mut self, namespace: &str) -> Result<Disposition, Error> {
        if self.interrupt.is_triggered() {
            return Ok(Disposition::Interrupted);
        }

        writeln!(self.out, "Deleting namespace: {namespace}")?;
        match self.cluster.delete_namespace(namespace).await {
            Ok(()) => {
                writeln!(self.out, "Successfully deleted namespace: {namespace}")?;
                Ok(Disposition::Deleted)
            }
            Err(cause) => {
                let failure = Error::DeletionFailed {
                    namespace: namespace.to_string(),
                    cause,
                };
                error!("{failure}");
                writeln!(self.out, "Error deleting namespace {namespace}: {failure}")?;
                Ok(Disposition::Failed(failure))
            }
        }
    }
}
