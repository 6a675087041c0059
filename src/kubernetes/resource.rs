use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;

/// Namespaced resource kinds counted for every namespace, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Pods,
    Services,
    ConfigMaps,
    Secrets,
    Deployments,
    ReplicaSets,
    StatefulSets,
    DaemonSets,
    Jobs,
    CronJobs,
    PersistentVolumeClaims,
    Ingresses,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 12] = [
        ResourceKind::Pods,
        ResourceKind::Services,
        ResourceKind::ConfigMaps,
        ResourceKind::Secrets,
        ResourceKind::Deployments,
        ResourceKind::ReplicaSets,
        ResourceKind::StatefulSets,
        ResourceKind::DaemonSets,
        ResourceKind::Jobs,
        ResourceKind::CronJobs,
        ResourceKind::PersistentVolumeClaims,
        ResourceKind::Ingresses,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Pods => "Pods",
            ResourceKind::Services => "Services",
            ResourceKind::ConfigMaps => "ConfigMaps",
            ResourceKind::Secrets => "Secrets",
            ResourceKind::Deployments => "Deployments",
            ResourceKind::ReplicaSets => "ReplicaSets",
            ResourceKind::StatefulSets => "StatefulSets",
            ResourceKind::DaemonSets => "DaemonSets",
            ResourceKind::Jobs => "Jobs",
            ResourceKind::CronJobs => "CronJobs",
            ResourceKind::PersistentVolumeClaims => "PersistentVolumeClaims",
            ResourceKind::Ingresses => "Ingresses",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Object counts per kind for one namespace, taken at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTally(BTreeMap<ResourceKind, usize>);

impl ResourceTally {
    /// Kinds that were never counted read as zero.
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.0.get(&kind).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, usize)> + '_ {
        self.0.iter().map(|(kind, count)| (*kind, *count))
    }
}

impl FromIterator<(ResourceKind, usize)> for ResourceTally {
    fn from_iter<I: IntoIterator<Item = (ResourceKind, usize)>>(iter: I) -> Self {
        ResourceTally(iter.into_iter().collect())
    }
}

/// Which kinds must be absent for a namespace to count as empty.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// A namespace is empty when it has no pods.
    PodsOnly,
    /// A namespace is empty when it has neither pods nor services.
    #[default]
    PodsAndServices,
}

impl Policy {
    pub fn primary_kinds(&self) -> &'static [ResourceKind] {
        match self {
            Policy::PodsOnly => &[ResourceKind::Pods],
            Policy::PodsAndServices => &[ResourceKind::Pods, ResourceKind::Services],
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Policy::PodsOnly => "Pods",
            Policy::PodsAndServices => "Pods and Services",
        }
    }
}

pub fn classify(tally: &ResourceTally, primary_kinds: &[ResourceKind]) -> bool {
    primary_kinds.iter().all(|kind| tally.count(*kind) == 0)
}
