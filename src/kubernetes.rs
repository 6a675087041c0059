use clap::Subcommand;
pub mod cluster;
pub mod config;
pub mod confirm;
pub mod ns_clean;
pub mod reaper;
pub mod report;
pub mod resource;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lists namespaces without workloads and deletes them after confirmation.
    ///
    /// A namespace is empty when it has no objects of the kinds named by --policy.
    /// Every other checked kind is still shown so leftovers are visible.
    /// With --confirm per-namespace (the default) each empty namespace is confirmed
    /// on its own; with --confirm bulk a single answer covers all of them.
    /// Only "yes" (any case) confirms. --dry-run never deletes and never asks.
    #[command()]
    NsClean(ns_clean::CommandArgs),
}
