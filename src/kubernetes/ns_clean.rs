use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args};
use log::{debug, info};

use crate::kubernetes::cluster::KubeCluster;
use crate::kubernetes::config::{
    ClusterSettings, Granularity, KubeconfigSource, NamespaceFilter, RunConfiguration,
};
use crate::kubernetes::confirm::Prompt;
use crate::kubernetes::reaper::{Interrupt, Reaper};
use crate::kubernetes::resource::Policy;

#[derive(Debug, Args)]
pub struct CommandArgs {
    /// List empty namespaces without deleting them.
    #[arg(short, long)]
    dry_run: bool,

    /// Which resource kinds must be absent for a namespace to count as empty.
    #[arg(short, long, value_enum, default_value_t = Policy::PodsAndServices)]
    policy: Policy,

    /// Ask before every namespace, or once for all empty namespaces.
    #[arg(long = "confirm", value_enum, default_value_t = Granularity::PerNamespace)]
    granularity: Granularity,

    /// Path to the kubeconfig file. Defaults to $KUBECONFIG, then ~/.kube/config.
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    #[arg(short, long)]
    context: Option<String>,

    /// Only check namespaces that match a regex.
    #[arg(short, long)]
    filter: Option<String>,

    /// Transforms the filter to a blacklist.
    #[arg(long)]
    inverse_filter: bool,

    /// Seconds to wait for each call to the cluster.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Show more detailed logs (repeat to show more)
    #[arg(short, action=ArgAction::Count)]
    pub verbosity: u8,
}

impl CommandArgs {
    fn run_configuration(&self) -> anyhow::Result<RunConfiguration> {
        Ok(RunConfiguration {
            dry_run: self.dry_run,
            policy: self.policy,
            granularity: self.granularity,
            filter: NamespaceFilter::new(self.filter.as_deref(), self.inverse_filter)?,
        })
    }

    fn cluster_settings(&self) -> anyhow::Result<ClusterSettings> {
        Ok(ClusterSettings {
            kubeconfig: KubeconfigSource::from_environment(self.kubeconfig.clone())?,
            context: self.context.clone(),
            timeout: Duration::from_secs(self.timeout),
        })
    }
}

#[tokio::main()]
pub async fn handle(args: CommandArgs) -> anyhow::Result<()> {
    let config = args.run_configuration()?;
    let settings = args.cluster_settings()?;
    debug!("Resolved kubeconfig: {:?}", settings.kubeconfig);
    if config.dry_run {
        info!("Dry-run mode, nothing will be deleted.");
    }

    let client = settings
        .client()
        .await
        .context("cannot connect to the cluster")?;
    let cluster = KubeCluster::new(client, settings.timeout);

    let interrupt = Interrupt::default();
    interrupt.listen();

    Reaper::new(&cluster, Prompt::stdio(), io::stdout(), &config, interrupt)
        .run()
        .await
        .context("namespace cleanup aborted")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        args: CommandArgs,
    }

    #[test]
    fn defaults_check_pods_and_services_per_namespace() {
        let cli = Cli::parse_from(["ns-clean"]);
        let config = cli.args.run_configuration().unwrap();

        assert!(!config.dry_run);
        assert_eq!(config.policy, Policy::PodsAndServices);
        assert_eq!(config.granularity, Granularity::PerNamespace);
        assert_eq!(cli.args.timeout, 30);
    }

    #[test]
    fn short_flags_select_dry_run_and_policy() {
        let cli = Cli::parse_from([
            "ns-clean",
            "-d",
            "-p",
            "pods-only",
            "--confirm",
            "bulk",
            "-vv",
        ]);
        let config = cli.args.run_configuration().unwrap();

        assert!(config.dry_run);
        assert_eq!(config.policy, Policy::PodsOnly);
        assert_eq!(config.granularity, Granularity::Bulk);
        assert_eq!(cli.args.verbosity, 2);
    }

    #[rstest]
    #[case("0")]
    #[case("-5")]
    #[case("soon")]
    fn timeout_must_be_a_positive_number_of_seconds(#[case] timeout: &str) {
        assert!(Cli::try_parse_from(["ns-clean", "--timeout", timeout]).is_err());
    }

    #[test]
    fn smallest_timeout_is_one_second() {
        let cli = Cli::parse_from(["ns-clean", "--timeout", "1"]);
        let settings = cli.args.cluster_settings().unwrap();

        assert_eq!(settings.timeout, Duration::from_secs(1));
    }

    #[test]
    fn bad_filter_fails_before_touching_the_cluster() {
        let cli = Cli::parse_from(["ns-clean", "--filter", "[a-"]);
        assert!(cli.args.run_configuration().is_err());
    }

    #[test]
    fn explicit_kubeconfig_is_used_as_is() {
        let cli = Cli::parse_from(["ns-clean", "--kubeconfig", "/tmp/admin.yaml"]);
        let settings = cli.args.cluster_settings().unwrap();

        assert_eq!(
            settings.kubeconfig,
            KubeconfigSource::Flag(PathBuf::from("/tmp/admin.yaml"))
        );
    }
}
