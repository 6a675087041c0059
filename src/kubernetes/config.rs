use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use log::{debug, info, warn};
use regex::Regex;

use crate::error::Error;
use crate::kubernetes::resource::Policy;

/// Namespaces that are checked and reported but never deleted.
const EXEMPTIONS: [&str; 4] = ["default", "kube-system", "kube-public", "kube-node-lease"];

/// How often the operator is asked before deleting.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// Ask once for every empty namespace, right after it is reported.
    #[default]
    PerNamespace,
    /// Ask once for all empty namespaces after every namespace was checked.
    Bulk,
}

pub fn is_protected(namespace: &str) -> bool {
    EXEMPTIONS.contains(&namespace)
}

#[derive(Debug, Default)]
pub struct NamespaceFilter {
    pattern: Option<Regex>,
    inverse: bool,
}

impl NamespaceFilter {
    pub fn new(pattern: Option<&str>, inverse: bool) -> Result<Self, Error> {
        Ok(Self {
            pattern: pattern.map(Regex::new).transpose()?,
            inverse,
        })
    }

    pub fn excludes(&self, namespace: &str) -> bool {
        let Some(regexp) = self.pattern.as_ref() else {
            return false;
        };
        let excluded = regexp.is_match(namespace) == self.inverse;
        if excluded {
            info!("Will not check namespace {namespace} because it's filtered-out.");
        }
        excluded
    }
}

/// Everything the reaper reads while it runs. Built once from the command line.
#[derive(Debug, Default)]
pub struct RunConfiguration {
    pub dry_run: bool,
    pub policy: Policy,
    pub granularity: Granularity,
    pub filter: NamespaceFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KubeconfigSource {
    Flag(PathBuf),
    Env(Vec<PathBuf>),
    Default(PathBuf),
}

impl KubeconfigSource {
    /// The explicit flag wins, then `KUBECONFIG`, then `~/.kube/config`.
    pub fn resolve(
        flag: Option<PathBuf>,
        env: Option<OsString>,
        home: Option<PathBuf>,
    ) -> Result<Self, Error> {
        if let Some(path) = flag {
            return Ok(KubeconfigSource::Flag(path));
        }
        if let Some(paths) = env {
            let paths: Vec<PathBuf> = std::env::split_paths(&paths)
                .filter(|path| !path.as_os_str().is_empty())
                .collect();
            if !paths.is_empty() {
                return Ok(KubeconfigSource::Env(paths));
            }
        }
        home.map(|home| KubeconfigSource::Default(home.join(".kube").join("config")))
            .ok_or_else(|| Error::Kubeconfig("cannot determine the home directory".into()))
    }

    pub fn from_environment(flag: Option<PathBuf>) -> Result<Self, Error> {
        Self::resolve(flag, std::env::var_os("KUBECONFIG"), dirs::home_dir())
    }

    fn paths(&self) -> &[PathBuf] {
        match self {
            KubeconfigSource::Flag(path) | KubeconfigSource::Default(path) => {
                std::slice::from_ref(path)
            }
            KubeconfigSource::Env(paths) => paths,
        }
    }

    /// Missing entries of `KUBECONFIG` are skipped, as long as one file is left.
    pub fn read(&self) -> Result<Kubeconfig, Error> {
        let mut kubeconfig: Option<Kubeconfig> = None;
        for path in self.paths() {
            if matches!(self, KubeconfigSource::Env(_)) && !path.exists() {
                warn!("Skipping missing kubeconfig {}.", path.display());
                continue;
            }
            debug!("Reading kubeconfig from {}.", path.display());
            let next = read_from(path)?;
            kubeconfig = Some(match kubeconfig {
                Some(merged) => merged.merge(next)?,
                None => next,
            });
        }
        kubeconfig.ok_or_else(|| Error::Kubeconfig("none of the KUBECONFIG files exist".into()))
    }
}

fn read_from(path: &Path) -> Result<Kubeconfig, Error> {
    Kubeconfig::read_from(path)
        .map_err(|error| Error::Kubeconfig(format!("{}: {error}", path.display())))
}

/// How to reach the cluster.
#[derive(Debug)]
pub struct ClusterSettings {
    pub kubeconfig: KubeconfigSource,
    pub context: Option<String>,
    pub timeout: Duration,
}

impl ClusterSettings {
    pub async fn client(&self) -> Result<Client, Error> {
        let kubeconfig = self.kubeconfig.read()?;
        let mut config = Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: self.context.clone(),
                cluster: None,
                user: None,
            },
        )
        .await?;
        config.connect_timeout = Some(self.timeout);
        config.read_timeout = Some(self.timeout);
        info!("Using cluster at {}.", config.cluster_url);

        Client::try_from(config).map_err(|error| Error::ClusterUnreachable(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn flag_beats_environment() {
        let source = KubeconfigSource::resolve(
            Some(PathBuf::from("/tmp/flag")),
            Some(OsString::from("/tmp/env")),
            Some(PathBuf::from("/home/op")),
        )
        .unwrap();
        assert_eq!(source, KubeconfigSource::Flag(PathBuf::from("/tmp/flag")));
    }

    #[test]
    fn environment_beats_home_and_may_list_several_files() {
        let joined = std::env::join_paths(["/tmp/a", "/tmp/b"]).unwrap();
        let source =
            KubeconfigSource::resolve(None, Some(joined), Some(PathBuf::from("/home/op"))).unwrap();
        assert_eq!(
            source,
            KubeconfigSource::Env(vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/b")])
        );
    }

    #[test]
    fn empty_environment_falls_back_to_home() {
        let source =
            KubeconfigSource::resolve(None, Some(OsString::new()), Some(PathBuf::from("/home/op")))
                .unwrap();
        assert_eq!(
            source,
            KubeconfigSource::Default(PathBuf::from("/home/op/.kube/config"))
        );
    }

    #[test]
    fn no_home_is_an_error() {
        let error = KubeconfigSource::resolve(None, None, None).unwrap_err();
        assert!(matches!(error, Error::Kubeconfig(_)));
    }

    #[rstest]
    #[case("kube-system", true)]
    #[case("kube-public", true)]
    #[case("kube-node-lease", true)]
    #[case("default", true)]
    #[case("kube-system-backup", false)]
    fn system_namespaces_are_protected(#[case] namespace: &str, #[case] expected: bool) {
        assert_eq!(is_protected(namespace), expected);
    }

    #[rstest]
    #[case(None, false, "review-42", false)]
    #[case(Some("^review-"), false, "review-42", false)]
    #[case(Some("^review-"), false, "payments", true)]
    #[case(Some("^review-"), true, "review-42", true)]
    #[case(Some("^review-"), true, "payments", false)]
    fn filter_keeps_or_drops_matches(
        #[case] pattern: Option<&str>,
        #[case] inverse: bool,
        #[case] namespace: &str,
        #[case] expected: bool,
    ) {
        let filter = NamespaceFilter::new(pattern, inverse).unwrap();
        assert_eq!(filter.excludes(namespace), expected);
    }

    const KUBECONFIG: &str = indoc::indoc! {"
        apiVersion: v1
        kind: Config
        clusters:
        - name: lab
          cluster:
            server: https://127.0.0.1:6443
        contexts:
        - name: lab-admin
          context:
            cluster: lab
            user: admin
        current-context: lab-admin
        users:
        - name: admin
          user:
            token: secret
    "};

    #[test]
    fn missing_environment_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("config");
        std::fs::write(&present, KUBECONFIG).unwrap();
        let source = KubeconfigSource::Env(vec![dir.path().join("gone"), present]);

        let kubeconfig = source.read().unwrap();

        assert_eq!(kubeconfig.current_context.as_deref(), Some("lab-admin"));
    }

    #[test]
    fn all_environment_entries_missing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = KubeconfigSource::Env(vec![dir.path().join("a"), dir.path().join("b")]);

        assert!(matches!(source.read(), Err(Error::Kubeconfig(_))));
    }

    #[test]
    fn missing_flag_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = KubeconfigSource::Flag(dir.path().join("absent"));

        assert!(matches!(source.read(), Err(Error::Kubeconfig(_))));
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let error = NamespaceFilter::new(Some("(unclosed"), false).unwrap_err();
        assert!(matches!(error, Error::InvalidFilter(_)));
    }
}
