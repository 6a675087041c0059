use std::time::Duration;

use thiserror::Error as TError;

use crate::kubernetes::resource::ResourceKind;

/// Failure of a single call against the cluster.
#[derive(Debug, TError)]
pub enum ClusterError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },
    #[error("cluster unreachable: {0}")]
    Unreachable(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

impl From<kube::Error> for ClusterError {
    fn from(error: kube::Error) -> Self {
        match error {
            kube::Error::Api(response) => match response.code {
                401 | 403 => ClusterError::Unauthorized(response.message),
                404 => ClusterError::NotFound(response.message),
                code => ClusterError::Api {
                    code,
                    message: response.message,
                },
            },
            kube::Error::Auth(error) => ClusterError::Unauthorized(error.to_string()),
            error => ClusterError::Unreachable(error.to_string()),
        }
    }
}

#[derive(Debug, TError)]
pub enum Error {
    #[error("cannot load kubeconfig: {0}")]
    Kubeconfig(String),
    #[error("cannot reach the cluster: {0}")]
    ClusterUnreachable(String),
    #[error("not authorized against the cluster: {0}")]
    Unauthorized(String),
    #[error("cannot count {kind} in namespace {namespace}: {cause}")]
    ResourceQueryFailed {
        kind: ResourceKind,
        namespace: String,
        #[source]
        cause: ClusterError,
    },
    #[error("cannot delete namespace {namespace}: {cause}")]
    DeletionFailed {
        namespace: String,
        #[source]
        cause: ClusterError,
    },
    #[error("invalid namespace filter: {0}")]
    InvalidFilter(#[from] regex::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ClusterError> for Error {
    fn from(error: ClusterError) -> Self {
        match error {
            ClusterError::Unauthorized(message) => Error::Unauthorized(message),
            error => Error::ClusterUnreachable(error.to_string()),
        }
    }
}

impl From<kube::config::KubeconfigError> for Error {
    fn from(error: kube::config::KubeconfigError) -> Self {
        Error::Kubeconfig(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use kube::core::ErrorResponse;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".into(),
            message: "denied".into(),
            reason: "Forbidden".into(),
            code,
        })
    }

    #[rstest]
    #[case(401, "unauthorized: denied")]
    #[case(403, "unauthorized: denied")]
    #[case(404, "not found: denied")]
    #[case(409, "API error 409: denied")]
    fn maps_api_status_codes(#[case] code: u16, #[case] expected: &str) {
        assert_eq!(ClusterError::from(api_error(code)).to_string(), expected);
    }

    #[test]
    fn listing_failures_split_into_fatal_kinds() {
        assert!(matches!(
            Error::from(ClusterError::Unauthorized("nope".into())),
            Error::Unauthorized(_)
        ));
        assert!(matches!(
            Error::from(ClusterError::Timeout(Duration::from_secs(3))),
            Error::ClusterUnreachable(_)
        ));
    }

    #[test]
    fn query_failure_names_kind_and_namespace() {
        let error = Error::ResourceQueryFailed {
            kind: ResourceKind::Secrets,
            namespace: "team-a".into(),
            cause: ClusterError::Timeout(Duration::from_secs(5)),
        };
        assert_eq!(
            error.to_string(),
            "cannot count Secrets in namespace team-a: no response within 5s"
        );
    }
}
