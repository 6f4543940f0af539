//! Built restore workloads and their rendering

use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Pod, Service};

use crate::error::RestoreError;

/// The set of workloads that performs one restore
#[derive(Clone, Debug, PartialEq)]
pub enum RestoreTopology {
    /// Source service and pod streaming a backup volume, plus the restore job
    VolumeToVolume {
        /// ClusterIP service in front of the source pod
        service: Service,
        /// Pod serving the backup stream
        pod: Pod,
        /// Job consuming the stream
        job: Job,
    },
    /// A single job reading the backup from object storage
    ObjectStore {
        /// Job downloading and preparing the backup
        job: Job,
    },
}

impl RestoreTopology {
    /// The restore job
    pub fn job(&self) -> &Job {
        match self {
            Self::VolumeToVolume { job, .. } | Self::ObjectStore { job } => job,
        }
    }

    /// Short strategy label for logs
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::VolumeToVolume { .. } => "volume",
            Self::ObjectStore { .. } => "s3",
        }
    }

    /// `Kind/name` of every workload, in apply order
    pub fn resource_names(&self) -> Vec<String> {
        match self {
            Self::VolumeToVolume { service, pod, job } => vec![
                kind_name("Service", &service.metadata.name),
                kind_name("Pod", &pod.metadata.name),
                kind_name("Job", &job.metadata.name),
            ],
            Self::ObjectStore { job } => vec![kind_name("Job", &job.metadata.name)],
        }
    }

    /// Serialize every workload to JSON, in apply order
    ///
    /// The source service and pod come before the job so the job's stream
    /// target exists when it starts.
    pub fn to_manifests(&self) -> Result<Vec<serde_json::Value>, RestoreError> {
        Ok(match self {
            Self::VolumeToVolume { service, pod, job } => vec![
                serde_json::to_value(service)?,
                serde_json::to_value(pod)?,
                serde_json::to_value(job)?,
            ],
            Self::ObjectStore { job } => vec![serde_json::to_value(job)?],
        })
    }

    /// Render as a multi-document YAML stream
    pub fn to_yaml(&self) -> Result<String, RestoreError> {
        let docs = self
            .to_manifests()?
            .iter()
            .map(serde_yaml::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(docs.join("---\n"))
    }
}

fn kind_name(kind: &str, name: &Option<String>) -> String {
    format!("{}/{}", kind, name.as_deref().unwrap_or_default())
}
