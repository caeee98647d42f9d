use std::collections::BTreeMap;
use std::fmt::Debug;

use kube::api;
use kube::Resource;
use pod_janitor_ext as k8s;
use serde::de::DeserializeOwned;

use k8s::batchv1;
use k8s::corev1;

pub const NOT_RUNNING: &str = "status.phase!=Running";
pub const RUNNING: &str = "status.phase==Running";

pub struct KubeApi {
    namespace: Option<String>,
    labels: Option<String>,
    delete_params: api::DeleteParams,
    client: kube::Client,
}

impl KubeApi {
    /// Create a KubeApi with a default Kubernetes client, scoped to `namespace`
    /// (all namespaces when `None`). Listings that ask for it are further
    /// narrowed to objects matching `labels`.
    ///
    /// The default client uses the in-cluster service account when available
    /// and falls back to the local kubeconfig otherwise.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), kube::Error> {
    /// let labels = std::collections::BTreeMap::new();
    /// let api = pod_janitor_kubeapi::KubeApi::new(None, &labels).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(
        namespace: Option<String>,
        labels: &BTreeMap<String, String>,
    ) -> kube::Result<Self> {
        let client = kube::Client::try_default().await?;
        Ok(Self::with_client(client, namespace, labels))
    }

    /// Create a KubeApi backed by the provided Kubernetes client.
    pub fn with_client(
        client: kube::Client,
        namespace: Option<String>,
        labels: &BTreeMap<String, String>,
    ) -> Self {
        let labels = (!labels.is_empty()).then(|| label_selector(labels));
        Self {
            namespace,
            labels,
            delete_params: api::DeleteParams::background(),
            client,
        }
    }

    /// Lists Pods in scope, optionally narrowed by a field selector such as
    /// [`NOT_RUNNING`] or [`RUNNING`]. The label selector is applied only
    /// when `labelled` is set.
    pub async fn list_pods(
        &self,
        field_selector: Option<&str>,
        labelled: bool,
    ) -> kube::Result<Vec<corev1::Pod>> {
        let lp = self.list_params(field_selector, labelled);
        self.api::<corev1::Pod>().list(&lp).await.map(|list| list.items)
    }

    /// Lists Jobs in scope.
    ///
    /// The API server does not support phase field selectors for Jobs, so
    /// any phase filtering is left to the caller.
    pub async fn list_jobs(&self, labelled: bool) -> kube::Result<Vec<batchv1::Job>> {
        let lp = self.list_params(None, labelled);
        self.api::<batchv1::Job>().list(&lp).await.map(|list| list.items)
    }

    /// Deletes a Pod. Returns `false` when the Pod is already gone.
    pub async fn delete_pod(&self, name: &str, namespace: &str) -> kube::Result<bool> {
        self.delete::<corev1::Pod>(name, namespace).await
    }

    /// Deletes a Job together with its Pods. Returns `false` when the Job is
    /// already gone.
    pub async fn delete_job(&self, name: &str, namespace: &str) -> kube::Result<bool> {
        self.delete::<batchv1::Job>(name, namespace).await
    }

    async fn delete<K>(&self, name: &str, namespace: &str) -> kube::Result<bool>
    where
        K: Resource<Scope = k8s::openapi::NamespaceResourceScope>
            + Clone
            + Debug
            + DeserializeOwned,
        K::DynamicType: Default,
    {
        let api = api::Api::<K>::namespaced(self.client.clone(), namespace);
        let deleted = deleted(api.delete(name, &self.delete_params).await)?;
        if !deleted {
            tracing::debug!(name, namespace, "Object already deleted");
        }
        Ok(deleted)
    }

    fn api<K>(&self) -> api::Api<K>
    where
        K: Resource<Scope = k8s::openapi::NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        match self.namespace.as_deref() {
            Some(namespace) => api::Api::namespaced(self.client.clone(), namespace),
            None => api::Api::all(self.client.clone()),
        }
    }

    fn list_params(&self, field_selector: Option<&str>, labelled: bool) -> api::ListParams {
        let labels = self.labels.as_deref().filter(|_| labelled);
        list_params(field_selector, labels)
    }
}

fn list_params(field_selector: Option<&str>, labels: Option<&str>) -> api::ListParams {
    let mut lp = api::ListParams::default();
    if let Some(fields) = field_selector {
        lp = lp.fields(fields);
    }
    if let Some(labels) = labels {
        lp = lp.labels(labels);
    }
    lp
}

/// Maps a delete outcome to whether anything was deleted; `NotFound` is not
/// an error.
fn deleted<T>(outcome: kube::Result<T>) -> kube::Result<bool> {
    match outcome {
        Ok(_) => Ok(true),
        Err(kube::Error::Api(status)) if status.is_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}

/// Render a label map as a Kubernetes equality-based label selector.
///
/// # Examples
///
/// ```
/// let labels = std::collections::BTreeMap::from([("app".to_string(), "web".to_string())]);
/// assert_eq!(pod_janitor_kubeapi::label_selector(&labels), "app=web");
/// ```
pub fn label_selector(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

impl Debug for KubeApi {
    /// Formats the `KubeApi` for debugging while redacting the `client`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeApi")
            .field("namespace", &self.namespace)
            .field("labels", &self.labels)
            .field("delete_params", &self.delete_params)
            .field("client", &"<kube::Client>")
            .finish()
    }
}
