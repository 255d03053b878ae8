//! REST client for the release-management API.
//!
//! One method per endpoint. Every non-2xx response becomes
//! [`ClientError::Api`] carrying the status, the server's message and the
//! raw body.

use ims_core::listing::ListOrder;
use ims_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientError;
use crate::models::{
    Archive, CascadeSummary, Health, NewArchive, NewPage, NewProject, NewRelease, Page, Project,
    ProjectSummary, Release,
};

/// HTTP client for one API server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for a server root, e.g. `http://host:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<Health, ClientError> {
        self.get_json(&format!("{}/health", self.base_url)).await
    }

    // ---- projects ----

    pub async fn list_projects(&self, order: ListOrder) -> Result<Vec<ProjectSummary>, ClientError> {
        let response = self
            .client
            .get(self.api("/projects"))
            .query(&[("order", order.as_str())])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<Project, ClientError> {
        self.post_json(&self.api("/projects"), project).await
    }

    pub async fn get_project(&self, project_id: DbId) -> Result<Project, ClientError> {
        self.get_json(&self.project_url(project_id)).await
    }

    pub async fn update_project(
        &self,
        project_id: DbId,
        project: &NewProject,
    ) -> Result<Project, ClientError> {
        self.put_json(&self.project_url(project_id), project).await
    }

    pub async fn delete_project(&self, project_id: DbId) -> Result<CascadeSummary, ClientError> {
        self.delete_json(&self.project_url(project_id)).await
    }

    // ---- releases ----

    pub async fn list_releases(
        &self,
        project_id: DbId,
        order: ListOrder,
    ) -> Result<Vec<Release>, ClientError> {
        let response = self
            .client
            .get(format!("{}/releases", self.project_url(project_id)))
            .query(&[("order", order.as_str())])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    pub async fn create_release(
        &self,
        project_id: DbId,
        release: &NewRelease,
    ) -> Result<Release, ClientError> {
        self.post_json(&format!("{}/releases", self.project_url(project_id)), release)
            .await
    }

    pub async fn get_release(&self, project_id: DbId, release_id: DbId) -> Result<Release, ClientError> {
        self.get_json(&self.release_url(project_id, release_id)).await
    }

    pub async fn update_release(
        &self,
        project_id: DbId,
        release_id: DbId,
        release: &NewRelease,
    ) -> Result<Release, ClientError> {
        self.put_json(&self.release_url(project_id, release_id), release)
            .await
    }

    pub async fn delete_release(
        &self,
        project_id: DbId,
        release_id: DbId,
    ) -> Result<CascadeSummary, ClientError> {
        self.delete_json(&self.release_url(project_id, release_id))
            .await
    }

    // ---- pages ----

    pub async fn list_pages(&self, project_id: DbId, release_id: DbId) -> Result<Vec<Page>, ClientError> {
        self.get_json(&self.pages_url(project_id, release_id)).await
    }

    /// Upload one page. `data` is the base64 image (a `data:` URL is accepted too).
    pub async fn upload_page(
        &self,
        project_id: DbId,
        release_id: DbId,
        name: &str,
        data: String,
    ) -> Result<Page, ClientError> {
        self.post_json(&self.pages_url(project_id, release_id), &NewPage { name, data })
            .await
    }

    pub async fn get_page(
        &self,
        project_id: DbId,
        release_id: DbId,
        page_id: DbId,
    ) -> Result<Page, ClientError> {
        self.get_json(&self.page_url(project_id, release_id, page_id))
            .await
    }

    pub async fn update_page(
        &self,
        project_id: DbId,
        release_id: DbId,
        page_id: DbId,
        name: &str,
        data: String,
    ) -> Result<Page, ClientError> {
        self.put_json(
            &self.page_url(project_id, release_id, page_id),
            &NewPage { name, data },
        )
        .await
    }

    /// Delete a page, returning its last metadata.
    pub async fn delete_page(
        &self,
        project_id: DbId,
        release_id: DbId,
        page_id: DbId,
    ) -> Result<Page, ClientError> {
        self.delete_json(&self.page_url(project_id, release_id, page_id))
            .await
    }

    /// Download a page's stored image bytes.
    pub async fn page_data(
        &self,
        project_id: DbId,
        release_id: DbId,
        page_id: DbId,
    ) -> Result<Vec<u8>, ClientError> {
        self.get_bytes(&format!(
            "{}/data",
            self.page_url(project_id, release_id, page_id)
        ))
        .await
    }

    // ---- archive ----

    pub async fn get_archive(&self, project_id: DbId, release_id: DbId) -> Result<Archive, ClientError> {
        self.get_json(&self.archive_url(project_id, release_id)).await
    }

    /// Build the release archive from `page_ids`, in that order.
    pub async fn create_archive(
        &self,
        project_id: DbId,
        release_id: DbId,
        page_ids: &[DbId],
    ) -> Result<Archive, ClientError> {
        self.post_json(
            &self.archive_url(project_id, release_id),
            &NewArchive { page_ids },
        )
        .await
    }

    pub async fn delete_archive(
        &self,
        project_id: DbId,
        release_id: DbId,
    ) -> Result<Archive, ClientError> {
        self.delete_json(&self.archive_url(project_id, release_id))
            .await
    }

    /// Download the archive's zip bundle.
    pub async fn archive_data(&self, project_id: DbId, release_id: DbId) -> Result<Vec<u8>, ClientError> {
        self.get_bytes(&format!("{}/data", self.archive_url(project_id, release_id)))
            .await
    }

    // ---- URLs ----

    fn api(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    fn project_url(&self, project_id: DbId) -> String {
        self.api(&format!("/projects/{project_id}"))
    }

    fn release_url(&self, project_id: DbId, release_id: DbId) -> String {
        format!("{}/releases/{release_id}", self.project_url(project_id))
    }

    fn pages_url(&self, project_id: DbId, release_id: DbId) -> String {
        format!("{}/pages", self.release_url(project_id, release_id))
    }

    fn page_url(&self, project_id: DbId, release_id: DbId, page_id: DbId) -> String {
        format!("{}/{page_id}", self.pages_url(project_id, release_id))
    }

    fn archive_url(&self, project_id: DbId, release_id: DbId) -> String {
        format!("{}/archive", self.release_url(project_id, release_id))
    }

    // ---- private helpers ----

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let response = self.client.get(url).send().await?;
        Self::parse_response(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.client.post(url).json(body).send().await?;
        Self::parse_response(response).await
    }

    async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.client.put(url).json(body).send().await?;
        Self::parse_response(response).await
    }

    async fn delete_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let response = self.client.delete(url).send().await?;
        Self::parse_response(response).await
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Return the response unchanged on a 2xx status, otherwise the uniform
    /// [`ClientError::Api`] failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let data = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::from_response_body(status.as_u16(), data));
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
