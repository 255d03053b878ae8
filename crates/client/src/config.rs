use anyhow::Context;
use ims_core::types::DbId;

/// Settings for the `ims-upload` binary, read from the environment.
///
/// | Variable          | Required | Description                         |
/// |-------------------|----------|-------------------------------------|
/// | `IMS_API_URL`     | yes      | Server root, e.g. `http://host:3000` |
/// | `IMS_PROJECT_ID`  | yes      | Project owning the release          |
/// | `IMS_RELEASE_ID`  | yes      | Release receiving the pages         |
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub api_url: String,
    pub project_id: DbId,
    pub release_id: DbId,
}

impl UploadConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));
        let id = |key: &str| -> anyhow::Result<DbId> {
            required(key)?
                .trim()
                .parse()
                .with_context(|| format!("{key} must be an integer id"))
        };

        Ok(Self {
            api_url: required("IMS_API_URL")?,
            project_id: id("IMS_PROJECT_ID")?,
            release_id: id("IMS_RELEASE_ID")?,
        })
    }
}
