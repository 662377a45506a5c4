use serde::{Deserialize, Serialize};

/// Name of the configuration file, looked up in the project directory.
pub const CONFIG_FILE: &str = ".docker-machine-deploy.json";

/// .docker-machine-deploy.json configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// docker-machine name of the deployment target
    pub machine: String,
    /// Compose project name, passed as `-p` to every compose invocation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Compose files layered onto docker-compose.yml by the up stage
    #[serde(rename = "additional-compose-files", default)]
    pub additional_compose_files: Vec<String>,
}

impl DeployConfig {
    /// Load from `.docker-machine-deploy.json` in the given directory.
    ///
    /// A missing file is an error: there is no usable default for
    /// `machine`.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        let content =
            std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                path: config_path.clone(),
                source: e,
            })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })?;
        tracing::debug!(machine = %config.machine, "loaded deploy configuration");
        Ok(config)
    }
}
