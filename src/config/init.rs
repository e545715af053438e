// ABOUTME: Config scaffolding for new setups.
// ABOUTME: Creates imgdrop.yml template files.

use std::path::Path;

use crate::error::{Error, Result};
use crate::remote::Endpoint;

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, server: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::default();

    if let Some(s) = server {
        Endpoint::parse(s)?;
        config.server = s.to_string();
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"server: {}
endpoints:
  upload_path: {}
  list_path: {}
  images_prefix: {}
storage:
  data_dir: {}
  # Reject backup blobs above this many bytes
  # backup_quota: 5242880
transport:
  mode: http
  # Demo mode without a server:
  # mode: simulated
  # success_rate: 0.8
  # latency: 2s
"#,
        config.server,
        config.endpoints.upload_path,
        config.endpoints.list_path,
        config.endpoints.images_prefix,
        config.storage.data_dir.display(),
    )
}
