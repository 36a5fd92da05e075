//! App manifests.
//!
//! A manifest is authored as YAML and sent to the `apps.manifest.*` methods
//! as a JSON object. Only the top-level shape is checked locally; Slack
//! validates the content.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{SlackError, SlackResult};

/// Default manifest file name.
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.yml";

/// An app manifest, held as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct AppManifest(Value);

impl AppManifest {
    /// Wrap a JSON value. It must be an object.
    pub fn from_value(value: Value) -> SlackResult<Self> {
        if value.is_object() {
            Ok(Self(value))
        } else {
            Err(SlackError::Validation(
                "App manifest must be a mapping at the top level".to_string(),
            ))
        }
    }

    /// Parse a manifest from YAML text.
    pub fn from_yaml_str(yaml: &str) -> SlackResult<Self> {
        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| SlackError::Validation(format!("Invalid manifest YAML: {}", e)))?;
        Self::from_value(value)
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> SlackResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SlackError::Validation(format!(
                "Failed to read manifest {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!("Loaded manifest {}", path.display());
        Self::from_yaml_str(&text)
    }

    /// The manifest as JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// `display_information.name`, if set.
    pub fn display_name(&self) -> Option<&str> {
        self.0
            .get("display_information")
            .and_then(|info| info.get("name"))
            .and_then(Value::as_str)
    }
}

/// Page where a newly built app can be installed to a workspace.
pub fn app_install_url(app_id: &str) -> String {
    format!("https://api.slack.com/apps/{}/oauth", app_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MANIFEST: &str = r#"
display_information:
  name: Beep Boop
features:
  bot_user:
    display_name: beepboop
    always_online: false
oauth_config:
  scopes:
    bot:
      - chat:write
      - chat:write.customize
settings:
  org_deploy_enabled: false
  socket_mode_enabled: false
"#;

    #[test]
    fn test_from_yaml() {
        let manifest = AppManifest::from_yaml_str(MANIFEST).unwrap();
        assert_eq!(manifest.display_name(), Some("Beep Boop"));
        assert_eq!(
            manifest.as_value()["oauth_config"]["scopes"]["bot"],
            json!(["chat:write", "chat:write.customize"])
        );
        assert_eq!(
            manifest.as_value()["settings"]["socket_mode_enabled"],
            json!(false)
        );
    }

    #[test]
    fn test_rejects_non_mapping() {
        assert!(matches!(
            AppManifest::from_yaml_str("- a\n- b\n"),
            Err(SlackError::Validation(_))
        ));
        assert!(matches!(
            AppManifest::from_yaml_str("display_information: [unclosed"),
            Err(SlackError::Validation(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppManifest::load(&dir.path().join(DEFAULT_MANIFEST_FILE)).unwrap_err();
        assert!(err.to_string().contains("manifest.yml"));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_MANIFEST_FILE);
        std::fs::write(&path, MANIFEST).unwrap();
        assert!(AppManifest::load(&path).is_ok());
    }

    #[test]
    fn test_install_url() {
        assert_eq!(
            app_install_url("A0123"),
            "https://api.slack.com/apps/A0123/oauth"
        );
    }
}
