use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::trends::SCOPE_ALL;
use crate::ConfigError;

/// One target profile to scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Public profile identifier, the path segment after `/in/`.
    pub id: String,
    pub name: Option<String>,
    /// Style exemplars and owner-scoped trends are drawn from this profile.
    #[serde(default)]
    pub owner: bool,
}

impl ProfileConfig {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfilesFile {
    pub profiles: Vec<ProfileConfig>,
}

impl ProfilesFile {
    /// The profile marked `owner: true`, if any.
    #[must_use]
    pub fn owner(&self) -> Option<&ProfileConfig> {
        self.profiles.iter().find(|p| p.owner)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ProfileConfig> {
        self.profiles.iter().find(|p| p.id == id)
    }
}

/// Returns `true` if `id` can be used as a single URL path segment.
#[must_use]
pub fn is_valid_profile_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '%' | '.'))
}

/// Load and validate the profiles configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_profiles(path: &Path) -> Result<ProfilesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProfilesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let profiles_file: ProfilesFile = serde_yaml::from_str(&content)?;

    validate_profiles(&profiles_file)?;

    Ok(profiles_file)
}

fn validate_profiles(profiles_file: &ProfilesFile) -> Result<(), ConfigError> {
    if profiles_file.profiles.is_empty() {
        return Err(ConfigError::Validation(
            "at least one profile must be configured".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    let mut owners = 0usize;

    for profile in &profiles_file.profiles {
        if !is_valid_profile_id(&profile.id) {
            return Err(ConfigError::Validation(format!(
                "profile id '{}' must be non-empty and contain only letters, digits, '-', '_', '.', or '%'",
                profile.id
            )));
        }

        if profile.id.eq_ignore_ascii_case(SCOPE_ALL) {
            return Err(ConfigError::Validation(format!(
                "profile id '{}' is reserved for the all-profiles trend scope",
                profile.id
            )));
        }

        if !seen_ids.insert(profile.id.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate profile id: '{}'",
                profile.id
            )));
        }

        if profile.owner {
            owners += 1;
        }
    }

    if owners > 1 {
        return Err(ConfigError::Validation(format!(
            "at most one profile may be marked owner; found {owners}"
        )));
    }

    Ok(())
}
