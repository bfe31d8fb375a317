use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Location of the property CSV. The API key is deliberately not part
    /// of this config — credential loading belongs to the host bootstrap.
    pub dataset_path: PathBuf,
    /// Model name for the NLU collaborator, e.g. "gemini-2.5-flash".
    pub model: String,
    /// Number of trailing turns included in general-chat prompts.
    pub history_window: usize,
    /// Maximum property cards attached to one assistant turn.
    pub max_cards: usize,
    /// Result sample size handed to the summary prompt.
    pub summary_sample: usize,
}

impl AssistantConfig {
    /// Validate config values, returning errors for clearly broken
    /// configurations.
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".into());
        }
        if self.history_window == 0 {
            return Err("history_window must be > 0".into());
        }
        if self.max_cards == 0 {
            return Err("max_cards must be > 0".into());
        }
        if self.summary_sample == 0 {
            return Err("summary_sample must be > 0".into());
        }
        Ok(())
    }

    /// Load config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        let dataset_path = if let Ok(env_path) = std::env::var("DATASET_PATH") {
            PathBuf::from(env_path)
        } else if Path::new("merged_property_dataset.csv").exists() {
            PathBuf::from("merged_property_dataset.csv")
        } else {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("estate-chat")
                .join("merged_property_dataset.csv")
        };

        Self {
            dataset_path,
            model: "gemini-2.5-flash".to_string(),
            history_window: 8,
            max_cards: 6,
            summary_sample: 3,
        }
    }
}
