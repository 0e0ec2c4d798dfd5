use std::path::PathBuf;

use mnemo_core::config::home_dir;

const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Resolve the classifier API key: environment first, then well-known
/// local files. `None` silently disables classification; it is never an
/// error, the surrounding pipeline keeps running.
pub fn resolve_api_key() -> Option<String> {
    resolve_from(std::env::var(API_KEY_ENV).ok(), &candidate_files())
}

fn candidate_files() -> Vec<PathBuf> {
    let Some(home) = home_dir() else {
        return Vec::new();
    };
    vec![
        home.join(".mnemo").join("api_key"),
        home.join(".config").join("mnemo").join("api_key"),
    ]
}

fn resolve_from(env_value: Option<String>, files: &[PathBuf]) -> Option<String> {
    if let Some(key) = env_value {
        let key = key.trim();
        if !key.is_empty() {
            return Some(key.to_string());
        }
    }
    for path in files {
        if let Ok(content) = std::fs::read_to_string(path) {
            let key = content.trim();
            if !key.is_empty() {
                return Some(key.to_string());
            }
        }
    }
    None
}
