/// True if the environment variable is set and not empty. False otherwise.
pub fn is_env_set(env_var: &str) -> bool {
    match std::env::var(env_var) {
        Ok(val) => !val.trim().is_empty(),
        Err(_) => false,
    }
}

/// The trimmed value of the environment variable, or the default if it's unset or blank.
pub fn env_or(env_var: &str, default: &str) -> String {
    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
        _ => default.to_string(),
    }
}
