use std::env;
use std::str::FromStr;

/// Retrieves an environment variable and splits it into a vector of strings based on a delimiter.
///
/// Empty entries are dropped, so an unset variable yields an empty vector.
///
/// # Arguments
/// - `var`: The name of the environment variable.
/// - `delimiter`: The character to split the environment variable's value by.
///
/// # Returns
/// - `Vec<String>`
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    env::var(var)
        .unwrap_or_default()
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Retrieves an environment variable, falling back to `default` when unset.
pub fn get_env_var_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

/// Parses an environment variable, falling back to `default` when unset or unparsable.
pub fn get_env_var_parsed<T: FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Reads a boolean flag; `0`, `false`, `no` and `off` disable it.
pub fn get_env_flag(var: &str, default: bool) -> bool {
    match env::var(var) {
        Ok(value) => !matches!(
            value.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_as_vec_drops_empty_entries() {
        env::set_var("MINERVA_TEST_VEC", " Seguridad ;; Local ;");
        assert_eq!(
            get_env_var_as_vec("MINERVA_TEST_VEC", ';'),
            vec!["Seguridad".to_string(), "Local".to_string()]
        );
        assert!(get_env_var_as_vec("MINERVA_TEST_VEC_UNSET", ';').is_empty());
    }

    #[test]
    fn test_env_var_parsed_falls_back() {
        env::set_var("MINERVA_TEST_PARSED", "not a number");
        assert_eq!(get_env_var_parsed("MINERVA_TEST_PARSED", 3usize), 3);
        env::set_var("MINERVA_TEST_PARSED_OK", " 8 ");
        assert_eq!(get_env_var_parsed("MINERVA_TEST_PARSED_OK", 3usize), 8);
    }

    #[test]
    fn test_env_flag() {
        env::set_var("MINERVA_TEST_FLAG", "off");
        assert!(!get_env_flag("MINERVA_TEST_FLAG", true));
        assert!(get_env_flag("MINERVA_TEST_FLAG_UNSET", true));
    }
}
