//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Mentor Configuration
# Only override what you want to change -- missing fields use defaults.
# The API key is read from GEMINI_API_KEY (or API_KEY), never from this file.

[ai]
# model = "gemini-2.5-flash"
# temperature = 0.8      # 0.0-2.0
# max_tokens = 4096      # 1-65536

[storage]
# key = "air1_mentor_sessions"
# data_dir = "/path/to/sessions"   # default: platform data dir

[logging]
# level = "INFO"         # TRACE, DEBUG, INFO, WARN, ERROR
"##
    .to_string()
}
