/// Configuration for tracing initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub environment: String,
    pub level: String,
    pub json_format: bool,
}

impl TracingConfig {
    pub fn new(environment: impl Into<String>, level: impl Into<String>, json_format: bool) -> Self {
        Self {
            environment: environment.into(),
            level: level.into(),
            json_format,
        }
    }

    /// `LOG_FORMAT=json` forces JSON output regardless of settings.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.json_format = format.eq_ignore_ascii_case("json");
        }
        self
    }

    pub fn default_directives(&self) -> String {
        format!("{},scribeflow={},tower_http=debug", self.level, self.level)
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::new("local", "info", false)
    }
}
