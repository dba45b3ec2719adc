use crate::core::config::data::{path_display, Config};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        for line in self.describe() {
            println!("  {line}");
        }
    }

    /// One `key: value` line per setting, marking defaults.
    pub fn describe(&self) -> Vec<String> {
        vec![
            match &self.api_base_url {
                Some(url) => format!("api-base-url: {url}"),
                None => format!("api-base-url: (unset, using {})", self.api_base_url()),
            },
            match self.request_timeout_secs {
                Some(secs) => format!("request-timeout: {secs}s"),
                None => format!(
                    "request-timeout: (unset, using {}s)",
                    self.request_timeout().as_secs()
                ),
            },
            match &self.export_dir {
                Some(dir) => format!("export-dir: {}", path_display(dir)),
                None => "export-dir: (unset, using working directory)".to_string(),
            },
        ]
    }
}
