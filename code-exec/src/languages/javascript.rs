use std::time::Duration;

use super::{CommandTemplate, EntryPoint, LanguageConfig};

pub fn config() -> LanguageConfig {
    LanguageConfig {
        id: "javascript",
        name: "JavaScript (Node.js)",
        extension: "js",
        compile: None,
        run: CommandTemplate::new("node", &["{source}"]),
        timeout: Duration::from_millis(30_000),
        image: Some("node:16-alpine"),
        entry_point: EntryPoint::Fixed,
        install_hint: "Node.js",
    }
}
