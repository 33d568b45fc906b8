use std::time::Duration;

use super::{CommandTemplate, EntryPoint, LanguageConfig};

pub fn config() -> LanguageConfig {
    LanguageConfig {
        id: "python",
        name: "Python",
        extension: "py",
        compile: None,
        run: CommandTemplate::new("python3", &["{source}"]),
        timeout: Duration::from_millis(30_000),
        image: Some("python:3.9-alpine"),
        entry_point: EntryPoint::Fixed,
        install_hint: "python3",
    }
}
