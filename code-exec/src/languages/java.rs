use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

use super::{CommandTemplate, EntryPoint, LanguageConfig};

const DEFAULT_CLASS: &str = "Main";

pub fn config() -> LanguageConfig {
    LanguageConfig {
        id: "java",
        name: "Java",
        extension: "java",
        compile: Some(CommandTemplate::new("javac", &["{source}"])),
        run: CommandTemplate::new("java", &["-cp", "{workdir}", "{entry}"]),
        timeout: Duration::from_millis(45_000),
        image: Some("openjdk:11-alpine"),
        entry_point: EntryPoint::PublicClass,
        install_hint: "a JDK",
    }
}

/// Name of the first `public class` in `code`, `Main` when there is none.
///
/// The match is restricted to ASCII identifiers so the name is safe to use
/// as a file name and as a container script token.
pub fn public_class_name(code: &str) -> String {
    static PUBLIC_CLASS: OnceLock<Regex> = OnceLock::new();
    let pattern = PUBLIC_CLASS.get_or_init(|| {
        Regex::new(r"public\s+class\s+([A-Za-z_][A-Za-z0-9_]*)").expect("valid class regex")
    });

    pattern
        .captures(code)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_CLASS.to_string())
}
