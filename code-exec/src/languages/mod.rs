//! Language configuration registry

mod c;
mod cpp;
mod java;
mod javascript;
mod python;

use serde::Serialize;
use std::time::Duration;
use tracing::info;
use which::which;

use crate::error::Error;

/// Program plus argument template. Arguments may contain the placeholders
/// `{source}`, `{artifact}`, `{entry}` and `{workdir}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

/// Concrete values substituted into a [`CommandTemplate`].
#[derive(Debug, Clone)]
pub struct Placeholders {
    pub source: String,
    pub artifact: String,
    pub entry: String,
    pub workdir: String,
}

impl Placeholders {
    fn apply(&self, template: &str) -> String {
        template
            .replace("{source}", &self.source)
            .replace("{artifact}", &self.artifact)
            .replace("{entry}", &self.entry)
            .replace("{workdir}", &self.workdir)
    }
}

impl CommandTemplate {
    pub const fn new(program: &'static str, args: &'static [&'static str]) -> Self {
        Self { program, args }
    }

    /// Render into a program and argument vector.
    pub fn render(&self, values: &Placeholders) -> (String, Vec<String>) {
        (
            values.apply(self.program),
            self.args.iter().map(|arg| values.apply(arg)).collect(),
        )
    }

    /// Whether the program is produced by the execution itself.
    pub fn is_artifact(&self) -> bool {
        self.program.starts_with('{')
    }
}

/// How the source file and the program entry point are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// `main.<ext>`
    Fixed,
    /// Named after the first `public class` declaration, `Main` when absent
    PublicClass,
}

pub const DEFAULT_ENTRY: &str = "main";
pub const ARTIFACT_NAME: &str = "program";

/// Static, immutable configuration of one language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub extension: &'static str,
    pub compile: Option<CommandTemplate>,
    pub run: CommandTemplate,
    pub timeout: Duration,
    /// Container image used by the remote strategy
    pub image: Option<&'static str>,
    pub entry_point: EntryPoint,
    /// Package to suggest when the toolchain is missing
    pub install_hint: &'static str,
}

impl LanguageConfig {
    pub fn is_compiled(&self) -> bool {
        self.compile.is_some()
    }

    /// Entry-point identifier for `code`.
    pub fn entry_name(&self, code: &str) -> String {
        match self.entry_point {
            EntryPoint::Fixed => DEFAULT_ENTRY.to_string(),
            EntryPoint::PublicClass => java::public_class_name(code),
        }
    }

    pub fn source_file_name(&self, code: &str) -> String {
        format!("{}.{}", self.entry_name(code), self.extension)
    }
}

/// Availability of the programs a language needs on this host.
pub trait ToolCheck {
    fn required_tools(&self) -> Vec<&'static str>;

    fn missing_tools(&self) -> Vec<&'static str> {
        self.required_tools()
            .into_iter()
            .filter(|tool| which(tool).is_err())
            .collect()
    }

    fn check_tools(&self) -> Result<(), Error>;
}

impl ToolCheck for LanguageConfig {
    fn required_tools(&self) -> Vec<&'static str> {
        self.compile
            .iter()
            .chain(std::iter::once(&self.run))
            .filter(|command| !command.is_artifact())
            .map(|command| command.program)
            .collect()
    }

    fn check_tools(&self) -> Result<(), Error> {
        match self.missing_tools().first() {
            None => Ok(()),
            Some(tool) => {
                let role = match &self.compile {
                    Some(compile) if compile.program == *tool => "compiler",
                    _ => "interpreter",
                };
                Err(Error::Infrastructure(format!(
                    "{} {} not found. Please install {} to run {} code.",
                    tool, role, self.install_hint, self.id
                )))
            }
        }
    }
}

/// Read-only lookup table of supported languages.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

impl LanguageRegistry {
    pub fn new(languages: Vec<LanguageConfig>) -> Self {
        Self { languages }
    }

    /// Python, JavaScript, C, C++ and Java.
    pub fn builtin() -> Self {
        Self::new(vec![
            python::config(),
            javascript::config(),
            c::config(),
            cpp::config(),
            java::config(),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|language| language.id == id)
    }

    pub fn all(&self) -> &[LanguageConfig] {
        &self.languages
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Display entry for a language, as served to editors.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub extension: &'static str,
    pub timeout_ms: u64,
    pub compiled: bool,
}

impl From<&LanguageConfig> for LanguageInfo {
    fn from(config: &LanguageConfig) -> Self {
        Self {
            id: config.id,
            name: config.name,
            extension: config.extension,
            timeout_ms: config.timeout.as_millis() as u64,
            compiled: config.is_compiled(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub language: &'static str,
    pub missing: Vec<&'static str>,
}

impl ToolStatus {
    pub fn available(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check every registered language's toolchain and log the outcome.
pub fn toolchain_report(registry: &LanguageRegistry) -> Vec<ToolStatus> {
    registry
        .all()
        .iter()
        .map(|config| {
            let status = ToolStatus {
                language: config.id,
                missing: config.missing_tools(),
            };
            if status.available() {
                info!("Toolchain for {}: available", config.name);
            } else {
                info!(
                    "Toolchain for {}: missing {} (install {})",
                    config.name,
                    status.missing.join(", "),
                    config.install_hint
                );
            }
            status
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn skip_if_not_available(tools: &[&str]) -> bool {
    let missing: Vec<_> = tools
        .iter()
        .filter(|tool| which(tool).is_err())
        .map(|s| (*s).to_string())
        .collect();

    if !missing.is_empty() {
        eprintln!("Skipping test: {} not available", missing.join(", "));
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let registry = LanguageRegistry::builtin();
        let expected = [
            ("python", "py", 30_000, false),
            ("javascript", "js", 30_000, false),
            ("c", "c", 45_000, true),
            ("cpp", "cpp", 45_000, true),
            ("java", "java", 45_000, true),
        ];
        for (id, extension, timeout_ms, compiled) in expected {
            let config = registry.get(id).unwrap();
            assert_eq!(config.extension, extension);
            assert_eq!(config.timeout, Duration::from_millis(timeout_ms));
            assert_eq!(config.is_compiled(), compiled);
            assert!(config.image.is_some());
        }
        assert!(registry.get("cobol").is_none());
        assert!(registry.get("Python").is_none());
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        let template = CommandTemplate::new("{artifact}", &["-o", "{artifact}", "{source}"]);
        let values = Placeholders {
            source: "/w/main.c".into(),
            artifact: "/w/program".into(),
            entry: "main".into(),
            workdir: "/w".into(),
        };
        let (program, args) = template.render(&values);
        assert_eq!(program, "/w/program");
        assert_eq!(args, vec!["-o", "/w/program", "/w/main.c"]);
        assert!(template.is_artifact());
    }

    #[test]
    fn test_required_tools_skip_artifacts() {
        let registry = LanguageRegistry::builtin();
        assert_eq!(registry.get("cpp").unwrap().required_tools(), vec!["g++"]);
        assert_eq!(
            registry.get("java").unwrap().required_tools(),
            vec!["javac", "java"]
        );
        assert_eq!(registry.get("python").unwrap().required_tools(), vec!["python3"]);
    }

    #[test]
    fn test_missing_tool_message() {
        let mut config = LanguageRegistry::builtin().get("c").unwrap().clone();
        config.compile = Some(CommandTemplate::new("definitely-not-a-compiler", &[]));
        let err = config.check_tools().unwrap_err();
        assert_eq!(
            err.to_string(),
            "definitely-not-a-compiler compiler not found. Please install GCC to run c code."
        );
    }
}
