use std::time::Duration;

use super::{CommandTemplate, EntryPoint, LanguageConfig};

pub fn config() -> LanguageConfig {
    LanguageConfig {
        id: "c",
        name: "C",
        extension: "c",
        compile: Some(CommandTemplate::new(
            "gcc",
            &["-o", "{artifact}", "{source}"],
        )),
        run: CommandTemplate::new("{artifact}", &[]),
        timeout: Duration::from_millis(45_000),
        image: Some("gcc:9"),
        entry_point: EntryPoint::Fixed,
        install_hint: "GCC",
    }
}
