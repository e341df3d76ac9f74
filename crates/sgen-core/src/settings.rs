//! Options shared by resolution and generation.

/// Default name of the generated stylesheet manager class.
pub const STYLESHEET_MANAGER: &str = "StylesheetManager";

/// The framework an extended stylesheet builds on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    /// Swift module to import.
    pub framework: String,
    /// Name of the imported stylesheet (its base stylesheet class).
    pub stylesheet: String,
    /// Stylesheet manager class of the framework.
    pub manager_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Emit `@objc` annotations and `Int`-backed enums.
    pub objc: bool,
    /// Wrap stylesheet classes in this enum.
    pub namespace: Option<String>,
    /// Suffix of generated file names and prefix of the manager class.
    pub extended_name: Option<String>,
    /// Emit a file for the base stylesheet.
    pub generate_base_style: bool,
    pub generate_appearance_proxy_protocol: bool,
    pub generate_file_per_appearance_proxy: bool,
    pub import: Option<ImportSettings>,
    /// Configured text styles, in addition to the builtin ones.
    pub typography: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            objc: false,
            namespace: None,
            extended_name: None,
            generate_base_style: true,
            generate_appearance_proxy_protocol: true,
            generate_file_per_appearance_proxy: false,
            import: None,
            typography: Vec::new(),
        }
    }
}

impl Settings {
    /// Name of the generated stylesheet manager class.
    ///
    /// An extended stylesheet gets its own manager, prefixed with the
    /// extended name, next to the framework's.
    pub fn manager_name(&self) -> String {
        match (&self.extended_name, &self.import) {
            (Some(extended), Some(_)) => format!("{}{}", extended, STYLESHEET_MANAGER),
            _ => STYLESHEET_MANAGER.to_string(),
        }
    }

    /// Manager class of the imported framework, if any.
    pub fn import_manager(&self) -> Option<&str> {
        self.import.as_ref().map(|import| import.manager_name.as_str())
    }

    /// Prefix for types of the imported framework, used when a namespace
    /// is configured.
    pub fn import_prefix(&self) -> String {
        match (&self.import, &self.namespace) {
            (Some(import), Some(_)) => format!("{}.", import.framework),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_names() {
        let mut settings = Settings::default();
        assert_eq!(settings.manager_name(), "StylesheetManager");
        assert_eq!(settings.import_manager(), None);

        settings.extended_name = Some("Outlook".into());
        assert_eq!(settings.manager_name(), "StylesheetManager");

        settings.import = Some(ImportSettings {
            framework: "Fluent".into(),
            stylesheet: "FluentStyle".into(),
            manager_name: STYLESHEET_MANAGER.into(),
        });
        assert_eq!(settings.manager_name(), "OutlookStylesheetManager");
        assert_eq!(settings.import_manager(), Some("StylesheetManager"));
        assert_eq!(settings.import_prefix(), "");
        settings.namespace = Some("Outlook".into());
        assert_eq!(settings.import_prefix(), "Fluent.");
    }
}
