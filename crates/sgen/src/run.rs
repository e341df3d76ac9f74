//! Runs the pipeline described by a [`Config`]: load every stylesheet,
//! link and resolve them, then write the generated Swift files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use sgen_core::generate::FILE_SUFFIX;
use sgen_core::settings::STYLESHEET_MANAGER;
use sgen_core::{
    prepare, GeneratedFile, Generator, ImportSettings, LoadOptions, Loader, Registry, Settings,
    SymbolFont,
};

use crate::config::{file_stem, Config};
use crate::writer::{write_if_changed, Outcome};

/// A generated file and what happened to it on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Display name: the file name without its suffixes.
    pub stylesheet: String,
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Generator settings derived from a configuration.
pub fn settings(config: &Config) -> Settings {
    Settings {
        objc: config.objc,
        namespace: config.namespace.clone(),
        extended_name: config.extended_name.clone(),
        // A lone stylesheet is its own base and is always generated.
        generate_base_style: config.generate_base_style || config.base_style_path.is_none(),
        generate_appearance_proxy_protocol: config.generate_appearance_proxy_protocol,
        generate_file_per_appearance_proxy: config.generate_file_per_appearance_proxy,
        import: config.import.as_ref().map(|import| ImportSettings {
            framework: import.name.clone(),
            stylesheet: file_stem(&import.base_style_path),
            manager_name: STYLESHEET_MANAGER.to_string(),
        }),
        typography: config.typography.clone(),
    }
}

/// Loads, resolves and generates every stylesheet without writing.
pub fn compile(config: &Config) -> Result<Vec<GeneratedFile>> {
    config.check_paths()?;
    let settings = settings(config);
    let fonts = config
        .symbols_font
        .as_ref()
        .map(|font| font.names.clone())
        .unwrap_or_default();

    let loader = |name: &str, is_base: bool| {
        let symbol_font = fonts
            .get(name)
            .cloned()
            .or_else(|| (is_base && !fonts.is_empty()).then(SymbolFont::placeholder));
        Loader::new(LoadOptions {
            typography: config.typography.clone(),
            symbol_font,
        })
    };

    let mut registry = Registry::new();

    let base = config.base_name();
    if let (Some(path), Some(name)) = (&config.base_style_path, &base) {
        let sheet = loader(name, true)
            .load_file(path, name)
            .with_context(|| format!("cannot load base stylesheet {}", path.display()))?;
        registry.register(sheet)?;
    }

    for (path, name) in config.inputs.iter().zip(&config.names) {
        let declaration = match &base {
            Some(base) => format!("{}:{}", name, base),
            None => name.clone(),
        };
        let sheet = loader(name, base.is_none())
            .load_file(path, &declaration)
            .with_context(|| format!("cannot load stylesheet {}", path.display()))?;
        registry.register(sheet)?;
    }

    if let Some(import) = &config.import {
        let name = file_stem(&import.base_style_path);
        let sheet = Loader::new(LoadOptions {
            typography: config.typography.clone(),
            symbol_font: None,
        })
        .load_file(&import.base_style_path, &name)
        .with_context(|| {
            format!(
                "cannot load imported stylesheet {}",
                import.base_style_path.display()
            )
        })?;
        registry.set_imported(sheet);
    }

    registry.link()?;
    prepare(&mut registry, &settings)?;

    let files = Generator::new(&registry, &settings)?.generate_all()?;
    Ok(files)
}

/// Generates every stylesheet and writes the files that changed.
pub fn run(config: &Config) -> Result<Vec<Generated>> {
    let dir = config.output.dir();
    let mut generated = Vec::new();

    for file in compile(config)? {
        let path = dir.join(&file.name);
        let outcome = write_if_changed(&path, &file.content)
            .with_context(|| format!("cannot write {}", path.display()))?;
        match outcome {
            Outcome::Written => log::info!("wrote {}", path.display()),
            Outcome::Unchanged => log::info!("{} is up to date", path.display()),
        }
        generated.push(Generated {
            stylesheet: display_name(&file.name, config.extended_name.as_deref()),
            path,
            outcome,
        });
    }
    Ok(generated)
}

fn display_name(file_name: &str, extended_name: Option<&str>) -> String {
    let name = file_name
        .strip_suffix(FILE_SUFFIX)
        .map(|name| name.trim_end_matches('.'))
        .unwrap_or(file_name);
    extended_name
        .and_then(|extended| name.strip_suffix(&format!(".{}", extended)))
        .unwrap_or(name)
        .to_string()
}
