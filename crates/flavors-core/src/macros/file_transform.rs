/*!
# FileTransformer - File-based Macro Expansion

Reads JavaScript modules, expands the flavors macro in each and writes the
result. Configuration is either given explicitly or discovered next to
every file, the way the macro would find it at build time.
*/

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};

use crate::ast::{SyntaxTree, ToSource};
use crate::config::{discover, FlavorConfig};
use crate::parser::create_parser;

use super::expander::{ExpansionSummary, FlavorsMacro};
use super::rules::RuleStats;
use super::MacroOptions;

/// How an expanded module is written out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// JavaScript source
    #[default]
    Source,
    /// The syntax tree as pretty-printed JSON
    Ast,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "source" | "js" => Some(OutputFormat::Source),
            "ast" | "json" => Some(OutputFormat::Ast),
            _ => None,
        }
    }

    pub fn render(self, tree: &SyntaxTree) -> Result<String> {
        match self {
            OutputFormat::Source => Ok(tree.to_source()),
            OutputFormat::Ast => {
                serde_json::to_string_pretty(tree).context("Failed to serialize syntax tree")
            }
        }
    }
}

/// File and directory driver for [`FlavorsMacro`]
pub struct FileTransformer {
    expander: FlavorsMacro,
    config: Option<FlavorConfig>,
    source_extensions: Vec<String>,
    output_format: OutputFormat,
    preserve_structure: bool,
}

impl FileTransformer {
    pub fn new(options: MacroOptions) -> Self {
        Self {
            expander: FlavorsMacro::new(options),
            config: None,
            source_extensions: ["js", "mjs", "cjs", "jsx"]
                .into_iter()
                .map(String::from)
                .collect(),
            output_format: OutputFormat::Source,
            preserve_structure: true,
        }
    }

    /// Use this configuration for every file instead of discovering one
    pub fn with_config(mut self, config: FlavorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the file extensions to process
    pub fn source_extensions(mut self, extensions: Vec<String>) -> Self {
        self.source_extensions = extensions;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Whether to preserve directory structure in output
    pub fn preserve_structure(mut self, preserve: bool) -> Self {
        self.preserve_structure = preserve;
        self
    }

    pub fn options(&self) -> &MacroOptions {
        self.expander.options()
    }

    /// Get expansion statistics
    pub fn stats(&self) -> &std::collections::HashMap<String, RuleStats> {
        self.expander.stats()
    }

    /// Configuration applying to `source_file`
    pub fn config_for(&self, source_file: &Path) -> Result<FlavorConfig> {
        if let Some(config) = &self.config {
            return Ok(config.clone());
        }

        let start = source_file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        match discover(start, &self.options().config_name)? {
            Some(loaded) => {
                debug!(file = %source_file.display(), config = %loaded.source.display(), "Using discovered configuration");
                Ok(loaded.config)
            }
            None => {
                warn!(file = %source_file.display(), "No flavors configuration found, using an empty one");
                Ok(FlavorConfig::default())
            }
        }
    }

    /// Expand the macro in a module given as text
    pub fn transform_source(
        &mut self,
        source: &str,
        config: &FlavorConfig,
    ) -> Result<(String, ExpansionSummary)> {
        let mut parser = create_parser("javascript")?;
        let mut tree = parser.parse(source)?;
        let summary = self.expander.expand(&mut tree, config)?;
        Ok((self.output_format.render(&tree)?, summary))
    }

    /// Parse a file and expand the macro in its tree
    pub fn expand_file(&mut self, source_file: &Path) -> Result<(SyntaxTree, ExpansionSummary)> {
        let mut parser = create_parser("javascript")?;
        let mut tree = parser.parse_file(source_file)?;

        let config = self.config_for(source_file)?;
        let summary = self
            .expander
            .expand(&mut tree, &config)
            .with_context(|| format!("Failed to expand flavors macro in {}", source_file.display()))?;
        Ok((tree, summary))
    }

    /// Expand a file and render the result without writing it
    pub fn transform_file_to_string(
        &mut self,
        source_file: &Path,
    ) -> Result<(String, ExpansionSummary)> {
        let (tree, summary) = self.expand_file(source_file)?;
        Ok((self.output_format.render(&tree)?, summary))
    }

    /// Transform a single file
    pub fn transform_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        source_file: P,
        output_file: Q,
    ) -> Result<FileTransformationSummary> {
        let source_path = source_file.as_ref();
        let output_path = output_file.as_ref();

        let (output_content, expansion) = self.transform_file_to_string(source_path)?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, output_content)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        debug!(from = %source_path.display(), to = %output_path.display(), "Transformed file");

        Ok(FileTransformationSummary {
            files_processed: 1,
            files_transformed: u64::from(!expansion.is_noop()),
            errors: Vec::new(),
            expansion,
        })
    }

    /// Transform all matching files in a directory
    pub fn transform_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        source_dir: P,
        output_dir: Q,
    ) -> Result<FileTransformationSummary> {
        let source_path = source_dir.as_ref();
        let output_path = output_dir.as_ref();

        if !source_path.is_dir() {
            return Err(anyhow!(
                "Source directory does not exist: {}",
                source_path.display()
            ));
        }

        fs::create_dir_all(output_path)?;

        let mut summary = FileTransformationSummary::new();
        self.transform_directory_recursive(source_path, output_path, source_path, &mut summary)?;

        info!(
            processed = summary.files_processed,
            transformed = summary.files_transformed,
            errors = summary.errors.len(),
            "Finished transforming directory"
        );
        for stats in self.expander.stats().values() {
            debug!(
                rule = %stats.rule_name,
                applications = stats.applications,
                errors = stats.errors,
                success_rate = stats.success_rate(),
                "Rule statistics"
            );
        }
        Ok(summary)
    }

    fn transform_directory_recursive(
        &mut self,
        current_dir: &Path,
        output_dir: &Path,
        source_root: &Path,
        summary: &mut FileTransformationSummary,
    ) -> Result<()> {
        let mut entries = fs::read_dir(current_dir)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for path in entries {
            if path == output_dir {
                continue;
            }

            if path.is_dir() {
                if is_skipped_dir(&path) {
                    continue;
                }
                self.transform_directory_recursive(&path, output_dir, source_root, summary)?;
            } else if self.should_process_file(&path) {
                let output_file = self.output_path_for(&path, output_dir, source_root)?;

                match self.transform_file(&path, &output_file) {
                    Ok(file_summary) => summary.merge(file_summary),
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "Failed to transform file");
                        summary.files_processed += 1;
                        summary
                            .errors
                            .push(format!("Error processing {}: {e:#}", path.display()));
                    }
                }
            }
        }

        Ok(())
    }

    fn output_path_for(
        &self,
        path: &Path,
        output_dir: &Path,
        source_root: &Path,
    ) -> Result<std::path::PathBuf> {
        let output_file = if self.preserve_structure {
            output_dir.join(path.strip_prefix(source_root)?)
        } else {
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("No file name in {}", path.display()))?;
            output_dir.join(file_name)
        };

        Ok(match self.output_format {
            OutputFormat::Source => output_file,
            OutputFormat::Ast => output_file.with_extension("json"),
        })
    }

    /// Check if a file should be processed based on its extension
    pub fn should_process_file(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension() {
            let ext_str = extension.to_string_lossy().to_lowercase();
            self.source_extensions
                .iter()
                .any(|ext| ext.to_lowercase() == ext_str)
        } else {
            false
        }
    }
}

impl Default for FileTransformer {
    fn default() -> Self {
        Self::new(MacroOptions::default())
    }
}

fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == "node_modules" || name.starts_with('.'))
}

/// Summary of file transformation results
#[derive(Debug, Default)]
pub struct FileTransformationSummary {
    pub files_processed: u64,
    /// Files in which the macro changed something
    pub files_transformed: u64,
    pub errors: Vec<String>,
    pub expansion: ExpansionSummary,
}

impl FileTransformationSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: FileTransformationSummary) {
        self.files_processed += other.files_processed;
        self.files_transformed += other.files_transformed;
        self.errors.extend(other.errors);
        self.expansion.merge(other.expansion);
    }

    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}
