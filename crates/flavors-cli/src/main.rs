use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use flavors_core::macros::MacroOptions;
use flavors_core::{init_tracing, init_tracing_with, FileTransformer, FlavorConfig, OutputFormat};
use tracing::info;

fn build_cli() -> Command {
    Command::new("flavors")
        .version(flavors_core::VERSION)
        .about("Expand the flavors build-time macro in JavaScript modules")
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .help("Module file or directory of modules to transform")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .short('o')
                .value_name("PATH")
                .help("Output file, or output directory when INPUT is a directory")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Configuration file to use instead of discovering one")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config-name")
                .long("config-name")
                .value_name("NAME")
                .help("Key the macro configuration is stored under")
                .default_value(flavors_core::CONFIG_NAME),
        )
        .arg(
            Arg::new("macro-source")
                .long("macro-source")
                .value_name("NAME")
                .help("Import source identifying the macro")
                .default_value(flavors_core::macros::DEFAULT_MACRO_SOURCE),
        )
        .arg(
            Arg::new("traverse-limit")
                .long("traverse-limit")
                .value_name("N")
                .help("Most ancestor steps taken looking for a marker's statement")
                .value_parser(value_parser!(usize))
                .default_value("10"),
        )
        .arg(
            Arg::new("emit")
                .long("emit")
                .value_name("FORMAT")
                .help("Output format")
                .value_parser(["source", "ast"])
                .default_value("source"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}

fn macro_options(matches: &ArgMatches) -> MacroOptions {
    let mut options = MacroOptions::new();
    if let Some(name) = matches.get_one::<String>("config-name") {
        options = options.with_config_name(name.as_str());
    }
    if let Some(source) = matches.get_one::<String>("macro-source") {
        options = options.with_macro_source(source.as_str());
    }
    if let Some(limit) = matches.get_one::<usize>("traverse-limit") {
        options = options.with_traverse_limit(*limit);
    }
    options
}

fn output_format(matches: &ArgMatches) -> OutputFormat {
    matches
        .get_one::<String>("emit")
        .and_then(|name| OutputFormat::from_name(name))
        .unwrap_or_default()
}

fn build_transformer(matches: &ArgMatches) -> Result<FileTransformer> {
    let options = macro_options(matches);
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => Some(
            FlavorConfig::load_file(path, &options.config_name)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        ),
        None => None,
    };

    let mut transformer = FileTransformer::new(options).output_format(output_format(matches));
    if let Some(config) = config {
        transformer = transformer.with_config(config);
    }
    Ok(transformer)
}

fn run(matches: &ArgMatches) -> Result<()> {
    let Some(input) = matches.get_one::<PathBuf>("input") else {
        bail!("No input given");
    };
    let out = matches.get_one::<PathBuf>("out");
    let mut transformer = build_transformer(matches)?;

    if input.is_dir() {
        let Some(out) = out else {
            bail!("--out is required when INPUT is a directory");
        };
        let summary = transformer.transform_directory(input, out)?;
        for error in &summary.errors {
            eprintln!("{error}");
        }
        info!(
            processed = summary.files_processed,
            transformed = summary.files_transformed,
            "Done"
        );
        if !summary.success() {
            bail!(
                "{} of {} files failed",
                summary.errors.len(),
                summary.files_processed
            );
        }
        return Ok(());
    }

    transform_single_file(&mut transformer, input, out.map(PathBuf::as_path))
}

fn transform_single_file(
    transformer: &mut FileTransformer,
    input: &Path,
    out: Option<&Path>,
) -> Result<()> {
    if !input.is_file() {
        bail!("Input does not exist: {}", input.display());
    }

    let (output, summary) = transformer.transform_file_to_string(input)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => print!("{output}"),
    }

    info!(
        file = %input.display(),
        imports_rewritten = summary.imports_rewritten,
        literals_substituted = summary.literals_substituted,
        "Expanded"
    );
    Ok(())
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    // Initialize logging
    if matches.get_flag("debug") {
        init_tracing_with("flavors_core=debug,flavors=debug");
    } else {
        init_tracing();
    }

    run(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        build_cli()
            .try_get_matches_from(std::iter::once("flavors").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let matches = parse(&["src/app.js"]);
        let options = macro_options(&matches);
        assert_eq!(options, MacroOptions::default());
        assert_eq!(output_format(&matches), OutputFormat::Source);
        assert!(!matches.get_flag("debug"));
        assert!(matches.get_one::<PathBuf>("out").is_none());
    }

    #[test]
    fn test_all_options() {
        let matches = parse(&[
            "src",
            "--out",
            "dist",
            "--config-name",
            "brand",
            "--macro-source",
            "variants.macro",
            "--traverse-limit",
            "3",
            "--emit",
            "ast",
            "--debug",
        ]);
        let options = macro_options(&matches);
        assert_eq!(options.config_name, "brand");
        assert_eq!(options.macro_source, "variants.macro");
        assert_eq!(options.traverse_limit, 3);
        assert_eq!(output_format(&matches), OutputFormat::Ast);
        assert_eq!(
            matches.get_one::<PathBuf>("out"),
            Some(&PathBuf::from("dist"))
        );
        assert!(matches.get_flag("debug"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(build_cli().try_get_matches_from(["flavors"]).is_err());
        assert!(build_cli()
            .try_get_matches_from(["flavors", "a.js", "--emit", "yaml"])
            .is_err());
        assert!(build_cli()
            .try_get_matches_from(["flavors", "a.js", "--traverse-limit", "deep"])
            .is_err());
    }

    #[test]
    fn test_single_file_with_explicit_config() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("app.js");
        let config = dir.path().join("flavors.json");
        let output = dir.path().join("dist/app.js");
        fs::write(
            &input,
            "import { getFlavor } from \"flavors.macro\";\nconst theme = getFlavor(\"theme\");\n",
        )?;
        fs::write(&config, r#"{ "values": { "theme": "dark" } }"#)?;

        let args = [
            input.to_string_lossy().to_string(),
            "--config".to_string(),
            config.to_string_lossy().to_string(),
            "--out".to_string(),
            output.to_string_lossy().to_string(),
        ];
        let matches = build_cli().try_get_matches_from(
            std::iter::once("flavors".to_string()).chain(args.iter().cloned()),
        )?;
        run(&matches)?;

        assert_eq!(fs::read_to_string(&output)?, "const theme = \"dark\";\n");
        Ok(())
    }

    #[test]
    fn test_directory_requires_out() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let matches = parse(&[dir.path().to_str().unwrap_or_default()]);
        let err = run(&matches).unwrap_err();
        assert!(err.to_string().contains("--out"));
        Ok(())
    }

    #[test]
    fn test_failed_files_fail_the_run() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = tempfile::tempdir()?;
        fs::write(
            dir.path().join("bad.js"),
            "import { getFlavor } from \"flavors.macro\";\ngetFlavor(1, 2);\n",
        )?;
        fs::write(
            dir.path().join("flavors.json"),
            r#"{ "flavors": { "values": {} } }"#,
        )?;

        let config = dir.path().join("flavors.json");
        let matches = parse(&[
            dir.path().to_str().unwrap_or_default(),
            "--out",
            out.path().to_str().unwrap_or_default(),
            "--config",
            config.to_str().unwrap_or_default(),
        ]);
        let err = run(&matches).unwrap_err();
        assert!(err.to_string().contains("1 of 1 files failed"));
        Ok(())
    }
}
