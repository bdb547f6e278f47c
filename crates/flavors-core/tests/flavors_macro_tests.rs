/*!
# Flavors Macro Integration Tests

End-to-end expansion of modules through `FlavorsMacro`.
*/

use flavors_core::macros::{resolve_flavor, resolve_import_path, MacroOptions};
use flavors_core::{
    parse_module, FlavorConfig, FlavorsError, FlavorsMacro, MacroError, MacroReferences,
    ToSource,
};
use pretty_assertions::assert_eq;

fn config() -> FlavorConfig {
    FlavorConfig::new()
        .with_import("x", "x-flavored")
        .with_import("./theme", "./theme.dark")
        .with_value("theme", "dark")
        .with_value("layout", "compact")
}

#[test]
fn test_resolvers_follow_the_mapping() {
    let config = config();
    for path in ["x", "./theme", "y", ""] {
        let resolution = resolve_import_path(path, &config);
        match config.imports.get(path) {
            Some(mapped) => {
                assert!(resolution.changed);
                assert_eq!(&resolution.value, mapped);
            }
            None => {
                assert!(!resolution.changed);
                assert_eq!(resolution.value, path);
            }
        }
    }
    assert_eq!(resolve_flavor("layout", &config), "compact");
    assert_eq!(resolve_flavor("nope", &config), "");
}

#[test]
fn test_import_rewrite_end_to_end() -> anyhow::Result<()> {
    let source = r#"import flavors from "flavors.macro";
import A from "x";
import B from "y";
flavors();
"#;
    let output = FlavorsMacro::default().expand_source(source, &config())?;
    assert_eq!(output, "import A from 'x-flavored';\nimport B from \"y\";\n");
    Ok(())
}

#[test]
fn test_literal_substitution_end_to_end() -> anyhow::Result<()> {
    let source = r#"import { getFlavor } from "flavors.macro";
const theme = getFlavor("theme");
const missing = getFlavor("missing-key");
export default { theme, layout: getFlavor('layout') };
"#;
    let output = FlavorsMacro::default().expand_source(source, &config())?;
    assert_eq!(
        output,
        "const theme = \"dark\";\n\
         const missing = \"\";\n\
         export default { theme, layout: \"compact\" };\n"
    );
    Ok(())
}

#[test]
fn test_both_markers_in_one_module() -> anyhow::Result<()> {
    let source = r#"import React from "react";
import flavors, { getFlavor } from "flavors.macro";
import Theme from "./theme";
flavors();

function App() {
  if (getFlavor("layout") === "compact") {
    return Theme;
  }
  return null;
}
"#;
    let mut tree = parse_module(source)?;
    let summary = FlavorsMacro::default().expand(&mut tree, &config())?;

    assert_eq!(summary.imports_rewritten, 1);
    assert_eq!(summary.literals_substituted, 1);
    assert_eq!(summary.markers_removed, 1);
    assert_eq!(summary.macro_imports_removed, 1);
    assert_eq!(
        tree.to_source(),
        "import React from \"react\";\n\
         import Theme from './theme.dark';\n\
         \n\
         function App() {\n\
         \x20 if (\"compact\" === \"compact\") {\n\
         \x20   return Theme;\n\
         \x20 }\n\
         \x20 return null;\n\
         }\n"
    );
    Ok(())
}

#[test]
fn test_comments_and_layout_survive_expansion() -> anyhow::Result<()> {
    let source = "// @license MIT\n\
                  import flavors from \"flavors.macro\";\n\
                  import A from \"./a\"; /* keep */\n\
                  flavors();\n\
                  const x = import(/* webpackChunkName: \"c\" */ \"./c\");";
    let config = FlavorConfig::new().with_import("./a", "./a.pro");
    let output = FlavorsMacro::default().expand_source(source, &config)?;
    assert_eq!(
        output,
        "// @license MIT\n\
         import A from './a.pro'; /* keep */\n\
         const x = import(/* webpackChunkName: \"c\" */ \"./c\");"
    );
    Ok(())
}

#[test]
fn test_expansion_in_module_with_modern_syntax() -> anyhow::Result<()> {
    let source = r#"import flavors, { getFlavor } from "flavors.macro";
import Theme from "./theme";
flavors();

export class Cart extends Theme {
  #items = new Map();
  static of(...entries) {
    return new Cart(entries.map(([k, v]) => ({ k, v })));
  }
  get label() {
    return `${getFlavor("theme")}-cart`;
  }
}

for (const [key, value] of Object.entries({ a: 1 })) {
  console.log(key, value ?? getFlavor("layout"));
}
export const even = [1, 2, 3].filter((n) => n % 2 === 0 && /\d/.test(String(n)));
"#;
    let output = FlavorsMacro::default().expand_source(source, &config())?;
    assert_eq!(
        output,
        r#"import Theme from './theme.dark';

export class Cart extends Theme {
  #items = new Map();
  static of(...entries) {
    return new Cart(entries.map(([k, v]) => ({ k, v })));
  }
  get label() {
    return `${"dark"}-cart`;
  }
}

for (const [key, value] of Object.entries({ a: 1 })) {
  console.log(key, value ?? "compact");
}
export const even = [1, 2, 3].filter((n) => n % 2 === 0 && /\d/.test(String(n)));
"#
    );
    Ok(())
}

#[test]
fn test_nested_marker_fails_without_edits() -> anyhow::Result<()> {
    let source = r#"import flavors, { getFlavor } from "flavors.macro";
import A from "x";
const t = getFlavor("theme");
if (enabled) {
  flavors();
}
"#;
    let mut tree = parse_module(source)?;
    let before = tree.clone();

    let err = FlavorsMacro::default()
        .expand(&mut tree, &config())
        .unwrap_err();

    assert!(matches!(err, MacroError::NotAnExpressionStatement { .. }));
    assert!(err.to_string().contains("top level"));
    assert_eq!(tree, before);
    Ok(())
}

#[test]
fn test_wrong_arity_fails_without_edits() -> anyhow::Result<()> {
    let source = r#"import flavors, { getFlavor } from "flavors.macro";
import A from "x";
flavors();
const t = getFlavor(1, 2);
"#;
    let mut tree = parse_module(source)?;
    let before = tree.clone();

    let err = FlavorsMacro::default()
        .expand(&mut tree, &config())
        .unwrap_err();

    assert!(matches!(err, MacroError::WrongArity { found: 2, .. }));
    assert_eq!(tree, before);
    Ok(())
}

#[test]
fn test_second_pass_is_a_noop() -> anyhow::Result<()> {
    let source = r#"import flavors, { getFlavor } from "flavors.macro";
import A from "x";
flavors();
const t = getFlavor("theme");
"#;
    let mut expander = FlavorsMacro::default();
    let first = expander.expand_source(source, &config())?;
    let second = expander.expand_source(&first, &config())?;

    assert_eq!(first, "import A from 'x-flavored';\nconst t = \"dark\";\n");
    assert_eq!(second, first);

    let mut tree = parse_module(&first)?;
    let summary = expander.expand(&mut tree, &config())?;
    assert!(summary.is_noop());
    Ok(())
}

#[test]
fn test_renamed_local_bindings() -> anyhow::Result<()> {
    let source = r#"import pick, { getFlavor as flavorOf } from "../lib/flavors.macro";
import A from "x";
pick();
const t = flavorOf("theme");
"#;
    let output = FlavorsMacro::default().expand_source(source, &config())?;
    assert_eq!(output, "import A from 'x-flavored';\nconst t = \"dark\";\n");
    Ok(())
}

#[test]
fn test_lookup_inside_removed_marker_is_skipped() -> anyhow::Result<()> {
    let source = r#"import flavors, { getFlavor } from "flavors.macro";
flavors(getFlavor("theme"));
const t = getFlavor("theme");
"#;
    let mut expander = FlavorsMacro::default();
    let output = expander.expand_source(source, &config())?;

    assert_eq!(output, "const t = \"dark\";\n");
    let stats = &expander.stats()["LiteralSubstitution"];
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.applications, 1);
    Ok(())
}

#[test]
fn test_unsupported_import_names_are_left_alone() -> anyhow::Result<()> {
    let source = r#"import { somethingElse } from "flavors.macro";
somethingElse();
"#;
    let output = FlavorsMacro::default().expand_source(source, &config())?;
    assert_eq!(output, "somethingElse();\n");
    Ok(())
}

#[test]
fn test_custom_options() -> anyhow::Result<()> {
    let options = MacroOptions::new()
        .with_macro_source("variants.macro")
        .with_traverse_limit(1);
    let mut expander = FlavorsMacro::new(options);

    // marker -> call -> statement needs two steps
    let source = "import v from \"variants.macro\";\nv();\n";
    let err = expander.expand_source(source, &config()).unwrap_err();
    assert!(matches!(
        err,
        FlavorsError::Macro(MacroError::UnboundedNesting { limit: 1, .. })
    ));

    // The default macro source is not recognized under this configuration
    let source = "import flavors from \"flavors.macro\";\nflavors();\n";
    assert_eq!(expander.expand_source(source, &config())?, source);
    Ok(())
}

#[test]
fn test_run_with_prepared_references() -> anyhow::Result<()> {
    let mut tree = parse_module("import f from \"flavors.macro\";\nimport A from \"x\";\nf();\n")?;
    let refs = MacroReferences::collect(&tree, "flavors.macro");

    let summary = FlavorsMacro::default().run(&mut tree, &refs, &config())?;

    assert_eq!(summary.imports_rewritten, 1);
    assert_eq!(summary.macro_imports_removed, 0);
    assert_eq!(
        tree.to_source(),
        "import f from \"flavors.macro\";\nimport A from 'x-flavored';\n"
    );
    Ok(())
}

#[test]
fn test_parse_errors_surface_as_flavors_errors() {
    let err = FlavorsMacro::default()
        .expand_source("const = ;", &config())
        .unwrap_err();
    assert!(matches!(err, FlavorsError::Parse(_)));
}
