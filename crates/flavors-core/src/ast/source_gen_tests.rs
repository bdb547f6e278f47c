// Tests for source generation

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::ast::source_gen::{quote, splice, statement_extent, unquote};
    use crate::ast::{NodeKind, StrLit, TextEdit, TextRange, ToSource};
    use crate::parser::parse_module;

    fn roundtrip(source: &str) -> String {
        parse_module(source).unwrap().to_source()
    }

    fn edit(start: usize, end: usize, replacement: &str) -> TextEdit {
        TextEdit {
            range: TextRange::new(start, end),
            replacement: replacement.to_string(),
        }
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain", '"'), "\"plain\"");
        assert_eq!(quote("it's", '\''), "'it\\'s'");
        assert_eq!(quote("a\"b", '\''), "'a\"b'");
        assert_eq!(quote("line\nbreak\\", '"'), "\"line\\nbreak\\\\\"");
    }

    #[test]
    fn test_unquote_decodes_escapes() {
        assert_eq!(unquote("'plain'"), "plain");
        assert_eq!(unquote(r#""a\"b\\c""#), "a\"b\\c");
        assert_eq!(unquote(r"'tab\there\n'"), "tab\there\n");
        assert_eq!(unquote(r"'\x41B\u{43}'"), "ABC");
        assert_eq!(unquote(r"'\u{1F600}'"), "\u{1F600}");
        assert_eq!(unquote(r"'\uD83D\uDE00'"), "\u{1F600}");
        assert_eq!(unquote("'one\\\ntwo'"), "onetwo");
        assert_eq!(unquote(r"'\q'"), "q");
    }

    #[test]
    fn test_string_literal_keeps_raw_text() {
        assert_eq!(StrLit::with_raw("x", "'x'").to_source(), "'x'");
        assert_eq!(StrLit::new("x").to_source(), "\"x\"");

        let mut lit = StrLit::with_raw("./a", "\"./a\"");
        lit.set_value("./b");
        assert_eq!(lit.to_source(), "'./b'");
    }

    #[test]
    fn test_unedited_module_prints_verbatim() {
        let source = "import 'side-effect';\n\
                      import B, { c, d as e } from \"./b\";\n\n\
                      export default function App(props) {\n\
                      \x20   return (props.children); // odd indent kept\n\
                      }\n\
                      if (a) {\nb();\n} else {\n    c();\n}";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_comments_survive_edits() {
        let source = "// heading\n/** docs */\nconst x = getFlavor(\"k\"); /* trailing */\n// end\n";
        let mut tree = parse_module(source).unwrap();
        let call = tree
            .descendants(tree.root())
            .into_iter()
            .find(|id| matches!(tree.kind(*id), Some(NodeKind::Call { .. })))
            .unwrap();
        tree.replace_with(call, NodeKind::StringLiteral(StrLit::new("v")))
            .unwrap();
        assert_eq!(
            tree.to_source(),
            "// heading\n/** docs */\nconst x = \"v\"; /* trailing */\n// end\n"
        );
    }

    #[test]
    fn test_splice_skips_overlapping_edits() {
        assert_eq!(splice("abcdef", &[]), "abcdef");
        assert_eq!(
            splice("abcdef", &[edit(4, 5, "Z"), edit(0, 1, "")]),
            "bcdZf"
        );
        assert_eq!(
            splice("abcdef", &[edit(2, 3, "Y"), edit(1, 4, "X")]),
            "aXef"
        );
        assert_eq!(splice("abc", &[edit(2, 9, "X")]), "abc");
    }

    #[test]
    fn test_statement_extent() {
        // Alone on its line, with indentation
        let source = "a();\n  b();\nc();";
        assert_eq!(
            statement_extent(source, TextRange::new(7, 11)),
            TextRange::new(5, 12)
        );

        // Shares the line with a statement after it
        let source = "a(); b();";
        assert_eq!(
            statement_extent(source, TextRange::new(0, 4)),
            TextRange::new(0, 5)
        );

        // Ends a shared line
        assert_eq!(
            statement_extent(source, TextRange::new(5, 9)),
            TextRange::new(4, 9)
        );

        // Windows line endings
        let source = "a();\r\nb();";
        assert_eq!(
            statement_extent(source, TextRange::new(0, 4)),
            TextRange::new(0, 6)
        );
    }
}
