//! Best-effort textual import rewriting.
//!
//! Matches import/export/require statements with regexes, not a parser.
//! The patterns only touch the quoted path literal; everything around it
//! is preserved byte-for-byte, so statements whose path needs no rewrite
//! come back identical.

use crate::error::{Error, Result};
use regex::{Captures, Regex};

/// Rewrites one path literal according to a fixed directory rename.
///
/// All applicable rules apply in sequence; the output never reintroduces
/// the old directory token, so `rewrite` is idempotent.
#[derive(Debug, Clone)]
pub struct PathRewriter {
    /// Parent directory the renamed folder lives under (e.g. `src`).
    pub src_dir: String,
    /// Old directory name (e.g. `app`).
    pub from: String,
    /// New directory name (e.g. `core`).
    pub to: String,
}

impl PathRewriter {
    pub fn new(src_dir: &str, from: &str, to: &str) -> Self {
        PathRewriter {
            src_dir: src_dir.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Map one import path to its possibly-rewritten form.
    ///
    /// Deterministic, total, no side effects. Returns the input unchanged
    /// when no rule matches.
    pub fn rewrite(&self, path: &str) -> String {
        let mut p = path.to_string();

        // Qualified and mid-path substring forms
        p = p.replace(
            &format!("{}/{}/", self.src_dir, self.from),
            &format!("{}/{}/", self.src_dir, self.to),
        );
        p = p.replace(
            &format!("/{}/", self.from),
            &format!("/{}/", self.to),
        );
        // Backslash form, for foreign separators embedded in literals
        p = p.replace(
            &format!("\\{}\\", self.from),
            &format!("\\{}\\", self.to),
        );

        // Relative prefixes
        let rel_parent = format!("../{}/", self.from);
        if let Some(rest) = p.strip_prefix(&rel_parent) {
            p = format!("../{}/{}", self.to, rest);
        }
        let rel_here = format!("./{}/", self.from);
        if let Some(rest) = p.strip_prefix(&rel_here) {
            p = format!("./{}/{}", self.to, rest);
        }
        // Bare prefix: only when the path starts exactly with "<from>/"
        let bare = format!("{}/", self.from);
        if let Some(rest) = p.strip_prefix(&bare) {
            p = format!("{}/{}", self.to, rest);
        }

        p
    }
}

/// A (old literal, new literal) route rename pair.
///
/// Applied as exact quoted-string replacement, never identifier renaming.
pub type RouteRename = (String, String);

/// Patches full file text: import-path rewriting, dead-option line
/// stripping, and route string-literal renaming.
pub struct TextPatcher {
    rewriter: PathRewriter,
    strip_markers: Vec<String>,
    route_renames: Vec<RouteRename>,
    import_export: Vec<Regex>,
    require: Regex,
}

impl TextPatcher {
    pub fn new(
        rewriter: PathRewriter,
        strip_markers: Vec<String>,
        route_renames: Vec<RouteRename>,
    ) -> Result<Self> {
        // The regex crate has no backreferences, so both quote characters
        // are captured and checked for equality in the replacement closure.
        let import_export = [
            r#"(import\s+[^;]*?\s+from\s+)(['"])([^'"]+)(['"])"#,
            r#"(export\s+[^;]*?\s+from\s+)(['"])([^'"]+)(['"])"#,
        ]
        .iter()
        .map(|p| Regex::new(p).map_err(|e| Error::Other(format!("bad pattern: {}", e))))
        .collect::<Result<Vec<_>>>()?;

        let require = Regex::new(r#"(\brequire\(\s*)(['"])([^'"]+)(['"])(\s*\))"#)
            .map_err(|e| Error::Other(format!("bad pattern: {}", e)))?;

        Ok(TextPatcher {
            rewriter,
            strip_markers,
            route_renames,
            import_export,
            require,
        })
    }

    /// Apply all configured transforms and return the patched text.
    ///
    /// Text with nothing to change comes back byte-identical, so callers
    /// can compare against the input to decide whether to write.
    pub fn patch(&self, text: &str) -> String {
        let mut out = self.rewrite_imports(text);
        if !self.strip_markers.is_empty() {
            out = self.strip_marker_lines(&out);
        }
        if !self.route_renames.is_empty() {
            out = self.rename_routes(&out);
        }
        out
    }

    /// Rewrite the quoted path inside import/export/require statements.
    ///
    /// Import/export patterns run over the whole text first, then require.
    /// The patterns are disjoint so the order has no semantic effect, but
    /// it is kept fixed for reproducible diffs.
    fn rewrite_imports(&self, text: &str) -> String {
        let mut out = text.to_string();

        for pat in &self.import_export {
            out = pat
                .replace_all(&out, |caps: &Captures| {
                    let (open, close) = (&caps[2], &caps[4]);
                    if open != close {
                        return caps[0].to_string();
                    }
                    format!("{}{}{}{}", &caps[1], open, self.rewriter.rewrite(&caps[3]), close)
                })
                .into_owned();
        }

        out = self
            .require
            .replace_all(&out, |caps: &Captures| {
                let (open, close) = (&caps[2], &caps[4]);
                if open != close {
                    return caps[0].to_string();
                }
                format!(
                    "{}{}{}{}{}",
                    &caps[1],
                    open,
                    self.rewriter.rewrite(&caps[3]),
                    close,
                    &caps[5]
                )
            })
            .into_owned();

        out
    }

    /// Remove every line containing a marker, including its newline.
    ///
    /// No structural re-balancing: a removed entry in a multi-line option
    /// object can leave a dangling trailing comma on the line before it.
    /// That is accepted, documented behavior.
    fn strip_marker_lines(&self, text: &str) -> String {
        text.split_inclusive('\n')
            .filter(|line| !self.strip_markers.iter().any(|m| line.contains(m.as_str())))
            .collect()
    }

    /// Replace exact quoted occurrences of each old route literal.
    fn rename_routes(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (old, new) in &self.route_renames {
            out = out.replace(&format!("\"{}\"", old), &format!("\"{}\"", new));
            out = out.replace(&format!("'{}'", old), &format!("'{}'", new));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> PathRewriter {
        PathRewriter::new("src", "app", "core")
    }

    fn patcher() -> TextPatcher {
        TextPatcher::new(rewriter(), Vec::new(), Vec::new()).unwrap()
    }

    #[test]
    fn rewrite_identity_without_old_token() {
        let r = rewriter();
        for p in ["react", "./theme", "../util/srs", "src/components/Button"] {
            assert_eq!(r.rewrite(p), p, "expected identity for {:?}", p);
        }
    }

    #[test]
    fn rewrite_covers_all_rule_shapes() {
        let r = rewriter();
        let table = [
            ("src/app/db", "src/core/db"),
            ("../src/app/db", "../src/core/db"),
            ("lib/app/util", "lib/core/util"),
            ("..\\app\\util", "..\\core\\util"),
            ("../app/widgets", "../core/widgets"),
            ("./app/util", "./core/util"),
            ("app/screens/Home", "core/screens/Home"),
        ];
        for (input, expected) in table {
            assert_eq!(r.rewrite(input), expected, "for input {:?}", input);
        }
    }

    #[test]
    fn rewrite_is_idempotent() {
        let r = rewriter();
        for p in [
            "src/app/db",
            "../app/widgets",
            "./app/util",
            "app/x",
            "react",
            "./theme",
        ] {
            let once = r.rewrite(p);
            assert_eq!(r.rewrite(&once), once, "not idempotent for {:?}", p);
        }
    }

    #[test]
    fn rewrite_ignores_bare_name_without_slash() {
        // "app" with no trailing slash is not a directory reference
        assert_eq!(rewriter().rewrite("app"), "app");
        assert_eq!(rewriter().rewrite("application/json"), "application/json");
    }

    #[test]
    fn patch_is_noop_without_matching_statements() {
        let p = TextPatcher::new(
            rewriter(),
            vec!["statusBarTranslucent".to_string()],
            vec![("QuestionEditorScreen".into(), "QuestionEditor".into())],
        )
        .unwrap();
        let text = "const x = 1;\nfunction f() { return x; }\n";
        assert_eq!(p.patch(text), text);
    }

    #[test]
    fn patch_preserves_double_quotes() {
        let text = "import x from \"../app/widgets\";\n";
        assert_eq!(patcher().patch(text), "import x from \"../core/widgets\";\n");
    }

    #[test]
    fn patch_preserves_single_quotes() {
        let text = "import x from '../app/widgets';\n";
        assert_eq!(patcher().patch(text), "import x from '../core/widgets';\n");
    }

    #[test]
    fn patch_rewrites_export_from() {
        let text = "export { db } from './app/db';\n";
        assert_eq!(patcher().patch(text), "export { db } from './core/db';\n");
    }

    #[test]
    fn patch_rewrites_require_and_keeps_spacing() {
        let text = "const util = require( \"./app/util\" );\n";
        assert_eq!(
            patcher().patch(text),
            "const util = require( \"./core/util\" );\n"
        );
    }

    #[test]
    fn patch_leaves_non_matching_import_byte_identical() {
        let text = "import React from 'react';\nimport { db } from './app/db';\n";
        let patched = patcher().patch(text);
        assert!(patched.starts_with("import React from 'react';\n"));
        assert!(patched.contains("./core/db"));
    }

    #[test]
    fn strip_marker_removes_line_and_newline() {
        let p = TextPatcher::new(
            rewriter(),
            vec!["statusBarTranslucent".to_string()],
            Vec::new(),
        )
        .unwrap();
        let text = "options: {\n  statusBarTranslucent: true,\n  headerShown: false,\n}\n";
        assert_eq!(p.patch(text), "options: {\n  headerShown: false,\n}\n");
    }

    #[test]
    fn strip_marker_noop_preserves_trailing_newline() {
        let p = TextPatcher::new(
            rewriter(),
            vec!["statusBarTranslucent".to_string()],
            Vec::new(),
        )
        .unwrap();
        let text = "a\nb\n";
        assert_eq!(p.patch(text), text);
    }

    #[test]
    fn rename_routes_replaces_quoted_literals_only() {
        let p = TextPatcher::new(
            rewriter(),
            Vec::new(),
            vec![("QuestionEditorScreen".into(), "QuestionEditor".into())],
        )
        .unwrap();
        let text = "navigate(\"QuestionEditorScreen\");\nconst QuestionEditorScreenImpl = 1;\nnavigate('QuestionEditorScreen');\n";
        let patched = p.patch(text);
        assert!(patched.contains("navigate(\"QuestionEditor\");"));
        assert!(patched.contains("navigate('QuestionEditor');"));
        // Identifiers are untouched
        assert!(patched.contains("QuestionEditorScreenImpl"));
    }

    #[test]
    fn rename_routes_noop_when_literal_absent() {
        let p = TextPatcher::new(
            rewriter(),
            Vec::new(),
            vec![("Missing".into(), "Elsewhere".into())],
        )
        .unwrap();
        let text = "navigate(\"Home\");\n";
        assert_eq!(p.patch(text), text);
    }
}
