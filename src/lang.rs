/*!
 * Markdown fence language tags by file extension
 */

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

/// Extension (without the dot, lower-case) to code fence language tag
static KNOWN_LANGS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // JavaScript and derivatives
        ("js", "js"),
        ("mjs", "js"),
        ("cjs", "js"),
        ("jsx", "js"),
        // TypeScript and derivatives
        ("ts", "ts"),
        ("mts", "ts"),
        ("cts", "ts"),
        ("tsx", "ts"),
        // Web and scripting
        ("vue", "vue"),
        ("py", "py"),
        ("php", "php"),
        ("rb", "rb"),
        ("go", "go"),
        ("rs", "rs"),
        ("sh", "bash"),
        ("bash", "bash"),
        ("zsh", "bash"),
        ("ps1", "powershell"),
        ("coffee", "coffee"),
        ("bat", "batch"),
        ("cmd", "batch"),
        // C-family and related
        ("c", "c"),
        ("h", "c"),
        ("cpp", "cpp"),
        ("cc", "cpp"),
        ("cxx", "cpp"),
        ("hpp", "cpp"),
        ("hh", "cpp"),
        ("hxx", "cpp"),
        ("cs", "cs"),
        ("java", "java"),
        ("kt", "kt"),
        ("swift", "swift"),
        ("scala", "scala"),
        // Functional and alternative ecosystems
        ("hs", "hs"),
        ("clj", "clj"),
        ("cljs", "clj"),
        ("cljc", "clj"),
        ("edn", "clj"),
        ("fs", "fs"),
        ("fsx", "fs"),
        ("vb", "vb"),
        ("groovy", "groovy"),
        ("nim", "nim"),
        ("cr", "cr"),
        ("r", "r"),
        ("lua", "lua"),
        ("erl", "erl"),
        ("ex", "elixir"),
        ("exs", "elixir"),
        ("elm", "elm"),
        ("dart", "dart"),
        ("m", "matlab"),
        ("mm", "objc"),
        ("ahk", "ahk"),
        // Markup and data
        ("md", "md"),
        ("markdown", "md"),
        ("json", "json"),
        ("jsonl", "json"),
        ("yaml", "yaml"),
        ("yml", "yaml"),
        ("toml", "toml"),
        ("xml", "xml"),
        ("html", "html"),
        ("htm", "html"),
        // Stylesheets
        ("css", "css"),
        ("scss", "scss"),
        ("sass", "scss"),
        ("less", "less"),
        // Other formats
        ("sql", "sql"),
        ("csv", "csv"),
        ("tsv", "csv"),
        ("ini", "ini"),
    ])
});

/// Best-effort fence language for a file; empty when the extension is unknown
pub fn language_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| KNOWN_LANGS.get(ext.to_ascii_lowercase().as_str()))
        .copied()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_for() {
        assert_eq!(language_for(Path::new("src/main.rs")), "rs");
        assert_eq!(language_for(Path::new("types.d.ts")), "ts");
        assert_eq!(language_for(Path::new("deploy.SH")), "bash");
        assert_eq!(language_for(Path::new("Makefile")), "");
        assert_eq!(language_for(Path::new("notes.unknown")), "");
    }
}
