//! Editor-facing metadata for the scripting language.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reserved words of the language, shared by the lexer and editor highlighting.
pub const KEYWORDS: &[&str] = &[
    "and", "class", "def", "else", "for", "if", "in", "import", "del", "let", "not", "or",
    "return", "while", "try", "except", "raise", "continue", "break", "as", "from", "elif",
    "lambda", "with", "is", "pass", "assert", "yield", "finally", "async", "await",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SyntaxConfig {
    /// Numeric language id used by cartridge metadata.
    pub id: u32,
    pub name: String,
    pub file_extension: String,
    /// Comment prefix for project-file header tags.
    pub project_comment: String,
    pub single_comment: String,
    /// Characters that open and close a plain string literal.
    pub string_delimiters: String,
    pub keywords: Vec<String>,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            id: 21,
            name: "kuroko".to_string(),
            file_extension: ".krk".to_string(),
            project_comment: "#".to_string(),
            single_comment: "#".to_string(),
            string_delimiters: "'\"".to_string(),
            keywords: KEYWORDS.iter().map(|word| word.to_string()).collect(),
        }
    }
}

impl SyntaxConfig {
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.iter().any(|keyword| keyword == word)
    }

    pub fn is_string_delimiter(&self, ch: char) -> bool {
        self.string_delimiters.contains(ch)
    }

    /// Whether `path` names a source file of this language.
    pub fn matches_file(&self, path: &str) -> bool {
        path.ends_with(&self.file_extension)
    }
}
