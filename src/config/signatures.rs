//! Static registry of tool configuration signatures.
//!
//! Each [`ConfigSignature`] row describes how one tool's configuration shows
//! up in a project: candidate files relative to the project root, keys the
//! tool reads from `package.json`, and whether it owns a whole directory.
//! Detection and cleanup both read this table; supporting a new tool means
//! adding a [`ToolId`] variant and one row.
use std::fmt;
use std::str::FromStr;

use crate::error::MigrationError;

/// Identity of a tool the engine knows how to detect and replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolId {
    /// Prettier formatter.
    Prettier,
    /// ESLint linter.
    Eslint,
    /// Stylelint stylesheet linter.
    Stylelint,
    /// markdownlint Markdown linter.
    Markdownlint,
    /// Husky hook manager.
    Husky,
    /// Lefthook hook manager.
    Lefthook,
    /// simple-git-hooks hook manager.
    SimpleGitHooks,
    /// lint-staged staged-file runner.
    LintStaged,
}

/// Category of developer tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFamily {
    /// Code formatters.
    Formatter,
    /// Script linters.
    Linter,
    /// Stylesheet linters.
    StyleLinter,
    /// Markdown linters.
    MarkdownLinter,
    /// Git-hook managers and the staged-file runners that ride on them.
    GitHooks,
}

/// How a tool's configuration is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One or more standalone files.
    Files,
    /// A directory owned entirely by the tool; every file directly inside it
    /// is configuration.
    Directory(&'static str),
}

/// Static detection signature for one tool.
#[derive(Debug)]
pub struct ConfigSignature {
    /// Tool the signature describes.
    pub tool: ToolId,
    /// Kebab-case identifier accepted on the command line.
    pub id: &'static str,
    /// Human-readable name used in backups and reports.
    pub name: &'static str,
    /// Family the tool belongs to.
    pub family: ToolFamily,
    /// Where the configuration lives.
    pub layout: Layout,
    /// Candidate file paths relative to the project root.
    pub files: &'static [&'static str],
    /// Top-level `package.json` keys holding embedded configuration.
    pub manifest_keys: &'static [&'static str],
}

/// Every known tool, in detection order.
pub static SIGNATURES: &[ConfigSignature] = &[
    ConfigSignature {
        tool: ToolId::Prettier,
        id: "prettier",
        name: "Prettier",
        family: ToolFamily::Formatter,
        layout: Layout::Files,
        files: &[
            ".prettierrc",
            ".prettierrc.json",
            ".prettierrc.json5",
            ".prettierrc.yaml",
            ".prettierrc.yml",
            ".prettierrc.toml",
            ".prettierrc.js",
            ".prettierrc.cjs",
            ".prettierrc.mjs",
            "prettier.config.js",
            "prettier.config.cjs",
            "prettier.config.mjs",
            ".prettierignore",
        ],
        manifest_keys: &["prettier"],
    },
    ConfigSignature {
        tool: ToolId::Eslint,
        id: "eslint",
        name: "ESLint",
        family: ToolFamily::Linter,
        layout: Layout::Files,
        files: &[
            ".eslintrc",
            ".eslintrc.js",
            ".eslintrc.cjs",
            ".eslintrc.json",
            ".eslintrc.yaml",
            ".eslintrc.yml",
            "eslint.config.js",
            "eslint.config.cjs",
            "eslint.config.mjs",
            "eslint.config.ts",
            ".eslintignore",
        ],
        manifest_keys: &["eslintConfig"],
    },
    ConfigSignature {
        tool: ToolId::Stylelint,
        id: "stylelint",
        name: "Stylelint",
        family: ToolFamily::StyleLinter,
        layout: Layout::Files,
        files: &[
            ".stylelintrc",
            ".stylelintrc.json",
            ".stylelintrc.yaml",
            ".stylelintrc.yml",
            ".stylelintrc.js",
            ".stylelintrc.cjs",
            "stylelint.config.js",
            "stylelint.config.cjs",
            "stylelint.config.mjs",
            ".stylelintignore",
        ],
        manifest_keys: &["stylelint"],
    },
    ConfigSignature {
        tool: ToolId::Markdownlint,
        id: "markdownlint",
        name: "markdownlint",
        family: ToolFamily::MarkdownLinter,
        layout: Layout::Files,
        files: &[
            ".markdownlint.json",
            ".markdownlint.jsonc",
            ".markdownlint.yaml",
            ".markdownlint.yml",
            ".markdownlintrc",
            ".markdownlint-cli2.jsonc",
            ".markdownlint-cli2.yaml",
            ".markdownlint-cli2.cjs",
            ".markdownlintignore",
        ],
        manifest_keys: &[],
    },
    ConfigSignature {
        tool: ToolId::Husky,
        id: "husky",
        name: "Husky",
        family: ToolFamily::GitHooks,
        layout: Layout::Directory(".husky"),
        files: &[],
        manifest_keys: &["husky"],
    },
    ConfigSignature {
        tool: ToolId::Lefthook,
        id: "lefthook",
        name: "Lefthook",
        family: ToolFamily::GitHooks,
        layout: Layout::Files,
        files: &[
            "lefthook.yml",
            "lefthook.yaml",
            ".lefthook.yml",
            ".lefthook.yaml",
        ],
        manifest_keys: &[],
    },
    ConfigSignature {
        tool: ToolId::SimpleGitHooks,
        id: "simple-git-hooks",
        name: "simple-git-hooks",
        family: ToolFamily::GitHooks,
        layout: Layout::Files,
        files: &[".simple-git-hooks.json", ".simple-git-hooks.js"],
        manifest_keys: &["simple-git-hooks"],
    },
    ConfigSignature {
        tool: ToolId::LintStaged,
        id: "lint-staged",
        name: "lint-staged",
        family: ToolFamily::GitHooks,
        layout: Layout::Files,
        files: &[
            ".lintstagedrc",
            ".lintstagedrc.json",
            ".lintstagedrc.yaml",
            ".lintstagedrc.yml",
            ".lintstagedrc.js",
            ".lintstagedrc.cjs",
            "lint-staged.config.js",
            "lint-staged.config.cjs",
            "lint-staged.config.mjs",
        ],
        manifest_keys: &["lint-staged"],
    },
];

impl ToolId {
    /// Look up this tool's row in [`SIGNATURES`].
    #[must_use]
    pub fn signature(self) -> Option<&'static ConfigSignature> {
        SIGNATURES.iter().find(|s| s.tool == self)
    }

    /// Kebab-case identifier.
    #[must_use]
    pub fn id(self) -> &'static str {
        self.signature().map_or("unknown", |s| s.id)
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.signature().map_or("unknown", |s| s.name)
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ToolId {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SIGNATURES
            .iter()
            .find(|sig| sig.id.eq_ignore_ascii_case(s))
            .map(|sig| sig.tool)
            .ok_or_else(|| {
                let known: Vec<&str> = SIGNATURES.iter().map(|sig| sig.id).collect();
                MigrationError::validation(format!(
                    "unknown tool '{s}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}
