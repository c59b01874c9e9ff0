//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::GlobalArgs;

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "micc",
    bin_name = "micc",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Python project scaffolding and lifecycle management",
    long_about = "micc creates Python projects from templates and manages them \
                  afterwards: adding applications and modules, bumping and \
                  tagging versions, building documentation and installing \
                  the package in development mode.",
    after_help = "EXAMPLES:\n\
        \x20 micc -p foo-bar create --package\n\
        \x20 micc add greet --app\n\
        \x20 micc version --patch --tag\n\
        \x20 micc -vv info",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new project.
    #[command(
        about = "Create a new project",
        after_help = "EXAMPLES:\n\
            \x20 micc -p foo-bar create                # module structure\n\
            \x20 micc -p foo-bar create --package      # package structure\n\
            \x20 micc create foo-bar -l BSD -d \"Does foo and bar.\"\n\
            \x20 micc create foo-bar -T package-base -T ./my-template"
    )]
    Create(CreateArgs),

    /// Add an application or a module to the project.
    #[command(
        about = "Add an application or a module",
        after_help = "EXAMPLES:\n\
            \x20 micc add greet --app\n\
            \x20 micc add tools --group\n\
            \x20 micc add utils --py\n\
            \x20 micc add algorithms --py --package\n\
            \x20 micc add fastsum --cpp"
    )]
    Add(AddArgs),

    /// Show or bump the project version.
    #[command(
        about = "Show or bump the project version",
        after_help = "EXAMPLES:\n\
            \x20 micc version                 # Project foo version 0.1.0\n\
            \x20 micc version -s              # 0.1.0\n\
            \x20 micc version --minor --tag\n\
            \x20 micc version 1.0.0\n\
            \x20 micc version prerelease --dry-run"
    )]
    Version(VersionArgs),

    /// Create a git tag for the current version and push it.
    #[command(about = "Tag the current version and push the tag")]
    Tag,

    /// Convert a module project into a package project.
    #[command(
        about = "Convert a module project into a package project",
        after_help = "EXAMPLES:\n\
            \x20 micc convert-to-package\n\
            \x20 micc convert-to-package --backup"
    )]
    ConvertToPackage(ConvertArgs),

    /// Build the documentation.
    #[command(
        about = "Build the documentation",
        disable_help_flag = true,
        after_help = "EXAMPLES:\n\
            \x20 micc docs            # html\n\
            \x20 micc docs -h -l      # html and pdf"
    )]
    Docs(DocsArgs),

    /// Show information about the project.
    #[command(
        about = "Show information about the project",
        after_help = "EXAMPLES:\n\
            \x20 micc info\n\
            \x20 micc -vv info        # also list applications and modules\n\
            \x20 micc info --version"
    )]
    Info(InfoArgs),

    /// Install the package in development mode.
    #[command(
        about = "Install the package in development mode (symbolic links)",
        after_help = "EXAMPLES:\n\
            \x20 micc dev-install\n\
            \x20 micc dev-install --site-packages ~/venv/lib/python3.8/site-packages"
    )]
    DevInstall(DevInstallArgs),

    /// Remove a development install.
    #[command(about = "Remove a development install")]
    DevUninstall(DevInstallArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 micc completions bash > ~/.local/share/bash-completion/completions/micc\n\
            \x20 micc completions zsh  > ~/.zfunc/_micc\n\
            \x20 micc completions fish > ~/.config/fish/completions/micc.fish"
    )]
    Completions(CompletionsArgs),
}

// ── create ────────────────────────────────────────────────────────────────────

/// Arguments for `micc create`.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Directory to create, relative to `--project-path`.
    #[arg(value_name = "NAME", help = "Project directory (default: the project path)")]
    pub name: Option<PathBuf>,

    /// Create a package (`<pkg>/__init__.py`) instead of a module (`<pkg>.py`).
    #[arg(short = 'p', long = "package", help = "Create a package project")]
    pub package: bool,

    /// Extra template parameters from a JSON file.
    #[arg(long = "micc-file", value_name = "FILE", help = "JSON file with template parameters")]
    pub micc_file: Option<PathBuf>,

    #[arg(
        short = 'd',
        long = "description",
        value_name = "TEXT",
        help = "One-sentence project description"
    )]
    pub description: Option<String>,

    /// Prefix of one of the known license names.
    #[arg(
        short = 'l',
        long = "lic",
        value_name = "LICENSE",
        default_value = "MIT",
        help = "License (MIT, BSD, ISC, Apache, GNU, Not open source)"
    )]
    pub license: String,

    /// Templates to apply instead of the defaults, in order.
    #[arg(
        short = 'T',
        long = "template",
        value_name = "TEMPLATE",
        action = ArgAction::Append,
        help = "Template name or path (repeatable)"
    )]
    pub templates: Vec<String>,

    #[arg(short = 'n', long = "allow-nesting", help = "Allow creating a project inside a project")]
    pub allow_nesting: bool,

    #[arg(
        long = "python",
        value_name = "VERSION",
        default_value = micc_core::domain::defaults::DEFAULT_PYTHON_VERSION,
        help = "Minimal Python version"
    )]
    pub python_version: String,
}

// ── add ───────────────────────────────────────────────────────────────────────

/// Arguments for `micc add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Name of the application or module.
    #[arg(value_name = "NAME")]
    pub name: String,

    #[arg(long = "app", help = "Add a command line application")]
    pub app: bool,

    /// Implies `--app`.
    #[arg(long = "group", help = "Application with sub-commands (implies --app)")]
    pub group: bool,

    #[arg(long = "py", help = "Add a Python module")]
    pub py: bool,

    /// Implies `--py`.
    #[arg(long = "package", help = "Python package instead of module (implies --py)")]
    pub package: bool,

    #[arg(long = "f2py", help = "Add a Fortran binary extension module")]
    pub f2py: bool,

    #[arg(long = "cpp", help = "Add a C++ binary extension module")]
    pub cpp: bool,

    #[command(flatten)]
    pub collision: CollisionArgs,

    #[arg(
        short = 'T',
        long = "template",
        value_name = "TEMPLATE",
        action = ArgAction::Append,
        help = "Template name or path (repeatable)"
    )]
    pub templates: Vec<String>,
}

/// `--overwrite` / `--backup`, shared by the commands that expand templates
/// into an existing project.
#[derive(Debug, Clone, Copy, Args)]
pub struct CollisionArgs {
    #[arg(long = "overwrite", help = "Overwrite pre-existing files")]
    pub overwrite: bool,

    #[arg(long = "backup", help = "Keep a .bak copy of pre-existing files, then overwrite")]
    pub backup: bool,
}

// ── version ───────────────────────────────────────────────────────────────────

/// Arguments for `micc version`.
#[derive(Debug, Args)]
pub struct VersionArgs {
    /// A semver rule (major, minor, patch, premajor, preminor, prepatch,
    /// prerelease) or a concrete version.
    #[arg(value_name = "RULE")]
    pub rule: Option<String>,

    #[arg(short = 'M', long = "major", help = "Increment the major version")]
    pub major: bool,

    #[arg(short = 'm', long = "minor", help = "Increment the minor version")]
    pub minor: bool,

    #[arg(short = 'p', long = "patch", help = "Increment the patch version")]
    pub patch: bool,

    #[arg(short = 't', long = "tag", help = "Create and push a git tag for the new version")]
    pub tag: bool,

    #[arg(short = 's', long = "short", help = "Print the version only")]
    pub short: bool,

    #[arg(long = "poetry", help = "Let poetry update pyproject.toml")]
    pub poetry: bool,

    #[arg(short = 'd', long = "dry-run", help = "Show the new version, change nothing")]
    pub dry_run: bool,
}

// ── convert-to-package ────────────────────────────────────────────────────────

/// Arguments for `micc convert-to-package`.
#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub collision: CollisionArgs,
}

// ── docs ──────────────────────────────────────────────────────────────────────

/// Arguments for `micc docs`.
///
/// `-h` selects html, so help is only available as `--help`.
#[derive(Debug, Args)]
pub struct DocsArgs {
    #[arg(short = 'h', long = "html", help = "Build html documentation")]
    pub html: bool,

    #[arg(short = 'l', long = "latexpdf", help = "Build pdf documentation (via LaTeX)")]
    pub latexpdf: bool,

    #[arg(long = "help", action = ArgAction::Help, help = "Print help")]
    pub help: Option<bool>,
}

impl DocsArgs {
    /// The formats to build, in order; html when none is selected.
    pub fn formats(&self) -> Vec<String> {
        let mut formats = Vec::new();
        if self.html {
            formats.push("html".to_owned());
        }
        if self.latexpdf {
            formats.push("latexpdf".to_owned());
        }
        if formats.is_empty() {
            formats.push("html".to_owned());
        }
        formats
    }
}

// ── info ──────────────────────────────────────────────────────────────────────

/// Arguments for `micc info`.
#[derive(Debug, Args)]
pub struct InfoArgs {
    #[arg(long = "name", help = "Print the package name only")]
    pub name: bool,

    #[arg(long = "version", conflicts_with = "name", help = "Print the version only")]
    pub version: bool,
}

// ── dev-install ───────────────────────────────────────────────────────────────

/// Arguments for `micc dev-install` and `micc dev-uninstall`.
#[derive(Debug, Args)]
pub struct DevInstallArgs {
    /// Defaults to the site-packages directory of `python3`.
    #[arg(long = "site-packages", value_name = "DIR", help = "Destination directory")]
    pub site_packages: Option<PathBuf>,

    #[arg(long = "overwrite", help = "Replace files that are not symbolic links")]
    pub overwrite: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `micc completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// The shell to generate completions for.
    #[arg(value_enum, value_name = "SHELL")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}

// ── tests ─────────────────────────────────────────────────────────────────────
