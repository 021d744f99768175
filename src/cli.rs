use clap::{Parser, Subcommand, ValueEnum};

use crate::models::{AiTool, BrowserKind, Ide, TerminalApp};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set by the auto-start registration so launches can be told apart in
    /// the history log.
    #[arg(long, hide = true)]
    pub auto: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured projects
    List,
    /// Launch every action of a project
    Launch {
        #[arg(value_name = "NAME")]
        name: String,
        /// Terminal to use for this launch instead of the configured one
        #[arg(long, value_name = "APP")]
        terminal: Option<TerminalApp>,
        /// Accept a fuzzy name suggestion without prompting
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Add a project
    Add {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "PATH")]
        path: String,
        /// IDE to open the project in
        #[arg(long, value_name = "IDE")]
        ide: Option<Ide>,
        /// AI coding assistant to run in a terminal at the project path
        #[arg(long = "ai-tool", value_name = "TOOL")]
        ai_tool: Option<AiTool>,
        /// Terminal command to run at the project path (repeatable)
        #[arg(long = "run", value_name = "CMD")]
        run: Vec<String>,
        /// Browser to open the tabs in (repeatable, default browser if omitted)
        #[arg(long = "browser", value_name = "BROWSER")]
        browsers: Vec<BrowserKind>,
        /// URL to open when launching (repeatable)
        #[arg(long = "tab", value_name = "URL")]
        tabs: Vec<String>,
        /// Per-project terminal override
        #[arg(long, value_name = "APP")]
        terminal: Option<TerminalApp>,
    },
    /// Edit a project's name, path or terminal
    Edit {
        #[arg(value_name = "NAME")]
        name: String,
        /// New display name
        #[arg(long, value_name = "NEW_NAME")]
        rename: Option<String>,
        /// New project directory
        #[arg(long, value_name = "PATH")]
        path: Option<String>,
        /// Per-project terminal override
        #[arg(long, value_name = "APP")]
        terminal: Option<TerminalApp>,
        /// Accept a fuzzy name suggestion without prompting
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Remove a project
    Remove {
        #[arg(value_name = "NAME")]
        name: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Change a setting (terminal, show_on_startup)
    Set {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Print a setting
    Get {
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Manage the run-at-login registration
    Startup {
        #[arg(value_name = "ACTION")]
        action: ToggleAction,
    },
    /// Manage desktop and applications-menu shortcuts
    Shortcut {
        #[arg(value_name = "KIND")]
        kind: ShortcutTarget,
        #[arg(value_name = "ACTION")]
        action: ShortcutOp,
    },
    /// Copy the executable to the per-user install directory
    Install {
        /// Also create a desktop shortcut
        #[arg(long)]
        desktop: bool,
        /// Also create an applications-menu shortcut
        #[arg(long)]
        menu: bool,
        /// Also enable run-at-login
        #[arg(long)]
        startup: bool,
    },
    /// Remove shortcuts, the startup registration and the installed copy
    Uninstall {
        /// Also delete the config directory (~/.kickoff)
        #[arg(long)]
        purge: bool,
    },
    /// Check GitHub for a newer release
    Update,
    /// Generate shell completion scripts
    Completions {
        #[arg(value_name = "SHELL")]
        shell: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToggleAction {
    Enable,
    Disable,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShortcutTarget {
    Desktop,
    Menu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShortcutOp {
    Create,
    Remove,
    Status,
}
