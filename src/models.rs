use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Host operating system, resolved once so command builders stay pure and
/// testable on any host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Macos,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "macos" => Platform::Macos,
            _ => Platform::Linux,
        }
    }
}

/// One unit of work triggered by launching a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Open the project folder in an IDE. Configs written before the `ide`
    /// field existed carry a bare `vscode` action tag.
    #[serde(alias = "vscode")]
    Ide {
        #[serde(default)]
        ide: Ide,
    },
    /// Run an AI coding assistant in a terminal at the project path.
    AiTool { tool: AiTool },
    /// Open a terminal window at the project path, running the commands in
    /// order.
    Terminal {
        #[serde(default)]
        commands: Vec<String>,
    },
    /// Open tabs in the named browsers, or the OS default when none are
    /// named.
    Browser {
        #[serde(default)]
        browsers: Vec<BrowserKind>,
        #[serde(default)]
        tabs: Vec<String>,
    },
}

impl Action {
    /// Path-dependent actions fail when the project directory is missing;
    /// browser tabs do not need the path and are still attempted.
    pub fn needs_project_dir(&self) -> bool {
        !matches!(self, Action::Browser { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            Action::Ide { ide } => format!("ide ({})", ide.command()),
            Action::AiTool { tool } => format!("ai tool ({})", tool.command()),
            Action::Terminal { commands } => {
                if commands.is_empty() {
                    "terminal".to_string()
                } else {
                    format!("terminal ({} commands)", commands.len())
                }
            }
            Action::Browser { tabs, .. } => format!("browser ({} tabs)", tabs.len()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Ide {
    #[default]
    Vscode,
    Cursor,
    Zed,
    Windsurf,
    Sublime,
    Webstorm,
    Pycharm,
    Intellij,
}

impl Ide {
    /// CLI command the IDE installs on PATH.
    pub fn command(self) -> &'static str {
        match self {
            Ide::Vscode => "code",
            Ide::Cursor => "cursor",
            Ide::Zed => "zed",
            Ide::Windsurf => "windsurf",
            Ide::Sublime => "subl",
            Ide::Webstorm => "webstorm",
            Ide::Pycharm => "pycharm",
            Ide::Intellij => "idea",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AiTool {
    Opencode,
    Claude,
    Aider,
    Copilot,
}

impl AiTool {
    /// Shell command run inside a terminal at the project path.
    pub fn command(self) -> &'static str {
        match self {
            AiTool::Opencode => "opencode",
            AiTool::Claude => "claude",
            AiTool::Aider => "aider",
            AiTool::Copilot => "gh copilot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Edge,
    Safari,
    Brave,
    Arc,
    Opera,
}

impl BrowserKind {
    /// Command prefix that opens a URL in this browser, or `None` when the
    /// browser is not available on the platform (caller falls back to the
    /// OS default handler).
    pub fn command(self, platform: Platform) -> Option<Vec<String>> {
        let argv: &[&str] = match platform {
            Platform::Windows => match self {
                BrowserKind::Chrome => &["cmd", "/c", "start", "chrome"],
                BrowserKind::Firefox => &["cmd", "/c", "start", "firefox"],
                BrowserKind::Edge => &["cmd", "/c", "start", "msedge"],
                BrowserKind::Brave => &["cmd", "/c", "start", "brave"],
                BrowserKind::Opera => &["cmd", "/c", "start", "opera"],
                BrowserKind::Safari | BrowserKind::Arc => return None,
            },
            Platform::Macos => match self {
                BrowserKind::Chrome => &["open", "-a", "Google Chrome"],
                BrowserKind::Firefox => &["open", "-a", "Firefox"],
                BrowserKind::Safari => &["open", "-a", "Safari"],
                BrowserKind::Edge => &["open", "-a", "Microsoft Edge"],
                BrowserKind::Brave => &["open", "-a", "Brave Browser"],
                BrowserKind::Arc => &["open", "-a", "Arc"],
                BrowserKind::Opera => &["open", "-a", "Opera"],
            },
            Platform::Linux => match self {
                BrowserKind::Chrome => &["google-chrome"],
                BrowserKind::Firefox => &["firefox"],
                BrowserKind::Edge => &["microsoft-edge"],
                BrowserKind::Brave => &["brave-browser"],
                BrowserKind::Opera => &["opera"],
                BrowserKind::Safari | BrowserKind::Arc => return None,
            },
        };
        Some(argv.iter().map(|s| s.to_string()).collect())
    }
}

/// Terminal emulator used for terminal and AI-tool actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalApp {
    #[serde(rename = "wt")]
    #[value(name = "wt")]
    WindowsTerminal,
    Powershell,
    Cmd,
    Ghostty,
    #[serde(rename = "terminal")]
    #[value(name = "terminal")]
    AppleTerminal,
    Iterm,
    GnomeTerminal,
    Konsole,
    Xterm,
}

impl TerminalApp {
    pub fn platform_default(platform: Platform) -> Self {
        match platform {
            Platform::Windows => TerminalApp::WindowsTerminal,
            Platform::Macos | Platform::Linux => TerminalApp::Ghostty,
        }
    }

    /// Terminals usable on the given platform, in fallback-probe order.
    pub fn options_for(platform: Platform) -> &'static [TerminalApp] {
        match platform {
            Platform::Windows => &[
                TerminalApp::WindowsTerminal,
                TerminalApp::Powershell,
                TerminalApp::Cmd,
            ],
            Platform::Macos => &[
                TerminalApp::Ghostty,
                TerminalApp::AppleTerminal,
                TerminalApp::Iterm,
            ],
            Platform::Linux => &[
                TerminalApp::Ghostty,
                TerminalApp::GnomeTerminal,
                TerminalApp::Konsole,
                TerminalApp::Xterm,
            ],
        }
    }

    pub fn supported_on(self, platform: Platform) -> bool {
        Self::options_for(platform).contains(&self)
    }

    /// Name as written in the config file.
    pub fn config_name(self) -> &'static str {
        match self {
            TerminalApp::WindowsTerminal => "wt",
            TerminalApp::Powershell => "powershell",
            TerminalApp::Cmd => "cmd",
            TerminalApp::Ghostty => "ghostty",
            TerminalApp::AppleTerminal => "terminal",
            TerminalApp::Iterm => "iterm",
            TerminalApp::GnomeTerminal => "gnome-terminal",
            TerminalApp::Konsole => "konsole",
            TerminalApp::Xterm => "xterm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
    /// Per-project terminal override; falls back to the global setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<TerminalApp>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_show_on_startup")]
    pub show_on_startup: bool,
    #[serde(default = "default_terminal")]
    pub terminal: TerminalApp,
}

fn default_show_on_startup() -> bool {
    true
}

fn default_terminal() -> TerminalApp {
    TerminalApp::platform_default(Platform::current())
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            show_on_startup: default_show_on_startup(),
            terminal: default_terminal(),
        }
    }
}

/// Root of the YAML config document. Field order is preserved on save:
/// settings first, then projects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn documented_config_sample_parses() {
        let yaml = r#"
settings:
  show_on_startup: true
  terminal: ghostty
projects:
  - name: My App
    path: /home/me/dev/my-app
    actions:
      - type: ide
        ide: vscode
      - type: terminal
        commands: ["npm install", "npm run dev"]
      - type: ai_tool
        tool: claude
      - type: browser
        browsers: [firefox]
        tabs: ["http://localhost:3000"]
"#;
        let config: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.settings.terminal, TerminalApp::Ghostty);
        assert!(config.settings.show_on_startup);
        assert_eq!(config.projects.len(), 1);
        let project = &config.projects[0];
        assert_eq!(project.name, "My App");
        assert_eq!(
            project.actions,
            vec![
                Action::Ide { ide: Ide::Vscode },
                Action::Terminal {
                    commands: vec!["npm install".to_string(), "npm run dev".to_string()],
                },
                Action::AiTool {
                    tool: AiTool::Claude,
                },
                Action::Browser {
                    browsers: vec![BrowserKind::Firefox],
                    tabs: vec!["http://localhost:3000".to_string()],
                },
            ]
        );
    }

    #[test]
    fn legacy_vscode_action_tag_parses_as_ide() {
        let yaml = "type: vscode";
        let action: Action = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(action, Action::Ide { ide: Ide::Vscode });
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: ConfigFile = serde_yaml::from_str("projects: []").unwrap();
        assert!(config.settings.show_on_startup);
        assert_eq!(
            config.settings.terminal,
            TerminalApp::platform_default(Platform::current())
        );
    }

    #[test]
    fn terminal_config_names_round_trip() {
        for &term in TerminalApp::options_for(Platform::Windows)
            .iter()
            .chain(TerminalApp::options_for(Platform::Macos))
            .chain(TerminalApp::options_for(Platform::Linux))
        {
            let yaml = serde_yaml::to_string(&term).unwrap();
            assert_eq!(yaml.trim(), term.config_name());
            let back: TerminalApp = serde_yaml::from_str(term.config_name()).unwrap();
            assert_eq!(back, term);
        }
    }

    #[test]
    fn browser_actions_do_not_need_the_project_dir() {
        let browser = Action::Browser {
            browsers: vec![],
            tabs: vec![],
        };
        assert!(!browser.needs_project_dir());
        assert!(Action::Ide { ide: Ide::Zed }.needs_project_dir());
        assert!(Action::Terminal { commands: vec![] }.needs_project_dir());
    }
}
