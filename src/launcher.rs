//! Fire-and-forget action runner. Every configured action of a project is
//! attempted in order; failures are collected, never rolled back.

use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::error::ActionError;
use crate::models::{Action, BrowserKind, Ide, Platform, Project, Settings, TerminalApp};

/// Delay between opening tabs (and between browsers) so the browser groups
/// windows sanely.
pub const TAB_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
pub struct LaunchReport {
    /// Human description of each action that started.
    pub started: Vec<String>,
    pub errors: Vec<ActionError>,
}

impl LaunchReport {
    pub fn all_started(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Launch every action of `project`. Path-dependent actions fail when the
/// project directory is missing; browser actions are still attempted.
pub fn launch(project: &Project, settings: &Settings) -> LaunchReport {
    let terminal = project.terminal.unwrap_or(settings.terminal);
    launch_on(Platform::current(), project, terminal)
}

fn launch_on(platform: Platform, project: &Project, terminal: TerminalApp) -> LaunchReport {
    let mut report = LaunchReport::default();
    let dir_ok = project.path.is_dir();
    let path = project.path.to_string_lossy().to_string();

    for action in &project.actions {
        if action.needs_project_dir() && !dir_ok {
            warn!(
                "skipping {} for '{}': directory missing",
                action.describe(),
                project.name
            );
            report.errors.push(ActionError::MissingProjectDir {
                path: project.path.clone(),
            });
            continue;
        }

        let result = match action {
            Action::Ide { ide } => launch_ide(*ide, &path),
            Action::AiTool { tool } => {
                launch_terminal(platform, terminal, &path, &[tool.command().to_string()])
            }
            Action::Terminal { commands } => launch_terminal(platform, terminal, &path, commands),
            Action::Browser { browsers, tabs } => launch_browser(platform, browsers, tabs),
        };

        match result {
            Ok(()) => report.started.push(action.describe()),
            Err(err) => report.errors.push(err),
        }
    }

    report
}

fn launch_ide(ide: Ide, path: &str) -> Result<(), ActionError> {
    spawn_detached(&[ide.command().to_string(), path.to_string()])
}

/// Open a terminal window at `path`, running `commands` in order.
pub fn launch_terminal(
    platform: Platform,
    terminal: TerminalApp,
    path: &str,
    commands: &[String],
) -> Result<(), ActionError> {
    let terminal = resolve_terminal(platform, terminal)?;
    for argv in terminal_invocations(platform, terminal, path, commands) {
        spawn_detached(&argv)?;
    }
    Ok(())
}

/// Pick a terminal usable on this platform. A configured terminal from
/// another platform falls back to the default; on Linux the candidates are
/// probed with `which` in order.
fn resolve_terminal(platform: Platform, terminal: TerminalApp) -> Result<TerminalApp, ActionError> {
    if terminal.supported_on(platform) {
        return Ok(terminal);
    }
    if platform != Platform::Linux {
        return Ok(TerminalApp::platform_default(platform));
    }
    for candidate in TerminalApp::options_for(Platform::Linux) {
        let found = Command::new("which")
            .arg(candidate.config_name())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        if found {
            debug!("falling back to terminal '{}'", candidate.config_name());
            return Ok(*candidate);
        }
    }
    Err(ActionError::NoTerminalAvailable)
}

/// Argv sequences spawned, in order, to open the terminal. Pure so every
/// platform's command shapes are testable on any host. Ghostty on macOS
/// needs a second `osascript` invocation to type the commands because it
/// has no command-execution flag.
pub(crate) fn terminal_invocations(
    platform: Platform,
    terminal: TerminalApp,
    path: &str,
    commands: &[String],
) -> Vec<Vec<String>> {
    let joined = commands.join(" && ");
    match platform {
        Platform::Windows => {
            let argv = match terminal {
                TerminalApp::Powershell => {
                    let mut command = format!("Set-Location '{path}'");
                    if !commands.is_empty() {
                        command.push_str("; ");
                        command.push_str(&commands.join("; "));
                    }
                    vec![
                        "powershell".to_string(),
                        "-NoExit".to_string(),
                        "-Command".to_string(),
                        command,
                    ]
                }
                TerminalApp::Cmd => {
                    let mut command = format!("cd /d \"{path}\"");
                    if !commands.is_empty() {
                        command.push_str(" && ");
                        command.push_str(&joined);
                    }
                    vec!["cmd".to_string(), "/k".to_string(), command]
                }
                _ => {
                    let mut argv = vec!["wt".to_string(), "-d".to_string(), path.to_string()];
                    if !commands.is_empty() {
                        argv.extend(["cmd".to_string(), "/k".to_string(), joined]);
                    }
                    argv
                }
            };
            vec![argv]
        }
        Platform::Macos => match terminal {
            TerminalApp::AppleTerminal => {
                let line = if commands.is_empty() {
                    format!("cd {path}")
                } else {
                    format!("cd {path} && {joined}")
                };
                let script = format!(
                    "tell application \"Terminal\"\n    do script \"{line}\"\n    activate\nend tell"
                );
                vec![osascript(script)]
            }
            TerminalApp::Iterm => {
                let line = if commands.is_empty() {
                    format!("cd {path}")
                } else {
                    format!("cd {path} && {joined}")
                };
                let script = format!(
                    "tell application \"iTerm\"\n    create window with default profile\n    tell current session of current window\n        write text \"{line}\"\n    end tell\nend tell"
                );
                vec![osascript(script)]
            }
            _ => {
                let mut invocations = vec![vec![
                    "open".to_string(),
                    "-a".to_string(),
                    "Ghostty".to_string(),
                    "--args".to_string(),
                    format!("--working-directory={path}"),
                ]];
                if !commands.is_empty() {
                    let script = format!(
                        "tell application \"Ghostty\"\n    activate\nend tell\ntell application \"System Events\"\n    keystroke \"cd {path} && {joined}\"\n    keystroke return\nend tell"
                    );
                    invocations.push(osascript(script));
                }
                invocations
            }
        },
        Platform::Linux => {
            let full = if commands.is_empty() {
                format!("cd \"{path}\"; exec $SHELL")
            } else {
                format!("cd \"{path}\" && {joined}; exec $SHELL")
            };
            let argv = match terminal {
                TerminalApp::GnomeTerminal => {
                    let mut argv = vec![
                        "gnome-terminal".to_string(),
                        format!("--working-directory={path}"),
                    ];
                    if !commands.is_empty() {
                        argv.extend([
                            "--".to_string(),
                            "bash".to_string(),
                            "-c".to_string(),
                            full,
                        ]);
                    }
                    argv
                }
                TerminalApp::Konsole => {
                    let mut argv = vec![
                        "konsole".to_string(),
                        "--workdir".to_string(),
                        path.to_string(),
                    ];
                    if !commands.is_empty() {
                        argv.extend([
                            "-e".to_string(),
                            "bash".to_string(),
                            "-c".to_string(),
                            full,
                        ]);
                    }
                    argv
                }
                TerminalApp::Xterm => {
                    if commands.is_empty() {
                        vec![
                            "xterm".to_string(),
                            "-e".to_string(),
                            format!("cd \"{path}\" && $SHELL"),
                        ]
                    } else {
                        vec![
                            "xterm".to_string(),
                            "-e".to_string(),
                            format!("bash -c '{full}'"),
                        ]
                    }
                }
                _ => {
                    let mut argv = vec![
                        "ghostty".to_string(),
                        format!("--working-directory={path}"),
                    ];
                    if !commands.is_empty() {
                        argv.extend([
                            "-e".to_string(),
                            "bash".to_string(),
                            "-c".to_string(),
                            full,
                        ]);
                    }
                    argv
                }
            };
            vec![argv]
        }
    }
}

fn osascript(script: String) -> Vec<String> {
    vec!["osascript".to_string(), "-e".to_string(), script]
}

/// Open `tabs` in each named browser, or the OS default when none are
/// named. Individual tab failures do not stop the remaining tabs; the
/// first failure is reported.
fn launch_browser(
    platform: Platform,
    browsers: &[BrowserKind],
    tabs: &[String],
) -> Result<(), ActionError> {
    if tabs.is_empty() {
        return Ok(());
    }

    let targets: Vec<Option<BrowserKind>> = if browsers.is_empty() {
        vec![None]
    } else {
        browsers.iter().copied().map(Some).collect()
    };

    let mut first_err = None;
    for (b, browser) in targets.iter().enumerate() {
        for (i, raw) in tabs.iter().enumerate() {
            let url = normalize_url(raw);
            let result = match browser.and_then(|kind| kind.command(platform)) {
                Some(mut argv) => {
                    argv.push(url.clone());
                    spawn_detached(&argv)
                }
                // Unknown or platform-unsupported browser: OS default.
                None => open::that_detached(&url).map_err(|source| ActionError::OpenUrl {
                    url: url.clone(),
                    source,
                }),
            };
            if let Err(err) = result {
                warn!("failed to open tab {url}: {err}");
                first_err.get_or_insert(err);
            }
            if i + 1 < tabs.len() {
                thread::sleep(TAB_DELAY);
            }
        }
        if b + 1 < targets.len() {
            thread::sleep(TAB_DELAY);
        }
    }

    match first_err {
        None => Ok(()),
        Some(err) => Err(err),
    }
}

/// Bare hostnames in tab lists get an https scheme.
pub(crate) fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Spawn a child detached from our stdio and forget about it.
fn spawn_detached(argv: &[String]) -> Result<(), ActionError> {
    let Some((program, args)) = argv.split_first() else {
        return Ok(());
    };
    debug!("spawning {argv:?}");
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ActionError::CommandNotFound {
                    command: program.clone(),
                }
            } else {
                ActionError::Spawn {
                    command: program.clone(),
                    source,
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn cmds(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn windows_terminal_opens_at_path_and_chains_commands() {
        let plain = terminal_invocations(
            Platform::Windows,
            TerminalApp::WindowsTerminal,
            "C:\\dev\\app",
            &[],
        );
        assert_eq!(plain, vec![cmds(&["wt", "-d", "C:\\dev\\app"])]);

        let with = terminal_invocations(
            Platform::Windows,
            TerminalApp::WindowsTerminal,
            "C:\\dev\\app",
            &cmds(&["npm install", "npm run dev"]),
        );
        assert_eq!(
            with,
            vec![cmds(&[
                "wt",
                "-d",
                "C:\\dev\\app",
                "cmd",
                "/k",
                "npm install && npm run dev",
            ])]
        );
    }

    #[test]
    fn powershell_joins_commands_with_semicolons() {
        let argv = terminal_invocations(
            Platform::Windows,
            TerminalApp::Powershell,
            "C:\\dev\\app",
            &cmds(&["npm install", "npm test"]),
        );
        assert_eq!(
            argv,
            vec![cmds(&[
                "powershell",
                "-NoExit",
                "-Command",
                "Set-Location 'C:\\dev\\app'; npm install; npm test",
            ])]
        );
    }

    #[test]
    fn cmd_changes_drive_and_directory() {
        let argv = terminal_invocations(
            Platform::Windows,
            TerminalApp::Cmd,
            "D:\\work",
            &cmds(&["dir"]),
        );
        assert_eq!(
            argv,
            vec![cmds(&["cmd", "/k", "cd /d \"D:\\work\" && dir"])]
        );
    }

    #[test]
    fn linux_terminals_keep_the_shell_alive_after_commands() {
        let gnome = terminal_invocations(
            Platform::Linux,
            TerminalApp::GnomeTerminal,
            "/home/me/app",
            &cmds(&["make"]),
        );
        assert_eq!(
            gnome,
            vec![cmds(&[
                "gnome-terminal",
                "--working-directory=/home/me/app",
                "--",
                "bash",
                "-c",
                "cd \"/home/me/app\" && make; exec $SHELL",
            ])]
        );

        let konsole =
            terminal_invocations(Platform::Linux, TerminalApp::Konsole, "/home/me/app", &[]);
        assert_eq!(
            konsole,
            vec![cmds(&["konsole", "--workdir", "/home/me/app"])]
        );
    }

    #[test]
    fn macos_ghostty_types_commands_through_a_second_invocation() {
        let plain =
            terminal_invocations(Platform::Macos, TerminalApp::Ghostty, "/Users/me/app", &[]);
        assert_eq!(plain.len(), 1);
        assert_eq!(plain[0][0], "open");

        let with = terminal_invocations(
            Platform::Macos,
            TerminalApp::Ghostty,
            "/Users/me/app",
            &cmds(&["make"]),
        );
        assert_eq!(with.len(), 2);
        assert_eq!(with[1][0], "osascript");
        assert!(with[1][2].contains("cd /Users/me/app && make"));
    }

    #[test]
    fn macos_terminal_and_iterm_use_applescript() {
        let terminal = terminal_invocations(
            Platform::Macos,
            TerminalApp::AppleTerminal,
            "/Users/me/app",
            &cmds(&["make"]),
        );
        assert!(terminal[0][2].contains("do script \"cd /Users/me/app && make\""));

        let iterm =
            terminal_invocations(Platform::Macos, TerminalApp::Iterm, "/Users/me/app", &[]);
        assert!(iterm[0][2].contains("create window with default profile"));
        assert!(iterm[0][2].contains("write text \"cd /Users/me/app\""));
    }

    #[test]
    fn browser_commands_match_the_platform() {
        assert_eq!(
            BrowserKind::Chrome.command(Platform::Linux),
            Some(cmds(&["google-chrome"]))
        );
        assert_eq!(
            BrowserKind::Edge.command(Platform::Windows),
            Some(cmds(&["cmd", "/c", "start", "msedge"]))
        );
        assert_eq!(
            BrowserKind::Safari.command(Platform::Macos),
            Some(cmds(&["open", "-a", "Safari"]))
        );
        // Safari does not exist off macOS; callers fall back to the default
        // handler.
        assert_eq!(BrowserKind::Safari.command(Platform::Linux), None);
    }

    #[test]
    fn urls_without_a_scheme_get_https() {
        assert_eq!(normalize_url("localhost:3000"), "https://localhost:3000");
        assert_eq!(
            normalize_url("http://localhost:3000"),
            "http://localhost:3000"
        );
        assert_eq!(normalize_url("https://crates.io"), "https://crates.io");
    }

    #[test]
    fn missing_project_dir_fails_path_actions_but_not_browser() {
        let project = Project {
            name: "ghost".to_string(),
            path: PathBuf::from("/definitely/not/here"),
            terminal: None,
            actions: vec![
                Action::Ide {
                    ide: crate::models::Ide::Vscode,
                },
                Action::Terminal { commands: vec![] },
                // No tabs, so the attempt is a no-op success with no side
                // effects.
                Action::Browser {
                    browsers: vec![],
                    tabs: vec![],
                },
            ],
        };

        let report = launch_on(Platform::Linux, &project, TerminalApp::Ghostty);
        assert_eq!(report.errors.len(), 2);
        for err in &report.errors {
            assert!(matches!(err, ActionError::MissingProjectDir { .. }));
        }
        assert_eq!(report.started, vec!["browser (0 tabs)".to_string()]);
        assert!(!report.all_started());
    }

    #[test]
    fn empty_tab_list_is_a_no_op_success() {
        assert!(launch_browser(Platform::Linux, &[BrowserKind::Firefox], &[]).is_ok());
    }
}
