mod cli;
mod error;
mod history;
mod launcher;
mod models;
mod shortcut;
mod startup;
mod store;
mod update;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, ShortcutOp, ShortcutTarget, ToggleAction};
use error::StartupError;
use history::HistoryLog;
use log::warn;
use models::{Action, Project};
use shortcut::ShortcutKind;
use store::{Resolution, Store};

// Ask before acting on a fuzzy name suggestion.
fn ask_user_confirmation(input_name: &str, suggested_name: &str) -> bool {
    print!("'{input_name}' not found. Did you mean '{suggested_name}'? (y/n): ");
    let _ = io::stdout().flush();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Resolve a project name through the store, confirming near misses with
/// the user (`yes` accepts the suggestion without prompting).
fn resolve_or_report(store: &Store, name: &str, yes: bool) -> Option<String> {
    match store.resolve_project(name) {
        Resolution::Exact(index) => Some(store.projects()[index].name.clone()),
        Resolution::Suggestion {
            name: suggestion, ..
        } => {
            if yes || ask_user_confirmation(name, &suggestion) {
                Some(suggestion)
            } else {
                println!("Operation cancelled.");
                None
            }
        }
        Resolution::NotFound => {
            println!("Project '{name}' not found.");
            None
        }
    }
}

fn print_projects(store: &Store) {
    if store.projects().is_empty() {
        println!("No projects configured. Add one with 'kickoff add <name> <path>'.");
        return;
    }
    println!("Projects ({}):", store.projects().len());
    for project in store.projects() {
        println!("  {}  {}", project.name, project.path.display());
        for action in &project.actions {
            println!("      - {}", action.describe());
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List) => {
            let store = Store::load().context("failed to load config")?;
            print_projects(&store);
        }
        Some(Commands::Launch {
            name,
            terminal,
            yes,
        }) => {
            let store = Store::load().context("failed to load config")?;
            let Some(resolved) = resolve_or_report(&store, &name, yes) else {
                return Ok(());
            };
            let Some(project) = store.project(&resolved).cloned() else {
                println!("Project '{resolved}' not found.");
                return Ok(());
            };

            let mut settings = store.settings().clone();
            if let Some(terminal) = terminal {
                settings.terminal = terminal;
            }

            let mut log = HistoryLog::begin(cli.auto);
            log.record(&format!("launching '{}'", project.name));
            let report = launcher::launch(&project, &settings);
            for started in &report.started {
                println!("started {started}");
                log.record(&format!("started {started}"));
            }
            for err in &report.errors {
                // Failed actions are reported, never fatal.
                eprintln!("failed: {err}");
                log.record(&format!("failed: {err}"));
            }
            log.end();

            if report.all_started() {
                println!("Project '{}' launched.", project.name);
            } else {
                println!(
                    "Project '{}' launched with {} failed action(s).",
                    project.name,
                    report.errors.len()
                );
            }
        }
        Some(Commands::Add {
            name,
            path,
            ide,
            ai_tool,
            run,
            browsers,
            tabs,
            terminal,
        }) => {
            let mut store = Store::load().context("failed to load config")?;

            let path = PathBuf::from(path);
            if !path.is_dir() {
                // Launch-time invariant, not an add-time one: warn and keep
                // going so projects can be configured ahead of a checkout.
                println!("Warning: {} is not a directory yet.", path.display());
            }

            let mut actions = Vec::new();
            if let Some(ide) = ide {
                actions.push(Action::Ide { ide });
            }
            if let Some(tool) = ai_tool {
                actions.push(Action::AiTool { tool });
            }
            if !run.is_empty() {
                actions.push(Action::Terminal { commands: run });
            }
            if !tabs.is_empty() || !browsers.is_empty() {
                actions.push(Action::Browser { browsers, tabs });
            }

            let project = Project {
                name: name.clone(),
                path,
                terminal,
                actions,
            };
            match store.add_project(project) {
                Ok(()) => println!("Project '{name}' added."),
                Err(err) => println!("Error: {err}"),
            }
        }
        Some(Commands::Edit {
            name,
            rename,
            path,
            terminal,
            yes,
        }) => {
            let mut store = Store::load().context("failed to load config")?;
            let Some(resolved) = resolve_or_report(&store, &name, yes) else {
                return Ok(());
            };
            let Some(mut project) = store.project(&resolved).cloned() else {
                println!("Project '{resolved}' not found.");
                return Ok(());
            };
            if let Some(rename) = rename {
                project.name = rename;
            }
            if let Some(path) = path {
                let path = PathBuf::from(path);
                if !path.is_dir() {
                    println!("Warning: {} is not a directory yet.", path.display());
                }
                project.path = path;
            }
            if let Some(terminal) = terminal {
                project.terminal = Some(terminal);
            }
            match store.update_project(&resolved, project) {
                Ok(()) => println!("Project '{resolved}' updated."),
                Err(err) => println!("Error: {err}"),
            }
        }
        Some(Commands::Remove { name, yes }) => {
            let mut store = Store::load().context("failed to load config")?;
            let Some(resolved) = resolve_or_report(&store, &name, yes) else {
                return Ok(());
            };
            match store.remove_project(&resolved) {
                Ok(removed) => println!("Project '{}' removed.", removed.name),
                Err(err) => println!("Error: {err}"),
            }
        }
        Some(Commands::Set { key, value }) => {
            let mut store = Store::load().context("failed to load config")?;
            match store.set_setting(&key, &value) {
                Ok(()) => {
                    println!("{key} = {value}");
                    if key == "show_on_startup" {
                        // Keep the login registration in line with the
                        // setting.
                        let enabled = store.settings().show_on_startup;
                        if let Err(err) = startup::set_enabled(enabled) {
                            warn!("could not sync startup registration: {err}");
                        }
                    }
                }
                Err(err) => println!("Error: {err}"),
            }
        }
        Some(Commands::Get { key }) => {
            let store = Store::load().context("failed to load config")?;
            match store.get_setting(&key) {
                Ok(value) => println!("{value}"),
                Err(err) => println!("Error: {err}"),
            }
        }
        Some(Commands::Startup { action }) => match action {
            ToggleAction::Enable => match startup::set_enabled(true) {
                Ok(()) => println!("Startup enabled ({}).", startup::location().display()),
                Err(err @ StartupError::PermissionDenied { .. }) => {
                    println!("Error: {err}. Re-run from an elevated shell.");
                }
                Err(err) => println!("Error: {err}"),
            },
            ToggleAction::Disable => match startup::set_enabled(false) {
                Ok(()) => println!("Startup disabled."),
                Err(err) => println!("Error: {err}"),
            },
            ToggleAction::Status => {
                let state = if startup::is_enabled() {
                    "enabled"
                } else {
                    "disabled"
                };
                println!("Startup is {state} ({}).", startup::location().display());
            }
        },
        Some(Commands::Shortcut { kind, action }) => {
            let kind = match kind {
                ShortcutTarget::Desktop => ShortcutKind::Desktop,
                ShortcutTarget::Menu => ShortcutKind::Menu,
            };
            match action {
                ShortcutOp::Create => match shortcut::create(kind) {
                    Ok(path) => println!("Created {} at {}.", kind.describe(), path.display()),
                    Err(err) => println!("Error: {err}"),
                },
                ShortcutOp::Remove => match shortcut::remove(kind) {
                    Ok(()) => println!("Removed {}.", kind.describe()),
                    Err(err) => println!("Error: {err}"),
                },
                ShortcutOp::Status => {
                    let state = if shortcut::exists(kind) {
                        "present"
                    } else {
                        "absent"
                    };
                    println!("The {} is {state}.", kind.describe());
                }
            }
        }
        Some(Commands::Install {
            desktop,
            menu,
            startup,
        }) => match shortcut::install(desktop, menu, startup) {
            Ok(path) => println!("Installed to {}.", path.display()),
            Err(err) => println!("Error: {err}"),
        },
        Some(Commands::Uninstall { purge }) => match shortcut::uninstall(purge) {
            Ok(()) => println!("Uninstalled."),
            Err(err) => println!("Error: {err}"),
        },
        Some(Commands::Update) => {
            let rt = tokio::runtime::Runtime::new()?;
            match rt.block_on(update::check()) {
                Ok(Some(info)) => {
                    println!("Update available: {} -> {}", info.current, info.latest);
                    if !info.release_name.is_empty() {
                        println!("  {}", info.release_name);
                    }
                    if !info.published_at.is_empty() {
                        println!("  published {}", info.published_at);
                    }
                    if !info.notes.is_empty() {
                        println!("\n{}", info.notes);
                    }
                    println!("\nDownload: {}", info.download_url);
                }
                Ok(None) => {
                    println!(
                        "You're running the latest version ({}).",
                        env!("CARGO_PKG_VERSION")
                    );
                }
                Err(err) => {
                    warn!("update check failed: {err:#}");
                    println!("Update check failed; see {}", update::download_page());
                }
            }
        }
        Some(Commands::Completions { shell }) => {
            use clap_complete::{generate, Shell};
            let shell = shell.to_lowercase();
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "elvish" => Shell::Elvish,
                "powershell" => Shell::PowerShell,
                _ => {
                    println!("Unsupported shell: {shell}");
                    return Ok(());
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "kickoff", &mut std::io::stdout());
        }
        None => {
            // Default behavior: show the project list. Auto-start
            // invocations stay quiet when the user turned that off.
            let store = Store::load().context("failed to load config")?;
            if cli.auto && !store.settings().show_on_startup {
                return Ok(());
            }
            print_projects(&store);
        }
    }

    Ok(())
}
