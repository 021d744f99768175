//! Auto-start registration. Two states, enabled and disabled, both
//! idempotent: the registration artifact on disk is the state.
//!
//! Windows uses a shell link in the user Startup folder, macOS a
//! LaunchAgent plist, Linux an XDG autostart entry. Auto-start invocations
//! carry a hidden `--auto` flag so the launch history can tell them apart.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use log::{debug, warn};

use crate::error::StartupError;
use crate::models::Platform;
use crate::shortcut;

const LAUNCH_AGENT_LABEL: &str = "com.kickoff.launcher";

/// Path of the registration artifact for the current platform.
pub fn location() -> PathBuf {
    location_on(Platform::current())
}

fn location_on(platform: Platform) -> PathBuf {
    match platform {
        Platform::Windows => windows_startup_folder().join("Kickoff.lnk"),
        Platform::Macos => home()
            .join("Library")
            .join("LaunchAgents")
            .join(format!("{LAUNCH_AGENT_LABEL}.plist")),
        Platform::Linux => xdg_config_home().join("autostart").join("kickoff.desktop"),
    }
}

pub fn is_enabled() -> bool {
    location().exists()
}

pub fn set_enabled(enabled: bool) -> Result<(), StartupError> {
    let platform = Platform::current();
    if enabled {
        enable(platform)
    } else {
        disable(platform)
    }
}

fn enable(platform: Platform) -> Result<(), StartupError> {
    let path = location_on(platform);
    let exe = std::env::current_exe()
        .map_err(|source| StartupError::from_io(path.clone(), source))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|source| StartupError::from_io(parent.to_path_buf(), source))?;
    }

    match platform {
        Platform::Windows => {
            cleanup_legacy_windows();
            shortcut::create_windows_lnk(&path, &exe, "Kickoff - launch your projects")
                .map_err(|source| StartupError::from_io(path.clone(), source))?;
        }
        Platform::Macos => {
            let plist = launch_agent_plist(&exe.to_string_lossy());
            fs::write(&path, plist)
                .map_err(|source| StartupError::from_io(path.clone(), source))?;
            // Best effort; the plist on disk is what matters at next login.
            let _ = Command::new("launchctl")
                .args(["load", &path.to_string_lossy()])
                .output();
        }
        Platform::Linux => {
            let entry = autostart_desktop_entry(&exe.to_string_lossy());
            fs::write(&path, entry)
                .map_err(|source| StartupError::from_io(path.clone(), source))?;
            make_executable(&path)
                .map_err(|source| StartupError::from_io(path.clone(), source))?;
        }
    }

    debug!("startup enabled at {}", path.display());
    Ok(())
}

fn disable(platform: Platform) -> Result<(), StartupError> {
    let path = location_on(platform);

    if platform == Platform::Windows {
        cleanup_legacy_windows();
    }
    if platform == Platform::Macos && path.exists() {
        let _ = Command::new("launchctl")
            .args(["unload", &path.to_string_lossy()])
            .output();
    }

    if path.exists() {
        fs::remove_file(&path).map_err(|source| StartupError::from_io(path.clone(), source))?;
        debug!("startup disabled, removed {}", path.display());
    }
    Ok(())
}

/// Older releases registered through a Startup-folder VBS script, an HKCU
/// Run value, or a scheduled task. Remove whichever is present so only the
/// shell link remains.
fn cleanup_legacy_windows() {
    let vbs = windows_startup_folder().join("Kickoff.vbs");
    if vbs.exists() {
        if let Err(err) = fs::remove_file(&vbs) {
            warn!("could not remove legacy startup script {}: {err}", vbs.display());
        }
    }
    let _ = Command::new("reg")
        .args([
            "delete",
            r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run",
            "/v",
            "Kickoff",
            "/f",
        ])
        .output();
    let _ = Command::new("schtasks")
        .args(["/delete", "/tn", "Kickoff", "/f"])
        .output();
}

fn launch_agent_plist(exe: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{LAUNCH_AGENT_LABEL}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{exe}</string>
        <string>--auto</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>LaunchOnlyOnce</key>
    <true/>
</dict>
</plist>
"#
    )
}

fn autostart_desktop_entry(exe: &str) -> String {
    format!(
        r#"[Desktop Entry]
Type=Application
Name=Kickoff
Comment=Launch development projects
Exec="{exe}" --auto
Hidden=false
NoDisplay=false
X-GNOME-Autostart-enabled=true
Terminal=false
"#
    )
}

#[cfg(unix)]
fn make_executable(path: &std::path::Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &std::path::Path) -> std::io::Result<()> {
    Ok(())
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn windows_startup_folder() -> PathBuf {
    std::env::var_os("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|| home().join("AppData").join("Roaming"))
        .join("Microsoft")
        .join("Windows")
        .join("Start Menu")
        .join("Programs")
        .join("Startup")
}

fn xdg_config_home() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home().join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_agent_runs_once_at_load_with_the_auto_flag() {
        let plist = launch_agent_plist("/Applications/Kickoff/kickoff");
        assert!(plist.contains("<string>com.kickoff.launcher</string>"));
        assert!(plist.contains("<string>/Applications/Kickoff/kickoff</string>"));
        assert!(plist.contains("<string>--auto</string>"));
        assert!(plist.contains("<key>RunAtLoad</key>"));
        assert!(plist.contains("<key>LaunchOnlyOnce</key>"));
    }

    #[test]
    fn autostart_entry_marks_the_invocation_as_auto() {
        let entry = autostart_desktop_entry("/home/me/.local/share/kickoff/kickoff");
        assert!(entry.contains("Exec=\"/home/me/.local/share/kickoff/kickoff\" --auto"));
        assert!(entry.contains("X-GNOME-Autostart-enabled=true"));
        assert!(entry.contains("Terminal=false"));
    }

    #[test]
    fn registration_artifacts_sit_in_the_platform_startup_location() {
        let windows = location_on(Platform::Windows);
        assert!(windows.ends_with("Startup/Kickoff.lnk") || windows.ends_with("Startup\\Kickoff.lnk"));
        let macos = location_on(Platform::Macos);
        assert!(macos.ends_with("LaunchAgents/com.kickoff.launcher.plist"));
        let linux = location_on(Platform::Linux);
        assert!(linux.ends_with("autostart/kickoff.desktop"));
    }
}
