//! Desktop and applications-menu shortcuts, plus the install/uninstall
//! orchestration that copies the executable into a per-user install
//! directory. macOS has no shortcut files; the app bundle is the shortcut.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};

use crate::error::ShortcutError;
use crate::models::Platform;
use crate::startup;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKind {
    Desktop,
    Menu,
}

impl ShortcutKind {
    pub fn describe(self) -> &'static str {
        match self {
            ShortcutKind::Desktop => "desktop shortcut",
            ShortcutKind::Menu => "applications menu shortcut",
        }
    }
}

pub fn exists(kind: ShortcutKind) -> bool {
    match shortcut_path(Platform::current(), kind) {
        Some(path) => path.exists(),
        None => false,
    }
}

pub fn create(kind: ShortcutKind) -> Result<PathBuf, ShortcutError> {
    let platform = Platform::current();
    let path = shortcut_path(platform, kind).ok_or(ShortcutError::Unsupported {
        what: kind.describe(),
    })?;
    let target = preferred_target(platform)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ShortcutError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match platform {
        Platform::Windows => {
            create_windows_lnk(&path, &target, "Kickoff - launch your projects").map_err(
                |source| ShortcutError::Io {
                    path: path.clone(),
                    source,
                },
            )?;
        }
        Platform::Linux => {
            let entry = desktop_entry(&target.to_string_lossy());
            fs::write(&path, entry).map_err(|source| ShortcutError::Io {
                path: path.clone(),
                source,
            })?;
            make_executable(&path).map_err(|source| ShortcutError::Io {
                path: path.clone(),
                source,
            })?;
        }
        Platform::Macos => unreachable!("macOS has no shortcut path"),
    }

    debug!("created {} at {}", kind.describe(), path.display());
    Ok(path)
}

pub fn remove(kind: ShortcutKind) -> Result<(), ShortcutError> {
    let Some(path) = shortcut_path(Platform::current(), kind) else {
        return Err(ShortcutError::Unsupported {
            what: kind.describe(),
        });
    };
    if path.exists() {
        fs::remove_file(&path).map_err(|source| ShortcutError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("removed {} at {}", kind.describe(), path.display());
    }
    Ok(())
}

/// Copy the running executable into the per-user install directory and
/// create the requested shortcuts and startup registration. Running from
/// inside the install directory skips the copy.
pub fn install(desktop: bool, menu: bool, with_startup: bool) -> Result<PathBuf, ShortcutError> {
    let platform = Platform::current();
    let current =
        std::env::current_exe().map_err(|source| ShortcutError::NoExecutable { source })?;
    let dir = install_dir(platform);
    let target = installed_exe_path(platform);

    if current.starts_with(&dir) {
        debug!("already running from {}", dir.display());
    } else {
        fs::create_dir_all(&dir).map_err(|source| ShortcutError::Io {
            path: dir.clone(),
            source,
        })?;
        fs::copy(&current, &target).map_err(|source| ShortcutError::Io {
            path: target.clone(),
            source,
        })?;
        make_executable(&target).map_err(|source| ShortcutError::Io {
            path: target.clone(),
            source,
        })?;
    }

    if desktop {
        create_if_supported(ShortcutKind::Desktop)?;
    }
    if menu {
        create_if_supported(ShortcutKind::Menu)?;
    }
    if with_startup {
        startup::set_enabled(true).map_err(|source| ShortcutError::Startup { source })?;
    }

    Ok(target)
}

/// Remove shortcuts and the startup registration, then the install
/// directory, and optionally the config directory.
pub fn uninstall(purge_config: bool) -> Result<(), ShortcutError> {
    for kind in [ShortcutKind::Desktop, ShortcutKind::Menu] {
        match remove(kind) {
            Ok(()) | Err(ShortcutError::Unsupported { .. }) => {}
            Err(err) => return Err(err),
        }
    }
    if let Err(err) = startup::set_enabled(false) {
        warn!("could not remove startup registration: {err}");
    }

    let dir = install_dir(Platform::current());
    if dir.exists() {
        fs::remove_dir_all(&dir).map_err(|source| ShortcutError::Io {
            path: dir.clone(),
            source,
        })?;
    }

    if purge_config {
        let config_dir = Store::config_dir();
        if config_dir.exists() {
            fs::remove_dir_all(&config_dir).map_err(|source| ShortcutError::Io {
                path: config_dir.clone(),
                source,
            })?;
        }
    }

    Ok(())
}

fn create_if_supported(kind: ShortcutKind) -> Result<(), ShortcutError> {
    match create(kind) {
        Ok(_) => Ok(()),
        Err(ShortcutError::Unsupported { what }) => {
            warn!("{what} not supported on this platform, skipping");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Shortcuts point at the installed copy when one exists, otherwise at the
/// running executable.
fn preferred_target(platform: Platform) -> Result<PathBuf, ShortcutError> {
    let installed = installed_exe_path(platform);
    if installed.exists() {
        return Ok(installed);
    }
    std::env::current_exe().map_err(|source| ShortcutError::NoExecutable { source })
}

fn shortcut_path(platform: Platform, kind: ShortcutKind) -> Option<PathBuf> {
    match platform {
        Platform::Windows => Some(match kind {
            ShortcutKind::Desktop => home().join("Desktop").join("Kickoff.lnk"),
            ShortcutKind::Menu => windows_start_menu_folder().join("Kickoff.lnk"),
        }),
        Platform::Linux => Some(match kind {
            ShortcutKind::Desktop => linux_desktop_folder().join("kickoff.desktop"),
            ShortcutKind::Menu => xdg_data_home().join("applications").join("kickoff.desktop"),
        }),
        Platform::Macos => None,
    }
}

pub fn install_dir(platform: Platform) -> PathBuf {
    match platform {
        Platform::Windows => std::env::var_os("LOCALAPPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| home().join("AppData").join("Local"))
            .join("Kickoff"),
        Platform::Macos => home().join("Applications").join("Kickoff"),
        Platform::Linux => home().join(".local").join("share").join("kickoff"),
    }
}

pub fn installed_exe_path(platform: Platform) -> PathBuf {
    match platform {
        Platform::Windows => install_dir(platform).join("kickoff.exe"),
        Platform::Macos | Platform::Linux => install_dir(platform).join("kickoff"),
    }
}

/// Create a `.lnk` through a generated WScript.Shell PowerShell script.
pub(crate) fn create_windows_lnk(
    lnk: &Path,
    target: &Path,
    description: &str,
) -> io::Result<()> {
    let script = powershell_lnk_script(lnk, target, description);
    let output = Command::new("powershell")
        .args(["-NoProfile", "-Command", &script])
        .output()?;
    if output.status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!(
            "powershell exited with {} creating {}",
            output.status,
            lnk.display()
        )))
    }
}

fn powershell_lnk_script(lnk: &Path, target: &Path, description: &str) -> String {
    let working_dir = target
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        r#"$WshShell = New-Object -ComObject WScript.Shell
$Shortcut = $WshShell.CreateShortcut("{lnk}")
$Shortcut.TargetPath = "{target}"
$Shortcut.WorkingDirectory = "{working_dir}"
$Shortcut.Description = "{description}"
$Shortcut.Save()"#,
        lnk = lnk.display(),
        target = target.display(),
    )
}

fn desktop_entry(exe: &str) -> String {
    format!(
        r#"[Desktop Entry]
Type=Application
Name=Kickoff
Comment=Launch development projects
Exec="{exe}"
Terminal=false
Categories=Development;
"#
    )
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn windows_start_menu_folder() -> PathBuf {
    std::env::var_os("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|| home().join("AppData").join("Roaming"))
        .join("Microsoft")
        .join("Windows")
        .join("Start Menu")
        .join("Programs")
}

fn linux_desktop_folder() -> PathBuf {
    std::env::var_os("XDG_DESKTOP_DIR")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home().join("Desktop"))
}

fn xdg_data_home() -> PathBuf {
    std::env::var_os("XDG_DATA_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home().join(".local").join("share"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_entry_launches_without_a_terminal() {
        let entry = desktop_entry("/home/me/.local/share/kickoff/kickoff");
        assert!(entry.contains("Exec=\"/home/me/.local/share/kickoff/kickoff\""));
        assert!(entry.contains("Terminal=false"));
        assert!(entry.contains("Categories=Development;"));
        // Shortcut entries do not carry the auto-start tag.
        assert!(!entry.contains("--auto"));
    }

    #[test]
    fn powershell_script_fills_in_link_target_and_working_dir() {
        let script = powershell_lnk_script(
            Path::new("shortcuts/Kickoff.lnk"),
            Path::new("install/Kickoff/kickoff.exe"),
            "Kickoff",
        );
        assert!(script.contains(r#"CreateShortcut("shortcuts/Kickoff.lnk")"#));
        assert!(script.contains(r#"TargetPath = "install/Kickoff/kickoff.exe""#));
        assert!(script.contains(r#"WorkingDirectory = "install/Kickoff""#));
        assert!(script.contains(r#"Description = "Kickoff""#));
        assert!(script.contains("$Shortcut.Save()"));
    }

    #[test]
    fn macos_has_no_shortcut_files() {
        assert!(shortcut_path(Platform::Macos, ShortcutKind::Desktop).is_none());
        assert!(shortcut_path(Platform::Macos, ShortcutKind::Menu).is_none());
    }

    #[test]
    fn shortcut_and_install_paths_follow_the_platform_conventions() {
        let menu = shortcut_path(Platform::Linux, ShortcutKind::Menu).unwrap();
        assert!(menu.ends_with("applications/kickoff.desktop"));
        assert!(install_dir(Platform::Linux).ends_with(".local/share/kickoff"));
        assert!(installed_exe_path(Platform::Windows).ends_with("Kickoff/kickoff.exe"));
    }
}
