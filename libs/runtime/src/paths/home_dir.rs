use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// Resolve the server home directory to an absolute path.
///
/// * `None` → `<platform home>/<default_subdir>` (`%APPDATA%` on Windows, `$HOME` elsewhere)
/// * `~` or `~/x` → expanded against the platform home
/// * relative paths → joined onto the current directory
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured {
        None => platform_home()?.join(default_subdir),
        Some(raw) => expand_tilde(raw.trim())?,
    };

    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(path)
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home dir {}", path.display()))?;
    }
    Ok(path)
}

fn platform_home() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let home = dirs::config_dir();
    #[cfg(not(target_os = "windows"))]
    let home = dirs::home_dir();
    home.ok_or_else(|| anyhow!("cannot determine the user's home directory"))
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_home();
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => Ok(platform_home()?.join(rest)),
        None => Ok(Path::new(raw).to_path_buf()),
    }
}
