//! Color palette, configuration directories, and user settings.
//!
//! The palette is a fixed set of [`ratatui::style::Color`] values grouped
//! into neutrals, overlays, and accents. Settings are read once from
//! `~/.config/piptui/settings.toml`; a missing or malformed file falls back
//! to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use ratatui::style::Color;
use tracing::warn;

/// Application theme palette used by rendering code.
pub struct Theme {
    /// Primary background color for the canvas.
    pub base: Color,
    /// Slightly lighter background layer used behind modals.
    pub mantle: Color,
    /// Darkest background shade, used under selection highlights.
    pub crust: Color,
    /// Subtle surface color for unfocused borders.
    pub surface1: Color,
    /// Subtle surface color for pane borders.
    pub surface2: Color,
    /// Muted color for titles and secondary chrome.
    pub overlay1: Color,
    /// Primary foreground text color.
    pub text: Color,
    /// Secondary text for unfocused content.
    pub subtext0: Color,
    /// Accent for the focused input prompt.
    pub sapphire: Color,
    /// Accent for focused titles and modal borders.
    pub mauve: Color,
    /// Success/enabled state color.
    pub green: Color,
    /// Busy/attention state color.
    pub yellow: Color,
    /// Error/danger state color.
    pub red: Color,
    /// Accent for selection highlights.
    pub lavender: Color,
}

/// Construct a [`Color::Rgb`] from an 8-bit RGB triplet.
const fn hex(rgb: (u8, u8, u8)) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Return the application's theme palette.
#[must_use]
pub const fn theme() -> Theme {
    Theme {
        base: hex((0x1e, 0x1e, 0x2e)),
        mantle: hex((0x18, 0x18, 0x25)),
        crust: hex((0x11, 0x11, 0x1b)),
        surface1: hex((0x45, 0x47, 0x5a)),
        surface2: hex((0x58, 0x5b, 0x70)),
        overlay1: hex((0x7f, 0x84, 0x9c)),
        text: hex((0xcd, 0xd6, 0xf4)),
        subtext0: hex((0xa6, 0xad, 0xc8)),
        sapphire: hex((0x74, 0xc7, 0xec)),
        mauve: hex((0xcb, 0xa6, 0xf7)),
        green: hex((0xa6, 0xe3, 0xa1)),
        yellow: hex((0xf9, 0xe2, 0xaf)),
        red: hex((0xf3, 0x8b, 0xa8)),
        lavender: hex((0xb4, 0xbe, 0xfe)),
    }
}

/// Per-user configuration directory (`$XDG_CONFIG_HOME/piptui` or
/// `~/.config/piptui`), created on first use.
#[must_use]
pub fn config_dir() -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));
    let dir = base.join("piptui");
    let _ = fs::create_dir_all(&dir);
    dir
}

/// Log directory under the configuration directory.
#[must_use]
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = fs::create_dir_all(&dir);
    dir
}

/// User settings loaded from `settings.toml`.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Package index base URL; `None` means the default index.
    pub index_url: Option<String>,
    /// Explicit pip executable name or path; `None` resolves pip3/pip.
    pub pip_command: Option<String>,
    /// Whether to start in dry-run mode even without `--dry-run`.
    pub dry_run_default: bool,
}

/// Load settings from the default location.
#[must_use]
pub fn settings() -> Settings {
    load_settings(&config_dir().join("settings.toml"))
}

/// Load settings from `path`, falling back to defaults when the file is
/// missing or malformed.
#[must_use]
pub fn load_settings(path: &Path) -> Settings {
    let Ok(raw) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match toml::from_str(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Settings, load_settings};
    use std::io::Write;

    /// What: Settings parse from TOML with partial keys
    ///
    /// - Input: File setting only `index_url`
    /// - Output: Other fields keep their defaults
    #[test]
    fn settings_load_partial_file() {
        let mut f = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(f, "index_url = \"https://test.pypi.org\"").expect("write");
        let s = load_settings(f.path());
        assert_eq!(s.index_url.as_deref(), Some("https://test.pypi.org"));
        assert_eq!(s.pip_command, None);
        assert!(!s.dry_run_default);
    }

    /// What: Missing and malformed files fall back to defaults
    ///
    /// - Input: Nonexistent path; file with invalid TOML
    /// - Output: `Settings::default()` both times
    #[test]
    fn settings_fall_back_to_defaults() {
        let s = load_settings(std::path::Path::new("/nonexistent/settings.toml"));
        assert_eq!(s, Settings::default());

        let mut f = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(f, "not valid toml [").expect("write");
        assert_eq!(load_settings(f.path()), Settings::default());
    }
}
