use clap::ValueEnum;
use log::warn;
use rcp_plugin::byte_order::MemoryOrder;
use rcp_plugin::hardware::SystemType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryOrderSetting {
    /// Whatever the plugin prefers.
    #[default]
    Auto,
    Normal,
    Swapped,
}

impl MemoryOrderSetting {
    pub fn order(self) -> Option<MemoryOrder> {
        match self {
            Self::Auto => None,
            Self::Normal => Some(MemoryOrder::Normal),
            Self::Swapped => Some(MemoryOrder::Swapped),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SystemSetting {
    #[default]
    Ntsc,
    Pal,
    Mpal,
}

impl SystemSetting {
    pub fn system_type(self) -> SystemType {
        match self {
            Self::Ntsc => SystemType::Ntsc,
            Self::Pal => SystemType::Pal,
            Self::Mpal => SystemType::Mpal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub memory_order: MemoryOrderSetting,
    pub system_type: SystemSetting,
    /// Searched by `scan` when no directory is given.
    pub plugin_dirs: Vec<PathBuf>,
    pub smoke_ticks: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            memory_order: MemoryOrderSetting::Auto,
            system_type: SystemSetting::Ntsc,
            plugin_dirs: Vec::new(),
            smoke_ticks: 60,
        }
    }
}

pub fn default_probe_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("rcp-plugin").join("probe.toml");
        }
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("rcp-plugin").join("probe.toml");
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("rcp-plugin")
            .join("probe.toml");
    }

    PathBuf::from("probe.toml")
}

pub fn load_from_file(path: &Path) -> ProbeConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return ProbeConfig::default(),
    };

    match toml::from_str::<ProbeConfig>(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse probe config {}: {e}; using defaults",
                path.display()
            );
            ProbeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_from_file(&dir.path().join("probe.toml"));
        assert_eq!(cfg, ProbeConfig::default());
        assert_eq!(cfg.smoke_ticks, 60);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.toml");
        std::fs::write(
            &path,
            "memory_order = \"normal\"\nsystem_type = \"pal\"\nplugin_dirs = [\"/opt/plugins\"]\n",
        )
        .unwrap();
        let cfg = load_from_file(&path);
        assert_eq!(cfg.memory_order.order(), Some(MemoryOrder::Normal));
        assert_eq!(cfg.system_type.system_type(), SystemType::Pal);
        assert_eq!(cfg.plugin_dirs, vec![PathBuf::from("/opt/plugins")]);
        assert_eq!(cfg.smoke_ticks, 60);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.toml");
        std::fs::write(&path, "smoke_ticks = \"many\"").unwrap();
        assert_eq!(load_from_file(&path), ProbeConfig::default());
    }
}
