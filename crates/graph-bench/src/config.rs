//! Startup configuration read from `GRAPHTOOL_*` environment variables.

use std::ffi::OsString;
use std::str::FromStr;

use graph_engine::device::GpuInit;
use graph_engine::render::PointVertex;
use graph_engine::window::RuntimeConfig;
use winit::dpi::PhysicalSize;

pub const VAR_WIDTH: &str = "GRAPHTOOL_WIDTH";
pub const VAR_HEIGHT: &str = "GRAPHTOOL_HEIGHT";
pub const VAR_POINT_COUNT: &str = "GRAPHTOOL_POINT_COUNT";
pub const VAR_BATCH_SIZE: &str = "GRAPHTOOL_BATCH_SIZE";
pub const VAR_BATCH_MUTATION: &str = "GRAPHTOOL_BATCH_MUTATION";
pub const VAR_TIMED_SECTION: &str = "GRAPHTOOL_TIMED_SECTION";
pub const VAR_VSYNC: &str = "GRAPHTOOL_VSYNC";

const VARS: [&str; 7] = [
    VAR_WIDTH,
    VAR_HEIGHT,
    VAR_POINT_COUNT,
    VAR_BATCH_SIZE,
    VAR_BATCH_MUTATION,
    VAR_TIMED_SECTION,
    VAR_VSYNC,
];

pub const WINDOW_TITLE: &str = "Graph";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: expected {expected}, got `{value}`")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
}

/// Which part of an iteration is timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimedSection {
    /// Clear, draw and present only.
    #[default]
    Render,
    /// Patch generation and upload plus clear, draw and present.
    Frame,
}

impl FromStr for TimedSection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "render" => Ok(Self::Render),
            "frame" => Ok(Self::Frame),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Window width in physical pixels.
    pub width: u32,
    /// Window height in physical pixels.
    pub height: u32,
    /// Points in the vertex buffer; every frame draws all of them.
    pub point_count: u32,
    /// Points overwritten per frame.
    pub batch_size: u32,
    /// When false the buffer is never patched and the run lasts until the
    /// window is closed.
    pub enable_batch_mutation: bool,
    pub timed_section: TimedSection,
    pub vsync: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            width: 2560,
            height: 1440,
            point_count: 67_108_864,
            batch_size: 16_384,
            enable_batch_mutation: true,
            timed_section: TimedSection::Render,
            vsync: true,
        }
    }
}

impl BenchConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Like `from_vars`, for raw environment pairs. A recognized variable
    /// whose value is not valid UTF-8 is an error; other names are skipped.
    pub fn from_os_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut known = Vec::new();
        for (key, value) in vars {
            let Some(var) = key.to_str().and_then(|k| VARS.into_iter().find(|v| *v == k)) else {
                continue;
            };
            let value = value.into_string().map_err(|raw| ConfigError::Invalid {
                var,
                value: raw.to_string_lossy().into_owned(),
                expected: "UTF-8 text",
            })?;
            known.push((var, value));
        }
        Self::from_vars(known)
    }

    /// Defaults overridden by `(name, value)` pairs. Unrelated names are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                VAR_WIDTH => config.width = parse_count(VAR_WIDTH, value)?,
                VAR_HEIGHT => config.height = parse_count(VAR_HEIGHT, value)?,
                VAR_POINT_COUNT => config.point_count = parse_count(VAR_POINT_COUNT, value)?,
                VAR_BATCH_SIZE => config.batch_size = parse_count(VAR_BATCH_SIZE, value)?,
                VAR_BATCH_MUTATION => {
                    config.enable_batch_mutation = parse_flag(VAR_BATCH_MUTATION, value)?
                }
                VAR_TIMED_SECTION => {
                    config.timed_section = value.parse().map_err(|_| ConfigError::Invalid {
                        var: VAR_TIMED_SECTION,
                        value: value.to_owned(),
                        expected: "`render` or `frame`",
                    })?
                }
                VAR_VSYNC => config.vsync = parse_flag(VAR_VSYNC, value)?,
                _ => {}
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let nonzero = [
            (VAR_WIDTH, self.width),
            (VAR_HEIGHT, self.height),
            (VAR_POINT_COUNT, self.point_count),
        ];
        if let Some((var, _)) = nonzero.into_iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Zero { var });
        }
        if self.enable_batch_mutation && self.batch_size == 0 {
            return Err(ConfigError::Zero { var: VAR_BATCH_SIZE });
        }
        Ok(())
    }

    /// Size of the point buffer in bytes.
    pub fn buffer_bytes(&self) -> u64 {
        PointVertex::buffer_size(self.point_count)
    }

    /// Patches a complete run applies; `None` when mutation is off.
    pub fn expected_patches(&self) -> Option<u32> {
        self.enable_batch_mutation
            .then(|| self.point_count.checked_div(self.batch_size).unwrap_or(0))
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: WINDOW_TITLE.to_string(),
            size: PhysicalSize::new(self.width, self.height),
            ..RuntimeConfig::default()
        }
    }

    pub fn gpu_init(&self) -> GpuInit {
        GpuInit {
            present_mode: if self.vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            min_buffer_size: self.buffer_bytes(),
            ..GpuInit::default()
        }
    }
}

fn parse_count(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    // Digit separators are accepted: 16_384 reads better than 16384.
    let digits: String = value.trim().chars().filter(|c| *c != '_').collect();
    digits.parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_owned(),
        expected: "an unsigned 32-bit integer",
    })
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_owned(),
            expected: "a boolean (true/false, 1/0, yes/no, on/off)",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Result<BenchConfig, ConfigError> {
        BenchConfig::from_vars(pairs.iter().copied())
    }

    // ── defaults ──────────────────────────────────────────────────────────

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(vars(&[]).unwrap(), BenchConfig::default());
    }

    #[test]
    fn default_buffer_is_half_a_gibibyte() {
        let config = BenchConfig::default();
        assert_eq!(config.buffer_bytes(), 512 * 1024 * 1024);
        assert_eq!(config.expected_patches(), Some(4096));
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let config = vars(&[("PATH", "/usr/bin"), ("GRAPHTOOL_UNKNOWN", "x")]).unwrap();
        assert_eq!(config, BenchConfig::default());
    }

    // ── overrides ─────────────────────────────────────────────────────────

    #[test]
    fn overrides_every_option() {
        let config = vars(&[
            (VAR_WIDTH, "800"),
            (VAR_HEIGHT, "600"),
            (VAR_POINT_COUNT, "1_000_000"),
            (VAR_BATCH_SIZE, " 4096 "),
            (VAR_BATCH_MUTATION, "off"),
            (VAR_TIMED_SECTION, "Frame"),
            (VAR_VSYNC, "0"),
        ])
        .unwrap();

        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
        assert_eq!(config.point_count, 1_000_000);
        assert_eq!(config.batch_size, 4096);
        assert!(!config.enable_batch_mutation);
        assert_eq!(config.timed_section, TimedSection::Frame);
        assert!(!config.vsync);
        assert_eq!(config.expected_patches(), None);
    }

    #[test]
    fn flags_accept_common_spellings() {
        for v in ["1", "TRUE", "yes", "On"] {
            assert!(parse_flag(VAR_VSYNC, v).unwrap(), "{v}");
        }
        for v in ["0", "False", "NO", "off"] {
            assert!(!parse_flag(VAR_VSYNC, v).unwrap(), "{v}");
        }
    }

    #[test]
    fn runtime_and_gpu_settings_follow_config() {
        let config = vars(&[(VAR_WIDTH, "640"), (VAR_HEIGHT, "480"), (VAR_VSYNC, "false")]).unwrap();

        let runtime = config.runtime_config();
        assert_eq!(runtime.title, "Graph");
        assert_eq!(runtime.size, PhysicalSize::new(640, 480));
        assert!(!runtime.resizable);

        let gpu = config.gpu_init();
        assert_eq!(gpu.present_mode, wgpu::PresentMode::AutoNoVsync);
        assert_eq!(gpu.min_buffer_size, config.buffer_bytes());
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn non_numeric_size_names_the_variable() {
        let err = vars(&[(VAR_POINT_COUNT, "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: VAR_POINT_COUNT, .. }));
        assert!(err.to_string().contains("GRAPHTOOL_POINT_COUNT"));
    }

    #[test]
    fn negative_size_is_invalid() {
        assert!(vars(&[(VAR_WIDTH, "-1")]).is_err());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(vars(&[(VAR_HEIGHT, "0")]).unwrap_err(), ConfigError::Zero { var: VAR_HEIGHT });
        assert_eq!(
            vars(&[(VAR_POINT_COUNT, "0")]).unwrap_err(),
            ConfigError::Zero { var: VAR_POINT_COUNT }
        );
    }

    #[test]
    fn zero_batch_only_matters_when_mutating() {
        assert_eq!(
            vars(&[(VAR_BATCH_SIZE, "0")]).unwrap_err(),
            ConfigError::Zero { var: VAR_BATCH_SIZE }
        );
        let config = vars(&[(VAR_BATCH_SIZE, "0"), (VAR_BATCH_MUTATION, "false")]).unwrap();
        assert_eq!(config.batch_size, 0);
    }

    #[test]
    fn unknown_timed_section_is_rejected() {
        let err = vars(&[(VAR_TIMED_SECTION, "gpu")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: VAR_TIMED_SECTION, .. }));
    }

    #[test]
    fn os_vars_are_read_like_strings() {
        let config = BenchConfig::from_os_vars([
            (OsString::from(VAR_POINT_COUNT), OsString::from("1024")),
            (OsString::from("HOME"), OsString::from("/root")),
        ])
        .unwrap();
        assert_eq!(config.point_count, 1024);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_value_is_rejected() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"\xff12".to_vec());
        let err = BenchConfig::from_os_vars([(OsString::from(VAR_POINT_COUNT), raw)]).unwrap_err();
        match err {
            ConfigError::Invalid { var, value, .. } => {
                assert_eq!(var, VAR_POINT_COUNT);
                assert!(value.ends_with("12"), "{value}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_unrelated_variable_is_ignored() {
        use std::os::unix::ffi::OsStringExt;

        let key = OsString::from_vec(b"JUNK_\xff".to_vec());
        let value = OsString::from_vec(b"\xfe".to_vec());
        let config = BenchConfig::from_os_vars([(key, value)]).unwrap();
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn batch_larger_than_buffer_is_allowed() {
        let config = vars(&[(VAR_POINT_COUNT, "10"), (VAR_BATCH_SIZE, "64")]).unwrap();
        assert_eq!(config.expected_patches(), Some(0));
    }
}
