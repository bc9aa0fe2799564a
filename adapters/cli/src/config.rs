use std::{
    fs,
    path::{Path, PathBuf},
};

use pixel_office_system_camera::CameraConfig;
use pixel_office_system_editor::EditorConfig;
use pixel_office_system_session::SessionConfig;
use pixel_office_world::SimulationConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_LOG_FILTER: &str = "info";

/// Settings loaded from the optional TOML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    pub(crate) simulation: SimulationConfig,
    pub(crate) camera: CameraConfig,
    pub(crate) editor: EditorConfig,
    pub(crate) logging: LoggingConfig,
}

/// `[logging]` table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LoggingConfig {
    /// Directive used when `RUST_LOG` is unset.
    pub(crate) filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl CliConfig {
    /// Reads the file at `path`, or returns the defaults when no path was given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        match config.invalid_setting() {
            Some((field, rule)) => Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                field,
                rule,
            }),
            None => Ok(config),
        }
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// First tunable outside the range the simulation and camera can work with.
    fn invalid_setting(&self) -> Option<(&'static str, &'static str)> {
        let simulation = &self.simulation;
        let camera = &self.camera;
        let rules = [
            (
                "simulation.walk_speed",
                "must be positive",
                positive(simulation.walk_speed),
            ),
            (
                "simulation.walk_frame_seconds",
                "must be positive",
                positive(simulation.walk_frame_seconds),
            ),
            ("camera.zoom_min", "must be at least 1", camera.zoom_min >= 1),
            (
                "camera.zoom_max",
                "must not be below zoom_min",
                camera.zoom_max >= camera.zoom_min,
            ),
            ("camera.zoom_step", "must be at least 1", camera.zoom_step >= 1),
            (
                "camera.scroll_threshold",
                "must be positive",
                positive(camera.scroll_threshold),
            ),
            (
                "camera.follow_lerp",
                "must lie in (0, 1]",
                positive(camera.follow_lerp) && camera.follow_lerp <= 1.0,
            ),
            (
                "camera.snap_threshold",
                "must not be negative",
                camera.snap_threshold.is_finite() && camera.snap_threshold >= 0.0,
            ),
            (
                "camera.pan_margin_fraction",
                "must lie in [0, 1]",
                (0.0..=1.0).contains(&camera.pan_margin_fraction),
            ),
            (
                "editor.button_padding",
                "must not be negative",
                self.editor.button_padding.is_finite() && self.editor.button_padding >= 0.0,
            ),
        ];
        rules
            .into_iter()
            .find(|(_, _, valid)| !valid)
            .map(|(field, rule, _)| (field, rule))
    }

    /// Tunables handed to the office session.
    pub(crate) fn session(&self) -> SessionConfig {
        SessionConfig {
            simulation: self.simulation,
            camera: self.camera,
            editor: self.editor.clone(),
        }
    }
}

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("could not read config file {}", path.display())]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or contains unknown keys.
    #[error("could not parse config file {}", path.display())]
    Parse {
        /// Path of the file.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: toml::de::Error,
    },
    /// A tunable lies outside its usable range.
    #[error("config file {} sets {field} out of range: {rule}", path.display())]
    Invalid {
        /// Path of the file.
        path: PathBuf,
        /// Table and key of the rejected value.
        field: &'static str,
        /// Range the value has to satisfy.
        rule: &'static str,
    },
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_argument_yields_defaults() {
        let config = CliConfig::load(None).expect("defaults");
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn tables_and_fields_are_optional() {
        let config = CliConfig::parse(
            r#"
                [camera]
                zoom_max = 6

                [editor]
                history_depth = 5

                [logging]
                filter = "pixel_office_world=debug"
            "#,
        )
        .expect("partial config parses");

        assert_eq!(config.camera.zoom_max, 6);
        assert_eq!(config.camera.zoom_min, CameraConfig::default().zoom_min);
        assert_eq!(config.editor.history_depth, 5);
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.logging.filter, "pixel_office_world=debug");
        assert_eq!(config.session().editor.history_depth, 5);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CliConfig::parse("[camera]\nzoom_maximum = 6\n").is_err());
        assert!(CliConfig::parse("[audio]\nvolume = 1\n").is_err());
    }

    #[test]
    fn defaults_are_in_range() {
        assert_eq!(CliConfig::default().invalid_setting(), None);
    }

    #[test]
    fn out_of_range_tunables_are_named() {
        let cases = [
            ("[camera]\nfollow_lerp = 0.0\n", "camera.follow_lerp"),
            ("[camera]\nfollow_lerp = 2.5\n", "camera.follow_lerp"),
            ("[camera]\nzoom_min = 4\nzoom_max = 2\n", "camera.zoom_max"),
            ("[simulation]\nwalk_speed = -3.0\n", "simulation.walk_speed"),
            ("[simulation]\nwalk_speed = 0.0\n", "simulation.walk_speed"),
        ];
        for (text, field) in cases {
            let config = CliConfig::parse(text).expect("well-formed toml");
            assert_eq!(
                config.invalid_setting().map(|(name, _)| name),
                Some(field),
                "{text}"
            );
        }
    }

    #[test]
    fn loading_rejects_out_of_range_files() {
        let path = std::env::temp_dir().join(format!(
            "pixel-office-config-{}-range.toml",
            std::process::id()
        ));
        fs::write(&path, "[simulation]\nwalk_speed = 0.0\n").expect("config written");

        let error = CliConfig::load(Some(&path)).expect_err("walk speed rejected");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "simulation.walk_speed",
                ..
            }
        ));
        assert!(error.to_string().contains("simulation.walk_speed out of range"));
    }

    #[test]
    fn unreadable_files_name_the_path() {
        let path = Path::new("/nonexistent/pixel-office.toml");
        let error = CliConfig::load(Some(path)).expect_err("missing file");
        assert!(error.to_string().contains("/nonexistent/pixel-office.toml"));
    }
}
