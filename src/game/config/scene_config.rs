use std::{
    ops::{Bound, RangeBounds},
    path::{Path, PathBuf},
    str::FromStr,
};

use glam::Vec3;
use skinning::{
    BoneSwing, CylinderGeometry, SkinWeightCalculator, SkinningError, SwingAnimation, Wave,
};
use tracing::{info, warn};

use crate::{
    engine::lights::{AmbientLight, PointLight, color_from_hex},
    game::orbit_controls::DEFAULT_DAMPING_FACTOR,
};

use super::{ConfigFile, ConfigLine};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: {key} expects {expected}")]
    InvalidValue {
        line: usize,
        key: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Skinning(#[from] SkinningError),
}

/// Everything about the scene that can be tweaked without recompiling.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub segment_height: f32,
    pub segment_count: usize,
    /// The height is ignored, the cylinder always covers the whole bone chain.
    pub cylinder: CylinderGeometry,
    pub animation: SwingAnimation,
    pub ambient_light: AmbientLight,
    pub point_light: PointLight,
    pub roughness: f32,
    /// Vertical field of view in degrees.
    pub camera_fov: f32,
    pub camera_position: Vec3,
    pub damping: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let segment_height = 5.0;
        let segment_count = 1;

        Self {
            segment_height,
            segment_count,
            cylinder: CylinderGeometry {
                radius_top: 1.0,
                radius_bottom: 1.0,
                height: segment_height * segment_count as f32,
                radial_segments: 5,
                height_segments: 15,
                open_ended: true,
                theta_start: 30.0,
                ..Default::default()
            },
            animation: SwingAnimation::default(),
            ambient_light: AmbientLight::default(),
            point_light: PointLight::default(),
            roughness: 0.4,
            camera_fov: 75.0,
            camera_position: Vec3::new(1.0, 1.0, 2.0),
            damping: DEFAULT_DAMPING_FACTOR,
        }
    }
}

fn invalid(line: &ConfigLine, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        line: line.number,
        key: line.key.to_string(),
        expected,
    }
}

fn param<T: FromStr>(line: &ConfigLine, index: usize, expected: &'static str) -> Result<T, ConfigError> {
    line.params
        .get(index)
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| invalid(line, expected))
}

fn param_in(
    line: &ConfigLine,
    index: usize,
    range: impl RangeBounds<f32>,
    expected: &'static str,
) -> Result<f32, ConfigError> {
    let value: f32 = param(line, index, expected)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(invalid(line, expected))
    }
}

fn hex_param(line: &ConfigLine, index: usize) -> Result<u32, ConfigError> {
    const EXPECTED: &str = "a hex color like 0xff9000";

    let value: &str = line
        .params
        .get(index)
        .copied()
        .ok_or_else(|| invalid(line, EXPECTED))?;
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix('#'))
        .unwrap_or(value);

    u32::from_str_radix(digits, 16).map_err(|_| invalid(line, EXPECTED))
}

fn vec3_param(line: &ConfigLine, start: usize) -> Result<Vec3, ConfigError> {
    const EXPECTED: &str = "three numbers <x> <y> <z>";
    Ok(Vec3::new(
        param(line, start, EXPECTED)?,
        param(line, start + 1, EXPECTED)?,
        param(line, start + 2, EXPECTED)?,
    ))
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loading scene config from {}", path.display());

        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let mut custom_swings = false;

        for line in ConfigFile::new(data) {
            match line.key {
                "SEGMENT_HEIGHT" => {
                    // SEGMENT_HEIGHT <height>
                    config.segment_height = param(&line, 0, "a number")?;
                }
                "SEGMENT_COUNT" => {
                    // SEGMENT_COUNT <count>
                    config.segment_count = param(&line, 0, "a whole number")?;
                }
                "CYLINDER_RADIUS" => {
                    // CYLINDER_RADIUS <top> <bottom>
                    config.cylinder.radius_top = param(&line, 0, "two numbers <top> <bottom>")?;
                    config.cylinder.radius_bottom = param(&line, 1, "two numbers <top> <bottom>")?;
                }
                "RADIAL_SEGMENTS" => {
                    config.cylinder.radial_segments = param(&line, 0, "a whole number")?;
                }
                "HEIGHT_SEGMENTS" => {
                    config.cylinder.height_segments = param(&line, 0, "a whole number")?;
                }
                "OPEN_ENDED" => {
                    config.cylinder.open_ended = param(&line, 0, "true or false")?;
                }
                "THETA_START" => {
                    // THETA_START <radians>
                    config.cylinder.theta_start = param(&line, 0, "a number")?;
                }
                "SWING" => {
                    // SWING <bone> <cos|sin> <amplitude_degrees> <angular_frequency>
                    const EXPECTED: &str = "<bone> <cos|sin> <amplitude> <frequency>";

                    // Any swing in the file replaces the built in animation.
                    if !custom_swings {
                        config.animation.swings.clear();
                        custom_swings = true;
                    }

                    let bone = param(&line, 0, EXPECTED)?;
                    let wave = line
                        .params
                        .get(1)
                        .and_then(|value| Wave::from_str(value).ok())
                        .ok_or_else(|| invalid(&line, EXPECTED))?;
                    let amplitude = param(&line, 2, EXPECTED)?;
                    let frequency = param(&line, 3, EXPECTED)?;

                    config
                        .animation
                        .swings
                        .push(BoneSwing::new(bone, wave, amplitude, frequency));
                }
                "AMBIENT_LIGHT" => {
                    // AMBIENT_LIGHT <hex_color> <intensity>
                    config.ambient_light = AmbientLight {
                        color: color_from_hex(hex_param(&line, 0)?),
                        intensity: param(&line, 1, "<hex_color> <intensity>")?,
                    };
                }
                "POINT_LIGHT" => {
                    // POINT_LIGHT <hex_color> <intensity> <distance> <decay>
                    const EXPECTED: &str = "<hex_color> <intensity> <distance> <decay>";
                    config.point_light.color = color_from_hex(hex_param(&line, 0)?);
                    config.point_light.intensity = param(&line, 1, EXPECTED)?;
                    config.point_light.distance = param(&line, 2, EXPECTED)?;
                    config.point_light.decay = param(&line, 3, EXPECTED)?;
                }
                "POINT_LIGHT_POSITION" => {
                    config.point_light.position = vec3_param(&line, 0)?;
                }
                "ROUGHNESS" => {
                    config.roughness = param(&line, 0, "a number")?;
                }
                "CAMERA_FOV" => {
                    // CAMERA_FOV <degrees>
                    config.camera_fov = param_in(
                        &line,
                        0,
                        (Bound::Excluded(0.0), Bound::Excluded(180.0)),
                        "degrees between 0 and 180",
                    )?;
                }
                "CAMERA_POSITION" => {
                    config.camera_position = vec3_param(&line, 0)?;
                }
                "DAMPING" => {
                    // DAMPING <factor>, 0 disables damping.
                    config.damping = param_in(&line, 0, 0.0..=1.0, "a number in 0..=1")?;
                }
                key => warn!("Unknown config key {key} on line {}", line.number),
            }
        }

        // Validate the chain up front so bad values are reported against the config.
        SkinWeightCalculator::new(config.segment_height, config.segment_count)?;
        config.cylinder.height = config.segment_height * config.segment_count as f32;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_the_default_scene() {
        let config = SceneConfig::parse("; nothing here\n").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.cylinder.height, 5.0);
        assert_eq!(config.animation.swings.len(), 2);
    }

    #[test]
    fn overrides() {
        let data = "\
SEGMENT_HEIGHT 2
SEGMENT_COUNT 3
CYLINDER_RADIUS 0.5 1
OPEN_ENDED false
SWING 2 sin 45 1.5
POINT_LIGHT 0xffffff 1 0 2
CAMERA_POSITION 0 2 4
";
        let config = SceneConfig::parse(data).unwrap();

        assert_eq!(config.segment_height, 2.0);
        assert_eq!(config.segment_count, 3);
        assert_eq!(config.cylinder.height, 6.0);
        assert_eq!(config.cylinder.radius_top, 0.5);
        assert!(!config.cylinder.open_ended);
        assert_eq!(
            config.animation.swings,
            vec![BoneSwing::new(2, Wave::Sin, 45.0, 1.5)]
        );
        assert_eq!(config.point_light.distance, 0.0);
        assert!(config.point_light.color.abs_diff_eq(Vec3::ONE, 1e-5));
        assert_eq!(config.camera_position, Vec3::new(0.0, 2.0, 4.0));
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let config = SceneConfig::parse("WOBBLE 12\nROUGHNESS 0.8\n").unwrap();
        assert_eq!(config.roughness, 0.8);
    }

    #[test]
    fn bad_values_report_the_line() {
        let err = SceneConfig::parse("\nSEGMENT_HEIGHT tall\n").unwrap_err();
        match err {
            ConfigError::InvalidValue { line, key, .. } => {
                assert_eq!(line, 2);
                assert_eq!(key, "SEGMENT_HEIGHT");
            }
            err => panic!("unexpected error: {err}"),
        }

        assert!(matches!(
            SceneConfig::parse("SWING 0 tan 90 3").unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
        assert!(matches!(
            SceneConfig::parse("AMBIENT_LIGHT white 1").unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
    }

    #[test]
    fn camera_values_are_range_checked() {
        for data in [
            "DAMPING 3",
            "DAMPING -0.1",
            "DAMPING NaN",
            "CAMERA_FOV 0",
            "CAMERA_FOV 180",
        ] {
            assert!(
                matches!(
                    SceneConfig::parse(data).unwrap_err(),
                    ConfigError::InvalidValue { line: 1, .. }
                ),
                "{data}"
            );
        }

        let config = SceneConfig::parse("DAMPING 1\nCAMERA_FOV 179.5\n").unwrap();
        assert_eq!(config.damping, 1.0);
        assert_eq!(config.camera_fov, 179.5);
    }

    #[test]
    fn chain_is_validated() {
        assert!(matches!(
            SceneConfig::parse("SEGMENT_COUNT 0").unwrap_err(),
            ConfigError::Skinning(SkinningError::NoSegments)
        ));
        assert!(matches!(
            SceneConfig::parse("SEGMENT_HEIGHT -1").unwrap_err(),
            ConfigError::Skinning(SkinningError::InvalidSegmentHeight(_))
        ));
    }
}
