use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use crate::camera::{Pinhole, Sensor};
use crate::dither::{Dither, LutNoise, RandNoise};
use crate::error::{Error, Result};
use crate::march::Limits;
use crate::program::{Circle, Gradient, Program};
use crate::render::{Marcher, SceneKind};
use crate::shade::Shading;

pub const LCD_ROWS: u32 = 240;
pub const LCD_COLUMNS: u32 = 400;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProgramKind {
    Circle,
    Gradient,
    Sphere,
    #[value(alias = "sdf")]
    Marcher,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NoiseKind {
    /// 256-byte table, repeats every 256 pixels
    Lut,
    /// PRNG draw per pixel
    Rand,
}

/// Frame-callback programs for a 400x240 1-bit display
#[derive(Clone, Debug, PartialEq, Parser)]
#[command(name = "bitplane-march")]
#[command(version = "0.1.0")]
#[command(allow_negative_numbers = true)]
pub struct Settings {
    /// Program to run each frame
    #[arg(long, env = "BITPLANE_PROGRAM", value_enum, ignore_case = true, default_value_t = ProgramKind::Marcher)]
    pub program: ProgramKind,

    /// Target refresh rate in Hz
    #[arg(long = "fps", env = "BITPLANE_FPS", default_value_t = 30.0)]
    pub refresh_rate: f32,

    /// Integer window scale
    #[arg(long, env = "BITPLANE_SCALE", default_value_t = 2)]
    pub scale: u32,

    #[arg(long, env = "BITPLANE_ROWS", default_value_t = LCD_ROWS)]
    pub rows: u32,

    #[arg(long, env = "BITPLANE_COLS", default_value_t = LCD_COLUMNS)]
    pub cols: u32,

    #[arg(long, env = "BITPLANE_FOCAL_LENGTH", default_value_t = 1.0)]
    pub focal_length: f32,

    #[arg(long, env = "BITPLANE_PIXEL_SIZE", default_value_t = 0.01)]
    pub pixel_size: f32,

    /// Step budget of the camera ray
    #[arg(long, env = "BITPLANE_MAX_STEPS", default_value_t = Limits::PRIMARY.max_steps)]
    pub max_steps: u32,

    #[arg(long, env = "BITPLANE_HIT_EPSILON", default_value_t = Limits::PRIMARY.hit_epsilon)]
    pub hit_epsilon: f32,

    /// Camera rays travelling further than this miss
    #[arg(long, env = "BITPLANE_FAR", default_value_t = f32::INFINITY)]
    pub far: f32,

    /// Step budget of the shadow ray
    #[arg(long, env = "BITPLANE_SHADOW_STEPS", default_value_t = Limits::SHADOW.max_steps)]
    pub shadow_steps: u32,

    #[arg(long, env = "BITPLANE_SHADOW_EPSILON", default_value_t = Limits::SHADOW.hit_epsilon)]
    pub shadow_epsilon: f32,

    /// Offset along the normal before casting the shadow ray
    #[arg(long, env = "BITPLANE_SHADOW_BIAS", default_value_t = 0.01)]
    pub shadow_bias: f32,

    /// Forward-difference step for normals
    #[arg(long, env = "BITPLANE_NORMAL_EPSILON", default_value_t = 0.01)]
    pub normal_epsilon: f32,

    #[arg(long, env = "BITPLANE_NOISE", value_enum, ignore_case = true, default_value_t = NoiseKind::Lut)]
    pub noise: NoiseKind,

    #[arg(long, env = "BITPLANE_SEED", default_value_t = 0x5eed)]
    pub seed: u64,

    /// Spread each frame's rows over the rayon pool
    #[arg(long, env = "BITPLANE_PARALLEL", action = ArgAction::Set, default_value_t = true)]
    pub parallel: bool,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.frame_period()?;
        if self.scale == 0 {
            return Err(Error::InvalidConfiguration("window scale must be at least 1".to_string()));
        }
        if self.cols.checked_mul(self.scale).is_none() || self.rows.checked_mul(self.scale).is_none() {
            return Err(Error::InvalidConfiguration(format!("window scale {} is too large", self.scale)));
        }
        if !(self.far > 0.0) {
            return Err(Error::InvalidConfiguration(format!("far plane {} must be positive", self.far)));
        }
        if !(self.normal_epsilon > 0.0) {
            return Err(Error::InvalidConfiguration(format!("normal epsilon {} must be positive", self.normal_epsilon)));
        }
        Ok(())
    }

    pub fn frame_period(&self) -> Result<Duration> {
        if !(self.refresh_rate > 0.0) {
            return Err(Error::InvalidConfiguration(format!("refresh rate {} must be positive", self.refresh_rate)));
        }
        Duration::try_from_secs_f32(1.0 / self.refresh_rate)
            .map_err(|_| Error::InvalidConfiguration(format!("refresh rate {} is out of range", self.refresh_rate)))
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.cols.saturating_mul(self.scale), self.rows.saturating_mul(self.scale))
    }

    pub fn sensor(&self) -> Sensor {
        Sensor { rows: self.rows, cols: self.cols, pixel_size: self.pixel_size }
    }

    pub fn primary(&self) -> Limits {
        Limits { max_steps: self.max_steps, hit_epsilon: self.hit_epsilon, far: self.far }
    }

    pub fn shading(&self) -> Shading {
        Shading {
            normal_epsilon: self.normal_epsilon,
            shadow_bias: self.shadow_bias,
            shadow: Limits::new(self.shadow_steps, self.shadow_epsilon),
        }
    }

    pub fn pinhole(&self) -> Pinhole {
        Pinhole::new(self.focal_length, self.sensor())
    }

    pub fn dither(&self) -> Dither {
        match self.noise {
            NoiseKind::Lut => Dither::Lut(LutNoise::new(self.seed)),
            NoiseKind::Rand => Dither::Rand(RandNoise::new(self.seed)),
        }
    }

    pub fn build_program(&self) -> Result<Box<dyn Program>> {
        let program: Box<dyn Program> = match self.program {
            ProgramKind::Circle => Box::new(Circle),
            ProgramKind::Gradient => Box::new(Gradient::new(self.cols, self.rows, self.dither())),
            ProgramKind::Sphere | ProgramKind::Marcher => {
                let scene = if self.program == ProgramKind::Sphere { SceneKind::Sphere } else { SceneKind::Octahedron };
                let marcher = Marcher::new(&self.pinhole(), self.dither(), scene)?
                    .with_limits(self.primary(), self.shading())
                    .with_parallel(self.parallel);
                Box::new(marcher)
            }
        };
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(args: &[&str]) -> Result<Settings> {
        let argv = std::iter::once("bitplane-march").chain(args.iter().copied());
        let settings = Settings::try_parse_from(argv)
            .map_err(|err| Error::InvalidConfiguration(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    #[test]
    fn defaults_match_the_device() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.program, ProgramKind::Marcher);
        assert_eq!(settings.sensor(), Sensor { rows: 240, cols: 400, pixel_size: 0.01 });
        assert_eq!(settings.primary(), Limits::PRIMARY);
        assert_eq!(settings.shading(), Shading::default());
        assert_eq!(settings.window_size(), (800, 480));
        assert_eq!(settings.frame_period().unwrap(), Duration::from_secs_f32(1.0 / 30.0));
    }

    #[test]
    fn overrides_apply() {
        let settings = settings(&[
            "--program", "Gradient",
            "--noise", "rand",
            "--fps", "50",
            "--max-steps", "64",
            "--far", "20.5",
            "--parallel", "false",
            "--hit-epsilon", "0.002",
            "--normal-epsilon", "0.005",
            "--shadow-bias", "0.05",
            "--shadow-steps", "4",
        ]).unwrap();
        assert_eq!(settings.program, ProgramKind::Gradient);
        assert_eq!(settings.noise, NoiseKind::Rand);
        assert_eq!(settings.refresh_rate, 50.0);
        assert_eq!(settings.primary(), Limits { max_steps: 64, hit_epsilon: 0.002, far: 20.5 });
        assert_eq!(settings.shading(), Shading {
            normal_epsilon: 0.005,
            shadow_bias: 0.05,
            shadow: Limits::new(4, Limits::SHADOW.hit_epsilon),
        });
        assert!(!settings.parallel);
    }

    #[test]
    fn sdf_is_an_alias_for_the_marcher() {
        assert_eq!(settings(&["--program", "sdf"]).unwrap().program, ProgramKind::Marcher);
    }

    #[test]
    fn malformed_values_are_rejected() {
        for args in [
            ["--program", "teapot"],
            ["--fps", "fast"],
            ["--fps", "0"],
            ["--fps", "1e-30"],
            ["--scale", "0"],
            ["--scale", "20000000"],
            ["--far", "-1"],
            ["--far", "0"],
            ["--normal-epsilon", "0"],
        ] {
            let err = settings(&args).unwrap_err();
            assert!(matches!(err, Error::InvalidConfiguration(_)), "{:?}", args);
        }
    }

    #[test]
    fn bad_camera_fails_when_building() {
        let marcher = settings(&["--focal-length", "-1"]).unwrap();
        assert!(matches!(marcher.build_program(), Err(Error::InvalidConfiguration(_))));
        let circle = settings(&["--focal-length", "-1", "--program", "circle"]).unwrap();
        assert!(circle.build_program().is_ok());
    }
}
