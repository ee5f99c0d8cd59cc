use nalgebra::{Point3, Rotation3, vector, Vector3};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sensor {
    pub rows: u32,
    pub cols: u32,
    pub pixel_size: f32,
}

/// Placement of the pinhole in the scene, applied once when rays are built.
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    pub position: Point3<f32>,
    pub pitch: f32,
    pub yaw: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Pose {
            position: Point3::origin(),
            pitch: 0.0,
            yaw: 0.0,
        }
    }
}

impl Pose {
    fn rotation(&self) -> Rotation3<f32> {
        Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw) *
            Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pinhole {
    pub focal_length: f32,
    pub sensor: Sensor,
    pub pose: Pose,
}

impl Pinhole {
    pub fn new(focal_length: f32, sensor: Sensor) -> Self {
        Pinhole {
            focal_length,
            sensor,
            pose: Pose::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        let Sensor { rows, cols, pixel_size } = self.sensor;
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidConfiguration(format!("sensor resolution {}x{} is empty", cols, rows)));
        }
        if !(self.focal_length > 0.0) {
            return Err(Error::InvalidConfiguration(format!("focal length {} must be positive", self.focal_length)));
        }
        if !(pixel_size > 0.0) {
            return Err(Error::InvalidConfiguration(format!("pixel size {} must be positive", pixel_size)));
        }
        Ok(())
    }

    /// Builds one unit direction per sensor pixel, row-major.
    pub fn rays(&self) -> Result<RayTable> {
        self.validate()?;

        let Sensor { rows, cols, pixel_size } = self.sensor;
        let half_width = cols as f32 / 2.0;
        let half_height = rows as f32 / 2.0;
        let rotation = self.pose.rotation();

        let directions = (0..rows * cols)
            .map(|i| (i / cols, i % cols))
            .map(|(r, c)| {
                let x = (c as f32 - half_width) * pixel_size;
                let y = (r as f32 - half_height) * pixel_size;
                rotation * vector![x, y, self.focal_length].normalize()
            })
            .collect();

        Ok(RayTable {
            origin: self.pose.position,
            rows,
            cols,
            directions,
        })
    }
}

pub struct RayTable {
    origin: Point3<f32>,
    rows: u32,
    cols: u32,
    directions: Vec<Vector3<f32>>,
}

impl RayTable {
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[cfg(test)]
    pub fn direction(&self, row: u32, col: u32) -> &Vector3<f32> {
        &self.directions[(row * self.cols + col) as usize]
    }

    pub fn row(&self, row: u32) -> &[Vector3<f32>] {
        let from = (row * self.cols) as usize;
        &self.directions[from..from + self.cols as usize]
    }

    pub fn origin(&self) -> Point3<f32> {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::point;

    use super::*;

    fn sensor() -> Sensor {
        Sensor { rows: 240, cols: 400, pixel_size: 0.01 }
    }

    #[test]
    fn center_pixel_looks_down_optical_axis() {
        let table = Pinhole::new(1.0, sensor()).rays().unwrap();
        let center = table.direction(120, 200);
        assert!(center.x.abs() < 1e-6);
        assert!(center.y.abs() < 1e-6);
        assert!((center.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn every_direction_is_unit_length() {
        let table = Pinhole::new(1.5, sensor()).rays().unwrap();
        for r in (0..table.rows()).step_by(17) {
            for d in table.row(r) {
                assert!((d.magnitude() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn corner_pixel_projects_through_sensor_plane() {
        let table = Pinhole::new(1.0, sensor()).rays().unwrap();
        let d = table.direction(0, 0);
        let expected = vector![-2.0, -1.2, 1.0].normalize();
        assert!((d - expected).magnitude() < 1e-6);
    }

    #[test]
    fn rejects_degenerate_parameters() {
        let empty = Sensor { rows: 0, ..sensor() };
        assert!(matches!(Pinhole::new(1.0, empty).rays(), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(Pinhole::new(0.0, sensor()).rays(), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(Pinhole::new(-1.0, sensor()).rays(), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(Pinhole::new(f32::NAN, sensor()).rays(), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn pose_moves_origin_and_turns_rays() {
        let mut pinhole = Pinhole::new(1.0, sensor());
        pinhole.pose = Pose {
            position: point![1.0, 0.0, -2.0],
            pitch: 0.0,
            yaw: std::f32::consts::FRAC_PI_2,
        };
        let table = pinhole.rays().unwrap();
        assert_eq!(table.origin(), point![1.0, 0.0, -2.0]);
        let center = table.direction(120, 200);
        assert!((center.x - 1.0).abs() < 1e-5);
        assert!(center.z.abs() < 1e-5);
    }
}
