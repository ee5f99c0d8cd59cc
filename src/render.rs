use std::time::Instant;

use log::trace;
use nalgebra::Vector3;
use rayon::prelude::*;

use crate::camera::{Pinhole, RayTable};
use crate::dither::{present, Dither};
use crate::error::{Error, Result};
use crate::march::{march, Limits, March};
use crate::picture::{Bitplane, Intensity, Picture};
use crate::program::{Input, Program};
use crate::ray::Ray;
use crate::scene::Scene;
use crate::shade::{light_direction, shade, Shading};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneKind {
    /// Ground plus spinning octahedron.
    Octahedron,
    /// Lone sphere, no ground.
    Sphere,
}

impl SceneKind {
    pub fn build(&self, angle: f32) -> Scene {
        match self {
            SceneKind::Octahedron => Scene::demo(angle),
            SceneKind::Sphere => Scene::sphere_only(),
        }
    }
}

pub fn render_ray(ray: &Ray, scene: &Scene, light: &Vector3<f32>, primary: &Limits, shading: &Shading) -> u8 {
    match march(ray, scene, primary) {
        March::Hit { point, .. } => shade(&point, scene, light, shading),
        March::Miss => 0,
    }
}

const LINES_PER_WORK: usize = 8;

/// Traces and shades every pixel of `rays` into `intensity`.
pub fn render_intensity(
    rays: &RayTable,
    scene: &Scene,
    light: &Vector3<f32>,
    primary: &Limits,
    shading: &Shading,
    intensity: &mut Intensity,
    parallel: bool,
) {
    let cols = rays.cols() as usize;
    let render_lines = |(chunk, lines): (usize, &mut [u8])| {
        for (i, line) in lines.chunks_mut(cols).enumerate() {
            let row = (chunk * LINES_PER_WORK + i) as u32;
            for (pixel, direction) in line.iter_mut().zip(rays.row(row)) {
                let ray = Ray::new(rays.origin(), *direction);
                *pixel = render_ray(&ray, scene, light, primary, shading);
            }
        }
    };

    let buffer = intensity.buffer_mut();
    if parallel {
        buffer.par_chunks_mut(cols * LINES_PER_WORK)
            .enumerate()
            .for_each(render_lines);
    } else {
        buffer.chunks_mut(cols * LINES_PER_WORK)
            .enumerate()
            .for_each(render_lines);
    }
}

/// The sphere-tracing program: owns the ray table and intensity buffer.
pub struct Marcher {
    rays: RayTable,
    intensity: Intensity,
    dither: Dither,
    scene: SceneKind,
    primary: Limits,
    shading: Shading,
    parallel: bool,
}

impl Marcher {
    pub fn new(pinhole: &Pinhole, dither: Dither, scene: SceneKind) -> Result<Self> {
        let rays = pinhole.rays()?;
        let intensity = Picture::filled((rays.cols(), rays.rows()), 0);
        Ok(Marcher {
            rays,
            intensity,
            dither,
            scene,
            primary: Limits::PRIMARY,
            shading: Shading::default(),
            parallel: true,
        })
    }

    pub fn with_limits(mut self, primary: Limits, shading: Shading) -> Self {
        self.primary = primary;
        self.shading = shading;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[cfg(test)]
    pub fn intensity(&self) -> &Intensity {
        &self.intensity
    }

    /// Fills the intensity buffer for one light angle, without presenting.
    pub fn render(&mut self, angle: f32) {
        let scene = self.scene.build(angle);
        let light = light_direction(angle);
        render_intensity(&self.rays, &scene, &light, &self.primary, &self.shading, &mut self.intensity, self.parallel);
    }
}

impl Program for Marcher {
    fn update(&mut self, frame: &mut Bitplane, input: &Input) -> Result<bool> {
        let expected = (self.rays.cols(), self.rays.rows());
        let actual = (frame.width(), frame.height());
        if expected != actual {
            return Err(Error::SensorMismatch { expected, actual });
        }

        let start = Instant::now();
        self.render(input.angle());
        let traced = start.elapsed();

        frame.clear();
        present(&self.intensity, frame, &mut self.dither);
        self.dither.end_frame();
        trace!(target: "app", "Frame {}: traced in {:?}, presented in {:?}", input.frame, traced, start.elapsed() - traced);
        Ok(true)
    }
}
