//! Frame-callback programs for a 400x240 1-bit display, the main one being
//! a sphere tracer over a signed distance field, temporally dithered.

use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info};
use winit::dpi::LogicalSize;
use winit::event::{Event, MouseScrollDelta, StartCause, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

use crate::config::Settings;
use crate::gpu::{Display, Gpu};
use crate::picture::Bitplane;
use crate::program::Input;

mod camera;
mod config;
mod dither;
mod error;
mod gpu;
mod march;
mod math;
mod picture;
mod program;
mod ray;
mod render;
mod scene;
mod shade;

// degrees of crank per scroll unit
const CRANK_PER_LINE: f32 = 15.0;
const CRANK_PER_PIXEL: f32 = 0.5;

struct FrameRate {
    frames: u32,
    since: Instant,
}

impl FrameRate {
    fn new() -> Self {
        FrameRate { frames: 0, since: Instant::now() }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.since.elapsed();
        if elapsed >= Duration::from_secs(1) {
            info!(target: "app", "{:.1} fps", self.frames as f32 / elapsed.as_secs_f32());
            self.frames = 0;
            self.since = Instant::now();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder().target(env_logger::Target::Stdout).init();

    let settings = Settings::parse();
    settings.validate()?;
    info!(target: "app", "Starting {:?} at {} Hz, {:?} noise", settings.program, settings.refresh_rate, settings.noise);

    let (cols, rows) = (settings.cols, settings.rows);
    let (window_width, window_height) = settings.window_size();
    let mut program = settings.build_program()?;
    let mut bitplane = Bitplane::new(cols, rows);

    let event_loop = EventLoop::new();

    let window = WindowBuilder::new()
        .with_title("bitplane-march")
        .with_inner_size(LogicalSize::new(window_width, window_height))
        .build(&event_loop)
        .expect("window");

    let mut display = smol::block_on(async {
        let gpu = Gpu::new().await;
        let surface = gpu.surface(&window);
        let size = window.inner_size();
        Display::new(gpu, surface, (size.width, size.height), (cols, rows))
    });

    let period = settings.frame_period()?;
    let mut next_tick = Instant::now();
    let mut input = Input::default();
    let mut frame_rate = FrameRate::new();

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::NewEvents(StartCause::Init | StartCause::ResumeTimeReached { .. }) => {
                window.request_redraw();
            }
            Event::RedrawRequested(window_id) if window.id() == window_id => {
                match program.update(&mut bitplane, &input) {
                    Ok(true) => {}
                    Ok(false) => {
                        info!(target: "app", "Program finished after {} frames", input.frame);
                        control_flow.set_exit();
                        return;
                    }
                    Err(err) => {
                        error!(target: "app", "Frame {} failed: {}", input.frame, err);
                        control_flow.set_exit();
                        return;
                    }
                }
                display.show(&bitplane);
                input.frame += 1;
                frame_rate.tick();

                next_tick = (next_tick + period).max(Instant::now());
                control_flow.set_wait_until(next_tick);
            }
            Event::WindowEvent { event, window_id } if window.id() == window_id => match event {
                WindowEvent::Resized(size) => {
                    display.surface_resize((size.width, size.height));
                }
                WindowEvent::CloseRequested => control_flow.set_exit(),
                WindowEvent::MouseWheel { delta, .. } => {
                    let turn = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y * CRANK_PER_LINE,
                        MouseScrollDelta::PixelDelta(position) => position.y as f32 * CRANK_PER_PIXEL,
                    };
                    // the first turn picks up from wherever time had the light
                    let crank = input.crank.unwrap_or_else(|| input.angle().to_degrees());
                    input.crank = Some((crank + turn).rem_euclid(360.0));
                }
                _ => {}
            }
            _ => {}
        }
    });
}
