use std::iter::once;
use std::mem::size_of;

use log::debug;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use wgpu::{AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, ColorTargetState, ColorWrites, CommandEncoderDescriptor, DeviceDescriptor, Extent3d, FilterMode, FragmentState, ImageCopyTexture, ImageDataLayout, include_wgsl, InstanceDescriptor, LoadOp, Operations, Origin3d, PipelineLayoutDescriptor, PrimitiveState, RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, RequestAdapterOptions, SamplerBindingType, SamplerDescriptor, ShaderStages, Surface, SurfaceConfiguration, SurfaceError, Texture, TextureAspect, TextureDescriptor, TextureDimension, TextureSampleType, TextureUsages, TextureViewDescriptor, TextureViewDimension, VertexState};

use crate::picture::{Bitplane, Picture, PixelFormat, RGBA8};

/// Host side of the frame callback: shows a bitplane on a window surface.
pub struct Display {
    gpu: Gpu,
    surface: Surface,
    surface_config: SurfaceConfiguration,
    pipeline: RenderPipeline,
    bind_group: BindGroup,
    texture: Texture,
    pixels: Vec<RGBA8>,
    frame_size: (u32, u32),
}

impl Display {
    pub fn new(gpu: Gpu, surface: Surface, surface_size: (u32, u32), frame_size: (u32, u32)) -> Self {
        let (width, height) = surface_size;
        let mut surface_config = surface.get_default_config(&gpu.adapter, width, height)
            .expect("default surface config");
        surface_config.format = surface_config.format.remove_srgb_suffix();
        surface.configure(&gpu.device, &surface_config);
        debug!(target: "app", "Surface: {:?}", surface_config);

        let texture = gpu.device.create_texture(&TextureDescriptor {
            label: Some("bitplane"),
            size: Extent3d {
                width: frame_size.0,
                height: frame_size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: RGBA8::texture_format(),
            usage: TextureUsages::COPY_DST | TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        // nearest sampling keeps pixels crisp at any window scale
        let sampler = gpu.device.create_sampler(&SamplerDescriptor {
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            ..Default::default()
        });

        let layout = gpu.device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: None,
            entries: &[
                BindGroupLayoutEntry {
                    count: None,
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        multisampled: false,
                        sample_type: TextureSampleType::Float { filterable: false },
                        view_dimension: TextureViewDimension::D2,
                    },
                },
                BindGroupLayoutEntry {
                    count: None,
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::NonFiltering),
                },
            ],
        });
        let view = texture.create_view(&TextureViewDescriptor::default());
        let bind_group = gpu.device.create_bind_group(&BindGroupDescriptor {
            label: None,
            layout: &layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&sampler),
                },
            ],
        });

        let module = gpu.device.create_shader_module(include_wgsl!("shader.wgsl"));
        let pipeline_layout = gpu.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let pipeline = gpu.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: None,
            layout: Some(&pipeline_layout),
            // the quad is generated from the vertex index, no vertex buffer
            vertex: VertexState {
                module: &module,
                entry_point: "vertex_main",
                buffers: &[],
            },
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: Default::default(),
            fragment: Some(FragmentState {
                module: &module,
                entry_point: "fragment_main",
                targets: &[Some(ColorTargetState {
                    format: surface_config.format,
                    blend: None,
                    write_mask: ColorWrites::COLOR,
                })],
            }),
            multiview: None,
        });

        let pixels = vec![RGBA8::BLACK; frame_size.0 as usize * frame_size.1 as usize];
        debug!(target: "app", "Allocating frame. {}x{}, {} bytes", frame_size.0, frame_size.1, pixels.len() * size_of::<RGBA8>());

        Display {
            gpu,
            surface,
            surface_config,
            pipeline,
            bind_group,
            texture,
            pixels,
            frame_size,
        }
    }

    pub fn surface_resize(&mut self, surface_size: (u32, u32)) {
        if surface_size.0 == 0 || surface_size.1 == 0 {
            return;
        }
        self.surface_config.width = surface_size.0;
        self.surface_config.height = surface_size.1;
        self.surface.configure(&self.gpu.device, &self.surface_config);
    }

    pub fn show(&mut self, bitplane: &Bitplane) {
        bitplane.expand_into(&mut Picture::new(&mut self.pixels[..], self.frame_size));

        let target = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Timeout) => return,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.surface.configure(&self.gpu.device, &self.surface_config);
                return;
            }
            Err(err) => panic!("current surface texture: {}", err),
        };
        let target_view = target.texture.create_view(&TextureViewDescriptor::default());

        let (width, height) = self.frame_size;
        self.gpu.queue.write_texture(
            ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                aspect: TextureAspect::All,
                origin: Origin3d::ZERO,
            },
            bytemuck::cast_slice(&self.pixels),
            ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(size_of::<RGBA8>() as u32 * width),
                rows_per_image: Some(height),
            },
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let mut encoder = self.gpu.device.create_command_encoder(&CommandEncoderDescriptor::default());
        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &target_view,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                    resolve_target: None,
                })],
                depth_stencil_attachment: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
        self.gpu.queue.submit(once(encoder.finish()));

        target.present();
    }
}

pub struct Gpu {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Gpu {
    pub async fn new() -> Self {
        let instance = wgpu::Instance::new(InstanceDescriptor::default());
        let adapter = instance.request_adapter(&RequestAdapterOptions::default())
            .await
            .expect("wgpu adapter");
        let (device, queue) = adapter.request_device(&DeviceDescriptor::default(), None).await
            .expect("wgpu device");

        Gpu { instance, adapter, device, queue }
    }

    pub fn surface<R>(&self, raw: &R) -> Surface
        where R: HasRawWindowHandle + HasRawDisplayHandle {
        unsafe { self.instance.create_surface(raw) }
            .expect("surface")
    }
}
