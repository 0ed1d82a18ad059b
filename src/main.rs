use debug_draw::asset::BuiltinEffects;
use debug_draw::geometry::GlyphSource;
use debug_draw::renderer::BatchStats;
use debug_draw::{
    CompareFunc, DrawSettings, DrawType, FrameContext, FrameLifecycle, FramePhase, Geometry,
    GpuBackend, HeadlessBackend, SceneGraph, WgpuBackend,
};
use glam::{Mat4, Vec3, Vec4};

const FRAMES: usize = 3;
const TARGET_SIZE: u32 = 256;
const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Stand-in font: every visible character is a filled cell.
struct BlockGlyphs;

impl GlyphSource for BlockGlyphs {
    fn glyph(&mut self, ch: char, scale: f32) -> Option<Geometry> {
        if ch.is_whitespace() {
            return None;
        }
        let (w, h) = (0.3 * scale, 0.5 * scale);
        Some(Geometry::triangles(
            vec![
                Vec3::new(-w, -h, 0.0),
                Vec3::new(w, -h, 0.0),
                Vec3::new(w, h, 0.0),
                Vec3::new(-w, h, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        ))
    }
}

fn draw_frame(lifecycle: &mut FrameLifecycle, frame: usize) {
    let Some(drawer) = lifecycle.current_drawer() else {
        return;
    };
    if frame == 0 {
        drawer.set_glyph_source(Box::new(BlockGlyphs));
    }

    drawer.set_draw_type(DrawType::SOLID | DrawType::FRAME_WIRE_DOUBLE);
    drawer.set_color(Vec4::new(0.2, 0.6, 1.0, 0.5));
    drawer.draw_box();

    drawer.set_matrix(Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
    drawer.sphere();

    drawer.set_draw_type(DrawType::LINE);
    drawer.set_matrix(Mat4::from_rotation_y(frame as f32 * 0.3));
    drawer.primitive("box");
    drawer.primitive("triangle");

    drawer.depth(Some(false), None, Some(CompareFunc::Always));
    drawer.set_color(Vec4::new(1.0, 1.0, 0.0, 1.0));
    drawer.line(&[[Vec3::ZERO, Vec3::X, Vec3::Y]]);
    drawer.polyline(&[Vec3::ZERO, Vec3::Z, Vec3::new(1.0, 0.0, 1.0)]);

    drawer.set_draw_type(DrawType::SOLID);
    drawer.set_matrix(Mat4::from_translation(Vec3::new(-3.0, 1.5, 0.0)));
    drawer.text(&format!("frame {}", frame), 0.5);
}

fn log_stats(frame: usize, stats: &[BatchStats]) {
    for s in stats {
        log::info!(
            "frame {}: `{}` active={} vertices={} indices={} instances={}",
            frame,
            s.key,
            s.active,
            s.vertex_count,
            s.index_count,
            s.instances
        );
    }
}

fn run_frame(
    lifecycle: &mut FrameLifecycle,
    gpu: &mut dyn GpuBackend,
    scene: &mut SceneGraph,
    frame: usize,
) {
    let mut ctx = FrameContext::new(gpu, scene);
    lifecycle.dispatch(FramePhase::PreUpdate, &mut ctx);
    draw_frame(lifecycle, frame);
    lifecycle.dispatch(FramePhase::PreDraw, &mut ctx);

    if let Some(drawer) = lifecycle.current_drawer() {
        log_stats(frame, &drawer.stats());
    }
}

fn run_headless(settings: DrawSettings) {
    let mut gpu = HeadlessBackend::new();
    let mut scene = SceneGraph::new();
    scene.load_scene("demo");

    let mut lifecycle = FrameLifecycle::new(settings, BuiltinEffects);
    lifecycle.install(&mut FrameContext::new(&mut gpu, &mut scene));

    for frame in 0..FRAMES {
        run_frame(&mut lifecycle, &mut gpu, &mut scene, frame);
        log::info!(
            "frame {}: {} meshes, {} materials, uploads {:?}",
            frame,
            gpu.mesh_count(),
            gpu.material_count(),
            gpu.stats()
        );
        gpu.reset_stats();
    }

    lifecycle.uninstall(&mut FrameContext::new(&mut gpu, &mut scene));
}

fn run_gpu(settings: DrawSettings) -> Result<(), debug_draw::DrawError> {
    let mut gpu = pollster::block_on(WgpuBackend::request(COLOR_FORMAT, Some(DEPTH_FORMAT)))?;
    let mut scene = SceneGraph::new();
    scene.load_scene("demo");

    let extent = wgpu::Extent3d {
        width: TARGET_SIZE,
        height: TARGET_SIZE,
        depth_or_array_layers: 1,
    };
    let target_view = |format: wgpu::TextureFormat, label: &str, gpu: &WgpuBackend| {
        gpu.device()
            .create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: extent,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    };
    let color = target_view(COLOR_FORMAT, "DemoColor", &gpu);
    let depth = target_view(DEPTH_FORMAT, "DemoDepth", &gpu);

    let view_proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 1.0, 0.1, 100.0)
        * Mat4::look_at_rh(Vec3::new(4.0, 4.0, 8.0), Vec3::ZERO, Vec3::Y);

    let mut lifecycle = FrameLifecycle::new(settings, BuiltinEffects);
    lifecycle.install(&mut FrameContext::new(&mut gpu, &mut scene));

    for frame in 0..FRAMES {
        run_frame(&mut lifecycle, &mut gpu, &mut scene, frame);
        gpu.prepare(&mut scene, view_proj);

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("DemoEncoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("DebugDrawPass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.05,
                            g: 0.07,
                            b: 0.10,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            gpu.draw(&mut pass);
        }
        gpu.queue().submit(Some(encoder.finish()));
        log::info!("frame {}: {} draws submitted", frame, gpu.draw_count());
    }

    lifecycle.uninstall(&mut FrameContext::new(&mut gpu, &mut scene));
    Ok(())
}

fn main() {
    debug_draw::init_logging();
    let settings = DrawSettings::load_from_path("debug_draw.json");

    if std::env::args().any(|arg| arg == "--gpu") {
        if let Err(err) = run_gpu(settings) {
            eprintln!("Application error: {err}");
        }
    } else {
        run_headless(settings);
    }
}
