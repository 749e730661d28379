use std::f32::consts::FRAC_PI_2;

use skinning::{
    CylinderGeometry, PlaneGeometry, Pose, Skeleton, SkinWeightCalculator, SkinningError,
    SphereGeometry, SwingAnimation, generate_pose,
};
use tracing::info;

use crate::{
    engine::{
        gizmos::GizmosRenderer,
        lights::{AmbientLight, PointLight},
        material::Material,
        prelude::*,
    },
    game::{
        camera::{Camera, CameraUniform},
        config::SceneConfig,
        orbit_controls::OrbitControls,
    },
};

mod helpers;
mod mesh_renderer;

pub use helpers::HelperFlags;
use helpers::helper_lines;
use mesh_renderer::{MeshRenderer, RenderObject};

const REFERENCE_COLOR: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// A cylinder skinned to a swinging chain of bones, next to a sphere on a plane.
pub struct SkinnedMeshScene {
    depth_buffer: DepthBuffer,
    viewport_height: f32,

    camera: Camera,
    controls: OrbitControls,
    camera_buffer: UniformBuffer<CameraUniform>,

    mesh_renderer: MeshRenderer,
    gizmos: GizmosRenderer,

    skeleton: Skeleton,
    /// Inverse of every bone's rest matrix, taken when the mesh was bound.
    inverse_bind: Vec<Mat4>,
    pose: Pose,
    animation: SwingAnimation,

    ambient_light: AmbientLight,
    point_light: PointLight,
    material: Material,

    sphere: RenderObject,
    plane: RenderObject,
    skinned: RenderObject,
    /// The same cylinder, unskinned and unlit.
    reference: RenderObject,

    helpers: HelperFlags,

    /// Animation time in seconds.
    time: f32,
    paused: bool,
    speed: f32,
    last_delta_time: f32,
}

impl SkinnedMeshScene {
    pub fn new(renderer: &Renderer, config: &SceneConfig) -> Result<Self, SkinningError> {
        let size = renderer.surface.size();

        let depth_buffer = DepthBuffer::new(&renderer.device, size);

        let mut camera = Camera::new(
            config.camera_position,
            config.camera_fov,
            size.x as f32 / size.y.max(1) as f32,
        );
        let mut controls = OrbitControls::new(Vec3::ZERO, config.damping);
        controls.update(&mut camera);

        let camera_bind_group_layout = UniformBuffer::<CameraUniform>::create_bind_group_layout(
            renderer,
            "camera_bind_group_layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let camera_buffer = UniformBuffer::new(renderer, "camera", &camera_bind_group_layout);

        let mesh_renderer = MeshRenderer::new(renderer, &camera_bind_group_layout);
        let gizmos = GizmosRenderer::new(renderer, &camera_bind_group_layout);

        let calculator = SkinWeightCalculator::new(config.segment_height, config.segment_count)?;
        let skeleton = Skeleton::chain(config.segment_count, config.segment_height)?;
        let rest_pose = Pose::rest(&skeleton);
        let inverse_bind = rest_pose.inverse();

        let cylinder = CylinderGeometry {
            height: calculator.total_height(),
            ..config.cylinder
        }
        .build();
        let skin = calculator.compute_attributes(&cylinder.positions);

        info!(
            "Skinned {} vertices to {} bones",
            cylinder.vertex_count(),
            skeleton.len()
        );

        let sphere = SphereGeometry {
            radius: 0.5,
            width_segments: 32,
            height_segments: 32,
        }
        .build();
        let plane = PlaneGeometry {
            width: 5.0,
            height: 5.0,
            ..Default::default()
        }
        .build();

        let sphere =
            mesh_renderer.create_object(renderer, "sphere", &Mesh::<Vertex>::from_geometry(&sphere));
        let plane =
            mesh_renderer.create_object(renderer, "plane", &Mesh::<Vertex>::from_geometry(&plane));
        let skinned = mesh_renderer.create_skinned_object(
            renderer,
            "skinned_cylinder",
            &Mesh::<SkinnedVertex>::from_skinned_geometry(&cylinder, &skin),
        );
        let mut reference = mesh_renderer.create_object(
            renderer,
            "reference_cylinder",
            &Mesh::<Vertex>::from_geometry(&cylinder),
        );
        reference.visible = false;

        Ok(Self {
            depth_buffer,
            viewport_height: size.y as f32,

            camera,
            controls,
            camera_buffer,

            mesh_renderer,
            gizmos,

            skeleton,
            inverse_bind,
            pose: rest_pose,
            animation: config.animation.clone(),

            ambient_light: config.ambient_light,
            point_light: config.point_light,
            material: Material::Standard {
                color: Vec3::ONE,
                roughness: config.roughness,
            },

            sphere,
            plane,
            skinned,
            reference,

            helpers: HelperFlags::default(),

            time: 0.0,
            paused: false,
            speed: 1.0,
            last_delta_time: 0.0,
        })
    }

    fn sphere_transform() -> Mat4 {
        Mat4::from_translation(Vec3::new(-1.5, 0.0, 0.0))
    }

    fn plane_transform() -> Mat4 {
        Mat4::from_rotation_translation(
            Quat::from_rotation_x(-FRAC_PI_2),
            Vec3::new(0.0, -0.65, 0.0),
        )
    }
}

impl Scene for SkinnedMeshScene {
    fn resize(&mut self, renderer: &Renderer) {
        let size = renderer.surface.size();
        self.depth_buffer.resize(&renderer.device, size);
        self.camera.resize(size.x, size.y);
        self.viewport_height = size.y as f32;
    }

    fn update(&mut self, delta_time: f32, input: &InputState) {
        self.last_delta_time = delta_time;

        if input.key_just_pressed(KeyCode::Space) {
            self.paused = !self.paused;
        }

        if !self.paused {
            self.time += delta_time * self.speed;
        }

        let rotations = self.animation.sample(&self.skeleton, self.time);
        self.pose = generate_pose(&self.skeleton, &rotations);

        self.controls
            .handle_input(input, self.viewport_height, &self.camera);
        self.controls.update(&mut self.camera);
    }

    fn render(&mut self, frame: &mut Frame) {
        let queue = &frame.queue;

        self.camera_buffer.upload(queue, |camera| {
            *camera = self.camera.calculate_matrices();
        });
        self.mesh_renderer
            .set_lights(queue, &self.ambient_light, &self.point_light);

        self.sphere
            .set_transform_and_material(queue, Self::sphere_transform(), &self.material);
        self.plane
            .set_transform_and_material(queue, Self::plane_transform(), &self.material);
        self.skinned
            .set_transform_and_material(queue, Mat4::IDENTITY, &self.material);
        self.skinned
            .set_bone_matrices(queue, &self.pose.skinning_matrices(&self.inverse_bind));
        self.reference.set_transform_and_material(
            queue,
            Mat4::IDENTITY,
            &Material::Basic {
                color: REFERENCE_COLOR,
            },
        );

        let (depth_tested, overlay) = helper_lines(self.helpers, &self.skeleton, &self.pose);
        self.gizmos.prepare(frame.renderer, &depth_tested, &overlay);

        let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("skinned_mesh_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.surface,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(self.depth_buffer.attachment(true)),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.mesh_renderer.draw(
            &mut render_pass,
            &self.camera_buffer.bind_group,
            [&self.sphere, &self.plane, &self.skinned, &self.reference],
        );
        self.gizmos
            .draw(&mut render_pass, &self.camera_buffer.bind_group);
    }

    #[cfg(feature = "egui")]
    fn debug_panel(&mut self, egui: &egui::Context) {
        use skinning::Wave;
        use strum::IntoEnumIterator;

        fn color_edit(ui: &mut egui::Ui, color: &mut Vec3) {
            let mut rgb = color.to_array();
            if ui.color_edit_button_rgb(&mut rgb).changed() {
                *color = Vec3::from_array(rgb);
            }
        }

        egui::Window::new("Skinned mesh").show(egui, |ui| {
            ui.label(format!(
                "frame time: {:.2} ms",
                self.last_delta_time * 1000.0
            ));

            ui.heading("Lights");
            egui::Grid::new("lights").show(ui, |ui| {
                ui.label("ambient");
                color_edit(ui, &mut self.ambient_light.color);
                ui.add(egui::Slider::new(&mut self.ambient_light.intensity, 0.0..=1.0));
                ui.end_row();

                ui.label("point");
                color_edit(ui, &mut self.point_light.color);
                ui.add(egui::Slider::new(&mut self.point_light.intensity, 0.0..=1.0));
                ui.end_row();

                ui.label("distance");
                ui.add(egui::Slider::new(&mut self.point_light.distance, 0.0..=20.0));
                ui.end_row();

                ui.label("decay");
                ui.add(egui::Slider::new(&mut self.point_light.decay, 0.0..=5.0));
                ui.end_row();

                ui.label("falloff at origin");
                let distance = self.point_light.position.length();
                ui.label(format!("{:.2}", self.point_light.attenuation(distance)));
                ui.end_row();

                ui.label("position");
                ui.horizontal(|ui| {
                    ui.add(egui::DragValue::new(&mut self.point_light.position.x).speed(0.01));
                    ui.add(egui::DragValue::new(&mut self.point_light.position.y).speed(0.01));
                    ui.add(egui::DragValue::new(&mut self.point_light.position.z).speed(0.01));
                });
                ui.end_row();
            });

            ui.heading("Material");
            if let Material::Standard {
                ref mut roughness, ..
            } = self.material
            {
                ui.add(egui::Slider::new(roughness, 0.0..=1.0).text("roughness"));
            }

            ui.heading("Animation");
            ui.horizontal(|ui| {
                ui.checkbox(&mut self.paused, "paused");
                ui.add(egui::Slider::new(&mut self.speed, 0.0..=3.0).text("speed"));
            });
            egui::Grid::new("swings").show(ui, |ui| {
                for (index, swing) in self.animation.swings.iter_mut().enumerate() {
                    ui.label(format!("bone {}", swing.bone));
                    egui::ComboBox::from_id_salt(("wave", index))
                        .selected_text(swing.wave.to_string())
                        .show_ui(ui, |ui| {
                            for wave in Wave::iter() {
                                ui.selectable_value(&mut swing.wave, wave, wave.to_string());
                            }
                        });
                    ui.add(
                        egui::DragValue::new(&mut swing.amplitude_degrees)
                            .speed(1.0)
                            .suffix("°"),
                    );
                    ui.add(
                        egui::DragValue::new(&mut swing.angular_frequency)
                            .speed(0.1)
                            .suffix(" rad/s"),
                    );
                    ui.end_row();
                }
            });

            ui.heading("Helpers");
            ui.horizontal(|ui| {
                for (flag, label) in [
                    (HelperFlags::AXES, "axes"),
                    (HelperFlags::SKELETON, "skeleton"),
                ] {
                    let mut enabled = self.helpers.contains(flag);
                    if ui.checkbox(&mut enabled, label).changed() {
                        self.helpers.set(flag, enabled);
                    }
                }
                ui.checkbox(&mut self.reference.visible, "reference mesh");
            });

            ui.heading("Camera");
            let (distance, theta, phi) = self.controls.spherical(&self.camera);
            ui.label(format!(
                "distance: {distance:.2}, theta: {:.1}°, phi: {:.1}°",
                theta.to_degrees(),
                phi.to_degrees()
            ));
        });
    }
}
