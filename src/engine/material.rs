use glam::{Mat4, Vec3, Vec4};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    /// Lit by the scene lights.
    Standard { color: Vec3, roughness: f32 },
    /// Flat color, ignores lights.
    Basic { color: Vec3 },
}

impl Default for Material {
    fn default() -> Self {
        Self::Standard {
            color: Vec3::ONE,
            roughness: 1.0,
        }
    }
}

/// Blinn-Phong exponent that gives a highlight of similar size to a GGX lobe of `roughness`.
pub fn roughness_to_shininess(roughness: f32) -> f32 {
    let r = roughness.clamp(0.04, 1.0);
    (2.0 / r.powi(4) - 2.0).max(1.0)
}

/// Per object data used by the mesh shaders.
#[derive(Clone, Copy, Debug, Default, bytemuck::NoUninit)]
#[repr(C)]
pub struct ObjectUniform {
    pub model: Mat4,
    pub normal_matrix: Mat4,
    pub color: Vec4,
    /// x = roughness, y = shininess, z = specular strength, w = 1.0 if unlit
    pub params: Vec4,
}

impl ObjectUniform {
    pub fn new(model: Mat4, material: &Material) -> Self {
        let normal_matrix = model.inverse().transpose();

        match *material {
            Material::Standard { color, roughness } => Self {
                model,
                normal_matrix,
                color: color.extend(1.0),
                params: Vec4::new(
                    roughness,
                    roughness_to_shininess(roughness),
                    1.0 - roughness.clamp(0.0, 1.0),
                    0.0,
                ),
            },
            Material::Basic { color } => Self {
                model,
                normal_matrix,
                color: color.extend(1.0),
                params: Vec4::new(1.0, 1.0, 0.0, 1.0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rougher_surfaces_have_wider_highlights() {
        let smooth = roughness_to_shininess(0.2);
        let medium = roughness_to_shininess(0.4);
        let rough = roughness_to_shininess(1.0);

        assert!(smooth > medium);
        assert!(medium > rough);
        assert!((medium - 76.125).abs() < 1e-2);
        assert_eq!(rough, 1.0);
    }

    #[test]
    fn basic_material_is_unlit() {
        let uniform = ObjectUniform::new(
            Mat4::IDENTITY,
            &Material::Basic {
                color: Vec3::new(1.0, 0.0, 0.0),
            },
        );
        assert_eq!(uniform.color, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(uniform.params.w, 1.0);
    }

    #[test]
    fn normal_matrix_ignores_translation() {
        let model = Mat4::from_translation(Vec3::new(-1.5, 0.0, 0.0));
        let uniform = ObjectUniform::new(model, &Material::default());
        let normal = uniform.normal_matrix.transform_vector3(Vec3::Y);
        assert!(normal.abs_diff_eq(Vec3::Y, 1e-6));
    }
}
