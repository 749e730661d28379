//! Indexed triangle primitives. Front faces wind counter-clockwise.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, tex_coord: Vec2) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.tex_coords.push(tex_coord);
        index
    }

    fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereGeometry {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereGeometry {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }
}

impl SphereGeometry {
    pub fn build(&self) -> Geometry {
        let width_segments = self.width_segments.max(3);
        let height_segments = self.height_segments.max(2);

        let mut geometry = Geometry::default();
        let mut grid: Vec<Vec<u32>> = Vec::with_capacity(height_segments as usize + 1);

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;

            // Poles get their texture coordinate nudged into the middle of the adjacent quad.
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };

            let row = (0..=width_segments)
                .map(|ix| {
                    let u = ix as f32 / width_segments as f32;
                    let (phi_sin, phi_cos) = (u * TAU).sin_cos();
                    let (theta_sin, theta_cos) = (v * PI).sin_cos();

                    let position = Vec3::new(
                        -self.radius * phi_cos * theta_sin,
                        self.radius * theta_cos,
                        self.radius * phi_sin * theta_sin,
                    );

                    geometry.push_vertex(
                        position,
                        position.normalize_or_zero(),
                        Vec2::new(u + u_offset, 1.0 - v),
                    )
                })
                .collect();

            grid.push(row);
        }

        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];

                if iy != 0 {
                    geometry.push_triangle(a, b, d);
                }
                if iy != height_segments as usize - 1 {
                    geometry.push_triangle(b, c, d);
                }
            }
        }

        geometry
    }
}

/// A flat rectangle in the XY plane facing +Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneGeometry {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for PlaneGeometry {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            width_segments: 1,
            height_segments: 1,
        }
    }
}

impl PlaneGeometry {
    pub fn build(&self) -> Geometry {
        let grid_x = self.width_segments.max(1);
        let grid_y = self.height_segments.max(1);

        let segment_width = self.width / grid_x as f32;
        let segment_height = self.height / grid_y as f32;
        let width_half = self.width * 0.5;
        let height_half = self.height * 0.5;

        let mut geometry = Geometry::default();

        for iy in 0..=grid_y {
            let y = iy as f32 * segment_height - height_half;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - width_half;
                geometry.push_vertex(
                    Vec3::new(x, -y, 0.0),
                    Vec3::Z,
                    Vec2::new(
                        ix as f32 / grid_x as f32,
                        1.0 - iy as f32 / grid_y as f32,
                    ),
                );
            }
        }

        let row = grid_x + 1;
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = (ix + 1) + row * (iy + 1);
                let d = (ix + 1) + row * iy;

                geometry.push_triangle(a, b, d);
                geometry.push_triangle(b, c, d);
            }
        }

        geometry
    }
}

/// A (possibly tapered) tube along the Y axis, centered on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CylinderGeometry {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub height_segments: u32,
    pub open_ended: bool,
    /// Start angle of the first radial segment, in radians.
    pub theta_start: f32,
    /// Angle swept by the radial segments, in radians.
    pub theta_length: f32,
}

impl Default for CylinderGeometry {
    fn default() -> Self {
        Self {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
            radial_segments: 32,
            height_segments: 1,
            open_ended: false,
            theta_start: 0.0,
            theta_length: TAU,
        }
    }
}

impl CylinderGeometry {
    pub fn build(&self) -> Geometry {
        let radial_segments = self.radial_segments.max(3);
        let height_segments = self.height_segments.max(1);
        let half_height = self.height * 0.5;

        let mut geometry = Geometry::default();

        // Torso.
        {
            let slope = (self.radius_bottom - self.radius_top) / self.height;
            let mut grid: Vec<Vec<u32>> = Vec::with_capacity(height_segments as usize + 1);

            for y in 0..=height_segments {
                let v = y as f32 / height_segments as f32;
                let radius = v * (self.radius_bottom - self.radius_top) + self.radius_top;

                let row = (0..=radial_segments)
                    .map(|x| {
                        let u = x as f32 / radial_segments as f32;
                        let (sin, cos) = self.theta(u).sin_cos();

                        geometry.push_vertex(
                            Vec3::new(radius * sin, -v * self.height + half_height, radius * cos),
                            Vec3::new(sin, slope, cos).normalize(),
                            Vec2::new(u, 1.0 - v),
                        )
                    })
                    .collect();

                grid.push(row);
            }

            for x in 0..radial_segments as usize {
                for y in 0..height_segments as usize {
                    let a = grid[y][x];
                    let b = grid[y + 1][x];
                    let c = grid[y + 1][x + 1];
                    let d = grid[y][x + 1];

                    geometry.push_triangle(a, b, d);
                    geometry.push_triangle(b, c, d);
                }
            }
        }

        if !self.open_ended {
            if self.radius_top > 0.0 {
                self.build_cap(&mut geometry, radial_segments, true);
            }
            if self.radius_bottom > 0.0 {
                self.build_cap(&mut geometry, radial_segments, false);
            }
        }

        geometry
    }

    fn theta(&self, u: f32) -> f32 {
        u * self.theta_length + self.theta_start
    }

    fn build_cap(&self, geometry: &mut Geometry, radial_segments: u32, top: bool) {
        let (radius, sign) = if top {
            (self.radius_top, 1.0)
        } else {
            (self.radius_bottom, -1.0)
        };
        let y = self.height * 0.5 * sign;
        let normal = Vec3::new(0.0, sign, 0.0);

        // One center vertex per segment so each triangle gets its own texture coordinate.
        let center_start = geometry.positions.len() as u32;
        for _ in 0..radial_segments {
            geometry.push_vertex(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5));
        }

        let rim_start = geometry.positions.len() as u32;
        for x in 0..=radial_segments {
            let u = x as f32 / radial_segments as f32;
            let (sin, cos) = self.theta(u).sin_cos();
            geometry.push_vertex(
                Vec3::new(radius * sin, y, radius * cos),
                normal,
                Vec2::new(cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5),
            );
        }

        for x in 0..radial_segments {
            let center = center_start + x;
            let rim = rim_start + x;

            if top {
                geometry.push_triangle(rim, rim + 1, center);
            } else {
                geometry.push_triangle(rim + 1, rim, center);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every triangle's winding must agree with the normals of its vertices.
    fn assert_faces_outward(geometry: &Geometry) {
        for triangle in geometry.indices.chunks_exact(3) {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            let (pa, pb, pc) = (
                geometry.positions[a],
                geometry.positions[b],
                geometry.positions[c],
            );
            let face_normal = (pb - pa).cross(pc - pa);
            if face_normal.length_squared() < 1e-12 {
                continue;
            }
            let vertex_normal = geometry.normals[a] + geometry.normals[b] + geometry.normals[c];
            assert!(
                face_normal.dot(vertex_normal) > 0.0,
                "triangle {triangle:?} winds against its normals"
            );
        }
    }

    fn assert_indices_in_range(geometry: &Geometry) {
        let count = geometry.vertex_count() as u32;
        assert!(geometry.indices.iter().all(|i| *i < count));
        assert_eq!(geometry.indices.len() % 3, 0);
    }

    #[test]
    fn sphere() {
        let geometry = SphereGeometry {
            radius: 0.5,
            width_segments: 32,
            height_segments: 32,
        }
        .build();

        assert_eq!(geometry.vertex_count(), 33 * 33);
        // The pole rows only have one triangle per quad.
        assert_eq!(geometry.triangle_count(), 32 * 32 * 2 - 32 * 2);
        assert!(
            geometry
                .positions
                .iter()
                .all(|p| (p.length() - 0.5).abs() < 1e-5)
        );
        assert_indices_in_range(&geometry);
        assert_faces_outward(&geometry);
    }

    #[test]
    fn plane() {
        let geometry = PlaneGeometry {
            width: 5.0,
            height: 5.0,
            ..Default::default()
        }
        .build();

        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.triangle_count(), 2);
        assert_eq!(geometry.positions[0], Vec3::new(-2.5, 2.5, 0.0));
        assert_eq!(geometry.positions[3], Vec3::new(2.5, -2.5, 0.0));
        assert_indices_in_range(&geometry);
        assert_faces_outward(&geometry);
    }

    #[test]
    fn open_cylinder() {
        let geometry = CylinderGeometry {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 5.0,
            radial_segments: 5,
            height_segments: 15,
            open_ended: true,
            theta_start: 30.0,
            ..Default::default()
        }
        .build();

        assert_eq!(geometry.vertex_count(), 6 * 16);
        assert_eq!(geometry.triangle_count(), 5 * 15 * 2);

        let (min, max) = geometry
            .positions
            .iter()
            .fold((f32::MAX, f32::MIN), |(min, max), p| {
                (min.min(p.y), max.max(p.y))
            });
        assert!((min + 2.5).abs() < 1e-5);
        assert!((max - 2.5).abs() < 1e-5);

        assert_indices_in_range(&geometry);
        assert_faces_outward(&geometry);
    }

    #[test]
    fn closed_cylinder_has_caps() {
        let open = CylinderGeometry {
            open_ended: true,
            radial_segments: 8,
            ..Default::default()
        }
        .build();
        let closed = CylinderGeometry {
            radial_segments: 8,
            ..Default::default()
        }
        .build();

        // Each cap adds 8 centers, 9 rim vertices and 8 triangles.
        assert_eq!(closed.vertex_count(), open.vertex_count() + 2 * 17);
        assert_eq!(closed.triangle_count(), open.triangle_count() + 2 * 8);
        assert_indices_in_range(&closed);
        assert_faces_outward(&closed);
    }
}
