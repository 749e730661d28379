pub mod skinned_mesh;
