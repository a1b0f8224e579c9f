//! Linear algebra for instance transforms.
//!
//! Pure functions, no GPU dependency. Matrices are row-major and follow the
//! row-vector convention (translation in the last row).

mod matrix;

pub use matrix::{
    array_to_matrix, euler_matrix, multiply_many_matrices, multiply_matrices, scale_matrix,
    translation_matrix, Mat4, Matrix,
};
