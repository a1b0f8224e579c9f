use std::ops::Mul;

/// Dense row-major matrix with `R` rows and `C` columns.
///
/// Affine transforms follow the row-vector convention: a point is transformed
/// as `p' = p * M`, and the translation lives in the last row. Flattening a
/// `Mat4` row by row therefore yields exactly the sixteen floats a GLSL `mat4`
/// attribute or uniform expects (each stored row becomes one GLSL column).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix<const R: usize, const C: usize>(pub [[f32; C]; R]);

/// 4x4 transform matrix.
pub type Mat4 = Matrix<4, 4>;

impl<const N: usize> Matrix<N, N> {
    pub fn identity() -> Self {
        let mut rows = [[0.0; N]; N];
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self(rows)
    }
}

impl<const R: usize, const C: usize> Matrix<R, C> {
    /// Row-major view of all `R * C` elements.
    pub fn as_flat(&self) -> &[f32] {
        self.0.as_flattened()
    }

    pub fn flatten(&self) -> Vec<f32> {
        self.as_flat().to_vec()
    }

    /// Largest absolute element-wise difference to `other`.
    pub fn max_abs_diff(&self, other: &Self) -> f32 {
        self.as_flat()
            .iter()
            .zip(other.as_flat())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }
}

impl Mat4 {
    /// Transforms a point (implicit `w = 1`) using the row-vector convention.
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let v = [p[0], p[1], p[2], 1.0];
        let mut out = [0.0f32; 4];
        for (c, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|r| v[r] * self.0[r][c]).sum();
        }
        [out[0], out[1], out[2]]
    }

    /// Translation component stored in the last row.
    pub fn translation(&self) -> [f32; 3] {
        [self.0[3][0], self.0[3][1], self.0[3][2]]
    }
}

/// Builds a rotation matrix from three angles in radians.
///
/// `x` is the attitude angle, `y` the heading and `z` the bank. The element
/// formulas are fixed; every caller that bakes orientation into instance
/// data relies on this exact rotation-order convention.
pub fn euler_matrix(x: f32, y: f32, z: f32) -> Mat4 {
    let (sa, ca) = x.sin_cos();
    let (sb, cb) = z.sin_cos();
    let (sh, ch) = y.sin_cos();

    Matrix([
        [ch * ca, sa, -sh * ca, 0.0],
        [(-ch * sa * cb) + (sh * sb), ca * cb, (sh * sa * cb) + (ch * sb), 0.0],
        [(ch * sa * sb) + (sh * cb), -ca * sb, (-sh * sa * sb) + (ch * cb), 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

pub fn translation_matrix(x: f32, y: f32, z: f32) -> Mat4 {
    Matrix([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [x, y, z, 1.0],
    ])
}

pub fn scale_matrix(x: f32, y: f32, z: f32) -> Mat4 {
    Matrix([
        [x, 0.0, 0.0, 0.0],
        [0.0, y, 0.0, 0.0],
        [0.0, 0.0, z, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Standard matrix product `a * b`.
///
/// The inner dimensions are part of the type, so a column/row mismatch does
/// not compile.
pub fn multiply_matrices<const R: usize, const K: usize, const C: usize>(
    a: &Matrix<R, K>,
    b: &Matrix<K, C>,
) -> Matrix<R, C> {
    let mut m = [[0.0f32; C]; R];
    for (r, row) in m.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            for i in 0..K {
                *cell += a.0[r][i] * b.0[i][c];
            }
        }
    }
    Matrix(m)
}

/// Composes a chain of transforms, starting from identity and folding each
/// matrix in as `acc = next * acc`.
///
/// The result is `Mn * ... * M2 * M1`: under the row-vector convention the
/// *last* listed matrix is applied first and the first listed matrix is
/// applied last. `multiply_many_matrices([translate, rotate, scale])` scales,
/// then rotates, then translates. Do not flip the fold.
pub fn multiply_many_matrices<'a, const N: usize>(
    matrices: impl IntoIterator<Item = &'a Matrix<N, N>>,
) -> Matrix<N, N> {
    matrices
        .into_iter()
        .fold(Matrix::identity(), |acc, m| multiply_matrices(m, &acc))
}

/// Reshapes a flat row-major sequence into an `N x N` matrix.
///
/// Panics if `flat` holds fewer than `N * N` elements; extra elements are
/// ignored.
pub fn array_to_matrix<const N: usize>(flat: &[f32]) -> Matrix<N, N> {
    assert!(
        flat.len() >= N * N,
        "array_to_matrix: need {} elements, got {}",
        N * N,
        flat.len()
    );
    let mut rows = [[0.0f32; N]; N];
    for (r, row) in rows.iter_mut().enumerate() {
        row.copy_from_slice(&flat[r * N..(r + 1) * N]);
    }
    Matrix(rows)
}

impl<const R: usize, const K: usize, const C: usize> Mul<Matrix<K, C>> for Matrix<R, K> {
    type Output = Matrix<R, C>;

    fn mul(self, rhs: Matrix<K, C>) -> Self::Output {
        multiply_matrices(&self, &rhs)
    }
}
