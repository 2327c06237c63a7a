/*
  Copyright 2017 Takashi Ogura

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
*/
//! Rigid transforms (SE(3)) stored as 3x4 `[R | t]` matrices
//!
//! Tangent vectors are ordered `[v, w]`: linear part first, angular part second.
//! Every Jacobian in this module uses right perturbations, `g ∘ exp(δ)`.
use crate::errors::*;
use crate::so3;
use crate::Real;
use nalgebra as na;
use na::{
    Isometry3, Matrix3, Matrix3x4, Matrix4, Matrix6, Translation3, UnitQuaternion, Vector3, Vector6,
};
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::TAU;
use std::fmt::{self, Display};

/// Element of the Lie algebra se(3), `[v, w]`
pub type TangentVector<T> = Vector6<T>;

/// Rigid body transform `[R | t]` with `R` in SO(3)
///
/// # Examples
///
/// ```
/// use kdiff::*;
///
/// let g = RigidTransform::from_isometry(&Isometry3::new(
///     Vector3::new(1.0, 0.0, 0.0),
///     Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2),
/// ));
/// let p = g.transform_point(&Vector3::new(1.0, 0.0, 0.0));
/// assert!((p - Vector3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
/// let back = g.inverse(None).compose(&g, None, None);
/// assert!((back.matrix() - RigidTransform::identity().matrix()).norm() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform<T: Real> {
    matrix: Matrix3x4<T>,
}

impl<T: Real> RigidTransform<T> {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3x4::identity(),
        }
    }
    /// Validates that the rotation block of `matrix` is a proper rotation
    ///
    /// # Examples
    ///
    /// ```
    /// use kdiff::*;
    ///
    /// assert!(RigidTransform::try_from_matrix(Matrix3x4::<f64>::identity(), 1e-9).is_ok());
    /// let skewed = Matrix3x4::new(
    ///     1.0, 0.1, 0.0, 0.0,
    ///     0.0, 1.0, 0.0, 0.0,
    ///     0.0, 0.0, 1.0, 0.0,
    /// );
    /// assert!(RigidTransform::try_from_matrix(skewed, 1e-9).is_err());
    /// ```
    pub fn try_from_matrix(matrix: Matrix3x4<T>, tolerance: T) -> Result<Self> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidTransformError {
                reason: "transform has non-finite entries".to_owned(),
            });
        }
        let rotation = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let deviation = (rotation.transpose() * rotation - Matrix3::identity()).amax();
        if deviation > tolerance {
            return Err(Error::InvalidTransformError {
                reason: format!(
                    "rotation is not orthonormal (|RᵀR - I| = {:.3e})",
                    na::convert::<T, f64>(deviation)
                ),
            });
        }
        let determinant = rotation.determinant();
        if determinant < T::zero() {
            return Err(Error::InvalidTransformError {
                reason: format!(
                    "rotation is a reflection (det = {:.3})",
                    na::convert::<T, f64>(determinant)
                ),
            });
        }
        Ok(Self { matrix })
    }
    /// Wraps `matrix` without checking its rotation block
    pub fn from_matrix_unchecked(matrix: Matrix3x4<T>) -> Self {
        Self { matrix }
    }
    pub fn from_parts_unchecked(rotation: &Matrix3<T>, translation: &Vector3<T>) -> Self {
        let mut matrix = Matrix3x4::zeros();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
        matrix.set_column(3, translation);
        Self { matrix }
    }
    pub fn from_isometry(isometry: &Isometry3<T>) -> Self {
        Self::from_parts_unchecked(
            isometry.rotation.to_rotation_matrix().matrix(),
            &isometry.translation.vector,
        )
    }
    pub fn from_translation(x: T, y: T, z: T) -> Self {
        Self::from_parts_unchecked(&Matrix3::identity(), &Vector3::new(x, y, z))
    }
    pub fn to_isometry(&self) -> Isometry3<T> {
        let rotation = na::Rotation3::from_matrix_unchecked(self.rotation());
        Isometry3::from_parts(
            Translation3::from(self.translation()),
            UnitQuaternion::from_rotation_matrix(&rotation),
        )
    }
    /// Random transform with a uniformly distributed rotation and a translation uniform in
    /// `[-1, 1)³`
    ///
    /// # Examples
    ///
    /// ```
    /// use kdiff::RigidTransform;
    /// use rand::SeedableRng;
    ///
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    /// let g = RigidTransform::<f64>::rand(&mut rng);
    /// assert!(g.is_valid(1e-12));
    /// assert!(g.translation().amax() <= 1.0);
    /// ```
    pub fn rand<R: Rng>(rng: &mut R) -> Self {
        // uniform unit quaternion from three uniform numbers
        let (u1, u2, u3) = (rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>());
        let (a, b) = ((1.0 - u1).sqrt(), u1.sqrt());
        let (s2, c2) = (TAU * u2).sin_cos();
        let (s3, c3) = (TAU * u3).sin_cos();
        let quaternion =
            UnitQuaternion::from_quaternion(na::Quaternion::new(b * c3, a * s2, a * c2, b * s3));
        let rotation = quaternion.to_rotation_matrix().into_inner();
        let translation = Vector3::<f64>::from_fn(|_, _| rng.gen_range(-1.0..1.0));
        Self::from_parts_unchecked(&rotation.cast::<T>(), &translation.cast::<T>())
    }
    /// Random transform `[exp(w) | v]` with `w` and `v` drawn from the standard normal
    /// distribution
    pub fn randn<R: Rng>(rng: &mut R) -> Self {
        let w = Vector3::<f64>::from_fn(|_, _| rng.sample(StandardNormal));
        let v = Vector3::<f64>::from_fn(|_, _| rng.sample(StandardNormal));
        Self::from_parts_unchecked(&so3::exp(&w.cast::<T>()), &v.cast::<T>())
    }
    #[inline]
    pub fn matrix(&self) -> &Matrix3x4<T> {
        &self.matrix
    }
    /// `[R t; 0 1]`
    pub fn to_homogeneous(&self) -> Matrix4<T> {
        let mut homogeneous = Matrix4::identity();
        homogeneous.fixed_view_mut::<3, 4>(0, 0).copy_from(&self.matrix);
        homogeneous
    }
    #[inline]
    pub fn rotation(&self) -> Matrix3<T> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }
    #[inline]
    pub fn translation(&self) -> Vector3<T> {
        self.matrix.column(3).into_owned()
    }
    /// Returns true if `RᵀR` is within `tolerance` of identity
    pub fn is_valid(&self, tolerance: T) -> bool {
        Self::try_from_matrix(self.matrix, tolerance).is_ok()
    }

    pub fn transform_point(&self, point: &Vector3<T>) -> Vector3<T> {
        self.matrix.fixed_view::<3, 3>(0, 0) * point + self.matrix.column(3)
    }
    pub fn transform_vector(&self, vector: &Vector3<T>) -> Vector3<T> {
        self.matrix.fixed_view::<3, 3>(0, 0) * vector
    }

    /// `self ∘ other`
    ///
    /// Jacobians: `Ad(other⁻¹)` with respect to `self` and identity with respect to `other`.
    pub fn compose(
        &self,
        other: &Self,
        jacobian_self: Option<&mut Matrix6<T>>,
        jacobian_other: Option<&mut Matrix6<T>>,
    ) -> Self {
        let rotation = self.rotation();
        let composed = Self::from_parts_unchecked(
            &(rotation * other.rotation()),
            &(rotation * other.translation() + self.translation()),
        );
        if let Some(jacobian) = jacobian_self {
            *jacobian = other.inverse(None).adjoint();
        }
        if let Some(jacobian) = jacobian_other {
            *jacobian = Matrix6::identity();
        }
        composed
    }

    /// `[Rᵀ | -Rᵀ t]`, with Jacobian `-Ad(self)`
    pub fn inverse(&self, jacobian: Option<&mut Matrix6<T>>) -> Self {
        let rotation = self.rotation().transpose();
        let translation = -(rotation * self.translation());
        if let Some(jacobian) = jacobian {
            *jacobian = -self.adjoint();
        }
        Self::from_parts_unchecked(&rotation, &translation)
    }

    /// Exponential map, with Jacobian `Jr(xi)`
    pub fn exp(xi: &TangentVector<T>, jacobian: Option<&mut Matrix6<T>>) -> Self {
        let v = xi.fixed_rows::<3>(0).into_owned();
        let w = xi.fixed_rows::<3>(3).into_owned();
        let rotation = so3::exp(&w);
        let translation = so3::left_jacobian(&w) * v;
        if let Some(jacobian) = jacobian {
            *jacobian = right_jacobian(xi);
        }
        Self::from_parts_unchecked(&rotation, &translation)
    }

    /// Logarithm map, with Jacobian `Jr⁻¹(log(self))`
    pub fn log(&self, jacobian: Option<&mut Matrix6<T>>) -> TangentVector<T> {
        let w = so3::log(&self.rotation());
        let v = so3::left_jacobian_inverse(&w) * self.translation();
        let xi = stack(&v, &w);
        if let Some(jacobian) = jacobian {
            *jacobian = right_jacobian_inverse(&xi);
        }
        xi
    }

    /// `log(self⁻¹ ∘ other)`, the tangent taking `self` to `other`
    ///
    /// Jacobians: `-Jl⁻¹(τ)` with respect to `self` and `Jr⁻¹(τ)` with respect to `other`.
    pub fn local(
        &self,
        other: &Self,
        jacobian_self: Option<&mut Matrix6<T>>,
        jacobian_other: Option<&mut Matrix6<T>>,
    ) -> TangentVector<T> {
        let tau = self.inverse(None).compose(other, None, None).log(None);
        if let Some(jacobian) = jacobian_self {
            *jacobian = -left_jacobian_inverse(&tau);
        }
        if let Some(jacobian) = jacobian_other {
            *jacobian = right_jacobian_inverse(&tau);
        }
        tau
    }

    /// `Ad(g) = [[R, t̂ R], [0, R]]`, `g exp(ξ) g⁻¹ = exp(Ad(g) ξ)`
    pub fn adjoint(&self) -> Matrix6<T> {
        let rotation = self.rotation();
        let mut adjoint = Matrix6::zeros();
        adjoint.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
        adjoint.fixed_view_mut::<3, 3>(3, 3).copy_from(&rotation);
        adjoint
            .fixed_view_mut::<3, 3>(0, 3)
            .copy_from(&(so3::hat(&self.translation()) * rotation));
        adjoint
    }

    /// Maps the Euclidean gradient of a scalar with respect to this 3x4 matrix into the
    /// spatial (left perturbation) tangent space
    ///
    /// `dL/dθ = ξ · spatial_gradient(G)` for `g(θ) = exp(θ ξ) g`.
    pub fn spatial_gradient(&self, gradient: &Matrix3x4<T>) -> TangentVector<T> {
        let grad_rotation = gradient.fixed_view::<3, 3>(0, 0);
        let grad_translation = gradient.column(3);
        let mut pulled = Matrix3x4::zeros();
        pulled.fixed_view_mut::<3, 3>(0, 0).copy_from(
            &(grad_rotation * self.rotation().transpose()
                + grad_translation * self.translation().transpose()),
        );
        pulled.set_column(3, &grad_translation);
        project(&pulled)
    }

    /// Same as `spatial_gradient` for right perturbations, `g(ε) = g exp(ε)`
    pub fn body_gradient(&self, gradient: &Matrix3x4<T>) -> TangentVector<T> {
        project(&(self.rotation().transpose() * gradient))
    }
}

impl<T: Real> Default for RigidTransform<T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T: Real> From<Isometry3<T>> for RigidTransform<T> {
    fn from(isometry: Isometry3<T>) -> Self {
        Self::from_isometry(&isometry)
    }
}

impl<T: Real> Display for RigidTransform<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let t = self.translation();
        let (roll, pitch, yaw) = self.to_isometry().rotation.euler_angles();
        write!(
            f,
            "xyz: [{:.4}, {:.4}, {:.4}], rpy: [{:.4}, {:.4}, {:.4}]",
            t[0], t[1], t[2], roll, pitch, yaw
        )
    }
}

fn stack<T: Real>(v: &Vector3<T>, w: &Vector3<T>) -> TangentVector<T> {
    TangentVector::new(v[0], v[1], v[2], w[0], w[1], w[2])
}

/// `[ŵ v; 0 0]`
pub fn hat<T: Real>(xi: &TangentVector<T>) -> Matrix4<T> {
    let mut m = Matrix4::zeros();
    let w_hat = so3::hat(&xi.fixed_rows::<3>(3).into_owned());
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(&w_hat);
    m.fixed_view_mut::<3, 1>(0, 3).copy_from(&xi.fixed_rows::<3>(0));
    m
}

/// Inverse of `hat`
pub fn vee<T: Real>(m: &Matrix4<T>) -> TangentVector<T> {
    let w = so3::vee(&m.fixed_view::<3, 3>(0, 0).into_owned());
    let v = m.fixed_view::<3, 1>(0, 3).into_owned();
    stack(&v, &w)
}

/// Pairs a 3x4 matrix with the se(3) basis, `project(m) · ξ = <m, hat(ξ)[..3, ..]>`
///
/// # Examples
///
/// ```
/// use kdiff::{se3, Matrix3x4, Vector6};
///
/// let m = Matrix3x4::from_fn(|r, c| (r * 4 + c) as f64);
/// assert_eq!(se3::project(&m), Vector6::new(3.0, 7.0, 11.0, 3.0, -6.0, 3.0));
/// ```
pub fn project<T: Real>(m: &Matrix3x4<T>) -> TangentVector<T> {
    TangentVector::new(
        m[(0, 3)],
        m[(1, 3)],
        m[(2, 3)],
        m[(2, 1)] - m[(1, 2)],
        m[(0, 2)] - m[(2, 0)],
        m[(1, 0)] - m[(0, 1)],
    )
}

/// Coupling block of the SE(3) left Jacobian
#[allow(clippy::many_single_char_names)]
fn q_matrix<T: Real>(v: &Vector3<T>, w: &Vector3<T>) -> Matrix3<T> {
    let theta = w.norm();
    let theta2 = theta * theta;
    let two: T = na::convert(2.0);
    let three: T = na::convert(3.0);
    // the closed forms cancel catastrophically well above ε^(1/4)
    let (c1, c2, c3) = if theta < T::default_epsilon().powf(na::convert(0.125)) {
        let taylor = |c0: f64, c2: f64, c4: f64| -> T {
            let (c0, c2, c4): (T, T, T) = (na::convert(c0), na::convert(c2), na::convert(c4));
            c0 - theta2 * c2 + theta2 * theta2 * c4
        };
        (
            taylor(1.0 / 6.0, 1.0 / 120.0, 1.0 / 5040.0),
            taylor(1.0 / 24.0, 1.0 / 720.0, 1.0 / 40320.0),
            taylor(1.0 / 120.0, 1.0 / 2520.0, 1.0 / 120960.0),
        )
    } else {
        let (sin, cos) = theta.sin_cos();
        let theta3 = theta2 * theta;
        let half_sin = (theta / two).sin();
        (
            (theta - sin) / theta3,
            (theta2 - two * two * half_sin * half_sin) / (two * theta2 * theta2),
            (two * theta - three * sin + theta * cos) / (two * theta3 * theta2),
        )
    };
    let v_hat = so3::hat(v);
    let w_hat = so3::hat(w);
    let wv = w_hat * v_hat;
    let vw = v_hat * w_hat;
    let wvw = wv * w_hat;
    let ww = w_hat * w_hat;
    v_hat / two
        + (wv + vw + wvw) * c1
        + (ww * v_hat + vw * w_hat - wvw * three) * c2
        + (wvw * w_hat + ww * vw) * c3
}

fn upper_triangular<T: Real>(diagonal: &Matrix3<T>, coupling: &Matrix3<T>) -> Matrix6<T> {
    let mut m = Matrix6::zeros();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(diagonal);
    m.fixed_view_mut::<3, 3>(3, 3).copy_from(diagonal);
    m.fixed_view_mut::<3, 3>(0, 3).copy_from(coupling);
    m
}

/// `exp(ξ + δ) ≈ exp(Jl(ξ) δ) exp(ξ)`
pub fn left_jacobian<T: Real>(xi: &TangentVector<T>) -> Matrix6<T> {
    let v = xi.fixed_rows::<3>(0).into_owned();
    let w = xi.fixed_rows::<3>(3).into_owned();
    upper_triangular(&so3::left_jacobian(&w), &q_matrix(&v, &w))
}

/// `exp(ξ + δ) ≈ exp(ξ) exp(Jr(ξ) δ)`
pub fn right_jacobian<T: Real>(xi: &TangentVector<T>) -> Matrix6<T> {
    left_jacobian(&-xi)
}

pub fn left_jacobian_inverse<T: Real>(xi: &TangentVector<T>) -> Matrix6<T> {
    let v = xi.fixed_rows::<3>(0).into_owned();
    let w = xi.fixed_rows::<3>(3).into_owned();
    let inverse = so3::left_jacobian_inverse(&w);
    upper_triangular(&inverse, &-(inverse * q_matrix(&v, &w) * inverse))
}

pub fn right_jacobian_inverse<T: Real>(xi: &TangentVector<T>) -> Matrix6<T> {
    left_jacobian_inverse(&-xi)
}
