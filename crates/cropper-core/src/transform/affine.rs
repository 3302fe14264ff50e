//! 2D affine matrices with canvas-style composition.
//!
//! The matrix maps user space to device space:
//!
//! ```text
//! | a c e |   | x |
//! | b d f | * | y |
//! | 0 0 1 |   | 1 |
//! ```
//!
//! `translate`, `scale` and `rotate` post-multiply the current matrix, so the
//! operation called last is applied to points first. This is the same
//! convention a 2D canvas context uses.

/// A 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translation(tx: f64, ty: f64) -> Self {
        Affine {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Affine {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `radians`; positive angles turn clockwise when y points down.
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Returns `self * other`: `other` is applied to points before `self`.
    pub fn concat(&self, other: &Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn translate(&self, tx: f64, ty: f64) -> Affine {
        self.concat(&Affine::translation(tx, ty))
    }

    pub fn scale(&self, sx: f64, sy: f64) -> Affine {
        self.concat(&Affine::scaling(sx, sy))
    }

    pub fn rotate(&self, radians: f64) -> Affine {
        self.concat(&Affine::rotation(radians))
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform, or `None` when the matrix collapses the plane
    /// (e.g. a zero scale).
    pub fn invert(&self) -> Option<Affine> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        Some(Affine {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }

    /// Map a point from user space to device space.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}
