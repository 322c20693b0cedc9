use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

/// One scalar sample of the volume grid.
///
/// Holds the normalized intensity in `<0;1>`. Comparisons are used by the
/// extremum-tracking compositing methods, arithmetic by gradient estimation.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct Voxel(f32);

impl Voxel {
    pub fn new(value: f32) -> Voxel {
        Voxel(value)
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Add for Voxel {
    type Output = Voxel;

    fn add(self, other: Voxel) -> Voxel {
        Voxel(self.0 + other.0)
    }
}

impl Sub for Voxel {
    type Output = Voxel;

    fn sub(self, other: Voxel) -> Voxel {
        Voxel(self.0 - other.0)
    }
}

impl Mul<f32> for Voxel {
    type Output = Voxel;

    fn mul(self, factor: f32) -> Voxel {
        Voxel(self.0 * factor)
    }
}

impl Div<f32> for Voxel {
    type Output = Voxel;

    fn div(self, divisor: f32) -> Voxel {
        Voxel(self.0 / divisor)
    }
}

impl AddAssign for Voxel {
    fn add_assign(&mut self, other: Voxel) {
        self.0 += other.0;
    }
}

impl SubAssign for Voxel {
    fn sub_assign(&mut self, other: Voxel) {
        self.0 -= other.0;
    }
}

impl MulAssign<f32> for Voxel {
    fn mul_assign(&mut self, factor: f32) {
        self.0 *= factor;
    }
}

impl DivAssign<f32> for Voxel {
    fn div_assign(&mut self, divisor: f32) {
        self.0 /= divisor;
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn arithmetic() {
        let a = Voxel::new(0.5);
        let b = Voxel::new(0.25);

        assert_eq!((a + b).value(), 0.75);
        assert_eq!((a - b).value(), 0.25);
        assert_eq!((a * 2.0).value(), 1.0);
        assert_eq!((a / 2.0).value(), 0.25);

        let mut c = a;
        c += b;
        c -= b;
        assert_eq!(c, a);
        c *= 4.0;
        c /= 4.0;
        assert_eq!(c, a);
    }

    #[test]
    fn ordering() {
        assert!(Voxel::new(0.8) > Voxel::new(0.3));
        assert!(Voxel::new(0.1) <= Voxel::new(0.1));
        assert_ne!(Voxel::new(0.2), Voxel::new(0.3));
    }
}
