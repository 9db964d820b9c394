extern crate nalgebra as na;

/// Values of `(y, y')` at `x = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialCondition {
    pub y0: f64,
    pub z0: f64,
}

/// A point of the integration: the independent variable `x` and the
/// first-order pair `u = (y, z)` with `z = y'`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub x: f64,
    pub u: na::Vector2<f64>,
}

impl InitialCondition {
    pub fn new(y0: f64, z0: f64) -> Self {
        InitialCondition { y0, z0 }
    }

    pub fn to_state(&self) -> State {
        State::new(0.0, self.y0, self.z0)
    }
}

impl State {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        State {
            x,
            u: na::Vector2::new(y, z),
        }
    }

    pub fn y(&self) -> f64 {
        self.u[0]
    }

    pub fn z(&self) -> f64 {
        self.u[1]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.u.iter().all(|v| v.is_finite())
    }
}
