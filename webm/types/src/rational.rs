/*!
    Rational number type for timebases.
*/

/**
    A rational number.

    Used for encoder timebases, where one presentation tick lasts
    `num / den` seconds.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    /// Numerator.
    pub num: i32,
    /// Denominator.
    pub den: i32,
}

impl Rational {
    /**
        Create a new rational number.
    */
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /**
        Convert to a floating point value.
    */
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }
}
