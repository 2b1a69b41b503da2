use crate::Real;

/// One reading of a digitised trace.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub time: Real,
    pub voltage: Real,
}

impl Sample {
    pub fn new(time: Real, voltage: Real) -> Self {
        Self { time, voltage }
    }
}

/// Direction of a logic-level transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum Edge {
    #[strum(to_string = "rising")]
    Rising,
    #[strum(to_string = "falling")]
    Falling,
}
