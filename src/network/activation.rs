use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Activation {
    #[default]
    ReLU,
    /// ReLU clipped to `[0, 1]`.
    CReLU,
    /// Squared ReLU.
    SReLU,
    /// Squared clipped ReLU.
    SCReLU,
}

impl Activation {
    pub fn activate(self, x: f32) -> f32 {
        match self {
            Self::ReLU => x.max(0.0),
            Self::CReLU => x.clamp(0.0, 1.0),
            Self::SReLU => {
                let relu = x.max(0.0);
                relu * relu
            }
            Self::SCReLU => {
                let clamped = x.clamp(0.0, 1.0);
                clamped * clamped
            }
        }
    }

    pub fn prime(self, x: f32) -> f32 {
        match self {
            Self::ReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::CReLU => {
                if x > 0.0 && x < 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::SReLU => {
                if x > 0.0 {
                    2.0 * x
                } else {
                    0.0
                }
            }
            Self::SCReLU => {
                if x > 0.0 && x < 1.0 {
                    2.0 * x
                } else {
                    0.0
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ReLU => "relu",
            Self::CReLU => "crelu",
            Self::SReLU => "srelu",
            Self::SCReLU => "screlu",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Activation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relu" => Ok(Self::ReLU),
            "crelu" => Ok(Self::CReLU),
            "srelu" => Ok(Self::SReLU),
            "screlu" => Ok(Self::SCReLU),
            _ => Err(format!("unknown activation '{s}', expected one of relu, crelu, srelu, screlu")),
        }
    }
}
