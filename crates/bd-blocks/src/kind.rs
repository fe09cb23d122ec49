//! Stable one-byte kind tags used by the assembly stream.

use std::fmt;

macro_rules! block_kinds {
    ($($name:ident = $tag:literal,)+) => {
        /// Block kind tag.  Numbering is fixed by the stream format and runs
        /// without gaps from 1.
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[repr(u8)]
        pub enum BlockKind {
            $($name = $tag,)+
        }

        impl BlockKind {
            pub const ALL: &'static [BlockKind] = &[$(BlockKind::$name,)+];

            #[inline]
            pub fn tag(self) -> u8 {
                self as u8
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(BlockKind::$name => stringify!($name),)+
                }
            }

            pub fn from_tag(tag: u8) -> Option<BlockKind> {
                match tag {
                    $($tag => Some(BlockKind::$name),)+
                    _ => None,
                }
            }
        }
    };
}

block_kinds! {
    DelayOn                 = 1,
    DelayOff                = 2,
    DelayOnOff              = 3,
    Integrator              = 4,
    Inertial                = 5,
    InertialDifferential    = 6,
    Oscillatory             = 7,
    StepDelay               = 8,
    PiecewiseLinear         = 9,
    Or                      = 10,
    And                     = 11,
    Xor                     = 12,
    Not                     = 13,
    Equal                   = 14,
    NotEqual                = 15,
    Less                    = 16,
    Greater                 = 17,
    LessOrEqual             = 18,
    GreaterOrEqual          = 19,
    Saturation              = 20,
    Deadband                = 21,
    SaturationDeadband      = 22,
    Hysteresis              = 23,
    HysteresisDeadband      = 24,
    LowThreshold            = 25,
    HighThreshold           = 26,
    VariableHysteresis      = 27,
    VariableHysteresisPlus  = 28,
    VariableHysteresisMinus = 29,
    Summator                = 30,
    Multiplier              = 31,
    Divider                 = 32,
    AbsoluteValue           = 33,
    Negate                  = 34,
    Sign                    = 35,
    RisingPulse             = 36,
    FallingPulse            = 37,
    ChangePulse             = 38,
    Pulse                   = 39,
    ShortPulse              = 40,
    LongPulse               = 41,
    DebounceOn              = 42,
    DebounceOff             = 43,
    DebounceOnOff           = 44,
    ExtInSignal             = 45,
    ExtOutSignal            = 46,
    IntInSignal             = 47,
    IntOutSignal            = 48,
    Plot                    = 49,
    Constant                = 50,
    Step                    = 51,
    LinearSource            = 52,
    SinusSource             = 53,
    ToggleSwitch            = 54,
    RsTrigger               = 55,
    SrTrigger               = 56,
    TTrigger                = 57,
    RtsTrigger              = 58,
    StrTrigger              = 59,
}

impl TryFrom<u8> for BlockKind {
    type Error = u8;
    fn try_from(tag: u8) -> Result<BlockKind, u8> {
        BlockKind::from_tag(tag).ok_or(tag)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
