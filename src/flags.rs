use std::path::PathBuf;
use std::str::FromStr;

use crate::cpu::Mode;

xflags::xflags! {
    /// MIPS-lite instruction set simulator.
    cmd SimArgs {
        /// Path to the hex-text memory image.
        required memory_image: PathBuf

        /// Path the final-state report is written to.
        required output_file: PathBuf

        /// Logging level: RELEASE, DEBUG or INFO.
        /// DEBUG additionally single-steps, waiting for Enter between cycles.
        required debug_level: DebugLevelArg

        /// Simulation mode: FUNC, NO-FWD or FWD.
        required mode: ModeArg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugLevelArg {
    Release,
    Debug,
    Info,
}

impl FromStr for DebugLevelArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "release" => Ok(DebugLevelArg::Release),
            "debug" => Ok(DebugLevelArg::Debug),
            "info" => Ok(DebugLevelArg::Info),
            _ => Err(format!(
                "Invalid debug level: '{}'. Expected 'RELEASE', 'DEBUG' or 'INFO'.",
                s
            )),
        }
    }
}

impl DebugLevelArg {
    pub fn tracing_level(self) -> tracing::Level {
        match self {
            DebugLevelArg::Release => tracing::Level::ERROR,
            DebugLevelArg::Debug => tracing::Level::DEBUG,
            DebugLevelArg::Info => tracing::Level::INFO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Func,
    NoFwd,
    Fwd,
}

impl FromStr for ModeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "func" => Ok(ModeArg::Func),
            "no-fwd" => Ok(ModeArg::NoFwd),
            "fwd" => Ok(ModeArg::Fwd),
            _ => Err(format!(
                "Invalid mode: '{}'. Expected 'FUNC', 'NO-FWD' or 'FWD'.",
                s
            )),
        }
    }
}

impl From<ModeArg> for Mode {
    fn from(val: ModeArg) -> Self {
        match val {
            ModeArg::Func => Mode::Functional,
            ModeArg::NoFwd => Mode::NoForwarding,
            ModeArg::Fwd => Mode::Forwarding,
        }
    }
}
