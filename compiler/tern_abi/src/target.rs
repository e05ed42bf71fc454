//! Target descriptor.
//!
//! Chosen once per compilation run. Carries everything classification and
//! layout depend on: architecture family, operating system, forced ABI, and
//! the size parameters derived from the architecture.
//!
//! A target is named by a triple, `arch-vendor-os` with an optional
//! fourth environment component (`x86_64-pc-windows-msvc`,
//! `wasm32-unknown-unknown`).

use std::fmt;

use tern_types::TargetLayout;

/// Error type for target configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target triple '{triple}': {reason}")]
    InvalidTripleFormat { triple: String, reason: String },

    #[error("unsupported architecture '{arch}'")]
    UnsupportedArch { arch: String },

    #[error("unsupported operating system '{os}'")]
    UnsupportedOs { os: String },

    #[error("maximum alignment must be a positive power of two, found {align}")]
    InvalidMaxAlign { align: i64 },
}

/// A target triple split on `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTripleComponents {
    pub arch: String,
    pub vendor: String,
    pub os: String,
    /// `gnu`, `msvc`, `musl` and so on; absent from three-part triples.
    pub env: Option<String>,
}

impl TargetTripleComponents {
    /// Split `triple` into its components. Components after the fourth
    /// stay part of the environment.
    pub fn parse(triple: &str) -> Result<Self, TargetError> {
        let malformed = |reason: &str| TargetError::InvalidTripleFormat {
            triple: triple.to_owned(),
            reason: reason.to_owned(),
        };
        let mut parts = triple.splitn(4, '-');
        let mut component = |what: &str| match parts.next() {
            Some(part) if !part.is_empty() => Ok(part.to_owned()),
            _ => Err(malformed(&format!("missing {what}"))),
        };
        let arch = component("architecture")?;
        let vendor = component("vendor")?;
        let os = component("operating system")?;
        let env = match parts.next() {
            Some("") => return Err(malformed("empty environment")),
            env => env.map(str::to_owned),
        };
        Ok(Self {
            arch,
            vendor,
            os,
            env,
        })
    }
}

impl fmt::Display for TargetTripleComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.arch, self.vendor, self.os)?;
        if let Some(env) = &self.env {
            write!(f, "-{env}")?;
        }
        Ok(())
    }
}

/// Architecture family; selects the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetArch {
    Amd64,
    I386,
    Arm64,
    Arm32,
    Wasm32,
    /// 64-bit words with 32-bit pointers.
    Wasm64p32,
}

impl TargetArch {
    fn parse(arch: &str) -> Option<Self> {
        match arch {
            "x86_64" | "amd64" => Some(TargetArch::Amd64),
            "i386" | "i486" | "i586" | "i686" | "x86" => Some(TargetArch::I386),
            "aarch64" | "arm64" => Some(TargetArch::Arm64),
            "wasm32" => Some(TargetArch::Wasm32),
            "wasm64" | "wasm64p32" => Some(TargetArch::Wasm64p32),
            _ if arch.starts_with("arm") || arch.starts_with("thumb") => Some(TargetArch::Arm32),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TargetArch::Amd64 => "amd64",
            TargetArch::I386 => "i386",
            TargetArch::Arm64 => "arm64",
            TargetArch::Arm32 => "arm32",
            TargetArch::Wasm32 => "wasm32",
            TargetArch::Wasm64p32 => "wasm64p32",
        }
    }

    /// `(word_size, ptr_size, max_align, max_simd_align)`.
    const fn metrics(self) -> (i64, i64, i64, i64) {
        match self {
            TargetArch::Amd64 => (8, 8, 16, 32),
            TargetArch::Arm64 => (8, 8, 16, 16),
            TargetArch::I386 | TargetArch::Arm32 | TargetArch::Wasm32 => (4, 4, 8, 16),
            TargetArch::Wasm64p32 => (8, 4, 8, 16),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetOs {
    Linux,
    Darwin,
    Windows,
    FreeBsd,
    OpenBsd,
    Wasi,
    /// No operating system (`unknown`, `none`).
    Freestanding,
}

impl TargetOs {
    fn parse(os: &str) -> Option<Self> {
        match os {
            "linux" => Some(TargetOs::Linux),
            "darwin" | "macos" | "ios" => Some(TargetOs::Darwin),
            "windows" => Some(TargetOs::Windows),
            "freebsd" => Some(TargetOs::FreeBsd),
            "openbsd" => Some(TargetOs::OpenBsd),
            "wasi" => Some(TargetOs::Wasi),
            "unknown" | "none" => Some(TargetOs::Freestanding),
            _ => None,
        }
    }
}

/// Forces the amd64 classifier regardless of the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetAbi {
    #[default]
    Default,
    Win64,
    SysV,
}

/// Architecture parameters for one compilation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    pub arch: TargetArch,
    pub os: TargetOs,
    pub abi: TargetAbi,
    /// Native integer width in bytes.
    pub word_size: i64,
    pub ptr_size: i64,
    /// Upper bound on scalar and aggregate alignment.
    pub max_align: i64,
    /// Upper bound on vector alignment.
    pub max_simd_align: i64,
}

impl Target {
    /// Target with the default metrics of `arch`.
    pub const fn new(arch: TargetArch, os: TargetOs) -> Self {
        let (word_size, ptr_size, max_align, max_simd_align) = arch.metrics();
        Self {
            arch,
            os,
            abi: TargetAbi::Default,
            word_size,
            ptr_size,
            max_align,
            max_simd_align,
        }
    }

    /// Create a target from a triple string.
    ///
    /// # Errors
    ///
    /// Returns an error if the triple is malformed or names an architecture
    /// or operating system without a classifier.
    pub fn from_triple(triple: &str) -> Result<Self, TargetError> {
        let components = TargetTripleComponents::parse(triple)?;
        let arch = TargetArch::parse(&components.arch).ok_or_else(|| {
            TargetError::UnsupportedArch {
                arch: components.arch.clone(),
            }
        })?;
        let os = TargetOs::parse(&components.os).ok_or_else(|| TargetError::UnsupportedOs {
            os: components.os.clone(),
        })?;
        tracing::debug!(%components, arch = arch.as_str(), ?os, "parsed target triple");
        Ok(Self::new(arch, os))
    }

    /// Force an amd64 ABI (builder pattern).
    #[must_use]
    pub fn with_abi(mut self, abi: TargetAbi) -> Self {
        self.abi = abi;
        self
    }

    /// Override the maximum alignment (builder pattern).
    ///
    /// # Errors
    ///
    /// Returns an error unless `align` is a positive power of two.
    pub fn with_max_align(mut self, align: i64) -> Result<Self, TargetError> {
        if align <= 0 || align.count_ones() != 1 {
            return Err(TargetError::InvalidMaxAlign { align });
        }
        self.max_align = align;
        Ok(self)
    }

    /// The parameters the layout engine needs.
    pub const fn layout(&self) -> TargetLayout {
        TargetLayout::new(self.word_size, self.max_align)
    }

    /// Whether amd64 code follows the Windows x64 convention.
    pub fn is_win64(&self) -> bool {
        self.arch == TargetArch::Amd64
            && (self.os == TargetOs::Windows || self.abi == TargetAbi::Win64)
    }
}
