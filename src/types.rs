//! Shared plain types: shapes, keys, handles, colors, and configuration.
//!
//! Everything here is pure data with no I/O dependencies.

use std::fmt;

/// Default well dimensions (columns x rows).
pub const DEFAULT_COLUMNS: u8 = 10;
pub const DEFAULT_ROWS: u8 = 20;

/// Default timing (milliseconds).
pub const DEFAULT_FALL_MS: u32 = 500;
pub const DEFAULT_FAST_FALL_MS: u32 = 50;
pub const DEFAULT_MOVE_REPEAT_MS: u32 = 100;

/// The seven tetromino shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    I,
    O,
    S,
    Z,
    J,
    L,
    T,
}

impl ShapeKind {
    /// All shapes, in catalog order. Index order matters for the uniform draw.
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::J,
        ShapeKind::L,
        ShapeKind::T,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::I => "I",
            ShapeKind::O => "O",
            ShapeKind::S => "S",
            ShapeKind::Z => "Z",
            ShapeKind::J => "J",
            ShapeKind::L => "L",
            ShapeKind::T => "T",
        }
    }
}

/// 24-bit RGB color, passed through to the render collaborator untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Opaque identifier for one displayed cell, minted by a [`crate::io::RenderSink`].
///
/// A newtype so handles cannot be confused with coordinates or used in
/// arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellHandle(u32);

impl CellHandle {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Opaque identifier for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Payload delivered back to the session when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Gravity step. Carries the piece generation it was armed for so a stale
    /// timer firing after a lock is a no-op.
    Fall { generation: u32 },
    /// Held-key horizontal repeat tick.
    MoveRepeat,
}

/// Discrete input actions the session consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKey {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
}

/// Session construction parameters. Fixed once the session exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub columns: u8,
    pub rows: u8,
    pub fall_interval_ms: u32,
    pub fast_fall_interval_ms: u32,
    pub move_repeat_interval_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            fall_interval_ms: DEFAULT_FALL_MS,
            fast_fall_interval_ms: DEFAULT_FAST_FALL_MS,
            move_repeat_interval_ms: DEFAULT_MOVE_REPEAT_MS,
        }
    }
}

impl GameConfig {
    /// Smallest well extent that fits every base shape. The spawn column
    /// formula `columns / 2 - 2` also requires at least 4 columns.
    pub const MIN_WELL_EXTENT: u8 = 4;

    /// Largest well extent. Cell coordinates travel as `i8`, so dimensions
    /// past `i8::MAX` would wrap negative in bounds arithmetic.
    pub const MAX_WELL_EXTENT: u8 = i8::MAX as u8;

    /// Validate before any gameplay state exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < Self::MIN_WELL_EXTENT || self.rows < Self::MIN_WELL_EXTENT {
            return Err(ConfigError::WellTooSmall {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if self.columns > Self::MAX_WELL_EXTENT || self.rows > Self::MAX_WELL_EXTENT {
            return Err(ConfigError::WellTooLarge {
                columns: self.columns,
                rows: self.rows,
            });
        }
        for (name, value) in [
            ("fall_interval_ms", self.fall_interval_ms),
            ("fast_fall_interval_ms", self.fast_fall_interval_ms),
            ("move_repeat_interval_ms", self.move_repeat_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { name });
            }
        }
        Ok(())
    }

    /// Spawn anchor column for a new piece.
    pub fn start_column(&self) -> i8 {
        self.columns as i8 / 2 - 2
    }
}

/// Rejected configuration, reported at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    WellTooSmall { columns: u8, rows: u8 },
    WellTooLarge { columns: u8, rows: u8 },
    ZeroInterval { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::WellTooSmall { columns, rows } => write!(
                f,
                "well must be at least {0}x{0} cells, got {1}x{2}",
                GameConfig::MIN_WELL_EXTENT,
                columns,
                rows
            ),
            ConfigError::WellTooLarge { columns, rows } => write!(
                f,
                "well must be at most {0}x{0} cells, got {1}x{2}",
                GameConfig::MAX_WELL_EXTENT,
                columns,
                rows
            ),
            ConfigError::ZeroInterval { name } => {
                write!(f, "{name} must be a positive number of milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
