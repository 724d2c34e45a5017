/// Facing direction suffix carried by multidirectional clip names (`walk=n`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Deserialize)]
pub enum Direction {
    #[serde(rename = "e", alias = "east")]
    East,
    #[serde(rename = "n", alias = "north")]
    North,
    #[serde(rename = "s", alias = "south")]
    South,
    #[serde(rename = "w", alias = "west")]
    West,
}

impl Direction {
    /// All directions in lexical order of their tags (`e`, `n`, `s`, `w`).
    /// This is the last-resort fallback order for missing directional clips.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::North,
        Direction::South,
        Direction::West,
    ];

    /// Single-letter tag as written in clip names.
    pub fn tag(self) -> &'static str {
        match self {
            Self::East => "e",
            Self::North => "n",
            Self::South => "s",
            Self::West => "w",
        }
    }

    /// Parse a direction tag. Accepts the single-letter form and the full word,
    /// case-insensitively.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "e" | "east" => Some(Self::East),
            "n" | "north" => Some(Self::North),
            "s" | "south" => Some(Self::South),
            "w" | "west" => Some(Self::West),
            _ => None,
        }
    }

    /// Index into [`Direction::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::East => 0,
            Self::North => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Facing derived from a movement vector in screen space (y grows downward).
    /// The dominant axis wins; horizontal wins ties. Returns `None` for zero.
    pub fn from_vector(v: glam::IVec2) -> Option<Self> {
        if v == glam::IVec2::ZERO {
            return None;
        }
        if v.x.abs() >= v.y.abs() {
            Some(if v.x > 0 { Self::East } else { Self::West })
        } else {
            Some(if v.y > 0 { Self::South } else { Self::North })
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Split a clip property name into base name and optional direction.
///
/// `"walk=n"` becomes `("walk", Some(North))`. A suffix that is not a known
/// direction is kept as part of the name so the clip is still addressable.
pub fn split_directional_name(raw: &str) -> (&str, Option<Direction>) {
    if let Some((base, suffix)) = raw.rsplit_once('=') {
        if let Some(dir) = Direction::parse(suffix) {
            return (base, Some(dir));
        }
        log::warn!("Clip name '{}' has unknown direction suffix '{}'", raw, suffix);
    }
    (raw, None)
}
