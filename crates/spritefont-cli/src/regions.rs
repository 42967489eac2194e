use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Inclusive range of codepoints to include in the font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRegion {
    pub start: u32,
    pub end: u32,
}

/// Printable ASCII, used when no region is given.
pub const DEFAULT_REGION: CharacterRegion = CharacterRegion {
    start: ' ' as u32,
    end: '~' as u32,
};

impl CharacterRegion {
    pub fn new(start: u32, end: u32) -> anyhow::Result<Self> {
        if start > end {
            bail!("character region start 0x{start:X} is after end 0x{end:X}");
        }
        Ok(Self { start, end })
    }

    pub fn characters(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Flattens regions into a list of codepoints, dropping duplicates but
/// keeping first-seen order. An empty list yields the default region.
pub fn flatten(regions: &[CharacterRegion]) -> Vec<u32> {
    if regions.is_empty() {
        return DEFAULT_REGION.characters().collect();
    }
    let mut seen = HashSet::new();
    regions
        .iter()
        .flat_map(CharacterRegion::characters)
        .filter(|c| seen.insert(*c))
        .collect()
}

/// Parses one codepoint: a single character is taken literally, anything
/// longer must be a decimal or `0x` hex integer.
pub fn parse_character(s: &str) -> anyhow::Result<u32> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(c as u32);
    }
    let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse::<u32>()
    };
    value.with_context(|| format!("invalid character '{s}'"))
}

impl FromStr for CharacterRegion {
    type Err = anyhow::Error;

    /// Accepts `A`, `A-Z`, `32-127` and `0x20-0x7F`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            bail!("empty character region");
        }
        if s.chars().count() == 1 {
            let c = parse_character(s)?;
            return Self::new(c, c);
        }
        let parts: Vec<&str> = s.split('-').collect();
        match parts.as_slice() {
            [single] => {
                let c = parse_character(single)?;
                Self::new(c, c)
            }
            [start, end] => Self::new(parse_character(start)?, parse_character(end)?),
            _ => bail!("invalid character region '{s}'"),
        }
    }
}

impl fmt::Display for CharacterRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}-0x{:X}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forms() {
        let r: CharacterRegion = "A".parse().unwrap();
        assert_eq!((r.start, r.end), (65, 65));
        let r: CharacterRegion = "a-z".parse().unwrap();
        assert_eq!((r.start, r.end), (97, 122));
        let r: CharacterRegion = "32-127".parse().unwrap();
        assert_eq!((r.start, r.end), (32, 127));
        let r: CharacterRegion = "0x20-0x7F".parse().unwrap();
        assert_eq!((r.start, r.end), (0x20, 0x7F));
        let r: CharacterRegion = "-".parse().unwrap();
        assert_eq!((r.start, r.end), (45, 45));
        assert!("z-a".parse::<CharacterRegion>().is_err());
        assert!("1-2-3".parse::<CharacterRegion>().is_err());
        assert!("0xZZ".parse::<CharacterRegion>().is_err());
    }

    #[test]
    fn flatten_dedupes_in_order() {
        let regions = [
            CharacterRegion::new(3, 5).unwrap(),
            CharacterRegion::new(1, 4).unwrap(),
        ];
        assert_eq!(flatten(&regions), vec![3, 4, 5, 1, 2]);
        assert_eq!(flatten(&[]).len(), 95);
    }
}
