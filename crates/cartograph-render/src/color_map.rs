use crate::palette::BlockState;
use cartograph_common::{CartographError, Result};
use cartograph_logger::{log, LogSeverity};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const DEFAULT_COLORS: &str = include_str!("../resources/block-colors.txt");

pub const SUB_COLOR_COUNT: usize = 16;

/// Which biome channel, if any, tints a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Influence {
    #[default]
    None,
    Grass,
    Foliage,
    Water,
}

impl Influence {
    pub fn parse(keyword: &str) -> Option<Influence> {
        match keyword {
            "biome_grass" => Some(Influence::Grass),
            "biome_foliage" => Some(Influence::Foliage),
            "biome_water" => Some(Influence::Water),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorEntry {
    pub color: u32,
    pub influence: Influence,
}

/// Colors for a numeric block id, with optional per-datum overrides.
#[derive(Debug, Clone, Default)]
pub struct LegacyColors {
    pub base: Option<ColorEntry>,
    pub sub: [Option<ColorEntry>; SUB_COLOR_COUNT],
}

/// Colors for a namespaced block, with optional block-state overrides.
#[derive(Debug, Clone, Default)]
pub struct NamedColors {
    pub base: Option<ColorEntry>,
    pub overrides: Vec<(BTreeMap<String, String>, ColorEntry)>,
}

impl NamedColors {
    /// First override, in file order, whose every property is present on
    /// `state` with the same value.
    pub fn select(&self, state: &BlockState) -> Option<&ColorEntry> {
        self.overrides
            .iter()
            .find(|(props, _)| {
                props
                    .iter()
                    .all(|(k, v)| state.properties.get(k) == Some(v))
            })
            .map(|(_, entry)| entry)
    }
}

/// Block color table loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct ColorTable {
    default: ColorEntry,
    legacy: HashMap<u16, LegacyColors>,
    named: HashMap<String, NamedColors>,
}

/// Accepts decimal or `0x`-prefixed hex.
pub fn parse_int(token: &str) -> Option<i64> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };
    Some(if negative { -value } else { value })
}

/// Adds the default namespace to bare block names.
pub fn qualify(name: &str) -> String {
    if name.contains(':') {
        name.to_owned()
    } else {
        format!("minecraft:{}", name)
    }
}

#[derive(Debug)]
enum Key {
    Default,
    Legacy { id: u16, datum: Option<u8> },
    Named {
        name: String,
        properties: BTreeMap<String, String>,
    },
}

fn parse_key(token: &str) -> Option<Key> {
    if token.eq_ignore_ascii_case("default") {
        return Some(Key::Default);
    }
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        let (id, datum) = match token.split_once(':') {
            Some((id, datum)) => (id, Some(datum)),
            None => (token, None),
        };
        let id = u16::try_from(parse_int(id)?).ok().filter(|&id| id < 0x1000)?;
        let datum = match datum {
            Some(d) => Some(u8::try_from(parse_int(d)?).ok().filter(|&d| (d as usize) < SUB_COLOR_COUNT)?),
            None => None,
        };
        return Some(Key::Legacy { id, datum });
    }

    let (name, properties) = match token.split_once('[') {
        None => (token, BTreeMap::new()),
        Some((name, rest)) => {
            let body = rest.strip_suffix(']')?;
            let mut properties = BTreeMap::new();
            for pair in body.split(',').filter(|p| !p.is_empty()) {
                let (k, v) = pair.split_once('=')?;
                properties.insert(k.trim().to_owned(), v.trim().to_owned());
            }
            (name, properties)
        }
    };
    if name.is_empty() {
        return None;
    }
    Some(Key::Named {
        name: qualify(name),
        properties,
    })
}

impl ColorTable {
    pub fn new(default_color: u32) -> Self {
        ColorTable {
            default: ColorEntry {
                color: default_color,
                influence: Influence::None,
            },
            legacy: HashMap::new(),
            named: HashMap::new(),
        }
    }

    pub fn default_entry(&self) -> &ColorEntry {
        &self.default
    }

    pub fn legacy(&self, id: u16) -> Option<&LegacyColors> {
        self.legacy.get(&id)
    }

    pub fn named(&self, name: &str) -> Option<&NamedColors> {
        self.named.get(name)
    }

    pub fn set_legacy(&mut self, id: u16, datum: Option<u8>, entry: ColorEntry) {
        let colors = self.legacy.entry(id).or_default();
        match datum {
            Some(d) => colors.sub[d as usize] = Some(entry),
            None => colors.base = Some(entry),
        }
    }

    pub fn set_named(&mut self, name: &str, properties: BTreeMap<String, String>, entry: ColorEntry) {
        let colors = self.named.entry(qualify(name)).or_default();
        if properties.is_empty() {
            colors.base = Some(entry);
        } else {
            colors.overrides.push((properties, entry));
        }
    }

    /// Parses `key color [influence]` lines. Keys are `default`, a numeric
    /// `id[:datum]`, or a block name with an optional `[k=v,...]` selector.
    pub fn parse(text: &str, source: &str) -> Result<Self> {
        let mut table = ColorTable::new(0);
        let mut has_default = false;

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let parsed = match tokens.as_slice() {
                [key, color] => parse_key(key).zip(parse_int(color)).map(|(k, c)| (k, c, Influence::None)),
                [key, color, influence] => match (parse_key(key), parse_int(color), Influence::parse(influence)) {
                    (Some(k), Some(c), Some(i)) => Some((k, c, i)),
                    _ => None,
                },
                _ => None,
            };
            let Some((key, color, influence)) = parsed else {
                log(
                    format!("Invalid color map line at {}:{}: {}", source, line_no + 1, line),
                    LogSeverity::Warning,
                );
                continue;
            };

            let entry = ColorEntry {
                color: color as u32,
                influence,
            };
            match key {
                Key::Default => {
                    table.default = entry;
                    has_default = true;
                }
                Key::Legacy { id, datum } => table.set_legacy(id, datum, entry),
                Key::Named { name, properties } => table.set_named(&name, properties, entry),
            }
        }

        if !has_default {
            return Err(CartographError::MissingDefault(source.to_owned()));
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        ColorTable::parse(&text, &path.display().to_string())
    }

    pub fn load_default() -> Result<Self> {
        ColorTable::parse(DEFAULT_COLORS, "(default block colors)")
    }
}
