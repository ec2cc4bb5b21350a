use crate::color_map::{parse_int, Influence};
use cartograph_common::{CartographError, Result};
use cartograph_logger::{log, LogSeverity};
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_BIOMES: &str = include_str!("../resources/biome-colors.txt");

/// Tint multipliers for one biome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Biome {
    pub grass: u32,
    pub foliage: u32,
    pub water: u32,
}

impl Biome {
    pub fn multiplier(&self, influence: Influence) -> u32 {
        match influence {
            Influence::None => 0xFFFF_FFFF,
            Influence::Grass => self.grass,
            Influence::Foliage => self.foliage,
            Influence::Water => self.water,
        }
    }
}

/// Biome id to tint table with a mandatory default entry.
#[derive(Debug, Clone)]
pub struct BiomeTable {
    default: Biome,
    biomes: HashMap<i32, Biome>,
}

impl BiomeTable {
    pub fn new(default: Biome) -> Self {
        BiomeTable {
            default,
            biomes: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: i32, biome: Biome) {
        self.biomes.insert(id, biome);
    }

    pub fn default_biome(&self) -> &Biome {
        &self.default
    }

    /// `None` when the id is unmapped; callers fall back to the default.
    pub fn get(&self, id: i32) -> Option<&Biome> {
        self.biomes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    /// Parses `id grass foliage water` lines (extra trailing fields, such
    /// as a biome name, are ignored). A `default` line is required.
    pub fn parse(text: &str, source: &str) -> Result<Self> {
        let mut default = None;
        let mut biomes = HashMap::new();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let parsed = if fields.len() < 4 {
                None
            } else {
                match (parse_int(fields[1]), parse_int(fields[2]), parse_int(fields[3])) {
                    (Some(grass), Some(foliage), Some(water)) => Some(Biome {
                        grass: grass as u32,
                        foliage: foliage as u32,
                        water: water as u32,
                    }),
                    _ => None,
                }
            };
            let Some(biome) = parsed else {
                log(
                    format!("Invalid biome map line at {}:{}: {}", source, line_no + 1, line),
                    LogSeverity::Warning,
                );
                continue;
            };

            if fields[0].eq_ignore_ascii_case("default") {
                default = Some(biome);
            } else if let Some(id) = parse_int(fields[0]) {
                biomes.insert(id as i32, biome);
            } else {
                log(
                    format!("Invalid biome id at {}:{}: {}", source, line_no + 1, fields[0]),
                    LogSeverity::Warning,
                );
            }
        }

        let default = default.ok_or_else(|| CartographError::MissingDefault(source.to_owned()))?;
        Ok(BiomeTable { default, biomes })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        BiomeTable::parse(&text, &path.display().to_string())
    }

    pub fn load_default() -> Result<Self> {
        BiomeTable::parse(DEFAULT_BIOMES, "(default biome colors)")
    }
}
