use cartograph_common::{BoundingRect, CartographError, RegionPos, Result};
use cartograph_logger::{log, LogSeverity};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionFormat {
    /// `.mcr`, superseded by anvil
    McRegion,
    /// `.mca`
    Anvil,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionEntry {
    pub pos: RegionPos,
    pub path: PathBuf,
    pub format: RegionFormat,
}

/// The set of region files making up a world, with their bounds.
#[derive(Debug, Default)]
pub struct RegionMap {
    pub regions: Vec<RegionEntry>,
    pub bounds: Option<BoundingRect>,
}

/// Parses `r.<x>.<z>.mca` / `r.<x>.<z>.mcr`.
pub fn parse_file_name(name: &str) -> Option<(RegionPos, RegionFormat)> {
    let mut parts = name.split('.');
    if parts.next()? != "r" {
        return None;
    }
    let x = parts.next()?.parse::<i32>().ok()?;
    let z = parts.next()?.parse::<i32>().ok()?;
    let format = match parts.next()? {
        "mca" => RegionFormat::Anvil,
        "mcr" => RegionFormat::McRegion,
        _ => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((RegionPos::new(x, z), format))
}

impl RegionMap {
    /// Loads a world. `path` may be a world directory (its `region`
    /// subdirectory is used), a region directory, or a single region file.
    /// Regions outside `limit` are ignored.
    pub fn load(path: &Path, limit: BoundingRect) -> Result<Self> {
        let mut map = RegionMap::default();

        if path.is_file() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            let (pos, format) = parse_file_name(name).ok_or_else(|| {
                CartographError::ConfigError(format!(
                    "{} does not seem to be a directory or a region file",
                    path.display()
                ))
            })?;
            if format == RegionFormat::McRegion {
                return Err(CartographError::ConfigError(format!(
                    "{} is a McRegion file; only Anvil regions can be rendered",
                    path.display()
                )));
            }
            if limit.contains(pos) {
                map.add(RegionEntry {
                    pos,
                    path: path.to_path_buf(),
                    format,
                });
            }
            return Ok(map);
        }

        let dir = if path.join("region").is_dir() {
            path.join("region")
        } else {
            path.to_path_buf()
        };
        if !dir.is_dir() {
            return Err(CartographError::ConfigError(format!(
                "{} does not seem to be a directory or a region file",
                path.display()
            )));
        }

        let mut found = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some((pos, format)) = name.to_str().and_then(parse_file_name) {
                found.push(RegionEntry {
                    pos,
                    path: entry.path(),
                    format,
                });
            }
        }

        // chunks in the old format carry no data version to decode by
        let legacy = found.iter().filter(|r| r.format == RegionFormat::McRegion).count();
        if legacy > 0 {
            log(
                format!(
                    "Ignoring {} McRegion files in {}; only Anvil regions can be rendered",
                    legacy,
                    dir.display()
                ),
                LogSeverity::Warning,
            );
            found.retain(|r| r.format == RegionFormat::Anvil);
        }
        found.sort_by_key(|r| (r.pos.z, r.pos.x));

        for region in found.into_iter().filter(|r| limit.contains(r.pos)) {
            map.add(region);
        }

        log(
            format!("Found {} regions in {}", map.regions.len(), dir.display()),
            LogSeverity::Info,
        );
        Ok(map)
    }

    pub fn add(&mut self, region: RegionEntry) {
        self.bounds = Some(BoundingRect::include(self.bounds, region.pos));
        self.regions.push(region);
    }

    pub fn region_at(&self, pos: RegionPos) -> Option<&RegionEntry> {
        self.regions.iter().find(|r| r.pos == pos)
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
