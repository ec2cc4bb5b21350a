use std::collections::BTreeSet;
use std::fmt::Write;
use std::time::Duration;

/// A block that fell back to the default color.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockKey {
    Id(u16),
    Name(String),
}

/// A datum or block state that fell back to its block's base color.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubBlockKey {
    IdDatum(u16, u8),
    State(String),
}

/// Identities seen during rendering with no table entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnmappedIds {
    pub blocks: BTreeSet<BlockKey>,
    pub sub_blocks: BTreeSet<SubBlockKey>,
    pub biomes: BTreeSet<i32>,
}

impl UnmappedIds {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.sub_blocks.is_empty() && self.biomes.is_empty()
    }

    pub fn merge(&mut self, other: UnmappedIds) {
        self.blocks.extend(other.blocks);
        self.sub_blocks.extend(other.sub_blocks);
        self.biomes.extend(other.biomes);
    }
}

/// Counters for one region render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStats {
    pub chunks_rendered: usize,
    pub chunks_skipped: usize,
    pub chunks_failed: usize,
    /// Chunks written by a game version the decoder does not read.
    pub chunks_unsupported: usize,
    pub sections: usize,
    pub bad_indices: usize,
    pub elapsed: Duration,
}

impl RenderStats {
    pub fn add(&mut self, other: &RenderStats) {
        self.chunks_rendered += other.chunks_rendered;
        self.chunks_skipped += other.chunks_skipped;
        self.chunks_failed += other.chunks_failed;
        self.chunks_unsupported += other.chunks_unsupported;
        self.sections += other.sections;
        self.bad_indices += other.bad_indices;
        self.elapsed += other.elapsed;
    }
}

/// Totals across every pass of a renderer.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub unmapped: UnmappedIds,
    pub totals: RenderStats,
    pub regions: usize,
}

impl Diagnostics {
    pub fn record(&mut self, unmapped: UnmappedIds, stats: &RenderStats) {
        self.unmapped.merge(unmapped);
        self.totals.add(stats);
        self.regions += 1;
    }

    pub fn report(&self) -> String {
        let mut out = String::new();
        let t = &self.totals;
        let _ = writeln!(
            out,
            "Rendered {} regions: {} chunks, {} skipped, {} failed, {} unsupported, {} sections, {} bad palette indices in {:.2}s",
            self.regions,
            t.chunks_rendered,
            t.chunks_skipped,
            t.chunks_failed,
            t.chunks_unsupported,
            t.sections,
            t.bad_indices,
            t.elapsed.as_secs_f64()
        );

        if !self.unmapped.blocks.is_empty() {
            let _ = writeln!(out, "Block IDs/names without colors:");
            for key in &self.unmapped.blocks {
                let _ = match key {
                    BlockKey::Id(id) => writeln!(out, "  0x{:04X}", id),
                    BlockKey::Name(name) => writeln!(out, "  {}", name),
                };
            }
        }
        if !self.unmapped.sub_blocks.is_empty() {
            let _ = writeln!(out, "Block data values/states without colors:");
            for key in &self.unmapped.sub_blocks {
                let _ = match key {
                    SubBlockKey::IdDatum(id, datum) => writeln!(out, "  0x{:04X}:0x{:X}", id, datum),
                    SubBlockKey::State(state) => writeln!(out, "  {}", state),
                };
            }
        }
        if !self.unmapped.biomes.is_empty() {
            let _ = writeln!(out, "Biome IDs without colors:");
            for &id in &self.unmapped.biomes {
                let _ = if id < 0 {
                    writeln!(out, "  -0x{:02X}", id.unsigned_abs())
                } else {
                    writeln!(out, "  0x{:02X}", id)
                };
            }
        }
        out
    }
}
