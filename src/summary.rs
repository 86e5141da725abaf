//! Region-level aggregation: unique block names and their total counts
//! across every chunk in a region, without retaining per-section data.

use std::collections::HashMap;

use crate::chunk::ParsedChunk;

#[derive(Debug, Clone)]
pub struct RegionSummary {
	pub region_x: i32,
	pub region_z: i32,
	pub non_empty_slots: u32,
	pub unique_blocks: u32,
	pub block_counts: HashMap<String, u64>,
}

pub(crate) struct RegionSummaryBuilder {
	region_x: i32,
	region_z: i32,
	non_empty_slots: u32,
	block_counts: HashMap<String, u64>,
}

impl RegionSummary {
	pub(crate) fn builder(region_coordinates: (i32, i32)) -> RegionSummaryBuilder {
		RegionSummaryBuilder {
			region_x: region_coordinates.0,
			region_z: region_coordinates.1,
			non_empty_slots: 0,
			block_counts: HashMap::new(),
		}
	}
}

impl RegionSummaryBuilder {
	pub fn add_chunk(&mut self, chunk: &ParsedChunk) {
		self.non_empty_slots += 1;
		for section in &chunk.sections {
			for (name, count) in &section.block_counts {
				*self.block_counts.entry(name.clone()).or_insert(0) += count;
			}
		}
	}

	pub fn build(self) -> RegionSummary {
		RegionSummary {
			region_x: self.region_x,
			region_z: self.region_z,
			non_empty_slots: self.non_empty_slots,
			unique_blocks: self.block_counts.len() as u32,
			block_counts: self.block_counts,
		}
	}
}
