//! Test-vector generation for the hardware comparison table.
//!
//! Each vector pairs the 16-bit packed input word with the expected tag:
//!
//! ```text
//! input->1111000000000000: district: 0, candidate: 0, tally: 0, tag: 1111
//! ```

use std::fmt;
use std::io::{self, Write};

use rayon::prelude::*;
use tracing::debug;

use crate::packer::{pack, PACKED_BITS};
use crate::record::{RecordPolicy, TallyEntry};
use crate::transform::TagGenerator;
use crate::utils::bits::to_binary_string;
use crate::TAG_SIZE;

/// Default file name for the full table.
pub const DEFAULT_OUTPUT: &str = "all_tags_output.txt";

/// One line of the comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestVector {
    /// The tally entry whose fields fill the low 12 bits of `packed`.
    pub entry: TallyEntry,
    /// The 31-bit record the tag was computed over.
    pub record: u32,
    /// The 4-bit tag of `record`.
    pub tag: u8,
    /// `tag | tally | candidate | district`.
    pub packed: u16,
}

impl TestVector {
    /// Tags `record` and labels it with `entry`.
    pub fn compute(generator: &TagGenerator, entry: TallyEntry, record: u32) -> Self {
        let tag = generator.tag_of(record);
        TestVector {
            entry,
            record,
            tag,
            packed: pack(tag, entry.tally(), entry.candidate(), entry.district()),
        }
    }
}

impl fmt::Display for TestVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input->{}: {}, tag: {}",
            to_binary_string(self.packed as u64, PACKED_BITS),
            self.entry,
            to_binary_string(self.tag as u64, TAG_SIZE)
        )
    }
}

/// The full table over every `(district, candidate, tally)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorTable {
    vectors: Vec<TestVector>,
}

impl VectorTable {
    /// Enumerates all 4096 entries in district, candidate, tally order.
    ///
    /// Entries are tagged in parallel; the output order is deterministic.
    pub fn generate(generator: &TagGenerator, policy: RecordPolicy) -> Self {
        let entries: Vec<TallyEntry> = TallyEntry::all().collect();
        debug!(entries = entries.len(), %policy, "generating vector table");
        let vectors = entries
            .par_iter()
            .map(|&entry| TestVector::compute(generator, entry, policy.record_for(&entry)))
            .collect();
        VectorTable { vectors }
    }

    pub fn vectors(&self) -> &[TestVector] {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Finds the vector for `entry`.
    pub fn get(&self, entry: &TallyEntry) -> Option<&TestVector> {
        self.vectors
            .binary_search_by(|v| v.entry.cmp(entry))
            .ok()
            .map(|i| &self.vectors[i])
    }

    /// Writes one line per vector.
    ///
    /// # Errors
    /// Propagates any I/O error from `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for v in &self.vectors {
            writeln!(writer, "{}", v)?;
        }
        writer.flush()?;
        debug!(lines = self.vectors.len(), "vector table written");
        Ok(())
    }
}

/// The five testbench records, tagged directly.
///
/// Each record's entry fields are read back from its low 12 bits.
pub fn sanity_vectors(generator: &TagGenerator) -> Vec<TestVector> {
    const SANITY_RECORDS: [u32; 5] = [0x000_0000, 0x123_4567, 0x000_0001, 0x5A5_A5A5, 0x7FF_FFFF];
    SANITY_RECORDS
        .iter()
        .map(|&record| TestVector::compute(generator, TallyEntry::from_record(record), record))
        .collect()
}
