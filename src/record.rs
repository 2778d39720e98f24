//! Tally records and the policy that maps a tally entry to a 31-bit record.
//!
//! A tally entry packs into the low 12 bits of the record:
//! `tally(8) | candidate(2) | district(2)`, MSB to LSB. The upper 19 bits
//! are zero unless the record policy substitutes a whole-record override.

use std::fmt;
use std::str::FromStr;

use crate::error::{check_width, TagError};
use crate::utils::bits::mask;
use crate::RECORD_SIZE;

/// Width of the district field, in bits.
pub const DISTRICT_BITS: u32 = 2;
/// Width of the candidate field, in bits.
pub const CANDIDATE_BITS: u32 = 2;
/// Width of the tally field, in bits.
pub const TALLY_BITS: u32 = 8;

/// Number of distinct districts.
pub const DISTRICTS: u8 = 1 << DISTRICT_BITS;
/// Number of distinct candidates per district.
pub const CANDIDATES: u8 = 1 << CANDIDATE_BITS;
/// Number of distinct tally values.
pub const TALLIES: u16 = 1 << TALLY_BITS;

/// Whole-record overrides used by the hardware testbench, keyed by
/// `(district, candidate, tally)`.
const TESTBENCH_OVERRIDES: [((u8, u8, u8), u32); 5] = [
    ((0, 0, 0), 0x0000_0000),
    ((3, 1, 86), 0x0123_4567),
    ((1, 0, 0), 0x0000_0001),
    ((1, 1, 90), 0x05A5_A5A5),
    ((3, 3, 255), 0x07FF_FFFF),
];

/// One election tally entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TallyEntry {
    district: u8,
    candidate: u8,
    tally: u8,
}

impl TallyEntry {
    /// Builds an entry, silently masking `district` and `candidate` to 2 bits.
    pub fn new(district: u8, candidate: u8, tally: u8) -> Self {
        TallyEntry {
            district: district & (DISTRICTS - 1),
            candidate: candidate & (CANDIDATES - 1),
            tally,
        }
    }

    /// Builds an entry, rejecting fields wider than their declared bits.
    ///
    /// # Errors
    /// Returns [`TagError::ValueOutOfRange`] for the first oversized field.
    pub fn new_checked(district: u32, candidate: u32, tally: u32) -> Result<Self, TagError> {
        check_width("district", district as u64, DISTRICT_BITS)?;
        check_width("candidate", candidate as u64, CANDIDATE_BITS)?;
        check_width("tally", tally as u64, TALLY_BITS)?;
        Ok(Self::new(district as u8, candidate as u8, tally as u8))
    }

    /// Recovers the entry from the low 12 bits of a record.
    pub fn from_record(record: u32) -> Self {
        Self::new(
            record as u8,
            (record >> DISTRICT_BITS) as u8,
            (record >> (DISTRICT_BITS + CANDIDATE_BITS)) as u8,
        )
    }

    pub fn district(&self) -> u8 {
        self.district
    }

    pub fn candidate(&self) -> u8 {
        self.candidate
    }

    pub fn tally(&self) -> u8 {
        self.tally
    }

    /// `tally << 4 | candidate << 2 | district`.
    pub fn low12(&self) -> u32 {
        ((self.tally as u32) << (DISTRICT_BITS + CANDIDATE_BITS))
            | ((self.candidate as u32) << DISTRICT_BITS)
            | self.district as u32
    }

    /// Iterates every entry: district, then candidate, then tally, ascending.
    pub fn all() -> impl Iterator<Item = TallyEntry> {
        (0..DISTRICTS).flat_map(|d| {
            (0..CANDIDATES).flat_map(move |c| (0..TALLIES).map(move |t| TallyEntry::new(d, c, t as u8)))
        })
    }
}

impl fmt::Display for TallyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "district: {}, candidate: {}, tally: {}",
            self.district, self.candidate, self.tally
        )
    }
}

/// Strict check for caller-supplied record overrides.
///
/// # Errors
/// Returns [`TagError::ValueOutOfRange`] if `record` uses bit 31.
pub fn check_record(record: u32) -> Result<u32, TagError> {
    check_width("record", record as u64, RECORD_SIZE)?;
    Ok(record)
}

/// Chooses the 31-bit record value for a tally entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordPolicy {
    /// The record is the entry's low 12 bits, upper bits zero.
    Plain,
    /// As [`Plain`](RecordPolicy::Plain), except the five testbench entries
    /// map to fixed whole-record values.
    #[default]
    Testbench,
}

impl RecordPolicy {
    /// Record value for `entry` under this policy; always fits in 31 bits.
    pub fn record_for(&self, entry: &TallyEntry) -> u32 {
        let plain = entry.low12();
        match self {
            RecordPolicy::Plain => plain,
            RecordPolicy::Testbench => {
                let fields = (entry.district, entry.candidate, entry.tally);
                TESTBENCH_OVERRIDES
                    .iter()
                    .find(|(k, _)| *k == fields)
                    .map_or(plain, |&(_, record)| record & mask(RECORD_SIZE) as u32)
            }
        }
    }

    /// The raw records of the testbench overrides, in testbench order.
    pub fn testbench_records() -> impl Iterator<Item = u32> {
        TESTBENCH_OVERRIDES.iter().map(|&(_, record)| record)
    }
}

impl fmt::Display for RecordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordPolicy::Plain => write!(f, "plain"),
            RecordPolicy::Testbench => write!(f, "testbench"),
        }
    }
}

impl FromStr for RecordPolicy {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(RecordPolicy::Plain),
            "testbench" | "tb" => Ok(RecordPolicy::Testbench),
            _ => Err(TagError::UnknownRecordPolicy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low12_layout() {
        assert_eq!(TallyEntry::new(0, 0, 0).low12(), 0);
        assert_eq!(TallyEntry::new(1, 0, 0).low12(), 0x001);
        assert_eq!(TallyEntry::new(0, 1, 0).low12(), 0x004);
        assert_eq!(TallyEntry::new(2, 1, 7).low12(), 0x076);
        assert_eq!(TallyEntry::new(3, 3, 255).low12(), 0xFFF);
    }

    #[test]
    fn test_new_masks_fields() {
        let e = TallyEntry::new(5, 6, 9);
        assert_eq!((e.district(), e.candidate(), e.tally()), (1, 2, 9));
    }

    #[test]
    fn test_new_checked() {
        assert_eq!(TallyEntry::new_checked(3, 3, 255).unwrap(), TallyEntry::new(3, 3, 255));
        assert_eq!(
            TallyEntry::new_checked(4, 0, 0),
            Err(TagError::ValueOutOfRange {
                field: "district",
                value: 4,
                bits: 2
            })
        );
        assert!(matches!(
            TallyEntry::new_checked(0, 0, 256),
            Err(TagError::ValueOutOfRange { field: "tally", .. })
        ));
    }

    #[test]
    fn test_from_record() {
        assert_eq!(TallyEntry::from_record(0x0123_4567), TallyEntry::new(3, 1, 86));
        assert_eq!(TallyEntry::from_record(0x05A5_A5A5), TallyEntry::new(1, 1, 90));
        assert_eq!(TallyEntry::from_record(0x07FF_FFFF), TallyEntry::new(3, 3, 255));
        let e = TallyEntry::new(2, 1, 200);
        assert_eq!(TallyEntry::from_record(e.low12()), e);
    }

    #[test]
    fn test_all_order_and_count() {
        let all: Vec<TallyEntry> = TallyEntry::all().collect();
        assert_eq!(all.len(), 4096);
        assert_eq!(all[0], TallyEntry::new(0, 0, 0));
        assert_eq!(all[1], TallyEntry::new(0, 0, 1));
        assert_eq!(all[256], TallyEntry::new(0, 1, 0));
        assert_eq!(all[1024], TallyEntry::new(1, 0, 0));
        assert_eq!(all[4095], TallyEntry::new(3, 3, 255));
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_plain_policy() {
        let e = TallyEntry::new(3, 1, 86);
        assert_eq!(RecordPolicy::Plain.record_for(&e), 0x567);
    }

    #[test]
    fn test_testbench_overrides() {
        let p = RecordPolicy::Testbench;
        assert_eq!(p.record_for(&TallyEntry::new(0, 0, 0)), 0x0000_0000);
        assert_eq!(p.record_for(&TallyEntry::new(3, 1, 86)), 0x0123_4567);
        assert_eq!(p.record_for(&TallyEntry::new(1, 0, 0)), 0x0000_0001);
        assert_eq!(p.record_for(&TallyEntry::new(1, 1, 90)), 0x05A5_A5A5);
        assert_eq!(p.record_for(&TallyEntry::new(3, 3, 255)), 0x07FF_FFFF);
        // everything else falls back to the plain record
        assert_eq!(p.record_for(&TallyEntry::new(2, 1, 7)), 0x076);
    }

    #[test]
    fn test_testbench_records_fit() {
        let records: Vec<u32> = RecordPolicy::testbench_records().collect();
        assert_eq!(records, vec![0, 0x0123_4567, 1, 0x05A5_A5A5, 0x07FF_FFFF]);
        for r in records {
            assert!(check_record(r).is_ok());
        }
    }

    #[test]
    fn test_check_record() {
        assert_eq!(check_record(0x7FFF_FFFF).unwrap(), 0x7FFF_FFFF);
        assert!(matches!(
            check_record(0x8000_0000),
            Err(TagError::ValueOutOfRange { field: "record", bits: 31, .. })
        ));
    }

    #[test]
    fn test_policy_parse_and_display() {
        assert_eq!("plain".parse::<RecordPolicy>().unwrap(), RecordPolicy::Plain);
        assert_eq!("TB".parse::<RecordPolicy>().unwrap(), RecordPolicy::Testbench);
        assert!("other".parse::<RecordPolicy>().is_err());
        assert_eq!(RecordPolicy::default().to_string(), "testbench");
    }

    #[test]
    fn test_entry_display() {
        assert_eq!(
            TallyEntry::new(3, 1, 86).to_string(),
            "district: 3, candidate: 1, tally: 86"
        );
    }
}
