//! OID catalog.
//!
//! The variables to poll are grouped into segments that share a table-index
//! space and are walked together. Entries are stored segment-contiguous, so
//! the first and last entry of a segment are directly addressable from the
//! per-segment counts.

use anyhow::{bail, Context, Result};

/// A logical group of OIDs sharing a table-index space.
///
/// `NonRep` carries the scalar (non-repeating) variables; all other segments
/// are tabular and walked with GETBULK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Segment {
    NonRep = 0,
    Downstream30,
    Downstream30A,
    Upstream30,
    Upstream30A,
    Downstream31,
    Upstream31,
    Downsub31,
    ProfileStats31,
}

impl Segment {
    pub const COUNT: usize = 9;

    pub const ALL: [Segment; Segment::COUNT] = [
        Segment::NonRep,
        Segment::Downstream30,
        Segment::Downstream30A,
        Segment::Upstream30,
        Segment::Upstream30A,
        Segment::Downstream31,
        Segment::Upstream31,
        Segment::Downsub31,
        Segment::ProfileStats31,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One catalog variable: its segment, textual name and numeric encoding.
#[derive(Debug, Clone)]
pub struct OidEntry {
    pub segment: Segment,
    pub name: &'static str,
    pub oid: Vec<u32>,
}

/// Which built-in variable set to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Verbose set for single-modem analysis.
    Analysis,
    /// Terse set for fleet-wide collection.
    Bulk,
}

/// Verbose catalog for the single-modem analysis view.
const ANALYSIS_OIDS: &[(Segment, &str)] = &[
    (Segment::NonRep, "1.3.6.1.2.1.1.1"),                        // SysDescr
    (Segment::NonRep, "1.3.6.1.2.1.1.3"),                        // Uptime
    (Segment::NonRep, "1.3.6.1.2.1.10.127.1.1.5"),               // DOCSIS
    (Segment::NonRep, "1.3.6.1.2.1.10.127.1.2.2.1.2"),           // Status Code
    (Segment::NonRep, "1.3.6.1.2.1.10.127.1.2.2.1.3"),           // US Power/dBmV
    (Segment::NonRep, "1.3.6.1.2.1.69.1.3.5"),                   // Firmware
    (Segment::NonRep, "1.3.6.1.4.1.4491.2.1.28.1.1"),            // D3.1 capable
    (Segment::Downstream30, "1.3.6.1.2.1.10.127.1.1.1.1.2"),     // f/MHz
    (Segment::Downstream30, "1.3.6.1.2.1.10.127.1.1.1.1.4"),     // Modulation
    (Segment::Downstream30, "1.3.6.1.2.1.10.127.1.1.1.1.6"),     // Power/dBmV
    (Segment::Downstream30A, "1.3.6.1.2.1.10.127.1.1.4.1.5"),    // MER/dB
    (Segment::Downstream30A, "1.3.6.1.2.1.10.127.1.1.4.1.6"),    // uR/-dBc
    (Segment::Downstream30A, "1.3.6.1.4.1.4491.2.1.20.1.24.1.1"), // MER/dB
    (Segment::Upstream30, "1.3.6.1.2.1.10.127.1.1.2.1.2"),       // f/MHz
    (Segment::Upstream30, "1.3.6.1.2.1.10.127.1.1.2.1.3"),       // Width/MHz
    (Segment::Upstream30A, "1.3.6.1.4.1.4491.2.1.20.1.2.1.1"),   // Power/dBmV
    (Segment::Upstream30A, "1.3.6.1.4.1.4491.2.1.20.1.2.1.9"),   // RangingStatus
    (Segment::Downstream31, "1.3.6.1.4.1.4491.2.1.27.1.2.5.1.3"), // avg RxMER
    (Segment::Downstream31, "1.3.6.1.4.1.4491.2.1.27.1.2.5.1.4"), // RxMER std dev
    (Segment::Downstream31, "1.3.6.1.4.1.4491.2.1.28.1.9.1.3"),
    (Segment::Downstream31, "1.3.6.1.4.1.4491.2.1.28.1.9.1.4"),
    (Segment::Downstream31, "1.3.6.1.4.1.4491.2.1.28.1.9.1.5"),
    (Segment::Downstream31, "1.3.6.1.4.1.4491.2.1.28.1.9.1.7"),
    (Segment::Upstream31, "1.3.6.1.4.1.4491.2.1.28.1.13.1.2"),
    (Segment::Upstream31, "1.3.6.1.4.1.4491.2.1.28.1.13.1.3"),
    (Segment::Upstream31, "1.3.6.1.4.1.4491.2.1.28.1.13.1.4"),
    (Segment::Upstream31, "1.3.6.1.4.1.4491.2.1.28.1.13.1.6"),
    (Segment::Upstream31, "1.3.6.1.4.1.4491.2.1.28.1.13.1.10"),  // RxPow
    (Segment::Downsub31, "1.3.6.1.4.1.4491.2.1.28.1.11.1.2"),    // OFDM center frequency
    (Segment::Downsub31, "1.3.6.1.4.1.4491.2.1.28.1.11.1.3"),
    (Segment::ProfileStats31, "1.3.6.1.4.1.4491.2.1.28.1.10.1.3"), // total CW
    (Segment::ProfileStats31, "1.3.6.1.4.1.4491.2.1.28.1.10.1.4"), // cCWE
    (Segment::ProfileStats31, "1.3.6.1.4.1.4491.2.1.28.1.10.1.5"), // uCWE
    (Segment::ProfileStats31, "1.3.6.1.4.1.4491.2.1.28.1.10.1.6"), // received bytes
    (Segment::ProfileStats31, "1.3.6.1.4.1.4491.2.1.28.1.10.1.7"), // received unicast bytes
];

/// Terse catalog for fleet-wide collection.
const BULK_OIDS: &[(Segment, &str)] = &[
    (Segment::NonRep, "1.3.6.1.2.1.1.1"),                        // SysDescr
    (Segment::NonRep, "1.3.6.1.2.1.10.127.1.2.2.1.3"),           // US Power (2.0)
    (Segment::NonRep, "1.3.6.1.2.1.10.127.1.2.2.1.12"),          // T3 Timeout
    (Segment::NonRep, "1.3.6.1.2.1.10.127.1.2.2.1.13"),          // T4 Timeout
    (Segment::NonRep, "1.3.6.1.2.1.10.127.1.2.2.1.17"),          // PreEq
    (Segment::NonRep, "1.3.6.1.2.1.31.1.1.1.6.1"),               // ifHCInOctets (docsCableMaclayer)
    (Segment::NonRep, "1.3.6.1.2.1.31.1.1.1.10.1"),              // ifHCOutOctets (docsCableMaclayer)
    (Segment::Downstream30, "1.3.6.1.2.1.10.127.1.1.1.1.6"),     // Power
    (Segment::Downstream30, "1.3.6.1.2.1.10.127.1.1.4.1.3"),     // Corrected
    (Segment::Downstream30, "1.3.6.1.2.1.10.127.1.1.4.1.4"),     // Uncorrectable
    (Segment::Downstream30, "1.3.6.1.2.1.10.127.1.1.4.1.5"),     // SNR (2.0)
    (Segment::Downstream30, "1.3.6.1.2.1.10.127.1.1.4.1.6"),     // Microreflections
    (Segment::Downstream30, "1.3.6.1.4.1.4491.2.1.20.1.24.1.1"), // SNR (3.0)
    (Segment::Upstream30, "1.3.6.1.2.1.10.127.1.1.2.1.2"),       // Frequency
    (Segment::Upstream30, "1.3.6.1.2.1.10.127.1.1.2.1.3"),       // Bandwidth
    (Segment::Upstream30, "1.3.6.1.4.1.4491.2.1.20.1.2.1.1"),    // Power (3.0)
    (Segment::Upstream30, "1.3.6.1.4.1.4491.2.1.20.1.2.1.9"),    // Ranging Status
];

/// GETBULK max-repetitions per segment; `NonRep` is issued as GETNEXT.
///
/// Vendor-tuned row counts per round trip. Kept as catalog data rather than
/// constants so a differently tuned schedule can be supplied.
pub const DEFAULT_REPETITIONS: [u32; Segment::COUNT] = [0, 9, 9, 5, 5, 3, 3, 9, 5];

/// The parsed, segment-contiguous variable catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<OidEntry>,
    counts: [usize; Segment::COUNT],
    firsts: [usize; Segment::COUNT],
    repetitions: [u32; Segment::COUNT],
}

impl Catalog {
    /// Parse one of the built-in variable sets.
    pub fn load(variant: Variant) -> Result<Catalog> {
        let defs = match variant {
            Variant::Analysis => ANALYSIS_OIDS,
            Variant::Bulk => BULK_OIDS,
        };
        Catalog::new(defs, DEFAULT_REPETITIONS)
    }

    /// Build a catalog from explicit definitions and a repetition schedule.
    ///
    /// Fails if any OID does not parse or the entries are not laid out
    /// segment-contiguous in segment order.
    pub fn new(
        defs: &[(Segment, &'static str)],
        repetitions: [u32; Segment::COUNT],
    ) -> Result<Catalog> {
        let mut entries = Vec::with_capacity(defs.len());
        let mut counts = [0usize; Segment::COUNT];
        let mut last_segment = 0usize;

        for &(segment, name) in defs {
            if segment.index() < last_segment {
                bail!("catalog entries for {:?} are not contiguous", segment);
            }
            last_segment = segment.index();
            let oid = parse_oid(name)
                .with_context(|| format!("could not parse OID: {}", name))?;
            counts[segment.index()] += 1;
            entries.push(OidEntry { segment, name, oid });
        }

        let mut firsts = [0usize; Segment::COUNT];
        let mut offset = 0;
        for seg in Segment::ALL {
            firsts[seg.index()] = offset;
            offset += counts[seg.index()];
        }

        Ok(Catalog { entries, counts, firsts, repetitions })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, i: usize) -> &OidEntry {
        &self.entries[i]
    }

    pub fn segment_of(&self, i: usize) -> Segment {
        self.entries[i].segment
    }

    /// Number of variables in a segment; 0 means the segment is unused.
    pub fn count(&self, segment: Segment) -> usize {
        self.counts[segment.index()]
    }

    /// Index of the first entry of a segment.
    pub fn first_of(&self, segment: Segment) -> usize {
        self.firsts[segment.index()]
    }

    /// Index of the last entry of a segment (entries are segment-contiguous).
    pub fn last_of(&self, segment: Segment) -> usize {
        self.firsts[segment.index()] + self.counts[segment.index()] - 1
    }

    /// All entries of a segment, in catalog-column order.
    pub fn entries_of(&self, segment: Segment) -> &[OidEntry] {
        let first = self.firsts[segment.index()];
        &self.entries[first..first + self.counts[segment.index()]]
    }

    /// GETBULK max-repetitions for a tabular segment.
    pub fn max_repetitions(&self, segment: Segment) -> u32 {
        self.repetitions[segment.index()]
    }
}

/// Parse a dotted numeric OID, with or without a leading dot.
pub fn parse_oid(text: &str) -> Result<Vec<u32>> {
    let oid = text
        .split('.')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>()
                .with_context(|| format!("invalid OID component: {:?}", part))
        })
        .collect::<Result<Vec<u32>>>()?;
    if oid.len() < 2 {
        bail!("OID has fewer than two components: {:?}", text);
    }
    Ok(oid)
}
