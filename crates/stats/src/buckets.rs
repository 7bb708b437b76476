//! File-size buckets.
use ingest::BYTES_PER_MB;

/// One of the five fixed size ranges, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeBucket {
    UnderOne,
    OneToFive,
    FiveToTen,
    TenToFifteen,
    FifteenPlus,
}

impl SizeBucket {
    /// All buckets in display order.
    pub const ALL: [SizeBucket; 5] = [
        SizeBucket::UnderOne,
        SizeBucket::OneToFive,
        SizeBucket::FiveToTen,
        SizeBucket::TenToFifteen,
        SizeBucket::FifteenPlus,
    ];

    /// Bucket for a size in bytes. The megabyte value is not rounded before
    /// comparison, so 1 048 575 bytes is still under 1 MB.
    pub fn for_bytes(size_bytes: u64) -> Self {
        let mb = size_bytes as f64 / BYTES_PER_MB;
        if mb < 1.0 {
            SizeBucket::UnderOne
        } else if mb < 5.0 {
            SizeBucket::OneToFive
        } else if mb < 10.0 {
            SizeBucket::FiveToTen
        } else if mb < 15.0 {
            SizeBucket::TenToFifteen
        } else {
            SizeBucket::FifteenPlus
        }
    }

    /// Human label shown on the size chart.
    pub fn label(&self) -> &'static str {
        match self {
            SizeBucket::UnderOne => "<1 MB",
            SizeBucket::OneToFive => "1–5 MB",
            SizeBucket::FiveToTen => "5–10 MB",
            SizeBucket::TenToFifteen => "10–15 MB",
            SizeBucket::FifteenPlus => "≥15 MB",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1_048_576;

    #[test]
    fn boundaries_are_exclusive_upper() {
        assert_eq!(SizeBucket::for_bytes(0), SizeBucket::UnderOne);
        assert_eq!(SizeBucket::for_bytes(MB - 1), SizeBucket::UnderOne);
        assert_eq!(SizeBucket::for_bytes(MB), SizeBucket::OneToFive);
        assert_eq!(SizeBucket::for_bytes(5 * MB - 1), SizeBucket::OneToFive);
        assert_eq!(SizeBucket::for_bytes(5 * MB), SizeBucket::FiveToTen);
        assert_eq!(SizeBucket::for_bytes(10 * MB), SizeBucket::TenToFifteen);
        assert_eq!(SizeBucket::for_bytes(15 * MB - 1), SizeBucket::TenToFifteen);
        assert_eq!(SizeBucket::for_bytes(15 * MB), SizeBucket::FifteenPlus);
        assert_eq!(SizeBucket::for_bytes(u64::MAX), SizeBucket::FifteenPlus);
    }

    #[test]
    fn display_order_matches_index() {
        for (i, bucket) in SizeBucket::ALL.iter().enumerate() {
            assert_eq!(bucket.index(), i);
        }
        let labels: Vec<&str> = SizeBucket::ALL.iter().map(SizeBucket::label).collect();
        assert_eq!(labels, ["<1 MB", "1–5 MB", "5–10 MB", "10–15 MB", "≥15 MB"]);
    }
}
