//! Format ranking and selection policies

use crate::core::video_info::Format;
use clap::ValueEnum;

/// Quality tiers the service reports, lowest first
const QUALITY_ORDER: &[&str] = &[
    "tiny", "small", "medium", "large", "hd720", "hd1080", "hd1440", "hd2160", "highres",
];

/// Ordinal of a quality tier. Unknown tiers rank below all known ones.
pub fn quality_rank(quality: &str) -> i32 {
    QUALITY_ORDER
        .iter()
        .position(|q| *q == quality)
        .map(|p| p as i32)
        .unwrap_or(-1)
}

/// Audio-bearing formats, best quality first.
///
/// The sort is stable, so formats of equal rank keep the order the service
/// listed them in.
pub fn ranked_with_audio(formats: &[Format]) -> Vec<&Format> {
    let mut candidates: Vec<&Format> = formats.iter().filter(|f| f.has_audio()).collect();
    candidates.sort_by(|a, b| quality_rank(&b.quality).cmp(&quality_rank(&a.quality)));
    candidates
}

/// Strategy for choosing which stream to download
pub trait FormatSelection: Send + Sync {
    /// Pick one of `formats`, or `None` if nothing is acceptable
    fn select<'a>(&self, formats: &'a [Format]) -> Option<&'a Format>;
}

impl<F> FormatSelection for F
where
    F: for<'a> Fn(&'a [Format]) -> Option<&'a Format> + Send + Sync,
{
    fn select<'a>(&self, formats: &'a [Format]) -> Option<&'a Format> {
        self(formats)
    }
}

/// First audio-bearing format, in rank order, whose tier is one of `qualities`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferredQualities {
    pub qualities: Vec<String>,
}

impl PreferredQualities {
    pub fn new<I, S>(qualities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            qualities: qualities.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for PreferredQualities {
    fn default() -> Self {
        Self::new(["hd720", "medium"])
    }
}

impl FormatSelection for PreferredQualities {
    fn select<'a>(&self, formats: &'a [Format]) -> Option<&'a Format> {
        ranked_with_audio(formats)
            .into_iter()
            .find(|f| self.qualities.iter().any(|q| *q == f.quality))
    }
}

/// Highest-ranked audio-bearing format
#[derive(Debug, Clone, Copy, Default)]
pub struct BestAvailable;

impl FormatSelection for BestAvailable {
    fn select<'a>(&self, formats: &'a [Format]) -> Option<&'a Format> {
        ranked_with_audio(formats).into_iter().next()
    }
}

/// Audio-bearing format with the smallest declared size
#[derive(Debug, Clone, Copy, Default)]
pub struct SmallestFile;

impl FormatSelection for SmallestFile {
    fn select<'a>(&self, formats: &'a [Format]) -> Option<&'a Format> {
        formats
            .iter()
            .filter(|f| f.has_audio())
            .min_by_key(|f| f.size.unwrap_or(u64::MAX))
    }
}

/// Selection policies available from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FormatPolicy {
    /// hd720 or medium, whichever ranks first
    #[default]
    Preferred,
    /// Highest quality with audio
    Best,
    /// Smallest file with audio
    Smallest,
}

impl FormatPolicy {
    /// Build the selection strategy for this policy
    pub fn selection(&self) -> Box<dyn FormatSelection> {
        match self {
            FormatPolicy::Preferred => Box::new(PreferredQualities::default()),
            FormatPolicy::Best => Box::new(BestAvailable),
            FormatPolicy::Smallest => Box::new(SmallestFile),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(itag: u32, quality: &str, audio: bool) -> Format {
        let format = Format::new(itag, quality, "video/mp4");
        if audio {
            format.with_audio_channels(2)
        } else {
            format
        }
    }

    #[test]
    fn test_quality_rank_order() {
        assert!(quality_rank("hd720") > quality_rank("medium"));
        assert!(quality_rank("medium") > quality_rank("small"));
        assert!(quality_rank("hd2160") > quality_rank("hd1080"));
        assert!(quality_rank("tiny") > quality_rank("bogus"));
    }

    #[test]
    fn test_preferred_picks_hd720_over_medium() {
        let formats = vec![fmt(18, "medium", true), fmt(22, "hd720", true), fmt(134, "medium", false)];

        let selected = PreferredQualities::default().select(&formats).unwrap();
        assert_eq!(selected.quality, "hd720");
        assert_eq!(selected.itag, 22);
    }

    #[test]
    fn test_preferred_is_stable_under_reordering() {
        let formats = vec![fmt(18, "medium", true), fmt(22, "hd720", true), fmt(134, "medium", false)];
        let reordered = vec![fmt(134, "medium", false), fmt(22, "hd720", true), fmt(18, "medium", true)];

        let policy = PreferredQualities::default();
        assert_eq!(policy.select(&formats).unwrap().itag, 22);
        assert_eq!(policy.select(&reordered).unwrap().itag, 22);
    }

    #[test]
    fn test_ties_keep_listing_order() {
        let formats = vec![fmt(43, "medium", true), fmt(18, "medium", true)];
        assert_eq!(PreferredQualities::default().select(&formats).unwrap().itag, 43);

        let swapped = vec![fmt(18, "medium", true), fmt(43, "medium", true)];
        assert_eq!(PreferredQualities::default().select(&swapped).unwrap().itag, 18);
    }

    #[test]
    fn test_preferred_requires_exact_label() {
        // hd1080 with audio is better, but the policy only accepts hd720/medium
        let formats = vec![fmt(37, "hd1080", true), fmt(17, "small", true)];
        assert!(PreferredQualities::default().select(&formats).is_none());

        let formats = vec![fmt(22, "hd720", false)];
        assert!(PreferredQualities::default().select(&formats).is_none());
    }

    #[test]
    fn test_best_available() {
        let formats = vec![fmt(18, "medium", true), fmt(37, "hd1080", true), fmt(137, "hd2160", false)];
        assert_eq!(BestAvailable.select(&formats).unwrap().itag, 37);
        assert!(BestAvailable.select(&[]).is_none());
    }

    #[test]
    fn test_smallest_file() {
        let formats = vec![
            fmt(22, "hd720", true).with_size(5_000),
            fmt(18, "medium", true).with_size(2_000),
            fmt(160, "tiny", false).with_size(100),
            fmt(17, "small", true),
        ];
        assert_eq!(SmallestFile.select(&formats).unwrap().itag, 18);
    }

    #[test]
    fn test_function_as_selection() {
        fn itag_18(formats: &[Format]) -> Option<&Format> {
            formats.iter().find(|f| f.itag == 18)
        }

        let policy: Box<dyn FormatSelection> = Box::new(itag_18);
        let formats = vec![fmt(22, "hd720", true), fmt(18, "medium", true)];

        assert_eq!(policy.select(&formats).unwrap().itag, 18);
    }

    #[test]
    fn test_policy_selection() {
        let formats = vec![fmt(18, "medium", true).with_size(10), fmt(37, "hd1080", true).with_size(99)];

        assert_eq!(FormatPolicy::Preferred.selection().select(&formats).unwrap().itag, 18);
        assert_eq!(FormatPolicy::Best.selection().select(&formats).unwrap().itag, 37);
        assert_eq!(FormatPolicy::Smallest.selection().select(&formats).unwrap().itag, 18);
    }
}
