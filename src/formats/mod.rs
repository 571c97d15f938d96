//! Export formats and selection parsing

use std::fmt;

/// An export format from the selection menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Mp4,
    Mkv,
    Mov,
    Mp3,
}

impl ExportFormat {
    /// Menu order, also the order formats are offered interactively.
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Mp4,
        ExportFormat::Mkv,
        ExportFormat::Mov,
        ExportFormat::Mp3,
    ];

    pub fn from_menu_key(key: &str) -> Option<Self> {
        match key {
            "1" => Some(ExportFormat::Mp4),
            "2" => Some(ExportFormat::Mkv),
            "3" => Some(ExportFormat::Mov),
            "4" => Some(ExportFormat::Mp3),
            _ => None,
        }
    }

    pub fn menu_key(&self) -> &'static str {
        match self {
            ExportFormat::Mp4 => "1",
            ExportFormat::Mkv => "2",
            ExportFormat::Mov => "3",
            ExportFormat::Mp3 => "4",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Mp4 => "Video MP4 (default)",
            ExportFormat::Mkv => "Video MKV",
            ExportFormat::Mov => "Video MOV",
            ExportFormat::Mp3 => "Audio MP3 (audio-only)",
        }
    }

    /// Fixed output extension; distinct per format so jobs never collide.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Mp4 => "mp4",
            ExportFormat::Mkv => "mkv",
            ExportFormat::Mov => "mov",
            ExportFormat::Mp3 => "mp3",
        }
    }

    pub fn is_audio_only(&self) -> bool {
        matches!(self, ExportFormat::Mp3)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A parsed format selection: non-empty, deduplicated, order-preserving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelection {
    pub formats: Vec<ExportFormat>,
    /// Tokens that matched no menu entry (reported, then ignored)
    pub ignored: Vec<String>,
}

impl FormatSelection {
    /// Parses menu tokens, split on whitespace and commas. Duplicates keep
    /// their first position; an empty or all-unknown selection falls back
    /// to MP4.
    pub fn parse(raw: &str) -> Self {
        let mut formats = Vec::new();
        let mut ignored = Vec::new();

        for token in raw
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            match ExportFormat::from_menu_key(token) {
                Some(format) => {
                    if !formats.contains(&format) {
                        formats.push(format);
                    }
                }
                None => ignored.push(token.to_string()),
            }
        }

        if formats.is_empty() {
            formats.push(ExportFormat::Mp4);
        }

        Self { formats, ignored }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_multiple_tokens() {
        assert_eq!(
            FormatSelection::parse("1 4").formats,
            vec![ExportFormat::Mp4, ExportFormat::Mp3]
        );
        assert_eq!(FormatSelection::parse("3").formats, vec![ExportFormat::Mov]);
    }

    #[test]
    fn test_commas_and_duplicates() {
        let selection = FormatSelection::parse("2,4,2");
        assert_eq!(selection.formats, vec![ExportFormat::Mkv, ExportFormat::Mp3]);
        assert!(selection.ignored.is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        assert_eq!(
            FormatSelection::parse("4 1").formats,
            vec![ExportFormat::Mp3, ExportFormat::Mp4]
        );
    }

    #[test]
    fn test_empty_defaults_to_mp4() {
        assert_eq!(FormatSelection::parse("").formats, vec![ExportFormat::Mp4]);
        assert_eq!(FormatSelection::parse("  ").formats, vec![ExportFormat::Mp4]);
    }

    #[test]
    fn test_unknown_tokens_are_reported_and_ignored() {
        let selection = FormatSelection::parse("x y");
        assert_eq!(selection.formats, vec![ExportFormat::Mp4]);
        assert_eq!(selection.ignored, vec!["x".to_string(), "y".to_string()]);

        let mixed = FormatSelection::parse("2 nope");
        assert_eq!(mixed.formats, vec![ExportFormat::Mkv]);
        assert_eq!(mixed.ignored, vec!["nope".to_string()]);
    }

    #[test]
    fn test_extensions_are_distinct() {
        let mut exts: Vec<&str> = ExportFormat::ALL.iter().map(|f| f.extension()).collect();
        exts.sort_unstable();
        exts.dedup();
        assert_eq!(exts.len(), ExportFormat::ALL.len());
    }

    #[test]
    fn test_audio_only_flag() {
        assert!(ExportFormat::Mp3.is_audio_only());
        assert!(!ExportFormat::Mp4.is_audio_only());
        assert!(!ExportFormat::Mkv.is_audio_only());
    }
}
