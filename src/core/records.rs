//! Workspace form, generation records and the exported text report.

use chrono::{DateTime, Local};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Number of damage-description characters shown in history previews.
pub const DAMAGE_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtworkType {
    Painting,
    Sculpture,
    Manuscript,
    Textile,
    Mural,
}

impl ArtworkType {
    pub const ALL: [ArtworkType; 5] = [
        ArtworkType::Painting,
        ArtworkType::Sculpture,
        ArtworkType::Manuscript,
        ArtworkType::Textile,
        ArtworkType::Mural,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArtworkType::Painting => "Painting",
            ArtworkType::Sculpture => "Sculpture",
            ArtworkType::Manuscript => "Manuscript",
            ArtworkType::Textile => "Textile",
            ArtworkType::Mural => "Mural",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    RestorationTechnique,
    StylisticReconstruction,
    SymbolInterpretation,
    VisitorSummary,
    ConservationAdvice,
}

impl OutputType {
    pub const ALL: [OutputType; 5] = [
        OutputType::RestorationTechnique,
        OutputType::StylisticReconstruction,
        OutputType::SymbolInterpretation,
        OutputType::VisitorSummary,
        OutputType::ConservationAdvice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputType::RestorationTechnique => "Restoration Technique",
            OutputType::StylisticReconstruction => "Stylistic Reconstruction",
            OutputType::SymbolInterpretation => "Symbol Interpretation",
            OutputType::VisitorSummary => "Visitor Summary",
            OutputType::ConservationAdvice => "Conservation Advice",
        }
    }
}

macro_rules! impl_choice {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        /// Accepts the display name (any case) or its 1-based position in the list.
        impl FromStr for $ty {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let value = value.trim();
                if let Ok(index) = value.parse::<usize>() {
                    if let Some(choice) = index.checked_sub(1).and_then(|i| <$ty>::ALL.get(i)) {
                        return Ok(*choice);
                    }
                }
                <$ty>::ALL
                    .into_iter()
                    .find(|choice| choice.as_str().eq_ignore_ascii_case(value))
                    .ok_or_else(|| format!("Unknown {}: {value}", $what))
            }
        }
    };
}

impl_choice!(ArtworkType, "artwork type");
impl_choice!(OutputType, "output type");

/// Inputs of the restoration workspace form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestorationForm {
    pub artwork_type: Option<ArtworkType>,
    pub period: String,
    pub artist: String,
    pub region: String,
    pub damage: String,
    pub output_type: Option<OutputType>,
}

/// A form whose required fields are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorationRequest {
    pub artwork_type: ArtworkType,
    pub period: String,
    pub artist: String,
    pub region: String,
    pub damage: String,
    pub output_type: OutputType,
}

impl RestorationForm {
    /// Artwork type, damage description and output type are required.
    pub fn validate(self) -> Result<RestorationRequest, String> {
        match (self.artwork_type, self.output_type) {
            (Some(artwork_type), Some(output_type)) if !self.damage.trim().is_empty() => {
                Ok(RestorationRequest {
                    artwork_type,
                    period: self.period,
                    artist: self.artist,
                    region: self.region,
                    damage: self.damage,
                    output_type,
                })
            }
            _ => Err("Please fill in all required fields".to_string()),
        }
    }
}

impl RestorationRequest {
    /// Prompt body sent after the profile header.
    pub fn prompt_body(&self) -> String {
        format!(
            "Artwork: {}\nPeriod: {}\nArtist: {}\nRegion: {}\nDamage: {}\nOutput: {}\n\nProvide detailed restoration guidance.",
            self.artwork_type, self.period, self.artist, self.region, self.damage, self.output_type
        )
    }

    pub fn into_record(self, response: String, created_at: DateTime<Local>) -> GenerationRecord {
        GenerationRecord {
            artwork_type: self.artwork_type,
            period: self.period,
            artist: self.artist,
            region: self.region,
            damage: self.damage,
            output_type: self.output_type,
            response,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRecord {
    pub artwork_type: ArtworkType,
    pub period: String,
    pub artist: String,
    pub region: String,
    pub damage: String,
    pub output_type: OutputType,
    pub response: String,
    pub created_at: DateTime<Local>,
}

impl GenerationRecord {
    /// `"<artwork> - <YYYY-MM-DD HH:MM>"`, as listed in history.
    pub fn title(&self) -> String {
        format!(
            "{} - {}",
            self.artwork_type,
            self.created_at.format("%Y-%m-%d %H:%M")
        )
    }

    /// First [`DAMAGE_PREVIEW_CHARS`] characters of the damage text followed by `...`.
    pub fn damage_preview(&self) -> String {
        let preview: String = self.damage.chars().take(DAMAGE_PREVIEW_CHARS).collect();
        format!("{preview}...")
    }
}

/// A text report ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedReport {
    pub filename: String,
    pub contents: String,
}

impl ExportedReport {
    /// Render `record`; the filename carries the export date, not the record's.
    pub fn build(record: &GenerationRecord, exported_at: DateTime<Local>) -> Self {
        let contents = format!(
            "ArtRestorer AI Report\nTime: {}\nArtwork: {}\nPeriod: {}\nDamage: {}\n\n{}",
            record.created_at.format("%Y-%m-%d %H:%M:%S%.6f"),
            record.artwork_type,
            record.period,
            record.damage,
            record.response
        );
        Self {
            filename: format!("restoration_{}.txt", exported_at.format("%Y%m%d")),
            contents,
        }
    }

    /// Write the report into `dir`, creating it if needed. Same-day exports overwrite.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.contents)?;
        info!(path = %path.display(), bytes = self.contents.len(), "Exported report");
        Ok(path)
    }
}
