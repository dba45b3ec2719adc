//! Fixed reference text for the Art Guide and Ethics panels.

/// A titled block of reference text. Entries with a label render as `label: text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideSection {
    pub title: &'static str,
    pub entries: &'static [GuideEntry],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideEntry {
    pub label: Option<&'static str>,
    pub text: &'static str,
}

const fn labeled(label: &'static str, text: &'static str) -> GuideEntry {
    GuideEntry {
        label: Some(label),
        text,
    }
}

const fn plain(text: &'static str) -> GuideEntry {
    GuideEntry { label: None, text }
}

pub const ART_GUIDE: &[GuideSection] = &[
    GuideSection {
        title: "Major Art Periods",
        entries: &[
            labeled("Ancient (3000 BCE - 400 CE)", "Egyptian, Greek, Roman"),
            labeled("Medieval (400 - 1400)", "Byzantine, Romanesque, Gothic"),
            labeled(
                "Renaissance (1400 - 1600)",
                "Linear perspective, naturalism, humanism",
            ),
            labeled("Baroque (1600 - 1750)", "Drama, movement, rich color"),
            labeled(
                "Modern (1850 - 1970)",
                "Impressionism, Expressionism, Cubism, Abstract",
            ),
            labeled(
                "Contemporary (1970 - Present)",
                "Diverse movements, new media",
            ),
        ],
    },
    GuideSection {
        title: "Common Damage Types",
        entries: &[
            labeled("Paint Layer Damage", "Cracking, flaking, blistering"),
            labeled("Canvas Issues", "Tears, punctures, sagging"),
            labeled("Environmental", "Water stains, mold growth"),
            labeled("Chemical", "Darkened varnish, oxidation"),
            labeled("Physical", "Scratches, broken fragments"),
        ],
    },
    GuideSection {
        title: "Ethical Principles",
        entries: &[
            plain("Respect for Authenticity"),
            plain("Minimal Intervention"),
            plain("Reversibility"),
            plain("Documentation"),
            plain("Cultural Sensitivity"),
            plain("Professional Competence"),
        ],
    },
];

pub const ETHICS: &[GuideSection] = &[
    GuideSection {
        title: "Educational Purpose",
        entries: &[plain(
            "This is an educational tool for museums, students, and researchers. NOT for direct physical restoration.",
        )],
    },
    GuideSection {
        title: "AI Limitations",
        entries: &[plain(
            "AI cannot assess actual materials, perform scientific analysis, or replace trained conservators.",
        )],
    },
    GuideSection {
        title: "Cultural Respect",
        entries: &[plain(
            "We respect cultural contexts and encourage community consultation.",
        )],
    },
    GuideSection {
        title: "Responsible AI",
        entries: &[plain(
            "AI assists but humans make final decisions. Always consult professional conservators.",
        )],
    },
];

impl GuideEntry {
    pub fn render(&self) -> String {
        match self.label {
            Some(label) => format!("{label}: {}", self.text),
            None => self.text.to_string(),
        }
    }
}

/// Plain-text rendering: section titles followed by bulleted entries.
pub fn render_sections(sections: &[GuideSection]) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, section) in sections.iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }
        lines.push(section.title.to_string());
        lines.extend(
            section
                .entries
                .iter()
                .map(|entry| format!("  • {}", entry.render())),
        );
    }
    lines
}
