//! Description section splitting
//!
//! Detail pages carry one long free-text description block. Downstream
//! consumers want that text broken into labelled sections (requirements,
//! benefits, and so on). The split is heading-driven: a short line that
//! matches a known heading synonym opens a new bucket, and everything up
//! to the next heading lands in it.

/// Labelled slices of a listing's long-form description
///
/// Every field is optional: a section is only populated when the source
/// text actually contained a matching heading with content under it.
/// Text before the first recognized heading becomes the description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sections {
    pub description: Option<String>,
    pub responsibilities: Option<String>,
    pub requirements: Option<String>,
    pub tech_stack: Option<String>,
    pub benefits: Option<String>,
    pub salary: Option<String>,
}

impl Sections {
    /// Returns true if no section holds any text
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.responsibilities.is_none()
            && self.requirements.is_none()
            && self.tech_stack.is_none()
            && self.benefits.is_none()
            && self.salary.is_none()
    }
}

/// Strategy for splitting description text into sections
///
/// The splitting heuristics are behind a trait so a source with different
/// page conventions can swap in its own rules without touching the
/// enrichment flow.
pub trait SectionNormalizer: Send + Sync {
    /// Splits raw description text into labelled sections
    fn split(&self, text: &str) -> Sections;
}

/// Target bucket for a recognized heading line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Description,
    Responsibilities,
    Requirements,
    TechStack,
    Benefits,
    Salary,
}

/// Heading synonyms per bucket, matched case-insensitively
///
/// A heading line may carry a trailing colon; it is stripped before
/// matching. Lines longer than `MAX_HEADING_LEN` are never treated as
/// headings even when they start with a synonym.
const HEADING_SYNONYMS: &[(Bucket, &[&str])] = &[
    (
        Bucket::Responsibilities,
        &["responsibilities", "what you'll do", "what you will do", "your role", "the role"],
    ),
    (
        Bucket::Requirements,
        &[
            "requirements",
            "qualifications",
            "what we're looking for",
            "what we are looking for",
            "who you are",
        ],
    ),
    (
        Bucket::TechStack,
        &["tech stack", "our stack", "technologies", "technology stack"],
    ),
    (
        Bucket::Benefits,
        &["benefits", "perks", "what we offer", "perks and benefits"],
    ),
    (
        Bucket::Salary,
        &["salary", "compensation", "salary and compensation", "pay"],
    ),
];

const MAX_HEADING_LEN: usize = 60;

/// Default heading-driven section splitter
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingSplitter;

impl HeadingSplitter {
    /// Classifies a line as a heading, returning its target bucket
    fn heading_bucket(line: &str) -> Option<Bucket> {
        if line.len() > MAX_HEADING_LEN {
            return None;
        }
        let normalized = line.trim_end_matches(':').trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        for (bucket, synonyms) in HEADING_SYNONYMS {
            if synonyms.iter().any(|s| *s == normalized) {
                return Some(*bucket);
            }
        }
        None
    }
}

impl SectionNormalizer for HeadingSplitter {
    fn split(&self, text: &str) -> Sections {
        let mut buckets: [Vec<&str>; 6] = Default::default();
        let mut current = Bucket::Description;

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(bucket) = Self::heading_bucket(line) {
                current = bucket;
                continue;
            }
            buckets[current as usize].push(line);
        }

        let collect = |bucket: Bucket| -> Option<String> {
            let lines = &buckets[bucket as usize];
            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        };

        Sections {
            description: collect(Bucket::Description),
            responsibilities: collect(Bucket::Responsibilities),
            requirements: collect(Bucket::Requirements),
            tech_stack: collect(Bucket::TechStack),
            benefits: collect(Bucket::Benefits),
            salary: collect(Bucket::Salary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_text_is_all_description() {
        let sections = HeadingSplitter.split("We build tools.\nRemote first.");
        assert_eq!(
            sections.description.as_deref(),
            Some("We build tools.\nRemote first.")
        );
        assert!(sections.requirements.is_none());
        assert!(sections.benefits.is_none());
    }

    #[test]
    fn test_split_by_headings() {
        let text = "We build tools.\n\
                    Requirements\n\
                    5 years of Rust.\n\
                    Async experience.\n\
                    Benefits\n\
                    Health insurance.";
        let sections = HeadingSplitter.split(text);
        assert_eq!(sections.description.as_deref(), Some("We build tools."));
        assert_eq!(
            sections.requirements.as_deref(),
            Some("5 years of Rust.\nAsync experience.")
        );
        assert_eq!(sections.benefits.as_deref(), Some("Health insurance."));
        assert!(sections.salary.is_none());
    }

    #[test]
    fn test_heading_match_is_case_insensitive_and_strips_colon() {
        let text = "Intro.\nREQUIREMENTS:\nRust.\nPerks:\nSnacks.";
        let sections = HeadingSplitter.split(text);
        assert_eq!(sections.requirements.as_deref(), Some("Rust."));
        assert_eq!(sections.benefits.as_deref(), Some("Snacks."));
    }

    #[test]
    fn test_synonyms_map_to_same_bucket() {
        let text = "Qualifications\nRust.\nCompensation\n$100k.";
        let sections = HeadingSplitter.split(text);
        assert_eq!(sections.requirements.as_deref(), Some("Rust."));
        assert_eq!(sections.salary.as_deref(), Some("$100k."));
    }

    #[test]
    fn test_long_line_starting_with_synonym_is_not_a_heading() {
        let text = "Requirements for this role are long and varied, including years of writing production services.";
        let sections = HeadingSplitter.split(text);
        assert!(sections.requirements.is_none());
        assert!(sections.description.is_some());
    }

    #[test]
    fn test_repeated_heading_appends() {
        let text = "Benefits\nHealth.\nRequirements\nRust.\nBenefits\nDental.";
        let sections = HeadingSplitter.split(text);
        assert_eq!(sections.benefits.as_deref(), Some("Health.\nDental."));
        assert_eq!(sections.requirements.as_deref(), Some("Rust."));
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let text = "One.\n\n\nTwo.\n";
        let sections = HeadingSplitter.split(text);
        assert_eq!(sections.description.as_deref(), Some("One.\nTwo."));
    }

    #[test]
    fn test_empty_input_yields_empty_sections() {
        let sections = HeadingSplitter.split("");
        assert!(sections.is_empty());
    }

    #[test]
    fn test_heading_only_input_yields_empty_sections() {
        let sections = HeadingSplitter.split("Requirements\n");
        assert!(sections.is_empty());
    }

    #[test]
    fn test_tech_stack_bucket() {
        let text = "Tech Stack\nRust, Postgres, NATS.";
        let sections = HeadingSplitter.split(text);
        assert_eq!(sections.tech_stack.as_deref(), Some("Rust, Postgres, NATS."));
    }
}
