//! Document composer: turns a [`CvDocument`] into one LaTeX source string.
//!
//! The composer walks `section_order`, collects the non-empty fragments the
//! section renderers produce, joins them with a single blank line and wraps
//! the result in a fixed preamble/trailer. It is deterministic: structurally
//! identical input yields byte-identical output.

use crate::latex::sections::render_section;
use crate::models::cv::CvDocument;

/// Fixed document preamble: class, packages and the spacing/typography macros
/// the section renderers rely on. One canonical template, no variants.
const PREAMBLE: &str = r"\documentclass[11pt,a4paper]{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage[margin=0.75in]{geometry}
\usepackage{enumitem}
\usepackage{titlesec}
\usepackage[hidelinks]{hyperref}
\usepackage{xcolor}

\pagestyle{empty}
\setlength{\parindent}{0pt}
\setlist[itemize]{leftmargin=1.2em, itemsep=1pt, topsep=2pt, parsep=0pt}
\titleformat{\section}{\large\bfseries\scshape}{}{0em}{}[\titlerule]
\titlespacing*{\section}{0pt}{10pt}{6pt}
\renewcommand{\baselinestretch}{1.05}

\begin{document}
";

const TRAILER: &str = "\n\\end{document}\n";

/// Composes the full LaTeX document. Skipped sections (no data, no renderer)
/// contribute nothing, in particular no extra blank separator lines.
pub fn compose(document: &CvDocument) -> String {
    let fragments: Vec<String> = document
        .section_order()
        .iter()
        .filter_map(|key| render_section(key, &document.sections))
        .filter(|fragment| !fragment.is_empty())
        .collect();

    let mut out = String::with_capacity(PREAMBLE.len() + TRAILER.len() + 64);
    out.push_str(PREAMBLE);
    out.push_str(&fragments.join("\n\n"));
    out.push_str(TRAILER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::{
        CvMetadata, CvSections, Header, ItemSection, SkillCategory, SkillsSection, Summary,
    };

    fn order(keys: &[&str]) -> CvMetadata {
        CvMetadata {
            section_order: Some(keys.iter().map(|k| k.to_string()).collect()),
        }
    }

    #[test]
    fn test_compose_without_section_order_is_shell_only() {
        let doc = CvDocument::default();
        let out = compose(&doc);
        assert!(out.starts_with("\\documentclass"));
        assert!(out.ends_with("\\end{document}\n"));
        assert!(!out.contains("\\section"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let doc = sample_doc();
        assert_eq!(compose(&doc), compose(&doc.clone()));
    }

    #[test]
    fn test_skipped_sections_leave_no_double_blank_lines() {
        // summary is listed in the order but carries no data; the fragments on
        // either side of it must be joined by exactly one blank line.
        let doc = sample_doc();
        let out = compose(&doc);
        assert!(!out.contains("\n\n\n"), "double separator in {out:?}");
    }

    #[test]
    fn test_unknown_keys_are_skipped_silently() {
        let mut doc = sample_doc();
        doc.metadata = order(&["header", "hobbies-unknown", "skills"]);
        let out = compose(&doc);
        assert!(out.contains("Jane Doe"));
        assert!(out.contains("Rust | Go"));
    }

    #[test]
    fn test_end_to_end_header_summary_skills_scenario() {
        // header present (name only), summary listed but missing, skills with
        // one category of two items.
        let doc = sample_doc();
        let out = compose(&doc);

        assert!(out.contains("Jane Doe"));
        assert!(!out.contains("\\section{Summary}"));
        assert!(out.contains("Rust | Go"));

        // Order is preserved: header before skills.
        let header_at = out.find("Jane Doe").unwrap();
        let skills_at = out.find("\\section{Skills}").unwrap();
        assert!(header_at < skills_at);
    }

    #[test]
    fn test_summary_with_content_renders_between_header_and_skills() {
        let mut doc = sample_doc();
        doc.sections.summary = Some(Summary {
            section_title: None,
            content: Some("Ten years of systems work.".to_string()),
        });
        let out = compose(&doc);
        assert!(out.contains("\\section{Summary}"));
        assert!(out.contains("Ten years of systems work."));
    }

    fn sample_doc() -> CvDocument {
        CvDocument {
            metadata: order(&["header", "summary", "skills"]),
            sections: CvSections {
                header: Some(Header {
                    name: "Jane Doe".to_string(),
                    ..Header::default()
                }),
                summary: None,
                skills: Some(SkillsSection {
                    section_title: None,
                    categories: vec![SkillCategory {
                        name: None,
                        items: vec!["Rust".to_string(), "Go".to_string()],
                    }],
                }),
                ..CvSections::default()
            },
        }
    }

    #[test]
    fn test_experience_defaults_are_inert() {
        let mut doc = CvDocument::default();
        doc.metadata = order(&["experience"]);
        doc.sections.experience = Some(ItemSection::default());
        let out = compose(&doc);
        assert!(!out.contains("\\section{Experience}"));
    }
}
