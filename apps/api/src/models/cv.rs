//! Typed CV document schema.
//!
//! The LLM structuring call is instructed to return exactly this shape, and
//! the response is validated here, at the boundary, via serde. Renderers
//! downstream never touch raw JSON. Every field except `header.name` is
//! optional: missing data is rendered by omission, not rejected.

use serde::{Deserialize, Serialize};

/// Root resume entity: a rendering order plus one optional payload per
/// known section kind.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CvDocument {
    #[serde(default)]
    pub metadata: CvMetadata,
    #[serde(default)]
    pub sections: CvSections,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CvMetadata {
    /// Section keys in rendering order. Keys without data (or without a
    /// registered renderer) are skipped silently. Absent order means an
    /// empty document body.
    #[serde(default)]
    pub section_order: Option<Vec<String>>,
}

/// One optional field per section kind. Unknown keys in `section_order`
/// simply have no corresponding field and render nothing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CvSections {
    pub header: Option<Header>,
    pub summary: Option<Summary>,
    pub experience: Option<ItemSection<ExperienceItem>>,
    pub education: Option<ItemSection<EducationItem>>,
    pub skills: Option<SkillsSection>,
    pub projects: Option<ItemSection<ProjectItem>>,
    pub certifications: Option<ItemSection<CertificationItem>>,
    pub courses: Option<ItemSection<CourseItem>>,
    pub languages: Option<ItemSection<LanguageItem>>,
    pub volunteer: Option<ItemSection<VolunteerItem>>,
    pub awards: Option<ItemSection<AwardItem>>,
    pub publications: Option<ItemSection<PublicationItem>>,
    pub interests: Option<InlineListSection>,
    pub references: Option<ItemSection<ReferenceItem>>,
    pub achievements: Option<GenericSection>,
    pub patents: Option<GenericSection>,
    pub research: Option<GenericSection>,
    pub custom: Option<GenericSection>,
}

/// Titled list of typed items, the common shape for most sections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ItemSection<T> {
    pub section_title: Option<String>,
    pub items: Vec<T>,
}

/// Contact block. `name` is the only required field in the whole schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    pub name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: None,
            email: None,
            phone: None,
            location: None,
            website: None,
            linkedin: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Summary {
    pub section_title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExperienceItem {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub achievements: Vec<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EducationItem {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub gpa: Option<String>,
    pub honors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SkillsSection {
    pub section_title: Option<String>,
    pub categories: Vec<SkillCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SkillCategory {
    pub name: Option<String>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub achievements: Vec<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CertificationItem {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CourseItem {
    pub name: Option<String>,
    pub provider: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LanguageItem {
    pub language: Option<String>,
    pub proficiency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VolunteerItem {
    pub organization: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AwardItem {
    pub title: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PublicationItem {
    pub title: Option<String>,
    pub venue: Option<String>,
    pub date: Option<String>,
    pub url: Option<String>,
}

/// Sections rendered as a single pipe-joined line (interests).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InlineListSection {
    pub section_title: Option<String>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReferenceItem {
    pub name: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Catch-all shape for achievements, patents, research and custom sections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenericSection {
    pub section_title: Option<String>,
    pub items: Vec<GenericItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenericItem {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub details: Vec<String>,
}

impl CvDocument {
    /// Rendering order, defaulting to an empty sequence when absent.
    pub fn section_order(&self) -> &[String] {
        self.metadata
            .section_order
            .as_deref()
            .unwrap_or_default()
    }

    /// Boundary validation beyond what serde enforces structurally: a header
    /// that is present must carry a non-empty name.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(header) = &self.sections.header {
            if header.name.trim().is_empty() {
                return Err("header section requires a non-empty name".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_deserializes() {
        let json = serde_json::json!({
            "metadata": { "section_order": ["header", "skills"] },
            "sections": {
                "header": { "name": "Jane Doe" },
                "skills": {
                    "categories": [ { "name": "Languages", "items": ["Rust", "Go"] } ]
                }
            }
        });
        let doc: CvDocument = serde_json::from_value(json).unwrap();
        assert_eq!(doc.section_order(), ["header", "skills"]);
        assert_eq!(doc.sections.header.unwrap().name, "Jane Doe");
        assert_eq!(doc.sections.skills.unwrap().categories[0].items.len(), 2);
        assert!(doc.sections.summary.is_none());
    }

    #[test]
    fn test_missing_section_order_defaults_to_empty() {
        let doc: CvDocument = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(doc.section_order().is_empty());
    }

    #[test]
    fn test_unknown_item_fields_are_ignored() {
        // LLM responses routinely carry extra keys; they must not fail parsing.
        let json = serde_json::json!({
            "sections": {
                "experience": {
                    "items": [
                        { "title": "Engineer", "confidence": 0.93, "misc": ["x"] }
                    ]
                }
            }
        });
        let doc: CvDocument = serde_json::from_value(json).unwrap();
        assert_eq!(
            doc.sections.experience.unwrap().items[0].title.as_deref(),
            Some("Engineer")
        );
    }

    #[test]
    fn test_validate_rejects_blank_header_name() {
        let doc = CvDocument {
            sections: CvSections {
                header: Some(Header {
                    name: "   ".to_string(),
                    ..Header::default()
                }),
                ..CvSections::default()
            },
            ..CvDocument::default()
        };
        assert!(doc.validate().is_err());
    }
}
