//! Section renderers: one pure function per CV section kind.
//!
//! Contract: `(Option<&T>) -> String`, where an absent section, an absent
//! list, or a list whose items all render empty yields the empty string.
//! "Hide empty sections" is implemented here by omission; the composer never
//! checks flags. No renderer performs I/O or carries state.

use crate::latex::escape::{date_range, escape, format_date, hyperlink};
use crate::models::cv::{
    AwardItem, CertificationItem, CourseItem, CvSections, EducationItem, ExperienceItem,
    GenericSection, Header, InlineListSection, ItemSection, LanguageItem, ProjectItem,
    PublicationItem, ReferenceItem, SkillsSection, Summary, VolunteerItem,
};

/// Separator used for inline item lists (skills categories, interests).
pub const INLINE_SEP: &str = " | ";

/// Dispatches a `section_order` key to its renderer. Unknown keys return
/// `None` and are skipped by the composer without error.
pub fn render_section(key: &str, sections: &CvSections) -> Option<String> {
    let fragment = match key {
        "header" => render_header(sections.header.as_ref()),
        "summary" => render_summary(sections.summary.as_ref()),
        "experience" => render_experience(sections.experience.as_ref()),
        "education" => render_education(sections.education.as_ref()),
        "skills" => render_skills(sections.skills.as_ref()),
        "projects" => render_projects(sections.projects.as_ref()),
        "certifications" => render_certifications(sections.certifications.as_ref()),
        "courses" => render_courses(sections.courses.as_ref()),
        "languages" => render_languages(sections.languages.as_ref()),
        "volunteer" => render_volunteer(sections.volunteer.as_ref()),
        "awards" => render_awards(sections.awards.as_ref()),
        "publications" => render_publications(sections.publications.as_ref()),
        "interests" => render_interests(sections.interests.as_ref()),
        "references" => render_references(sections.references.as_ref()),
        "achievements" => render_generic(sections.achievements.as_ref(), "Achievements"),
        "patents" => render_generic(sections.patents.as_ref(), "Patents"),
        "research" => render_generic(sections.research.as_ref(), "Research"),
        "custom" => render_generic(sections.custom.as_ref(), "Additional"),
        _ => return None,
    };
    Some(fragment)
}

pub fn render_header(header: Option<&Header>) -> String {
    let Some(header) = header else {
        return String::new();
    };
    if header.name.trim().is_empty() {
        return String::new();
    }

    let mut lines = vec![format!(
        "    {{\\Huge \\textbf{{{}}}}}",
        escape(header.name.trim())
    )];

    if let Some(title) = non_empty(header.title.as_deref()) {
        lines.push(format!("    {{\\large {}}}", escape(title)));
    }

    let mut contact: Vec<String> = Vec::new();
    if let Some(email) = non_empty(header.email.as_deref()) {
        contact.push(hyperlink(Some(email), Some(&format!("mailto:{email}"))));
    }
    if let Some(phone) = non_empty(header.phone.as_deref()) {
        contact.push(escape(phone));
    }
    if let Some(location) = non_empty(header.location.as_deref()) {
        contact.push(escape(location));
    }
    if let Some(website) = non_empty(header.website.as_deref()) {
        contact.push(hyperlink(Some(website), Some(website)));
    }
    if let Some(linkedin) = non_empty(header.linkedin.as_deref()) {
        contact.push(hyperlink(Some("LinkedIn"), Some(linkedin)));
    }
    if !contact.is_empty() {
        lines.push(format!("    {}", contact.join(INLINE_SEP)));
    }

    format!(
        "\\begin{{center}}\n{}\n\\end{{center}}",
        lines.join(" \\\\[2pt]\n")
    )
}

pub fn render_summary(summary: Option<&Summary>) -> String {
    let Some(summary) = summary else {
        return String::new();
    };
    let Some(content) = non_empty(summary.content.as_deref()) else {
        return String::new();
    };
    format!(
        "{}\n{}",
        heading(summary.section_title.as_deref(), "Summary"),
        escape(content)
    )
}

pub fn render_experience(section: Option<&ItemSection<ExperienceItem>>) -> String {
    titled_list(section, "Experience", |item: &ExperienceItem| {
        let headline = entry_headline(
            item.title.as_deref(),
            item.company.as_deref(),
            date_range(item.start_date.as_deref(), item.end_date.as_deref()),
            item.location.as_deref(),
        );
        if headline.is_empty() {
            return String::new();
        }
        let mut block = headline;
        push_itemize(&mut block, &item.achievements);
        push_tech_line(&mut block, &item.technologies);
        block
    })
}

pub fn render_education(section: Option<&ItemSection<EducationItem>>) -> String {
    titled_list(section, "Education", |item: &EducationItem| {
        let degree = match (
            non_empty(item.degree.as_deref()),
            non_empty(item.field.as_deref()),
        ) {
            (Some(d), Some(f)) => Some(format!("{d}, {f}")),
            (Some(d), None) => Some(d.to_string()),
            (None, Some(f)) => Some(f.to_string()),
            (None, None) => None,
        };
        let headline = entry_headline(
            degree.as_deref(),
            item.institution.as_deref(),
            date_range(item.start_date.as_deref(), item.end_date.as_deref()),
            item.location.as_deref(),
        );
        if headline.is_empty() {
            return String::new();
        }
        let mut block = headline;
        let mut details: Vec<String> = Vec::new();
        if let Some(gpa) = non_empty(item.gpa.as_deref()) {
            details.push(format!("GPA: {}", gpa));
        }
        details.extend(item.honors.iter().filter_map(|h| non_empty(Some(h)).map(String::from)));
        push_itemize(&mut block, &details);
        block
    })
}

pub fn render_skills(section: Option<&SkillsSection>) -> String {
    let Some(section) = section else {
        return String::new();
    };
    let lines: Vec<String> = section
        .categories
        .iter()
        .filter_map(|category| {
            let items: Vec<String> = category
                .items
                .iter()
                .filter_map(|i| non_empty(Some(i)))
                .map(escape)
                .collect();
            if items.is_empty() {
                return None;
            }
            let joined = items.join(INLINE_SEP);
            match non_empty(category.name.as_deref()) {
                Some(name) => Some(format!("\\textbf{{{}}}: {}", escape(name), joined)),
                None => Some(joined),
            }
        })
        .collect();

    if lines.is_empty() {
        return String::new();
    }
    format!(
        "{}\n{}",
        heading(section.section_title.as_deref(), "Skills"),
        lines.join(" \\\\\n")
    )
}

pub fn render_projects(section: Option<&ItemSection<ProjectItem>>) -> String {
    titled_list(section, "Projects", |item: &ProjectItem| {
        let name = match (non_empty(item.name.as_deref()), non_empty(item.url.as_deref())) {
            (Some(name), Some(url)) => hyperlink(Some(name), Some(url)),
            (Some(name), None) => format!("\\textbf{{{}}}", escape(name)),
            _ => return String::new(),
        };
        let dates = date_range(item.start_date.as_deref(), item.end_date.as_deref());
        let mut block = if dates.is_empty() {
            format!("\\noindent {}\\par", name)
        } else {
            format!("\\noindent {} \\hfill {{\\small {}}}\\par", name, dates)
        };
        if let Some(description) = non_empty(item.description.as_deref()) {
            block.push_str(&format!("\n{}\\par", escape(description)));
        }
        push_itemize(&mut block, &item.achievements);
        push_tech_line(&mut block, &item.technologies);
        block
    })
}

pub fn render_certifications(section: Option<&ItemSection<CertificationItem>>) -> String {
    titled_list(section, "Certifications", |item: &CertificationItem| {
        let Some(name) = non_empty(item.name.as_deref()) else {
            return String::new();
        };
        let name = match non_empty(item.url.as_deref()) {
            Some(url) => hyperlink(Some(name), Some(url)),
            None => format!("\\textbf{{{}}}", escape(name)),
        };
        let mut parts = vec![name];
        if let Some(issuer) = non_empty(item.issuer.as_deref()) {
            parts.push(escape(issuer));
        }
        if let Some(date) = non_empty(item.date.as_deref()) {
            parts.push(format_date(Some(date)));
        }
        format!("\\noindent {}\\par", parts.join(" --- "))
    })
}

pub fn render_courses(section: Option<&ItemSection<CourseItem>>) -> String {
    titled_list(section, "Courses", |item: &CourseItem| {
        let Some(name) = non_empty(item.name.as_deref()) else {
            return String::new();
        };
        let mut parts = vec![escape(name)];
        if let Some(provider) = non_empty(item.provider.as_deref()) {
            parts.push(escape(provider));
        }
        if let Some(date) = non_empty(item.date.as_deref()) {
            parts.push(format_date(Some(date)));
        }
        format!("\\noindent {}\\par", parts.join(" --- "))
    })
}

pub fn render_languages(section: Option<&ItemSection<LanguageItem>>) -> String {
    let Some(section) = section else {
        return String::new();
    };
    let entries: Vec<String> = section
        .items
        .iter()
        .filter_map(|item| {
            let language = non_empty(item.language.as_deref())?;
            Some(match non_empty(item.proficiency.as_deref()) {
                Some(level) => format!("{} ({})", escape(language), escape(level)),
                None => escape(language),
            })
        })
        .collect();
    if entries.is_empty() {
        return String::new();
    }
    format!(
        "{}\n{}",
        heading(section.section_title.as_deref(), "Languages"),
        entries.join(INLINE_SEP)
    )
}

pub fn render_volunteer(section: Option<&ItemSection<VolunteerItem>>) -> String {
    titled_list(section, "Volunteer", |item: &VolunteerItem| {
        let headline = entry_headline(
            item.role.as_deref(),
            item.organization.as_deref(),
            date_range(item.start_date.as_deref(), item.end_date.as_deref()),
            item.location.as_deref(),
        );
        if headline.is_empty() {
            return String::new();
        }
        let mut block = headline;
        push_itemize(&mut block, &item.achievements);
        block
    })
}

pub fn render_awards(section: Option<&ItemSection<AwardItem>>) -> String {
    titled_list(section, "Awards", |item: &AwardItem| {
        let Some(title) = non_empty(item.title.as_deref()) else {
            return String::new();
        };
        let mut parts = vec![format!("\\textbf{{{}}}", escape(title))];
        if let Some(issuer) = non_empty(item.issuer.as_deref()) {
            parts.push(escape(issuer));
        }
        if let Some(date) = non_empty(item.date.as_deref()) {
            parts.push(format_date(Some(date)));
        }
        let mut block = format!("\\noindent {}\\par", parts.join(" --- "));
        if let Some(description) = non_empty(item.description.as_deref()) {
            block.push_str(&format!("\n{}\\par", escape(description)));
        }
        block
    })
}

pub fn render_publications(section: Option<&ItemSection<PublicationItem>>) -> String {
    titled_list(section, "Publications", |item: &PublicationItem| {
        let Some(title) = non_empty(item.title.as_deref()) else {
            return String::new();
        };
        let title = match non_empty(item.url.as_deref()) {
            Some(url) => hyperlink(Some(title), Some(url)),
            None => format!("\\textit{{{}}}", escape(title)),
        };
        let mut parts = vec![title];
        if let Some(venue) = non_empty(item.venue.as_deref()) {
            parts.push(escape(venue));
        }
        if let Some(date) = non_empty(item.date.as_deref()) {
            parts.push(format_date(Some(date)));
        }
        format!("\\noindent {}\\par", parts.join(" --- "))
    })
}

pub fn render_interests(section: Option<&InlineListSection>) -> String {
    let Some(section) = section else {
        return String::new();
    };
    let items: Vec<String> = section
        .items
        .iter()
        .filter_map(|i| non_empty(Some(i)))
        .map(escape)
        .collect();
    if items.is_empty() {
        return String::new();
    }
    format!(
        "{}\n{}",
        heading(section.section_title.as_deref(), "Interests"),
        items.join(INLINE_SEP)
    )
}

pub fn render_references(section: Option<&ItemSection<ReferenceItem>>) -> String {
    titled_list(section, "References", |item: &ReferenceItem| {
        let Some(name) = non_empty(item.name.as_deref()) else {
            return String::new();
        };
        let mut parts = vec![format!("\\textbf{{{}}}", escape(name))];
        match (
            non_empty(item.title.as_deref()),
            non_empty(item.company.as_deref()),
        ) {
            (Some(title), Some(company)) => {
                parts.push(format!("{}, {}", escape(title), escape(company)))
            }
            (Some(title), None) => parts.push(escape(title)),
            (None, Some(company)) => parts.push(escape(company)),
            (None, None) => {}
        }
        if let Some(email) = non_empty(item.email.as_deref()) {
            parts.push(escape(email));
        }
        if let Some(phone) = non_empty(item.phone.as_deref()) {
            parts.push(escape(phone));
        }
        format!("\\noindent {}\\par", parts.join(" --- "))
    })
}

pub fn render_generic(section: Option<&GenericSection>, default_title: &str) -> String {
    let Some(section) = section else {
        return String::new();
    };
    let blocks: Vec<String> = section
        .items
        .iter()
        .filter_map(|item| {
            let mut parts: Vec<String> = Vec::new();
            if let Some(title) = non_empty(item.title.as_deref()) {
                parts.push(format!("\\textbf{{{}}}", escape(title)));
            }
            if let Some(subtitle) = non_empty(item.subtitle.as_deref()) {
                parts.push(escape(subtitle));
            }
            if let Some(date) = non_empty(item.date.as_deref()) {
                parts.push(format_date(Some(date)));
            }
            let mut block = if parts.is_empty() {
                String::new()
            } else {
                format!("\\noindent {}\\par", parts.join(" --- "))
            };
            if let Some(description) = non_empty(item.description.as_deref()) {
                if !block.is_empty() {
                    block.push('\n');
                }
                block.push_str(&format!("{}\\par", escape(description)));
            }
            push_itemize(&mut block, &item.details);
            if block.is_empty() {
                None
            } else {
                Some(block)
            }
        })
        .collect();

    if blocks.is_empty() {
        return String::new();
    }
    format!(
        "{}\n{}",
        heading(section.section_title.as_deref(), default_title),
        blocks.join("\n\n")
    )
}

// ── shared fragment builders ────────────────────────────────────────────────

fn heading(title: Option<&str>, default: &str) -> String {
    format!("\\section{{{}}}", escape(non_empty(title).unwrap_or(default)))
}

/// `\noindent \textbf{Title} \hfill dates \\ \textit{Org} \hfill location`
/// with each absent part left out rather than rendered blank.
fn entry_headline(
    title: Option<&str>,
    org: Option<&str>,
    dates: String,
    location: Option<&str>,
) -> String {
    let title = non_empty(title);
    let org = non_empty(org);
    if title.is_none() && org.is_none() {
        return String::new();
    }

    let mut first = String::from("\\noindent ");
    if let Some(title) = title {
        first.push_str(&format!("\\textbf{{{}}}", escape(title)));
    } else if let Some(org) = org {
        first.push_str(&format!("\\textbf{{{}}}", escape(org)));
    }
    if !dates.is_empty() {
        first.push_str(&format!(" \\hfill {{\\small {}}}", dates));
    }

    let mut lines = vec![first];
    if title.is_some() {
        if let Some(org) = org {
            let mut second = format!("\\textit{{{}}}", escape(org));
            if let Some(location) = non_empty(location) {
                second.push_str(&format!(" \\hfill {{\\small {}}}", escape(location)));
            }
            lines.push(second);
        } else if let Some(location) = non_empty(location) {
            lines.push(format!("{{\\small {}}}", escape(location)));
        }
    }
    lines.join(" \\\\\n") + "\\par"
}

/// Appends a bullet list for the non-empty entries of `items`, if any.
fn push_itemize(block: &mut String, items: &[String]) {
    let items: Vec<String> = items
        .iter()
        .filter_map(|i| non_empty(Some(i)))
        .map(escape)
        .collect();
    if items.is_empty() {
        return;
    }
    block.push_str("\n\\begin{itemize}\n");
    for item in items {
        block.push_str(&format!("    \\item {}\n", item));
    }
    block.push_str("\\end{itemize}");
}

/// Appends a `Technologies:` line when the item carries a tech list.
fn push_tech_line(block: &mut String, technologies: &[String]) {
    let techs: Vec<String> = technologies
        .iter()
        .filter_map(|t| non_empty(Some(t)))
        .map(escape)
        .collect();
    if techs.is_empty() {
        return;
    }
    block.push_str(&format!(
        "\n{{\\small \\textit{{Technologies:}} {}}}\\par",
        techs.join(", ")
    ));
}

/// Renders a titled item list: heading plus each item's block, dropping items
/// that render empty. Zero surviving items means the whole section is empty,
/// including the heading.
fn titled_list<T, F>(section: Option<&ItemSection<T>>, default_title: &str, render: F) -> String
where
    F: Fn(&T) -> String,
{
    let Some(section) = section else {
        return String::new();
    };
    let blocks: Vec<String> = section
        .items
        .iter()
        .map(|i| render(i))
        .filter(|b| !b.is_empty())
        .collect();
    if blocks.is_empty() {
        return String::new();
    }
    format!(
        "{}\n{}",
        heading(section.section_title.as_deref(), default_title),
        blocks.join("\n\n")
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
