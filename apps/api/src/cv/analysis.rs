use tracing::warn;

use crate::models::cv::EducationEntry;
use crate::models::skill::Skill;
use crate::models::user::User;

/// Category under which skills detected in a CV are stored.
pub const CV_CATEGORY: &str = "CV";
const CV_SKILL_BASE: u8 = 60;
const CV_SKILL_BUMP: u8 = 5;

const GENERAL_SKILLS: &[&str] = &[
    "HTML",
    "CSS",
    "JavaScript",
    "TypeScript",
    "React",
    "Angular",
    "Vue",
    "Node.js",
    "Express",
    "MongoDB",
    "SQL",
    "Git",
    "Docker",
    "AWS",
    "Python",
    "Java",
    "C#",
    "PHP",
    "Ruby",
    "Swift",
    "Kotlin",
];

fn specialization_skills(specialization: &str) -> &'static [&'static str] {
    match specialization {
        "Data Management" => &[
            "SQL",
            "MongoDB",
            "PostgreSQL",
            "MySQL",
            "Data Analysis",
            "ETL",
            "Data Modeling",
        ],
        "Cross-Platform Development" => &[
            "React Native",
            "Flutter",
            "Xamarin",
            "Ionic",
            "Progressive Web Apps",
            "Responsive Design",
        ],
        "Security and Networks" => &[
            "Network Security",
            "Cryptography",
            "Firewalls",
            "VPN",
            "Penetration Testing",
            "OWASP",
        ],
        "Mobile Data Management" => &[
            "SQLite",
            "Realm",
            "Core Data",
            "Firebase",
            "Offline Storage",
            "Data Synchronization",
        ],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvFormat {
    Pdf,
    Text,
    /// Accepted and stored, but not parsed.
    Word,
}

impl CvFormat {
    /// Content type wins; the file extension is the fallback for clients
    /// that send `application/octet-stream`.
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        let by_type = content_type.and_then(|ct| {
            match ct.split(';').next().unwrap_or("").trim() {
                "application/pdf" => Some(CvFormat::Pdf),
                "text/plain" => Some(CvFormat::Text),
                "application/msword"
                | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                    Some(CvFormat::Word)
                }
                _ => None,
            }
        });
        if by_type.is_some() {
            return by_type;
        }

        let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(CvFormat::Pdf),
            "txt" => Some(CvFormat::Text),
            "doc" | "docx" => Some(CvFormat::Word),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            CvFormat::Pdf => "application/pdf",
            CvFormat::Text => "text/plain",
            CvFormat::Word => "application/msword",
        }
    }
}

/// Plain text of the document, or `None` when the format is not parsed or
/// the file cannot be read. PDF parsing runs on the blocking pool.
pub async fn extract_text(format: CvFormat, bytes: bytes::Bytes) -> Option<String> {
    match format {
        CvFormat::Text => Some(String::from_utf8_lossy(&bytes).into_owned()),
        CvFormat::Word => None,
        CvFormat::Pdf => {
            let parsed =
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                    .await;
            match parsed {
                Ok(Ok(text)) => Some(text),
                Ok(Err(e)) => {
                    warn!("Could not extract PDF text: {e}");
                    None
                }
                Err(e) => {
                    warn!("PDF extraction task failed: {e}");
                    None
                }
            }
        }
    }
}

/// Case-insensitive match of `needle` in `haystack` that is not glued to a
/// letter or digit on either side. Both inputs must already be lowercase.
fn contains_token(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(i, m)| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + m.len()..].chars().next();
        !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
    })
}

/// Vocabulary skills found in the text, specialization skills first, without
/// duplicates.
pub fn detect_skills(text: &str, specialization: &str) -> Vec<String> {
    let haystack = text.to_lowercase();
    let mut found: Vec<String> = Vec::new();

    for skill in specialization_skills(specialization)
        .iter()
        .chain(GENERAL_SKILLS.iter())
    {
        if found.iter().any(|f| f == skill) {
            continue;
        }
        if contains_token(&haystack, &skill.to_lowercase()) {
            found.push(skill.to_string());
        }
    }
    found
}

/// Human-readable size with up to two decimals, e.g. "1.5 KB".
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Basename only, with anything outside `[A-Za-z0-9._-]` replaced.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "cv".to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn education_from_profile(user: &User) -> Vec<EducationEntry> {
    if user.career.trim().is_empty() {
        return Vec::new();
    }
    vec![EducationEntry {
        degree: user.career.clone(),
        institution: String::new(),
        start_date: String::new(),
        end_date: "Present".to_string(),
        specialization: (!user.specialization.is_empty()).then(|| user.specialization.clone()),
    }]
}

/// Adds detected CV skills to the user's skills: known ones gain a small
/// bump, new ones start at a fixed base.
pub fn merge_cv_skills(mut skills: Vec<Skill>, detected: &[String]) -> Vec<Skill> {
    for name in detected {
        match skills
            .iter_mut()
            .find(|s| s.category == CV_CATEGORY && &s.name == name)
        {
            Some(existing) => {
                existing.score = existing.score.saturating_add(CV_SKILL_BUMP).min(100)
            }
            None => skills.push(Skill::new(name.as_str(), CV_CATEGORY, CV_SKILL_BASE)),
        }
    }
    skills
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(CvFormat::detect(Some("application/pdf"), "x"), Some(CvFormat::Pdf));
        assert_eq!(
            CvFormat::detect(Some("text/plain; charset=utf-8"), "cv"),
            Some(CvFormat::Text)
        );
        assert_eq!(
            CvFormat::detect(Some("application/octet-stream"), "Resume.DOCX"),
            Some(CvFormat::Word)
        );
        assert_eq!(CvFormat::detect(Some("image/png"), "me.png"), None);
        assert_eq!(CvFormat::detect(None, "noext"), None);
    }

    #[test]
    fn test_detect_skills_whole_tokens() {
        let text = "Built services in JavaScript and Node.js; some PostgreSQL, C# and CI.";
        let skills = detect_skills(text, "");
        assert!(skills.contains(&"JavaScript".to_string()));
        assert!(skills.contains(&"Node.js".to_string()));
        assert!(skills.contains(&"C#".to_string()));
        // Substrings of longer words do not count.
        assert!(!skills.contains(&"Java".to_string()));
        assert!(!skills.contains(&"SQL".to_string()));
    }

    #[test]
    fn test_specialization_skills_come_first_without_duplicates() {
        let text = "sql, etl pipelines and some python";
        let skills = detect_skills(text, "Data Management");
        assert_eq!(skills, vec!["SQL", "ETL", "Python"]);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\My CV (1).pdf"), "My_CV__1_.pdf");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "cv");
    }

    #[test]
    fn test_merge_cv_skills() {
        let skills = vec![
            Skill::new("SQL", "CV", 98),
            Skill::new("SQL", "Databases", 40),
        ];
        let merged = merge_cv_skills(skills, &["SQL".to_string(), "Git".to_string()]);
        assert_eq!(merged[0].score, 100);
        assert_eq!(merged[1].score, 40);
        assert_eq!(merged[2], Skill::new("Git", "CV", 60));
    }

    #[tokio::test]
    async fn test_extract_plain_text() {
        let text = extract_text(CvFormat::Text, bytes::Bytes::from_static(b"Rust and SQL")).await;
        assert_eq!(text.as_deref(), Some("Rust and SQL"));
        assert!(extract_text(CvFormat::Word, bytes::Bytes::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_garbage_pdf_yields_no_text() {
        let text = extract_text(CvFormat::Pdf, bytes::Bytes::from_static(b"not a pdf")).await;
        assert!(text.is_none());
    }
}
