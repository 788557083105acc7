//! Static keyword tables used to match catalog items against a student's
//! academic track and specialization. The tables are expected to be
//! incomplete; lookups on unknown keys degrade instead of failing.

const CAREER_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Computer Systems Engineering",
        &[
            "programming",
            "development",
            "software",
            "systems",
            "web",
            "mobile",
            "frontend",
            "backend",
        ],
    ),
    (
        "Informatics Engineering",
        &["informatics", "data", "analysis", "systems", "networks", "security"],
    ),
    (
        "Information Technology Engineering",
        &["IT", "infrastructure", "cloud", "networks", "systems"],
    ),
    (
        "Bachelor of Informatics",
        &["informatics", "management", "projects", "analysis"],
    ),
    (
        "Software Development Engineering",
        &[
            "development",
            "software",
            "programming",
            "web",
            "mobile",
            "frontend",
            "backend",
        ],
    ),
    (
        "Computer Science Engineering",
        &[
            "algorithms",
            "computing",
            "theory",
            "mathematics",
            "artificial intelligence",
        ],
    ),
];

const DEFAULT_CAREER_KEYWORDS: &[&str] = &["programming", "development", "technology"];

const SPECIALIZATION_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Data Management",
        &[
            "data",
            "SQL",
            "NoSQL",
            "databases",
            "analysis",
            "big data",
            "data science",
        ],
    ),
    (
        "Cross-Platform Development",
        &[
            "web",
            "mobile",
            "frontend",
            "backend",
            "fullstack",
            "react",
            "angular",
            "vue",
        ],
    ),
    (
        "Security and Networks",
        &[
            "security",
            "networks",
            "cybersecurity",
            "ethical hacking",
            "pentesting",
            "firewall",
        ],
    ),
    (
        "Mobile Data Management",
        &[
            "mobile",
            "android",
            "ios",
            "react native",
            "flutter",
            "mobile data",
        ],
    ),
    (
        "Artificial Intelligence",
        &[
            "AI",
            "machine learning",
            "deep learning",
            "neural networks",
            "NLP",
        ],
    ),
    (
        "Web Development",
        &[
            "web",
            "frontend",
            "backend",
            "fullstack",
            "javascript",
            "react",
            "node",
        ],
    ),
];

fn lookup(table: &'static [(&str, &'static [&'static str])], key: &str) -> Option<&'static [&'static str]> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Keywords for a career track. Unknown tracks get a generic set.
pub fn career_keywords(career: &str) -> &'static [&'static str] {
    lookup(CAREER_KEYWORDS, career).unwrap_or(DEFAULT_CAREER_KEYWORDS)
}

/// Keywords for a specialization. Unknown specializations get none.
pub fn specialization_keywords(specialization: &str) -> &'static [&'static str] {
    lookup(SPECIALIZATION_KEYWORDS, specialization).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_career() {
        assert!(career_keywords("Computer Science Engineering").contains(&"algorithms"));
    }

    #[test]
    fn test_unknown_career_gets_defaults() {
        assert_eq!(career_keywords("Astronomy"), DEFAULT_CAREER_KEYWORDS);
    }

    #[test]
    fn test_unmapped_specialization_is_empty() {
        assert!(specialization_keywords("Cloud Computing").is_empty());
        assert!(specialization_keywords("").is_empty());
        assert!(!specialization_keywords("Data Management").is_empty());
    }
}
