use regex::Regex;
use std::sync::LazyLock;

pub const TITLE_KEYWORDS: &[&str] = &[
    "CEO",
    "CTO",
    "CFO",
    "COO",
    "President",
    "Director",
    "Manager",
    "Senior",
    "Lead",
    "Engineer",
    "Developer",
    "Designer",
    "Analyst",
    "Consultant",
    "Specialist",
    "Executive",
    "Vice President",
    "VP",
    "Assistant",
    "Coordinator",
    "Supervisor",
    "Partner",
    "Founder",
    "Owner",
    "Principal",
    "Chief",
    "Head of",
    "Administrator",
    "Sales",
    "Marketing",
    "Operations",
    "Finance",
    "Human Resources",
    "Account",
    "Project",
    "Product",
    "Strategy",
    "Technical",
    "Officer",
    "Architect",
    "Attorney",
    "Agent",
];

pub const COMPANY_INDICATORS: &[&str] = &[
    "Inc",
    "Corp",
    "Corporation",
    "LLC",
    "LLP",
    "Ltd",
    "Limited",
    "GmbH",
    "Company",
    "Co.",
    "Solutions",
    "Services",
    "Systems",
    "Technologies",
    "Tech",
    "Group",
    "Associates",
    "Partners",
    "Consulting",
    "Holdings",
    "Enterprises",
    "International",
    "Global",
    "Industries",
    "Ventures",
    "Capital",
    "Bank",
    "Insurance",
    "Healthcare",
];

pub const ADDRESS_KEYWORDS: &[&str] = &[
    "street",
    "st",
    "avenue",
    "ave",
    "road",
    "rd",
    "suite",
    "ste",
    "floor",
    "fl",
    "building",
    "bldg",
    "boulevard",
    "blvd",
    "drive",
    "dr",
    "lane",
    "ln",
    "way",
    "plaza",
    "place",
    "pl",
    "court",
    "ct",
    "parkway",
    "pkwy",
    "highway",
    "hwy",
    "square",
    "sq",
];

/// Characters that make up card borders and rules when OCR picks them up.
pub const SEPARATOR_CHARS: &[char] = &['-', '_', '=', '~', '*', '.', '|', '•', '·', '—', '–'];

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern")
});

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b|(?:\+\d{1,3}[-.\s]?)?\b\d{8,15}\b",
    )
    .expect("phone pattern")
});

static WEBSITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:https?://)?(?:www\.)?[a-z0-9-]+\.[a-z]{2,}(?:\.[a-z]{2,})?(?:/\S*)?",
    )
    .expect("website pattern")
});

static NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\s.'\-]+$").expect("name pattern"));

static STREET_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[A-Za-z]?\b").expect("street number pattern"));

static ZIP_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{5}(?:-\d{4})?\b").expect("zip pattern"));

static CITY_STATE_ZIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][a-z]+,\s*[A-Z]{2}\s*\d{5}").expect("city/state pattern")
});

static TITLE: LazyLock<Regex> = LazyLock::new(|| keyword_regex(TITLE_KEYWORDS));
static COMPANY: LazyLock<Regex> = LazyLock::new(|| keyword_regex(COMPANY_INDICATORS));
static ADDRESS_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    let words: Vec<String> = ADDRESS_KEYWORDS.iter().map(|k| regex::escape(k)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).expect("address keyword pattern")
});

/// Builds a case-insensitive alternation over `keywords`.
///
/// Keywords of three characters or fewer are anchored at word boundaries so
/// acronyms like `CTO` do not fire inside ordinary words like "Victor".
fn keyword_regex(keywords: &[&str]) -> Regex {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(|keyword| {
            let escaped = regex::escape(keyword);
            if keyword.chars().count() > 3 {
                return escaped;
            }
            let trailing = if keyword.ends_with(|c: char| c.is_alphanumeric()) {
                r"\b"
            } else {
                ""
            };
            format!(r"\b{escaped}{trailing}")
        })
        .collect();

    Regex::new(&format!("(?i)(?:{})", alternatives.join("|"))).expect("keyword pattern")
}

pub fn find_email(line: &str) -> Option<&str> {
    EMAIL.find(line).map(|m| m.as_str())
}

pub fn find_phone(line: &str) -> Option<&str> {
    PHONE.find(line).map(|m| m.as_str().trim())
}

/// Website match, prefixed with `www.` when it carries neither a scheme nor
/// a `www.` host. Lines containing `@` never yield a website.
pub fn find_website(line: &str) -> Option<String> {
    if line.contains('@') {
        return None;
    }

    let found = WEBSITE.find(line)?.as_str();
    let lower = found.to_ascii_lowercase();
    if lower.starts_with("http") || lower.starts_with("www.") {
        Some(found.to_string())
    } else {
        Some(format!("www.{found}"))
    }
}

pub fn has_contact_info(line: &str) -> bool {
    line.contains('@') || find_phone(line).is_some() || find_website(line).is_some()
}

pub fn has_title_keyword(line: &str) -> bool {
    TITLE.is_match(line)
}

pub fn has_company_indicator(line: &str) -> bool {
    COMPANY.is_match(line)
}

pub fn looks_like_name(line: &str) -> bool {
    let len = line.chars().count();
    (3..50).contains(&len) && NAME_CHARS.is_match(line) && !has_contact_info(line)
}

pub fn is_upper_case(line: &str) -> bool {
    line.chars().any(char::is_alphabetic) && !line.chars().any(char::is_lowercase)
}

pub fn word_count(line: &str) -> usize {
    line.split_whitespace().count()
}

pub fn has_zip_code(line: &str) -> bool {
    ZIP_CODE.is_match(line)
}

pub fn has_city_state_zip(line: &str) -> bool {
    CITY_STATE_ZIP.is_match(line)
}

pub fn has_street_address(line: &str) -> bool {
    STREET_NUMBER.is_match(line) && ADDRESS_KEYWORD.is_match(line)
}

/// Street line, ZIP code, or "City, ST 12345".
pub fn looks_like_address(line: &str) -> bool {
    has_street_address(line) || has_zip_code(line) || has_city_state_zip(line)
}

/// A line that can continue an address started on the line above it.
pub fn is_address_continuation(line: &str) -> bool {
    has_city_state_zip(line) || has_zip_code(line)
}

pub fn is_separator(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_whitespace() || SEPARATOR_CHARS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert_eq!(
            find_email("Email: john.doe@example.com"),
            Some("john.doe@example.com")
        );
        assert_eq!(find_email("no email here"), None);
    }

    #[test]
    fn test_phone_formats() {
        assert_eq!(find_phone("555-123-4567"), Some("555-123-4567"));
        assert_eq!(find_phone("Tel: (555) 123-4567"), Some("(555) 123-4567"));
        assert_eq!(find_phone("+1-555-111-2222"), Some("+1-555-111-2222"));
        assert_eq!(find_phone("+44 2079460958"), Some("+44 2079460958"));
        assert_eq!(find_phone("San Francisco, CA 94105"), None);
        assert_eq!(find_phone("123 Main Street, Suite 200"), None);
    }

    #[test]
    fn test_website_prefix() {
        assert_eq!(
            find_website("www.techsolutions.com").as_deref(),
            Some("www.techsolutions.com")
        );
        assert_eq!(
            find_website("https://acme.io/team").as_deref(),
            Some("https://acme.io/team")
        );
        assert_eq!(find_website("acme.org").as_deref(), Some("www.acme.org"));
        assert_eq!(find_website("jane@acme.org"), None);
        assert_eq!(find_website("Tech Solutions Inc."), None);
    }

    #[test]
    fn test_short_keywords_need_word_boundaries() {
        assert!(has_title_keyword("CEO"));
        assert!(has_title_keyword("VP of Sales"));
        assert!(!has_title_keyword("Victor Hugo"));

        assert!(has_company_indicator("Acme, Inc."));
        assert!(has_company_indicator("Widgets Co."));
        assert!(!has_company_indicator("Abraham Lincoln"));
    }

    #[test]
    fn test_long_keywords_match_substrings() {
        assert!(has_title_keyword("Software Engineering Manager"));
        assert!(has_company_indicator("FinTechnologies"));
    }

    #[test]
    fn test_name_shape() {
        assert!(looks_like_name("John Doe"));
        assert!(looks_like_name("Mary-Jane O'Neil"));
        assert!(looks_like_name("José Álvarez"));
        assert!(!looks_like_name("Jo"));
        assert!(!looks_like_name("R2 D2"));
        assert!(!looks_like_name("www.example.com"));
    }

    #[test]
    fn test_address_shapes() {
        assert!(has_street_address("123 Main Street"));
        assert!(has_street_address("42B Baker St."));
        assert!(!has_street_address("Main Street"));
        assert!(!has_street_address("100 Percent Effort"));
        assert!(has_zip_code("Springfield 62701"));
        assert!(has_city_state_zip("Springfield, IL 62701"));
        assert!(is_address_continuation("San Francisco, CA 94105"));
        assert!(!looks_like_address("Software Engineer"));
    }

    #[test]
    fn test_separators() {
        assert!(is_separator("----"));
        assert!(is_separator("= = = ="));
        assert!(is_separator("__"));
        assert!(!is_separator("-- CEO --"));
    }

    #[test]
    fn test_upper_case() {
        assert!(is_upper_case("ACME CORP"));
        assert!(!is_upper_case("Acme Corp"));
        assert!(!is_upper_case("12345"));
    }
}
