//! Helpers for the legal-advice flow.
//!
//! The advice prompt asks the model for stepwise guidance; this module classifies the query
//! into a legal area, supplies curated government reference links for it, and normalizes the
//! model output into a markdown checklist.

/// Legal areas recognized by the keyword classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegalArea {
    /// Employment and workplace matters.
    Labor,
    /// Consumer fraud, warranties, refunds.
    ConsumerProtection,
    /// Visas, citizenship, deportation.
    Immigration,
    /// Divorce, custody, adoption.
    Family,
    /// Arrests, charges, criminal court.
    Criminal,
    /// Discrimination and civil liberties.
    CivilRights,
    /// Patents, trademarks, copyright.
    IntellectualProperty,
    /// Corporations, contracts, partnerships.
    Business,
    /// Anything the classifier cannot place.
    General,
}

impl LegalArea {
    /// Human-readable label used in prompts and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Labor => "labor law",
            Self::ConsumerProtection => "consumer protection",
            Self::Immigration => "immigration law",
            Self::Family => "family law",
            Self::Criminal => "criminal law",
            Self::CivilRights => "civil rights",
            Self::IntellectualProperty => "intellectual property",
            Self::Business => "business law",
            Self::General => "general legal guidance",
        }
    }

    /// Curated government reference links for the area.
    pub fn reference_links(self) -> &'static [&'static str] {
        match self {
            Self::Labor => &[
                "https://www.dol.gov/general/topic/wages",
                "https://www.eeoc.gov/",
                "https://www.nlrb.gov/",
            ],
            Self::ConsumerProtection => &[
                "https://www.ftc.gov/tips-advice/business-center/guidance",
                "https://www.consumerfinance.gov/",
            ],
            Self::Immigration => &["https://www.uscis.gov/", "https://www.ice.gov/"],
            Self::Family => &[
                "https://www.childwelfare.gov/",
                "https://www.acf.hhs.gov/",
            ],
            Self::Criminal => &["https://www.justice.gov/", "https://www.fbi.gov/"],
            Self::CivilRights => &["https://www.justice.gov/crt", "https://www.aclu.org/"],
            Self::IntellectualProperty => &[
                "https://www.uspto.gov/",
                "https://www.copyright.gov/",
            ],
            Self::Business => &["https://www.sba.gov/", "https://www.sec.gov/"],
            Self::General => &[],
        }
    }
}

/// Keyword table driving the classifier. First matching area wins.
const AREA_KEYWORDS: &[(LegalArea, &[&str])] = &[
    (
        LegalArea::Labor,
        &[
            "employment",
            "workplace",
            "wages",
            "firing",
            "hiring",
            "overtime",
        ],
    ),
    (
        LegalArea::ConsumerProtection,
        &["consumer", "fraud", "scam", "warranty", "refund", "purchase"],
    ),
    (
        LegalArea::Immigration,
        &["visa", "citizenship", "deportation", "immigration", "green card"],
    ),
    (
        LegalArea::Family,
        &[
            "divorce",
            "custody",
            "marriage",
            "adoption",
            "child support",
            "alimony",
        ],
    ),
    (
        LegalArea::Criminal,
        &["criminal", "arrest", "charges", "felony", "misdemeanor"],
    ),
    (
        LegalArea::CivilRights,
        &["discrimination", "civil rights", "harassment"],
    ),
    (
        LegalArea::IntellectualProperty,
        &["patent", "trademark", "copyright", "intellectual property"],
    ),
    (
        LegalArea::Business,
        &["business", "corporation", "contract", "llc", "partnership"],
    ),
];

/// Classify a query into a legal area based on keyword matches.
pub fn identify_legal_area(query: &str) -> LegalArea {
    let query_lower = query.to_lowercase();
    for (area, keywords) in AREA_KEYWORDS {
        if keywords.iter().any(|keyword| query_lower.contains(keyword)) {
            return *area;
        }
    }
    LegalArea::General
}

/// Normalize a model response into a markdown checklist with reference links appended.
///
/// Numbered items, bullets, and `Step N` headings each open a checklist item; continuation
/// lines are folded into the preceding item. A response without recognizable steps becomes
/// a single item so the output shape stays uniform.
pub fn format_checklist(response: &str, links: &[&str]) -> String {
    let mut items: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in response.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(content) = strip_step_marker(line) {
            if !current.is_empty() {
                items.push(current.clone());
            }
            current = content.to_string();
        } else if current.is_empty() {
            current = line.to_string();
        } else {
            current.push(' ');
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        items.push(current);
    }
    if items.is_empty() {
        items.push(response.trim().to_string());
    }

    let mut out = String::new();
    for item in &items {
        out.push_str("- [ ] ");
        out.push_str(item);
        out.push('\n');
    }

    if !links.is_empty() {
        out.push_str("\nReferences:\n");
        for link in links {
            out.push_str("- ");
            out.push_str(link);
            out.push('\n');
        }
    }

    out
}

/// Strip a leading step marker, returning the remaining content when the line opens a step.
fn strip_step_marker(line: &str) -> Option<&str> {
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return Some(rest.trim_start());
        }
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        for sep in [". ", ".", ") ", ")"] {
            if let Some(rest) = rest.strip_prefix(sep) {
                return Some(rest.trim_start());
            }
        }
    }

    if line
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("step"))
    {
        let rest = line[4..].trim_start();
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        if digits > 0 {
            let rest = rest[digits..].trim_start_matches([':', '.']).trim_start();
            return Some(rest);
        }
    }

    None
}
