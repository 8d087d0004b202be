//! Rule catalog: the immutable registry every detector is bound to.
//!
//! The catalog is parsed once from a tab-separated rule bundle. After
//! construction nothing mutates it, so it can be shared across threads by
//! reference without synchronisation. Every accessor hands out owned copies.

mod guidance;

use crate::error::CatalogError;
use crate::rules::Severity;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// The rule bundle compiled into the binary.
pub const DEFAULT_BUNDLE: &str = include_str!("default_rules.tsv");

/// Number of tab-separated fields every record line must carry.
const FIELD_COUNT: usize = 5;

static EMBEDDED: OnceLock<Result<RuleCatalog, CatalogError>> = OnceLock::new();

/// Normalized metadata for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleRecord {
    pub id: String,
    pub langs: Vec<String>,
    pub description: String,
    pub category: String,
    pub severity: String,
    /// Why the pattern is costly. Defaults to the description.
    pub summary: String,
    /// How to fix it.
    pub fix_hint: String,
    /// FNV-1a hash of `id`, stable across tools and platforms.
    pub code: u32,
}

impl RuleRecord {
    /// Severity mapped onto the reporting levels.
    pub fn severity_level(&self) -> Severity {
        self.severity.parse().unwrap_or(Severity::Info)
    }

    /// True if the rule applies to the given language tag.
    pub fn applies_to(&self, lang: &str) -> bool {
        let lang = lang.trim().to_ascii_lowercase();
        self.langs.iter().any(|l| *l == lang)
    }
}

/// Immutable rule registry with lookups by identifier and language.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    all: Vec<RuleRecord>,
    by_id: HashMap<String, usize>,
    by_lang: HashMap<String, Vec<usize>>,
}

impl RuleCatalog {
    /// Returns the catalog built from [`DEFAULT_BUNDLE`].
    ///
    /// The bundle is parsed on first use only; concurrent first callers block
    /// until the single initialisation finishes and then share its result.
    pub fn embedded() -> Result<&'static RuleCatalog, CatalogError> {
        EMBEDDED
            .get_or_init(|| RuleCatalog::load(DEFAULT_BUNDLE))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Load a catalog from a bundle file on disk.
    pub fn from_file(path: &Path) -> Result<RuleCatalog, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|e| CatalogError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        RuleCatalog::load(&text)
    }

    /// Parse a rule bundle.
    ///
    /// Line 1 is a header. Blank lines and `#` comments are skipped. Every
    /// other line must hold exactly five tab-separated fields
    /// (`id`, `langs`, `description`, `category`, `severity`).
    pub fn load(bundle: &str) -> Result<RuleCatalog, CatalogError> {
        if bundle.is_empty() {
            return Err(CatalogError::EmptyBundle);
        }

        let mut records = Vec::with_capacity(16);
        for (idx, raw_line) in bundle.lines().enumerate() {
            let line_num = idx + 1;
            if line_num == 1 || raw_line.trim().is_empty() || raw_line.trim_start().starts_with('#') {
                continue;
            }

            // Tabs are significant: an empty leading ID field must survive.
            let fields: Vec<&str> = raw_line.trim_end_matches('\r').split('\t').collect();
            if fields.len() != FIELD_COUNT {
                return Err(CatalogError::FieldCount {
                    line: line_num,
                    found: fields.len(),
                });
            }

            let id = fields[0].trim();
            if id.is_empty() {
                continue;
            }

            let description = fields[2].trim().to_string();
            let (summary, fix_hint) = guidance::lookup(id, &description);
            records.push(RuleRecord {
                id: id.to_string(),
                langs: parse_langs(fields[1]),
                description,
                category: fields[3].trim().to_ascii_lowercase(),
                severity: fields[4].trim().to_ascii_lowercase(),
                summary,
                fix_hint,
                code: rule_code(id),
            });
        }

        if records.is_empty() {
            return Err(CatalogError::NoRules);
        }

        Ok(Self::index(records))
    }

    fn index(mut all: Vec<RuleRecord>) -> Self {
        all.sort_by(|a, b| a.id.cmp(&b.id));
        // A later duplicate ID replaces the earlier one in lookups; keep only
        // the record the index points at so `all_rules` agrees with `rule_by_id`.
        all.dedup_by(|later, earlier| {
            if later.id == earlier.id {
                std::mem::swap(later, earlier);
                true
            } else {
                false
            }
        });

        let mut by_id = HashMap::with_capacity(all.len());
        let mut by_lang: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, rule) in all.iter().enumerate() {
            by_id.insert(rule.id.clone(), idx);
            for lang in &rule.langs {
                let slot = by_lang.entry(lang.clone()).or_default();
                if !slot.contains(&idx) {
                    slot.push(idx);
                }
            }
        }

        // `all` is sorted, so index lists built in order are already sorted by ID.
        Self { all, by_id, by_lang }
    }

    /// Look up a rule by exact identifier.
    pub fn rule_by_id(&self, id: &str) -> Option<RuleRecord> {
        self.by_id.get(id).map(|&idx| self.all[idx].clone())
    }

    /// Borrowing lookup used on the detector hot path.
    pub(crate) fn get(&self, id: &str) -> Option<&RuleRecord> {
        self.by_id.get(id).map(|&idx| &self.all[idx])
    }

    /// True if the catalog holds the identifier.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Rules tagged with the language, sorted by identifier.
    ///
    /// Unknown tags yield an empty list.
    pub fn rules_for_language(&self, lang: &str) -> Vec<RuleRecord> {
        let key = lang.trim().to_ascii_lowercase();
        self.by_lang
            .get(&key)
            .map(|indexes| indexes.iter().map(|&idx| self.all[idx].clone()).collect())
            .unwrap_or_default()
    }

    /// Every rule, sorted by identifier.
    pub fn all_rules(&self) -> Vec<RuleRecord> {
        self.all.clone()
    }

    /// Number of rules in the catalog.
    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Check that no two distinct identifiers share a numeric code.
    pub fn verify_codes(&self) -> Result<(), CatalogError> {
        let mut seen: HashMap<u32, &str> = HashMap::with_capacity(self.all.len());
        for rule in &self.all {
            if let Some(prev) = seen.insert(rule.code, &rule.id) {
                if prev != rule.id {
                    return Err(CatalogError::CodeCollision {
                        first: prev.to_string(),
                        second: rule.id.clone(),
                        code: rule.code,
                    });
                }
            }
        }
        Ok(())
    }
}

fn parse_langs(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|lang| {
            let lang = lang.trim().to_ascii_lowercase();
            if lang.is_empty() {
                None
            } else {
                Some(lang)
            }
        })
        .collect()
}

/// 32-bit FNV-1a hash of a rule identifier.
///
/// Guaranteed stable across Rust versions and platforms.
pub fn rule_code(id: &str) -> u32 {
    const FNV_OFFSET: u32 = 0x811C_9DC5;
    const FNV_PRIME: u32 = 0x0100_0193;

    let mut hash = FNV_OFFSET;
    for byte in id.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "id\tlangs\tdescription\tcategory\tseverity\n";

    fn bundle(lines: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = RuleCatalog::embedded().unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.contains("perf_avoid_string_concat_loop"));
        assert!(!catalog.rules_for_language("go").is_empty());
    }

    #[test]
    fn test_embedded_is_shared() {
        let a = RuleCatalog::embedded().unwrap();
        let b = RuleCatalog::embedded().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_embedded_first_use_is_race_free() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| RuleCatalog::embedded().unwrap() as *const _ as usize))
            .collect();
        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_no_code_collisions_in_shipped_bundle() {
        let catalog = RuleCatalog::embedded().unwrap();
        catalog.verify_codes().unwrap();

        let mut seen = HashMap::new();
        for rule in catalog.all_rules() {
            if let Some(prev) = seen.insert(rule.code, rule.id.clone()) {
                panic!("hash collision between {} and {}", prev, rule.id);
            }
        }
    }

    #[test]
    fn test_rule_code_matches_fnv1a() {
        // Reference values for 32-bit FNV-1a.
        assert_eq!(rule_code(""), 0x811C_9DC5);
        assert_eq!(rule_code("a"), 0xE40C_292C);
        assert_eq!(rule_code("foobar"), 0xBF9C_F968);
    }

    #[test]
    fn test_normalizes_fields() {
        let catalog = RuleCatalog::load(&bundle(&[
            " perf_x \t Go , RUST,, \tSome rule \tMEMORY\tWARNING",
        ]))
        .unwrap();
        let rule = catalog.rule_by_id("perf_x").unwrap();
        assert_eq!(rule.langs, vec!["go".to_string(), "rust".to_string()]);
        assert_eq!(rule.description, "Some rule");
        assert_eq!(rule.category, "memory");
        assert_eq!(rule.severity, "warning");
        assert_eq!(rule.severity_level(), Severity::Warning);
        assert_eq!(rule.code, rule_code("perf_x"));
    }

    #[test]
    fn test_skips_header_blank_and_comment_lines() {
        let catalog = RuleCatalog::load(&bundle(&[
            "",
            "# commented\tout",
            "perf_a\tgo\tA\tcpu\tinfo",
        ]))
        .unwrap();
        assert_eq!(catalog.len(), 1);
        // The header is skipped even though it has five fields.
        assert!(!catalog.contains("id"));
    }

    #[test]
    fn test_empty_id_is_dropped() {
        let catalog = RuleCatalog::load(&bundle(&[
            "\tgo\tno id\tcpu\tinfo",
            "perf_b\tgo\tB\tcpu\tinfo",
        ]))
        .unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_invalid_field_count_reports_line() {
        let err = RuleCatalog::load(&bundle(&["perf_a\tgo\tA\tcpu\tinfo", "perf_b\tgo\tB"]))
            .unwrap_err();
        assert_eq!(err, CatalogError::FieldCount { line: 3, found: 3 });
    }

    #[test]
    fn test_empty_bundle_fails() {
        assert_eq!(RuleCatalog::load("").unwrap_err(), CatalogError::EmptyBundle);
    }

    #[test]
    fn test_header_only_bundle_fails() {
        assert_eq!(RuleCatalog::load(HEADER).unwrap_err(), CatalogError::NoRules);
    }

    #[test]
    fn test_only_empty_ids_fails() {
        let err = RuleCatalog::load(&bundle(&["\tgo\tx\tcpu\tinfo"])).unwrap_err();
        assert_eq!(err, CatalogError::NoRules);
    }

    #[test]
    fn test_language_lists_are_sorted() {
        let catalog = RuleCatalog::load(&bundle(&[
            "perf_c\tgo\tC\tcpu\tinfo",
            "perf_a\tgo,rust\tA\tcpu\tinfo",
            "perf_b\trust\tB\tcpu\tinfo",
        ]))
        .unwrap();
        let go: Vec<String> = catalog.rules_for_language("GO").into_iter().map(|r| r.id).collect();
        assert_eq!(go, vec!["perf_a", "perf_c"]);
        let all: Vec<String> = catalog.all_rules().into_iter().map(|r| r.id).collect();
        assert_eq!(all, vec!["perf_a", "perf_b", "perf_c"]);
        assert!(catalog.rules_for_language("python").is_empty());
    }

    #[test]
    fn test_returned_collections_are_copies() {
        let catalog = RuleCatalog::embedded().unwrap();

        let mut rules = catalog.rules_for_language("go");
        let original = rules[0].id.clone();
        rules[0].id = "mutated".to_string();
        rules[0].langs.clear();
        rules.truncate(0);
        let fresh = catalog.rules_for_language("go");
        assert_eq!(fresh[0].id, original);
        assert!(!fresh[0].langs.is_empty());

        let mut all = catalog.all_rules();
        let before = all.len();
        all.pop();
        assert_eq!(catalog.all_rules().len(), before);

        let mut lookup = catalog.rule_by_id(&original).unwrap();
        lookup.langs[0] = "mutated".to_string();
        assert_ne!(catalog.rule_by_id(&original).unwrap().langs[0], "mutated");
    }

    #[test]
    fn test_shipped_rules_carry_guidance() {
        let catalog = RuleCatalog::embedded().unwrap();
        for rule in catalog.rules_for_language("go") {
            assert!(!rule.summary.is_empty(), "{} missing summary", rule.id);
            assert!(!rule.fix_hint.is_empty(), "{} missing fix hint", rule.id);
            assert!(!rule.category.is_empty(), "{} missing category", rule.id);
        }
    }

    #[test]
    fn test_from_file_missing() {
        let err = RuleCatalog::from_file(Path::new("/nonexistent/rules.tsv")).unwrap_err();
        assert!(matches!(err, CatalogError::Unreadable { .. }));
    }
}
