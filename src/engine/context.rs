use crate::ast::SourceFile;
use crate::catalog::{RuleCatalog, RuleRecord};
use crate::error::{Error, Result};
use crate::layout::SizeOracle;
use crate::reporter::Reporter;

/// Context passed to rules during analysis
pub struct AnalysisContext<'a> {
    pub file: &'a SourceFile,
    pub sizes: &'a dyn SizeOracle,
    pub catalog: &'a RuleCatalog,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(file: &'a SourceFile, sizes: &'a dyn SizeOracle, catalog: &'a RuleCatalog) -> Self {
        Self {
            file,
            sizes,
            catalog,
        }
    }

    /// Catalog record for `rule_id`, or a configuration error.
    pub fn rule(&self, rule_id: &str) -> Result<&'a RuleRecord> {
        self.catalog
            .get(rule_id)
            .ok_or_else(|| Error::missing_rule(rule_id))
    }

    /// Reporter bound to `rule_id` and this file.
    pub fn reporter(&self, rule_id: &str) -> Result<Reporter<'a>> {
        Ok(Reporter::new(self.rule(rule_id)?, &self.file.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build;
    use crate::layout::LayoutTable;

    #[test]
    fn test_missing_rule_is_an_error() {
        let catalog = RuleCatalog::load(
            "id\tlangs\tdescription\tcategory\tseverity\nperf_other\tgo\tOther\tcpu\tinfo\n",
        )
        .unwrap();
        let file = build::file("main.go", vec![]);
        let sizes = LayoutTable::new();
        let ctx = AnalysisContext::new(&file, &sizes, &catalog);

        assert!(ctx.rule("perf_other").is_ok());
        let err = ctx.reporter("perf_no_defer_in_loop").err().unwrap();
        assert!(matches!(err, Error::MissingRule { ref rule_id } if rule_id == "perf_no_defer_in_loop"));
    }
}
