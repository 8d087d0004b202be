use crate::catalog::{RuleCatalog, RuleRecord};
use crate::rules::{Diagnostic, Severity};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;

/// SARIF (Static Analysis Results Interchange Format) output for code-scanning integrations
pub fn report(diagnostics: &[Diagnostic], catalog: &RuleCatalog) -> Result<()> {
    println!("{}", format(diagnostics, catalog)?);
    Ok(())
}

pub fn format(diagnostics: &[Diagnostic], catalog: &RuleCatalog) -> Result<String> {
    let sarif = SarifReport::new(diagnostics, catalog);
    Ok(serde_json::to_string_pretty(&sarif)?)
}

#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    short_description: SarifMessage,
    full_description: SarifMessage,
    help: SarifMessage,
    properties: SarifRuleProperties,
}

#[derive(Serialize)]
struct SarifRuleProperties {
    category: String,
    code: u32,
    tags: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule_index: Option<usize>,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    region: SarifRegion,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: usize,
    start_column: usize,
}

impl SarifRule {
    fn from_record(rule: RuleRecord) -> Self {
        SarifRule {
            short_description: SarifMessage {
                text: rule.description,
            },
            full_description: SarifMessage { text: rule.summary },
            help: SarifMessage {
                text: rule.fix_hint,
            },
            properties: SarifRuleProperties {
                category: rule.category,
                code: rule.code,
                tags: rule.langs,
            },
            id: rule.id,
        }
    }
}

fn level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

impl SarifReport {
    fn new(diagnostics: &[Diagnostic], catalog: &RuleCatalog) -> Self {
        let rules: Vec<SarifRule> = catalog
            .all_rules()
            .into_iter()
            .map(SarifRule::from_record)
            .collect();
        let index: HashMap<&str, usize> = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.id.as_str(), i))
            .collect();

        let results: Vec<SarifResult> = diagnostics
            .iter()
            .map(|d| SarifResult {
                rule_id: d.rule_id.clone(),
                rule_index: index.get(d.rule_id.as_str()).copied(),
                level: level(d.severity),
                message: SarifMessage {
                    text: d.message.clone(),
                },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation {
                            uri: d.file_path.to_string_lossy().replace('\\', "/"),
                        },
                        region: SarifRegion {
                            start_line: d.line.max(1),
                            start_column: d.column.max(1),
                        },
                    },
                }],
            })
            .collect();

        SarifReport {
            schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
            version: "2.1.0",
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "perfcheck",
                        version: env!("CARGO_PKG_VERSION"),
                        rules,
                    },
                },
                results,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn diagnostic(rule_id: &str, severity: Severity) -> Diagnostic {
        Diagnostic {
            rule_id: rule_id.to_string(),
            code: crate::catalog::rule_code(rule_id),
            severity,
            category: "memory".to_string(),
            message: format!("[{}] detail.", rule_id),
            file_path: PathBuf::from("pkg/main.go"),
            line: 4,
            column: 2,
        }
    }

    #[test]
    fn test_sarif_structure() {
        let catalog = RuleCatalog::embedded().unwrap();
        let out = format(
            &[
                diagnostic("perf_no_defer_in_loop", Severity::Warning),
                diagnostic("perf_avoid_linked_list", Severity::Info),
            ],
            catalog,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["version"], "2.1.0");
        let run = &value["runs"][0];
        assert_eq!(run["tool"]["driver"]["name"], "perfcheck");
        assert_eq!(
            run["tool"]["driver"]["rules"].as_array().unwrap().len(),
            catalog.len()
        );

        let results = run["results"].as_array().unwrap();
        assert_eq!(results[0]["level"], "warning");
        assert_eq!(results[1]["level"], "note");
        let idx = results[0]["ruleIndex"].as_u64().unwrap() as usize;
        assert_eq!(run["tool"]["driver"]["rules"][idx]["id"], "perf_no_defer_in_loop");
        assert_eq!(
            results[0]["locations"][0]["physicalLocation"]["region"]["startLine"],
            4
        );
    }

    #[test]
    fn test_unknown_rule_has_no_index() {
        let catalog = RuleCatalog::embedded().unwrap();
        let out = format(&[diagnostic("perf_custom", Severity::Error)], catalog).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let result = &value["runs"][0]["results"][0];
        assert!(result.get("ruleIndex").is_none());
        assert_eq!(result["level"], "error");
    }
}
