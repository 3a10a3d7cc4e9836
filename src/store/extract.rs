//! Field extraction from scan report documents.
//!
//! Report files come from more than one scanner generation, so most fields
//! have a snake_case and a camelCase spelling. Extraction is tolerant: a
//! missing or mistyped field becomes an empty/zero value, never an error.

use serde_json::Value;

/// Flattened scan-level summary, ready for insertion
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub scan_id: String,
    pub timestamp: String,
    pub status: String,
    pub resource_type: String,
    pub resource_name: String,
    pub total_vulnerabilities: i64,
    pub severity_counts: String,
    pub fixable_count: i64,
    pub compliant: bool,
}

/// Flattened vulnerability entry, ready for insertion
#[derive(Debug, Clone, Default)]
pub struct VulnEntry {
    pub id: String,
    pub severity: String,
    pub cvss: f64,
    pub status: String,
    pub package_name: String,
    pub current_version: String,
    pub fixed_version: String,
    pub description: String,
    pub published_date: String,
    pub link: String,
    pub risk_factors: Vec<String>,
}

/// One extracted scan document
#[derive(Debug, Clone)]
pub struct ExtractedScan {
    pub summary: ScanSummary,
    pub vulnerabilities: Vec<VulnEntry>,
}

/// First string value among the aliased keys
fn str_alias(obj: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

/// First numeric value among the aliased keys
fn num_alias(obj: &Value, keys: &[&str]) -> f64 {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_f64))
        .unwrap_or_default()
}

/// Extract one scan document. Returns `None` when the document has no
/// `scanResults` object at all.
pub fn extract_scan(doc: &Value) -> Option<ExtractedScan> {
    let results = doc.get("scanResults")?;

    let mut summary = ScanSummary {
        scan_id: str_alias(results, &["scan_id", "scanId"]),
        timestamp: str_alias(results, &["timestamp", "scanTime"]),
        status: str_alias(results, &["scan_status", "status"]),
        resource_type: str_alias(results, &["resource_type"]),
        resource_name: str_alias(results, &["resource_name"]),
        ..Default::default()
    };

    // Newer reports nest the resource fields
    if let Some(details) = results.get("resourceDetails") {
        if summary.resource_type.is_empty() {
            summary.resource_type = str_alias(details, &["type"]);
        }
        if summary.resource_name.is_empty() {
            summary.resource_name = str_alias(details, &["name"]);
        }
    }

    if let Some(totals) = results.get("summary") {
        summary.total_vulnerabilities =
            num_alias(totals, &["total_vulnerabilities", "totalIssues"]) as i64;
        summary.fixable_count = num_alias(totals, &["fixable_count", "fixableIssues"]) as i64;
        summary.compliant = totals
            .get("compliant")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let counts = totals
            .get("severity_counts")
            .or_else(|| totals.get("severityBreakdown"));
        if let Some(counts) = counts {
            summary.severity_counts = serde_json::to_string(counts).unwrap_or_default();
        }
    }

    let vulnerabilities = results
        .get("vulnerabilities")
        .or_else(|| results.get("findings"))
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(extract_vulnerability).collect())
        .unwrap_or_default();

    Some(ExtractedScan {
        summary,
        vulnerabilities,
    })
}

fn extract_vulnerability(value: &Value) -> Option<VulnEntry> {
    if !value.is_object() {
        log::warn!("Skipping vulnerability entry that is not an object");
        return None;
    }

    let mut entry = VulnEntry {
        id: str_alias(value, &["id", "cveId"]),
        severity: str_alias(value, &["severity"]),
        cvss: num_alias(value, &["cvss", "score"]),
        status: str_alias(value, &["status"]),
        description: str_alias(value, &["description"]),
        published_date: str_alias(value, &["published_date", "firstDetected"]),
        link: str_alias(value, &["link"]),
        ..Default::default()
    };

    if value.get("package_name").is_some() {
        entry.package_name = str_alias(value, &["package_name"]);
        entry.current_version = str_alias(value, &["current_version"]);
        entry.fixed_version = str_alias(value, &["fixed_version"]);
    } else if let Some(pkg) = value.get("package") {
        entry.package_name = str_alias(pkg, &["name"]);
        entry.current_version = str_alias(pkg, &["version"]);
        entry.fixed_version = str_alias(pkg, &["fixedVersion"]);
    }

    entry.risk_factors = extract_risk_factors(value);

    Some(entry)
}

/// Risk factors are either a plain string list or derived from the newer
/// `threatContext` block.
fn extract_risk_factors(value: &Value) -> Vec<String> {
    if let Some(factors) = value.get("risk_factors").and_then(Value::as_array) {
        return factors
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }

    let mut factors = Vec::new();
    if let Some(threat) = value.get("threatContext") {
        if threat.get("inTheWild").and_then(Value::as_bool) == Some(true) {
            factors.push("In The Wild".to_string());
        }
        if threat.get("hasExploit").and_then(Value::as_bool) == Some(true) {
            factors.push("Exploit Available".to_string());
        }
        if let Some(maturity) = threat.get("exploitMaturity").and_then(Value::as_str) {
            factors.push(format!("Exploit Maturity: {}", maturity));
        }
    }
    factors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_snake_case_report() {
        let doc = json!({
            "scanResults": {
                "scan_id": "scan-1",
                "timestamp": "2025-03-01T00:00:00Z",
                "scan_status": "completed",
                "resource_type": "container",
                "resource_name": "api-gateway",
                "summary": {
                    "total_vulnerabilities": 3,
                    "fixable_count": 2,
                    "severity_counts": {"high": 1, "low": 2},
                    "compliant": true
                },
                "vulnerabilities": [{
                    "id": "CVE-2024-0001",
                    "severity": "high",
                    "cvss": 9.8,
                    "package_name": "libxml2",
                    "current_version": "2.9.1",
                    "fixed_version": "2.9.14",
                    "description": "Parser overflow",
                    "published_date": "2024-02-01",
                    "link": "https://example.test/cve",
                    "risk_factors": ["Exploit Available", "In The Wild"]
                }]
            }
        });

        let extracted = extract_scan(&doc).unwrap();
        assert_eq!(extracted.summary.scan_id, "scan-1");
        assert_eq!(extracted.summary.status, "completed");
        assert_eq!(extracted.summary.total_vulnerabilities, 3);
        assert!(extracted.summary.compliant);
        assert!(extracted.summary.severity_counts.contains("high"));

        let vuln = &extracted.vulnerabilities[0];
        assert_eq!(vuln.id, "CVE-2024-0001");
        assert_eq!(vuln.package_name, "libxml2");
        assert_eq!(vuln.risk_factors.len(), 2);
    }

    #[test]
    fn test_extract_camel_case_report() {
        let doc = json!({
            "scanResults": {
                "scanId": "scan-2",
                "scanTime": "2025-04-01T12:00:00Z",
                "status": "done",
                "resourceDetails": {"type": "host", "name": "worker-3"},
                "summary": {
                    "totalIssues": 1,
                    "fixableIssues": 1,
                    "severityBreakdown": {"critical": 1}
                },
                "findings": [{
                    "cveId": "CVE-2024-0002",
                    "severity": "critical",
                    "score": 10.0,
                    "package": {
                        "name": "glibc",
                        "version": "2.31",
                        "fixedVersion": "2.35"
                    },
                    "firstDetected": "2024-03-10",
                    "threatContext": {
                        "inTheWild": true,
                        "hasExploit": true,
                        "exploitMaturity": "weaponized"
                    }
                }]
            }
        });

        let extracted = extract_scan(&doc).unwrap();
        assert_eq!(extracted.summary.scan_id, "scan-2");
        assert_eq!(extracted.summary.timestamp, "2025-04-01T12:00:00Z");
        assert_eq!(extracted.summary.resource_type, "host");
        assert_eq!(extracted.summary.resource_name, "worker-3");
        assert_eq!(extracted.summary.total_vulnerabilities, 1);

        let vuln = &extracted.vulnerabilities[0];
        assert_eq!(vuln.id, "CVE-2024-0002");
        assert_eq!(vuln.cvss, 10.0);
        assert_eq!(vuln.package_name, "glibc");
        assert_eq!(vuln.current_version, "2.31");
        assert_eq!(
            vuln.risk_factors,
            vec![
                "In The Wild".to_string(),
                "Exploit Available".to_string(),
                "Exploit Maturity: weaponized".to_string()
            ]
        );
    }

    #[test]
    fn test_extract_without_scan_results_is_none() {
        let doc = json!({"something": "else"});
        assert!(extract_scan(&doc).is_none());
    }

    #[test]
    fn test_extract_tolerates_missing_fields() {
        let doc = json!({"scanResults": {"scan_id": "bare"}});
        let extracted = extract_scan(&doc).unwrap();
        assert_eq!(extracted.summary.scan_id, "bare");
        assert_eq!(extracted.summary.total_vulnerabilities, 0);
        assert!(!extracted.summary.compliant);
        assert!(extracted.vulnerabilities.is_empty());
    }

    #[test]
    fn test_non_object_vulnerability_is_skipped() {
        let doc = json!({
            "scanResults": {
                "scan_id": "scan-3",
                "vulnerabilities": ["bogus", {"id": "CVE-1", "severity": "low"}]
            }
        });

        let extracted = extract_scan(&doc).unwrap();
        assert_eq!(extracted.vulnerabilities.len(), 1);
        assert_eq!(extracted.vulnerabilities[0].id, "CVE-1");
    }
}
