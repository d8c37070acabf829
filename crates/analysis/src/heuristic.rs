use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{AnalysisError, AnalysisProvider};

const MONEY_HINTS: [&str; 11] = [
    "fee", "amount", "total", "paid", "due", "balance", "fine", "rs", "inr", "₹", "$",
];
const DUE_HINTS: [&str; 3] = ["due", "deadline", "last date"];
const LATE_FEE_HINTS: [&str; 3] = ["late fee", "penalty", "fine"];
const DISCOUNT_HINTS: [&str; 4] = ["discount", "scholarship", "waiver", "concession"];
const PAYMENT_METHODS: [&str; 8] = [
    "online",
    "card",
    "cash",
    "cheque",
    "upi",
    "bank transfer",
    "net banking",
    "demand draft",
];

/// Offline provider: a keyword and amount scan over the extracted text.
///
/// Used when no remote backend is configured, and as a predictable backend
/// in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicProvider;

struct Scan<'a> {
    lines: Vec<(&'a str, String)>,
}

impl<'a> Scan<'a> {
    fn new(text: &'a str) -> Self {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| (line, line.to_lowercase()))
            .collect();
        Self { lines }
    }

    fn lines_with(&self, hints: &[&str]) -> Vec<&'a str> {
        self.lines
            .iter()
            .filter(|(_, lower)| hints.iter().any(|hint| lower.contains(*hint)))
            .map(|(line, _)| *line)
            .collect()
    }

    fn amounts(&self) -> Vec<f64> {
        self.lines_with(&MONEY_HINTS)
            .into_iter()
            .flat_map(str::split_whitespace)
            .filter_map(parse_amount)
            .collect()
    }

    fn payment_methods(&self) -> Vec<&'static str> {
        PAYMENT_METHODS
            .into_iter()
            .filter(|method| self.lines.iter().any(|(_, lower)| lower.contains(*method)))
            .collect()
    }
}

fn parse_amount(word: &str) -> Option<f64> {
    let token = word.trim_matches(|c: char| !c.is_ascii_digit());
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
        return None;
    }
    token.replace(',', "").parse::<f64>().ok()
}

fn largest(amounts: &[f64]) -> Option<f64> {
    amounts.iter().copied().reduce(f64::max)
}

#[async_trait]
impl AnalysisProvider for HeuristicProvider {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn financial_analysis(&self, text: &str) -> Result<Value, AnalysisError> {
        let scan = Scan::new(text);
        let amounts = scan.amounts();
        let due_dates = scan.lines_with(&DUE_HINTS);
        let late_fees = scan.lines_with(&LATE_FEE_HINTS);
        let discounts = scan.lines_with(&DISCOUNT_HINTS);

        let mut recommendations = Vec::new();
        if amounts.is_empty() {
            recommendations.push("No amounts were found; verify the document contents.");
        }
        if !due_dates.is_empty() {
            recommendations.push("Schedule payments before the listed due dates.");
        }
        if !late_fees.is_empty() {
            recommendations.push("Pay on time to avoid the late fees mentioned in the document.");
        }
        if !discounts.is_empty() {
            recommendations.push("Check eligibility for the listed discounts or scholarships.");
        }

        Ok(json!({
            "source": self.name(),
            "amountsFound": amounts.len(),
            "largestAmount": largest(&amounts),
            "totalOfAmounts": amounts.iter().sum::<f64>(),
            "dueDates": due_dates,
            "recommendations": recommendations,
        }))
    }

    async fn payment_details(&self, text: &str) -> Result<Value, AnalysisError> {
        let scan = Scan::new(text);
        let amounts = scan.amounts();

        Ok(json!({
            "source": self.name(),
            "totalAmount": largest(&amounts),
            "dueDates": scan.lines_with(&DUE_HINTS),
            "paymentMethods": scan.payment_methods(),
            "lateFees": scan.lines_with(&LATE_FEE_HINTS),
            "discounts": scan.lines_with(&DISCOUNT_HINTS),
        }))
    }

    async fn validate(&self, text: &str) -> Result<Value, AnalysisError> {
        let scan = Scan::new(text);

        let mut warnings = Vec::new();
        if scan.lines.is_empty() {
            warnings.push("Document has no readable text.");
        } else if text.contains("not supported") {
            warnings.push("Text could not be extracted from this document type.");
        }

        let mut missing = Vec::new();
        if scan.amounts().is_empty() {
            missing.push("amount");
        }
        if scan.lines_with(&DUE_HINTS).is_empty() {
            missing.push("due date");
        }
        if scan.payment_methods().is_empty() {
            missing.push("payment method");
        }

        Ok(json!({
            "source": self.name(),
            "isComplete": missing.is_empty() && warnings.is_empty(),
            "missingFields": missing,
            "warnings": warnings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVOICE: &str = "Semester tuition fee: Rs. 50,000\n\
        Lab fee: 2,500\n\
        Due date: 2026-11-01\n\
        Late fee of 500 applies after the deadline\n\
        Pay online or by bank transfer\n\
        Merit scholarship available";

    #[test]
    fn amounts_ignore_dates_and_plain_words() {
        assert_eq!(parse_amount("50,000."), Some(50_000.0));
        assert_eq!(parse_amount("₹1,250.50"), Some(1_250.5));
        assert_eq!(parse_amount("2026-11-01"), None);
        assert_eq!(parse_amount("fee"), None);
    }

    #[tokio::test]
    async fn payment_details_are_extracted() {
        let details = HeuristicProvider.payment_details(INVOICE).await.unwrap();

        assert_eq!(details["totalAmount"], json!(50_000.0));
        assert_eq!(
            details["paymentMethods"],
            json!(["online", "bank transfer"])
        );
        assert_eq!(details["dueDates"].as_array().unwrap().len(), 2);
        assert_eq!(details["lateFees"].as_array().unwrap().len(), 1);
        assert_eq!(details["discounts"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn complete_document_validates() {
        let report = HeuristicProvider.validate(INVOICE).await.unwrap();
        assert_eq!(report["isComplete"], json!(true));
        assert_eq!(report["missingFields"], json!([]));
    }

    #[tokio::test]
    async fn placeholder_text_is_flagged() {
        let report = HeuristicProvider
            .validate("PDF text extraction not supported")
            .await
            .unwrap();
        assert_eq!(report["isComplete"], json!(false));
        assert_eq!(
            report["missingFields"],
            json!(["amount", "due date", "payment method"])
        );
        assert_eq!(report["warnings"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn financial_analysis_recommends_on_findings() {
        let analysis = HeuristicProvider.financial_analysis(INVOICE).await.unwrap();
        assert_eq!(analysis["largestAmount"], json!(50_000.0));
        assert_eq!(analysis["recommendations"].as_array().unwrap().len(), 3);
    }
}
