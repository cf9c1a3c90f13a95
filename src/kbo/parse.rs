//! Parsing of the free text in the registry's function holder cells.
//!
//! A holder cell is either a person, printed as `Lastname , Firstname`,
//! or a company, printed as a name followed by its enterprise number.
//! The registry is not consistent about spacing, non-breaking spaces or
//! number formatting, so everything is normalized before splitting.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::numbers;

use super::types::{CompanyExtract, FunctionRecord};

/// Dotted enterprise number, e.g. `0403.200.393` or `BE 0403.200.393`.
/// Older nine digit numbers appear as `403.200.393`.
static DOTTED_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:BE\s?)?\d{3,4}[.\s]\d{3}[.\s]\d{3}").unwrap());

/// Undotted enterprise number. The run must stand alone; ten digits
/// inside a longer sequence are not an enterprise number.
static BARE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9])(\d{9,10})(?:[^0-9]|$)").unwrap());

/// Empty parentheses left over after the number inside them was removed.
static EMPTY_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*\)").unwrap());

/// The parsed pieces of one holder cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedHolder {
    pub first_name: String,
    pub last_name: String,
    pub company_number: Option<String>,
}

/// Split a raw holder cell into name parts and an optional enterprise
/// number.
///
/// If the cell carries a number but no `Lastname , Firstname` comma, the
/// holder is a company and both name fields stay empty. Those rows are
/// the ones a follow-up pass can look up by number.
pub fn parse_holder(raw: &str) -> ParsedHolder {
    let text = normalize_text(raw);
    if text.is_empty() {
        return ParsedHolder::default();
    }

    let (remainder, company_number) = extract_number(&text);
    let remainder = strip_debris(&remainder);

    match remainder.split_once(',') {
        Some((last, first)) => ParsedHolder {
            first_name: first.trim().to_string(),
            last_name: last.trim().to_string(),
            company_number,
        },
        None if company_number.is_some() => {
            // Company holder: the remainder is an organization name,
            // not a person.
            ParsedHolder {
                first_name: String::new(),
                last_name: String::new(),
                company_number,
            }
        }
        None => ParsedHolder {
            first_name: String::new(),
            last_name: remainder,
            company_number: None,
        },
    }
}

/// Build workbook rows for every function of one extracted company.
pub fn records_from_extract(extract: &CompanyExtract) -> Vec<FunctionRecord> {
    let company_number = numbers::normalize(&extract.enterprise_number)
        .unwrap_or_else(|| extract.enterprise_number.trim().to_string());

    extract
        .functions
        .iter()
        .map(|entry| {
            let holder = parse_holder(&entry.holder);
            FunctionRecord {
                company_number: company_number.clone(),
                company_name: normalize_text(&extract.name),
                email: extract.email.trim().to_string(),
                function_title: normalize_text(&entry.title),
                first_name: holder.first_name,
                last_name: holder.last_name,
                person_company_number: holder.company_number.unwrap_or_default(),
            }
        })
        .collect()
}

/// Collapse whitespace runs and non-breaking spaces into single spaces.
fn normalize_text(raw: &str) -> String {
    raw.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Find and remove the first enterprise number in `text`.
fn extract_number(text: &str) -> (String, Option<String>) {
    // The bare pattern carries boundary context, so only its digit
    // group is taken out of the string.
    let m = DOTTED_NUMBER
        .find(text)
        .or_else(|| BARE_NUMBER.captures(text).and_then(|c| c.get(1)));

    match m {
        Some(m) => {
            let number = numbers::normalize(m.as_str());
            let remainder = format!("{}{}", &text[..m.start()], &text[m.end()..]);
            (remainder, number)
        }
        None => (text.to_string(), None),
    }
}

/// Clean up punctuation left behind by number removal.
fn strip_debris(text: &str) -> String {
    let without_parens = EMPTY_PARENS.replace_all(text, "");
    normalize_text(&without_parens)
        .trim_matches(|c| c == ',' || c == ' ')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kbo::FunctionEntry;

    #[test]
    fn test_person_basic() {
        let holder = parse_holder("Peeters , Jan");
        assert_eq!(holder.last_name, "Peeters");
        assert_eq!(holder.first_name, "Jan");
        assert_eq!(holder.company_number, None);
    }

    #[test]
    fn test_person_tight_comma() {
        let holder = parse_holder("Peeters,Jan");
        assert_eq!(holder.last_name, "Peeters");
        assert_eq!(holder.first_name, "Jan");
    }

    #[test]
    fn test_person_with_nbsp() {
        let holder = parse_holder("Peeters\u{a0}, Jan");
        assert_eq!(holder.last_name, "Peeters");
        assert_eq!(holder.first_name, "Jan");
    }

    #[test]
    fn test_company_with_dotted_number() {
        let holder = parse_holder("ACME BVBA 0403.200.393");
        assert_eq!(holder.first_name, "");
        assert_eq!(holder.last_name, "");
        assert_eq!(holder.company_number, Some("0403200393".to_string()));
    }

    #[test]
    fn test_company_with_be_prefix() {
        let holder = parse_holder("ACME BVBA BE 0403.200.393");
        assert_eq!(holder.company_number, Some("0403200393".to_string()));
        assert_eq!(holder.last_name, "");
    }

    #[test]
    fn test_company_with_bare_number() {
        let holder = parse_holder("ACME BVBA 0403200393");
        assert_eq!(holder.company_number, Some("0403200393".to_string()));
        assert_eq!(holder.last_name, "");
    }

    #[test]
    fn test_longer_digit_run_is_not_a_number() {
        // An account or phone number must not yield an enterprise number
        let holder = parse_holder("ACME BVBA 12345678901");
        assert_eq!(holder.company_number, None);
        assert_eq!(holder.last_name, "ACME BVBA 12345678901");
        assert_eq!(holder.first_name, "");

        let holder = parse_holder("Peeters , Jan 123456789012");
        assert_eq!(holder.company_number, None);
        assert_eq!(holder.last_name, "Peeters");
        assert_eq!(holder.first_name, "Jan 123456789012");
    }

    #[test]
    fn test_company_nine_digit_number_gets_leading_zero() {
        let holder = parse_holder("ACME BVBA 403.200.393");
        assert_eq!(holder.company_number, Some("0403200393".to_string()));
    }

    #[test]
    fn test_company_number_in_parens() {
        let holder = parse_holder("ACME BVBA (0403.200.393)");
        assert_eq!(holder.company_number, Some("0403200393".to_string()));
        assert_eq!(holder.last_name, "");
        assert_eq!(holder.first_name, "");
    }

    #[test]
    fn test_company_trailing_comma_debris() {
        let holder = parse_holder("ACME BVBA, 0403.200.393");
        assert_eq!(holder.company_number, Some("0403200393".to_string()));
        assert_eq!(holder.last_name, "");
        assert_eq!(holder.first_name, "");
    }

    #[test]
    fn test_person_with_number_keeps_both() {
        let holder = parse_holder("De Smet , Marie 0403.200.393");
        assert_eq!(holder.last_name, "De Smet");
        assert_eq!(holder.first_name, "Marie");
        assert_eq!(holder.company_number, Some("0403200393".to_string()));
    }

    #[test]
    fn test_single_token_is_last_name() {
        let holder = parse_holder("Peeters");
        assert_eq!(holder.last_name, "Peeters");
        assert_eq!(holder.first_name, "");
        assert_eq!(holder.company_number, None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_holder(""), ParsedHolder::default());
        assert_eq!(parse_holder("   \u{a0}  "), ParsedHolder::default());
    }

    #[test]
    fn test_records_from_extract() {
        let extract = CompanyExtract {
            found: true,
            enterprise_number: "0403.200.393".to_string(),
            name: "  Acme  NV ".to_string(),
            email: "info@acme.be".to_string(),
            functions: vec![
                FunctionEntry {
                    title: "Bestuurder".to_string(),
                    holder: "Peeters , Jan".to_string(),
                },
                FunctionEntry {
                    title: " Vaste  vertegenwoordiger ".to_string(),
                    holder: "Beheer BVBA 0417.497.106".to_string(),
                },
            ],
        };

        let records = records_from_extract(&extract);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].company_number, "0403200393");
        assert_eq!(records[0].company_name, "Acme NV");
        assert_eq!(records[0].email, "info@acme.be");
        assert_eq!(records[0].function_title, "Bestuurder");
        assert_eq!(records[0].first_name, "Jan");
        assert_eq!(records[0].last_name, "Peeters");
        assert_eq!(records[0].person_company_number, "");

        assert_eq!(records[1].function_title, "Vaste vertegenwoordiger");
        assert_eq!(records[1].first_name, "");
        assert_eq!(records[1].last_name, "");
        assert_eq!(records[1].person_company_number, "0417497106");
    }

    #[test]
    fn test_records_from_extract_no_functions() {
        let extract = CompanyExtract {
            found: true,
            enterprise_number: "0403200393".to_string(),
            name: "Acme NV".to_string(),
            ..Default::default()
        };
        assert!(records_from_extract(&extract).is_empty());
    }
}
