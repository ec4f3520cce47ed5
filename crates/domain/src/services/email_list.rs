//! Parsing of the free-text email list used for email invitations.

use lazy_static::lazy_static;
use regex::Regex;

use shared::validation::is_email_shape;

use crate::errors::DomainError;

lazy_static! {
    static ref SEPARATOR: Regex = Regex::new(r"[,\n]").unwrap();
    static ref NAMED_ADDRESS: Regex = Regex::new(r"^(?P<name>.*)<(?P<email>.*)>$").unwrap();
}

/// One parsed address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitee {
    pub email: String,
    pub name: Option<String>,
}

/// Parses `Name <email>`, `"Quoted Name" <email>` and bare `email` entries
/// separated by commas or newlines.
///
/// The whole list is rejected if any entry is malformed or nothing is left
/// after dropping blank entries.
pub fn parse_email_list(text: &str) -> Result<Vec<Invitee>, DomainError> {
    let mut invitees = Vec::new();

    for entry in SEPARATOR.split(text) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let invitee = match NAMED_ADDRESS.captures(entry) {
            Some(captures) => Invitee {
                email: captures["email"].trim().to_string(),
                name: clean_name(&captures["name"]),
            },
            None => Invitee {
                email: entry.to_string(),
                name: None,
            },
        };

        if !is_email_shape(&invitee.email) {
            return Err(DomainError::validation(format!(
                "Invalid email address: {}",
                invitee.email
            )));
        }

        invitees.push(invitee);
    }

    if invitees.is_empty() {
        return Err(DomainError::validation("No email addresses given"));
    }

    Ok(invitees)
}

fn clean_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim();

    if unquoted.is_empty() {
        None
    } else {
        Some(unquoted.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitee(email: &str, name: Option<&str>) -> Invitee {
        Invitee {
            email: email.to_string(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_mixed_forms() {
        let parsed = parse_email_list(
            "\"Scott\" <scott@courselore.org>,\nAli <ali@courselore.org>\nleandro@courselore.org",
        )
        .unwrap();

        assert_eq!(
            parsed,
            vec![
                invitee("scott@courselore.org", Some("Scott")),
                invitee("ali@courselore.org", Some("Ali")),
                invitee("leandro@courselore.org", None),
            ]
        );
    }

    #[test]
    fn test_blank_entries_are_dropped() {
        let parsed = parse_email_list(" , a@b.com ,,\n\n  c@d.com\n").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].email, "c@d.com");
    }

    #[test]
    fn test_empty_name_becomes_none() {
        let parsed = parse_email_list("<a@b.com>, \"\" <c@d.com>").unwrap();
        assert_eq!(parsed, vec![invitee("a@b.com", None), invitee("c@d.com", None)]);
    }

    #[test]
    fn test_name_with_inner_spaces() {
        let parsed = parse_email_list("  \"Leandro Facchinetti\"   < leandro@courselore.org >").unwrap();
        assert_eq!(
            parsed,
            vec![invitee("leandro@courselore.org", Some("Leandro Facchinetti"))]
        );
    }

    #[test]
    fn test_malformed_entry_rejects_whole_batch() {
        let result = parse_email_list("a@b.com, not-an-email, c@d.com");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(matches!(
            parse_email_list(" ,\n , "),
            Err(DomainError::Validation(_))
        ));
        assert!(parse_email_list("").is_err());
    }
}
