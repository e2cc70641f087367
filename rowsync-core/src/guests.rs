//! Guest list parsing, rendering and diffing.
//!
//! Guest cells hold delimited emails, optionally annotated with a response
//! status as written back by an import: `a@x.com (YES), b@x.com`.

use std::collections::HashSet;

use crate::event::{Guest, GuestStatus};

const GUEST_DELIMITERS: &[char] = &[',', ';', '\n'];

/// Parse a guest cell into guests.
///
/// Items that still look wrong once the status annotation is stripped are
/// rejected rather than guessed at, since an email containing parentheses
/// can't be told apart from an annotation.
pub fn parse_guest_list(cell: &str) -> Result<Vec<Guest>, String> {
    let mut guests: Vec<Guest> = Vec::new();

    for item in cell.split(GUEST_DELIMITERS).map(str::trim) {
        if item.is_empty() {
            continue;
        }

        let (email, status) = split_annotation(item);
        if !is_plausible_email(email) {
            return Err(format!("invalid guest '{}'", item));
        }

        if !guests.iter().any(|g| same_email(&g.email, email)) {
            guests.push(Guest::new(email, status));
        }
    }

    Ok(guests)
}

/// Render guests as `email (STATUS)` items joined for a single cell.
pub fn render_guest_list(guests: &[Guest]) -> String {
    guests
        .iter()
        .map(|g| format!("{} ({})", g.email, g.status))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Join guest emails the way the repository's create call expects them.
pub fn join_emails(guests: &[Guest]) -> String {
    guests
        .iter()
        .map(|g| g.email.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn split_annotation(item: &str) -> (&str, GuestStatus) {
    match item.strip_suffix(')').and_then(|body| body.rsplit_once('(')) {
        Some((email, status)) => (email.trim(), GuestStatus::parse(status)),
        None => (item, GuestStatus::Unknown),
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email
            .chars()
            .any(|c| c.is_whitespace() || c == '(' || c == ')')
}

fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Incremental guest changes between the desired list and the repository's.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuestDiff {
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
}

impl GuestDiff {
    /// `to_add = desired - current`, `to_remove = current - desired`, with
    /// emails compared case-insensitively.
    ///
    /// An empty desired list produces no changes at all: guests are only
    /// managed when the row actually names some.
    pub fn compute<'a>(
        desired: impl IntoIterator<Item = &'a str>,
        current: &[Guest],
    ) -> GuestDiff {
        let desired: Vec<&str> = desired
            .into_iter()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .collect();

        if desired.is_empty() {
            return GuestDiff::default();
        }

        let desired_keys: HashSet<String> =
            desired.iter().map(|e| e.to_ascii_lowercase()).collect();
        let current_keys: HashSet<String> = current
            .iter()
            .map(|g| g.email.to_ascii_lowercase())
            .collect();

        let mut seen = HashSet::new();
        let to_add = desired
            .iter()
            .filter(|e| !current_keys.contains(&e.to_ascii_lowercase()))
            .filter(|e| seen.insert(e.to_ascii_lowercase()))
            .map(|e| e.to_string())
            .collect();

        let to_remove = current
            .iter()
            .filter(|g| !desired_keys.contains(&g.email.to_ascii_lowercase()))
            .map(|g| g.email.clone())
            .collect();

        GuestDiff { to_add, to_remove }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(email: &str) -> Guest {
        Guest::new(email, GuestStatus::Invited)
    }

    #[test]
    fn diff_adds_missing_and_removes_extra() {
        let current = vec![guest("b@x.com"), guest("c@x.com")];
        let diff = GuestDiff::compute(["a@x.com", "b@x.com"], &current);

        assert_eq!(diff.to_add, vec!["a@x.com".to_string()]);
        assert_eq!(diff.to_remove, vec!["c@x.com".to_string()]);
    }

    #[test]
    fn empty_desired_list_never_removes_guests() {
        let current = vec![guest("b@x.com"), guest("c@x.com")];

        assert!(GuestDiff::compute(Vec::<&str>::new(), &current).is_empty());
        assert!(GuestDiff::compute([" "], &current).is_empty());
    }

    #[test]
    fn diff_ignores_email_case() {
        let current = vec![guest("Alice@Example.com")];
        let diff = GuestDiff::compute(["alice@example.com"], &current);
        assert!(diff.is_empty());
    }

    #[test]
    fn parse_strips_status_annotations() {
        let guests = parse_guest_list("a@x.com (YES), b@x.com;c@x.com (maybe)\n").unwrap();

        assert_eq!(
            guests,
            vec![
                Guest::new("a@x.com", GuestStatus::Yes),
                Guest::new("b@x.com", GuestStatus::Unknown),
                Guest::new("c@x.com", GuestStatus::Maybe),
            ]
        );
    }

    #[test]
    fn parse_rejects_emails_with_parentheses() {
        assert!(parse_guest_list("we(ird)@x.com").is_err());
        assert!(parse_guest_list("a@x.com (YES) (NO)").is_err());
        assert!(parse_guest_list("not-an-email").is_err());
    }

    #[test]
    fn parse_blank_cell_is_empty() {
        assert!(parse_guest_list("").unwrap().is_empty());
        assert!(parse_guest_list(" , ;").unwrap().is_empty());
    }

    #[test]
    fn render_round_trips_through_parse() {
        let guests = vec![
            Guest::new("a@x.com", GuestStatus::Yes),
            Guest::new("b@x.com", GuestStatus::Invited),
        ];
        let cell = render_guest_list(&guests);

        assert_eq!(cell, "a@x.com (YES), b@x.com (INVITED)");
        assert_eq!(parse_guest_list(&cell).unwrap(), guests);
    }
}
