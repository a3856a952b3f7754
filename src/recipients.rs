/// Names already entered in a comma-separated recipient field.
pub fn split_terms(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// The term being typed, i.e. whatever follows the last comma.
pub fn current_term(input: &str) -> &str {
    match input.rfind(',') {
        Some(pos) => input[pos + 1..].trim_start(),
        None => input.trim_start(),
    }
}

pub fn suggest<'a>(input: &str, candidates: &'a [String]) -> Vec<&'a str> {
    let term = current_term(input).to_lowercase();
    if term.is_empty() {
        return vec![];
    }

    // Skip names that were already picked, except the one being typed
    let entered: Vec<String> = match input.rfind(',') {
        Some(pos) => split_terms(&input[..pos])
            .into_iter()
            .map(|t| t.to_lowercase())
            .collect(),
        None => vec![],
    };

    candidates
        .iter()
        .filter(|name| name.to_lowercase().starts_with(&term))
        .filter(|name| !entered.contains(&name.to_lowercase()))
        .map(String::as_str)
        .collect()
}

/// Replaces the term being typed with `choice` and readies the field for the next name.
pub fn complete(input: &str, choice: &str) -> String {
    let mut terms = match input.rfind(',') {
        Some(pos) => split_terms(&input[..pos]),
        None => vec![],
    };
    terms.push(choice.to_string());

    let mut completed = terms.join(", ");
    completed.push_str(", ");
    completed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["Ada", "adam", "Bob", "alice"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn current_term_follows_the_last_comma() {
        assert_eq!(current_term("ada, bo"), "bo");
        assert_eq!(current_term("ad"), "ad");
        assert_eq!(current_term("ada, "), "");
    }

    #[test]
    fn suggestions_match_prefix_and_skip_entered_names() {
        let candidates = names();
        assert_eq!(suggest("a", &candidates), vec!["Ada", "adam", "alice"]);
        assert_eq!(suggest("ada, a", &candidates), vec!["adam", "alice"]);
        assert!(suggest("ada, ", &candidates).is_empty());
    }

    #[test]
    fn completion_replaces_the_partial_term() {
        assert_eq!(complete("ada, bo", "Bob"), "ada, Bob, ");
        assert_eq!(complete("al", "alice"), "alice, ");
        assert_eq!(split_terms("ada, Bob, "), vec!["ada", "Bob"]);
    }
}
