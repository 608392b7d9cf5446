use crate::model::Recommendation;

/// Stand-in for a recommender the post did not credit.
pub const UNKNOWN_RECOMMENDER: &str = "N/A";

const ALIASES: [(&str, &str); 2] = [("Robert Siestema", "Robert Sietsema"), ("SD", "Serena Dai")];

/// Fixes the two known misspellings and fills in blank names.
pub fn normalize_recommender(name: &str) -> String {
    if name.is_empty() {
        return UNKNOWN_RECOMMENDER.to_owned();
    }
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, canonical)| *canonical)
        .to_owned()
}

pub fn normalize_recommenders(records: &mut [Recommendation]) {
    for record in records {
        record.recommender = normalize_recommender(&record.recommender);
    }
}
