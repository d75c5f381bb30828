use std::collections::HashMap;

use crate::aggregate::CountEntry;

const MIN_TERM_LEN: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "was", "were", "with", "from", "that", "this", "has", "had", "have",
    "not", "are", "but", "his", "her", "she", "him", "they", "them", "their", "our", "you",
    "your", "its", "into", "out", "off", "all", "any", "can", "did", "does", "per", "via",
    "then", "than", "there", "been", "being", "also", "again", "after", "before", "over",
    "will", "would", "could", "should",
];

/// Word counts over resolution texts for a word-cloud style summary.
///
/// Words are lower-cased alphanumeric runs of at least three characters with
/// common English stop words removed, ordered by descending count and then
/// first appearance. At most `limit` entries are returned.
pub fn term_frequencies<'a, I>(texts: I, limit: usize) -> Vec<CountEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<CountEntry> = Vec::new();

    for text in texts {
        for word in text.split(|c: char| !c.is_alphanumeric()) {
            if word.chars().count() < MIN_TERM_LEN {
                continue;
            }
            let word = word.to_lowercase();
            if STOP_WORDS.contains(&word.as_str()) || word.chars().all(|c| c.is_numeric()) {
                continue;
            }
            match index.get(&word) {
                Some(&slot) => entries[slot].count += 1,
                None => {
                    index.insert(word.clone(), entries.len());
                    entries.push(CountEntry { label: word, count: 1 });
                }
            }
        }
    }

    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_ordering() {
        let terms = term_frequencies(
            ["Replaced the AC filter", "AC filter cleaned", "Replaced towels, 2 sets"],
            10,
        );
        let labels: Vec<&str> = terms.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["replaced", "filter", "cleaned", "towels", "sets"]);
        assert_eq!(terms[0].count, 2);
        assert_eq!(terms[1].count, 2);
    }

    #[test]
    fn test_limit_and_numbers() {
        let terms = term_frequencies(["room 1204 key 1204 reissued"], 1);
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].label, "room");
    }
}
