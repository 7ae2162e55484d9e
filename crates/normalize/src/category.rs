use models::Category;
use strum::IntoEnumIterator;

use crate::fold;

const EXACT: &[(&str, Category)] = &[
    ("all mountain", Category::AllMountain),
    ("all-mountain", Category::AllMountain),
    ("allmountain", Category::AllMountain),
    ("all mtn", Category::AllMountain),
    ("all terrain", Category::AllMountain),
    ("freestyle", Category::Freestyle),
    ("all mountain freestyle", Category::Freestyle),
    ("freeride", Category::Freeride),
    ("all mountain freeride", Category::Freeride),
    ("big mountain", Category::Freeride),
    ("backcountry", Category::Freeride),
    ("powder", Category::Powder),
    ("pow", Category::Powder),
    ("park", Category::Park),
    ("park & pipe", Category::Park),
    ("park and pipe", Category::Park),
    ("jib", Category::Park),
];

/// Keywords scanned in descriptions when no explicit category is given.
/// Matches are counted per category; ties break in enum declaration order.
fn keywords(category: Category) -> &'static [&'static str] {
    match category {
        Category::AllMountain => &[
            "all-mountain",
            "all mountain",
            "versatile",
            "one-board quiver",
            "quiver of one",
            "entire mountain",
            "do-it-all",
        ],
        Category::Freestyle => &[
            "freestyle",
            "playful",
            "buttery",
            "butter",
            "press",
            "jib",
        ],
        Category::Freeride => &[
            "freeride",
            "big mountain",
            "backcountry",
            "steep",
            "charging",
            "aggressive",
        ],
        Category::Powder => &["powder", "pow ", "deep snow", "float", "surfy"],
        Category::Park => &["park", "jump", "kicker", "halfpipe", "pipe", "rail"],
    }
}

pub fn normalize_category(raw: &str) -> Option<Category> {
    let folded = fold(raw);
    if folded.is_empty() {
        return None;
    }
    EXACT
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map(|(_, category)| *category)
}

/// Scan a description for category keywords and pick the category with the
/// most distinct keyword hits. Returns `None` when nothing matches.
pub fn category_from_description(description: &str) -> Option<Category> {
    let folded = fold(description);
    if folded.is_empty() {
        return None;
    }

    let mut best: Option<(Category, usize)> = None;
    for category in Category::iter() {
        let hits = keywords(category)
            .iter()
            .filter(|k| folded.contains(*k))
            .count();
        if hits == 0 {
            continue;
        }
        // Strictly-greater keeps the earliest declared category on ties.
        if best.map_or(true, |(_, top)| hits > top) {
            best = Some((category, hits));
        }
    }
    best.map(|(category, _)| category)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exact_table() {
        assert_eq!(normalize_category("All-Mountain"), Some(Category::AllMountain));
        assert_eq!(normalize_category("Park & Pipe"), Some(Category::Park));
        assert_eq!(normalize_category("backcountry"), Some(Category::Freeride));
        assert_eq!(normalize_category("carving"), None);
    }

    #[test]
    fn description_scan_picks_most_hits() {
        let desc = "A playful, buttery deck made for park laps, rails and jumps.";
        assert_eq!(category_from_description(desc), Some(Category::Park));
    }

    #[test]
    fn description_scan_tie_breaks_in_enum_order() {
        // One hit each for freestyle ("playful") and park ("park");
        // Freestyle is declared first.
        let desc = "playful in the park";
        assert_eq!(category_from_description(desc), Some(Category::Freestyle));
    }

    #[test]
    fn description_without_keywords_is_none() {
        assert_eq!(category_from_description("a snowboard"), None);
    }
}
