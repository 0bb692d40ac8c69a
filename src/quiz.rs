use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::{Question, QuestionFilter};

/// `quiz_category.id` the frontend sends for the "All" option.
pub const ALL_CATEGORIES: i64 = 0;

/// Questions still eligible for the next draw.
pub fn candidate_filter(category: i64, previous_questions: &[i64]) -> QuestionFilter {
    let filter = if category == ALL_CATEGORIES {
        QuestionFilter::default()
    } else {
        QuestionFilter::in_category(category)
    };
    filter.excluding(previous_questions)
}

/// Picks one candidate uniformly at random, `None` once the quiz is exhausted.
pub fn select_next<'a, R>(candidates: &'a [Question], rng: &mut R) -> Option<&'a Question>
where
    R: Rng + ?Sized,
{
    candidates.choose(rng)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn question(id: i64) -> Question {
        Question {
            id,
            question: format!("question {id}"),
            answer: "answer".to_owned(),
            category: 1,
            difficulty: 1,
        }
    }

    #[test]
    fn empty_candidates_end_the_quiz() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(select_next(&[], &mut rng).is_none());
    }

    #[test]
    fn single_candidate_is_always_chosen() {
        let mut rng = StdRng::seed_from_u64(7);
        let candidates = [question(3)];
        assert_eq!(select_next(&candidates, &mut rng).map(|q| q.id), Some(3));
    }

    #[test]
    fn every_candidate_can_be_drawn() {
        let mut rng = StdRng::seed_from_u64(1);
        let candidates: Vec<Question> = (1..=5).map(question).collect();
        let drawn: HashSet<i64> = (0..500)
            .filter_map(|_| select_next(&candidates, &mut rng).map(|q| q.id))
            .collect();
        assert_eq!(drawn, (1..=5).collect());
    }

    #[test]
    fn all_categories_drops_category_predicate() {
        let filter = candidate_filter(ALL_CATEGORIES, &[1, 2]);
        assert_eq!(filter.category, None);
        assert_eq!(filter.exclude, vec![1, 2]);
    }

    #[test]
    fn specific_category_is_kept() {
        let filter = candidate_filter(4, &[]);
        assert_eq!(filter.category, Some(4));
        assert!(filter.exclude.is_empty());
    }
}
